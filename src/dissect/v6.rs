use crate::dissect::{v4::dispatch_ip_proto, PktBuf, PrintMode, Stage};
use std::fmt::Write;
use std::net::Ipv6Addr;

pub static IPV6: V6Stage = V6Stage;

pub struct V6Stage;

impl Stage for V6Stage {
    fn name(&self) -> &'static str {
        "ipv6"
    }

    fn step(&self, pkt: &mut PktBuf<'_>, mode: PrintMode, out: &mut String) {
        let Some(hdr) = pkt.pull(40) else { return };
        let version = hdr[0] >> 4;
        if version != 6 {
            return;
        }
        let payload_len = u16::from_be_bytes([hdr[4], hdr[5]]);
        let next_header = hdr[6];
        let hop_limit = hdr[7];
        let src = Ipv6Addr::from(<[u8; 16]>::try_from(&hdr[8..24]).unwrap());
        let dst = Ipv6Addr::from(<[u8; 16]>::try_from(&hdr[24..40]).unwrap());

        if mode.contains(PrintMode::NORMAL) {
            let _ = writeln!(
                out,
                " [ IPv6 Addr ({src} => {dst}), NextHdr ({next_header}), HopLimit ({hop_limit}), Len ({payload_len}) ]"
            );
        } else {
            let _ = write!(out, "{src} => {dst} ");
        }

        // Extension headers are not walked; only a directly following
        // transport layer continues the chain.
        dispatch_ip_proto(pkt, next_header);
    }
}
