use crate::dissect::{tcp, udp, PktBuf, PrintMode, Stage};
use std::fmt::Write;
use std::net::Ipv4Addr;

pub static IPV4: V4Stage = V4Stage;

pub struct V4Stage;

pub(crate) fn dispatch_ip_proto(pkt: &mut PktBuf<'_>, proto: u8) {
    match proto {
        6 => pkt.set_next(&tcp::TCP),
        17 => pkt.set_next(&udp::UDP),
        _ => {}
    }
}

impl Stage for V4Stage {
    fn name(&self) -> &'static str {
        "ipv4"
    }

    fn step(&self, pkt: &mut PktBuf<'_>, mode: PrintMode, out: &mut String) {
        let Some(hdr) = pkt.pull(20) else { return };
        let version = hdr[0] >> 4;
        let ihl = (hdr[0] & 0x0f) as usize * 4;
        if version != 4 || ihl < 20 {
            return;
        }
        let total_len = u16::from_be_bytes([hdr[2], hdr[3]]);
        let ttl = hdr[8];
        let proto = hdr[9];
        let src = Ipv4Addr::new(hdr[12], hdr[13], hdr[14], hdr[15]);
        let dst = Ipv4Addr::new(hdr[16], hdr[17], hdr[18], hdr[19]);

        // Options, if any, sit between the fixed header and the payload.
        if ihl > 20 && pkt.pull(ihl - 20).is_none() {
            return;
        }

        if mode.contains(PrintMode::NORMAL) {
            let _ = writeln!(
                out,
                " [ IPv4 Addr ({src} => {dst}), Proto ({proto}), TTL ({ttl}), Len ({total_len}) ]"
            );
        } else {
            let _ = write!(out, "{src} => {dst} ");
        }

        dispatch_ip_proto(pkt, proto);
    }
}
