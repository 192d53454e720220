use crate::dissect::{arp, format_mac, v4, v6, PktBuf, PrintMode, Stage};
use std::fmt::Write;

pub static ETHERNET: EthStage = EthStage;

/// Ethernet II framing: two MACs and an EtherType that picks the payload
/// stage.
pub struct EthStage;

pub(crate) fn ethertype_name(ethertype: u16) -> &'static str {
    match ethertype {
        0x0800 => "IPv4",
        0x0806 => "ARP",
        0x86dd => "IPv6",
        _ => "Unknown",
    }
}

pub(crate) fn dispatch_ethertype(pkt: &mut PktBuf<'_>, ethertype: u16) {
    match ethertype {
        0x0800 => pkt.set_next(&v4::IPV4),
        0x0806 => pkt.set_next(&arp::ARP),
        0x86dd => pkt.set_next(&v6::IPV6),
        _ => {}
    }
}

impl Stage for EthStage {
    fn name(&self) -> &'static str {
        "eth"
    }

    fn step(&self, pkt: &mut PktBuf<'_>, mode: PrintMode, out: &mut String) {
        let Some(hdr) = pkt.pull(14) else { return };
        let dst = format_mac(&hdr[0..6]);
        let src = format_mac(&hdr[6..12]);
        let ethertype = u16::from_be_bytes([hdr[12], hdr[13]]);

        if mode.contains(PrintMode::NORMAL) {
            let _ = writeln!(
                out,
                " [ Eth MAC ({src} => {dst}), Proto (0x{ethertype:04x}, {}) ]",
                ethertype_name(ethertype)
            );
        } else {
            let _ = write!(out, "{src} => {dst} ");
        }

        dispatch_ethertype(pkt, ethertype);
    }
}
