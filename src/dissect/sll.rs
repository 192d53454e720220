use crate::dissect::{eth, format_mac, PktBuf, PrintMode, Stage};
use std::fmt::Write;

pub static SLL: SllStage = SllStage;

/// Linux cooked capture. When the session carries the kernel sockaddr
/// (live capture, or an `*_LL` file whose sidecar was reconstructed), the
/// metadata comes from there; otherwise the 16-byte cooked header is
/// parsed off the wire.
pub struct SllStage;

fn pkttype_name(pkttype: u16) -> &'static str {
    match pkttype {
        0 => "host",
        1 => "broadcast",
        2 => "multicast",
        3 => "otherhost",
        4 => "outgoing",
        _ => "unknown",
    }
}

impl Stage for SllStage {
    fn name(&self) -> &'static str {
        "sll"
    }

    fn step(&self, pkt: &mut PktBuf<'_>, mode: PrintMode, out: &mut String) {
        let (pkttype, hatype, halen, addr, protocol) = if let Some(sll) = pkt.sll {
            (
                sll.pkttype as u16,
                sll.hatype,
                sll.halen as usize,
                sll.addr,
                sll.protocol,
            )
        } else {
            let Some(pkttype) = pkt.pull_u16_be() else { return };
            let Some(hatype) = pkt.pull_u16_be() else { return };
            let Some(halen) = pkt.pull_u16_be() else { return };
            let Some(addr_bytes) = pkt.pull(8) else { return };
            let Some(protocol) = pkt.pull_u16_be() else { return };
            let mut addr = [0; 8];
            addr.copy_from_slice(addr_bytes);
            (pkttype, hatype, halen as usize, addr, protocol)
        };

        if mode.contains(PrintMode::NORMAL) {
            let _ = writeln!(
                out,
                " [ SLL Pkt Type ({pkttype}, {}), Hw Type ({hatype}), Addr ({}), Proto (0x{protocol:04x}, {}) ]",
                pkttype_name(pkttype),
                format_mac(&addr[..halen.min(8)]),
                eth::ethertype_name(protocol)
            );
        } else {
            let _ = write!(out, "SLL {} ", pkttype_name(pkttype));
        }

        eth::dispatch_ethertype(pkt, protocol);
    }
}
