use crate::dissect::{PktBuf, PrintMode, Stage};
use std::fmt::Write;

pub static UDP: UdpStage = UdpStage;

pub struct UdpStage;

impl Stage for UdpStage {
    fn name(&self) -> &'static str {
        "udp"
    }

    fn step(&self, pkt: &mut PktBuf<'_>, mode: PrintMode, out: &mut String) {
        let Some(hdr) = pkt.pull(8) else { return };
        let sport = u16::from_be_bytes([hdr[0], hdr[1]]);
        let dport = u16::from_be_bytes([hdr[2], hdr[3]]);
        let len = u16::from_be_bytes([hdr[4], hdr[5]]);

        if mode.contains(PrintMode::NORMAL) {
            let _ = writeln!(out, " [ UDP Port ({sport} => {dport}), Len ({len}) ]");
        } else {
            let _ = write!(out, "{sport} => {dport} ");
        }
    }
}
