use crate::dissect::{PktBuf, PrintMode, Stage};
use std::fmt::Write;

pub static TCP: TcpStage = TcpStage;

pub struct TcpStage;

const FLAG_NAMES: [(u8, &str); 6] = [
    (0x01, "FIN"),
    (0x02, "SYN"),
    (0x04, "RST"),
    (0x08, "PSH"),
    (0x10, "ACK"),
    (0x20, "URG"),
];

impl Stage for TcpStage {
    fn name(&self) -> &'static str {
        "tcp"
    }

    fn step(&self, pkt: &mut PktBuf<'_>, mode: PrintMode, out: &mut String) {
        let Some(hdr) = pkt.pull(20) else { return };
        let sport = u16::from_be_bytes([hdr[0], hdr[1]]);
        let dport = u16::from_be_bytes([hdr[2], hdr[3]]);
        let seq = u32::from_be_bytes([hdr[4], hdr[5], hdr[6], hdr[7]]);
        let ack = u32::from_be_bytes([hdr[8], hdr[9], hdr[10], hdr[11]]);
        let data_off = (hdr[12] >> 4) as usize * 4;
        let flags = hdr[13];
        let window = u16::from_be_bytes([hdr[14], hdr[15]]);

        if data_off > 20 && pkt.pull(data_off - 20).is_none() {
            return;
        }

        if mode.contains(PrintMode::NORMAL) {
            let mut names = Vec::new();
            for (bit, name) in FLAG_NAMES {
                if flags & bit != 0 {
                    names.push(name);
                }
            }
            let _ = writeln!(
                out,
                " [ TCP Port ({sport} => {dport}), SN (0x{seq:08x}), AN (0x{ack:08x}), Flags ({}), Window ({window}) ]",
                names.join(" ")
            );
        } else {
            let _ = write!(out, "{sport} => {dport} ");
        }
    }
}
