use crate::dissect::{PktBuf, PrintMode, Stage};
use std::fmt::Write;
use std::net::Ipv4Addr;

pub static ARP: ArpStage = ArpStage;

pub struct ArpStage;

impl Stage for ArpStage {
    fn name(&self) -> &'static str {
        "arp"
    }

    fn step(&self, pkt: &mut PktBuf<'_>, mode: PrintMode, out: &mut String) {
        let Some(htype) = pkt.pull_u16_be() else { return };
        let Some(ptype) = pkt.pull_u16_be() else { return };
        let Some(hlen) = pkt.pull_u8() else { return };
        let Some(plen) = pkt.pull_u8() else { return };
        let Some(oper) = pkt.pull_u16_be() else { return };

        let op = match oper {
            1 => "request",
            2 => "reply",
            _ => "unknown",
        };

        if mode.contains(PrintMode::NORMAL) {
            let _ = write!(
                out,
                " [ ARP Format (0x{htype:04x}), Proto (0x{ptype:04x}), Op ({op})"
            );
            // Sender/target addresses only for the Ethernet/IPv4 shape.
            if hlen == 6 && plen == 4 {
                if let (Some(_sha), Some(spa), Some(_tha), Some(tpa)) =
                    (pkt.pull(6), pkt.pull(4), pkt.pull(6), pkt.pull(4))
                {
                    let spa = Ipv4Addr::new(spa[0], spa[1], spa[2], spa[3]);
                    let tpa = Ipv4Addr::new(tpa[0], tpa[1], tpa[2], tpa[3]);
                    let _ = write!(out, ", Addr ({spa} => {tpa})");
                }
            }
            let _ = writeln!(out, " ]");
        } else {
            let _ = write!(out, "ARP {op} ");
        }
    }
}
