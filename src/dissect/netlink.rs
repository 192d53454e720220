use crate::dissect::{PktBuf, PrintMode, Stage};
use std::fmt::Write;

pub static NETLINK: NetlinkStage = NetlinkStage;

/// Netlink message header. Netlink is a host-order protocol and Linux
/// captures come off little-endian machines in practice, so fields are
/// decoded little-endian.
pub struct NetlinkStage;

impl Stage for NetlinkStage {
    fn name(&self) -> &'static str {
        "netlink"
    }

    fn step(&self, pkt: &mut PktBuf<'_>, mode: PrintMode, out: &mut String) {
        let Some(len) = pkt.pull_u32_le() else { return };
        let Some(ty) = pkt.pull_u16_le() else { return };
        let Some(flags) = pkt.pull_u16_le() else { return };
        let Some(seq) = pkt.pull_u32_le() else { return };
        let Some(pid) = pkt.pull_u32_le() else { return };

        if mode.contains(PrintMode::NORMAL) {
            let _ = writeln!(
                out,
                " [ Netlink Len ({len}), Type ({ty}), Flags (0x{flags:04x}), Seq ({seq}), PID ({pid}) ]"
            );
        } else {
            let _ = write!(out, "Netlink {ty} ");
        }
    }
}
