use crate::dissect::{PktBuf, PrintMode, Stage};
use crate::link_type::LinkType;
use std::fmt::Write;

pub static IEEE80211: Ieee80211Stage = Ieee80211Stage;

/// 802.11 MAC framing. Under the radiotap link type the radio metadata
/// header is skipped first; its length field says how much.
pub struct Ieee80211Stage;

fn type_name(ty: u8) -> &'static str {
    match ty {
        0 => "Management",
        1 => "Control",
        2 => "Data",
        _ => "Reserved",
    }
}

impl Stage for Ieee80211Stage {
    fn name(&self) -> &'static str {
        "802.11"
    }

    fn step(&self, pkt: &mut PktBuf<'_>, mode: PrintMode, out: &mut String) {
        if pkt.link_type == LinkType::IEEE802_11_RADIOTAP {
            // Radiotap: version(1), pad(1), len(2, little-endian), fields.
            let Some(_version) = pkt.pull_u8() else { return };
            let Some(_pad) = pkt.pull_u8() else { return };
            let Some(rt_len) = pkt.pull_u16_le() else { return };
            if rt_len < 4 || pkt.pull(rt_len as usize - 4).is_none() {
                return;
            }
        }

        // Frame control and duration are little-endian on the air.
        let Some(fc) = pkt.pull_u16_le() else { return };
        let Some(duration) = pkt.pull_u16_le() else { return };
        let version = (fc & 0x3) as u8;
        let ty = ((fc >> 2) & 0x3) as u8;
        let subtype = ((fc >> 4) & 0xf) as u8;

        if mode.contains(PrintMode::NORMAL) {
            let _ = writeln!(
                out,
                " [ 802.11 Frame Control (0x{fc:04x}), Proto ({version}), Type ({ty}, {}), Subtype ({subtype}), Duration ({duration}) ]",
                type_name(ty)
            );
        } else {
            let _ = write!(out, "802.11 {} ", type_name(ty));
        }
    }
}
