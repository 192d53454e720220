/*! The link-aware dissector pipeline.

A packet enters as a raw buffer plus its link type and (optionally) the
kernel sockaddr that came with it. The link type selects a pre-built chain
of protocol stages; each stage parses one layer, prints it, and names its
successor based on what it decoded — Ethernet hands an IPv4 payload to the
IPv4 stage, and so on. The driver never knows any protocol; it just runs
whatever stage the previous one chose, until none is chosen.
*/

mod arp;
mod dump;
mod eth;
mod ieee80211;
mod netlink;
mod none;
mod pkt;
mod sll;
mod tcp;
mod udp;
mod v4;
mod v6;

pub use self::dump::{ascii_dump, hex_dump};
pub use self::pkt::PktBuf;

use crate::link_type::LinkType;
use crate::ring::SockAddrLl;
use bitflags::bitflags;
use std::io::{self, Write};
use tracing::trace;

bitflags! {
    /// What the pipeline should emit for each packet. Empty means "nothing
    /// at all" and short-circuits before any work is done.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct PrintMode: u32 {
        /// Full per-layer lines.
        const NORMAL = 1 << 0;
        /// Compact one-token-per-layer output.
        const LESS = 1 << 1;
        /// Preserve the untouched cursor so HEX/ASCII dump the whole frame.
        const HEADERS = 1 << 2;
        /// Append a hex dump.
        const HEX = 1 << 3;
        /// Append an ASCII dump.
        const ASCII = 1 << 4;
    }
}

/// One protocol layer in a chain.
///
/// `step` parses the layer off the cursor, emits output according to the
/// mode, and writes the next stage (if any) into the cursor's `next` slot.
/// Stages are stateless statics; chains are fixed at compile time and the
/// per-packet state all lives in the cursor.
pub trait Stage: Sync {
    fn name(&self) -> &'static str;
    fn step(&self, pkt: &mut PktBuf<'_>, mode: PrintMode, out: &mut String);
}

/// Select the chain (entry and exit stage) for a link type. Unsupported
/// link types get the no-op pair and produce no output.
pub fn chain_for(link_type: LinkType) -> (Option<&'static dyn Stage>, Option<&'static dyn Stage>) {
    match link_type {
        LinkType::EN10MB => (Some(&eth::ETHERNET), Some(&none::NEWLINE)),
        LinkType::IEEE802_11 | LinkType::IEEE802_11_RADIOTAP => {
            (Some(&ieee80211::IEEE80211), Some(&none::NEWLINE))
        }
        LinkType::LINUX_SLL => (Some(&sll::SLL), Some(&none::NEWLINE)),
        LinkType::NETLINK => (Some(&netlink::NETLINK), Some(&none::NEWLINE)),
        _ => (Some(&none::NONE), None),
    }
}

/// Run the chain: execute whatever stage is queued in the cursor, clearing
/// the slot first so a stage that sets nothing terminates the walk. The
/// exit stage runs once at the end regardless of how the walk stopped.
fn drive(
    pkt: &mut PktBuf<'_>,
    start: Option<&'static dyn Stage>,
    end: Option<&'static dyn Stage>,
    mode: PrintMode,
    out: &mut String,
) {
    let Some(start) = start else { return };
    if !mode.intersects(PrintMode::NORMAL | PrintMode::LESS) {
        return;
    }
    pkt.next = Some(start);
    while let Some(stage) = pkt.next.take() {
        trace!("Running the {} stage", stage.name());
        stage.step(pkt, mode, out);
    }
    if let Some(end) = end {
        end.step(pkt, mode, out);
    }
}

/// The pipeline entry point: dissect one packet and write the output.
///
/// With `HEADERS` set, the hex/ascii dumps see the frame exactly as it
/// arrived; without it they see whatever the chain left unconsumed. The
/// output is buffered per packet and flushed before returning, so packet
/// *n* is fully emitted before *n+1* starts.
pub fn dissect(
    packet: &[u8],
    link_type: LinkType,
    mode: PrintMode,
    sll: Option<&SockAddrLl>,
    out: &mut dyn Write,
) -> io::Result<()> {
    if mode.is_empty() {
        return Ok(());
    }

    let mut pkt = PktBuf::new(packet, link_type, sll);
    let (start, end) = chain_for(link_type);
    let orig = if mode.contains(PrintMode::HEADERS) {
        Some(pkt.clone())
    } else {
        None
    };

    let mut line = String::new();
    drive(&mut pkt, start, end, mode, &mut line);

    let dump_view = orig.unwrap_or_else(|| pkt.clone());
    if mode.contains(PrintMode::HEX) {
        hex_dump(dump_view.remaining_bytes(), &mut line);
    }
    if mode.contains(PrintMode::ASCII) {
        ascii_dump(dump_view.remaining_bytes(), &mut line);
    }

    out.write_all(line.as_bytes())?;
    out.flush()
}

/// A configured pipeline: the print mode is set once (at startup or on a
/// mode change) and applies to every chain and every packet until changed.
pub struct Dissector {
    mode: PrintMode,
}

impl Dissector {
    pub fn new(mode: PrintMode) -> Dissector {
        Dissector { mode }
    }

    /// Switch every chain to the new mode in one go.
    pub fn set_print_mode(&mut self, mode: PrintMode) {
        self.mode = mode;
    }

    pub fn print_mode(&self) -> PrintMode {
        self.mode
    }

    pub fn run(
        &self,
        packet: &[u8],
        link_type: LinkType,
        sll: Option<&SockAddrLl>,
        out: &mut dyn Write,
    ) -> io::Result<()> {
        dissect(packet, link_type, self.mode, sll, out)
    }
}

pub(crate) fn format_mac(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}
