/*!

A toolkit for the classic tcpdump capture-file format and the machinery
around it.

From the [tcpdump.org][1] description of the format:

> The dumpfile starts with a global header, followed by zero or more
> records for each captured packet, looking like this:
>
> ```text
> Global Header | Packet Header | Packet Data | Packet Header | Packet Data | ...
> ```

That simple framing grew dialects over the years — microsecond and
nanosecond timestamps, Alexey Kuznetzov's extended headers, the
netsniff-ng extension carrying the kernel's whole view of a frame — each
with a byte-swapped twin, plus an inline "sidecar" for link types (Linux
cooked capture, netlink) whose real link-layer header never makes it into
the file. This crate reads and writes all of them bit-exactly, and carries
the pieces a capture tool wants around the codec:

* [`Session`]: the capture I/O session, over one of three byte-moving
  [`access`] strategies (plain read/write, vectored, memory-mapped).
* [`record`]: the six per-record header layouts and their length math.
* [`ring`]: converters between kernel TPACKET v2/v3 descriptors and any
  record-header dialect.
* [`dissect`]: a link-aware pipeline that walks a packet through a chain
  of protocol stages chosen by its link type.
* [`resolver`]: a background reverse-DNS worker, off the packet path.
* [`ui`]: an aligned-column table for curses-style or stdout screens.

[1]: https://www.tcpdump.org/manpages/pcap-savefile.5.txt

*/

pub mod access;
pub mod dissect;
mod error;
mod file_header;
mod link_type;
mod magic;
pub mod record;
pub mod resolver;
pub mod ring;
mod session;
pub mod ui;

pub use crate::access::{Kind, Mode};
pub use crate::error::{Error, Result};
pub use crate::file_header::{FileHeader, DEFAULT_SNAPLEN, FILE_HEADER_LEN};
pub use crate::link_type::LinkType;
pub use crate::magic::{
    Dialect, Endianness, Format, BORKMANN_TCPDUMP_MAGIC, KUZNETZOV_TCPDUMP_MAGIC,
    NSEC_TCPDUMP_MAGIC, TCPDUMP_MAGIC,
};
pub use crate::record::RecordHeader;
pub use crate::session::{Filter, Packet, Session};
