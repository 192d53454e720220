use crate::magic::Endianness;
use crate::record::util::*;
use bytes::{Buf, BufMut};

/// On-disk size of the BORKMANN record header.
pub const BORKMANN_RECORD_LEN: usize = 24;

/// The netsniff-ng extended record header: nanosecond timestamps plus the
/// timestamp's provenance, the capturing interface and the kernel's view
/// of the frame (protocol, hardware type, packet direction).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct BorkmannRecord {
    pub ts_sec: u32,
    pub ts_nsec: u32,
    pub caplen: u32,
    pub len: u32,
    /// Where the timestamp came from; see [`crate::ring::tsource_from_status`].
    pub tsource: u16,
    pub ifindex: u16,
    pub protocol: u16,
    pub hatype: u8,
    pub pkttype: u8,
}

impl BorkmannRecord {
    pub(crate) fn parse<T: Buf>(buf: &mut T, endianness: Endianness) -> BorkmannRecord {
        BorkmannRecord {
            ts_sec: read_u32(buf, endianness),
            ts_nsec: read_u32(buf, endianness),
            caplen: read_u32(buf, endianness),
            len: read_u32(buf, endianness),
            tsource: read_u16(buf, endianness),
            ifindex: read_u16(buf, endianness),
            protocol: read_u16(buf, endianness),
            hatype: buf.get_u8(),
            pkttype: buf.get_u8(),
        }
    }

    pub(crate) fn encode<T: BufMut>(&self, buf: &mut T, endianness: Endianness) {
        put_u32(buf, endianness, self.ts_sec);
        put_u32(buf, endianness, self.ts_nsec);
        put_u32(buf, endianness, self.caplen);
        put_u32(buf, endianness, self.len);
        put_u16(buf, endianness, self.tsource);
        put_u16(buf, endianness, self.ifindex);
        put_u16(buf, endianness, self.protocol);
        buf.put_u8(self.hatype);
        buf.put_u8(self.pkttype);
    }
}
