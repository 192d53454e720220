use crate::magic::Endianness;
use crate::record::util::*;
use bytes::{Buf, BufMut};

/// On-disk size of the KUZNETZOV record header. The layout only needs 23
/// bytes, but the original wrote the whole C struct and so carried one
/// trailing pad byte; the pad is preserved for compatibility.
pub const KUZNETZOV_RECORD_LEN: usize = 24;

/// Alexey Kuznetzov's extended record header: the classic microsecond
/// header plus the capturing interface's index, the payload protocol and
/// the packet direction.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct KuznetzovRecord {
    pub ts_sec: u32,
    pub ts_usec: u32,
    pub caplen: u32,
    pub len: u32,
    pub ifindex: u32,
    pub protocol: u16,
    pub pkttype: u8,
}

impl KuznetzovRecord {
    pub(crate) fn parse<T: Buf>(buf: &mut T, endianness: Endianness) -> KuznetzovRecord {
        let rec = KuznetzovRecord {
            ts_sec: read_u32(buf, endianness),
            ts_usec: read_u32(buf, endianness),
            caplen: read_u32(buf, endianness),
            len: read_u32(buf, endianness),
            ifindex: read_u32(buf, endianness),
            protocol: read_u16(buf, endianness),
            pkttype: buf.get_u8(),
        };
        buf.advance(1); // pad
        rec
    }

    pub(crate) fn encode<T: BufMut>(&self, buf: &mut T, endianness: Endianness) {
        put_u32(buf, endianness, self.ts_sec);
        put_u32(buf, endianness, self.ts_usec);
        put_u32(buf, endianness, self.caplen);
        put_u32(buf, endianness, self.len);
        put_u32(buf, endianness, self.ifindex);
        put_u16(buf, endianness, self.protocol);
        buf.put_u8(self.pkttype);
        buf.put_u8(0); // pad
    }
}
