use crate::magic::Endianness;
use crate::record::util::*;
use bytes::{Buf, BufMut};

/// On-disk size of the DEFAULT/NSEC record header.
pub const PLAIN_RECORD_LEN: usize = 16;

/// The 16-byte record header shared by the DEFAULT and NSEC dialects.
///
/// The fractional timestamp field holds microseconds under DEFAULT and
/// nanoseconds under NSEC; the layout is identical, so the unit lives in
/// the session's [`Dialect`](crate::Dialect), not here.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct PlainRecord {
    /// Seconds since 1970-01-01 00:00:00 UTC.
    pub ts_sec: u32,
    /// Sub-second part of the timestamp, in the dialect's unit.
    pub ts_frac: u32,
    /// Number of octets of packet data stored in the file for this record.
    pub caplen: u32,
    /// Length of the packet as it appeared on the wire; can exceed `caplen`
    /// if the capture was truncated to a snapshot length.
    pub len: u32,
}

impl PlainRecord {
    pub(crate) fn parse<T: Buf>(buf: &mut T, endianness: Endianness) -> PlainRecord {
        PlainRecord {
            ts_sec: read_u32(buf, endianness),
            ts_frac: read_u32(buf, endianness),
            caplen: read_u32(buf, endianness),
            len: read_u32(buf, endianness),
        }
    }

    pub(crate) fn encode<T: BufMut>(&self, buf: &mut T, endianness: Endianness) {
        put_u32(buf, endianness, self.ts_sec);
        put_u32(buf, endianness, self.ts_frac);
        put_u32(buf, endianness, self.caplen);
        put_u32(buf, endianness, self.len);
    }
}
