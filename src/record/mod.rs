/*! Per-packet record headers.

A capture file is a 24-byte [file header](crate::FileHeader) followed by a
stream of records, each one a fixed-layout header and then the captured
bytes. Which header layout applies is decided once per file by the magic
number; see [`Dialect`](crate::Dialect). [`RecordHeader`] is the tagged sum
over the six layouts, with the byte-order handling routed through the
session's [`Format`](crate::Format) rather than duplicated per variant.
*/

mod borkmann;
mod kuznetzov;
mod ll;
mod plain;
pub(crate) mod util;

pub use self::borkmann::*;
pub use self::kuznetzov::*;
pub use self::ll::*;
pub use self::plain::*;

use crate::magic::{Dialect, Endianness};

/// Upper bound over every dialect's header length; handy for read buffers.
pub const MAX_RECORD_HEADER_LEN: usize = LL_RECORD_LEN;

/// One record's header, decoded to native byte order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RecordHeader {
    Default(PlainRecord),
    Nsec(PlainRecord),
    DefaultLl(LlRecord),
    NsecLl(LlRecord),
    Kuznetzov(KuznetzovRecord),
    Borkmann(BorkmannRecord),
}

impl Default for RecordHeader {
    fn default() -> RecordHeader {
        RecordHeader::Default(PlainRecord::default())
    }
}

impl RecordHeader {
    /// On-disk header length of the given dialect.
    pub fn header_len(dialect: Dialect) -> usize {
        match dialect {
            Dialect::Default | Dialect::Nsec => PLAIN_RECORD_LEN,
            Dialect::DefaultLl | Dialect::NsecLl => LL_RECORD_LEN,
            Dialect::Kuznetzov => KUZNETZOV_RECORD_LEN,
            Dialect::Borkmann => BORKMANN_RECORD_LEN,
        }
    }

    /// Decode a header from exactly [`header_len`](Self::header_len) bytes.
    pub fn parse(dialect: Dialect, endianness: Endianness, bytes: &[u8]) -> RecordHeader {
        debug_assert_eq!(bytes.len(), Self::header_len(dialect));
        let mut buf = bytes;
        match dialect {
            Dialect::Default => RecordHeader::Default(PlainRecord::parse(&mut buf, endianness)),
            Dialect::Nsec => RecordHeader::Nsec(PlainRecord::parse(&mut buf, endianness)),
            Dialect::DefaultLl => RecordHeader::DefaultLl(LlRecord::parse(&mut buf, endianness)),
            Dialect::NsecLl => RecordHeader::NsecLl(LlRecord::parse(&mut buf, endianness)),
            Dialect::Kuznetzov => {
                RecordHeader::Kuznetzov(KuznetzovRecord::parse(&mut buf, endianness))
            }
            Dialect::Borkmann => RecordHeader::Borkmann(BorkmannRecord::parse(&mut buf, endianness)),
        }
    }

    /// Serialize in the given byte order.
    pub fn encode_into(&self, endianness: Endianness, out: &mut Vec<u8>) {
        match self {
            RecordHeader::Default(x) | RecordHeader::Nsec(x) => x.encode(out, endianness),
            RecordHeader::DefaultLl(x) | RecordHeader::NsecLl(x) => x.encode(out, endianness),
            RecordHeader::Kuznetzov(x) => x.encode(out, endianness),
            RecordHeader::Borkmann(x) => x.encode(out, endianness),
        }
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            RecordHeader::Default(_) => Dialect::Default,
            RecordHeader::Nsec(_) => Dialect::Nsec,
            RecordHeader::DefaultLl(_) => Dialect::DefaultLl,
            RecordHeader::NsecLl(_) => Dialect::NsecLl,
            RecordHeader::Kuznetzov(_) => Dialect::Kuznetzov,
            RecordHeader::Borkmann(_) => Dialect::Borkmann,
        }
    }

    /// The `caplen` field exactly as stored on disk. For `*_LL` dialects
    /// this includes the 16-byte sidecar.
    pub fn on_disk_caplen(&self) -> u32 {
        match self {
            RecordHeader::Default(x) | RecordHeader::Nsec(x) => x.caplen,
            RecordHeader::DefaultLl(x) | RecordHeader::NsecLl(x) => x.plain.caplen,
            RecordHeader::Kuznetzov(x) => x.caplen,
            RecordHeader::Borkmann(x) => x.caplen,
        }
    }

    /// Number of packet-data bytes that follow the header on disk, which is
    /// also the capture length reported to dissectors. For `*_LL` dialects
    /// the sidecar bytes are excluded (a sidecar-only record counts as
    /// zero-length).
    pub fn payload_len(&self) -> u32 {
        match self {
            RecordHeader::DefaultLl(x) | RecordHeader::NsecLl(x) => {
                x.plain.caplen.saturating_sub(SIDECAR_LEN as u32)
            }
            _ => self.on_disk_caplen(),
        }
    }

    /// Clip the capture length to `n` payload bytes, keeping the `*_LL`
    /// sidecar accounting intact.
    pub fn set_payload_len(&mut self, n: u32) {
        match self {
            RecordHeader::Default(x) | RecordHeader::Nsec(x) => x.caplen = n,
            RecordHeader::DefaultLl(x) | RecordHeader::NsecLl(x) => {
                x.plain.caplen = n + SIDECAR_LEN as u32
            }
            RecordHeader::Kuznetzov(x) => x.caplen = n,
            RecordHeader::Borkmann(x) => x.caplen = n,
        }
    }

    /// The packet's length on the wire (the `len` field, minus the sidecar
    /// for `*_LL` dialects).
    pub fn wire_len(&self) -> u32 {
        match self {
            RecordHeader::Default(x) | RecordHeader::Nsec(x) => x.len,
            RecordHeader::DefaultLl(x) | RecordHeader::NsecLl(x) => {
                x.plain.len.saturating_sub(SIDECAR_LEN as u32)
            }
            RecordHeader::Kuznetzov(x) => x.len,
            RecordHeader::Borkmann(x) => x.len,
        }
    }

    /// Total on-disk size of the record: header plus payload.
    pub fn total_len(&self) -> u32 {
        Self::header_len(self.dialect()) as u32 + self.payload_len()
    }

    /// The record timestamp as (seconds, nanoseconds). Microsecond dialects
    /// report their fraction scaled up to nanoseconds.
    pub fn ts(&self) -> (u32, u32) {
        match self {
            RecordHeader::Default(x) => (x.ts_sec, x.ts_frac * 1000),
            RecordHeader::Nsec(x) => (x.ts_sec, x.ts_frac),
            RecordHeader::DefaultLl(x) => (x.plain.ts_sec, x.plain.ts_frac * 1000),
            RecordHeader::NsecLl(x) => (x.plain.ts_sec, x.plain.ts_frac),
            RecordHeader::Kuznetzov(x) => (x.ts_sec, x.ts_usec * 1000),
            RecordHeader::Borkmann(x) => (x.ts_sec, x.ts_nsec),
        }
    }

    pub fn sidecar(&self) -> Option<&LlSidecar> {
        match self {
            RecordHeader::DefaultLl(x) | RecordHeader::NsecLl(x) => Some(&x.ll),
            _ => None,
        }
    }
}

impl From<KuznetzovRecord> for RecordHeader {
    fn from(x: KuznetzovRecord) -> Self {
        RecordHeader::Kuznetzov(x)
    }
}
impl From<BorkmannRecord> for RecordHeader {
    fn from(x: BorkmannRecord) -> Self {
        RecordHeader::Borkmann(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> Vec<RecordHeader> {
        let plain = PlainRecord {
            ts_sec: 1_700_000_000,
            ts_frac: 123,
            caplen: 80,
            len: 120,
        };
        let ll = LlRecord {
            plain: PlainRecord {
                caplen: 80 + SIDECAR_LEN as u32,
                len: 120 + SIDECAR_LEN as u32,
                ..plain
            },
            ll: LlSidecar {
                pkttype: 4,
                hatype: 1,
                halen: 6,
                addr: [1, 2, 3, 4, 5, 6, 0, 0],
                protocol: 0x0800,
            },
        };
        vec![
            RecordHeader::Default(plain),
            RecordHeader::Nsec(plain),
            RecordHeader::DefaultLl(ll),
            RecordHeader::NsecLl(ll),
            RecordHeader::Kuznetzov(KuznetzovRecord {
                ts_sec: plain.ts_sec,
                ts_usec: plain.ts_frac,
                caplen: 80,
                len: 120,
                ifindex: 3,
                protocol: 0x0800,
                pkttype: 4,
            }),
            RecordHeader::Borkmann(BorkmannRecord {
                ts_sec: plain.ts_sec,
                ts_nsec: plain.ts_frac,
                caplen: 80,
                len: 120,
                tsource: 1,
                ifindex: 3,
                protocol: 0x0800,
                hatype: 1,
                pkttype: 4,
            }),
        ]
    }

    #[test]
    fn every_variant_round_trips_in_both_byte_orders() {
        for hdr in headers() {
            for endianness in [Endianness::Big, Endianness::Little] {
                let mut bytes = Vec::new();
                hdr.encode_into(endianness, &mut bytes);
                assert_eq!(bytes.len(), RecordHeader::header_len(hdr.dialect()));
                let back = RecordHeader::parse(hdr.dialect(), endianness, &bytes);
                assert_eq!(back, hdr);
            }
        }
    }

    #[test]
    fn total_is_header_plus_payload() {
        for hdr in headers() {
            let header_len = RecordHeader::header_len(hdr.dialect()) as u32;
            assert_eq!(hdr.total_len(), header_len + hdr.payload_len());
        }
    }

    #[test]
    fn ll_payload_excludes_the_sidecar() {
        for hdr in headers() {
            if hdr.dialect().has_sidecar() {
                assert_eq!(hdr.payload_len() + SIDECAR_LEN as u32, hdr.on_disk_caplen());
                assert_eq!(hdr.payload_len(), 80);
                assert_eq!(hdr.wire_len(), 120);
            } else {
                assert_eq!(hdr.payload_len(), hdr.on_disk_caplen());
            }
        }
    }

    #[test]
    fn clipping_keeps_sidecar_accounting() {
        for mut hdr in headers() {
            hdr.set_payload_len(16);
            assert_eq!(hdr.payload_len(), 16);
            if hdr.dialect().has_sidecar() {
                assert_eq!(hdr.on_disk_caplen(), 32);
            }
        }
    }

    #[test]
    fn sidecar_only_record_counts_as_empty() {
        let hdr = RecordHeader::DefaultLl(LlRecord {
            plain: PlainRecord {
                caplen: SIDECAR_LEN as u32,
                ..Default::default()
            },
            ll: LlSidecar::default(),
        });
        assert_eq!(hdr.payload_len(), 0);
    }
}
