/*! Conversion between kernel packet-ring descriptors and record headers.

A capture socket's mmapped ring describes each frame with a TPACKET
descriptor plus a `sockaddr_ll`. Persisting a frame means translating that
pair into whichever record-header dialect the output file uses, and
replaying a file means translating back. The structs here are plain
native-order models of the kernel layouts; byte order only enters when a
record header is serialized.
*/

use crate::magic::Dialect;
use crate::record::{
    BorkmannRecord, KuznetzovRecord, LlRecord, LlSidecar, PlainRecord, RecordHeader, SIDECAR_LEN,
};

/// TPACKET status bits describing where the frame's timestamp came from.
pub const TP_STATUS_TS_SOFTWARE: u32 = 1 << 29;
pub const TP_STATUS_TS_SYS_HARDWARE: u32 = 1 << 30;
pub const TP_STATUS_TS_RAW_HARDWARE: u32 = 1 << 31;

/// Timestamp-source values recorded by the BORKMANN dialect.
pub const TSOURCE_SOFTWARE: u16 = 1;
pub const TSOURCE_SYS_HARDWARE: u16 = 2;
pub const TSOURCE_RAW_HARDWARE: u16 = 3;

/// The fields of a TPACKET_V2 frame descriptor this toolkit cares about.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct TPacket2Hdr {
    pub sec: u32,
    pub nsec: u32,
    pub snaplen: u32,
    pub len: u32,
    pub status: u32,
}

/// The TPACKET_V3 equivalent. v3 blocks carry no per-frame status word, so
/// conversions from it leave the timestamp source at zero.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct TPacket3Hdr {
    pub sec: u32,
    pub nsec: u32,
    pub snaplen: u32,
    pub len: u32,
}

/// The kernel's description of the interface a frame arrived on, in native
/// byte order.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct SockAddrLl {
    pub ifindex: i32,
    pub protocol: u16,
    pub hatype: u16,
    pub pkttype: u8,
    pub halen: u8,
    pub addr: [u8; 8],
}

/// Rank the status bits: raw hardware beats system hardware beats
/// software; no bit means unknown.
pub fn tsource_from_status(status: u32) -> u16 {
    if status & TP_STATUS_TS_RAW_HARDWARE != 0 {
        TSOURCE_RAW_HARDWARE
    } else if status & TP_STATUS_TS_SYS_HARDWARE != 0 {
        TSOURCE_SYS_HARDWARE
    } else if status & TP_STATUS_TS_SOFTWARE != 0 {
        TSOURCE_SOFTWARE
    } else {
        0
    }
}

impl LlSidecar {
    pub fn from_sockaddr(sll: &SockAddrLl) -> LlSidecar {
        LlSidecar {
            pkttype: sll.pkttype as u16,
            hatype: sll.hatype,
            halen: sll.halen as u16,
            addr: sll.addr,
            protocol: sll.protocol,
        }
    }

    pub fn to_sockaddr(&self, sll: &mut SockAddrLl) {
        sll.pkttype = self.pkttype as u8;
        sll.hatype = self.hatype;
        sll.halen = self.halen as u8;
        sll.addr = self.addr;
        sll.protocol = self.protocol;
    }
}

impl RecordHeader {
    /// Build a record header of the given dialect from a v2 descriptor.
    ///
    /// Microsecond dialects truncate the kernel's nanoseconds; `*_LL`
    /// dialects fold the sockaddr into the sidecar and grow `caplen`/`len`
    /// by its 16 bytes.
    pub fn from_tpacket2(thdr: &TPacket2Hdr, sll: &SockAddrLl, dialect: Dialect) -> RecordHeader {
        Self::from_ring(
            thdr.sec,
            thdr.nsec,
            thdr.snaplen,
            thdr.len,
            thdr.status,
            sll,
            dialect,
        )
    }

    /// Build a record header from a v3 descriptor. Identical to v2 except
    /// that no status word exists, so BORKMANN's tsource is zero.
    pub fn from_tpacket3(thdr: &TPacket3Hdr, sll: &SockAddrLl, dialect: Dialect) -> RecordHeader {
        Self::from_ring(thdr.sec, thdr.nsec, thdr.snaplen, thdr.len, 0, sll, dialect)
    }

    fn from_ring(
        sec: u32,
        nsec: u32,
        snaplen: u32,
        len: u32,
        status: u32,
        sll: &SockAddrLl,
        dialect: Dialect,
    ) -> RecordHeader {
        match dialect {
            Dialect::Default => RecordHeader::Default(PlainRecord {
                ts_sec: sec,
                ts_frac: nsec / 1000,
                caplen: snaplen,
                len,
            }),
            Dialect::Nsec => RecordHeader::Nsec(PlainRecord {
                ts_sec: sec,
                ts_frac: nsec,
                caplen: snaplen,
                len,
            }),
            Dialect::DefaultLl => RecordHeader::DefaultLl(LlRecord {
                plain: PlainRecord {
                    ts_sec: sec,
                    ts_frac: nsec / 1000,
                    caplen: snaplen + SIDECAR_LEN as u32,
                    len: len + SIDECAR_LEN as u32,
                },
                ll: LlSidecar::from_sockaddr(sll),
            }),
            Dialect::NsecLl => RecordHeader::NsecLl(LlRecord {
                plain: PlainRecord {
                    ts_sec: sec,
                    ts_frac: nsec,
                    caplen: snaplen + SIDECAR_LEN as u32,
                    len: len + SIDECAR_LEN as u32,
                },
                ll: LlSidecar::from_sockaddr(sll),
            }),
            Dialect::Kuznetzov => RecordHeader::Kuznetzov(KuznetzovRecord {
                ts_sec: sec,
                ts_usec: nsec / 1000,
                caplen: snaplen,
                len,
                ifindex: sll.ifindex as u32,
                protocol: sll.protocol,
                pkttype: sll.pkttype,
            }),
            Dialect::Borkmann => RecordHeader::Borkmann(BorkmannRecord {
                ts_sec: sec,
                ts_nsec: nsec,
                caplen: snaplen,
                len,
                tsource: tsource_from_status(status),
                ifindex: sll.ifindex as u16,
                protocol: sll.protocol,
                hatype: sll.hatype as u8,
                pkttype: sll.pkttype,
            }),
        }
    }

    /// Convert back into a v2 descriptor, reconstructing whatever part of
    /// the sockaddr this dialect preserved. Microsecond dialects scale
    /// their fraction back up to nanoseconds; `*_LL` dialects report the
    /// sidecar-exclusive lengths.
    pub fn to_tpacket2(&self, thdr: &mut TPacket2Hdr, sll: Option<&mut SockAddrLl>) {
        match self {
            RecordHeader::Default(x) => {
                thdr.sec = x.ts_sec;
                thdr.nsec = x.ts_frac * 1000;
                thdr.snaplen = x.caplen;
                thdr.len = x.len;
            }
            RecordHeader::Nsec(x) => {
                thdr.sec = x.ts_sec;
                thdr.nsec = x.ts_frac;
                thdr.snaplen = x.caplen;
                thdr.len = x.len;
            }
            RecordHeader::DefaultLl(x) => {
                thdr.sec = x.plain.ts_sec;
                thdr.nsec = x.plain.ts_frac * 1000;
                thdr.snaplen = x.plain.caplen.saturating_sub(SIDECAR_LEN as u32);
                thdr.len = x.plain.len.saturating_sub(SIDECAR_LEN as u32);
                if let Some(sll) = sll {
                    x.ll.to_sockaddr(sll);
                }
            }
            RecordHeader::NsecLl(x) => {
                thdr.sec = x.plain.ts_sec;
                thdr.nsec = x.plain.ts_frac;
                thdr.snaplen = x.plain.caplen.saturating_sub(SIDECAR_LEN as u32);
                thdr.len = x.plain.len.saturating_sub(SIDECAR_LEN as u32);
                if let Some(sll) = sll {
                    x.ll.to_sockaddr(sll);
                }
            }
            RecordHeader::Kuznetzov(x) => {
                thdr.sec = x.ts_sec;
                thdr.nsec = x.ts_usec * 1000;
                thdr.snaplen = x.caplen;
                thdr.len = x.len;
                if let Some(sll) = sll {
                    sll.ifindex = x.ifindex as i32;
                    sll.protocol = x.protocol;
                    sll.pkttype = x.pkttype;
                }
            }
            RecordHeader::Borkmann(x) => {
                thdr.sec = x.ts_sec;
                thdr.nsec = x.ts_nsec;
                thdr.snaplen = x.caplen;
                thdr.len = x.len;
                if let Some(sll) = sll {
                    sll.ifindex = x.ifindex as i32;
                    sll.protocol = x.protocol;
                    sll.hatype = x.hatype as u16;
                    sll.pkttype = x.pkttype;
                }
            }
        }
    }
}
