use crate::magic::Endianness;
use crate::record::plain::{PlainRecord, PLAIN_RECORD_LEN};
use bytes::{Buf, BufMut};

/// On-disk size of the link-layer sidecar.
pub const SIDECAR_LEN: usize = 16;

/// On-disk size of a `*_LL` record header (plain header plus sidecar).
pub const LL_RECORD_LEN: usize = PLAIN_RECORD_LEN + SIDECAR_LEN;

/// The 16-byte link-layer sidecar appended to `*_LL` record headers.
///
/// It carries the cooked-capture metadata that SLL and netlink frames have
/// no room for in their own framing. Every field is serialized big-endian
/// (network order) no matter which byte order the rest of the file uses.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct LlSidecar {
    /// Packet direction/class (PACKET_HOST, PACKET_OUTGOING, ...).
    pub pkttype: u16,
    /// ARPHRD_* hardware type of the capturing interface.
    pub hatype: u16,
    /// Number of meaningful octets in `addr`.
    pub halen: u16,
    /// Hardware address, zero-padded.
    pub addr: [u8; 8],
    /// EtherType-style protocol of the payload.
    pub protocol: u16,
}

impl LlSidecar {
    pub(crate) fn parse<T: Buf>(buf: &mut T) -> LlSidecar {
        let pkttype = buf.get_u16();
        let hatype = buf.get_u16();
        let halen = buf.get_u16();
        let mut addr = [0; 8];
        buf.copy_to_slice(&mut addr);
        let protocol = buf.get_u16();
        LlSidecar {
            pkttype,
            hatype,
            halen,
            addr,
            protocol,
        }
    }

    pub(crate) fn encode<T: BufMut>(&self, buf: &mut T) {
        buf.put_u16(self.pkttype);
        buf.put_u16(self.hatype);
        buf.put_u16(self.halen);
        buf.put_slice(&self.addr);
        buf.put_u16(self.protocol);
    }
}

/// A DEFAULT/NSEC record header carrying the link-layer sidecar.
///
/// The plain header's `caplen` and `len` fields include the sidecar's 16
/// bytes; accessors on [`RecordHeader`](crate::record::RecordHeader) report
/// the sidecar-exclusive values that callers actually care about.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct LlRecord {
    pub plain: PlainRecord,
    pub ll: LlSidecar,
}

impl LlRecord {
    pub(crate) fn parse<T: Buf>(buf: &mut T, endianness: Endianness) -> LlRecord {
        let plain = PlainRecord::parse(buf, endianness);
        let ll = LlSidecar::parse(buf);
        LlRecord { plain, ll }
    }

    pub(crate) fn encode<T: BufMut>(&self, buf: &mut T, endianness: Endianness) {
        self.plain.encode(buf, endianness);
        self.ll.encode(buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidecar_is_big_endian_regardless_of_file_order() {
        let rec = LlRecord {
            plain: PlainRecord {
                ts_sec: 1,
                ts_frac: 2,
                caplen: 48,
                len: 48,
            },
            ll: LlSidecar {
                pkttype: 0x0004,
                hatype: 0x0001,
                halen: 6,
                addr: [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff, 0, 0],
                protocol: 0x0800,
            },
        };
        for endianness in [Endianness::Big, Endianness::Little] {
            let mut bytes = Vec::new();
            rec.encode(&mut bytes, endianness);
            assert_eq!(bytes.len(), LL_RECORD_LEN);
            // The sidecar occupies the last 16 bytes and never swaps.
            assert_eq!(&bytes[16..22], [0x00, 0x04, 0x00, 0x01, 0x00, 0x06]);
            assert_eq!(&bytes[30..32], [0x08, 0x00]);
            let back = LlRecord::parse(&mut bytes.as_slice(), endianness);
            assert_eq!(back, rec);
        }
    }
}
