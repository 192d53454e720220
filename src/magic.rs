//! Capture-file dialects and the magic numbers that select them.

use crate::error::{Error, Result};
use crate::link_type::LinkType;

/// The classic tcpdump magic: microsecond timestamps.
pub const TCPDUMP_MAGIC: u32 = 0xa1b2_c3d4;
/// Nanosecond-timestamp variant of the classic magic.
pub const NSEC_TCPDUMP_MAGIC: u32 = 0xa1b2_3c4d;
/// Internal marker for the microsecond layout with a link-layer sidecar.
/// Never written to disk; files carry [`TCPDUMP_MAGIC`] instead.
pub const TCPDUMP_MAGIC_LL: u32 = 0xb1b2_c3d4;
/// Internal marker for the nanosecond layout with a link-layer sidecar.
pub const NSEC_TCPDUMP_MAGIC_LL: u32 = 0xb1b2_3c4d;
/// Alexey Kuznetzov's extended pcap: ifindex, protocol and packet type.
pub const KUZNETZOV_TCPDUMP_MAGIC: u32 = 0xa1b2_cd34;
/// The netsniff-ng extended pcap: nanosecond timestamps plus timestamp
/// source, ifindex, protocol, hardware type and packet type.
pub const BORKMANN_TCPDUMP_MAGIC: u32 = 0xa1e2_cb12;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Endianness {
    Big,
    Little,
}

impl Endianness {
    pub fn native() -> Endianness {
        if cfg!(target_endian = "big") {
            Endianness::Big
        } else {
            Endianness::Little
        }
    }

    pub fn swapped(self) -> Endianness {
        match self {
            Endianness::Big => Endianness::Little,
            Endianness::Little => Endianness::Big,
        }
    }

    pub fn is_native(self) -> bool {
        self == Endianness::native()
    }
}

/// The six per-record header layouts.
///
/// The `*Ll` dialects exist only inside a session: a DEFAULT or NSEC file
/// whose declared link type carries a link-layer sidecar (SLL, netlink) is
/// promoted on read and demoted again on write.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Dialect {
    Default,
    Nsec,
    DefaultLl,
    NsecLl,
    Kuznetzov,
    Borkmann,
}

impl Dialect {
    /// The magic identifying this dialect, including the internal `*_LL`
    /// markers.
    pub fn magic(self) -> u32 {
        match self {
            Dialect::Default => TCPDUMP_MAGIC,
            Dialect::Nsec => NSEC_TCPDUMP_MAGIC,
            Dialect::DefaultLl => TCPDUMP_MAGIC_LL,
            Dialect::NsecLl => NSEC_TCPDUMP_MAGIC_LL,
            Dialect::Kuznetzov => KUZNETZOV_TCPDUMP_MAGIC,
            Dialect::Borkmann => BORKMANN_TCPDUMP_MAGIC,
        }
    }

    /// Whether record timestamps carry nanoseconds rather than microseconds.
    pub fn nanosecond_ts(self) -> bool {
        matches!(self, Dialect::Nsec | Dialect::NsecLl | Dialect::Borkmann)
    }

    /// Whether records carry the 16-byte link-layer sidecar.
    pub fn has_sidecar(self) -> bool {
        matches!(self, Dialect::DefaultLl | Dialect::NsecLl)
    }
}

/// A capture file's on-disk format: which header layout records use, and
/// which byte order every multi-byte field is stored in.
///
/// The byte order is decoded exactly once, from the file magic; it is a
/// property of the whole session, not of individual values.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Format {
    pub dialect: Dialect,
    pub endianness: Endianness,
}

impl Format {
    pub fn new(dialect: Dialect, endianness: Endianness) -> Format {
        Format {
            dialect,
            endianness,
        }
    }

    /// Decode a magic number read from disk in the host's byte order.
    ///
    /// The internal `*_LL` markers are not valid on disk and are rejected
    /// like any unknown magic.
    pub fn from_magic(magic: u32) -> Result<Format> {
        let native = Endianness::native();
        let dialect = |m| match m {
            TCPDUMP_MAGIC => Some(Dialect::Default),
            NSEC_TCPDUMP_MAGIC => Some(Dialect::Nsec),
            KUZNETZOV_TCPDUMP_MAGIC => Some(Dialect::Kuznetzov),
            BORKMANN_TCPDUMP_MAGIC => Some(Dialect::Borkmann),
            _ => None,
        };
        if let Some(d) = dialect(magic) {
            Ok(Format::new(d, native))
        } else if let Some(d) = dialect(magic.swap_bytes()) {
            Ok(Format::new(d, native.swapped()))
        } else {
            Err(Error::UnsupportedMagic(magic))
        }
    }

    /// Switch to the `*_LL` twin when the link type carries a sidecar.
    pub fn promote_for(self, link_type: LinkType) -> Format {
        if !link_type.has_ll_sidecar() {
            return self;
        }
        let dialect = match self.dialect {
            Dialect::Default => Dialect::DefaultLl,
            Dialect::Nsec => Dialect::NsecLl,
            d => d,
        };
        Format { dialect, ..self }
    }

    /// Undo [`promote_for`](Self::promote_for); this is the format that
    /// actually goes on disk.
    pub fn demote(self) -> Format {
        let dialect = match self.dialect {
            Dialect::DefaultLl => Dialect::Default,
            Dialect::NsecLl => Dialect::Nsec,
            d => d,
        };
        Format { dialect, ..self }
    }
}

impl Default for Format {
    fn default() -> Format {
        Format::new(Dialect::Default, Endianness::native())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_decodes_both_byte_orders() {
        let native = Endianness::native();
        let f = Format::from_magic(TCPDUMP_MAGIC).unwrap();
        assert_eq!(f.dialect, Dialect::Default);
        assert_eq!(f.endianness, native);

        let f = Format::from_magic(TCPDUMP_MAGIC.swap_bytes()).unwrap();
        assert_eq!(f.dialect, Dialect::Default);
        assert_eq!(f.endianness, native.swapped());

        let f = Format::from_magic(BORKMANN_TCPDUMP_MAGIC.swap_bytes()).unwrap();
        assert_eq!(f.dialect, Dialect::Borkmann);
        assert_eq!(f.endianness, native.swapped());
    }

    #[test]
    fn internal_ll_magics_are_rejected_on_disk() {
        assert!(Format::from_magic(TCPDUMP_MAGIC_LL).is_err());
        assert!(Format::from_magic(NSEC_TCPDUMP_MAGIC_LL.swap_bytes()).is_err());
        assert!(Format::from_magic(0xdead_beef).is_err());
    }

    #[test]
    fn promotion_is_reversible_and_linktype_gated() {
        let f = Format::new(Dialect::Nsec, Endianness::Little);
        let p = f.promote_for(LinkType::LINUX_SLL);
        assert_eq!(p.dialect, Dialect::NsecLl);
        assert_eq!(p.demote(), f);

        // Ethernet has no sidecar, so nothing changes.
        assert_eq!(f.promote_for(LinkType::EN10MB), f);
        // Extended dialects are never promoted.
        let k = Format::new(Dialect::Kuznetzov, Endianness::Big);
        assert_eq!(k.promote_for(LinkType::NETLINK), k);
    }
}
