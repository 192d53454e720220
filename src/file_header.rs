//! The fixed 24-byte header at the front of every capture file.

use crate::error::{Error, Result};
use crate::link_type::LinkType;
use crate::magic::Format;
use crate::record::util::*;
use bytes::Buf;

/// On-disk size of the file header.
pub const FILE_HEADER_LEN: usize = 24;

/// Version carried by every valid file, in the file's own byte order.
const VERSION_MAJOR: u16 = 2;
const VERSION_MINOR: u16 = 4;

/// Default snapshot length for newly written files.
pub const DEFAULT_SNAPLEN: u32 = 65535;

/// The decoded file header: magic (as a [`Format`]), timezone offset,
/// snapshot length and link type. The version is validated on read and
/// fixed at 2.4 on write, so it is not stored.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FileHeader {
    pub format: Format,
    pub thiszone: i32,
    pub sigfigs: u32,
    pub snaplen: u32,
    pub link_type: LinkType,
}

impl FileHeader {
    pub fn new(format: Format, link_type: LinkType) -> FileHeader {
        FileHeader {
            format: format.promote_for(link_type),
            thiszone: 0,
            sigfigs: 0,
            snaplen: DEFAULT_SNAPLEN,
            link_type,
        }
    }

    /// Decode and validate a header. A bad magic, a version other than 2.4
    /// or an unsupported link type each reject the whole file. A DEFAULT or
    /// NSEC file whose link type carries a sidecar is promoted to the
    /// matching `*_LL` format.
    pub fn parse(bytes: &[u8; FILE_HEADER_LEN]) -> Result<FileHeader> {
        let mut buf = &bytes[..];
        let magic = buf.get_u32_ne();
        let format = Format::from_magic(magic)?;
        let endianness = format.endianness;

        let version_major = read_u16(&mut buf, endianness);
        let version_minor = read_u16(&mut buf, endianness);
        if (version_major, version_minor) != (VERSION_MAJOR, VERSION_MINOR) {
            return Err(Error::BadVersion(version_major, version_minor));
        }

        let thiszone = read_i32(&mut buf, endianness);
        let sigfigs = read_u32(&mut buf, endianness);
        let snaplen = read_u32(&mut buf, endianness);
        let raw_link_type = read_u32(&mut buf, endianness);
        let link_type = LinkType::from_u32(raw_link_type);
        if !link_type.is_supported() {
            return Err(Error::UnsupportedLinkType(raw_link_type));
        }

        Ok(FileHeader {
            format: format.promote_for(link_type),
            thiszone,
            sigfigs,
            snaplen,
            link_type,
        })
    }

    /// Serialize, demoting any internal `*_LL` format back to the public
    /// magic it stands in for.
    pub fn encode(&self) -> [u8; FILE_HEADER_LEN] {
        let format = self.format.demote();
        let endianness = format.endianness;
        let mut bytes = Vec::with_capacity(FILE_HEADER_LEN);
        put_u32(&mut bytes, endianness, format.dialect.magic());
        put_u16(&mut bytes, endianness, VERSION_MAJOR);
        put_u16(&mut bytes, endianness, VERSION_MINOR);
        put_i32(&mut bytes, endianness, self.thiszone);
        put_u32(&mut bytes, endianness, self.sigfigs);
        put_u32(&mut bytes, endianness, self.snaplen);
        put_u32(&mut bytes, endianness, self.link_type.as_u32());
        bytes.try_into().expect("file header is 24 bytes")
    }
}
