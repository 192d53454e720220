use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// An error that leaves the capture session unusable.
///
/// Per-record problems (zero-length or oversize records) are not errors;
/// they are counted by the session and the stream continues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Unsupported pcap magic number 0x{0:08x}")]
    UnsupportedMagic(u32),
    #[error("Invalid pcap version {0}.{1} (must be 2.4)")]
    BadVersion(u16, u16),
    #[error("Unsupported pcap link type {0}")]
    UnsupportedLinkType(u32),
    #[error("File ended in the middle of the file header")]
    TruncatedFileHeader,
    #[error("Short write: pushed {written} of {expected} bytes")]
    ShortWrite { expected: usize, written: usize },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
