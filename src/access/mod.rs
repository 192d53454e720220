/*! File-access strategies.

The codec does not touch the descriptor itself; it drives one of three
interchangeable byte-moving strategies. The strategies differ only in how
bytes get on and off the disk — per-record `read`/`write`, vectored
writes, or a memory mapping — and never look inside what they move.
*/

mod mmap;
mod plain;
mod sg;

pub use self::mmap::MmapAccess;
pub use self::plain::PlainAccess;
pub use self::sg::ScatterGatherAccess;

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use tracing::warn;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Kind {
    Plain,
    ScatterGather,
    Mmap,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    Read,
    Write,
}

pub fn new(kind: Kind) -> Box<dyn Access> {
    match kind {
        Kind::Plain => Box::new(PlainAccess),
        Kind::ScatterGather => Box::new(ScatterGatherAccess),
        Kind::Mmap => Box::new(MmapAccess::new()),
    }
}

/// The operation table every strategy implements. All semantic validation
/// (header contents, length accounting, filters) stays with the codec.
pub trait Access: Send {
    /// One-time setup after the descriptor is acquired.
    fn init_once(&mut self, enforce_prio: bool) {
        if enforce_prio {
            raise_priority();
        }
    }

    /// Hook invoked after the file header has been read or written.
    fn prepare_access(&mut self, _file: &File, _mode: Mode, _jumbo: bool) -> io::Result<()> {
        Ok(())
    }

    /// Fill `buf` completely. `Ok(false)` means end-of-stream: either no
    /// bytes were available at all or the stream ended mid-chunk.
    fn read_chunk(&mut self, file: &mut File, buf: &mut [u8]) -> io::Result<bool>;

    /// Discard `n` bytes from the stream.
    fn skip(&mut self, file: &mut File, n: usize) -> io::Result<()>;

    /// Push one record (header and payload) and report how many bytes went
    /// out. The file header is pushed through this too, with an empty
    /// payload.
    fn write_record(&mut self, file: &mut File, hdr: &[u8], payload: &[u8]) -> io::Result<usize>;

    /// Hook invoked just before the descriptor is released.
    fn prepare_close(&mut self, _file: &File, _mode: Mode) -> io::Result<()> {
        Ok(())
    }

    /// Flush everything to stable storage.
    fn sync(&mut self, file: &File) -> io::Result<()> {
        file.sync_all()
    }
}

fn raise_priority() {
    let ret = unsafe { libc::setpriority(libc::PRIO_PROCESS as _, 0, -20) };
    if ret != 0 {
        warn!("Cannot raise process priority: {}", io::Error::last_os_error());
    }
}

/// Shared `read`-loop chunk filler for the non-mapped strategies.
pub(crate) fn read_full(file: &mut File, buf: &mut [u8]) -> io::Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..]) {
            Ok(0) => return Ok(false),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}

/// Shared skip: seek when the descriptor supports it, otherwise drain.
pub(crate) fn skip_bytes(file: &mut File, n: usize) -> io::Result<()> {
    if file.seek(SeekFrom::Current(n as i64)).is_ok() {
        return Ok(());
    }
    // Pipes can't seek; read the bytes away instead.
    let mut scratch = [0u8; 4096];
    let mut left = n;
    while left > 0 {
        let take = left.min(scratch.len());
        match file.read(&mut scratch[..take]) {
            Ok(0) => return Ok(()),
            Ok(m) => left -= m,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
