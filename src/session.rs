/*! The capture I/O session: owns a descriptor, a strategy and a format,
and moves validated packets in and out of a capture file. */

use crate::access::{self, Access, Kind, Mode};
use crate::error::{Error, Result};
use crate::file_header::{FileHeader, DEFAULT_SNAPLEN, FILE_HEADER_LEN};
use crate::link_type::LinkType;
use crate::magic::Format;
use crate::record::{RecordHeader, MAX_RECORD_HEADER_LEN};
use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::{AsRawFd, FromRawFd};
use std::os::unix::fs::OpenOptionsExt;
use tracing::{debug, warn};

/// How many zero-length records in a row we tolerate before declaring the
/// stream dead. Without a bound a malformed file of nothing but zero-length
/// records would spin forever.
const MAX_ZERO_RECORDS: u32 = 16;

/// A packet filter: records whose captured bytes don't match are dropped
/// silently on read.
pub type Filter = Box<dyn Fn(&[u8]) -> bool + Send>;

/// One captured packet: its decoded record header and an owned capture
/// buffer. The buffer's size bounds how much of any record can be kept;
/// larger records are clipped.
pub struct Packet {
    pub header: RecordHeader,
    buf: Vec<u8>,
}

impl Packet {
    pub fn with_capacity(n: usize) -> Packet {
        Packet {
            header: RecordHeader::default(),
            buf: vec![0; n],
        }
    }

    /// The captured bytes, sidecar-exclusive.
    pub fn payload(&self) -> &[u8] {
        let n = (self.header.payload_len() as usize).min(self.buf.len());
        &self.buf[..n]
    }

    pub fn buf_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    pub fn buf_len(&self) -> usize {
        self.buf.len()
    }
}

/// A capture file session. Exclusive owner of its descriptor from `open`
/// until `close`.
pub struct Session {
    access: Box<dyn Access>,
    kind: Kind,
    mode: Mode,
    format: Format,
    link_type: LinkType,
    snaplen: u32,
    path: String,
    file: Option<File>,
    filter: Option<Filter>,
    jumbo: bool,
    enforce_prio: bool,
    truncated: u64,
}

impl Session {
    pub fn new(kind: Kind) -> Session {
        Session {
            access: access::new(kind),
            kind,
            mode: Mode::Read,
            format: Format::default(),
            link_type: LinkType::EN10MB,
            snaplen: DEFAULT_SNAPLEN,
            path: String::new(),
            file: None,
            filter: None,
            jumbo: false,
            enforce_prio: false,
            truncated: 0,
        }
    }

    /// Select the on-disk format for a session about to write. Re-applies
    /// the `*_LL` promotion for the current link type.
    pub fn set_format(&mut self, format: Format) {
        self.format = format.promote_for(self.link_type);
    }

    /// Select the link type for a session about to write, promoting the
    /// format when the link type carries a sidecar.
    pub fn set_link_type(&mut self, link_type: LinkType) {
        self.link_type = link_type;
        self.format = self.format.promote_for(link_type);
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = Some(filter);
    }

    pub fn set_jumbo(&mut self, jumbo: bool) {
        self.jumbo = jumbo;
    }

    pub fn set_enforce_prio(&mut self, enforce: bool) {
        self.enforce_prio = enforce;
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn link_type(&self) -> LinkType {
        self.link_type
    }

    pub fn snaplen(&self) -> u32 {
        self.snaplen
    }

    /// Records dropped or clipped so far because their declared length was
    /// unusable.
    pub fn truncated(&self) -> u64 {
        self.truncated
    }

    /// Copy the on-disk identity (format and link type) from another
    /// session, e.g. when rewriting a file that was just read.
    pub fn copy_header_from(&mut self, other: &Session) {
        self.format = other.format;
        self.link_type = other.link_type;
    }

    /// Acquire the descriptor. The path `"-"` takes over standard input
    /// (read mode) or standard output (write mode); since a pipe cannot be
    /// mapped, the mmap strategy silently downgrades to scatter-gather for
    /// such paths.
    pub fn open(&mut self, path: &str, mode: Mode) -> Result<()> {
        let file = if path == "-" {
            if self.kind == Kind::Mmap {
                debug!("mmap cannot back a pipe; downgrading to scatter-gather");
                self.kind = Kind::ScatterGather;
                self.access = access::new(self.kind);
            }
            let stdio = match mode {
                Mode::Read => libc::STDIN_FILENO,
                Mode::Write => libc::STDOUT_FILENO,
            };
            let fd = unsafe { libc::dup(stdio) };
            if fd < 0 {
                return Err(io::Error::last_os_error().into());
            }
            unsafe { libc::close(stdio) };
            unsafe { File::from_raw_fd(fd) }
        } else {
            match mode {
                Mode::Read => open_readonly(path)?,
                Mode::Write => OpenOptions::new()
                    .read(true)
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .custom_flags(libc::O_LARGEFILE)
                    .open(path)?,
            }
        };

        self.access.init_once(self.enforce_prio);
        self.path = path.to_string();
        self.mode = mode;
        self.file = Some(file);
        Ok(())
    }

    /// Pull and validate the 24-byte file header, stashing the format and
    /// link type (with `*_LL` promotion) for every subsequent record.
    pub fn read_file_header(&mut self) -> Result<()> {
        let file = self.file.as_mut().expect("session not open");
        let mut bytes = [0u8; FILE_HEADER_LEN];
        if !self.access.read_chunk(file, &mut bytes)? {
            return Err(Error::TruncatedFileHeader);
        }
        let hdr = FileHeader::parse(&bytes)?;
        self.format = hdr.format;
        self.link_type = hdr.link_type;
        self.snaplen = hdr.snaplen;
        self.prepare_access()
    }

    /// Push the 24-byte file header for the session's format and link
    /// type. Internal `*_LL` formats are demoted to their public magic.
    pub fn write_file_header(&mut self) -> Result<()> {
        let hdr = FileHeader::new(self.format, self.link_type);
        let bytes = hdr.encode();
        let file = self.file.as_mut().expect("session not open");
        let written = self.access.write_record(file, &bytes, &[])?;
        if written != FILE_HEADER_LEN {
            return Err(Error::ShortWrite {
                expected: FILE_HEADER_LEN,
                written,
            });
        }
        self.prepare_access()
    }

    fn prepare_access(&mut self) -> Result<()> {
        let file = self.file.as_ref().expect("session not open");
        self.access.prepare_access(file, self.mode, self.jumbo)?;
        Ok(())
    }

    /// Read the next acceptable record into `pkt`.
    ///
    /// Zero-length records are counted in `truncated` and retried (up to a
    /// bound); records larger than the packet buffer are clipped, counted,
    /// and the excess file bytes are skipped so the stream stays aligned.
    /// Records rejected by the filter are dropped silently. Returns the
    /// packet's on-wire length, or `None` at end-of-stream.
    pub fn read_packet(&mut self, pkt: &mut Packet) -> Result<Option<u32>> {
        let hdr_len = RecordHeader::header_len(self.format.dialect);
        let mut hdr_bytes = [0u8; MAX_RECORD_HEADER_LEN];
        let mut zero_run = 0;

        loop {
            let file = self.file.as_mut().expect("session not open");
            if !self.access.read_chunk(file, &mut hdr_bytes[..hdr_len])? {
                return Ok(None);
            }
            let mut header =
                RecordHeader::parse(self.format.dialect, self.format.endianness, &hdr_bytes[..hdr_len]);

            let payload_len = header.payload_len() as usize;
            if payload_len == 0 {
                self.truncated += 1;
                zero_run += 1;
                if zero_run >= MAX_ZERO_RECORDS {
                    warn!("{zero_run} zero-length records in a row; treating as end-of-stream");
                    return Ok(None);
                }
                continue;
            }
            zero_run = 0;

            let take = payload_len.min(pkt.buf.len());
            if !self.access.read_chunk(file, &mut pkt.buf[..take])? {
                return Ok(None);
            }
            if take < payload_len {
                self.truncated += 1;
                self.access.skip(file, payload_len - take)?;
                header.set_payload_len(take as u32);
            }

            if let Some(filter) = &self.filter {
                if !filter(&pkt.buf[..take]) {
                    continue;
                }
            }

            let wire_len = header.wire_len();
            pkt.header = header;
            return Ok(Some(wire_len));
        }
    }

    /// Write one record. Exactly `header_len + caplen` bytes go out, or
    /// the session fails.
    pub fn write_packet(&mut self, pkt: &Packet) -> Result<()> {
        let mut hdr_bytes = Vec::with_capacity(MAX_RECORD_HEADER_LEN);
        pkt.header.encode_into(self.format.endianness, &mut hdr_bytes);
        let file = self.file.as_mut().expect("session not open");
        let written = self.access.write_record(file, &hdr_bytes, pkt.payload())?;
        let expected = pkt.header.total_len() as usize;
        if written != expected {
            return Err(Error::ShortWrite { expected, written });
        }
        Ok(())
    }

    /// Release the descriptor: fsync (write mode), run the strategy's
    /// close hook, and if the session took over a standard stream, put it
    /// back.
    pub fn close(&mut self) -> Result<()> {
        let Some(file) = self.file.take() else {
            return Ok(());
        };
        if self.mode == Mode::Write {
            self.access.sync(&file)?;
        }
        self.access.prepare_close(&file, self.mode)?;
        if self.path == "-" {
            let stdio = match self.mode {
                Mode::Read => libc::STDIN_FILENO,
                Mode::Write => libc::STDOUT_FILENO,
            };
            let ret = unsafe { libc::dup2(file.as_raw_fd(), stdio) };
            if ret < 0 {
                return Err(io::Error::last_os_error().into());
            }
        }
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.file.is_some() {
            if let Err(e) = self.close() {
                warn!("Error closing capture session: {e}");
            }
        }
    }
}

/// Read-only open with the large-file and no-access-time flags, retrying
/// without `O_NOATIME` when the caller doesn't own the file.
fn open_readonly(path: &str) -> Result<File> {
    let attempt = OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_LARGEFILE | libc::O_NOATIME)
        .open(path);
    match attempt {
        Ok(file) => Ok(file),
        Err(e) if e.raw_os_error() == Some(libc::EPERM) => {
            debug!("O_NOATIME open of {path} not permitted; retrying without");
            Ok(OpenOptions::new()
                .read(true)
                .custom_flags(libc::O_LARGEFILE)
                .open(path)?)
        }
        Err(e) => Err(e.into()),
    }
}
