use crate::access::{read_full, skip_bytes, Access, Mode};
use memmap2::{Mmap, MmapMut};
use std::fs::File;
use std::io::{self, Write};

/// Initial size of the write-side mapping window.
const MAP_WINDOW: u64 = 16 << 20;
/// Window used when the session expects jumbo frames.
const MAP_WINDOW_JUMBO: u64 = 64 << 20;

/// Memory-mapped strategy: reads are pointer arithmetic over a whole-file
/// map; writes land in a mapping window that is grown by truncating the
/// file larger and remapping, then trimmed to the bytes actually used at
/// close.
///
/// Not usable on pipes — the session downgrades `"-"` paths to the
/// scatter-gather strategy before this ever sees a descriptor.
pub struct MmapAccess {
    state: State,
}

enum State {
    /// Before `prepare_access`: the file header moves via plain reads and
    /// writes.
    Unmapped,
    Read { map: Mmap, off: usize },
    Write { map: MmapMut, off: usize, size: u64 },
}

impl MmapAccess {
    pub fn new() -> MmapAccess {
        MmapAccess {
            state: State::Unmapped,
        }
    }
}

impl Default for MmapAccess {
    fn default() -> Self {
        Self::new()
    }
}

impl Access for MmapAccess {
    fn prepare_access(&mut self, file: &File, mode: Mode, jumbo: bool) -> io::Result<()> {
        match mode {
            Mode::Read => {
                let map = unsafe { Mmap::map(file)? };
                // The file header has already been consumed via read_chunk.
                let off = crate::file_header::FILE_HEADER_LEN.min(map.len());
                self.state = State::Read { map, off };
            }
            Mode::Write => {
                let size = if jumbo { MAP_WINDOW_JUMBO } else { MAP_WINDOW };
                let off = file.metadata()?.len() as usize;
                file.set_len(size)?;
                let map = unsafe { MmapMut::map_mut(file)? };
                self.state = State::Write { map, off, size };
            }
        }
        Ok(())
    }

    fn read_chunk(&mut self, file: &mut File, buf: &mut [u8]) -> io::Result<bool> {
        match &mut self.state {
            State::Unmapped => read_full(file, buf),
            State::Read { map, off } => {
                if *off + buf.len() > map.len() {
                    return Ok(false);
                }
                buf.copy_from_slice(&map[*off..*off + buf.len()]);
                *off += buf.len();
                Ok(true)
            }
            State::Write { .. } => Err(io::Error::other("mapping is write-only")),
        }
    }

    fn skip(&mut self, file: &mut File, n: usize) -> io::Result<()> {
        match &mut self.state {
            State::Unmapped => skip_bytes(file, n),
            State::Read { map, off } => {
                *off = (*off + n).min(map.len());
                Ok(())
            }
            State::Write { .. } => Err(io::Error::other("mapping is write-only")),
        }
    }

    fn write_record(&mut self, file: &mut File, hdr: &[u8], payload: &[u8]) -> io::Result<usize> {
        let total = hdr.len() + payload.len();
        match &mut self.state {
            State::Unmapped => {
                file.write_all(hdr)?;
                file.write_all(payload)?;
            }
            State::Write { map, off, size } => {
                if *off + total > map.len() {
                    // Grow the window: flush, truncate larger, remap.
                    map.flush()?;
                    while *off + total > *size as usize {
                        *size *= 2;
                    }
                    file.set_len(*size)?;
                    *map = unsafe { MmapMut::map_mut(&*file)? };
                }
                map[*off..*off + hdr.len()].copy_from_slice(hdr);
                map[*off + hdr.len()..*off + total].copy_from_slice(payload);
                *off += total;
            }
            State::Read { .. } => return Err(io::Error::other("mapping is read-only")),
        }
        Ok(total)
    }

    fn prepare_close(&mut self, file: &File, mode: Mode) -> io::Result<()> {
        let state = std::mem::replace(&mut self.state, State::Unmapped);
        if let (Mode::Write, State::Write { map, off, .. }) = (mode, state) {
            map.flush()?;
            drop(map);
            file.set_len(off as u64)?;
        }
        Ok(())
    }

    fn sync(&mut self, file: &File) -> io::Result<()> {
        if let State::Write { map, .. } = &self.state {
            map.flush()?;
        }
        file.sync_all()
    }
}
