use crate::access::{read_full, skip_bytes, Access};
use std::fs::File;
use std::io::{self, IoSlice, Write};

/// Vectored-I/O strategy: header and payload leave in a single `writev`.
///
/// Reads are sequential either way (the payload length is only known once
/// the header has been parsed), so the read path matches the plain
/// strategy.
pub struct ScatterGatherAccess;

impl Access for ScatterGatherAccess {
    fn read_chunk(&mut self, file: &mut File, buf: &mut [u8]) -> io::Result<bool> {
        read_full(file, buf)
    }

    fn skip(&mut self, file: &mut File, n: usize) -> io::Result<()> {
        skip_bytes(file, n)
    }

    fn write_record(&mut self, file: &mut File, hdr: &[u8], payload: &[u8]) -> io::Result<usize> {
        let total = hdr.len() + payload.len();
        let written = file.write_vectored(&[IoSlice::new(hdr), IoSlice::new(payload)])?;
        if written < total {
            // Finish the tail with plain writes rather than re-slicing.
            if written < hdr.len() {
                file.write_all(&hdr[written..])?;
                file.write_all(payload)?;
            } else {
                file.write_all(&payload[written - hdr.len()..])?;
            }
        }
        Ok(total)
    }
}
