use crate::access::{read_full, skip_bytes, Access};
use std::fs::File;
use std::io::{self, Write};

/// The baseline strategy: one `read`/`write` per chunk.
pub struct PlainAccess;

impl Access for PlainAccess {
    fn read_chunk(&mut self, file: &mut File, buf: &mut [u8]) -> io::Result<bool> {
        read_full(file, buf)
    }

    fn skip(&mut self, file: &mut File, n: usize) -> io::Result<()> {
        skip_bytes(file, n)
    }

    fn write_record(&mut self, file: &mut File, hdr: &[u8], payload: &[u8]) -> io::Result<usize> {
        file.write_all(hdr)?;
        file.write_all(payload)?;
        Ok(hdr.len() + payload.len())
    }
}
