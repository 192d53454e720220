use crate::magic::Endianness;
use bytes::{Buf, BufMut};

pub(crate) fn read_u16<T: Buf>(buf: &mut T, endianness: Endianness) -> u16 {
    match endianness {
        Endianness::Big => buf.get_u16(),
        Endianness::Little => buf.get_u16_le(),
    }
}

pub(crate) fn read_u32<T: Buf>(buf: &mut T, endianness: Endianness) -> u32 {
    match endianness {
        Endianness::Big => buf.get_u32(),
        Endianness::Little => buf.get_u32_le(),
    }
}

pub(crate) fn read_i32<T: Buf>(buf: &mut T, endianness: Endianness) -> i32 {
    match endianness {
        Endianness::Big => buf.get_i32(),
        Endianness::Little => buf.get_i32_le(),
    }
}

pub(crate) fn put_u16<T: BufMut>(buf: &mut T, endianness: Endianness, x: u16) {
    match endianness {
        Endianness::Big => buf.put_u16(x),
        Endianness::Little => buf.put_u16_le(x),
    }
}

pub(crate) fn put_u32<T: BufMut>(buf: &mut T, endianness: Endianness, x: u32) {
    match endianness {
        Endianness::Big => buf.put_u32(x),
        Endianness::Little => buf.put_u32_le(x),
    }
}

pub(crate) fn put_i32<T: BufMut>(buf: &mut T, endianness: Endianness, x: i32) {
    match endianness {
        Endianness::Big => buf.put_i32(x),
        Endianness::Little => buf.put_i32_le(x),
    }
}
