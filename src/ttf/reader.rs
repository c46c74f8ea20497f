// src/ttf/reader.rs

//! Bounds-checked big-endian cursor over a byte slice.
//!
//! All sfnt data is big-endian. Reads past the end of the slice return
//! [`FontDecodeError::UnexpectedEof`] tagged with what was being read.

use crate::error::{FontDecodeError, Result};

#[derive(Clone, Copy, Debug)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    what: &'static str,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8], what: &'static str) -> Self {
        Self { data, pos: 0, what }
    }

    /// A reader positioned at `offset` within `data`.
    pub fn at(data: &'a [u8], offset: usize, what: &'static str) -> Self {
        Self { data, pos: offset, what }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).ok_or(self.eof())?;
        let s = self.data.get(self.pos..end).ok_or(self.eof())?;
        self.pos = end;
        Ok(s)
    }

    fn eof(&self) -> FontDecodeError {
        FontDecodeError::UnexpectedEof { what: self.what, offset: self.pos }
    }

    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn i8(&mut self) -> Result<i8> {
        self.u8().map(|v| v as i8)
    }

    pub fn u16(&mut self) -> Result<u16> {
        let s = self.take(2)?;
        Ok(u16::from_be_bytes([s[0], s[1]]))
    }

    pub fn i16(&mut self) -> Result<i16> {
        self.u16().map(|v| v as i16)
    }

    pub fn u32(&mut self) -> Result<u32> {
        let s = self.take(4)?;
        Ok(u32::from_be_bytes([s[0], s[1], s[2], s[3]]))
    }

    pub fn tag(&mut self) -> Result<[u8; 4]> {
        let s = self.take(4)?;
        Ok([s[0], s[1], s[2], s[3]])
    }

    /// 2.14 fixed point, as used by composite glyph transforms.
    pub fn f2dot14(&mut self) -> Result<f32> {
        self.i16().map(|v| v as f32 / 16384.0)
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }
}
