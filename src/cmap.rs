// src/cmap.rs

//! Character-to-glyph mapper for the Windows Unicode (3, 1) format 4 `cmap`
//! subtable, plus the reverse glyph-to-character table the loading pass uses
//! to name composite children.

use log::debug;

use crate::error::{FontDecodeError, Result};
use crate::ttf::Reader;
use crate::{character_index, CHARACTER_COUNT, FIRST_CHARACTER};

const PLATFORM_WINDOWS: u16 = 3;
const ENCODING_UNICODE_BMP: u16 = 1;
const SUBTABLE_HEADER_SIZE: usize = 14;

/// Outcome of a forward lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mapping {
    Glyph(u16),
    /// Not covered by any segment, or mapped to glyph 0.
    Missing,
}

/// Scan position in the segment arrays.
///
/// Lookups for ascending character codes resume from the last segment that
/// was reached instead of starting over at zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SegmentCursor {
    index: usize,
}

impl SegmentCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segment(&self) -> usize {
        self.index
    }
}

/// View over a format 4 subtable's parallel segment arrays.
#[derive(Clone, Copy, Debug)]
pub struct CharMap<'a> {
    sub: &'a [u8],
    seg_count: usize,
}

impl<'a> CharMap<'a> {
    /// Locates the (3, 1) encoding record in a `cmap` table and validates its
    /// subtable.
    pub fn parse(cmap: &'a [u8]) -> Result<Self> {
        let mut r = Reader::new(cmap, "cmap header");
        let _version = r.u16()?;
        let num_tables = r.u16()?;

        for _ in 0..num_tables {
            let platform_id = r.u16()?;
            let encoding_id = r.u16()?;
            let offset = r.u32()? as usize;
            if platform_id != PLATFORM_WINDOWS || encoding_id != ENCODING_UNICODE_BMP {
                continue;
            }
            let sub = cmap.get(offset..).ok_or(FontDecodeError::UnexpectedEof {
                what: "cmap subtable",
                offset,
            })?;
            let format = Reader::new(sub, "cmap subtable").u16()?;
            if format != 4 {
                return Err(FontDecodeError::UnsupportedCmapFormat(format));
            }
            return Self::from_subtable(sub);
        }

        Err(FontDecodeError::NoUnicodeCmap)
    }

    fn from_subtable(sub: &'a [u8]) -> Result<Self> {
        let seg_count = Reader::at(sub, 6, "cmap subtable").u16()? as usize / 2;
        if seg_count == 0 {
            return Err(FontDecodeError::MalformedCmap("no segments"));
        }
        let map = Self { sub, seg_count };

        let last = seg_count - 1;
        if map.end_code(last)? != 0xFFFF {
            return Err(FontDecodeError::MalformedCmap("last end code is not 0xFFFF"));
        }
        let pad = Reader::at(sub, SUBTABLE_HEADER_SIZE + seg_count * 2, "cmap subtable").u16()?;
        if pad != 0 {
            return Err(FontDecodeError::MalformedCmap("reserved pad is not zero"));
        }
        if map.start_code(last)? != 0xFFFF {
            return Err(FontDecodeError::MalformedCmap("last start code is not 0xFFFF"));
        }
        let mut previous = 0;
        for i in 0..seg_count {
            let end = map.end_code(i)?;
            if end < previous {
                return Err(FontDecodeError::MalformedCmap("segments are not sorted"));
            }
            previous = end;
            // Make sure every parallel array is fully present.
            map.range_offset(i)?;
        }

        debug!("cmap format 4 with {} segments", seg_count);
        Ok(map)
    }

    pub fn seg_count(&self) -> usize {
        self.seg_count
    }

    fn word(&self, offset: usize) -> Result<u16> {
        Reader::at(self.sub, offset, "cmap segments").u16()
    }

    fn end_code(&self, i: usize) -> Result<u16> {
        self.word(SUBTABLE_HEADER_SIZE + i * 2)
    }

    fn start_code(&self, i: usize) -> Result<u16> {
        self.word(SUBTABLE_HEADER_SIZE + 2 + self.seg_count * 2 + i * 2)
    }

    fn id_delta(&self, i: usize) -> Result<u16> {
        self.word(SUBTABLE_HEADER_SIZE + 2 + self.seg_count * 4 + i * 2)
    }

    fn range_offset_position(&self, i: usize) -> usize {
        SUBTABLE_HEADER_SIZE + 2 + self.seg_count * 6 + i * 2
    }

    fn range_offset(&self, i: usize) -> Result<u16> {
        self.word(self.range_offset_position(i))
    }

    /// Maps `c`, scanning forward from `cursor`. Codes must be looked up in
    /// ascending order for a given cursor.
    pub fn lookup(&self, cursor: &mut SegmentCursor, c: u16) -> Result<Mapping> {
        while cursor.index < self.seg_count {
            let i = cursor.index;
            if c > self.end_code(i)? {
                cursor.index += 1;
                continue;
            }
            let start = self.start_code(i)?;
            if c < start {
                return Ok(Mapping::Missing);
            }

            let delta = self.id_delta(i)?;
            let range_offset = self.range_offset(i)?;
            let glyph = if range_offset == 0 {
                c.wrapping_add(delta)
            } else {
                let at = self.range_offset_position(i)
                    + range_offset as usize
                    + (c - start) as usize * 2;
                match self.word(at)? {
                    0 => 0,
                    g => g.wrapping_add(delta),
                }
            };
            return Ok(if glyph == 0 { Mapping::Missing } else { Mapping::Glyph(glyph) });
        }
        Ok(Mapping::Missing)
    }
}

/// The glyph fixed for each printable character during sizing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphAssignment {
    glyph_ids: [u16; CHARACTER_COUNT],
}

impl Default for GlyphAssignment {
    fn default() -> Self {
        Self { glyph_ids: [0; CHARACTER_COUNT] }
    }
}

impl GlyphAssignment {
    pub fn set(&mut self, c: char, glyph_id: u16) {
        if let Some(i) = character_index(c) {
            self.glyph_ids[i] = glyph_id;
        }
    }

    pub fn get(&self, c: char) -> Option<u16> {
        character_index(c).map(|i| self.glyph_ids[i])
    }

    /// First printable character assigned to `glyph_id`.
    pub fn character_for(&self, glyph_id: u16) -> Option<char> {
        self.glyph_ids
            .iter()
            .position(|&g| g == glyph_id)
            .map(|i| (FIRST_CHARACTER as u8 + i as u8) as char)
    }
}
