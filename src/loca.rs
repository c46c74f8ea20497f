// src/loca.rs

//! Glyph location resolver.
//!
//! Expands `loca` into `n_glyphs + 1` offsets into `glyf`. Both passes call
//! this independently; nothing is cached between them.

use crate::error::{FontDecodeError, Result};
use crate::ttf::Reader;

/// `head.indexToLocFormat`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocaFormat {
    /// Offsets stored as `u16`, halved.
    Short,
    /// Offsets stored directly as `u32`.
    Long,
}

impl TryFrom<i16> for LocaFormat {
    type Error = FontDecodeError;

    fn try_from(value: i16) -> Result<Self> {
        match value {
            0 => Ok(Self::Short),
            1 => Ok(Self::Long),
            other => Err(FontDecodeError::UnsupportedLocaFormat(other)),
        }
    }
}

/// Absolute glyph offsets relative to the start of `glyf`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphOffsets(Vec<u32>);

impl GlyphOffsets {
    pub fn expand(loca: &[u8], format: LocaFormat, n_glyphs: u16) -> Result<Self> {
        let mut r = Reader::new(loca, "loca");
        let offsets = (0..=n_glyphs as usize)
            .map(|_| match format {
                LocaFormat::Short => r.u16().map(|v| v as u32 * 2),
                LocaFormat::Long => r.u32(),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self(offsets))
    }

    pub fn n_glyphs(&self) -> usize {
        self.0.len() - 1
    }

    /// Start offset and byte length of glyph `id`, or `None` when `id` is out
    /// of range. A zero length means the glyph has no outline.
    pub fn range(&self, id: u16) -> Option<(u32, u32)> {
        let id = id as usize;
        let start = *self.0.get(id)?;
        let end = *self.0.get(id + 1)?;
        Some((start, end.saturating_sub(start)))
    }
}
