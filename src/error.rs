// src/error.rs

//! Error taxonomy for the font decoder.
//!
//! Every fallible step of both passes returns [`FontDecodeError`]. There is no
//! partial-font output: the first error aborts the whole load.

use thiserror::Error;

use crate::ttf::tables::Tag;

/// Everything that can go wrong while sizing or loading a font.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FontDecodeError {
    // --- Format errors ---
    #[error("unexpected end of data reading {what} at offset {offset:#x}")]
    UnexpectedEof { what: &'static str, offset: usize },
    #[error("unsupported sfnt version {0:#010x} (expected 0x00010000)")]
    BadSfntVersion(u32),
    #[error("unsupported head table version {0:#010x}")]
    BadHeadVersion(u32),
    #[error("bad head magic number {0:#010x} (expected 0x5F0F3CF5)")]
    BadMagicNumber(u32),
    #[error("unsupported maxp table version {0:#010x}")]
    BadMaxpVersion(u32),
    #[error("OS/2 table version {0} is older than 2")]
    Os2VersionTooOld(u16),
    #[error("invalid index to location format {0}")]
    UnsupportedLocaFormat(i16),
    #[error("no Windows Unicode (platform 3, encoding 1) cmap subtable")]
    NoUnicodeCmap,
    #[error("unsupported cmap subtable format {0} (only format 4 is supported)")]
    UnsupportedCmapFormat(u16),
    #[error("malformed cmap: {0}")]
    MalformedCmap(&'static str),
    #[error("composite glyph for '{ch}' uses unsupported component flags {flags:#06x}")]
    UnsupportedComposite { ch: char, flags: u16 },
    #[error("composite glyph for '{ch}' references composite glyph {child}; only one level is supported")]
    NestedComposite { ch: char, child: u16 },
    #[error("contour end points of glyph for '{0}' are not increasing")]
    BadContourEndpoints(char),

    // --- Missing-table errors ---
    #[error("required table '{0}' wasn't found")]
    MissingTable(Tag),
    #[error("table '{0}' appears more than once")]
    DuplicateTable(Tag),
    #[error("table '{tag}' at {offset:#x}+{length} lies outside the file")]
    TableOutOfBounds { tag: Tag, offset: u32, length: u32 },
    #[error("font has no glyphs")]
    NoGlyphs,
    #[error("font declares no horizontal metrics")]
    NoHorizontalMetrics,
    #[error("glyph for '{0}' has no outline")]
    EmptyGlyph(char),
    #[error("glyph for '{0}' has zero contours")]
    NoContours(char),
    #[error("composite glyph for '{0}' has no children")]
    CompositeWithoutChildren(char),

    // --- Missing-glyph-mapping ---
    #[error("character '{0}' wasn't found in font")]
    CharacterNotFound(char),
    #[error("glyph {glyph_id} for '{ch}' is out of range (font has {n_glyphs} glyphs)")]
    GlyphIdOutOfRange { ch: char, glyph_id: u16, n_glyphs: u16 },
    #[error("child glyph {glyph_id} of '{ch}' is not one of the loaded characters")]
    UnresolvedCompositeChild { ch: char, glyph_id: u16 },

    // --- Internal consistency errors ---
    #[error("arena exhausted: requested {requested} bytes with {available} available")]
    ArenaExhausted { requested: usize, available: usize },
    #[error("point count mismatch for '{ch}': sized {expected}, decoded {decoded}")]
    PointCountMismatch { ch: char, expected: u32, decoded: u32 },
    #[error("component count mismatch for '{ch}': sized {expected}, decoded {decoded}")]
    ComponentCountMismatch { ch: char, expected: u16, decoded: u16 },
    #[error("byte budget mismatch: sized {expected} bytes, wrote {written}")]
    BudgetMismatch { expected: usize, written: usize },
}

impl FontDecodeError {
    /// True for errors that signal a decoder bug rather than malformed input.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::ArenaExhausted { .. }
                | Self::PointCountMismatch { .. }
                | Self::ComponentCountMismatch { .. }
                | Self::BudgetMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FontDecodeError>;
