// src/lib.rs

//! TrueType outline baker.
//!
//! Decodes the printable ASCII glyphs of a TrueType font into flat contour,
//! point and composite records packed into a pre-sized [`GlyphArena`].
//! Decoding runs in two passes over the same file bytes:
//!
//! 1. [`preprocess_font`] maps every character to a glyph, counts contours
//!    and points, and returns the exact arena budget.
//! 2. [`load_font`] decodes coordinates, synthesizes implicit on-curve
//!    midpoints, classifies contours, and writes everything into the arena.
//!
//! [`bake_font`] runs both with an arena sized from the first.

pub mod arena;
pub mod cmap;
pub mod config;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod load;
pub mod loca;
pub mod outline;
pub mod preprocess;
pub mod ttf;

pub use arena::{CompositeRecord, ContourRecord, GlyphArena, PointRecord};
pub use config::{DecoderConfig, LineJumpSource, MissingGlyphPolicy};
pub use error::{FontDecodeError, Result};
pub use load::{load_font, Character, GameFont};
pub use preprocess::{preprocess_font, CharacterInfo, GlyphKind, PreprocessedFont};

/// First character with an outline.
pub const FIRST_CHARACTER: char = '!';
/// Last character with an outline.
pub const LAST_CHARACTER: char = '~';
/// Number of characters in `FIRST_CHARACTER..=LAST_CHARACTER`.
pub const CHARACTER_COUNT: usize = (LAST_CHARACTER as usize) - (FIRST_CHARACTER as usize) + 1;

/// Slot of `c` in per-character tables.
pub fn character_index(c: char) -> Option<usize> {
    (FIRST_CHARACTER..=LAST_CHARACTER)
        .contains(&c)
        .then(|| c as usize - FIRST_CHARACTER as usize)
}

/// The characters that get outlines, in table order.
pub fn printable_characters() -> impl Iterator<Item = char> {
    FIRST_CHARACTER..=LAST_CHARACTER
}

/// Runs both passes, allocating an arena of exactly the sized budget.
pub fn bake_font(data: &[u8], config: &DecoderConfig) -> Result<(GameFont, GlyphArena)> {
    let preprocessed = preprocess_font(data, config)?;
    let mut arena = GlyphArena::with_capacity(preprocessed.size);
    let font = load_font(&mut arena, &preprocessed)?;
    Ok((font, arena))
}
