// src/load.rs

//! Loading pass.
//!
//! Re-walks the glyphs the sizing pass picked, decodes their coordinates and
//! component transforms, and writes contour, point and composite records into
//! the arena in one forward sweep. The sizing pass's counts are checked as
//! they are reproduced; any disagreement is a decoder bug.

use log::{info, trace, warn};
use serde::Serialize;

use crate::arena::{
    CompositeRecord, ContourRecord, GlyphArena, PointRecord, COMPOSITE_RECORD_SIZE,
    CONTOUR_RECORD_SIZE,
};
use crate::error::{FontDecodeError, Result};
use crate::geometry::{is_convex, signed_area, Point2};
use crate::loca::GlyphOffsets;
use crate::outline::{expand_contour, Component, Components, SimpleOutline};
use crate::preprocess::{CharacterInfo, GlyphKind, PreprocessedFont};
use crate::ttf::{BoundingBox, CompositeGlyphFlags, GlyphHeader};

/// One loaded character. Offsets point into the arena the font was loaded
/// into.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Character {
    pub letter: char,
    /// Negative for composites stored as placement records.
    pub n_contours: i16,
    pub n_points: u32,
    pub n_on_curve: u32,
    pub n_children: u16,
    /// First [`ContourRecord`], or first [`CompositeRecord`] for composites.
    pub data_offset: u32,
    pub advance_width: u16,
    pub left_side_bearing: i16,
    pub advance_height: u16,
    pub top_side_bearing: i16,
    /// `yMax` of the glyph header.
    pub top: i16,
    /// `yMax - yMin` of the glyph header.
    pub height: i32,
}

impl Character {
    pub fn is_composite(&self) -> bool {
        self.n_contours < 0
    }

    pub fn contours(&self, arena: &GlyphArena) -> Vec<ContourRecord> {
        if self.is_composite() {
            return Vec::new();
        }
        (0..self.n_contours as usize)
            .filter_map(|k| arena.contour(self.data_offset as usize + k * CONTOUR_RECORD_SIZE))
            .collect()
    }

    pub fn composite_records(&self, arena: &GlyphArena) -> Vec<CompositeRecord> {
        if !self.is_composite() {
            return Vec::new();
        }
        (0..self.n_children as usize)
            .filter_map(|k| arena.composite(self.data_offset as usize + k * COMPOSITE_RECORD_SIZE))
            .collect()
    }
}

/// A font baked into an arena.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GameFont {
    pub space_advance: u16,
    pub line_jump: i32,
    pub units_per_em: u16,
    pub bounds: BoundingBox,
    pub n_points: u32,
    pub n_on_curve: u32,
    /// Arena offset where this font's records start.
    pub base_offset: usize,
    /// Bytes written into the arena.
    pub size: usize,
    pub characters: Vec<Character>,
}

impl GameFont {
    pub fn character(&self, c: char) -> Option<&Character> {
        crate::character_index(c).and_then(|i| self.characters.get(i))
    }
}

/// Buffers reused across contours.
#[derive(Default)]
struct Scratch {
    raw: Vec<(Point2, bool)>,
    expanded: Vec<(Point2, bool)>,
    on_curve: Vec<Point2>,
}

const IGNORED_COMPONENT_FLAGS: CompositeGlyphFlags = CompositeGlyphFlags::ROUND_XY_TO_GRID
    .union(CompositeGlyphFlags::USE_MY_METRICS)
    .union(CompositeGlyphFlags::WE_HAVE_INSTRUCTIONS);

/// Offset of a component's child in the parent, failing for point-aligned
/// placement.
fn component_translation(component: &Component, ch: char) -> Result<Point2> {
    let ignored = component.flags & IGNORED_COMPONENT_FLAGS;
    if !ignored.is_empty() {
        warn!("'{}': ignoring component flags {:?}", ch, ignored);
    }
    component.translation().ok_or(FontDecodeError::UnsupportedComposite {
        ch,
        flags: component.flags.bits(),
    })
}

/// Writes one simple outline. Returns the offset of its contour records and
/// its on-curve point count.
fn load_simple(
    arena: &mut GlyphArena,
    glyf: &[u8],
    glyph_offset: usize,
    n_contours: i16,
    info: &CharacterInfo,
    scratch: &mut Scratch,
) -> Result<(u32, u32)> {
    let ch = info.letter;
    let outline = SimpleOutline::parse(glyf, glyph_offset, n_contours as u16, ch)?;
    let slots = arena.reserve_contours(outline.n_contours())?;
    outline.decode_points(&mut scratch.raw)?;

    let mut emitted = 0u32;
    let mut on_curve = 0u32;
    let mut start = 0usize;
    for (k, &end) in outline.endpoints().iter().enumerate() {
        let end = end as usize;
        expand_contour(&scratch.raw[start..=end], &mut scratch.expanded);
        start = end + 1;

        let n_points = scratch.expanded.len() as u32;
        let expected = info.contours.get(k).map_or(0, |c| c.n_points);
        if n_points != expected {
            return Err(FontDecodeError::PointCountMismatch { ch, expected, decoded: n_points });
        }

        let points_offset = arena.used() as u32;
        scratch.on_curve.clear();
        for (index, &(p, on)) in scratch.expanded.iter().enumerate() {
            arena.push_point(&PointRecord { index: index as u32, x: p.x, y: p.y, on_curve: on })?;
            if on {
                scratch.on_curve.push(p);
            }
        }

        emitted += n_points;
        on_curve += scratch.on_curve.len() as u32;
        let contour = ContourRecord {
            points_offset,
            endpoint: emitted - 1,
            n_points,
            is_convex: is_convex(&scratch.on_curve),
            is_exterior: signed_area(&scratch.on_curve) > 0.0,
        };
        arena.write_contour(slots + k * CONTOUR_RECORD_SIZE, &contour)?;
    }

    if emitted != info.n_points {
        return Err(FontDecodeError::PointCountMismatch { ch, expected: info.n_points, decoded: emitted });
    }
    Ok((slots as u32, on_curve))
}

/// Writes one placement record per component. Returns the offset of the first.
fn load_composite(
    arena: &mut GlyphArena,
    glyf: &[u8],
    font: &PreprocessedFont<'_>,
    info: &CharacterInfo,
    children: u16,
) -> Result<u32> {
    let ch = info.letter;
    let first = arena.used() as u32;
    let mut components = Components::new(glyf, info.glyph_offset as usize, ch);
    let mut decoded = 0u16;

    while let Some(component) = components.next_component()? {
        let translation = component_translation(&component, ch)?;
        let glyph_id = component.glyph_index;
        let child = font
            .assignment
            .character_for(glyph_id)
            .ok_or(FontDecodeError::UnresolvedCompositeChild { ch, glyph_id })?;
        if let Some(GlyphKind::Composite { .. }) = font.character(child).map(|c| c.kind) {
            return Err(FontDecodeError::NestedComposite { ch, child: glyph_id });
        }
        arena.push_composite(&CompositeRecord {
            transform: component.transform,
            x: translation.x,
            y: translation.y,
            child,
        })?;
        decoded += 1;
    }

    if decoded != children {
        return Err(FontDecodeError::ComponentCountMismatch { ch, expected: children, decoded });
    }
    Ok(first)
}

/// Loading pass: fills `arena` with the outlines sized by
/// [`crate::preprocess_font`].
///
/// Fails with [`FontDecodeError::ArenaExhausted`] before writing anything when
/// the arena cannot hold the whole budget.
pub fn load_font(arena: &mut GlyphArena, font: &PreprocessedFont<'_>) -> Result<GameFont> {
    if arena.remaining() < font.size {
        return Err(FontDecodeError::ArenaExhausted {
            requested: font.size,
            available: arena.remaining(),
        });
    }
    let base_offset = arena.used();
    let glyf = font.glyf_data();
    let offsets = GlyphOffsets::expand(font.loca_data(), font.loca_format, font.n_glyphs)?;

    let mut scratch = Scratch::default();
    let mut characters = Vec::with_capacity(font.characters.len());
    let mut total_points = 0u32;
    let mut total_on_curve = 0u32;

    for info in &font.characters {
        let ch = info.letter;
        let header = GlyphHeader::parse(glyf, info.glyph_offset as usize)?;

        let (n_contours, data_offset, n_on_curve) = match info.kind {
            GlyphKind::Simple => {
                let n = header.number_of_contours;
                let (at, on) =
                    load_simple(arena, glyf, info.glyph_offset as usize, n, info, &mut scratch)?;
                (n, at, on)
            }
            GlyphKind::Alias { child } => {
                let mut components = Components::new(glyf, info.glyph_offset as usize, ch);
                if let Some(component) = components.next_component()? {
                    component_translation(&component, ch)?;
                }
                let (child_at, _) = offsets.range(child).ok_or(FontDecodeError::GlyphIdOutOfRange {
                    ch,
                    glyph_id: child,
                    n_glyphs: font.n_glyphs,
                })?;
                let n = GlyphHeader::parse(glyf, child_at as usize)?.number_of_contours;
                let (at, on) = load_simple(arena, glyf, child_at as usize, n, info, &mut scratch)?;
                (n, at, on)
            }
            GlyphKind::Composite { children } => {
                let at = load_composite(arena, glyf, font, info, children)?;
                (header.number_of_contours, at, 0)
            }
        };

        trace!(
            "loaded '{}': {} contours, {} points at arena offset {}",
            ch,
            n_contours,
            info.n_points,
            data_offset
        );
        total_points += info.n_points;
        total_on_curve += n_on_curve;
        characters.push(Character {
            letter: ch,
            n_contours,
            n_points: info.n_points,
            n_on_curve,
            n_children: info.n_children(),
            data_offset,
            advance_width: info.metrics.advance_width,
            left_side_bearing: info.metrics.left_side_bearing,
            advance_height: info.metrics.advance_height,
            top_side_bearing: info.metrics.top_side_bearing,
            top: header.bounds.y_max,
            height: header.bounds.y_max as i32 - header.bounds.y_min as i32,
        });
    }

    let written = arena.used() - base_offset;
    if written != font.size {
        return Err(FontDecodeError::BudgetMismatch { expected: font.size, written });
    }
    info!(
        "loaded font: {} points ({} on-curve), {} bytes at arena offset {}",
        total_points, total_on_curve, written, base_offset
    );

    Ok(GameFont {
        space_advance: font.space_advance,
        line_jump: font.line_jump,
        units_per_em: font.units_per_em,
        bounds: font.bounds,
        n_points: total_points,
        n_on_curve: total_on_curve,
        base_offset,
        size: written,
        characters,
    })
}
