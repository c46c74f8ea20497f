// src/preprocess.rs

//! Sizing pass.
//!
//! Walks every printable character's glyph without decoding coordinates:
//! contour end points and the point flag stream are enough to know how many
//! points the loading pass will emit, midpoints included. The result fixes the
//! character-to-glyph assignment and the exact arena budget.

use log::{debug, info, trace, warn};
use serde::Serialize;

use crate::arena::{COMPOSITE_RECORD_SIZE, CONTOUR_RECORD_SIZE, POINT_RECORD_SIZE};
use crate::cmap::{CharMap, GlyphAssignment, Mapping, SegmentCursor};
use crate::config::{DecoderConfig, LineJumpSource, MissingGlyphPolicy};
use crate::error::{FontDecodeError, Result};
use crate::loca::{GlyphOffsets, LocaFormat};
use crate::outline::{count_contour, Components, SimpleOutline};
use crate::ttf::{
    BoundingBox, FsSelection, GlyphHeader, HeadTable, MaxpTable, MetricsHeader, MetricsTable,
    Os2Table, TableDirectory, TableRecord, Tag,
};
use crate::printable_characters;

/// How a character's outline is stored in `glyf`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum GlyphKind {
    Simple,
    /// A composite with one child: loaded as that child's simple outline.
    Alias { child: u16 },
    /// A composite with several children, emitted as placement records.
    Composite { children: u16 },
}

/// Point count and last point index of one output contour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ContourInfo {
    pub n_points: u32,
    /// Cumulative across the character's contours.
    pub endpoint: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GlyphMetrics {
    pub advance_width: u16,
    pub left_side_bearing: i16,
    /// Zero when the font has no vertical metrics.
    pub advance_height: u16,
    pub top_side_bearing: i16,
}

/// Everything the loading pass needs to know about one character.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CharacterInfo {
    pub letter: char,
    pub glyph_id: u16,
    /// Offset of the glyph header inside `glyf`.
    pub glyph_offset: u32,
    pub kind: GlyphKind,
    pub n_points: u32,
    pub n_on_curve: u32,
    pub contours: Vec<ContourInfo>,
    pub metrics: GlyphMetrics,
}

impl CharacterInfo {
    pub fn n_children(&self) -> u16 {
        match self.kind {
            GlyphKind::Composite { children } => children,
            _ => 0,
        }
    }
}

/// Font-wide totals that make up the arena budget.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SizingTotals {
    pub contours: usize,
    pub points: usize,
    pub on_curve: usize,
    pub composite_records: usize,
}

impl SizingTotals {
    pub fn byte_size(&self) -> usize {
        self.contours * CONTOUR_RECORD_SIZE
            + self.points * POINT_RECORD_SIZE
            + self.composite_records * COMPOSITE_RECORD_SIZE
    }
}

/// Output of the sizing pass. Borrows the font bytes, which the loading pass
/// reads again.
#[derive(Clone, Debug)]
pub struct PreprocessedFont<'a> {
    data: &'a [u8],
    pub loca: TableRecord,
    pub glyf: TableRecord,
    pub loca_format: LocaFormat,
    pub n_glyphs: u16,
    pub units_per_em: u16,
    pub line_jump: i32,
    pub space_advance: u16,
    pub bounds: BoundingBox,
    /// One entry per printable character, in order.
    pub characters: Vec<CharacterInfo>,
    pub assignment: GlyphAssignment,
    pub totals: SizingTotals,
    /// Bytes the loading pass will write.
    pub size: usize,
}

impl<'a> PreprocessedFont<'a> {
    pub fn glyf_data(&self) -> &'a [u8] {
        self.glyf.slice(self.data)
    }

    pub fn loca_data(&self) -> &'a [u8] {
        self.loca.slice(self.data)
    }

    pub fn character(&self, c: char) -> Option<&CharacterInfo> {
        crate::character_index(c).and_then(|i| self.characters.get(i))
    }
}

fn select_line_jump(hhea: &MetricsHeader, os2: Option<&Os2Table>, source: LineJumpSource) -> i32 {
    match (source, os2) {
        (LineJumpSource::Typo, Some(os2)) => os2.line_jump(),
        (LineJumpSource::Auto, Some(os2))
            if os2.fs_selection.contains(FsSelection::USE_TYPO_METRICS) =>
        {
            os2.line_jump()
        }
        _ => hhea.line_jump(),
    }
}

/// Maps `c`, applying the missing-glyph policy. The space character is
/// always required.
fn resolve_glyph(
    cmap: &CharMap<'_>,
    cursor: &mut SegmentCursor,
    c: char,
    policy: MissingGlyphPolicy,
) -> Result<u16> {
    match cmap.lookup(cursor, c as u16)? {
        Mapping::Glyph(id) => Ok(id),
        Mapping::Missing if c == ' ' => Err(FontDecodeError::CharacterNotFound(c)),
        Mapping::Missing => match policy {
            MissingGlyphPolicy::Fail => Err(FontDecodeError::CharacterNotFound(c)),
            MissingGlyphPolicy::NotDef => {
                warn!("character '{}' wasn't found in font, using .notdef", c);
                Ok(0)
            }
        },
    }
}

/// Byte range of `glyph_id`, rejecting ids past `maxp.numGlyphs` and glyphs
/// without an outline.
fn glyph_range(offsets: &GlyphOffsets, glyph_id: u16, n_glyphs: u16, ch: char) -> Result<u32> {
    let out_of_range = FontDecodeError::GlyphIdOutOfRange { ch, glyph_id, n_glyphs };
    if glyph_id >= n_glyphs {
        return Err(out_of_range);
    }
    match offsets.range(glyph_id) {
        Some((_, 0)) => Err(FontDecodeError::EmptyGlyph(ch)),
        Some((start, _)) => Ok(start),
        None => Err(out_of_range),
    }
}

/// Counts the output points of a simple glyph, contour by contour.
fn size_simple(
    glyf: &[u8],
    offset: u32,
    n_contours: i16,
    ch: char,
    on_bits: &mut Vec<bool>,
) -> Result<(Vec<ContourInfo>, u32, u32)> {
    let outline = SimpleOutline::parse(glyf, offset as usize, n_contours as u16, ch)?;
    let mut flags = outline.flags();
    let mut contours = Vec::with_capacity(outline.n_contours());
    let mut n_points = 0u32;
    let mut n_on_curve = 0u32;
    let mut start = 0usize;

    for &end in outline.endpoints() {
        on_bits.clear();
        for _ in start..=end as usize {
            on_bits.push(flags.next_flag()?.on_curve());
        }
        let count = count_contour(on_bits.iter().copied());
        n_points += count.points;
        n_on_curve += count.on_curve;
        contours.push(ContourInfo { n_points: count.points, endpoint: n_points - 1 });
        start = end as usize + 1;
    }
    Ok((contours, n_points, n_on_curve))
}

/// Sizing pass: resolves every printable character and computes the arena
/// budget for [`crate::load_font`].
pub fn preprocess_font<'a>(data: &'a [u8], config: &DecoderConfig) -> Result<PreprocessedFont<'a>> {
    let directory = TableDirectory::parse(data)?;

    let head = HeadTable::parse(directory.require(Tag::HEAD)?.slice(data))?;
    let maxp = MaxpTable::parse(directory.require(Tag::MAXP)?.slice(data))?;
    let loca = *directory.require(Tag::LOCA)?;
    let glyf = *directory.require(Tag::GLYF)?;
    let hhea = MetricsHeader::parse(directory.require(Tag::HHEA)?.slice(data), "hhea")?;
    let hmtx = directory.require(Tag::HMTX)?.slice(data);
    let cmap = CharMap::parse(directory.require(Tag::CMAP)?.slice(data))?;

    let n_glyphs = maxp.num_glyphs;
    if n_glyphs == 0 {
        return Err(FontDecodeError::NoGlyphs);
    }
    if hhea.num_long_metrics == 0 {
        return Err(FontDecodeError::NoHorizontalMetrics);
    }
    let hmtx = MetricsTable::new(hmtx, hhea.num_long_metrics, "hmtx");

    let vmtx = match (directory.get(Tag::VHEA), directory.get(Tag::VMTX)) {
        (Some(vhea), Some(vmtx)) => {
            let vhea = MetricsHeader::parse(vhea.slice(data), "vhea")?;
            (vhea.num_long_metrics > 0)
                .then(|| MetricsTable::new(vmtx.slice(data), vhea.num_long_metrics, "vmtx"))
        }
        _ => None,
    };
    if vmtx.is_none() {
        debug!("no vertical metrics, leaving them zeroed");
    }

    let os2 = directory
        .get(Tag::OS2)
        .map(|record| Os2Table::parse(record.slice(data)))
        .transpose()?;
    let line_jump = select_line_jump(&hhea, os2.as_ref(), config.line_jump);

    let loca_format = LocaFormat::try_from(head.index_to_loc_format)?;
    let offsets = GlyphOffsets::expand(loca.slice(data), loca_format, n_glyphs)?;
    let glyf_data = glyf.slice(data);

    let mut cursor = SegmentCursor::new();
    let space_id = resolve_glyph(&cmap, &mut cursor, ' ', config.missing_glyph)?;
    if space_id >= n_glyphs {
        return Err(FontDecodeError::GlyphIdOutOfRange { ch: ' ', glyph_id: space_id, n_glyphs });
    }
    let space_advance = hmtx.get(space_id)?.advance;

    let mut assignment = GlyphAssignment::default();
    let mut characters = Vec::with_capacity(crate::CHARACTER_COUNT);
    let mut totals = SizingTotals::default();
    let mut on_bits = Vec::new();

    for c in printable_characters() {
        let glyph_id = resolve_glyph(&cmap, &mut cursor, c, config.missing_glyph)?;
        let glyph_offset = glyph_range(&offsets, glyph_id, n_glyphs, c)?;
        let header = GlyphHeader::parse(glyf_data, glyph_offset as usize)?;

        let (kind, simple_at, simple_contours) = match header.number_of_contours {
            0 => return Err(FontDecodeError::NoContours(c)),
            n if n > 0 => (GlyphKind::Simple, glyph_offset, n),
            _ => {
                let mut components = Components::new(glyf_data, glyph_offset as usize, c);
                let mut children = 0u16;
                let mut last_child = 0u16;
                while let Some(child) = components.skip_component()? {
                    children += 1;
                    last_child = child;
                }
                match children {
                    0 => return Err(FontDecodeError::CompositeWithoutChildren(c)),
                    1 => {
                        let child_at = glyph_range(&offsets, last_child, n_glyphs, c)?;
                        let child = GlyphHeader::parse(glyf_data, child_at as usize)?;
                        match child.number_of_contours {
                            0 => return Err(FontDecodeError::NoContours(c)),
                            n if n < 0 => {
                                return Err(FontDecodeError::NestedComposite { ch: c, child: last_child })
                            }
                            n => (GlyphKind::Alias { child: last_child }, child_at, n),
                        }
                    }
                    n => (GlyphKind::Composite { children: n }, glyph_offset, 0),
                }
            }
        };

        let (contours, n_points, n_on_curve) = match kind {
            GlyphKind::Composite { children } => {
                totals.composite_records += children as usize;
                (Vec::new(), 0, 0)
            }
            _ => size_simple(glyf_data, simple_at, simple_contours, c, &mut on_bits)?,
        };
        totals.contours += contours.len();
        totals.points += n_points as usize;
        totals.on_curve += n_on_curve as usize;

        let horizontal = hmtx.get(glyph_id)?;
        let vertical = vmtx.map(|t| t.get(glyph_id)).transpose()?.unwrap_or_default();
        let metrics = GlyphMetrics {
            advance_width: horizontal.advance,
            left_side_bearing: horizontal.side_bearing,
            advance_height: vertical.advance,
            top_side_bearing: vertical.side_bearing,
        };

        trace!(
            "sized '{}': glyph {} {:?}, {} contours, {} points",
            c,
            glyph_id,
            kind,
            contours.len(),
            n_points
        );
        assignment.set(c, glyph_id);
        characters.push(CharacterInfo {
            letter: c,
            glyph_id,
            glyph_offset,
            kind,
            n_points,
            n_on_curve,
            contours,
            metrics,
        });
    }

    let size = totals.byte_size();
    info!(
        "sized font: {} glyphs, {} contours, {} points ({} on-curve), {} composite records, {} bytes",
        n_glyphs, totals.contours, totals.points, totals.on_curve, totals.composite_records, size
    );

    Ok(PreprocessedFont {
        data,
        loca,
        glyf,
        loca_format,
        n_glyphs,
        units_per_em: head.units_per_em,
        line_jump,
        space_advance,
        bounds: head.bounds,
        characters,
        assignment,
        totals,
        size,
    })
}
