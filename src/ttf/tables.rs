// src/ttf/tables.rs

//! Fixed-layout sfnt structures: the file header, table directory, and the
//! `head`, `maxp`, `hhea`/`vhea`, `hmtx`/`vmtx`, `OS/2` and glyph headers.
//!
//! Each `parse` takes the whole file plus a table offset and returns a
//! host-endian struct. Version and magic checks happen here so a bad font is
//! rejected before anything downstream runs.

use std::fmt;

use log::debug;

use super::flags::FsSelection;
use super::reader::Reader;
use crate::error::{FontDecodeError, Result};

pub const SFNT_VERSION: u32 = 0x0001_0000;
pub const HEAD_MAGIC: u32 = 0x5F0F_3CF5;

const FONT_HEADER_SIZE: usize = 12;
const TABLE_RECORD_SIZE: usize = 16;

// ═══════════════════════════════════════════════════════════════════════════
// Tags and directory
// ═══════════════════════════════════════════════════════════════════════════

/// A 4-byte table tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    pub const HEAD: Self = Self(*b"head");
    pub const MAXP: Self = Self(*b"maxp");
    pub const LOCA: Self = Self(*b"loca");
    pub const GLYF: Self = Self(*b"glyf");
    pub const HHEA: Self = Self(*b"hhea");
    pub const HMTX: Self = Self(*b"hmtx");
    pub const VHEA: Self = Self(*b"vhea");
    pub const VMTX: Self = Self(*b"vmtx");
    pub const OS2: Self = Self(*b"OS/2");
    pub const CMAP: Self = Self(*b"cmap");

    const KNOWN: [Self; 10] = [
        Self::HEAD,
        Self::MAXP,
        Self::LOCA,
        Self::GLYF,
        Self::HHEA,
        Self::HMTX,
        Self::VHEA,
        Self::VMTX,
        Self::OS2,
        Self::CMAP,
    ];
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            let c = if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag('{}')", self)
    }
}

/// One entry of the table directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableRecord {
    pub tag: Tag,
    pub checksum: u32,
    pub offset: u32,
    pub length: u32,
}

impl TableRecord {
    /// The table's bytes, starting at its offset and spanning its length.
    pub fn slice<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        let start = self.offset as usize;
        &data[start..start + self.length as usize]
    }
}

/// The tables this decoder cares about, each present at most once.
#[derive(Clone, Debug, Default)]
pub struct TableDirectory {
    pub num_tables: u16,
    records: Vec<TableRecord>,
}

impl TableDirectory {
    /// Parses the sfnt header and directory. Unknown tags are skipped, known
    /// ones must be unique and must lie inside the file.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut r = Reader::new(data, "sfnt header");
        let version = r.u32()?;
        if version != SFNT_VERSION {
            return Err(FontDecodeError::BadSfntVersion(version));
        }
        let num_tables = r.u16()?;
        r.skip(FONT_HEADER_SIZE - 6)?;

        let mut records: Vec<TableRecord> = Vec::new();
        for i in 0..num_tables as usize {
            let mut r = Reader::at(data, FONT_HEADER_SIZE + i * TABLE_RECORD_SIZE, "table directory");
            let record = TableRecord {
                tag: Tag(r.tag()?),
                checksum: r.u32()?,
                offset: r.u32()?,
                length: r.u32()?,
            };
            if !Tag::KNOWN.contains(&record.tag) {
                continue;
            }
            if records.iter().any(|t| t.tag == record.tag) {
                return Err(FontDecodeError::DuplicateTable(record.tag));
            }
            let end = record.offset as u64 + record.length as u64;
            if end > data.len() as u64 {
                return Err(FontDecodeError::TableOutOfBounds {
                    tag: record.tag,
                    offset: record.offset,
                    length: record.length,
                });
            }
            debug!(
                "table '{}' at {:#x}, {} bytes",
                record.tag, record.offset, record.length
            );
            records.push(record);
        }

        Ok(Self { num_tables, records })
    }

    pub fn get(&self, tag: Tag) -> Option<&TableRecord> {
        self.records.iter().find(|t| t.tag == tag)
    }

    pub fn require(&self, tag: Tag) -> Result<&TableRecord> {
        self.get(tag).ok_or(FontDecodeError::MissingTable(tag))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// head / maxp
// ═══════════════════════════════════════════════════════════════════════════

/// Font-wide bounding box from `head`, also reused for glyph headers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct BoundingBox {
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeadTable {
    pub version: u32,
    pub magic_number: u32,
    pub flags: u16,
    pub units_per_em: u16,
    pub bounds: BoundingBox,
    pub index_to_loc_format: i16,
}

impl HeadTable {
    pub fn parse(table: &[u8]) -> Result<Self> {
        let mut r = Reader::new(table, "head");
        let version = r.u32()?;
        if version != 0x0001_0000 {
            return Err(FontDecodeError::BadHeadVersion(version));
        }
        r.skip(8)?; // fontRevision, checkSumAdjustment
        let magic_number = r.u32()?;
        if magic_number != HEAD_MAGIC {
            return Err(FontDecodeError::BadMagicNumber(magic_number));
        }
        let flags = r.u16()?;
        let units_per_em = r.u16()?;
        r.skip(16)?; // created, modified
        let bounds = BoundingBox {
            x_min: r.i16()?,
            y_min: r.i16()?,
            x_max: r.i16()?,
            y_max: r.i16()?,
        };
        r.skip(6)?; // macStyle, lowestRecPPEM, fontDirectionHint
        let index_to_loc_format = r.i16()?;
        Ok(Self {
            version,
            magic_number,
            flags,
            units_per_em,
            bounds,
            index_to_loc_format,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaxpTable {
    pub version: u32,
    pub num_glyphs: u16,
}

impl MaxpTable {
    pub fn parse(table: &[u8]) -> Result<Self> {
        let mut r = Reader::new(table, "maxp");
        let version = r.u32()?;
        if version != 0x0001_0000 {
            return Err(FontDecodeError::BadMaxpVersion(version));
        }
        Ok(Self { version, num_glyphs: r.u16()? })
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// hhea / vhea + hmtx / vmtx
// ═══════════════════════════════════════════════════════════════════════════

/// `hhea` and `vhea` share a layout; only the fields used here are kept.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MetricsHeader {
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
    pub num_long_metrics: u16,
}

impl MetricsHeader {
    pub fn parse(table: &[u8], what: &'static str) -> Result<Self> {
        let mut r = Reader::new(table, what);
        r.skip(4)?; // version
        let ascender = r.i16()?;
        let descender = r.i16()?;
        let line_gap = r.i16()?;
        r.skip(24)?;
        let num_long_metrics = r.u16()?;
        Ok(Self { ascender, descender, line_gap, num_long_metrics })
    }

    pub fn line_jump(&self) -> i32 {
        self.ascender as i32 - self.descender as i32 + self.line_gap as i32
    }
}

/// Advance and side bearing of one glyph along one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LongMetric {
    pub advance: u16,
    pub side_bearing: i16,
}

/// A `hmtx` or `vmtx` table: `num_long` full records followed by a
/// side-bearing-only array for the remaining glyphs.
#[derive(Clone, Copy, Debug)]
pub struct MetricsTable<'a> {
    data: &'a [u8],
    num_long: u16,
    what: &'static str,
}

impl<'a> MetricsTable<'a> {
    pub fn new(data: &'a [u8], num_long: u16, what: &'static str) -> Self {
        Self { data, num_long, what }
    }

    /// Glyphs past the long records take the last record's advance and read
    /// their side bearing from the trailing array.
    pub fn get(&self, glyph_id: u16) -> Result<LongMetric> {
        let n = self.num_long as usize;
        let id = glyph_id as usize;
        if id < n {
            let mut r = Reader::at(self.data, id * 4, self.what);
            return Ok(LongMetric { advance: r.u16()?, side_bearing: r.i16()? });
        }
        let last = n.checked_sub(1).ok_or(FontDecodeError::UnexpectedEof {
            what: self.what,
            offset: 0,
        })?;
        let advance = Reader::at(self.data, last * 4, self.what).u16()?;
        let side_bearing = Reader::at(self.data, n * 4 + (id - n) * 2, self.what).i16()?;
        Ok(LongMetric { advance, side_bearing })
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// OS/2
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Os2Table {
    pub version: u16,
    pub fs_selection: FsSelection,
    pub typo_ascender: i16,
    pub typo_descender: i16,
    pub typo_line_gap: i16,
}

impl Os2Table {
    pub fn parse(table: &[u8]) -> Result<Self> {
        let mut r = Reader::new(table, "OS/2");
        let version = r.u16()?;
        if version < 2 {
            return Err(FontDecodeError::Os2VersionTooOld(version));
        }
        let mut r = Reader::at(table, 62, "OS/2");
        let fs_selection = FsSelection::from_bits_retain(r.u16()?);
        r.skip(4)?; // usFirstCharIndex, usLastCharIndex
        Ok(Self {
            version,
            fs_selection,
            typo_ascender: r.i16()?,
            typo_descender: r.i16()?,
            typo_line_gap: r.i16()?,
        })
    }

    pub fn line_jump(&self) -> i32 {
        self.typo_ascender as i32 - self.typo_descender as i32 + self.typo_line_gap as i32
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Glyph header
// ═══════════════════════════════════════════════════════════════════════════

pub const GLYPH_HEADER_SIZE: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphHeader {
    /// Negative for composite glyphs.
    pub number_of_contours: i16,
    pub bounds: BoundingBox,
}

impl GlyphHeader {
    pub fn parse(glyf: &[u8], offset: usize) -> Result<Self> {
        let mut r = Reader::at(glyf, offset, "glyph header");
        Ok(Self {
            number_of_contours: r.i16()?,
            bounds: BoundingBox {
                x_min: r.i16()?,
                y_min: r.i16()?,
                x_max: r.i16()?,
                y_max: r.i16()?,
            },
        })
    }

    pub fn is_composite(&self) -> bool {
        self.number_of_contours < 0
    }
}
