// src/arena.rs

//! Pre-sized byte arena the loading pass writes glyph geometry into, and the
//! fixed-size little-endian records stored in it.
//!
//! The arena never grows past the capacity it was created with: the sizing
//! pass computes the exact budget up front, and running out of room means the
//! two passes disagree. Every push returns the byte offset it wrote at; those
//! offsets are what the loaded font stores instead of pointers.

use serde::Serialize;

use crate::error::{FontDecodeError, Result};
use crate::geometry::{Matrix2, Point2};

/// Packed size of a [`ContourRecord`].
pub const CONTOUR_RECORD_SIZE: usize = 16;
/// Packed size of a [`PointRecord`].
pub const POINT_RECORD_SIZE: usize = 16;
/// Packed size of a [`CompositeRecord`].
pub const COMPOSITE_RECORD_SIZE: usize = 28;

#[derive(Debug, Clone, Default)]
pub struct GlyphArena {
    buf: Vec<u8>,
    capacity: usize,
}

impl GlyphArena {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { buf: Vec::with_capacity(capacity), capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current cursor: bytes written so far.
    pub fn used(&self) -> usize {
        self.buf.len()
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.buf.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Rewinds the cursor to zero, keeping the capacity.
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    /// Reserves `n` zeroed bytes and returns their offset.
    pub fn reserve(&mut self, n: usize) -> Result<usize> {
        if n > self.remaining() {
            return Err(FontDecodeError::ArenaExhausted {
                requested: n,
                available: self.remaining(),
            });
        }
        let offset = self.buf.len();
        self.buf.resize(offset + n, 0);
        Ok(offset)
    }

    /// Overwrites already reserved bytes.
    pub fn write_at(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        let end = offset + bytes.len();
        let dst = self.buf.get_mut(offset..end).ok_or(FontDecodeError::ArenaExhausted {
            requested: end,
            available: self.capacity,
        })?;
        dst.copy_from_slice(bytes);
        Ok(())
    }

    fn push_bytes(&mut self, bytes: &[u8]) -> Result<usize> {
        let offset = self.reserve(bytes.len())?;
        self.write_at(offset, bytes)?;
        Ok(offset)
    }

    pub fn push_point(&mut self, point: &PointRecord) -> Result<usize> {
        self.push_bytes(&point.encode())
    }

    pub fn push_composite(&mut self, record: &CompositeRecord) -> Result<usize> {
        self.push_bytes(&record.encode())
    }

    /// Reserves `n` contour slots to be filled in with [`Self::write_contour`].
    pub fn reserve_contours(&mut self, n: usize) -> Result<usize> {
        self.reserve(n * CONTOUR_RECORD_SIZE)
    }

    pub fn write_contour(&mut self, offset: usize, contour: &ContourRecord) -> Result<()> {
        self.write_at(offset, &contour.encode())
    }

    fn record<const N: usize>(&self, offset: usize) -> Option<[u8; N]> {
        self.buf.get(offset..offset + N)?.try_into().ok()
    }

    pub fn contour(&self, offset: usize) -> Option<ContourRecord> {
        self.record::<CONTOUR_RECORD_SIZE>(offset)
            .map(|b| ContourRecord::decode(&b))
    }

    pub fn point(&self, offset: usize) -> Option<PointRecord> {
        self.record::<POINT_RECORD_SIZE>(offset)
            .map(|b| PointRecord::decode(&b))
    }

    pub fn composite(&self, offset: usize) -> Option<CompositeRecord> {
        self.record::<COMPOSITE_RECORD_SIZE>(offset)
            .map(|b| CompositeRecord::decode(&b))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Records
// ═══════════════════════════════════════════════════════════════════════════

fn le_u32(b: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

fn le_f32(b: &[u8], at: usize) -> f32 {
    f32::from_bits(le_u32(b, at))
}

/// One closed loop of output points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ContourRecord {
    /// Arena offset of the first [`PointRecord`].
    pub points_offset: u32,
    /// Index of the last point, counted across the character's contours.
    pub endpoint: u32,
    pub n_points: u32,
    pub is_convex: bool,
    pub is_exterior: bool,
}

impl ContourRecord {
    pub fn encode(&self) -> [u8; CONTOUR_RECORD_SIZE] {
        let mut b = [0u8; CONTOUR_RECORD_SIZE];
        b[0..4].copy_from_slice(&self.points_offset.to_le_bytes());
        b[4..8].copy_from_slice(&self.endpoint.to_le_bytes());
        b[8..12].copy_from_slice(&self.n_points.to_le_bytes());
        b[12] = self.is_convex as u8;
        b[13] = self.is_exterior as u8;
        b
    }

    pub fn decode(b: &[u8; CONTOUR_RECORD_SIZE]) -> Self {
        Self {
            points_offset: le_u32(b, 0),
            endpoint: le_u32(b, 4),
            n_points: le_u32(b, 8),
            is_convex: b[12] != 0,
            is_exterior: b[13] != 0,
        }
    }

    /// Reads this contour's points back out of the arena.
    pub fn points(&self, arena: &GlyphArena) -> Vec<PointRecord> {
        (0..self.n_points as usize)
            .filter_map(|i| arena.point(self.points_offset as usize + i * POINT_RECORD_SIZE))
            .collect()
    }
}

/// One output point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct PointRecord {
    /// Position within the contour.
    pub index: u32,
    pub x: f32,
    pub y: f32,
    pub on_curve: bool,
}

impl PointRecord {
    pub fn position(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    pub fn encode(&self) -> [u8; POINT_RECORD_SIZE] {
        let mut b = [0u8; POINT_RECORD_SIZE];
        b[0..4].copy_from_slice(&self.index.to_le_bytes());
        b[4..8].copy_from_slice(&self.x.to_le_bytes());
        b[8..12].copy_from_slice(&self.y.to_le_bytes());
        b[12] = self.on_curve as u8;
        b
    }

    pub fn decode(b: &[u8; POINT_RECORD_SIZE]) -> Self {
        Self {
            index: le_u32(b, 0),
            x: le_f32(b, 4),
            y: le_f32(b, 8),
            on_curve: b[12] != 0,
        }
    }
}

/// Placement of one child of a multi-child composite glyph.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CompositeRecord {
    pub transform: Matrix2,
    pub x: f32,
    pub y: f32,
    /// The printable character whose outline is the child.
    pub child: char,
}

impl CompositeRecord {
    /// Maps a point from the child's frame into the parent's.
    pub fn place(&self, p: Point2) -> Point2 {
        let q = self.transform.apply(p);
        Point2::new(q.x + self.x, q.y + self.y)
    }

    pub fn encode(&self) -> [u8; COMPOSITE_RECORD_SIZE] {
        let mut b = [0u8; COMPOSITE_RECORD_SIZE];
        let t = &self.transform;
        for (i, v) in [t.xx, t.xy, t.yx, t.yy, self.x, self.y].iter().enumerate() {
            b[i * 4..i * 4 + 4].copy_from_slice(&v.to_le_bytes());
        }
        b[24] = self.child as u8;
        b
    }

    pub fn decode(b: &[u8; COMPOSITE_RECORD_SIZE]) -> Self {
        Self {
            transform: Matrix2 {
                xx: le_f32(b, 0),
                xy: le_f32(b, 4),
                yx: le_f32(b, 8),
                yy: le_f32(b, 12),
            },
            x: le_f32(b, 16),
            y: le_f32(b, 20),
            child: b[24] as char,
        }
    }
}
