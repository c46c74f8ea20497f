// src/outline.rs

//! Walkers over `glyf` records shared by the sizing and loading passes:
//! the simple-glyph header, the run-length point flag stream, the
//! delta-encoded coordinate streams, and the composite component chain.

use crate::error::{FontDecodeError, Result};
use crate::geometry::{Matrix2, Point2};
use crate::ttf::tables::GLYPH_HEADER_SIZE;
use crate::ttf::{CompositeGlyphFlags, Reader, SimpleGlyphFlags};

// ═══════════════════════════════════════════════════════════════════════════
// Simple glyphs
// ═══════════════════════════════════════════════════════════════════════════

/// Layout of a simple glyph body: contour end points, instructions, and
/// where the flag stream begins.
#[derive(Clone, Debug)]
pub struct SimpleOutline<'a> {
    glyf: &'a [u8],
    endpoints: Vec<u16>,
    flags_at: usize,
}

impl<'a> SimpleOutline<'a> {
    /// `glyph_offset` points at the glyph header inside `glyf`.
    pub fn parse(glyf: &'a [u8], glyph_offset: usize, n_contours: u16, ch: char) -> Result<Self> {
        let mut r = Reader::at(glyf, glyph_offset + GLYPH_HEADER_SIZE, "contour end points");
        let endpoints = (0..n_contours)
            .map(|_| r.u16())
            .collect::<Result<Vec<_>>>()?;
        if endpoints.windows(2).any(|w| w[1] <= w[0]) {
            return Err(FontDecodeError::BadContourEndpoints(ch));
        }
        let instruction_length = r.u16()? as usize;
        r.skip(instruction_length)?;
        Ok(Self { glyf, endpoints, flags_at: r.position() })
    }

    pub fn endpoints(&self) -> &[u16] {
        &self.endpoints
    }

    pub fn n_contours(&self) -> usize {
        self.endpoints.len()
    }

    /// Raw points in the glyph (before midpoint synthesis).
    pub fn n_points(&self) -> usize {
        self.endpoints.last().map_or(0, |&e| e as usize + 1)
    }

    pub fn flags(&self) -> FlagStream<'a> {
        FlagStream::new(Reader::at(self.glyf, self.flags_at, "point flags"))
    }

    /// Expands every point flag, then decodes the X and Y streams that follow
    /// them. Deltas accumulate across contour boundaries from (0, 0).
    pub fn decode_points(&self, out: &mut Vec<(Point2, bool)>) -> Result<()> {
        let n = self.n_points();
        let mut stream = self.flags();
        let flags = (0..n).map(|_| stream.next_flag()).collect::<Result<Vec<_>>>()?;

        let x_at = stream.position();
        let x_len: usize = flags.iter().map(|f| f.x_bytes()).sum();
        let mut xs = CoordinateStream::new(Reader::at(self.glyf, x_at, "x coordinates"));
        let mut ys = CoordinateStream::new(Reader::at(self.glyf, x_at + x_len, "y coordinates"));

        out.clear();
        out.reserve(n);
        for f in flags {
            let x = xs.next_coordinate(
                f.contains(SimpleGlyphFlags::X_SHORT_VECTOR),
                f.contains(SimpleGlyphFlags::X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR),
            )?;
            let y = ys.next_coordinate(
                f.contains(SimpleGlyphFlags::Y_SHORT_VECTOR),
                f.contains(SimpleGlyphFlags::Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR),
            )?;
            out.push((Point2::new(x as f32, y as f32), f.on_curve()));
        }
        Ok(())
    }
}

/// Run-length encoded point flags. A flag with `REPEAT_FLAG` set is followed
/// by a count of extra copies.
#[derive(Clone, Debug)]
pub struct FlagStream<'a> {
    r: Reader<'a>,
    flag: SimpleGlyphFlags,
    repeats: u8,
}

impl<'a> FlagStream<'a> {
    pub fn new(r: Reader<'a>) -> Self {
        Self { r, flag: SimpleGlyphFlags::empty(), repeats: 0 }
    }

    pub fn next_flag(&mut self) -> Result<SimpleGlyphFlags> {
        if self.repeats > 0 {
            self.repeats -= 1;
            return Ok(self.flag);
        }
        let flag = SimpleGlyphFlags::from_bits_retain(self.r.u8()?);
        if flag.contains(SimpleGlyphFlags::REPEAT_FLAG) {
            self.repeats = self.r.u8()?;
        }
        self.flag = flag;
        Ok(flag)
    }

    /// Offset just past the last flag byte consumed.
    pub fn position(&self) -> usize {
        self.r.position()
    }
}

/// One axis of delta-encoded coordinates.
#[derive(Clone, Debug)]
pub struct CoordinateStream<'a> {
    r: Reader<'a>,
    last: i32,
}

impl<'a> CoordinateStream<'a> {
    pub fn new(r: Reader<'a>) -> Self {
        Self { r, last: 0 }
    }

    pub fn next_coordinate(&mut self, short: bool, same_or_positive: bool) -> Result<i32> {
        self.last += match (short, same_or_positive) {
            (true, true) => self.r.u8()? as i32,
            (true, false) => -(self.r.u8()? as i32),
            (false, true) => 0,
            (false, false) => self.r.i16()? as i32,
        };
        Ok(self.last)
    }
}

/// Output size of one contour once implicit on-curve midpoints are inserted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContourCount {
    pub points: u32,
    pub on_curve: u32,
}

/// Counts output points for a contour from its on-curve bits alone.
///
/// Matches [`expand_contour`]: one midpoint between every pair of adjacent
/// off-curve points, including the pair that wraps from last to first.
pub fn count_contour(on_curve: impl IntoIterator<Item = bool>) -> ContourCount {
    let mut count = ContourCount::default();
    let mut first: Option<bool> = None;
    let mut previous: Option<bool> = None;
    for on in on_curve {
        if previous == Some(false) && !on {
            count.points += 1;
            count.on_curve += 1;
        }
        count.points += 1;
        count.on_curve += on as u32;
        first.get_or_insert(on);
        previous = Some(on);
    }
    if count.points > 1 && first == Some(false) && previous == Some(false) {
        count.points += 1;
        count.on_curve += 1;
    }
    count
}

/// Writes a contour's output sequence into `out`, synthesizing an on-curve
/// midpoint between adjacent off-curve points.
pub fn expand_contour(raw: &[(Point2, bool)], out: &mut Vec<(Point2, bool)>) {
    out.clear();
    for (i, &(p, on)) in raw.iter().enumerate() {
        if i > 0 {
            let (prev, prev_on) = raw[i - 1];
            if !prev_on && !on {
                out.push((prev.midpoint(p), true));
            }
        }
        out.push((p, on));
    }
    if let (Some(&(first, first_on)), Some(&(last, last_on))) = (raw.first(), raw.last()) {
        if raw.len() > 1 && !first_on && !last_on {
            out.push((last.midpoint(first), true));
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Composite glyphs
// ═══════════════════════════════════════════════════════════════════════════

/// One decoded component record.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Component {
    pub flags: CompositeGlyphFlags,
    pub glyph_index: u16,
    /// Offsets when `ARGS_ARE_XY_VALUES` is set, point numbers otherwise.
    pub args: (i32, i32),
    pub transform: Matrix2,
}

impl Component {
    /// Where the child's origin lands in the parent, or `None` for
    /// point-aligned placement.
    pub fn translation(&self) -> Option<Point2> {
        if !self.flags.contains(CompositeGlyphFlags::ARGS_ARE_XY_VALUES) {
            return None;
        }
        let offset = Point2::new(self.args.0 as f32, self.args.1 as f32);
        if self.flags.contains(CompositeGlyphFlags::SCALED_COMPONENT_OFFSET) {
            Some(self.transform.apply(offset))
        } else {
            Some(offset)
        }
    }
}

/// Cursor over the component chain of a composite glyph.
#[derive(Clone, Debug)]
pub struct Components<'a> {
    r: Reader<'a>,
    ch: char,
    done: bool,
}

impl<'a> Components<'a> {
    /// `glyph_offset` points at the glyph header inside `glyf`; `ch` names
    /// the character in errors.
    pub fn new(glyf: &'a [u8], glyph_offset: usize, ch: char) -> Self {
        Self {
            r: Reader::at(glyf, glyph_offset + GLYPH_HEADER_SIZE, "component records"),
            ch,
            done: false,
        }
    }

    fn header(&mut self) -> Result<Option<(CompositeGlyphFlags, u16)>> {
        if self.done {
            return Ok(None);
        }
        let flags = CompositeGlyphFlags::from_bits_retain(self.r.u16()?);
        let glyph_index = self.r.u16()?;
        if flags.has_conflicting_transforms() {
            return Err(FontDecodeError::UnsupportedComposite { ch: self.ch, flags: flags.bits() });
        }
        self.done = !flags.contains(CompositeGlyphFlags::MORE_COMPONENTS);
        Ok(Some((flags, glyph_index)))
    }

    /// Steps over the next record without decoding its arguments, returning
    /// the child glyph index.
    pub fn skip_component(&mut self) -> Result<Option<u16>> {
        let Some((flags, glyph_index)) = self.header()? else {
            return Ok(None);
        };
        self.r.skip(flags.argument_bytes() + flags.transform_bytes())?;
        Ok(Some(glyph_index))
    }

    pub fn next_component(&mut self) -> Result<Option<Component>> {
        let Some((flags, glyph_index)) = self.header()? else {
            return Ok(None);
        };
        let words = flags.contains(CompositeGlyphFlags::ARG_1_AND_2_ARE_WORDS);
        let signed = flags.contains(CompositeGlyphFlags::ARGS_ARE_XY_VALUES);
        let arg = |r: &mut Reader<'a>| -> Result<i32> {
            Ok(match (words, signed) {
                (true, true) => r.i16()? as i32,
                (true, false) => r.u16()? as i32,
                (false, true) => r.i8()? as i32,
                (false, false) => r.u8()? as i32,
            })
        };
        let args = (arg(&mut self.r)?, arg(&mut self.r)?);

        let mut transform = Matrix2::IDENTITY;
        if flags.contains(CompositeGlyphFlags::WE_HAVE_A_SCALE) {
            let s = self.r.f2dot14()?;
            transform.xx = s;
            transform.yy = s;
        } else if flags.contains(CompositeGlyphFlags::WE_HAVE_AN_X_AND_Y_SCALE) {
            transform.xx = self.r.f2dot14()?;
            transform.yy = self.r.f2dot14()?;
        } else if flags.contains(CompositeGlyphFlags::WE_HAVE_A_TWO_BY_TWO) {
            transform.xx = self.r.f2dot14()?;
            transform.yx = self.r.f2dot14()?;
            transform.xy = self.r.f2dot14()?;
            transform.yy = self.r.f2dot14()?;
        }

        Ok(Some(Component { flags, glyph_index, args, transform }))
    }
}
