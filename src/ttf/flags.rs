// src/ttf/flags.rs

//! Bit flags found in `glyf` records and the `OS/2` table.

use bitflags::bitflags;

bitflags! {
    /// Per-point flags of a simple glyph.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SimpleGlyphFlags: u8 {
        const ON_CURVE_POINT                       = 1 << 0;
        const X_SHORT_VECTOR                       = 1 << 1;
        const Y_SHORT_VECTOR                       = 1 << 2;
        const REPEAT_FLAG                          = 1 << 3;
        const X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR = 1 << 4;
        const Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR = 1 << 5;
        const OVERLAP_SIMPLE                       = 1 << 6;
    }
}

impl SimpleGlyphFlags {
    pub fn on_curve(self) -> bool {
        self.contains(Self::ON_CURVE_POINT)
    }

    /// Bytes this point contributes to the X coordinate stream.
    pub fn x_bytes(self) -> usize {
        coordinate_bytes(
            self.contains(Self::X_SHORT_VECTOR),
            self.contains(Self::X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR),
        )
    }

    /// Bytes this point contributes to the Y coordinate stream.
    pub fn y_bytes(self) -> usize {
        coordinate_bytes(
            self.contains(Self::Y_SHORT_VECTOR),
            self.contains(Self::Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR),
        )
    }
}

fn coordinate_bytes(short: bool, same_or_positive: bool) -> usize {
    match (short, same_or_positive) {
        (true, _) => 1,
        (false, true) => 0,
        (false, false) => 2,
    }
}

bitflags! {
    /// Flags of one component record in a composite glyph.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CompositeGlyphFlags: u16 {
        const ARG_1_AND_2_ARE_WORDS     = 1 << 0;
        const ARGS_ARE_XY_VALUES        = 1 << 1;
        const ROUND_XY_TO_GRID          = 1 << 2;
        const WE_HAVE_A_SCALE           = 1 << 3;
        const MORE_COMPONENTS           = 1 << 5;
        const WE_HAVE_AN_X_AND_Y_SCALE  = 1 << 6;
        const WE_HAVE_A_TWO_BY_TWO      = 1 << 7;
        const WE_HAVE_INSTRUCTIONS      = 1 << 8;
        const USE_MY_METRICS            = 1 << 9;
        const OVERLAP_COMPOUND          = 1 << 10;
        const SCALED_COMPONENT_OFFSET   = 1 << 11;
        const UNSCALED_COMPONENT_OFFSET = 1 << 12;
    }
}

impl CompositeGlyphFlags {
    const TRANSFORMS: Self = Self::WE_HAVE_A_SCALE
        .union(Self::WE_HAVE_AN_X_AND_Y_SCALE)
        .union(Self::WE_HAVE_A_TWO_BY_TWO);

    /// More than one transform kind set on the same component.
    pub fn has_conflicting_transforms(self) -> bool {
        self.intersection(Self::TRANSFORMS).bits().count_ones() > 1
    }

    /// Bytes taken by the two component arguments.
    pub fn argument_bytes(self) -> usize {
        if self.contains(Self::ARG_1_AND_2_ARE_WORDS) {
            4
        } else {
            2
        }
    }

    /// Bytes taken by the optional scale or 2x2 transform.
    pub fn transform_bytes(self) -> usize {
        if self.contains(Self::WE_HAVE_A_SCALE) {
            2
        } else if self.contains(Self::WE_HAVE_AN_X_AND_Y_SCALE) {
            4
        } else if self.contains(Self::WE_HAVE_A_TWO_BY_TWO) {
            8
        } else {
            0
        }
    }
}

bitflags! {
    /// `OS/2.fsSelection` bits the decoder cares about.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FsSelection: u16 {
        const ITALIC           = 1 << 0;
        const BOLD             = 1 << 5;
        const REGULAR          = 1 << 6;
        const USE_TYPO_METRICS = 1 << 7;
        const _ = !0;
    }
}
