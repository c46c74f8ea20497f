#![allow(dead_code)]

pub mod font_builder;

pub use font_builder::{ComponentSpec, FontBuilder, Glyph, Os2Spec, Point, Transform};

use ttf_bake::{load_font, preprocess_font, DecoderConfig, GameFont, GlyphArena};

pub const NOTDEF: u16 = 0;
pub const SPACE: u16 = 1;

/// A clockwise box: the shape every unmapped character falls back to.
pub fn notdef_box() -> Glyph {
    Glyph::Simple(vec![vec![
        (100, 0, true),
        (100, 700, true),
        (500, 700, true),
        (500, 0, true),
    ]])
}

/// `.notdef` as glyph 0 and an outline-less space as glyph 1.
pub fn base_font() -> FontBuilder {
    let mut font = FontBuilder::new();
    font.glyph(notdef_box(), 600, 100);
    font.glyph(Glyph::Empty, 250, 0);
    font.map(' ', SPACE);
    font
}

/// Hand-encoded 'A': a clockwise triangle followed by a counter-clockwise
/// quadratic counter with two consecutive off-curve points.
///
/// ```text
/// contour 0: (0,0) on, (250,700) on, (500,0) on
/// contour 1: (200,200) off, (300,200) off, (250,350) on
/// ```
pub fn golden_a_bytes() -> Vec<u8> {
    let mut g = Vec::new();
    for v in [2i16, 0, 0, 500, 700] {
        g.extend(v.to_be_bytes());
    }
    g.extend([0x00, 0x02, 0x00, 0x05]); // end points
    g.extend([0x00, 0x00]); // no instructions
    g.extend([0x31, 0x1B, 0x01, 0x24, 0x32, 0x27]); // flags, 0x13 repeated once
    g.extend([0xFA, 0xFA, 0xFE, 0xD4, 0x64, 0x32]); // x deltas
    g.extend([0x02, 0xBC, 0xFD, 0x44, 0xC8, 0x96]); // y deltas
    g
}

/// The decoded points of [`golden_a_bytes`], midpoint included.
pub fn golden_a_points() -> Vec<Vec<(f32, f32, bool)>> {
    vec![
        vec![(0.0, 0.0, true), (250.0, 700.0, true), (500.0, 0.0, true)],
        vec![
            (200.0, 200.0, false),
            (250.0, 200.0, true),
            (300.0, 200.0, false),
            (250.0, 350.0, true),
        ],
    ]
}

/// Base font plus the golden 'A' mapped as glyph 2.
pub fn font_with_a() -> FontBuilder {
    let mut font = base_font();
    let a = font.glyph(Glyph::Raw(golden_a_bytes()), 520, 0);
    font.map('A', a);
    font
}

/// Base font with every printable character mapped to its own copy of the
/// notdef box, so nothing falls back.
pub fn full_font() -> FontBuilder {
    let mut font = base_font();
    for c in '!'..='~' {
        let id = font.glyph(notdef_box(), 600, 100);
        font.map(c, id);
    }
    font
}

/// Runs both passes with the default config and checks that loading filled
/// exactly the budget the sizing pass computed.
pub fn bake(builder: &FontBuilder) -> (GameFont, GlyphArena) {
    let data = builder.build();
    let preprocessed = preprocess_font(&data, &DecoderConfig::default()).unwrap();
    let mut arena = GlyphArena::with_capacity(preprocessed.size);
    let font = load_font(&mut arena, &preprocessed).unwrap();
    assert_eq!(arena.used(), preprocessed.size);
    assert_eq!(font.size, preprocessed.size);
    (font, arena)
}
