// src/layout.rs

//! Text measurement over a loaded font.

use crate::load::GameFont;

/// Screen resolution assumed when converting points to pixels.
pub const DPI: f32 = 96.0;

/// Pixel size of a measured string.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextExtent {
    pub width: f32,
    pub height: f32,
}

impl GameFont {
    pub fn pixels_per_em(&self, points: f32) -> f32 {
        points * (DPI / 72.0) / self.units_per_em.max(1) as f32
    }

    /// Height of one line of text.
    pub fn char_max_height(&self, points: f32) -> f32 {
        self.line_jump as f32 * self.pixels_per_em(points)
    }

    /// Width of the widest line and the height of all lines.
    ///
    /// `"##"` ends the measured text. Characters without outlines other than
    /// space and newline take no room.
    pub fn text_extent(&self, text: &str, points: f32) -> TextExtent {
        let scale = self.pixels_per_em(points);
        let line = self.char_max_height(points);
        let text = text.split("##").next().unwrap_or_default();

        let mut extent = TextExtent { width: 0.0, height: line };
        let mut width = 0.0f32;
        for c in text.chars() {
            match c {
                '\n' => {
                    extent.width = extent.width.max(width);
                    extent.height += line;
                    width = 0.0;
                }
                ' ' => width += self.space_advance as f32 * scale,
                c => {
                    if let Some(character) = self.character(c) {
                        width += character.advance_width as f32 * scale;
                    }
                }
            }
        }
        extent.width = extent.width.max(width);
        extent
    }
}
