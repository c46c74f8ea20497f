// src/config.rs

//! Decoder policy knobs.
//!
//! Everything here has a default, so an empty JSON object (or no config file
//! at all) gives the stock behaviour.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to do with a printable character the `cmap` does not cover.
///
/// The space character is required regardless of this setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingGlyphPolicy {
    /// Abort the load with `CharacterNotFound`.
    Fail,
    /// Log a warning and use glyph 0 (`.notdef`).
    #[default]
    NotDef,
}

/// Which vertical metrics the line jump is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LineJumpSource {
    /// Typographic metrics when `OS/2.fsSelection` asks for them, `hhea`
    /// otherwise.
    #[default]
    Auto,
    Hhea,
    /// Typographic metrics whenever an `OS/2` table exists.
    Typo,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DecoderConfig {
    pub missing_glyph: MissingGlyphPolicy,
    pub line_jump: LineJumpSource,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            missing_glyph: MissingGlyphPolicy::NotDef,
            line_jump: LineJumpSource::Auto,
        }
    }
}

impl DecoderConfig {
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}
