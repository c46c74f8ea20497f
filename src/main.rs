// src/main.rs

//! `ttf-bake`: bakes a TrueType font's printable ASCII outlines and reports
//! what was produced.
//!
//! ```text
//! ttf-bake <font.ttf> [--config <config.json>] [--json] [--dump <char>]
//! ```

use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use serde::Serialize;
use std::path::PathBuf;

use ttf_bake::{bake_font, CompositeRecord, ContourRecord, DecoderConfig, GameFont, GlyphArena, PointRecord};

#[derive(Parser, Debug)]
#[command(name = "ttf-bake", about = "Bake a TrueType font's printable ASCII outlines")]
struct Cli {
    /// TrueType font file to decode
    font: PathBuf,
    /// JSON decoder config; defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the baked font as JSON instead of a summary
    #[arg(long)]
    json: bool,
    /// Print one character's contours, points and components as JSON
    #[arg(long)]
    dump: Option<char>,
}

#[derive(Serialize)]
struct ContourDump {
    #[serde(flatten)]
    contour: ContourRecord,
    points: Vec<PointRecord>,
}

#[derive(Serialize)]
struct GlyphDump {
    letter: char,
    contours: Vec<ContourDump>,
    components: Vec<CompositeRecord>,
}

fn dump_glyph(font: &GameFont, arena: &GlyphArena, c: char) -> anyhow::Result<GlyphDump> {
    let character = font
        .character(c)
        .with_context(|| format!("'{}' is not a printable character", c))?;
    let contours = character
        .contours(arena)
        .into_iter()
        .map(|contour| ContourDump { points: contour.points(arena), contour })
        .collect();
    Ok(GlyphDump { letter: c, contours, components: character.composite_records(arena) })
}

fn main() -> anyhow::Result<()> {
    // Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let args = Cli::parse();

    let config = match &args.config {
        Some(path) => DecoderConfig::from_json_file(path)?,
        None => DecoderConfig::default(),
    };
    info!("Decoder config: {:?}", config);

    let data = std::fs::read(&args.font)
        .with_context(|| format!("Failed to read font {}", args.font.display()))?;
    let (font, arena) = bake_font(&data, &config).map_err(|e| {
        if e.is_internal() {
            warn!("internal decoder error, please report it: {}", e);
        }
        e
    })
    .with_context(|| format!("Failed to bake {}", args.font.display()))?;

    if let Some(c) = args.dump {
        let glyph = dump_glyph(&font, &arena, c)?;
        println!("{}", serde_json::to_string_pretty(&glyph)?);
    } else if args.json {
        println!("{}", serde_json::to_string_pretty(&font)?);
    } else {
        println!("font:         {}", args.font.display());
        println!("units per em: {}", font.units_per_em);
        println!("line jump:    {}", font.line_jump);
        println!("space:        {}", font.space_advance);
        println!("points:       {} ({} on-curve)", font.n_points, font.n_on_curve);
        println!("arena bytes:  {}", font.size);
        let composites = font.characters.iter().filter(|c| c.is_composite()).count();
        println!("composites:   {}", composites);
    }
    Ok(())
}
