//! Minimal sfnt writer for building test fonts byte by byte.
//!
//! Produces `head`, `maxp`, `hhea`/`hmtx`, optional `vhea`/`vmtx`, optional
//! `OS/2`, a format 4 `cmap`, `loca` in either format, and `glyf` with simple
//! and composite glyphs. Flags are run-length compressed and coordinates use
//! the shortest encoding, the way font tools write them.

/// `(x, y, on_curve)` in font units.
pub type Point = (i16, i16, bool);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transform {
    None,
    Scale(f32),
    XyScale(f32, f32),
    /// TrueType order: `[a, b, c, d]`.
    TwoByTwo([f32; 4]),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ComponentSpec {
    pub glyph: u16,
    pub dx: i16,
    pub dy: i16,
    pub transform: Transform,
    pub xy_values: bool,
    pub scaled_offset: bool,
    pub extra_flags: u16,
}

impl ComponentSpec {
    pub fn offset(glyph: u16, dx: i16, dy: i16) -> Self {
        Self {
            glyph,
            dx,
            dy,
            transform: Transform::None,
            xy_values: true,
            scaled_offset: false,
            extra_flags: 0,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn scaled_offset(mut self) -> Self {
        self.scaled_offset = true;
        self
    }

    /// Places the child by matching point numbers `dx` and `dy`.
    pub fn point_aligned(mut self) -> Self {
        self.xy_values = false;
        self
    }

    pub fn with_flags(mut self, flags: u16) -> Self {
        self.extra_flags |= flags;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Glyph {
    Empty,
    Simple(Vec<Vec<Point>>),
    Composite(Vec<ComponentSpec>),
    /// Already encoded, header included.
    Raw(Vec<u8>),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Os2Spec {
    pub use_typo_metrics: bool,
    pub typo_ascender: i16,
    pub typo_descender: i16,
    pub typo_line_gap: i16,
}

#[derive(Clone, Debug)]
pub struct FontBuilder {
    glyphs: Vec<Glyph>,
    hmetrics: Vec<(u16, i16)>,
    vmetrics: Vec<(u16, i16)>,
    cmap: Vec<(char, u16)>,
    pub num_long_hmetrics: Option<u16>,
    /// Long vertical metric count; `None` leaves out `vhea` and `vmtx`.
    pub num_long_vmetrics: Option<u16>,
    pub os2: Option<Os2Spec>,
    pub long_loca: bool,
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
    pub head_magic: u32,
    pub omit: Vec<[u8; 4]>,
}

impl Default for FontBuilder {
    fn default() -> Self {
        Self {
            glyphs: Vec::new(),
            hmetrics: Vec::new(),
            vmetrics: Vec::new(),
            cmap: Vec::new(),
            num_long_hmetrics: None,
            num_long_vmetrics: None,
            os2: None,
            long_loca: false,
            units_per_em: 1000,
            ascender: 800,
            descender: -200,
            line_gap: 100,
            head_magic: 0x5F0F_3CF5,
            omit: Vec::new(),
        }
    }
}

impl FontBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a glyph and returns its id.
    pub fn glyph(&mut self, glyph: Glyph, advance: u16, lsb: i16) -> u16 {
        self.glyphs.push(glyph);
        self.hmetrics.push((advance, lsb));
        self.vmetrics.push((0, 0));
        (self.glyphs.len() - 1) as u16
    }

    pub fn vertical(&mut self, glyph_id: u16, advance: u16, tsb: i16) {
        self.vmetrics[glyph_id as usize] = (advance, tsb);
    }

    pub fn map(&mut self, c: char, glyph_id: u16) -> &mut Self {
        self.cmap.retain(|&(m, _)| m != c);
        self.cmap.push((c, glyph_id));
        self
    }

    pub fn n_glyphs(&self) -> u16 {
        self.glyphs.len() as u16
    }

    pub fn build(&self) -> Vec<u8> {
        let (glyf, loca) = self.glyf_and_loca();
        let mut tables: Vec<([u8; 4], Vec<u8>)> = vec![
            (*b"head", self.head()),
            (*b"maxp", self.maxp()),
            (*b"hhea", self.metrics_header(self.ascender, self.descender, self.line_gap, self.long_h())),
            (*b"hmtx", metrics_table(&self.hmetrics, self.long_h())),
            (*b"cmap", self.cmap()),
            (*b"loca", loca),
            (*b"glyf", glyf),
        ];
        if let Some(n) = self.num_long_vmetrics {
            tables.push((*b"vhea", self.metrics_header(500, -500, 0, n)));
            tables.push((*b"vmtx", metrics_table(&self.vmetrics, n)));
        }
        if let Some(os2) = self.os2 {
            tables.push((*b"OS/2", os2_table(&os2)));
        }
        tables.retain(|(tag, _)| !self.omit.contains(tag));
        tables.sort_by_key(|(tag, _)| *tag);
        sfnt(&tables)
    }

    fn long_h(&self) -> u16 {
        self.num_long_hmetrics.unwrap_or(self.glyphs.len() as u16)
    }

    fn bounds(&self) -> [i16; 4] {
        let points: Vec<Point> = self
            .glyphs
            .iter()
            .filter_map(|g| match g {
                Glyph::Simple(contours) => Some(contours.iter().flatten().copied()),
                _ => None,
            })
            .flatten()
            .collect();
        point_bounds(&points)
    }

    fn head(&self) -> Vec<u8> {
        let mut t = Vec::new();
        t.extend(0x0001_0000u32.to_be_bytes());
        t.extend(0x0001_0000u32.to_be_bytes()); // fontRevision
        t.extend(0u32.to_be_bytes()); // checkSumAdjustment
        t.extend(self.head_magic.to_be_bytes());
        t.extend(0x000Bu16.to_be_bytes());
        t.extend(self.units_per_em.to_be_bytes());
        t.extend([0u8; 16]);
        for v in self.bounds() {
            t.extend(v.to_be_bytes());
        }
        t.extend([0u8; 6]);
        t.extend((self.long_loca as i16).to_be_bytes());
        t.extend(0i16.to_be_bytes());
        t
    }

    fn maxp(&self) -> Vec<u8> {
        let mut t = Vec::new();
        t.extend(0x0001_0000u32.to_be_bytes());
        t.extend(self.n_glyphs().to_be_bytes());
        t.extend([0u8; 26]);
        t
    }

    fn metrics_header(&self, ascender: i16, descender: i16, line_gap: i16, n_long: u16) -> Vec<u8> {
        let mut t = Vec::new();
        t.extend(0x0001_0000u32.to_be_bytes());
        for v in [ascender, descender, line_gap] {
            t.extend(v.to_be_bytes());
        }
        t.extend([0u8; 24]);
        t.extend(n_long.to_be_bytes());
        t
    }

    fn cmap(&self) -> Vec<u8> {
        let mut pairs = self.cmap.clone();
        pairs.sort();

        // Merge runs where both the code and the glyph id step by one.
        let mut segments: Vec<(u16, u16, u16)> = Vec::new();
        for (c, g) in pairs {
            let c = c as u16;
            if let Some((start, end, first)) = segments.last_mut() {
                if *end + 1 == c && first.wrapping_add(c - *start) == g {
                    *end = c;
                    continue;
                }
            }
            segments.push((c, c, g));
        }
        segments.push((0xFFFF, 0xFFFF, 0));

        let n = segments.len() as u16;
        let entry_selector = 15 - n.leading_zeros() as u16;
        let search_range = 2 << entry_selector;
        let mut sub = Vec::new();
        for v in [4u16, 16 + 8 * n, 0, n * 2, search_range, entry_selector, n * 2 - search_range] {
            sub.extend(v.to_be_bytes());
        }
        for s in &segments {
            sub.extend(s.1.to_be_bytes());
        }
        sub.extend(0u16.to_be_bytes());
        for s in &segments {
            sub.extend(s.0.to_be_bytes());
        }
        for s in &segments {
            let delta = if s.0 == 0xFFFF { 1 } else { s.2.wrapping_sub(s.0) };
            sub.extend(delta.to_be_bytes());
        }
        for _ in &segments {
            sub.extend(0u16.to_be_bytes());
        }

        // A Unicode platform record ahead of the Windows one, sharing the subtable.
        let mut t = Vec::new();
        t.extend(0u16.to_be_bytes());
        t.extend(2u16.to_be_bytes());
        for (platform, encoding) in [(0u16, 3u16), (3, 1)] {
            t.extend(platform.to_be_bytes());
            t.extend(encoding.to_be_bytes());
            t.extend(20u32.to_be_bytes());
        }
        t.extend(sub);
        t
    }

    fn glyf_and_loca(&self) -> (Vec<u8>, Vec<u8>) {
        let mut glyf = Vec::new();
        let mut offsets = vec![0u32];
        for glyph in &self.glyphs {
            glyf.extend(encode_glyph(glyph));
            if glyf.len() % 2 == 1 {
                glyf.push(0);
            }
            offsets.push(glyf.len() as u32);
        }
        let mut loca = Vec::new();
        for offset in offsets {
            if self.long_loca {
                loca.extend(offset.to_be_bytes());
            } else {
                loca.extend(((offset / 2) as u16).to_be_bytes());
            }
        }
        (glyf, loca)
    }
}

fn point_bounds(points: &[Point]) -> [i16; 4] {
    if points.is_empty() {
        return [0; 4];
    }
    let x_min = points.iter().map(|p| p.0).min().unwrap_or(0);
    let y_min = points.iter().map(|p| p.1).min().unwrap_or(0);
    let x_max = points.iter().map(|p| p.0).max().unwrap_or(0);
    let y_max = points.iter().map(|p| p.1).max().unwrap_or(0);
    [x_min, y_min, x_max, y_max]
}

fn metrics_table(metrics: &[(u16, i16)], n_long: u16) -> Vec<u8> {
    let mut t = Vec::new();
    for (i, &(advance, bearing)) in metrics.iter().enumerate() {
        if i < n_long as usize {
            t.extend(advance.to_be_bytes());
        }
        t.extend(bearing.to_be_bytes());
    }
    t
}

fn os2_table(os2: &Os2Spec) -> Vec<u8> {
    let mut t = vec![0u8; 96];
    t[0..2].copy_from_slice(&4u16.to_be_bytes());
    let fs_selection: u16 = if os2.use_typo_metrics { 1 << 7 | 1 << 6 } else { 1 << 6 };
    t[62..64].copy_from_slice(&fs_selection.to_be_bytes());
    t[68..70].copy_from_slice(&os2.typo_ascender.to_be_bytes());
    t[70..72].copy_from_slice(&os2.typo_descender.to_be_bytes());
    t[72..74].copy_from_slice(&os2.typo_line_gap.to_be_bytes());
    t
}

fn f2dot14(v: f32) -> [u8; 2] {
    ((v * 16384.0).round() as i16).to_be_bytes()
}

pub fn encode_glyph(glyph: &Glyph) -> Vec<u8> {
    match glyph {
        Glyph::Empty => Vec::new(),
        Glyph::Raw(bytes) => bytes.clone(),
        Glyph::Simple(contours) => encode_simple(contours),
        Glyph::Composite(components) => encode_composite(components),
    }
}

fn encode_axis(delta: i32, short: u8, same: u8, flag: &mut u8, out: &mut Vec<u8>) {
    if delta == 0 {
        *flag |= same;
    } else if delta.abs() <= 255 {
        *flag |= short;
        if delta > 0 {
            *flag |= same;
        }
        out.push(delta.unsigned_abs() as u8);
    } else {
        out.extend((delta as i16).to_be_bytes());
    }
}

fn encode_simple(contours: &[Vec<Point>]) -> Vec<u8> {
    let points: Vec<Point> = contours.iter().flatten().copied().collect();
    let mut out = Vec::new();
    out.extend((contours.len() as i16).to_be_bytes());
    for v in point_bounds(&points) {
        out.extend(v.to_be_bytes());
    }
    let mut end = 0usize;
    for contour in contours {
        end += contour.len();
        out.extend(((end - 1) as u16).to_be_bytes());
    }
    out.extend(0u16.to_be_bytes()); // no instructions

    let mut flags = Vec::new();
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let (mut px, mut py) = (0i32, 0i32);
    for &(x, y, on) in &points {
        let mut flag = on as u8;
        encode_axis(x as i32 - px, 0x02, 0x10, &mut flag, &mut xs);
        encode_axis(y as i32 - py, 0x04, 0x20, &mut flag, &mut ys);
        flags.push(flag);
        px = x as i32;
        py = y as i32;
    }

    let mut i = 0;
    while i < flags.len() {
        let mut run = 1;
        while i + run < flags.len() && flags[i + run] == flags[i] && run < 256 {
            run += 1;
        }
        if run > 1 {
            out.push(flags[i] | 0x08);
            out.push((run - 1) as u8);
        } else {
            out.push(flags[i]);
        }
        i += run;
    }
    out.extend(xs);
    out.extend(ys);
    out
}

fn encode_composite(components: &[ComponentSpec]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend((-1i16).to_be_bytes());
    out.extend([0u8; 8]);
    for (i, c) in components.iter().enumerate() {
        let words = if c.xy_values {
            !(-128..=127).contains(&c.dx) || !(-128..=127).contains(&c.dy)
        } else {
            !(0..=255).contains(&c.dx) || !(0..=255).contains(&c.dy)
        };
        let mut flags = c.extra_flags;
        if words {
            flags |= 0x0001;
        }
        if c.xy_values {
            flags |= 0x0002;
        }
        if i + 1 < components.len() {
            flags |= 0x0020;
        }
        if c.scaled_offset {
            flags |= 0x0800;
        }
        flags |= match c.transform {
            Transform::None => 0,
            Transform::Scale(_) => 0x0008,
            Transform::XyScale(..) => 0x0040,
            Transform::TwoByTwo(_) => 0x0080,
        };

        out.extend(flags.to_be_bytes());
        out.extend(c.glyph.to_be_bytes());
        if words {
            out.extend(c.dx.to_be_bytes());
            out.extend(c.dy.to_be_bytes());
        } else {
            out.push(c.dx as u8);
            out.push(c.dy as u8);
        }
        match c.transform {
            Transform::None => {}
            Transform::Scale(s) => out.extend(f2dot14(s)),
            Transform::XyScale(x, y) => {
                out.extend(f2dot14(x));
                out.extend(f2dot14(y));
            }
            Transform::TwoByTwo(m) => {
                for v in m {
                    out.extend(f2dot14(v));
                }
            }
        }
    }
    out
}

fn checksum(table: &[u8]) -> u32 {
    table
        .chunks(4)
        .map(|chunk| {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            u32::from_be_bytes(word)
        })
        .fold(0u32, u32::wrapping_add)
}

/// Lays out the header, directory and 4-byte aligned tables.
pub fn sfnt(tables: &[([u8; 4], Vec<u8>)]) -> Vec<u8> {
    let n = tables.len() as u16;
    let entry_selector = 15 - n.max(1).leading_zeros() as u16;
    let search_range = 16u16 << entry_selector;
    let mut out = Vec::new();
    out.extend(0x0001_0000u32.to_be_bytes());
    out.extend(n.to_be_bytes());
    out.extend(search_range.to_be_bytes());
    out.extend(entry_selector.to_be_bytes());
    out.extend((n * 16).saturating_sub(search_range).to_be_bytes());

    let mut offset = 12 + 16 * tables.len();
    for (tag, data) in tables {
        out.extend(tag);
        out.extend(checksum(data).to_be_bytes());
        out.extend((offset as u32).to_be_bytes());
        out.extend((data.len() as u32).to_be_bytes());
        offset += (data.len() + 3) & !3;
    }
    for (_, data) in tables {
        out.extend(data);
        while out.len() % 4 != 0 {
            out.push(0);
        }
    }
    out
}
