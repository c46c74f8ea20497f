// src/ttf/mod.rs

//! Binary table reader: big-endian cursor, flag sets and fixed-layout
//! table records. Stateless and allocation-free apart from the directory.

pub mod flags;
pub mod reader;
pub mod tables;

pub use flags::{CompositeGlyphFlags, FsSelection, SimpleGlyphFlags};
pub use reader::Reader;
pub use tables::{
    BoundingBox, GlyphHeader, HeadTable, LongMetric, MaxpTable, MetricsHeader, MetricsTable,
    Os2Table, TableDirectory, TableRecord, Tag,
};
