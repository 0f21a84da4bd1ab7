//! Core types for the block-sorting pipeline.
//!
//! This crate is intentionally small and free of any image decoding or
//! transport concern. It holds the pixel view types, the HSV color
//! classifier, and the logical 3×3 grid model shared by the vision and
//! control crates.

mod color;
mod grid;
mod image;
mod logger;

pub use color::{rgb_to_hsv, ColorBands, Hsv, HueBand};
pub use grid::{
    BlockColor, Cell, ColumnLayout, GridModel, GridModelError, GridPos, INPUT_COL, OUTPUT_COL,
};
pub use image::{mean_rgb, Rgb, RgbImageView};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
