//! Board, cell and occupancy detection for the block-sorting pipeline.
//!
//! Pipeline, run once per calibration:
//! 1. Binarize the reference frame with a dark-surface threshold (the board
//!    is the dark object in the scene).
//! 2. Locate the board: the largest connected dark region above an area
//!    floor.
//! 3. Detect cells: invert the mask inside the board, clean it up
//!    morphologically, and keep near-square, reasonably round regions in a
//!    plausible size band.
//! 4. Calibrate: require exactly 9 cells, sort them into row-major order
//!    with a row tolerance band, and assign row/col/position ids.
//!
//! Occupancy scanning then re-samples the calibrated cell centers on each
//! live frame and classifies the occupant color.

mod binarize;
mod board;
mod calibrate;
mod cells;
mod params;
mod regions;
mod scan;

pub use binarize::{binarize_dark, close, dilate, erode, open, BinaryMask};
pub use board::{locate_board, BoardRegion};
pub use calibrate::{CalibrationError, Calibrator};
pub use cells::{detect_cells, CellCandidate};
pub use params::{BinarizeParams, BoardParams, CalibrateParams, CellParams, ScanParams, VisionParams};
pub use regions::{label_regions, region_perimeter, BBox, LabelMap, Region};
pub use scan::scan_occupancy;
