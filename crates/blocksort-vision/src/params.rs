use serde::{Deserialize, Serialize};

use blocksort_core::{ColorBands, ColumnLayout};

/// Dark-surface binarization settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BinarizeParams {
    /// Pixels with HSV value at or below this are foreground (the board
    /// surface). Hue and saturation are unconstrained.
    pub value_ceiling: f32,
}

impl Default for BinarizeParams {
    fn default() -> Self {
        Self {
            value_ceiling: 100.0,
        }
    }
}

/// Board locator settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardParams {
    /// Minimum pixel area for the largest dark region to count as the board.
    pub min_area: usize,
}

impl Default for BoardParams {
    fn default() -> Self {
        Self { min_area: 10_000 }
    }
}

/// Cell detector filter settings.
///
/// All of these are tuned for the reference camera distance and hole size;
/// they are scene parameters, not algorithm constants.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellParams {
    pub min_area: usize,
    pub max_area: usize,
    /// Bounding-box width/height band; admits mild perspective distortion.
    pub aspect_min: f32,
    pub aspect_max: f32,
    /// `4π·area/perimeter²` floor. Admits circular and rounded-square holes,
    /// rejects elongated noise blobs.
    pub min_circularity: f64,
}

impl Default for CellParams {
    fn default() -> Self {
        Self {
            min_area: 100,
            max_area: 10_000,
            aspect_min: 0.8,
            aspect_max: 1.25,
            min_circularity: 0.5,
        }
    }
}

/// Grid calibration settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrateParams {
    /// Candidates within this many pixels of a row's first candidate belong
    /// to the same row. Absorbs camera tilt and perspective jitter.
    pub row_band_px: f32,
    pub layout: ColumnLayout,
}

impl Default for CalibrateParams {
    fn default() -> Self {
        Self {
            row_band_px: 22.0,
            layout: ColumnLayout::default(),
        }
    }
}

/// Occupancy scan settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanParams {
    /// Half-width of the square sample window around each cell center.
    /// Radius 0 samples the single center pixel.
    pub sample_radius: i32,
    pub bands: ColorBands,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            sample_radius: 2,
            bands: ColorBands::default(),
        }
    }
}

/// All vision-stage parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VisionParams {
    #[serde(default)]
    pub binarize: BinarizeParams,
    #[serde(default)]
    pub board: BoardParams,
    #[serde(default)]
    pub cell: CellParams,
    #[serde(default)]
    pub calibrate: CalibrateParams,
    #[serde(default)]
    pub scan: ScanParams,
}
