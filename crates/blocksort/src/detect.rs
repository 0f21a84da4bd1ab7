//! End-to-end helpers from `image::RgbImage` frames.

use std::path::Path;

use blocksort_core::{GridModel, RgbImageView};
use blocksort_vision::{scan_occupancy, CalibrationError, Calibrator, ScanParams};

/// Load a frame from disk as RGB8.
pub fn load_rgb(path: impl AsRef<Path>) -> Result<image::RgbImage, image::ImageError> {
    let img = image::ImageReader::open(path.as_ref())
        .map_err(image::ImageError::IoError)?
        .decode()?;
    Ok(img.to_rgb8())
}

/// Borrow an `image::RgbImage` as the lightweight core view type.
pub fn rgb_view(img: &image::RgbImage) -> RgbImageView<'_> {
    RgbImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Calibrate straight from a decoded image.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "info", skip(calibrator, img), fields(width = img.width(), height = img.height()))
)]
pub fn calibrate_image(
    calibrator: &Calibrator,
    img: &image::RgbImage,
) -> Result<GridModel, CalibrationError> {
    calibrator.calibrate(&rgb_view(img))
}

/// Occupancy-scan straight from a decoded image.
pub fn scan_image(img: &image::RgbImage, grid: &mut GridModel, params: &ScanParams) {
    scan_occupancy(&rgb_view(img), grid, params)
}
