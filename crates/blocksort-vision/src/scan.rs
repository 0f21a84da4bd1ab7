use log::trace;

use blocksort_core::{mean_rgb, GridModel, RgbImageView};

use crate::params::ScanParams;

/// Refresh every cell's occupant from a live frame.
///
/// Samples a small window around each calibrated center and classifies the
/// mean color; each cell's `occupant` is overwritten, including back to
/// `None`. Centers that fall outside the frame classify as empty rather
/// than erroring. One pass per call; the polling cadence belongs to the
/// caller.
pub fn scan_occupancy(frame: &RgbImageView<'_>, grid: &mut GridModel, params: &ScanParams) {
    for cell in grid.cells_mut() {
        let sample = mean_rgb(frame, cell.center.x, cell.center.y, params.sample_radius);
        cell.occupant = sample.and_then(|rgb| params.bands.classify(rgb));
        trace!(
            "R{}C{}: {:?}",
            cell.row,
            cell.col,
            cell.occupant.map(|c| c.name())
        );
    }
}
