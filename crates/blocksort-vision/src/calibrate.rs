use log::{info, warn};

use blocksort_core::{Cell, GridModel, GridModelError, GridPos, RgbImageView};

use crate::binarize::{binarize_dark, close, open};
use crate::board::locate_board;
use crate::cells::{detect_cells, CellCandidate};
use crate::params::VisionParams;

/// Calibration failures. All recoverable: the previous grid model is left
/// untouched and the operator retries with a better-framed reference image.
#[derive(thiserror::Error, Debug)]
pub enum CalibrationError {
    #[error("no board visible in the reference frame")]
    BoardNotFound,
    #[error("expected 9 cells, detected {0}")]
    CellCount(usize),
    #[error(transparent)]
    Model(#[from] GridModelError),
}

/// Builds a [`GridModel`] from a single empty-board reference frame.
pub struct Calibrator {
    params: VisionParams,
}

impl Calibrator {
    pub fn new(params: VisionParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &VisionParams {
        &self.params
    }

    /// Run the full calibration pipeline on a reference frame.
    ///
    /// Succeeds only when exactly 9 cell candidates survive: the row/column
    /// assignment assumes a complete 3×3 grid, and a partial grid would
    /// silently misnumber every position. The returned model is built fresh;
    /// nothing is mutated on failure.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "info", skip(self, frame), fields(width = frame.width, height = frame.height))
    )]
    pub fn calibrate(&self, frame: &RgbImageView<'_>) -> Result<GridModel, CalibrationError> {
        let mask = binarize_dark(frame, &self.params.binarize);
        let mask = open(&close(&mask));

        let board = locate_board(&mask, &self.params.board).ok_or_else(|| {
            warn!("calibration failed: board not found");
            CalibrationError::BoardNotFound
        })?;

        let mut candidates = detect_cells(&mask, &board, &self.params.cell);
        if candidates.len() != 9 {
            warn!(
                "calibration failed: {} cell candidates instead of 9",
                candidates.len()
            );
            return Err(CalibrationError::CellCount(candidates.len()));
        }

        sort_row_major(&mut candidates, self.params.calibrate.row_band_px);

        let layout = self.params.calibrate.layout;
        let cells = candidates
            .iter()
            .enumerate()
            .map(|(i, cand)| {
                let row = (i / 3) as u8 + 1;
                let col = layout.col_for_index(i);
                let position_id = GridPos { row, col }.position_id();
                Cell {
                    center: cand.center,
                    area: cand.area,
                    row,
                    col,
                    position_id,
                    occupant: None,
                }
            })
            .collect();

        let grid = GridModel::new(cells)?;
        info!("calibrated 9 cells ({layout:?})");
        Ok(grid)
    }
}

/// Order candidates row-major despite noisy centroids.
///
/// A plain (y, x) sort interleaves neighboring rows as soon as the camera
/// tilts a few degrees. Instead candidates are sorted by y, grouped into
/// rows while each stays within `row_band_px` of the row's first member,
/// and each row is then ordered by x.
fn sort_row_major(candidates: &mut [CellCandidate], row_band_px: f32) {
    candidates.sort_by(|a, b| a.center.y.total_cmp(&b.center.y));

    let mut sorted = Vec::with_capacity(candidates.len());
    let mut row: Vec<CellCandidate> = Vec::new();
    let mut anchor_y = f32::NEG_INFINITY;
    for cand in candidates.iter().copied() {
        if row.is_empty() || cand.center.y - anchor_y <= row_band_px {
            if row.is_empty() {
                anchor_y = cand.center.y;
            }
            row.push(cand);
        } else {
            row.sort_by(|a, b| a.center.x.total_cmp(&b.center.x));
            sorted.extend(row.drain(..));
            anchor_y = cand.center.y;
            row.push(cand);
        }
    }
    row.sort_by(|a, b| a.center.x.total_cmp(&b.center.x));
    sorted.extend(row);

    candidates.copy_from_slice(&sorted);
}

#[cfg(test)]
mod tests {
    use super::*;
    use blocksort_core::ColumnLayout;
    use nalgebra::Point2;

    fn cand(x: f32, y: f32) -> CellCandidate {
        CellCandidate {
            center: Point2::new(x, y),
            area: 400.0,
        }
    }

    #[test]
    fn banded_sort_survives_row_jitter() {
        // Row 2's leftmost cell sits a little higher than row 1's rightmost.
        let mut candidates = vec![
            cand(200.0, 52.0),
            cand(100.0, 48.0),
            cand(300.0, 58.0),
            cand(100.0, 118.0),
            cand(300.0, 112.0),
            cand(200.0, 115.0),
            cand(300.0, 181.0),
            cand(100.0, 179.0),
            cand(200.0, 185.0),
        ];
        sort_row_major(&mut candidates, 22.0);
        let xs: Vec<f32> = candidates.iter().map(|c| c.center.x).collect();
        assert_eq!(
            xs,
            vec![100.0, 200.0, 300.0, 100.0, 200.0, 300.0, 100.0, 200.0, 300.0]
        );
        assert!(candidates[0].center.y < candidates[3].center.y);
        assert!(candidates[3].center.y < candidates[6].center.y);
    }

    /// Synthetic empty-board frame: light background, dark board, 9 light
    /// holes at known centers.
    fn synthetic_board_frame() -> (Vec<u8>, usize, usize) {
        let (width, height) = (320, 240);
        let mut data = vec![0u8; width * height * 3];
        let paint = |data: &mut Vec<u8>, x: usize, y: usize, rgb: [u8; 3]| {
            let idx = 3 * (y * width + x);
            data[idx..idx + 3].copy_from_slice(&rgb);
        };
        for y in 0..height {
            for x in 0..width {
                paint(&mut data, x, y, [190, 190, 190]);
            }
        }
        // dark board surface
        for y in 20..220 {
            for x in 40..280 {
                paint(&mut data, x, y, [45, 45, 45]);
            }
        }
        // 3×3 light holes, 20 px squares on a 70 px pitch
        for row in 0..3usize {
            for col in 0..3usize {
                let x0 = 80 + col * 70;
                let y0 = 50 + row * 70;
                for y in y0..y0 + 20 {
                    for x in x0..x0 + 20 {
                        paint(&mut data, x, y, [210, 210, 210]);
                    }
                }
            }
        }
        (data, width, height)
    }

    fn frame_view(data: &[u8], width: usize, height: usize) -> RgbImageView<'_> {
        RgbImageView {
            width,
            height,
            data,
        }
    }

    #[test]
    fn calibrates_a_clean_nine_hole_frame() {
        let (data, w, h) = synthetic_board_frame();
        let calibrator = Calibrator::new(VisionParams::default());
        let grid = calibrator
            .calibrate(&frame_view(&data, w, h))
            .expect("calibration");
        assert!(grid.is_calibrated());

        // Mirrored layout: leftmost detected column is col 3.
        let top_left = grid.cell_by_id(3).expect("R1C3");
        assert_eq!((top_left.row, top_left.col), (1, 3));
        approx::assert_abs_diff_eq!(top_left.center.x, 89.5, epsilon = 2.0);
        approx::assert_abs_diff_eq!(top_left.center.y, 59.5, epsilon = 2.0);

        let ids: Vec<u8> = (1..=9)
            .map(|id| grid.cell_by_id(id).expect("present").position_id)
            .collect();
        assert_eq!(ids, (1..=9).collect::<Vec<u8>>());
    }

    #[test]
    fn calibration_is_idempotent() {
        let (data, w, h) = synthetic_board_frame();
        let calibrator = Calibrator::new(VisionParams::default());
        let first = calibrator.calibrate(&frame_view(&data, w, h)).expect("one");
        let second = calibrator.calibrate(&frame_view(&data, w, h)).expect("two");
        for (a, b) in first.cells().iter().zip(second.cells()) {
            assert_eq!((a.row, a.col, a.position_id), (b.row, b.col, b.position_id));
            assert_eq!(a.center, b.center);
        }
    }

    #[test]
    fn ascending_layout_numbers_left_to_right() {
        let (data, w, h) = synthetic_board_frame();
        let mut params = VisionParams::default();
        params.calibrate.layout = ColumnLayout::AscendingCols;
        let grid = Calibrator::new(params)
            .calibrate(&frame_view(&data, w, h))
            .expect("calibration");
        let top_left = grid.cell_by_id(1).expect("R1C1");
        approx::assert_abs_diff_eq!(top_left.center.x, 89.5, epsilon = 2.0);
    }

    #[test]
    fn wrong_candidate_count_fails_with_the_count() {
        // Plug one hole: 8 candidates.
        let (mut data, w, h) = synthetic_board_frame();
        for y in 50..70 {
            for x in 80..100 {
                let idx = 3 * (y * w + x);
                data[idx..idx + 3].copy_from_slice(&[45, 45, 45]);
            }
        }
        let calibrator = Calibrator::new(VisionParams::default());
        match calibrator.calibrate(&frame_view(&data, w, h)) {
            Err(CalibrationError::CellCount(8)) => {}
            other => panic!("expected CellCount(8), got {other:?}"),
        }
    }

    #[test]
    fn extra_candidate_fails_with_the_count() {
        // Punch a tenth plausible hole between the grid positions.
        let (mut data, w, h) = synthetic_board_frame();
        for y in 85..105 {
            for x in 115..135 {
                let idx = 3 * (y * w + x);
                data[idx..idx + 3].copy_from_slice(&[210, 210, 210]);
            }
        }
        let calibrator = Calibrator::new(VisionParams::default());
        match calibrator.calibrate(&frame_view(&data, w, h)) {
            Err(CalibrationError::CellCount(10)) => {}
            other => panic!("expected CellCount(10), got {other:?}"),
        }
    }

    #[test]
    fn missing_board_fails() {
        let (w, h) = (320usize, 240usize);
        let data = vec![200u8; w * h * 3];
        let calibrator = Calibrator::new(VisionParams::default());
        assert!(matches!(
            calibrator.calibrate(&frame_view(&data, w, h)),
            Err(CalibrationError::BoardNotFound)
        ));
    }
}
