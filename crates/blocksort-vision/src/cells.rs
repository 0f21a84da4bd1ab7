use log::debug;
use nalgebra::Point2;

use crate::binarize::{close, open, BinaryMask};
use crate::board::BoardRegion;
use crate::params::CellParams;
use crate::regions::{label_regions, region_perimeter};

/// A surviving cell region: centroid and area, no ordering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellCandidate {
    pub center: Point2<f32>,
    pub area: f64,
}

/// Find candidate cells (holes) inside the board.
///
/// The binarized frame has the dark surface as foreground, so the holes are
/// background; inverting inside the board silhouette turns them into
/// foreground blobs. Opening then closing removes speckle and patches
/// partial occlusions, since raw webcam masks are too noisy to filter directly.
/// Each blob then has to look like a hole: plausible size, near-square
/// bounding box (mild perspective admitted), and round enough to be a hole
/// rather than an elongated artifact.
pub fn detect_cells(
    mask: &BinaryMask,
    board: &BoardRegion,
    params: &CellParams,
) -> Vec<CellCandidate> {
    let mut holes = BinaryMask::new(mask.width, mask.height);
    for y in 0..mask.height {
        for x in 0..mask.width {
            let (xi, yi) = (x as i32, y as i32);
            holes.set(x, y, !mask.get(xi, yi) && board.contains(xi, yi));
        }
    }
    let holes = close(&open(&holes));

    let (map, regions) = label_regions(&holes);
    let mut candidates = Vec::new();
    for region in &regions {
        if region.area < params.min_area || region.area > params.max_area {
            continue;
        }
        let aspect = region.bbox.aspect();
        if aspect < params.aspect_min || aspect > params.aspect_max {
            continue;
        }
        let perimeter = region_perimeter(&map, region);
        let circularity = 4.0 * std::f64::consts::PI * region.area as f64 / (perimeter * perimeter);
        if circularity < params.min_circularity {
            continue;
        }
        candidates.push(CellCandidate {
            center: region.centroid,
            area: region.area as f64,
        });
    }

    debug!(
        "{} hole candidates out of {} regions",
        candidates.len(),
        regions.len()
    );
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::locate_board;
    use crate::params::BoardParams;

    /// Dark board with the given light holes punched out.
    fn board_mask(holes: &[(usize, usize, usize, usize)]) -> BinaryMask {
        let mut mask = BinaryMask::new(320, 240);
        for y in 20..220 {
            for x in 20..300 {
                mask.set(x, y, true);
            }
        }
        for &(x0, y0, w, h) in holes {
            for y in y0..y0 + h {
                for x in x0..x0 + w {
                    mask.set(x, y, false);
                }
            }
        }
        mask
    }

    #[test]
    fn finds_square_holes() {
        let mask = board_mask(&[(60, 60, 20, 20), (140, 60, 20, 20)]);
        let board = locate_board(&mask, &BoardParams::default()).expect("board");
        let cells = detect_cells(&mask, &board, &CellParams::default());
        assert_eq!(cells.len(), 2);
        let c = cells[0].center;
        assert!((c.x - 69.5).abs() < 1.5 && (c.y - 69.5).abs() < 1.5);
    }

    #[test]
    fn rejects_elongated_and_undersized_regions() {
        let mask = board_mask(&[
            (60, 60, 20, 20),  // keeper
            (60, 120, 80, 10), // elongated slot
            (160, 120, 6, 6),  // below the area floor
        ]);
        let board = locate_board(&mask, &BoardParams::default()).expect("board");
        let cells = detect_cells(&mask, &board, &CellParams::default());
        assert_eq!(cells.len(), 1);
    }

    #[test]
    fn regions_outside_the_board_are_ignored() {
        // Light area outside the board outline would invert to foreground
        // everywhere; the board silhouette restricts the search.
        let mask = board_mask(&[(60, 60, 20, 20)]);
        let board = locate_board(&mask, &BoardParams::default()).expect("board");
        let cells = detect_cells(&mask, &board, &CellParams::default());
        assert_eq!(cells.len(), 1);
    }
}
