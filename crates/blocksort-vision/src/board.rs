use log::debug;

use crate::binarize::BinaryMask;
use crate::params::BoardParams;
use crate::regions::{label_regions, BBox};

/// The located playing surface: the largest dark region of the frame, with
/// its interior filled so that cell holes count as part of the board.
#[derive(Clone, Debug)]
pub struct BoardRegion {
    pub area: usize,
    pub bbox: BBox,
    // Filled silhouette over the bounding box.
    filled: BinaryMask,
}

impl BoardRegion {
    /// Whether frame coordinate `(x, y)` lies on the board (holes included).
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        let lx = x - self.bbox.min_x as i32;
        let ly = y - self.bbox.min_y as i32;
        self.filled.get(lx, ly)
    }
}

/// Find the board in a binarized frame.
///
/// Picks the connected foreground region with maximum area and rejects it
/// when that area is below the floor; a board that small means the board
/// is not actually in view. Deterministic; the caller supplies a new frame
/// to retry.
pub fn locate_board(mask: &BinaryMask, params: &BoardParams) -> Option<BoardRegion> {
    let (map, regions) = label_regions(mask);
    let best = regions.iter().max_by_key(|r| r.area)?;
    if best.area < params.min_area {
        debug!(
            "largest dark region is {} px, below the {} px board floor",
            best.area, params.min_area
        );
        return None;
    }

    // Fill the region silhouette: flood the bbox-local background from the
    // box border; anything unreached is interior (a hole) and belongs to
    // the board.
    let bbox = best.bbox;
    let w = bbox.width();
    let h = bbox.height();
    let in_region = |lx: usize, ly: usize| {
        map.label_at((bbox.min_x + lx) as i32, (bbox.min_y + ly) as i32) == best.id
    };

    let mut outside = vec![false; w * h];
    let mut queue = Vec::new();
    for lx in 0..w {
        for ly in [0, h - 1] {
            if !in_region(lx, ly) && !outside[ly * w + lx] {
                outside[ly * w + lx] = true;
                queue.push((lx, ly));
            }
        }
    }
    for ly in 0..h {
        for lx in [0, w - 1] {
            if !in_region(lx, ly) && !outside[ly * w + lx] {
                outside[ly * w + lx] = true;
                queue.push((lx, ly));
            }
        }
    }
    while let Some((lx, ly)) = queue.pop() {
        for (dx, dy) in [(1i32, 0i32), (-1, 0), (0, 1), (0, -1)] {
            let nx = lx as i32 + dx;
            let ny = ly as i32 + dy;
            if nx < 0 || ny < 0 || nx >= w as i32 || ny >= h as i32 {
                continue;
            }
            let (nx, ny) = (nx as usize, ny as usize);
            if !outside[ny * w + nx] && !in_region(nx, ny) {
                outside[ny * w + nx] = true;
                queue.push((nx, ny));
            }
        }
    }

    let mut filled = BinaryMask::new(w, h);
    for ly in 0..h {
        for lx in 0..w {
            filled.set(lx, ly, !outside[ly * w + lx]);
        }
    }

    debug!("board located: {} px in {}x{} box", best.area, w, h);
    Some(BoardRegion {
        area: best.area,
        bbox,
        filled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Board ring with a hole in the middle plus a small speck elsewhere.
    fn board_with_hole() -> BinaryMask {
        let mut mask = BinaryMask::new(200, 200);
        for y in 20..180 {
            for x in 20..180 {
                mask.set(x, y, true);
            }
        }
        // a hole
        for y in 90..110 {
            for x in 90..110 {
                mask.set(x, y, false);
            }
        }
        // an unrelated speck
        for y in 2..6 {
            for x in 2..6 {
                mask.set(x, y, true);
            }
        }
        mask
    }

    #[test]
    fn picks_the_largest_region() {
        let mask = board_with_hole();
        let board = locate_board(&mask, &BoardParams::default()).expect("board");
        assert!(board.area > 10_000);
        assert_eq!(board.bbox.min_x, 20);
        assert!(!board.contains(3, 3));
    }

    #[test]
    fn interior_holes_belong_to_the_board() {
        let mask = board_with_hole();
        let board = locate_board(&mask, &BoardParams::default()).expect("board");
        assert!(board.contains(100, 100), "hole interior");
        assert!(board.contains(50, 50), "surface");
        assert!(!board.contains(5, 100), "outside the outline");
    }

    #[test]
    fn rejects_below_the_area_floor() {
        let mut mask = BinaryMask::new(100, 100);
        for y in 10..40 {
            for x in 10..40 {
                mask.set(x, y, true);
            }
        }
        assert!(locate_board(&mask, &BoardParams::default()).is_none());
        assert!(locate_board(&mask, &BoardParams { min_area: 100 }).is_some());
    }

    #[test]
    fn empty_mask_has_no_board() {
        let mask = BinaryMask::new(50, 50);
        assert!(locate_board(&mask, &BoardParams::default()).is_none());
    }
}
