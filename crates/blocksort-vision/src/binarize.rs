use blocksort_core::RgbImageView;

use crate::params::BinarizeParams;

/// Binary mask over a frame; 1 is foreground.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryMask {
    pub width: usize,
    pub height: usize,
    data: Vec<u8>,
}

impl BinaryMask {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    /// Foreground test; out-of-bounds coordinates are background.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return false;
        }
        self.data[y as usize * self.width + x as usize] != 0
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, fg: bool) {
        self.data[y * self.width + x] = fg as u8;
    }

    pub fn count_foreground(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }
}

/// Threshold a frame so that the dark playing surface becomes foreground.
///
/// A pixel is foreground when its HSV value (the maximum RGB channel) is at
/// or below `value_ceiling`; hue and saturation are unconstrained.
pub fn binarize_dark(frame: &RgbImageView<'_>, params: &BinarizeParams) -> BinaryMask {
    let mut mask = BinaryMask::new(frame.width, frame.height);
    for y in 0..frame.height {
        for x in 0..frame.width {
            let idx = 3 * (y * frame.width + x);
            let value = frame.data[idx].max(frame.data[idx + 1]).max(frame.data[idx + 2]);
            mask.set(x, y, value as f32 <= params.value_ceiling);
        }
    }
    mask
}

// 5×5 round structuring element, the disc used by the reference pipeline.
const KERNEL_RADIUS: i32 = 2;

fn disc_offsets(radius: i32) -> Vec<(i32, i32)> {
    let mut offsets = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius + 1 {
                offsets.push((dx, dy));
            }
        }
    }
    offsets
}

/// Grow foreground by the structuring element.
pub fn dilate(mask: &BinaryMask) -> BinaryMask {
    let offsets = disc_offsets(KERNEL_RADIUS);
    let mut out = BinaryMask::new(mask.width, mask.height);
    for y in 0..mask.height {
        for x in 0..mask.width {
            let fg = offsets
                .iter()
                .any(|&(dx, dy)| mask.get(x as i32 + dx, y as i32 + dy));
            out.set(x, y, fg);
        }
    }
    out
}

/// Shrink foreground by the structuring element.
pub fn erode(mask: &BinaryMask) -> BinaryMask {
    let offsets = disc_offsets(KERNEL_RADIUS);
    let mut out = BinaryMask::new(mask.width, mask.height);
    for y in 0..mask.height {
        for x in 0..mask.width {
            let fg = offsets
                .iter()
                .all(|&(dx, dy)| mask.get(x as i32 + dx, y as i32 + dy));
            out.set(x, y, fg);
        }
    }
    out
}

/// Erode then dilate: removes speckle smaller than the element.
pub fn open(mask: &BinaryMask) -> BinaryMask {
    dilate(&erode(mask))
}

/// Dilate then erode: fills gaps smaller than the element.
pub fn close(mask: &BinaryMask) -> BinaryMask {
    erode(&dilate(mask))
}
