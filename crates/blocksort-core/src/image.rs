/// One interleaved RGB sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Borrowed view over a row-major interleaved RGB8 frame.
#[derive(Clone, Copy, Debug)]
pub struct RgbImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major RGB, len = 3*w*h
}

impl<'a> RgbImageView<'a> {
    /// Pixel at `(x, y)`, or `None` outside the frame.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<Rgb> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        let idx = 3 * (y as usize * self.width + x as usize);
        Some(Rgb {
            r: self.data[idx],
            g: self.data[idx + 1],
            b: self.data[idx + 2],
        })
    }
}

/// Mean color over the `(2*radius+1)²` window centred on `(cx, cy)`.
///
/// Pixels outside the frame are excluded from the mean; returns `None` when
/// the whole window falls outside.
pub fn mean_rgb(src: &RgbImageView<'_>, cx: f32, cy: f32, radius: i32) -> Option<Rgb> {
    let cx = cx.round() as i32;
    let cy = cy.round() as i32;

    let mut sum = [0u32; 3];
    let mut count = 0u32;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if let Some(px) = src.get(cx + dx, cy + dy) {
                sum[0] += px.r as u32;
                sum[1] += px.g as u32;
                sum[2] += px.b as u32;
                count += 1;
            }
        }
    }
    if count == 0 {
        return None;
    }
    Some(Rgb {
        r: (sum[0] / count) as u8,
        g: (sum[1] / count) as u8,
        b: (sum[2] / count) as u8,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_is_bounds_checked() {
        let data = [10u8, 20, 30, 40, 50, 60];
        let view = RgbImageView {
            width: 2,
            height: 1,
            data: &data,
        };
        assert_eq!(
            view.get(1, 0),
            Some(Rgb {
                r: 40,
                g: 50,
                b: 60
            })
        );
        assert_eq!(view.get(-1, 0), None);
        assert_eq!(view.get(2, 0), None);
        assert_eq!(view.get(0, 1), None);
    }

    #[test]
    fn mean_ignores_out_of_frame_pixels() {
        let data = [100u8, 0, 0, 200, 0, 0];
        let view = RgbImageView {
            width: 2,
            height: 1,
            data: &data,
        };
        let mean = mean_rgb(&view, 0.0, 0.0, 1).expect("in frame");
        assert_eq!(mean.r, 150);
        assert!(mean_rgb(&view, -10.0, -10.0, 1).is_none());
    }
}
