use serde::{Deserialize, Serialize};

use crate::grid::BlockColor;
use crate::image::Rgb;

/// HSV sample on the OpenCV integer scales: hue 0–179, saturation and
/// value 0–255. The classifier thresholds were tuned on these scales, so
/// the conversion keeps them rather than the 0–360/0–1 convention.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

/// Convert an RGB sample to [`Hsv`].
pub fn rgb_to_hsv(rgb: Rgb) -> Hsv {
    let r = rgb.r as f32 / 255.0;
    let g = rgb.g as f32 / 255.0;
    let b = rgb.b as f32 / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let mut h_deg = if delta == 0.0 {
        0.0
    } else if (max - r).abs() < f32::EPSILON {
        60.0 * (((g - b) / delta) % 6.0)
    } else if (max - g).abs() < f32::EPSILON {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    if h_deg < 0.0 {
        h_deg += 360.0;
    }

    Hsv {
        h: h_deg / 2.0,
        s: if max == 0.0 { 0.0 } else { delta / max } * 255.0,
        v: max * 255.0,
    }
}

/// Inclusive hue interval on the 0–179 scale.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HueBand {
    pub lo: f32,
    pub hi: f32,
}

impl HueBand {
    #[inline]
    pub fn contains(&self, h: f32) -> bool {
        h >= self.lo && h <= self.hi
    }
}

/// Hue bands and chroma floors for block classification.
///
/// Defaults are the values tuned for the reference camera and lighting.
/// They are scene-specific, not algorithmically load-bearing; override them
/// for a different setup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorBands {
    pub red: HueBand,
    pub blue: HueBand,
    pub green: HueBand,
    /// Samples at or below this saturation classify as empty.
    pub min_saturation: f32,
    /// Samples at or below this value classify as empty.
    pub min_value: f32,
}

impl Default for ColorBands {
    fn default() -> Self {
        Self {
            red: HueBand {
                lo: 140.0,
                hi: 180.0,
            },
            blue: HueBand {
                lo: 100.0,
                hi: 135.0,
            },
            green: HueBand { lo: 30.0, hi: 80.0 },
            min_saturation: 100.0,
            min_value: 50.0,
        }
    }
}

impl ColorBands {
    /// Classify an RGB sample. Pure and deterministic.
    pub fn classify(&self, rgb: Rgb) -> Option<BlockColor> {
        self.classify_hsv(rgb_to_hsv(rgb))
    }

    /// Classify an HSV sample.
    ///
    /// Bands are evaluated in fixed priority order Red → Blue → Green; the
    /// first matching band wins. Low-chroma and dark samples are rejected
    /// before any band is consulted.
    pub fn classify_hsv(&self, hsv: Hsv) -> Option<BlockColor> {
        if hsv.s <= self.min_saturation || hsv.v <= self.min_value {
            return None;
        }
        if self.red.contains(hsv.h) {
            Some(BlockColor::Red)
        } else if self.blue.contains(hsv.h) {
            Some(BlockColor::Blue)
        } else if self.green.contains(hsv.h) {
            Some(BlockColor::Green)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hsv(h: f32, s: f32, v: f32) -> Hsv {
        Hsv { h, s, v }
    }

    #[test]
    fn in_band_triples_map_to_their_label() {
        let bands = ColorBands::default();
        assert_eq!(
            bands.classify_hsv(hsv(160.0, 200.0, 200.0)),
            Some(BlockColor::Red)
        );
        assert_eq!(
            bands.classify_hsv(hsv(120.0, 200.0, 200.0)),
            Some(BlockColor::Blue)
        );
        assert_eq!(
            bands.classify_hsv(hsv(60.0, 200.0, 200.0)),
            Some(BlockColor::Green)
        );
    }

    #[test]
    fn out_of_band_hues_are_empty() {
        let bands = ColorBands::default();
        assert_eq!(bands.classify_hsv(hsv(90.0, 200.0, 200.0)), None);
        assert_eq!(bands.classify_hsv(hsv(10.0, 200.0, 200.0)), None);
    }

    #[test]
    fn chroma_floors_reject_washed_out_and_dark_samples() {
        let bands = ColorBands::default();
        assert_eq!(bands.classify_hsv(hsv(160.0, 100.0, 200.0)), None);
        assert_eq!(bands.classify_hsv(hsv(160.0, 200.0, 50.0)), None);
    }

    #[test]
    fn classification_is_deterministic_over_rgb() {
        let bands = ColorBands::default();
        let px = Rgb { r: 0, g: 0, b: 220 };
        let first = bands.classify(px);
        for _ in 0..10 {
            assert_eq!(bands.classify(px), first);
        }
    }

    #[test]
    fn pure_primaries_classify_as_expected() {
        let bands = ColorBands::default();
        // Pure blue sits at OpenCV hue 120, well inside the blue band.
        assert_eq!(
            bands.classify(Rgb { r: 0, g: 0, b: 255 }),
            Some(BlockColor::Blue)
        );
        assert_eq!(
            bands.classify(Rgb { r: 0, g: 255, b: 0 }),
            Some(BlockColor::Green)
        );
        // Black and gray carry no chroma.
        assert_eq!(bands.classify(Rgb { r: 0, g: 0, b: 0 }), None);
        assert_eq!(
            bands.classify(Rgb {
                r: 128,
                g: 128,
                b: 128
            }),
            None
        );
    }

    #[test]
    fn bands_round_trip_through_json() {
        let bands = ColorBands::default();
        let json = serde_json::to_string(&bands).expect("serialize");
        let back: ColorBands = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, bands);
    }

    #[test]
    fn conversion_matches_opencv_scales() {
        let hsv = rgb_to_hsv(Rgb { r: 0, g: 0, b: 255 });
        assert!((hsv.h - 120.0).abs() < 0.5);
        assert!((hsv.s - 255.0).abs() < 0.5);
        assert!((hsv.v - 255.0).abs() < 0.5);
    }
}
