use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage, RgbaImage};
use crate::error::{EditorError, Result};
use super::ie_main::Snapshot;

/// Splits a snapshot into its color channels and, for RGBA, its alpha plane.
pub(super) fn split_alpha(snapshot: &Snapshot) -> Result<(RgbImage, Option<GrayImage>)> {
    match snapshot.image() {
        DynamicImage::ImageRgb8(buf) => Ok((buf.clone(), None)),
        DynamicImage::ImageRgba8(buf) => {
            let (w, h) = buf.dimensions();
            let color: RgbImage = RgbImage::from_fn(w, h, |x, y| { let [r, g, b, _] = buf.get_pixel(x, y).0; Rgb([r, g, b]) });
            let alpha: GrayImage = GrayImage::from_fn(w, h, |x, y| Luma([buf.get_pixel(x, y).0[3]]));
            Ok((color, Some(alpha)))
        }
        _ => Err(unsupported(snapshot)),
    }
}

pub(super) fn merge_alpha(color: RgbImage, alpha: Option<GrayImage>) -> DynamicImage {
    match alpha {
        None => DynamicImage::ImageRgb8(color),
        Some(alpha) => {
            let (w, h) = color.dimensions();
            DynamicImage::ImageRgba8(RgbaImage::from_fn(w, h, |x, y| {
                let [r, g, b] = color.get_pixel(x, y).0;
                image::Rgba([r, g, b, alpha.get_pixel(x, y).0[0]])
            }))
        }
    }
}

pub(super) fn unsupported(snapshot: &Snapshot) -> EditorError {
    EditorError::UnsupportedMode { mode: snapshot.mode().to_string() }
}

/// ITU-R 601-2 luma in 16-bit fixed point; the weights sum to exactly 1.0.
pub(super) fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16) as u8
}

/// Square convolution kernel applied to each color channel independently.
#[derive(Debug, Clone)]
pub(super) struct Kernel {
    weights: Vec<f32>,
    size: usize,
}

impl Kernel {
    pub(super) fn new(weights: &[f32], size: usize, scale: f32) -> Self {
        debug_assert_eq!(weights.len(), size * size);
        debug_assert!(size % 2 == 1);
        Self { weights: weights.iter().map(|w| w / scale).collect(), size }
    }

    /// 5x5 ring: the border of the window averaged, the centre ignored.
    pub(super) fn blur() -> Self {
        Self::new(&[
            1.0, 1.0, 1.0, 1.0, 1.0,
            1.0, 0.0, 0.0, 0.0, 1.0,
            1.0, 0.0, 0.0, 0.0, 1.0,
            1.0, 0.0, 0.0, 0.0, 1.0,
            1.0, 1.0, 1.0, 1.0, 1.0,
        ], 5, 16.0)
    }

    /// 3x3 Laplacian.
    pub(super) fn edges() -> Self {
        Self::new(&[
            -1.0, -1.0, -1.0,
            -1.0,  8.0, -1.0,
            -1.0, -1.0, -1.0,
        ], 3, 1.0)
    }

    /// Convolves into a fresh buffer, sampling past the border by clamping.
    pub(super) fn apply(&self, src: &RgbImage) -> RgbImage {
        let (w, h) = src.dimensions();
        let radius: i64 = (self.size / 2) as i64;
        let (max_x, max_y) = (w as i64 - 1, h as i64 - 1);

        RgbImage::from_fn(w, h, |x, y| {
            let mut acc: [f32; 3] = [0.0; 3];
            for ky in 0..self.size {
                let sy: u32 = (y as i64 + ky as i64 - radius).clamp(0, max_y) as u32;
                for kx in 0..self.size {
                    let weight: f32 = self.weights[ky * self.size + kx];
                    if weight == 0.0 { continue; }
                    let sx: u32 = (x as i64 + kx as i64 - radius).clamp(0, max_x) as u32;
                    let p: [u8; 3] = src.get_pixel(sx, sy).0;
                    for c in 0..3 { acc[c] += p[c] as f32 * weight; }
                }
            }
            Rgb(acc.map(|v| v.round().clamp(0.0, 255.0) as u8))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luma_keeps_white_and_black() {
        assert_eq!(luma(255, 255, 255), 255);
        assert_eq!(luma(0, 0, 0), 0);
        assert_eq!(luma(255, 0, 0), 76);
    }

    #[test]
    fn alpha_round_trips_through_split_and_merge() {
        let src = RgbaImage::from_fn(3, 2, |x, y| image::Rgba([x as u8, y as u8, 7, 40 + x as u8]));
        let snap = Snapshot::new(DynamicImage::ImageRgba8(src.clone()));
        let (color, alpha) = split_alpha(&snap).unwrap();
        assert_eq!(alpha.as_ref().map(|a| a.get_pixel(2, 1).0[0]), Some(42));
        assert_eq!(merge_alpha(color, alpha), DynamicImage::ImageRgba8(src));
    }

    #[test]
    fn split_rejects_grayscale_buffers() {
        let snap = Snapshot::new(DynamicImage::ImageLumaA8(image::GrayAlphaImage::new(1, 1)));
        assert!(matches!(split_alpha(&snap), Err(EditorError::UnsupportedMode { mode }) if mode == "LA"));
    }

    #[test]
    fn kernels_leave_flat_regions_alone_or_dark() {
        let flat = RgbImage::from_pixel(6, 6, Rgb([90, 120, 30]));
        assert_eq!(Kernel::blur().apply(&flat), flat);
        assert!(Kernel::edges().apply(&flat).pixels().all(|p| p.0 == [0, 0, 0]));
    }
}
