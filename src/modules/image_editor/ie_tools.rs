use image::{DynamicImage, Rgb, RgbImage};
use image::imageops::FilterType;
use log::debug;
use crate::error::{EditorError, Result};
use super::ie_helpers::{Kernel, luma, merge_alpha, split_alpha, unsupported};
use super::ie_main::Snapshot;

/// Exact geometric transforms. Channel layout and alpha come through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform { FlipHorizontal, FlipVertical, RotateClockwise, RotateCounterClockwise }

impl Transform {
    pub const ALL: [Transform; 4] = [
        Transform::FlipHorizontal, Transform::FlipVertical,
        Transform::RotateClockwise, Transform::RotateCounterClockwise,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Transform::FlipHorizontal => "Flip Horizontal",
            Transform::FlipVertical => "Flip Vertical",
            Transform::RotateClockwise => "Rotate CW",
            Transform::RotateCounterClockwise => "Rotate CCW",
        }
    }

    pub fn apply(&self, snapshot: &Snapshot) -> Result<Snapshot> {
        if snapshot.layout().is_none() { return Err(unsupported(snapshot)); }
        let img: &DynamicImage = snapshot.image();
        let out: DynamicImage = match self {
            Transform::FlipHorizontal => img.fliph(),
            Transform::FlipVertical => img.flipv(),
            Transform::RotateClockwise => img.rotate90(),
            Transform::RotateCounterClockwise => img.rotate270(),
        };
        debug!("{} -> {}x{}", self.label(), out.width(), out.height());
        Ok(Snapshot::new(out))
    }
}

/// Color filters. Alpha is split off first and reattached unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter { Blur, Sepia, Grayscale, Edges }

impl Filter {
    pub const ALL: [Filter; 4] = [Filter::Blur, Filter::Sepia, Filter::Grayscale, Filter::Edges];

    pub fn label(&self) -> &'static str {
        match self {
            Filter::Blur => "Blur",
            Filter::Sepia => "Sepia",
            Filter::Grayscale => "Grayscale",
            Filter::Edges => "Find Edges",
        }
    }

    pub fn apply(&self, snapshot: &Snapshot) -> Result<Snapshot> {
        let (color, alpha) = split_alpha(snapshot)?;
        let filtered: RgbImage = match self {
            Filter::Blur => Kernel::blur().apply(&color),
            Filter::Edges => Kernel::edges().apply(&color),
            Filter::Grayscale => grayscale(color),
            Filter::Sepia => sepia(color),
        };
        debug!("{} applied to {} image", self.label(), snapshot.mode());
        Ok(Snapshot::new(merge_alpha(filtered, alpha)))
    }
}

fn grayscale(mut buf: RgbImage) -> RgbImage {
    for pixel in buf.pixels_mut() {
        let [r, g, b] = pixel.0;
        let l: u8 = luma(r, g, b);
        *pixel = Rgb([l, l, l]);
    }
    buf
}

fn sepia(mut buf: RgbImage) -> RgbImage {
    for pixel in buf.pixels_mut() {
        let [r, g, b] = pixel.0;
        let (rf, gf, bf) = (r as f32, g as f32, b as f32);
        pixel.0 = [
            (rf * 0.393 + gf * 0.769 + bf * 0.189).clamp(0.0, 255.0) as u8,
            (rf * 0.349 + gf * 0.686 + bf * 0.168).clamp(0.0, 255.0) as u8,
            (rf * 0.272 + gf * 0.534 + bf * 0.131).clamp(0.0, 255.0) as u8,
        ];
    }
    buf
}

/// Scales to exactly `width` x `height` with nearest-neighbour sampling.
pub fn resize(snapshot: &Snapshot, width: u32, height: u32) -> Result<Snapshot> {
    if width == 0 || height == 0 { return Err(EditorError::InvalidSize { width, height }); }
    if snapshot.layout().is_none() { return Err(unsupported(snapshot)); }
    let out: DynamicImage = snapshot.image().resize_exact(width, height, FilterType::Nearest);
    debug!("resize {} -> {}x{}", snapshot.size_label(), width, height);
    Ok(Snapshot::new(out))
}

/// Height that keeps the aspect ratio of `width` x `height` at `new_width`.
pub fn aspect_height(width: u32, height: u32, new_width: u32) -> u32 {
    if width == 0 { return height; }
    (height as f64 / width as f64 * new_width as f64) as u32
}

/// Width that keeps the aspect ratio of `width` x `height` at `new_height`.
pub fn aspect_width(width: u32, height: u32, new_height: u32) -> u32 {
    if height == 0 { return width; }
    (width as f64 / height as f64 * new_height as f64) as u32
}
