use image::{ColorType, DynamicImage, ImageFormat};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use crate::modules::image_export::{format_description, format_name};

pub const WINDOW_TITLE: &str = "Image Spell";
pub const SUPPORTED_MODES: [&str; 2] = ["RGB", "RGBA"];

pub const MIN_ZOOM: f32 = 0.05;
pub const MAX_ZOOM: f32 = 8.0;
pub const ZOOM_STEP: f32 = 0.25;
pub const WHEEL_ZOOM_STEP: f32 = 0.05;

/// Channel layouts the pipeline knows how to edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout { Rgb, Rgba }

/// One immutable image in the edit history.
///
/// The pixel buffer is reference counted, so cloning a snapshot (for display,
/// or to run a filter on it) never copies pixels.
#[derive(Clone, PartialEq)]
pub struct Snapshot { image: Arc<DynamicImage> }

impl Snapshot {
    pub fn new(image: DynamicImage) -> Self { Self { image: Arc::new(image) } }
    pub fn image(&self) -> &DynamicImage { &self.image }
    pub fn width(&self) -> u32 { self.image.width() }
    pub fn height(&self) -> u32 { self.image.height() }
    pub fn dimensions(&self) -> (u32, u32) { (self.image.width(), self.image.height()) }

    /// `None` for anything other than 8-bit RGB or RGBA.
    pub fn layout(&self) -> Option<ChannelLayout> {
        match self.image.as_ref() {
            DynamicImage::ImageRgb8(_) => Some(ChannelLayout::Rgb),
            DynamicImage::ImageRgba8(_) => Some(ChannelLayout::Rgba),
            _ => None,
        }
    }

    pub fn mode(&self) -> &'static str { color_mode(self.image.color()) }
    pub fn size_label(&self) -> String { format!("{}x{}", self.width(), self.height()) }
    pub fn shares_buffer(&self, other: &Snapshot) -> bool { Arc::ptr_eq(&self.image, &other.image) }
}

impl From<DynamicImage> for Snapshot {
    fn from(image: DynamicImage) -> Self { Self::new(image) }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("size", &self.size_label())
            .field("mode", &self.mode())
            .field("data_len", &self.image.as_bytes().len())
            .finish()
    }
}

pub fn color_mode(color: ColorType) -> &'static str {
    match color {
        ColorType::L8 => "L",
        ColorType::La8 => "LA",
        ColorType::Rgb8 => "RGB",
        ColorType::Rgba8 => "RGBA",
        ColorType::L16 => "I;16",
        ColorType::La16 => "LA;16",
        ColorType::Rgb16 => "RGB;16",
        ColorType::Rgba16 => "RGBA;16",
        ColorType::Rgb32F => "RGB;F",
        ColorType::Rgba32F => "RGBA;F",
        _ => "UNKNOWN",
    }
}

/// Metadata about the displayed image and the file backing it.
///
/// Size fields follow the current snapshot, path fields follow the file the
/// document was opened from or last saved as.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceInfo {
    pub path: PathBuf,
    pub location: PathBuf,
    pub name_with_extension: String,
    pub name: String,
    pub extension: String,
    pub extension_tag: String,
    pub size: String,
    pub width: u32,
    pub height: u32,
    pub mode: String,
    pub format: Option<ImageFormat>,
    pub format_name: String,
    pub description: String,
}

impl SourceInfo {
    /// Returns true when the pixel dimensions differ from the previous ones.
    pub(super) fn set_size(&mut self, snapshot: &Snapshot) -> bool {
        let resized: bool = (self.width, self.height) != snapshot.dimensions();
        self.width = snapshot.width(); self.height = snapshot.height();
        self.size = snapshot.size_label();
        resized
    }

    pub(super) fn set_path(&mut self, path: &Path, format: Option<ImageFormat>) {
        let lossy = |s: Option<&std::ffi::OsStr>| s.map(|v| v.to_string_lossy().into_owned()).unwrap_or_default();
        self.path = path.to_path_buf();
        self.location = path.parent().map(Path::to_path_buf).unwrap_or_default();
        self.name_with_extension = lossy(path.file_name());
        self.name = lossy(path.file_stem());
        self.extension = path.extension().map(|e| format!(".{}", e.to_string_lossy())).unwrap_or_default();
        self.extension_tag = self.extension.trim_start_matches('.').to_uppercase();

        self.format = format.or_else(|| ImageFormat::from_path(path).ok());
        self.format_name = self.format.map(format_name).unwrap_or_default().to_string();
        self.description = self.format.map(format_description).unwrap_or_default().to_string();
    }
}

/// View scale factor of the canvas, clamped to `[MIN_ZOOM, MAX_ZOOM]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomState { scale: f32 }

impl Default for ZoomState {
    fn default() -> Self { Self { scale: 1.0 } }
}

impl ZoomState {
    pub fn scale(&self) -> f32 { self.scale }
    pub fn set_scale(&mut self, scale: f32) { self.scale = scale.clamp(MIN_ZOOM, MAX_ZOOM); }
    pub fn zoom_in(&mut self, step: f32) { self.set_scale(self.scale + step); }
    pub fn zoom_out(&mut self, step: f32) { self.set_scale(self.scale - step); }
    pub fn can_zoom_in(&self) -> bool { self.scale < MAX_ZOOM }
    pub fn can_zoom_out(&self) -> bool { self.scale > MIN_ZOOM }
    pub fn percent(&self) -> i32 { (self.scale * 100.0) as i32 }
    pub fn label(&self, size: &str) -> String { format!("{} ({}%)", size, self.percent()) }

    /// Largest scale at which `scene` fits entirely inside `view`.
    pub fn fit_scale(scene: (f32, f32), view: (f32, f32)) -> f32 {
        if scene.0 <= 0.0 || scene.1 <= 0.0 { return 1.0; }
        (view.0 / scene.0).min(view.1 / scene.1)
    }

    /// Scale applied after the displayed image changes.
    pub fn reset_for(&mut self, scene: (f32, f32), view: (f32, f32), auto_fit: bool) {
        let overflows: bool = scene.0 > view.0 || scene.1 > view.1;
        if auto_fit && overflows { self.set_scale(Self::fit_scale(scene, view)); }
        else { self.set_scale(1.0); }
    }

    /// Switches between actual size and fit-to-view.
    pub fn toggle_fit(&mut self, scene: (f32, f32), view: (f32, f32)) {
        if self.scale == 1.0 { self.set_scale(Self::fit_scale(scene, view)); }
        else { self.set_scale(1.0); }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{RgbImage, RgbaImage, GrayImage};

    #[test]
    fn layout_is_reported_for_rgb_and_rgba_only() {
        assert_eq!(Snapshot::new(DynamicImage::ImageRgb8(RgbImage::new(2, 2))).layout(), Some(ChannelLayout::Rgb));
        assert_eq!(Snapshot::new(DynamicImage::ImageRgba8(RgbaImage::new(2, 2))).layout(), Some(ChannelLayout::Rgba));
        let gray = Snapshot::new(DynamicImage::ImageLuma8(GrayImage::new(2, 2)));
        assert_eq!(gray.layout(), None);
        assert_eq!(gray.mode(), "L");
    }

    #[test]
    fn clones_share_the_pixel_buffer() {
        let a = Snapshot::new(DynamicImage::ImageRgb8(RgbImage::new(3, 1)));
        let b = a.clone();
        assert!(a.shares_buffer(&b));
        assert_eq!(a, b);
    }

    #[test]
    fn path_fields_are_split_like_a_file_dialog_would() {
        let mut info = SourceInfo::default();
        info.set_path(Path::new("/tmp/pictures/cat.photo.png"), None);
        assert_eq!(info.location, PathBuf::from("/tmp/pictures"));
        assert_eq!(info.name_with_extension, "cat.photo.png");
        assert_eq!(info.name, "cat.photo");
        assert_eq!(info.extension, ".png");
        assert_eq!(info.extension_tag, "PNG");
        assert_eq!(info.format, Some(ImageFormat::Png));
        assert_eq!(info.format_name, "PNG");
    }

    #[test]
    fn size_change_is_detected() {
        let mut info = SourceInfo::default();
        let snap = Snapshot::new(DynamicImage::ImageRgb8(RgbImage::new(10, 20)));
        assert!(info.set_size(&snap));
        assert!(!info.set_size(&snap));
        assert_eq!(info.size, "10x20");
    }

    #[test]
    fn zoom_is_clamped_and_reports_bounds() {
        let mut zoom = ZoomState::default();
        for _ in 0..10 { zoom.zoom_out(ZOOM_STEP); }
        assert_eq!(zoom.scale(), MIN_ZOOM);
        assert!(!zoom.can_zoom_out());
        for _ in 0..100 { zoom.zoom_in(ZOOM_STEP); }
        assert_eq!(zoom.scale(), MAX_ZOOM);
        assert!(!zoom.can_zoom_in());
        assert_eq!(zoom.label("10x20"), "10x20 (800%)");
    }

    #[test]
    fn wheel_steps_are_finer_than_button_steps() {
        let mut zoom = ZoomState::default();
        zoom.zoom_in(WHEEL_ZOOM_STEP);
        assert!((zoom.scale() - 1.05).abs() < 1e-6);
        zoom.zoom_out(ZOOM_STEP);
        assert!((zoom.scale() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn reset_fits_only_oversized_scenes() {
        let mut zoom = ZoomState::default();
        zoom.reset_for((2000.0, 1000.0), (1000.0, 1000.0), true);
        assert_eq!(zoom.scale(), 0.5);
        zoom.reset_for((200.0, 100.0), (1000.0, 1000.0), true);
        assert_eq!(zoom.scale(), 1.0);
        zoom.reset_for((2000.0, 1000.0), (1000.0, 1000.0), false);
        assert_eq!(zoom.scale(), 1.0);
    }
}
