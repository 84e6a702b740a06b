use image::{ColorType, DynamicImage, ImageEncoder, ImageError, ImageFormat, ImageReader};
use log::info;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use crate::error::{EditorError, Result};
use crate::modules::image_editor::Snapshot;

pub const JPEG_QUALITY: u8 = 90;

/// Formats the editor can write back to.
pub const SUPPORTED_FORMATS: [ImageFormat; 4] = [ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::Bmp, ImageFormat::Pnm];
/// Formats that open for viewing but are never written.
pub const READ_ONLY_FORMATS: [ImageFormat; 1] = [ImageFormat::Gif];

/// A decoded file together with the format it was detected as.
#[derive(Debug, Clone)]
pub struct OpenedImage {
    pub snapshot: Snapshot,
    pub format: Option<ImageFormat>,
}

pub fn format_name(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "JPEG",
        ImageFormat::Png => "PNG",
        ImageFormat::Bmp => "BMP",
        ImageFormat::Pnm => "PPM",
        ImageFormat::Gif => "GIF",
        ImageFormat::WebP => "WEBP",
        ImageFormat::Tiff => "TIFF",
        ImageFormat::Ico => "ICO",
        _ => "UNKNOWN",
    }
}

pub fn format_description(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "JPEG (ISO 10918)",
        ImageFormat::Png => "Portable network graphics",
        ImageFormat::Bmp => "Windows Bitmap",
        ImageFormat::Pnm => "Portable anymap",
        ImageFormat::Gif => "Compuserve GIF",
        ImageFormat::WebP => "WebP image",
        ImageFormat::Tiff => "Adobe TIFF",
        ImageFormat::Ico => "Windows Icon",
        _ => "Unknown format",
    }
}

pub fn is_writable_format(format: Option<ImageFormat>) -> bool {
    format.is_some_and(|f| SUPPORTED_FORMATS.contains(&f))
}

pub fn is_read_only_format(format: Option<ImageFormat>) -> bool {
    format.is_some_and(|f| READ_ONLY_FORMATS.contains(&f))
}

/// Appends `extension` (with its leading dot) unless the path already ends in it.
pub fn ensure_extension(path: &Path, extension: &str) -> PathBuf {
    if extension.is_empty() || path.to_string_lossy().ends_with(extension) { return path.to_path_buf(); }
    let mut raw = path.as_os_str().to_os_string();
    raw.push(extension);
    PathBuf::from(raw)
}

pub fn open_image(path: &Path) -> Result<OpenedImage> {
    let decode_err = |source: ImageError| EditorError::Decode { path: path.to_path_buf(), source };
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| decode_err(ImageError::IoError(e)))?;
    let format: Option<ImageFormat> = reader.format();
    let image: DynamicImage = reader.decode().map_err(decode_err)?;
    info!("decoded {} as {:?} ({}x{})", path.display(), format, image.width(), image.height());
    Ok(OpenedImage { snapshot: Snapshot::new(image), format })
}

/// Encodes `snapshot` to `path` and returns the color type actually written.
///
/// Without an explicit `format` the path's extension decides. JPEG and PPM
/// cannot carry alpha, so RGBA images are flattened to RGB for them.
pub fn write_image(snapshot: &Snapshot, path: &Path, format: Option<ImageFormat>) -> Result<ColorType> {
    let write_err = |source: ImageError| EditorError::Write { path: path.to_path_buf(), source };
    let format: ImageFormat = match format {
        Some(f) => f,
        None => ImageFormat::from_path(path).map_err(write_err)?,
    };

    let img: &DynamicImage = snapshot.image();
    let flatten: bool = matches!(format, ImageFormat::Jpeg | ImageFormat::Pnm) && img.color().has_alpha();
    let out: DynamicImage = if flatten { DynamicImage::ImageRgb8(img.to_rgb8()) } else { img.clone() };

    match format {
        ImageFormat::Jpeg => {
            let file = File::create(path).map_err(|e| write_err(ImageError::IoError(e)))?;
            let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(BufWriter::new(file), JPEG_QUALITY);
            encoder.encode_image(&out.to_rgb8()).map_err(write_err)?;
        }
        ImageFormat::Png => {
            let file = File::create(path).map_err(|e| write_err(ImageError::IoError(e)))?;
            let encoder = image::codecs::png::PngEncoder::new_with_quality(
                BufWriter::new(file),
                image::codecs::png::CompressionType::Default,
                image::codecs::png::FilterType::Adaptive,
            );
            encoder.write_image(out.as_bytes(), out.width(), out.height(), out.color().into()).map_err(write_err)?;
        }
        other => { out.save_with_format(path, other).map_err(write_err)?; }
    }

    info!("wrote {} as {} ({}x{})", path.display(), format_name(format), out.width(), out.height());
    Ok(out.color())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn extension_is_appended_once() {
        assert_eq!(ensure_extension(Path::new("/a/b"), ".png"), PathBuf::from("/a/b.png"));
        assert_eq!(ensure_extension(Path::new("/a/b.png"), ".png"), PathBuf::from("/a/b.png"));
        assert_eq!(ensure_extension(Path::new("/a/b"), ""), PathBuf::from("/a/b"));
    }

    #[test]
    fn writable_formats() {
        assert!(is_writable_format(Some(ImageFormat::Png)));
        assert!(!is_writable_format(Some(ImageFormat::Gif)));
        assert!(!is_writable_format(None));
        assert!(is_read_only_format(Some(ImageFormat::Gif)));
        assert!(!is_read_only_format(Some(ImageFormat::Png)));
        assert!(!is_read_only_format(None));
    }

    #[test]
    fn ppm_flattens_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.ppm");
        let snap = Snapshot::new(DynamicImage::ImageRgba8(RgbaImage::from_pixel(3, 2, Rgba([40, 50, 60, 10]))));
        assert_eq!(write_image(&snap, &path, None).unwrap(), ColorType::Rgb8);
        let reopened = open_image(&path).unwrap();
        assert_eq!(reopened.format, Some(ImageFormat::Pnm));
        assert_eq!(reopened.snapshot.mode(), "RGB");
    }

    #[test]
    fn jpeg_flattens_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        let snap = Snapshot::new(DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 128]))));
        assert_eq!(write_image(&snap, &path, None).unwrap(), ColorType::Rgb8);
        assert_eq!(open_image(&path).unwrap().format, Some(ImageFormat::Jpeg));
    }

    #[test]
    fn unknown_extension_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let snap = Snapshot::new(DynamicImage::ImageRgba8(RgbaImage::new(1, 1)));
        let err = write_image(&snap, &dir.path().join("out.nope"), None).unwrap_err();
        assert!(matches!(err, EditorError::Write { .. }));
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(open_image(&dir.path().join("missing.png")), Err(EditorError::Decode { .. })));
    }
}
