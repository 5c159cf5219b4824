//! Image optimization using the `image` crate.
//!
//! PNGs are re-encoded losslessly at a compression effort derived from the
//! optimization level. JPEGs are re-encoded only when a quality is set, since
//! that is lossy. Anything else is copied as-is. A re-encoded file that comes
//! out larger than the original is discarded in favor of the original bytes.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, ImageFormat};
use rayon::prelude::*;
use std::fs;
use std::path::Path;

use super::{collect_files, MinifyError, MinifyReport};
use crate::config::ImagesConfig;

/// Optimizes images from one directory into another
#[derive(Debug, Clone)]
pub struct ImageOptimizer {
    level: u8,
    jpeg_quality: Option<u8>,
}

impl ImageOptimizer {
    pub fn new(config: &ImagesConfig) -> Self {
        Self {
            level: config.level(),
            jpeg_quality: config.jpeg_quality.map(|q| q.clamp(1, 100)),
        }
    }

    /// Optimize every `*.*` file directly inside `source`, writing results
    /// under the same file names into `dest`
    pub fn run(&self, source: &Path, dest: &Path) -> Result<MinifyReport, MinifyError> {
        let files = collect_files(source, &["*.*".to_string()])?;
        if files.is_empty() {
            tracing::debug!("No images under {:?}", source);
            return Ok(MinifyReport::default());
        }

        fs::create_dir_all(dest).map_err(|e| MinifyError::io(dest, e))?;

        files
            .par_iter()
            .map(|path| {
                let Some(name) = path.file_name() else {
                    return Ok(MinifyReport::default());
                };
                self.optimize_file(path, &dest.join(name))
            })
            .try_reduce(MinifyReport::default, |a, b| Ok(a.merge(b)))
    }

    fn optimize_file(&self, src: &Path, dst: &Path) -> Result<MinifyReport, MinifyError> {
        let bytes = fs::read(src).map_err(|e| MinifyError::io(src, e))?;
        let format = ImageFormat::from_path(src).ok();

        let optimized = self
            .optimize(&bytes, format)
            .map_err(|message| MinifyError::Transform {
                path: src.to_path_buf(),
                message,
            })?;

        let output = match optimized {
            Some(out) if out.len() < bytes.len() => out,
            _ => bytes.clone(),
        };

        fs::write(dst, &output).map_err(|e| MinifyError::io(dst, e))?;
        tracing::debug!("{:?}: {} -> {} bytes", dst, bytes.len(), output.len());

        Ok(MinifyReport::file(bytes.len(), output.len()))
    }

    /// Re-encode an image; `None` means the format is passed through
    pub fn optimize(&self, bytes: &[u8], format: Option<ImageFormat>) -> Result<Option<Vec<u8>>, String> {
        match format {
            Some(ImageFormat::Png) => self.optimize_png(bytes).map(Some),
            Some(ImageFormat::Jpeg) => match self.jpeg_quality {
                Some(quality) => optimize_jpeg(bytes, quality).map(Some),
                None => Ok(None),
            },
            _ => Ok(None),
        }
    }

    fn optimize_png(&self, bytes: &[u8]) -> Result<Vec<u8>, String> {
        let img = image::load_from_memory_with_format(bytes, ImageFormat::Png)
            .map_err(|e| format!("PNG decode error: {}", e))?;

        let compression = match self.level {
            0..=1 => CompressionType::Fast,
            2..=4 => CompressionType::Default,
            _ => CompressionType::Best,
        };

        let mut out = Vec::new();
        PngEncoder::new_with_quality(&mut out, compression, FilterType::Adaptive)
            .write_image(img.as_bytes(), img.width(), img.height(), img.color().into())
            .map_err(|e| format!("PNG encode error: {}", e))?;

        Ok(out)
    }
}

impl Default for ImageOptimizer {
    fn default() -> Self {
        Self::new(&ImagesConfig::default())
    }
}

fn optimize_jpeg(bytes: &[u8], quality: u8) -> Result<Vec<u8>, String> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)
        .map_err(|e| format!("JPEG decode error: {}", e))?;
    let rgb = img.to_rgb8();

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| format!("JPEG encode error: {}", e))?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    /// A deliberately poorly compressed PNG
    fn loose_png() -> Vec<u8> {
        let img = RgbImage::from_fn(64, 64, |x, _| if x < 32 { Rgb([200, 30, 30]) } else { Rgb([30, 30, 200]) });
        let mut out = Vec::new();
        PngEncoder::new_with_quality(&mut out, CompressionType::Fast, FilterType::NoFilter)
            .write_image(img.as_raw(), 64, 64, ExtendedColorType::Rgb8)
            .unwrap();
        out
    }

    fn jpeg() -> Vec<u8> {
        let img = RgbImage::from_pixel(16, 16, Rgb([10, 120, 240]));
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, 100)
            .write_image(img.as_raw(), 16, 16, ExtendedColorType::Rgb8)
            .unwrap();
        out
    }

    #[test]
    fn test_png_is_lossless_and_not_larger() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("css/images");
        let dst = dir.path().join("uploads");
        fs::create_dir_all(&src).unwrap();
        let original = loose_png();
        fs::write(src.join("logo.png"), &original).unwrap();

        let report = ImageOptimizer::default().run(&src, &dst).unwrap();
        assert_eq!(report.files, 1);
        assert!(report.bytes_out <= report.bytes_in);

        let written = fs::read(dst.join("logo.png")).unwrap();
        let before = image::load_from_memory(&original).unwrap();
        let after = image::load_from_memory(&written).unwrap();
        assert_eq!(before.as_bytes(), after.as_bytes());
        // Source stays where it was
        assert!(src.join("logo.png").exists());
    }

    #[test]
    fn test_other_formats_are_copied() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("in");
        let dst = dir.path().join("out");
        fs::create_dir_all(&src).unwrap();
        let svg = b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>";
        fs::write(src.join("icon.svg"), svg).unwrap();
        fs::write(src.join("photo.jpg"), jpeg()).unwrap();

        let report = ImageOptimizer::default().run(&src, &dst).unwrap();
        assert_eq!(report.files, 2);
        assert_eq!(report.bytes_in, report.bytes_out);
        assert_eq!(fs::read(dst.join("icon.svg")).unwrap(), svg);
        assert_eq!(fs::read(dst.join("photo.jpg")).unwrap(), jpeg());
    }

    #[test]
    fn test_jpeg_reencoded_when_quality_set() {
        let config = ImagesConfig {
            jpeg_quality: Some(40),
            ..ImagesConfig::default()
        };
        let original = jpeg();
        let out = ImageOptimizer::new(&config)
            .optimize(&original, Some(ImageFormat::Jpeg))
            .unwrap()
            .unwrap();
        assert!(image::load_from_memory(&out).is_ok());
    }

    #[test]
    fn test_corrupt_png_fails_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("in");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("broken.png"), b"not a png").unwrap();

        let err = ImageOptimizer::default()
            .run(&src, &dir.path().join("out"))
            .unwrap_err();
        assert!(matches!(err, MinifyError::Transform { ref path, .. } if path.ends_with("broken.png")));
    }

    #[test]
    fn test_missing_source_dir_is_empty_report() {
        let dir = tempfile::tempdir().unwrap();
        let report = ImageOptimizer::default()
            .run(&dir.path().join("nope"), &dir.path().join("out"))
            .unwrap();
        assert_eq!(report, MinifyReport::default());
        assert!(!dir.path().join("out").exists());
    }
}
