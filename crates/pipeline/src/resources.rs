//! Resolves the inputs and output location of a run.

use std::path::{Path, PathBuf};

use vidmark_common::error::{VidmarkError, VidmarkResult};
use vidmark_media_model::asset::{SourceAsset, WatermarkImage};
use vidmark_media_model::geometry::Size;

/// Everything a run needs from the filesystem.
#[derive(Debug, Clone, PartialEq)]
pub struct Resources {
    pub source: SourceAsset,
    pub watermark: WatermarkImage,
    pub output_path: PathBuf,
}

impl Resources {
    /// Check the source exists, read the watermark's pixel size, and make
    /// sure `output_dir` exists.
    pub fn locate(
        source: &Path,
        watermark: &Path,
        output_dir: &Path,
        file_name: &str,
    ) -> VidmarkResult<Self> {
        if !source.is_file() {
            return Err(VidmarkError::resource_unavailable(format!(
                "source video not found: {}",
                source.display()
            )));
        }

        let watermark = load_watermark(watermark)?;

        if file_name.is_empty() || Path::new(file_name).file_name().is_none() {
            return Err(VidmarkError::resource_unavailable(format!(
                "invalid output file name: {file_name:?}"
            )));
        }
        std::fs::create_dir_all(output_dir).map_err(|e| {
            VidmarkError::resource_unavailable(format!(
                "output directory {} is not writable: {e}",
                output_dir.display()
            ))
        })?;

        let output_path = output_dir.join(file_name);
        tracing::debug!(
            source = %source.display(),
            watermark = %watermark.path().display(),
            output = %output_path.display(),
            "Resources located"
        );

        Ok(Self {
            source: SourceAsset::new(source),
            watermark,
            output_path,
        })
    }
}

/// Read the pixel dimensions of an image file.
pub fn load_watermark(path: &Path) -> VidmarkResult<WatermarkImage> {
    let (width, height) = image::image_dimensions(path).map_err(|e| {
        VidmarkError::resource_unavailable(format!(
            "cannot read watermark image {}: {e}",
            path.display()
        ))
    })?;
    WatermarkImage::new(path, Size::new(width as f64, height as f64)).ok_or_else(|| {
        VidmarkError::resource_unavailable(format!(
            "watermark image {} has no pixels",
            path.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(path: &Path, width: u32, height: u32) {
        image::RgbaImage::from_pixel(width, height, image::Rgba([255, 255, 255, 128]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn test_locate_resolves_all_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("donut.mp4");
        std::fs::write(&source, b"not really a video").unwrap();
        let seal = dir.path().join("seal.png");
        write_png(&seal, 40, 20);
        let output_dir = dir.path().join("out").join("nested");

        let resources = Resources::locate(&source, &seal, &output_dir, "watermarked.mp4").unwrap();

        assert_eq!(resources.source.location(), source.as_path());
        assert_eq!(resources.watermark.size(), Size::new(40.0, 20.0));
        assert_eq!(resources.watermark.aspect_ratio(), 2.0);
        assert_eq!(resources.output_path, output_dir.join("watermarked.mp4"));
        assert!(output_dir.is_dir());
    }

    #[test]
    fn test_missing_source_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let seal = dir.path().join("seal.png");
        write_png(&seal, 8, 8);

        let err = Resources::locate(&dir.path().join("missing.mp4"), &seal, dir.path(), "o.mp4")
            .unwrap_err();
        assert!(matches!(err, VidmarkError::ResourceUnavailable { .. }));
    }

    #[test]
    fn test_unreadable_watermark_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("donut.mp4");
        std::fs::write(&source, b"video").unwrap();
        let seal = dir.path().join("seal.png");
        std::fs::write(&seal, b"not a png").unwrap();

        let err = Resources::locate(&source, &seal, dir.path(), "o.mp4").unwrap_err();
        assert!(matches!(err, VidmarkError::ResourceUnavailable { .. }));
    }

    #[test]
    fn test_output_dir_blocked_by_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("donut.mp4");
        std::fs::write(&source, b"video").unwrap();
        let seal = dir.path().join("seal.png");
        write_png(&seal, 8, 8);
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();

        let err = Resources::locate(&source, &seal, &blocker.join("out"), "o.mp4").unwrap_err();
        assert!(matches!(err, VidmarkError::ResourceUnavailable { .. }));
    }
}
