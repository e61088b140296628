//! Annotated artifact persistence
//!
//! Writes a copy of each successfully classified frame with the detected
//! emotion drawn on top, for debugging and audit. This is observational
//! tooling only: it is injectable so tests (or deployments that don't
//! want the artifacts) can plug in the no-op sink.

use ab_glyph::{FontVec, PxScale};
use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;
use std::path::{Path, PathBuf};

use crate::classifier::EmotionLabel;

const OVERLAY_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const OVERLAY_X: i32 = 10;
const OVERLAY_Y: i32 = 10;
const OVERLAY_SCALE: f32 = 30.0;

/// Font locations tried when `ANNOTATION_FONT` is not set.
const FONT_CANDIDATES: [&str; 3] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
];

/// Destination for annotated frames.
pub trait ArtifactSink: Send + Sync {
    /// Persist one annotated frame. Filenames are keyed by request id and
    /// frame index so concurrent requests never collide.
    fn persist(
        &self,
        request_id: &str,
        frame: usize,
        image: &RgbImage,
        label: &EmotionLabel,
    ) -> Result<()>;
}

/// Writes annotated PNGs under `<output_dir>/<request_id>/image_<frame>.png`.
pub struct DiskSink {
    output_dir: PathBuf,
    font: Option<FontVec>,
}

impl DiskSink {
    /// The output directory itself is created lazily on first persist.
    pub fn new(output_dir: PathBuf) -> Self {
        let font = load_font();
        if font.is_none() {
            log::warn!("[annotate] No usable font found, artifacts will be written without text");
        }
        Self { output_dir, font }
    }
}

impl ArtifactSink for DiskSink {
    fn persist(
        &self,
        request_id: &str,
        frame: usize,
        image: &RgbImage,
        label: &EmotionLabel,
    ) -> Result<()> {
        let dir = self.output_dir.join(request_id);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create output dir {}", dir.display()))?;

        let mut annotated = image.clone();
        if let Some(font) = &self.font {
            draw_text_mut(
                &mut annotated,
                OVERLAY_COLOR,
                OVERLAY_X,
                OVERLAY_Y,
                PxScale::from(OVERLAY_SCALE),
                font,
                &format!("Emotion: {}", label),
            );
        }

        let path = dir.join(format!("image_{}.png", frame));
        annotated
            .save(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::debug!("[annotate] Saved annotated frame to {}", path.display());
        Ok(())
    }
}

/// Sink that discards artifacts. For tests or deployments without a
/// visual audit trail.
pub struct NoOpSink;

impl ArtifactSink for NoOpSink {
    fn persist(&self, _: &str, _: usize, _: &RgbImage, _: &EmotionLabel) -> Result<()> {
        Ok(())
    }
}

fn load_font() -> Option<FontVec> {
    let candidates: Vec<PathBuf> = std::env::var("ANNOTATION_FONT")
        .ok()
        .map(|p| vec![PathBuf::from(p)])
        .unwrap_or_else(|| FONT_CANDIDATES.iter().map(PathBuf::from).collect());

    for path in candidates {
        if let Some(font) = try_load_font(&path) {
            log::info!("[annotate] Using overlay font {}", path.display());
            return Some(font);
        }
    }
    None
}

fn try_load_font(path: &Path) -> Option<FontVec> {
    let bytes = std::fs::read(path).ok()?;
    FontVec::try_from_vec(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_sink_writes_per_request_files() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DiskSink::new(dir.path().to_path_buf());
        let image = RgbImage::from_pixel(32, 32, Rgb([80, 80, 80]));

        sink.persist("req_abc", 1, &image, &EmotionLabel::Happy)
            .unwrap();
        sink.persist("req_abc", 2, &image, &EmotionLabel::Sad)
            .unwrap();

        assert!(dir.path().join("req_abc/image_1.png").exists());
        assert!(dir.path().join("req_abc/image_2.png").exists());
    }

    #[test]
    fn test_noop_sink_never_fails() {
        let image = RgbImage::new(1, 1);
        NoOpSink
            .persist("x", 1, &image, &EmotionLabel::Neutral)
            .unwrap();
    }
}
