use std::path::{Path, PathBuf};

use tiny_skia::Pixmap;

use crate::{DreamCanvasError, Result};

/// Writes one rendered frame as a PNG file.
pub fn save_png(pixmap: &Pixmap, path: &Path) -> Result<()> {
    pixmap.save_png(path).map_err(|error| {
        DreamCanvasError::msg(format!("failed to write {}: {error}", path.display()))
    })
}

/// Writes rendered frames as a numbered PNG sequence in one directory,
/// ready to hand to an encoder or a viewer.
#[derive(Debug)]
pub struct FrameExporter {
    dir: PathBuf,
    next_frame: u32,
}

impl FrameExporter {
    /// Creates the target directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, next_frame: 0 })
    }

    /// Writes the next frame and returns the path it landed at.
    pub fn write_frame(&mut self, pixmap: &Pixmap) -> Result<PathBuf> {
        let path = self.dir.join(format!("frame-{:05}.png", self.next_frame));
        save_png(pixmap, &path)?;
        self.next_frame += 1;
        Ok(path)
    }

    pub fn frames_written(&self) -> u32 {
        self.next_frame
    }
}
