//! Content-addressed artwork files

use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Artwork image format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// JPEG image
    Jpeg,
    /// PNG image
    Png,
    /// GIF image
    Gif,
    /// Anything else
    Unknown,
}

impl ImageFormat {
    /// Detect format from data
    #[must_use]
    pub fn detect(data: &[u8]) -> Self {
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Self::Jpeg
        } else if data.starts_with(&[0x89, b'P', b'N', b'G']) {
            Self::Png
        } else if data.starts_with(b"GIF8") {
            Self::Gif
        } else {
            Self::Unknown
        }
    }

    /// File extension
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Unknown => "bin",
        }
    }
}

/// Writes artwork into a directory, one file per distinct image
#[derive(Debug, Clone)]
pub struct ArtworkStore {
    dir: PathBuf,
}

impl ArtworkStore {
    /// Store images in `dir`; the directory is created on first write
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path an image is stored at: `image_<sha256>.<ext>`
    #[must_use]
    pub fn path_for(&self, data: &[u8]) -> PathBuf {
        let digest = Sha256::digest(data);
        let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        let ext = ImageFormat::detect(data).extension();
        self.dir.join(format!("image_{hex}.{ext}"))
    }

    /// Write an image unless an identical one is already stored
    ///
    /// # Errors
    /// Returns the I/O error if the directory or file cannot be written.
    pub fn store(&self, data: &[u8]) -> io::Result<PathBuf> {
        let path = self.path_for(data);
        if path.is_file() {
            return Ok(path);
        }

        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(&path, data)?;
        tracing::debug!(path = %path.display(), len = data.len(), "Stored artwork");
        Ok(path)
    }
}

impl Default for ArtworkStore {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}
