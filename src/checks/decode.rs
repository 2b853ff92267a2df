//! Image decoding shared by the corrupt-file and quality checks.

use image::{DynamicImage, ImageError, ImageReader, Limits};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The image is larger than the decoder is allowed to allocate. Says
    /// nothing about whether the file is intact.
    #[error("exceeds decoder limits: {0}")]
    TooLarge(String),

    #[error("{0}")]
    Invalid(String),
}

impl From<ImageError> for DecodeError {
    fn from(e: ImageError) -> Self {
        match e {
            ImageError::Limits(limit) => Self::TooLarge(limit.to_string()),
            other => Self::Invalid(other.to_string()),
        }
    }
}

impl From<std::io::Error> for DecodeError {
    fn from(e: std::io::Error) -> Self {
        Self::Invalid(e.to_string())
    }
}

/// Fully decode an image with the decoder's default limits, detecting the
/// format from its content.
pub fn decode_image(path: &Path) -> Result<DynamicImage, DecodeError> {
    decode_image_with_limits(path, Limits::default())
}

pub fn decode_image_with_limits(path: &Path, limits: Limits) -> Result<DynamicImage, DecodeError> {
    let mut reader = ImageReader::open(path)?.with_guessed_format()?;
    reader.limits(limits);
    Ok(reader.decode()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_oversized_image_is_not_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wide.png");
        image::GrayImage::new(32, 8).save(&path).unwrap();

        let mut limits = Limits::default();
        limits.max_image_width = Some(16);
        let err = decode_image_with_limits(&path, limits).unwrap_err();
        assert!(matches!(err, DecodeError::TooLarge(_)));
        assert!(decode_image(&path).is_ok());
    }

    #[test]
    fn test_garbage_is_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.png");
        std::fs::write(&path, b"\x89PNG\r\n\x1a\nnope").unwrap();
        assert!(matches!(decode_image(&path), Err(DecodeError::Invalid(_))));
    }
}
