use std::path::PathBuf;

use thiserror::Error;

use super::pixel_format::PixelFormat;

/// Stream properties as the container reports them.
///
/// Values are best-effort and unvalidated: any of them may be zero,
/// negative or simply wrong.
#[derive(Clone, Debug, PartialEq)]
pub struct ContainerMetadata {
    pub width: i64,
    pub height: i64,
    pub frame_rate: f64,
    pub frame_count: i64,
}

#[derive(Debug, Error, PartialEq)]
pub enum MetadataError {
    #[error("frame rate must be positive, got {0}")]
    FrameRate(f64),
    #[error("frame count must be positive, got {0}")]
    FrameCount(i64),
    #[error("width must be positive, got {0}")]
    Width(i64),
    #[error("height must be positive, got {0}")]
    Height(i64),
}

/// Validated stream properties, computed once when a source is opened.
#[derive(Clone, Debug, PartialEq)]
pub struct ProbedMetadata {
    pub width: u32,
    pub height: u32,
    pub frame_rate: f64,
    pub frame_count: u64,
    pub pixel_format: PixelFormat,
    pub source_path: Option<PathBuf>,
}

impl ProbedMetadata {
    /// Validates container metadata against the probed pixel format.
    ///
    /// Checks run in a fixed order (frame rate, frame count, width, height)
    /// and the first failure is returned.
    pub fn validate(
        container: &ContainerMetadata,
        pixel_format: PixelFormat,
        source_path: Option<PathBuf>,
    ) -> Result<Self, MetadataError> {
        // NaN fails this check too.
        if !(container.frame_rate > 0.0) {
            return Err(MetadataError::FrameRate(container.frame_rate));
        }
        if container.frame_count <= 0 {
            return Err(MetadataError::FrameCount(container.frame_count));
        }
        let width = positive_u32(container.width).ok_or(MetadataError::Width(container.width))?;
        let height =
            positive_u32(container.height).ok_or(MetadataError::Height(container.height))?;

        Ok(Self {
            width,
            height,
            frame_rate: container.frame_rate,
            frame_count: container.frame_count as u64,
            pixel_format,
            source_path,
        })
    }

    pub fn duration_sec(&self) -> f64 {
        self.frame_count as f64 / self.frame_rate
    }

    /// Size in bytes of one frame in the canonical pixel format.
    pub fn frame_len(&self) -> usize {
        (self.width as usize)
            * (self.height as usize)
            * (self.pixel_format.channels().unwrap_or(0) as usize)
    }
}

fn positive_u32(value: i64) -> Option<u32> {
    if value > 0 {
        u32::try_from(value).ok()
    } else {
        None
    }
}
