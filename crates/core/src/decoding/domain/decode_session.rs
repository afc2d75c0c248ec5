use std::path::Path;

use crate::shared::video_metadata::ContainerMetadata;

use super::raw_frame::RawFrame;

/// Error type at the codec-library boundary.
pub type SessionError = Box<dyn std::error::Error + Send + Sync>;

/// A live handle to an open video source.
///
/// Implementations wrap a demuxer/decoder library; the decoding stage only
/// sees raw frames, a playback position and container metadata.
pub trait DecodeSession: Send {
    /// Stream properties reported by the container. Best-effort.
    fn container_metadata(&self) -> ContainerMetadata;

    /// Decodes the next frame, or returns `None` once the source is exhausted.
    fn read(&mut self) -> Result<Option<RawFrame>, SessionError>;

    /// Presentation position of the most recently read frame, in milliseconds.
    fn position_ms(&self) -> f64;

    /// Repositions the session so the next `read` returns the first frame.
    fn rewind(&mut self) -> Result<(), SessionError>;

    /// Releases the underlying resources. Safe to call more than once.
    fn release(&mut self);

    fn is_open(&self) -> bool;
}

/// Opens decode sessions for file paths.
pub trait SessionOpener: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn DecodeSession>, SessionError>;
}
