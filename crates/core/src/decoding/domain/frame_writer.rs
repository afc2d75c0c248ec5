use std::path::Path;

use crate::shared::frame::DecodedFrame;

/// Writes a single decoded frame to a file.
pub trait FrameWriter: Send {
    fn write(
        &self,
        path: &Path,
        frame: &DecodedFrame,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
