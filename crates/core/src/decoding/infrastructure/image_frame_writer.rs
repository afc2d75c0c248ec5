use std::path::Path;

use crate::decoding::domain::frame_writer::FrameWriter;
use crate::shared::frame::DecodedFrame;
use crate::shared::pixel_format::PixelFormat;

/// Writes decoded frames as image files using the `image` crate.
///
/// The file format follows the path's extension. Grayscale, RGB and RGBA
/// frames map to the matching `image` buffer type.
pub struct ImageFrameWriter;

impl ImageFrameWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFrameWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameWriter for ImageFrameWriter {
    fn write(
        &self,
        path: &Path,
        frame: &DecodedFrame,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let (w, h, data) = (frame.width(), frame.height(), frame.data().to_vec());
        match frame.format() {
            PixelFormat::Grayscale8 => image::GrayImage::from_raw(w, h, data)
                .ok_or("Failed to create image from frame data")?
                .save(path)?,
            PixelFormat::Rgb8 => image::RgbImage::from_raw(w, h, data)
                .ok_or("Failed to create image from frame data")?
                .save(path)?,
            PixelFormat::Rgba8 => image::RgbaImage::from_raw(w, h, data)
                .ok_or("Failed to create image from frame data")?
                .save(path)?,
            PixelFormat::Unknown => return Err("cannot write a frame of unknown format".into()),
        }
        Ok(())
    }
}
