use thiserror::Error;

use crate::shared::pixel_format::PixelFormat;
use crate::shared::video_metadata::ProbedMetadata;

use super::raw_frame::{ChannelOrder, RawFrame};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversionError {
    #[error("cannot convert to an unknown pixel format")]
    UnknownFormat,
    #[error("expected {expected} channels, decoder produced {actual}")]
    ChannelMismatch { expected: u8, actual: u8 },
    #[error("expected a {}x{} frame, decoder produced {}x{}", expected.0, expected.1, actual.0, actual.1)]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
    #[error("expected {expected} bytes of pixel data, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// Converts a raw decoded frame into the canonical layout probed at open.
///
/// The frame must match the probed width, height and channel count.
/// Grayscale is copied as is. Colour frames are reordered to RGB when the
/// decoder hands out BGR; alpha stays in the last channel. The raw buffer
/// is reused for the output.
pub fn to_canonical(raw: RawFrame, metadata: &ProbedMetadata) -> Result<Vec<u8>, ConversionError> {
    let format = metadata.pixel_format;
    let expected_channels = match format.channels() {
        Some(c) => c,
        None => return Err(ConversionError::UnknownFormat),
    };
    if raw.channels != expected_channels {
        return Err(ConversionError::ChannelMismatch {
            expected: expected_channels,
            actual: raw.channels,
        });
    }
    if (raw.width, raw.height) != (metadata.width, metadata.height) {
        return Err(ConversionError::DimensionMismatch {
            expected: (metadata.width, metadata.height),
            actual: (raw.width, raw.height),
        });
    }
    let expected_len = metadata.frame_len();
    if raw.data.len() != expected_len {
        return Err(ConversionError::SizeMismatch {
            expected: expected_len,
            actual: raw.data.len(),
        });
    }

    let order = raw.order;
    let mut data = raw.data;
    match format {
        PixelFormat::Grayscale8 => {}
        PixelFormat::Rgb8 | PixelFormat::Rgba8 => {
            if order == ChannelOrder::Bgr {
                swap_red_blue(&mut data, expected_channels as usize);
            }
        }
        // Rejected by the channel lookup above.
        PixelFormat::Unknown => return Err(ConversionError::UnknownFormat),
    }
    Ok(data)
}

fn swap_red_blue(data: &mut [u8], stride: usize) {
    for pixel in data.chunks_exact_mut(stride) {
        pixel.swap(0, 2);
    }
}
