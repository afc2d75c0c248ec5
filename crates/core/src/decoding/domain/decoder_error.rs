use std::path::PathBuf;

use thiserror::Error;

use crate::shared::video_metadata::MetadataError;

use super::color_conversion::ConversionError;
use super::decode_session::SessionError;

#[derive(Debug, Error)]
pub enum DecoderError {
    #[error("input file path is empty")]
    EmptyPath,
    #[error("decoder was already opened on {0}")]
    AlreadyOpened(PathBuf),
    #[error("failed to open video file at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: SessionError,
    },
    #[error("unsupported video format ({channels} channels) of the video file at {path}")]
    UnsupportedFormat { path: PathBuf, channels: u8 },
    #[error("incorrect metadata from the video file at {path}: {source}")]
    InvalidMetadata {
        path: PathBuf,
        #[source]
        source: MetadataError,
    },
    #[error("decoding frame {frame} failed: {source}")]
    DecodeFault {
        frame: u64,
        #[source]
        source: SessionError,
    },
    #[error("converting frame {frame} failed: {source}")]
    Conversion {
        frame: u64,
        #[source]
        source: ConversionError,
    },
    #[error("decoder is not open")]
    NotOpen,
}

impl DecoderError {
    /// True for faults on a single frame, after which the stream may still
    /// be readable. Everything else is fatal to the decoder instance.
    pub fn is_frame_fault(&self) -> bool {
        matches!(
            self,
            DecoderError::DecodeFault { .. } | DecoderError::Conversion { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_faults_classified() {
        let fault = DecoderError::DecodeFault {
            frame: 3,
            source: "corrupt packet".into(),
        };
        assert!(fault.is_frame_fault());
        let conversion = DecoderError::Conversion {
            frame: 3,
            source: ConversionError::UnknownFormat,
        };
        assert!(conversion.is_frame_fault());
        assert!(!DecoderError::NotOpen.is_frame_fault());
    }

    #[test]
    fn test_open_error_mentions_path() {
        let err = DecoderError::Open {
            path: PathBuf::from("/videos/missing.mp4"),
            source: "No such file or directory".into(),
        };
        let message = err.to_string();
        assert!(message.contains("/videos/missing.mp4"));
        assert!(message.contains("No such file"));
    }
}
