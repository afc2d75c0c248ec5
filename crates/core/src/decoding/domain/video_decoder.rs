use std::path::{Path, PathBuf};

use crate::shared::frame::DecodedFrame;
use crate::shared::pixel_format::PixelFormat;
use crate::shared::stream_header::StreamHeader;
use crate::shared::timestamp::Timestamp;
use crate::shared::video_metadata::ProbedMetadata;

use super::color_conversion::to_canonical;
use super::decode_session::{DecodeSession, SessionOpener};
use super::decoder_error::DecoderError;
use super::emission_state::EmissionState;

/// Settings fixed when the decoder is constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoDecoderConfig {
    pub input_file_path: PathBuf,
    pub emit_prestream_header: bool,
}

impl VideoDecoderConfig {
    pub fn new(input_file_path: impl Into<PathBuf>) -> Self {
        Self {
            input_file_path: input_file_path.into(),
            emit_prestream_header: false,
        }
    }

    pub fn with_prestream_header(mut self, emit: bool) -> Self {
        self.emit_prestream_header = emit;
        self
    }
}

/// Result of one producer step.
#[derive(Debug)]
pub enum Produced {
    /// A frame passed the timestamp gate and is handed to the caller.
    Frame(DecodedFrame),
    /// A frame was decoded but its timestamp did not advance.
    Dropped,
    /// The source has no more frames. Every later call returns this too.
    Exhausted,
}

/// Streams a video file as timestamped frames in a canonical pixel format.
///
/// Lifecycle: [`open`](Self::open) once, [`produce_next`](Self::produce_next)
/// until it returns [`Produced::Exhausted`], then [`close`](Self::close).
/// `close` is safe at any point, including after a failed open.
pub struct VideoDecoder {
    config: VideoDecoderConfig,
    opener: Box<dyn SessionOpener>,
    session: Option<Box<dyn DecodeSession>>,
    metadata: Option<ProbedMetadata>,
    state: EmissionState,
    frames_read: u64,
    exhausted: bool,
    opened: bool,
    closed: bool,
}

impl VideoDecoder {
    pub fn new(config: VideoDecoderConfig, opener: Box<dyn SessionOpener>) -> Self {
        Self {
            config,
            opener,
            session: None,
            metadata: None,
            state: EmissionState::new(),
            frames_read: 0,
            exhausted: false,
            opened: false,
            closed: false,
        }
    }

    /// Opens the source, probes its format and metadata, and rewinds to the
    /// first frame.
    ///
    /// Returns the stream header when the config asks for one. On failure no
    /// header is returned and the session is already released.
    pub fn open(&mut self) -> Result<Option<StreamHeader>, DecoderError> {
        let path = self.config.input_file_path.clone();
        if path.as_os_str().is_empty() {
            return Err(DecoderError::EmptyPath);
        }
        if self.opened {
            return Err(DecoderError::AlreadyOpened(path));
        }

        let mut session = self
            .opener
            .open(&path)
            .map_err(|source| DecoderError::Open {
                path: path.clone(),
                source,
            })?;

        match probe(session.as_mut(), &path) {
            Ok(metadata) => {
                log::info!(
                    "Opened {}: {} {}x{} @ {:.3} fps, {} frames",
                    path.display(),
                    metadata.pixel_format,
                    metadata.width,
                    metadata.height,
                    metadata.frame_rate,
                    metadata.frame_count
                );
                let header = self
                    .config
                    .emit_prestream_header
                    .then(|| StreamHeader::from(&metadata));
                self.session = Some(session);
                self.metadata = Some(metadata);
                self.state = EmissionState::new();
                self.frames_read = 0;
                self.exhausted = false;
                self.opened = true;
                Ok(header)
            }
            Err(e) => {
                session.release();
                Err(e)
            }
        }
    }

    /// Decodes the next frame and passes it through the timestamp gate.
    pub fn produce_next(&mut self) -> Result<Produced, DecoderError> {
        let (Some(session), Some(metadata)) = (self.session.as_mut(), self.metadata.as_ref())
        else {
            return Err(DecoderError::NotOpen);
        };
        if self.exhausted {
            return Ok(Produced::Exhausted);
        }

        let frame_number = self.frames_read;
        let raw = session
            .read()
            .map_err(|source| DecoderError::DecodeFault {
                frame: frame_number,
                source,
            })?;
        let Some(raw) = raw else {
            log::debug!("End of stream after {} frames", self.frames_read);
            self.exhausted = true;
            return Ok(Produced::Exhausted);
        };
        self.frames_read += 1;

        let timestamp = Timestamp::from_millis(session.position_ms()).and_then(Timestamp::micros);
        let data = to_canonical(raw, metadata).map_err(|source| DecoderError::Conversion {
            frame: frame_number,
            source,
        })?;
        let (width, height, format) = (metadata.width, metadata.height, metadata.pixel_format);

        let Some(timestamp_us) = timestamp else {
            log::debug!("Dropping frame {frame_number}: source position is not finite");
            self.state.reject();
            return Ok(Produced::Dropped);
        };
        if !self.state.admit(timestamp_us) {
            log::debug!(
                "Dropping frame {frame_number}: timestamp {timestamp_us}us does not advance past {:?}",
                self.state.previous_timestamp_us()
            );
            return Ok(Produced::Dropped);
        }

        Ok(Produced::Frame(DecodedFrame::new(
            data,
            width,
            height,
            format,
            timestamp_us,
        )))
    }

    /// Releases the session and reports a frame-count mismatch. Idempotent.
    pub fn close(&mut self) {
        self.release_session();
        if self.closed {
            return;
        }
        self.closed = true;

        let Some(metadata) = self.metadata.as_ref() else {
            return;
        };
        if self.state.dropped() > 0 {
            log::info!(
                "Dropped {} frames with invalid or non-increasing timestamps",
                self.state.dropped()
            );
        }
        if let Some(message) = frame_count_mismatch(metadata, self.state.emitted()) {
            log::warn!("{message}");
        }
    }

    pub fn config(&self) -> &VideoDecoderConfig {
        &self.config
    }

    pub fn metadata(&self) -> Option<&ProbedMetadata> {
        self.metadata.as_ref()
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.metadata
            .as_ref()
            .map_or(PixelFormat::Unknown, |m| m.pixel_format)
    }

    pub fn emitted_count(&self) -> u64 {
        self.state.emitted()
    }

    pub fn dropped_count(&self) -> u64 {
        self.state.dropped()
    }

    pub fn is_open(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.is_open())
    }

    fn release_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            if session.is_open() {
                session.release();
                log::debug!("Released decode session for {}", self.config.input_file_path.display());
            }
        }
    }
}

impl Drop for VideoDecoder {
    fn drop(&mut self) {
        self.release_session();
    }
}

/// Describes a difference between the container's frame count and the number
/// of frames actually emitted, or `None` when they agree.
fn frame_count_mismatch(metadata: &ProbedMetadata, emitted: u64) -> Option<String> {
    if emitted == metadata.frame_count {
        return None;
    }
    let source = metadata
        .source_path
        .as_deref()
        .map_or_else(|| "<unknown source>".to_string(), |p| p.display().to_string());
    Some(format!(
        "Not all the frames of {source} are decoded (total frames: {} vs decoded frames: {emitted}).",
        metadata.frame_count
    ))
}

/// Reads container metadata and one probe frame, then rewinds.
fn probe(session: &mut dyn DecodeSession, path: &Path) -> Result<ProbedMetadata, DecoderError> {
    let container = session.container_metadata();

    let probe_frame = session
        .read()
        .map_err(|source| DecoderError::Open {
            path: path.to_path_buf(),
            source,
        })?
        .ok_or_else(|| DecoderError::Open {
            path: path.to_path_buf(),
            source: "no frames could be read".into(),
        })?;

    let pixel_format = PixelFormat::from_channels(probe_frame.channels);
    if !pixel_format.is_known() {
        return Err(DecoderError::UnsupportedFormat {
            path: path.to_path_buf(),
            channels: probe_frame.channels,
        });
    }

    let metadata = ProbedMetadata::validate(&container, pixel_format, Some(path.to_path_buf()))
        .map_err(|source| DecoderError::InvalidMetadata {
            path: path.to_path_buf(),
            source,
        })?;

    session.rewind().map_err(|source| DecoderError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(metadata)
}
