use std::path::Path;

use ffmpeg_next::format::Pixel;
use ffmpeg_next::software::scaling;
use ffmpeg_next::util::frame::video::Video as VideoFrame;

use crate::decoding::domain::decode_session::{DecodeSession, SessionError, SessionOpener};
use crate::decoding::domain::raw_frame::{ChannelOrder, RawFrame};
use crate::shared::video_metadata::ContainerMetadata;

/// `AV_TIME_BASE` units per second, used for container durations.
const AV_TIME_BASE_SECS: f64 = 1_000_000.0;

/// `AV_NOPTS_VALUE`: no timestamp set.
const NO_PTS: i64 = i64::MIN;

/// Decode session over libavformat + libavcodec via ffmpeg-next.
///
/// Every decoded frame is converted to packed GRAY8, RGB24 or RGBA depending
/// on how many components its native pixel format carries. Formats with any
/// other component count (e.g. gray + alpha) come back with that channel
/// count and no pixel data.
pub struct FfmpegSession {
    input: Option<ffmpeg_next::format::context::Input>,
    decoder: Option<ffmpeg_next::decoder::Video>,
    scaler: Option<CachedScaler>,
    stream_index: usize,
    time_base: f64,
    start_time: Option<i64>,
    container: ContainerMetadata,
    position_ms: f64,
    frames_read: u64,
    flushing: bool,
}

struct CachedScaler {
    source: (Pixel, u32, u32),
    target: Pixel,
    context: scaling::Context,
}

// Safety: FfmpegSession is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegSession {}

impl FfmpegSession {
    pub fn open(path: &Path) -> Result<Self, SessionError> {
        ffmpeg_next::init()?;

        let input = ffmpeg_next::format::input(path)?;

        let (stream_index, time_base, start_time, frame_rate, stream_frames, decoder) = {
            let stream = input
                .streams()
                .best(ffmpeg_next::media::Type::Video)
                .ok_or("No video stream found")?;

            let codec_ctx =
                ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
            let decoder = codec_ctx.decoder().video()?;

            let frame_rate = rational_to_f64(stream.avg_frame_rate())
                .or_else(|| rational_to_f64(stream.rate()))
                .unwrap_or(0.0);
            let start_time = Some(stream.start_time()).filter(|&t| t != NO_PTS);

            (
                stream.index(),
                rational_to_f64(stream.time_base()).unwrap_or(0.0),
                start_time,
                frame_rate,
                stream.frames(),
                decoder,
            )
        };

        let frame_count = if stream_frames > 0 {
            stream_frames
        } else {
            estimate_frame_count(input.duration(), frame_rate)
        };

        let container = ContainerMetadata {
            width: i64::from(decoder.width()),
            height: i64::from(decoder.height()),
            frame_rate,
            frame_count,
        };

        Ok(Self {
            input: Some(input),
            decoder: Some(decoder),
            scaler: None,
            stream_index,
            time_base,
            start_time,
            container,
            position_ms: 0.0,
            frames_read: 0,
            flushing: false,
        })
    }

    /// Pulls decoded frames, feeding packets and finally EOF to the decoder.
    fn next_decoded(&mut self) -> Result<Option<VideoFrame>, SessionError> {
        let (Some(input), Some(decoder)) = (self.input.as_mut(), self.decoder.as_mut()) else {
            return Err("decode session is not open".into());
        };

        let mut decoded = VideoFrame::empty();
        loop {
            match classify_receive(decoder.receive_frame(&mut decoded))? {
                Received::Frame => return Ok(Some(decoded)),
                Received::Drained => return Ok(None),
                Received::NeedInput if self.flushing => return Ok(None),
                Received::NeedInput => {}
            }

            let next = input
                .packets()
                .next()
                .map(|(stream, packet)| (stream.index(), packet));
            match next {
                Some((index, packet)) => {
                    if index != self.stream_index {
                        continue;
                    }
                    decoder.send_packet(&packet)?;
                }
                None => {
                    decoder.send_eof()?;
                    self.flushing = true;
                }
            }
        }
    }

    /// Position of a decoded frame relative to the stream start, in ms.
    ///
    /// Falls back to the frame index and frame rate when the frame carries
    /// no timestamp.
    fn frame_position_ms(&self, frame: &VideoFrame) -> f64 {
        match frame.timestamp().or_else(|| frame.pts()) {
            Some(ts) if self.time_base > 0.0 => {
                let relative = ts - self.start_time.unwrap_or(0);
                relative as f64 * self.time_base * 1000.0
            }
            _ if self.container.frame_rate > 0.0 => {
                self.frames_read as f64 * 1000.0 / self.container.frame_rate
            }
            _ => f64::NAN,
        }
    }

    fn to_raw(&mut self, frame: &VideoFrame) -> Result<RawFrame, SessionError> {
        let width = frame.width();
        let height = frame.height();
        let channels = channel_count(frame.format());
        let Some(target) = target_pixel(channels) else {
            return Ok(RawFrame {
                data: Vec::new(),
                width,
                height,
                channels,
                order: ChannelOrder::Rgb,
            });
        };

        let source = (frame.format(), width, height);
        let reusable = self
            .scaler
            .as_ref()
            .is_some_and(|s| s.source == source && s.target == target);
        if !reusable {
            let context = scaling::Context::get(
                frame.format(),
                width,
                height,
                target,
                width,
                height,
                scaling::Flags::BILINEAR,
            )?;
            self.scaler = Some(CachedScaler {
                source,
                target,
                context,
            });
        }
        let Some(scaler) = self.scaler.as_mut() else {
            return Err("pixel converter unavailable".into());
        };

        let mut converted = VideoFrame::empty();
        scaler.context.run(frame, &mut converted)?;

        Ok(RawFrame {
            data: extract_packed_pixels(&converted, width, height, channels),
            width,
            height,
            channels,
            order: ChannelOrder::Rgb,
        })
    }
}

impl DecodeSession for FfmpegSession {
    fn container_metadata(&self) -> ContainerMetadata {
        self.container.clone()
    }

    fn read(&mut self) -> Result<Option<RawFrame>, SessionError> {
        let Some(decoded) = self.next_decoded()? else {
            return Ok(None);
        };
        self.position_ms = self.frame_position_ms(&decoded);
        self.frames_read += 1;
        self.to_raw(&decoded).map(Some)
    }

    fn position_ms(&self) -> f64 {
        self.position_ms
    }

    fn rewind(&mut self) -> Result<(), SessionError> {
        let Some(input) = self.input.as_mut() else {
            return Err("decode session is not open".into());
        };
        input.seek(0, ..)?;
        if let Some(decoder) = self.decoder.as_mut() {
            decoder.flush();
        }
        self.flushing = false;
        self.position_ms = 0.0;
        self.frames_read = 0;
        Ok(())
    }

    fn release(&mut self) {
        self.scaler = None;
        self.decoder = None;
        self.input = None;
    }

    fn is_open(&self) -> bool {
        self.input.is_some()
    }
}

/// Opens [`FfmpegSession`]s.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfmpegSessionOpener;

impl SessionOpener for FfmpegSessionOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn DecodeSession>, SessionError> {
        Ok(Box::new(FfmpegSession::open(path)?))
    }
}

/// Outcome of one `receive_frame` call.
#[derive(Debug, PartialEq, Eq)]
enum Received {
    Frame,
    NeedInput,
    Drained,
}

/// Maps the decoder's "try again" and end-of-stream signals to states;
/// any other error is a real decode failure.
fn classify_receive(result: Result<(), ffmpeg_next::Error>) -> Result<Received, SessionError> {
    match result {
        Ok(()) => Ok(Received::Frame),
        Err(ffmpeg_next::Error::Other { errno }) if errno == ffmpeg_next::error::EAGAIN => {
            Ok(Received::NeedInput)
        }
        Err(ffmpeg_next::Error::Eof) => Ok(Received::Drained),
        Err(e) => Err(e.into()),
    }
}

fn rational_to_f64(rate: ffmpeg_next::Rational) -> Option<f64> {
    if rate.numerator() > 0 && rate.denominator() > 0 {
        Some(rate.numerator() as f64 / rate.denominator() as f64)
    } else {
        None
    }
}

/// Estimates a frame count from the container duration when the stream
/// does not report one. Returns 0 when either input is unknown.
fn estimate_frame_count(duration: i64, frame_rate: f64) -> i64 {
    if duration <= 0 || frame_rate <= 0.0 {
        return 0;
    }
    (duration as f64 / AV_TIME_BASE_SECS * frame_rate).round() as i64
}

fn channel_count(format: Pixel) -> u8 {
    format.descriptor().map_or(0, |d| d.nb_components())
}

fn target_pixel(channels: u8) -> Option<Pixel> {
    match channels {
        1 => Some(Pixel::GRAY8),
        3 => Some(Pixel::RGB24),
        4 => Some(Pixel::RGBA),
        _ => None,
    }
}

/// Copies pixel data from an ffmpeg frame into a tightly-packed buffer.
///
/// ffmpeg frames may have padding bytes at the end of each row
/// (stride > width * channels); those are stripped.
fn extract_packed_pixels(frame: &VideoFrame, width: u32, height: u32, channels: u8) -> Vec<u8> {
    let stride = frame.stride(0);
    let data = frame.data(0);
    let row_len = width as usize * channels as usize;
    let h = height as usize;

    let mut pixels = Vec::with_capacity(row_len * h);
    for row in 0..h {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + row_len]);
    }
    pixels
}
