use crate::decoding::domain::decode_session::SessionOpener;
use crate::decoding::domain::video_decoder::{Produced, VideoDecoder, VideoDecoderConfig};
use crate::shared::constants::{VIDEO_PRESTREAM_TAG, VIDEO_TAG};
use crate::shared::frame::DecodedFrame;
use crate::shared::stream_header::StreamHeader;
use crate::shared::timestamp::{Packet, Timestamp};

use super::output_stream::OutputStream;
use super::pipeline_stage::{PipelineStage, StageError, StepStatus};
use super::stage_registry::StageSpec;

/// Runs a [`VideoDecoder`] as a pipeline stage.
///
/// Frames go to the `VIDEO` stream. When a `VIDEO_PRESTREAM` stream is
/// connected, the stream header is sent there at `Timestamp::PreStream`
/// during open and the stream is closed right after.
pub struct VideoDecoderStage {
    decoder: VideoDecoder,
    video: OutputStream<DecodedFrame>,
    prestream: Option<OutputStream<StreamHeader>>,
}

impl VideoDecoderStage {
    pub fn new(spec: StageSpec, opener: Box<dyn SessionOpener>) -> Self {
        let config = VideoDecoderConfig::new(spec.input_file_path)
            .with_prestream_header(spec.outputs.video_prestream.is_some());
        Self {
            decoder: VideoDecoder::new(config, opener),
            video: OutputStream::new(VIDEO_TAG, spec.outputs.video),
            prestream: spec
                .outputs
                .video_prestream
                .map(|tx| OutputStream::new(VIDEO_PRESTREAM_TAG, tx)),
        }
    }

    pub fn decoder(&self) -> &VideoDecoder {
        &self.decoder
    }
}

impl PipelineStage for VideoDecoderStage {
    fn open(&mut self) -> Result<(), StageError> {
        let header = self.decoder.open()?;
        if let (Some(stream), Some(header)) = (self.prestream.as_mut(), header) {
            stream.add(Packet::new(Timestamp::PreStream, header))?;
            stream.close();
        }
        Ok(())
    }

    fn process(&mut self) -> Result<StepStatus, StageError> {
        match self.decoder.produce_next()? {
            Produced::Frame(frame) => {
                let timestamp = Timestamp::Micros(frame.timestamp_us());
                self.video.add(Packet::new(timestamp, frame))?;
                Ok(StepStatus::Continue)
            }
            Produced::Dropped => Ok(StepStatus::Continue),
            Produced::Exhausted => Ok(StepStatus::Stop),
        }
    }

    fn close(&mut self) {
        self.decoder.close();
        self.video.close();
        if let Some(stream) = self.prestream.as_mut() {
            stream.close();
        }
    }
}
