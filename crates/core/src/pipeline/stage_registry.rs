use std::collections::HashMap;
use std::path::PathBuf;

use crossbeam_channel::Sender;

use crate::decoding::infrastructure::ffmpeg_session::FfmpegSessionOpener;
use crate::shared::constants::VIDEO_DECODER_STAGE;
use crate::shared::frame::DecodedFrame;
use crate::shared::stream_header::StreamHeader;
use crate::shared::timestamp::Packet;

use super::pipeline_stage::{PipelineStage, StageError};
use super::video_decoder_stage::VideoDecoderStage;

/// Output channels a host connects to a video source stage.
///
/// `video_prestream` is optional; leaving it `None` tells the stage not to
/// produce a stream header.
pub struct StageOutputs {
    pub video: Sender<Packet<DecodedFrame>>,
    pub video_prestream: Option<Sender<Packet<StreamHeader>>>,
}

/// Everything a stage constructor receives.
pub struct StageSpec {
    pub input_file_path: PathBuf,
    pub outputs: StageOutputs,
}

pub type StageConstructor = Box<dyn Fn(StageSpec) -> Box<dyn PipelineStage> + Send + Sync>;

/// Collects named stage constructors before a registry is frozen.
#[derive(Default)]
pub struct StageRegistryBuilder {
    constructors: HashMap<String, StageConstructor>,
}

impl StageRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `constructor` under `name`, replacing any earlier entry.
    pub fn register<F>(mut self, name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(StageSpec) -> Box<dyn PipelineStage> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.constructors.contains_key(&name) {
            log::warn!("Replacing stage registration for {name}");
        }
        self.constructors.insert(name, Box::new(constructor));
        self
    }

    pub fn build(self) -> StageRegistry {
        StageRegistry {
            constructors: self.constructors,
        }
    }
}

/// Immutable name → constructor map owned by the host.
///
/// Built once before any pipeline is assembled.
pub struct StageRegistry {
    constructors: HashMap<String, StageConstructor>,
}

impl StageRegistry {
    pub fn builder() -> StageRegistryBuilder {
        StageRegistryBuilder::new()
    }

    /// Registry with the ffmpeg-backed video decoder.
    pub fn with_defaults() -> Self {
        Self::builder()
            .register(VIDEO_DECODER_STAGE, |spec| {
                Box::new(VideoDecoderStage::new(spec, Box::new(FfmpegSessionOpener)))
            })
            .build()
    }

    pub fn create(&self, name: &str, spec: StageSpec) -> Result<Box<dyn PipelineStage>, StageError> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| StageError::UnknownStage(name.to_string()))?;
        Ok(constructor(spec))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoding::domain::scripted_session::{bgr_frame, ScriptedOpener, ScriptedSession};
    use crate::pipeline::pipeline_stage::StepStatus;

    fn spec() -> (StageSpec, crossbeam_channel::Receiver<Packet<DecodedFrame>>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let spec = StageSpec {
            input_file_path: PathBuf::from("/videos/clip.mp4"),
            outputs: StageOutputs {
                video: tx,
                video_prestream: None,
            },
        };
        (spec, rx)
    }

    fn scripted_registry() -> StageRegistry {
        StageRegistry::builder()
            .register("Scripted", |spec| {
                let session =
                    ScriptedSession::new(1, 1, 10.0, 1).with_frame(bgr_frame(1, 1, 0), 0.0);
                Box::new(VideoDecoderStage::new(
                    spec,
                    Box::new(ScriptedOpener::new(session)),
                ))
            })
            .build()
    }

    #[test]
    fn test_defaults_register_video_decoder() {
        let registry = StageRegistry::with_defaults();
        assert!(registry.contains(VIDEO_DECODER_STAGE));
        assert_eq!(registry.names(), vec![VIDEO_DECODER_STAGE]);
    }

    #[test]
    fn test_create_builds_working_stage() {
        let registry = scripted_registry();
        let (spec, rx) = spec();
        let mut stage = registry.create("Scripted", spec).unwrap();
        stage.open().unwrap();
        assert_eq!(stage.process().unwrap(), StepStatus::Continue);
        assert_eq!(stage.process().unwrap(), StepStatus::Stop);
        stage.close();
        assert_eq!(rx.iter().count(), 1);
    }

    #[test]
    fn test_unknown_name_rejected() {
        let registry = scripted_registry();
        let (spec, _rx) = spec();
        match registry.create("OpenCvVideoDecoder", spec) {
            Err(StageError::UnknownStage(name)) => assert_eq!(name, "OpenCvVideoDecoder"),
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn test_register_replaces_existing() {
        let registry = StageRegistry::builder()
            .register("A", |spec| {
                Box::new(VideoDecoderStage::new(spec, Box::new(ScriptedOpener::failing())))
            })
            .register("A", |spec| {
                Box::new(VideoDecoderStage::new(spec, Box::new(ScriptedOpener::failing())))
            })
            .build();
        assert_eq!(registry.names(), vec!["A"]);
    }
}
