use std::path::PathBuf;
use std::thread::JoinHandle;

use crossbeam_channel::Receiver;

use crate::pipeline::pipeline_stage::StageError;
use crate::pipeline::stage_registry::{StageOutputs, StageRegistry, StageSpec};
use crate::pipeline::stage_runner::{RunSummary, StageRunner};
use crate::shared::frame::DecodedFrame;
use crate::shared::stream_header::StreamHeader;
use crate::shared::timestamp::Packet;

const DEFAULT_CHANNEL_CAPACITY: usize = 8;

/// Receivers for a stage running on its own thread.
///
/// Drain `header` (if requested) and then `video`; both disconnect when the
/// stage closes.
pub struct StageHandle {
    pub header: Option<Receiver<Packet<StreamHeader>>>,
    pub video: Receiver<Packet<DecodedFrame>>,
    thread: JoinHandle<Result<RunSummary, StageError>>,
}

impl StageHandle {
    /// Drops the receivers and waits for the stage thread.
    ///
    /// A stage still producing when the receivers go away ends with
    /// [`StageError::OutputClosed`].
    pub fn join(self) -> Result<RunSummary, StageError> {
        let StageHandle {
            header,
            video,
            thread,
        } = self;
        drop(header);
        drop(video);
        thread.join().map_err(|_| StageError::Panicked)?
    }
}

/// Runs a registered stage on a dedicated thread, with bounded channels
/// between the stage and the consumer.
pub struct ThreadedStageHost {
    channel_capacity: usize,
    runner: StageRunner,
}

impl ThreadedStageHost {
    pub fn new(runner: StageRunner) -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            runner,
        }
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    pub fn spawn(
        &self,
        registry: &StageRegistry,
        name: &str,
        input_file_path: PathBuf,
        with_header: bool,
    ) -> Result<StageHandle, StageError> {
        let (video_tx, video_rx) = crossbeam_channel::bounded(self.channel_capacity);
        let (header_tx, header_rx) = if with_header {
            let (tx, rx) = crossbeam_channel::bounded(1);
            (Some(tx), Some(rx))
        } else {
            (None, None)
        };

        let mut stage = registry.create(
            name,
            StageSpec {
                input_file_path,
                outputs: StageOutputs {
                    video: video_tx,
                    video_prestream: header_tx,
                },
            },
        )?;

        let runner = self.runner.clone();
        let thread = std::thread::spawn(move || runner.run(stage.as_mut()));

        Ok(StageHandle {
            header: header_rx,
            video: video_rx,
            thread,
        })
    }
}

impl Default for ThreadedStageHost {
    fn default() -> Self {
        Self::new(StageRunner::new())
    }
}
