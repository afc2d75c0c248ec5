use thiserror::Error;

use crate::decoding::domain::decoder_error::DecoderError;

/// Outcome of a successful processing step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepStatus {
    /// The stage can be stepped again.
    Continue,
    /// The stage is exhausted; the host must not step it again.
    Stop,
}

#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Decoder(#[from] DecoderError),
    #[error("output stream {0} is closed")]
    OutputClosed(&'static str),
    #[error("no stage registered under the name {0:?}")]
    UnknownStage(String),
    #[error("stage thread panicked")]
    Panicked,
}

impl StageError {
    /// True when only the current step failed and the stage may be stepped
    /// again.
    pub fn is_step_fault(&self) -> bool {
        matches!(self, StageError::Decoder(e) if e.is_frame_fault())
    }
}

/// A unit of work driven by an external scheduler.
///
/// The host calls `open` once, `process` until it returns
/// [`StepStatus::Stop`] or the host gives up, and `close` exactly once at
/// teardown, even if `open` failed.
pub trait PipelineStage: Send {
    fn open(&mut self) -> Result<(), StageError>;

    fn process(&mut self) -> Result<StepStatus, StageError>;

    fn close(&mut self);
}
