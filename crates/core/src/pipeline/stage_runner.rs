use super::pipeline_stage::{PipelineStage, StageError, StepStatus};

/// Counts from one run of a stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Steps that completed, including the final `Stop`.
    pub steps: u64,
    /// Steps that failed with a per-frame fault and were skipped.
    pub faults: u64,
    /// True if the run ended because `max_steps` was reached.
    pub truncated: bool,
}

/// Minimal single-threaded scheduler for one stage.
///
/// Opens the stage, steps it until it stops, and always closes it. Policy
/// for per-frame faults belongs here: by default the run aborts on the
/// first one.
#[derive(Clone, Debug, Default)]
pub struct StageRunner {
    continue_on_fault: bool,
    max_steps: Option<u64>,
}

impl StageRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip steps that fail with a per-frame fault instead of aborting.
    pub fn continue_on_fault(mut self, enabled: bool) -> Self {
        self.continue_on_fault = enabled;
        self
    }

    /// Stop stepping after `max_steps` steps.
    pub fn max_steps(mut self, max_steps: Option<u64>) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn run(&self, stage: &mut dyn PipelineStage) -> Result<RunSummary, StageError> {
        if let Err(e) = stage.open() {
            stage.close();
            return Err(e);
        }

        let result = self.step_until_stop(stage);
        stage.close();
        result
    }

    fn step_until_stop(&self, stage: &mut dyn PipelineStage) -> Result<RunSummary, StageError> {
        let mut summary = RunSummary::default();
        loop {
            if self.max_steps.is_some_and(|max| summary.steps >= max) {
                summary.truncated = true;
                return Ok(summary);
            }
            match stage.process() {
                Ok(StepStatus::Continue) => summary.steps += 1,
                Ok(StepStatus::Stop) => {
                    summary.steps += 1;
                    return Ok(summary);
                }
                Err(e) if self.continue_on_fault && e.is_step_fault() => {
                    log::warn!("Skipping failed step: {e}");
                    summary.steps += 1;
                    summary.faults += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoding::domain::decoder_error::DecoderError;
    use std::collections::VecDeque;

    /// Stage that replays a fixed list of step results.
    struct FakeStage {
        open_fails: bool,
        steps: VecDeque<Result<StepStatus, StageError>>,
        opened: usize,
        processed: usize,
        closed: usize,
    }

    impl FakeStage {
        fn new(steps: Vec<Result<StepStatus, StageError>>) -> Self {
            Self {
                open_fails: false,
                steps: steps.into(),
                opened: 0,
                processed: 0,
                closed: 0,
            }
        }
    }

    impl PipelineStage for FakeStage {
        fn open(&mut self) -> Result<(), StageError> {
            self.opened += 1;
            if self.open_fails {
                return Err(DecoderError::NotOpen.into());
            }
            Ok(())
        }

        fn process(&mut self) -> Result<StepStatus, StageError> {
            self.processed += 1;
            self.steps.pop_front().unwrap_or(Ok(StepStatus::Stop))
        }

        fn close(&mut self) {
            self.closed += 1;
        }
    }

    fn fault() -> Result<StepStatus, StageError> {
        Err(DecoderError::DecodeFault {
            frame: 1,
            source: "corrupt packet".into(),
        }
        .into())
    }

    #[test]
    fn test_runs_until_stop() {
        let mut stage = FakeStage::new(vec![
            Ok(StepStatus::Continue),
            Ok(StepStatus::Continue),
            Ok(StepStatus::Stop),
        ]);
        let summary = StageRunner::new().run(&mut stage).unwrap();
        assert_eq!(
            summary,
            RunSummary {
                steps: 3,
                faults: 0,
                truncated: false
            }
        );
        assert_eq!((stage.opened, stage.processed, stage.closed), (1, 3, 1));
    }

    #[test]
    fn test_open_failure_still_closes() {
        let mut stage = FakeStage::new(vec![]);
        stage.open_fails = true;
        assert!(StageRunner::new().run(&mut stage).is_err());
        assert_eq!((stage.processed, stage.closed), (0, 1));
    }

    #[test]
    fn test_fault_aborts_by_default() {
        let mut stage = FakeStage::new(vec![Ok(StepStatus::Continue), fault()]);
        let err = StageRunner::new().run(&mut stage).unwrap_err();
        assert!(err.is_step_fault());
        assert_eq!(stage.closed, 1);
    }

    #[test]
    fn test_fault_skipped_when_configured() {
        let mut stage = FakeStage::new(vec![fault(), Ok(StepStatus::Continue), fault()]);
        let summary = StageRunner::new()
            .continue_on_fault(true)
            .run(&mut stage)
            .unwrap();
        assert_eq!(summary.faults, 2);
        assert_eq!(summary.steps, 4);
    }

    #[test]
    fn test_fatal_error_not_skipped() {
        let mut stage = FakeStage::new(vec![Err(StageError::OutputClosed("VIDEO"))]);
        assert!(StageRunner::new()
            .continue_on_fault(true)
            .run(&mut stage)
            .is_err());
        assert_eq!(stage.closed, 1);
    }

    #[test]
    fn test_max_steps_truncates() {
        let mut stage = FakeStage::new((0..10).map(|_| Ok(StepStatus::Continue)).collect());
        let summary = StageRunner::new()
            .max_steps(Some(4))
            .run(&mut stage)
            .unwrap();
        assert_eq!(summary.steps, 4);
        assert!(summary.truncated);
        assert_eq!((stage.processed, stage.closed), (4, 1));
    }
}
