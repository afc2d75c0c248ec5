//! In-memory decode sessions with scripted frames, positions and faults.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::shared::video_metadata::ContainerMetadata;

use super::decode_session::{DecodeSession, SessionError, SessionOpener};
use super::raw_frame::{ChannelOrder, RawFrame};

enum Step {
    Frame { raw: RawFrame, position_ms: f64 },
    Fault(String),
}

/// Calls observed on a scripted session, shared with the test.
#[derive(Debug, Default)]
pub struct SessionCalls {
    pub reads: usize,
    pub rewinds: usize,
    pub releases: usize,
}

pub struct ScriptedSession {
    container: ContainerMetadata,
    script: Arc<Vec<Step>>,
    pending: VecDeque<usize>,
    position_ms: f64,
    open: bool,
    rewind_fails: bool,
    calls: Arc<Mutex<SessionCalls>>,
}

impl ScriptedSession {
    pub fn new(width: i64, height: i64, frame_rate: f64, frame_count: i64) -> Self {
        Self {
            container: ContainerMetadata {
                width,
                height,
                frame_rate,
                frame_count,
            },
            script: Arc::new(Vec::new()),
            pending: VecDeque::new(),
            position_ms: 0.0,
            open: true,
            rewind_fails: false,
            calls: Arc::new(Mutex::new(SessionCalls::default())),
        }
    }

    pub fn with_frame(mut self, raw: RawFrame, position_ms: f64) -> Self {
        self.push(Step::Frame { raw, position_ms });
        self
    }

    pub fn with_fault(mut self, message: &str) -> Self {
        self.push(Step::Fault(message.to_string()));
        self
    }

    pub fn with_rewind_failure(mut self) -> Self {
        self.rewind_fails = true;
        self
    }

    pub fn calls(&self) -> Arc<Mutex<SessionCalls>> {
        Arc::clone(&self.calls)
    }

    fn push(&mut self, step: Step) {
        let script = Arc::get_mut(&mut self.script).expect("script is built before sharing");
        script.push(step);
        self.pending.push_back(script.len() - 1);
    }

    fn fresh(&self) -> Self {
        Self {
            container: self.container.clone(),
            script: Arc::clone(&self.script),
            pending: (0..self.script.len()).collect(),
            position_ms: 0.0,
            open: true,
            rewind_fails: self.rewind_fails,
            calls: Arc::clone(&self.calls),
        }
    }
}

impl DecodeSession for ScriptedSession {
    fn container_metadata(&self) -> ContainerMetadata {
        self.container.clone()
    }

    fn read(&mut self) -> Result<Option<RawFrame>, SessionError> {
        assert!(self.open, "read on a released session");
        self.calls.lock().unwrap().reads += 1;
        let Some(index) = self.pending.pop_front() else {
            return Ok(None);
        };
        match &self.script[index] {
            Step::Frame { raw, position_ms } => {
                self.position_ms = *position_ms;
                Ok(Some(raw.clone()))
            }
            Step::Fault(message) => Err(message.clone().into()),
        }
    }

    fn position_ms(&self) -> f64 {
        self.position_ms
    }

    fn rewind(&mut self) -> Result<(), SessionError> {
        self.calls.lock().unwrap().rewinds += 1;
        if self.rewind_fails {
            return Err("seek not supported".into());
        }
        self.pending = (0..self.script.len()).collect();
        self.position_ms = 0.0;
        Ok(())
    }

    fn release(&mut self) {
        if self.open {
            self.calls.lock().unwrap().releases += 1;
        }
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

/// Hands out fresh copies of a scripted session, or fails every open.
pub struct ScriptedOpener {
    template: Option<ScriptedSession>,
}

impl ScriptedOpener {
    pub fn new(session: ScriptedSession) -> Self {
        Self {
            template: Some(session),
        }
    }

    pub fn failing() -> Self {
        Self { template: None }
    }
}

impl SessionOpener for ScriptedOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn DecodeSession>, SessionError> {
        match &self.template {
            Some(session) => Ok(Box::new(session.fresh())),
            None => Err(format!("No such file or directory: {}", path.display()).into()),
        }
    }
}

/// A BGR frame whose pixels are all `[value, value + 1, value + 2]`.
pub fn bgr_frame(width: u32, height: u32, value: u8) -> RawFrame {
    let pixel = [value, value.wrapping_add(1), value.wrapping_add(2)];
    RawFrame {
        data: pixel.repeat((width * height) as usize),
        width,
        height,
        channels: 3,
        order: ChannelOrder::Bgr,
    }
}

pub fn frame_with_channels(width: u32, height: u32, channels: u8, value: u8) -> RawFrame {
    RawFrame {
        data: vec![value; (width * height * channels as u32) as usize],
        width,
        height,
        channels,
        order: ChannelOrder::Bgr,
    }
}
