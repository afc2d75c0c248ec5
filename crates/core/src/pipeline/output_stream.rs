use crossbeam_channel::Sender;

use crate::shared::timestamp::Packet;

use super::pipeline_stage::StageError;

/// Sending half of a tagged stage output.
///
/// Closing drops the sender so receivers see the end of the stream once
/// buffered packets are drained.
pub struct OutputStream<T> {
    tag: &'static str,
    sender: Option<Sender<Packet<T>>>,
}

impl<T> OutputStream<T> {
    pub fn new(tag: &'static str, sender: Sender<Packet<T>>) -> Self {
        Self {
            tag,
            sender: Some(sender),
        }
    }

    pub fn add(&mut self, packet: Packet<T>) -> Result<(), StageError> {
        let sender = self.sender.as_ref().ok_or(StageError::OutputClosed(self.tag))?;
        sender
            .send(packet)
            .map_err(|_| StageError::OutputClosed(self.tag))
    }

    pub fn close(&mut self) {
        self.sender = None;
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_none()
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }
}
