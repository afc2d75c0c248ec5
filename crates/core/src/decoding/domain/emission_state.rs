/// Tracks what has been emitted so far and enforces strictly increasing
/// frame timestamps.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmissionState {
    previous_timestamp_us: Option<i64>,
    emitted: u64,
    dropped: u64,
}

impl EmissionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true and records the timestamp if it is strictly greater
    /// than the last admitted one. Otherwise counts a drop.
    pub fn admit(&mut self, timestamp_us: i64) -> bool {
        match self.previous_timestamp_us {
            Some(prev) if timestamp_us <= prev => {
                self.dropped += 1;
                false
            }
            _ => {
                self.previous_timestamp_us = Some(timestamp_us);
                self.emitted += 1;
                true
            }
        }
    }

    /// Counts a frame discarded for a reason other than ordering.
    pub fn reject(&mut self) {
        self.dropped += 1;
    }

    pub fn previous_timestamp_us(&self) -> Option<i64> {
        self.previous_timestamp_us
    }

    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
