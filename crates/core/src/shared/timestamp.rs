use super::constants::MICROS_PER_MILLI;

/// Position of a packet on an output stream.
///
/// `PreStream` sorts before every `Micros` value and marks stream-level
/// data that precedes the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Timestamp {
    PreStream,
    Micros(i64),
}

impl Timestamp {
    /// Converts a source position in milliseconds to a frame timestamp.
    ///
    /// Non-finite positions have no meaningful place on the timeline and
    /// yield `None`.
    pub fn from_millis(position_ms: f64) -> Option<Self> {
        if !position_ms.is_finite() {
            return None;
        }
        let micros = (position_ms * MICROS_PER_MILLI).round();
        Some(Timestamp::Micros(micros as i64))
    }

    pub fn micros(self) -> Option<i64> {
        match self {
            Timestamp::Micros(us) => Some(us),
            Timestamp::PreStream => None,
        }
    }
}

/// A payload delivered on an output stream at a given timestamp.
#[derive(Clone, Debug, PartialEq)]
pub struct Packet<T> {
    pub timestamp: Timestamp,
    pub payload: T,
}

impl<T> Packet<T> {
    pub fn new(timestamp: Timestamp, payload: T) -> Self {
        Self { timestamp, payload }
    }

    pub fn into_payload(self) -> T {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prestream_sorts_first() {
        assert!(Timestamp::PreStream < Timestamp::Micros(i64::MIN));
        assert!(Timestamp::Micros(-1) < Timestamp::Micros(0));
    }

    #[test]
    fn test_from_millis_scales() {
        assert_eq!(Timestamp::from_millis(33.0), Some(Timestamp::Micros(33_000)));
        assert_eq!(Timestamp::from_millis(0.0), Some(Timestamp::Micros(0)));
        assert_eq!(
            Timestamp::from_millis(33.3333),
            Some(Timestamp::Micros(33_333))
        );
    }

    #[test]
    fn test_from_millis_rejects_non_finite() {
        assert_eq!(Timestamp::from_millis(f64::NAN), None);
        assert_eq!(Timestamp::from_millis(f64::INFINITY), None);
    }

    #[test]
    fn test_micros_accessor() {
        assert_eq!(Timestamp::Micros(7).micros(), Some(7));
        assert_eq!(Timestamp::PreStream.micros(), None);
    }

    #[test]
    fn test_packet_into_payload() {
        let packet = Packet::new(Timestamp::PreStream, 42u32);
        assert_eq!(packet.timestamp, Timestamp::PreStream);
        assert_eq!(packet.into_payload(), 42);
    }
}
