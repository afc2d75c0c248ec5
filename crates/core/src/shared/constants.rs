/// Registry name of the ffmpeg-backed video decoder stage.
pub const VIDEO_DECODER_STAGE: &str = "VideoDecoder";

/// Tag of the required frame output stream.
pub const VIDEO_TAG: &str = "VIDEO";

/// Tag of the optional stream-header output stream.
pub const VIDEO_PRESTREAM_TAG: &str = "VIDEO_PRESTREAM";

/// Source positions are reported in milliseconds; frames carry microseconds.
pub const MICROS_PER_MILLI: f64 = 1000.0;
