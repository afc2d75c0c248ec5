//! Streaming video-file decoding stage.
//!
//! Opens a video file, probes its pixel format from a decoded frame, and
//! produces timestamped frames in a canonical grayscale/RGB/RGBA layout
//! with strictly increasing timestamps.

pub mod decoding;
pub mod pipeline;
pub mod shared;
