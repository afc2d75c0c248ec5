pub mod constants;
pub mod frame;
pub mod pixel_format;
pub mod stream_header;
pub mod timestamp;
pub mod video_metadata;
