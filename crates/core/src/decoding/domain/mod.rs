pub mod color_conversion;
pub mod decode_session;
pub mod decoder_error;
pub mod emission_state;
pub mod frame_writer;
pub mod raw_frame;
#[cfg(test)]
pub mod scripted_session;
pub mod video_decoder;
