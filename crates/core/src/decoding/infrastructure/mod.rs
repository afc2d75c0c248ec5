pub mod ffmpeg_session;
pub mod image_frame_writer;
