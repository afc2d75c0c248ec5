pub mod infrastructure;
pub mod output_stream;
pub mod pipeline_stage;
pub mod stage_registry;
pub mod stage_runner;
pub mod video_decoder_stage;
