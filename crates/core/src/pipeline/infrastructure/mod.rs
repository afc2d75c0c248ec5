pub mod threaded_stage_host;
