use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use serde::Serialize;

use video_decoder_core::decoding::domain::frame_writer::FrameWriter;
use video_decoder_core::decoding::infrastructure::image_frame_writer::ImageFrameWriter;
use video_decoder_core::pipeline::infrastructure::threaded_stage_host::ThreadedStageHost;
use video_decoder_core::pipeline::stage_registry::StageRegistry;
use video_decoder_core::pipeline::stage_runner::{RunSummary, StageRunner};
use video_decoder_core::shared::constants::VIDEO_DECODER_STAGE;
use video_decoder_core::shared::frame::DecodedFrame;
use video_decoder_core::shared::stream_header::StreamHeader;
use video_decoder_core::shared::timestamp::Packet;

/// Decode a video file into timestamped frames.
#[derive(Parser)]
#[command(name = "video-decode")]
struct Cli {
    /// Input video file.
    input: PathBuf,

    /// Registered stage to run.
    #[arg(long, default_value = VIDEO_DECODER_STAGE)]
    stage: String,

    /// Do not request the pre-stream header.
    #[arg(long)]
    no_header: bool,

    /// Write every emitted frame as a PNG into this directory.
    #[arg(long)]
    dump_dir: Option<PathBuf>,

    /// Stop after this many processing steps.
    #[arg(long)]
    max_steps: Option<u64>,

    /// Skip frames that fail to decode instead of aborting.
    #[arg(long)]
    continue_on_fault: bool,

    /// Print one JSON object per line instead of plain text.
    #[arg(long)]
    json: bool,

    /// List registered stages and exit.
    #[arg(long)]
    list_stages: bool,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Record<'a> {
    Header {
        pixel_format: &'a str,
        width: u32,
        height: u32,
        frame_rate: f64,
        duration_sec: f64,
    },
    Frame {
        index: u64,
        timestamp_us: i64,
        pixel_format: &'a str,
        width: u32,
        height: u32,
        bytes: usize,
    },
    Summary {
        frames: u64,
        steps: u64,
        faults: u64,
        truncated: bool,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let registry = StageRegistry::with_defaults();

    if cli.list_stages {
        for name in registry.names() {
            println!("{name}");
        }
        return Ok(());
    }

    let runner = StageRunner::new()
        .continue_on_fault(cli.continue_on_fault)
        .max_steps(cli.max_steps);
    let host = ThreadedStageHost::new(runner);
    let handle = host.spawn(&registry, &cli.stage, cli.input.clone(), !cli.no_header)?;

    if let Some(header_rx) = handle.header.as_ref() {
        // Disconnects without a packet when open fails; the error comes
        // from `join` below.
        if let Ok(packet) = header_rx.recv() {
            print_header(&packet.payload, cli.json)?;
        }
    }

    let writer = ImageFrameWriter::new();
    let mut frames = 0u64;
    for packet in handle.video.iter() {
        if let Some(dir) = cli.dump_dir.as_deref() {
            dump_frame(&writer, dir, frames, &packet.payload)
                .map_err(|e| e as Box<dyn std::error::Error>)?;
        }
        print_frame(frames, &packet, cli.json)?;
        frames += 1;
    }

    let summary = handle.join()?;
    print_summary(frames, &summary, cli.json)?;
    log::info!("Decoded {frames} frames from {}", cli.input.display());
    Ok(())
}

fn print_header(header: &StreamHeader, json: bool) -> Result<(), serde_json::Error> {
    if json {
        let record = Record::Header {
            pixel_format: header.pixel_format.name(),
            width: header.width,
            height: header.height,
            frame_rate: header.frame_rate,
            duration_sec: header.duration_sec,
        };
        println!("{}", serde_json::to_string(&record)?);
    } else {
        println!(
            "header: {} {}x{} @ {:.3} fps, {:.3}s",
            header.pixel_format, header.width, header.height, header.frame_rate, header.duration_sec
        );
    }
    Ok(())
}

fn print_frame(index: u64, packet: &Packet<DecodedFrame>, json: bool) -> Result<(), serde_json::Error> {
    let frame = &packet.payload;
    if json {
        let record = Record::Frame {
            index,
            timestamp_us: frame.timestamp_us(),
            pixel_format: frame.format().name(),
            width: frame.width(),
            height: frame.height(),
            bytes: frame.data().len(),
        };
        println!("{}", serde_json::to_string(&record)?);
    } else {
        println!(
            "frame {index}: t={}us {} {}x{}",
            frame.timestamp_us(),
            frame.format(),
            frame.width(),
            frame.height()
        );
    }
    Ok(())
}

fn print_summary(frames: u64, summary: &RunSummary, json: bool) -> Result<(), serde_json::Error> {
    if json {
        let record = Record::Summary {
            frames,
            steps: summary.steps,
            faults: summary.faults,
            truncated: summary.truncated,
        };
        println!("{}", serde_json::to_string(&record)?);
    } else {
        println!(
            "{frames} frames in {} steps ({} faults{})",
            summary.steps,
            summary.faults,
            if summary.truncated { ", truncated" } else { "" }
        );
    }
    Ok(())
}

fn dump_frame(
    writer: &dyn FrameWriter,
    dir: &Path,
    index: u64,
    frame: &DecodedFrame,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let path = dir.join(format!("frame_{index:06}_{}us.png", frame.timestamp_us()));
    writer.write(&path, frame)
}
