// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use edgeviewer::Mode;
use edgeviewer::constants::pipeline;
use edgeviewer::processing::EdgeOperator;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "edgeviewer")]
#[command(about = "Grayscale and edge-detection processing for camera frames")]
#[command(version = env!("GIT_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process still images and write the results as PNG
    Process {
        /// Images to process
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Transform to apply (gray or edge)
        #[arg(short, long, default_value = "edge")]
        mode: Mode,

        /// Edge operator (sobel or canny), overrides the config
        #[arg(long)]
        operator: Option<EdgeOperator>,

        /// Output directory (default: ~/Pictures/edgeviewer)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run the preview pipeline against a synthetic camera
    Stream {
        /// Frame width
        #[arg(long, default_value_t = pipeline::DEFAULT_WIDTH)]
        width: u32,

        /// Frame height
        #[arg(long, default_value_t = pipeline::DEFAULT_HEIGHT)]
        height: u32,

        /// Frames delivered per second
        #[arg(long, default_value_t = pipeline::DEFAULT_FPS)]
        fps: u32,

        /// Run time in seconds
        #[arg(short, long, default_value = "10")]
        duration: u64,

        /// Starting mode (default: from config)
        #[arg(short, long)]
        mode: Option<Mode>,

        /// Press the mode toggle every N seconds
        #[arg(long)]
        cycle_every: Option<u64>,

        /// Edge operator (sobel or canny), overrides the config
        #[arg(long)]
        operator: Option<EdgeOperator>,

        /// Save the last presented frame to the output directory
        #[arg(long)]
        snapshot: bool,
    },

    /// Time both transforms against the frame budget
    Bench {
        /// Frame width
        #[arg(long, default_value = "1280")]
        width: u32,

        /// Frame height
        #[arg(long, default_value = "720")]
        height: u32,

        /// Timed iterations per transform
        #[arg(short, long, default_value = "50")]
        iterations: u32,

        /// Edge operator (sobel or canny), overrides the config
        #[arg(long)]
        operator: Option<EdgeOperator>,
    },

    /// Show the effective configuration
    Config {
        /// Print only the config file location
        #[arg(long)]
        path: bool,

        /// Write the defaults if no config file exists yet
        #[arg(long)]
        init: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=edgeviewer=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            inputs,
            mode,
            operator,
            output,
        } => cli::process_images(inputs, mode, operator, output),
        Commands::Stream {
            width,
            height,
            fps,
            duration,
            mode,
            cycle_every,
            operator,
            snapshot,
        } => cli::stream(cli::StreamOptions {
            width,
            height,
            fps,
            duration,
            mode,
            cycle_every,
            operator,
            snapshot,
        }),
        Commands::Bench {
            width,
            height,
            iterations,
            operator,
        } => cli::bench(width, height, iterations, operator),
        Commands::Config { path, init } => cli::show_config(path, init),
    }
}
