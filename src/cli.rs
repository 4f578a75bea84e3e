// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Processing still images
//! - Streaming a synthetic camera through the preview pipeline
//! - Benchmarking the transforms
//! - Inspecting the configuration

use edgeviewer::config::Config;
use edgeviewer::constants::frame_interval;
use edgeviewer::pipeline::{
    FrameLoop, LatestFrame, LoopAction, LoopController, ModeSwitch, RawFrame, SharedSink,
    TestPattern, TextureSink,
};
use edgeviewer::processing::{EdgeOperator, FrameProcessor, ProcessingSettings, Transform};
use edgeviewer::storage::{load_frame_async, output_path, save_frame_async, save_snapshot};
use edgeviewer::{AppError, Mode};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Load the config and apply a command-line operator override
fn settings_with(config: &Config, operator: Option<EdgeOperator>) -> ProcessingSettings {
    let mut settings = config.processing_settings();
    if let Some(operator) = operator {
        settings.edge.operator = operator;
    }
    settings
}

/// Process every input image concurrently and write PNG results
pub fn process_images(
    inputs: Vec<PathBuf>,
    mode: Mode,
    operator: Option<EdgeOperator>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(transform) = mode.transform() else {
        return Err("Normal mode leaves frames untouched; choose gray or edge".into());
    };

    let config = Config::load()?;
    let output_dir = output.unwrap_or_else(|| config.output_dir());

    // Inputs differ in size, so pooling would only churn
    let processor = Arc::new(FrameProcessor::new(ProcessingSettings {
        pool_capacity: None,
        ..settings_with(&config, operator)
    }));

    println!(
        "Processing {} image(s) in {} mode ({})",
        inputs.len(),
        mode,
        processor.edge_settings().operator
    );

    let runtime = tokio::runtime::Runtime::new()?;
    let results = runtime.block_on(futures::future::join_all(inputs.into_iter().map(|input| {
        let processor = Arc::clone(&processor);
        let destination = output_path(&output_dir, &input, mode);
        async move {
            let outcome = process_one(processor, transform, input.clone(), destination).await;
            (input, outcome)
        }
    })));

    let mut failures = 0;
    for (input, outcome) in results {
        match outcome {
            Ok(saved) => println!("  {} -> {}", input.display(), saved.display()),
            Err(e) => {
                failures += 1;
                println!("  {} failed: {}", input.display(), e);
            }
        }
    }

    if failures > 0 {
        return Err(format!("{} image(s) failed", failures).into());
    }
    Ok(())
}

async fn process_one(
    processor: Arc<FrameProcessor>,
    transform: Transform,
    input: PathBuf,
    destination: PathBuf,
) -> Result<PathBuf, AppError> {
    let frame = load_frame_async(input).await?;
    let processed = tokio::task::spawn_blocking(move || processor.process(&frame, transform))
        .await
        .map_err(|e| AppError::Other(format!("Processing task error: {}", e)))?;
    save_frame_async(processed, destination).await
}

/// Options for [`stream`]
pub struct StreamOptions {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub duration: u64,
    pub mode: Option<Mode>,
    pub cycle_every: Option<u64>,
    pub operator: Option<EdgeOperator>,
    /// Save the last presented frame when the stream ends
    pub snapshot: bool,
}

/// Drive the synthetic camera through the preview pipeline
pub fn stream(options: StreamOptions) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let processor = Arc::new(FrameProcessor::new(settings_with(&config, options.operator)));
    let mode = ModeSwitch::new(options.mode.unwrap_or(config.default_mode));
    let slot = Arc::new(LatestFrame::new());
    let sink = SharedSink::new(TextureSink::new());

    println!(
        "Streaming {}x{} @ {} fps for {}s ({})",
        options.width,
        options.height,
        options.fps,
        options.duration,
        mode.get().label()
    );
    println!("Press Ctrl+C to stop early");

    let mut frame_loop = FrameLoop::spawn(
        "frame-loop",
        Arc::clone(&slot),
        Arc::clone(&processor),
        mode.clone(),
        config.frame_budget(),
        sink.clone(),
    );

    let pattern = TestPattern::new(options.width, options.height);
    let interval = frame_interval(options.fps);
    let producer_slot = Arc::clone(&slot);
    let mut frame_index = 0u64;
    let mut next_deadline = Instant::now();
    let mut producer = LoopController::start("test-pattern", move || {
        let frame = match pattern.frame(frame_index) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "Test pattern cannot produce frames");
                return LoopAction::Stop;
            }
        };
        if !producer_slot.publish(RawFrame::from(frame)) {
            return LoopAction::Stop;
        }
        frame_index += 1;

        next_deadline += interval;
        let now = Instant::now();
        if next_deadline > now {
            std::thread::sleep(next_deadline - now);
        } else {
            // Fell behind; don't try to catch up with a burst
            next_deadline = now;
        }
        LoopAction::Continue
    });

    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_clone = Arc::clone(&stop_flag);
    ctrlc::set_handler(move || {
        stop_flag_clone.store(true, Ordering::SeqCst);
    })?;

    let start = Instant::now();
    let target_duration = Duration::from_secs(options.duration);
    let cycle_every = options.cycle_every.filter(|s| *s > 0).map(Duration::from_secs);
    let mut last_cycle = Instant::now();

    while start.elapsed() < target_duration {
        if stop_flag.load(Ordering::SeqCst) {
            println!();
            println!("Stopping early...");
            break;
        }

        if let Some(every) = cycle_every {
            if last_cycle.elapsed() >= every {
                let next = mode.cycle();
                last_cycle = Instant::now();
                info!(mode = %next, "Mode toggled");
                println!();
                println!("{}", next.label());
            }
        }

        let stats = frame_loop.stats();
        print!(
            "\r{:>5.1}s  presented {:>6}  dropped {:>5}  mean {:>6.2} ms",
            start.elapsed().as_secs_f64(),
            stats.presented(),
            slot.dropped(),
            stats.mean_processing_time().as_secs_f64() * 1000.0
        );
        std::io::Write::flush(&mut std::io::stdout())?;

        std::thread::sleep(Duration::from_millis(100));
    }
    println!();

    producer.stop();
    slot.close();
    frame_loop.join();

    let stats = frame_loop.stats();
    println!();
    println!("Frames published:   {}", slot.published());
    println!("Frames dropped:     {}", slot.dropped());
    println!("Frames processed:   {}", stats.processed);
    println!("Frames passed:      {}", stats.passthrough);
    println!("Frames rejected:    {}", stats.rejected);
    println!(
        "Over budget:        {} (budget {} ms)",
        stats.over_budget, config.frame_budget_ms
    );
    println!(
        "Mean process time:  {:.2} ms",
        stats.mean_processing_time().as_secs_f64() * 1000.0
    );
    if let Some((uploads, reallocations)) =
        sink.with(|texture| (texture.uploads(), texture.reallocations()))
    {
        println!("Texture uploads:    {} ({} reallocations)", uploads, reallocations);
    }
    if let Some(pool) = processor.pool_stats() {
        println!(
            "Buffer pool:        {} allocated, {} reused",
            pool.allocations, pool.reuses
        );
    }

    if options.snapshot {
        match sink.with(TextureSink::snapshot).flatten() {
            Some(frame) => {
                let saved = save_snapshot(&frame, &config.output_dir(), mode.get())?;
                println!("Snapshot:           {}", saved.display());
            }
            None => println!("Snapshot:           no frame was presented"),
        }
    }

    Ok(())
}

/// Time each transform on a synthetic frame
pub fn bench(
    width: u32,
    height: u32,
    iterations: u32,
    operator: Option<EdgeOperator>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let processor = FrameProcessor::new(settings_with(&config, operator));
    let frame = TestPattern::new(width, height).frame(0)?;
    let iterations = iterations.max(1);
    let budget = config.frame_budget();

    println!(
        "Benchmarking {}x{}, {} iterations, budget {} ms",
        width, height, iterations, config.frame_budget_ms
    );

    for transform in [Transform::Gray, Transform::Edge] {
        // Warm the pool
        processor.recycle(processor.process(&frame, transform));

        let mut total = Duration::ZERO;
        let mut worst = Duration::ZERO;
        for _ in 0..iterations {
            let started = Instant::now();
            let output = processor.process(&frame, transform);
            let elapsed = started.elapsed();
            processor.recycle(output);

            total += elapsed;
            worst = worst.max(elapsed);
        }

        let mean = total / iterations;
        let label = match transform {
            Transform::Gray => "gray".to_string(),
            Transform::Edge => format!("edge ({})", processor.edge_settings().operator),
        };
        println!(
            "  {:<14} mean {:>7.2} ms  worst {:>7.2} ms  {}",
            label,
            mean.as_secs_f64() * 1000.0,
            worst.as_secs_f64() * 1000.0,
            if mean <= budget { "within budget" } else { "OVER BUDGET" }
        );
    }

    Ok(())
}

/// Print the effective configuration or its location
pub fn show_config(path_only: bool, init: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = Config::default_path();

    if init {
        match &path {
            Some(p) if p.exists() => println!("Config already exists: {}", p.display()),
            Some(_) => println!("Wrote {}", Config::default().save()?.display()),
            None => return Err("No config directory available".into()),
        }
        return Ok(());
    }

    if path_only {
        match path {
            Some(p) => println!("{}", p.display()),
            None => println!("(no config directory)"),
        }
        return Ok(());
    }

    println!("{}", Config::load()?.to_json()?);
    Ok(())
}
