//! Frame loop binary for the Steadystep scheduler.
//!
//! Wires the monotonic clock, the fixed-step scheduler, a shared command
//! queue fed by the demo producer, and a console sink into the paced frame
//! loop. The loop runs until interrupted (ctrl-c) or until the optional
//! `runtime.max_frames` bound is reached.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `steadystep-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing, to stderr)
//! 3. Build the command queue and scheduler
//! 4. Create loop control and install the ctrl-c handler
//! 5. Select the presentation sink
//! 6. Run the frame loop
//! 7. Log the result

mod error;
mod output;
mod producer;

use std::path::Path;
use std::sync::Arc;

use steadystep_core::clock::MonotonicClock;
use steadystep_core::config::{CONFIG_FILE_NAME, EngineConfig, OutputFormat};
use steadystep_core::control::LoopControl;
use steadystep_core::intake::SharedCommandQueue;
use steadystep_core::runner::{self, FrameHook, FrameRunner, NoHook};
use steadystep_core::scheduler::Scheduler;
use steadystep_core::sink::PresentationSink;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::output::{JsonLinesSink, TextSink};
use crate::producer::BurstProducer;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid or presenting a frame
/// fails.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging. Frames go to stdout, logs to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("steadystep-engine starting");
    info!(
        max_dt_ms = config.scheduler.max_dt_ms,
        fixed_dt_ms = config.scheduler.fixed_dt_ms,
        max_steps_per_frame = config.scheduler.max_steps_per_frame,
        max_command_queue_size = config.scheduler.max_command_queue_size,
        max_commands_per_step = config.scheduler.max_commands_per_step,
        "Configuration loaded"
    );

    // 3. Build the command queue and scheduler.
    let queue = SharedCommandQueue::new(config.scheduler.max_command_queue_size);
    let scheduler = Scheduler::new(
        config.scheduler.to_scheduler_config(),
        config.initial_state.to_state(),
        queue.clone(),
    )?;
    let mut runner = FrameRunner::new(MonotonicClock::new(), scheduler);
    info!(
        position = config.initial_state.position,
        velocity = config.initial_state.velocity,
        "Scheduler initialized"
    );

    // 4. Create loop control and install the ctrl-c handler.
    let control = Arc::new(LoopControl::new(
        config.runtime.frame_pacing_ms,
        config.runtime.max_frames,
    ));
    spawn_ctrl_c_handler(Arc::clone(&control));

    // 5. Select the presentation sink and the demo producer.
    let mut sink: Box<dyn PresentationSink> = match config.runtime.output {
        OutputFormat::Text => Box::new(TextSink::new(std::io::stdout())),
        OutputFormat::Json => Box::new(JsonLinesSink::new(std::io::stdout())),
    };
    let mut producer = BurstProducer::new(config.demo.burst_size, config.demo.accelerate_value);
    let mut no_hook = NoHook;
    let hook: &mut dyn FrameHook<SharedCommandQueue> = if config.demo.enabled {
        info!(
            burst_size = config.demo.burst_size,
            accelerate_value = config.demo.accelerate_value,
            "Demo producer enabled"
        );
        &mut producer
    } else {
        &mut no_hook
    };

    // 6. Run the frame loop.
    let summary = runner::run_loop(&mut runner, sink.as_mut(), hook, &control).await?;

    // 7. Log results.
    runner::log_loop_end(&summary);
    info!(
        commands_accepted = producer.accepted(),
        commands_rejected = producer.rejected(),
        queue_dropped = queue.dropped(),
        "steadystep-engine shutdown complete"
    );

    Ok(())
}

/// Load configuration from `steadystep-config.yaml` in the working
/// directory, falling back to defaults when the file does not exist.
fn load_config() -> Result<EngineConfig, EngineError> {
    let config_path = Path::new(CONFIG_FILE_NAME);
    if config_path.exists() {
        Ok(EngineConfig::from_file(config_path)?)
    } else {
        Ok(EngineConfig::default())
    }
}

/// Request a loop stop on the first ctrl-c.
fn spawn_ctrl_c_handler(control: Arc<LoopControl>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, stopping frame loop");
                control.request_stop();
            }
            Err(e) => {
                warn!(error = %e, "failed to install ctrl-c handler, loop must be killed externally");
            }
        }
    });
}
