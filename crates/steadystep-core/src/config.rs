//! Configuration loading and typed config structures.
//!
//! The optional configuration file is `steadystep-config.yaml` in the
//! working directory. Every field has a default equal to the scheduler
//! constants, so an absent or empty file yields the canonical setup:
//! 50 ms delta clamp, 10 ms ticks, 5 ticks per frame, a 32-entry command
//! queue drained 4 at a time, and 16 ms frame pacing.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use steadystep_types::SystemState;

use crate::control::{FRAME_PACING_MS, MAX_FRAME_PACING_MS};
use crate::intake::MAX_COMMAND_QUEUE_SIZE;
use crate::scheduler::{MAX_COMMANDS_PER_STEP, MAX_SIMULATION_STEPS_PER_FRAME, SchedulerConfig};

/// Default file name looked up by the engine.
pub const CONFIG_FILE_NAME: &str = "steadystep-config.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The file parsed but a value is out of range.
    #[error("invalid config value: {reason}")]
    Invalid {
        /// Explanation of which value is rejected and why.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EngineConfig {
    /// Accumulator timing and budgets.
    #[serde(default)]
    pub scheduler: SchedulerSection,

    /// State the simulation starts from.
    #[serde(default)]
    pub initial_state: InitialStateConfig,

    /// Frame loop settings.
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Built-in demo command producer.
    #[serde(default)]
    pub demo: DemoConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not an empty map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialize fine but cannot be run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the initial position is negative
    /// or not finite, the initial velocity is not finite, or the frame
    /// pacing exceeds [`MAX_FRAME_PACING_MS`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let position = self.initial_state.position;
        if !position.is_finite() || position < 0.0 {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "initial_state.position must be finite and non-negative, got {position}"
                ),
            });
        }
        let velocity = self.initial_state.velocity;
        if !velocity.is_finite() {
            return Err(ConfigError::Invalid {
                reason: format!("initial_state.velocity must be finite, got {velocity}"),
            });
        }
        if self.runtime.frame_pacing_ms > MAX_FRAME_PACING_MS {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "runtime.frame_pacing_ms must be at most {MAX_FRAME_PACING_MS}, got {}",
                    self.runtime.frame_pacing_ms
                ),
            });
        }
        Ok(())
    }
}

/// Scheduler timing and budget parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SchedulerSection {
    /// Largest frame delta fed to the accumulator, in milliseconds.
    #[serde(default = "default_max_dt_ms")]
    pub max_dt_ms: u64,

    /// Simulation tick length, in milliseconds.
    #[serde(default = "default_fixed_dt_ms")]
    pub fixed_dt_ms: u64,

    /// Hard cap on ticks per frame.
    #[serde(default = "default_max_steps_per_frame")]
    pub max_steps_per_frame: u32,

    /// Capacity of the command queue.
    #[serde(default = "default_max_command_queue_size")]
    pub max_command_queue_size: usize,

    /// Commands drained per tick.
    #[serde(default = "default_max_commands_per_step")]
    pub max_commands_per_step: usize,
}

impl SchedulerSection {
    /// Convert to the scheduler's runtime parameters.
    pub const fn to_scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            max_dt: Duration::from_millis(self.max_dt_ms),
            fixed_dt: Duration::from_millis(self.fixed_dt_ms),
            max_steps_per_frame: self.max_steps_per_frame,
            max_commands_per_step: self.max_commands_per_step,
        }
    }
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            max_dt_ms: default_max_dt_ms(),
            fixed_dt_ms: default_fixed_dt_ms(),
            max_steps_per_frame: default_max_steps_per_frame(),
            max_command_queue_size: default_max_command_queue_size(),
            max_commands_per_step: default_max_commands_per_step(),
        }
    }
}

/// Initial position and velocity. The initial state is always valid, so
/// the position must be finite and non-negative.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InitialStateConfig {
    /// Starting position.
    #[serde(default)]
    pub position: f64,

    /// Starting velocity.
    #[serde(default = "default_initial_velocity")]
    pub velocity: f64,
}

impl InitialStateConfig {
    /// Build the starting [`SystemState`].
    pub const fn to_state(&self) -> SystemState {
        SystemState::new(self.position, self.velocity)
    }
}

impl Default for InitialStateConfig {
    fn default() -> Self {
        Self {
            position: 0.0,
            velocity: default_initial_velocity(),
        }
    }
}

/// How frames are written to standard output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One human-readable line per frame.
    #[default]
    Text,
    /// One JSON object per frame.
    Json,
}

/// Frame loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RuntimeConfig {
    /// Delay after each frame, in milliseconds.
    #[serde(default = "default_frame_pacing_ms")]
    pub frame_pacing_ms: u64,

    /// Stop after this many frames (0 = run until stopped).
    #[serde(default)]
    pub max_frames: u64,

    /// Output format of the presentation sink.
    #[serde(default)]
    pub output: OutputFormat,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            frame_pacing_ms: default_frame_pacing_ms(),
            max_frames: 0,
            output: OutputFormat::Text,
        }
    }
}

/// Demo producer that emits a burst of accelerate commands every frame.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DemoConfig {
    /// Whether the demo producer runs.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Commands enqueued per frame.
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,

    /// Value of each accelerate command.
    #[serde(default = "default_accelerate_value")]
    pub accelerate_value: f64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            burst_size: default_burst_size(),
            accelerate_value: default_accelerate_value(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (required by serde)
// ---------------------------------------------------------------------------

const fn default_max_dt_ms() -> u64 {
    50
}

const fn default_fixed_dt_ms() -> u64 {
    10
}

const fn default_max_steps_per_frame() -> u32 {
    MAX_SIMULATION_STEPS_PER_FRAME
}

const fn default_max_command_queue_size() -> usize {
    MAX_COMMAND_QUEUE_SIZE
}

const fn default_max_commands_per_step() -> usize {
    MAX_COMMANDS_PER_STEP
}

const fn default_initial_velocity() -> f64 {
    1.0
}

const fn default_frame_pacing_ms() -> u64 {
    FRAME_PACING_MS
}

const fn default_burst_size() -> u32 {
    10
}

const fn default_accelerate_value() -> f64 {
    0.1
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{FIXED_DT, MAX_DT};

    #[test]
    fn default_config_matches_constants() {
        let config = EngineConfig::default();
        let scheduler = config.scheduler.to_scheduler_config();
        assert_eq!(scheduler, SchedulerConfig::default());
        assert_eq!(scheduler.max_dt, MAX_DT);
        assert_eq!(scheduler.fixed_dt, FIXED_DT);
        assert_eq!(config.scheduler.max_command_queue_size, 32);
        assert_eq!(config.runtime.frame_pacing_ms, 16);
        assert_eq!(config.runtime.max_frames, 0);
        assert_eq!(config.demo.burst_size, 10);
        assert!(config.initial_state.to_state().valid);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
scheduler:
  max_dt_ms: 100
  fixed_dt_ms: 5
  max_steps_per_frame: 8
  max_command_queue_size: 64
  max_commands_per_step: 2

initial_state:
  position: 3.5
  velocity: -0.25

runtime:
  frame_pacing_ms: 8
  max_frames: 120
  output: json

demo:
  enabled: false
  burst_size: 3
  accelerate_value: 0.5

logging:
  level: "debug"
"#;

        let config = EngineConfig::parse(yaml);
        assert!(config.is_ok(), "parse failed: {config:?}");
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.scheduler.max_dt_ms, 100);
        assert_eq!(config.scheduler.fixed_dt_ms, 5);
        assert_eq!(config.scheduler.max_steps_per_frame, 8);
        assert_eq!(config.scheduler.max_command_queue_size, 64);
        assert_eq!(config.scheduler.max_commands_per_step, 2);
        assert!((config.initial_state.position - 3.5).abs() < f64::EPSILON);
        assert_eq!(config.runtime.max_frames, 120);
        assert_eq!(config.runtime.output, OutputFormat::Json);
        assert!(!config.demo.enabled);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = EngineConfig::parse("runtime:\n  max_frames: 10\n");
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.runtime.max_frames, 10);
        assert_eq!(config.runtime.frame_pacing_ms, 16);
        assert_eq!(config.scheduler, SchedulerSection::default());
    }

    #[test]
    fn parse_empty_yaml() {
        let config = EngineConfig::parse("");
        assert!(config.is_ok());
        assert_eq!(config.ok(), Some(EngineConfig::default()));
    }

    #[test]
    fn rejects_negative_initial_position() {
        let result = EngineConfig::parse("initial_state:\n  position: -3.0\n  velocity: 0.0\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })), "got {result:?}");
    }

    #[test]
    fn rejects_non_finite_initial_state() {
        let result = EngineConfig::parse("initial_state:\n  position: .nan\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })), "got {result:?}");
        let result = EngineConfig::parse("initial_state:\n  velocity: .inf\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })), "got {result:?}");
    }

    #[test]
    fn accepts_initial_position_at_zero() {
        let result = EngineConfig::parse("initial_state:\n  position: 0.0\n  velocity: -1.0\n");
        assert!(result.is_ok(), "got {result:?}");
    }

    #[test]
    fn rejects_frame_pacing_above_limit() {
        let result = EngineConfig::parse("runtime:\n  frame_pacing_ms: 5000\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })), "got {result:?}");
        let result = EngineConfig::parse("runtime:\n  frame_pacing_ms: 1000\n");
        assert!(result.is_ok(), "got {result:?}");
    }

    #[test]
    fn rejects_unknown_output_format() {
        assert!(EngineConfig::parse("runtime:\n  output: xml\n").is_err());
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join(CONFIG_FILE_NAME);
        if path.exists() {
            let config = EngineConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
