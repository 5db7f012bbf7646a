//! Presentation sink: the consumer of interpolated frames.
//!
//! The scheduler does not know how frames are shown. Once per frame the
//! runner hands a [`FrameReport`] to a [`PresentationSink`]; console, GPU,
//! or network presentation all live behind that trait.

use serde::Serialize;
use steadystep_types::SystemState;

/// Errors a sink can report while presenting a frame.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Writing to the underlying stream failed.
    #[error("sink I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Encoding the frame as JSON failed.
    #[error("sink JSON error: {source}")]
    Json {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

/// Everything the presentation layer receives for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameReport {
    /// Frame index, starting at 1 for the first frame.
    pub index: u64,
    /// Monotonic milliseconds since the runner started.
    pub elapsed_ms: i64,
    /// Raw (unclamped) frame delta in milliseconds.
    pub dt_ms: i64,
    /// Ticks executed this frame.
    pub steps: u32,
    /// Whether the step cap discarded owed time this frame.
    pub capped: bool,
    /// Interpolation factor used for `display`.
    pub alpha: f64,
    /// Interpolated state for display.
    pub display: SystemState,
}

/// A consumer of interpolated frames.
pub trait PresentationSink {
    /// Present one frame.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the frame could not be delivered.
    fn consume(&mut self, frame: &FrameReport) -> Result<(), SinkError>;
}

/// A sink that keeps every frame in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    frames: Vec<FrameReport>,
}

impl RecordingSink {
    /// Create an empty recording sink.
    pub const fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// All frames received so far, oldest first.
    pub fn frames(&self) -> &[FrameReport] {
        &self.frames
    }

    /// The most recent frame, if any.
    pub fn last(&self) -> Option<&FrameReport> {
        self.frames.last()
    }
}

impl PresentationSink for RecordingSink {
    fn consume(&mut self, frame: &FrameReport) -> Result<(), SinkError> {
        self.frames.push(*frame);
        Ok(())
    }
}
