//! Console presentation sinks.
//!
//! Both sinks write one line per frame and flush immediately, so output
//! interleaves correctly with log lines on a terminal.

use std::io::Write;

use steadystep_core::sink::{FrameReport, PresentationSink, SinkError};

/// Human-readable sink: `t=<ms>ms dt=<ms>ms pos=<p> vel=<v> valid=<bool>`.
#[derive(Debug)]
pub struct TextSink<W> {
    out: W,
}

impl<W: Write> TextSink<W> {
    /// Write frames to `out`.
    pub const fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> PresentationSink for TextSink<W> {
    fn consume(&mut self, frame: &FrameReport) -> Result<(), SinkError> {
        writeln!(
            self.out,
            "t={}ms dt={}ms pos={:.4} vel={:.4} valid={}",
            frame.elapsed_ms,
            frame.dt_ms,
            frame.display.position,
            frame.display.velocity,
            frame.display.valid
        )?;
        self.out.flush()?;
        Ok(())
    }
}

/// Machine-readable sink: one JSON object per line.
#[derive(Debug)]
pub struct JsonLinesSink<W> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    /// Write frames to `out`.
    pub const fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> PresentationSink for JsonLinesSink<W> {
    fn consume(&mut self, frame: &FrameReport) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.out, frame)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use steadystep_types::SystemState;

    use super::*;

    fn frame() -> FrameReport {
        FrameReport {
            index: 4,
            elapsed_ms: 64,
            dt_ms: 16,
            steps: 2,
            capped: false,
            alpha: 0.25,
            display: SystemState::new(0.0625, 1.5),
        }
    }

    #[test]
    fn text_line_format() {
        let mut sink = TextSink::new(Vec::new());
        sink.consume(&frame()).unwrap();
        let line = String::from_utf8(sink.out).unwrap();
        assert_eq!(line, "t=64ms dt=16ms pos=0.0625 vel=1.5000 valid=true\n");
    }

    #[test]
    fn json_line_round_trips_fields() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.consume(&frame()).unwrap();
        sink.consume(&frame()).unwrap();
        let text = String::from_utf8(sink.out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["index"], 4);
        assert_eq!(value["dt_ms"], 16);
        assert_eq!(value["display"]["velocity"], 1.5);
    }
}
