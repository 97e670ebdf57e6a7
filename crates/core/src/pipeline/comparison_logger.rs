use std::collections::HashMap;
use std::time::Instant;

use crate::quality::domain::psnr_report::PsnrReport;

/// Observer for comparison progress and per-frame results.
///
/// Keeps the comparator free of any particular output mechanism; the CLI
/// plugs in a `log`-backed implementation, library callers and tests use
/// [`NullComparisonLogger`].
pub trait ComparisonLogger {
    /// Report frame-level progress. `total` is the reported frame count and
    /// may be 0 when the container doesn't record one.
    fn progress(&mut self, current: usize, total: usize);

    /// Record how long a named stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record the PSNR of one frame pair.
    fn frame_score(&mut self, index: usize, psnr: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-comparison summary for a finished report. Default: no-op.
    fn summary(&self, _report: &PsnrReport) {}
}

pub struct NullComparisonLogger;

impl ComparisonLogger for NullComparisonLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn frame_score(&mut self, _index: usize, _psnr: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// CLI-oriented logger: throttled progress, per-stage timings, and a
/// summary with the PSNR range and throughput.
pub struct StdoutComparisonLogger {
    throttle_frames: usize,
    timings: HashMap<String, Vec<f64>>,
    start_time: Instant,
}

impl StdoutComparisonLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: HashMap::new(),
            start_time: Instant::now(),
        }
    }

    /// Formats the report's PSNR range next to the recorded stage timings.
    pub fn summary_string(&self, report: &PsnrReport) -> String {
        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let frames = report.frames_compared();
        let mut lines = Vec::new();

        lines.push(format!(
            "Comparison summary ({frames} frames, {:.1}s total):",
            elapsed_ms / 1000.0
        ));

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = total_ms / durations.len().max(1) as f64;
            lines.push(format!(
                "  {stage:8}: avg {avg_ms:6.1}ms  total {total_ms:7.0}ms"
            ));
        }

        lines.push(format!(
            "  PSNR range: {:.2} .. {:.2} dB",
            report.min(),
            report.max()
        ));
        let identical = report.identical_frames();
        if identical > 0 {
            lines.push(format!("  Identical frames: {identical}"));
        }

        if elapsed_ms > 0.0 {
            let fps = frames as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {fps:.1} fps"));
        }

        lines.join("\n")
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }
}

impl Default for StdoutComparisonLogger {
    fn default() -> Self {
        Self::new(crate::shared::constants::PROGRESS_THROTTLE_FRAMES)
    }
}

impl ComparisonLogger for StdoutComparisonLogger {
    fn progress(&mut self, current: usize, total: usize) {
        if current % self.throttle_frames != 0 && current != total {
            return;
        }
        if total > 0 {
            let pct = current as f64 / total as f64 * 100.0;
            log::info!("Comparing: {current}/{total} frames ({pct:.1}%)");
        } else {
            log::info!("Comparing: {current} frames");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn frame_score(&mut self, index: usize, psnr: f64) {
        log::debug!("Frame {index}: {psnr:.2} dB");
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self, report: &PsnrReport) {
        log::info!("\n\n{}", self.summary_string(report));
    }
}
