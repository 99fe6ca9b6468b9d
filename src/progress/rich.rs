use std::fmt::Write as _;
use std::io::Write;
use std::time::{Duration, Instant};

use super::format::{filled, format_bytes, format_clock, percent};
use super::sampler::Sampler;
use super::style::Style;
use super::terminal::Width;

/// Samples kept for the smoothed speed.
const SPEED_WINDOW: usize = 5;

// Columns taken by everything but the bar:
// ' ' (1) + "1000 KiB" (7) + ' ' (1) + "1000 KiB" (7) + "/s " (3)
// + "00:00:00 " (9) + "[" (1) + "] " (2) + "100%" (4)
const RESERVED_COLUMNS: usize = 35;

#[derive(Debug, Clone, Copy)]
enum Bar {
    Progress { done: u64, total: u64 },
    Complete,
}

/// Full-width progress line:
///
/// ```text
///  1000 KiB  1000 MiB/s 00:00:00 [#################------------------]  51%
/// ```
///
/// The line is overwritten in place with a carriage return on every report
/// and terminated with a newline by [`end`](Self::end).
#[derive(Debug)]
pub struct RichReporter<W: Write> {
    out: W,
    style: Style,
    width: Width,
    sampler: Sampler,
    start_time: Instant,
    last_time: Instant,
    last_done: u64,
    total: u64,
}

impl<W: Write> RichReporter<W> {
    pub fn new(out: W, style: Style, width: Width) -> Self {
        let now = Instant::now();
        Self {
            out,
            style,
            width,
            sampler: Sampler::new(SPEED_WINDOW),
            start_time: now,
            last_time: now,
            last_done: 0,
            total: 0,
        }
    }

    pub fn begin(&mut self) {
        self.sampler.clear();
        self.last_time = Instant::now();
        self.start_time = self.last_time;
        self.last_done = 0;
    }

    pub fn report(&mut self, done: u64, total: u64) {
        self.total = total;

        let now = Instant::now();
        let delta_time = now.duration_since(self.last_time);
        self.last_time = now;

        // Out-of-order updates render as given but do not feed the speed.
        let secs = delta_time.as_secs_f64();
        if done >= self.last_done && secs > 0.0 {
            let speed = (done - self.last_done) as f64 / secs;
            self.sampler.add_sample(speed as i64);
        }
        self.last_done = done;

        let elapsed = now.duration_since(self.start_time);
        let line = self.render(done, elapsed, Bar::Progress { done, total });
        let _ = write!(self.out, "{}\r", line);
        let _ = self.out.flush();
    }

    /// Renders the summary from the last total seen, independent of whether
    /// a final report arrived.
    pub fn end(&mut self) {
        let elapsed = self.start_time.elapsed();
        let line = self.render(self.total, elapsed, Bar::Complete);
        let _ = writeln!(self.out, "{}", line);
        let _ = self.out.flush();
    }

    /// Smoothed bytes per second, never negative.
    pub fn speed(&self) -> u64 {
        self.sampler.average().max(0) as u64
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&self, bytes: u64, elapsed: Duration, bar: Bar) -> String {
        let bar_width = self.width.columns().saturating_sub(RESERVED_COLUMNS);

        let mut line = String::with_capacity(RESERVED_COLUMNS + bar_width + 16);
        let _ = write!(
            line,
            " {:>7} {:>7}/s {} [",
            format_bytes(bytes),
            format_bytes(self.speed()),
            format_clock(elapsed),
        );

        let current = match bar {
            Bar::Progress { done, total } => {
                let cells = filled(done, total, bar_width);
                let _ = write!(
                    line,
                    "{}{}",
                    self.style.bar("#".repeat(cells)),
                    "-".repeat(bar_width - cells)
                );
                percent(done, total)
            }
            Bar::Complete => {
                let _ = write!(line, "{}", self.style.bar("=".repeat(bar_width)));
                100
            }
        };

        let _ = write!(line, "] {}", self.style.percent(format!("{:>3}%", current)));
        line
    }
}
