//! Terminal progress reporting for long-running hash jobs.
//!
//! A [`Reporter`] is driven through three calls: [`begin`](Reporter::begin)
//! once, [`report`](Reporter::report) for every progress update, and
//! [`end`](Reporter::end) once the job has succeeded. Two variants exist:
//!
//! - [`MinimalReporter`] prints `Hashing contents:  42%`, re-rendering only
//!   when the integer percentage increases. Used for narrow terminals and
//!   redirected output.
//! - [`RichReporter`] prints bytes done, a smoothed speed, elapsed time and a
//!   bar sized to the current terminal width.
//!
//! Rendering is best-effort: write errors are ignored and never affect the
//! job being reported on.
//!
//! # Examples
//!
//! ```
//! use torkit::progress::{Reporter, Style, Width};
//!
//! let mut reporter = Reporter::rich(Vec::new(), Style::plain(), Width::Fixed(60));
//! reporter.begin();
//! reporter.report(512, 1024);
//! reporter.end();
//!
//! let output = String::from_utf8(reporter.into_inner()).unwrap();
//! assert!(output.ends_with("] 100%\n"));
//! ```

mod format;
mod minimal;
mod rich;
mod sampler;
mod style;
mod terminal;

use std::io::{self, Stdout, Write};

pub use format::{format_bytes, format_clock, percent};
pub use minimal::MinimalReporter;
pub use rich::RichReporter;
pub use sampler::Sampler;
pub use style::Style;
pub use terminal::{terminal_width, Width, DEFAULT_WIDTH, MIN_RICH_WIDTH};

/// A progress reporter, chosen once per build.
#[derive(Debug)]
pub enum Reporter<W: Write> {
    Minimal(MinimalReporter<W>),
    Rich(RichReporter<W>),
}

impl<W: Write> Reporter<W> {
    pub fn minimal(out: W, style: Style) -> Self {
        Reporter::Minimal(MinimalReporter::new(out, style))
    }

    pub fn rich(out: W, style: Style, width: Width) -> Self {
        Reporter::Rich(RichReporter::new(out, style, width))
    }

    /// Picks the variant for a terminal `columns` wide. `None` means the
    /// output is not a terminal. The rich variant re-queries the width on
    /// every render.
    pub fn select(out: W, style: Style, columns: Option<usize>) -> Self {
        match columns {
            Some(columns) if columns >= MIN_RICH_WIDTH => Self::rich(out, style, Width::Terminal),
            _ => Self::minimal(out, style),
        }
    }

    pub fn begin(&mut self) {
        match self {
            Reporter::Minimal(r) => r.begin(),
            Reporter::Rich(r) => r.begin(),
        }
    }

    pub fn report(&mut self, done: u64, total: u64) {
        match self {
            Reporter::Minimal(r) => r.report(done, total),
            Reporter::Rich(r) => r.report(done, total),
        }
    }

    pub fn end(&mut self) {
        match self {
            Reporter::Minimal(r) => r.end(),
            Reporter::Rich(r) => r.end(),
        }
    }

    pub fn is_rich(&self) -> bool {
        matches!(self, Reporter::Rich(_))
    }

    pub fn get_ref(&self) -> &W {
        match self {
            Reporter::Minimal(r) => r.get_ref(),
            Reporter::Rich(r) => r.get_ref(),
        }
    }

    pub fn into_inner(self) -> W {
        match self {
            Reporter::Minimal(r) => r.into_inner(),
            Reporter::Rich(r) => r.into_inner(),
        }
    }
}

impl Reporter<Stdout> {
    /// Reporter on stdout, sized for the attached terminal.
    pub fn stdout(style: Style) -> Self {
        Self::select(io::stdout(), style, terminal_width())
    }
}
