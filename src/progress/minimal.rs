use std::io::Write;

use super::format::percent;
use super::style::Style;

const LABEL: &str = "Hashing contents:";

/// One-line percentage counter for narrow or non-interactive output.
///
/// Only re-renders when the integer percentage goes up, so a fast engine
/// does not flood the output.
#[derive(Debug)]
pub struct MinimalReporter<W: Write> {
    out: W,
    style: Style,
    last_percent: u64,
}

impl<W: Write> MinimalReporter<W> {
    pub fn new(out: W, style: Style) -> Self {
        Self {
            out,
            style,
            last_percent: 0,
        }
    }

    pub fn begin(&mut self) {
        self.last_percent = 0;
        let _ = write!(self.out, "{} {:>3}%", self.style.label(LABEL), 0);
        let _ = self.out.flush();
    }

    pub fn report(&mut self, done: u64, total: u64) {
        let current = percent(done, total);
        if current <= self.last_percent {
            return;
        }
        self.last_percent = current;
        let _ = write!(self.out, "\r{} {:>3}%", self.style.label(LABEL), current);
        let _ = self.out.flush();
    }

    pub fn end(&mut self) {
        let label = self.style.label(LABEL);
        let _ = write!(self.out, "\r{} 100%", label);
        let _ = write!(self.out, "\r{} Done.\n", label);
        let _ = self.out.flush();
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
