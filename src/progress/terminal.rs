use console::Term;

/// Width assumed when the terminal cannot be queried mid-build.
pub const DEFAULT_WIDTH: usize = 80;

/// Narrowest terminal that gets the full progress bar.
pub const MIN_RICH_WIDTH: usize = 40;

/// Columns of the terminal attached to stdout, or `None` when stdout is not
/// a terminal.
pub fn terminal_width() -> Option<usize> {
    Term::stdout()
        .size_checked()
        .map(|(_rows, cols)| cols as usize)
        .filter(|&cols| cols > 0)
}

/// Where a renderer gets its line width from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// Query stdout on every render so resizes are picked up.
    Terminal,
    /// A fixed number of columns.
    Fixed(usize),
}

impl Width {
    pub fn columns(self) -> usize {
        match self {
            Width::Terminal => terminal_width().unwrap_or(DEFAULT_WIDTH),
            Width::Fixed(columns) => columns,
        }
    }
}
