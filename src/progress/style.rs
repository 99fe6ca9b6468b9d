use console::StyledObject;

/// Colors used when rendering progress and errors.
///
/// Passed explicitly to every renderer; there is no global color switch.
/// [`Style::plain`] emits no escape sequences at all, whatever the terminal.
#[derive(Debug, Clone)]
pub struct Style {
    label: console::Style,
    bar: console::Style,
    percent: console::Style,
    error: console::Style,
}

impl Style {
    /// ANSI colors, regardless of whether stdout is a terminal.
    pub fn colored() -> Self {
        Self {
            label: console::Style::new().green().bold().force_styling(true),
            bar: console::Style::new().cyan().force_styling(true),
            percent: console::Style::new().white().bold().force_styling(true),
            error: console::Style::new().red().bold().force_styling(true),
        }
    }

    /// No colors.
    pub fn plain() -> Self {
        let plain = console::Style::new().force_styling(false);
        Self {
            label: plain.clone(),
            bar: plain.clone(),
            percent: plain.clone(),
            error: plain,
        }
    }

    /// Colored when `console` detects color support on stdout and the user
    /// did not opt out.
    pub fn detect(no_colors: bool) -> Self {
        if no_colors || !console::colors_enabled() {
            Self::plain()
        } else {
            Self::colored()
        }
    }

    pub fn label<D>(&self, text: D) -> StyledObject<D> {
        self.label.apply_to(text)
    }

    pub fn bar<D>(&self, text: D) -> StyledObject<D> {
        self.bar.apply_to(text)
    }

    pub fn percent<D>(&self, text: D) -> StyledObject<D> {
        self.percent.apply_to(text)
    }

    pub fn error<D>(&self, text: D) -> StyledObject<D> {
        self.error.apply_to(text)
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::plain()
    }
}
