use crate::medication::ExtravasationRisk;
use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Terminal styles: general message styles plus the clinical badges
#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub error: Style,
    pub warn: Style,
    pub info: Style,
    pub dim: Style,
    pub muted: Style,
    pub vesicant: Style,
    pub irritant: Style,
    pub non_vesicant: Style,
    pub strong_evidence: Style,
    pub free: Style,
    pub locked: Style,
}

impl Theme {
    /// Colors only on a terminal, and never when `NO_COLOR` is set
    pub fn detect() -> Self {
        if std::env::var_os("NO_COLOR").is_some() || !console::Term::stdout().is_term() {
            return Self::plain();
        }
        Self::colored()
    }

    pub fn colored() -> Self {
        Self {
            header: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            error: Style::new().red().bold(),
            warn: Style::new().yellow().bold(),
            info: Style::new().magenta(),
            dim: Style::new().white().dimmed(),
            muted: Style::new().bright_black(),
            vesicant: Style::new().white().on_red().bold(),
            irritant: Style::new().black().on_yellow(),
            non_vesicant: Style::new().green(),
            strong_evidence: Style::new().green().bold(),
            free: Style::new().bright_green().bold(),
            locked: Style::new().blue().italic(),
        }
    }

    pub fn plain() -> Self {
        Self {
            header: Style::new(),
            success: Style::new(),
            error: Style::new(),
            warn: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            muted: Style::new(),
            vesicant: Style::new(),
            irritant: Style::new(),
            non_vesicant: Style::new(),
            strong_evidence: Style::new(),
            free: Style::new(),
            locked: Style::new(),
        }
    }

    /// Badge style for a stored extravasation risk label
    pub fn risk(&self, label: &str) -> Style {
        let style = match label.parse::<ExtravasationRisk>() {
            Ok(ExtravasationRisk::Vesicant) => &self.vesicant,
            Ok(ExtravasationRisk::Irritant) => &self.irritant,
            Ok(ExtravasationRisk::NonVesicant) => &self.non_vesicant,
            Err(_) => &self.muted,
        };
        style.clone()
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}
