//! Color scheme and styles.

use ratatui::style::{Color, Modifier, Style};

/// Console color palette.
pub struct Theme;

impl Theme {
    pub const BG: Color = Color::Reset;
    pub const FG: Color = Color::White;
    pub const FG_DIM: Color = Color::DarkGray;

    // Panel chrome
    pub const BORDER: Color = Color::Yellow;
    pub const PANEL_TITLE: Color = Color::Cyan;
    pub const BANNER: Color = Color::White;

    // Metrics colors
    pub const CPU_COLOR: Color = Color::Cyan;
    pub const MEM_COLOR: Color = Color::Magenta;
    pub const DISK_COLOR: Color = Color::Yellow;
    pub const COUNTER_COLOR: Color = Color::Green;
}

/// Pre-defined styles.
pub struct Styles;

impl Styles {
    /// Default text style.
    pub fn default() -> Style {
        Style::default().fg(Theme::FG).bg(Theme::BG)
    }

    /// Panel border.
    pub fn border() -> Style {
        Style::default().fg(Theme::BORDER)
    }

    /// Panel title embedded in the border.
    pub fn panel_title() -> Style {
        Style::default()
            .fg(Theme::PANEL_TITLE)
            .add_modifier(Modifier::BOLD)
    }

    /// Title banner at the top of the screen.
    pub fn banner() -> Style {
        Style::default()
            .fg(Theme::BANNER)
            .add_modifier(Modifier::BOLD)
    }

    /// Footer hint line.
    pub fn footer() -> Style {
        Style::default().fg(Theme::FG_DIM)
    }

    pub fn cpu() -> Style {
        Style::default().fg(Theme::CPU_COLOR)
    }

    pub fn mem() -> Style {
        Style::default().fg(Theme::MEM_COLOR)
    }

    pub fn disk() -> Style {
        Style::default().fg(Theme::DISK_COLOR)
    }

    /// Statement counter value.
    pub fn counter() -> Style {
        Style::default()
            .fg(Theme::COUNTER_COLOR)
            .add_modifier(Modifier::BOLD)
    }
}
