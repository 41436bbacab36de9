//! Theme and Colors
//!
//! A dark terminal-emulator palette. Panes look like little terminal windows;
//! the glitch cue swaps the border to a hot accent for its short lifetime.

use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// Pane Chrome
// ============================================================================

/// Pane border at rest
pub const PANE_BORDER: Color = Color::Rgb(88, 96, 110);

/// Pane title (lane name)
pub const PANE_TITLE: Color = Color::Rgb(170, 178, 190);

/// Border while the glitch cue is active
pub const GLITCH_BORDER: Color = Color::Rgb(255, 70, 160);

/// Secondary glitch tint for the title
pub const GLITCH_TITLE: Color = Color::Rgb(90, 230, 255);

// ============================================================================
// Terminal Text
// ============================================================================

/// Shell prompt marker
pub const PROMPT_GREEN: Color = Color::Rgb(120, 230, 120);

/// Typed command text
pub const COMMAND_WHITE: Color = Color::Rgb(235, 235, 235);

/// Block cursor while a command is still being typed
pub const CURSOR: Color = Color::Rgb(235, 235, 235);

/// Command output
pub const OUTPUT_GRAY: Color = Color::Rgb(180, 180, 180);

/// Placeholder text for empty panes
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

// ============================================================================
// Progress
// ============================================================================

/// Gauge fill
pub const GAUGE_FILL: Color = Color::Rgb(100, 180, 255);

/// Gauge track
pub const GAUGE_TRACK: Color = Color::Rgb(40, 44, 52);

// ============================================================================
// Composed Styles
// ============================================================================

/// Border style for a pane, glitched or not
#[must_use]
pub fn border_style(glitch: bool) -> Style {
    if glitch {
        Style::default()
            .fg(GLITCH_BORDER)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(PANE_BORDER)
    }
}

/// Title style for a pane, glitched or not
#[must_use]
pub fn title_style(glitch: bool) -> Style {
    if glitch {
        Style::default()
            .fg(GLITCH_TITLE)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default().fg(PANE_TITLE)
    }
}

/// Gauge style
#[must_use]
pub fn gauge_style() -> Style {
    Style::default().fg(GAUGE_FILL).bg(GAUGE_TRACK)
}
