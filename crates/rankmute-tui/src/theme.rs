//! Palette and shared styles.

use ratatui::style::{Color, Modifier, Style};

// ── Palette ───────────────────────────────────────────────────────────────────

pub const C_ACCENT: Color = Color::Rgb(30, 215, 96);
pub const C_OK: Color = Color::Rgb(110, 210, 140);
pub const C_PENDING: Color = Color::Rgb(240, 190, 90);
pub const C_ERROR: Color = Color::Rgb(235, 90, 90);
pub const C_MUTED: Color = Color::Rgb(80, 84, 92);
pub const C_SECONDARY: Color = Color::Rgb(130, 136, 146);
pub const C_PRIMARY: Color = Color::Rgb(222, 226, 230);
pub const C_RANK: Color = Color::Rgb(96, 102, 112);
pub const C_ARTIST: Color = Color::Rgb(120, 170, 220);

pub const C_PANEL_BORDER: Color = Color::Rgb(44, 48, 54);
pub const C_PANEL_BORDER_FOCUSED: Color = Color::Rgb(30, 150, 80);
pub const C_SELECTION_BG: Color = Color::Rgb(32, 40, 36);

pub const C_FILTER_BG: Color = Color::Rgb(22, 24, 28);
pub const C_FILTER_FG: Color = Color::Rgb(240, 190, 90);

/// Rows that are blocked, directly or through an artist.
pub const C_BLOCKED_BG: Color = Color::Rgb(48, 30, 32);
pub const C_BLOCKED_FG: Color = Color::Rgb(160, 140, 142);

pub const C_TOAST_INFO: Color = C_ARTIST;
pub const C_TOAST_SUCCESS: Color = C_OK;
pub const C_TOAST_WARNING: Color = C_PENDING;
pub const C_TOAST_ERROR: Color = C_ERROR;

pub const C_MODE_NORMAL: Color = C_SECONDARY;
pub const C_MODE_FILTER: Color = C_FILTER_FG;

// ── Styles ────────────────────────────────────────────────────────────────────

pub fn style_default() -> Style {
    Style::default().fg(C_PRIMARY)
}

pub fn style_selected_focused() -> Style {
    Style::default()
        .bg(C_SELECTION_BG)
        .fg(C_PRIMARY)
        .add_modifier(Modifier::BOLD)
}

pub fn style_blocked() -> Style {
    Style::default()
        .bg(C_BLOCKED_BG)
        .fg(C_BLOCKED_FG)
        .add_modifier(Modifier::CROSSED_OUT)
}

pub fn style_blocked_selected() -> Style {
    style_blocked().fg(C_PRIMARY).add_modifier(Modifier::BOLD)
}
