//! Shared UI theme constants.

use ratatui::style::Color;

// Scrollbar colors
pub const SB_ARROW: Color = Color::Rgb(170, 170, 180);
pub const SB_TRACK: Color = Color::Rgb(120, 120, 130);
pub const SB_THUMB: Color = Color::Rgb(200, 200, 210);

// History chart lines
pub const HIST_CPU: Color = Color::Cyan;
pub const HIST_MEM: Color = Color::Magenta;
