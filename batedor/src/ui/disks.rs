//! Disk usage card for the monitored mount.

use batedor_agent::display::Panels;
use batedor_agent::rate::format_bytes;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Gauge},
    Frame,
};

use super::util::clamp_pct;
use super::Drawable;

pub struct DiskPanel<'a>(pub &'a Panels);

impl Drawable for DiskPanel<'_> {
    fn draw(&self, f: &mut Frame<'_>, area: Rect) {
        let d = self.0.disk();
        let pct = clamp_pct(d.used_percent);
        let color = if pct < 70.0 {
            Color::Green
        } else if pct < 90.0 {
            Color::Yellow
        } else {
            Color::Red
        };
        let title = format!(
            "Disk  {} / {}  ({} free)",
            format_bytes(d.used),
            format_bytes(d.total),
            format_bytes(d.free)
        );
        let g = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(title))
            .ratio(pct / 100.0)
            .label(format!("{pct:.1}%"))
            .gauge_style(Style::default().fg(color));
        f.render_widget(g, area);
    }
}
