//! Memory usage sparkline.

use batedor_agent::display::SeriesPanel;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Sparkline},
    Frame,
};

use super::util::clamp_pct;
use super::Drawable;

pub struct MemoryPanel<'a>(pub &'a SeriesPanel);

impl Drawable for MemoryPanel<'_> {
    fn draw(&self, f: &mut Frame<'_>, area: Rect) {
        let series = self.0;
        series.request_width(area.width.saturating_sub(2) as usize);
        let title = match series.latest() {
            Some(v) => format!("Memory ({v:.1}% used)"),
            None => "Memory".into(),
        };
        let data: Vec<u64> = series
            .values()
            .iter()
            .map(|v| clamp_pct(*v).round() as u64)
            .collect();
        let spark = Sparkline::default()
            .block(Block::default().borders(Borders::ALL).title(title))
            .data(&data)
            .max(100)
            .style(Style::default().fg(Color::Magenta));
        f.render_widget(spark, area);
    }
}
