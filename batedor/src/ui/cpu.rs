//! CPU average sparkline + per-core bars.

use batedor_agent::display::{Panels, SeriesPanel};
use ratatui::style::Modifier;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Sparkline},
    Frame,
};

use super::util::{clamp_pct, inner, load_color};
use super::Drawable;

pub struct CpuAvg<'a>(pub &'a SeriesPanel);

impl Drawable for CpuAvg<'_> {
    fn draw(&self, f: &mut Frame<'_>, area: Rect) {
        let series = self.0;
        series.request_width(area.width.saturating_sub(2) as usize);
        let title = match series.latest() {
            Some(v) => format!("CPU avg (now: {v:>5.1}%)"),
            None => "CPU avg".into(),
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
            .style(Style::default().fg(ratatui::style::Color::Cyan));
        f.render_widget(spark, area);
    }
}

pub struct PerCoreBars<'a>(pub &'a Panels);

impl Drawable for PerCoreBars<'_> {
    fn draw(&self, f: &mut Frame<'_>, area: Rect) {
        f.render_widget(Block::default().borders(Borders::ALL).title("Per-core"), area);
        let cores = self.0.cores();
        let inner = inner(area);
        if inner.height == 0 || cores.is_empty() {
            return;
        }

        let show_n = (inner.height as usize).min(cores.len());
        let constraints: Vec<Constraint> = (0..show_n).map(|_| Constraint::Length(1)).collect();
        let vchunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        for (i, rect) in vchunks.iter().enumerate() {
            let hchunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Min(6), Constraint::Length(12)])
                .split(*rect);
            let curr = clamp_pct(cores[i]);
            let fg = load_color(curr);

            let bar = Gauge::default()
                .ratio(curr / 100.0)
                .label("")
                .gauge_style(Style::default().fg(fg));
            f.render_widget(bar, hchunks[0]);

            let label = format!("cpu{i:<2} {curr:>5.1}%");
            let line = Line::from(Span::styled(
                label,
                Style::default().fg(fg).add_modifier(Modifier::BOLD),
            ));
            f.render_widget(Paragraph::new(line).right_aligned(), hchunks[1]);
        }
    }
}
