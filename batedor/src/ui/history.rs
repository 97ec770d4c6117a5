//! 24h history chart for one persisted metric.

use batedor_agent::store::{HistoryPoint, CPU_USAGE, MEM_USAGE};
use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use super::theme::{HIST_CPU, HIST_MEM};
use super::Drawable;

/// Window shown by the history view.
pub const HISTORY_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryMetric {
    #[default]
    Cpu,
    Mem,
}

impl HistoryMetric {
    pub fn metric_name(self) -> &'static str {
        match self {
            HistoryMetric::Cpu => CPU_USAGE,
            HistoryMetric::Mem => MEM_USAGE,
        }
    }

    fn title(self) -> &'static str {
        match self {
            HistoryMetric::Cpu => "CPU usage, last 24h (%)",
            HistoryMetric::Mem => "Memory usage, last 24h (%)",
        }
    }
}

pub struct HistoryChart<'a> {
    pub metric: HistoryMetric,
    /// None when no store is available.
    pub points: Option<&'a [HistoryPoint]>,
    pub now: DateTime<Utc>,
}

/// (hours before `now` as a negative x, value) pairs for the chart.
pub fn to_series(points: &[HistoryPoint], now: DateTime<Utc>) -> Vec<(f64, f64)> {
    points
        .iter()
        .map(|p| {
            let hours = (p.timestamp - now).num_seconds() as f64 / 3600.0;
            (hours, p.value)
        })
        .collect()
}

impl Drawable for HistoryChart<'_> {
    fn draw(&self, f: &mut Frame<'_>, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("{}  (c/m switch, q back)", self.metric.title()));
        let points = match self.points {
            Some(p) if p.len() >= 2 => p,
            _ => {
                let msg = if self.points.is_none() {
                    "history unavailable: collecting data"
                } else {
                    "collecting data..."
                };
                f.render_widget(
                    Paragraph::new(msg).alignment(Alignment::Center).block(block),
                    area,
                );
                return;
            }
        };

        let data = to_series(points, self.now);
        let color = match self.metric {
            HistoryMetric::Cpu => HIST_CPU,
            HistoryMetric::Mem => HIST_MEM,
        };
        let dataset = Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(color))
            .data(&data);
        let x_labels = vec![
            Span::raw(format!("-{HISTORY_HOURS}h")),
            Span::raw(format!("-{}h", HISTORY_HOURS / 2)),
            Span::raw("now"),
        ];
        let y_labels = vec![Span::raw("0"), Span::raw("50"), Span::raw("100")];
        let chart = Chart::new(vec![dataset])
            .block(block)
            .x_axis(
                Axis::default()
                    .bounds([-(HISTORY_HOURS as f64), 0.0])
                    .labels(x_labels),
            )
            .y_axis(Axis::default().bounds([0.0, 100.0]).labels(y_labels));
        f.render_widget(chart, area);
    }
}
