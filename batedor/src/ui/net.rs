//! Network details plus download/upload sparklines.

use batedor_agent::display::{Panels, SeriesPanel};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Sparkline},
    Frame,
};

use super::Drawable;

pub struct NetPanel<'a>(pub &'a Panels);

fn latency_label(ms: i64) -> String {
    if ms < 0 {
        "-1ms".into()
    } else {
        format!("{ms}ms")
    }
}

fn draw_net_spark(f: &mut Frame<'_>, area: Rect, title: &str, series: &SeriesPanel, color: Color) {
    series.request_width(area.width.saturating_sub(2) as usize);
    let data: Vec<u64> = series
        .values()
        .iter()
        .map(|v| v.max(0.0).round() as u64)
        .collect();
    let spark = Sparkline::default()
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .data(&data)
        .style(Style::default().fg(color));
    f.render_widget(spark, area);
}

impl Drawable for NetPanel<'_> {
    fn draw(&self, f: &mut Frame<'_>, area: Rect) {
        let net = self.0.network();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Min(3),
                Constraint::Min(3),
            ])
            .split(area);

        let lines = vec![
            Line::from(format!(
                "Interface: {}  Local IP: {}",
                net.interface_name, net.local_ip
            )),
            Line::from(format!(
                "Public IP: {}  Latency: {}",
                net.public_ip,
                latency_label(net.latency_ms)
            )),
            Line::from(format!(
                "Session: down {}  up {}",
                net.session_down, net.session_up
            )),
        ];
        f.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Network")),
            rows[0],
        );

        draw_net_spark(
            f,
            rows[1],
            &format!("Download: {}", net.download_rate),
            &self.0.rx_kb,
            Color::Green,
        );
        draw_net_spark(
            f,
            rows[2],
            &format!("Upload: {}", net.upload_rate),
            &self.0.tx_kb,
            Color::Blue,
        );
    }
}
