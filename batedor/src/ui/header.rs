//! Top header with host identity, uptime and the active process query.

use batedor_agent::display::Panels;
use ratatui::{
    layout::Rect,
    widgets::{Block, Borders},
    Frame,
};

use super::Drawable;

pub struct Header<'a> {
    pub panels: &'a Panels,
    /// Filter text while it is being typed.
    pub editing: Option<&'a str>,
}

fn fmt_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = secs % 86_400 / 3600;
    let mins = secs % 3600 / 60;
    if days > 0 {
        format!("{days}d {hours}h {mins}m")
    } else {
        format!("{hours}h {mins}m")
    }
}

impl Drawable for Header<'_> {
    fn draw(&self, f: &mut Frame<'_>, area: Rect) {
        let host = self.panels.host();
        let query = self.panels.processes().query;
        let filter = match self.editing {
            Some(buf) => format!("filter: {buf}_"),
            None if query.filter.is_empty() => "filter: -".into(),
            None => format!("filter: {}", query.filter),
        };
        let title = if host.hostname.is_empty() {
            "batedor | collecting... (press 'q' to quit)".to_string()
        } else {
            format!(
                "batedor | {} | {} | up {} | sort: {} | {}  (q quit, c/m/p sort, / filter, h history)",
                host.hostname,
                host.platform,
                fmt_uptime(host.uptime_secs),
                query.sort_key.label(),
                filter
            )
        };
        f.render_widget(Block::default().title(title).borders(Borders::BOTTOM), area);
    }
}
