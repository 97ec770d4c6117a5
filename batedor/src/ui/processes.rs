//! Ranked process table with per-cell coloring and a scrollbar.

use batedor_agent::display::Panels;
use batedor_agent::state::SortKey;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::style::Modifier;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use super::theme::{SB_ARROW, SB_THUMB, SB_TRACK};
use super::util::{clamp_pct, inner, load_color, truncate_middle};
use super::Drawable;

const COLS: [Constraint; 5] = [
    Constraint::Length(8),      // PID
    Constraint::Length(10),     // User
    Constraint::Length(7),      // CPU %
    Constraint::Length(7),      // Mem %
    Constraint::Percentage(60), // Command
];

pub struct ProcessTable<'a> {
    pub panels: &'a Panels,
    pub scroll_offset: usize,
}

/// Table rows that fit in `area` (borders and header excluded).
pub fn page_size(area: Rect) -> usize {
    area.height.saturating_sub(3).max(1) as usize
}

impl Drawable for ProcessTable<'_> {
    fn draw(&self, f: &mut Frame<'_>, area: Rect) {
        let view = self.panels.processes();
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Processes ({} shown)", view.entries.len()));
        f.render_widget(block, area);

        let inner = inner(area);
        if inner.height < 1 || inner.width < 3 {
            return;
        }
        // reserve 2 columns for the scrollbar
        let content = Rect {
            width: inner.width.saturating_sub(2),
            ..inner
        };

        let total_rows = view.entries.len();
        let viewport_rows = content.height.saturating_sub(1) as usize;
        let max_off = total_rows.saturating_sub(viewport_rows);
        let offset = self.scroll_offset.min(max_off);

        let cmd_width = content.width.saturating_sub(8 + 10 + 7 + 7 + 4) as usize;
        let rows = view
            .entries
            .iter()
            .skip(offset)
            .take(viewport_rows)
            .map(|p| {
                let cpu = clamp_pct(p.cpu_percent);
                let mem = p.mem_percent as f64;
                let mem_fg = match mem {
                    x if x < 5.0 => Color::Blue,
                    x if x < 20.0 => Color::Magenta,
                    _ => Color::Red,
                };
                Row::new(vec![
                    Cell::from(p.pid.to_string()).style(Style::default().fg(Color::DarkGray)),
                    Cell::from(truncate_middle(&p.user, 10)),
                    Cell::from(format!("{cpu:>5.1}")).style(Style::default().fg(load_color(cpu))),
                    Cell::from(format!("{mem:>5.1}")).style(Style::default().fg(mem_fg)),
                    Cell::from(truncate_middle(&p.command, cmd_width.max(4))),
                ])
            });

        let mark = |k: SortKey, label: &'static str| -> String {
            if view.query.sort_key == k {
                format!("{label} •")
            } else {
                label.to_string()
            }
        };
        let header = Row::new(vec![
            mark(SortKey::Pid, "PID"),
            "User".to_string(),
            mark(SortKey::Cpu, "CPU%"),
            mark(SortKey::Mem, "MEM%"),
            "Command".to_string(),
        ])
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

        let table = Table::new(rows, COLS.to_vec())
            .header(header)
            .column_spacing(1);
        f.render_widget(table, content);

        let scroll_area = Rect {
            x: inner.x + inner.width.saturating_sub(1),
            y: inner.y,
            width: 1,
            height: inner.height,
        };
        draw_scrollbar(f, scroll_area, total_rows, viewport_rows, offset);
    }
}

fn draw_scrollbar(f: &mut Frame<'_>, area: Rect, total_rows: usize, viewport_rows: usize, offset: usize) {
    if area.height < 3 {
        return;
    }
    let track = (area.height - 2) as usize;
    let total = total_rows.max(1);
    let view = viewport_rows.clamp(1, total);
    let max_off = total.saturating_sub(view);

    let thumb_len = (track * view).div_ceil(total).clamp(1, track);
    let thumb_top = if max_off == 0 {
        0
    } else {
        ((track - thumb_len) * offset.min(max_off) + max_off / 2) / max_off
    };

    let mut lines: Vec<Line> = Vec::with_capacity(area.height as usize);
    lines.push(Line::from(Span::styled("▲", Style::default().fg(SB_ARROW))));
    for i in 0..track {
        if i >= thumb_top && i < thumb_top + thumb_len {
            lines.push(Line::from(Span::styled("█", Style::default().fg(SB_THUMB))));
        } else {
            lines.push(Line::from(Span::styled("│", Style::default().fg(SB_TRACK))));
        }
    }
    lines.push(Line::from(Span::styled("▼", Style::default().fg(SB_ARROW))));
    f.render_widget(Paragraph::new(lines), area);
}

/// Up/Down/PageUp/PageDown/Home/End scrolling, clamped to the list.
pub fn scroll_key(offset: &mut usize, key: KeyEvent, page: usize, total_rows: usize) {
    match key.code {
        KeyCode::Up => *offset = offset.saturating_sub(1),
        KeyCode::Down => *offset = offset.saturating_add(1),
        KeyCode::PageUp => *offset = offset.saturating_sub(page),
        KeyCode::PageDown => *offset = offset.saturating_add(page),
        KeyCode::Home => *offset = 0,
        KeyCode::End => *offset = total_rows,
        _ => {}
    }
    *offset = (*offset).min(total_rows.saturating_sub(page));
}
