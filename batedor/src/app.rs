//! Terminal UI: input handling and drawing. Reads the panels the pipeline fills; never samples.

use std::{
    io,
    sync::Arc,
    time::{Duration, Instant},
};

use batedor_agent::display::Panels;
use batedor_agent::state::{AppState, SortKey};
use batedor_agent::store::{HistoryPoint, HistoryStore};
use chrono::Utc;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    Terminal,
};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::ui::cpu::{CpuAvg, PerCoreBars};
use crate::ui::disks::DiskPanel;
use crate::ui::header::Header;
use crate::ui::history::{HistoryChart, HistoryMetric, HISTORY_HOURS};
use crate::ui::mem::MemoryPanel;
use crate::ui::net::NetPanel;
use crate::ui::processes::{page_size, scroll_key, ProcessTable};
use crate::ui::Drawable;

const FRAME_INTERVAL: Duration = Duration::from_millis(250);
const HISTORY_REFRESH: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Dashboard,
    /// Typing a process filter; the buffer is applied on every keystroke.
    Filter(String),
    History(HistoryMetric),
}

pub struct App {
    panels: Arc<Panels>,
    state: Arc<AppState>,
    store: Option<Arc<dyn HistoryStore>>,
    mode: Mode,
    should_quit: bool,

    procs_scroll_offset: usize,
    last_procs_area: Option<Rect>,

    history: Vec<HistoryPoint>,
    history_loaded: Option<(HistoryMetric, Instant)>,
}

impl App {
    pub fn new(
        panels: Arc<Panels>,
        state: Arc<AppState>,
        store: Option<Arc<dyn HistoryStore>>,
    ) -> Self {
        Self {
            panels,
            state,
            store,
            mode: Mode::Dashboard,
            should_quit: false,
            procs_scroll_offset: 0,
            last_procs_area: None,
            history: Vec::new(),
            history_loaded: None,
        }
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub async fn run(&mut self, cancel: CancellationToken) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let res = self.event_loop(&mut terminal, &cancel).await;

        // Teardown
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        res
    }

    async fn event_loop<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        cancel: &CancellationToken,
    ) -> anyhow::Result<()> {
        loop {
            // Input (non-blocking)
            while event::poll(Duration::from_millis(10))? {
                if let Event::Key(k) = event::read()? {
                    if k.kind == KeyEventKind::Press {
                        self.handle_key(k);
                    }
                }
            }
            if self.should_quit || cancel.is_cancelled() {
                break;
            }

            if let Mode::History(metric) = self.mode {
                self.refresh_history(metric).await;
            }

            terminal.draw(|f| self.draw(f))?;

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(FRAME_INTERVAL) => {}
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, k: KeyEvent) {
        // Raw mode swallows SIGINT; treat Ctrl-C as quit from any mode.
        if k.code == KeyCode::Char('c') && k.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        match &mut self.mode {
            Mode::Filter(buf) => {
                match k.code {
                    KeyCode::Enter | KeyCode::Esc => {
                        self.mode = Mode::Dashboard;
                        return;
                    }
                    KeyCode::Backspace => {
                        buf.pop();
                    }
                    KeyCode::Char(c) => buf.push(c),
                    _ => return,
                }
                self.state.set_filter(buf.clone());
                self.procs_scroll_offset = 0;
            }
            Mode::History(metric) => match k.code {
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    self.mode = Mode::Dashboard;
                }
                KeyCode::Char('c') => *metric = HistoryMetric::Cpu,
                KeyCode::Char('m') => *metric = HistoryMetric::Mem,
                _ => {}
            },
            Mode::Dashboard => match k.code {
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
                KeyCode::Char('c') => self.state.set_sort_key(SortKey::Cpu),
                KeyCode::Char('m') => self.state.set_sort_key(SortKey::Mem),
                KeyCode::Char('p') => self.state.set_sort_key(SortKey::Pid),
                KeyCode::Char('/') => self.mode = Mode::Filter(self.state.query().filter),
                KeyCode::Char('h') => self.mode = Mode::History(HistoryMetric::Cpu),
                _ => {
                    let page = self.last_procs_area.map(page_size).unwrap_or(10);
                    let total = self.panels.processes().entries.len();
                    scroll_key(&mut self.procs_scroll_offset, k, page, total);
                }
            },
        }
    }

    /// Re-query the store when the metric changed or the cached window went stale.
    async fn refresh_history(&mut self, metric: HistoryMetric) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        let fresh = matches!(
            self.history_loaded,
            Some((m, at)) if m == metric && at.elapsed() < HISTORY_REFRESH
        );
        if fresh {
            return;
        }
        let since = Utc::now() - chrono::Duration::hours(HISTORY_HOURS);
        match store.query_window(metric.metric_name(), since).await {
            Ok(points) => self.history = points,
            Err(e) => {
                warn!(metric = metric.metric_name(), "history query failed: {e}");
                self.history.clear();
            }
        }
        self.history_loaded = Some((metric, Instant::now()));
    }

    pub fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let area = f.area();

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(area);

        let editing = match &self.mode {
            Mode::Filter(buf) => Some(buf.as_str()),
            _ => None,
        };
        Header {
            panels: &self.panels,
            editing,
        }
        .draw(f, rows[0]);

        if let Mode::History(metric) = self.mode {
            HistoryChart {
                metric,
                points: self.store.as_ref().map(|_| self.history.as_slice()),
                now: Utc::now(),
            }
            .draw(f, rows[1]);
            return;
        }

        // Body rows: top (cpu avg + per-core), memory + disk, bottom (network | processes)
        let body = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Length(5),
                Constraint::Min(10),
            ])
            .split(rows[1]);

        let top_lr = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(66), Constraint::Percentage(34)])
            .split(body[0]);
        CpuAvg(&self.panels.cpu_avg).draw(f, top_lr[0]);
        PerCoreBars(&self.panels).draw(f, top_lr[1]);

        let mid_lr = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(66), Constraint::Percentage(34)])
            .split(body[1]);
        MemoryPanel(&self.panels.memory).draw(f, mid_lr[0]);
        DiskPanel(&self.panels).draw(f, mid_lr[1]);

        let bottom_lr = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(body[2]);
        NetPanel(&self.panels).draw(f, bottom_lr[0]);

        let procs_area = bottom_lr[1];
        // Cache for input handlers
        self.last_procs_area = Some(procs_area);
        ProcessTable {
            panels: &self.panels,
            scroll_offset: self.procs_scroll_offset,
        }
        .draw(f, procs_area);
    }
}
