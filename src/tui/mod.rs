//! Terminal dashboard for NetPulse - htop-like simplicity
//!
//! Two panels side by side: operational checks on the left, degraded on
//! the right. The refresh loop owns the data; this module only renders
//! engine snapshots and forwards toggles, queries and manual refreshes.

mod keybindings;
mod tree_view;
mod widgets;

use crate::core::{NetpulseError, Result};
use crate::engine::{DashboardView, EngineStatus, Section, SharedEngine, Summary, TickOutput};
use crate::runtime::{Command, RefreshHandle};
use chrono::{DateTime, Local};
use crossterm::{
    event::{Event, EventStream, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use futures::StreamExt;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, TableState},
    Frame, Terminal,
};
use std::io;
use tokio::sync::mpsc;

const PAGE: usize = 10;

/// Input mode
#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Normal,
    Search,
}

/// Everything one frame needs, copied out under a single lock.
struct Snapshot {
    view: DashboardView,
    summary: Summary,
    status: EngineStatus,
    tick: Option<TickOutput>,
    last_sync: Option<DateTime<Local>>,
    query: String,
}

/// TUI application state
pub struct App {
    engine: SharedEngine,
    commands: mpsc::Sender<Command>,
    feed_label: String,
    mode: Mode,
    search_buffer: String,
    focus: Section,
    /// Cursor per panel: 0 is the panel itself, `n` is row `n - 1`
    cursor: [usize; 2],
    /// Scroll state per panel
    tables: [TableState; 2],
    should_quit: bool,
}

impl App {
    /// Create new TUI app
    pub fn new(engine: SharedEngine, commands: mpsc::Sender<Command>, feed_label: impl Into<String>) -> Self {
        Self {
            engine,
            commands,
            feed_label: feed_label.into(),
            mode: Mode::Normal,
            search_buffer: String::new(),
            focus: Section::Operational,
            cursor: [0, 0],
            tables: [TableState::default(), TableState::default()],
            should_quit: false,
        }
    }

    fn snapshot(&self) -> Snapshot {
        let engine = self.engine.lock();
        Snapshot {
            view: engine.view(),
            summary: engine.summary(),
            status: engine.status(),
            tick: engine.last_tick().cloned(),
            last_sync: engine.last_sync(),
            query: engine.query().to_string(),
        }
    }

    fn focus_index(&self) -> usize {
        match self.focus {
            Section::Operational => 0,
            Section::Degraded => 1,
        }
    }

    /// Handle keyboard input
    fn handle_input(&mut self, key: KeyEvent) {
        use keybindings::{handle_key, handle_search_key, Action};

        let action = match self.mode {
            Mode::Normal => handle_key(key),
            Mode::Search => handle_search_key(key),
        };

        let idx = self.focus_index();
        match action {
            Action::Quit => self.should_quit = true,
            Action::MoveUp => self.cursor[idx] = self.cursor[idx].saturating_sub(1),
            Action::MoveDown => self.cursor[idx] += 1,
            Action::PageUp => self.cursor[idx] = self.cursor[idx].saturating_sub(PAGE),
            Action::PageDown => self.cursor[idx] += PAGE,
            Action::SwitchPanel => {
                self.focus = match self.focus {
                    Section::Operational => Section::Degraded,
                    Section::Degraded => Section::Operational,
                };
            },
            Action::Toggle => self.toggle_selected(),
            Action::Refresh => {
                if self.commands.try_send(Command::Refresh).is_err() {
                    tracing::debug!("Manual refresh not queued");
                }
            },
            Action::StartSearch => {
                self.search_buffer = self.engine.lock().query().to_string();
                self.mode = Mode::Search;
            },
            Action::ClearSearch => self.apply_query(String::new()),
            Action::SearchInput(c) => {
                self.search_buffer.push(c);
                self.apply_query(self.search_buffer.clone());
            },
            Action::SearchBackspace => {
                self.search_buffer.pop();
                self.apply_query(self.search_buffer.clone());
            },
            Action::SearchSubmit => self.mode = Mode::Normal,
            Action::SearchCancel => {
                self.search_buffer.clear();
                self.apply_query(String::new());
                self.mode = Mode::Normal;
            },
            Action::None => {},
        }
    }

    /// Filter live as the query is typed.
    fn apply_query(&mut self, query: String) {
        self.engine.lock().set_query(query);
        self.cursor = [0, 0];
    }

    fn toggle_selected(&mut self) {
        let mut engine = self.engine.lock();
        let view = engine.view();
        let panel = match self.focus {
            Section::Operational => &view.operational,
            Section::Degraded => &view.degraded,
        };

        let key = match self.cursor[self.focus_index()] {
            0 => Some(panel.key.clone()),
            n => panel.rows.get(n - 1).and_then(|row| row.key.clone()),
        };
        if let Some(key) = key {
            engine.toggle(key.as_str());
        }
    }

    /// Draw the UI
    fn draw(&mut self, frame: &mut Frame) {
        let snapshot = self.snapshot();

        // Keep cursors inside their panels after data or filter changes
        for (cursor, panel) in self.cursor.iter_mut().zip(snapshot.view.panels()) {
            *cursor = (*cursor).min(panel.rows.len());
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(3), // Summary
                Constraint::Min(0),    // Panels
                Constraint::Length(2), // Footer
            ])
            .split(frame.area());

        self.draw_header(frame, chunks[0], &snapshot);
        draw_summary(frame, chunks[1], &snapshot);

        let panels = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[2]);

        for (area, (idx, panel)) in panels.iter().zip(snapshot.view.panels().into_iter().enumerate()) {
            let focused = self.focus_index() == idx;
            // Cursor 0 is the panel header
            let state = &mut self.tables[idx];
            state.select(self.cursor[idx].checked_sub(1));
            tree_view::draw_panel(frame, *area, panel, focused, state);
        }

        self.draw_footer(frame, chunks[3], &snapshot);
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
        let (clock, countdown) = match &snapshot.tick {
            Some(tick) => (tick.clock.clone(), tick.countdown.clone().unwrap_or_default()),
            None => ("--:--:--".to_string(), String::new()),
        };

        let line = Line::from(vec![
            Span::styled(" NetPulse ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("| {} | {} {} | ", self.feed_label, clock, countdown)),
            Span::styled(
                snapshot.status.label(),
                Style::default().fg(widgets::engine_color(snapshot.status)),
            ),
        ]);

        let header = Paragraph::new(line).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(header, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
        let text = match self.mode {
            Mode::Search => format!(" /{}█", self.search_buffer),
            Mode::Normal if !snapshot.query.is_empty() => {
                format!(" filter: {}  [Esc]clear [/]edit [q]uit", snapshot.query)
            },
            Mode::Normal => " [q]uit [/]search [Enter]toggle [Tab]panel [↑↓]navigate [r]efresh ".to_string(),
        };

        let footer = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::TOP));
        frame.render_widget(footer, area);
    }
}

fn draw_summary(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let summary = &snapshot.summary;
    let last_sync = snapshot
        .last_sync
        .map_or_else(|| "never".to_string(), |t| t.format("%H:%M:%S").to_string());

    let line = Line::from(vec![
        Span::raw(format!(" Hosts {}  ", summary.total)),
        Span::styled(format!("Healthy {}  ", summary.healthy), Style::default().fg(Color::Green)),
        Span::styled(format!("Failed {}  ", summary.failed), Style::default().fg(Color::Red)),
        Span::styled(format!("Syncing {}  ", summary.syncing), Style::default().fg(Color::Yellow)),
        Span::raw(format!("Avg {}  Last sync {}", summary.latency_label(), last_sync)),
    ]);

    let widget = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title(" Summary "));
    frame.render_widget(widget, area);
}

async fn event_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App, handle: &RefreshHandle) -> Result<()> {
    let mut events = EventStream::new();
    let mut updates = handle.updates();

    loop {
        terminal
            .draw(|f| app.draw(f))
            .map_err(|e| NetpulseError::render(format!("Failed to draw: {}", e)))?;

        tokio::select! {
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => app.handle_input(key),
                Some(Ok(_)) => {},
                Some(Err(e)) => return Err(NetpulseError::terminal(format!("Failed to read event: {}", e))),
                None => return Ok(()),
            },
            changed = updates.changed() => {
                if changed.is_err() {
                    tracing::warn!("Refresh loop stopped, leaving dashboard");
                    return Ok(());
                }
            },
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Run the TUI until the user quits
pub async fn run_tui(engine: SharedEngine, handle: &RefreshHandle, feed_label: String) -> Result<()> {
    // Setup terminal
    enable_raw_mode().map_err(|e| NetpulseError::terminal(format!("Failed to enable raw mode: {}", e)))?;
    let mut stdout = io::stdout();
    stdout
        .execute(EnterAlternateScreen)
        .map_err(|e| NetpulseError::terminal(format!("Failed to enter alternate screen: {}", e)))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal =
        Terminal::new(backend).map_err(|e| NetpulseError::terminal(format!("Failed to create terminal: {}", e)))?;

    let mut app = App::new(engine, handle.commands(), feed_label);
    let result = event_loop(&mut terminal, &mut app, handle).await;

    // Cleanup runs even when the loop failed
    disable_raw_mode().map_err(|e| NetpulseError::terminal(format!("Failed to disable raw mode: {}", e)))?;
    terminal
        .backend_mut()
        .execute(LeaveAlternateScreen)
        .map_err(|e| NetpulseError::terminal(format!("Failed to leave alternate screen: {}", e)))?;
    terminal
        .show_cursor()
        .map_err(|e| NetpulseError::terminal(format!("Failed to show cursor: {}", e)))?;

    result
}
