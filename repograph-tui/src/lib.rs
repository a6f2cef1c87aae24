use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};
use repograph_core::visualize::describe_progress;
use repograph_core::{RepoGraph, Session, Submission, ViewState, VisualizerConfig, fetch_graph};
use repograph_fetcher::{FetchProgress, ProgressCallback};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub mod diagram;
pub mod layout;

use diagram::{Viewport, render_diagram};
use layout::{Dimensions, LayoutEngine, RadialLayout};

const TICK_RATE: Duration = Duration::from_millis(50);
const MAX_HISTORY: usize = 100;
const MAX_LOG_LINES: usize = 500;
const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const PROMPT: &str = "url> ";

/// Messages from a fetch task back to the view. Each carries the generation
/// of the submission that started it.
#[derive(Debug, Clone)]
pub enum FetchMessage {
    Progress {
        generation: u64,
        message: String,
    },
    Finished {
        generation: u64,
        result: std::result::Result<RepoGraph, String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Diagram,
}

/// What the interactive view starts with
#[derive(Debug, Clone, Default)]
pub struct UiOptions {
    pub config: VisualizerConfig,
    /// Submitted as soon as the view opens
    pub initial_url: Option<String>,
}

pub struct App {
    input: String,
    /// In characters, not bytes
    cursor_position: usize,
    history: Vec<String>,
    history_index: Option<usize>,
    temp_input: String,
    session: Session,
    config: VisualizerConfig,
    runtime: Handle,
    tx: mpsc::UnboundedSender<FetchMessage>,
    rx: mpsc::UnboundedReceiver<FetchMessage>,
    fetch_task: Option<JoinHandle<()>>,
    logs: Vec<String>,
    layout: Box<dyn LayoutEngine>,
    dimensions: Dimensions,
    viewport: Viewport,
    diagram_area: Rect,
    focus: Focus,
    selected: Option<usize>,
    dragging: Option<usize>,
    spinner_frame: usize,
    should_quit: bool,
}

impl App {
    pub fn new(config: VisualizerConfig, runtime: Handle, layout: Box<dyn LayoutEngine>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            input: String::new(),
            cursor_position: 0,
            history: Vec::new(),
            history_index: None,
            temp_input: String::new(),
            session: Session::new(),
            config,
            runtime,
            tx,
            rx,
            fetch_task: None,
            logs: Vec::new(),
            layout,
            dimensions: Dimensions::default(),
            viewport: Viewport::default(),
            diagram_area: Rect::default(),
            focus: Focus::Input,
            selected: None,
            dragging: None,
            spinner_frame: 0,
            should_quit: false,
        }
    }

    pub fn state(&self) -> &ViewState {
        self.session.state()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input = value.into();
        self.cursor_position = self.input.chars().count();
    }

    fn log(&mut self, message: impl Into<String>) {
        self.logs.push(message.into());
        if self.logs.len() > MAX_LOG_LINES {
            self.logs.drain(0..self.logs.len() - MAX_LOG_LINES);
        }
    }

    fn byte_index(&self) -> usize {
        self.input
            .char_indices()
            .nth(self.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    fn reset_history_navigation(&mut self) {
        self.history_index = None;
        self.temp_input.clear();
    }

    pub fn insert_char(&mut self, c: char) {
        let index = self.byte_index();
        self.input.insert(index, c);
        self.cursor_position += 1;
        self.reset_history_navigation();
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position == 0 {
            return;
        }
        self.cursor_position -= 1;
        let index = self.byte_index();
        self.input.remove(index);
        self.reset_history_navigation();
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.cursor_position = (self.cursor_position + 1).min(self.input.chars().count());
    }

    pub fn navigate_history_backward(&mut self) {
        if self.history.is_empty() {
            return;
        }

        if self.history_index.is_none() {
            self.temp_input = self.input.clone();
        }

        let index = match self.history_index {
            None => self.history.len() - 1,
            Some(index) => index.saturating_sub(1),
        };
        self.history_index = Some(index);
        let entry = self.history[index].clone();
        self.set_input(entry);
    }

    pub fn navigate_history_forward(&mut self) {
        let Some(index) = self.history_index else {
            return;
        };

        if index + 1 >= self.history.len() {
            let restored = std::mem::take(&mut self.temp_input);
            self.set_input(restored);
            self.history_index = None;
            return;
        }

        self.history_index = Some(index + 1);
        let entry = self.history[index + 1].clone();
        self.set_input(entry);
    }

    fn remember(&mut self, input: &str) {
        if input.is_empty() || self.history.last().is_some_and(|last| last == input) {
            return;
        }
        self.history.push(input.to_string());
        if self.history.len() > MAX_HISTORY {
            self.history.remove(0);
        }
    }

    /// Submit the current input. A valid URL starts a fresh fetch cycle and
    /// abandons any cycle still running.
    pub fn submit(&mut self) {
        let input = self.input.clone();
        self.remember(&input);
        self.reset_history_navigation();

        let submission = self.session.submit(&input);
        self.abort_fetch();

        match submission {
            Some(submission) => self.start_fetch(submission),
            None => {
                let rejection = match self.session.state() {
                    ViewState::Error(message)
                    | ViewState::Idle {
                        validation_error: Some(message),
                    } => Some(message.clone()),
                    _ => None,
                };
                if let Some(message) = rejection {
                    self.log(message);
                }
                self.focus = Focus::Input;
            }
        }
    }

    fn abort_fetch(&mut self) {
        if let Some(task) = self.fetch_task.take() {
            debug!("Aborting superseded fetch");
            task.abort();
        }
    }

    fn start_fetch(&mut self, submission: Submission) {
        let Submission { generation, repository } = submission;

        self.layout.clear();
        self.viewport.reset();
        self.selected = None;
        self.dragging = None;
        self.focus = Focus::Input;
        self.log(format!("Loading branches and commits for {}...", repository));
        info!("Fetch cycle {} for {}", generation, repository);

        let progress_tx = self.tx.clone();
        let progress: ProgressCallback = Arc::new(move |event: FetchProgress| {
            let _ = progress_tx.send(FetchMessage::Progress {
                generation,
                message: describe_progress(&event),
            });
        });

        let tx = self.tx.clone();
        let config = self.config.clone();
        self.fetch_task = Some(self.runtime.spawn(async move {
            let result = fetch_graph(&config, &repository, Some(progress))
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(FetchMessage::Finished { generation, result });
        }));
    }

    /// Drain fetch messages without blocking. Anything from a superseded
    /// submission is dropped.
    pub fn process_messages(&mut self) {
        while let Ok(message) = self.rx.try_recv() {
            match message {
                FetchMessage::Progress { generation, message } => {
                    if generation == self.session.generation() && self.session.state().is_loading() {
                        self.log(message);
                    }
                }
                FetchMessage::Finished { generation, result } => {
                    if !self.session.complete(generation, result) {
                        continue;
                    }
                    self.fetch_task = None;

                    let summary = match self.session.state() {
                        ViewState::Rendered { repository, graph } => {
                            self.layout.load(graph, self.dimensions);
                            let stats = graph.stats();
                            format!(
                                "Rendered {}: {} branches, {} commits",
                                repository, stats.branches, stats.commits
                            )
                        }
                        ViewState::Error(message) => format!("Error: {}", message),
                        _ => continue,
                    };
                    self.log(summary);
                }
            }
        }
    }

    /// Advance animations by one frame
    pub fn tick(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
        if self.session.state().graph().is_some() {
            self.layout.tick();
        }
    }

    /// Record the diagram's drawing area; the layout is rescaled when its size changes
    pub fn set_diagram_area(&mut self, area: Rect) {
        self.diagram_area = area;
        let dimensions = Dimensions::from_area(area);
        if !dimensions.is_empty() && dimensions != self.dimensions {
            self.dimensions = dimensions;
            self.layout.resize(dimensions);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.focus {
            Focus::Input => self.handle_input_key(key),
            Focus::Diagram => self.handle_diagram_key(key),
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) => self.insert_char(c),
            KeyCode::Backspace => self.delete_char(),
            KeyCode::Enter => self.submit(),
            KeyCode::Up => self.navigate_history_backward(),
            KeyCode::Down => self.navigate_history_forward(),
            KeyCode::Left => self.move_cursor_left(),
            KeyCode::Right => self.move_cursor_right(),
            KeyCode::Home => self.cursor_position = 0,
            KeyCode::End => self.cursor_position = self.input.chars().count(),
            KeyCode::Tab => {
                if self.session.state().graph().is_some() {
                    self.focus = Focus::Diagram;
                }
            }
            KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_diagram_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::Char('/') => self.focus = Focus::Input,
            KeyCode::Char('+') | KeyCode::Char('=') => self.viewport.zoom_in(),
            KeyCode::Char('-') => self.viewport.zoom_out(),
            KeyCode::Char('0') => self.viewport.reset(),
            KeyCode::Char('u') => self.layout.unpin_all(),
            KeyCode::Char('n') => self.select_next(1),
            KeyCode::Char('p') => self.select_next(-1),
            KeyCode::Left => self.viewport.pan(-1.0, 0.0, self.dimensions),
            KeyCode::Right => self.viewport.pan(1.0, 0.0, self.dimensions),
            KeyCode::Up => self.viewport.pan(0.0, 1.0, self.dimensions),
            KeyCode::Down => self.viewport.pan(0.0, -1.0, self.dimensions),
            _ => {}
        }
    }

    fn select_next(&mut self, step: isize) {
        let count = self.layout.positions().len();
        if count == 0 {
            return;
        }
        self.selected = Some(match self.selected {
            None if step < 0 => count - 1,
            None => 0,
            Some(i) => (i as isize + step).rem_euclid(count as isize) as usize,
        });
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.session.state().graph().is_none() {
            return;
        }
        let world = self
            .viewport
            .screen_to_world(self.diagram_area, mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let Some((x, y)) = world else {
                    return;
                };
                self.focus = Focus::Diagram;
                self.selected = self.layout.node_at(x, y, self.viewport.hit_radius());
                self.dragging = self.selected;
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let (Some(index), Some((x, y))) = (self.dragging, world) {
                    self.layout.pin(index, x, y);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => self.dragging = None,
            MouseEventKind::ScrollUp if world.is_some() => self.viewport.zoom_in(),
            MouseEventKind::ScrollDown if world.is_some() => self.viewport.zoom_out(),
            _ => {}
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.abort_fetch();
    }
}

/// Run the interactive view with the default radial layout.
///
/// Blocks until the user quits; call it from `spawn_blocking`. Fetches are
/// spawned on `runtime`.
pub fn run(options: UiOptions, runtime: Handle) -> Result<()> {
    run_with_layout(options, runtime, Box::new(RadialLayout::default()))
}

pub fn run_with_layout(options: UiOptions, runtime: Handle, layout: Box<dyn LayoutEngine>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(options.config, runtime, layout);
    if let Some(url) = options.initial_url {
        app.set_input(url);
        app.submit();
    }

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        app.process_messages();
        app.tick();
        terminal.draw(|f| ui(f, app))?;

        if app.should_quit {
            break;
        }

        if event::poll(TICK_RATE)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                // The next draw picks up the new size
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    Ok(())
}

fn ui(f: &mut Frame, app: &mut App) {
    if app.session.state().is_idle() {
        render_form(f, app);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // URL input
            Constraint::Min(8),    // Diagram / status
            Constraint::Length(1), // Hints bar
        ])
        .split(f.area());

    render_input(f, app, chunks[0]);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(72), Constraint::Percentage(28)])
        .split(chunks[1]);

    if app.session.state().graph().is_some() {
        let inner = Block::default().borders(Borders::ALL).inner(main_chunks[0]);
        app.set_diagram_area(inner);
    }

    match app.session.state() {
        ViewState::Loading { repository } => {
            let text = vec![
                Line::from(""),
                Line::from(vec![
                    Span::styled(SPINNER_FRAMES[app.spinner_frame], Style::default().fg(Color::Cyan)),
                    Span::raw(" "),
                    Span::styled(
                        "Loading branches and commits...",
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(""),
                Line::from(Span::styled(repository.to_string(), Style::default().fg(Color::Cyan))),
            ];
            let paragraph = Paragraph::new(text)
                .block(panel(" Loading ", Color::Yellow))
                .alignment(ratatui::layout::Alignment::Center);
            f.render_widget(paragraph, main_chunks[0]);
        }
        ViewState::Error(message) => {
            let paragraph = Paragraph::new(Line::from(Span::styled(
                message.as_str(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )))
            .block(panel(" Error ", Color::Red))
            .wrap(Wrap { trim: true });
            f.render_widget(paragraph, main_chunks[0]);
        }
        ViewState::Rendered { repository, graph } => {
            render_diagram(
                f,
                main_chunks[0],
                &repository.to_string(),
                graph,
                app.layout.positions(),
                &app.viewport,
                app.selected,
            );
        }
        ViewState::Idle { .. } => {}
    }

    let side_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(4)])
        .split(main_chunks[1]);

    render_details(f, app, side_chunks[0]);
    render_logs(f, app, side_chunks[1]);
    render_hints(f, app, chunks[2]);
}

fn panel(title: &str, color: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(color))
}

fn render_form(f: &mut Frame, app: &App) {
    let area = centered(f.area(), 64, 11);
    f.render_widget(Clear, area);

    let block = panel(" GitHub Repository Visualizer ", Color::Cyan);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Label
            Constraint::Length(3), // Input
            Constraint::Length(2), // Validation message
            Constraint::Min(1),    // Hint
        ])
        .split(inner);

    f.render_widget(
        Paragraph::new("Provide the GitHub Repository Link").style(Style::default().fg(Color::White)),
        rows[0],
    );
    render_input(f, app, rows[1]);

    if let ViewState::Idle {
        validation_error: Some(message),
    } = app.session.state()
    {
        f.render_widget(
            Paragraph::new(message.as_str()).style(Style::default().fg(Color::Red)),
            rows[2],
        );
    }

    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(" Enter ", Style::default().fg(Color::Black).bg(Color::Gray)),
            Span::raw(" Visualize  "),
            Span::styled(" Esc ", Style::default().fg(Color::Black).bg(Color::Gray)),
            Span::raw(" Quit"),
        ])),
        rows[3],
    );
}

fn render_input(f: &mut Frame, app: &App, area: Rect) {
    let border = if app.focus == Focus::Input {
        Color::Yellow
    } else {
        Color::DarkGray
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Repository ")
        .border_style(Style::default().fg(border));
    let inner = block.inner(area);

    let prompt_width = PROMPT.width();
    let (visible, cursor_column) = input_window(
        &app.input,
        app.cursor_position,
        (inner.width as usize).saturating_sub(prompt_width),
    );

    let input = Paragraph::new(format!("{}{}", PROMPT, visible))
        .style(Style::default().fg(Color::Yellow))
        .block(block);
    f.render_widget(input, area);

    if app.focus == Focus::Input {
        f.set_cursor_position((
            inner.x + (prompt_width + cursor_column) as u16,
            inner.y,
        ));
    }
}

/// Scroll the input line so the cursor stays within `width` display columns.
/// Returns the visible slice and the cursor's column inside it.
fn input_window(input: &str, cursor: usize, width: usize) -> (String, usize) {
    if width == 0 {
        return (String::new(), 0);
    }

    let chars: Vec<(char, usize)> = input
        .chars()
        .map(|c| (c, c.width().unwrap_or(0)))
        .collect();
    let cursor = cursor.min(chars.len());

    let mut start = 0;
    let mut cursor_column: usize = chars[..cursor].iter().map(|(_, w)| w).sum();
    // The cursor cell itself needs a column
    while cursor_column >= width && start < cursor {
        cursor_column -= chars[start].1;
        start += 1;
    }

    let mut used = 0;
    let visible = chars[start..]
        .iter()
        .take_while(|(_, w)| {
            used += w;
            used <= width
        })
        .map(|(c, _)| c)
        .collect();

    (visible, cursor_column)
}

fn render_details(f: &mut Frame, app: &App, area: Rect) {
    let block = panel(" Details ", Color::Cyan);
    let mut text = Vec::new();

    if let Some(graph) = app.session.state().graph() {
        let stats = graph.stats();
        text.push(Line::from(vec![
            Span::styled("Branches: ", Style::default().fg(Color::DarkGray)),
            Span::styled(stats.branches.to_string(), Style::default().fg(Color::Yellow)),
            Span::styled("  Commits: ", Style::default().fg(Color::DarkGray)),
            Span::styled(stats.commits.to_string(), Style::default().fg(Color::Yellow)),
        ]));
        text.push(Line::from(""));

        match app.selected.and_then(|i| graph.nodes.get(i)) {
            Some(node) => {
                text.push(Line::from(Span::styled(
                    node.label.as_deref().unwrap_or(&node.id).replace('\n', " "),
                    Style::default().add_modifier(Modifier::BOLD),
                )));
                text.push(Line::from(vec![
                    Span::styled("Id:     ", Style::default().fg(Color::DarkGray)),
                    Span::raw(node.id.clone()),
                ]));
                text.push(Line::from(vec![
                    Span::styled("Group:  ", Style::default().fg(Color::DarkGray)),
                    Span::styled(node.group.as_str(), Style::default().fg(diagram::node_color(node.group))),
                ]));
                if let Some(ref author) = node.author {
                    text.push(Line::from(vec![
                        Span::styled("Author: ", Style::default().fg(Color::DarkGray)),
                        Span::raw(author.clone()),
                    ]));
                }
            }
            None => text.push(Line::from(Span::styled(
                "Click a node or press n/p to select",
                Style::default().fg(Color::DarkGray),
            ))),
        }
    } else {
        text.push(Line::from(Span::styled(
            "Nothing rendered yet",
            Style::default().fg(Color::DarkGray),
        )));
    }

    f.render_widget(Paragraph::new(text).block(block).wrap(Wrap { trim: true }), area);
}

fn render_logs(f: &mut Frame, app: &App, area: Rect) {
    let block = panel(" Status ", Color::Magenta);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let height = inner.height as usize;
    let items: Vec<ListItem> = app
        .logs
        .iter()
        .skip(app.logs.len().saturating_sub(height))
        .map(|line| {
            let style = if line.starts_with("Error") || line.starts_with("Invalid") {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::Blue)
            };
            ListItem::new(line.as_str()).style(style)
        })
        .collect();

    f.render_widget(List::new(items), inner);
}

fn render_hints(f: &mut Frame, app: &App, area: Rect) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Black).bg(Color::Gray));

    let hints = match app.focus {
        Focus::Input => Line::from(vec![
            key(" Enter "),
            Span::raw(" Visualize  "),
            key(" ↑/↓ "),
            Span::raw(" History  "),
            key(" Tab "),
            Span::raw(" Diagram  "),
            key(" Esc "),
            Span::raw(" Quit"),
        ]),
        Focus::Diagram => Line::from(vec![
            key(" q/Esc "),
            Span::raw(" Quit  "),
            key(" Tab "),
            Span::raw(" URL  "),
            key(" ←↑↓→ "),
            Span::raw(" Pan  "),
            key(" +/- "),
            Span::raw(" Zoom  "),
            key(" 0 "),
            Span::raw(" Reset  "),
            key(" n/p "),
            Span::raw(" Select  "),
            key(" Drag "),
            Span::raw(" Pin  "),
            key(" u "),
            Span::raw(" Unpin"),
        ]),
    };

    let paragraph = Paragraph::new(hints).style(Style::default().bg(Color::Black).fg(Color::Gray));
    f.render_widget(paragraph, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
