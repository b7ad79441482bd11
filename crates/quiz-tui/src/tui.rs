//! Ratatui frontend for the quiz client.
//!
//! Pure UI module: terminal lifecycle, rendering, and input → action
//! mapping. All session state lives in `quiz_core::session`; this module
//! diff-applies the [`SessionView`] to the terminal each frame. Exactly
//! one of the four screens renders into the main region at a time — the
//! dispatch matches exhaustively on [`SessionView::current_screen`].

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};
use std::io::{self, Stdout};

use quiz_core::protocol::ClientMessage;
use quiz_core::session::{LogCategory, ScreenId, SessionEvent, SessionView};

// ---------------------------------------------------------------------------
// UserIntent — result of processing user input
// ---------------------------------------------------------------------------

/// The result of processing a user input event.
#[derive(Debug)]
pub enum UserIntent {
    /// No action needed.
    None,
    /// The user wants to quit the application.
    Quit,
    /// The user wants to send a message to the server.
    Send(ClientMessage),
    /// Local feedback for the session log. The event loop routes this
    /// through the controller's `add_message`.
    Feedback(String, LogCategory),
}

// ---------------------------------------------------------------------------
// TUI-only state
// ---------------------------------------------------------------------------

/// UI-layer state that lives alongside (but separate from) the session view.
#[derive(Default)]
struct TuiState {
    /// Name input buffer.
    name_input: String,
    /// Name input cursor position (in chars).
    name_cursor: usize,
    /// Currently selected answer control on the guess screen.
    selected_variant: usize,
}

impl TuiState {
    fn move_cursor_left(&mut self) {
        self.name_cursor = self.clamp_cursor(self.name_cursor.saturating_sub(1));
    }

    fn move_cursor_right(&mut self) {
        self.name_cursor = self.clamp_cursor(self.name_cursor.saturating_add(1));
    }

    fn enter_char(&mut self, new_char: char) {
        let index = self.byte_index();
        self.name_input.insert(index, new_char);
        self.move_cursor_right();
    }

    fn byte_index(&self) -> usize {
        self.name_input
            .char_indices()
            .map(|(i, _)| i)
            .nth(self.name_cursor)
            .unwrap_or(self.name_input.len())
    }

    fn delete_char(&mut self) {
        if self.name_cursor == 0 {
            return;
        }
        let before = self.name_input.chars().take(self.name_cursor - 1);
        let after = self.name_input.chars().skip(self.name_cursor);
        self.name_input = before.chain(after).collect();
        self.move_cursor_left();
    }

    fn clamp_cursor(&self, new_cursor_pos: usize) -> usize {
        new_cursor_pos.clamp(0, self.name_input.chars().count())
    }
}

/// Number of answer controls the guess screen currently shows.
fn variant_count(view: &SessionView) -> usize {
    view.active_question
        .map(|q| q.variant_count as usize)
        .unwrap_or(0)
}

fn clamp_selected_variant(tui: &mut TuiState, view: &SessionView) {
    let max = variant_count(view);
    if max == 0 {
        tui.selected_variant = 0;
    } else if tui.selected_variant >= max {
        tui.selected_variant = max - 1;
    }
}

// ---------------------------------------------------------------------------
// Public API — Tui struct
// ---------------------------------------------------------------------------

/// Owns the ratatui terminal and all UI-layer state.
///
/// The client orchestrator ([`crate::client`]) drives this struct: call
/// [`Tui::render`] each frame and [`Tui::poll_and_handle_input`] to
/// process keyboard events.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    state: TuiState,
}

impl Tui {
    /// Set up the terminal (raw mode, alternate screen) and return a ready `Tui`.
    pub fn setup() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self {
            terminal,
            state: TuiState::default(),
        })
    }

    /// Restore the terminal to its original state.
    pub fn teardown(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    /// Draw the current frame.
    pub fn render(&mut self, view: &SessionView) -> io::Result<()> {
        clamp_selected_variant(&mut self.state, view);
        self.terminal.draw(|f| ui(f, view, &self.state))?;
        Ok(())
    }

    /// Poll for a keyboard event and, if one is available, translate it
    /// into a [`UserIntent`]. Never blocks.
    pub fn poll_and_handle_input(&mut self, view: &SessionView) -> io::Result<UserIntent> {
        if !event::poll(std::time::Duration::from_millis(0))? {
            return Ok(UserIntent::None);
        }
        let Event::Key(key) = event::read()? else {
            return Ok(UserIntent::None);
        };
        if key.kind != KeyEventKind::Press {
            return Ok(UserIntent::None);
        }
        Ok(self.handle_key_event(key, view))
    }

    // -- private -----------------------------------------------------------

    fn handle_key_event(&mut self, key: KeyEvent, view: &SessionView) -> UserIntent {
        if key.code == KeyCode::Esc {
            return UserIntent::Quit;
        }

        match view.current_screen {
            ScreenId::EnterYourName => self.handle_name_entry_key(key, view),
            ScreenId::WaitingToStart => match key.code {
                KeyCode::Char('u') | KeyCode::Char('U') => {
                    UserIntent::Send(view.unregister())
                }
                _ => UserIntent::None,
            },
            ScreenId::GuessScreen => self.handle_guess_key(key, view),
            ScreenId::WaitingForNextQuestion => match key.code {
                KeyCode::Char('u') | KeyCode::Char('U') => {
                    UserIntent::Send(view.unregister())
                }
                _ => UserIntent::None,
            },
        }
    }

    fn handle_name_entry_key(&mut self, key: KeyEvent, view: &SessionView) -> UserIntent {
        let tui = &mut self.state;
        match key.code {
            KeyCode::Enter => {
                // An empty name is silently rejected, matching the game's
                // registration rule: no message, no feedback.
                match view.register(&tui.name_input) {
                    Some(msg) => UserIntent::Send(msg),
                    None => UserIntent::None,
                }
            }
            KeyCode::Char(c) if !c.is_control() => {
                tui.enter_char(c);
                UserIntent::None
            }
            KeyCode::Backspace => {
                tui.delete_char();
                UserIntent::None
            }
            KeyCode::Left => {
                tui.move_cursor_left();
                UserIntent::None
            }
            KeyCode::Right => {
                tui.move_cursor_right();
                UserIntent::None
            }
            _ => UserIntent::None,
        }
    }

    fn handle_guess_key(&mut self, key: KeyEvent, view: &SessionView) -> UserIntent {
        let total = variant_count(view);
        let tui = &mut self.state;
        match key.code {
            KeyCode::Enter => {
                if total == 0 {
                    return UserIntent::Feedback(
                        "This question has no answers to pick from".to_string(),
                        LogCategory::Info,
                    );
                }
                UserIntent::Send(view.guess(tui.selected_variant as u32))
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                // Digit keys answer directly; out-of-range digits do nothing.
                let variant = c.to_digit(10).unwrap_or(0) as usize;
                if variant < total {
                    UserIntent::Send(view.guess(variant as u32))
                } else {
                    UserIntent::None
                }
            }
            KeyCode::Char('u') | KeyCode::Char('U') => UserIntent::Send(view.unregister()),
            KeyCode::Left => {
                if total > 0 {
                    tui.selected_variant = (tui.selected_variant + total - 1) % total;
                }
                UserIntent::None
            }
            KeyCode::Right => {
                if total > 0 {
                    tui.selected_variant = (tui.selected_variant + 1) % total;
                }
                UserIntent::None
            }
            _ => UserIntent::None,
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn ui(frame: &mut Frame, view: &SessionView, tui: &TuiState) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(9),    // Active screen
            Constraint::Length(8), // Session log
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    // Exactly one screen occupies the main region.
    let cursor_position = match view.current_screen {
        ScreenId::EnterYourName => render_enter_your_name(frame, tui, main_layout[0]),
        ScreenId::WaitingToStart => {
            render_lobby(frame, view, main_layout[0]);
            None
        }
        ScreenId::GuessScreen => {
            render_guess_screen(frame, view, tui, main_layout[0]);
            None
        }
        ScreenId::WaitingForNextQuestion => {
            render_feedback_screen(frame, view, main_layout[0]);
            None
        }
    };
    if let Some(pos) = cursor_position {
        frame.set_cursor_position(pos);
    }

    render_log(frame, view, main_layout[1]);
    render_status_bar(frame, view, main_layout[2]);
}

fn render_enter_your_name(frame: &mut Frame, tui: &TuiState, area: Rect) -> Option<(u16, u16)> {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Welcome to the quiz!",
            Style::default().fg(Color::Yellow).bold(),
        )),
        Line::from(""),
        Line::from("Type your name and press Enter to join:"),
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", tui.name_input),
            Style::default().fg(Color::Cyan).bold(),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue))
        .title(" Enter your name ")
        .title_style(Style::default().fg(Color::Blue).bold());
    let inner = block.inner(area);
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center).block(block), area);

    // Place the cursor after the typed text (the input line is centered).
    let line_width = 2 + tui.name_input.chars().count();
    let line_start = inner.x + inner.width.saturating_sub(line_width as u16) / 2;
    let cursor_x = line_start + 2 + tui.name_cursor as u16;
    Some((cursor_x.min(inner.right().saturating_sub(1)), inner.y + 5))
}

fn render_lobby(frame: &mut Frame, view: &SessionView, area: Rect) {
    let name = view.player_name.as_deref().unwrap_or("");
    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw("You're in, "),
            Span::styled(name.to_string(), Style::default().fg(Color::Cyan).bold()),
            Span::raw("!"),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Waiting for the game to start...",
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "U: leave the game",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let lobby = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green))
            .title(" Lobby ")
            .title_style(Style::default().fg(Color::Green).bold()),
    );
    frame.render_widget(lobby, area);
}

fn render_guess_screen(frame: &mut Frame, view: &SessionView, tui: &TuiState, area: Rect) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Pick your answer!",
            Style::default().fg(Color::Yellow).bold(),
        )),
        Line::from(""),
    ];

    // One control per variant, labeled 0..N-1 in order, rebuilt from the
    // view every frame.
    let mut buttons: Vec<Span> = Vec::new();
    if let Some(question) = &view.active_question {
        for label in question.variant_labels() {
            let selected = label as usize == tui.selected_variant;
            let style = if selected {
                Style::default().bg(Color::Blue).fg(Color::Black).bold()
            } else {
                Style::default().fg(Color::White)
            };
            buttons.push(Span::styled(format!("  {}  ", label), style));
            buttons.push(Span::raw(" "));
        }
    }
    if buttons.is_empty() {
        lines.push(Line::from(Span::styled(
            "No answers to pick from",
            Style::default().fg(Color::Gray),
        )));
    } else {
        lines.push(Line::from(buttons));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Left/Right: select | Enter or digit: answer",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let screen = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta))
            .title(" Question ")
            .title_style(Style::default().fg(Color::Magenta).bold()),
    );
    frame.render_widget(screen, area);
}

fn render_feedback_screen(frame: &mut Frame, view: &SessionView, area: Rect) {
    let mut lines = vec![Line::from("")];

    // Exactly one of the two correctness indicators shows, never both.
    match view.last_answer_correct {
        Some(true) => lines.push(Line::from(Span::styled(
            "✔ Correct!",
            Style::default().fg(Color::Green).bold(),
        ))),
        Some(false) => lines.push(Line::from(Span::styled(
            "✘ Wrong",
            Style::default().fg(Color::Red).bold(),
        ))),
        None => lines.push(Line::from("")),
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Score: ", Style::default().fg(Color::Gray)),
        Span::styled(
            view.score.to_string(),
            Style::default().fg(Color::Yellow).bold(),
        ),
    ]));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Waiting for the next question...",
        Style::default().fg(Color::Gray),
    )));

    let screen = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Result ")
            .title_style(Style::default().fg(Color::Yellow).bold()),
    );
    frame.render_widget(screen, area);
}

/// Format a structured [`SessionEvent`] for the log region.
fn format_event(event: &SessionEvent) -> String {
    match event {
        SessionEvent::Synced { registered: true } => "Synced with server: registered".to_string(),
        SessionEvent::Synced { registered: false } => {
            "Synced with server: not registered".to_string()
        }
        SessionEvent::QuestionAsked { variants } => {
            format!("New question with {} answers", variants)
        }
        SessionEvent::GuessScored {
            score,
            correct: true,
        } => format!("Correct! Score: {}", score),
        SessionEvent::GuessScored {
            score,
            correct: false,
        } => format!("Wrong. Score: {}", score),
        SessionEvent::ServerError { text } => text.clone(),
        SessionEvent::ClosedByServer { reason } => {
            format!("Server closed the connection: {}", reason)
        }
        SessionEvent::Disconnected => "Connection lost, reconnecting...".to_string(),
        SessionEvent::Text { text, .. } => text.clone(),
    }
}

fn render_log(frame: &mut Frame, view: &SessionView, area: Rect) {
    let items: Vec<ListItem> = view
        .events
        .iter()
        .rev()
        .take(area.height.saturating_sub(2) as usize)
        .rev()
        .map(|ev| {
            let style = match ev.category() {
                LogCategory::System => Style::default().fg(Color::Yellow),
                LogCategory::Action => Style::default().fg(Color::White),
                LogCategory::Error => Style::default().fg(Color::Red),
                LogCategory::Info => Style::default().fg(Color::Gray),
            };
            ListItem::new(Span::styled(format_event(ev), style))
        })
        .collect();

    let log = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Log ")
            .title_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(log, area);
}

fn render_status_bar(frame: &mut Frame, view: &SessionView, area: Rect) {
    let (status_text, status_color) = if view.connected {
        ("● Connected", Color::Green)
    } else {
        ("● Reconnecting", Color::Red)
    };

    let mut spans = vec![
        Span::styled(status_text, Style::default().fg(status_color)),
        Span::raw(" | "),
        Span::styled("ESC", Style::default().fg(Color::Cyan).bold()),
        Span::raw(": Quit"),
    ];
    if let Some(name) = &view.player_name {
        spans.push(Span::raw(" | You: "));
        spans.push(Span::styled(
            name.as_str(),
            Style::default().fg(Color::Cyan),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
