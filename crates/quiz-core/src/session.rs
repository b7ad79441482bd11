//! The session/screen state machine.
//!
//! Pure state: [`SessionView::apply`] consumes a decoded [`ServerMessage`]
//! and returns [`ViewChanged`] flags; the action builders
//! ([`register`](SessionView::register), [`unregister`](SessionView::unregister),
//! [`guess`](SessionView::guess)) turn user gestures into outbound
//! [`ClientMessage`]s. No I/O and no UI dependency, so the machine is
//! testable without a UI host; rendering layers diff-apply the view.

use std::collections::VecDeque;

use crate::protocol::{ClientMessage, ServerMessage};

// ---------------------------------------------------------------------------
// Screens
// ---------------------------------------------------------------------------

/// The four mutually exclusive screens. Exactly one is visible at any
/// time; the partition holds by construction because visibility derives
/// from the single [`SessionView::current_screen`] field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenId {
    /// Name-entry form.
    EnterYourName,
    /// Lobby; shows the registered name.
    WaitingToStart,
    /// Active question with one control per answer variant.
    GuessScreen,
    /// Post-answer feedback (score + correctness).
    WaitingForNextQuestion,
}

impl ScreenId {
    /// Every screen, for partition checks and hide-all sweeps.
    pub const ALL: [ScreenId; 4] = [
        ScreenId::EnterYourName,
        ScreenId::WaitingToStart,
        ScreenId::GuessScreen,
        ScreenId::WaitingForNextQuestion,
    ];

    /// The UI region id this screen occupies, matching the page markup
    /// the game serves.
    pub fn element_id(self) -> &'static str {
        match self {
            ScreenId::EnterYourName => "enter_your_name",
            ScreenId::WaitingToStart => "waiting_to_start_the_game",
            ScreenId::GuessScreen => "guess_screen",
            ScreenId::WaitingForNextQuestion => "waiting_for_the_next_question_screen",
        }
    }
}

// ---------------------------------------------------------------------------
// Session events (log)
// ---------------------------------------------------------------------------

/// Semantic category for log entries. The UI layer decides how to style each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogCategory {
    System,
    Action,
    Error,
    Info,
}

/// A structured session event for the log region. Frontends render these
/// however they see fit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The server synced our registration state.
    Synced { registered: bool },
    /// A question arrived.
    QuestionAsked { variants: u32 },
    /// Our guess was scored.
    GuessScored { score: u32, correct: bool },
    /// Application-level error from the server.
    ServerError { text: String },
    /// The server announced it is closing the connection.
    ClosedByServer { reason: String },
    /// The transport dropped.
    Disconnected,
    /// Ad-hoc local feedback.
    Text { text: String, category: LogCategory },
}

impl SessionEvent {
    /// Semantic category for styling purposes.
    pub fn category(&self) -> LogCategory {
        match self {
            Self::Synced { .. } | Self::QuestionAsked { .. } => LogCategory::System,
            Self::GuessScored { .. } => LogCategory::Action,
            Self::ServerError { .. } | Self::ClosedByServer { .. } | Self::Disconnected => {
                LogCategory::Error
            }
            Self::Text { category, .. } => *category,
        }
    }
}

// ---------------------------------------------------------------------------
// Change flags
// ---------------------------------------------------------------------------

/// Describes what changed in the view after applying a server message,
/// so the rendering layer can decide what to re-render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewChanged {
    /// The visible screen changed.
    pub screen: bool,
    /// The displayed player name changed.
    pub name: bool,
    /// The score or correctness indicator changed.
    pub score: bool,
    /// The answer-control set was rebuilt.
    pub question: bool,
    /// A session event was logged.
    pub log: bool,
}

impl ViewChanged {
    /// Returns `true` if any flag is set.
    pub fn any(self) -> bool {
        self.screen || self.name || self.score || self.question || self.log
    }
}

// ---------------------------------------------------------------------------
// SessionView
// ---------------------------------------------------------------------------

/// The question currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveQuestion {
    /// Number of answer controls; controls are labeled `0..variant_count`.
    pub variant_count: u32,
}

impl ActiveQuestion {
    /// Zero-based labels for the answer controls, in ascending order.
    pub fn variant_labels(&self) -> impl Iterator<Item = u32> {
        0..self.variant_count
    }
}

/// All player-visible session state. One instance per connection; the
/// owning controller recreates it on a full reconnect since the server
/// re-sends `status` to every fresh connection.
#[derive(Debug, Clone)]
pub struct SessionView {
    /// Registered player name, once the server confirms one.
    pub player_name: Option<String>,
    /// Our score, as last reported by the server.
    pub score: u32,
    /// Whether the last answer was correct. Drives the two mutually
    /// exclusive correctness indicators: exactly one shows when this is
    /// `Some`, neither when it is `None`.
    pub last_answer_correct: Option<bool>,
    /// The question currently on screen, if any.
    pub active_question: Option<ActiveQuestion>,
    /// The single visible screen.
    pub current_screen: ScreenId,
    /// Connection status, maintained by the owning controller.
    pub connected: bool,
    /// Structured session events for the log region.
    pub events: VecDeque<SessionEvent>,
}

impl Default for SessionView {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionView {
    pub fn new() -> Self {
        Self {
            player_name: None,
            score: 0,
            last_answer_correct: None,
            active_question: None,
            current_screen: ScreenId::EnterYourName,
            connected: true,
            events: VecDeque::new(),
        }
    }

    /// Return the view to its initial values. Used on full reconnect:
    /// the server is the source of truth and will re-send `status`.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Whether the given screen is the visible one.
    pub fn is_visible(&self, screen: ScreenId) -> bool {
        self.current_screen == screen
    }

    /// Show one screen, hiding every other. Assigning the single
    /// `current_screen` field is the hide-all-then-show-one rule.
    pub fn show_screen(&mut self, screen: ScreenId) {
        self.current_screen = screen;
    }

    /// Append a session event, keeping only the last 100 entries.
    pub fn add_event(&mut self, event: SessionEvent) {
        self.events.push_back(event);
        if self.events.len() > 100 {
            self.events.pop_front();
        }
    }

    /// Convenience: append a [`SessionEvent::Text`] for ad-hoc feedback.
    pub fn add_message(&mut self, text: String, category: LogCategory) {
        self.add_event(SessionEvent::Text { text, category });
    }

    // ------------------------------------------------------------------
    // Inbound dispatch
    // ------------------------------------------------------------------

    /// Apply a server message to the view.
    ///
    /// Returns a [`ViewChanged`] describing which aspects were modified.
    pub fn apply(&mut self, msg: &ServerMessage) -> ViewChanged {
        let mut changed = ViewChanged::default();

        match msg {
            ServerMessage::Status { registered, name } => {
                if *registered {
                    if let Some(name) = name {
                        self.player_name = Some(name.clone());
                        changed.name = true;
                    }
                    self.show_screen(ScreenId::WaitingToStart);
                } else {
                    if self.player_name.take().is_some() {
                        changed.name = true;
                    }
                    self.show_screen(ScreenId::EnterYourName);
                }
                self.add_event(SessionEvent::Synced {
                    registered: *registered,
                });
                changed.screen = true;
                changed.log = true;
            }
            ServerMessage::Question { number_of_variants } => {
                // Unconditional replace, never append: re-delivery while
                // already on the guess screen rebuilds the control set.
                self.active_question = Some(ActiveQuestion {
                    variant_count: *number_of_variants,
                });
                self.show_screen(ScreenId::GuessScreen);
                self.add_event(SessionEvent::QuestionAsked {
                    variants: *number_of_variants,
                });
                changed.question = true;
                changed.screen = true;
                changed.log = true;
            }
            ServerMessage::Guessed { score, correct } => {
                self.score = *score;
                self.last_answer_correct = Some(*correct);
                self.show_screen(ScreenId::WaitingForNextQuestion);
                self.add_event(SessionEvent::GuessScored {
                    score: *score,
                    correct: *correct,
                });
                changed.score = true;
                changed.screen = true;
                changed.log = true;
            }
            ServerMessage::Error { text } => {
                self.add_event(SessionEvent::ServerError { text: text.clone() });
                changed.log = true;
            }
            ServerMessage::ConnectionClosed { reason } => {
                self.add_event(SessionEvent::ClosedByServer {
                    reason: reason.clone(),
                });
                changed.log = true;
            }
        }

        changed
    }

    // ------------------------------------------------------------------
    // Outbound action builders
    // ------------------------------------------------------------------
    //
    // None of these are gated by the current screen: any action can be
    // invoked regardless of what is displayed, matching the game's
    // original client.

    /// Build a register message, or `None` for the empty string.
    ///
    /// The rejection is silent with no user feedback; the name is not
    /// trimmed (only the exactly-empty string is refused).
    pub fn register(&self, name: &str) -> Option<ClientMessage> {
        if name.is_empty() {
            return None;
        }
        Some(ClientMessage::Register {
            name: name.to_string(),
        })
    }

    /// Build an unregister message.
    pub fn unregister(&self) -> ClientMessage {
        ClientMessage::Unregister {}
    }

    /// Build a guess for the zero-based answer control index.
    pub fn guess(&self, variant: u32) -> ClientMessage {
        ClientMessage::Guess { variant }
    }
}
