//! Client orchestrator — connects the reconnect supervisor, the session
//! controller, and the TUI frontend.
//!
//! This module owns the outer loop: ask the supervisor for a session,
//! drive it until the connection drops or the user quits, repeat. One
//! reconnect cycle per connection loss; a quit flips the shutdown signal
//! so the supervisor stops cleanly.

use std::time::Duration;

use tokio::sync::watch;

use quiz_client::controller::{PollResult, SessionController};
use quiz_client::reconnect::{Connector, ReconnectPolicy, Reconnector};

use crate::tui::{Tui, UserIntent};

/// How a session ended, from the frontend's point of view.
#[derive(Debug, PartialEq, Eq)]
enum SessionEnd {
    /// The connection dropped; the supervisor should replace it.
    Disconnected,
    /// The user asked to leave; shut the whole client down.
    Quit,
}

/// Start the quiz client against the given server URL.
pub async fn start_client(server_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    // Build the WS URL (append the fixed /ws path if the caller didn't).
    let ws_url = if server_url.ends_with("/ws") {
        server_url.to_string()
    } else {
        format!("{}/ws", server_url.trim_end_matches('/'))
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut reconnector = Reconnector::to_url(ws_url, ReconnectPolicy::default(), shutdown_rx);

    let mut tui = Tui::setup()?;
    let result = run(&mut tui, &mut reconnector, &shutdown_tx).await;
    tui.teardown()?;
    result
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

async fn run<C: Connector>(
    tui: &mut Tui,
    reconnector: &mut Reconnector<C>,
    shutdown: &watch::Sender<bool>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Each loop iteration is one connection's lifetime. The session view
    // starts fresh every time; the server re-syncs it with `status`.
    while let Some(mut ctrl) = reconnector.next_session().await? {
        if run_session(tui, &mut ctrl).await? == SessionEnd::Quit {
            let _ = shutdown.send(true);
            break;
        }
    }
    Ok(())
}

async fn run_session(
    tui: &mut Tui,
    ctrl: &mut SessionController,
) -> Result<SessionEnd, Box<dyn std::error::Error>> {
    loop {
        tui.render(&ctrl.view)?;

        tokio::select! {
            poll = ctrl.recv() => {
                match poll {
                    PollResult::Updated(_) => {}
                    PollResult::Disconnected => {
                        // Show the outage before the supervisor replaces us.
                        tui.render(&ctrl.view)?;
                        return Ok(SessionEnd::Disconnected);
                    }
                    PollResult::Empty => {}
                }
            }

            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                match tui.poll_and_handle_input(&ctrl.view)? {
                    UserIntent::Quit => return Ok(SessionEnd::Quit),
                    UserIntent::Send(msg) => ctrl.send(msg),
                    UserIntent::Feedback(text, category) => ctrl.add_message(text, category),
                    UserIntent::None => {}
                }
            }
        }
    }
}
