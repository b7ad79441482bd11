use serde::{Deserialize, Serialize};

/// Messages sent from client to server.
///
/// Wire shape (both directions) is a two-field JSON object:
/// `{"event_type": "<name>", "args": {...}}`. The adjacent tagging below
/// produces exactly that, with snake_case event names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "args", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Register with a player name. The client only sends this for a
    /// non-empty name; the server rejects duplicates.
    Register { name: String },

    /// Leave the game. Braced (not a unit variant) so the wire object
    /// carries an explicit empty `args` — the server reads `args`
    /// unconditionally.
    Unregister {},

    /// Answer the active question with the zero-based variant index.
    Guess { variant: u32 },
}

/// Messages sent from server to client.
///
/// This is a closed set: a frame whose `event_type` is not listed here
/// fails deserialization and is dropped (with a log line) at the
/// transport layer, so one unknown or malformed frame can never take
/// down the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "args", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Canonical "sync with the server" event, sent once per fresh
    /// connection and after register/unregister. `name` accompanies
    /// `registered: true`; some server builds omit it.
    Status {
        registered: bool,
        name: Option<String>,
    },

    /// A question is being asked; build `number_of_variants` answer
    /// controls labeled `0..N-1`.
    Question { number_of_variants: u32 },

    /// Our guess was scored.
    Guessed { score: u32, correct: bool },

    /// Application-level error (e.g. "already registered").
    Error { text: String },

    /// The server is about to close the connection.
    ConnectionClosed { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn register_wire_shape() {
        let msg = ClientMessage::Register {
            name: "Alice".to_string(),
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({"event_type": "register", "args": {"name": "Alice"}})
        );
    }

    #[test]
    fn unregister_carries_empty_args() {
        // The server indexes `args` on every event, so it must be present
        // even when empty.
        let value = serde_json::to_value(ClientMessage::Unregister {}).unwrap();
        assert_eq!(value, json!({"event_type": "unregister", "args": {}}));
    }

    #[test]
    fn guess_wire_shape() {
        let value = serde_json::to_value(ClientMessage::Guess { variant: 2 }).unwrap();
        assert_eq!(value, json!({"event_type": "guess", "args": {"variant": 2}}));
    }

    #[test]
    fn status_roundtrip_with_and_without_name() {
        let with_name: ServerMessage = serde_json::from_str(
            r#"{"event_type":"status","args":{"registered":true,"name":"Bob"}}"#,
        )
        .unwrap();
        assert_eq!(
            with_name,
            ServerMessage::Status {
                registered: true,
                name: Some("Bob".to_string()),
            }
        );

        let without_name: ServerMessage =
            serde_json::from_str(r#"{"event_type":"status","args":{"registered":false}}"#).unwrap();
        assert_eq!(
            without_name,
            ServerMessage::Status {
                registered: false,
                name: None,
            }
        );
    }

    #[test]
    fn question_and_guessed_deserialize() {
        let q: ServerMessage =
            serde_json::from_str(r#"{"event_type":"question","args":{"number_of_variants":4}}"#)
                .unwrap();
        assert_eq!(
            q,
            ServerMessage::Question {
                number_of_variants: 4
            }
        );

        let g: ServerMessage =
            serde_json::from_str(r#"{"event_type":"guessed","args":{"score":1200,"correct":true}}"#)
                .unwrap();
        assert_eq!(
            g,
            ServerMessage::Guessed {
                score: 1200,
                correct: true,
            }
        );
    }

    #[test]
    fn unknown_event_type_is_rejected() {
        let result = serde_json::from_str::<ServerMessage>(
            r#"{"event_type":"leaderboard","args":{"top":[]}}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn missing_args_shape_is_rejected() {
        let result =
            serde_json::from_str::<ServerMessage>(r#"{"event_type":"question","args":{}}"#);
        assert!(result.is_err());
    }
}
