//! Core identity and delivery types.
//!
//! Everything here is small, `Copy` where possible, and serializable so a
//! platform layer can log it, store it, or send it across a process
//! boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// This is the platform's stable user id (a chat-platform snowflake, a
/// database key, ...). The newtype keeps it from being mixed up with a
/// [`LobbyId`], even though both are `u64` underneath.
///
/// `#[serde(transparent)]` serializes `PlayerId(42)` as just `42`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

/// Display lets us use `{}` in format strings and `%player_id` in tracing
/// fields: `PlayerId(42)` prints as `P-42`.
impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A unique identifier for a lobby: the chat channel a game lives in.
///
/// Unlike player ids, lobby ids are chosen by the platform layer (one game
/// per channel), so there is no generator here.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LobbyId(pub u64);

impl fmt::Display for LobbyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Recipient: who should see an event?
// ---------------------------------------------------------------------------

/// Specifies who an outbound event is meant for.
///
/// The engine never formats or delivers anything itself. It tags every
/// event with a `Recipient` and the platform layer decides how to reach
/// that audience (a channel message, a DM, an ephemeral reply, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// Everyone in the lobby. Public events.
    All,

    /// One specific player, privately. Hands are always sent this way.
    Player(PlayerId),
}

impl Recipient {
    /// Returns `true` if the event must not be shown to the whole lobby.
    pub fn is_private(&self) -> bool {
        matches!(self, Self::Player(_))
    }
}

// ---------------------------------------------------------------------------
// Envelope: one outbound event with its routing metadata
// ---------------------------------------------------------------------------

/// An outbound event plus the metadata a platform layer needs to route it.
///
/// ```text
/// ┌──────────────────────────────┐
/// │ lobby: L-7                   │  ← which channel
/// │ seq: 42                      │  ← per-lobby ordering
/// │ recipient: Player(P-3)       │  ← public or private
/// │ ┌──────────────────────────┐ │
/// │ │ event: HandDealt { .. }  │ │  ← the game event itself
/// │ └──────────────────────────┘ │
/// └──────────────────────────────┘
/// ```
///
/// `seq` starts at 1 and increases by one per event within a lobby, so a
/// consumer can spot gaps or reorderings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<E> {
    /// The lobby the event belongs to.
    pub lobby: LobbyId,
    /// Per-lobby sequence number, starting at 1.
    pub seq: u64,
    /// Who should see the event.
    pub recipient: Recipient,
    /// The event itself.
    pub event: E,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&PlayerId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_player_id_deserializes_from_plain_number() {
        let pid: PlayerId = serde_json::from_str("42").unwrap();
        assert_eq!(pid, PlayerId(42));
    }

    #[test]
    fn test_player_id_display() {
        assert_eq!(PlayerId(7).to_string(), "P-7");
    }

    #[test]
    fn test_lobby_id_display() {
        assert_eq!(LobbyId(3).to_string(), "L-3");
    }

    #[test]
    fn test_recipient_is_private() {
        assert!(!Recipient::All.is_private());
        assert!(Recipient::Player(PlayerId(1)).is_private());
    }

    #[test]
    fn test_recipient_player_json_format() {
        let json = serde_json::to_value(Recipient::Player(PlayerId(7))).unwrap();
        assert_eq!(json, serde_json::json!({ "Player": 7 }));
    }

    #[test]
    fn test_envelope_json_format() {
        let envelope = Envelope {
            lobby: LobbyId(9),
            seq: 1,
            recipient: Recipient::All,
            event: "hello".to_string(),
        };
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["lobby"], 9);
        assert_eq!(json["seq"], 1);
        assert_eq!(json["recipient"], "All");
        assert_eq!(json["event"], "hello");
    }

    #[test]
    fn test_envelope_missing_event_returns_error() {
        let wrong = r#"{"lobby": 1, "seq": 1, "recipient": "All"}"#;
        let result: Result<Envelope<String>, _> = serde_json::from_str(wrong);
        assert!(result.is_err());
    }
}
