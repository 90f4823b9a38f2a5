//! Outbound events: what the engine tells the platform layer.
//!
//! Events are structured data, never formatted text. Each one is paired
//! with a [`Recipient`](cah_protocol::Recipient); only [`GameEvent::HandDealt`]
//! is ever addressed to a single player.

use cah_cards::{BlackCard, CardKind, PackId, WhiteCard};
use cah_players::Player;
use cah_protocol::{Envelope, PlayerId};
use serde::Serialize;

use crate::GameMode;

/// An event stamped with its lobby, sequence number and recipient.
pub type LobbyEvent = Envelope<GameEvent>;

/// Something the platform layer should show to players.
///
/// Serialized with an internal `"type"` tag:
///
/// ```json
/// { "type": "RoundStarted", "round": 1, "judge": 4, "prompt": { ... } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    LobbyOpened {
        host: PlayerId,
        mode: GameMode,
        packs: Vec<PackId>,
    },
    PlayerJoined {
        player: PlayerId,
        name: String,
    },
    PlayerLeft {
        player: PlayerId,
        /// `true` when the host removed them.
        removed: bool,
    },
    RoundStarted {
        round: u32,
        judge: PlayerId,
        prompt: BlackCard,
    },
    /// A player's whole hand after a top-up, in index order. Private.
    HandDealt {
        player: PlayerId,
        cards: Vec<WhiteCard>,
    },
    /// Never carries card content.
    SubmissionReceived {
        player: PlayerId,
        complete: bool,
        waiting_on: Vec<PlayerId>,
    },
    /// Every submission is in. The list is shuffled and anonymous; the
    /// judge picks by `index`. Sent again if a player leaves during
    /// judgment.
    AllSubmitted {
        round: u32,
        submissions: Vec<AnonymizedSubmission>,
    },
    RoundResolved {
        round: u32,
        winner: PlayerId,
        cards: Vec<WhiteCard>,
        score: u32,
    },
    RoundAborted {
        round: u32,
        reason: AbortReason,
    },
    /// A round could not be started. Waiting for the host to `skip`
    /// (retry) or `end`.
    DeckExhausted {
        kind: CardKind,
        needed: usize,
        available: usize,
    },
    GameFinished {
        standings: Vec<Standing>,
        winner: Option<PlayerId>,
        reason: FinishReason,
    },
}

/// One entry of the judge's list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnonymizedSubmission {
    pub index: usize,
    pub cards: Vec<WhiteCard>,
}

/// A line of the scoreboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub player: PlayerId,
    pub name: String,
    pub score: u32,
    pub active: bool,
}

impl From<&Player> for Standing {
    fn from(player: &Player) -> Self {
        Self {
            player: player.id,
            name: player.name.clone(),
            score: player.score,
            active: player.is_active(),
        }
    }
}

/// Why a round ended without a winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AbortReason {
    JudgeLeft,
    Skipped,
    HostEnded,
    NotEnoughPlayers,
}

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FinishReason {
    TargetReached,
    QuickRoundComplete,
    HostEnded,
    NotEnoughPlayers,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_event_serializes_with_type_tag() {
        let event = GameEvent::PlayerLeft {
            player: PlayerId(3),
            removed: true,
        };

        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "type": "PlayerLeft", "player": 3, "removed": true })
        );
    }

    #[test]
    fn test_game_finished_serializes_reason_and_winner() {
        let event = GameEvent::GameFinished {
            standings: vec![Standing {
                player: PlayerId(1),
                name: "alice".into(),
                score: 7,
                active: true,
            }],
            winner: None,
            reason: FinishReason::HostEnded,
        };

        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "GameFinished");
        assert_eq!(json["reason"], "HostEnded");
        assert!(json["winner"].is_null());
        assert_eq!(json["standings"][0]["score"], 7);
    }
}
