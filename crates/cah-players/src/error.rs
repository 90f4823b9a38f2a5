//! Error types for the player layer.

use cah_protocol::PlayerId;

/// Errors that can occur during player management.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlayerError {
    /// The player is already in the game and active.
    #[error("player {0} already joined")]
    AlreadyJoined(PlayerId),

    /// No player with this id ever joined.
    #[error("player {0} is not in this game")]
    UnknownPlayer(PlayerId),

    /// The player joined once but has left or been removed. Repeating a
    /// leave lands here, and nothing is returned a second time.
    #[error("player {0} is no longer active")]
    NotActive(PlayerId),

    /// Too few active players remain to pick a judge.
    #[error("{active} active player(s), at least {required} required")]
    InsufficientPlayers { active: usize, required: usize },
}
