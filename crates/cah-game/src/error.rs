//! Error types for the game layer.

use cah_cards::{CatalogError, DeckError};
use cah_players::PlayerError;
use cah_protocol::{LobbyId, PlayerId};

/// Errors that can occur while running a game.
///
/// Every variant is recoverable: the command that produced it changed
/// nothing, and the lobby keeps running.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// `begin` was called with too few active players.
    #[error("{active} active player(s), at least {required} needed to begin")]
    NotEnoughPlayers { active: usize, required: usize },

    /// The submitted hand index does not point at a card.
    #[error("no card at position {0} in your hand")]
    CardNotInHand(usize),

    /// The submission is not acceptable right now (wrong phase, judge
    /// submitting, too many cards, repeated card, ...).
    #[error("invalid submission: {0}")]
    InvalidSubmission(String),

    /// The judge chose a submission index outside the revealed list.
    #[error("no submission at position {0}")]
    InvalidPick(usize),

    /// The judge tried to pick before every submission is in.
    #[error("submissions are still coming in")]
    JudgmentNotReady,

    /// Someone other than the round's judge tried to pick.
    #[error("player {0} is not the judge this round")]
    NotJudge(PlayerId),

    /// A host-only command came from someone else.
    #[error("player {0} is not the host")]
    NotHost(PlayerId),

    /// The command does not fit the session's current phase or round.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The requested target score is outside the allowed range.
    #[error("target score must be between 1 and {max}, got {requested}")]
    InvalidTargetScore { requested: u32, max: u32 },

    /// A [`GameConfig`](crate::GameConfig) failed validation.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// No game is running in this lobby.
    #[error("no game in lobby {0}")]
    LobbyNotFound(LobbyId),

    /// A game is already running in this lobby.
    #[error("a game is already running in lobby {0}")]
    LobbyAlreadyActive(LobbyId),

    /// The lobby's actor is gone or its channel is closed.
    #[error("lobby {0} is unavailable")]
    Unavailable(LobbyId),

    #[error(transparent)]
    Deck(#[from] DeckError),

    #[error(transparent)]
    Player(#[from] PlayerError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
