//! Unified error type for the engine.

use cah_cards::{CatalogError, DeckError};
use cah_game::GameError;
use cah_players::PlayerError;
use cah_protocol::ProtocolError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `cah` meta-crate, you deal with this single error type
/// instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant auto-generates `From` impls, so the `?`
/// operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum CahError {
    /// Encoding or decoding an event failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The card catalog could not be loaded, or a pack was not found.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The deck ran out of cards.
    #[error(transparent)]
    Deck(#[from] DeckError),

    /// A player operation failed (already joined, not active, ...).
    #[error(transparent)]
    Player(#[from] PlayerError),

    /// A game rule rejected the command, or the lobby is gone.
    #[error(transparent)]
    Game(#[from] GameError),

    /// [`EngineBuilder::build`](crate::EngineBuilder::build) was called
    /// without a catalog.
    #[error("no card catalog configured")]
    MissingCatalog,
}
