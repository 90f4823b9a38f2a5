//! # CAH
//!
//! Game-state engine for Cards Against Humanity in chat channels.
//!
//! The engine owns everything between "a player typed a command" and
//! "these players should see this": card packs, decks, hands, rounds,
//! judging, and scores. Message formatting and the chat platform itself
//! stay outside.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cah::prelude::*;
//!
//! # async fn run() -> Result<(), CahError> {
//! let (engine, mut events) = Engine::builder()
//!     .catalog_path("cards.json")
//!     .build()?;
//!
//! let lobby = LobbyId(1);
//! engine.start(lobby, PlayerId(1), "alice", GameMode::QuickRound, &[]).await?;
//! engine.join(lobby, PlayerId(2), "bob").await?;
//! engine.join(lobby, PlayerId(3), "carol").await?;
//! engine.begin(lobby, PlayerId(1)).await?;
//!
//! while let Some(envelope) = events.recv().await {
//!     // Route `envelope.event` to `envelope.recipient`.
//! #   let _ = envelope;
//! }
//! # Ok(())
//! # }
//! ```

mod engine;
mod error;

pub use engine::{Engine, EngineBuilder};
pub use error::CahError;

/// Installs a `tracing` subscriber that honours `RUST_LOG` and falls back
/// to `default_directive` (e.g. `"info"` or `"cah_game=debug"`).
///
/// Does nothing if a global subscriber is already set.
pub fn init_tracing(default_directive: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Convenient re-exports for platform layers.
///
/// ```rust
/// use cah::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{CahError, Engine, EngineBuilder, init_tracing};

    pub use cah_cards::{
        BlackCard, CardId, CardKind, Catalog, CatalogError, CatalogStats, DeckError, DeckStats,
        PackId, PackStats, WhiteCard,
    };
    pub use cah_game::{
        AbortReason, AnonymizedSubmission, FinishReason, GameConfig, GameError, GameEvent,
        GameMode, GameStatus, LobbyEvent, Phase, RoundOutcome, RoundState, RoundSummary, Standing,
    };
    pub use cah_players::{PlayerError, PlayerStatus};
    pub use cah_protocol::{
        Codec, Envelope, JsonCodec, LobbyId, PlayerId, ProtocolError, Recipient,
    };
}
