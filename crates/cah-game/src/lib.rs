//! Rounds, game sessions, and lobby actors for the CAH engine.
//!
//! # Layers
//!
//! - [`Round`] — one round's state machine: submissions, reveal, judgment
//! - [`GameSession`] — one lobby's game: players + deck + rounds until a
//!   win condition; every operation returns the [`GameEvent`]s it produced
//! - [`LobbyHandle`] — async handle to the Tokio task owning a session
//! - [`LobbyManager`] — one lobby per chat channel, reaped when finished
//!
//! Configuration lives in [`GameConfig`]; the session lifecycle in
//! [`Phase`].

mod config;
mod error;
mod event;
mod lobby;
mod manager;
mod round;
mod session;

pub use config::{GameConfig, GameMode, Phase};
pub use error::GameError;
pub use event::{AbortReason, AnonymizedSubmission, FinishReason, GameEvent, LobbyEvent, Standing};
pub use lobby::{EventSender, LobbyHandle};
pub use manager::{DEFAULT_CHANNEL_SIZE, LobbyManager};
pub use round::{Resolution, Round, RoundOutcome, RoundState, RoundSummary, SubmitOutcome};
pub use session::{GameSession, GameStatus, Outbox};
