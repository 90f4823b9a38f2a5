//! Shared vocabulary for the CAH engine.
//!
//! This crate defines what every other layer agrees on:
//!
//! - **Types** ([`PlayerId`], [`LobbyId`], [`Recipient`], [`Envelope`]) —
//!   who is playing, where, and who an outbound event is for.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how envelopes are
//!   turned into bytes for a platform layer living outside the process.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while encoding or
//!   decoding.
//!
//! # Architecture
//!
//! The protocol crate sits at the bottom of the stack. It knows nothing
//! about cards, rounds, or scores:
//!
//! ```text
//! Game (sessions, lobbies) → Players / Cards → Protocol (ids, envelopes)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{Envelope, LobbyId, PlayerId, Recipient};
