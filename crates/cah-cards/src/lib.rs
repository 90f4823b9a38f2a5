//! Cards for the CAH engine: where they come from and where they go.
//!
//! - [`Catalog`] — the validated, read-only card pool, grouped into
//!   [`Pack`]s. Loaded once per process and shared by every lobby.
//! - [`PackSelection`] — the subset of packs one game plays with.
//! - [`Deck`] — one game's draw and discard piles, built from a selection.
//! - [`GameRng`] — the seedable shuffler behind every random decision.
//!
//! Card values ([`WhiteCard`], [`BlackCard`]) can only be created by the
//! catalog loader. Everything downstream moves or clones them, which is
//! what makes card conservation checkable by [`CardId`].

mod card;
mod catalog;
mod deck;
mod error;
mod rng;

pub use card::{BlackCard, CardId, CardKind, PackId, WhiteCard};
pub use catalog::{Catalog, CatalogStats, DEFAULT_PACK_ID, Pack, PackSelection, PackStats};
pub use deck::{Deck, DeckStats};
pub use error::{CatalogError, DeckError};
pub use rng::GameRng;
