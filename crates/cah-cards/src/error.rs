//! Error types for the card layer.

use crate::CardKind;

/// Errors raised while loading a catalog or selecting packs from it.
///
/// All of these are validation errors: the catalog source or the caller's
/// pack list is wrong, and nothing has been mutated.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The source is not valid JSON or does not have the catalog shape
    /// (a black card without `text`/`pick`, a pick below 1, a pack without
    /// `white`/`black` arrays, ...).
    #[error("malformed catalog: {0}")]
    Malformed(String),

    /// The source parsed but defines no packs at all.
    #[error("catalog contains no packs")]
    Empty,

    /// A requested pack id is not in the catalog.
    #[error("unknown pack `{0}`")]
    UnknownPack(String),

    /// The caller asked for an empty set of packs.
    #[error("no packs selected")]
    NoPacksSelected,

    /// The catalog file could not be read.
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by a [`Deck`](crate::Deck).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeckError {
    /// Draw and discard piles together hold fewer cards than requested.
    /// Nothing was dealt.
    #[error("deck exhausted: needed {needed} {kind} card(s), only {available} left")]
    Exhausted {
        kind: CardKind,
        needed: usize,
        available: usize,
    },
}
