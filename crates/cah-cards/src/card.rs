//! Card value types.
//!
//! Fields are private and there are no public constructors: a card only
//! comes into existence inside [`Catalog`](crate::Catalog) loading, after
//! its source record has been validated.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Catalog-unique identity of one card instance.
///
/// Two cards with the same text (e.g. the same joke in two packs) are
/// still different instances with different ids.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CardId(u32);

impl CardId {
    pub(crate) fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw numeric id.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

/// Identifier of a pack: its key in the catalog's `packs` mapping.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackId(String);

impl PackId {
    pub(crate) fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which colour of card an operation is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardKind {
    White,
    Black,
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::White => write!(f, "white"),
            Self::Black => write!(f, "black"),
        }
    }
}

/// An answer card.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct WhiteCard {
    id: CardId,
    text: String,
    pack: PackId,
}

impl WhiteCard {
    pub(crate) fn new(id: CardId, text: String, pack: PackId) -> Self {
        Self { id, text, pack }
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The pack this card was loaded from.
    pub fn pack(&self) -> &PackId {
        &self.pack
    }
}

/// A prompt card: text with blanks plus the number of white cards each
/// player must play on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BlackCard {
    id: CardId,
    text: String,
    pick: usize,
    pack: PackId,
}

impl BlackCard {
    pub(crate) fn new(id: CardId, text: String, pick: usize, pack: PackId) -> Self {
        debug_assert!(pick >= 1, "pick count validated by the loader");
        Self {
            id,
            text,
            pick,
            pack,
        }
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// How many white cards a submission for this prompt must contain.
    /// Always at least 1.
    pub fn pick(&self) -> usize {
        self.pick
    }

    pub fn pack(&self) -> &PackId {
        &self.pack
    }
}
