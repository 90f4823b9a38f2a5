//! The card catalog: loading, validation, and pack selection.
//!
//! Two source shapes are accepted:
//!
//! ```text
//! { "packs": { "<id>": { "name": .., "description": ..,
//!                        "white": [".."], "black": [{ "text": "..", "pick": 1 }] } } }
//!
//! { "white": [".."], "black": [{ "text": "..", "pick": 1 }] }      ← legacy
//! ```
//!
//! The legacy flat shape becomes a single pack with id [`DEFAULT_PACK_ID`].

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{BlackCard, CardId, CatalogError, PackId, WhiteCard};

/// Id given to the implicit pack of a legacy flat catalog.
pub const DEFAULT_PACK_ID: &str = "default";

const DEFAULT_PACK_NAME: &str = "Default";

// ---------------------------------------------------------------------------
// Source records (what the JSON looks like)
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct PackSource {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: String,
    white: Vec<String>,
    black: Vec<BlackSource>,
}

#[derive(Deserialize)]
struct LegacySource {
    white: Vec<String>,
    black: Vec<BlackSource>,
}

#[derive(Deserialize)]
struct BlackSource {
    text: String,
    pick: i64,
}

// ---------------------------------------------------------------------------
// Pack
// ---------------------------------------------------------------------------

/// A named group of cards. Immutable once loaded.
#[derive(Debug)]
pub struct Pack {
    id: PackId,
    name: String,
    description: String,
    white: Vec<WhiteCard>,
    black: Vec<BlackCard>,
}

impl Pack {
    pub fn id(&self) -> &PackId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn white(&self) -> &[WhiteCard] {
        &self.white
    }

    pub fn black(&self) -> &[BlackCard] {
        &self.black
    }

    fn stats(&self) -> PackStats {
        PackStats {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            white: self.white.len(),
            black: self.black.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// The validated card pool.
///
/// Read-only after load. Packs are reference-counted so selections made by
/// many lobbies share the same card data.
#[derive(Debug, Clone)]
pub struct Catalog {
    packs: BTreeMap<PackId, Arc<Pack>>,
}

impl Catalog {
    /// Parses and validates a catalog from a JSON string.
    ///
    /// # Errors
    /// - [`CatalogError::Malformed`] — bad JSON or a record with the wrong
    ///   shape (missing `white`/`black`, black card without `text`/`pick`,
    ///   pick below 1)
    /// - [`CatalogError::Empty`] — no packs at all
    pub fn from_json(source: &str) -> Result<Self, CatalogError> {
        let value: Value = serde_json::from_str(source)
            .map_err(|e| CatalogError::Malformed(e.to_string()))?;
        Self::from_value(value)
    }

    /// Same as [`from_json`](Self::from_json) for raw bytes.
    pub fn from_slice(source: &[u8]) -> Result<Self, CatalogError> {
        let value: Value = serde_json::from_slice(source)
            .map_err(|e| CatalogError::Malformed(e.to_string()))?;
        Self::from_value(value)
    }

    /// Reads and parses a catalog file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let catalog = Self::from_slice(&bytes)?;
        tracing::debug!(path = %path.display(), "catalog file read");
        Ok(catalog)
    }

    fn from_value(value: Value) -> Result<Self, CatalogError> {
        let Value::Object(mut root) = value else {
            return Err(CatalogError::Malformed(
                "catalog root must be an object".into(),
            ));
        };

        let sources: Vec<(String, PackSource)> = if let Some(packs) = root.remove("packs") {
            let Value::Object(packs) = packs else {
                return Err(CatalogError::Malformed("`packs` must be an object".into()));
            };
            packs
                .into_iter()
                .map(|(id, pack)| {
                    let source: PackSource = serde_json::from_value(pack)
                        .map_err(|e| CatalogError::Malformed(format!("pack `{id}`: {e}")))?;
                    Ok((id, source))
                })
                .collect::<Result<_, CatalogError>>()?
        } else if root.contains_key("white") || root.contains_key("black") {
            let legacy: LegacySource = serde_json::from_value(Value::Object(root))
                .map_err(|e| CatalogError::Malformed(e.to_string()))?;
            vec![(
                DEFAULT_PACK_ID.to_string(),
                PackSource {
                    name: Some(DEFAULT_PACK_NAME.to_string()),
                    description: String::new(),
                    white: legacy.white,
                    black: legacy.black,
                },
            )]
        } else {
            Vec::new()
        };

        if sources.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut next_id: u32 = 0;
        let mut packs = BTreeMap::new();
        for (id, source) in sources {
            let pack = build_pack(id, source, &mut next_id)?;
            packs.insert(pack.id.clone(), Arc::new(pack));
        }

        let catalog = Self { packs };
        tracing::debug!(
            packs = catalog.packs.len(),
            white = catalog.total_white(),
            black = catalog.total_black(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Selects packs by id, in the order given. Repeated ids are selected
    /// once.
    ///
    /// # Errors
    /// - [`CatalogError::NoPacksSelected`] — `ids` is empty
    /// - [`CatalogError::UnknownPack`] — an id is not in the catalog
    pub fn select<I, S>(&self, ids: I) -> Result<PackSelection, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut packs: Vec<Arc<Pack>> = Vec::new();
        for id in ids {
            let id = id.as_ref();
            let pack = self
                .packs
                .get(&PackId::new(id))
                .ok_or_else(|| CatalogError::UnknownPack(id.to_string()))?;
            if !packs.iter().any(|p| p.id == pack.id) {
                packs.push(Arc::clone(pack));
            }
        }
        if packs.is_empty() {
            return Err(CatalogError::NoPacksSelected);
        }
        Ok(PackSelection { packs })
    }

    /// Selects every pack in the catalog.
    pub fn select_all(&self) -> PackSelection {
        PackSelection {
            packs: self.packs.values().cloned().collect(),
        }
    }

    pub fn pack(&self, id: &str) -> Option<&Pack> {
        self.packs.get(&PackId::new(id)).map(|p| &**p)
    }

    /// Pack ids in catalog order.
    pub fn pack_ids(&self) -> impl Iterator<Item = &PackId> {
        self.packs.keys()
    }

    pub fn total_white(&self) -> usize {
        self.packs.values().map(|p| p.white.len()).sum()
    }

    pub fn total_black(&self) -> usize {
        self.packs.values().map(|p| p.black.len()).sum()
    }

    /// Per-pack and total card counts.
    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            packs: self.packs.values().map(|p| p.stats()).collect(),
            total_white: self.total_white(),
            total_black: self.total_black(),
        }
    }
}

fn build_pack(id: String, source: PackSource, next_id: &mut u32) -> Result<Pack, CatalogError> {
    let pack_id = PackId::new(id);
    let mut fresh_id = || {
        let id = CardId::new(*next_id);
        *next_id += 1;
        id
    };

    let white = source
        .white
        .into_iter()
        .map(|text| WhiteCard::new(fresh_id(), text, pack_id.clone()))
        .collect();

    let mut black = Vec::with_capacity(source.black.len());
    for (i, card) in source.black.into_iter().enumerate() {
        if card.pick < 1 {
            return Err(CatalogError::Malformed(format!(
                "pack `{pack_id}`: black card {i} has pick {}, must be at least 1",
                card.pick
            )));
        }
        let pick = usize::try_from(card.pick).map_err(|_| {
            CatalogError::Malformed(format!("pack `{pack_id}`: black card {i} pick is too large"))
        })?;
        black.push(BlackCard::new(fresh_id(), card.text, pick, pack_id.clone()));
    }

    Ok(Pack {
        name: source.name.unwrap_or_else(|| pack_id.to_string()),
        id: pack_id,
        description: source.description,
        white,
        black,
    })
}

// ---------------------------------------------------------------------------
// PackSelection
// ---------------------------------------------------------------------------

/// The packs one game plays with. Never empty.
#[derive(Debug, Clone)]
pub struct PackSelection {
    packs: Vec<Arc<Pack>>,
}

impl PackSelection {
    pub fn ids(&self) -> Vec<PackId> {
        self.packs.iter().map(|p| p.id.clone()).collect()
    }

    pub fn packs(&self) -> impl Iterator<Item = &Pack> {
        self.packs.iter().map(|p| &**p)
    }

    pub fn white_cards(&self) -> impl Iterator<Item = &WhiteCard> {
        self.packs.iter().flat_map(|p| p.white.iter())
    }

    pub fn black_cards(&self) -> impl Iterator<Item = &BlackCard> {
        self.packs.iter().flat_map(|p| p.black.iter())
    }

    pub fn total_white(&self) -> usize {
        self.packs.iter().map(|p| p.white.len()).sum()
    }

    pub fn total_black(&self) -> usize {
        self.packs.iter().map(|p| p.black.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Card counts for one pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackStats {
    pub id: PackId,
    pub name: String,
    pub description: String,
    pub white: usize,
    pub black: usize,
}

/// Card counts for a whole catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub packs: Vec<PackStats>,
    pub total_white: usize,
    pub total_black: usize,
}
