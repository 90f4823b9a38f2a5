//! Player types: the data the registry keeps per participant.

use cah_cards::WhiteCard;
use cah_protocol::PlayerId;
use serde::Serialize;

/// Where a player stands in the game's membership lifecycle.
///
/// ```text
///   Active ──(leave)──→ Left
///     │ ↑                │
///     │ └───(re-join)────┘
///     └────(remove)──→ Removed ──(re-join)──→ Active
/// ```
///
/// `Left` and `Removed` behave the same; the split only tells the
/// platform layer whether to say "left" or "was removed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlayerStatus {
    Active,
    Left,
    Removed,
}

impl PlayerStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// One participant.
///
/// `join_seq` is assigned on first join and never changes, so join order
/// survives a leave and re-join. The hand is numbered by position: index 0
/// is the first card shown to the player.
#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub join_seq: u64,
    pub hand: Vec<WhiteCard>,
    pub score: u32,
    pub status: PlayerStatus,
}

impl Player {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}
