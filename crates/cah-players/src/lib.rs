//! Player registry for the CAH engine.
//!
//! This crate tracks everyone who ever joined a game:
//!
//! 1. **Membership**: join, leave, host removal, re-join ([`PlayerRegistry`])
//! 2. **Hands**: the ordered white cards each player holds
//! 3. **Scores**: awarded only by round resolution
//! 4. **Judge rotation**: stable join order, wrapping around
//!
//! # How it fits in the stack
//!
//! ```text
//! Game layer (above)   ← sessions and rounds read/write players here
//!     ↕
//! Player layer (this crate)
//!     ↕
//! Cards + Protocol (below)  ← WhiteCard, PlayerId
//! ```

mod error;
mod player;
mod registry;

pub use error::PlayerError;
pub use player::{Player, PlayerStatus};
pub use registry::PlayerRegistry;
