//! Game configuration, game modes, and the session phase machine.

use serde::{Deserialize, Serialize};

use crate::GameError;

// ---------------------------------------------------------------------------
// GameConfig
// ---------------------------------------------------------------------------

/// Rules knobs shared by every lobby of an engine.
///
/// Missing fields fall back to [`GameConfig::default`], so a platform layer
/// can deserialize a partial config:
///
/// ```
/// use cah_game::GameConfig;
///
/// let config: GameConfig = serde_json::from_str(r#"{ "hand_size": 7 }"#).unwrap();
/// assert_eq!(config.hand_size, 7);
/// assert_eq!(config.min_players, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Cards each player holds after a top-up.
    pub hand_size: usize,

    /// Active players needed to begin, and to keep playing.
    pub min_players: usize,

    /// Target score for a full game when the host gives none.
    pub default_win_score: u32,

    /// Highest target score a host may ask for.
    pub max_win_score: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            hand_size: 10,
            min_players: 3,
            default_win_score: 7,
            max_win_score: 50,
        }
    }
}

impl GameConfig {
    /// Checks the knobs against each other.
    ///
    /// # Errors
    /// [`GameError::InvalidConfig`] naming the offending field.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.hand_size == 0 {
            return Err(GameError::InvalidConfig("hand_size must be at least 1".into()));
        }
        if self.min_players < 2 {
            return Err(GameError::InvalidConfig("min_players must be at least 2".into()));
        }
        if self.max_win_score == 0 {
            return Err(GameError::InvalidConfig("max_win_score must be at least 1".into()));
        }
        if self.default_win_score == 0 || self.default_win_score > self.max_win_score {
            return Err(GameError::InvalidConfig(format!(
                "default_win_score must be between 1 and {}",
                self.max_win_score
            )));
        }
        Ok(())
    }

    /// The mode for a plain full game at the default target.
    pub fn default_mode(&self) -> GameMode {
        GameMode::Full {
            target_score: self.default_win_score,
        }
    }
}

// ---------------------------------------------------------------------------
// GameMode
// ---------------------------------------------------------------------------

/// How a session decides it is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// Play rounds until someone reaches `target_score`.
    Full { target_score: u32 },
    /// Play exactly one resolved round.
    QuickRound,
}

impl GameMode {
    pub fn target_score(&self) -> Option<u32> {
        match self {
            Self::Full { target_score } => Some(*target_score),
            Self::QuickRound => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// The lifecycle phase of a game session.
///
/// ```text
/// Lobby → InRound → Finished
///   └──── end() ──────↗
/// ```
///
/// - **Lobby**: players are joining; no cards are dealt.
/// - **InRound**: rounds are being played, one after another.
/// - **Finished**: terminal. Scores are final.
///
/// Only `end()` may skip `InRound`; every other transition goes through
/// [`Phase::can_transition_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Lobby,
    InRound,
    Finished,
}

impl Phase {
    /// Returns `true` while players may still join.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Lobby)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished)
    }

    /// The phase that follows this one, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Lobby => Some(Self::InRound),
            Self::InRound => Some(Self::Finished),
            Self::Finished => None,
        }
    }

    /// Returns `true` if transitioning to `target` is valid.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lobby => write!(f, "Lobby"),
            Self::InRound => write!(f, "InRound"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_next_follows_strict_order() {
        assert_eq!(Phase::Lobby.next(), Some(Phase::InRound));
        assert_eq!(Phase::InRound.next(), Some(Phase::Finished));
        assert_eq!(Phase::Finished.next(), None);
    }

    #[test]
    fn test_phase_can_transition_to() {
        assert!(Phase::Lobby.can_transition_to(Phase::InRound));
        assert!(!Phase::Lobby.can_transition_to(Phase::Finished));
        assert!(!Phase::Finished.can_transition_to(Phase::Lobby));
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Lobby.to_string(), "Lobby");
        assert_eq!(Phase::InRound.to_string(), "InRound");
    }

    #[test]
    fn test_game_config_default() {
        let config = GameConfig::default();
        assert_eq!(config.hand_size, 10);
        assert_eq!(config.min_players, 3);
        assert_eq!(config.default_win_score, 7);
        assert_eq!(config.max_win_score, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_game_config_validate_rejects_bad_values() {
        let cases = [
            GameConfig { hand_size: 0, ..GameConfig::default() },
            GameConfig { min_players: 1, ..GameConfig::default() },
            GameConfig { default_win_score: 0, ..GameConfig::default() },
            GameConfig { default_win_score: 51, ..GameConfig::default() },
        ];
        for config in cases {
            assert!(
                matches!(config.validate(), Err(GameError::InvalidConfig(_))),
                "{config:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_game_config_partial_json_uses_defaults() {
        let config: GameConfig = serde_json::from_str(r#"{ "min_players": 4 }"#).unwrap();
        assert_eq!(config.min_players, 4);
        assert_eq!(config.hand_size, 10);
    }

    #[test]
    fn test_game_mode_target_score() {
        assert_eq!(GameMode::Full { target_score: 5 }.target_score(), Some(5));
        assert_eq!(GameMode::QuickRound.target_score(), None);
        assert_eq!(
            GameConfig::default().default_mode(),
            GameMode::Full { target_score: 7 }
        );
    }
}
