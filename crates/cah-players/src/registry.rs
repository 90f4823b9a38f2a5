//! The player registry: who is in a game, what they hold, what they scored.
//!
//! # Concurrency note
//!
//! `PlayerRegistry` is NOT thread-safe by itself. It is a plain
//! `HashMap`. It is owned by one `GameSession`, which in turn is owned by
//! one lobby task, so every mutation is already serialized above it.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use cah_cards::WhiteCard;
use cah_protocol::PlayerId;

use crate::{Player, PlayerError, PlayerStatus};

/// Tracks every player who ever joined one game.
///
/// ## Lifecycle
///
/// ```text
/// join() ──→ [Active] ──→ leave() / remove() ──→ [Left] / [Removed]
///               ↑                                      │
///               └──────────────── join() ──────────────┘
/// ```
///
/// Departed players are kept (with an empty hand) so their score still
/// shows in the final standings and a re-join keeps their place in the
/// judge rotation.
pub struct PlayerRegistry {
    players: HashMap<PlayerId, Player>,
    next_seq: u64,
    min_players: usize,
}

impl PlayerRegistry {
    /// Creates an empty registry. `min_players` is the number of active
    /// players needed to keep choosing judges.
    pub fn new(min_players: usize) -> Self {
        Self {
            players: HashMap::new(),
            next_seq: 0,
            min_players,
        }
    }

    /// Adds a player, or reactivates one who left or was removed.
    ///
    /// A returning player keeps their score and join order.
    ///
    /// # Errors
    /// Returns [`PlayerError::AlreadyJoined`] if the player is active.
    pub fn join(&mut self, id: PlayerId, name: impl Into<String>) -> Result<&Player, PlayerError> {
        let name = name.into();
        match self.players.entry(id) {
            Entry::Occupied(entry) => {
                let existing = entry.into_mut();
                if existing.is_active() {
                    return Err(PlayerError::AlreadyJoined(id));
                }
                existing.status = PlayerStatus::Active;
                existing.name = name;
                tracing::info!(player_id = %id, score = existing.score, "player rejoined");
                Ok(&*existing)
            }
            Entry::Vacant(entry) => {
                let join_seq = self.next_seq;
                self.next_seq += 1;
                tracing::info!(player_id = %id, join_seq, "player joined");
                Ok(&*entry.insert(Player {
                    id,
                    name,
                    join_seq,
                    hand: Vec::new(),
                    score: 0,
                    status: PlayerStatus::Active,
                }))
            }
        }
    }

    /// Marks a player as `Left` and hands back the cards they held.
    ///
    /// The registry only clears the hand; putting the cards on the discard
    /// pile is the caller's job.
    ///
    /// # Errors
    /// - [`PlayerError::UnknownPlayer`] — never joined
    /// - [`PlayerError::NotActive`] — already gone (a repeated leave)
    pub fn leave(&mut self, id: PlayerId) -> Result<Vec<WhiteCard>, PlayerError> {
        self.depart(id, PlayerStatus::Left)
    }

    /// Same as [`leave`](Self::leave) but records a host removal.
    pub fn remove(&mut self, id: PlayerId) -> Result<Vec<WhiteCard>, PlayerError> {
        self.depart(id, PlayerStatus::Removed)
    }

    fn depart(&mut self, id: PlayerId, status: PlayerStatus) -> Result<Vec<WhiteCard>, PlayerError> {
        let player = self
            .players
            .get_mut(&id)
            .ok_or(PlayerError::UnknownPlayer(id))?;
        if !player.is_active() {
            return Err(PlayerError::NotActive(id));
        }
        player.status = status;
        let hand = std::mem::take(&mut player.hand);
        tracing::info!(player_id = %id, ?status, returned = hand.len(), "player departed");
        Ok(hand)
    }

    /// Adds `delta` to a player's score and returns the new score.
    pub fn record_score(&mut self, id: PlayerId, delta: u32) -> Result<u32, PlayerError> {
        let player = self
            .players
            .get_mut(&id)
            .ok_or(PlayerError::UnknownPlayer(id))?;
        player.score += delta;
        Ok(player.score)
    }

    /// Picks the judge after `current`: the next active player in join
    /// order, wrapping around. With no current judge, the first active
    /// joiner. `current` may have left already; rotation still continues
    /// from their place.
    ///
    /// # Errors
    /// [`PlayerError::InsufficientPlayers`] if fewer than `min_players` are
    /// active.
    pub fn next_judge(&self, current: Option<PlayerId>) -> Result<PlayerId, PlayerError> {
        let active = self.active_in_order();
        if active.len() < self.min_players || active.is_empty() {
            return Err(PlayerError::InsufficientPlayers {
                active: active.len(),
                required: self.min_players,
            });
        }

        let after = current
            .and_then(|id| self.players.get(&id))
            .map(|p| p.join_seq);
        let next = match after {
            None => active[0],
            Some(seq) => active
                .iter()
                .copied()
                .find(|p| p.join_seq > seq)
                .unwrap_or(active[0]),
        };
        Ok(next.id)
    }

    /// Appends freshly dealt cards to the end of an active player's hand.
    pub fn top_up(&mut self, id: PlayerId, cards: Vec<WhiteCard>) -> Result<(), PlayerError> {
        let player = self.active_mut(id)?;
        player.hand.extend(cards);
        Ok(())
    }

    /// Removes the cards at `indices` from a player's hand and returns them
    /// in the order of `indices`. The remaining cards keep their relative
    /// order.
    ///
    /// Indices must be in range and distinct; the round validates them
    /// before calling, so a bad index here is an engine bug and panics.
    pub fn take_cards(&mut self, id: PlayerId, indices: &[usize]) -> Result<Vec<WhiteCard>, PlayerError> {
        let player = self.active_mut(id)?;
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), indices.len(), "duplicate hand index in {indices:?}");
        assert!(
            sorted.last().is_none_or(|&i| i < player.hand.len()),
            "hand index out of range: {indices:?} for a hand of {}",
            player.hand.len()
        );

        let cards: Vec<WhiteCard> = indices.iter().map(|&i| player.hand[i].clone()).collect();
        for &i in sorted.iter().rev() {
            player.hand.remove(i);
        }
        Ok(cards)
    }

    /// How many cards a player is short of `hand_size`.
    pub fn hand_deficit(&self, id: PlayerId, hand_size: usize) -> usize {
        self.players
            .get(&id)
            .map_or(0, |p| hand_size.saturating_sub(p.hand.len()))
    }

    pub fn hand(&self, id: PlayerId) -> Result<&[WhiteCard], PlayerError> {
        self.players
            .get(&id)
            .map(|p| p.hand.as_slice())
            .ok_or(PlayerError::UnknownPlayer(id))
    }

    pub fn get(&self, id: &PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn is_active(&self, id: PlayerId) -> bool {
        self.players.get(&id).is_some_and(Player::is_active)
    }

    /// Active player ids in join order.
    pub fn active_ids(&self) -> Vec<PlayerId> {
        self.active_in_order().iter().map(|p| p.id).collect()
    }

    pub fn active_count(&self) -> usize {
        self.players.values().filter(|p| p.is_active()).count()
    }

    pub fn min_players(&self) -> usize {
        self.min_players
    }

    /// Every player who ever joined, in join order.
    pub fn players(&self) -> Vec<&Player> {
        let mut all: Vec<&Player> = self.players.values().collect();
        all.sort_by_key(|p| p.join_seq);
        all
    }

    /// Every player who ever joined, best score first; ties go to the
    /// earlier joiner.
    pub fn standings(&self) -> Vec<&Player> {
        let mut all = self.players();
        all.sort_by(|a, b| b.score.cmp(&a.score).then(a.join_seq.cmp(&b.join_seq)));
        all
    }

    /// Number of players who ever joined (any status).
    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    fn active_in_order(&self) -> Vec<&Player> {
        let mut active: Vec<&Player> = self.players.values().filter(|p| p.is_active()).collect();
        active.sort_by_key(|p| p.join_seq);
        active
    }

    fn active_mut(&mut self, id: PlayerId) -> Result<&mut Player, PlayerError> {
        let player = self
            .players
            .get_mut(&id)
            .ok_or(PlayerError::UnknownPlayer(id))?;
        if !player.is_active() {
            return Err(PlayerError::NotActive(id));
        }
        Ok(player)
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `PlayerRegistry`.
    //!
    //! Naming follows `test_{function}_{scenario}_{expected}`.

    use cah_cards::{Catalog, Deck, GameRng};

    use super::*;

    fn pid(id: u64) -> PlayerId {
        PlayerId(id)
    }

    fn registry_with(n: u64) -> PlayerRegistry {
        let mut reg = PlayerRegistry::new(3);
        for i in 1..=n {
            reg.join(pid(i), format!("player{i}")).unwrap();
        }
        reg
    }

    fn some_cards(n: usize) -> Vec<WhiteCard> {
        let white: Vec<String> = (0..n).map(|i| format!("card{i}")).collect();
        let json = serde_json::json!({ "white": white, "black": [] });
        let catalog = Catalog::from_json(&json.to_string()).unwrap();
        let mut deck = Deck::new(&catalog.select_all(), GameRng::seeded(0));
        deck.deal(n).unwrap()
    }

    // =====================================================================
    // join()
    // =====================================================================

    #[test]
    fn test_join_new_player_is_active_with_empty_hand() {
        let mut reg = PlayerRegistry::new(3);

        let player = reg.join(pid(1), "alice").unwrap();

        assert!(player.is_active());
        assert_eq!(player.name, "alice");
        assert_eq!(player.score, 0);
        assert!(player.hand.is_empty());
    }

    #[test]
    fn test_join_already_active_returns_error() {
        let mut reg = registry_with(1);

        let result = reg.join(pid(1), "again");

        assert!(matches!(result, Err(PlayerError::AlreadyJoined(p)) if p == pid(1)));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_join_after_leave_reactivates_same_entry() {
        let mut reg = registry_with(2);
        reg.record_score(pid(1), 2).unwrap();
        reg.leave(pid(1)).unwrap();

        let player = reg.join(pid(1), "alice-2").unwrap();

        assert!(player.is_active());
        assert_eq!(player.score, 2);
        assert_eq!(player.join_seq, 0);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_join_after_remove_reactivates() {
        let mut reg = registry_with(1);
        reg.remove(pid(1)).unwrap();

        assert!(reg.join(pid(1), "back").is_ok());
        assert!(reg.is_active(pid(1)));
    }

    // =====================================================================
    // leave() / remove()
    // =====================================================================

    #[test]
    fn test_leave_returns_hand_and_clears_it() {
        let mut reg = registry_with(1);
        reg.top_up(pid(1), some_cards(4)).unwrap();

        let returned = reg.leave(pid(1)).unwrap();

        assert_eq!(returned.len(), 4);
        let player = reg.get(&pid(1)).unwrap();
        assert_eq!(player.status, PlayerStatus::Left);
        assert!(player.hand.is_empty());
    }

    #[test]
    fn test_leave_twice_second_is_not_active() {
        let mut reg = registry_with(1);
        reg.top_up(pid(1), some_cards(2)).unwrap();
        reg.leave(pid(1)).unwrap();

        let second = reg.leave(pid(1));

        assert!(matches!(second, Err(PlayerError::NotActive(p)) if p == pid(1)));
    }

    #[test]
    fn test_leave_unknown_player_returns_error() {
        let mut reg = registry_with(1);
        assert!(matches!(
            reg.leave(pid(9)),
            Err(PlayerError::UnknownPlayer(p)) if p == pid(9)
        ));
    }

    #[test]
    fn test_remove_marks_removed() {
        let mut reg = registry_with(2);

        reg.remove(pid(2)).unwrap();

        assert_eq!(reg.get(&pid(2)).unwrap().status, PlayerStatus::Removed);
        assert_eq!(reg.active_count(), 1);
    }

    // =====================================================================
    // next_judge()
    // =====================================================================

    #[test]
    fn test_next_judge_none_is_first_joiner() {
        let reg = registry_with(3);
        assert_eq!(reg.next_judge(None).unwrap(), pid(1));
    }

    #[test]
    fn test_next_judge_rotates_in_join_order_and_wraps() {
        let reg = registry_with(3);

        assert_eq!(reg.next_judge(Some(pid(1))).unwrap(), pid(2));
        assert_eq!(reg.next_judge(Some(pid(2))).unwrap(), pid(3));
        assert_eq!(reg.next_judge(Some(pid(3))).unwrap(), pid(1));
    }

    #[test]
    fn test_next_judge_skips_departed_players() {
        let mut reg = registry_with(4);
        reg.leave(pid(2)).unwrap();

        assert_eq!(reg.next_judge(Some(pid(1))).unwrap(), pid(3));
    }

    #[test]
    fn test_next_judge_continues_from_departed_judge() {
        let mut reg = registry_with(4);
        reg.leave(pid(2)).unwrap();

        // pid(2) was judge and left: the rotation goes on from their seat.
        assert_eq!(reg.next_judge(Some(pid(2))).unwrap(), pid(3));
    }

    #[test]
    fn test_next_judge_below_minimum_returns_error() {
        let mut reg = registry_with(3);
        reg.leave(pid(3)).unwrap();

        assert_eq!(
            reg.next_judge(Some(pid(1))),
            Err(PlayerError::InsufficientPlayers {
                active: 2,
                required: 3,
            })
        );
    }

    // =====================================================================
    // hands
    // =====================================================================

    #[test]
    fn test_take_cards_returns_in_requested_order() {
        let mut reg = registry_with(1);
        let cards = some_cards(5);
        reg.top_up(pid(1), cards.clone()).unwrap();

        let taken = reg.take_cards(pid(1), &[3, 0]).unwrap();

        assert_eq!(taken, vec![cards[3].clone(), cards[0].clone()]);
        let left = reg.hand(pid(1)).unwrap();
        assert_eq!(left, &[cards[1].clone(), cards[2].clone(), cards[4].clone()][..]);
    }

    #[test]
    #[should_panic(expected = "hand index out of range")]
    fn test_take_cards_out_of_range_panics() {
        let mut reg = registry_with(1);
        reg.top_up(pid(1), some_cards(2)).unwrap();
        let _ = reg.take_cards(pid(1), &[2]);
    }

    #[test]
    fn test_top_up_departed_player_returns_error() {
        let mut reg = registry_with(1);
        reg.leave(pid(1)).unwrap();

        assert!(matches!(
            reg.top_up(pid(1), some_cards(1)),
            Err(PlayerError::NotActive(_))
        ));
    }

    #[test]
    fn test_hand_deficit() {
        let mut reg = registry_with(1);
        reg.top_up(pid(1), some_cards(3)).unwrap();

        assert_eq!(reg.hand_deficit(pid(1), 10), 7);
        assert_eq!(reg.hand_deficit(pid(1), 2), 0);
    }

    // =====================================================================
    // scores
    // =====================================================================

    #[test]
    fn test_record_score_accumulates() {
        let mut reg = registry_with(1);
        reg.record_score(pid(1), 1).unwrap();
        assert_eq!(reg.record_score(pid(1), 1).unwrap(), 2);
    }

    #[test]
    fn test_standings_sorted_by_score_then_join_order() {
        let mut reg = registry_with(4);
        reg.record_score(pid(3), 2).unwrap();
        reg.record_score(pid(2), 1).unwrap();
        reg.record_score(pid(4), 1).unwrap();
        reg.leave(pid(4)).unwrap();

        let order: Vec<PlayerId> = reg.standings().iter().map(|p| p.id).collect();

        assert_eq!(order, vec![pid(3), pid(2), pid(4), pid(1)]);
    }
}
