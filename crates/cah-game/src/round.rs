//! One round: prompt, judge, submissions, judgment.
//!
//! ```text
//!   begin() ──→ AwaitingSubmissions ──(last submission in)──→ AwaitingJudgment ──pick()──→ Resolved
//!                      │                                              │
//!                      └──────────────── abort() ─────────────────────┘
//! ```
//!
//! A `Round` never owns the deck or the players. The session lends them for
//! each call, and every call validates fully before it touches either.

use std::collections::HashMap;

use cah_cards::{BlackCard, CardKind, Deck, DeckError, GameRng, WhiteCard};
use cah_players::PlayerRegistry;
use cah_protocol::PlayerId;
use serde::Serialize;

use crate::{AbortReason, AnonymizedSubmission, GameError};

/// Where a round is in its own lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RoundState {
    AwaitingSubmissions,
    AwaitingJudgment,
    Resolved,
}

impl std::fmt::Display for RoundState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AwaitingSubmissions => write!(f, "AwaitingSubmissions"),
            Self::AwaitingJudgment => write!(f, "AwaitingJudgment"),
            Self::Resolved => write!(f, "Resolved"),
        }
    }
}

/// What a submit call achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// The player's submission now has all the cards the prompt asks for.
    pub complete: bool,
    /// Every eligible player is in; the round moved to judgment.
    pub all_in: bool,
}

/// The result of a valid pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub winner: PlayerId,
    pub cards: Vec<WhiteCard>,
    pub score: u32,
}

/// How an archived round ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RoundOutcome {
    Won {
        winner: PlayerId,
        cards: Vec<WhiteCard>,
    },
    Aborted {
        reason: AbortReason,
    },
}

/// A finished round, kept for history and status reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    pub number: u32,
    pub judge: PlayerId,
    pub prompt: BlackCard,
    pub outcome: RoundOutcome,
}

/// One live round.
#[derive(Debug)]
pub struct Round {
    number: u32,
    judge: PlayerId,
    prompt: BlackCard,
    state: RoundState,
    /// Non-judge players who must submit, in join order. Shrinks when one
    /// departs.
    eligible: Vec<PlayerId>,
    /// Hand indices chosen so far by players whose submission is not yet
    /// complete. The cards stay in the hand until completion.
    pending: HashMap<PlayerId, Vec<usize>>,
    /// Complete submissions. Shuffled once the round reaches judgment;
    /// from then on the position is the index the judge picks by.
    submissions: Vec<(PlayerId, Vec<WhiteCard>)>,
    winner: Option<PlayerId>,
    rng: GameRng,
}

impl Round {
    /// Starts round `number`.
    ///
    /// Picks the judge after `previous_judge`, draws the prompt, and tops up
    /// every active player (judge included) to `hand_size`, or to the
    /// prompt's pick count if that is larger. If the deck cannot cover the
    /// top-up, the prompt goes back on the draw pile and no hand changes.
    ///
    /// # Errors
    /// - [`PlayerError::InsufficientPlayers`](cah_players::PlayerError) — too few active players
    /// - [`DeckError::Exhausted`] — not enough cards for the prompt or the deal
    pub fn begin(
        number: u32,
        previous_judge: Option<PlayerId>,
        players: &mut PlayerRegistry,
        deck: &mut Deck,
        hand_size: usize,
        rng: GameRng,
    ) -> Result<Self, GameError> {
        let judge = players.next_judge(previous_judge)?;
        let active = players.active_ids();

        let prompt = deck.draw_prompt()?;
        let target = hand_size.max(prompt.pick());
        let top_ups: Vec<(PlayerId, usize)> = active
            .iter()
            .map(|&id| (id, players.hand_deficit(id, target)))
            .collect();
        let needed: usize = top_ups.iter().map(|(_, count)| count).sum();
        if needed > deck.white_available() {
            let available = deck.white_available();
            deck.return_prompt(prompt);
            return Err(DeckError::Exhausted {
                kind: CardKind::White,
                needed,
                available,
            }
            .into());
        }

        for (id, count) in top_ups {
            if count > 0 {
                let cards = deck.deal(count)?;
                players.top_up(id, cards)?;
            }
        }

        let eligible: Vec<PlayerId> = active.into_iter().filter(|&id| id != judge).collect();
        tracing::info!(
            round = number,
            %judge,
            pick = prompt.pick(),
            players = eligible.len(),
            dealt = needed,
            "round started"
        );

        Ok(Self {
            number,
            judge,
            prompt,
            state: RoundState::AwaitingSubmissions,
            eligible,
            pending: HashMap::new(),
            submissions: Vec::new(),
            winner: None,
            rng,
        })
    }

    /// Adds cards (by hand index) to `player`'s submission.
    ///
    /// One card at a time and whole batches both work; the order of the
    /// indices across calls is the order the cards fill the blanks. When the
    /// submission reaches the prompt's pick count, the cards leave the
    /// player's hand. When the last eligible player completes, the
    /// submissions are shuffled and the round moves to judgment.
    ///
    /// # Errors
    /// - [`GameError::InvalidSubmission`] — wrong state, judge submitting,
    ///   player not in this round, already complete, too many cards, or a
    ///   card chosen twice
    /// - [`GameError::CardNotInHand`] — an index past the end of the hand
    pub fn submit(
        &mut self,
        player: PlayerId,
        indices: &[usize],
        players: &mut PlayerRegistry,
    ) -> Result<SubmitOutcome, GameError> {
        if self.state != RoundState::AwaitingSubmissions {
            return Err(GameError::InvalidSubmission(format!(
                "round {} is not taking submissions",
                self.number
            )));
        }
        if player == self.judge {
            return Err(GameError::InvalidSubmission(
                "the judge does not submit this round".into(),
            ));
        }
        if !self.eligible.contains(&player) {
            return Err(GameError::InvalidSubmission(format!(
                "player {player} is not playing this round"
            )));
        }
        if self.has_submitted(player) {
            return Err(GameError::InvalidSubmission(
                "submission already complete".into(),
            ));
        }
        if indices.is_empty() {
            return Err(GameError::InvalidSubmission("no cards given".into()));
        }

        let pick = self.prompt.pick();
        let pending = self.pending.get(&player).map_or(&[][..], Vec::as_slice);
        if pending.len() + indices.len() > pick {
            return Err(GameError::InvalidSubmission(format!(
                "this prompt takes {pick} card(s), {} already chosen",
                pending.len()
            )));
        }
        let hand_len = players.hand(player)?.len();
        for (i, &index) in indices.iter().enumerate() {
            if index >= hand_len {
                return Err(GameError::CardNotInHand(index));
            }
            if pending.contains(&index) || indices[..i].contains(&index) {
                return Err(GameError::InvalidSubmission(format!(
                    "card {index} is already part of this submission"
                )));
            }
        }

        let mut chosen = self.pending.remove(&player).unwrap_or_default();
        chosen.extend_from_slice(indices);
        if chosen.len() < pick {
            tracing::debug!(round = self.number, %player, chosen = chosen.len(), pick, "partial submission");
            self.pending.insert(player, chosen);
            return Ok(SubmitOutcome {
                complete: false,
                all_in: false,
            });
        }

        let cards = players.take_cards(player, &chosen)?;
        self.submissions.push((player, cards));
        tracing::debug!(round = self.number, %player, "submission complete");

        let all_in = self.waiting_on().is_empty();
        if all_in {
            self.reveal();
        }
        Ok(SubmitOutcome {
            complete: true,
            all_in,
        })
    }

    /// The judge picks the submission at `index` of the revealed list.
    ///
    /// The winner scores a point, every submitted card goes to the white
    /// discard pile, and the prompt to the black one.
    ///
    /// # Errors
    /// - [`GameError::InvalidState`] — the round is already resolved
    /// - [`GameError::NotJudge`] — `player` is not this round's judge
    /// - [`GameError::JudgmentNotReady`] — submissions are still coming in
    /// - [`GameError::InvalidPick`] — `index` is out of range
    pub fn pick(
        &mut self,
        player: PlayerId,
        index: usize,
        players: &mut PlayerRegistry,
        deck: &mut Deck,
    ) -> Result<Resolution, GameError> {
        if self.state == RoundState::Resolved {
            return Err(GameError::InvalidState(format!(
                "round {} is already resolved",
                self.number
            )));
        }
        if player != self.judge {
            return Err(GameError::NotJudge(player));
        }
        if self.state == RoundState::AwaitingSubmissions {
            return Err(GameError::JudgmentNotReady);
        }
        let (winner, cards) = self
            .submissions
            .get(index)
            .cloned()
            .ok_or(GameError::InvalidPick(index))?;

        let score = players.record_score(winner, 1)?;
        deck.discard(self.submissions.drain(..).flat_map(|(_, cards)| cards));
        deck.discard_prompt(self.prompt.clone());
        self.state = RoundState::Resolved;
        self.winner = Some(winner);

        tracing::info!(round = self.number, %winner, score, "round resolved");
        Ok(Resolution {
            winner,
            cards,
            score,
        })
    }

    /// Ends the round without a winner. Complete submissions go to the
    /// white discard pile, the prompt to the black one. Cards of a partial
    /// submission never left their hand and stay there.
    pub fn abort(self, reason: AbortReason, deck: &mut Deck) -> RoundSummary {
        let returned: usize = self.submissions.iter().map(|(_, cards)| cards.len()).sum();
        deck.discard(self.submissions.into_iter().flat_map(|(_, cards)| cards));
        deck.discard_prompt(self.prompt.clone());
        tracing::info!(round = self.number, ?reason, returned, "round aborted");

        RoundSummary {
            number: self.number,
            judge: self.judge,
            prompt: self.prompt,
            outcome: RoundOutcome::Aborted { reason },
        }
    }

    /// Takes a departed non-judge out of the round. A complete submission
    /// goes to the white discard pile; a partial one is forgotten.
    ///
    /// Returns `true` when the judge's list changed: either the departure
    /// completed the round, or an entry was dropped during judgment.
    pub fn withdraw(&mut self, player: PlayerId, deck: &mut Deck) -> bool {
        self.eligible.retain(|&id| id != player);
        self.pending.remove(&player);
        let withdrawn = match self.submissions.iter().position(|(id, _)| *id == player) {
            Some(pos) => {
                let (_, cards) = self.submissions.remove(pos);
                deck.discard(cards);
                true
            }
            None => false,
        };

        match self.state {
            RoundState::AwaitingSubmissions => {
                if !self.eligible.is_empty() && self.waiting_on().is_empty() {
                    self.reveal();
                    true
                } else {
                    false
                }
            }
            RoundState::AwaitingJudgment => withdrawn,
            RoundState::Resolved => false,
        }
    }

    fn reveal(&mut self) {
        // Fix a seat order first so the shuffle depends on the seed alone,
        // not on who happened to submit first.
        let seats = &self.eligible;
        self.submissions
            .sort_by_key(|(id, _)| seats.iter().position(|seat| seat == id));
        self.rng.shuffle(&mut self.submissions);
        self.state = RoundState::AwaitingJudgment;
        tracing::debug!(round = self.number, submissions = self.submissions.len(), "all submitted");
    }

    fn has_submitted(&self, player: PlayerId) -> bool {
        self.submissions.iter().any(|(id, _)| *id == player)
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn judge(&self) -> PlayerId {
        self.judge
    }

    pub fn prompt(&self) -> &BlackCard {
        &self.prompt
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn eligible(&self) -> &[PlayerId] {
        &self.eligible
    }

    /// Players with a complete submission, in join order.
    pub fn submitted(&self) -> Vec<PlayerId> {
        self.eligible
            .iter()
            .copied()
            .filter(|&id| self.has_submitted(id))
            .collect()
    }

    /// Players the round is still waiting on, in join order.
    pub fn waiting_on(&self) -> Vec<PlayerId> {
        self.eligible
            .iter()
            .copied()
            .filter(|&id| !self.has_submitted(id))
            .collect()
    }

    /// The judge's list. Empty until the round reaches judgment.
    pub fn anonymized(&self) -> Vec<AnonymizedSubmission> {
        if self.state != RoundState::AwaitingJudgment {
            return Vec::new();
        }
        self.submissions
            .iter()
            .enumerate()
            .map(|(index, (_, cards))| AnonymizedSubmission {
                index,
                cards: cards.clone(),
            })
            .collect()
    }

    /// Who submitted what, in reveal order. Not for the judge's eyes.
    pub fn submissions(&self) -> &[(PlayerId, Vec<WhiteCard>)] {
        &self.submissions
    }

    /// Every white card the round holds (complete submissions only).
    pub fn held_cards(&self) -> impl Iterator<Item = &WhiteCard> {
        self.submissions.iter().flat_map(|(_, cards)| cards.iter())
    }
}

// =========================================================================
// Tests
// =========================================================================
