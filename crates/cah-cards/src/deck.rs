//! Per-game draw and discard piles.
//!
//! ```text
//!            deal / draw_prompt                 discard / discard_prompt
//!   draw ──────────────────────→ hands, rounds ──────────────────────→ discard
//!    ↑                                                                    │
//!    └──────────────── reshuffle (only when draw runs dry) ──────────────┘
//! ```
//!
//! The top of a pile is the end of its `Vec`.

use serde::Serialize;

use crate::{BlackCard, CardKind, DeckError, GameRng, PackSelection, WhiteCard};

/// Pile sizes, for status reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeckStats {
    pub white_draw: usize,
    pub white_discard: usize,
    pub black_draw: usize,
    pub black_discard: usize,
}

/// One game's cards that are not in a hand or a live round.
#[derive(Debug)]
pub struct Deck {
    white_draw: Vec<WhiteCard>,
    white_discard: Vec<WhiteCard>,
    black_draw: Vec<BlackCard>,
    black_discard: Vec<BlackCard>,
    rng: GameRng,
}

impl Deck {
    /// Builds shuffled draw piles from every card in the selected packs.
    /// Both discard piles start empty.
    pub fn new(selection: &PackSelection, mut rng: GameRng) -> Self {
        let mut white_draw: Vec<WhiteCard> = selection.white_cards().cloned().collect();
        let mut black_draw: Vec<BlackCard> = selection.black_cards().cloned().collect();
        rng.shuffle(&mut white_draw);
        rng.shuffle(&mut black_draw);

        tracing::debug!(
            white = white_draw.len(),
            black = black_draw.len(),
            seed = rng.seed(),
            "deck built"
        );

        Self {
            white_draw,
            white_discard: Vec::new(),
            black_draw,
            black_discard: Vec::new(),
            rng,
        }
    }

    /// Takes `count` white cards off the top of the draw pile.
    ///
    /// If the draw pile runs dry part-way, the discard pile is shuffled
    /// into it and dealing continues.
    ///
    /// # Errors
    /// [`DeckError::Exhausted`] if draw and discard together hold fewer
    /// than `count` cards. Nothing is dealt in that case.
    pub fn deal(&mut self, count: usize) -> Result<Vec<WhiteCard>, DeckError> {
        let available = self.white_available();
        if count > available {
            return Err(DeckError::Exhausted {
                kind: CardKind::White,
                needed: count,
                available,
            });
        }

        let mut cards = Vec::with_capacity(count);
        for _ in 0..count {
            if self.white_draw.is_empty() {
                self.reshuffle_white();
            }
            match self.white_draw.pop() {
                Some(card) => cards.push(card),
                None => unreachable!("availability checked before dealing"),
            }
        }
        tracing::trace!(count, remaining = self.white_draw.len(), "white cards dealt");
        Ok(cards)
    }

    /// Takes the top prompt card, reshuffling the black discard pile in
    /// first if the draw pile is empty.
    ///
    /// # Errors
    /// [`DeckError::Exhausted`] if there is no black card left anywhere.
    pub fn draw_prompt(&mut self) -> Result<BlackCard, DeckError> {
        if self.black_draw.is_empty() {
            self.reshuffle_black();
        }
        self.black_draw.pop().ok_or(DeckError::Exhausted {
            kind: CardKind::Black,
            needed: 1,
            available: 0,
        })
    }

    /// Puts a prompt that was drawn but never played back on top of the
    /// draw pile, so the next [`draw_prompt`](Self::draw_prompt) returns it.
    pub fn return_prompt(&mut self, card: BlackCard) {
        self.black_draw.push(card);
    }

    /// Puts spent white cards on the discard pile.
    pub fn discard<I>(&mut self, cards: I)
    where
        I: IntoIterator<Item = WhiteCard>,
    {
        self.white_discard.extend(cards);
    }

    /// Puts a used (or aborted) prompt on the black discard pile.
    pub fn discard_prompt(&mut self, card: BlackCard) {
        self.black_discard.push(card);
    }

    /// White cards that can still be dealt (draw + discard).
    pub fn white_available(&self) -> usize {
        self.white_draw.len() + self.white_discard.len()
    }

    /// Black cards that can still be drawn (draw + discard).
    pub fn black_available(&self) -> usize {
        self.black_draw.len() + self.black_discard.len()
    }

    pub fn white_draw_pile(&self) -> &[WhiteCard] {
        &self.white_draw
    }

    pub fn white_discard_pile(&self) -> &[WhiteCard] {
        &self.white_discard
    }

    pub fn black_draw_pile(&self) -> &[BlackCard] {
        &self.black_draw
    }

    pub fn black_discard_pile(&self) -> &[BlackCard] {
        &self.black_discard
    }

    pub fn stats(&self) -> DeckStats {
        DeckStats {
            white_draw: self.white_draw.len(),
            white_discard: self.white_discard.len(),
            black_draw: self.black_draw.len(),
            black_discard: self.black_discard.len(),
        }
    }

    fn reshuffle_white(&mut self) {
        debug_assert!(self.white_draw.is_empty());
        std::mem::swap(&mut self.white_draw, &mut self.white_discard);
        self.rng.shuffle(&mut self.white_draw);
        tracing::info!(cards = self.white_draw.len(), "white discard reshuffled into draw pile");
    }

    fn reshuffle_black(&mut self) {
        debug_assert!(self.black_draw.is_empty());
        std::mem::swap(&mut self.black_draw, &mut self.black_discard);
        self.rng.shuffle(&mut self.black_draw);
        tracing::info!(cards = self.black_draw.len(), "black discard reshuffled into draw pile");
    }
}
