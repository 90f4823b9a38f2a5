//! The game session: one lobby's game from `start` to `Finished`.
//!
//! A `GameSession` binds the player registry, the deck and the live round.
//! Every public operation either fails with nothing changed, or applies
//! completely and returns the events it produced, in order:
//!
//! ```text
//! session.submit_card(player, 3)?  ──→  [(All, SubmissionReceived {..}),
//!                                        (All, AllSubmitted {..})]
//! ```
//!
//! The session is plain synchronous data. Serializing access to it is the
//! lobby actor's job.

use std::collections::HashSet;

use cah_cards::{BlackCard, Deck, DeckError, DeckStats, GameRng, PackSelection, WhiteCard};
use cah_players::{PlayerError, PlayerRegistry};
use cah_protocol::{LobbyId, PlayerId, Recipient};
use serde::Serialize;

use crate::{
    AbortReason, FinishReason, GameConfig, GameError, GameEvent, GameMode, Phase, Round,
    RoundOutcome, RoundState, RoundSummary, Standing,
};

/// Events produced by one operation, in the order they happened.
pub type Outbox = Vec<(Recipient, GameEvent)>;

/// A point-in-time report of a session. Never contains card content other
/// than the public prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameStatus {
    pub lobby: LobbyId,
    pub host: PlayerId,
    pub mode: GameMode,
    pub phase: Phase,
    /// Rounds started so far, aborted ones included.
    pub round: u32,
    pub judge: Option<PlayerId>,
    pub prompt: Option<BlackCard>,
    pub round_state: Option<RoundState>,
    pub submitted: Vec<PlayerId>,
    pub waiting_on: Vec<PlayerId>,
    pub scores: Vec<Standing>,
    /// Rounds archived in the history.
    pub rounds_played: usize,
    pub deck: Option<DeckStats>,
}

pub struct GameSession {
    lobby: LobbyId,
    host: PlayerId,
    mode: GameMode,
    config: GameConfig,
    phase: Phase,
    selection: PackSelection,
    players: PlayerRegistry,
    /// Built by `begin`.
    deck: Option<Deck>,
    /// `None` between rounds, and while waiting out a deck exhaustion.
    round: Option<Round>,
    rounds_started: u32,
    last_judge: Option<PlayerId>,
    history: Vec<RoundSummary>,
    rng: GameRng,
}

impl GameSession {
    /// Opens a lobby with `host` already joined.
    ///
    /// # Errors
    /// - [`GameError::InvalidConfig`] — `config` fails validation
    /// - [`GameError::InvalidTargetScore`] — target outside `1..=max_win_score`
    pub fn start(
        lobby: LobbyId,
        host: PlayerId,
        host_name: impl Into<String>,
        mode: GameMode,
        selection: PackSelection,
        config: GameConfig,
        rng: GameRng,
    ) -> Result<(Self, Outbox), GameError> {
        config.validate()?;
        if let GameMode::Full { target_score } = mode {
            if target_score == 0 || target_score > config.max_win_score {
                return Err(GameError::InvalidTargetScore {
                    requested: target_score,
                    max: config.max_win_score,
                });
            }
        }

        let host_name = host_name.into();
        let mut players = PlayerRegistry::new(config.min_players);
        players.join(host, host_name.clone())?;

        let packs = selection.ids();
        tracing::info!(lobby_id = %lobby, %host, ?mode, packs = packs.len(), seed = rng.seed(), "lobby opened");

        let session = Self {
            lobby,
            host,
            mode,
            config,
            phase: Phase::Lobby,
            selection,
            players,
            deck: None,
            round: None,
            rounds_started: 0,
            last_judge: None,
            history: Vec::new(),
            rng,
        };
        let events = vec![
            (Recipient::All, GameEvent::LobbyOpened { host, mode, packs }),
            (
                Recipient::All,
                GameEvent::PlayerJoined {
                    player: host,
                    name: host_name,
                },
            ),
        ];
        Ok((session, events))
    }

    /// Adds a player to the lobby. Only allowed before the game begins.
    pub fn join(&mut self, player: PlayerId, name: impl Into<String>) -> Result<Outbox, GameError> {
        if !self.phase.is_joinable() {
            return Err(GameError::InvalidState(match self.phase {
                Phase::Finished => "the game is over".into(),
                _ => "the game has already started".into(),
            }));
        }
        let joined = self.players.join(player, name)?;
        let event = GameEvent::PlayerJoined {
            player: joined.id,
            name: joined.name.clone(),
        };
        Ok(vec![(Recipient::All, event)])
    }

    /// A player leaves on their own. A second call fails with
    /// [`PlayerError::NotActive`] and changes nothing.
    pub fn leave(&mut self, player: PlayerId) -> Result<Outbox, GameError> {
        self.depart(player, false)
    }

    /// The host removes a player (an idle one, typically).
    pub fn remove(&mut self, actor: PlayerId, player: PlayerId) -> Result<Outbox, GameError> {
        self.require_host(actor)?;
        self.depart(player, true)
    }

    /// Builds the deck and starts round 1.
    ///
    /// # Errors
    /// - [`GameError::NotHost`], [`GameError::InvalidState`] (not in the lobby)
    /// - [`GameError::NotEnoughPlayers`]
    /// - [`GameError::Deck`] — the packs cannot supply the opening round;
    ///   the session stays in the lobby
    pub fn begin(&mut self, actor: PlayerId) -> Result<Outbox, GameError> {
        self.require_host(actor)?;
        if !self.phase.can_transition_to(Phase::InRound) {
            return Err(GameError::InvalidState(format!(
                "cannot begin from phase {}",
                self.phase
            )));
        }
        let active = self.players.active_count();
        if active < self.config.min_players {
            return Err(GameError::NotEnoughPlayers {
                active,
                required: self.config.min_players,
            });
        }

        self.deck = Some(Deck::new(&self.selection, self.rng.fork()));
        match self.open_round() {
            Ok(out) => {
                self.phase = Phase::InRound;
                tracing::info!(lobby_id = %self.lobby, players = active, "game begun");
                self.check_cards();
                Ok(out)
            }
            Err(err) => {
                self.deck = None;
                Err(err)
            }
        }
    }

    /// Host aborts the live round (idle judge or idle players) and starts
    /// the next one. With no live round, just retries starting one.
    pub fn skip(&mut self, actor: PlayerId) -> Result<Outbox, GameError> {
        self.require_host(actor)?;
        if self.phase != Phase::InRound {
            return Err(GameError::InvalidState(format!(
                "nothing to skip in phase {}",
                self.phase
            )));
        }
        let mut out = Vec::new();
        self.abort_round(AbortReason::Skipped, &mut out);
        self.advance(&mut out);
        self.check_cards();
        Ok(out)
    }

    /// Host stops the game. Scores so far are final.
    pub fn end(&mut self, actor: PlayerId) -> Result<Outbox, GameError> {
        self.require_host(actor)?;
        if self.phase.is_finished() {
            return Err(GameError::InvalidState("the game is already over".into()));
        }
        let mut out = Vec::new();
        self.abort_round(AbortReason::HostEnded, &mut out);
        self.finish(FinishReason::HostEnded, None, &mut out);
        self.check_cards();
        Ok(out)
    }

    pub fn submit_card(&mut self, player: PlayerId, index: usize) -> Result<Outbox, GameError> {
        self.submit_cards(player, &[index])
    }

    /// Adds cards, by hand index, to the player's submission for the live
    /// round. See [`Round::submit`].
    pub fn submit_cards(&mut self, player: PlayerId, indices: &[usize]) -> Result<Outbox, GameError> {
        let round = match (self.phase, self.round.as_mut()) {
            (Phase::InRound, Some(round)) => round,
            _ => {
                return Err(GameError::InvalidSubmission(
                    "no round is in progress".into(),
                ));
            }
        };
        let outcome = round.submit(player, indices, &mut self.players)?;

        let mut out = vec![(
            Recipient::All,
            GameEvent::SubmissionReceived {
                player,
                complete: outcome.complete,
                waiting_on: round.waiting_on(),
            },
        )];
        if outcome.all_in {
            out.push((
                Recipient::All,
                GameEvent::AllSubmitted {
                    round: round.number(),
                    submissions: round.anonymized(),
                },
            ));
        }
        self.check_cards();
        Ok(out)
    }

    /// The judge picks a winner. Then the game either finishes or moves on
    /// to the next round.
    pub fn pick(&mut self, player: PlayerId, index: usize) -> Result<Outbox, GameError> {
        let (Phase::InRound, Some(round), Some(deck)) =
            (self.phase, self.round.as_mut(), self.deck.as_mut())
        else {
            return Err(GameError::InvalidState("no round is being judged".into()));
        };
        let resolution = round.pick(player, index, &mut self.players, deck)?;
        let number = round.number();
        let summary = RoundSummary {
            number,
            judge: round.judge(),
            prompt: round.prompt().clone(),
            outcome: RoundOutcome::Won {
                winner: resolution.winner,
                cards: resolution.cards.clone(),
            },
        };
        self.round = None;
        self.history.push(summary);

        let winner = resolution.winner;
        let mut out = vec![(
            Recipient::All,
            GameEvent::RoundResolved {
                round: number,
                winner,
                cards: resolution.cards,
                score: resolution.score,
            },
        )];
        match self.mode {
            GameMode::QuickRound => {
                self.finish(FinishReason::QuickRoundComplete, Some(winner), &mut out);
            }
            GameMode::Full { target_score } if resolution.score >= target_score => {
                self.finish(FinishReason::TargetReached, Some(winner), &mut out);
            }
            GameMode::Full { .. } => self.advance(&mut out),
        }
        self.check_cards();
        Ok(out)
    }

    pub fn status(&self) -> GameStatus {
        let round = self.round.as_ref();
        GameStatus {
            lobby: self.lobby,
            host: self.host,
            mode: self.mode,
            phase: self.phase,
            round: self.rounds_started,
            judge: round.map(Round::judge),
            prompt: round.map(|r| r.prompt().clone()),
            round_state: round.map(Round::state),
            submitted: round.map(Round::submitted).unwrap_or_default(),
            waiting_on: round.map(Round::waiting_on).unwrap_or_default(),
            scores: self.standings(),
            rounds_played: self.history.len(),
            deck: self.deck.as_ref().map(Deck::stats),
        }
    }

    /// A player's current hand, in index order.
    pub fn hand(&self, player: PlayerId) -> Result<Vec<WhiteCard>, GameError> {
        Ok(self.players.hand(player)?.to_vec())
    }

    pub fn history(&self) -> &[RoundSummary] {
        &self.history
    }

    pub fn standings(&self) -> Vec<Standing> {
        self.players.standings().into_iter().map(Standing::from).collect()
    }

    pub fn lobby(&self) -> LobbyId {
        self.lobby
    }

    pub fn host(&self) -> PlayerId {
        self.host
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn players(&self) -> &PlayerRegistry {
        &self.players
    }

    pub fn deck(&self) -> Option<&Deck> {
        self.deck.as_ref()
    }

    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    // -----------------------------------------------------------------
    // internals
    // -----------------------------------------------------------------

    fn require_host(&self, actor: PlayerId) -> Result<(), GameError> {
        if actor != self.host {
            return Err(GameError::NotHost(actor));
        }
        Ok(())
    }

    fn depart(&mut self, player: PlayerId, removed: bool) -> Result<Outbox, GameError> {
        if self.phase.is_finished() {
            return Err(GameError::InvalidState("the game is over".into()));
        }
        let hand = if removed {
            self.players.remove(player)?
        } else {
            self.players.leave(player)?
        };
        match self.deck.as_mut() {
            Some(deck) => deck.discard(hand),
            None => debug_assert!(hand.is_empty(), "cards dealt before the deck exists"),
        }

        let mut out = vec![(Recipient::All, GameEvent::PlayerLeft { player, removed })];
        if self.phase == Phase::InRound {
            if self.players.active_count() < self.config.min_players {
                self.abort_round(AbortReason::NotEnoughPlayers, &mut out);
                self.finish(FinishReason::NotEnoughPlayers, None, &mut out);
            } else if self.round.as_ref().is_some_and(|r| r.judge() == player) {
                self.abort_round(AbortReason::JudgeLeft, &mut out);
                self.advance(&mut out);
            } else if let (Some(round), Some(deck)) = (self.round.as_mut(), self.deck.as_mut()) {
                if round.withdraw(player, deck) {
                    out.push((
                        Recipient::All,
                        GameEvent::AllSubmitted {
                            round: round.number(),
                            submissions: round.anonymized(),
                        },
                    ));
                }
            }
        }
        self.check_cards();
        Ok(out)
    }

    /// Starts the next round: judge rotation, prompt, top-ups.
    fn open_round(&mut self) -> Result<Outbox, GameError> {
        let deck = self
            .deck
            .as_mut()
            .ok_or_else(|| GameError::InvalidState("no deck has been built".into()))?;
        let number = self.rounds_started + 1;
        let round = Round::begin(
            number,
            self.last_judge,
            &mut self.players,
            deck,
            self.config.hand_size,
            self.rng.fork(),
        )?;

        self.rounds_started = number;
        self.last_judge = Some(round.judge());
        let mut out = vec![(
            Recipient::All,
            GameEvent::RoundStarted {
                round: number,
                judge: round.judge(),
                prompt: round.prompt().clone(),
            },
        )];
        for id in self.players.active_ids() {
            if let Ok(hand) = self.players.hand(id) {
                out.push((
                    Recipient::Player(id),
                    GameEvent::HandDealt {
                        player: id,
                        cards: hand.to_vec(),
                    },
                ));
            }
        }
        self.round = Some(round);
        Ok(out)
    }

    /// Starts the next round after a resolution, an abort or a skip. A
    /// deck exhaustion is announced and leaves the session without a live
    /// round until the host skips or ends.
    fn advance(&mut self, out: &mut Outbox) {
        match self.open_round() {
            Ok(events) => out.extend(events),
            Err(GameError::Deck(DeckError::Exhausted {
                kind,
                needed,
                available,
            })) => {
                tracing::warn!(lobby_id = %self.lobby, %kind, needed, available, "cannot start next round");
                out.push((
                    Recipient::All,
                    GameEvent::DeckExhausted {
                        kind,
                        needed,
                        available,
                    },
                ));
            }
            Err(GameError::Player(PlayerError::InsufficientPlayers { .. })) => {
                self.finish(FinishReason::NotEnoughPlayers, None, out);
            }
            Err(err) => {
                tracing::warn!(lobby_id = %self.lobby, %err, "cannot start next round");
            }
        }
    }

    fn abort_round(&mut self, reason: AbortReason, out: &mut Outbox) {
        if let (Some(round), Some(deck)) = (self.round.take(), self.deck.as_mut()) {
            let summary = round.abort(reason, deck);
            out.push((
                Recipient::All,
                GameEvent::RoundAborted {
                    round: summary.number,
                    reason,
                },
            ));
            self.history.push(summary);
        }
    }

    fn finish(&mut self, reason: FinishReason, winner: Option<PlayerId>, out: &mut Outbox) {
        debug_assert!(
            self.phase.can_transition_to(Phase::Finished) || reason == FinishReason::HostEnded,
            "finishing from {}",
            self.phase
        );
        self.phase = Phase::Finished;
        let standings = self.standings();
        tracing::info!(lobby_id = %self.lobby, ?reason, ?winner, rounds = self.rounds_started, "game finished");
        out.push((
            Recipient::All,
            GameEvent::GameFinished {
                standings,
                winner,
                reason,
            },
        ));
    }

    /// Every white card of the selected packs sits in exactly one hand,
    /// pile or live submission, and every black card in a pile or the live
    /// round. A failure here is an engine bug.
    fn check_cards(&self) {
        if !cfg!(debug_assertions) {
            return;
        }
        let Some(deck) = &self.deck else {
            return;
        };

        let mut seen = HashSet::new();
        let white = self
            .players
            .players()
            .into_iter()
            .flat_map(|p| p.hand.iter())
            .chain(deck.white_draw_pile())
            .chain(deck.white_discard_pile())
            .chain(self.round.iter().flat_map(|r| r.held_cards()));
        for card in white {
            assert!(seen.insert(card.id()), "white card {} is held twice", card.id());
        }
        assert_eq!(seen.len(), self.selection.total_white(), "white cards went missing");

        let black = deck.black_draw_pile().len()
            + deck.black_discard_pile().len()
            + usize::from(self.round.is_some());
        assert_eq!(black, self.selection.total_black(), "black cards went missing");
    }
}

// =========================================================================
// Tests
// =========================================================================
