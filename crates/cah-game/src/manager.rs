//! Lobby manager: starts, tracks, and reaps lobby actors.

use std::collections::HashMap;
use std::sync::Arc;

use cah_cards::{Catalog, GameRng, PackSelection};
use cah_protocol::{LobbyId, PlayerId};

use crate::lobby::{EventSender, spawn_lobby};
use crate::{GameConfig, GameError, GameMode, GameSession, LobbyHandle};

/// Default command channel size for lobby actors.
pub const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Maps each chat channel to the lobby actor running its game.
///
/// At most one running game per lobby id. The only thing lobbies share is
/// the read-only catalog.
pub struct LobbyManager {
    lobbies: HashMap<LobbyId, LobbyHandle>,
    catalog: Arc<Catalog>,
    config: GameConfig,
    events: EventSender,
    channel_size: usize,
    /// Base seed for deterministic lobbies. Each lobby mixes in its id.
    seed: Option<u64>,
}

impl LobbyManager {
    /// Creates a manager with no lobbies. Every lobby it starts publishes to
    /// `events`.
    pub fn new(catalog: Arc<Catalog>, config: GameConfig, events: EventSender) -> Self {
        Self {
            lobbies: HashMap::new(),
            catalog,
            config,
            events,
            channel_size: DEFAULT_CHANNEL_SIZE,
            seed: None,
        }
    }

    /// Sets the command channel size of lobbies started from now on.
    pub fn with_channel_size(mut self, channel_size: usize) -> Self {
        self.channel_size = channel_size.max(1);
        self
    }

    /// Makes every lobby's shuffles reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Opens a lobby in `lobby` with `host` joined, reaping a finished game
    /// still registered there first.
    ///
    /// This waits on the old lobby's actor while holding `&mut self`. A
    /// caller sharing the manager behind a lock should check
    /// [`LobbyHandle::is_finished`] and [`forget`](Self::forget) the old
    /// handle outside the lock, then call [`open`](Self::open).
    ///
    /// # Errors
    /// - [`GameError::LobbyAlreadyActive`] — a game is still running there
    /// - whatever [`open`](Self::open) rejects
    pub async fn start(
        &mut self,
        lobby: LobbyId,
        host: PlayerId,
        host_name: impl Into<String>,
        mode: GameMode,
        packs: &[String],
    ) -> Result<LobbyHandle, GameError> {
        if let Some(existing) = self.lobbies.get(&lobby).cloned() {
            if !existing.is_finished().await {
                return Err(GameError::LobbyAlreadyActive(lobby));
            }
            if self.forget(&existing) {
                let _ = existing.shutdown().await;
            }
        }
        self.open(lobby, host, host_name, mode, packs)
    }

    /// Opens a lobby in `lobby` with `host` joined. Never waits on another
    /// actor.
    ///
    /// An empty `packs` list selects every pack.
    ///
    /// # Errors
    /// - [`GameError::LobbyAlreadyActive`] — a lobby is registered there,
    ///   finished or not
    /// - [`GameError::Catalog`] — an unknown pack id
    /// - whatever [`GameSession::start`] rejects
    pub fn open(
        &mut self,
        lobby: LobbyId,
        host: PlayerId,
        host_name: impl Into<String>,
        mode: GameMode,
        packs: &[String],
    ) -> Result<LobbyHandle, GameError> {
        if self.lobbies.contains_key(&lobby) {
            return Err(GameError::LobbyAlreadyActive(lobby));
        }

        let selection = self.selection(packs)?;
        let rng = match self.seed {
            Some(seed) => GameRng::seeded(seed.wrapping_add(lobby.0)),
            None => GameRng::from_entropy(),
        };
        let (session, opening) =
            GameSession::start(lobby, host, host_name, mode, selection, self.config.clone(), rng)?;

        let handle = spawn_lobby(session, opening, self.events.clone(), self.channel_size);
        self.lobbies.insert(lobby, handle.clone());
        tracing::info!(lobby_id = %lobby, lobbies = self.lobbies.len(), "lobby created");
        Ok(handle)
    }

    /// Returns a handle to the lobby's actor.
    ///
    /// Callers should clone the handle out and release the manager before
    /// awaiting on it.
    pub fn get(&self, lobby: LobbyId) -> Result<LobbyHandle, GameError> {
        self.lobbies
            .get(&lobby)
            .cloned()
            .ok_or(GameError::LobbyNotFound(lobby))
    }

    /// Handles of every registered lobby.
    pub fn handles(&self) -> Vec<LobbyHandle> {
        self.lobbies.values().cloned().collect()
    }

    /// Unregisters `handle`'s lobby if `handle` still reaches the actor
    /// registered for it. A newer game opened in the same lobby is left
    /// alone. The actor itself keeps running until shut down.
    pub fn forget(&mut self, handle: &LobbyHandle) -> bool {
        let lobby = handle.lobby_id();
        let current = self
            .lobbies
            .get(&lobby)
            .is_some_and(|registered| registered.same_actor(handle));
        if current {
            self.lobbies.remove(&lobby);
            tracing::info!(lobby_id = %lobby, "lobby unregistered");
        }
        current
    }

    /// Unregisters a lobby and returns its handle so the caller can shut
    /// it down.
    pub fn detach(&mut self, lobby: LobbyId) -> Result<LobbyHandle, GameError> {
        self.lobbies
            .remove(&lobby)
            .ok_or(GameError::LobbyNotFound(lobby))
    }

    /// Shuts a lobby down and forgets it.
    pub async fn close(&mut self, lobby: LobbyId) -> Result<(), GameError> {
        let handle = self.detach(lobby)?;
        let _ = handle.shutdown().await;
        tracing::info!(lobby_id = %lobby, "lobby closed");
        Ok(())
    }

    /// Shuts down every lobby whose game is over (or whose actor is gone).
    /// Returns how many were reaped.
    pub async fn reap_finished(&mut self) -> usize {
        let mut reaped = 0;
        for handle in self.handles() {
            if handle.is_finished().await && self.forget(&handle) {
                let _ = handle.shutdown().await;
                reaped += 1;
            }
        }
        if reaped > 0 {
            tracing::info!(reaped, "finished lobbies reaped");
        }
        reaped
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn lobby_count(&self) -> usize {
        self.lobbies.len()
    }

    pub fn lobby_ids(&self) -> Vec<LobbyId> {
        self.lobbies.keys().copied().collect()
    }

    fn selection(&self, packs: &[String]) -> Result<PackSelection, GameError> {
        if packs.is_empty() {
            Ok(self.catalog.select_all())
        } else {
            Ok(self.catalog.select(packs)?)
        }
    }
}
