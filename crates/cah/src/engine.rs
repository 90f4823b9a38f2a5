//! `Engine` builder and the inbound operation surface.
//!
//! The engine is what a chat-platform layer talks to. Every operation is
//! keyed by the [`LobbyId`] of the channel the command came from, and its
//! outcome is a plain `Result`; what players should see arrives on the
//! event receiver returned by [`EngineBuilder::build`].

use std::path::PathBuf;
use std::sync::Arc;

use cah_cards::{Catalog, CatalogStats, WhiteCard};
use cah_game::{
    DEFAULT_CHANNEL_SIZE, GameConfig, GameError, GameMode, GameStatus, LobbyEvent, LobbyHandle,
    LobbyManager, RoundSummary,
};
use cah_protocol::{LobbyId, PlayerId};
use tokio::sync::{Mutex, mpsc};

use crate::CahError;

/// Where the builder gets its catalog from.
enum CatalogSource {
    Loaded(Catalog),
    Json(String),
    Path(PathBuf),
}

/// Builder for configuring an [`Engine`].
///
/// # Example
///
/// ```rust
/// use cah::prelude::*;
///
/// let (engine, mut events) = Engine::builder()
///     .catalog_json(r#"{ "white": ["a", "b"], "black": [{ "text": "_?", "pick": 1 }] }"#)
///     .seed(7)
///     .build()?;
/// # let _ = (&engine, &mut events);
/// # Ok::<(), CahError>(())
/// ```
pub struct EngineBuilder {
    catalog: Option<CatalogSource>,
    config: GameConfig,
    seed: Option<u64>,
    channel_size: usize,
}

impl EngineBuilder {
    /// Creates a new builder with default settings and no catalog.
    pub fn new() -> Self {
        Self {
            catalog: None,
            config: GameConfig::default(),
            seed: None,
            channel_size: DEFAULT_CHANNEL_SIZE,
        }
    }

    /// Uses an already loaded catalog.
    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(CatalogSource::Loaded(catalog));
        self
    }

    /// Parses the catalog from JSON when the engine is built.
    pub fn catalog_json(mut self, json: impl Into<String>) -> Self {
        self.catalog = Some(CatalogSource::Json(json.into()));
        self
    }

    /// Reads the catalog from a JSON file when the engine is built.
    pub fn catalog_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog = Some(CatalogSource::Path(path.into()));
        self
    }

    /// Sets the game rules shared by every lobby.
    pub fn config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    /// Makes every shuffle reproducible. Meant for tests and replays.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the command queue size of each lobby actor.
    pub fn channel_size(mut self, channel_size: usize) -> Self {
        self.channel_size = channel_size;
        self
    }

    /// Loads the catalog, validates the config, and returns the engine
    /// together with the receiver every lobby publishes its events to.
    ///
    /// # Errors
    /// - [`CahError::MissingCatalog`] — no catalog was given
    /// - [`CahError::Catalog`] — the catalog failed to load
    /// - [`CahError::Game`] — the config failed validation
    pub fn build(self) -> Result<(Engine, mpsc::UnboundedReceiver<LobbyEvent>), CahError> {
        let catalog = match self.catalog.ok_or(CahError::MissingCatalog)? {
            CatalogSource::Loaded(catalog) => catalog,
            CatalogSource::Json(json) => Catalog::from_json(&json)?,
            CatalogSource::Path(path) => Catalog::from_path(&path)?,
        };
        self.config.validate()?;

        let catalog = Arc::new(catalog);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let mut lobbies = LobbyManager::new(Arc::clone(&catalog), self.config, events_tx)
            .with_channel_size(self.channel_size);
        if let Some(seed) = self.seed {
            lobbies = lobbies.with_seed(seed);
        }

        let stats = catalog.stats();
        tracing::info!(
            packs = stats.packs.len(),
            white = stats.total_white,
            black = stats.total_black,
            seeded = self.seed.is_some(),
            "engine ready"
        );

        let engine = Engine {
            lobbies: Mutex::new(lobbies),
            catalog,
        };
        Ok((engine, events_rx))
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The game-state engine: one independent game per lobby.
///
/// The lobby table sits behind a short-lived lock that is never held
/// across a wait on a lobby actor. Game commands run on each lobby's own
/// actor, so lobbies never wait on each other.
pub struct Engine {
    lobbies: Mutex<LobbyManager>,
    catalog: Arc<Catalog>,
}

impl Engine {
    /// Creates a new builder.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Opens a game in `lobby` hosted by `host`, who joins automatically.
    /// An empty `packs` list plays with every pack. A finished game still
    /// registered there is reaped first.
    pub async fn start(
        &self,
        lobby: LobbyId,
        host: PlayerId,
        host_name: impl Into<String>,
        mode: GameMode,
        packs: &[String],
    ) -> Result<(), CahError> {
        let existing = self.lobbies.lock().await.get(lobby).ok();
        if let Some(existing) = existing {
            if !existing.is_finished().await {
                return Err(GameError::LobbyAlreadyActive(lobby).into());
            }
            self.retire(&existing).await;
        }
        self.lobbies
            .lock()
            .await
            .open(lobby, host, host_name, mode, packs)?;
        Ok(())
    }

    /// A full game to the configured default score.
    pub async fn default_mode(&self) -> GameMode {
        self.lobbies.lock().await.config().default_mode()
    }

    pub async fn join(
        &self,
        lobby: LobbyId,
        player: PlayerId,
        name: impl Into<String>,
    ) -> Result<(), CahError> {
        Ok(self.handle(lobby).await?.join(player, name).await?)
    }

    pub async fn leave(&self, lobby: LobbyId, player: PlayerId) -> Result<(), CahError> {
        Ok(self.handle(lobby).await?.leave(player).await?)
    }

    pub async fn remove(
        &self,
        lobby: LobbyId,
        actor: PlayerId,
        player: PlayerId,
    ) -> Result<(), CahError> {
        Ok(self.handle(lobby).await?.remove(actor, player).await?)
    }

    pub async fn begin(&self, lobby: LobbyId, actor: PlayerId) -> Result<(), CahError> {
        Ok(self.handle(lobby).await?.begin(actor).await?)
    }

    pub async fn skip(&self, lobby: LobbyId, actor: PlayerId) -> Result<(), CahError> {
        Ok(self.handle(lobby).await?.skip(actor).await?)
    }

    pub async fn end(&self, lobby: LobbyId, actor: PlayerId) -> Result<(), CahError> {
        Ok(self.handle(lobby).await?.end(actor).await?)
    }

    /// Adds one card, by hand index, to the player's submission.
    pub async fn submit_card(
        &self,
        lobby: LobbyId,
        player: PlayerId,
        index: usize,
    ) -> Result<(), CahError> {
        Ok(self.handle(lobby).await?.submit_card(player, index).await?)
    }

    /// Adds several cards at once, in blank order.
    pub async fn submit_cards(
        &self,
        lobby: LobbyId,
        player: PlayerId,
        indices: Vec<usize>,
    ) -> Result<(), CahError> {
        Ok(self.handle(lobby).await?.submit_cards(player, indices).await?)
    }

    pub async fn pick(&self, lobby: LobbyId, judge: PlayerId, index: usize) -> Result<(), CahError> {
        Ok(self.handle(lobby).await?.pick(judge, index).await?)
    }

    pub async fn status(&self, lobby: LobbyId) -> Result<GameStatus, CahError> {
        Ok(self.handle(lobby).await?.status().await?)
    }

    /// The player's current hand. The platform should show it privately.
    pub async fn hand(&self, lobby: LobbyId, player: PlayerId) -> Result<Vec<WhiteCard>, CahError> {
        Ok(self.handle(lobby).await?.hand(player).await?)
    }

    pub async fn history(&self, lobby: LobbyId) -> Result<Vec<RoundSummary>, CahError> {
        Ok(self.handle(lobby).await?.history().await?)
    }

    /// Pack and card counts of the loaded catalog.
    pub fn catalog_stats(&self) -> CatalogStats {
        self.catalog.stats()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Stops a lobby's actor regardless of its phase.
    pub async fn close(&self, lobby: LobbyId) -> Result<(), CahError> {
        let handle = self.lobbies.lock().await.detach(lobby)?;
        let _ = handle.shutdown().await;
        tracing::info!(lobby_id = %lobby, "lobby closed");
        Ok(())
    }

    /// Drops every lobby whose game is over. Returns how many went.
    ///
    /// Each lobby is asked for its phase with the table unlocked, so a
    /// busy lobby only delays this call.
    pub async fn reap_finished(&self) -> usize {
        let handles = self.lobbies.lock().await.handles();
        let mut reaped = 0;
        for handle in handles {
            if handle.is_finished().await && self.retire(&handle).await {
                reaped += 1;
            }
        }
        if reaped > 0 {
            tracing::info!(reaped, "finished lobbies reaped");
        }
        reaped
    }

    pub async fn lobby_count(&self) -> usize {
        self.lobbies.lock().await.lobby_count()
    }

    /// Unregisters a finished lobby and stops its actor. Returns `false`
    /// if another call got there first.
    async fn retire(&self, handle: &LobbyHandle) -> bool {
        let forgotten = self.lobbies.lock().await.forget(handle);
        if forgotten {
            let _ = handle.shutdown().await;
        }
        forgotten
    }

    /// Clones the lobby's handle out so the table lock is released before
    /// the command is awaited.
    async fn handle(&self, lobby: LobbyId) -> Result<LobbyHandle, CahError> {
        Ok(self.lobbies.lock().await.get(lobby)?)
    }
}
