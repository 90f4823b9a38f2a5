//! Lobby actor: an isolated Tokio task that owns one game session.
//!
//! Each lobby runs in its own task and is reached only through an mpsc
//! channel. Commands are applied one at a time, to completion, so two
//! players submitting at once (or a submission racing a leave) can never
//! interleave inside the session.

use cah_cards::WhiteCard;
use cah_protocol::{Envelope, LobbyId, PlayerId};
use tokio::sync::{mpsc, oneshot};

use crate::session::Outbox;
use crate::{GameError, GameSession, GameStatus, LobbyEvent, RoundSummary};

/// Where a lobby publishes its events. Supplied by the platform layer.
pub type EventSender = mpsc::UnboundedSender<LobbyEvent>;

type Reply = oneshot::Sender<Result<(), GameError>>;

/// Commands sent to a lobby actor through its channel.
///
/// Every variant carries a `oneshot` reply channel: the caller sends the
/// command and waits for the outcome on it. Events go to the event sink,
/// not through the reply.
pub(crate) enum LobbyCommand {
    Join {
        player: PlayerId,
        name: String,
        reply: Reply,
    },
    Leave {
        player: PlayerId,
        reply: Reply,
    },
    Remove {
        actor: PlayerId,
        player: PlayerId,
        reply: Reply,
    },
    Begin {
        actor: PlayerId,
        reply: Reply,
    },
    Skip {
        actor: PlayerId,
        reply: Reply,
    },
    End {
        actor: PlayerId,
        reply: Reply,
    },
    Submit {
        player: PlayerId,
        cards: Vec<usize>,
        reply: Reply,
    },
    Pick {
        judge: PlayerId,
        index: usize,
        reply: Reply,
    },
    Status {
        reply: oneshot::Sender<GameStatus>,
    },
    Hand {
        player: PlayerId,
        reply: oneshot::Sender<Result<Vec<WhiteCard>, GameError>>,
    },
    History {
        reply: oneshot::Sender<Vec<RoundSummary>>,
    },
    Shutdown,
}

/// Handle to a running lobby actor.
///
/// Cheap to clone: it is just an `mpsc::Sender` wrapper. The
/// [`LobbyManager`](crate::LobbyManager) holds one per lobby.
#[derive(Clone)]
pub struct LobbyHandle {
    lobby: LobbyId,
    sender: mpsc::Sender<LobbyCommand>,
}

impl LobbyHandle {
    pub fn lobby_id(&self) -> LobbyId {
        self.lobby
    }

    /// Returns `true` once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Returns `true` if both handles reach the same actor.
    pub fn same_actor(&self, other: &LobbyHandle) -> bool {
        self.sender.same_channel(&other.sender)
    }

    /// Returns `true` once the game is over, or once the actor is gone.
    pub async fn is_finished(&self) -> bool {
        match self.status().await {
            Ok(status) => status.phase.is_finished(),
            Err(_) => true,
        }
    }

    pub async fn join(&self, player: PlayerId, name: impl Into<String>) -> Result<(), GameError> {
        let name = name.into();
        self.request(|reply| LobbyCommand::Join {
            player,
            name,
            reply,
        })
        .await?
    }

    pub async fn leave(&self, player: PlayerId) -> Result<(), GameError> {
        self.request(|reply| LobbyCommand::Leave { player, reply })
            .await?
    }

    /// Host-only.
    pub async fn remove(&self, actor: PlayerId, player: PlayerId) -> Result<(), GameError> {
        self.request(|reply| LobbyCommand::Remove {
            actor,
            player,
            reply,
        })
        .await?
    }

    /// Host-only.
    pub async fn begin(&self, actor: PlayerId) -> Result<(), GameError> {
        self.request(|reply| LobbyCommand::Begin { actor, reply })
            .await?
    }

    /// Host-only.
    pub async fn skip(&self, actor: PlayerId) -> Result<(), GameError> {
        self.request(|reply| LobbyCommand::Skip { actor, reply })
            .await?
    }

    /// Host-only.
    pub async fn end(&self, actor: PlayerId) -> Result<(), GameError> {
        self.request(|reply| LobbyCommand::End { actor, reply })
            .await?
    }

    pub async fn submit_card(&self, player: PlayerId, index: usize) -> Result<(), GameError> {
        self.submit_cards(player, vec![index]).await
    }

    pub async fn submit_cards(&self, player: PlayerId, cards: Vec<usize>) -> Result<(), GameError> {
        self.request(|reply| LobbyCommand::Submit {
            player,
            cards,
            reply,
        })
        .await?
    }

    pub async fn pick(&self, judge: PlayerId, index: usize) -> Result<(), GameError> {
        self.request(|reply| LobbyCommand::Pick {
            judge,
            index,
            reply,
        })
        .await?
    }

    pub async fn status(&self) -> Result<GameStatus, GameError> {
        self.request(|reply| LobbyCommand::Status { reply }).await
    }

    pub async fn hand(&self, player: PlayerId) -> Result<Vec<WhiteCard>, GameError> {
        self.request(|reply| LobbyCommand::Hand { player, reply })
            .await?
    }

    pub async fn history(&self) -> Result<Vec<RoundSummary>, GameError> {
        self.request(|reply| LobbyCommand::History { reply }).await
    }

    /// Tells the actor to stop. Commands already queued are dropped.
    pub async fn shutdown(&self) -> Result<(), GameError> {
        self.sender
            .send(LobbyCommand::Shutdown)
            .await
            .map_err(|_| GameError::Unavailable(self.lobby))
    }

    /// Sends a command built around a fresh reply channel and waits for
    /// the answer.
    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> LobbyCommand,
    ) -> Result<T, GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| GameError::Unavailable(self.lobby))?;
        reply_rx
            .await
            .map_err(|_| GameError::Unavailable(self.lobby))
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct LobbyActor {
    lobby: LobbyId,
    session: GameSession,
    events: EventSender,
    /// Sequence number of the last published event.
    seq: u64,
    receiver: mpsc::Receiver<LobbyCommand>,
}

impl LobbyActor {
    /// Runs the actor loop, processing commands until shutdown or until
    /// every handle is dropped.
    async fn run(mut self, opening: Outbox) {
        tracing::info!(lobby_id = %self.lobby, "lobby actor started");
        self.publish(opening);

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                LobbyCommand::Join {
                    player,
                    name,
                    reply,
                } => {
                    let result = self.session.join(player, name);
                    self.complete("join", result, reply);
                }
                LobbyCommand::Leave { player, reply } => {
                    let result = self.session.leave(player);
                    self.complete("leave", result, reply);
                }
                LobbyCommand::Remove {
                    actor,
                    player,
                    reply,
                } => {
                    let result = self.session.remove(actor, player);
                    self.complete("remove", result, reply);
                }
                LobbyCommand::Begin { actor, reply } => {
                    let result = self.session.begin(actor);
                    self.complete("begin", result, reply);
                }
                LobbyCommand::Skip { actor, reply } => {
                    let result = self.session.skip(actor);
                    self.complete("skip", result, reply);
                }
                LobbyCommand::End { actor, reply } => {
                    let result = self.session.end(actor);
                    self.complete("end", result, reply);
                }
                LobbyCommand::Submit {
                    player,
                    cards,
                    reply,
                } => {
                    let result = self.session.submit_cards(player, &cards);
                    self.complete("submit", result, reply);
                }
                LobbyCommand::Pick {
                    judge,
                    index,
                    reply,
                } => {
                    let result = self.session.pick(judge, index);
                    self.complete("pick", result, reply);
                }
                LobbyCommand::Status { reply } => {
                    let _ = reply.send(self.session.status());
                }
                LobbyCommand::Hand { player, reply } => {
                    let _ = reply.send(self.session.hand(player));
                }
                LobbyCommand::History { reply } => {
                    let _ = reply.send(self.session.history().to_vec());
                }
                LobbyCommand::Shutdown => {
                    tracing::info!(lobby_id = %self.lobby, "lobby shutting down");
                    break;
                }
            }
        }

        tracing::info!(lobby_id = %self.lobby, phase = %self.session.phase(), "lobby actor stopped");
    }

    /// Publishes the events of a successful command, then answers the
    /// caller. Events go out first so a caller that awaits the reply can
    /// already see them on the event receiver.
    fn complete(&mut self, command: &'static str, result: Result<Outbox, GameError>, reply: Reply) {
        let result = match result {
            Ok(events) => {
                self.publish(events);
                Ok(())
            }
            Err(err) => {
                tracing::debug!(lobby_id = %self.lobby, command, %err, "command rejected");
                Err(err)
            }
        };
        let _ = reply.send(result);
    }

    /// Stamps events with the lobby and a sequence number and sends them to
    /// the sink. A closed sink only loses the events; the game goes on.
    fn publish(&mut self, events: Outbox) {
        for (recipient, event) in events {
            self.seq += 1;
            let envelope = Envelope {
                lobby: self.lobby,
                seq: self.seq,
                recipient,
                event,
            };
            if self.events.send(envelope).is_err() {
                tracing::warn!(lobby_id = %self.lobby, seq = self.seq, "event receiver gone, dropping event");
            }
        }
    }
}

/// Spawns a new lobby actor around `session` and returns a handle to it.
///
/// `opening` holds the events produced by [`GameSession::start`]; the actor
/// publishes them before serving any command. `channel_size` bounds the
/// command queue: when it fills up, senders wait.
pub(crate) fn spawn_lobby(
    session: GameSession,
    opening: Outbox,
    events: EventSender,
    channel_size: usize,
) -> LobbyHandle {
    let lobby = session.lobby();
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = LobbyActor {
        lobby,
        session,
        events,
        seq: 0,
        receiver: rx,
    };

    tokio::spawn(actor.run(opening));

    LobbyHandle { lobby, sender: tx }
}
