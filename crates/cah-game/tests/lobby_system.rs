//! Integration tests for lobby actors and the lobby manager.

use std::sync::Arc;

use cah_cards::{CatalogError, Catalog};
use cah_game::{
    GameConfig, GameError, GameEvent, GameMode, LobbyEvent, LobbyHandle, LobbyManager, Phase,
    RoundState,
};
use cah_protocol::{LobbyId, PlayerId, Recipient};
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

fn pid(id: u64) -> PlayerId {
    PlayerId(id)
}

fn catalog() -> Arc<Catalog> {
    let white: Vec<String> = (0..200).map(|i| format!("white {i}")).collect();
    let black: Vec<serde_json::Value> = (0..5)
        .map(|i| serde_json::json!({ "text": format!("prompt {i}: _"), "pick": 1 }))
        .collect();
    let json = serde_json::json!({
        "packs": {
            "base": { "name": "Base", "white": white, "black": black },
            "tiny": { "white": ["one"], "black": [{ "text": "_", "pick": 1 }] },
        }
    });
    Arc::new(Catalog::from_json(&json.to_string()).unwrap())
}

fn manager() -> (LobbyManager, mpsc::UnboundedReceiver<LobbyEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let mgr = LobbyManager::new(catalog(), GameConfig::default(), tx).with_seed(7);
    (mgr, rx)
}

fn base() -> Vec<String> {
    vec!["base".to_string()]
}

/// Starts a lobby hosted by `pid(1)` with `pid(2)..=pid(n)` joined.
async fn lobby_with(mgr: &mut LobbyManager, lobby: LobbyId, n: u64, mode: GameMode) -> LobbyHandle {
    let handle = mgr.start(lobby, pid(1), "host", mode, &base()).await.unwrap();
    for i in 2..=n {
        handle.join(pid(i), format!("p{i}")).await.unwrap();
    }
    handle
}

/// Every waiting player submits their first card, then the judge picks.
async fn play_round(handle: &LobbyHandle) {
    let status = handle.status().await.unwrap();
    for player in status.waiting_on {
        handle.submit_card(player, 0).await.unwrap();
    }
    let judge = status.judge.unwrap();
    handle.pick(judge, 0).await.unwrap();
}

fn drain(rx: &mut mpsc::UnboundedReceiver<LobbyEvent>) -> Vec<LobbyEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// =========================================================================
// LobbyManager
// =========================================================================

#[tokio::test]
async fn test_start_publishes_opening_events_in_order() {
    let (mut mgr, mut rx) = manager();

    let handle = mgr
        .start(LobbyId(10), pid(1), "host", GameMode::QuickRound, &base())
        .await
        .unwrap();
    // A round-trip through the actor guarantees the opening is published.
    handle.status().await.unwrap();

    let events = drain(&mut rx);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].lobby, LobbyId(10));
    assert_eq!(events[0].seq, 1);
    assert!(matches!(events[0].event, GameEvent::LobbyOpened { .. }));
    assert_eq!(events[1].seq, 2);
    assert!(matches!(events[1].event, GameEvent::PlayerJoined { .. }));
    assert_eq!(mgr.lobby_count(), 1);
}

#[tokio::test]
async fn test_start_same_lobby_twice_is_already_active() {
    let (mut mgr, _rx) = manager();
    lobby_with(&mut mgr, LobbyId(1), 1, GameMode::QuickRound).await;

    let result = mgr
        .start(LobbyId(1), pid(2), "other", GameMode::QuickRound, &base())
        .await;

    assert!(matches!(result, Err(GameError::LobbyAlreadyActive(l)) if l == LobbyId(1)));
}

#[tokio::test]
async fn test_start_unknown_pack_fails() {
    let (mut mgr, _rx) = manager();

    let result = mgr
        .start(
            LobbyId(1),
            pid(1),
            "host",
            GameMode::QuickRound,
            &["nope".to_string()],
        )
        .await;

    assert!(matches!(
        result,
        Err(GameError::Catalog(CatalogError::UnknownPack(p))) if p == "nope"
    ));
    assert_eq!(mgr.lobby_count(), 0);
}

#[tokio::test]
async fn test_start_empty_pack_list_selects_every_pack() {
    let (mut mgr, _rx) = manager();
    let handle = mgr
        .start(LobbyId(1), pid(1), "host", GameMode::QuickRound, &[])
        .await
        .unwrap();
    handle.join(pid(2), "b").await.unwrap();
    handle.join(pid(3), "c").await.unwrap();

    handle.begin(pid(1)).await.unwrap();

    let deck = handle.status().await.unwrap().deck.unwrap();
    assert_eq!(deck.white_draw + 30, 201);
}

#[tokio::test]
async fn test_get_unknown_lobby_is_not_found() {
    let (mgr, _rx) = manager();
    assert!(matches!(
        mgr.get(LobbyId(404)),
        Err(GameError::LobbyNotFound(l)) if l == LobbyId(404)
    ));
}

#[tokio::test]
async fn test_finished_lobby_is_reaped_on_start() {
    let (mut mgr, _rx) = manager();
    let handle = lobby_with(&mut mgr, LobbyId(3), 3, GameMode::QuickRound).await;
    handle.begin(pid(1)).await.unwrap();
    play_round(&handle).await;
    assert_eq!(handle.status().await.unwrap().phase, Phase::Finished);

    let again = mgr
        .start(LobbyId(3), pid(2), "new host", GameMode::QuickRound, &base())
        .await
        .unwrap();

    let status = again.status().await.unwrap();
    assert_eq!(status.host, pid(2));
    assert_eq!(status.phase, Phase::Lobby);
    assert_eq!(mgr.lobby_count(), 1);
}

#[tokio::test]
async fn test_reap_finished_only_removes_finished() {
    let (mut mgr, _rx) = manager();
    let done = lobby_with(&mut mgr, LobbyId(1), 2, GameMode::QuickRound).await;
    lobby_with(&mut mgr, LobbyId(2), 2, GameMode::QuickRound).await;
    done.end(pid(1)).await.unwrap();

    let reaped = mgr.reap_finished().await;

    assert_eq!(reaped, 1);
    assert_eq!(mgr.lobby_ids(), vec![LobbyId(2)]);
}

#[tokio::test]
async fn test_open_registered_lobby_is_already_active() {
    let (mut mgr, _rx) = manager();
    let handle = lobby_with(&mut mgr, LobbyId(6), 1, GameMode::QuickRound).await;
    handle.end(pid(1)).await.unwrap();

    let result = mgr.open(LobbyId(6), pid(2), "other", GameMode::QuickRound, &base());

    assert!(matches!(
        result,
        Err(GameError::LobbyAlreadyActive(l)) if l == LobbyId(6)
    ));
}

#[tokio::test]
async fn test_forget_stale_handle_keeps_newer_lobby() {
    let (mut mgr, _rx) = manager();
    let old = lobby_with(&mut mgr, LobbyId(7), 1, GameMode::QuickRound).await;
    old.end(pid(1)).await.unwrap();
    let newer = mgr
        .start(LobbyId(7), pid(2), "new host", GameMode::QuickRound, &base())
        .await
        .unwrap();

    assert!(!mgr.forget(&old));

    assert_eq!(mgr.lobby_count(), 1);
    assert!(mgr.get(LobbyId(7)).unwrap().same_actor(&newer));
    assert!(mgr.forget(&newer));
    assert_eq!(mgr.lobby_count(), 0);
}

#[tokio::test]
async fn test_is_finished_true_once_actor_stopped() {
    let (mut mgr, _rx) = manager();
    let handle = lobby_with(&mut mgr, LobbyId(8), 1, GameMode::QuickRound).await;
    assert!(!handle.is_finished().await);

    mgr.close(LobbyId(8)).await.unwrap();

    assert!(handle.is_finished().await);
}

#[tokio::test]
async fn test_close_then_handle_is_unavailable() {
    let (mut mgr, _rx) = manager();
    let handle = lobby_with(&mut mgr, LobbyId(5), 1, GameMode::QuickRound).await;

    mgr.close(LobbyId(5)).await.unwrap();

    assert!(matches!(
        handle.status().await,
        Err(GameError::Unavailable(l)) if l == LobbyId(5)
    ));
    assert!(matches!(
        mgr.close(LobbyId(5)).await,
        Err(GameError::LobbyNotFound(_))
    ));
}

// =========================================================================
// Lobby actor
// =========================================================================

#[tokio::test]
async fn test_rejected_command_changes_nothing() {
    let (mut mgr, _rx) = manager();
    let handle = lobby_with(&mut mgr, LobbyId(1), 3, GameMode::QuickRound).await;

    let result = handle.begin(pid(2)).await;

    assert!(matches!(result, Err(GameError::NotHost(p)) if p == pid(2)));
    assert_eq!(handle.status().await.unwrap().phase, Phase::Lobby);
}

#[tokio::test]
async fn test_hand_dealt_is_private() {
    let (mut mgr, mut rx) = manager();
    let handle = lobby_with(&mut mgr, LobbyId(1), 3, GameMode::QuickRound).await;
    drain(&mut rx);

    handle.begin(pid(1)).await.unwrap();

    let events = drain(&mut rx);
    let dealt: Vec<_> = events
        .iter()
        .filter(|e| matches!(e.event, GameEvent::HandDealt { .. }))
        .collect();
    assert_eq!(dealt.len(), 3);
    for event in dealt {
        let GameEvent::HandDealt { player, cards } = &event.event else {
            unreachable!()
        };
        assert_eq!(event.recipient, Recipient::Player(*player));
        assert_eq!(cards.len(), 10);
        assert_eq!(handle.hand(*player).await.unwrap(), *cards);
    }
    assert!(events.windows(2).all(|w| w[1].seq == w[0].seq + 1));
}

#[tokio::test]
async fn test_concurrent_submissions_are_serialized() {
    let (mut mgr, _rx) = manager();
    let handle = lobby_with(&mut mgr, LobbyId(1), 8, GameMode::Full { target_score: 7 }).await;
    handle.begin(pid(1)).await.unwrap();
    let waiting = handle.status().await.unwrap().waiting_on;
    assert_eq!(waiting.len(), 7);

    let mut tasks = Vec::new();
    for player in waiting.clone() {
        let handle = handle.clone();
        tasks.push(tokio::spawn(async move {
            // Each player fires the same card twice; exactly one must land.
            let first = handle.submit_card(player, 0);
            let second = handle.submit_card(player, 0);
            let (a, b) = tokio::join!(first, second);
            a.is_ok() as u32 + b.is_ok() as u32
        }));
    }
    let mut accepted = 0;
    for task in tasks {
        accepted += task.await.unwrap();
    }

    assert_eq!(accepted, 7);
    let status = handle.status().await.unwrap();
    assert_eq!(status.round_state, Some(RoundState::AwaitingJudgment));
    assert_eq!(status.submitted, waiting);
    for player in status.submitted {
        assert_eq!(handle.hand(player).await.unwrap().len(), 9);
    }
}

#[tokio::test]
async fn test_submission_racing_leave_keeps_lobby_consistent() {
    let (mut mgr, _rx) = manager();
    let handle = lobby_with(&mut mgr, LobbyId(1), 5, GameMode::Full { target_score: 7 }).await;
    handle.begin(pid(1)).await.unwrap();

    let (submit, leave) = tokio::join!(handle.submit_card(pid(4), 0), handle.leave(pid(4)));
    assert!(leave.is_ok());
    // The submission either landed before the leave or was rejected after.
    if let Err(err) = submit {
        assert!(matches!(err, GameError::InvalidSubmission(_)));
    }

    handle.submit_card(pid(2), 0).await.unwrap();
    handle.submit_card(pid(3), 0).await.unwrap();
    handle.submit_card(pid(5), 0).await.unwrap();
    let status = handle.status().await.unwrap();
    assert_eq!(status.round_state, Some(RoundState::AwaitingJudgment));
    assert_eq!(status.submitted, vec![pid(2), pid(3), pid(5)]);
}

#[tokio::test]
async fn test_full_game_over_handle_reaches_target() {
    let (mut mgr, mut rx) = manager();
    let handle = lobby_with(&mut mgr, LobbyId(9), 3, GameMode::Full { target_score: 3 }).await;
    handle.begin(pid(1)).await.unwrap();

    for _ in 0..10 {
        if handle.status().await.unwrap().phase == Phase::Finished {
            break;
        }
        play_round(&handle).await;
    }

    let status = handle.status().await.unwrap();
    assert_eq!(status.phase, Phase::Finished);
    assert_eq!(status.scores[0].score, 3);
    let history = handle.history().await.unwrap();
    assert_eq!(history.len() as u32, status.round);
    let finished = drain(&mut rx)
        .into_iter()
        .filter(|e| matches!(e.event, GameEvent::GameFinished { .. }))
        .count();
    assert_eq!(finished, 1);
}
