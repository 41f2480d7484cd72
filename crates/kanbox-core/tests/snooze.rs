//! Snooze timers and automatic thaw.

#![allow(clippy::unwrap_used)]

mod common;

use std::time::Duration as StdDuration;

use chrono::Duration;
use kanbox_api::{BoardQuery, ColumnKey, FreezeDuration, FreezeOptions};
use kanbox_core::{ActionOutcome, Clock, Notification, SnoozeService, TriageError};

use common::{column, column_items, id, setup};

fn service(
    coordinator: &kanbox_core::Coordinator<common::FakeApi>,
) -> SnoozeService<common::FakeApi> {
    SnoozeService::new(coordinator.clone(), StdDuration::from_secs(1))
}

#[tokio::test]
async fn test_frozen_item_returns_after_deadline() {
    let (coordinator, clock) = setup().await;
    let mut notifications = coordinator.subscribe_notifications();
    coordinator
        .move_column(
            &id("m2"),
            &column("c-frozen"),
            Some(FreezeOptions::preset(FreezeDuration::OneHour)),
        )
        .await
        .unwrap();
    assert!(column_items(&coordinator, "c-todo").is_empty());
    assert_eq!(
        coordinator.timers().countdown(&id("m2"), clock.now()).unwrap(),
        "1h"
    );

    let snooze = service(&coordinator);
    clock.advance(Duration::minutes(30));
    assert_eq!(snooze.run_once().await, 0);

    clock.advance(Duration::minutes(31));
    assert_eq!(snooze.run_once().await, 1);

    assert_eq!(column_items(&coordinator, "c-todo"), vec!["m2"]);
    let board = coordinator.board().unwrap();
    let m2 = board.item(&id("m2")).unwrap();
    assert_eq!(m2.kanban_status, ColumnKey::Todo);
    assert_eq!(m2.snoozed_until, None);
    assert_eq!(m2.previous_kanban_status, None);
    assert!(board.is_consistent());
    assert!(!coordinator.timers().is_tracked(&id("m2")));
    assert!(coordinator.timers().is_tracked(&id("f1")));
    assert!(coordinator.api().calls().contains(&"unfreeze m2".to_string()));
    assert_eq!(
        notifications.try_recv().unwrap(),
        Notification::SnoozeExpired { email: id("m2") }
    );
}

#[tokio::test]
async fn test_thawed_item_goes_to_top_of_previous_column() {
    let (coordinator, clock) = setup().await;
    clock.advance(Duration::hours(3));

    assert_eq!(service(&coordinator).run_once().await, 1);

    assert_eq!(column_items(&coordinator, "c-todo"), vec!["f1", "m2"]);
}

#[tokio::test]
async fn test_manual_move_cancels_timer() {
    let (coordinator, clock) = setup().await;

    coordinator
        .move_column(&id("f1"), &column("c-done"), None)
        .await
        .unwrap();
    assert!(!coordinator.timers().is_tracked(&id("f1")));
    let f1 = coordinator.board().unwrap().item(&id("f1")).cloned().unwrap();
    assert_eq!(f1.snoozed_until, None);
    assert_eq!(f1.previous_kanban_status, None);

    clock.advance(Duration::hours(4));
    assert_eq!(service(&coordinator).run_once().await, 0);
    assert_eq!(column_items(&coordinator, "c-done"), vec!["f1"]);
}

#[tokio::test]
async fn test_failed_manual_move_restores_timer() {
    let (coordinator, _) = setup().await;
    coordinator.api().fail_on("f1");

    assert!(
        coordinator
            .move_column(&id("f1"), &column("c-done"), None)
            .await
            .is_err()
    );

    assert!(coordinator.timers().is_tracked(&id("f1")));
    assert_eq!(column_items(&coordinator, "c-frozen"), vec!["f1", "f2"]);
}

#[tokio::test]
async fn test_expiry_after_item_left_frozen_is_noop() {
    let (coordinator, _) = setup().await;

    let outcome = coordinator.expire_snooze(&id("m1")).await.unwrap();

    assert_eq!(outcome, ActionOutcome::NoOp);
    assert!(coordinator.api().calls().is_empty());
}

#[tokio::test]
async fn test_failed_thaw_is_attempted_once() {
    let (coordinator, clock) = setup().await;
    coordinator.api().fail_on("f1");
    clock.advance(Duration::hours(3));
    let snooze = service(&coordinator);

    assert_eq!(snooze.run_once().await, 0);
    assert_eq!(snooze.run_once().await, 0);

    assert_eq!(column_items(&coordinator, "c-frozen"), vec!["f1", "f2"]);
    let attempts = coordinator
        .api()
        .calls()
        .iter()
        .filter(|c| c.as_str() == "unfreeze f1")
        .count();
    assert_eq!(attempts, 1);
}

#[tokio::test]
async fn test_failed_thaw_keeps_later_manual_move() {
    let (coordinator, clock) = setup().await;
    clock.advance(Duration::hours(3));

    let thaw = coordinator
        .prepare(kanbox_core::Action::MoveOutOfFrozen(id("f1")))
        .unwrap()
        .unwrap();
    let manual = coordinator
        .prepare(kanbox_core::Action::MoveColumn {
            email: id("f1"),
            to: column("c-done"),
            freeze: None,
        })
        .unwrap()
        .unwrap();
    coordinator.confirm(manual).await.unwrap();
    coordinator.api().fail_on("f1");
    assert!(coordinator.confirm(thaw).await.is_err());

    assert_eq!(column_items(&coordinator, "c-done"), vec!["f1"]);
    assert_eq!(column_items(&coordinator, "c-frozen"), vec!["f2"]);
    assert_eq!(column_items(&coordinator, "c-todo"), vec!["m2"]);
    assert!(!coordinator.timers().is_tracked(&id("f1")));
    assert_eq!(service(&coordinator).run_once().await, 0);
}

#[tokio::test]
async fn test_thaw_into_deleted_column_is_reported() {
    let (coordinator, clock) = setup().await;
    coordinator
        .delete_column(&column("c-clients"))
        .await
        .unwrap();
    let mut notifications = coordinator.subscribe_notifications();
    clock.advance(Duration::hours(5));

    assert_eq!(service(&coordinator).run_once().await, 1);

    assert_eq!(column_items(&coordinator, "c-frozen"), vec!["f2"]);
    let mut gap_reported = false;
    while let Ok(notification) = notifications.try_recv() {
        if let Notification::ActionFailed { email, .. } = notification {
            gap_reported |= email == Some(id("f2"));
        }
    }
    assert!(gap_reported);
    assert!(matches!(
        coordinator.move_out_of_frozen(&id("f2")).await,
        Err(TriageError::ConsistencyGap(_))
    ));
}

#[tokio::test]
async fn test_close_board_stops_timers() {
    let (coordinator, clock) = setup().await;
    assert_eq!(coordinator.timers().len(), 2);

    coordinator.close_board();
    clock.advance(Duration::days(1));

    assert!(coordinator.timers().is_empty());
    assert!(coordinator.board().is_none());
    assert_eq!(service(&coordinator).run_once().await, 0);
}

#[tokio::test]
async fn test_switch_board_resyncs_timers() {
    let (coordinator, _) = setup().await;
    coordinator.timers().clear();

    coordinator.switch_board(BoardQuery::default());

    assert_eq!(coordinator.timers().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_spawned_service_thaws_on_tick() {
    let (coordinator, clock) = setup().await;
    clock.advance(Duration::hours(3) + Duration::seconds(1));

    let handle = service(&coordinator).spawn();
    tokio::time::sleep(StdDuration::from_secs(2)).await;
    handle.stop().await;

    assert_eq!(column_items(&coordinator, "c-todo"), vec!["f1", "m2"]);
    assert_eq!(column_items(&coordinator, "c-frozen"), vec!["f2"]);
}
