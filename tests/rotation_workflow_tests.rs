use axum::http::StatusCode;
use serde_json::json;

use courtqueue::{CourtEvent, CourtStateListener};

mod utils;

use utils::*;

#[tokio::test]
async fn test_winner_stays_and_loser_requeues() {
    let setup = TestSetupBuilder::new().build().await;
    let court = setup.court();

    let (status, json) = setup.join(court, "Alice").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["entry"]["position"], 1);
    let (_, json) = setup.join(court, "Bob").await;
    assert_eq!(json["entry"]["position"], 2);

    let (status, _) = setup.start(court).await;
    assert_eq!(status, StatusCode::OK);
    CourtAssertion::for_court(&setup, court)
        .await
        .has_match(Some(("Alice", 0)), Some(("Bob", 0)))
        .has_queue(&[]);

    let (status, json) = setup.end(court, "A").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["winner"], "Alice");

    CourtAssertion::for_court(&setup, court)
        .await
        .has_match(Some(("Alice", 1)), None)
        .has_queue(&["Bob"]);

    let (_, history) = setup
        .send("GET", &format!("/courts/{}/history", court), None)
        .await;
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["winner"], "Alice");
    assert_eq!(history[0]["team_a"], "Alice");
    assert_eq!(history[0]["team_b"], "Bob");
}

#[tokio::test]
async fn test_incomplete_match_waits_for_next_join() {
    let setup = TestSetupBuilder::new().with_queue(&["Alice", "Bob"]).build().await;
    let court = setup.court();
    setup.start(court).await;
    setup.end(court, "A").await;

    // Side B is empty, so the match cannot be decided yet
    let (status, _) = setup.end(court, "A").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, json) = setup.join(court, "Carol").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["seated"], false);

    CourtAssertion::for_court(&setup, court)
        .await
        .has_match(Some(("Alice", 1)), Some(("Bob", 0)))
        .has_queue(&["Carol"]);
}

#[tokio::test]
async fn test_second_win_sends_winner_back_to_queue() {
    let setup = TestSetupBuilder::new()
        .with_queue(&["Alice", "Bob", "Carol"])
        .build()
        .await;
    let court = setup.court();
    setup.start(court).await;

    setup.end(court, "A").await;
    CourtAssertion::for_court(&setup, court)
        .await
        .has_match(Some(("Alice", 1)), Some(("Carol", 0)))
        .has_queue(&["Bob"]);

    let (_, json) = setup.end(court, "A").await;
    assert_eq!(json["winner_left"], true);

    // Bob was waiting, so he plays; Alice and Carol queue behind
    CourtAssertion::for_court(&setup, court)
        .await
        .has_match(Some(("Bob", 0)), None)
        .has_queue(&["Carol", "Alice"]);
}

#[tokio::test]
async fn test_double_win_with_empty_queue_leaves_court_empty() {
    let setup = TestSetupBuilder::new().with_queue(&["Alice", "Bob"]).build().await;
    let court = setup.court();
    setup.start(court).await;

    let (status, _) = setup
        .send(
            "POST",
            &format!("/courts/{}/match/adjust", court),
            Some(json!({"side": "A", "adjustment": "increment"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    setup.end(court, "A").await;
    CourtAssertion::for_court(&setup, court)
        .await
        .has_match(None, None)
        .has_queue(&["Bob", "Alice"]);

    // A match slot exists, so start is refused; joining refills it instead
    let (status, _) = setup.start(court).await;
    assert_eq!(status, StatusCode::CONFLICT);

    setup.join(court, "Carol").await;
    CourtAssertion::for_court(&setup, court)
        .await
        .has_match(Some(("Bob", 0)), Some(("Alice", 0)))
        .has_queue(&["Carol"]);
}

#[tokio::test]
async fn test_higher_threshold_keeps_winner_longer() {
    let setup = TestSetupBuilder::new()
        .with_win_out_threshold(3)
        .with_queue(&["Alice", "Bob", "Carol", "Dave"])
        .build()
        .await;
    let court = setup.court();
    setup.start(court).await;

    setup.end(court, "A").await;
    setup.end(court, "A").await;
    CourtAssertion::for_court(&setup, court)
        .await
        .has_match(Some(("Alice", 2)), Some(("Dave", 0)))
        .has_queue(&["Bob", "Carol"]);

    let (_, json) = setup.end(court, "A").await;
    assert_eq!(json["winner_left"], true);
}

#[tokio::test]
async fn test_participants_are_conserved_across_end() {
    let setup = TestSetupBuilder::new()
        .with_queue(&["Alice", "Bob", "Carol", "Dave", "Erin"])
        .build()
        .await;
    let court = setup.court();
    setup.start(court).await;

    let expected = CourtAssertion::for_court(&setup, court).await.everyone();
    for winner in ["A", "B", "B", "A", "A", "B"] {
        let (status, _) = setup.end(court, winner).await;
        assert_eq!(status, StatusCode::OK);
        let now = CourtAssertion::for_court(&setup, court).await.everyone();
        assert_eq!(now, expected);
    }
}

#[tokio::test]
async fn test_start_requires_two_entries_and_no_match() {
    let setup = TestSetupBuilder::new().with_queue(&["Alice"]).build().await;
    let court = setup.court();

    let (status, json) = setup.start(court).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("at least 2"));

    setup.join(court, "Bob").await;
    setup.join(court, "Carol").await;
    setup.join(court, "Dave").await;
    assert_eq!(setup.start(court).await.0, StatusCode::OK);
    assert_eq!(setup.start(court).await.0, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_reset_requeues_both_sides_in_order() {
    let setup = TestSetupBuilder::new()
        .with_queue(&["Alice", "Bob", "Carol"])
        .build()
        .await;
    let court = setup.court();
    setup.start(court).await;
    setup.end(court, "B").await;

    let (status, _) = setup
        .send("POST", &format!("/courts/{}/match/reset", court), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    CourtAssertion::for_court(&setup, court)
        .await
        .has_no_match()
        .has_queue(&["Alice", "Carol", "Bob"]);

    let (status, _) = setup
        .send("POST", &format!("/courts/{}/match/reset", court), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_move_top_entry_up_changes_nothing() {
    let setup = TestSetupBuilder::new()
        .with_queue(&["Alice", "Bob", "Carol"])
        .build()
        .await;
    let court = setup.court();

    let (status, json) = setup
        .send(
            "POST",
            &format!("/courts/{}/queue/1/move", court),
            Some(json!({"direction": "up"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("cannot move up"));

    CourtAssertion::for_court(&setup, court)
        .await
        .has_queue(&["Alice", "Bob", "Carol"]);

    let (status, _) = setup
        .send(
            "POST",
            &format!("/courts/{}/queue/3/move", court),
            Some(json!({"direction": "down"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_estimates_grow_with_queue_rank() {
    let setup = TestSetupBuilder::new()
        .with_queue(&["Alice", "Bob", "Carol", "Dave", "Erin", "Frank"])
        .build()
        .await;
    let court = setup.court();
    setup.start(court).await;

    let (_, queue) = setup
        .send("GET", &format!("/courts/{}/queue", court), None)
        .await;
    let minutes: Vec<i64> = queue
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["estimated_start_minutes"].as_i64().unwrap())
        .collect();
    assert_eq!(minutes.len(), 4);
    assert!(minutes.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(minutes[3] - minutes[2], 10);
}

#[tokio::test]
async fn test_courts_rotate_independently() {
    let setup = TestSetupBuilder::new().with_courts(2).build().await;
    let (one, two) = (setup.court_ids[0], setup.court_ids[1]);

    for name in ["Alice", "Bob"] {
        setup.join(one, name).await;
    }
    for name in ["Carol", "Dave", "Erin"] {
        setup.join(two, name).await;
    }
    setup.start(one).await;
    setup.start(two).await;
    setup.end(two, "B").await;

    CourtAssertion::for_court(&setup, one)
        .await
        .has_match(Some(("Alice", 0)), Some(("Bob", 0)));
    CourtAssertion::for_court(&setup, two)
        .await
        .has_match(Some(("Erin", 0)), Some(("Dave", 1)))
        .has_queue(&["Carol"]);
}

#[tokio::test]
async fn test_every_mutation_notifies_listeners() {
    let setup = TestSetupBuilder::new().with_queue(&["Alice", "Bob"]).build().await;
    let court = setup.court();
    let mut events = setup.state.event_bus.subscribe(court).await;

    setup.start(court).await;
    setup.end(court, "A").await;
    // Rejected operations do not notify
    setup.end(court, "A").await;

    let snapshots = setup.listener.snapshots_for(court).await;
    assert_eq!(snapshots.len(), 2);
    let last = snapshots.last().unwrap();
    assert_eq!(last.queue.len(), 1);
    assert_eq!(last.queue[0].entry.name, "Bob");
    assert_eq!(
        last.active_match.as_ref().unwrap().team_a.name.as_deref(),
        Some("Alice")
    );

    match events.recv().await.unwrap() {
        CourtEvent::StateChanged(snapshot) => assert!(snapshot.active_match.is_some()),
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_delete_court_cascades_and_frees_slot() {
    let setup = TestSetupBuilder::new()
        .with_courts(3)
        .with_queue(&["Alice", "Bob"])
        .build()
        .await;
    let court = setup.court();
    setup.start(court).await;
    setup.end(court, "A").await;

    let (status, _) = setup.send("DELETE", &format!("/courts/{}", court), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(setup.listener.deleted().await, vec![court]);

    let (status, json) = setup.send("POST", "/courts", Some(json!({"name": "Reborn"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["id"], court);

    CourtAssertion::for_court(&setup, court)
        .await
        .has_no_match()
        .has_queue(&[]);
    let (_, history) = setup.send("GET", "/history", None).await;
    assert!(history.as_array().unwrap().is_empty());
    assert_eq!(setup.undo(court).await.0, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_health_endpoint() {
    let setup = TestSetupBuilder::new().with_courts(0).build().await;
    let (status, json) = setup.send("GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_event_bus_listener_name() {
    let setup = TestSetupBuilder::new().build().await;
    assert_eq!(setup.state.event_bus.name(), "EventBus");
}
