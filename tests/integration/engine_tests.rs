//! Engine scenarios against the library API

use std::collections::HashSet;

use gearlog_server::{
    error::AppError,
    models::{
        checkout::CreateCheckin,
        enums::{AssetStatus, EventType, ReturnCondition},
        ledger::LedgerFilter,
        stats::StatsQuery,
    },
};

use crate::common::{checkin_request, checkout_request, days, TestApp};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_checkouts_have_one_winner() {
    let app = TestApp::new();
    let asset = app.onboard("camera").await;
    let due = app.now() + days(2);

    let mut handles = Vec::new();
    for i in 0..32 {
        let engine = app.services.checkout.clone();
        let request = checkout_request(&asset, &format!("user-{}", i), due);
        handles.push(tokio::spawn(async move {
            engine.checkout(request, "staff-1", None).await
        }));
    }

    let mut winners = Vec::new();
    let mut unavailable = 0;
    for handle in handles {
        match handle.await.expect("task joined") {
            Ok(checkout) => winners.push(checkout),
            Err(AppError::AssetUnavailable(_)) => unavailable += 1,
            Err(other) => panic!("unexpected error {:?}", other),
        }
    }

    assert_eq!(winners.len(), 1);
    assert_eq!(unavailable, 31);

    let stored = app.services.registry.get(asset.id).await.unwrap();
    assert_eq!(stored.status, AssetStatus::CheckedOut);
    assert_eq!(stored.current_holder.as_deref(), Some(winners[0].user_id.as_str()));
    assert_eq!(stored.active_checkout_id, Some(winners[0].id));

    let checkouts = app
        .services
        .ledger
        .timeline(asset.id)
        .into_iter()
        .filter(|e| e.event_type == EventType::Checkout)
        .count();
    assert_eq!(checkouts, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_checkins_close_once() {
    let app = TestApp::new();
    let asset = app.onboard("camera").await;
    let checkout = app
        .services
        .checkout
        .checkout(checkout_request(&asset, "u1", app.now() + days(1)), "staff-1", None)
        .await
        .unwrap();

    let checkout_id = checkout.id;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let engine = app.services.checkout.clone();
        handles.push(tokio::spawn(async move {
            engine
                .checkin(checkout_id, checkin_request(ReturnCondition::Good), "staff-1", None)
                .await
        }));
    }

    let mut closed = 0;
    for handle in handles {
        match handle.await.expect("task joined") {
            Ok(_) => closed += 1,
            Err(AppError::AlreadyReturned(_)) => {}
            Err(other) => panic!("unexpected error {:?}", other),
        }
    }
    assert_eq!(closed, 1);
}

#[tokio::test]
async fn test_checkout_checkin_scenario() {
    let app = TestApp::new();
    let asset = app.onboard("camera").await;

    let first = app
        .services
        .checkout
        .checkout(checkout_request(&asset, "user1", app.now() + days(3)), "staff-1", None)
        .await
        .unwrap();

    let second = app
        .services
        .checkout
        .checkout(checkout_request(&asset, "user2", app.now() + days(1)), "staff-1", None)
        .await;
    assert!(matches!(second, Err(AppError::AssetUnavailable(_))));

    let checkin = app
        .services
        .checkout
        .checkin(first.id, checkin_request(ReturnCondition::Good), "staff-1", None)
        .await
        .unwrap();
    assert!(!checkin.is_overdue);
    assert_eq!(checkin.user_id, "user1");

    let stored = app.services.registry.get(asset.id).await.unwrap();
    assert_eq!(stored.status, AssetStatus::Available);
    assert!(stored.current_holder.is_none());
    assert!(stored.active_checkout_id.is_none());

    // created + checkout + checkin
    let timeline = app.services.ledger.timeline(asset.id);
    assert_eq!(timeline.len(), 3);
    let transaction: Vec<_> = timeline
        .iter()
        .filter(|e| e.details.checkout_id() == Some(first.id))
        .map(|e| e.event_type)
        .collect();
    assert_eq!(transaction, vec![EventType::Checkout, EventType::Checkin]);
}

#[tokio::test]
async fn test_checkin_with_same_key_is_applied_once() {
    let app = TestApp::new();
    let asset = app.onboard("audio").await;
    let checkout = app
        .services
        .checkout
        .checkout(checkout_request(&asset, "u1", app.now() + days(2)), "staff-1", None)
        .await
        .unwrap();

    let first = app
        .services
        .checkout
        .checkin(checkout.id, checkin_request(ReturnCondition::Excellent), "staff-1", Some("ret-7"))
        .await
        .unwrap();
    app.clock.advance(chrono::Duration::hours(1));
    let second = app
        .services
        .checkout
        .checkin(checkout.id, checkin_request(ReturnCondition::Excellent), "staff-1", Some("ret-7"))
        .await
        .unwrap();

    assert_eq!(first, second);
    let checkins = app
        .services
        .ledger
        .timeline(asset.id)
        .into_iter()
        .filter(|e| e.event_type == EventType::Checkin)
        .count();
    assert_eq!(checkins, 1);

    // Without the key the closed checkout is reported as such
    let again = app
        .services
        .checkout
        .checkin(checkout.id, checkin_request(ReturnCondition::Excellent), "staff-1", None)
        .await;
    assert!(matches!(again, Err(AppError::AlreadyReturned(_))));
}

#[tokio::test]
async fn test_past_return_date_is_rejected() {
    let app = TestApp::new();
    let asset = app.onboard("camera").await;

    for due in [app.now() - days(1), app.now()] {
        let result = app
            .services
            .checkout
            .checkout(checkout_request(&asset, "u1", due), "staff-1", None)
            .await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }
    let stored = app.services.registry.get(asset.id).await.unwrap();
    assert_eq!(stored.status, AssetStatus::Available);
    assert_eq!(app.services.ledger.timeline(asset.id).len(), 1);
}

#[tokio::test]
async fn test_damage_without_description_keeps_asset_out() {
    let app = TestApp::new();
    let asset = app.onboard("lens").await;
    let checkout = app
        .services
        .checkout
        .checkout(checkout_request(&asset, "u1", app.now() + days(2)), "staff-1", None)
        .await
        .unwrap();

    let result = app
        .services
        .checkout
        .checkin(
            checkout.id,
            CreateCheckin {
                has_damage: true,
                ..checkin_request(ReturnCondition::Poor)
            },
            "staff-1",
            None,
        )
        .await;
    assert!(matches!(result, Err(AppError::InvalidRequest(_))));

    let stored = app.services.registry.get(asset.id).await.unwrap();
    assert_eq!(stored.status, AssetStatus::CheckedOut);
    assert!(app.services.checkout.get(checkout.id).unwrap().is_active());
}

#[tokio::test]
async fn test_damaged_return_goes_to_maintenance_until_completed() {
    let app = TestApp::new();
    let asset = app.onboard("lens").await;
    let checkout = app
        .services
        .checkout
        .checkout(checkout_request(&asset, "u1", app.now() + days(2)), "staff-1", None)
        .await
        .unwrap();

    let checkin = app
        .services
        .checkout
        .checkin(
            checkout.id,
            CreateCheckin {
                has_damage: true,
                damage_description: Some("Front element chipped".into()),
                ..checkin_request(ReturnCondition::Fair)
            },
            "staff-1",
            None,
        )
        .await
        .unwrap();

    let stored = app.services.registry.get(asset.id).await.unwrap();
    assert_eq!(stored.status, AssetStatus::Maintenance);
    let blocked = app
        .services
        .checkout
        .checkout(checkout_request(&asset, "u2", app.now() + days(1)), "staff-1", None)
        .await;
    assert!(matches!(blocked, Err(AppError::AssetUnavailable(_))));

    let record_id = checkin.maintenance_id.expect("record opened");
    app.services
        .maintenance
        .complete(record_id, Default::default(), "tech-1")
        .await
        .unwrap();
    let stored = app.services.registry.get(asset.id).await.unwrap();
    assert_eq!(stored.status, AssetStatus::Available);

    let stats = app
        .services
        .stats
        .asset_stats(asset.id, StatsQuery::default())
        .await
        .unwrap();
    assert_eq!(stats.total_damages, 1);
    assert_eq!(stats.total_maintenance, 2);
}

#[tokio::test]
async fn test_retire_rules() {
    let app = TestApp::new();
    let asset = app.onboard("camera").await;
    let checkout = app
        .services
        .checkout
        .checkout(checkout_request(&asset, "u1", app.now() + days(2)), "staff-1", None)
        .await
        .unwrap();

    let refused = app.services.registry.retire(asset.id, None, "staff-1").await;
    assert!(matches!(refused, Err(AppError::InvalidTransition(_))));

    app.services
        .checkout
        .checkin(checkout.id, checkin_request(ReturnCondition::Good), "staff-1", None)
        .await
        .unwrap();
    let retired = app.services.registry.retire(asset.id, None, "staff-1").await.unwrap();
    assert_eq!(retired.status, AssetStatus::Retired);

    let after = app
        .services
        .checkout
        .checkout(checkout_request(&asset, "u2", app.now() + days(1)), "staff-1", None)
        .await;
    assert!(matches!(after, Err(AppError::AssetUnavailable(_))));
    let from = app.now();
    assert!(!app
        .services
        .availability
        .is_available(asset.id, from, from + days(1))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_overdue_flag_frozen_and_reported() {
    let app = TestApp::new();
    let asset = app.onboard("camera").await;
    let checkout = app
        .services
        .checkout
        .checkout(checkout_request(&asset, "u1", app.now() + days(1)), "staff-1", None)
        .await
        .unwrap();

    app.clock.advance(days(3));
    let overdue = app.services.stats.overdue(Some("u1"));
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].days_overdue, 2);

    let checkin = app
        .services
        .checkout
        .checkin(checkout.id, checkin_request(ReturnCondition::Good), "staff-1", None)
        .await
        .unwrap();
    assert!(checkin.is_overdue);
    assert!(app.services.stats.overdue(None).is_empty());

    app.clock.advance(days(-10));
    let page = app
        .services
        .ledger
        .query(asset.id, None, &LedgerFilter::default())
        .unwrap();
    let recorded = page
        .events
        .iter()
        .find(|e| e.event_type == EventType::Checkin)
        .expect("checkin recorded");
    assert_eq!(recorded.details.checkout_id(), Some(checkout.id));
    assert_eq!(serde_json::to_value(&recorded.details).unwrap()["is_overdue"], true);
}

#[tokio::test]
async fn test_user_history_spans_assets() {
    let app = TestApp::new();
    let a = app.onboard("camera").await;
    let b = app.onboard("lighting").await;
    for asset in [&a, &b] {
        app.services
            .checkout
            .checkout(checkout_request(asset, "u9", app.now() + days(1)), "staff-1", None)
            .await
            .unwrap();
        app.clock.advance(chrono::Duration::minutes(5));
    }

    let page = app
        .services
        .ledger
        .query_by_user("u9", Some(10), &LedgerFilter::default());
    assert_eq!(page.events.len(), 2);
    assert_eq!(page.events[0].asset_id, b.id);
    let assets: HashSet<_> = page.events.iter().map(|e| e.asset_id).collect();
    assert_eq!(assets.len(), 2);
}
