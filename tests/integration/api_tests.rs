//! API integration tests, driving the router in-process

use axum::http::{Method, StatusCode};
use gearlog_server::models::{enums::AssetStatus, user::Role};
use serde_json::{json, Value};

use crate::common::{days, token, TestApp};

fn asset_body(serial: &str) -> Value {
    json!({
        "category": "camera",
        "manufacturer": "Red",
        "model": "Komodo 6K",
        "serial_number": serial,
        "home_location": "Cage C",
        "purchase_date": "2025-06-01",
        "daily_rate": "150.00"
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();
    let (status, body) = app.call(Method::GET, "/api/v1/health", None, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_requests_require_a_valid_token() {
    let app = TestApp::new();
    let (status, body) = app.call(Method::GET, "/api/v1/assets", None, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "NotAuthorized");

    let (status, _) = app
        .call(Method::GET, "/api/v1/assets", Some("not-a-jwt"), None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_members_cannot_onboard_assets() {
    let app = TestApp::new();
    let member = token("m1", Role::Member);
    let (status, _) = app
        .call(Method::POST, "/api/v1/assets", Some(&member), Some(asset_body("K-1")), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_onboard_and_duplicate_serial() {
    let app = TestApp::new();
    let staff = token("s1", Role::Staff);

    let (status, asset) = app
        .call(Method::POST, "/api/v1/assets", Some(&staff), Some(asset_body("K-1")), None)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(asset["status"], "AVAILABLE");
    assert_eq!(asset["current_location"], "Cage C");

    let (status, body) = app
        .call(Method::POST, "/api/v1/assets", Some(&staff), Some(asset_body("K-1")), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Duplicate");

    let id = asset["id"].as_str().unwrap();
    let (status, fetched) = app
        .call(Method::GET, &format!("/api/v1/assets/{}", id), Some(&staff), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["serial_number"], "K-1");
}

#[tokio::test]
async fn test_checkout_flow_over_http() {
    let app = TestApp::new();
    let asset = app.onboard("camera").await;
    let member = token("m1", Role::Member);
    let other = token("m2", Role::Member);
    let due = app.now() + days(2);

    // Members may only check out to themselves
    let (status, _) = app
        .call(
            Method::POST,
            "/api/v1/checkouts",
            Some(&member),
            Some(json!({ "asset_id": asset.id, "user_id": "m2", "expected_return_date": due })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, checkout) = app
        .call(
            Method::POST,
            "/api/v1/checkouts",
            Some(&member),
            Some(json!({
                "asset_id": asset.id,
                "user_id": "m1",
                "expected_return_date": due,
                "checkout_type": "event",
                "destination": "Main stage"
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(checkout["status"], "active");
    let checkout_id = checkout["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/checkouts",
            Some(&other),
            Some(json!({ "asset_id": asset.id, "user_id": "m2", "expected_return_date": due })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "AssetUnavailable");

    // Someone else's checkout cannot be returned by another member
    let (status, _) = app
        .call(
            Method::POST,
            &format!("/api/v1/checkouts/{}/checkin", checkout_id),
            Some(&other),
            Some(json!({ "return_condition": "good" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, checkin) = app
        .call(
            Method::POST,
            &format!("/api/v1/checkouts/{}/checkin", checkout_id),
            Some(&member),
            Some(json!({ "return_condition": "good", "has_damage": false })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(checkin["is_overdue"], false);

    let (status, body) = app
        .call(
            Method::POST,
            &format!("/api/v1/checkouts/{}/checkin", checkout_id),
            Some(&member),
            Some(json!({ "return_condition": "good" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "AlreadyReturned");

    let stored = app.services.registry.get(asset.id).await.unwrap();
    assert_eq!(stored.status, AssetStatus::Available);
}

#[tokio::test]
async fn test_idempotency_key_replays_checkout() {
    let app = TestApp::new();
    let asset = app.onboard("audio").await;
    let staff = token("s1", Role::Staff);
    let body = json!({
        "asset_id": asset.id,
        "user_id": "m1",
        "expected_return_date": app.now() + days(1)
    });

    let (first_status, first) = app
        .call(Method::POST, "/api/v1/checkouts", Some(&staff), Some(body.clone()), Some("abc-123"))
        .await;
    let (second_status, second) = app
        .call(Method::POST, "/api/v1/checkouts", Some(&staff), Some(body), Some("abc-123"))
        .await;

    assert_eq!(first_status, StatusCode::CREATED);
    assert_eq!(second_status, StatusCode::CREATED);
    assert_eq!(first["id"], second["id"]);

    // The same key on another asset is refused, not replayed
    let other = app.onboard("audio").await;
    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/checkouts",
            Some(&staff),
            Some(json!({
                "asset_id": other.id,
                "user_id": "m1",
                "expected_return_date": app.now() + days(1)
            })),
            Some("abc-123"),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Duplicate");
    let stored = app.services.registry.get(other.id).await.unwrap();
    assert_eq!(stored.status, AssetStatus::Available);
}

#[tokio::test]
async fn test_validation_errors_map_to_bad_request() {
    let app = TestApp::new();
    let asset = app.onboard("lens").await;
    let staff = token("s1", Role::Staff);

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/checkouts",
            Some(&staff),
            Some(json!({
                "asset_id": asset.id,
                "user_id": "m1",
                "expected_return_date": app.now() - days(1)
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");

    let (status, _) = app
        .call(
            Method::GET,
            &format!("/api/v1/assets/{}/history?types=teleported", asset.id),
            Some(&staff),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_retire_checked_out_asset_is_unprocessable() {
    let app = TestApp::new();
    let asset = app.onboard("camera").await;
    let staff = token("s1", Role::Staff);
    app.services
        .checkout
        .checkout(
            crate::common::checkout_request(&asset, "m1", app.now() + days(1)),
            "s1",
            None,
        )
        .await
        .unwrap();

    let (status, body) = app
        .call(
            Method::POST,
            &format!("/api/v1/assets/{}/retire", asset.id),
            Some(&staff),
            Some(json!({ "reason": "end of life" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "InvalidTransition");
}

#[tokio::test]
async fn test_history_pagination_over_http() {
    let app = TestApp::new();
    let asset = app.onboard("camera").await;
    let staff = token("s1", Role::Staff);

    for _ in 0..3 {
        let checkout = app
            .services
            .checkout
            .checkout(
                crate::common::checkout_request(&asset, "m1", app.now() + days(1)),
                "s1",
                None,
            )
            .await
            .unwrap();
        app.services
            .checkout
            .checkin(
                checkout.id,
                crate::common::checkin_request(gearlog_server::models::enums::ReturnCondition::Good),
                "s1",
                None,
            )
            .await
            .unwrap();
    }

    let uri = format!("/api/v1/assets/{}/history?limit=4", asset.id);
    let (status, page) = app.call(Method::GET, &uri, Some(&staff), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["events"].as_array().unwrap().len(), 4);
    let cursor = page["next_cursor"].as_str().unwrap();

    let uri = format!("/api/v1/assets/{}/history?limit=4&cursor={}", asset.id, cursor);
    let (status, rest) = app.call(Method::GET, &uri, Some(&staff), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let rest = rest["events"].as_array().unwrap();
    assert_eq!(rest.len(), 3);
    assert_eq!(rest.last().unwrap()["type"], "created");

    let member = token("m1", Role::Member);
    let uri = "/api/v1/users/m1/history?types=checkin";
    let (status, mine) = app.call(Method::GET, uri, Some(&member), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine["events"].as_array().unwrap().len(), 3);

    let (status, _) = app
        .call(Method::GET, "/api/v1/users/m2/history", Some(&member), None, None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_overdue_and_stats_endpoints() {
    let app = TestApp::new();
    let asset = app.onboard("camera").await;
    app.services
        .checkout
        .checkout(
            crate::common::checkout_request(&asset, "m1", app.now() + days(1)),
            "s1",
            None,
        )
        .await
        .unwrap();
    app.clock.advance(days(3));

    let member = token("m1", Role::Member);
    let (status, overdue) = app
        .call(Method::GET, "/api/v1/overdue", Some(&member), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let overdue = overdue.as_array().unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0]["days_overdue"], 2);
    assert_eq!(overdue[0]["user_id"], "m1");

    let outsider = token("m2", Role::Member);
    let (_, none) = app
        .call(Method::GET, "/api/v1/overdue", Some(&outsider), None, None)
        .await;
    assert!(none.as_array().unwrap().is_empty());

    let staff = token("s1", Role::Staff);
    let (status, stats) = app
        .call(
            Method::GET,
            &format!("/api/v1/assets/{}/stats", asset.id),
            Some(&staff),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_checkouts"], 1);
    assert_eq!(stats["utilization_rate"], 100.0);

    let (status, _) = app
        .call(
            Method::GET,
            &format!("/api/v1/assets/{}/stats", asset.id),
            Some(&member),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_maintenance_and_availability_endpoints() {
    let app = TestApp::new();
    let a = app.onboard("lighting").await;
    let b = app.onboard("lighting").await;
    let staff = token("s1", Role::Staff);

    let (status, record) = app
        .call(
            Method::POST,
            &format!("/api/v1/assets/{}/maintenance", a.id),
            Some(&staff),
            Some(json!({ "issue_type": "bulb replacement", "priority": "high" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["status"], "scheduled");

    let from = app.now();
    let to = from + days(1);
    let window = format!(
        "from={}&to={}",
        urlencode(&from.to_rfc3339()),
        urlencode(&to.to_rfc3339())
    );

    let (status, found) = app
        .call(
            Method::GET,
            &format!("/api/v1/availability?category=lighting&{}", window),
            Some(&staff),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["asset_ids"], json!([b.id]));

    let (status, single) = app
        .call(
            Method::GET,
            &format!("/api/v1/assets/{}/availability?{}", a.id, window),
            Some(&staff),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(single["available"], false);

    let record_id = record["id"].as_str().unwrap();
    let (status, done) = app
        .call(
            Method::POST,
            &format!("/api/v1/maintenance/{}/complete", record_id),
            Some(&staff),
            Some(json!({ "work_performed": ["replaced bulb"], "total_cost": "42.50" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done["status"], "completed");

    let (_, history) = app
        .call(
            Method::GET,
            &format!("/api/v1/assets/{}/maintenance", a.id),
            Some(&staff),
            None,
            None,
        )
        .await;
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(app.services.registry.get(a.id).await.unwrap().status, AssetStatus::Available);
}

/// Minimal escaping for RFC 3339 timestamps in a query string
fn urlencode(raw: &str) -> String {
    raw.replace('+', "%2B").replace(':', "%3A")
}
