//! Shared fixtures for integration tests

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tower::ServiceExt;

use gearlog_server::{
    api,
    clock::MockClock,
    config::AppConfig,
    models::{
        asset::{Asset, CreateAsset},
        checkout::{CreateCheckin, CreateCheckout},
        enums::{CheckoutType, ReturnCondition},
        user::{Role, UserClaims},
    },
    services::{notifications::LogNotifier, Services},
    AppState,
};

pub const SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub clock: MockClock,
    pub services: Services,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = SECRET.to_string();

        let clock = MockClock::fixed();
        let services = Services::in_memory(&config, Arc::new(clock.clone()), Arc::new(LogNotifier));
        let router = api::router(AppState {
            config: Arc::new(config),
            services: Arc::new(services.clone()),
        });

        Self {
            clock,
            services,
            router,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        use gearlog_server::clock::Clock;
        self.clock.now()
    }

    pub async fn onboard(&self, category: &str) -> Asset {
        self.services
            .registry
            .create(camera(category), "staff-1")
            .await
            .expect("asset onboarded")
    }

    /// Drive the router in-process; returns status and parsed JSON body
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
        idempotency_key: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(key) = idempotency_key {
            builder = builder.header("Idempotency-Key", key);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request built");

        let response = self.router.clone().oneshot(request).await.expect("router answered");
        read_json(response).await
    }
}

async fn read_json(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body read");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

pub fn token(user: &str, role: Role) -> String {
    let now = Utc::now().timestamp();
    UserClaims {
        sub: user.to_string(),
        role,
        iat: now,
        exp: now + 3600,
    }
    .create_token(SECRET)
    .expect("token minted")
}

pub fn camera(category: &str) -> CreateAsset {
    CreateAsset {
        category: category.to_string(),
        manufacturer: "Blackmagic".to_string(),
        model: "URSA Mini Pro".to_string(),
        serial_number: None,
        home_location: Some("Cage B".to_string()),
        purchase_date: None,
        purchase_price: None,
        daily_rate: None,
        notes: None,
    }
}

pub fn checkout_request(asset: &Asset, user: &str, due: DateTime<Utc>) -> CreateCheckout {
    CreateCheckout {
        asset_id: asset.id,
        user_id: user.to_string(),
        expected_return_date: due,
        event_name: Some("Festival".to_string()),
        checkout_type: CheckoutType::Event,
        notes: None,
        destination: None,
    }
}

pub fn checkin_request(condition: ReturnCondition) -> CreateCheckin {
    CreateCheckin {
        return_condition: condition,
        has_damage: false,
        damage_description: None,
        return_notes: None,
        return_location: None,
    }
}

pub fn days(n: i64) -> Duration {
    Duration::days(n)
}
