#![allow(dead_code)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request},
    response::Response,
};
use hmac::{Hmac, Mac};
use private_theatre_api::{
    api::{GatewayError, PaymentGateway},
    app_state::AppState,
    auth::{JwtService, TokenType},
    config::JwtConfig,
    models::Role,
    params::{AddonParams, CreateSlotParams, CreateTheatreParams},
    repositories::Repositories,
    routes,
};
use serde_json::{Map, Value};
use sha2::Sha256;
use tower::ServiceExt;
use uuid::Uuid;

pub const PAYMENT_SECRET: &str = "rzp_test_secret";
const JWT_SECRET: &str = "test_secret_key_for_testing_purposes_only";

/// Payment gateway double that records every requested amount.
#[derive(Default)]
pub struct RecordingGateway {
    amounts: Mutex<Vec<i64>>,
}

impl RecordingGateway {
    pub fn amounts(&self) -> Vec<i64> {
        self.amounts.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    async fn create_order(&self, amount: i64) -> Result<String, GatewayError> {
        let mut amounts = self.amounts.lock().unwrap();
        amounts.push(amount);
        Ok(format!("order_test_{:04}", amounts.len()))
    }
}

pub struct Catalog {
    pub theatre_id: Uuid,
    pub slot_id: Uuid,
    pub addon_id: Uuid,
}

/// Application wired against in-memory repositories.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub gateway: Arc<RecordingGateway>,
    jwt: JwtService,
}

impl TestApp {
    pub fn new() -> Self {
        let jwt = JwtService::new(&JwtConfig {
            secret: JWT_SECRET.into(),
            access_token_exp_mins: 15,
            refresh_token_exp_mins: 60,
        });
        let gateway = Arc::new(RecordingGateway::default());
        let state = AppState::new(
            Repositories::in_memory(),
            gateway.clone(),
            jwt.clone(),
            PAYMENT_SECRET.into(),
        );
        let router = routes::app(state.clone(), Duration::from_secs(5));

        Self {
            router,
            state,
            gateway,
            jwt,
        }
    }

    pub fn token_for(&self, roles: &[Role]) -> String {
        self.jwt
            .issue(Uuid::new_v4(), roles, TokenType::Access)
            .expect("issue test token")
    }

    pub fn admin_token(&self) -> String {
        self.token_for(&[Role::Admin])
    }

    /// Admin token signed with the app's secret whose expiry already passed.
    pub fn expired_admin_token(&self) -> String {
        JwtService::new(&JwtConfig {
            secret: JWT_SECRET.into(),
            access_token_exp_mins: -5,
            refresh_token_exp_mins: -5,
        })
        .issue(Uuid::new_v4(), &[Role::Admin], TokenType::Access)
        .expect("issue expired test token")
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Seeds one slot, one theatre offering it and one addon.
    pub async fn seed_catalog(&self) -> Catalog {
        let admin = Uuid::new_v4();
        let slot = self
            .state
            .slots
            .create(
                CreateSlotParams {
                    start_time: 1080,
                    end_time: 1260,
                },
                admin,
            )
            .await
            .expect("seed slot");
        let theatre = self
            .state
            .theatres
            .create(
                CreateTheatreParams {
                    name: "Aurora".into(),
                    description: "Recliners and a 4K projector".into(),
                    price: 1999.0,
                    additional_price_per_head: 249.0,
                    min_capacity: 2,
                    max_capacity: 12,
                    default_capacity: 6,
                    slots: vec![slot.id.to_string()],
                },
                admin,
            )
            .await
            .expect("seed theatre");
        let addon = self
            .state
            .addons
            .create(
                AddonParams {
                    name: "Photo booth".into(),
                    category: "Photographs".into(),
                    price: 999.0,
                    meta_data: Map::new(),
                },
                admin,
            )
            .await
            .expect("seed addon");

        Catalog {
            theatre_id: theatre.id,
            slot_id: slot.id,
            addon_id: addon.id,
        }
    }
}

pub async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("response body is JSON")
}

pub fn sign(order_id: &str, payment_id: &str) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(PAYMENT_SECRET.as_bytes()).expect("hmac accepts any key");
    mac.update(format!("{order_id}|{payment_id}").as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
