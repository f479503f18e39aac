//! Route table and JSON handlers.
//!
//! Bodies are permissive: missing fields default, an absent or
//! malformed body counts as empty, and negative quantities are clamped
//! by the engine. Domain failures come back as HTTP 200 with
//! `ok: false` and a message; they are game feedback, not transport
//! errors.

use crate::state::AppState;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sim_core::{DaySummary, GameError};
use sim_engine::Snapshot;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/state", get(get_state))
        .route("/api/state", get(get_state))
        .route("/reset", post(reset))
        .route("/buy", post(buy))
        .route("/set_price", post(set_price))
        .route("/produce", post(produce))
        .route("/simulate", post(simulate))
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    msg: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        msg: "alive",
    })
}

async fn get_state(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.game().snapshot())
}

#[derive(Serialize)]
struct ActionResponse {
    ok: bool,
    message: String,
    state: Snapshot,
}

impl ActionResponse {
    fn from_result(result: Result<String, GameError>, snapshot: Snapshot) -> Self {
        match result {
            Ok(message) => Self {
                ok: true,
                message,
                state: snapshot,
            },
            Err(err) => Self {
                ok: false,
                message: err.to_string(),
                state: snapshot,
            },
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct BuyRequest {
    lemons: i64,
    sugar: i64,
    cups: i64,
}

async fn buy(
    State(state): State<AppState>,
    body: Option<Json<BuyRequest>>,
) -> Json<ActionResponse> {
    let Json(req) = body.unwrap_or_default();
    let mut game = state.game();
    let result = game.purchase_ingredients(req.lemons, req.sugar, req.cups);
    Json(ActionResponse::from_result(result, game.snapshot()))
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct SetPriceRequest {
    price: Option<f64>,
}

async fn set_price(
    State(state): State<AppState>,
    body: Option<Json<SetPriceRequest>>,
) -> Json<ActionResponse> {
    let Json(req) = body.unwrap_or_default();
    let mut game = state.game();
    let result = match req.price {
        // A missing price keeps the current one, which is always valid.
        None => {
            let current = game.state().sale_price_eur;
            game.set_sale_price(current)
        }
        Some(price) => match Decimal::from_f64(price) {
            Some(price) => game.set_sale_price(price),
            None => Err(GameError::InvalidPrice),
        },
    };
    Json(ActionResponse::from_result(result, game.snapshot()))
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ProduceRequest {
    qty: i64,
}

async fn produce(
    State(state): State<AppState>,
    body: Option<Json<ProduceRequest>>,
) -> Json<ActionResponse> {
    let Json(req) = body.unwrap_or_default();
    let mut game = state.game();
    let result = game.produce(req.qty);
    Json(ActionResponse::from_result(result, game.snapshot()))
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct SimulateRequest {
    #[serde(alias = "advertisingSpend")]
    advertising_spend: f64,
}

#[derive(Serialize)]
struct SimulateResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    day_summary: Option<DaySummary>,
    message: String,
    state: Snapshot,
}

async fn simulate(
    State(state): State<AppState>,
    body: Option<Json<SimulateRequest>>,
) -> Json<SimulateResponse> {
    let Json(req) = body.unwrap_or_default();
    let spend = Decimal::from_f64(req.advertising_spend).unwrap_or(Decimal::ZERO);
    let mut game = state.game();
    let report = game.advance_day(spend);
    Json(SimulateResponse {
        ok: true,
        day_summary: report.summary,
        message: report.message,
        state: game.snapshot(),
    })
}

#[derive(Serialize)]
struct ResetResponse {
    ok: bool,
    state: Snapshot,
}

async fn reset(State(state): State<AppState>) -> Json<ResetResponse> {
    let mut game = state.game();
    game.reset();
    Json(ResetResponse {
        ok: true,
        state: game.snapshot(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use sim_core::GameConfig;
    use tower::ServiceExt;

    fn test_router() -> Router {
        build_router(AppState::new(sim_engine::Game::new(GameConfig::default())))
    }

    async fn send(router: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = match body {
            Some(value) => Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(value.to_string()))
                .unwrap(),
            None => Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        };
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn health_is_alive() {
        let (status, body) = send(test_router(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["msg"], "alive");
    }

    #[tokio::test]
    async fn state_is_served_on_both_paths() {
        let router = test_router();
        let (_, plain) = send(router.clone(), "GET", "/state", None).await;
        let (_, api) = send(router, "GET", "/api/state", None).await;
        assert_eq!(plain["day"], 1);
        assert_eq!(plain["cash_eur"], "100.00");
        assert_eq!(plain, api);
    }

    #[tokio::test]
    async fn buy_produce_simulate_flow() {
        let router = test_router();

        let (status, body) = send(
            router.clone(),
            "POST",
            "/buy",
            Some(json!({"lemons": 10, "sugar": 10, "cups": 10})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["state"]["cash_eur"], "93.20");

        let (_, body) = send(router.clone(), "POST", "/produce", Some(json!({"qty": 10}))).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["state"]["prepared"], 10);

        let (_, body) = send(router.clone(), "POST", "/simulate", None).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["state"]["day"], 2);
        assert_eq!(
            body["state"]["balance_sheet"]["total_assets_eur"],
            body["state"]["balance_sheet"]["total_financing_eur"]
        );
    }

    #[tokio::test]
    async fn overdrawn_purchase_reports_ok_false() {
        let (status, body) = send(
            test_router(),
            "POST",
            "/buy",
            Some(json!({"lemons": 1000, "sugar": 0, "cups": 0})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], false);
        assert_eq!(body["state"]["cash_eur"], "100.00");
    }

    #[tokio::test]
    async fn invalid_price_is_rejected_and_missing_fields_default() {
        let router = test_router();
        let (_, body) = send(router.clone(), "POST", "/set_price", Some(json!({"price": 0}))).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["state"]["sale_price_eur"], "1.00");

        // Empty body: keep the current price, report success.
        let (_, body) = send(router.clone(), "POST", "/set_price", None).await;
        assert_eq!(body["ok"], true);

        let (_, body) = send(router, "POST", "/set_price", Some(json!({"price": 1.5}))).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["state"]["sale_price_eur"], "1.50");
    }

    #[tokio::test]
    async fn reset_restores_the_opening_state() {
        let router = test_router();
        let _ = send(
            router.clone(),
            "POST",
            "/buy",
            Some(json!({"lemons": 5, "sugar": 5, "cups": 5})),
        )
        .await;
        let (_, body) = send(router, "POST", "/reset", None).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["state"]["cash_eur"], "100.00");
        assert_eq!(body["state"]["day"], 1);
        assert_eq!(body["state"]["history"], json!([]));
    }

    #[tokio::test]
    async fn simulate_after_the_horizon_is_a_noop() {
        let router = test_router();
        for _ in 0..7 {
            let _ = send(router.clone(), "POST", "/simulate", None).await;
        }
        let (_, body) = send(router.clone(), "POST", "/simulate", None).await;
        assert_eq!(body["ok"], true);
        assert!(body["day_summary"].is_null());
        assert_eq!(body["state"]["ended"], true);
        let (_, again) = send(router, "POST", "/simulate", None).await;
        assert_eq!(again["state"]["day"], body["state"]["day"]);
    }
}
