// HTTP request handlers. Thin wrappers: parse input, call the ledger, map
// typed failures onto status codes. User-visible messages are built here
// from the error payloads, never inside the core.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

use crate::app_state::SharedState;
use crate::error::LedgerError;
use crate::models::{Selection, WagerStatus, GUEST_STARTING_BALANCE};
use crate::money::Money;

/// Full route table, single builder.
pub fn app(state: SharedState) -> Router {
    Router::new()
        // ===== EVENT CATALOG =====
        .route("/events", get(get_events))
        .route("/events/:id", get(get_event))
        // ===== WAGERS =====
        .route("/bets", post(place_bet))
        .route("/bets/:id", get(get_bet))
        .route("/bets/:id/status", post(update_bet_status))
        // ===== USERS =====
        .route("/users", post(register_user))
        .route("/users/:email/bets", get(get_user_bets))
        .route("/users/:email/balance", get(get_balance))
        .route("/users/:email/resolve", post(resolve_user_bets))
        // ===== HEALTH CHECK =====
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn health_check() -> &'static str {
    "Golazo three-way book - online"
}

// ===== REQUEST TYPES =====

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBetRequest {
    pub event_id: String,
    pub email: String,
    pub selection: String,
    pub amount: f64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    pub email: String,
    pub name: Option<String>,
    pub balance: Option<f64>,
}

// ===== ERROR MAPPING =====

fn error_response(err: LedgerError) -> (StatusCode, Json<Value>) {
    let status = match &err {
        LedgerError::InvalidAmount(_)
        | LedgerError::InvalidSelection(_)
        | LedgerError::InvalidStatus(_) => StatusCode::BAD_REQUEST,
        LedgerError::EventNotFound(_)
        | LedgerError::BetNotFound(_)
        | LedgerError::UserNotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::AccountExists(_)
        | LedgerError::InsufficientBalance { .. }
        | LedgerError::AlreadyResolved { .. } => StatusCode::CONFLICT,
        LedgerError::StoreFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let mut body = json!({ "error": err.to_string() });
    match &err {
        LedgerError::InsufficientBalance { available, requested } => {
            body["available"] = json!(available);
            body["requested"] = json!(requested);
        }
        LedgerError::AlreadyResolved { status } => {
            body["status"] = json!(status);
        }
        _ => {}
    }

    (status, Json(body))
}

// ===== EVENT ENDPOINTS =====

pub async fn get_events(
    State(state): State<SharedState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let events = state.ledger.events().map_err(error_response)?;
    Ok(Json(json!(events)))
}

pub async fn get_event(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let event = state
        .ledger
        .event(&id)
        .map_err(error_response)?
        .ok_or_else(|| error_response(LedgerError::EventNotFound(id)))?;
    Ok(Json(json!(event)))
}

// ===== WAGER ENDPOINTS =====

pub async fn place_bet(
    State(state): State<SharedState>,
    Json(payload): Json<PlaceBetRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let selection: Selection = payload.selection.parse().map_err(error_response)?;

    let view = state
        .ledger
        .create_bet(&payload.event_id, &payload.email, selection, payload.amount)
        .map_err(error_response)?;

    tracing::info!(
        bet_id = %view.id,
        email = %payload.email,
        event_id = %payload.event_id,
        selection = %selection.as_str(),
        amount = payload.amount,
        "bet placed"
    );

    Ok((StatusCode::CREATED, Json(json!(view))))
}

pub async fn get_bet(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let view = state
        .ledger
        .get_bet_by_id(&id)
        .map_err(error_response)?
        .ok_or_else(|| error_response(LedgerError::BetNotFound(id)))?;
    Ok(Json(json!(view)))
}

pub async fn update_bet_status(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let new_status: WagerStatus = payload.status.parse().map_err(error_response)?;

    let view = state
        .ledger
        .update_bet_status(&id, new_status)
        .map_err(error_response)?;

    tracing::info!(bet_id = %id, status = %new_status.as_str(), "bet status updated");
    Ok(Json(json!(view)))
}

// ===== USER ENDPOINTS =====

pub async fn register_user(
    State(state): State<SharedState>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let balance = Money::from_f64(payload.balance.unwrap_or(GUEST_STARTING_BALANCE))
        .filter(|b| *b >= Money::ZERO)
        .ok_or_else(|| {
            error_response(LedgerError::InvalidAmount(
                "starting balance must be a non-negative number".to_string(),
            ))
        })?;

    let account = state
        .ledger
        .register_account(&payload.email, payload.name, balance)
        .map_err(error_response)?;

    tracing::info!(email = %account.email, balance = %account.balance, "account registered");
    Ok((StatusCode::CREATED, Json(json!(account))))
}

pub async fn get_user_bets(
    State(state): State<SharedState>,
    Path(email): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let bets = state.ledger.get_bets_by_user(&email).map_err(error_response)?;
    Ok(Json(json!(bets)))
}

pub async fn get_balance(
    State(state): State<SharedState>,
    Path(email): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let balance = state.ledger.user_balance(&email).map_err(error_response)?;
    Ok(Json(json!({ "email": email, "balance": balance })))
}

/// The profile-view flow: settle what can be settled, then return the
/// refreshed balance and bet list.
pub async fn resolve_user_bets(
    State(state): State<SharedState>,
    Path(email): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state.ledger.resolve_pending_bets(&email).map_err(error_response)?;

    let balance = state.ledger.user_balance(&email).map_err(error_response)?;
    let bets = state.ledger.get_bets_by_user(&email).map_err(error_response)?;

    tracing::info!(email = %email, balance = %balance, "pending bets resolved");
    Ok(Json(json!({ "email": email, "balance": balance, "bets": bets })))
}
