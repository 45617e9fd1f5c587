//! HTTP routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use castline_domain::{
    BeginRejection, DomainError, PlayerId, RealmDiscoveryLog, RealmId, Season, SessionKey,
    SessionView, ToolSnapshot, WeatherEvent,
};

use crate::app::App;
use crate::infrastructure::environment::ActiveWeather;
use crate::infrastructure::ports::{EnvironmentPort, LedgerError};
use crate::use_cases::fishing::{
    ActionOutcome, FishIndex, FishInventory, FishingError, StaleAction, TodayFish,
};

use super::websocket;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route(
            "/api/realms/{realm}/players/{player}/fishing",
            get(current_view).delete(abandon),
        )
        .route(
            "/api/realms/{realm}/players/{player}/fishing/begin",
            post(begin),
        )
        .route(
            "/api/realms/{realm}/players/{player}/fishing/shake",
            post(shake),
        )
        .route(
            "/api/realms/{realm}/players/{player}/fishing/again",
            post(again),
        )
        .route(
            "/api/realms/{realm}/players/{player}/fishing/choice/{index}",
            post(choice),
        )
        .route(
            "/api/realms/{realm}/players/{player}/fish-index",
            get(fish_index),
        )
        .route(
            "/api/realms/{realm}/players/{player}/fish-inventory",
            get(fish_inventory),
        )
        .route(
            "/api/realms/{realm}/players/{player}/today-fish",
            get(player_today_fish),
        )
        .route("/api/realms/{realm}/players/{player}/tool", put(equip_tool))
        .route(
            "/api/realms/{realm}/players/{player}/bait",
            post(stock_bait),
        )
        .route("/api/realms/{realm}/today-fish", get(today_fish))
        .route("/api/realms/{realm}/discoveries", get(discoveries))
        .route("/api/weather", get(weather_status))
        .route("/api/weather/{event}/{action}", post(toggle_weather))
        .route("/ws", get(websocket::ws_handler))
}

async fn health() -> &'static str {
    "OK"
}

#[derive(Debug, Deserialize)]
struct PlayerPath {
    realm: RealmId,
    player: PlayerId,
}

impl PlayerPath {
    fn key(&self) -> SessionKey {
        SessionKey::new(self.player, self.realm)
    }
}

#[derive(Debug, Deserialize)]
struct ChoicePath {
    realm: RealmId,
    player: PlayerId,
    index: u32,
}

/// Body returned by every fishing action.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionResponse {
    Applied { view: SessionView },
    Ignored { detail: StaleAction, message: String },
}

impl IntoResponse for ActionOutcome {
    fn into_response(self) -> Response {
        match self {
            ActionOutcome::Applied(view) => {
                (StatusCode::OK, Json(ActionResponse::Applied { view })).into_response()
            }
            ActionOutcome::Ignored(detail) => (
                StatusCode::ACCEPTED,
                Json(ActionResponse::Ignored {
                    message: detail.to_string(),
                    detail,
                }),
            )
                .into_response(),
        }
    }
}

// =============================================================================
// Fishing actions
// =============================================================================

async fn begin(
    State(app): State<Arc<App>>,
    Path(path): Path<PlayerPath>,
) -> Result<ActionOutcome, ApiError> {
    let view = app.use_cases.fishing.controller.begin(path.key()).await?;
    Ok(ActionOutcome::Applied(view))
}

async fn shake(State(app): State<Arc<App>>, Path(path): Path<PlayerPath>) -> ActionOutcome {
    app.use_cases.fishing.controller.shake(path.key()).await
}

async fn choice(State(app): State<Arc<App>>, Path(path): Path<ChoicePath>) -> ActionOutcome {
    let key = SessionKey::new(path.player, path.realm);
    app.use_cases
        .fishing
        .controller
        .choice(key, path.index)
        .await
}

async fn again(
    State(app): State<Arc<App>>,
    Path(path): Path<PlayerPath>,
) -> Result<ActionOutcome, ApiError> {
    Ok(app.use_cases.fishing.controller.again(path.key()).await?)
}

async fn current_view(
    State(app): State<Arc<App>>,
    Path(path): Path<PlayerPath>,
) -> Result<Json<SessionView>, ApiError> {
    app.use_cases
        .fishing
        .controller
        .current_view(path.key())
        .await
        .map(Json)
        .ok_or(ApiError::NotFound)
}

async fn abandon(
    State(app): State<Arc<App>>,
    Path(path): Path<PlayerPath>,
) -> Result<StatusCode, ApiError> {
    if app.use_cases.fishing.controller.abandon(path.key()).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

// =============================================================================
// Queries
// =============================================================================

async fn fish_index(
    State(app): State<Arc<App>>,
    Path(path): Path<PlayerPath>,
) -> Result<Json<FishIndex>, ApiError> {
    let index = app
        .use_cases
        .fishing
        .queries
        .fish_index(path.player, path.realm)
        .await?;
    Ok(Json(index))
}

async fn fish_inventory(
    State(app): State<Arc<App>>,
    Path(path): Path<PlayerPath>,
) -> Result<Json<FishInventory>, ApiError> {
    let inventory = app
        .use_cases
        .fishing
        .queries
        .fish_inventory(path.player, path.realm)
        .await?;
    Ok(Json(inventory))
}

async fn player_today_fish(
    State(app): State<Arc<App>>,
    Path(path): Path<PlayerPath>,
) -> Result<Json<TodayFish>, ApiError> {
    let today = app
        .use_cases
        .fishing
        .queries
        .today_fish_for(path.player, path.realm)
        .await?;
    Ok(Json(today))
}

async fn today_fish(
    State(app): State<Arc<App>>,
    Path(realm): Path<RealmId>,
) -> Json<TodayFish> {
    Json(app.use_cases.fishing.queries.today_fish(realm))
}

async fn discoveries(
    State(app): State<Arc<App>>,
    Path(realm): Path<RealmId>,
) -> Json<RealmDiscoveryLog> {
    Json(app.use_cases.fishing.queries.realm_discoveries(realm))
}

// =============================================================================
// Loadout
// =============================================================================

async fn equip_tool(
    State(app): State<Arc<App>>,
    Path(path): Path<PlayerPath>,
    Json(tool): Json<ToolSnapshot>,
) -> Result<StatusCode, ApiError> {
    if app.stores.sessions.contains(&path.key()) {
        return Err(ApiError::Conflict(
            "Cannot change rods while fishing".into(),
        ));
    }
    tracing::info!(
        player_id = %path.player,
        realm_id = %path.realm,
        tool_id = %tool.item_id,
        durability = tool.durability,
        "Equipped fishing rod"
    );
    app.adapters.ledger.equip(path.player, path.realm, tool);
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct StockBait {
    amount: u32,
}

#[derive(Debug, Serialize)]
struct BaitBalance {
    bait_id: String,
    balance: u32,
}

async fn stock_bait(
    State(app): State<Arc<App>>,
    Path(path): Path<PlayerPath>,
    Json(body): Json<StockBait>,
) -> Result<Json<BaitBalance>, ApiError> {
    if body.amount == 0 {
        return Err(ApiError::BadRequest("amount must be positive".into()));
    }
    let bait_id = app.use_cases.fishing.controller.rules().bait_id.clone();
    let ledger = &app.adapters.ledger;
    ledger.stock(path.player, path.realm, &bait_id, body.amount);
    let balance = ledger.item_count(path.player, path.realm, &bait_id);
    Ok(Json(BaitBalance { bait_id, balance }))
}

// =============================================================================
// Weather
// =============================================================================

#[derive(Debug, Serialize)]
pub struct WeatherStatus {
    pub season: Season,
    pub next_season_change: DateTime<Utc>,
    pub catch_multiplier: f64,
    pub mutation_active: bool,
    pub active: Vec<ActiveWeather>,
}

#[derive(Debug, Serialize)]
struct WeatherToggle {
    event: WeatherEvent,
    changed: bool,
    #[serde(flatten)]
    status: WeatherStatus,
}

#[derive(Debug, Deserialize)]
struct WeatherQuery {
    /// Event length; runs until stopped when absent
    minutes: Option<u32>,
}

fn weather_snapshot(app: &App) -> WeatherStatus {
    let environment = &app.adapters.environment;
    WeatherStatus {
        season: environment.season(),
        next_season_change: environment.next_season_change(),
        catch_multiplier: environment.catch_multiplier(),
        mutation_active: environment.mutation_active(),
        active: environment.active(),
    }
}

async fn weather_status(State(app): State<Arc<App>>) -> Json<WeatherStatus> {
    Json(weather_snapshot(&app))
}

async fn toggle_weather(
    State(app): State<Arc<App>>,
    Path((event, action)): Path<(String, String)>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<WeatherToggle>, ApiError> {
    let event: WeatherEvent = event
        .parse()
        .map_err(|e: DomainError| ApiError::BadRequest(e.to_string()))?;
    let environment = &app.adapters.environment;
    let changed = match action.as_str() {
        "start" => {
            let duration = query
                .minutes
                .filter(|minutes| *minutes > 0)
                .map(|minutes| chrono::Duration::minutes(i64::from(minutes)));
            environment.start(event, duration)
        }
        "stop" => environment.stop(event),
        other => {
            return Err(ApiError::BadRequest(format!(
                "unknown weather action '{other}'"
            )))
        }
    };
    Ok(Json(WeatherToggle {
        event,
        changed,
        status: weather_snapshot(&app),
    }))
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found")]
    NotFound,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Rejected(BeginRejection),
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct RejectionBody {
    message: String,
    rejection: BeginRejection,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg).into_response(),
            ApiError::Rejected(rejection) => (
                StatusCode::CONFLICT,
                Json(RejectionBody {
                    message: rejection.to_string(),
                    rejection,
                }),
            )
                .into_response(),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg).into_response(),
            ApiError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
            }
        }
    }
}

impl From<FishingError> for ApiError {
    fn from(e: FishingError) -> Self {
        match e {
            FishingError::Rejected(rejection) => ApiError::Rejected(rejection),
            FishingError::Superseded => ApiError::Conflict(e.to_string()),
            FishingError::SurfaceUnreachable => {
                tracing::warn!(error = %e, "Fishing session abandoned on begin");
                ApiError::Unavailable(e.to_string())
            }
            other => {
                tracing::error!(error = %other, "Fishing action failed");
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        tracing::error!(error = %e, "Ledger query failed");
        ApiError::Internal(e.to_string())
    }
}
