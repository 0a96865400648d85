//! REST and Server-Sent Events surface over the session registry.
//!
//! | Method | Path                       | Success                       |
//! |--------|----------------------------|-------------------------------|
//! | POST   | `/api/games?grid=N`        | 201, id and board             |
//! | GET    | `/api/games`               | 200, session summaries        |
//! | GET    | `/api/games/{id}`          | 200, snapshot                 |
//! | GET    | `/api/games/{id}/state`    | 200, snapshot                 |
//! | POST   | `/api/games/{id}/players`  | 201, snapshot after joining   |
//! | POST   | `/api/games/{id}/roll`     | 200, roll and winner          |
//! | GET    | `/api/games/{id}/stream`   | SSE, one snapshot per event   |
//!
//! Errors are JSON objects `{"error": "..."}`: 404 for an unknown or
//! malformed id, 400 for rejected requests.

use crate::{GameSession, SessionError, SessionId, SessionRegistry};
use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{Request, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use strictly_ladders::{GameError, GamePhase, GameSnapshot, Ladder, Snake};
use tower::ServiceBuilder;
use tracing::{info, instrument, warn};

// ─────────────────────────────────────────────────────────────
//  State and router
// ─────────────────────────────────────────────────────────────

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    registry: Arc<SessionRegistry>,
    default_grid_size: usize,
}

impl AppState {
    /// Wraps a registry; create requests without a grid size use `default_grid_size`.
    pub fn new(registry: Arc<SessionRegistry>, default_grid_size: usize) -> Self {
        Self {
            registry,
            default_grid_size,
        }
    }

    fn session(&self, raw_id: &str) -> Result<Arc<GameSession>, ApiError> {
        let id: SessionId = raw_id
            .parse()
            .map_err(|_| ApiError::UnknownSession(raw_id.to_string()))?;
        Ok(self.registry.require(id)?)
    }
}

/// Builds the application router with request logging.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/games", post(create_game).get(list_games))
        .route("/api/games/{id}", get(game_state))
        .route("/api/games/{id}/state", get(game_state))
        .route("/api/games/{id}/players", post(add_player))
        .route("/api/games/{id}/roll", post(roll_dice))
        .route("/api/games/{id}/stream", get(stream_updates))
        .layer(
            ServiceBuilder::new()
                .map_request(|req: Request<Body>| {
                    info!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
                    req
                })
                .map_response(|resp: Response| {
                    info!(status = %resp.status(), "Response sent");
                    resp
                }),
        )
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────
//  Errors
// ─────────────────────────────────────────────────────────────

/// Error returned from a handler.
#[derive(Debug, derive_more::Display)]
pub enum ApiError {
    /// Session-level failure.
    #[display("{}", _0)]
    Session(SessionError),

    /// The path id does not name any session.
    #[display("Game {} not found", _0)]
    UnknownSession(String),

    /// The request body could not be used.
    #[display("{}", _0)]
    BadRequest(String),
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Session(e) => Some(e),
            ApiError::UnknownSession(_) | ApiError::BadRequest(_) => None,
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(error: SessionError) -> Self {
        ApiError::Session(error)
    }
}

impl From<GameError> for ApiError {
    fn from(error: GameError) -> Self {
        ApiError::Session(SessionError::Game(error))
    }
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Session(SessionError::NotFound(_)) | ApiError::UnknownSession(_) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Session(SessionError::Game(_)) | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Session(SessionError::Encoding(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!(%status, error = %self, "Request rejected");
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

// ─────────────────────────────────────────────────────────────
//  Bodies
// ─────────────────────────────────────────────────────────────

/// Query string of a create request.
#[derive(Debug, Deserialize)]
pub struct CreateGameQuery {
    /// Requested grid size.
    pub grid: Option<usize>,
}

/// Response to a create request.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedGame {
    /// New session id.
    pub id: SessionId,
    /// Board side length.
    pub grid_size: usize,
    /// Snakes on the new board.
    pub snakes: Vec<Snake>,
    /// Ladders on the new board.
    pub ladders: Vec<Ladder>,
}

/// One row of the session listing.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    /// Session id.
    pub id: SessionId,
    /// Board side length.
    pub grid_size: usize,
    /// Players joined so far.
    pub players: usize,
    /// Lifecycle phase.
    pub phase: GamePhase,
}

/// Body of a join request.
#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    /// Display name of the joining player.
    pub name: String,
}

/// Response to a roll request.
#[derive(Debug, Serialize, Deserialize)]
pub struct RollResponse {
    /// Face rolled, absent when the game was already over.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll: Option<u8>,
    /// Winner, absent until decided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
}

// ─────────────────────────────────────────────────────────────
//  Handlers
// ─────────────────────────────────────────────────────────────

#[instrument(skip(app))]
async fn create_game(
    State(app): State<AppState>,
    Query(query): Query<CreateGameQuery>,
) -> Result<(StatusCode, Json<CreatedGame>), ApiError> {
    let grid = query.grid.unwrap_or(app.default_grid_size);
    let session = app.registry.create(grid)?;
    let board = session.board();
    Ok((
        StatusCode::CREATED,
        Json(CreatedGame {
            id: session.id(),
            grid_size: board.dimension().get(),
            snakes: board.snakes().to_vec(),
            ladders: board.ladders().to_vec(),
        }),
    ))
}

#[instrument(skip(app))]
async fn list_games(State(app): State<AppState>) -> Json<Vec<SessionSummary>> {
    let summaries = app
        .registry
        .sessions()
        .iter()
        .map(|session| {
            let snapshot = session.state();
            SessionSummary {
                id: session.id(),
                grid_size: snapshot.grid_size,
                players: snapshot.players.len(),
                phase: snapshot.phase,
            }
        })
        .collect();
    Json(summaries)
}

#[instrument(skip(app))]
async fn game_state(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GameSnapshot>, ApiError> {
    Ok(Json(app.session(&id)?.state()))
}

#[instrument(skip(app, body))]
async fn add_player(
    State(app): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<JoinRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<GameSnapshot>), ApiError> {
    let session = app.session(&id)?;
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Player name must not be empty".to_string()));
    }
    let snapshot = session.add_player(name)?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

#[instrument(skip(app))]
async fn roll_dice(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RollResponse>, ApiError> {
    let outcome = app.session(&id)?.roll_dice()?;
    Ok(Json(RollResponse {
        roll: outcome.roll().map(|r| r.value()),
        winner: outcome.winner().map(str::to_string),
    }))
}

#[instrument(skip(app))]
async fn stream_updates(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let subscription = app.session(&id)?.subscribe()?;
    info!(subscriber = subscription.id(), "SSE stream opened");
    let events = subscription
        .into_stream()
        .map(|update| Ok(Event::default().data(update.payload())));
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
