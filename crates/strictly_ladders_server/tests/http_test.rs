//! HTTP surface tests driven through the router without a socket.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::num::NonZeroUsize;
use std::sync::Arc;
use strictly_ladders::GameSnapshot;
use strictly_ladders_server::{AppState, SessionId, SessionRegistry, router};
use tower::ServiceExt;

fn app() -> (Router, Arc<SessionRegistry>) {
    let registry = Arc::new(SessionRegistry::new(20, NonZeroUsize::new(8).unwrap()));
    (router(AppState::new(Arc::clone(&registry), 10)), registry)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, value)
}

async fn create_with_players(app: &Router, names: &[&str]) -> u64 {
    let (status, created) = send(app, "POST", "/api/games", None).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_u64().unwrap();
    for name in names {
        let (status, _) = send(
            app,
            "POST",
            &format!("/api/games/{id}/players"),
            Some(json!({ "name": name })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    id
}

#[tokio::test]
async fn test_create_game_defaults_and_explicit_grid() {
    let (app, registry) = app();

    let (status, created) = send(&app, "POST", "/api/games", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 1);
    assert_eq!(created["gridSize"], 10);
    // A snake whose head lands on the final cell is discarded, so only
    // non-emptiness is stable across unseeded boards.
    assert!(!created["snakes"].as_array().unwrap().is_empty());
    assert!(!created["ladders"].as_array().unwrap().is_empty());

    let (status, created) = send(&app, "POST", "/api/games?grid=6", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 2);
    assert_eq!(created["gridSize"], 6);
    assert_eq!(registry.len(), 2);
}

#[tokio::test]
async fn test_create_game_rejects_bad_grid() {
    let (app, registry) = app();

    for uri in ["/api/games?grid=1", "/api/games?grid=21"] {
        let (status, body) = send(&app, "POST", uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string());
    }
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_state_routes_agree() {
    let (app, _) = app();
    let id = create_with_players(&app, &["Arun"]).await;

    let (status, plain) = send(&app, "GET", &format!("/api/games/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, state) = send(&app, "GET", &format!("/api/games/{id}/state"), None).await;
    assert_eq!(plain, state);

    let snapshot: GameSnapshot = serde_json::from_value(state).unwrap();
    assert_eq!(snapshot.players.len(), 1);
    assert_eq!(snapshot.players[0].name(), "Arun");
    assert!(snapshot.players[0].position().is_none());
    assert_eq!(snapshot.last_roll, 0);
    assert!(snapshot.winner.is_none());
}

#[tokio::test]
async fn test_unknown_and_malformed_ids_are_not_found() {
    let (app, _) = app();
    create_with_players(&app, &[]).await;

    for uri in [
        "/api/games/99",
        "/api/games/99/state",
        "/api/games/abc",
        "/api/games/-1/state",
    ] {
        let (status, body) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert!(body["error"].as_str().unwrap().contains("not found"));
    }

    let (status, _) = send(&app, "POST", "/api/games/42/roll", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(
        &app,
        "POST",
        "/api/games/42/players",
        Some(json!({ "name": "Arun" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_join_rejections() {
    let (app, _) = app();
    let id = create_with_players(&app, &["Arun"]).await;
    let uri = format!("/api/games/{id}/players");

    let (status, body) = send(&app, "POST", &uri, Some(json!({ "name": "ARUN" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Duplicate"));

    let (status, _) = send(&app, "POST", &uri, Some(json!({ "name": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "POST", &uri, Some(json!({ "nickname": "x" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_roll_requires_two_players() {
    let (app, _) = app();
    let id = create_with_players(&app, &["Arun"]).await;

    let (status, body) = send(&app, "POST", &format!("/api/games/{id}/roll"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("at least 2"));
}

#[tokio::test]
async fn test_roll_until_finished() {
    let (app, registry) = app();
    let id = create_with_players(&app, &["Arun", "Megha"]).await;
    let uri = format!("/api/games/{id}/roll");

    let mut winner = None;
    for _ in 0..100_000 {
        let (status, body) = send(&app, "POST", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let roll = body["roll"].as_u64().unwrap();
        assert!((1..=6).contains(&roll));
        if let Some(name) = body["winner"].as_str() {
            winner = Some(name.to_string());
            break;
        }
    }
    let winner = winner.unwrap();

    let (status, body) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("roll").is_none());
    assert_eq!(body["winner"], winner.as_str());

    let session = registry.get(SessionId::from(id)).unwrap();
    let version = session.state().version;
    send(&app, "POST", &uri, None).await;
    assert_eq!(session.state().version, version);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/games/{id}/players"),
        Some(json!({ "name": "Late" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_games() {
    let (app, _) = app();
    create_with_players(&app, &["Arun", "Megha"]).await;
    create_with_players(&app, &["Solo"]).await;

    let (status, list) = send(&app, "GET", "/api/games", None).await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["id"], 1);
    assert_eq!(list[0]["players"], 2);
    assert_eq!(list[0]["phase"], "active");
    assert_eq!(list[1]["id"], 2);
    assert_eq!(list[1]["phase"], "lobby");
}

#[tokio::test]
async fn test_stream_starts_with_current_snapshot() {
    let (app, registry) = app();
    let id = create_with_players(&app, &["Arun"]).await;
    let session = registry.get(SessionId::from(id)).unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/games/{id}/stream"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");
    assert_eq!(session.subscriber_count(), 1);

    let mut body = response.into_body();
    let frame = body.frame().await.unwrap().unwrap();
    let text = String::from_utf8(frame.into_data().unwrap().to_vec()).unwrap();
    let json = text
        .strip_prefix("data: ")
        .and_then(|rest| rest.strip_suffix("\n\n"))
        .unwrap();
    let snapshot: GameSnapshot = serde_json::from_str(json).unwrap();
    assert_eq!(snapshot.version, 1);
    assert_eq!(snapshot.players.len(), 1);

    session.add_player("Megha").unwrap();
    let frame = body.frame().await.unwrap().unwrap();
    let text = String::from_utf8(frame.into_data().unwrap().to_vec()).unwrap();
    assert!(text.contains("\"Megha\""));

    drop(body);
    assert_eq!(session.subscriber_count(), 0);
}
