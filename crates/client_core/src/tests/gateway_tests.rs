use super::*;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Mutex};

use crate::support::page;

#[derive(Clone, Default)]
struct BackendState {
    requests: Arc<Mutex<Vec<String>>>,
}

async fn user_summary(
    State(state): State<BackendState>,
    Path(username): Path<String>,
) -> Result<Json<Value>, (StatusCode, String)> {
    state.requests.lock().await.push(format!("/user/{username}"));
    match username.as_str() {
        "octocat" | "OctoCat" => Ok(Json(json!({
            "username": "octocat",
            "eventCount": 120,
            "repos": ["octocat/hello-world", "octocat/spoon-knife"]
        }))),
        "a b" => Ok(Json(json!({ "username": "a b", "eventCount": 0, "repos": [] }))),
        "garbled" => Ok(Json(json!({ "user": "garbled" }))),
        _ => Err((StatusCode::NOT_FOUND, "{\"error\":\"no such user\"}".to_string())),
    }
}

async fn user_events(
    State(state): State<BackendState>,
    Path((username, page)): Path<(String, u32)>,
) -> Result<Json<Value>, StatusCode> {
    state
        .requests
        .lock()
        .await
        .push(format!("/user/{username}/events/{page}"));
    if username != "octocat" || page > 3 {
        return Err(StatusCode::NOT_FOUND);
    }
    let events: Vec<Value> = (0..3)
        .map(|i| {
            json!({
                "type": if i == 0 { "PushEvent" } else { "WatchEvent" },
                "created_at": "2015-01-01T15:00:00Z",
                "repo": { "name": "octocat/hello-world" },
                "seq": (page - 1) * 50 + i
            })
        })
        .collect();
    Ok(Json(json!({ "events": events })))
}

async fn stats() -> Json<Value> {
    Json(json!({
        "eventCount": 9001,
        "latestEvent": "2015-01-01T15:00:00Z",
        "latestEventAge": 30
    }))
}

async fn spawn_backend() -> anyhow::Result<(String, BackendState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = BackendState::default();
    let app = Router::new()
        .route("/user/:username", get(user_summary))
        .route("/user/:username/events/:page", get(user_events))
        .route("/stats", get(stats))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), state))
}

fn gateway_for(api_base_url: String) -> HttpGateway {
    HttpGateway::new(&Settings {
        api_base_url,
        ..Settings::default()
    })
    .expect("gateway")
}

#[tokio::test]
async fn fetches_user_summary_as_profile() {
    let (server_url, backend) = spawn_backend().await.expect("spawn backend");
    let gateway = gateway_for(server_url);

    let profile = gateway
        .fetch_user_summary(&Username::new("OctoCat"))
        .await
        .expect("summary");

    assert_eq!(profile.username, Username::new("octocat"));
    assert_eq!(profile.profile_url, "https://github.com/octocat");
    assert_eq!(profile.event_count, 120);
    assert_eq!(profile.repos.len(), 2);
    assert_eq!(profile.event_page_count(), 3);
    assert_eq!(
        backend.requests.lock().await.clone(),
        vec!["/user/OctoCat".to_string()]
    );
}

#[tokio::test]
async fn fetches_event_page_by_number() {
    let (server_url, backend) = spawn_backend().await.expect("spawn backend");
    let gateway = gateway_for(server_url);

    let events = gateway
        .fetch_event_page(&Username::new("octocat"), page(2))
        .await
        .expect("page");

    assert_eq!(events.page_number, page(2));
    assert_eq!(events.events.len(), 3);
    assert_eq!(events.events[0].kind, "PushEvent");
    assert_eq!(events.events[1].kind, "WatchEvent");
    assert_eq!(events.events[0].payload.get("seq"), Some(&json!(50)));
    assert_eq!(
        backend.requests.lock().await.clone(),
        vec!["/user/octocat/events/2".to_string()]
    );
}

#[tokio::test]
async fn surfaces_error_payload_verbatim() {
    let (server_url, _backend) = spawn_backend().await.expect("spawn backend");
    let gateway = gateway_for(server_url);

    let err = gateway
        .fetch_user_summary(&Username::new("nobody"))
        .await
        .expect_err("not found");

    assert_eq!(
        err,
        GatewayError::Server(ApiError::new(404, "{\"error\":\"no such user\"}"))
    );
}

#[tokio::test]
async fn out_of_range_page_fails_remotely() {
    let (server_url, backend) = spawn_backend().await.expect("spawn backend");
    let gateway = gateway_for(server_url);

    let err = gateway
        .fetch_event_page(&Username::new("octocat"), page(7))
        .await
        .expect_err("no page 7");

    assert_eq!(err.api_error().map(|api| api.status), Some(404));
    assert_eq!(backend.requests.lock().await.len(), 1);
}

#[tokio::test]
async fn undecodable_body_is_a_decode_error() {
    let (server_url, _backend) = spawn_backend().await.expect("spawn backend");
    let gateway = gateway_for(server_url);

    let err = gateway
        .fetch_user_summary(&Username::new("garbled"))
        .await
        .expect_err("missing fields");

    assert!(matches!(err, GatewayError::Decode { .. }), "{err:?}");
}

#[tokio::test]
async fn usernames_are_percent_encoded_into_one_segment() {
    let (server_url, backend) = spawn_backend().await.expect("spawn backend");
    let gateway = gateway_for(format!("{server_url}/"));

    let profile = gateway
        .fetch_user_summary(&Username::new("a b"))
        .await
        .expect("summary");

    assert_eq!(profile.event_count, 0);
    assert_eq!(
        backend.requests.lock().await.clone(),
        vec!["/user/a b".to_string()]
    );
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let gateway = gateway_for(format!("http://{addr}"));

    let err = gateway
        .fetch_user_summary(&Username::new("octocat"))
        .await
        .expect_err("connection refused");

    assert!(matches!(err, GatewayError::Transport { .. }), "{err:?}");
}

#[tokio::test]
async fn fetches_service_stats() {
    let (server_url, _backend) = spawn_backend().await.expect("spawn backend");
    let gateway = gateway_for(server_url);

    let stats = gateway.fetch_stats().await.expect("stats");

    assert_eq!(stats.event_count, 9001);
    assert_eq!(stats.latest_event_age, 30);
}

#[test]
fn rejects_unusable_base_urls() {
    let err = HttpGateway::new(&Settings {
        api_base_url: "not a url".to_string(),
        ..Settings::default()
    })
    .err()
    .expect("invalid url");
    assert!(matches!(err, GatewayError::InvalidUrl { .. }));

    let err = HttpGateway::new(&Settings {
        api_base_url: "mailto:someone@example.com".to_string(),
        ..Settings::default()
    })
    .err()
    .expect("cannot be a base");
    assert!(matches!(err, GatewayError::InvalidUrl { .. }));
}

#[test]
fn profile_url_joins_with_single_slash() {
    let gateway = HttpGateway::new(&Settings {
        profile_base_url: "https://gh.example.test".to_string(),
        ..Settings::default()
    })
    .expect("gateway");
    assert_eq!(
        gateway.profile_url(&Username::new("octocat")),
        "https://gh.example.test/octocat"
    );
}
