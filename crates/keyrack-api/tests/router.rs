use std::sync::Arc;

use anyhow::Result;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use keyrack_api::{ApiServer, ApiState};
use keyrack_core::{Channel, InMemoryChannelStore};
use keyrack_telemetry::Metrics;
use serde_json::{Value, json};
use tower::ServiceExt;

const TOKEN: &str = "test-admin-token";

fn router(token: Option<&str>) -> Result<Router> {
    let store = InMemoryChannelStore::with_channels([
        Channel::new(1, "pool", "sk-alpha-0000aaaa\nsk-bravo-0000bbbb"),
        Channel::new(2, "solo", "sk-single-0000cccc"),
    ]);
    let state = ApiState::new(
        Arc::new(store),
        Metrics::new()?,
        token.map(str::to_string),
    );
    Ok(ApiServer::new(state).router())
}

async fn send(router: Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = router.oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    Ok((status, body))
}

fn json_request(method: &str, uri: &str, body: &Value) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body)?))?)
}

#[tokio::test]
async fn count_view_round_trip() -> Result<()> {
    let request = Request::get("/api/channel/1/key?view_mode=count").body(Body::empty())?;
    let (status, body) = send(router(None)?, request).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["key_count"], 2);
    assert_eq!(body["data"]["is_multi_key"], true);
    assert_eq!(body["data"]["keys"][1]["masked_key"], "sk-***bbbb");
    assert!(!body.to_string().contains("sk-alpha-0000aaaa"));
    Ok(())
}

#[tokio::test]
async fn invalid_channel_id_is_bad_request_envelope() -> Result<()> {
    let request = json_request("PATCH", "/api/channel/nope/key-mode", &json!({"enabled": true}))?;
    let (status, body) = send(router(None)?, request).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "invalid channel id");
    Ok(())
}

#[tokio::test]
async fn malformed_query_is_bad_request_envelope() -> Result<()> {
    let request = Request::get("/api/channel/1/key?view_mode=count&view_mode=masked")
        .body(Body::empty())?;
    let (status, body) = send(router(None)?, request).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(
        body["message"]
            .as_str()
            .is_some_and(|message| message.starts_with("invalid query"))
    );
    Ok(())
}

#[tokio::test]
async fn toggle_returns_new_mode() -> Result<()> {
    let router = router(None)?;
    let request = json_request("PATCH", "/api/channel/1/key-mode", &json!({"enabled": true}))?;
    let (status, body) = send(router.clone(), request).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["key_mode"], "polling");
    assert_eq!(body["data"]["enabled"], true);

    let view = Request::get("/api/channel/1/key").body(Body::empty())?;
    let (_, body) = send(router, view).await?;
    assert_eq!(body["data"]["multi_key_mode"], "polling");
    Ok(())
}

#[tokio::test]
async fn malformed_body_is_bad_request_envelope() -> Result<()> {
    let request = Request::builder()
        .method("PATCH")
        .uri("/api/channel/1/key-mode")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"enabled\": \"yes\"}"))?;
    let (status, body) = send(router(None)?, request).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn single_key_toggle_is_application_failure() -> Result<()> {
    let request = json_request("PATCH", "/api/channel/2/key-mode", &json!({"enabled": true}))?;
    let (status, body) = send(router(None)?, request).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body.get("data").is_none());
    Ok(())
}

#[tokio::test]
async fn strategy_endpoints_follow_envelope_rules() -> Result<()> {
    let router = router(None)?;
    let invalid = json_request(
        "PUT",
        "/api/channel/1/key-strategy",
        &json!({"polling_enabled": true, "polling_strategy": "weighted"}),
    )?;
    let (status, body) = send(router.clone(), invalid).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);

    let empty = json_request(
        "PATCH",
        "/api/channels/key-strategy",
        &json!({"channel_ids": [], "polling_enabled": true, "polling_strategy": "random"}),
    )?;
    let (status, body) = send(router.clone(), empty).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);

    let valid = json_request(
        "PUT",
        "/api/channel/1/key-strategy",
        &json!({"polling_enabled": true, "polling_strategy": "sequential"}),
    )?;
    let (_, body) = send(router, valid).await?;
    assert_eq!(body["data"]["polling_strategy"], "sequential");
    Ok(())
}

#[tokio::test]
async fn admin_token_guards_api_routes_only() -> Result<()> {
    let router = router(Some(TOKEN))?;

    let anonymous = Request::get("/api/channel/1/key").body(Body::empty())?;
    let (status, body) = send(router.clone(), anonymous).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let wrong = Request::get("/api/channel/1/key")
        .header(header::AUTHORIZATION, "Bearer not-the-token")
        .body(Body::empty())?;
    let (status, _) = send(router.clone(), wrong).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let authorised = Request::get("/api/channel/1/key")
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .body(Body::empty())?;
    let (status, body) = send(router.clone(), authorised).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let health = Request::get("/health").body(Body::empty())?;
    let (status, body) = send(router, health).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["channels"], 2);
    Ok(())
}

#[tokio::test]
async fn responses_carry_request_id_and_metrics_count_routes() -> Result<()> {
    let router = router(None)?;
    let response = router
        .clone()
        .oneshot(Request::get("/api/channel/1/key").body(Body::empty())?)
        .await?;
    assert!(response.headers().contains_key("x-request-id"));

    let response = router
        .oneshot(Request::get("/metrics").body(Body::empty())?)
        .await?;
    let text = String::from_utf8(to_bytes(response.into_body(), usize::MAX).await?.to_vec())?;
    assert!(text.contains("route=\"/api/channel/{id}/key\""));
    assert!(text.contains("key_views_total"));
    Ok(())
}
