//! End-to-end tests for the route endpoint, driven through the full router.

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use searoute_gateway::{GatewayServer, Shutdown};

mod common;
use common::{CountingEngine, BOSTON, LONDON};

#[tokio::test]
async fn test_boston_to_london() {
    let engine = CountingEngine::atlantic();
    let server = GatewayServer::with_engine(common::test_config(), engine.clone());
    let router = server.router();

    let response = common::post_route(
        &router,
        &json!({ "origin": BOSTON, "destination": LONDON }),
        common::peer([10, 0, 0, 1]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let body = common::body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["units"], "nm");
    assert_eq!(body["distance"], 2846.5);
    assert_eq!(body["route"]["type"], "Feature");
    assert_eq!(body["route"]["geometry"]["type"], "LineString");
    assert_eq!(body["route"]["properties"]["length"], body["distance"]);
    assert_eq!(body["route"]["properties"]["units"], "nm");

    let coords = body["route"]["geometry"]["coordinates"].as_array().unwrap();
    assert_eq!(coords.first().unwrap(), &json!(BOSTON));
    assert_eq!(coords.last().unwrap(), &json!(LONDON));
    assert!(coords.len() >= 2);
    assert_eq!(engine.calls(), 1);
}

#[tokio::test]
async fn test_repeat_request_is_served_from_cache() {
    let engine = CountingEngine::atlantic();
    let server = GatewayServer::with_engine(common::test_config(), engine.clone());
    let router = server.router();
    let body = json!({ "origin": BOSTON, "destination": LONDON, "units": "km" });

    let first = common::post_route(&router, &body, common::peer([10, 0, 0, 1])).await;
    let second = common::post_route(&router, &body, common::peer([10, 0, 0, 2])).await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::OK);

    let first = common::body_bytes(first).await;
    let second = common::body_bytes(second).await;
    assert_eq!(first, second);
    assert_eq!(engine.calls(), 1);
    assert_eq!(server.state().cache.as_ref().unwrap().len(), 1);
}

#[tokio::test]
async fn test_units_are_part_of_the_cache_key() {
    let engine = CountingEngine::atlantic();
    let server = GatewayServer::with_engine(common::test_config(), engine.clone());
    let router = server.router();
    let peer = common::peer([10, 0, 0, 1]);

    for units in ["nm", "km", "nautical_miles"] {
        let body = json!({ "origin": BOSTON, "destination": LONDON, "units": units });
        let response = common::post_route(&router, &body, peer).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    // "nautical_miles" normalizes to the same key as "nm"
    assert_eq!(engine.calls(), 2);
}

#[tokio::test]
async fn test_expired_entry_is_recomputed() {
    let mut config = common::test_config();
    config.cache.ttl_secs = 1;
    let engine = CountingEngine::atlantic();
    let server = GatewayServer::with_engine(config, engine.clone());
    let router = server.router();
    let body = json!({ "origin": BOSTON, "destination": LONDON });
    let peer = common::peer([10, 0, 0, 1]);

    assert_eq!(common::post_route(&router, &body, peer).await.status(), StatusCode::OK);
    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(common::post_route(&router, &body, peer).await.status(), StatusCode::OK);

    assert_eq!(engine.calls(), 2);
}

#[tokio::test]
async fn test_missing_destination_has_no_side_effects() {
    let engine = CountingEngine::atlantic();
    let server = GatewayServer::with_engine(common::test_config(), engine.clone());
    let router = server.router();
    let peer = common::peer([10, 0, 0, 1]);

    let response = common::post_route(&router, &json!({ "origin": BOSTON }), peer).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "Both origin and destination points are required");

    assert_eq!(server.state().limiter.as_ref().unwrap().count("10.0.0.1"), 0);
    assert!(server.state().cache.as_ref().unwrap().is_empty());
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn test_malformed_points_are_rejected() {
    let engine = CountingEngine::atlantic();
    let server = GatewayServer::with_engine(common::test_config(), engine.clone());
    let router = server.router();
    let peer = common::peer([10, 0, 0, 1]);

    let bodies = [
        json!({ "origin": [1.0, 2.0, 3.0], "destination": LONDON }),
        json!({ "origin": BOSTON, "destination": [1.0] }),
        json!({ "origin": "boston", "destination": LONDON }),
        json!({ "origin": [200.0, 0.0], "destination": LONDON }),
        json!({ "origin": BOSTON, "destination": LONDON, "units": "furlongs" }),
    ];
    for body in &bodies {
        let response = common::post_route(&router, body, peer).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
    }

    let response = common::post_raw(&router, "not json".into(), peer).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn test_admission_ceiling_per_client() {
    let engine = CountingEngine::atlantic();
    let server = GatewayServer::with_engine(common::test_config(), engine.clone());
    let router = server.router();
    let body = json!({ "origin": BOSTON, "destination": LONDON });
    let noisy = common::peer([10, 0, 0, 1]);

    for _ in 0..5 {
        let response = common::post_route(&router, &body, noisy).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = common::post_route(&router, &body, noisy).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()["retry-after"], "1");

    // Other clients are unaffected
    let response = common::post_route(&router, &body, common::peer([10, 0, 0, 2])).await;
    assert_eq!(response.status(), StatusCode::OK);

    // A new window admits the noisy client again
    server.state().limiter.as_ref().unwrap().reset();
    let response = common::post_route(&router, &body, noisy).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rejected_requests_do_not_touch_the_cache() {
    let mut config = common::test_config();
    config.rate_limit.max_requests = 1;
    let engine = CountingEngine::atlantic();
    let server = GatewayServer::with_engine(config, engine.clone());
    let router = server.router();
    let peer = common::peer([10, 0, 0, 1]);

    let first = json!({ "origin": BOSTON, "destination": LONDON });
    let second = json!({ "origin": LONDON, "destination": BOSTON });
    assert_eq!(common::post_route(&router, &first, peer).await.status(), StatusCode::OK);
    assert_eq!(
        common::post_route(&router, &second, peer).await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );

    assert_eq!(engine.calls(), 1);
    assert_eq!(server.state().cache.as_ref().unwrap().len(), 1);
}

#[tokio::test]
async fn test_engine_failure_is_a_500_and_not_cached() {
    let engine = CountingEngine::failing("no maritime path from inland point");
    let server = GatewayServer::with_engine(common::test_config(), engine.clone());
    let router = server.router();
    let body = json!({ "origin": [10.45, 51.16], "destination": LONDON });
    let peer = common::peer([10, 0, 0, 1]);

    let response = common::post_route(&router, &body, peer).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = common::body_json(response).await;
    assert_eq!(json["error"], "Failed to calculate route");
    assert_eq!(json["message"], "no maritime path from inland point");

    assert!(server.state().cache.as_ref().unwrap().is_empty());

    // Failures are not cached, the next attempt asks the engine again
    let response = common::post_route(&router, &body, peer).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(engine.calls(), 2);
}

#[tokio::test]
async fn test_slow_engine_times_out() {
    let mut config = common::test_config();
    config.engine.timeout_secs = 1;
    let engine = CountingEngine::slow(Duration::from_millis(1500));
    let server = GatewayServer::with_engine(config, engine.clone());
    let router = server.router();

    let response = common::post_route(
        &router,
        &json!({ "origin": BOSTON, "destination": LONDON }),
        common::peer([10, 0, 0, 1]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(server.state().cache.as_ref().unwrap().is_empty());
}

#[tokio::test]
async fn test_request_timeout_layer_answers_408() {
    let mut config = common::test_config();
    config.http.request_timeout_secs = 1;
    config.engine.timeout_secs = 5;
    let engine = CountingEngine::slow(Duration::from_millis(1500));
    let server = GatewayServer::with_engine(config, engine);
    let router = server.router();

    let response = common::post_route(
        &router,
        &json!({ "origin": BOSTON, "destination": LONDON }),
        common::peer([10, 0, 0, 1]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
}

#[tokio::test]
async fn test_concurrent_misses_leave_one_entry() {
    let engine = CountingEngine::slow(Duration::from_millis(50));
    let server = GatewayServer::with_engine(common::test_config(), engine.clone());
    let router = server.router();
    let body = json!({ "origin": BOSTON, "destination": LONDON });

    let responses = futures_util::future::join_all([
        common::post_route(&router, &body, common::peer([10, 0, 0, 1])),
        common::post_route(&router, &body, common::peer([10, 0, 0, 2])),
    ])
    .await;

    for response in responses {
        assert_eq!(response.status(), StatusCode::OK);
    }
    assert_eq!(engine.calls(), 2);
    assert_eq!(server.state().cache.as_ref().unwrap().len(), 1);
}

#[tokio::test]
async fn test_health_bypasses_admission() {
    let mut config = common::test_config();
    config.rate_limit.max_requests = 1;
    let server = GatewayServer::with_engine(config, CountingEngine::atlantic());
    let router = server.router();

    for _ in 0..3 {
        let response = common::get(&router, "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(common::body_bytes(response).await, b"OK");
    }
}

#[tokio::test]
async fn test_disabled_cache_always_computes() {
    let mut config = common::test_config();
    config.cache.enabled = false;
    let engine = CountingEngine::atlantic();
    let server = GatewayServer::with_engine(config, engine.clone());
    let router = server.router();
    let body = json!({ "origin": BOSTON, "destination": LONDON });
    let peer = common::peer([10, 0, 0, 1]);

    for _ in 0..3 {
        assert_eq!(common::post_route(&router, &body, peer).await.status(), StatusCode::OK);
    }
    assert_eq!(engine.calls(), 3);
}

#[tokio::test]
async fn test_serves_over_tcp_until_shutdown() {
    let mut config = common::test_config();
    config.listener.host = "127.0.0.1".into();
    config.listener.port = common::free_port().await;

    let listener = searoute_gateway::net::bind(&config.listener).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = GatewayServer::with_engine(config, CountingEngine::atlantic());

    let shutdown = std::sync::Arc::new(Shutdown::new());
    let handle = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { server.run(listener, &shutdown).await })
    };

    let client = reqwest::Client::new();
    let res = client
        .post(format!("http://{addr}/route"))
        .json(&json!({ "origin": BOSTON, "destination": LONDON, "units": "mi" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["units"], "mi");

    let res = client.get(format!("http://{addr}/health")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "OK");

    shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), handle).await;
    assert!(matches!(result, Ok(Ok(Ok(())))));
}
