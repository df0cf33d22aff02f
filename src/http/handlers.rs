//! Request handlers.

use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::cache::CachedEntry;
use crate::http::request::{request_id, PeerAddr};
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::route::{self, validate_body};
use crate::security::{client_key, Admission};

/// Liveness check. Bypasses admission control and the cache.
pub async fn health() -> &'static str {
    "OK"
}

/// `POST /route`.
pub async fn route(
    State(state): State<AppState>,
    PeerAddr(peer): PeerAddr,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let start = Instant::now();
    let response = match compute_route(&state, peer, &headers, &body).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    };
    metrics::record_request(response.status().as_u16(), start);
    response
}

async fn compute_route(
    state: &AppState,
    peer: Option<std::net::SocketAddr>,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Response, ApiError> {
    let request_id = request_id(headers);

    // 1. Validate fully before anything else sees the request
    let request = validate_body(body).inspect_err(|e| {
        tracing::debug!(request_id = %request_id, error = %e, "Rejected invalid route request");
    })?;

    // 2. Admission
    if let Some(limiter) = &state.limiter {
        let client = client_key(peer, headers, state.trust_forwarded_for);
        if limiter.check(&client) == Admission::Reject {
            tracing::warn!(request_id = %request_id, client = %client, "Rate limit exceeded");
            let window = limiter.window();
            let retry_after_secs = window.as_secs() + u64::from(window.subsec_nanos() > 0);
            return Err(ApiError::RateLimited { retry_after_secs });
        }
    }

    // 3. Cache lookup
    let key = request.cache_key();
    if let Some(cache) = &state.cache {
        if let Some(entry) = cache.get(&key) {
            metrics::record_cache_hit();
            tracing::debug!(request_id = %request_id, key = %key, "Route cache hit");
            return Ok(Json(entry.envelope.as_ref()).into_response());
        }
        metrics::record_cache_miss();
        tracing::debug!(request_id = %request_id, key = %key, "Route cache miss");
    }

    // 4. Compute
    let route = state
        .computer
        .compute(request.origin, request.destination, request.units)
        .await
        .inspect_err(|e| {
            tracing::error!(
                request_id = %request_id,
                origin = %request.origin,
                destination = %request.destination,
                units = %request.units,
                engine = state.computer.engine_name(),
                error = %e,
                "Error calculating route"
            );
        })?;

    // 5. Build, store, reply
    let envelope = route::build(&request, &route);
    let response = Json(&envelope).into_response();
    if let Some(cache) = &state.cache {
        cache.put(key, CachedEntry::new(envelope));
    }
    Ok(response)
}
