use std::{sync::Arc, time::Instant};

use axum::{
    extract::{MatchedPath, Request, State},
    http::HeaderValue,
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::Level;
use utoipa::{OpenApi, ToSchema};

use crate::{
    api::middleware::{extract_trace_id, trace_id_middleware},
    app_state::AppState,
};

pub mod bridge_api;
pub mod middleware;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "GIWA Bridge API",
        version = "0.1.0",
        description = "ETH bridge between Sepolia (L1) and GIWA Sepolia (L2)"
    ),
    paths(bridge_api::deposit, bridge_api::withdraw, bridge_api::wallet_info, healthz),
    components(schemas(
        bridge_api::TransferBody,
        crate::service::BridgeEnvelope,
        crate::service::WalletInfo,
        Healthz
    )),
    tags((name = "Bridge", description = "L1 ↔ L2 ETH 桥接"))
)]
pub struct ApiDoc;

#[derive(Debug, Serialize, ToSchema)]
pub struct Healthz {
    pub status: String,
    pub l1_chain_id: u64,
    pub l2_chain_id: u64,
    pub version: String,
    pub timestamp: String,
}

#[utoipa::path(
    get,
    path = "/healthz",
    responses((status = 200, description = "OK", body = Healthz))
)]
pub async fn healthz(State(st): State<Arc<AppState>>) -> Json<Healthz> {
    Json(Healthz {
        status: "ok".into(),
        l1_chain_id: st.config.l1.chain_id,
        l2_chain_id: st.config.l2.chain_id,
        version: env!("CARGO_PKG_VERSION").into(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/deposit", post(bridge_api::deposit))
        .route("/api/withdraw", post(bridge_api::withdraw))
        .route("/api/wallet-info", get(bridge_api::wallet_info))
        .route("/healthz", get(healthz))
        .route(
            "/metrics",
            get(|| async { crate::metrics::render_prometheus().into_response() }),
        )
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .route_layer(from_fn(count_route))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(from_fn(trace_id_middleware))
                .layer(from_fn(add_response_time_header))
                .layer(from_fn(trace_log)),
        )
        .with_state(state)
}

async fn add_response_time_header(req: Request, next: axum::middleware::Next) -> Response {
    let start = Instant::now();
    let mut resp = next.run(req).await;
    let elapsed_ms = start.elapsed().as_millis().to_string();
    resp.headers_mut().insert(
        "x-response-time",
        HeaderValue::from_str(&format!("{}ms", elapsed_ms))
            .unwrap_or(HeaderValue::from_static("0ms")),
    );
    resp
}

async fn trace_log(req: Request, next: axum::middleware::Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();
    let req_id = req
        .headers()
        .get(middleware::trace_id::REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let trace_id = extract_trace_id(&req).unwrap_or_else(|| "-".into());

    let resp = next.run(req).await;
    let status = resp.status();
    let elapsed = start.elapsed().as_millis();
    tracing::event!(
        Level::INFO,
        request_id = %req_id,
        trace_id = %trace_id,
        method = %method,
        path = %path,
        status = %status.as_u16(),
        elapsed_ms = %elapsed,
        "http_request"
    );
    resp
}

/// 按路由模板计数（MatchedPath 只在路由匹配之后可见）
async fn count_route(req: Request, next: axum::middleware::Next) -> Response {
    if let Some(route) = req.extensions().get::<MatchedPath>() {
        crate::metrics::count_request(route.as_str());
    }
    next.run(req).await
}
