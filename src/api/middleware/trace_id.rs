//! Trace ID / Request ID 中间件
//! 为每个请求生成或沿用 trace_id，写入请求扩展与响应头

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use uuid::Uuid;

pub const TRACE_ID_HEADER: &str = "x-trace-id";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// 请求扩展中的 trace_id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceId(pub String);

pub struct TraceIdGenerator;

impl TraceIdGenerator {
    pub fn generate() -> String {
        Uuid::new_v4().to_string()
    }

    /// 优先沿用调用方传入的 X-Trace-Id
    pub fn get_or_generate(req: &Request) -> String {
        req.headers()
            .get(TRACE_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .filter(|v| !v.is_empty() && v.len() <= 128)
            .map(str::to_string)
            .unwrap_or_else(Self::generate)
    }
}

pub async fn trace_id_middleware(mut req: Request, next: Next) -> Response {
    let trace_id = TraceIdGenerator::get_or_generate(&req);
    let request_id = TraceIdGenerator::generate();

    req.extensions_mut().insert(TraceId(trace_id.clone()));
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        req.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    let mut response = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(&trace_id) {
        response.headers_mut().insert(TRACE_ID_HEADER, value);
    }
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

pub fn extract_trace_id(req: &Request) -> Option<String> {
    req.extensions().get::<TraceId>().map(|t| t.0.clone())
}
