//! 跨链桥 API
//!
//! 业务失败同样返回 HTTP 200，调用方只根据信封中的 `success` 分支。

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::{
    app_state::AppState,
    service::{BridgeEnvelope, WalletInfo},
};

/// 桥接请求体
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransferBody {
    /// ETH 金额，例如 "0.01"（也接受 JSON 数字）
    #[schema(value_type = Option<String>, example = "0.01")]
    pub amount: Option<Value>,
}

impl TransferBody {
    fn amount_text(&self) -> Option<String> {
        match self.amount.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// 请求体无法解析时按“缺少金额”处理，仍走完整的校验与汇报流程
fn amount_from(body: Result<Json<TransferBody>, JsonRejection>) -> Option<String> {
    match body {
        Ok(Json(body)) => body.amount_text(),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable bridge request body");
            None
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/deposit",
    request_body = TransferBody,
    responses(
        (status = 200, description = "存款结果（success 字段区分成功与失败）", body = BridgeEnvelope)
    ),
    tag = "Bridge"
)]
pub async fn deposit(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TransferBody>, JsonRejection>,
) -> Json<BridgeEnvelope> {
    let amount = amount_from(body);
    Json(state.bridge.deposit(amount.as_deref()).await)
}

#[utoipa::path(
    post,
    path = "/api/withdraw",
    request_body = TransferBody,
    responses(
        (status = 200, description = "提现发起结果（success 字段区分成功与失败）", body = BridgeEnvelope)
    ),
    tag = "Bridge"
)]
pub async fn withdraw(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TransferBody>, JsonRejection>,
) -> Json<BridgeEnvelope> {
    let amount = amount_from(body);
    Json(state.bridge.withdraw(amount.as_deref()).await)
}

#[utoipa::path(
    get,
    path = "/api/wallet-info",
    responses(
        (status = 200, description = "账户地址与 L1/L2 余额", body = WalletInfo)
    ),
    tag = "Bridge"
)]
pub async fn wallet_info(State(state): State<Arc<AppState>>) -> Json<WalletInfo> {
    Json(state.bridge.wallet_info().await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_accepts_string_and_number() {
        let body: TransferBody = serde_json::from_str(r#"{"amount":"0.01"}"#).unwrap();
        assert_eq!(body.amount_text().as_deref(), Some("0.01"));

        let body: TransferBody = serde_json::from_str(r#"{"amount":0.5}"#).unwrap();
        assert_eq!(body.amount_text().as_deref(), Some("0.5"));

        let body: TransferBody = serde_json::from_str(r#"{"amount":true}"#).unwrap();
        assert_eq!(body.amount_text(), None);

        let body: TransferBody = serde_json::from_str("{}").unwrap();
        assert_eq!(body.amount_text(), None);
    }
}
