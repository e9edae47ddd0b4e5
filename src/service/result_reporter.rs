//! 结果汇报
//!
//! 每次编排恰好产生一个 `BridgeOperationResult`，再统一转换为调用方信封
//! `{ success, message, primaryTxId?, correlatedTxId?, error? }`。

use ethers::types::TxHash;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    domain::{
        amount::ValidAmount,
        chain::{ChainEndpoint, ChainLayer},
        transfer::Direction,
    },
    error::{BridgeError, BridgeErrorKind},
};

/// 失败原因（仅供日志与指标，不进入信封）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureReason {
    pub kind: BridgeErrorKind,
    pub layer: Option<ChainLayer>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeOperationResult {
    pub direction: Direction,
    pub success: bool,
    /// 存款为 L1 交易，提现为 L2 交易
    pub primary_tx_id: Option<TxHash>,
    /// 存款推导出的 L2 交易
    pub correlated_tx_id: Option<TxHash>,
    pub human_message: String,
    pub error_detail: Option<String>,
    pub failure: Option<FailureReason>,
}

impl BridgeOperationResult {
    pub fn deposit_succeeded(amount: &ValidAmount, l1_tx: TxHash, l2_tx: TxHash) -> Self {
        Self {
            direction: Direction::Deposit,
            success: true,
            primary_tx_id: Some(l1_tx),
            correlated_tx_id: Some(l2_tx),
            human_message: format!("Deposit {} ETH completed successfully", amount),
            error_detail: None,
            failure: None,
        }
    }

    pub fn withdrawal_initiated(amount: &ValidAmount, l2_tx: TxHash, challenge_days: u32) -> Self {
        Self {
            direction: Direction::Withdraw,
            success: true,
            primary_tx_id: Some(l2_tx),
            correlated_tx_id: None,
            human_message: format!(
                "Withdrawal of {} ETH initiated. Funds become available on L1 after the \
                 challenge period (~{} days); a separate finalization step is required after \
                 the window.",
                amount, challenge_days
            ),
            error_detail: None,
            failure: None,
        }
    }

    /// 失败结果：保留已经产生的交易哈希
    pub fn failed(
        direction: Direction,
        primary_tx_id: Option<TxHash>,
        correlated_tx_id: Option<TxHash>,
        err: &BridgeError,
    ) -> Self {
        let detail = err.to_string();
        let mut message = format!("{} failed: {}", direction.label(), detail);

        // L1 已确认、L2 仍未确认：资金已离开 L1，提示用户稍后查看
        if direction == Direction::Deposit
            && correlated_tx_id.is_some()
            && err.layer() == Some(ChainLayer::L2)
        {
            message.push_str(
                ". The L1 transaction is confirmed; the L2 deposit is still pending and may complete later",
            );
        }

        Self {
            direction,
            success: false,
            primary_tx_id,
            correlated_tx_id,
            human_message: message,
            error_detail: Some(detail),
            failure: Some(FailureReason {
                kind: err.kind(),
                layer: err.layer(),
            }),
        }
    }

    pub fn primary_layer(&self) -> ChainLayer {
        self.direction.source_layer()
    }

    /// 转换为调用方信封；按链附加浏览器链接
    pub fn to_envelope(&self, l1: &ChainEndpoint, l2: &ChainEndpoint) -> BridgeEnvelope {
        let endpoint_for = |layer: ChainLayer| match layer {
            ChainLayer::L1 => l1,
            ChainLayer::L2 => l2,
        };
        let primary_endpoint = endpoint_for(self.primary_layer());

        BridgeEnvelope {
            success: self.success,
            message: self.human_message.clone(),
            primary_tx_id: self.primary_tx_id.map(|h| format!("{:?}", h)),
            correlated_tx_id: self.correlated_tx_id.map(|h| format!("{:?}", h)),
            error: self.error_detail.clone(),
            primary_explorer_url: self
                .primary_tx_id
                .map(|h| primary_endpoint.explorer_tx_url(&h)),
            correlated_explorer_url: self
                .correlated_tx_id
                .map(|h| endpoint_for(ChainLayer::L2).explorer_tx_url(&h)),
        }
    }
}

/// 调用方看到的统一信封
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BridgeEnvelope {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_tx_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlated_tx_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_explorer_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlated_explorer_url: Option<String>,
}
