//! 跨链桥错误类型
//!
//! 所有错误在编排器边界被捕获并转换为 `BridgeOperationResult`，
//! 只有 `WalletNotConfigured` 在进程启动时是致命错误。

use ethers::types::TxHash;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::chain::ChainLayer;

/// 错误分类（稳定的 snake_case 代码，用于指标和日志）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BridgeErrorKind {
    InvalidAmount,
    WalletNotConfigured,
    InsufficientBalance,
    PayloadBuildError,
    SubmissionError,
    ConfirmationTimeout,
    ChainRejected,
    NetworkError,
}

impl BridgeErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidAmount => "invalid_amount",
            Self::WalletNotConfigured => "wallet_not_configured",
            Self::InsufficientBalance => "insufficient_balance",
            Self::PayloadBuildError => "payload_build_error",
            Self::SubmissionError => "submission_error",
            Self::ConfirmationTimeout => "confirmation_timeout",
            Self::ChainRejected => "chain_rejected",
            Self::NetworkError => "network_error",
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum BridgeError {
    #[error("Please enter a valid amount (min {min} ETH)")]
    InvalidAmount { min: Decimal },

    #[error("Wallet not configured: {0}")]
    WalletNotConfigured(String),

    #[error("Insufficient {layer} balance: requested {requested} ETH, available {available} ETH")]
    InsufficientBalance {
        layer: ChainLayer,
        requested: String,
        available: String,
    },

    #[error("Failed to build {layer} bridge payload: {message}")]
    PayloadBuild { layer: ChainLayer, message: String },

    #[error("Failed to submit {layer} transaction: {message}")]
    Submission { layer: ChainLayer, message: String },

    #[error("{layer} confirmation timed out after {timeout_ms} ms for transaction {tx_hash:?}")]
    ConfirmationTimeout {
        layer: ChainLayer,
        tx_hash: TxHash,
        timeout_ms: u64,
    },

    #[error("{layer} transaction {tx_hash:?} was reverted: {message}")]
    ChainRejected {
        layer: ChainLayer,
        tx_hash: TxHash,
        message: String,
    },

    #[error("{layer} network error: {message}")]
    Network { layer: ChainLayer, message: String },
}

impl BridgeError {
    pub fn kind(&self) -> BridgeErrorKind {
        match self {
            Self::InvalidAmount { .. } => BridgeErrorKind::InvalidAmount,
            Self::WalletNotConfigured(_) => BridgeErrorKind::WalletNotConfigured,
            Self::InsufficientBalance { .. } => BridgeErrorKind::InsufficientBalance,
            Self::PayloadBuild { .. } => BridgeErrorKind::PayloadBuildError,
            Self::Submission { .. } => BridgeErrorKind::SubmissionError,
            Self::ConfirmationTimeout { .. } => BridgeErrorKind::ConfirmationTimeout,
            Self::ChainRejected { .. } => BridgeErrorKind::ChainRejected,
            Self::Network { .. } => BridgeErrorKind::NetworkError,
        }
    }

    /// 出错的链（金额校验和钱包配置错误与链无关）
    pub fn layer(&self) -> Option<ChainLayer> {
        match self {
            Self::InvalidAmount { .. } | Self::WalletNotConfigured(_) => None,
            Self::InsufficientBalance { layer, .. }
            | Self::PayloadBuild { layer, .. }
            | Self::Submission { layer, .. }
            | Self::ConfirmationTimeout { layer, .. }
            | Self::ChainRejected { layer, .. }
            | Self::Network { layer, .. } => Some(*layer),
        }
    }

    pub fn payload_build(layer: ChainLayer, err: impl std::fmt::Display) -> Self {
        Self::PayloadBuild {
            layer,
            message: short_rpc_message(err),
        }
    }

    pub fn submission(layer: ChainLayer, err: impl std::fmt::Display) -> Self {
        Self::Submission {
            layer,
            message: short_rpc_message(err),
        }
    }

    pub fn network(layer: ChainLayer, err: impl std::fmt::Display) -> Self {
        Self::Network {
            layer,
            message: short_rpc_message(err),
        }
    }
}

/// 将 RPC / 签名器错误压缩为一行简短消息，避免把完整响应体暴露给调用方
fn short_rpc_message(err: impl std::fmt::Display) -> String {
    const MAX_LEN: usize = 160;

    let text = err.to_string();
    let first_line = text.lines().next().unwrap_or_default().trim();
    if first_line.chars().count() > MAX_LEN {
        let truncated: String = first_line.chars().take(MAX_LEN).collect();
        format!("{}...", truncated)
    } else {
        first_line.to_string()
    }
}
