use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::chain::ChainLayer;

/// 桥接方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// L1 → L2
    Deposit,
    /// L2 → L1
    Withdraw,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
        }
    }

    /// 用户可读的操作名
    pub fn label(&self) -> &'static str {
        match self {
            Self::Deposit => "Deposit",
            Self::Withdraw => "Withdrawal",
        }
    }

    /// 资金来源链（余额检查与首笔交易所在链）
    pub fn source_layer(&self) -> ChainLayer {
        match self {
            Self::Deposit => ChainLayer::L1,
            Self::Withdraw => ChainLayer::L2,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单次桥接请求（不可变，流程结束后丢弃）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub amount: Option<String>,
    pub direction: Direction,
}

impl TransferRequest {
    pub fn new(direction: Direction, amount: Option<&str>) -> Self {
        Self {
            amount: amount.map(str::to_string),
            direction,
        }
    }
}
