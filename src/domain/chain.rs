//! 链配置模块
//!
//! 定义 L1（结算链）与 L2（Rollup）两个端点及桥合约地址

use std::fmt;

use ethers::types::{Address, TxHash};
use serde::{Deserialize, Serialize};

/// 链层级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainLayer {
    /// 基础结算链
    L1,
    /// Rollup 链
    L2,
}

impl ChainLayer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::L1 => "L1",
            Self::L2 => "L2",
        }
    }
}

impl fmt::Display for ChainLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// OP-stack 桥合约地址
///
/// `optimism_portal` 与 `l1_standard_bridge` 部署在 L1，
/// `l2_to_l1_message_passer` 是 L2 预部署合约。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeContracts {
    pub optimism_portal: Address,
    pub l1_standard_bridge: Address,
    pub l2_to_l1_message_passer: Address,
}

/// 链端点（进程生命周期内不可变）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEndpoint {
    pub layer: ChainLayer,
    pub chain_id: u64,
    pub name: String,
    pub rpc_url: String,
    pub explorer_url: String,
    pub contracts: BridgeContracts,
}

impl ChainEndpoint {
    /// 区块浏览器交易链接
    pub fn explorer_tx_url(&self, tx_hash: &TxHash) -> String {
        format!(
            "{}/tx/{:?}",
            self.explorer_url.trim_end_matches('/'),
            tx_hash
        )
    }
}
