//! 桥接账户
//!
//! 进程启动时从私钥派生一次，作为两条链上的资金来源与接收地址。

use std::fmt;

use ethers::{
    signers::{LocalWallet, Signer},
    types::Address,
};

use crate::error::BridgeError;

/// 私钥环境变量（按优先级）
pub const PRIVATE_KEY_ENV_VARS: [&str; 2] = ["BRIDGE_PRIVATE_KEY", "TEST_PRIVATE_KEY"];

#[derive(Clone)]
pub struct Account {
    wallet: LocalWallet,
}

impl Account {
    /// 从 0x 前缀的十六进制私钥创建账户
    pub fn from_private_key(key: &str) -> Result<Self, BridgeError> {
        let key = key.trim();
        if !key.starts_with("0x") {
            return Err(BridgeError::WalletNotConfigured(
                "private key must start with 0x".into(),
            ));
        }

        let wallet = key[2..]
            .parse::<LocalWallet>()
            .map_err(|_| BridgeError::WalletNotConfigured("private key is not valid".into()))?;

        Ok(Self { wallet })
    }

    /// 从环境变量加载（缺失即为致命的配置错误）
    pub fn from_env() -> Result<Self, BridgeError> {
        let key = PRIVATE_KEY_ENV_VARS
            .iter()
            .find_map(|name| std::env::var(name).ok().filter(|v| !v.trim().is_empty()))
            .ok_or_else(|| {
                BridgeError::WalletNotConfigured(format!(
                    "set {} in .env",
                    PRIVATE_KEY_ENV_VARS[0]
                ))
            })?;

        Self::from_private_key(&key)
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    /// 绑定到指定链 ID 的签名钱包（EIP-155）
    pub fn signer_for_chain(&self, chain_id: u64) -> LocalWallet {
        self.wallet.clone().with_chain_id(chain_id)
    }
}

// 不输出私钥
impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address())
            .finish()
    }
}
