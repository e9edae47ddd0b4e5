//! 交易提交闸门
//!
//! 同一 (账户, 链) 的签名与广播必须串行，否则并发请求会拿到相同的 nonce。
//! 不同账户或不同链之间互不阻塞。

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use ethers::types::Address;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::chain::ChainLayer;

type GateKey = (Address, ChainLayer);

#[derive(Default)]
pub struct SubmissionGate {
    locks: Mutex<HashMap<GateKey, Arc<AsyncMutex<()>>>>,
}

impl SubmissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取 (账户, 链) 的提交许可；持有期间同键的其他提交等待
    pub async fn acquire(&self, account: Address, layer: ChainLayer) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = match self.locks.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            locks
                .entry((account, layer))
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        tracing::debug!(account = ?account, chain = %layer, "Waiting for submission slot");
        lock.lock_owned().await
    }
}
