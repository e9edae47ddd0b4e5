//! 链客户端抽象
//!
//! 每条链（L1 / L2）一个实例，编排器只通过此接口访问链。

use std::time::Duration;

use async_trait::async_trait;
use ethers::types::{Address, TransactionReceipt, TxHash, U256};

use crate::{
    domain::chain::{ChainEndpoint, ChainLayer},
    error::BridgeError,
    service::bridge_payload::BridgePayload,
};

#[async_trait]
pub trait ChainClient: Send + Sync {
    fn endpoint(&self) -> &ChainEndpoint;

    fn layer(&self) -> ChainLayer {
        self.endpoint().layer
    }

    /// 查询余额（wei）
    async fn get_balance(&self, address: Address) -> Result<U256, BridgeError>;

    /// 构建存款载荷（在 L2 客户端上调用，结果提交到 L1）
    async fn build_deposit_payload(
        &self,
        to: Address,
        mint: U256,
    ) -> Result<BridgePayload, BridgeError>;

    /// 构建提现载荷（在 L1 客户端上调用，结果提交到 L2）
    async fn build_withdrawal_payload(
        &self,
        to: Address,
        value: U256,
    ) -> Result<BridgePayload, BridgeError>;

    /// 签名并广播；同一 (账户, 链) 串行执行
    async fn submit_transaction(&self, payload: &BridgePayload) -> Result<TxHash, BridgeError>;

    /// 等待交易上链，超时返回 `ConfirmationTimeout`，回滚返回 `ChainRejected`
    async fn wait_for_confirmation(
        &self,
        tx_hash: TxHash,
        timeout: Duration,
    ) -> Result<TransactionReceipt, BridgeError>;

    /// 从本链已确认的回执推导对端链的交易哈希（存款：L1 回执 → L2 存款交易）
    fn derive_correlated_tx_id(&self, receipt: &TransactionReceipt)
        -> Result<TxHash, BridgeError>;
}
