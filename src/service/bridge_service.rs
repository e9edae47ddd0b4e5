//! 桥接服务门面
//! HTTP 处理器与命令行共用：选择编排器、计数并转换为信封

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    config::Config,
    domain::{
        account::Account,
        amount::format_eth_4dp,
        chain::ChainLayer,
        transfer::{Direction, TransferRequest},
    },
    metrics,
    service::{
        bridge_context::BridgeContext,
        deposit_orchestrator,
        evm_chain_client::EvmChainClient,
        observer::TracingObserver,
        result_reporter::{BridgeEnvelope, BridgeOperationResult},
        submission_gate::SubmissionGate,
        withdrawal_orchestrator,
    },
};

/// 钱包信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalletInfo {
    pub address: String,
    pub l1_balance: String,
    pub l2_balance: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct BridgeService {
    ctx: BridgeContext,
}

impl BridgeService {
    pub fn new(ctx: BridgeContext) -> Self {
        Self { ctx }
    }

    /// 基于配置创建 ethers 客户端（两条链共享同一个提交闸门）
    pub fn from_config(config: &Config, account: &Account) -> anyhow::Result<Self> {
        let gate = Arc::new(SubmissionGate::new());
        let poll = config.bridge.receipt_poll_interval();

        let l1 = EvmChainClient::new(config.endpoint(ChainLayer::L1), account, gate.clone(), poll)?;
        let l2 = EvmChainClient::new(config.endpoint(ChainLayer::L2), account, gate, poll)?;

        Ok(Self::new(BridgeContext::new(
            account.address(),
            config.bridge.clone(),
            Arc::new(l1),
            Arc::new(l2),
            Arc::new(TracingObserver),
        )))
    }

    /// 执行一次桥接；不做任何重试，重复调用会产生新的交易
    pub async fn execute(&self, request: &TransferRequest) -> BridgeOperationResult {
        metrics::inc_bridge_started(request.direction);

        let amount = request.amount.as_deref();
        let result = match request.direction {
            Direction::Deposit => deposit_orchestrator::run(&self.ctx, amount).await,
            Direction::Withdraw => withdrawal_orchestrator::run(&self.ctx, amount).await,
        };

        metrics::record_bridge_result(&result);
        result
    }

    pub async fn deposit(&self, amount: Option<&str>) -> BridgeEnvelope {
        let request = TransferRequest::new(Direction::Deposit, amount);
        self.envelope(&self.execute(&request).await)
    }

    pub async fn withdraw(&self, amount: Option<&str>) -> BridgeEnvelope {
        let request = TransferRequest::new(Direction::Withdraw, amount);
        self.envelope(&self.execute(&request).await)
    }

    pub fn envelope(&self, result: &BridgeOperationResult) -> BridgeEnvelope {
        result.to_envelope(self.ctx.l1.endpoint(), self.ctx.l2.endpoint())
    }

    /// 并发读取两条链余额
    pub async fn wallet_info(&self) -> WalletInfo {
        let account = self.ctx.account;
        let (l1, l2) = tokio::join!(
            self.ctx.l1.get_balance(account),
            self.ctx.l2.get_balance(account)
        );

        let address = ethers::utils::to_checksum(&account, None);
        match (l1, l2) {
            (Ok(l1), Ok(l2)) => WalletInfo {
                address,
                l1_balance: format_eth_4dp(l1),
                l2_balance: format_eth_4dp(l2),
                error: None,
            },
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "Failed to fetch wallet balances");
                WalletInfo {
                    address,
                    l1_balance: "0.0000".into(),
                    l2_balance: "0.0000".into(),
                    error: Some(e.to_string()),
                }
            }
        }
    }
}
