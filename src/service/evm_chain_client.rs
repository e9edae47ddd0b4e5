//! 基于 ethers-rs 的 EVM 链客户端
//! 一个实例对应一条链（L1 或 L2）与一个签名账户

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use ethers::{
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::LocalWallet,
    types::{
        transaction::eip2718::TypedTransaction, Address, Bytes, Eip1559TransactionRequest,
        TransactionReceipt, TxHash, U256, U64,
    },
};

use crate::{
    domain::{
        account::Account,
        chain::{ChainEndpoint, ChainLayer},
    },
    error::BridgeError,
    service::{
        bridge_payload::{BridgePayload, DepositPayload, WithdrawalPayload},
        chain_client::ChainClient,
        deposit_derivation,
        submission_gate::SubmissionGate,
    },
};

pub type EthSigner = SignerMiddleware<Provider<Http>, LocalWallet>;

pub struct EvmChainClient {
    endpoint: ChainEndpoint,
    provider: Provider<Http>,
    signer: EthSigner,
    gate: Arc<SubmissionGate>,
    poll_interval: Duration,
}

impl EvmChainClient {
    pub fn new(
        endpoint: ChainEndpoint,
        account: &Account,
        gate: Arc<SubmissionGate>,
        poll_interval: Duration,
    ) -> anyhow::Result<Self> {
        let provider = Provider::<Http>::try_from(endpoint.rpc_url.as_str())
            .with_context(|| format!("Invalid {} RPC url: {}", endpoint.layer, endpoint.rpc_url))?
            .interval(poll_interval);

        let signer = SignerMiddleware::new(
            provider.clone(),
            account.signer_for_chain(endpoint.chain_id),
        );

        tracing::info!(
            chain = %endpoint.layer,
            chain_id = endpoint.chain_id,
            name = %endpoint.name,
            rpc = %endpoint.rpc_url,
            "✅ EVM chain client initialized"
        );

        Ok(Self {
            endpoint,
            provider,
            signer,
            gate,
            poll_interval,
        })
    }

    fn account(&self) -> Address {
        self.signer.address()
    }

    /// 估算普通转账的执行 gas（不附带 value，避免目标链余额不足导致估算失败）
    async fn estimate_transfer_gas(&self, to: Address) -> Result<u64, BridgeError> {
        let tx: TypedTransaction = Eip1559TransactionRequest::new()
            .from(self.account())
            .to(to)
            .into();

        let gas = self
            .provider
            .estimate_gas(&tx, None)
            .await
            .map_err(|e| BridgeError::payload_build(self.layer(), e))?;

        Ok(gas.min(U256::from(u64::MAX)).as_u64())
    }

    fn expect_layer(&self, expected: ChainLayer, what: &str) -> Result<(), BridgeError> {
        if self.layer() != expected {
            return Err(BridgeError::PayloadBuild {
                layer: self.layer(),
                message: format!("{} payloads must be built against {}", what, expected),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ChainClient for EvmChainClient {
    fn endpoint(&self) -> &ChainEndpoint {
        &self.endpoint
    }

    async fn get_balance(&self, address: Address) -> Result<U256, BridgeError> {
        let balance = self
            .provider
            .get_balance(address, None)
            .await
            .map_err(|e| BridgeError::network(self.layer(), e))?;

        tracing::debug!(
            chain = %self.layer(),
            address = ?address,
            balance_wei = %balance,
            "Fetched balance"
        );

        Ok(balance)
    }

    async fn build_deposit_payload(
        &self,
        to: Address,
        mint: U256,
    ) -> Result<BridgePayload, BridgeError> {
        self.expect_layer(ChainLayer::L2, "deposit")?;

        // L2 上的执行 gas
        let gas_limit = self.estimate_transfer_gas(to).await?;

        Ok(BridgePayload::Deposit(DepositPayload {
            portal: self.endpoint.contracts.optimism_portal,
            to,
            mint,
            value: mint,
            gas_limit,
            is_creation: false,
            data: Bytes::default(),
        }))
    }

    async fn build_withdrawal_payload(
        &self,
        to: Address,
        value: U256,
    ) -> Result<BridgePayload, BridgeError> {
        // 提现最终在 L1 执行，gas 在 L1 上估算
        self.expect_layer(ChainLayer::L1, "withdrawal")?;

        let gas_limit = self.estimate_transfer_gas(to).await?;

        Ok(BridgePayload::Withdrawal(WithdrawalPayload {
            message_passer: self.endpoint.contracts.l2_to_l1_message_passer,
            target: to,
            value,
            gas_limit: U256::from(gas_limit),
            data: Bytes::default(),
        }))
    }

    async fn submit_transaction(&self, payload: &BridgePayload) -> Result<TxHash, BridgeError> {
        let layer = self.layer();
        if payload.submit_layer() != layer {
            return Err(BridgeError::Submission {
                layer,
                message: format!("payload must be submitted on {}", payload.submit_layer()),
            });
        }

        let call = payload.to_call();
        let account = self.account();
        let tx = Eip1559TransactionRequest::new()
            .from(account)
            .to(call.to)
            .value(call.value)
            .data(call.data)
            .chain_id(self.endpoint.chain_id);

        // nonce 由 SignerMiddleware 在持有许可期间分配
        let _permit = self.gate.acquire(account, layer).await;

        let pending = self
            .signer
            .send_transaction(tx, None)
            .await
            .map_err(|e| BridgeError::submission(layer, e))?;
        let tx_hash = pending.tx_hash();

        tracing::info!(
            chain = %layer,
            tx_hash = ?tx_hash,
            to = ?call.to,
            value_wei = %call.value,
            "Transaction broadcast"
        );

        Ok(tx_hash)
    }

    async fn wait_for_confirmation(
        &self,
        tx_hash: TxHash,
        timeout: Duration,
    ) -> Result<TransactionReceipt, BridgeError> {
        let layer = self.layer();

        let poll = async {
            loop {
                match self.provider.get_transaction_receipt(tx_hash).await {
                    Ok(Some(receipt)) => return receipt,
                    Ok(None) => {}
                    Err(e) => tracing::warn!(
                        chain = %layer,
                        tx_hash = ?tx_hash,
                        error = %e,
                        "Receipt poll failed"
                    ),
                }
                tokio::time::sleep(self.poll_interval).await;
            }
        };

        let receipt = tokio::time::timeout(timeout, poll).await.map_err(|_| {
            BridgeError::ConfirmationTimeout {
                layer,
                tx_hash,
                timeout_ms: timeout.as_millis() as u64,
            }
        })?;

        if receipt.status == Some(U64::zero()) {
            return Err(BridgeError::ChainRejected {
                layer,
                tx_hash,
                message: format!(
                    "status 0 in block {}",
                    receipt
                        .block_number
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| "unknown".into())
                ),
            });
        }

        Ok(receipt)
    }

    fn derive_correlated_tx_id(
        &self,
        receipt: &TransactionReceipt,
    ) -> Result<TxHash, BridgeError> {
        deposit_derivation::correlated_l2_tx_hash(receipt, self.endpoint.contracts.optimism_portal)
    }
}
