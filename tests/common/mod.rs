//! 测试辅助模块
//! 提供可编排的内存链客户端与上下文构造函数

#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    str::FromStr,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use ethers::{
    abi::{encode, Token},
    types::{Address, Bytes, Log, TransactionReceipt, TxHash, H256, U256, U64},
};
use giwa_bridge::{
    config::BridgeParams,
    domain::chain::{BridgeContracts, ChainEndpoint, ChainLayer},
    error::BridgeError,
    service::{
        bridge_payload::{BridgePayload, DepositPayload, WithdrawalPayload},
        deposit_derivation::{self, transaction_deposited_topic},
        observer::RecordingObserver,
        BridgeContext, ChainClient,
    },
};
use rust_decimal::Decimal;

/// Hardhat 默认账户 #0
pub const TEST_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

pub fn account() -> Address {
    Address::from_str("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").unwrap()
}

pub fn eth(text: &str) -> U256 {
    ethers::utils::parse_ether(text).unwrap()
}

pub fn contracts() -> BridgeContracts {
    BridgeContracts {
        optimism_portal: Address::from_str("0x956962C34687A954e611A83619ABaA37Ce6bC78A").unwrap(),
        l1_standard_bridge: Address::from_str("0x77b2ffc0F57598cAe1DB76cb398059cF5d10A7E7")
            .unwrap(),
        l2_to_l1_message_passer: Address::from_str("0x4200000000000000000000000000000000000016")
            .unwrap(),
    }
}

pub fn endpoint(layer: ChainLayer) -> ChainEndpoint {
    match layer {
        ChainLayer::L1 => ChainEndpoint {
            layer,
            chain_id: 11_155_111,
            name: "Sepolia".into(),
            rpc_url: "http://l1.invalid".into(),
            explorer_url: "https://sepolia.etherscan.io".into(),
            contracts: contracts(),
        },
        ChainLayer::L2 => ChainEndpoint {
            layer,
            chain_id: 91_342,
            name: "GIWA Sepolia".into(),
            rpc_url: "http://l2.invalid".into(),
            explorer_url: "https://sepolia-explorer.giwa.io".into(),
            contracts: contracts(),
        },
    }
}

pub fn params() -> BridgeParams {
    BridgeParams {
        min_transfer_eth: Decimal::from_str("0.001").unwrap(),
        deposit_l1_timeout_ms: 120_000,
        deposit_l2_timeout_ms: 180_000,
        withdrawal_l2_timeout_ms: 120_000,
        receipt_poll_interval_ms: 10,
        challenge_period_days: 7,
    }
}

/// 记录的链调用
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetBalance(Address),
    BuildDeposit { to: Address, mint: U256 },
    BuildWithdrawal { to: Address, value: U256 },
    Submit(BridgePayload),
    Wait { tx_hash: TxHash, timeout: Duration },
    Derive(TxHash),
}

/// 预设的确认结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    TimesOut,
    Reverted,
}

/// 内存链客户端：按脚本返回结果并记录全部调用
pub struct MockChainClient {
    endpoint: ChainEndpoint,
    balance: Mutex<U256>,
    balance_error: Mutex<Option<BridgeError>>,
    build_error: Mutex<Option<BridgeError>>,
    submit_error: Mutex<Option<BridgeError>>,
    confirmations: Mutex<VecDeque<Confirmation>>,
    submitted: Mutex<HashMap<TxHash, BridgePayload>>,
    calls: Mutex<Vec<Call>>,
    tx_counter: AtomicU64,
}

impl MockChainClient {
    pub fn new(layer: ChainLayer) -> Self {
        Self {
            endpoint: endpoint(layer),
            balance: Mutex::new(eth("1")),
            balance_error: Mutex::new(None),
            build_error: Mutex::new(None),
            submit_error: Mutex::new(None),
            confirmations: Mutex::new(VecDeque::new()),
            submitted: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            tx_counter: AtomicU64::new(0),
        }
    }

    pub fn with_balance(self, wei: U256) -> Self {
        *self.balance.lock().unwrap() = wei;
        self
    }

    pub fn failing_balance(self, err: BridgeError) -> Self {
        *self.balance_error.lock().unwrap() = Some(err);
        self
    }

    pub fn failing_build(self, err: BridgeError) -> Self {
        *self.build_error.lock().unwrap() = Some(err);
        self
    }

    pub fn failing_submit(self, err: BridgeError) -> Self {
        *self.submit_error.lock().unwrap() = Some(err);
        self
    }

    /// 追加下一次 wait_for_confirmation 的结果；脚本用完后默认确认成功
    pub fn then_confirm(self, outcome: Confirmation) -> Self {
        self.confirmations.lock().unwrap().push_back(outcome);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn submissions(&self) -> Vec<BridgePayload> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Submit(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn waits(&self) -> Vec<(TxHash, Duration)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Wait { tx_hash, timeout } => Some((tx_hash, timeout)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn next_tx_hash(&self) -> TxHash {
        let n = self.tx_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let tag: u64 = match self.endpoint.layer {
            ChainLayer::L1 => 0x1000,
            ChainLayer::L2 => 0x2000,
        };
        H256::from_low_u64_be(tag + n)
    }

    fn receipt_for(&self, tx_hash: TxHash) -> TransactionReceipt {
        let block_hash = block_hash_for(tx_hash);
        let logs = match self.submitted.lock().unwrap().get(&tx_hash) {
            Some(BridgePayload::Deposit(p)) => {
                vec![deposit_log(p, account(), block_hash, 0)]
            }
            _ => Vec::new(),
        };

        TransactionReceipt {
            transaction_hash: tx_hash,
            block_hash: Some(block_hash),
            block_number: Some(U64::from(100)),
            status: Some(U64::one()),
            logs,
            ..Default::default()
        }
    }
}

/// 模拟回执所在区块（每笔交易不同）
pub fn block_hash_for(tx_hash: TxHash) -> H256 {
    H256::from(ethers::utils::keccak256(tx_hash.as_bytes()))
}

/// OptimismPortal 为一笔存款发出的 TransactionDeposited 日志
pub fn deposit_log(
    payload: &DepositPayload,
    from: Address,
    block_hash: H256,
    log_index: u64,
) -> Log {
    let mut opaque = Vec::new();
    let mut word = [0u8; 32];
    payload.mint.to_big_endian(&mut word);
    opaque.extend_from_slice(&word);
    payload.value.to_big_endian(&mut word);
    opaque.extend_from_slice(&word);
    opaque.extend_from_slice(&payload.gas_limit.to_be_bytes());
    opaque.push(payload.is_creation as u8);
    opaque.extend_from_slice(&payload.data);

    Log {
        address: payload.portal,
        topics: vec![
            transaction_deposited_topic(),
            H256::from(from),
            H256::from(payload.to),
            H256::zero(),
        ],
        data: encode(&[Token::Bytes(opaque)]).into(),
        block_hash: Some(block_hash),
        log_index: Some(U256::from(log_index)),
        ..Default::default()
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    fn endpoint(&self) -> &ChainEndpoint {
        &self.endpoint
    }

    async fn get_balance(&self, address: Address) -> Result<U256, BridgeError> {
        self.record(Call::GetBalance(address));
        if let Some(err) = self.balance_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(*self.balance.lock().unwrap())
    }

    async fn build_deposit_payload(
        &self,
        to: Address,
        mint: U256,
    ) -> Result<BridgePayload, BridgeError> {
        self.record(Call::BuildDeposit { to, mint });
        if let Some(err) = self.build_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(BridgePayload::Deposit(DepositPayload {
            portal: self.endpoint.contracts.optimism_portal,
            to,
            mint,
            value: mint,
            gas_limit: 21_000,
            is_creation: false,
            data: Bytes::default(),
        }))
    }

    async fn build_withdrawal_payload(
        &self,
        to: Address,
        value: U256,
    ) -> Result<BridgePayload, BridgeError> {
        self.record(Call::BuildWithdrawal { to, value });
        if let Some(err) = self.build_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(BridgePayload::Withdrawal(WithdrawalPayload {
            message_passer: self.endpoint.contracts.l2_to_l1_message_passer,
            target: to,
            value,
            gas_limit: U256::from(21_000u64),
            data: Bytes::default(),
        }))
    }

    async fn submit_transaction(&self, payload: &BridgePayload) -> Result<TxHash, BridgeError> {
        self.record(Call::Submit(payload.clone()));
        if let Some(err) = self.submit_error.lock().unwrap().clone() {
            return Err(err);
        }
        let tx_hash = self.next_tx_hash();
        self.submitted
            .lock()
            .unwrap()
            .insert(tx_hash, payload.clone());
        Ok(tx_hash)
    }

    async fn wait_for_confirmation(
        &self,
        tx_hash: TxHash,
        timeout: Duration,
    ) -> Result<TransactionReceipt, BridgeError> {
        self.record(Call::Wait { tx_hash, timeout });
        let outcome = self
            .confirmations
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Confirmation::Confirmed);

        match outcome {
            Confirmation::Confirmed => Ok(self.receipt_for(tx_hash)),
            Confirmation::TimesOut => Err(BridgeError::ConfirmationTimeout {
                layer: self.endpoint.layer,
                tx_hash,
                timeout_ms: timeout.as_millis() as u64,
            }),
            Confirmation::Reverted => Err(BridgeError::ChainRejected {
                layer: self.endpoint.layer,
                tx_hash,
                message: "status 0 in block 100".into(),
            }),
        }
    }

    fn derive_correlated_tx_id(
        &self,
        receipt: &TransactionReceipt,
    ) -> Result<TxHash, BridgeError> {
        self.record(Call::Derive(receipt.transaction_hash));
        deposit_derivation::correlated_l2_tx_hash(receipt, self.endpoint.contracts.optimism_portal)
    }
}

/// 测试桩集合
pub struct Harness {
    pub l1: Arc<MockChainClient>,
    pub l2: Arc<MockChainClient>,
    pub observer: Arc<RecordingObserver>,
}

impl Harness {
    pub fn new(l1: MockChainClient, l2: MockChainClient) -> Self {
        Self {
            l1: Arc::new(l1),
            l2: Arc::new(l2),
            observer: Arc::new(RecordingObserver::new()),
        }
    }

    pub fn default_chains() -> Self {
        Self::new(
            MockChainClient::new(ChainLayer::L1),
            MockChainClient::new(ChainLayer::L2),
        )
    }

    pub fn context(&self) -> BridgeContext {
        BridgeContext::new(
            account(),
            params(),
            self.l1.clone(),
            self.l2.clone(),
            self.observer.clone(),
        )
    }

    /// 两条链都没有任何调用
    pub fn no_chain_calls(&self) -> bool {
        self.l1.calls().is_empty() && self.l2.calls().is_empty()
    }
}
