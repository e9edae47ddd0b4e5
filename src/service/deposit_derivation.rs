//! 从 L1 存款回执推导对应的 L2 存款交易哈希
//!
//! OptimismPortal 每笔存款发出 `TransactionDeposited` 事件，L2 节点据此构造
//! 类型为 0x7E 的存款交易。交易哈希完全由 L1 区块哈希、日志索引和事件内容决定。

use anyhow::{anyhow, bail, Result};
use ethers::{
    abi::{decode, ParamType},
    types::{Address, Bytes, Log, TransactionReceipt, TxHash, H256, U256},
    utils::{keccak256, rlp::RlpStream},
};

use crate::{domain::chain::ChainLayer, error::BridgeError};

pub const TRANSACTION_DEPOSITED_EVENT: &str = "TransactionDeposited(address,address,uint256,bytes)";
pub const DEPOSIT_TX_TYPE: u8 = 0x7e;

/// 用户存款的 source hash 域
const USER_DEPOSIT_DOMAIN: u64 = 0;
/// mint(32) + value(32) + gasLimit(8) + isCreation(1)
const OPAQUE_HEADER_LEN: usize = 73;

pub fn transaction_deposited_topic() -> H256 {
    H256::from(keccak256(TRANSACTION_DEPOSITED_EVENT.as_bytes()))
}

/// L2 存款交易
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositTransaction {
    pub source_hash: H256,
    pub from: Address,
    /// None 表示合约创建
    pub to: Option<Address>,
    pub mint: U256,
    pub value: U256,
    pub gas: u64,
    pub is_system_tx: bool,
    pub data: Bytes,
}

impl DepositTransaction {
    /// 解析 `TransactionDeposited` 日志
    ///
    /// 日志未携带区块哈希时使用回执的区块哈希。
    pub fn from_log(log: &Log, fallback_block_hash: Option<H256>) -> Result<Self> {
        if log.topics.len() != 4 || log.topics[0] != transaction_deposited_topic() {
            bail!("log is not a TransactionDeposited event");
        }
        if !log.topics[3].is_zero() {
            bail!("unsupported deposit version {:?}", log.topics[3]);
        }

        let from = Address::from(log.topics[1]);
        let to = Address::from(log.topics[2]);

        let block_hash = log
            .block_hash
            .or(fallback_block_hash)
            .ok_or_else(|| anyhow!("deposit log has no block hash"))?;
        let log_index = log
            .log_index
            .ok_or_else(|| anyhow!("deposit log has no log index"))?;

        let opaque = decode(&[ParamType::Bytes], &log.data)
            .map_err(|e| anyhow!("invalid TransactionDeposited data: {}", e))?
            .pop()
            .and_then(|token| token.into_bytes())
            .ok_or_else(|| anyhow!("TransactionDeposited data is not bytes"))?;

        if opaque.len() < OPAQUE_HEADER_LEN {
            bail!("opaque deposit data too short: {} bytes", opaque.len());
        }

        let mint = U256::from_big_endian(&opaque[0..32]);
        let value = U256::from_big_endian(&opaque[32..64]);
        let mut gas_bytes = [0u8; 8];
        gas_bytes.copy_from_slice(&opaque[64..72]);
        let gas = u64::from_be_bytes(gas_bytes);
        let is_creation = opaque[72] == 1;
        let data = Bytes::from(opaque[OPAQUE_HEADER_LEN..].to_vec());

        Ok(Self {
            source_hash: user_deposit_source_hash(block_hash, log_index),
            from,
            to: if is_creation { None } else { Some(to) },
            mint,
            value,
            gas,
            is_system_tx: false,
            data,
        })
    }

    /// EIP-2718 编码：0x7E || rlp([...])
    pub fn encoded(&self) -> Vec<u8> {
        let mut stream = RlpStream::new_list(8);
        stream.append(&self.source_hash);
        stream.append(&self.from);
        match &self.to {
            Some(to) => stream.append(to),
            None => stream.append_empty_data(),
        };
        stream.append(&self.mint);
        stream.append(&self.value);
        stream.append(&self.gas);
        if self.is_system_tx {
            stream.append(&1u8);
        } else {
            stream.append_empty_data();
        }
        stream.append(&self.data.to_vec());

        let mut out = vec![DEPOSIT_TX_TYPE];
        out.extend_from_slice(&stream.out());
        out
    }

    pub fn hash(&self) -> TxHash {
        TxHash::from(keccak256(self.encoded()))
    }
}

/// keccak256(uint256(domain) ++ keccak256(l1BlockHash ++ uint256(logIndex)))
pub fn user_deposit_source_hash(l1_block_hash: H256, log_index: U256) -> H256 {
    let mut index_word = [0u8; 32];
    log_index.to_big_endian(&mut index_word);

    let mut deposit_id = [0u8; 64];
    deposit_id[..32].copy_from_slice(l1_block_hash.as_bytes());
    deposit_id[32..].copy_from_slice(&index_word);

    let mut domain_word = [0u8; 32];
    U256::from(USER_DEPOSIT_DOMAIN).to_big_endian(&mut domain_word);

    let mut preimage = [0u8; 64];
    preimage[..32].copy_from_slice(&domain_word);
    preimage[32..].copy_from_slice(&keccak256(deposit_id));

    H256::from(keccak256(preimage))
}

/// 回执中由 `portal` 发出的所有存款对应的 L2 交易哈希（按日志顺序）
pub fn l2_transaction_hashes(receipt: &TransactionReceipt, portal: Address) -> Result<Vec<TxHash>> {
    let topic = transaction_deposited_topic();

    receipt
        .logs
        .iter()
        .filter(|log| log.address == portal && log.topics.first() == Some(&topic))
        .map(|log| DepositTransaction::from_log(log, receipt.block_hash).map(|tx| tx.hash()))
        .collect()
}

/// 取回执中的第一笔存款作为关联的 L2 交易
pub fn correlated_l2_tx_hash(
    receipt: &TransactionReceipt,
    portal: Address,
) -> Result<TxHash, BridgeError> {
    let rejected = |message: String| BridgeError::ChainRejected {
        layer: ChainLayer::L1,
        tx_hash: receipt.transaction_hash,
        message,
    };

    l2_transaction_hashes(receipt, portal)
        .map_err(|e| rejected(e.to_string()))?
        .into_iter()
        .next()
        .ok_or_else(|| rejected("receipt contains no TransactionDeposited event".into()))
}
