//! OP-stack 桥接交易载荷
//!
//! 存款：L1 `OptimismPortal.depositTransaction`
//! 提现：L2 `L2ToL1MessagePasser.initiateWithdrawal`

use ethers::{
    abi::{encode, Token},
    types::{Address, Bytes, U256},
};

use crate::domain::chain::ChainLayer;

pub const DEPOSIT_TRANSACTION_SIG: &str = "depositTransaction(address,uint256,uint64,bool,bytes)";
pub const INITIATE_WITHDRAWAL_SIG: &str = "initiateWithdrawal(address,uint256,bytes)";

/// L1 提交的存款载荷（由 L2 客户端构建）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositPayload {
    pub portal: Address,
    pub to: Address,
    /// 在 L2 铸造的金额，同时作为 L1 交易的 msg.value
    pub mint: U256,
    pub value: U256,
    /// L2 执行 gas
    pub gas_limit: u64,
    pub is_creation: bool,
    pub data: Bytes,
}

/// L2 提交的提现载荷（由 L1 客户端构建）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalPayload {
    pub message_passer: Address,
    pub target: Address,
    pub value: U256,
    /// L1 执行 gas
    pub gas_limit: U256,
    pub data: Bytes,
}

/// 不透明载荷：编排器只负责在构建和提交之间传递
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgePayload {
    Deposit(DepositPayload),
    Withdrawal(WithdrawalPayload),
}

/// 待签名的合约调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

impl BridgePayload {
    /// 载荷必须提交到的链
    pub fn submit_layer(&self) -> ChainLayer {
        match self {
            Self::Deposit(_) => ChainLayer::L1,
            Self::Withdrawal(_) => ChainLayer::L2,
        }
    }

    pub fn to_call(&self) -> ContractCall {
        match self {
            Self::Deposit(p) => ContractCall {
                to: p.portal,
                value: p.mint,
                data: encode_call(
                    DEPOSIT_TRANSACTION_SIG,
                    vec![
                        Token::Address(p.to),
                        Token::Uint(p.value),
                        Token::Uint(U256::from(p.gas_limit)),
                        Token::Bool(p.is_creation),
                        Token::Bytes(p.data.to_vec()),
                    ],
                ),
            },
            Self::Withdrawal(p) => ContractCall {
                to: p.message_passer,
                value: p.value,
                data: encode_call(
                    INITIATE_WITHDRAWAL_SIG,
                    vec![
                        Token::Address(p.target),
                        Token::Uint(p.gas_limit),
                        Token::Bytes(p.data.to_vec()),
                    ],
                ),
            },
        }
    }
}

pub fn selector(sig: &str) -> [u8; 4] {
    let hash = ethers::utils::keccak256(sig.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

fn encode_call(sig: &str, args: Vec<Token>) -> Bytes {
    let mut out = Vec::with_capacity(4 + 32 * args.len());
    out.extend_from_slice(&selector(sig));
    out.extend_from_slice(&encode(&args));
    out.into()
}
