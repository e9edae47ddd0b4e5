pub mod bridge_context;
pub mod bridge_payload; // OP-stack 存款/提现载荷编码
pub mod bridge_service;
pub mod bridge_state_machine; // 存款/提现流程状态机
pub mod chain_client;
pub mod deposit_derivation; // L1 回执 → L2 存款交易哈希
pub mod deposit_orchestrator;
pub mod evm_chain_client;
pub mod observer;
pub mod result_reporter;
pub mod submission_gate; // 按 (账户, 链) 串行提交
pub mod withdrawal_orchestrator;

pub use bridge_context::BridgeContext;
pub use bridge_service::{BridgeService, WalletInfo};
pub use chain_client::ChainClient;
pub use result_reporter::{BridgeEnvelope, BridgeOperationResult};
