//! 领域模型

pub mod account;
pub mod amount;
pub mod chain;
pub mod transfer;

pub use account::Account;
pub use amount::{validate, ValidAmount};
pub use chain::{BridgeContracts, ChainEndpoint, ChainLayer};
pub use transfer::{Direction, TransferRequest};
