//! GIWA Bridge - Sepolia (L1) 与 GIWA Sepolia (L2) 之间的 ETH 桥接服务
//!
//! 单一配置账户：存款（L1 → L2）与提现发起（L2 → L1）

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod metrics;
pub mod service;

// 重新导出常用类型
pub use app_state::AppState;
pub use error::{BridgeError, BridgeErrorKind};
