//! 配置管理模块
//! 支持从环境变量和配置文件加载配置

use std::{path::Path, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use ethers::types::Address;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::chain::{BridgeContracts, ChainEndpoint, ChainLayer};

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default = "ChainConfig::default_l1")]
    pub l1: ChainConfig,
    #[serde(default = "ChainConfig::default_l2")]
    pub l2: ChainConfig,
    #[serde(default)]
    pub contracts: ContractsConfig,
    #[serde(default)]
    pub bridge: BridgeParams,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "text"
}

/// 单条链的 RPC 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub name: String,
    pub rpc_url: String,
    pub explorer_url: String,
}

/// OP-stack 桥合约地址
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractsConfig {
    pub optimism_portal: Address,
    pub l1_standard_bridge: Address,
    pub l2_to_l1_message_passer: Address,
}

/// 桥接协议参数
///
/// 最小金额与三个超时是固定的协议参数，但必须可配置而不是写死。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeParams {
    /// 最小转账金额（ETH）
    pub min_transfer_eth: Decimal,
    /// 存款 L1 确认超时
    pub deposit_l1_timeout_ms: u64,
    /// 存款 L2 确认超时
    pub deposit_l2_timeout_ms: u64,
    /// 提现 L2 确认超时
    pub withdrawal_l2_timeout_ms: u64,
    /// 回执轮询间隔
    pub receipt_poll_interval_ms: u64,
    /// 挑战期（天），仅用于提示文案
    pub challenge_period_days: u32,
}

pub const DEFAULT_MIN_TRANSFER_ETH: &str = "0.001";
pub const DEFAULT_DEPOSIT_L1_TIMEOUT_MS: u64 = 120_000;
pub const DEFAULT_DEPOSIT_L2_TIMEOUT_MS: u64 = 180_000;
pub const DEFAULT_WITHDRAWAL_L2_TIMEOUT_MS: u64 = 120_000;
pub const DEFAULT_RECEIPT_POLL_INTERVAL_MS: u64 = 4_000;
pub const DEFAULT_CHALLENGE_PERIOD_DAYS: u32 = 7;

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn address_literal(s: &str) -> Address {
    Address::from_str(s).unwrap_or_default()
}

impl Default for ServerConfig {
    fn default() -> Self {
        let bind_addr = match std::env::var("BIND_ADDR") {
            Ok(addr) => addr,
            Err(_) => format!("0.0.0.0:{}", env_or("PORT", "3000")),
        };
        Self { bind_addr }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: env_or("LOG_LEVEL", "info"),
            format: env_or("LOG_FORMAT", "text"),
        }
    }
}

impl ChainConfig {
    pub fn default_l1() -> Self {
        Self {
            chain_id: env_parse("L1_CHAIN_ID").unwrap_or(11_155_111),
            name: env_or("L1_CHAIN_NAME", "Sepolia"),
            rpc_url: env_or("L1_RPC_URL", "https://ethereum-sepolia-rpc.publicnode.com"),
            explorer_url: env_or("L1_EXPLORER_URL", "https://sepolia.etherscan.io"),
        }
    }

    pub fn default_l2() -> Self {
        Self {
            chain_id: env_parse("L2_CHAIN_ID").unwrap_or(91_342),
            name: env_or("L2_CHAIN_NAME", "Giwa Sepolia"),
            rpc_url: env_or("L2_RPC_URL", "https://sepolia-rpc.giwa.io"),
            explorer_url: env_or("L2_EXPLORER_URL", "https://sepolia-explorer.giwa.io"),
        }
    }
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            optimism_portal: env_parse("OPTIMISM_PORTAL_ADDRESS").unwrap_or_else(|| {
                address_literal("0x956962C34687A954e611A83619ABaA37Ce6bC78A")
            }),
            l1_standard_bridge: env_parse("L1_STANDARD_BRIDGE_ADDRESS").unwrap_or_else(|| {
                address_literal("0x77b2ffc0F57598cAe1DB76cb398059cF5d10A7E7")
            }),
            l2_to_l1_message_passer: env_parse("L2_TO_L1_MESSAGE_PASSER_ADDRESS")
                .unwrap_or_else(|| address_literal("0x4200000000000000000000000000000000000016")),
        }
    }
}

impl Default for BridgeParams {
    fn default() -> Self {
        Self {
            min_transfer_eth: env_parse("BRIDGE_MIN_TRANSFER_ETH")
                .filter(|v: &Decimal| v.is_sign_positive() && !v.is_zero())
                .unwrap_or_else(|| {
                    Decimal::from_str(DEFAULT_MIN_TRANSFER_ETH).unwrap_or(Decimal::new(1, 3))
                }),
            deposit_l1_timeout_ms: env_parse("DEPOSIT_L1_TIMEOUT_MS")
                .unwrap_or(DEFAULT_DEPOSIT_L1_TIMEOUT_MS),
            deposit_l2_timeout_ms: env_parse("DEPOSIT_L2_TIMEOUT_MS")
                .unwrap_or(DEFAULT_DEPOSIT_L2_TIMEOUT_MS),
            withdrawal_l2_timeout_ms: env_parse("WITHDRAWAL_L2_TIMEOUT_MS")
                .unwrap_or(DEFAULT_WITHDRAWAL_L2_TIMEOUT_MS),
            receipt_poll_interval_ms: env_parse("RECEIPT_POLL_INTERVAL_MS")
                .unwrap_or(DEFAULT_RECEIPT_POLL_INTERVAL_MS),
            challenge_period_days: env_parse("CHALLENGE_PERIOD_DAYS")
                .unwrap_or(DEFAULT_CHALLENGE_PERIOD_DAYS),
        }
    }
}

impl BridgeParams {
    pub fn deposit_l1_timeout(&self) -> Duration {
        Duration::from_millis(self.deposit_l1_timeout_ms)
    }

    pub fn deposit_l2_timeout(&self) -> Duration {
        Duration::from_millis(self.deposit_l2_timeout_ms)
    }

    pub fn withdrawal_l2_timeout(&self) -> Duration {
        Duration::from_millis(self.withdrawal_l2_timeout_ms)
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            l1: ChainConfig::default_l1(),
            l2: ChainConfig::default_l2(),
            contracts: ContractsConfig::default(),
            bridge: BridgeParams::default(),
        }
    }
}

impl Config {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self> {
        Ok(Self::default())
    }

    /// 从配置文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config file as TOML")?;

        Ok(config)
    }

    /// 从环境变量和配置文件合并加载（配置文件优先级更高）
    pub fn from_env_and_file<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let mut config = Self::from_env()?;

        if let Some(path) = path {
            if path.as_ref().exists() {
                config = Self::from_file(path)?;
            }
        }

        Ok(config)
    }

    /// 二进制入口使用：优先读取 CONFIG_PATH 指向的文件
    pub fn load() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").ok();
        let config = Self::from_env_and_file(path.as_deref())?;
        config.validate()?;
        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            anyhow::bail!("LOG_LEVEL must be one of: {:?}", valid_levels);
        }

        if self.logging.format != "json" && self.logging.format != "text" {
            anyhow::bail!("LOG_FORMAT must be 'json' or 'text'");
        }

        for (layer, chain) in [("L1", &self.l1), ("L2", &self.l2)] {
            if !chain.rpc_url.starts_with("http://") && !chain.rpc_url.starts_with("https://") {
                anyhow::bail!("{}_RPC_URL must start with http:// or https://", layer);
            }
        }

        if self.l1.chain_id == self.l2.chain_id {
            anyhow::bail!("L1 and L2 chain ids must differ");
        }

        if self.bridge.min_transfer_eth <= Decimal::ZERO {
            anyhow::bail!("BRIDGE_MIN_TRANSFER_ETH must be greater than 0");
        }

        if self.bridge.deposit_l1_timeout_ms == 0
            || self.bridge.deposit_l2_timeout_ms == 0
            || self.bridge.withdrawal_l2_timeout_ms == 0
        {
            anyhow::bail!("confirmation timeouts must be greater than 0");
        }

        if self.bridge.receipt_poll_interval_ms == 0 {
            anyhow::bail!("RECEIPT_POLL_INTERVAL_MS must be greater than 0");
        }

        Ok(())
    }

    pub fn contracts(&self) -> BridgeContracts {
        BridgeContracts {
            optimism_portal: self.contracts.optimism_portal,
            l1_standard_bridge: self.contracts.l1_standard_bridge,
            l2_to_l1_message_passer: self.contracts.l2_to_l1_message_passer,
        }
    }

    pub fn endpoint(&self, layer: ChainLayer) -> ChainEndpoint {
        let chain = match layer {
            ChainLayer::L1 => &self.l1,
            ChainLayer::L2 => &self.l2,
        };
        ChainEndpoint {
            layer,
            chain_id: chain.chain_id,
            name: chain.name.clone(),
            rpc_url: chain.rpc_url.clone(),
            explorer_url: chain.explorer_url.clone(),
            contracts: self.contracts(),
        }
    }
}
