//! 金额校验
//!
//! 纯函数：在任何网络调用或签名之前执行。

use std::{fmt, str::FromStr};

use ethers::types::U256;
use rust_decimal::Decimal;

use crate::error::BridgeError;

/// ETH 小数位
pub const ETH_DECIMALS: u32 = 18;

/// 已通过校验的金额
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidAmount {
    eth: Decimal,
    wei: U256,
}

impl ValidAmount {
    pub fn wei(&self) -> U256 {
        self.wei
    }
}

impl fmt::Display for ValidAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.eth)
    }
}

/// 校验金额文本
///
/// 缺失、空串、无法解析、负数、小数位超过 18 位或低于最小值时返回 `InvalidAmount`。
pub fn validate(amount_text: Option<&str>, min: Decimal) -> Result<ValidAmount, BridgeError> {
    let invalid = || BridgeError::InvalidAmount { min };

    let text = amount_text.map(str::trim).unwrap_or_default();
    if !is_plain_decimal(text) {
        return Err(invalid());
    }

    let eth = Decimal::from_str(text).map_err(|_| invalid())?.normalize();
    if eth.is_sign_negative() || eth < min {
        return Err(invalid());
    }

    let wei = to_wei(eth).ok_or_else(invalid)?;
    if wei.is_zero() {
        return Err(invalid());
    }

    Ok(ValidAmount { eth, wei })
}

/// 仅允许 ASCII 数字与至多一个小数点（不接受符号、指数、下划线）
fn is_plain_decimal(text: &str) -> bool {
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text, ""));
    let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    digits(int_part) && digits(frac_part) && !(int_part.is_empty() && frac_part.is_empty())
}

/// Decimal(ETH) → wei
fn to_wei(eth: Decimal) -> Option<U256> {
    let scale = eth.scale();
    if scale > ETH_DECIMALS {
        return None;
    }
    let mantissa = u128::try_from(eth.mantissa()).ok()?;
    Some(U256::from(mantissa) * U256::exp10((ETH_DECIMALS - scale) as usize))
}

/// wei → ETH 十进制值；超出 Decimal 表示范围时返回 None
pub fn wei_to_eth(wei: U256) -> Option<Decimal> {
    if wei > U256::from(u128::MAX) {
        return None;
    }
    let value = i128::try_from(wei.as_u128()).ok()?;
    Decimal::try_from_i128_with_scale(value, ETH_DECIMALS)
        .ok()
        .map(|d| d.normalize())
}

/// wei 的完整 ETH 文本（例如 "0.001"）
pub fn format_eth(wei: U256) -> String {
    match wei_to_eth(wei) {
        Some(eth) => eth.to_string(),
        None => ethers::utils::format_ether(wei),
    }
}

/// 保留 4 位小数的 ETH 文本（用于余额展示）
pub fn format_eth_4dp(wei: U256) -> String {
    match wei_to_eth(wei) {
        Some(eth) => format!("{:.4}", eth.round_dp(4)),
        None => ethers::utils::format_ether(wei),
    }
}
