//! 编排上下文：账户、协议参数、两条链的客户端与观察者
//! 显式注入编排器，不存在全局钱包

use std::sync::Arc;

use ethers::types::Address;

use crate::{
    config::BridgeParams,
    domain::{
        amount::{format_eth, ValidAmount},
        chain::ChainLayer,
    },
    error::BridgeError,
    service::{chain_client::ChainClient, observer::BridgeObserver},
};

#[derive(Clone)]
pub struct BridgeContext {
    /// 源地址同时也是两条链上的接收地址
    pub account: Address,
    pub params: BridgeParams,
    pub l1: Arc<dyn ChainClient>,
    pub l2: Arc<dyn ChainClient>,
    pub observer: Arc<dyn BridgeObserver>,
}

impl BridgeContext {
    pub fn new(
        account: Address,
        params: BridgeParams,
        l1: Arc<dyn ChainClient>,
        l2: Arc<dyn ChainClient>,
        observer: Arc<dyn BridgeObserver>,
    ) -> Self {
        Self {
            account,
            params,
            l1,
            l2,
            observer,
        }
    }

    pub fn client(&self, layer: ChainLayer) -> &dyn ChainClient {
        match layer {
            ChainLayer::L1 => self.l1.as_ref(),
            ChainLayer::L2 => self.l2.as_ref(),
        }
    }

    /// 源链余额必须不少于转账金额
    pub async fn ensure_balance(
        &self,
        layer: ChainLayer,
        amount: &ValidAmount,
    ) -> Result<(), BridgeError> {
        let available = self.client(layer).get_balance(self.account).await?;
        if available < amount.wei() {
            return Err(BridgeError::InsufficientBalance {
                layer,
                requested: amount.to_string(),
                available: format_eth(available),
            });
        }
        Ok(())
    }
}
