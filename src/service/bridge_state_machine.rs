//! 桥接流程状态机
//! 存款：Validating → CheckingBalance → BuildingPayload → Submitted(L1) → Confirmed(L1)
//!       → Correlating → Submitted(L2) → Confirmed(L2) → Done
//! 提现：Validating → CheckingBalance → BuildingPayload → Submitted(L2) → Confirmed(L2) → Done
//! 任意非终态都可以进入 Failed

use std::fmt;

use ethers::types::TxHash;
use serde::Serialize;

use crate::{
    domain::{chain::ChainLayer, transfer::Direction},
    error::BridgeError,
    service::observer::BridgeObserver,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BridgeState {
    Validating,
    CheckingBalance,
    BuildingPayload,
    Submitted(ChainLayer),
    Confirmed(ChainLayer),
    Correlating,
    Done,
    Failed,
}

impl BridgeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validating => "validating",
            Self::CheckingBalance => "checking_balance",
            Self::BuildingPayload => "building_payload",
            Self::Submitted(ChainLayer::L1) => "submitted_l1",
            Self::Submitted(ChainLayer::L2) => "submitted_l2",
            Self::Confirmed(ChainLayer::L1) => "confirmed_l1",
            Self::Confirmed(ChainLayer::L2) => "confirmed_l2",
            Self::Correlating => "correlating",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for BridgeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 状态转换规则
pub struct BridgeStateMachine;

impl BridgeStateMachine {
    /// 验证状态转换是否合法
    pub fn can_transition(direction: Direction, from: BridgeState, to: BridgeState) -> bool {
        use BridgeState::*;
        use ChainLayer::*;

        if to == Failed {
            return !from.is_terminal();
        }

        let common = matches!(
            (from, to),
            (Validating, CheckingBalance) | (CheckingBalance, BuildingPayload)
        );

        common
            || match direction {
                Direction::Deposit => matches!(
                    (from, to),
                    (BuildingPayload, Submitted(L1))
                        | (Submitted(L1), Confirmed(L1))
                        | (Confirmed(L1), Correlating)
                        | (Correlating, Submitted(L2))
                        | (Submitted(L2), Confirmed(L2))
                        | (Confirmed(L2), Done)
                ),
                Direction::Withdraw => matches!(
                    (from, to),
                    (BuildingPayload, Submitted(L2))
                        | (Submitted(L2), Confirmed(L2))
                        | (Confirmed(L2), Done)
                ),
            }
    }

    /// 进度百分比（失败返回 0）
    pub fn progress(direction: Direction, state: BridgeState) -> u8 {
        use BridgeState::*;
        use ChainLayer::*;

        match (direction, state) {
            (_, Validating) => 0,
            (_, CheckingBalance) => 10,
            (_, BuildingPayload) => 20,
            (Direction::Deposit, Submitted(L1)) => 35,
            (Direction::Deposit, Confirmed(L1)) => 55,
            (Direction::Deposit, Correlating) => 60,
            (Direction::Deposit, Submitted(L2)) => 70,
            (Direction::Withdraw, Submitted(_)) => 50,
            (_, Confirmed(_)) => 90,
            (_, Correlating) => 60,
            (_, Done) => 100,
            (_, Failed) => 0,
        }
    }
}

/// 单次编排的状态跟踪器：校验转换、记录已产生的交易并通知观察者
pub struct BridgeFlow<'a> {
    direction: Direction,
    state: BridgeState,
    observer: &'a dyn BridgeObserver,
    primary_tx: Option<TxHash>,
    correlated_tx: Option<TxHash>,
}

impl<'a> BridgeFlow<'a> {
    pub fn start(direction: Direction, observer: &'a dyn BridgeObserver) -> Self {
        observer.on_transition(direction, None, BridgeState::Validating);
        Self {
            direction,
            state: BridgeState::Validating,
            observer,
            primary_tx: None,
            correlated_tx: None,
        }
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    pub fn primary_tx(&self) -> Option<TxHash> {
        self.primary_tx
    }

    pub fn correlated_tx(&self) -> Option<TxHash> {
        self.correlated_tx
    }

    pub fn advance(&mut self, to: BridgeState) {
        if !BridgeStateMachine::can_transition(self.direction, self.state, to) {
            // 编排器按固定顺序推进，走到这里说明流程代码有误
            tracing::error!(
                direction = %self.direction,
                from = %self.state,
                to = %to,
                "Invalid bridge state transition"
            );
            debug_assert!(false, "invalid transition {} -> {}", self.state, to);
        }

        let from = self.state;
        self.state = to;
        self.observer.on_transition(self.direction, Some(from), to);
    }

    /// 记录首笔交易（存款为 L1，提现为 L2）并进入 Submitted
    pub fn submitted_primary(&mut self, layer: ChainLayer, tx_hash: TxHash) {
        self.primary_tx = Some(tx_hash);
        self.advance(BridgeState::Submitted(layer));
        self.observer.on_submitted(self.direction, layer, tx_hash);
    }

    /// 记录推导出的 L2 存款交易并进入 Submitted(L2)
    pub fn submitted_correlated(&mut self, tx_hash: TxHash) {
        self.correlated_tx = Some(tx_hash);
        self.advance(BridgeState::Submitted(ChainLayer::L2));
        self.observer.on_submitted(self.direction, ChainLayer::L2, tx_hash);
    }

    pub fn fail(&mut self, err: &BridgeError) {
        let at = self.state;
        self.advance(BridgeState::Failed);
        self.observer.on_failed(self.direction, at, err);
    }
}
