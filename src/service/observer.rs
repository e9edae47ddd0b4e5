//! 编排过程观察者
//!
//! 生产环境用 `TracingObserver` 输出结构化日志，测试中用 `RecordingObserver` 断言过程。

use std::sync::Mutex;

use ethers::types::TxHash;

use crate::{
    domain::{chain::ChainLayer, transfer::Direction},
    error::{BridgeError, BridgeErrorKind},
    service::{
        bridge_state_machine::{BridgeState, BridgeStateMachine},
        result_reporter::BridgeOperationResult,
    },
};

pub trait BridgeObserver: Send + Sync {
    fn on_transition(&self, direction: Direction, from: Option<BridgeState>, to: BridgeState);

    fn on_submitted(&self, direction: Direction, layer: ChainLayer, tx_hash: TxHash);

    fn on_failed(&self, direction: Direction, at: BridgeState, err: &BridgeError);

    fn on_finished(&self, result: &BridgeOperationResult);
}

/// tracing 日志观察者
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl BridgeObserver for TracingObserver {
    fn on_transition(&self, direction: Direction, from: Option<BridgeState>, to: BridgeState) {
        tracing::debug!(
            direction = %direction,
            from = from.map(|s| s.as_str()).unwrap_or("-"),
            to = %to,
            progress = BridgeStateMachine::progress(direction, to),
            "Bridge state changed"
        );
    }

    fn on_submitted(&self, direction: Direction, layer: ChainLayer, tx_hash: TxHash) {
        tracing::info!(
            direction = %direction,
            chain = %layer,
            tx_hash = ?tx_hash,
            "📤 {} transaction submitted on {}",
            direction.label(),
            layer
        );
    }

    fn on_failed(&self, direction: Direction, at: BridgeState, err: &BridgeError) {
        tracing::warn!(
            direction = %direction,
            state = %at,
            kind = err.kind().as_str(),
            chain = err.layer().map(|l| l.as_str()).unwrap_or("-"),
            error = %err,
            "❌ {} failed",
            direction.label()
        );
    }

    fn on_finished(&self, result: &BridgeOperationResult) {
        if result.success {
            tracing::info!(
                direction = %result.direction,
                primary_tx = ?result.primary_tx_id,
                correlated_tx = ?result.correlated_tx_id,
                "✅ {}",
                result.human_message
            );
        } else {
            tracing::info!(
                direction = %result.direction,
                primary_tx = ?result.primary_tx_id,
                correlated_tx = ?result.correlated_tx_id,
                "{} finished without success",
                result.direction.label()
            );
        }
    }
}

/// 观察到的事件（测试断言用）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservedEvent {
    Transition {
        from: Option<BridgeState>,
        to: BridgeState,
    },
    Submitted {
        layer: ChainLayer,
        tx_hash: TxHash,
    },
    Failed {
        at: BridgeState,
        kind: BridgeErrorKind,
        layer: Option<ChainLayer>,
    },
    Finished {
        success: bool,
    },
}

/// 记录所有事件的观察者
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObservedEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: ObservedEvent) {
        let mut events = match self.events.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        events.push(event);
    }

    pub fn events(&self) -> Vec<ObservedEvent> {
        match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// 依次进入过的状态
    pub fn states(&self) -> Vec<BridgeState> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ObservedEvent::Transition { to, .. } => Some(to),
                _ => None,
            })
            .collect()
    }
}

impl BridgeObserver for RecordingObserver {
    fn on_transition(&self, _direction: Direction, from: Option<BridgeState>, to: BridgeState) {
        self.push(ObservedEvent::Transition { from, to });
    }

    fn on_submitted(&self, _direction: Direction, layer: ChainLayer, tx_hash: TxHash) {
        self.push(ObservedEvent::Submitted { layer, tx_hash });
    }

    fn on_failed(&self, _direction: Direction, at: BridgeState, err: &BridgeError) {
        self.push(ObservedEvent::Failed {
            at,
            kind: err.kind(),
            layer: err.layer(),
        });
    }

    fn on_finished(&self, result: &BridgeOperationResult) {
        self.push(ObservedEvent::Finished {
            success: result.success,
        });
    }
}
