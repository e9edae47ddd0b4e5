use std::{
    collections::HashMap,
    sync::{Mutex, OnceLock},
};

use crate::{
    domain::{chain::ChainLayer, transfer::Direction},
    error::BridgeErrorKind,
    service::result_reporter::BridgeOperationResult,
};

static METRICS: OnceLock<Mutex<MetricsState>> = OnceLock::new();

#[derive(Default)]
struct MetricsState {
    // HTTP
    requests_total: u64,
    per_route: HashMap<String, u64>,
    // 桥接操作
    started: HashMap<Direction, u64>,
    succeeded: HashMap<Direction, u64>,
    failed: HashMap<Direction, u64>,
    failures_by_kind: HashMap<BridgeErrorKind, u64>,
    confirmation_timeouts: HashMap<ChainLayer, u64>,
}

fn state() -> std::sync::MutexGuard<'static, MetricsState> {
    let lock = METRICS.get_or_init(|| Mutex::new(MetricsState::default()));
    match lock.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(), // 避免因锁污染导致 panic
    }
}

pub fn count_request(route: &str) {
    let mut s = state();
    s.requests_total += 1;
    *s.per_route.entry(route.to_string()).or_insert(0) += 1;
}

pub fn inc_bridge_started(direction: Direction) {
    *state().started.entry(direction).or_insert(0) += 1;
}

/// 按结果计数；失败时同时按错误分类和超时链计数
pub fn record_bridge_result(result: &BridgeOperationResult) {
    let mut s = state();
    if result.success {
        *s.succeeded.entry(result.direction).or_insert(0) += 1;
        return;
    }

    *s.failed.entry(result.direction).or_insert(0) += 1;
    if let Some(reason) = result.failure {
        *s.failures_by_kind.entry(reason.kind).or_insert(0) += 1;
        if reason.kind == BridgeErrorKind::ConfirmationTimeout {
            if let Some(layer) = reason.layer {
                *s.confirmation_timeouts.entry(layer).or_insert(0) += 1;
            }
        }
    }
}

fn push_counter_family<K: Copy>(
    out: &mut String,
    name: &str,
    help: &str,
    label: &str,
    values: &HashMap<K, u64>,
    keys: &[K],
    key_name: impl Fn(K) -> &'static str,
) where
    K: std::hash::Hash + Eq,
{
    out.push_str(&format!("# HELP {} {}\n", name, help));
    out.push_str(&format!("# TYPE {} counter\n", name));
    for key in keys {
        out.push_str(&format!(
            "{}{{{}=\"{}\"}} {}\n",
            name,
            label,
            key_name(*key),
            values.get(key).copied().unwrap_or(0)
        ));
    }
}

pub fn render_prometheus() -> String {
    let s = state();
    let directions = [Direction::Deposit, Direction::Withdraw];
    let mut out = String::new();

    out.push_str("# HELP giwa_bridge_requests_total Total HTTP requests\n");
    out.push_str("# TYPE giwa_bridge_requests_total counter\n");
    out.push_str(&format!("giwa_bridge_requests_total {}\n", s.requests_total));

    out.push_str("# HELP giwa_bridge_route_requests_total Requests per route\n");
    out.push_str("# TYPE giwa_bridge_route_requests_total counter\n");
    let mut routes: Vec<_> = s.per_route.iter().collect();
    routes.sort();
    for (route, count) in routes {
        out.push_str(&format!(
            "giwa_bridge_route_requests_total{{route=\"{}\"}} {}\n",
            route, count
        ));
    }

    push_counter_family(
        &mut out,
        "giwa_bridge_operations_started_total",
        "Bridge operations started",
        "direction",
        &s.started,
        &directions,
        |d| d.as_str(),
    );
    push_counter_family(
        &mut out,
        "giwa_bridge_operations_succeeded_total",
        "Bridge operations completed successfully",
        "direction",
        &s.succeeded,
        &directions,
        |d| d.as_str(),
    );
    push_counter_family(
        &mut out,
        "giwa_bridge_operations_failed_total",
        "Bridge operations that failed",
        "direction",
        &s.failed,
        &directions,
        |d| d.as_str(),
    );
    push_counter_family(
        &mut out,
        "giwa_bridge_failures_total",
        "Bridge failures per error kind",
        "kind",
        &s.failures_by_kind,
        &[
            BridgeErrorKind::InvalidAmount,
            BridgeErrorKind::InsufficientBalance,
            BridgeErrorKind::PayloadBuildError,
            BridgeErrorKind::SubmissionError,
            BridgeErrorKind::ConfirmationTimeout,
            BridgeErrorKind::ChainRejected,
            BridgeErrorKind::NetworkError,
        ],
        |k| k.as_str(),
    );
    push_counter_family(
        &mut out,
        "giwa_bridge_confirmation_timeouts_total",
        "Confirmation timeouts per chain",
        "chain",
        &s.confirmation_timeouts,
        &[ChainLayer::L1, ChainLayer::L2],
        |l| l.as_str(),
    );

    out
}
