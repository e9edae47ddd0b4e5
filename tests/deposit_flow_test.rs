//! 存款编排集成测试（内存链客户端）

mod common;

use std::time::Duration;

use common::{account, eth, Call, Confirmation, Harness, MockChainClient};
use giwa_bridge::{
    domain::chain::ChainLayer,
    error::{BridgeError, BridgeErrorKind},
    service::{
        bridge_payload::BridgePayload,
        bridge_state_machine::BridgeState,
        deposit_derivation::l2_transaction_hashes,
        deposit_orchestrator,
        observer::ObservedEvent,
        result_reporter::FailureReason,
    },
};

#[tokio::test]
async fn test_deposit_success_reports_l1_and_l2_ids() {
    let harness = Harness::default_chains();
    let ctx = harness.context();

    let result = deposit_orchestrator::run(&ctx, Some("0.01")).await;

    assert!(result.success, "{}", result.human_message);
    assert_eq!(result.human_message, "Deposit 0.01 ETH completed successfully");
    assert!(result.error_detail.is_none());

    let l1_tx = result.primary_tx_id.expect("L1 id");
    let l2_tx = result.correlated_tx_id.expect("L2 id");
    assert_ne!(l1_tx, l2_tx);

    // 载荷在 L2 客户端构建，mint = 金额，接收方为同一账户
    assert_eq!(
        harness.l2.calls()[0],
        Call::BuildDeposit {
            to: account(),
            mint: eth("0.01")
        }
    );

    // 载荷提交到 L1
    let submissions = harness.l1.submissions();
    assert_eq!(submissions.len(), 1);
    assert!(matches!(&submissions[0], BridgePayload::Deposit(p) if p.mint == eth("0.01")));
    assert!(harness.l2.submissions().is_empty());

    // L1 等待 120s，L2 等待推导出的交易 180s
    assert_eq!(harness.l1.waits(), vec![(l1_tx, Duration::from_millis(120_000))]);
    assert_eq!(harness.l2.waits(), vec![(l2_tx, Duration::from_millis(180_000))]);
    assert!(harness.l1.calls().contains(&Call::Derive(l1_tx)));
}

#[tokio::test]
async fn test_correlated_id_matches_portal_log_derivation() {
    let harness = Harness::default_chains();
    let ctx = harness.context();

    let result = deposit_orchestrator::run(&ctx, Some("0.25")).await;
    assert!(result.success);

    // 对同一笔 L1 交易重新推导应得到相同的 L2 哈希
    let l1_tx = result.primary_tx_id.unwrap();
    let BridgePayload::Deposit(payload) = harness.l1.submissions()[0].clone() else {
        panic!("expected deposit payload");
    };
    let block_hash = common::block_hash_for(l1_tx);
    let receipt = ethers::types::TransactionReceipt {
        transaction_hash: l1_tx,
        block_hash: Some(block_hash),
        logs: vec![common::deposit_log(&payload, account(), block_hash, 0)],
        ..Default::default()
    };
    let expected = l2_transaction_hashes(&receipt, payload.portal).unwrap();
    assert_eq!(expected, vec![result.correlated_tx_id.unwrap()]);
}

#[tokio::test]
async fn test_deposit_walks_every_state_in_order() {
    let harness = Harness::default_chains();
    let ctx = harness.context();

    deposit_orchestrator::run(&ctx, Some("0.01")).await;

    assert_eq!(
        harness.observer.states(),
        vec![
            BridgeState::Validating,
            BridgeState::CheckingBalance,
            BridgeState::BuildingPayload,
            BridgeState::Submitted(ChainLayer::L1),
            BridgeState::Confirmed(ChainLayer::L1),
            BridgeState::Correlating,
            BridgeState::Submitted(ChainLayer::L2),
            BridgeState::Confirmed(ChainLayer::L2),
            BridgeState::Done,
        ]
    );
    assert_eq!(
        harness.observer.events().last(),
        Some(&ObservedEvent::Finished { success: true })
    );
}

#[tokio::test]
async fn test_invalid_amounts_fail_without_network_calls() {
    for input in [
        Some("0"),
        Some(""),
        Some("-1"),
        Some("abc"),
        Some("0.0005"),
        Some("1e-3"),
        Some("1_000"),
        None,
    ] {
        let harness = Harness::default_chains();
        let ctx = harness.context();

        let result = deposit_orchestrator::run(&ctx, input).await;

        assert!(!result.success);
        assert_eq!(
            result.failure.map(|f| f.kind),
            Some(BridgeErrorKind::InvalidAmount),
            "{:?}",
            input
        );
        assert!(result.error_detail.as_deref().unwrap().contains("0.001"));
        assert_eq!(
            result.error_detail.as_deref(),
            Some("Please enter a valid amount (min 0.001 ETH)")
        );
        assert!(result.primary_tx_id.is_none());
        assert!(harness.no_chain_calls(), "{:?} touched the chain", input);
    }
}

#[tokio::test]
async fn test_insufficient_l1_balance_names_both_amounts() {
    let harness = Harness::new(
        MockChainClient::new(ChainLayer::L1).with_balance(eth("0.001")),
        MockChainClient::new(ChainLayer::L2),
    );
    let ctx = harness.context();

    let result = deposit_orchestrator::run(&ctx, Some("0.01")).await;

    assert!(!result.success);
    assert_eq!(
        result.failure,
        Some(FailureReason {
            kind: BridgeErrorKind::InsufficientBalance,
            layer: Some(ChainLayer::L1)
        })
    );
    let detail = result.error_detail.unwrap();
    assert!(detail.contains("0.01"), "{}", detail);
    assert!(detail.contains("0.001"), "{}", detail);

    assert!(harness.l1.submissions().is_empty());
    assert!(harness.l2.calls().is_empty(), "no payload is built");
}

#[tokio::test]
async fn test_l1_timeout_reports_l1_id_and_skips_l2_wait() {
    let harness = Harness::new(
        MockChainClient::new(ChainLayer::L1).then_confirm(Confirmation::TimesOut),
        MockChainClient::new(ChainLayer::L2),
    );
    let ctx = harness.context();

    let result = deposit_orchestrator::run(&ctx, Some("0.01")).await;

    assert!(!result.success);
    assert_eq!(
        result.failure,
        Some(FailureReason {
            kind: BridgeErrorKind::ConfirmationTimeout,
            layer: Some(ChainLayer::L1)
        })
    );
    assert!(result.primary_tx_id.is_some());
    assert!(result.correlated_tx_id.is_none());
    assert!(result.error_detail.unwrap().contains("120000 ms"));
    assert!(harness.l2.waits().is_empty());
}

#[tokio::test]
async fn test_l2_timeout_keeps_both_ids() {
    let harness = Harness::new(
        MockChainClient::new(ChainLayer::L1),
        MockChainClient::new(ChainLayer::L2).then_confirm(Confirmation::TimesOut),
    );
    let ctx = harness.context();

    let result = deposit_orchestrator::run(&ctx, Some("0.01")).await;

    assert!(!result.success);
    assert_eq!(
        result.failure,
        Some(FailureReason {
            kind: BridgeErrorKind::ConfirmationTimeout,
            layer: Some(ChainLayer::L2)
        })
    );
    assert!(result.primary_tx_id.is_some(), "L1 id must survive an L2 timeout");
    assert!(result.correlated_tx_id.is_some());
    assert!(result.human_message.contains("L1 transaction is confirmed"));
    assert!(result.error_detail.unwrap().contains("180000 ms"));
}

#[tokio::test]
async fn test_reverted_l1_transaction_is_chain_rejected() {
    let harness = Harness::new(
        MockChainClient::new(ChainLayer::L1).then_confirm(Confirmation::Reverted),
        MockChainClient::new(ChainLayer::L2),
    );
    let ctx = harness.context();

    let result = deposit_orchestrator::run(&ctx, Some("0.01")).await;

    assert!(!result.success);
    assert_eq!(
        result.failure.map(|f| f.kind),
        Some(BridgeErrorKind::ChainRejected)
    );
    assert!(result.primary_tx_id.is_some());
}

#[tokio::test]
async fn test_payload_and_submission_errors_are_reported() {
    let build = Harness::new(
        MockChainClient::new(ChainLayer::L1),
        MockChainClient::new(ChainLayer::L2).failing_build(BridgeError::PayloadBuild {
            layer: ChainLayer::L2,
            message: "execution reverted".into(),
        }),
    );
    let result = deposit_orchestrator::run(&build.context(), Some("0.01")).await;
    assert_eq!(
        result.failure.map(|f| f.kind),
        Some(BridgeErrorKind::PayloadBuildError)
    );
    assert!(build.l1.submissions().is_empty());

    let submit = Harness::new(
        MockChainClient::new(ChainLayer::L1).failing_submit(BridgeError::Submission {
            layer: ChainLayer::L1,
            message: "nonce too low".into(),
        }),
        MockChainClient::new(ChainLayer::L2),
    );
    let result = deposit_orchestrator::run(&submit.context(), Some("0.01")).await;
    assert_eq!(
        result.failure.map(|f| f.kind),
        Some(BridgeErrorKind::SubmissionError)
    );
    assert!(result.primary_tx_id.is_none());
    assert_eq!(
        result.error_detail.as_deref(),
        Some("Failed to submit L1 transaction: nonce too low")
    );
}

#[tokio::test]
async fn test_balance_network_error_is_reported() {
    let harness = Harness::new(
        MockChainClient::new(ChainLayer::L1).failing_balance(BridgeError::Network {
            layer: ChainLayer::L1,
            message: "connection refused".into(),
        }),
        MockChainClient::new(ChainLayer::L2),
    );

    let result = deposit_orchestrator::run(&harness.context(), Some("0.01")).await;

    assert!(!result.success);
    assert_eq!(
        result.failure,
        Some(FailureReason {
            kind: BridgeErrorKind::NetworkError,
            layer: Some(ChainLayer::L1)
        })
    );
    assert!(harness.observer.events().contains(&ObservedEvent::Failed {
        at: BridgeState::CheckingBalance,
        kind: BridgeErrorKind::NetworkError,
        layer: Some(ChainLayer::L1),
    }));
}

#[tokio::test]
async fn test_two_identical_calls_submit_two_transactions() {
    let harness = Harness::default_chains();
    let ctx = harness.context();

    let first = deposit_orchestrator::run(&ctx, Some("0.01")).await;
    let second = deposit_orchestrator::run(&ctx, Some("0.01")).await;

    assert!(first.success && second.success);
    assert_eq!(harness.l1.submissions().len(), 2);
    assert_ne!(first.primary_tx_id, second.primary_tx_id);
    assert_ne!(first.correlated_tx_id, second.correlated_tx_id);
}
