//! 提现发起（L2 → L1）
//!
//! 只负责在 L2 上发起提现；挑战期结束后的证明与最终确认不在本流程内。

use ethers::types::TxHash;

use crate::{
    domain::{
        amount::{self, ValidAmount},
        chain::ChainLayer,
        transfer::Direction,
    },
    error::BridgeError,
    service::{
        bridge_context::BridgeContext,
        bridge_state_machine::{BridgeFlow, BridgeState},
        result_reporter::BridgeOperationResult,
    },
};

pub async fn run(ctx: &BridgeContext, amount_text: Option<&str>) -> BridgeOperationResult {
    let mut flow = BridgeFlow::start(Direction::Withdraw, ctx.observer.as_ref());

    let result = match execute(ctx, amount_text, &mut flow).await {
        Ok((amount, l2_tx)) => {
            flow.advance(BridgeState::Done);
            BridgeOperationResult::withdrawal_initiated(
                &amount,
                l2_tx,
                ctx.params.challenge_period_days,
            )
        }
        Err(err) => {
            flow.fail(&err);
            BridgeOperationResult::failed(Direction::Withdraw, flow.primary_tx(), None, &err)
        }
    };

    ctx.observer.on_finished(&result);
    result
}

async fn execute(
    ctx: &BridgeContext,
    amount_text: Option<&str>,
    flow: &mut BridgeFlow<'_>,
) -> Result<(ValidAmount, TxHash), BridgeError> {
    let amount = amount::validate(amount_text, ctx.params.min_transfer_eth)?;

    flow.advance(BridgeState::CheckingBalance);
    ctx.ensure_balance(ChainLayer::L2, &amount).await?;

    // 载荷由 L1 客户端构建（L1 执行 gas），提交到 L2
    flow.advance(BridgeState::BuildingPayload);
    let payload = ctx
        .l1
        .build_withdrawal_payload(ctx.account, amount.wei())
        .await?;

    let l2_tx = ctx.l2.submit_transaction(&payload).await?;
    flow.submitted_primary(ChainLayer::L2, l2_tx);

    ctx.l2
        .wait_for_confirmation(l2_tx, ctx.params.withdrawal_l2_timeout())
        .await?;
    flow.advance(BridgeState::Confirmed(ChainLayer::L2));

    Ok((amount, l2_tx))
}
