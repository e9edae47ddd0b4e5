//! 存款编排（L1 → L2）
//!
//! 1. 校验金额
//! 2. 检查 L1 余额
//! 3. 在 L2 客户端上构建存款载荷
//! 4. 提交 L1 交易并等待确认（默认 120s）
//! 5. 从 L1 回执推导 L2 存款交易
//! 6. 等待 L2 确认（默认 180s）

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
    let mut flow = BridgeFlow::start(Direction::Deposit, ctx.observer.as_ref());

    let result = match execute(ctx, amount_text, &mut flow).await {
        Ok((amount, l1_tx, l2_tx)) => {
            flow.advance(BridgeState::Done);
            BridgeOperationResult::deposit_succeeded(&amount, l1_tx, l2_tx)
        }
        Err(err) => {
            flow.fail(&err);
            BridgeOperationResult::failed(
                Direction::Deposit,
                flow.primary_tx(),
                flow.correlated_tx(),
                &err,
            )
        }
    };

    ctx.observer.on_finished(&result);
    result
}

async fn execute(
    ctx: &BridgeContext,
    amount_text: Option<&str>,
    flow: &mut BridgeFlow<'_>,
) -> Result<(ValidAmount, TxHash, TxHash), BridgeError> {
    let amount = amount::validate(amount_text, ctx.params.min_transfer_eth)?;

    flow.advance(BridgeState::CheckingBalance);
    ctx.ensure_balance(ChainLayer::L1, &amount).await?;

    flow.advance(BridgeState::BuildingPayload);
    let payload = ctx
        .l2
        .build_deposit_payload(ctx.account, amount.wei())
        .await?;

    let l1_tx = ctx.l1.submit_transaction(&payload).await?;
    flow.submitted_primary(ChainLayer::L1, l1_tx);

    let l1_receipt = ctx
        .l1
        .wait_for_confirmation(l1_tx, ctx.params.deposit_l1_timeout())
        .await?;
    flow.advance(BridgeState::Confirmed(ChainLayer::L1));

    flow.advance(BridgeState::Correlating);
    let l2_tx = ctx.l1.derive_correlated_tx_id(&l1_receipt)?;
    flow.submitted_correlated(l2_tx);

    ctx.l2
        .wait_for_confirmation(l2_tx, ctx.params.deposit_l2_timeout())
        .await?;
    flow.advance(BridgeState::Confirmed(ChainLayer::L2));

    Ok((amount, l1_tx, l2_tx))
}

