mod common;

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use wells_sdk::testing::{Failure, LedgerCall, MockLedger};
use wells_sdk::{
    AddLiquidityParams, Deadline, Error, Overrides, RemoveLiquidityImbalancedParams,
    RemoveLiquidityOneTokenParams, RemoveLiquidityParams, ShiftParams, SwapFromParams, SwapToParams,
    TokenValue, WellCall,
};

use common::*;

fn swap_from_params(amount_in: &str, deadline: Option<Deadline>) -> SwapFromParams {
    SwapFromParams {
        from_token:     bean_token(),
        to_token:       weth_token(),
        amount_in:      bean_token().amount(amount_in).unwrap(),
        min_amount_out: weth_token().amount("0.01").unwrap(),
        recipient:      recipient(),
        deadline,
        overrides:      Overrides::default(),
    }
}

fn negative(decimals: u8) -> TokenValue {
    TokenValue::from_human("-1", decimals).unwrap()
}

fn assert_invalid(err: Error, expected: &str) {
    match err {
        Error::InvalidArgument { param, .. } => assert_eq!(param, expected),
        other => panic!("expected InvalidArgument({expected}), got {other:?}"),
    }
}

// ─── Conversion ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_liquidity_quote_scales_each_amount_by_its_own_token() {
    // LP decimals differ from both inputs so a wrong scale shows up.
    let ledger = Arc::new(
        bean_weth(12).with_preview("getAddLiquidityOut", vec![U256::from(2_500_000_000_000u64)]),
    );
    let well = well_over(&ledger);

    let lp_out = well
        .add_liquidity_quote(&[
            bean_token().amount("100").unwrap(),
            weth_token().amount("0.5").unwrap(),
        ])
        .await
        .unwrap();

    let sent_amounts = ledger.calls().into_iter().find_map(|c| match c {
        LedgerCall::AddLiquidityOut { amounts, .. } => Some(amounts),
        _ => None,
    });
    assert_eq!(
        sent_amounts,
        Some(vec![U256::from(100_000_000u64), U256::from(500_000_000_000_000_000u64)])
    );
    assert_eq!(lp_out.decimals(), 12);
    assert_eq!(lp_out.to_string(), "2.5");
    assert!(ledger.sent().is_empty());
}

#[tokio::test]
async fn swap_quotes_convert_with_the_right_token() {
    let ledger = Arc::new(
        bean_weth(18)
            .with_preview("getSwapOut", vec![U256::from(250_000_000_000_000_000u64)])
            .with_preview("getSwapIn", vec![U256::from(42_500_000u64)]),
    );
    let well = well_over(&ledger);
    let (bean, weth) = (bean_token(), weth_token());

    let out = well.swap_from_quote(&bean, &weth, &bean.amount("100").unwrap()).await.unwrap();
    assert_eq!(out, weth.amount("0.25").unwrap());
    assert_eq!(out.decimals(), 18);

    let amount_in = well.swap_to_quote(&bean, &weth, &weth.amount("0.1").unwrap()).await.unwrap();
    assert_eq!(amount_in, bean.amount("42.5").unwrap());
    assert_eq!(amount_in.decimals(), 6);

    let calls = ledger.calls();
    assert!(calls.contains(&LedgerCall::SwapOut {
        well:      well_address(),
        from:      bean.address,
        to:        weth.address,
        amount_in: U256::from(100_000_000u64),
    }));
    assert!(calls.contains(&LedgerCall::SwapIn {
        well:       well_address(),
        from:       bean.address,
        to:         weth.address,
        amount_out: U256::from(100_000_000_000_000_000u64),
    }));
}

#[tokio::test]
async fn amounts_at_a_foreign_scale_are_rescaled_exactly() {
    let ledger = Arc::new(bean_weth(18));
    let well = well_over(&ledger);

    let mut params = swap_from_params("1", None);
    params.amount_in = TokenValue::from_human("12.5", 18).unwrap();
    well.swap_from(params).await.unwrap();
    match &ledger.sent()[0] {
        WellCall::SwapFrom { amount_in, .. } => assert_eq!(*amount_in, U256::from(12_500_000u64)),
        other => panic!("unexpected call {other:?}"),
    }

    // Seven fractional digits cannot be expressed in BEAN.
    let mut params = swap_from_params("1", None);
    params.amount_in = TokenValue::from_human("0.0000001", 18).unwrap();
    assert_invalid(well.swap_from(params).await.unwrap_err(), "amountIn");
    assert_eq!(ledger.sent().len(), 1);
}

#[tokio::test]
async fn remove_liquidity_quote_stays_aligned_with_tokens() {
    let ledger = Arc::new(bean_weth(18).with_preview(
        "getRemoveLiquidityOut",
        vec![U256::from(10_000_000u64), U256::from(5_000_000_000_000_000u64)],
    ));
    let well = well_over(&ledger);
    let lp = TokenValue::from_human("1", 18).unwrap();

    let out = well.remove_liquidity_quote(&lp).await.unwrap();
    assert_eq!(out.len(), 2);
    assert_eq!(out[0], bean_token().amount("10").unwrap());
    assert_eq!(out[1], weth_token().amount("0.005").unwrap());
    assert!(ledger
        .calls()
        .contains(&LedgerCall::RemoveLiquidityOut { well: well_address(), lp_amount_in: U256::from(10u64).pow(U256::from(18u8)) }));
}

#[tokio::test]
async fn misaligned_preview_is_rejected() {
    let ledger = Arc::new(bean_weth(18).with_preview("getRemoveLiquidityOut", vec![U256::from(1u8)]));
    let well = well_over(&ledger);

    let err = well
        .remove_liquidity_quote(&TokenValue::from_human("1", 18).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ResourceUnavailable(_)));
}

#[tokio::test]
async fn single_token_and_shift_quotes_use_the_output_token() {
    let ledger = Arc::new(
        bean_weth(18)
            .with_preview("getRemoveLiquidityOneTokenOut", vec![U256::from(3_000_000u64)])
            .with_preview("getRemoveLiquidityImbalancedIn", vec![U256::from(7u64) * U256::from(10u64).pow(U256::from(17u8))])
            .with_preview("getShiftOut", vec![U256::from(1_500_000_000_000_000_000u64)]),
    );
    let well = well_over(&ledger);
    let lp = TokenValue::from_human("2", 18).unwrap();

    let one = well.remove_liquidity_one_token_quote(&lp, &bean_token()).await.unwrap();
    assert_eq!(one.to_string(), "3");
    assert_eq!(one.decimals(), 6);

    let lp_in = well
        .remove_liquidity_imbalanced_quote(&[
            bean_token().amount("1").unwrap(),
            weth_token().amount("0").unwrap(),
        ])
        .await
        .unwrap();
    assert_eq!(lp_in.to_string(), "0.7");

    let shifted = well.shift_quote(&weth_token()).await.unwrap();
    assert_eq!(shifted.to_string(), "1.5");
    assert!(ledger.sent().is_empty());
}

// ─── Validation precedes I/O ──────────────────────────────────────────────────

#[tokio::test]
async fn negative_amounts_never_reach_the_ledger() {
    let ledger = Arc::new(bean_weth(18));
    let well = well_over(&ledger);

    let mut swap = swap_from_params("1", None);
    swap.amount_in = negative(6);
    assert_invalid(well.swap_from(swap.clone()).await.unwrap_err(), "amountIn");
    assert_invalid(well.swap_from_fee_on_transfer(swap).await.unwrap_err(), "amountIn");

    let swap_to = SwapToParams {
        from_token:    bean_token(),
        to_token:      weth_token(),
        max_amount_in: bean_token().amount("1").unwrap(),
        amount_out:    negative(18),
        recipient:     recipient(),
        deadline:      None,
        overrides:     Overrides::default(),
    };
    assert_invalid(well.swap_to(swap_to).await.unwrap_err(), "amountOut");

    let add = AddLiquidityParams {
        token_amounts_in:  vec![bean_token().amount("1").unwrap(), negative(18)],
        min_lp_amount_out: TokenValue::zero(18).unwrap(),
        recipient:         recipient(),
        deadline:          None,
        overrides:         Overrides::default(),
    };
    assert_invalid(well.add_liquidity(add.clone()).await.unwrap_err(), "tokenAmountsIn");
    assert_invalid(well.add_liquidity_fee_on_transfer(add).await.unwrap_err(), "tokenAmountsIn");

    let remove = RemoveLiquidityParams {
        lp_amount_in:          negative(18),
        min_token_amounts_out: vec![TokenValue::zero(6).unwrap(), TokenValue::zero(18).unwrap()],
        recipient:             recipient(),
        deadline:              None,
        overrides:             Overrides::default(),
    };
    assert_invalid(well.remove_liquidity(remove).await.unwrap_err(), "lpAmountIn");

    let one = RemoveLiquidityOneTokenParams {
        lp_amount_in:         TokenValue::from_human("1", 18).unwrap(),
        token_out:            bean_token(),
        min_token_amount_out: negative(6),
        recipient:            recipient(),
        deadline:             None,
        overrides:            Overrides::default(),
    };
    assert_invalid(well.remove_liquidity_one_token(one).await.unwrap_err(), "minTokenAmountOut");

    let imbalanced = RemoveLiquidityImbalancedParams {
        max_lp_amount_in:  negative(18),
        token_amounts_out: vec![TokenValue::zero(6).unwrap(), TokenValue::zero(18).unwrap()],
        recipient:         recipient(),
        deadline:          None,
        overrides:         Overrides::default(),
    };
    assert_invalid(well.remove_liquidity_imbalanced(imbalanced).await.unwrap_err(), "maxLpAmountIn");

    let shift = ShiftParams {
        token_out:      weth_token(),
        min_amount_out: negative(18),
        recipient:      recipient(),
        overrides:      Overrides::default(),
    };
    assert_invalid(well.shift(shift).await.unwrap_err(), "minAmountOut");

    assert_invalid(well.swap_from_quote(&bean_token(), &weth_token(), &negative(6)).await.unwrap_err(), "amountIn");
    assert_invalid(well.add_liquidity_quote(&[negative(6)]).await.unwrap_err(), "tokenAmountsIn");
    assert_invalid(well.remove_liquidity_quote(&negative(18)).await.unwrap_err(), "lpAmountIn");

    assert_eq!(ledger.total_calls(), 0);
}

#[tokio::test]
async fn empty_identities_never_reach_the_ledger() {
    let ledger = Arc::new(bean_weth(18));
    let well = well_over(&ledger);

    let mut swap = swap_from_params("1", None);
    swap.recipient = Address::ZERO;
    let err = well.swap_from(swap).await.unwrap_err();
    assert!(err.is_caller_error());
    assert_invalid(err, "recipient");

    let mut swap = swap_from_params("1", None);
    swap.to_token.address = Address::ZERO;
    assert_invalid(well.swap_from(swap).await.unwrap_err(), "toToken");

    assert_invalid(well.skim(Address::ZERO, &Overrides::default()).await.unwrap_err(), "recipient");
    let mut nobody = weth_token();
    nobody.address = Address::ZERO;
    assert_invalid(well.shift_quote(&nobody).await.unwrap_err(), "tokenOut");

    assert_eq!(ledger.total_calls(), 0);
}

#[tokio::test]
async fn wrong_array_length_is_a_caller_error() {
    let ledger = Arc::new(bean_weth(18));
    let well = well_over(&ledger);

    let add = AddLiquidityParams {
        token_amounts_in:  vec![bean_token().amount("1").unwrap()],
        min_lp_amount_out: TokenValue::zero(18).unwrap(),
        recipient:         recipient(),
        deadline:          None,
        overrides:         Overrides::default(),
    };
    assert_invalid(well.add_liquidity(add).await.unwrap_err(), "tokenAmountsIn");
    assert!(ledger.sent().is_empty());
}

// ─── Deadline ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn omitted_deadline_means_no_deadline() {
    let ledger = Arc::new(bean_weth(18));
    let well = well_over(&ledger);

    well.swap_from(swap_from_params("100", None)).await.unwrap();
    well.swap_from(swap_from_params("100", Some(Deadline::from(12345)))).await.unwrap();

    let deadlines: Vec<_> = ledger.sent().iter().map(|c| c.deadline()).collect();
    assert_eq!(deadlines, vec![Some(Deadline::MAX), Some(Deadline::from(12345))]);
    assert_eq!(Deadline::MAX.value(), U256::MAX);
}

#[tokio::test]
async fn every_deadline_bearing_call_defaults_to_max() {
    let ledger = Arc::new(bean_weth(18));
    let well = well_over(&ledger);
    let lp = TokenValue::from_human("1", 18).unwrap();
    let pair = vec![bean_token().amount("1").unwrap(), weth_token().amount("1").unwrap()];

    well.swap_to(SwapToParams {
        from_token:    bean_token(),
        to_token:      weth_token(),
        max_amount_in: bean_token().amount("10").unwrap(),
        amount_out:    weth_token().amount("0.01").unwrap(),
        recipient:     recipient(),
        deadline:      None,
        overrides:     Overrides::default(),
    })
    .await
    .unwrap();
    well.add_liquidity(AddLiquidityParams {
        token_amounts_in:  pair.clone(),
        min_lp_amount_out: TokenValue::zero(18).unwrap(),
        recipient:         recipient(),
        deadline:          None,
        overrides:         Overrides::default(),
    })
    .await
    .unwrap();
    well.remove_liquidity(RemoveLiquidityParams {
        lp_amount_in:          lp,
        min_token_amounts_out: pair.clone(),
        recipient:             recipient(),
        deadline:              None,
        overrides:             Overrides::default(),
    })
    .await
    .unwrap();
    well.remove_liquidity_one_token(RemoveLiquidityOneTokenParams {
        lp_amount_in:         lp,
        token_out:            weth_token(),
        min_token_amount_out: TokenValue::zero(18).unwrap(),
        recipient:            recipient(),
        deadline:             None,
        overrides:            Overrides::default(),
    })
    .await
    .unwrap();
    well.remove_liquidity_imbalanced(RemoveLiquidityImbalancedParams {
        max_lp_amount_in:  lp,
        token_amounts_out: pair,
        recipient:         recipient(),
        deadline:          None,
        overrides:         Overrides::default(),
    })
    .await
    .unwrap();

    let sent = ledger.sent();
    assert_eq!(sent.len(), 5);
    assert!(sent.iter().all(|c| c.deadline() == Some(Deadline::MAX)));
}

// ─── Submission ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_liquidity_sends_positionally_aligned_raw_amounts() {
    let ledger = Arc::new(bean_weth(18));
    let well = well_over(&ledger);

    let tx = well
        .add_liquidity_fee_on_transfer(AddLiquidityParams {
            token_amounts_in:  vec![bean_token().amount("100").unwrap(), weth_token().amount("0.5").unwrap()],
            min_lp_amount_out: TokenValue::from_human("1.5", 18).unwrap(),
            recipient:         recipient(),
            deadline:          Some(Deadline::from(1_700_000_000)),
            overrides:         Overrides::default(),
        })
        .await
        .unwrap();

    assert_eq!(tx.well, well_address());
    assert_eq!(tx.function, "addLiquidityFeeOnTransfer");
    assert_eq!(
        ledger.sent(),
        vec![WellCall::AddLiquidityFeeOnTransfer {
            token_amounts_in:  vec![U256::from(100_000_000u64), U256::from(500_000_000_000_000_000u64)],
            min_lp_amount_out: U256::from(1_500_000_000_000_000_000u64),
            recipient:         recipient(),
            deadline:          Deadline::from(1_700_000_000),
        }]
    );
}

#[tokio::test]
async fn overrides_are_handed_to_the_transport_untouched() {
    let ledger = Arc::new(bean_weth(18));
    let well = well_over(&ledger);

    let mut overrides = Overrides::from_address(Address::repeat_byte(0x42));
    overrides.gas = Some(U256::from(300_000u64));
    overrides.extra.insert("type".into(), serde_json::json!("0x2"));

    let mut params = swap_from_params("1", None);
    params.overrides = overrides.clone();
    well.swap_from(params).await.unwrap();
    well.sync(&overrides).await.unwrap();

    let passed: Vec<_> = ledger
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            LedgerCall::Send { overrides, .. } => Some(overrides),
            _ => None,
        })
        .collect();
    assert_eq!(passed, vec![overrides.clone(), overrides]);
}

#[tokio::test]
async fn maintenance_calls_carry_their_arguments() {
    let ledger = Arc::new(bean_weth(18));
    let well = well_over(&ledger);

    let sync = well.sync(&Overrides::default()).await.unwrap();
    let skim = well.skim(recipient(), &Overrides::default()).await.unwrap();
    well.shift(ShiftParams {
        token_out:      weth_token(),
        min_amount_out: weth_token().amount("0.25").unwrap(),
        recipient:      recipient(),
        overrides:      Overrides::default(),
    })
    .await
    .unwrap();

    assert_ne!(sync.hash, skim.hash);
    assert_eq!(
        ledger.sent(),
        vec![
            WellCall::Sync,
            WellCall::Skim { recipient: recipient() },
            WellCall::Shift {
                token_out:      weth(),
                min_amount_out: U256::from(250_000_000_000_000_000u64),
                recipient:      recipient(),
            },
        ]
    );
    // None of these needs the cached configuration.
    assert_eq!(ledger.count("well"), 0);
}

#[tokio::test]
async fn ledger_rejection_is_surfaced_as_is() {
    let ledger = Arc::new(bean_weth(18));
    let well = well_over(&ledger);
    ledger.fail_next("send", Failure::Revert("Well: slippage".into()));

    let err = well.swap_from(swap_from_params("100", None)).await.unwrap_err();
    match &err {
        Error::Reverted { reason, .. } => assert_eq!(reason, "Well: slippage"),
        other => panic!("expected revert, got {other:?}"),
    }
    assert!(!err.is_caller_error());
}

#[tokio::test]
async fn lp_amounts_use_the_lp_token_scale() {
    let ledger = Arc::new(bean_weth(9));
    let well = well_over(&ledger);

    well.remove_liquidity_one_token(RemoveLiquidityOneTokenParams {
        lp_amount_in:         TokenValue::from_human("2", 18).unwrap(),
        token_out:            bean_token(),
        min_token_amount_out: bean_token().amount("1").unwrap(),
        recipient:            recipient(),
        deadline:             None,
        overrides:            Overrides::default(),
    })
    .await
    .unwrap();

    match &ledger.sent()[0] {
        WellCall::RemoveLiquidityOneToken { lp_amount_in, min_token_amount_out, .. } => {
            assert_eq!(*lp_amount_in, U256::from(2_000_000_000u64));
            assert_eq!(*min_token_amount_out, U256::from(1_000_000u64));
        }
        other => panic!("unexpected call {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_ledger_is_not_a_caller_error() {
    let ledger = Arc::new(MockLedger::new());
    let well = wells_sdk::Well::new(ledger.clone(), well_address()).unwrap();
    ledger.fail_next("getShiftOut", Failure::Unavailable("503".into()));

    let err = well.shift_quote(&weth_token()).await.unwrap_err();
    assert!(matches!(err, Error::ResourceUnavailable(_)));
    assert_eq!(ledger.count("getShiftOut"), 1);
}
