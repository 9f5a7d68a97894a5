mod common;

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, U256};
use wells_sdk::testing::{Failure, LedgerCall};
use wells_sdk::{Error, PreloadOptions};

use common::*;

#[tokio::test]
async fn definition_is_read_once_whatever_the_getter_order() {
    let ledger = Arc::new(bean_weth(18));
    let well = well_over(&ledger);

    let pumps = well.pumps().await.unwrap();
    let aquifer = well.aquifer().await.unwrap();
    let tokens = well.tokens().await.unwrap();
    let function = well.well_function().await.unwrap();
    well.tokens().await.unwrap();
    well.details().await.unwrap();
    well.well_data().await.unwrap();

    assert_eq!(ledger.count("well"), 1);
    assert_eq!(ledger.count("name"), 0);
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].symbol, "BEAN");
    assert_eq!(tokens[1].decimals, 18);
    assert_eq!(pumps.len(), 1);
    assert_eq!(aquifer.address(), Address::repeat_byte(0xaf));
    assert_eq!(function.address(), Address::repeat_byte(0xf0));
}

#[tokio::test]
async fn concurrent_getters_join_one_read() {
    let ledger = Arc::new(bean_weth(18).with_latency(Duration::from_millis(20)));
    let well = well_over(&ledger);

    let (tokens, function) = tokio::join!(well.tokens(), well.well_function());

    assert_eq!(ledger.count("well"), 1);
    let tokens = tokens.unwrap();
    let function = function.unwrap();
    assert_eq!(well.cached_tokens(), Some(&tokens[..]));
    assert_eq!(well.cached_well_function(), Some(&function));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_tasks_share_the_cache() {
    let ledger = Arc::new(bean_weth(18).with_latency(Duration::from_millis(10)));
    let well = Arc::new(well_over(&ledger));

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let well = well.clone();
            tokio::spawn(async move {
                match i % 4 {
                    0 => well.tokens().await.map(|t| t.len()),
                    1 => well.pumps().await.map(|p| p.len()),
                    2 => well.name().await.map(|n| n.len()),
                    _ => well.lp_token().await.map(|t| t.decimals as usize),
                }
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(ledger.count("well"), 1);
    assert_eq!(ledger.count("name"), 1);
    // Two paired tokens plus the LP token.
    assert_eq!(ledger.count("tokenMetadata"), 3);
}

#[tokio::test]
async fn load_well_makes_every_field_resident() {
    let ledger = Arc::new(bean_weth(18));
    let well = well_over(&ledger);

    well.load_well(None).await.unwrap();

    assert_eq!(well.cached_name(), Some("BEAN:WETH Constant Product 2 Well"));
    assert_eq!(well.cached_lp_token().map(|t| t.symbol.as_str()), Some("BEANWETHCP2w"));
    assert_eq!(well.cached_tokens().map(<[_]>::len), Some(2));
    assert!(well.cached_well_function().is_some());
    assert_eq!(well.cached_pumps().map(<[_]>::len), Some(1));
    assert!(well.cached_aquifer().is_some());
    assert_eq!(well.cached_reserves().map(|r| r.len()), Some(2));

    let before = ledger.total_calls();
    well.name().await.unwrap();
    well.lp_token().await.unwrap();
    well.tokens().await.unwrap();
    well.aquifer().await.unwrap();
    assert_eq!(ledger.total_calls(), before);
}

#[tokio::test]
async fn load_well_issues_only_selected_reads() {
    let ledger = Arc::new(bean_weth(18));
    let well = well_over(&ledger);

    well.load_well(Some(PreloadOptions { name: true, ..Default::default() }))
        .await
        .unwrap();

    assert_eq!(ledger.count("name"), 1);
    assert_eq!(ledger.count("well"), 0);
    assert_eq!(ledger.count("getReserves"), 0);
    assert!(well.cached_tokens().is_none());
}

#[tokio::test]
async fn reserves_are_read_after_the_definition_settles() {
    let ledger = Arc::new(bean_weth(18).with_latency(Duration::from_millis(5)));
    let well = well_over(&ledger);

    well.load_well(Some(PreloadOptions { tokens: true, reserves: true, ..Default::default() }))
        .await
        .unwrap();

    let calls = ledger.calls();
    let definition = calls.iter().position(|c| matches!(c, LedgerCall::Well { .. })).unwrap();
    let reserves = calls.iter().position(|c| matches!(c, LedgerCall::Reserves { .. })).unwrap();
    assert!(definition < reserves);
    assert_eq!(ledger.count("well"), 1);
}

#[tokio::test]
async fn reserves_align_with_tokens_and_are_always_fresh() {
    let ledger = Arc::new(bean_weth(18));
    let well = well_over(&ledger);

    let tokens = well.tokens().await.unwrap();
    let reserves = well.reserves().await.unwrap();
    assert_eq!(reserves.len(), tokens.len());
    assert_eq!(reserves[0], tokens[0].amount("1000").unwrap());
    assert_eq!(reserves[1], tokens[1].amount("500").unwrap());

    ledger.set_reserves(well_address(), vec![U256::from(2_000_000_000u64), U256::from(1u8)]);
    let reserves = well.reserves().await.unwrap();
    assert_eq!(reserves[0].to_string(), "2000");
    assert_eq!(reserves[1].to_string(), "0.000000000000000001");
    assert_eq!(ledger.count("getReserves"), 2);
    assert_eq!(ledger.count("well"), 1);
}

#[tokio::test]
async fn misaligned_reserves_are_rejected() {
    let ledger = Arc::new(bean_weth(18));
    let well = well_over(&ledger);
    ledger.set_reserves(well_address(), vec![U256::from(1u8)]);

    let err = well.reserves().await.unwrap_err();
    assert!(matches!(err, Error::ResourceUnavailable(_)));
    assert!(well.cached_reserves().is_none());
}

#[tokio::test]
async fn failed_read_is_retried_by_the_next_caller() {
    let ledger = Arc::new(bean_weth(18));
    let well = well_over(&ledger);
    ledger.fail_next("well", Failure::Unavailable("connection refused".into()));

    let err = well.well_function().await.unwrap_err();
    assert!(matches!(err, Error::ResourceUnavailable(_)));
    assert!(!err.is_caller_error());
    assert!(well.cached_tokens().is_none());
    assert!(well.cached_well_function().is_none());

    assert!(well.well_function().await.is_ok());
    assert_eq!(ledger.count("well"), 2);
}

#[tokio::test]
async fn name_failure_does_not_touch_other_fields() {
    let ledger = Arc::new(bean_weth(18));
    let well = well_over(&ledger);
    well.tokens().await.unwrap();
    ledger.fail_next("name", Failure::Unavailable("timeout".into()));

    assert!(well.name().await.is_err());
    assert!(well.cached_name().is_none());
    assert!(well.cached_tokens().is_some());
    assert_eq!(well.name().await.unwrap(), "BEAN:WETH Constant Product 2 Well");
}

#[tokio::test]
async fn resident_collections_are_shared_not_copied() {
    let ledger = Arc::new(bean_weth(18));
    let well = well_over(&ledger);

    let first = well.tokens().await.unwrap();
    let second = well.tokens().await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let pumps = well.pumps().await.unwrap();
    assert!(Arc::ptr_eq(&pumps, &well.pumps().await.unwrap()));
}

#[tokio::test]
async fn unknown_well_surfaces_the_ledger_rejection() {
    let ledger = Arc::new(bean_weth(18));
    let well = wells_sdk::Well::new(ledger.clone(), Address::repeat_byte(0x55)).unwrap();

    let err = well.tokens().await.unwrap_err();
    assert!(matches!(err, Error::Reverted { .. }));
    assert!(well.cached_tokens().is_none());
}
