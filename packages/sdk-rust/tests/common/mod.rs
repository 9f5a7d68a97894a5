#![allow(dead_code)]

use std::sync::Arc;

use alloy_primitives::{Address, Bytes, U256};
use wells_sdk::testing::{MockLedger, MockWell};
use wells_sdk::{Token, Well};

pub fn bean() -> Address {
    Address::repeat_byte(0xbe)
}

pub fn weth() -> Address {
    Address::repeat_byte(0xee)
}

pub fn well_address() -> Address {
    Address::repeat_byte(0x77)
}

pub fn recipient() -> Address {
    Address::repeat_byte(0x99)
}

pub fn bean_token() -> Token {
    Token::new(bean(), "Bean", "BEAN", 6)
}

pub fn weth_token() -> Token {
    Token::new(weth(), "Wrapped Ether", "WETH", 18)
}

/// BEAN (6 decimals) / WETH (18 decimals) Well holding 1000 BEAN and
/// 500 WETH, with an LP token of `lp_decimals`.
pub fn bean_weth(lp_decimals: u8) -> MockLedger {
    MockLedger::new()
        .with_token(bean(), "Bean", "BEAN", 6)
        .with_token(weth(), "Wrapped Ether", "WETH", 18)
        .with_well(
            MockWell::new(well_address(), "BEAN:WETH Constant Product 2 Well", vec![bean(), weth()])
                .lp("BEANWETHCP2w", lp_decimals)
                .pump(Address::repeat_byte(0xb0), Bytes::from(vec![0x01u8, 0x02]))
                .reserves(vec![
                    U256::from(1_000_000_000u64),
                    U256::from(500_000_000_000_000_000_000u128),
                ]),
        )
}

pub fn well_over(ledger: &Arc<MockLedger>) -> Well {
    Well::new(ledger.clone(), well_address()).unwrap()
}
