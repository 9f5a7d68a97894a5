//! Fail-fast guards run at the top of every public operation, before any
//! cached field is touched or any ledger call is made.

use std::str::FromStr;

use alloy_primitives::Address;

use crate::{
    error::{Error, Result},
    token::{Token, TokenValue},
};

/// A token is usable when it names a real contract.
pub fn validate_token(token: &Token, param: &'static str) -> Result<()> {
    if token.address.is_zero() {
        return Err(Error::invalid(param, "token address is empty"));
    }
    Ok(())
}

/// Amounts sent toward the ledger must be non-negative.
pub fn validate_amount(value: &TokenValue, param: &'static str) -> Result<()> {
    if value.is_negative() {
        return Err(Error::invalid(param, format!("amount {value} is negative")));
    }
    Ok(())
}

/// Validate every entry of a positional amount array.
pub fn validate_amounts(values: &[TokenValue], param: &'static str) -> Result<()> {
    if values.is_empty() {
        return Err(Error::invalid(param, "amount list is empty"));
    }
    values.iter().try_for_each(|v| validate_amount(v, param))
}

/// A recipient must be a real identity; the zero address would burn funds.
pub fn validate_address(address: &Address, param: &'static str) -> Result<()> {
    if address.is_zero() {
        return Err(Error::invalid(param, "address is empty (zero address)"));
    }
    Ok(())
}

/// Parse a `0x`-prefixed hex identity string, rejecting empty or malformed input.
pub fn parse_address(input: &str, param: &'static str) -> Result<Address> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid(param, "address is empty"));
    }
    let address = Address::from_str(trimmed)
        .map_err(|e| Error::invalid(param, format!("'{trimmed}' is not a valid address: {e}")))?;
    validate_address(&address, param)?;
    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_token_rejected() {
        let token = Token::new(Address::ZERO, "", "", 18);
        let err = validate_token(&token, "fromToken").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { param: "fromToken", .. }));

        let token = Token::new(Address::repeat_byte(3), "Bean", "BEAN", 6);
        assert!(validate_token(&token, "fromToken").is_ok());
    }

    #[test]
    fn negative_amount_rejected() {
        let neg = TokenValue::from_human("-0.1", 6).unwrap();
        let err = validate_amount(&neg, "amountIn").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { param: "amountIn", .. }));
        assert!(validate_amount(&TokenValue::zero(6).unwrap(), "amountIn").is_ok());
    }

    #[test]
    fn amount_lists_checked_elementwise() {
        let ok = TokenValue::from_human("1", 6).unwrap();
        let neg = TokenValue::from_human("-1", 18).unwrap();
        assert!(validate_amounts(&[ok, ok], "tokenAmountsIn").is_ok());
        assert!(validate_amounts(&[ok, neg], "tokenAmountsIn").is_err());
        assert!(validate_amounts(&[], "tokenAmountsIn").is_err());
    }

    #[test]
    fn address_strings() {
        assert!(parse_address("", "recipient").is_err());
        assert!(parse_address("0x1234", "recipient").is_err());
        assert!(parse_address("not-an-address", "recipient").is_err());
        assert!(parse_address("0x0000000000000000000000000000000000000000", "recipient").is_err());
        let addr = parse_address(" 0xBEA0e11282e2bB5893bEcE110cF199501e872bAd ", "recipient").unwrap();
        assert_eq!(addr, Address::from_str("0xBEA0e11282e2bB5893bEcE110cF199501e872bAd").unwrap());
    }
}
