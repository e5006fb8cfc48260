//! Checked arithmetic for ledger balances.
//!
//! Ledger state is kept in `U256`; native token transfers on Casper are
//! denominated in `U512` motes, so values crossing that boundary go through
//! [`TokenAmount`].
use odra::casper_types::{U256, U512};
use crate::lending::errors::LendingError;

/// Safe math operations for U256
pub struct SafeMath;

impl SafeMath {
    /// Safe addition with overflow check
    pub fn add(a: U256, b: U256) -> Result<U256, LendingError> {
        a.checked_add(b).ok_or(LendingError::MathOverflow)
    }

    /// Safe subtraction with underflow check
    pub fn sub(a: U256, b: U256) -> Result<U256, LendingError> {
        a.checked_sub(b).ok_or(LendingError::MathUnderflow)
    }

    /// Safe multiplication with overflow check
    pub fn mul(a: U256, b: U256) -> Result<U256, LendingError> {
        a.checked_mul(b).ok_or(LendingError::MathOverflow)
    }

    /// Safe division with zero check
    pub fn div(a: U256, b: U256) -> Result<U256, LendingError> {
        if b.is_zero() {
            return Err(LendingError::DivisionByZero);
        }
        Ok(a / b)
    }

    /// `a * b / denominator`, truncating.
    pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256, LendingError> {
        Self::div(Self::mul(a, b)?, denominator)
    }
}

/// Conversions between ledger amounts and native token amounts.
pub struct TokenAmount;

impl TokenAmount {
    /// Converts an attached or transferred native amount into a ledger amount.
    pub fn from_motes(value: U512) -> Result<U256, LendingError> {
        if value > U512::from(u128::MAX) {
            return Err(LendingError::MathOverflow);
        }
        Ok(U256::from(value.as_u128()))
    }

    /// Converts a ledger amount into a native amount for `transfer_tokens`.
    pub fn to_motes(value: U256) -> Result<U512, LendingError> {
        if value > U256::from(u128::MAX) {
            return Err(LendingError::MathOverflow);
        }
        Ok(U512::from(value.as_u128()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_ops() {
        assert_eq!(SafeMath::add(U256::from(2), U256::from(3)).ok(), Some(U256::from(5)));
        assert!(matches!(SafeMath::sub(U256::from(2), U256::from(3)), Err(LendingError::MathUnderflow)));
        assert!(matches!(SafeMath::add(U256::MAX, U256::one()), Err(LendingError::MathOverflow)));
        assert!(matches!(SafeMath::mul(U256::MAX, U256::from(2)), Err(LendingError::MathOverflow)));
        assert!(matches!(SafeMath::div(U256::from(7), U256::zero()), Err(LendingError::DivisionByZero)));
    }

    #[test]
    fn test_mul_div_truncates() {
        // 100 * 300 / 1100 = 27.27...
        let share = SafeMath::mul_div(U256::from(100), U256::from(300), U256::from(1100));
        assert_eq!(share.ok(), Some(U256::from(27)));
    }

    #[test]
    fn test_token_amount_conversion() {
        let motes = U512::from(7_500_000_000u64);
        let amount = TokenAmount::from_motes(motes).ok();
        assert_eq!(amount, Some(U256::from(7_500_000_000u64)));
        assert_eq!(TokenAmount::to_motes(U256::from(7_500_000_000u64)).ok(), Some(motes));

        let too_large = U512::from(u128::MAX) + U512::one();
        assert!(matches!(TokenAmount::from_motes(too_large), Err(LendingError::MathOverflow)));
        let too_large = U256::from(u128::MAX) + U256::one();
        assert!(matches!(TokenAmount::to_motes(too_large), Err(LendingError::MathOverflow)));
    }
}
