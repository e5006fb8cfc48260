//! Interest Math - Fixed-point simple interest and pool share arithmetic
//!
//! All rates and fractions are scaled by 1e18. Interest is simple
//! (non-compounding):
//!
//! ```text
//! year_fraction = elapsed * 1e18 / SECONDS_IN_YEAR
//! rate_decimal  = rate_bps * 1e18 / 10_000
//! interest      = principal * rate_decimal / 1e18 * year_fraction / 1e18
//! ```
//!
//! Any positive accrual is rounded up by one unit so the pool always
//! recovers at least the full cost of a loan.

use odra::casper_types::U256;
use crate::math::SafeMath;
use super::errors::LendingError;

/// Fixed-point scale factor (1e18)
pub const SCALE: u128 = 1_000_000_000_000_000_000;

/// Seconds in a 365-day year
pub const SECONDS_IN_YEAR: u64 = 31_536_000;

/// Basis points in 100%
pub const BASIS_POINTS: u32 = 10_000;

/// Interest cushion added to repayment quotes (one minute)
pub const REPAYMENT_BUFFER_SECONDS: u64 = 60;

/// Upper bound accepted for the annual rate (1000%)
pub const MAX_INTEREST_RATE_BPS: u32 = 100_000;

/// Pure interest and distribution calculations
pub struct InterestMath;

impl InterestMath {
    fn scale() -> U256 {
        U256::from(SCALE)
    }

    /// Simple interest owed on `principal` after `elapsed_seconds` at
    /// `rate_bps` per year.
    pub fn calculate_interest(
        principal: U256,
        elapsed_seconds: u64,
        rate_bps: u32,
    ) -> Result<U256, LendingError> {
        if principal.is_zero() || elapsed_seconds == 0 || rate_bps == 0 {
            return Ok(U256::zero());
        }

        let scale = Self::scale();
        let year_fraction = SafeMath::mul_div(
            U256::from(elapsed_seconds),
            scale,
            U256::from(SECONDS_IN_YEAR),
        )?;
        let rate_decimal = SafeMath::mul_div(
            U256::from(rate_bps),
            scale,
            U256::from(BASIS_POINTS),
        )?;

        let yearly = SafeMath::mul_div(principal, rate_decimal, scale)?;
        let interest = SafeMath::mul_div(yearly, year_fraction, scale)?;

        SafeMath::add(interest, U256::one())
    }

    /// One minute of interest, added to quotes so a payment submitted
    /// shortly after quoting still covers the exact amount due.
    pub fn buffer_interest(principal: U256, rate_bps: u32) -> Result<U256, LendingError> {
        Self::calculate_interest(principal, REPAYMENT_BUFFER_SECONDS, rate_bps)
    }

    /// Principal plus exact interest.
    pub fn total_due(
        principal: U256,
        elapsed_seconds: u64,
        rate_bps: u32,
    ) -> Result<U256, LendingError> {
        let interest = Self::calculate_interest(principal, elapsed_seconds, rate_bps)?;
        SafeMath::add(principal, interest)
    }

    /// Principal plus exact interest plus the buffer cushion.
    pub fn required_repayment(
        principal: U256,
        elapsed_seconds: u64,
        rate_bps: u32,
    ) -> Result<U256, LendingError> {
        let due = Self::total_due(principal, elapsed_seconds, rate_bps)?;
        SafeMath::add(due, Self::buffer_interest(principal, rate_bps)?)
    }

    /// Loan-to-value ceiling: `collateral * threshold_percent / 100`, floored.
    ///
    /// The same value is the liquidation line: a loan whose total due reaches
    /// it may be liquidated.
    pub fn collateral_threshold(
        collateral: U256,
        threshold_percent: u8,
    ) -> Result<U256, LendingError> {
        SafeMath::mul_div(collateral, U256::from(threshold_percent), U256::from(100u8))
    }

    /// Direct pro-rata split: `interest * lender_balance / total_balance`.
    pub fn pro_rata_share(
        interest: U256,
        lender_balance: U256,
        total_balance: U256,
    ) -> Result<U256, LendingError> {
        if total_balance.is_zero() {
            return Ok(U256::zero());
        }
        SafeMath::mul_div(interest, lender_balance, total_balance)
    }

    /// Growth of the interest index when `interest` is split across
    /// `total_balance` of lender principal.
    pub fn index_increment(interest: U256, total_balance: U256) -> Result<U256, LendingError> {
        if total_balance.is_zero() {
            return Ok(U256::zero());
        }
        SafeMath::mul_div(interest, Self::scale(), total_balance)
    }

    /// Interest earned by `balance` while the index moved from `checkpoint`
    /// to `index`.
    pub fn accrued_since(
        balance: U256,
        index: U256,
        checkpoint: U256,
    ) -> Result<U256, LendingError> {
        let delta = SafeMath::sub(index, checkpoint)?;
        SafeMath::mul_div(balance, delta, Self::scale())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ONE_TOKEN: u128 = SCALE;

    fn tokens(whole: u128, tenths: u128) -> U256 {
        U256::from(whole * ONE_TOKEN + tenths * ONE_TOKEN / 10)
    }

    #[test]
    fn test_zero_cases() {
        assert_eq!(InterestMath::calculate_interest(U256::zero(), 1_000, 1_000).ok(), Some(U256::zero()));
        assert_eq!(InterestMath::calculate_interest(tokens(10, 0), 0, 1_000).ok(), Some(U256::zero()));
        assert_eq!(InterestMath::calculate_interest(tokens(10, 0), 1_000, 0).ok(), Some(U256::zero()));
    }

    #[test]
    fn test_one_year_at_ten_percent() {
        let principal = tokens(7, 5);
        let interest = InterestMath::calculate_interest(principal, SECONDS_IN_YEAR, 1_000).ok();
        // 0.75 token plus the round-up unit
        assert_eq!(interest, Some(U256::from(750_000_000_000_000_001u128)));
    }

    #[test]
    fn test_buffer_is_one_minute_of_interest() {
        let principal = tokens(7, 5);
        let buffer = InterestMath::buffer_interest(principal, 1_000).ok();
        assert_eq!(buffer, Some(U256::from(1_426_940_639_269u128)));
    }

    #[test]
    fn test_required_repayment_after_one_year() {
        let principal = tokens(7, 5);
        let quote = InterestMath::required_repayment(principal, SECONDS_IN_YEAR, 1_000).ok();
        assert_eq!(quote, Some(U256::from(8_250_001_426_940_639_270u128)));

        let due = InterestMath::total_due(principal, SECONDS_IN_YEAR, 1_000).ok();
        assert_eq!(due, Some(U256::from(8_250_000_000_000_000_001u128)));
    }

    #[test]
    fn test_collateral_threshold_floors() {
        let max = InterestMath::collateral_threshold(tokens(10, 0), 75).ok();
        assert_eq!(max, Some(tokens(7, 5)));

        // 333 * 75 / 100 = 249.75
        let max = InterestMath::collateral_threshold(U256::from(333), 75).ok();
        assert_eq!(max, Some(U256::from(249)));
    }

    #[test]
    fn test_pro_rata_split() {
        let interest = U256::from(100);
        let total = U256::from(1_000);
        assert_eq!(InterestMath::pro_rata_share(interest, U256::from(300), total).ok(), Some(U256::from(30)));
        assert_eq!(InterestMath::pro_rata_share(interest, U256::from(700), total).ok(), Some(U256::from(70)));
        assert_eq!(InterestMath::pro_rata_share(interest, U256::from(700), U256::zero()).ok(), Some(U256::zero()));
    }

    #[test]
    fn test_index_split_matches_direct_split() {
        let interest = U256::from(100);
        let total = U256::from(1_000);
        let index = InterestMath::index_increment(interest, total).unwrap_or_default();

        let first = InterestMath::accrued_since(U256::from(300), index, U256::zero()).ok();
        let second = InterestMath::accrued_since(U256::from(700), index, U256::zero()).ok();
        assert_eq!(first, Some(U256::from(30)));
        assert_eq!(second, Some(U256::from(70)));
    }

    #[test]
    fn test_index_split_never_exceeds_interest() {
        // 10 / 3 does not divide evenly; the residual stays undistributed
        let interest = U256::from(10);
        let total = U256::from(3);
        let index = InterestMath::index_increment(interest, total).unwrap_or_default();

        let mut distributed = U256::zero();
        for _ in 0..3 {
            distributed = distributed
                + InterestMath::accrued_since(U256::one(), index, U256::zero()).unwrap_or_default();
        }
        assert!(distributed <= interest);
        assert_eq!(distributed, U256::from(9));
    }

    #[test]
    fn test_accrued_since_rejects_stale_index() {
        let result = InterestMath::accrued_since(U256::one(), U256::zero(), U256::one());
        assert!(matches!(result, Err(LendingError::MathUnderflow)));
    }

    proptest! {
        #[test]
        fn interest_positive_for_positive_inputs(
            principal in 1u128..(1u128 << 96),
            elapsed in 1u64..(10 * SECONDS_IN_YEAR),
            rate in 1u32..=MAX_INTEREST_RATE_BPS,
        ) {
            let interest = InterestMath::calculate_interest(U256::from(principal), elapsed, rate);
            prop_assert!(interest.is_ok());
            prop_assert!(interest.unwrap_or_default() > U256::zero());
        }

        #[test]
        fn interest_monotonic_in_principal(
            principal in 0u128..(1u128 << 96),
            extra in 0u128..(1u128 << 32),
            elapsed in 0u64..(10 * SECONDS_IN_YEAR),
            rate in 0u32..=MAX_INTEREST_RATE_BPS,
        ) {
            let low = InterestMath::calculate_interest(U256::from(principal), elapsed, rate);
            let high = InterestMath::calculate_interest(U256::from(principal + extra), elapsed, rate);
            prop_assert!(low.is_ok() && high.is_ok());
            prop_assert!(low.unwrap_or_default() <= high.unwrap_or_default());
        }

        #[test]
        fn interest_monotonic_in_time(
            principal in 0u128..(1u128 << 96),
            elapsed in 0u64..(10 * SECONDS_IN_YEAR),
            extra in 0u64..SECONDS_IN_YEAR,
            rate in 0u32..=MAX_INTEREST_RATE_BPS,
        ) {
            let early = InterestMath::calculate_interest(U256::from(principal), elapsed, rate);
            let late = InterestMath::calculate_interest(U256::from(principal), elapsed + extra, rate);
            prop_assert!(early.is_ok() && late.is_ok());
            prop_assert!(early.unwrap_or_default() <= late.unwrap_or_default());
        }

        #[test]
        fn borrow_ceiling_never_exceeds_collateral(
            collateral in 0u128..(1u128 << 96),
            threshold in 1u8..=100,
        ) {
            let max = InterestMath::collateral_threshold(U256::from(collateral), threshold);
            prop_assert!(max.is_ok());
            prop_assert!(max.unwrap_or_default() <= U256::from(collateral));
        }
    }
}
