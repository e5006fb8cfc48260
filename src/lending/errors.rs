//! Error types for the lending ledger

use odra::prelude::*;

/// Errors that can occur in the lending ledger
#[odra::odra_error]
pub enum LendingError {
    // Input Errors
    /// Zero amount where a positive amount is required
    InvalidAmount = 1,

    // Collateral & Loan Errors
    /// Borrower has no collateral on file
    NoCollateral = 2,
    /// Borrower already has an active loan
    LoanAlreadyActive = 3,
    /// Borrower has no active loan
    NoActiveLoan = 4,
    /// Requested amount exceeds the loan-to-value limit
    ExceedsLoanToValue = 5,
    /// Pool cannot fund the requested loan
    InsufficientPoolLiquidity = 6,
    /// Payment does not cover principal plus interest
    InsufficientPayment = 7,
    /// Collateral is locked by an active loan
    LoanActive = 8,
    /// Quote timestamp precedes loan origination
    TimestampBeforeOrigination = 9,

    // Pool Errors
    /// Withdrawal exceeds available pool funds
    InsufficientPoolFunds = 10,
    /// Withdrawal exceeds the lender's deposited principal
    InsufficientLenderBalance = 11,
    /// Lender has no accrued interest
    NoInterestToClaim = 12,

    // Liquidation Errors
    /// Loan has not crossed the liquidation threshold
    NotEligibleForLiquidation = 13,

    // Access Control Errors
    /// Caller is not authorized
    Unauthorized = 14,
    /// Reentrant call
    Locked = 15,

    // Configuration Errors
    /// Invalid init parameter
    InvalidConfiguration = 16,

    // Math Errors
    /// Math overflow occurred
    MathOverflow = 17,
    /// Math underflow occurred
    MathUnderflow = 18,
    /// Division by zero
    DivisionByZero = 19,
}
