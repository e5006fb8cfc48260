//! Events for the lending ledger
//!
//! Every mutating entry point emits exactly one change record, except
//! repayment which also reports the interest it distributed.

use odra::prelude::*;
use odra::casper_types::U256;

// ============================================================================
// Collateral Events
// ============================================================================

/// Event emitted when collateral is deposited
#[odra::event]
pub struct CollateralDeposited {
    /// Borrower depositing collateral
    pub borrower: Address,
    /// Amount deposited
    pub amount: U256,
    /// Collateral on file after the deposit
    pub total_collateral: U256,
    /// Timestamp of deposit (seconds)
    pub timestamp: u64,
}

/// Event emitted when collateral is withdrawn
#[odra::event]
pub struct CollateralWithdrawn {
    /// Borrower withdrawing collateral
    pub borrower: Address,
    /// Amount returned
    pub amount: U256,
    /// Timestamp of withdrawal (seconds)
    pub timestamp: u64,
}

// ============================================================================
// Loan Events
// ============================================================================

/// Event emitted when a loan is drawn from the pool
#[odra::event]
pub struct LoanTaken {
    /// Borrower
    pub borrower: Address,
    /// Amount borrowed
    pub amount: U256,
    /// Collateral securing the loan
    pub collateral: U256,
    /// Timestamp of origination (seconds)
    pub timestamp: u64,
}

/// Event emitted when a loan is repaid in full
#[odra::event]
pub struct LoanRepaid {
    /// Borrower
    pub borrower: Address,
    /// Principal returned to the pool
    pub principal: U256,
    /// Interest paid
    pub interest: U256,
    /// Collateral plus overpayment returned to the borrower
    pub refunded: U256,
    /// Timestamp of repayment (seconds)
    pub timestamp: u64,
}

/// Event emitted when a loan is liquidated
#[odra::event]
pub struct LoanLiquidated {
    /// Borrower whose collateral was forfeited
    pub borrower: Address,
    /// Caller that triggered the liquidation
    pub liquidator: Address,
    /// Principal plus interest owed at liquidation
    pub total_due: U256,
    /// Collateral moved into the pool
    pub collateral_seized: U256,
    /// Timestamp of liquidation (seconds)
    pub timestamp: u64,
}

// ============================================================================
// Liquidity Events
// ============================================================================

/// Event emitted when a lender deposits into the pool
#[odra::event]
pub struct LiquidityProvided {
    /// Lender
    pub lender: Address,
    /// Amount deposited
    pub amount: U256,
    /// Lender principal after the deposit
    pub principal_balance: U256,
    /// Timestamp of deposit (seconds)
    pub timestamp: u64,
}

/// Event emitted when a lender withdraws principal and accrued interest
#[odra::event]
pub struct LiquidityWithdrawn {
    /// Lender
    pub lender: Address,
    /// Principal withdrawn
    pub amount: U256,
    /// Accrued interest paid out alongside
    pub interest: U256,
    /// Timestamp of withdrawal (seconds)
    pub timestamp: u64,
}

/// Event emitted when a lender claims accrued interest only
#[odra::event]
pub struct InterestClaimed {
    /// Lender
    pub lender: Address,
    /// Interest paid out
    pub amount: U256,
    /// Timestamp of claim (seconds)
    pub timestamp: u64,
}

// ============================================================================
// Interest Events
// ============================================================================

/// Event emitted when repaid interest is credited to lenders
#[odra::event]
pub struct InterestDistributed {
    /// Interest paid by the borrower
    pub interest: U256,
    /// Lender principal the interest was split across
    pub total_lender_principal: U256,
    /// Interest index after the distribution (scaled by 1e18)
    pub interest_index: U256,
    /// Timestamp of distribution (seconds)
    pub timestamp: u64,
}
