//! Lending Ledger - Single-pool collateralized lending
//!
//! Borrowers lock native tokens as collateral and draw a loan of up to
//! `liquidation_threshold_percent` of it from a shared pool. Lenders fund
//! the pool and earn a pro-rata share of the interest borrowers pay back.
//!
//! Accounting rules:
//! - Every precondition is checked before any storage write, and all
//!   storage writes happen before any outward transfer.
//! - The contract balance always equals `total_pool_funds + total_collateral`.
//! - Repaid interest stays in the pool as capital and is credited to lenders
//!   through an interest index; a lender's share is settled lazily whenever
//!   their position changes.

use odra::prelude::*;
use odra::casper_types::{U256, U512};
use crate::math::{SafeMath, TokenAmount};
use super::errors::LendingError;
use super::events::*;
use super::interest::{InterestMath, MAX_INTEREST_RATE_BPS};

/// A borrower's collateral and loan
#[odra::odra_type]
pub struct Loan {
    /// Collateral locked by the borrower
    pub collateral_amount: U256,
    /// Outstanding principal (zero if no loan is drawn)
    pub loan_amount: U256,
    /// Deposit or origination time (seconds)
    pub origination_timestamp: u64,
    /// Whether a loan is outstanding
    pub active: bool,
}

impl Loan {
    /// The record read for a borrower with nothing on file
    pub fn empty() -> Self {
        Self {
            collateral_amount: U256::zero(),
            loan_amount: U256::zero(),
            origination_timestamp: 0,
            active: false,
        }
    }
}

/// A lender's stake in the pool
#[odra::odra_type]
pub struct LenderPosition {
    /// Deposited principal, withdrawable
    pub principal_balance: U256,
    /// Interest credited and not yet withdrawn
    pub accrued_interest: U256,
    /// Interest index at the last settlement
    pub interest_index_checkpoint: U256,
}

impl LenderPosition {
    fn new(index: U256) -> Self {
        Self {
            principal_balance: U256::zero(),
            accrued_interest: U256::zero(),
            interest_index_checkpoint: index,
        }
    }
}

/// Lending Ledger contract
#[odra::module]
pub struct LendingLedger {
    /// Borrower loans
    loans: Mapping<Address, Loan>,
    /// Lender positions
    positions: Mapping<Address, LenderPosition>,
    /// Lenders in order of first deposit
    lender_roster: Mapping<u32, Address>,
    /// Number of lenders in the roster
    roster_len: Var<u32>,
    /// Undeployed pool liquidity
    pool_funds: Var<U256>,
    /// Sum of all lender principal balances
    lender_principal: Var<U256>,
    /// Collateral held for borrowers
    collateral_held: Var<U256>,
    /// Accumulated interest per unit of lender principal (scaled by 1e18)
    index: Var<U256>,
    /// Annual interest rate in basis points
    rate_bps: Var<u32>,
    /// Loan-to-value ceiling and liquidation line, in percent of collateral
    threshold_percent: Var<u8>,
    /// Only address allowed to liquidate, if set
    restricted_liquidator: Var<Option<Address>>,
    /// Reentrancy lock
    locked: Var<bool>,
}

#[odra::module]
impl LendingLedger {
    /// Initialize the ledger
    ///
    /// # Arguments
    /// * `interest_rate_bps` - Annual simple interest rate (1000 = 10%)
    /// * `liquidation_threshold_percent` - Loan-to-value ceiling (1..=100)
    /// * `liquidator` - Restricts liquidation to one address when set
    pub fn init(
        &mut self,
        interest_rate_bps: u32,
        liquidation_threshold_percent: u8,
        liquidator: Option<Address>,
    ) {
        if interest_rate_bps > MAX_INTEREST_RATE_BPS {
            self.env().revert(LendingError::InvalidConfiguration);
        }
        if liquidation_threshold_percent == 0 || liquidation_threshold_percent > 100 {
            self.env().revert(LendingError::InvalidConfiguration);
        }

        self.rate_bps.set(interest_rate_bps);
        self.threshold_percent.set(liquidation_threshold_percent);
        self.restricted_liquidator.set(liquidator);

        self.pool_funds.set(U256::zero());
        self.lender_principal.set(U256::zero());
        self.collateral_held.set(U256::zero());
        self.index.set(U256::zero());
        self.roster_len.set(0);
        self.locked.set(false);
    }

    // ========================================
    // Collateral & Loans
    // ========================================

    /// Lock the attached tokens as collateral
    ///
    /// Collateral from an earlier deposit that was never borrowed against
    /// is carried into the fresh record.
    #[odra(payable)]
    pub fn deposit_collateral(&mut self) {
        let borrower = self.env().caller();
        let amount = self.attached_amount();
        if amount.is_zero() {
            self.env().revert(LendingError::InvalidAmount);
        }

        let carried = match self.loans.get(&borrower) {
            Some(loan) if loan.active => self.env().revert(LendingError::LoanAlreadyActive),
            Some(loan) => loan.collateral_amount,
            None => U256::zero(),
        };
        let collateral = self.checked(SafeMath::add(carried, amount));
        let held = self.checked(SafeMath::add(self.collateral_held.get_or_default(), amount));

        let timestamp = self.now();
        self.loans.set(&borrower, Loan {
            collateral_amount: collateral,
            loan_amount: U256::zero(),
            origination_timestamp: timestamp,
            active: false,
        });
        self.collateral_held.set(held);

        self.env().emit_event(CollateralDeposited {
            borrower,
            amount,
            total_collateral: collateral,
            timestamp,
        });
    }

    /// Return all collateral to a borrower with no outstanding loan
    pub fn withdraw_collateral(&mut self) {
        self.lock();

        let borrower = self.env().caller();
        let loan = self.loans.get(&borrower)
            .filter(|loan| !loan.collateral_amount.is_zero())
            .unwrap_or_revert_with(&self.env(), LendingError::NoCollateral);
        if loan.active {
            self.env().revert(LendingError::LoanActive);
        }

        let amount = loan.collateral_amount;
        let held = self.checked(SafeMath::sub(self.collateral_held.get_or_default(), amount));

        self.loans.set(&borrower, Loan::empty());
        self.collateral_held.set(held);

        self.send(borrower, amount);

        self.env().emit_event(CollateralWithdrawn {
            borrower,
            amount,
            timestamp: self.now(),
        });

        self.unlock();
    }

    /// Draw a loan against deposited collateral
    pub fn borrow(&mut self, amount: U256) {
        self.lock();

        let borrower = self.env().caller();
        if amount.is_zero() {
            self.env().revert(LendingError::InvalidAmount);
        }

        let loan = self.loans.get(&borrower)
            .filter(|loan| !loan.collateral_amount.is_zero())
            .unwrap_or_revert_with(&self.env(), LendingError::NoCollateral);
        if loan.active {
            self.env().revert(LendingError::LoanAlreadyActive);
        }

        let max_borrow = self.checked(InterestMath::collateral_threshold(
            loan.collateral_amount,
            self.threshold_percent.get_or_default(),
        ));
        if amount > max_borrow {
            self.env().revert(LendingError::ExceedsLoanToValue);
        }

        let pool = self.pool_funds.get_or_default();
        if pool < amount {
            self.env().revert(LendingError::InsufficientPoolLiquidity);
        }

        let timestamp = self.now();
        self.loans.set(&borrower, Loan {
            collateral_amount: loan.collateral_amount,
            loan_amount: amount,
            origination_timestamp: timestamp,
            active: true,
        });
        self.pool_funds.set(pool - amount);

        self.send(borrower, amount);

        self.env().emit_event(LoanTaken {
            borrower,
            amount,
            collateral: loan.collateral_amount,
            timestamp,
        });

        self.unlock();
    }

    /// Repay the caller's loan in full with the attached tokens
    ///
    /// The payment must cover principal plus interest up to the current
    /// block time; anything above that is refunded with the collateral.
    #[odra(payable)]
    pub fn repay_loan(&mut self) {
        self.lock();

        let borrower = self.env().caller();
        let paid = self.attached_amount();
        let loan = self.active_loan(&borrower);
        if paid.is_zero() {
            self.env().revert(LendingError::InvalidAmount);
        }

        let timestamp = self.now();
        let elapsed = self.elapsed_since(&loan, timestamp);
        let interest = self.checked(InterestMath::calculate_interest(
            loan.loan_amount,
            elapsed,
            self.rate_bps.get_or_default(),
        ));
        let total_due = self.checked(SafeMath::add(loan.loan_amount, interest));
        if paid < total_due {
            self.env().revert(LendingError::InsufficientPayment);
        }

        let collateral = loan.collateral_amount;
        let principal = loan.loan_amount;
        let excess = paid - total_due;
        let refund = self.checked(SafeMath::add(collateral, excess));

        // Clear the loan before anything leaves the contract
        self.loans.set(&borrower, Loan::empty());
        let held = self.checked(SafeMath::sub(self.collateral_held.get_or_default(), collateral));
        self.collateral_held.set(held);

        let pool = self.checked(SafeMath::add(self.pool_funds.get_or_default(), total_due));
        self.pool_funds.set(pool);
        self.distribute_interest(interest, timestamp);

        self.send(borrower, refund);

        self.env().emit_event(LoanRepaid {
            borrower,
            principal,
            interest,
            refunded: refund,
            timestamp,
        });

        self.unlock();
    }

    // ========================================
    // Liquidity
    // ========================================

    /// Deposit the attached tokens into the lending pool
    #[odra(payable)]
    pub fn provide_liquidity(&mut self) {
        let lender = self.env().caller();
        let amount = self.attached_amount();
        if amount.is_zero() {
            self.env().revert(LendingError::InvalidAmount);
        }

        let mut position = match self.positions.get(&lender) {
            Some(_) => self.settled_position(&lender),
            None => {
                self.append_to_roster(lender);
                LenderPosition::new(self.index.get_or_default())
            }
        };
        position.principal_balance = self.checked(SafeMath::add(position.principal_balance, amount));
        let principal_total = self.checked(SafeMath::add(self.lender_principal.get_or_default(), amount));
        let pool = self.checked(SafeMath::add(self.pool_funds.get_or_default(), amount));

        let principal_balance = position.principal_balance;
        self.positions.set(&lender, position);
        self.lender_principal.set(principal_total);
        self.pool_funds.set(pool);

        self.env().emit_event(LiquidityProvided {
            lender,
            amount,
            principal_balance,
            timestamp: self.now(),
        });
    }

    /// Withdraw `amount` of principal together with all accrued interest
    pub fn withdraw_liquidity(&mut self, amount: U256) {
        self.lock();

        let lender = self.env().caller();
        if amount.is_zero() {
            self.env().revert(LendingError::InvalidAmount);
        }

        let mut position = self.settled_position(&lender);
        if position.principal_balance < amount {
            self.env().revert(LendingError::InsufficientLenderBalance);
        }

        let interest = position.accrued_interest;
        let payout = self.checked(SafeMath::add(amount, interest));
        let pool = self.pool_funds.get_or_default();
        if pool < payout {
            self.env().revert(LendingError::InsufficientPoolFunds);
        }

        position.principal_balance = position.principal_balance - amount;
        position.accrued_interest = U256::zero();
        let principal_total = self.checked(SafeMath::sub(self.lender_principal.get_or_default(), amount));

        self.positions.set(&lender, position);
        self.lender_principal.set(principal_total);
        self.pool_funds.set(pool - payout);

        self.send(lender, payout);

        self.env().emit_event(LiquidityWithdrawn {
            lender,
            amount,
            interest,
            timestamp: self.now(),
        });

        self.unlock();
    }

    /// Withdraw accrued interest, leaving principal in the pool
    pub fn claim_interest(&mut self) {
        self.lock();

        let lender = self.env().caller();
        let mut position = self.settled_position(&lender);
        let interest = position.accrued_interest;
        if interest.is_zero() {
            self.env().revert(LendingError::NoInterestToClaim);
        }

        let pool = self.pool_funds.get_or_default();
        if pool < interest {
            self.env().revert(LendingError::InsufficientPoolFunds);
        }

        position.accrued_interest = U256::zero();
        self.positions.set(&lender, position);
        self.pool_funds.set(pool - interest);

        self.send(lender, interest);

        self.env().emit_event(InterestClaimed {
            lender,
            amount: interest,
            timestamp: self.now(),
        });

        self.unlock();
    }

    // ========================================
    // Liquidation
    // ========================================

    /// Forfeit a borrower's collateral to the pool once the amount owed
    /// reaches the liquidation line
    pub fn liquidate(&mut self, borrower: Address) {
        let liquidator = self.env().caller();
        if let Some(allowed) = self.restricted_liquidator.get_or_default() {
            if liquidator != allowed {
                self.env().revert(LendingError::Unauthorized);
            }
        }

        let loan = self.active_loan(&borrower);
        let timestamp = self.now();
        let total_due = self.total_due_at(&loan, timestamp);
        let liquidation_line = self.checked(InterestMath::collateral_threshold(
            loan.collateral_amount,
            self.threshold_percent.get_or_default(),
        ));
        if total_due < liquidation_line {
            self.env().revert(LendingError::NotEligibleForLiquidation);
        }

        let collateral = loan.collateral_amount;
        let held = self.checked(SafeMath::sub(self.collateral_held.get_or_default(), collateral));
        let pool = self.checked(SafeMath::add(self.pool_funds.get_or_default(), collateral));

        self.loans.set(&borrower, Loan::empty());
        self.collateral_held.set(held);
        self.pool_funds.set(pool);

        self.env().emit_event(LoanLiquidated {
            borrower,
            liquidator,
            total_due,
            collateral_seized: collateral,
            timestamp,
        });
    }

    // ========================================
    // View Functions
    // ========================================

    pub fn get_loan_details(&self, borrower: Address) -> Loan {
        self.loans.get(&borrower).unwrap_or_else(Loan::empty)
    }

    /// Lender position with interest settled up to the current index
    pub fn get_lender_position(&self, lender: Address) -> LenderPosition {
        self.settled_position(&lender)
    }

    pub fn get_lender_interest(&self, lender: Address) -> U256 {
        self.settled_position(&lender).accrued_interest
    }

    pub fn lender_balance(&self, lender: Address) -> U256 {
        self.positions.get(&lender)
            .map(|position| position.principal_balance)
            .unwrap_or_default()
    }

    pub fn total_pool_funds(&self) -> U256 {
        self.pool_funds.get_or_default()
    }

    pub fn total_lender_principal(&self) -> U256 {
        self.lender_principal.get_or_default()
    }

    pub fn total_collateral(&self) -> U256 {
        self.collateral_held.get_or_default()
    }

    pub fn interest_index(&self) -> U256 {
        self.index.get_or_default()
    }

    /// Interest on `principal` after `elapsed_seconds` at the pool rate
    pub fn calculate_interest(&self, principal: U256, elapsed_seconds: u64) -> U256 {
        self.checked(InterestMath::calculate_interest(
            principal,
            elapsed_seconds,
            self.rate_bps.get_or_default(),
        ))
    }

    /// Exact interest owed on the borrower's loan at `as_of` (seconds)
    pub fn get_current_interest(&self, borrower: Address, as_of: u64) -> U256 {
        let loan = self.active_loan(&borrower);
        let elapsed = self.elapsed_since(&loan, as_of);
        self.calculate_interest(loan.loan_amount, elapsed)
    }

    /// Amount to send to `repay_loan` if quoted at `as_of` (seconds),
    /// including a one-minute interest buffer
    pub fn get_required_repayment_amount(&self, borrower: Address, as_of: u64) -> U256 {
        let loan = self.active_loan(&borrower);
        let elapsed = self.elapsed_since(&loan, as_of);
        self.checked(InterestMath::required_repayment(
            loan.loan_amount,
            elapsed,
            self.rate_bps.get_or_default(),
        ))
    }

    /// Largest loan the borrower's collateral supports
    pub fn max_borrow_amount(&self, borrower: Address) -> U256 {
        let collateral = self.get_loan_details(borrower).collateral_amount;
        self.checked(InterestMath::collateral_threshold(
            collateral,
            self.threshold_percent.get_or_default(),
        ))
    }

    /// Whether `liquidate` would succeed for the borrower at `as_of` (seconds)
    pub fn is_liquidatable(&self, borrower: Address, as_of: u64) -> bool {
        let loan = self.get_loan_details(borrower);
        if !loan.active {
            return false;
        }
        let liquidation_line = self.checked(InterestMath::collateral_threshold(
            loan.collateral_amount,
            self.threshold_percent.get_or_default(),
        ));
        self.total_due_at(&loan, as_of) >= liquidation_line
    }

    pub fn interest_rate_bps(&self) -> u32 {
        self.rate_bps.get_or_default()
    }

    pub fn liquidation_threshold_percent(&self) -> u8 {
        self.threshold_percent.get_or_default()
    }

    pub fn liquidator(&self) -> Option<Address> {
        self.restricted_liquidator.get_or_default()
    }

    pub fn lender_count(&self) -> u32 {
        self.roster_len.get_or_default()
    }

    /// Every address that ever provided liquidity, in order of first deposit
    pub fn get_lenders(&self) -> Vec<Address> {
        (0..self.roster_len.get_or_default())
            .filter_map(|i| self.lender_roster.get(&i))
            .collect()
    }
}

impl LendingLedger {
    fn now(&self) -> u64 {
        self.env().get_block_time() / 1000
    }

    fn attached_amount(&self) -> U256 {
        self.checked(TokenAmount::from_motes(self.env().attached_value()))
    }

    fn send(&self, to: Address, amount: U256) {
        let motes: U512 = self.checked(TokenAmount::to_motes(amount));
        self.env().transfer_tokens(&to, &motes);
    }

    fn checked<T>(&self, result: Result<T, LendingError>) -> T {
        result.unwrap_or_revert(&self.env())
    }

    fn active_loan(&self, borrower: &Address) -> Loan {
        self.loans.get(borrower)
            .filter(|loan| loan.active && !loan.loan_amount.is_zero())
            .unwrap_or_revert_with(&self.env(), LendingError::NoActiveLoan)
    }

    fn elapsed_since(&self, loan: &Loan, as_of: u64) -> u64 {
        as_of.checked_sub(loan.origination_timestamp)
            .unwrap_or_revert_with(&self.env(), LendingError::TimestampBeforeOrigination)
    }

    fn total_due_at(&self, loan: &Loan, as_of: u64) -> U256 {
        let elapsed = self.elapsed_since(loan, as_of);
        self.checked(InterestMath::total_due(
            loan.loan_amount,
            elapsed,
            self.rate_bps.get_or_default(),
        ))
    }

    /// Position with interest accrued since its checkpoint folded in
    fn settled_position(&self, lender: &Address) -> LenderPosition {
        let index = self.index.get_or_default();
        match self.positions.get(lender) {
            Some(mut position) => {
                let pending = self.checked(InterestMath::accrued_since(
                    position.principal_balance,
                    index,
                    position.interest_index_checkpoint,
                ));
                position.accrued_interest = self.checked(SafeMath::add(position.accrued_interest, pending));
                position.interest_index_checkpoint = index;
                position
            }
            None => LenderPosition::new(index),
        }
    }

    fn distribute_interest(&mut self, interest: U256, timestamp: u64) {
        let principal_total = self.lender_principal.get_or_default();
        if interest.is_zero() || principal_total.is_zero() {
            return;
        }

        let increment = self.checked(InterestMath::index_increment(interest, principal_total));
        let index = self.checked(SafeMath::add(self.index.get_or_default(), increment));
        self.index.set(index);

        self.env().emit_event(InterestDistributed {
            interest,
            total_lender_principal: principal_total,
            interest_index: index,
            timestamp,
        });
    }

    fn append_to_roster(&mut self, lender: Address) {
        let len = self.roster_len.get_or_default();
        self.lender_roster.set(&len, lender);
        self.roster_len.set(len + 1);
    }

    /// Reentrancy lock
    fn lock(&mut self) {
        if self.locked.get_or_default() {
            self.env().revert(LendingError::Locked);
        }
        self.locked.set(true);
    }

    /// Reentrancy unlock
    fn unlock(&mut self) {
        self.locked.set(false);
    }
}
