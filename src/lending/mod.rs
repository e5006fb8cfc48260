//! Lending Ledger - single-pool collateralized lending
//!
//! Borrowers lock native tokens and borrow from a pool funded by lenders.
//! Loans accrue fixed-rate simple interest and must be repaid in full to
//! release collateral; the interest is split pro rata across lenders.
//! Loans whose amount owed reaches the liquidation threshold can be
//! liquidated into the pool.

pub mod ledger;
pub mod interest;
pub mod errors;
pub mod events;


pub use ledger::{LendingLedger, Loan, LenderPosition};
pub use interest::InterestMath;
pub use errors::LendingError;
pub use events::*;
