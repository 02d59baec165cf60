//! divvy-domain
//!
//! Pure domain models (Ledger, Member, Expense, split modes).
//! No I/O, no CLI, no storage. Only data types and core arithmetic.

pub mod common;
pub mod expense;
pub mod ledger;
pub mod member;

pub use common::*;
pub use expense::*;
pub use ledger::*;
pub use member::*;
