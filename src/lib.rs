//! # Trip Settle
//!
//! Group-expense settlement for shared trips: reduces a log of expenses to
//! one net balance per participant and plans a short list of transfers that
//! brings every balance back to zero.
//!
//! ## Design Principles
//!
//! - **Exact decimals**: amounts use `rust_decimal`; shares are kept at full
//!   precision and rounded to cents only in transfers and the per-head share
//! - **Conservation**: balances of a well-formed log sum to zero
//! - **Reject at write time**: malformed expenses never enter a group
//! - **Deterministic output**: balances keep discovery order and the planner
//!   breaks ties by that order
//!
//! ## Example
//!
//! ```
//! use std::str::FromStr;
//! use trip_settle::{build_report, ExpenseDraft, ExpenseGroup, Money, PlannerConfig};
//!
//! let mut group = ExpenseGroup::with_members("Goa", ["Rahul", "Priya"]).unwrap();
//! group
//!     .add_expense(ExpenseDraft::new("Hotel", Money::from_str("5000").unwrap(), "Rahul"))
//!     .unwrap();
//!
//! let report = build_report(&group, &PlannerConfig::default()).unwrap();
//! assert_eq!(report.settlements[0].from, "Priya");
//! assert_eq!(report.settlements[0].amount.to_string(), "2500.00");
//! ```

pub mod balance;
pub mod engine;
pub mod error;
pub mod expense;
pub mod group;
pub mod money;
pub mod planner;
pub mod report;

pub use balance::{compute_balances, Balances};
pub use engine::SettlementEngine;
pub use error::{Result, SettleError};
pub use expense::{ExpenseDraft, ExpenseEntry, LedgerOp, LedgerRecord, ParticipantId};
pub use group::{ExpenseGroup, GroupFilter, GroupStatus, Member};
pub use money::Money;
pub use planner::{plan_settlement, MatchOrder, PlannerConfig, Transfer};
pub use report::{build_report, SettlementReport};
