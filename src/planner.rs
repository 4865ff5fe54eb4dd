//! Settlement planning: turns net balances into a short list of payments.
//!
//! Greedy two-cursor matching of debtors against creditors. Balances within
//! `epsilon` of zero count as settled, which absorbs the sub-cent residue
//! left by uneven splits.

use crate::balance::Balances;
use crate::error::{Result, SettleError};
use crate::expense::ParticipantId;
use crate::money::Money;
use log::debug;
use serde::Serialize;
use std::env;
use std::str::FromStr;

/// A directed payment: `from` pays `amount` to `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transfer {
    pub from: ParticipantId,
    pub to: ParticipantId,

    /// Rounded to cents; always positive.
    pub amount: Money,
}

/// Order in which debtors and creditors are fed to the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchOrder {
    /// Largest remaining magnitude first; ties keep discovery order.
    #[default]
    LargestFirst,

    /// Discovery order of the balance map, as the legacy web backend did.
    Discovery,
}

impl FromStr for MatchOrder {
    type Err = SettleError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "largest" | "largest-first" => Ok(MatchOrder::LargestFirst),
            "discovery" | "insertion" => Ok(MatchOrder::Discovery),
            other => Err(SettleError::InvalidConfig {
                key: PlannerConfig::ORDER_ENV,
                message: format!("unknown match order '{}'", other),
            }),
        }
    }
}

/// Planner tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    /// Balances with magnitude at or below this are treated as settled.
    pub epsilon: Money,
    pub order: MatchOrder,
}

impl PlannerConfig {
    pub const EPSILON_ENV: &'static str = "SETTLE_EPSILON";
    pub const ORDER_ENV: &'static str = "SETTLE_ORDER";

    /// One cent.
    pub fn default_epsilon() -> Money {
        Money::new(rust_decimal::Decimal::new(1, 2))
    }

    /// Reads `SETTLE_EPSILON` and `SETTLE_ORDER`, falling back to defaults
    /// for unset variables. A tolerance must be strictly positive.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = PlannerConfig::default();

        if let Some(raw) = lookup(Self::EPSILON_ENV) {
            let epsilon = Money::from_str(&raw).map_err(|e| SettleError::InvalidConfig {
                key: Self::EPSILON_ENV,
                message: e.to_string(),
            })?;
            if !epsilon.is_positive() {
                return Err(SettleError::InvalidConfig {
                    key: Self::EPSILON_ENV,
                    message: "tolerance must be positive".to_string(),
                });
            }
            config.epsilon = epsilon;
        }

        if let Some(raw) = lookup(Self::ORDER_ENV) {
            config.order = raw.parse()?;
        }

        Ok(config)
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            epsilon: Self::default_epsilon(),
            order: MatchOrder::default(),
        }
    }
}

struct Party<'a> {
    id: &'a str,
    remaining: Money,
}

/// Plans transfers that bring every balance within `epsilon` of zero.
///
/// Never fails: an all-settled input gives an empty plan. Each step moves
/// the smaller of the current debtor's and creditor's remainders; a cursor
/// advances once its remainder is zero or drops below `epsilon`, so the loop
/// ends for any tolerance, including zero.
///
/// Amounts are rounded on the running total rather than per step: a
/// transfer is the difference between the rounded cumulative amount after it
/// and before it. A participant's transfers are consecutive, so their rounded
/// sum is within one cent of what they owed or were owed.
pub fn plan_settlement(balances: &Balances, config: &PlannerConfig) -> Vec<Transfer> {
    let epsilon = config.epsilon.max(Money::ZERO);
    let mut creditors: Vec<Party<'_>> = Vec::new();
    let mut debtors: Vec<Party<'_>> = Vec::new();

    for (id, balance) in balances.iter() {
        if balance > epsilon {
            creditors.push(Party {
                id,
                remaining: balance,
            });
        } else if balance < -epsilon {
            debtors.push(Party {
                id,
                remaining: balance.abs(),
            });
        }
    }

    if config.order == MatchOrder::LargestFirst {
        // stable: equal magnitudes keep discovery order
        creditors.sort_by(|a, b| b.remaining.cmp(&a.remaining));
        debtors.sort_by(|a, b| b.remaining.cmp(&a.remaining));
    }

    let mut transfers = Vec::new();
    let (mut i, mut j) = (0, 0);
    // unrounded and rounded running totals of everything moved so far
    let mut settled = Money::ZERO;
    let mut paid = Money::ZERO.round_cents();

    while i < debtors.len() && j < creditors.len() {
        let debtor = &mut debtors[i];
        let creditor = &mut creditors[j];
        let amount = debtor.remaining.min(creditor.remaining);

        settled += amount;
        let target = settled.round_cents();
        let rounded = target - paid;
        if rounded.is_positive() {
            transfers.push(Transfer {
                from: debtor.id.to_string(),
                to: creditor.id.to_string(),
                amount: rounded,
            });
            debug!("{} pays {} {}", debtor.id, creditor.id, rounded);
            paid = target;
        }

        debtor.remaining -= amount;
        creditor.remaining -= amount;

        if is_settled(debtor.remaining, epsilon) {
            i += 1;
        }
        if is_settled(creditor.remaining, epsilon) {
            j += 1;
        }
    }

    transfers
}

fn is_settled(remaining: Money, epsilon: Money) -> bool {
    !remaining.is_positive() || remaining < epsilon
}
