//! Expense entries and the raw ledger rows they are read from.

use crate::error::{Result, SettleError};
use crate::money::Money;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::str::FromStr;

/// Participant identifier: a member name, unique within a group.
pub type ParticipantId = String;

/// One logged cost event.
///
/// Only constructed through [`ExpenseEntry::new`], so every entry held by a
/// group has a positive amount, a payer, and at least one participant to
/// split among.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseEntry {
    /// Group-local id, assigned on insertion.
    pub id: u32,

    pub description: String,

    /// Positive amount, kept at full precision.
    pub amount: Money,

    /// Who fronted the money. Need not be in `split_among`.
    pub paid_by: ParticipantId,

    /// Who shares the cost. De-duplicated, first occurrence order.
    pub split_among: Vec<ParticipantId>,

    /// Informational only; never used in computation.
    pub date: DateTime<Utc>,
}

impl ExpenseEntry {
    /// Validates and builds an entry.
    ///
    /// Names are trimmed; blank split names are dropped and duplicates collapse
    /// to their first occurrence.
    pub fn new(
        id: u32,
        description: &str,
        amount: Money,
        paid_by: &str,
        split_among: &[String],
        date: DateTime<Utc>,
    ) -> Result<Self> {
        let description = description.trim();
        if description.is_empty() {
            return Err(SettleError::invalid_expense("description is empty"));
        }

        if !amount.is_positive() {
            return Err(SettleError::invalid_expense(format!(
                "amount must be positive, got {}",
                amount
            )));
        }

        let paid_by = paid_by.trim();
        if paid_by.is_empty() {
            return Err(SettleError::invalid_expense("paidBy is missing"));
        }

        let mut split: Vec<ParticipantId> = Vec::with_capacity(split_among.len());
        for name in split_among.iter().map(|s| s.trim()) {
            if !name.is_empty() && !split.iter().any(|s| s == name) {
                split.push(name.to_string());
            }
        }
        if split.is_empty() {
            return Err(SettleError::invalid_expense("splitAmong is empty"));
        }

        Ok(ExpenseEntry {
            id,
            description: description.to_string(),
            amount,
            paid_by: paid_by.to_string(),
            split_among: split,
            date,
        })
    }

    /// Full-precision amount each split participant is debited.
    pub fn share(&self) -> Result<Money> {
        self.amount
            .checked_div_count(self.split_among.len())
            .ok_or_else(|| SettleError::invalid_expense("share cannot be computed"))
    }
}

/// An expense as submitted, before the group validates it and assigns an id.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub description: String,
    pub amount: Money,
    pub paid_by: ParticipantId,

    /// `None` splits among every current member.
    pub split_among: Option<Vec<ParticipantId>>,

    /// `None` stamps the entry with the current time.
    pub date: Option<DateTime<Utc>>,
}

impl ExpenseDraft {
    pub fn new(description: &str, amount: Money, paid_by: &str) -> Self {
        ExpenseDraft {
            description: description.to_string(),
            amount,
            paid_by: paid_by.to_string(),
            split_among: None,
            date: None,
        }
    }

    pub fn split_among<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.split_among = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn dated(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }
}

/// Raw ledger row as read from CSV.
///
/// Columns: `type,name,amount,paid_by,split_among,date`. The meaning of
/// `name` and `amount` depends on `type`:
///
/// | type      | name              | amount | other columns                    |
/// |-----------|-------------------|--------|----------------------------------|
/// | `member`  | participant name  | email  |                                  |
/// | `expense` | description       | amount | payer, `;`-separated split, date |
/// | `remove`  | expense id        |        |                                  |
/// | `status`  | status label      |        |                                  |
/// | `creator` | user who opened it|        |                                  |
/// | `trip`    | trip id           |        |                                  |
#[derive(Debug, Deserialize)]
pub struct LedgerRecord {
    #[serde(rename = "type")]
    pub kind: String,

    pub name: String,

    #[serde(default)]
    pub amount: Option<String>,

    #[serde(default)]
    pub paid_by: Option<String>,

    #[serde(default)]
    pub split_among: Option<String>,

    #[serde(default)]
    pub date: Option<String>,
}

/// A parsed ledger row ready to apply to a group.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerOp {
    AddMember { name: String, email: Option<String> },
    AddExpense(ExpenseDraft),
    RemoveExpense(u32),
    SetStatus(String),
    SetCreator(String),
    SetTrip(String),
}

impl LedgerRecord {
    /// Parses the raw CSV row into a ledger operation.
    ///
    /// Returns `None` for unknown row types or malformed fields. Semantic
    /// checks (positive amount, payer present) are left to the group.
    pub fn parse(&self) -> Option<LedgerOp> {
        let kind = self.kind.trim().to_lowercase();
        let name = self.name.trim();

        match kind.as_str() {
            "member" => {
                if name.is_empty() {
                    return None;
                }
                Some(LedgerOp::AddMember {
                    name: name.to_string(),
                    email: non_empty(&self.amount),
                })
            }
            "expense" => {
                let amount = Money::from_str(non_empty(&self.amount)?.as_str()).ok()?;
                let paid_by = non_empty(&self.paid_by).unwrap_or_default();

                let mut draft = ExpenseDraft::new(name, amount, &paid_by);
                if let Some(split) = non_empty(&self.split_among) {
                    draft = draft.split_among(split.split(';').map(str::trim));
                }
                if let Some(date) = non_empty(&self.date) {
                    let parsed = DateTime::parse_from_rfc3339(&date).ok()?;
                    draft = draft.dated(parsed.with_timezone(&Utc));
                }
                Some(LedgerOp::AddExpense(draft))
            }
            "remove" => name.parse().ok().map(LedgerOp::RemoveExpense),
            "status" => Some(LedgerOp::SetStatus(name.to_string())),
            "creator" if !name.is_empty() => Some(LedgerOp::SetCreator(name.to_string())),
            "trip" if !name.is_empty() => Some(LedgerOp::SetTrip(name.to_string())),
            _ => None,
        }
    }
}

fn non_empty(field: &Option<String>) -> Option<String> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
