//! Expense group aggregate: members, the expense log, and a status label.
//!
//! Validation happens here, at write time. Anything that reaches the
//! balance calculator through a group is already well formed.

use crate::error::{Result, SettleError};
use crate::expense::{ExpenseDraft, ExpenseEntry, ParticipantId};
use crate::money::Money;
use chrono::Utc;
use std::fmt;
use std::str::FromStr;

/// Lifecycle label set by the caller. The engine never computes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupStatus {
    #[default]
    Active,
    Settled,
    Archived,
}

impl FromStr for GroupStatus {
    type Err = SettleError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(GroupStatus::Active),
            "settled" => Ok(GroupStatus::Settled),
            "archived" => Ok(GroupStatus::Archived),
            _ => Err(SettleError::InvalidStatus(s.trim().to_string())),
        }
    }
}

impl fmt::Display for GroupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GroupStatus::Active => "active",
            GroupStatus::Settled => "settled",
            GroupStatus::Archived => "archived",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: ParticipantId,
    pub email: Option<String>,
}

/// A trip-scoped collection of participants and logged shared costs.
///
/// # Invariants
///
/// - Member names are unique; so are non-empty emails
/// - Every stored expense passed [`ExpenseEntry::new`] validation
/// - `total_amount()` is derived from the log, never stored
#[derive(Debug, Clone)]
pub struct ExpenseGroup {
    pub name: String,

    /// Informational label; amounts are never converted.
    pub currency: String,

    /// User who opened the group.
    pub created_by: Option<String>,

    /// Trip the group belongs to, if any.
    pub trip_id: Option<String>,

    members: Vec<Member>,
    expenses: Vec<ExpenseEntry>,
    status: GroupStatus,
    next_expense_id: u32,
}

impl ExpenseGroup {
    pub const DEFAULT_CURRENCY: &'static str = "INR";

    pub fn new(name: &str) -> Self {
        ExpenseGroup {
            name: name.to_string(),
            currency: Self::DEFAULT_CURRENCY.to_string(),
            created_by: None,
            trip_id: None,
            members: Vec::new(),
            expenses: Vec::new(),
            status: GroupStatus::Active,
            next_expense_id: 1,
        }
    }

    /// Opens a group on behalf of `created_by`, optionally tied to a trip.
    pub fn open(name: &str, created_by: &str, trip_id: Option<&str>) -> Self {
        let mut group = Self::new(name);
        group.created_by = Some(created_by.trim().to_string());
        group.trip_id = trip_id.map(|t| t.trim().to_string());
        group
    }

    pub fn with_members<I, S>(name: &str, members: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut group = Self::new(name);
        for member in members {
            group.add_member(member.as_ref(), None)?;
        }
        Ok(group)
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Current member identifiers in insertion order.
    pub fn member_names(&self) -> Vec<ParticipantId> {
        self.members.iter().map(|m| m.name.clone()).collect()
    }

    pub fn expenses(&self) -> &[ExpenseEntry] {
        &self.expenses
    }

    pub fn status(&self) -> GroupStatus {
        self.status
    }

    /// Sum of every logged expense amount.
    pub fn total_amount(&self) -> Money {
        self.expenses.iter().map(|e| e.amount).sum()
    }

    /// Adds a member. Rejects a blank name, a name already present, or an
    /// email already used by another member.
    pub fn add_member(&mut self, name: &str, email: Option<&str>) -> Result<()> {
        let name = name.trim();
        let email = email.map(str::trim).filter(|e| !e.is_empty());
        if name.is_empty() {
            return Err(SettleError::InvalidMember("name is empty".to_string()));
        }

        let exists = self.members.iter().any(|m| {
            m.name == name || (email.is_some() && m.email.as_deref() == email)
        });
        if exists {
            return Err(SettleError::DuplicateMember {
                name: name.to_string(),
            });
        }

        self.members.push(Member {
            name: name.to_string(),
            email: email.map(str::to_string),
        });
        Ok(())
    }

    /// Validates and appends an expense, returning its id.
    ///
    /// An omitted split defaults to every current member. The payer and split
    /// participants need not be current members. An amount that would push
    /// the group total out of range is rejected, which also bounds every
    /// balance.
    pub fn add_expense(&mut self, draft: ExpenseDraft) -> Result<u32> {
        let split = match draft.split_among {
            Some(split) => split,
            None => self.member_names(),
        };

        if self.total_amount().checked_add(draft.amount).is_none() {
            return Err(SettleError::invalid_expense(format!(
                "amount {} overflows the group total",
                draft.amount
            )));
        }

        let entry = ExpenseEntry::new(
            self.next_expense_id,
            &draft.description,
            draft.amount,
            &draft.paid_by,
            &split,
            draft.date.unwrap_or_else(Utc::now),
        )?;

        let id = entry.id;
        self.expenses.push(entry);
        self.next_expense_id += 1;
        Ok(id)
    }

    /// Removes an expense by id. Ids are never reused.
    pub fn remove_expense(&mut self, id: u32) -> Result<ExpenseEntry> {
        let index = self
            .expenses
            .iter()
            .position(|e| e.id == id)
            .ok_or(SettleError::UnknownExpense { id })?;
        Ok(self.expenses.remove(index))
    }

    pub fn set_status(&mut self, status: GroupStatus) {
        self.status = status;
    }
}

/// Selects groups by status and by user, where a user sees the groups they
/// opened and the groups that list their email among the members.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupFilter {
    pub user: Option<String>,
    pub status: Option<GroupStatus>,
}

impl GroupFilter {
    pub fn matches(&self, group: &ExpenseGroup) -> bool {
        if let Some(status) = self.status {
            if group.status != status {
                return false;
            }
        }

        match self.user.as_deref() {
            Some(user) => {
                group.created_by.as_deref() == Some(user)
                    || group.members.iter().any(|m| m.email.as_deref() == Some(user))
            }
            None => true,
        }
    }

    /// Keeps the groups that match, in their original order.
    pub fn apply<'a>(&self, groups: &'a [ExpenseGroup]) -> Vec<&'a ExpenseGroup> {
        groups.iter().filter(|g| self.matches(g)).collect()
    }
}
