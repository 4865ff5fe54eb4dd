//! Net balance per participant, reduced from the expense log.
//!
//! Positive means the participant is owed money, negative means they owe.
//! For any well-formed log the balances sum to zero.

use crate::error::{Result, SettleError};
use crate::expense::{ExpenseEntry, ParticipantId};
use crate::money::Money;
use crate::planner::Transfer;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

/// Signed balances keyed by participant, in discovery order.
///
/// Current members come first, in membership order; participants that only
/// appear in the expense log (former members, outside payers) follow in the
/// order they were first seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Balances {
    entries: Vec<(ParticipantId, Money)>,
    index: HashMap<ParticipantId, usize>,
}

impl Balances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the slot for `id`, registering it at zero on first sight.
    fn slot(&mut self, id: &str) -> &mut Money {
        let idx = match self.index.get(id) {
            Some(&idx) => idx,
            None => {
                let idx = self.entries.len();
                self.entries.push((id.to_string(), Money::ZERO));
                self.index.insert(id.to_string(), idx);
                idx
            }
        };
        &mut self.entries[idx].1
    }

    pub fn credit(&mut self, id: &str, amount: Money) {
        *self.slot(id) += amount;
    }

    pub fn debit(&mut self, id: &str, amount: Money) {
        *self.slot(id) -= amount;
    }

    fn try_credit(&mut self, id: &str, amount: Money) -> Result<()> {
        let slot = self.slot(id);
        *slot = slot
            .checked_add(amount)
            .ok_or_else(|| SettleError::invalid_expense(format!("balance of {} overflows", id)))?;
        Ok(())
    }

    fn try_debit(&mut self, id: &str, amount: Money) -> Result<()> {
        let slot = self.slot(id);
        *slot = slot
            .checked_sub(amount)
            .ok_or_else(|| SettleError::invalid_expense(format!("balance of {} overflows", id)))?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<Money> {
        self.index.get(id).map(|&idx| self.entries[idx].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Money)> {
        self.entries.iter().map(|(id, m)| (id.as_str(), *m))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of every balance. Zero, up to division residue, for a valid log.
    pub fn net_total(&self) -> Money {
        self.entries.iter().map(|(_, m)| *m).sum()
    }

    /// Applies payments: the payer's balance rises, the payee's falls.
    pub fn apply_transfers(&mut self, transfers: &[Transfer]) {
        for t in transfers {
            self.credit(&t.from, t.amount);
            self.debit(&t.to, t.amount);
        }
    }
}

impl<S: AsRef<str>> FromIterator<(S, Money)> for Balances {
    fn from_iter<I: IntoIterator<Item = (S, Money)>>(iter: I) -> Self {
        let mut balances = Balances::new();
        for (id, amount) in iter {
            balances.credit(id.as_ref(), amount);
        }
        balances
    }
}

impl Serialize for Balances {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, amount) in &self.entries {
            map.serialize_entry(id, amount)?;
        }
        map.end()
    }
}

/// Reduces the expense log into one net balance per participant.
///
/// Every member starts at zero. Each expense credits its payer the full
/// amount and debits every split participant an equal full-precision share,
/// so a payer outside the split is fully reimbursed. Identifiers unknown to
/// `members` are tracked rather than rejected.
///
/// Fails with `InvalidExpense` if an entry's share cannot be computed or a
/// balance leaves the representable range.
pub fn compute_balances<S: AsRef<str>>(
    members: &[S],
    expenses: &[ExpenseEntry],
) -> Result<Balances> {
    let mut balances = Balances::new();
    for member in members {
        balances.slot(member.as_ref());
    }

    for expense in expenses {
        let share = expense.share()?;
        balances.try_credit(&expense.paid_by, expense.amount)?;
        for participant in &expense.split_among {
            balances.try_debit(participant, share)?;
        }
    }

    Ok(balances)
}
