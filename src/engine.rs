//! Ledger ingestion.
//!
//! Streams a group ledger CSV, applies each row to an `ExpenseGroup` in file
//! order, and produces the settlement report for the resulting snapshot.

use crate::error::Result;
use crate::expense::{LedgerOp, LedgerRecord};
use crate::group::{ExpenseGroup, GroupStatus};
use crate::planner::PlannerConfig;
use crate::report::{build_report, SettlementReport};
use csv::{ReaderBuilder, Trim};
use log::{debug, warn};
use std::io::Read;

/// Builds one expense group from ledger rows and settles it.
///
/// Rows are applied in the order they are read. A row that fails to parse or
/// that the group rejects (invalid expense, duplicate member, unknown expense
/// id, unknown status) is logged at warn level and skipped; it never reaches
/// the balance calculator.
pub struct SettlementEngine {
    group: ExpenseGroup,
}

impl SettlementEngine {
    /// Creates an engine around an empty group.
    pub fn new(group_name: &str) -> Self {
        SettlementEngine {
            group: ExpenseGroup::new(group_name),
        }
    }

    pub fn from_group(group: ExpenseGroup) -> Self {
        SettlementEngine { group }
    }

    pub fn group(&self) -> &ExpenseGroup {
        &self.group
    }

    /// Processes ledger rows from a CSV reader in streaming fashion.
    pub fn process_csv<R: Read>(&mut self, reader: R) -> Result<()> {
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        for (row_idx, result) in csv_reader.deserialize::<LedgerRecord>().enumerate() {
            let row_num = row_idx + 2; // 1-indexed, accounting for header row

            match result {
                Ok(record) => {
                    if let Some(op) = record.parse() {
                        if let Err(e) = self.apply(op, row_num) {
                            warn!("Row {}: {}", row_num, e);
                        }
                    } else {
                        warn!("Row {}: Failed to parse ledger record", row_num);
                    }
                }
                Err(e) => {
                    warn!("Row {}: CSV parse error: {}", row_num, e);
                }
            }
        }

        Ok(())
    }

    /// Applies a single ledger operation to the group.
    pub fn apply(&mut self, op: LedgerOp, row: usize) -> Result<()> {
        match op {
            LedgerOp::AddMember { name, email } => {
                self.group.add_member(&name, email.as_deref())?;
                debug!("Row {}: Added member {}", row, name);
            }
            LedgerOp::AddExpense(draft) => {
                let amount = draft.amount;
                let paid_by = draft.paid_by.clone();
                let id = self.group.add_expense(draft)?;
                debug!(
                    "Row {}: Added expense {} of {} paid by {}",
                    row, id, amount, paid_by
                );
            }
            LedgerOp::RemoveExpense(id) => {
                let removed = self.group.remove_expense(id)?;
                debug!(
                    "Row {}: Removed expense {} ({})",
                    row, id, removed.description
                );
            }
            LedgerOp::SetStatus(label) => {
                let status: GroupStatus = label.parse()?;
                self.group.set_status(status);
                debug!("Row {}: Group status set to {}", row, status);
            }
            LedgerOp::SetCreator(user) => {
                debug!("Row {}: Group opened by {}", row, user);
                self.group.created_by = Some(user);
            }
            LedgerOp::SetTrip(trip) => {
                debug!("Row {}: Group belongs to trip {}", row, trip);
                self.group.trip_id = Some(trip);
            }
        }

        Ok(())
    }

    /// Computes the settlement report for the current snapshot.
    pub fn report(&self, config: &PlannerConfig) -> Result<SettlementReport> {
        build_report(&self.group, config)
    }
}

impl Default for SettlementEngine {
    fn default() -> Self {
        Self::new("trip")
    }
}
