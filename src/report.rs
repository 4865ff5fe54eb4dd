//! Settlement report: the engine's output contract.

use crate::balance::{compute_balances, Balances};
use crate::error::Result;
use crate::group::ExpenseGroup;
use crate::money::Money;
use crate::planner::{plan_settlement, PlannerConfig, Transfer};
use serde::Serialize;
use std::io::Write;

/// Totals, balances, and the transfers that settle them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementReport {
    /// Sum of all expense amounts.
    pub total_amount: Money,

    /// Full-precision net balances, discovery order.
    pub balances: Balances,

    pub settlements: Vec<Transfer>,

    /// Even split of the total over current members, rounded to cents.
    /// Informational only; zero for a group with no members.
    pub per_person: Money,
}

/// Builds the report for a snapshot of a group.
pub fn build_report(group: &ExpenseGroup, config: &PlannerConfig) -> Result<SettlementReport> {
    let members = group.member_names();
    let balances = compute_balances(&members, group.expenses())?;
    let settlements = plan_settlement(&balances, config);

    let total_amount = group.total_amount();
    let per_person = total_amount
        .checked_div_count(members.len())
        .unwrap_or(Money::ZERO)
        .round_cents();

    Ok(SettlementReport {
        total_amount,
        balances,
        settlements,
        per_person,
    })
}

impl SettlementReport {
    /// Writes the report as pretty-printed JSON.
    pub fn write_json<W: Write>(&self, mut writer: W) -> Result<()> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Writes the transfers as CSV with a `from,to,amount` header.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["from", "to", "amount"])?;
        for t in &self.settlements {
            let amount = t.amount.to_string();
            csv_writer.write_record([t.from.as_str(), t.to.as_str(), amount.as_str()])?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}
