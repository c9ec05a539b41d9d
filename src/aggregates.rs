//! Derived dashboard statistics over the active client set.
//!
//! Everything here is read-only and recomputed on every call; nothing is
//! cached or stored.

use crate::client::Client;
use crate::error::Result;
use crate::money::Money;
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::io::Write;

/// Flat percent of current capital used for the monthly profit estimate.
///
/// The dashboard has always shown a flat 10% regardless of each client's
/// stated rate (5% fortnightly compounds to roughly 10% monthly). This is a
/// deliberate approximation, distinct from `interest_due_next_period`.
const MONTHLY_PROFIT_PERCENT: i64 = 10;

/// Aggregate portfolio figures for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregates {
    /// Number of active clients.
    pub total_clients: usize,

    /// Sum of outstanding balances.
    pub total_current_capital: Money,

    /// Sum of cost bases (capital originally lent).
    pub total_initial_capital: Money,

    /// Sum of all payments ever collected.
    pub total_collected: Money,

    /// Sum of each client's interest due for the next period.
    pub interest_due_next_period: Money,

    /// Flat 10%-of-capital monthly estimate (see `MONTHLY_PROFIT_PERCENT`).
    pub estimated_monthly_profit: Money,

    /// Collected minus capital invested. Negative until the portfolio has
    /// recouped its cost basis.
    pub net_profit: Money,

    /// Interest component summed across every payment in every history.
    pub historical_interest_collected: Money,

    /// Clients on the 5% fortnightly plan.
    pub fortnightly_clients: usize,

    /// Clients on the 10% monthly plan.
    pub monthly_clients: usize,
}

impl Aggregates {
    /// Computes all portfolio figures from the active client set.
    ///
    /// An empty slice yields all-zero aggregates.
    pub fn compute(clients: &[Client]) -> Self {
        let mut totals = Aggregates {
            total_clients: clients.len(),
            total_current_capital: Money::ZERO,
            total_initial_capital: Money::ZERO,
            total_collected: Money::ZERO,
            interest_due_next_period: Money::ZERO,
            estimated_monthly_profit: Money::ZERO,
            net_profit: Money::ZERO,
            historical_interest_collected: Money::ZERO,
            fortnightly_clients: 0,
            monthly_clients: 0,
        };

        let fortnightly = Money::from(5);
        let monthly = Money::from(10);

        for client in clients {
            totals.total_current_capital += client.current_capital;
            totals.total_initial_capital += client.initial_capital;
            totals.total_collected += client.total_paid;
            totals.interest_due_next_period += client.interest_due();
            totals.estimated_monthly_profit += client
                .current_capital
                .percent(Money::from(MONTHLY_PROFIT_PERCENT));

            if client.interest_rate == fortnightly {
                totals.fortnightly_clients += 1;
            } else if client.interest_rate == monthly {
                totals.monthly_clients += 1;
            }

            for record in &client.history {
                totals.historical_interest_collected += record.interest_component();
            }
        }

        totals.net_profit = totals.total_collected - totals.total_initial_capital;
        totals
    }
}

/// Counts non-initiation history entries dated within the trailing window.
pub fn recent_activity_count(clients: &[Client], window_days: i64, today: NaiveDate) -> usize {
    let cutoff = today - Duration::days(window_days);
    clients
        .iter()
        .flat_map(|client| client.history.iter())
        .filter(|record| !record.is_initiation() && record.date().naive() >= cutoff)
        .count()
}

/// The `n` clients with the largest outstanding balances, descending.
pub fn top_clients_by_capital(clients: &[Client], n: usize) -> Vec<&Client> {
    let mut sorted: Vec<&Client> = clients.iter().collect();
    sorted.sort_by(|a, b| b.current_capital.cmp(&a.current_capital));
    sorted.truncate(n);
    sorted
}

/// Writes a CSV portfolio report, one row per client.
///
/// Rows are sorted by client id for deterministic output. All monetary
/// values are formatted with exactly 2 decimal places.
pub fn write_portfolio_report<W: Write>(clients: &[Client], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record([
        "id",
        "name",
        "currentCapital",
        "initialCapital",
        "totalPaid",
        "interestDue",
    ])?;

    let mut sorted: Vec<&Client> = clients.iter().collect();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));

    for client in sorted {
        csv_writer.write_record([
            client.id.clone(),
            client.name.clone(),
            client.current_capital.to_string(),
            client.initial_capital.to_string(),
            client.total_paid.to_string(),
            client.interest_due().to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}
