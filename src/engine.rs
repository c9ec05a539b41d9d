//! Core ledger state-transition engine.
//!
//! Every operation takes a complete prior `Client` value and returns a
//! complete next `Client` value (or an error). The engine holds no state
//! between calls and performs no I/O, so any concurrency discipline lives
//! entirely in the store adapter: callers must serialize operations per
//! client, but operations on different clients are fully independent.

use crate::client::{ArchivedClient, Client};
use crate::error::{LedgerError, Result};
use crate::money::Money;
use crate::record::{LedgerDate, OperationRecord};
use chrono::{DateTime, Utc};
use log::debug;

/// What to do when a principal payment would push the balance below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverdrawPolicy {
    /// Reject the payment with `InvalidPayment`.
    #[default]
    Reject,

    /// Accept the payment and clamp the balance to zero.
    ClampToZero,
}

/// Engine policy knobs.
///
/// The rate set and payment policies varied across deployments of the
/// original tool; they are configuration here, not constants.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Interest rates (percent per period) accepted at client creation.
    pub supported_rates: Vec<Money>,

    /// Handling of principal payments that exceed the current balance.
    pub overdraw_policy: OverdrawPolicy,

    /// When set, a combined interest+principal payment must be at least the
    /// interest currently due. Off by default: most deployments accepted
    /// any positive split.
    pub enforce_interest_floor: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            // 5% fortnightly is the canonical plan; 10% monthly appears in
            // older saved data and stays readable.
            supported_rates: vec![Money::from(5), Money::from(10)],
            overdraw_policy: OverdrawPolicy::Reject,
            enforce_interest_floor: false,
        }
    }
}

/// The loan ledger state-transition engine.
///
/// Pure and deterministic: given a prior client state and an operation, it
/// returns the next consistent state with the corresponding history entry
/// appended. Balance arithmetic, `total_paid` accumulation, and the
/// reconciliation invariant all happen here and nowhere else.
#[derive(Debug, Clone, Default)]
pub struct LedgerEngine {
    config: LedgerConfig,
}

impl LedgerEngine {
    /// Creates an engine with the given policy configuration.
    pub fn new(config: LedgerConfig) -> Self {
        LedgerEngine { config }
    }

    /// Registers a new client.
    ///
    /// The id is derived from the creation timestamp in milliseconds. The
    /// history opens with an `Initiation` record matching the initial
    /// capital.
    pub fn create_client(
        &self,
        name: &str,
        initial_capital: Money,
        interest_rate: Money,
        created_at: DateTime<Utc>,
    ) -> Result<Client> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::InvalidInput(
                "client name must not be empty".to_string(),
            ));
        }
        if !initial_capital.is_positive() {
            return Err(LedgerError::InvalidInput(
                "initial capital must be greater than zero".to_string(),
            ));
        }
        if !self.config.supported_rates.contains(&interest_rate) {
            return Err(LedgerError::InvalidInput(format!(
                "unsupported interest rate: {}%",
                interest_rate
            )));
        }

        let client = Client {
            id: created_at.timestamp_millis().to_string(),
            name: name.to_string(),
            initial_capital,
            current_capital: initial_capital,
            interest_rate,
            total_paid: Money::ZERO,
            history: vec![OperationRecord::Initiation {
                amount: initial_capital,
                post_balance: initial_capital,
                date: created_at.date_naive().into(),
            }],
            created_at,
        };

        debug!(
            "Created client {} ({}) with capital {}",
            client.id, client.name, initial_capital
        );
        Ok(client)
    }

    /// The interest due for the client's next period.
    pub fn compute_interest_due(&self, client: &Client) -> Money {
        client.interest_due()
    }

    /// Records a payment: an interest portion, a principal portion, or both.
    ///
    /// The principal portion reduces the balance; the interest portion does
    /// not. Both portions count toward `total_paid`. Appends an
    /// `InterestPayment` record when the principal portion is zero, an
    /// `InterestPlusPrincipalPayment` record otherwise.
    pub fn apply_payment(
        &self,
        client: &Client,
        interest_paid: Money,
        principal_paid: Money,
        date: LedgerDate,
        time: Option<String>,
    ) -> Result<Client> {
        if interest_paid.is_negative() || principal_paid.is_negative() {
            return Err(LedgerError::InvalidPayment(
                "payment amounts must not be negative".to_string(),
            ));
        }
        if interest_paid.is_zero() && principal_paid.is_zero() {
            return Err(LedgerError::InvalidPayment(
                "enter at least one amount".to_string(),
            ));
        }

        if self.config.enforce_interest_floor && principal_paid.is_positive() {
            let due = client.interest_due();
            if interest_paid + principal_paid < due {
                return Err(LedgerError::InvalidPayment(format!(
                    "combined payment must be at least the interest due ({})",
                    due
                )));
            }
        }

        let new_capital = self.debit_principal(client, principal_paid)?;
        let amount = interest_paid + principal_paid;

        let record = if principal_paid.is_zero() {
            OperationRecord::InterestPayment {
                amount,
                post_balance: new_capital,
                date,
                time,
            }
        } else {
            OperationRecord::InterestPlusPrincipalPayment {
                amount,
                interest_portion: interest_paid,
                principal_portion: principal_paid,
                post_balance: new_capital,
                date,
                time,
            }
        };

        debug!(
            "Client {}: payment of {} (interest {}, principal {}), balance {} -> {}",
            client.id, amount, interest_paid, principal_paid, client.current_capital, new_capital
        );
        Ok(self.append(client, new_capital, amount, record))
    }

    /// Records a principal-only paydown ("abono").
    ///
    /// Reduces the balance without an interest component and counts toward
    /// `total_paid`.
    pub fn apply_principal_payment(
        &self,
        client: &Client,
        amount: Money,
        date: LedgerDate,
        time: Option<String>,
    ) -> Result<Client> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidPayment(
                "payment amount must be greater than zero".to_string(),
            ));
        }

        let new_capital = self.debit_principal(client, amount)?;
        let record = OperationRecord::PrincipalOnlyPayment {
            amount,
            post_balance: new_capital,
            date,
            time,
        };

        debug!(
            "Client {}: principal paydown of {}, balance {} -> {}",
            client.id, amount, client.current_capital, new_capital
        );
        Ok(self.append(client, new_capital, amount, record))
    }

    /// Records a re-advance ("reenganche"): fresh capital added to the
    /// outstanding balance.
    ///
    /// Touches neither `total_paid` nor `initial_capital`; the cost basis
    /// stays at the original figure.
    pub fn apply_reengage(
        &self,
        client: &Client,
        added_amount: Money,
        date: LedgerDate,
        time: Option<String>,
    ) -> Result<Client> {
        if !added_amount.is_positive() {
            return Err(LedgerError::InvalidInput(
                "reengage amount must be greater than zero".to_string(),
            ));
        }

        let prior_balance = client.current_capital;
        let new_capital = prior_balance + added_amount;

        let mut next = client.clone();
        next.current_capital = new_capital;
        next.history.push(OperationRecord::Reengage {
            prior_balance,
            added_amount,
            post_balance: new_capital,
            date,
            time,
        });

        debug!(
            "Client {}: reengage of {}, balance {} -> {}",
            client.id, added_amount, prior_balance, new_capital
        );
        debug_assert!(next.check_ledger());
        Ok(next)
    }

    /// Soft-deletes a client by attaching a deletion timestamp.
    pub fn archive_client(&self, client: Client, deleted_at: DateTime<Utc>) -> ArchivedClient {
        debug!("Archived client {} ({})", client.id, client.name);
        ArchivedClient::new(client, deleted_at)
    }

    /// Returns an archived client to the active set.
    ///
    /// With no override the client comes back exactly as archived. With an
    /// override balance that differs from the archived one, a synthetic
    /// `Reengage` record reconciles the difference (the delta may be
    /// negative); this lets an operator correct drift that occurred while
    /// the client was archived.
    pub fn restore_client(
        &self,
        archived: ArchivedClient,
        override_balance: Option<Money>,
        date: Option<LedgerDate>,
    ) -> Client {
        let deleted_at = archived.deleted_at;
        let mut client = archived.client;

        if let Some(balance) = override_balance {
            if balance != client.current_capital {
                let prior_balance = client.current_capital;
                let date = date.unwrap_or_else(|| deleted_at.date_naive().into());
                client.history.push(OperationRecord::Reengage {
                    prior_balance,
                    added_amount: balance - prior_balance,
                    post_balance: balance,
                    date,
                    time: None,
                });
                client.current_capital = balance;
                debug!(
                    "Client {}: restored with balance override {} -> {}",
                    client.id, prior_balance, balance
                );
                return client;
            }
        }

        debug!("Client {}: restored unchanged", client.id);
        client
    }

    /// Computes the post-payment balance for a principal debit, applying the
    /// configured overdraw policy.
    fn debit_principal(&self, client: &Client, principal: Money) -> Result<Money> {
        let remaining = client.current_capital - principal;
        if remaining.is_negative() {
            match self.config.overdraw_policy {
                OverdrawPolicy::Reject => Err(LedgerError::InvalidPayment(
                    "principal payment exceeds the current balance".to_string(),
                )),
                OverdrawPolicy::ClampToZero => Ok(Money::ZERO),
            }
        } else {
            Ok(remaining)
        }
    }

    /// Builds the next client state from a payment transition.
    fn append(
        &self,
        client: &Client,
        new_capital: Money,
        paid: Money,
        record: OperationRecord,
    ) -> Client {
        let mut next = client.clone();
        next.current_capital = new_capital;
        next.total_paid += paid;
        next.history.push(record);
        debug_assert!(next.check_ledger());
        next
    }
}
