//! Client (loan account) model and ledger invariants.
//!
//! Maintains the reconciliation invariant: every history record's stored
//! `post_balance` equals the client's actual capital immediately after that
//! record was appended.

use crate::money::Money;
use crate::record::OperationRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A loan account.
///
/// # Invariants
///
/// - `history` is append-only and its first entry is always an `Initiation`
///   whose amount and post-balance equal `initial_capital`
/// - each record's `post_balance` equals `current_capital` as of that record
/// - `total_paid` equals the sum of every payment record's amount
/// - `current_capital >= 0` at all times
///
/// Field names serialize in camelCase; that serialized shape is the storage
/// contract for reading documents written by the original tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Opaque unique identifier, assigned at creation.
    pub id: String,

    /// Display name, non-empty.
    pub name: String,

    /// Capital lent at creation; the cost basis, never mutated afterwards.
    pub initial_capital: Money,

    /// Outstanding balance. Reduced by principal payments, increased by
    /// re-advances.
    pub current_capital: Money,

    /// Percent of the balance due per period (5 = 5% per fortnight).
    pub interest_rate: Money,

    /// Running sum of all payment amounts ever applied.
    pub total_paid: Money,

    /// Append-only operation history, oldest first.
    pub history: Vec<OperationRecord>,

    /// Creation timestamp, set once.
    pub created_at: DateTime<Utc>,
}

impl Client {
    /// The interest due for the next period: `current_capital * rate / 100`.
    ///
    /// Recomputed on demand, never stored.
    pub fn interest_due(&self) -> Money {
        self.current_capital.percent(self.interest_rate)
    }

    /// Verifies the full ledger reconciliation invariant.
    ///
    /// Replays the history with a running balance and checks every record:
    /// the history opens with an initiation matching `initial_capital`, each
    /// record's stored post-balance equals the replayed balance at that
    /// point, the final balance equals `current_capital`, and `total_paid`
    /// equals the sum of payment amounts. A single corrupted record anywhere
    /// in the history fails the check.
    pub fn check_ledger(&self) -> bool {
        let mut records = self.history.iter();
        let mut balance = match records.next() {
            Some(OperationRecord::Initiation {
                amount,
                post_balance,
                ..
            }) if *amount == self.initial_capital && *post_balance == *amount => *amount,
            _ => return false,
        };

        let mut paid_sum = Money::ZERO;
        for record in records {
            let expected = match record {
                // Only the first record may be an initiation.
                OperationRecord::Initiation { .. } => return false,
                OperationRecord::InterestPayment { .. } => balance,
                // A principal debit that would overdraw is valid only as a
                // clamp to zero.
                OperationRecord::InterestPlusPrincipalPayment {
                    principal_portion, ..
                } => (balance - *principal_portion).clamp_to_zero(),
                OperationRecord::PrincipalOnlyPayment { amount, .. } => {
                    (balance - *amount).clamp_to_zero()
                }
                OperationRecord::Reengage {
                    prior_balance,
                    added_amount,
                    ..
                } => {
                    if *prior_balance != balance {
                        return false;
                    }
                    balance + *added_amount
                }
            };

            if record.post_balance() != expected {
                return false;
            }
            balance = expected;
            paid_sum += record.paid_amount();
        }

        balance == self.current_capital
            && paid_sum == self.total_paid
            && !self.current_capital.is_negative()
    }
}

/// A soft-deleted client: the full record plus its deletion timestamp.
///
/// Restorable; the deletion timestamp is stripped on restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedClient {
    #[serde(flatten)]
    pub client: Client,

    /// When the client was removed from the active set.
    pub deleted_at: DateTime<Utc>,
}

impl ArchivedClient {
    /// Attaches a deletion timestamp to a client.
    pub fn new(client: Client, deleted_at: DateTime<Utc>) -> Self {
        ArchivedClient { client, deleted_at }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::LedgerDate;
    use std::str::FromStr;

    fn money(s: &str) -> Money {
        Money::from_str(s).unwrap()
    }

    fn date(s: &str) -> LedgerDate {
        LedgerDate::from_str(s).unwrap()
    }

    fn sample_client() -> Client {
        Client {
            id: "1730000000000".to_string(),
            name: "Juan Pérez".to_string(),
            initial_capital: money("10000"),
            current_capital: money("10000"),
            interest_rate: money("5"),
            total_paid: Money::ZERO,
            history: vec![OperationRecord::Initiation {
                amount: money("10000"),
                post_balance: money("10000"),
                date: date("01/10/2025"),
            }],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_interest_due() {
        let client = sample_client();
        assert_eq!(client.interest_due(), money("500"));
    }

    #[test]
    fn test_check_ledger_accepts_consistent_client() {
        assert!(sample_client().check_ledger());
    }

    #[test]
    fn test_check_ledger_rejects_missing_initiation() {
        let mut client = sample_client();
        client.history.clear();
        assert!(!client.check_ledger());
    }

    #[test]
    fn test_check_ledger_rejects_balance_drift() {
        let mut client = sample_client();
        client.current_capital = money("9999");
        assert!(!client.check_ledger());
    }

    #[test]
    fn test_check_ledger_rejects_total_paid_drift() {
        let mut client = sample_client();
        client.total_paid = money("500");
        assert!(!client.check_ledger());
    }

    fn client_with_payments() -> Client {
        let mut client = sample_client();
        client.history.push(OperationRecord::InterestPayment {
            amount: money("500"),
            post_balance: money("10000"),
            date: date("01/11/2025"),
            time: None,
        });
        client.history.push(OperationRecord::InterestPlusPrincipalPayment {
            amount: money("2500"),
            interest_portion: money("500"),
            principal_portion: money("2000"),
            post_balance: money("8000"),
            date: date("15/11/2025"),
            time: None,
        });
        client.current_capital = money("8000");
        client.total_paid = money("3000");
        client
    }

    #[test]
    fn test_check_ledger_walks_full_history() {
        assert!(client_with_payments().check_ledger());
    }

    #[test]
    fn test_check_ledger_rejects_corrupted_middle_record() {
        let mut client = client_with_payments();
        match &mut client.history[1] {
            OperationRecord::InterestPayment { post_balance, .. } => {
                *post_balance = money("123456");
            }
            other => panic!("Expected InterestPayment, got {:?}", other),
        }
        assert!(!client.check_ledger());
    }

    #[test]
    fn test_check_ledger_rejects_reengage_prior_balance_mismatch() {
        let mut client = client_with_payments();
        client.history.push(OperationRecord::Reengage {
            prior_balance: money("7000"),
            added_amount: money("3000"),
            post_balance: money("11000"),
            date: date("20/11/2025"),
            time: None,
        });
        client.current_capital = money("11000");
        assert!(!client.check_ledger());
    }

    #[test]
    fn test_check_ledger_rejects_second_initiation() {
        let mut client = client_with_payments();
        client.history.push(OperationRecord::Initiation {
            amount: money("8000"),
            post_balance: money("8000"),
            date: date("20/11/2025"),
        });
        assert!(!client.check_ledger());
    }

    #[test]
    fn test_check_ledger_accepts_clamped_overdraw() {
        let mut client = client_with_payments();
        client.history.push(OperationRecord::PrincipalOnlyPayment {
            amount: money("9000"),
            post_balance: Money::ZERO,
            date: date("20/11/2025"),
            time: None,
        });
        client.current_capital = Money::ZERO;
        client.total_paid = money("12000");
        assert!(client.check_ledger());
    }

    #[test]
    fn test_storage_field_names() {
        let json = serde_json::to_value(sample_client()).unwrap();
        assert!(json.get("initialCapital").is_some());
        assert!(json.get("currentCapital").is_some());
        assert!(json.get("interestRate").is_some());
        assert!(json.get("totalPaid").is_some());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_archived_client_flattens_and_round_trips() {
        let archived = ArchivedClient::new(sample_client(), Utc::now());
        let json = serde_json::to_value(&archived).unwrap();
        assert!(json.get("deletedAt").is_some());
        assert!(json.get("currentCapital").is_some());

        let back: ArchivedClient = serde_json::from_value(json).unwrap();
        assert_eq!(back, archived);
    }
}
