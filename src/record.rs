//! History entry models: the operation records that make up a client's ledger.

use crate::money::Money;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A calendar date as stored in ledger history entries.
///
/// Serializes as `DD/MM/YYYY`, the format the original tool wrote to storage.
/// Parsing also accepts ISO `YYYY-MM-DD` since that is what date inputs
/// produce before formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LedgerDate(NaiveDate);

impl LedgerDate {
    /// Creates a ledger date from year, month, and day.
    ///
    /// Returns `None` for out-of-range components.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(LedgerDate)
    }

    /// Returns the underlying calendar date.
    pub fn naive(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for LedgerDate {
    fn from(date: NaiveDate) -> Self {
        LedgerDate(date)
    }
}

impl FromStr for LedgerDate {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        NaiveDate::parse_from_str(trimmed, "%d/%m/%Y")
            .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d"))
            .map(LedgerDate)
    }
}

impl fmt::Display for LedgerDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%d/%m/%Y"))
    }
}

impl Serialize for LedgerDate {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for LedgerDate {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        LedgerDate::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// One immutable entry in a client's history.
///
/// A closed set of variants, one per observed history-entry shape. Each
/// record stores `post_balance`: the client's capital immediately after the
/// record was appended, making the history a verifiable ledger rather than
/// just a log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OperationRecord {
    /// The opening entry; always first, amount equals the initial capital.
    #[serde(rename_all = "camelCase")]
    Initiation {
        amount: Money,
        post_balance: Money,
        date: LedgerDate,
    },

    /// Interest-only payment; the balance is unchanged.
    #[serde(rename_all = "camelCase")]
    InterestPayment {
        amount: Money,
        post_balance: Money,
        date: LedgerDate,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        time: Option<String>,
    },

    /// Combined payment: interest plus a principal paydown.
    #[serde(rename_all = "camelCase")]
    InterestPlusPrincipalPayment {
        amount: Money,
        interest_portion: Money,
        principal_portion: Money,
        post_balance: Money,
        date: LedgerDate,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        time: Option<String>,
    },

    /// Principal-only paydown ("abono") with no interest component.
    #[serde(rename_all = "camelCase")]
    PrincipalOnlyPayment {
        amount: Money,
        post_balance: Money,
        date: LedgerDate,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        time: Option<String>,
    },

    /// Re-advance ("reenganche"): fresh capital added to the balance.
    #[serde(rename_all = "camelCase")]
    Reengage {
        prior_balance: Money,
        added_amount: Money,
        post_balance: Money,
        date: LedgerDate,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        time: Option<String>,
    },
}

impl OperationRecord {
    /// The client's capital immediately after this record was appended.
    pub fn post_balance(&self) -> Money {
        match self {
            OperationRecord::Initiation { post_balance, .. }
            | OperationRecord::InterestPayment { post_balance, .. }
            | OperationRecord::InterestPlusPrincipalPayment { post_balance, .. }
            | OperationRecord::PrincipalOnlyPayment { post_balance, .. }
            | OperationRecord::Reengage { post_balance, .. } => *post_balance,
        }
    }

    /// The calendar date this record was made on.
    pub fn date(&self) -> LedgerDate {
        match self {
            OperationRecord::Initiation { date, .. }
            | OperationRecord::InterestPayment { date, .. }
            | OperationRecord::InterestPlusPrincipalPayment { date, .. }
            | OperationRecord::PrincipalOnlyPayment { date, .. }
            | OperationRecord::Reengage { date, .. } => *date,
        }
    }

    /// Returns `true` for the opening entry.
    pub fn is_initiation(&self) -> bool {
        matches!(self, OperationRecord::Initiation { .. })
    }

    /// The amount this record contributes to the client's `total_paid`.
    ///
    /// Initiation and reengage entries move capital, not payments, and
    /// contribute zero.
    pub fn paid_amount(&self) -> Money {
        match self {
            OperationRecord::InterestPayment { amount, .. }
            | OperationRecord::InterestPlusPrincipalPayment { amount, .. }
            | OperationRecord::PrincipalOnlyPayment { amount, .. } => *amount,
            OperationRecord::Initiation { .. } | OperationRecord::Reengage { .. } => Money::ZERO,
        }
    }

    /// The interest component of this record.
    ///
    /// Interest-only payments have no explicit portion field; their full
    /// amount is interest.
    pub fn interest_component(&self) -> Money {
        match self {
            OperationRecord::InterestPayment { amount, .. } => *amount,
            OperationRecord::InterestPlusPrincipalPayment {
                interest_portion, ..
            } => *interest_portion,
            _ => Money::ZERO,
        }
    }
}
