//! # Loan Ledger
//!
//! A state-transition engine for a small loan portfolio: register clients,
//! record interest and principal payments, re-advance capital, archive and
//! restore clients, and compute dashboard aggregates.
//!
//! ## Design Principles
//!
//! - **Fixed-point arithmetic**: 2-decimal monetary values via `rust_decimal`
//! - **Pure transitions**: every operation maps a prior `Client` to a new
//!   `Client`; no hidden state, no I/O in the engine
//! - **Verifiable history**: each record stores the post-operation balance,
//!   so the ledger reconciles against itself at any point
//! - **Narrow collaborators**: persistence and authentication sit behind the
//!   `Store` and `IdentityProvider` traits
//!
//! ## Example
//!
//! ```
//! use chrono::Utc;
//! use std::str::FromStr;
//! use loan_ledger::{LedgerDate, LedgerEngine, Money};
//!
//! let engine = LedgerEngine::default();
//! let client = engine
//!     .create_client("Juan Pérez", Money::from(10000), Money::from(5), Utc::now())
//!     .unwrap();
//!
//! let date = LedgerDate::from_str("01/11/2025").unwrap();
//! let client = engine
//!     .apply_payment(&client, Money::from(500), Money::ZERO, date, None)
//!     .unwrap();
//! assert_eq!(client.total_paid, Money::from(500));
//! ```

pub mod aggregates;
pub mod client;
pub mod engine;
pub mod error;
pub mod identity;
pub mod money;
pub mod record;
pub mod store;

pub use aggregates::{recent_activity_count, top_clients_by_capital, Aggregates};
pub use client::{ArchivedClient, Client};
pub use engine::{LedgerConfig, LedgerEngine, OverdrawPolicy};
pub use error::{LedgerError, Result};
pub use identity::{Credentials, Identity, IdentityProvider, LocalIdentityProvider};
pub use money::Money;
pub use record::{LedgerDate, OperationRecord};
pub use store::{JsonFileStore, LedgerDocument, MemoryStore, Store};
