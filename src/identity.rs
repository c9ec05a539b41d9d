//! Authentication collaborator: the `IdentityProvider` trait and a local
//! credential-table implementation.
//!
//! The ledger itself never sees credentials; it only needs an opaque
//! identity for the signed-in operator. Hosted providers plug in behind the
//! same trait.

use crate::error::{LedgerError, Result};
use log::debug;
use std::collections::HashMap;

/// Minimum password length accepted at sign-up.
pub const MIN_PASSWORD_LEN: usize = 6;

/// An email/password pair presented at sign-in or sign-up.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: &str, password: &str) -> Self {
        Credentials {
            email: email.trim().to_string(),
            password: password.to_string(),
        }
    }
}

/// An authenticated operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Opaque user identifier.
    pub user_id: String,

    /// The email the account was registered with.
    pub email: String,
}

/// Authentication boundary.
pub trait IdentityProvider {
    /// Authenticates an existing account.
    fn sign_in(&mut self, credentials: &Credentials) -> Result<Identity>;

    /// Registers a new account and signs it in.
    fn sign_up(&mut self, credentials: &Credentials) -> Result<Identity>;

    /// The currently signed-in identity, if any.
    fn current_identity(&self) -> Option<&Identity>;

    /// Ends the current session.
    fn sign_out(&mut self);
}

/// In-memory credential table, the local counterpart of a hosted
/// email/password service.
#[derive(Debug, Default)]
pub struct LocalIdentityProvider {
    accounts: HashMap<String, Account>,
    current: Option<Identity>,
    next_user_id: u64,
}

#[derive(Debug)]
struct Account {
    password: String,
    user_id: String,
}

impl LocalIdentityProvider {
    /// Creates a provider with no registered accounts.
    pub fn new() -> Self {
        LocalIdentityProvider::default()
    }
}

impl IdentityProvider for LocalIdentityProvider {
    fn sign_in(&mut self, credentials: &Credentials) -> Result<Identity> {
        // One failure path for wrong email and wrong password alike; the
        // message must not reveal which one it was.
        match self.accounts.get(&credentials.email) {
            Some(account) if account.password == credentials.password => {
                let identity = Identity {
                    user_id: account.user_id.clone(),
                    email: credentials.email.clone(),
                };
                debug!("Signed in {}", identity.email);
                self.current = Some(identity.clone());
                Ok(identity)
            }
            _ => Err(LedgerError::InvalidCredentials),
        }
    }

    fn sign_up(&mut self, credentials: &Credentials) -> Result<Identity> {
        if credentials.email.is_empty() || !credentials.email.contains('@') {
            return Err(LedgerError::InvalidInput(
                "invalid email address".to_string(),
            ));
        }
        if credentials.password.len() < MIN_PASSWORD_LEN {
            return Err(LedgerError::WeakCredential(MIN_PASSWORD_LEN));
        }
        if self.accounts.contains_key(&credentials.email) {
            return Err(LedgerError::AlreadyExists);
        }

        self.next_user_id += 1;
        let user_id = self.next_user_id.to_string();
        self.accounts.insert(
            credentials.email.clone(),
            Account {
                password: credentials.password.clone(),
                user_id: user_id.clone(),
            },
        );

        let identity = Identity {
            user_id,
            email: credentials.email.clone(),
        };
        debug!("Registered {}", identity.email);
        self.current = Some(identity.clone());
        Ok(identity)
    }

    fn current_identity(&self) -> Option<&Identity> {
        self.current.as_ref()
    }

    fn sign_out(&mut self) {
        if let Some(identity) = self.current.take() {
            debug!("Signed out {}", identity.email);
        }
    }
}
