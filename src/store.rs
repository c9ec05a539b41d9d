//! Persistence collaborators: the `Store` trait and its implementations.
//!
//! The engine never touches a store; callers load a client, compute the next
//! state through the engine, and save it back. Stores own the persisted
//! copies and the concurrency discipline.

use crate::client::{ArchivedClient, Client};
use crate::error::{LedgerError, Result};
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Persistence boundary for clients and archived clients.
pub trait Store {
    /// All clients in the active set.
    fn load_active_clients(&self) -> Result<Vec<Client>>;

    /// All soft-deleted clients.
    fn load_archived_clients(&self) -> Result<Vec<ArchivedClient>>;

    /// Inserts or replaces a client in the active set.
    fn save_client(&mut self, client: &Client) -> Result<()>;

    /// Moves a client from the active set to the archive.
    fn archive_client(&mut self, id: &str, deleted_at: DateTime<Utc>) -> Result<()>;

    /// Moves an archived client back to the active set unchanged.
    ///
    /// Balance corrections go through the engine's restore operation and a
    /// subsequent `save_client`.
    fn restore_client(&mut self, id: &str) -> Result<()>;

    /// Permanently removes an archived client.
    fn purge_archived(&mut self, id: &str) -> Result<()>;
}

/// In-memory store with per-client version counters.
///
/// The version counter backs the optimistic-concurrency contract: read a
/// client and its version, compute the next state through the engine, then
/// write with `save_client_if_unchanged`. Any conflicting modification,
/// including archiving or restoring, bumps the version so the stale write
/// fails with `ConcurrentModification`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    active: HashMap<String, Client>,
    archived: HashMap<String, ArchivedClient>,
    versions: HashMap<String, u64>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// The current version of a client, if it is in the active set.
    pub fn version_of(&self, id: &str) -> Option<u64> {
        self.active.get(id).and_then(|_| self.versions.get(id)).copied()
    }

    /// Saves only if the client's version still matches `expected`.
    pub fn save_client_if_unchanged(&mut self, client: &Client, expected: u64) -> Result<()> {
        let current = self.versions.get(&client.id).copied().unwrap_or(0);
        if current != expected {
            debug!(
                "Client {}: optimistic write failed (expected v{}, found v{})",
                client.id, expected, current
            );
            return Err(LedgerError::ConcurrentModification(client.id.clone()));
        }
        self.save_client(client)
    }
}

impl Store for MemoryStore {
    fn load_active_clients(&self) -> Result<Vec<Client>> {
        let mut clients: Vec<Client> = self.active.values().cloned().collect();
        clients.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(clients)
    }

    fn load_archived_clients(&self) -> Result<Vec<ArchivedClient>> {
        let mut archived: Vec<ArchivedClient> = self.archived.values().cloned().collect();
        archived.sort_by(|a, b| a.client.id.cmp(&b.client.id));
        Ok(archived)
    }

    fn save_client(&mut self, client: &Client) -> Result<()> {
        *self.versions.entry(client.id.clone()).or_insert(0) += 1;
        self.active.insert(client.id.clone(), client.clone());
        Ok(())
    }

    fn archive_client(&mut self, id: &str, deleted_at: DateTime<Utc>) -> Result<()> {
        let client = self
            .active
            .remove(id)
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
        // Moving between sets counts as a modification: a writer holding a
        // pre-archive version must not be able to re-insert the client.
        *self.versions.entry(id.to_string()).or_insert(0) += 1;
        self.archived
            .insert(id.to_string(), ArchivedClient::new(client, deleted_at));
        Ok(())
    }

    fn restore_client(&mut self, id: &str) -> Result<()> {
        let archived = self
            .archived
            .remove(id)
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
        *self.versions.entry(id.to_string()).or_insert(0) += 1;
        self.active.insert(id.to_string(), archived.client);
        Ok(())
    }

    fn purge_archived(&mut self, id: &str) -> Result<()> {
        self.archived
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))
    }
}

/// The persisted shape of a ledger file: both client sets in one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerDocument {
    /// Active clients.
    #[serde(default)]
    pub active: Vec<Client>,

    /// Soft-deleted clients.
    #[serde(default)]
    pub archived: Vec<ArchivedClient>,
}

/// File-backed store keeping the whole ledger in one JSON document.
///
/// Every operation is a read-modify-write of the full document, the same
/// access pattern the original tool used against browser local storage.
/// A missing file reads as an empty ledger.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store over the given document path.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        JsonFileStore { path: path.into() }
    }

    /// The backing document path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the full ledger document.
    pub fn load_document(&self) -> Result<LedgerDocument> {
        if !self.path.exists() {
            return Ok(LedgerDocument::default());
        }
        let contents = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn save_document(&self, document: &LedgerDocument) -> Result<()> {
        let contents = serde_json::to_string_pretty(document)?;
        fs::write(&self.path, contents)?;
        debug!(
            "Saved ledger document to {} ({} active, {} archived)",
            self.path.display(),
            document.active.len(),
            document.archived.len()
        );
        Ok(())
    }
}

impl Store for JsonFileStore {
    fn load_active_clients(&self) -> Result<Vec<Client>> {
        Ok(self.load_document()?.active)
    }

    fn load_archived_clients(&self) -> Result<Vec<ArchivedClient>> {
        Ok(self.load_document()?.archived)
    }

    fn save_client(&mut self, client: &Client) -> Result<()> {
        let mut document = self.load_document()?;
        match document.active.iter_mut().find(|c| c.id == client.id) {
            Some(existing) => *existing = client.clone(),
            None => document.active.push(client.clone()),
        }
        self.save_document(&document)
    }

    fn archive_client(&mut self, id: &str, deleted_at: DateTime<Utc>) -> Result<()> {
        let mut document = self.load_document()?;
        let position = document
            .active
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
        let client = document.active.remove(position);
        document
            .archived
            .push(ArchivedClient::new(client, deleted_at));
        self.save_document(&document)
    }

    fn restore_client(&mut self, id: &str) -> Result<()> {
        let mut document = self.load_document()?;
        let position = document
            .archived
            .iter()
            .position(|a| a.client.id == id)
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
        let archived = document.archived.remove(position);
        document.active.push(archived.client);
        self.save_document(&document)
    }

    fn purge_archived(&mut self, id: &str) -> Result<()> {
        let mut document = self.load_document()?;
        let position = document
            .archived
            .iter()
            .position(|a| a.client.id == id)
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
        document.archived.remove(position);
        self.save_document(&document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::LedgerEngine;
    use crate::money::Money;
    use crate::record::LedgerDate;
    use std::str::FromStr;

    fn sample_client(name: &str) -> Client {
        LedgerEngine::default()
            .create_client(
                name,
                Money::from_str("10000").unwrap(),
                Money::from(5),
                Utc::now(),
            )
            .unwrap()
    }

    #[test]
    fn test_memory_store_save_and_load() {
        let mut store = MemoryStore::new();
        let client = sample_client("Juan Pérez");

        store.save_client(&client).unwrap();
        let loaded = store.load_active_clients().unwrap();
        assert_eq!(loaded, vec![client]);
    }

    #[test]
    fn test_memory_store_archive_restore_cycle() {
        let mut store = MemoryStore::new();
        let client = sample_client("Juan Pérez");
        let id = client.id.clone();

        store.save_client(&client).unwrap();
        store.archive_client(&id, Utc::now()).unwrap();
        assert!(store.load_active_clients().unwrap().is_empty());
        assert_eq!(store.load_archived_clients().unwrap().len(), 1);

        store.restore_client(&id).unwrap();
        assert_eq!(store.load_active_clients().unwrap(), vec![client]);
        assert!(store.load_archived_clients().unwrap().is_empty());
    }

    #[test]
    fn test_memory_store_purge_is_permanent() {
        let mut store = MemoryStore::new();
        let client = sample_client("Juan Pérez");
        let id = client.id.clone();

        store.save_client(&client).unwrap();
        store.archive_client(&id, Utc::now()).unwrap();
        store.purge_archived(&id).unwrap();

        assert!(store.load_archived_clients().unwrap().is_empty());
        assert!(matches!(
            store.restore_client(&id),
            Err(LedgerError::NotFound(_))
        ));
    }

    #[test]
    fn test_memory_store_unknown_id_is_not_found() {
        let mut store = MemoryStore::new();
        assert!(matches!(
            store.archive_client("missing", Utc::now()),
            Err(LedgerError::NotFound(_))
        ));
        assert!(matches!(
            store.purge_archived("missing"),
            Err(LedgerError::NotFound(_))
        ));
    }

    #[test]
    fn test_optimistic_write_detects_conflict() {
        let engine = LedgerEngine::default();
        let mut store = MemoryStore::new();
        let client = sample_client("Juan Pérez");
        store.save_client(&client).unwrap();

        let version = store.version_of(&client.id).unwrap();
        let date = LedgerDate::from_str("01/11/2025").unwrap();

        // Two readers race; the first write wins.
        let first = engine
            .apply_payment(
                &client,
                Money::from(500),
                Money::ZERO,
                date,
                None,
            )
            .unwrap();
        let second = engine
            .apply_payment(&client, Money::from(200), Money::ZERO, date, None)
            .unwrap();

        store.save_client_if_unchanged(&first, version).unwrap();
        let stale = store.save_client_if_unchanged(&second, version);
        assert!(matches!(
            stale,
            Err(LedgerError::ConcurrentModification(_))
        ));

        // Retry after re-reading succeeds.
        let reloaded = store.load_active_clients().unwrap();
        let version = store.version_of(&client.id).unwrap();
        let retried = engine
            .apply_payment(&reloaded[0], Money::from(200), Money::ZERO, date, None)
            .unwrap();
        store.save_client_if_unchanged(&retried, version).unwrap();

        let final_state = store.load_active_clients().unwrap();
        assert_eq!(final_state[0].total_paid, Money::from(700));
    }

    #[test]
    fn test_stale_write_after_archive_is_rejected() {
        let engine = LedgerEngine::default();
        let mut store = MemoryStore::new();
        let client = sample_client("Juan Pérez");
        let id = client.id.clone();
        store.save_client(&client).unwrap();

        let stale_version = store.version_of(&id).unwrap();
        let date = LedgerDate::from_str("01/11/2025").unwrap();
        let payment = engine
            .apply_payment(&client, Money::from(500), Money::ZERO, date, None)
            .unwrap();

        // The client is archived under the writer's feet; its stale write
        // must not resurrect it into the active set.
        store.archive_client(&id, Utc::now()).unwrap();
        let stale = store.save_client_if_unchanged(&payment, stale_version);
        assert!(matches!(
            stale,
            Err(LedgerError::ConcurrentModification(_))
        ));
        assert!(store.load_active_clients().unwrap().is_empty());
        assert_eq!(store.load_archived_clients().unwrap().len(), 1);

        // Restoring bumps again, so the pre-archive version stays stale.
        store.restore_client(&id).unwrap();
        let still_stale = store.save_client_if_unchanged(&payment, stale_version);
        assert!(matches!(
            still_stale,
            Err(LedgerError::ConcurrentModification(_))
        ));

        // A fresh read-modify-write succeeds.
        let version = store.version_of(&id).unwrap();
        store.save_client_if_unchanged(&payment, version).unwrap();
        let active = store.load_active_clients().unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].total_paid, Money::from(500));
    }

    #[test]
    fn test_json_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("ledger.json"));

        assert!(store.load_active_clients().unwrap().is_empty());
        assert!(store.load_archived_clients().unwrap().is_empty());
    }

    #[test]
    fn test_json_store_round_trips_document() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("ledger.json"));
        let client = sample_client("Juan Pérez");

        store.save_client(&client).unwrap();
        let loaded = store.load_active_clients().unwrap();
        assert_eq!(loaded, vec![client]);
    }

    #[test]
    fn test_json_store_archive_restore_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("ledger.json"));
        let client = sample_client("Juan Pérez");
        let id = client.id.clone();

        store.save_client(&client).unwrap();
        store.archive_client(&id, Utc::now()).unwrap();

        let archived = store.load_archived_clients().unwrap();
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].client, client);

        store.restore_client(&id).unwrap();
        assert_eq!(store.load_active_clients().unwrap(), vec![client]);
    }
}
