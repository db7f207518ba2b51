//! # Registration Storage
//!
//! The persistence collaborator behind registration submission and the
//! admin surface.
//!
//! ## Storage Backends
//!
//! - `InMemory`: `MemoryStore`, volatile, used by tests and `--backend memory`
//! - `Persistent`: `RedbStore`, disk-backed ACID storage
//!
//! Both assign ids from a monotonically increasing counter that is never
//! reused, and both list records newest first.

mod redb_store;

pub use redb_store::RedbStore;

use crate::{ExperienceError, Registration, RegistrationId, RegistrationRecord};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::Path;

// =============================================================================
// STORE TRAIT
// =============================================================================

/// Operations every registration store supports.
///
/// Lookups of a missing id return `ExperienceError::NotFound`, which callers
/// must keep distinguishable from backend failures.
pub trait RegistrationStore {
    /// Persist `registration` under a fresh id.
    fn create(
        &mut self,
        registration: Registration,
        created_at: DateTime<Utc>,
    ) -> Result<RegistrationRecord, ExperienceError>;

    /// Fetch one record.
    fn get(&self, id: RegistrationId) -> Result<RegistrationRecord, ExperienceError>;

    /// All records, newest first.
    fn list(&self) -> Result<Vec<RegistrationRecord>, ExperienceError>;

    /// Replace the editable fields of a record. Id and creation time are kept.
    fn update(
        &mut self,
        id: RegistrationId,
        registration: Registration,
    ) -> Result<RegistrationRecord, ExperienceError>;

    /// Remove a record.
    fn delete(&mut self, id: RegistrationId) -> Result<(), ExperienceError>;

    /// Number of stored records.
    fn count(&self) -> Result<usize, ExperienceError>;
}

/// Newest first; ties broken by id so the order is total.
pub(crate) fn sort_newest_first(records: &mut [RegistrationRecord]) {
    records.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// Volatile store backed by a `BTreeMap`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: BTreeMap<RegistrationId, RegistrationRecord>,
    next_id: u64,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RegistrationStore for MemoryStore {
    fn create(
        &mut self,
        registration: Registration,
        created_at: DateTime<Utc>,
    ) -> Result<RegistrationRecord, ExperienceError> {
        self.next_id = self.next_id.saturating_add(1);
        let record = RegistrationRecord {
            id: RegistrationId(self.next_id),
            created_at,
            registration,
        };
        self.records.insert(record.id, record.clone());
        Ok(record)
    }

    fn get(&self, id: RegistrationId) -> Result<RegistrationRecord, ExperienceError> {
        self.records
            .get(&id)
            .cloned()
            .ok_or(ExperienceError::NotFound(id))
    }

    fn list(&self) -> Result<Vec<RegistrationRecord>, ExperienceError> {
        let mut records: Vec<_> = self.records.values().cloned().collect();
        sort_newest_first(&mut records);
        Ok(records)
    }

    fn update(
        &mut self,
        id: RegistrationId,
        registration: Registration,
    ) -> Result<RegistrationRecord, ExperienceError> {
        let record = self
            .records
            .get_mut(&id)
            .ok_or(ExperienceError::NotFound(id))?;
        record.registration = registration;
        Ok(record.clone())
    }

    fn delete(&mut self, id: RegistrationId) -> Result<(), ExperienceError> {
        self.records
            .remove(&id)
            .map(|_| ())
            .ok_or(ExperienceError::NotFound(id))
    }

    fn count(&self) -> Result<usize, ExperienceError> {
        Ok(self.records.len())
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Storage backend for a `Registry`.
#[derive(Debug)]
enum StorageBackend {
    /// In-memory map (fast, volatile).
    InMemory(MemoryStore),
    /// Disk-backed store using redb (ACID, persistent).
    Persistent(RedbStore),
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::InMemory(MemoryStore::new())
    }
}

// NOTE: StorageBackend does NOT implement Clone.
// RedbStore owns the database handle.

/// The registration registry shared by the server and the CLI.
#[derive(Debug, Default)]
pub struct Registry {
    backend: StorageBackend,
}

impl Registry {
    /// Create an empty in-memory registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open or create a persistent registry at `path`.
    pub fn with_redb(path: impl AsRef<Path>) -> Result<Self, ExperienceError> {
        Ok(Self {
            backend: StorageBackend::Persistent(RedbStore::open(path)?),
        })
    }

    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, StorageBackend::Persistent(_))
    }

    fn store(&self) -> &dyn RegistrationStore {
        match &self.backend {
            StorageBackend::InMemory(store) => store,
            StorageBackend::Persistent(store) => store,
        }
    }

    fn store_mut(&mut self) -> &mut dyn RegistrationStore {
        match &mut self.backend {
            StorageBackend::InMemory(store) => store,
            StorageBackend::Persistent(store) => store,
        }
    }

    /// Store a new registration stamped with the current time.
    pub fn register(
        &mut self,
        registration: Registration,
    ) -> Result<RegistrationRecord, ExperienceError> {
        self.store_mut().create(registration, Utc::now())
    }

    /// Store a registration with an explicit creation time (imports).
    pub fn register_at(
        &mut self,
        registration: Registration,
        created_at: DateTime<Utc>,
    ) -> Result<RegistrationRecord, ExperienceError> {
        self.store_mut().create(registration, created_at)
    }

    pub fn get(&self, id: RegistrationId) -> Result<RegistrationRecord, ExperienceError> {
        self.store().get(id)
    }

    pub fn list(&self) -> Result<Vec<RegistrationRecord>, ExperienceError> {
        self.store().list()
    }

    pub fn update(
        &mut self,
        id: RegistrationId,
        registration: Registration,
    ) -> Result<RegistrationRecord, ExperienceError> {
        self.store_mut().update(id, registration)
    }

    pub fn delete(&mut self, id: RegistrationId) -> Result<(), ExperienceError> {
        self.store_mut().delete(id)
    }

    pub fn count(&self) -> Result<usize, ExperienceError> {
        self.store().count()
    }
}

// =============================================================================
// TESTS
// =============================================================================
