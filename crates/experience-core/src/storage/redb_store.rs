//! # redb-backed Registration Storage
//!
//! A disk-backed registration store using the redb embedded database.
//!
//! Records are stored as a one-byte format version followed by the
//! postcard encoding of the `RegistrationRecord`. The id counter lives in a
//! metadata table and is advanced in the same transaction as the insert, so
//! ids are never reused, even across restarts and deletes.

use super::{RegistrationStore, sort_newest_first};
use crate::primitives::RECORD_FORMAT_VERSION;
use crate::{ExperienceError, Registration, RegistrationId, RegistrationRecord};
use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::path::Path;

/// Table for records: RegistrationId(u64) -> versioned record bytes
const REGISTRATIONS: TableDefinition<u64, &[u8]> = TableDefinition::new("registrations");

/// Table for metadata: key string -> value u64
const METADATA: TableDefinition<&str, u64> = TableDefinition::new("metadata");

const NEXT_ID_KEY: &str = "next_id";

fn storage_error(e: impl std::fmt::Display) -> ExperienceError {
    ExperienceError::Storage(e.to_string())
}

fn encode_record(record: &RegistrationRecord) -> Result<Vec<u8>, ExperienceError> {
    let mut bytes = vec![RECORD_FORMAT_VERSION];
    let payload = postcard::to_allocvec(record)
        .map_err(|e| ExperienceError::Serialization(e.to_string()))?;
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

fn decode_record(bytes: &[u8]) -> Result<RegistrationRecord, ExperienceError> {
    match bytes.split_first() {
        Some((&version, payload)) if version == RECORD_FORMAT_VERSION => {
            postcard::from_bytes(payload).map_err(|e| ExperienceError::Serialization(e.to_string()))
        }
        Some((&version, _)) => Err(ExperienceError::Serialization(format!(
            "Unsupported record version: {} (expected {})",
            version, RECORD_FORMAT_VERSION
        ))),
        None => Err(ExperienceError::Serialization(
            "Empty record".to_string(),
        )),
    }
}

/// A disk-backed registration store using redb.
pub struct RedbStore {
    db: Database,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a registration database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ExperienceError> {
        let db = Database::create(path.as_ref()).map_err(storage_error)?;

        // Initialize tables if they don't exist
        {
            let write_txn = db.begin_write().map_err(storage_error)?;
            let _ = write_txn.open_table(REGISTRATIONS).map_err(storage_error)?;
            let _ = write_txn.open_table(METADATA).map_err(storage_error)?;
            write_txn.commit().map_err(storage_error)?;
        }

        Ok(Self { db })
    }
}

impl RegistrationStore for RedbStore {
    fn create(
        &mut self,
        registration: Registration,
        created_at: DateTime<Utc>,
    ) -> Result<RegistrationRecord, ExperienceError> {
        let write_txn = self.db.begin_write().map_err(storage_error)?;
        let record = {
            let mut metadata = write_txn.open_table(METADATA).map_err(storage_error)?;
            let next_id = metadata
                .get(NEXT_ID_KEY)
                .map_err(storage_error)?
                .map(|v| v.value())
                .unwrap_or(0)
                .saturating_add(1);
            metadata
                .insert(NEXT_ID_KEY, next_id)
                .map_err(storage_error)?;

            let record = RegistrationRecord {
                id: RegistrationId(next_id),
                created_at,
                registration,
            };
            let bytes = encode_record(&record)?;
            let mut table = write_txn.open_table(REGISTRATIONS).map_err(storage_error)?;
            table
                .insert(next_id, bytes.as_slice())
                .map_err(storage_error)?;
            record
        };
        write_txn.commit().map_err(storage_error)?;
        Ok(record)
    }

    fn get(&self, id: RegistrationId) -> Result<RegistrationRecord, ExperienceError> {
        let read_txn = self.db.begin_read().map_err(storage_error)?;
        let table = read_txn.open_table(REGISTRATIONS).map_err(storage_error)?;
        let guard = table
            .get(id.0)
            .map_err(storage_error)?
            .ok_or(ExperienceError::NotFound(id))?;
        decode_record(guard.value())
    }

    fn list(&self) -> Result<Vec<RegistrationRecord>, ExperienceError> {
        let read_txn = self.db.begin_read().map_err(storage_error)?;
        let table = read_txn.open_table(REGISTRATIONS).map_err(storage_error)?;

        let mut records = Vec::new();
        for entry in table.iter().map_err(storage_error)? {
            let (_, value) = entry.map_err(storage_error)?;
            records.push(decode_record(value.value())?);
        }
        sort_newest_first(&mut records);
        Ok(records)
    }

    fn update(
        &mut self,
        id: RegistrationId,
        registration: Registration,
    ) -> Result<RegistrationRecord, ExperienceError> {
        let write_txn = self.db.begin_write().map_err(storage_error)?;
        let record = {
            let mut table = write_txn.open_table(REGISTRATIONS).map_err(storage_error)?;
            let existing = match table.get(id.0).map_err(storage_error)? {
                Some(guard) => decode_record(guard.value())?,
                None => return Err(ExperienceError::NotFound(id)),
            };
            let record = RegistrationRecord {
                registration,
                ..existing
            };
            let bytes = encode_record(&record)?;
            table
                .insert(id.0, bytes.as_slice())
                .map_err(storage_error)?;
            record
        };
        write_txn.commit().map_err(storage_error)?;
        Ok(record)
    }

    fn delete(&mut self, id: RegistrationId) -> Result<(), ExperienceError> {
        let write_txn = self.db.begin_write().map_err(storage_error)?;
        let removed = {
            let mut table = write_txn.open_table(REGISTRATIONS).map_err(storage_error)?;
            table.remove(id.0).map_err(storage_error)?.is_some()
        };
        if !removed {
            return Err(ExperienceError::NotFound(id));
        }
        write_txn.commit().map_err(storage_error)?;
        Ok(())
    }

    fn count(&self) -> Result<usize, ExperienceError> {
        let read_txn = self.db.begin_read().map_err(storage_error)?;
        let table = read_txn.open_table(REGISTRATIONS).map_err(storage_error)?;
        let len = table.len().map_err(storage_error)?;
        Ok(len as usize)
    }
}
