//! # Formats Module
//!
//! Interchange formats for registrations.
//!
//! - `legacy`: lenient import of rows from the previous relational table
//! - JSON export/import of stored records (this module)
//!
//! File I/O operations are in the app layer.

pub mod legacy;

pub use legacy::{LegacyImport, LegacyRow, parse_legacy_rows};

use crate::primitives::MAX_IMPORT_ROWS;
use crate::{ExperienceError, RegistrationRecord};
use serde::{Deserialize, Serialize};

/// Envelope written by `export_records`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordExport {
    pub version: u8,
    pub registrations: Vec<RegistrationRecord>,
}

/// Current version of the export envelope.
pub const EXPORT_VERSION: u8 = 1;

/// Serialize records as pretty JSON.
pub fn export_records(records: &[RegistrationRecord]) -> Result<String, ExperienceError> {
    let export = RecordExport {
        version: EXPORT_VERSION,
        registrations: records.to_vec(),
    };
    serde_json::to_string_pretty(&export).map_err(|e| ExperienceError::Serialization(e.to_string()))
}

/// Read records written by `export_records`.
pub fn import_records(json: &str) -> Result<Vec<RegistrationRecord>, ExperienceError> {
    let export: RecordExport =
        serde_json::from_str(json).map_err(|e| ExperienceError::Serialization(e.to_string()))?;
    if export.version != EXPORT_VERSION {
        return Err(ExperienceError::Serialization(format!(
            "Unsupported export version: {} (expected {})",
            export.version, EXPORT_VERSION
        )));
    }
    if export.registrations.len() > MAX_IMPORT_ROWS {
        return Err(ExperienceError::InvalidInput(format!(
            "Too many records: {} (max {})",
            export.registrations.len(),
            MAX_IMPORT_ROWS
        )));
    }
    Ok(export.registrations)
}
