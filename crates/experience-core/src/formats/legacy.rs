//! # Legacy Row Import
//!
//! Reads registrations exported from the previous relational table: one
//! object per row, snake_case columns, one boolean column per activity.
//!
//! Rows are decoded leniently. The old table stored list columns either as
//! arrays or as JSON-encoded strings and dates either as `YYYY-MM-DD` or as
//! full timestamps, so:
//! - a malformed list decodes to empty
//! - a malformed date decodes to absent
//! - an unknown label or key is dropped
//!
//! Only a document that is not a JSON array of rows (or an object with a
//! `registrations` array) is an error.

use crate::primitives::MAX_IMPORT_ROWS;
use crate::{
    ActivityId, ActivitySelections, Answer, ChroTrackDetail, CompanySize, ContactInfo,
    DietaryRestriction, ExperienceError, Logistics, RegistrantProfile, Registration, SessionGoal,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// One decoded row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyRow {
    /// Id in the old table, kept for reporting only.
    pub legacy_id: Option<u64>,
    pub created_at: Option<DateTime<Utc>>,
    pub registration: Registration,
}

/// Result of decoding a legacy export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyImport {
    pub rows: Vec<LegacyRow>,
    /// Entries that were not objects.
    pub skipped: usize,
}

/// Decode a legacy export document.
pub fn parse_legacy_rows(json: &str) -> Result<LegacyImport, ExperienceError> {
    let document: Value =
        serde_json::from_str(json).map_err(|e| ExperienceError::Serialization(e.to_string()))?;

    let rows = match document {
        Value::Array(rows) => rows,
        Value::Object(mut wrapper) => match wrapper.remove("registrations") {
            Some(Value::Array(rows)) => rows,
            _ => {
                return Err(ExperienceError::InvalidInput(
                    "Expected a `registrations` array".to_string(),
                ));
            }
        },
        _ => {
            return Err(ExperienceError::InvalidInput(
                "Expected an array of registration rows".to_string(),
            ));
        }
    };

    if rows.len() > MAX_IMPORT_ROWS {
        return Err(ExperienceError::InvalidInput(format!(
            "Too many rows: {} (max {})",
            rows.len(),
            MAX_IMPORT_ROWS
        )));
    }

    let mut import = LegacyImport::default();
    for row in rows {
        match row {
            Value::Object(columns) => import.rows.push(decode_row(&columns)),
            _ => import.skipped += 1,
        }
    }
    Ok(import)
}

fn decode_row(row: &Map<String, Value>) -> LegacyRow {
    let profile = decode_profile(row);

    let chro_track = profile.is_growth_chro().then(|| ChroTrackDetail {
        size_bracket: key_enum(row.get("chro_track_company_size_detail")),
        presence: key_enum(row.get("chro_track_company_presence")),
        company_type: key_enum(row.get("chro_track_company_type")),
        biggest_challenge: text(row, "chro_track_biggest_challenge"),
        win_to_share: text(row, "chro_track_win_to_share"),
        session_goals: string_list(row.get("chro_track_session_goals"))
            .iter()
            .filter_map(|label| {
                SessionGoal::from_label(label).or_else(|| key_enum(Some(&Value::from(label.as_str()))))
            })
            .collect(),
    });

    let staying = row
        .get("staying_at_wynn")
        .or_else(|| row.get("staying_at_venue"));

    LegacyRow {
        legacy_id: row.get("id").and_then(Value::as_u64),
        created_at: row.get("created_at").and_then(timestamp),
        registration: Registration {
            contact: ContactInfo {
                first_name: text(row, "first_name"),
                last_name: text(row, "last_name"),
                email: text(row, "email"),
                company: text(row, "company"),
                title: text(row, "title"),
            },
            profile,
            chro_track,
            activities: decode_activities(row),
            logistics: Logistics {
                staying_at_venue: answer(staying),
                check_in_date: row.get("check_in_date").and_then(date),
                check_out_date: row.get("check_out_date").and_then(date),
                dietary_restrictions: string_list(row.get("dietary_restrictions"))
                    .iter()
                    .filter_map(|label| DietaryRestriction::from_label(label))
                    .collect(),
                dietary_other: text(row, "dietary_other"),
            },
        },
    }
}

fn decode_profile(row: &Map<String, Value>) -> RegistrantProfile {
    let profile = RegistrantProfile::new()
        .with_chro(answer(row.get("is_chro")))
        .with_exec_member(answer(row.get("is_exec_member")));
    match row
        .get("company_size")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<CompanySize>().ok())
    {
        Some(size) => profile.with_company_size(size),
        None => profile,
    }
}

/// Activity columns, plus the older `activities` object (camelCase keys)
/// when present.
fn decode_activities(row: &Map<String, Value>) -> ActivitySelections {
    let legacy_object = match row.get("activities") {
        Some(Value::Object(map)) => Some(map.clone()),
        Some(Value::String(raw)) => serde_json::from_str::<Map<String, Value>>(raw).ok(),
        _ => None,
    };

    ActivityId::ALL
        .into_iter()
        .filter(|id| {
            let column = row.get(id.as_str()).and_then(Value::as_bool);
            let legacy = legacy_object.as_ref().and_then(|map| {
                map.get(&camel_case(id.as_str()))
                    .or_else(|| map.get(id.as_str()))
                    .and_then(Value::as_bool)
            });
            column.or(legacy).unwrap_or(false)
        })
        .collect()
}

fn text(row: &Map<String, Value>, column: &str) -> String {
    row.get(column)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn answer(value: Option<&Value>) -> Answer {
    match value {
        Some(Value::Bool(b)) => Answer::from(*b),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" => Answer::Yes,
            "false" | "f" | "no" => Answer::No,
            _ => Answer::Unknown,
        },
        _ => Answer::Unknown,
    }
}

/// Decode a stored wire key (e.g. `"us_only"`) into its enum.
fn key_enum<T: DeserializeOwned>(value: Option<&Value>) -> Option<T> {
    value.and_then(|v| serde_json::from_value(v.clone()).ok())
}

/// An array of strings, or a JSON string encoding one. Anything else is empty.
fn string_list(value: Option<&Value>) -> Vec<String> {
    let items = match value {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::String(raw)) => serde_json::from_str::<Vec<Value>>(raw).unwrap_or_default(),
        _ => Vec::new(),
    };
    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

/// `YYYY-MM-DD`, or the UTC date of a full timestamp.
fn date(value: &Value) -> Option<NaiveDate> {
    let raw = value.as_str()?.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| timestamp(value).map(|ts| ts.date_naive()))
}

fn timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let raw = value.as_str()?.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn camel_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper = false;
    for c in snake.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
