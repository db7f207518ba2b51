//! Output formatting for CLI commands.

use experience_core::{Activity, ExperienceError, RegistrationRecord};
use serde::Serialize;
use tabled::{Table, Tabled};

/// One line of `list`.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct RegistrationRow {
    #[tabled(rename = "ID")]
    pub id: u64,
    #[tabled(rename = "Registered")]
    pub registered: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Email")]
    pub email: String,
    #[tabled(rename = "Company")]
    pub company: String,
    #[tabled(rename = "CHRO")]
    pub chro: String,
    #[tabled(rename = "Exec Member")]
    pub exec_member: String,
    #[tabled(rename = "Activities")]
    pub activities: usize,
}

impl From<&RegistrationRecord> for RegistrationRow {
    fn from(record: &RegistrationRecord) -> Self {
        let registration = &record.registration;
        Self {
            id: record.id.0,
            registered: record.created_at.format("%Y-%m-%d %H:%M").to_string(),
            name: registration.contact.full_name(),
            email: registration.contact.email.clone(),
            company: registration.contact.company.clone(),
            chro: registration.profile.is_chro().label().to_string(),
            exec_member: registration.profile.is_exec_member().label().to_string(),
            activities: registration.activities.len(),
        }
    }
}

/// One catalog entry.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct ActivityRow {
    #[tabled(rename = "Key")]
    pub id: String,
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Time")]
    pub time: String,
    #[tabled(rename = "Activity")]
    pub name: String,
}

impl From<&Activity> for ActivityRow {
    fn from(activity: &Activity) -> Self {
        Self {
            id: activity.id.to_string(),
            date: activity.day.date_label().to_string(),
            time: activity.time.to_string(),
            name: activity.name.to_string(),
        }
    }
}

/// Print rows as a table, or as JSON in JSON mode.
pub fn print_rows<T: Serialize + Tabled>(rows: Vec<T>, json_mode: bool) -> Result<(), ExperienceError> {
    if json_mode {
        return print_json(&rows);
    }
    if rows.is_empty() {
        println!("No results");
    } else {
        println!("{}", Table::new(rows));
    }
    Ok(())
}

/// Pretty-print any serializable value.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), ExperienceError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| ExperienceError::Serialization(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

pub fn print_success(message: &str) {
    println!("✓ {}", message);
}

pub fn print_warning(message: &str) {
    println!("⚠ {}", message);
}
