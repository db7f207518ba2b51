//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::output::{
    ActivityRow, RegistrationRow, print_json, print_rows, print_success, print_warning,
};
use super::prompts;
use crate::api::{self, CalendarResponse, check_text_lengths};
use crate::config::{Config, StorageConfig};
use crate::crm;
use chrono::Utc;
use experience_core::{
    ActivityId, Answer, CompanySize, ExperienceError, RegistrantProfile, Registration,
    RegistrationId, RegistrationRecord, Registry, Wizard, activity, activity_display_string,
    activity_event, catalog, compute_steps, eligible_activities, export_records,
    has_lounge_access, import_records, parse_legacy_rows,
};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum file size for imports (50 MB).
const MAX_IMPORT_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Maximum file size for a single-registration update (1 MB).
const MAX_UPDATE_FILE_SIZE: u64 = 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), ExperienceError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| ExperienceError::Io(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(ExperienceError::InvalidInput(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Canonicalize an input path and make sure it is a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, ExperienceError> {
    let canonical = path.canonicalize().map_err(|e| {
        ExperienceError::Io(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(ExperienceError::Io(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Resolve an output path against its canonical parent directory.
fn validate_output_path(path: &Path) -> Result<PathBuf, ExperienceError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        ExperienceError::Io(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(ExperienceError::Io(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| ExperienceError::Io("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

/// Read a whole input file after path and size checks.
fn read_input(path: &Path, max_size: u64) -> Result<String, ExperienceError> {
    let path = validate_file_path(path)?;
    validate_file_size(&path, max_size)?;
    std::fs::read_to_string(&path)
        .map_err(|e| ExperienceError::Io(format!("Cannot read '{}': {}", path.display(), e)))
}

fn write_output(path: &Path, contents: &str) -> Result<PathBuf, ExperienceError> {
    let path = validate_output_path(path)?;
    std::fs::write(&path, contents)
        .map_err(|e| ExperienceError::Io(format!("Cannot write '{}': {}", path.display(), e)))?;
    Ok(path)
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(config: Config) -> Result<(), ExperienceError> {
    let registry = open_registry(&config.storage)?;

    println!("Executive Experience Registration Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", config.server.host);
    println!("  Port:     {}", config.server.port);
    println!("  Backend:  {}", config.storage.backend);
    println!("  Database: {}", config.storage.database.display());
    println!(
        "  Admin:    {}",
        if config.admin_key().is_some() {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!(
        "  CRM sync: {}",
        if config.crm.access_token.is_some() {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!();
    println!("Endpoints:");
    println!("  GET  /health              - Health check");
    println!("  GET  /activities          - Activity catalog");
    println!("  POST /eligibility         - Activities for a profile");
    println!("  POST /register            - Submit a registration");
    println!("  GET  /registration/{{id}}   - Confirmation summary");
    println!("  GET  /calendar/{{activity}} - Calendar export");
    println!("  *    /admin/registrations - Staff access (Bearer key)");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    api::run_server(registry, config).await
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show store status.
pub fn cmd_status(config: &Config, json_mode: bool) -> Result<(), ExperienceError> {
    let registry = open_registry(&config.storage)?;
    let count = registry.count()?;

    if json_mode {
        return print_json(&serde_json::json!({
            "database": config.storage.database.to_string_lossy(),
            "backend": config.storage.backend,
            "persistent": registry.is_persistent(),
            "registrations": count,
            "activities": catalog().len(),
        }));
    }

    println!("Executive Experience Status");
    println!("===========================");
    println!("Database:      {}", config.storage.database.display());
    println!("Backend:       {}", config.storage.backend);
    println!();
    println!("Registrations: {}", count);
    println!("Activities:    {}", catalog().len());
    Ok(())
}

// =============================================================================
// REGISTER COMMAND
// =============================================================================

/// Walk a registrant through the wizard and store the result.
pub async fn cmd_register(config: &Config, json_mode: bool) -> Result<(), ExperienceError> {
    let mut registry = open_registry(&config.storage)?;
    let mut wizard = Wizard::new();

    let stored = submit_until_stored(&mut wizard, prompts::run_wizard, |registration| {
        registry.register(registration)
    })?;
    let Some(record) = stored else {
        print_warning("Registration cancelled");
        return Ok(());
    };

    let sync = crm::from_config(&config.crm);
    crm::sync_best_effort(sync.as_ref(), &record).await;

    if json_mode {
        return print_json(&record);
    }

    print_success(&format!("Registered #{}", record.id));
    for id in record.registration.activities.selected() {
        let selected = activity(id);
        println!("  - {}", activity_display_string(selected));
        if let Some(event) = activity_event(selected) {
            println!("    Google:  {}", event.google_calendar_url());
            println!("    Outlook: {}", event.outlook_url());
        }
    }
    Ok(())
}

/// Drive the wizard until a submission is stored or the registrant cancels.
///
/// A failed save is reported and the registrant is returned to the review
/// step with every answer intact, free to submit again or cancel.
fn submit_until_stored(
    wizard: &mut Wizard,
    mut drive: impl FnMut(&mut Wizard) -> Result<Option<Registration>, ExperienceError>,
    mut persist: impl FnMut(Registration) -> Result<RegistrationRecord, ExperienceError>,
) -> Result<Option<RegistrationRecord>, ExperienceError> {
    loop {
        let Some(registration) = drive(wizard)? else {
            return Ok(None);
        };
        match persist(registration) {
            Ok(record) => {
                wizard.finish_submission(Ok(record.id));
                return Ok(Some(record));
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to store registration");
                print_warning(&format!("Registration was not saved: {}", e));
                wizard.finish_submission(Err(e));
            }
        }
    }
}

// =============================================================================
// CATALOG COMMANDS
// =============================================================================

/// Show the activity catalog.
pub fn cmd_activities(json_mode: bool) -> Result<(), ExperienceError> {
    let rows: Vec<ActivityRow> = catalog().iter().map(ActivityRow::from).collect();
    print_rows(rows, json_mode)
}

/// Show what a set of answers unlocks.
pub fn cmd_eligibility(
    chro: Option<bool>,
    company_size: Option<CompanySize>,
    exec_member: Option<bool>,
    json_mode: bool,
) -> Result<(), ExperienceError> {
    let mut profile = RegistrantProfile::new()
        .with_chro(Answer::from(chro))
        .with_exec_member(Answer::from(exec_member));
    if let Some(size) = company_size {
        if !profile.is_chro().is_yes() {
            print_warning("--company-size only applies with --chro true; ignored");
        }
        profile = profile.with_company_size(size);
    }

    let offered = eligible_activities(&profile);
    let steps = compute_steps(&profile);
    let lounge = has_lounge_access(&profile);

    if json_mode {
        return print_json(&serde_json::json!({
            "profile": profile,
            "activities": offered.iter().map(|a| a.id).collect::<Vec<ActivityId>>(),
            "lounge_access": lounge,
            "steps": steps,
        }));
    }

    let step_names: Vec<String> = steps.iter().map(|s| s.to_string()).collect();
    println!("Steps:         {}", step_names.join(" > "));
    println!("Lounge access: {}", if lounge { "yes" } else { "no" });
    println!();
    print_rows(offered.into_iter().map(ActivityRow::from).collect(), false)
}

// =============================================================================
// ADMIN COMMANDS
// =============================================================================

/// List registrations, newest first.
pub fn cmd_list(
    config: &Config,
    limit: Option<usize>,
    json_mode: bool,
) -> Result<(), ExperienceError> {
    let registry = open_registry(&config.storage)?;
    let mut records = registry.list()?;
    if let Some(limit) = limit {
        records.truncate(limit);
    }

    if json_mode {
        return print_json(&records);
    }
    print_rows(records.iter().map(RegistrationRow::from).collect(), false)
}

/// Show one registration with every stored answer.
pub fn cmd_show(config: &Config, id: u64, json_mode: bool) -> Result<(), ExperienceError> {
    let registry = open_registry(&config.storage)?;
    let record = registry.get(RegistrationId(id))?;

    if json_mode {
        return print_json(&record);
    }

    println!("Registration #{} ({})", record.id, record.created_at.to_rfc3339());
    println!();
    prompts::print_review(&record.registration.to_form());
    Ok(())
}

/// Replace a registration with the contents of a JSON file.
pub fn cmd_update(config: &Config, id: u64, file: &Path) -> Result<(), ExperienceError> {
    let json = read_input(file, MAX_UPDATE_FILE_SIZE)?;
    let registration: Registration =
        serde_json::from_str(&json).map_err(|e| ExperienceError::Serialization(e.to_string()))?;
    check_text_lengths(&registration.to_form())?;

    let mut registry = open_registry(&config.storage)?;
    let record = registry.update(RegistrationId(id), registration)?;
    print_success(&format!("Updated registration #{}", record.id));
    Ok(())
}

/// Delete a registration, asking first unless `yes` is set.
pub fn cmd_delete(config: &Config, id: u64, yes: bool) -> Result<(), ExperienceError> {
    let mut registry = open_registry(&config.storage)?;
    let record = registry.get(RegistrationId(id))?;

    let prompt = format!(
        "Delete registration #{} ({} <{}>)?",
        record.id,
        record.registration.contact.full_name(),
        record.registration.contact.email
    );
    if !yes && !prompts::confirm(&prompt) {
        print_warning("Delete cancelled");
        return Ok(());
    }

    registry.delete(record.id)?;
    print_success(&format!("Deleted registration #{}", record.id));
    Ok(())
}

// =============================================================================
// IMPORT / EXPORT COMMANDS
// =============================================================================

/// Import registrations. Every imported row gets a new id.
pub fn cmd_import(
    config: &Config,
    input: &Path,
    format: &str,
    json_mode: bool,
) -> Result<(), ExperienceError> {
    let data = read_input(input, MAX_IMPORT_FILE_SIZE)?;
    let mut registry = open_registry(&config.storage)?;

    let (imported, skipped) = match format {
        "legacy" => {
            let import = parse_legacy_rows(&data)?;
            let mut imported = 0usize;
            for row in import.rows {
                let created_at = row.created_at.unwrap_or_else(Utc::now);
                let record = registry.register_at(row.registration, created_at)?;
                if let Some(legacy_id) = row.legacy_id {
                    tracing::debug!(legacy_id, registration_id = record.id.0, "Imported row");
                }
                imported += 1;
            }
            (imported, import.skipped)
        }
        "json" => {
            let records = import_records(&data)?;
            let total = records.len();
            for record in records {
                registry.register_at(record.registration, record.created_at)?;
            }
            (total, 0)
        }
        other => {
            return Err(ExperienceError::InvalidInput(format!(
                "Unknown import format: {} (expected legacy or json)",
                other
            )));
        }
    };

    if json_mode {
        return print_json(&serde_json::json!({
            "imported": imported,
            "skipped": skipped,
        }));
    }
    print_success(&format!("Imported {} registrations", imported));
    if skipped > 0 {
        print_warning(&format!("Skipped {} rows that were not objects", skipped));
    }
    Ok(())
}

/// Export every registration as JSON.
pub fn cmd_export(config: &Config, output: &Path) -> Result<(), ExperienceError> {
    let registry = open_registry(&config.storage)?;
    let records = registry.list()?;
    let json = export_records(&records)?;
    let path = write_output(output, &json)?;
    print_success(&format!(
        "Exported {} registrations to {}",
        records.len(),
        path.display()
    ));
    Ok(())
}

// =============================================================================
// CALENDAR COMMAND
// =============================================================================

/// Write the `.ics` file for an activity and print the calendar links.
pub fn cmd_calendar(
    activity_key: &str,
    output: Option<&Path>,
    json_mode: bool,
) -> Result<(), ExperienceError> {
    let id: ActivityId = activity_key.parse()?;
    let event = activity_event(activity(id)).ok_or_else(|| {
        ExperienceError::InvalidInput(format!("No calendar event for {}", id))
    })?;

    let target = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(event.file_name()));
    let path = write_output(&target, &event.to_ics())?;

    if json_mode {
        return print_json(&CalendarResponse::success(event));
    }
    print_success(&format!("Wrote {}", path.display()));
    println!("Google:  {}", event.google_calendar_url());
    println!("Outlook: {}", event.outlook_url());
    Ok(())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize a new empty database.
pub fn cmd_init(config: &Config, force: bool) -> Result<(), ExperienceError> {
    let storage = &config.storage;
    if storage.backend != "redb" {
        print_warning("The memory backend has no database to initialize");
        return Ok(());
    }

    let path = &storage.database;
    if path.exists() {
        if !force {
            return Err(ExperienceError::InvalidInput(
                "Database already exists. Use --force to overwrite.".to_string(),
            ));
        }
        std::fs::remove_file(path).map_err(|e| {
            ExperienceError::Io(format!("Cannot remove '{}': {}", path.display(), e))
        })?;
    }

    let _registry = Registry::with_redb(path)?;
    print_success(&format!("Initialized new database at {}", path.display()));
    Ok(())
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Open the store named by the storage configuration.
pub fn open_registry(storage: &StorageConfig) -> Result<Registry, ExperienceError> {
    match storage.backend.as_str() {
        "redb" => Registry::with_redb(&storage.database),
        "memory" => Ok(Registry::new()),
        other => Err(ExperienceError::InvalidInput(format!(
            "Unknown storage backend: {} (expected redb or memory)",
            other
        ))),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn redb_config(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.storage.database = dir.path().join("registrations.redb");
        config
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let storage = StorageConfig {
            backend: "sqlite".to_string(),
            ..StorageConfig::default()
        };
        assert!(open_registry(&storage).is_err());
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let dir = TempDir::new().expect("tempdir");
        let config = redb_config(&dir);

        cmd_init(&config, false).expect("first init");
        assert!(cmd_init(&config, false).is_err());
        cmd_init(&config, true).expect("forced init");
    }

    #[test]
    fn legacy_import_then_export() {
        let dir = TempDir::new().expect("tempdir");
        let config = redb_config(&dir);
        let input = dir.path().join("legacy.json");
        std::fs::write(
            &input,
            r#"[
                {"id": 7, "first_name": "Robin", "last_name": "Hale",
                 "email": "robin@hale.test", "company": "Hale", "title": "CHRO",
                 "is_chro": false, "is_exec_member": true,
                 "vip_dinner_tue": true, "staying_at_wynn": false,
                 "created_at": "2025-11-02T10:00:00Z"},
                "not a row"
            ]"#,
        )
        .expect("write input");

        cmd_import(&config, &input, "legacy", true).expect("import");

        let registry = open_registry(&config.storage).expect("open");
        let records = registry.list().expect("list");
        assert_eq!(records.len(), 1);
        assert!(
            records[0]
                .registration
                .activities
                .is_selected(ActivityId::VipDinnerTue)
        );
        drop(registry);

        let output = dir.path().join("export.json");
        cmd_export(&config, &output).expect("export");
        let exported = std::fs::read_to_string(&output).expect("read export");
        assert_eq!(import_records(&exported).expect("parse").len(), 1);
    }

    #[test]
    fn unknown_import_format_is_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let config = redb_config(&dir);
        let input = dir.path().join("rows.csv");
        std::fs::write(&input, "id,email\n").expect("write");
        assert!(cmd_import(&config, &input, "csv", false).is_err());
    }

    #[test]
    fn calendar_writes_ics_file() {
        let dir = TempDir::new().expect("tempdir");
        let target = dir.path().join("dinner.ics");
        cmd_calendar("vip_dinner_tue", Some(&target), true).expect("calendar");
        let ics = std::fs::read_to_string(&target).expect("read");
        assert!(ics.starts_with("BEGIN:VCALENDAR"));
        assert!(cmd_calendar("brunch_thu", Some(&target), true).is_err());
    }

    #[test]
    fn oversized_update_file_is_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let file = dir.path().join("huge.json");
        let bytes = usize::try_from(MAX_UPDATE_FILE_SIZE).unwrap_or(usize::MAX) + 1;
        std::fs::write(&file, vec![b' '; bytes]).expect("write");
        assert!(read_input(&file, MAX_UPDATE_FILE_SIZE).is_err());
    }

    fn complete_wizard() -> Wizard {
        let form = experience_core::RegistrationForm::new()
            .with_contact(experience_core::ContactInfo {
                first_name: "Kim".to_string(),
                last_name: "Park".to_string(),
                email: "kim@park.test".to_string(),
                company: "Park Labs".to_string(),
                title: "COO".to_string(),
            })
            .with_profile(
                RegistrantProfile::new()
                    .with_chro(Answer::No)
                    .with_exec_member(Answer::Yes),
            )
            .with_logistics(experience_core::Logistics {
                staying_at_venue: Answer::No,
                ..experience_core::Logistics::default()
            });
        let mut wizard = Wizard::with_form(form);
        assert!(wizard.go_to_step(experience_core::StepId::Review));
        wizard
    }

    #[test]
    fn failed_save_returns_to_review_and_resubmits() {
        let mut wizard = complete_wizard();
        let original = wizard.form().clone();
        let mut registry = Registry::new();
        let mut reviews = 0;
        let mut attempts = 0;

        let stored = submit_until_stored(
            &mut wizard,
            |w| {
                reviews += 1;
                if reviews == 2 {
                    assert!(matches!(
                        w.submission(),
                        experience_core::Submission::Failed(_)
                    ));
                    assert_eq!(w.current_step(), experience_core::StepId::Review);
                    assert_eq!(w.form(), &original);
                }
                Ok(w.begin_submission())
            },
            |registration| {
                attempts += 1;
                if attempts == 1 {
                    return Err(ExperienceError::Storage("disk full".to_string()));
                }
                registry.register(registration)
            },
        )
        .expect("submit")
        .expect("stored");

        assert_eq!(reviews, 2);
        assert_eq!(
            wizard.submission(),
            &experience_core::Submission::Accepted(stored.id)
        );
        assert_eq!(registry.count().expect("count"), 1);
    }

    #[test]
    fn cancel_after_failed_save_stores_nothing() {
        let mut wizard = complete_wizard();
        let mut reviews = 0;

        let stored = submit_until_stored(
            &mut wizard,
            |w| {
                reviews += 1;
                Ok(if reviews == 1 { w.begin_submission() } else { None })
            },
            |_| Err(ExperienceError::Storage("offline".to_string())),
        )
        .expect("submit");

        assert!(stored.is_none());
        assert!(matches!(
            wizard.submission(),
            experience_core::Submission::Failed(_)
        ));
    }

    #[test]
    fn output_path_without_directory_uses_cwd() {
        let resolved = validate_output_path(Path::new("event.ics")).expect("path");
        assert_eq!(resolved.file_name(), Some(std::ffi::OsStr::new("event.ics")));
    }
}
