//! # experience-core
//!
//! The registration engine for the Transform 2026 executive track - THE LOGIC.
//!
//! This crate decides, from a registrant's qualification answers:
//! - which optional activities they may select (`eligibility`)
//! - which wizard steps they pass through and when they may advance (`wizard`)
//! - whether they get automatic lounge access
//!
//! and holds the collaborators that need no network: calendar export,
//! redb-backed storage and the legacy import format.
//!
//! ## Architectural Constraints
//!
//! - Eligibility and step gating are pure functions of the answer set
//! - The activity catalog is compiled-in configuration, never mutated
//! - Has NO async, NO network dependencies (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod calendar;
pub mod catalog;
pub mod eligibility;
pub mod formats;
pub mod primitives;
pub mod storage;
pub mod types;
pub mod wizard;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    ActivityId, ActivitySelections, Answer, ChroTrackDetail, CompanyPresence, CompanySize,
    CompanySizeBracket, CompanyType, ContactInfo, DietaryRestriction, ExperienceError, Logistics,
    RegistrantProfile, Registration, RegistrationForm, RegistrationId, RegistrationRecord,
    SessionGoal,
};

// =============================================================================
// RE-EXPORTS: Rules and Wizard
// =============================================================================

pub use catalog::{Activity, Day, activity, catalog};
pub use eligibility::{eligible_activities, has_lounge_access, is_eligible, prune_ineligible};
pub use wizard::{StepId, Submission, Wizard, can_advance, compute_steps, first_incomplete_step};

// =============================================================================
// RE-EXPORTS: Collaborators
// =============================================================================

pub use calendar::{
    ActivitySlot, CalendarEvent, activity_display_string, activity_event,
    activity_to_calendar_event, parse_activity_string,
};
pub use formats::{LegacyImport, LegacyRow, export_records, import_records, parse_legacy_rows};
pub use storage::{MemoryStore, RedbStore, RegistrationStore, Registry};
