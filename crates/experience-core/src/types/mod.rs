//! # Core Type Definitions
//!
//! This module contains the answer set that drives every decision:
//! - Identifiers (`RegistrationId`, `ActivityId`)
//! - Qualification answers (`Answer`, `CompanySize`, `RegistrantProfile`)
//! - Registration payloads (`RegistrationForm`, `Registration`, `RegistrationRecord`)
//! - Error types (`ExperienceError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Implement `Ord` where they are used as keys in `BTreeMap`/`BTreeSet`
//! - Treat `Answer::Unknown` as neither branch of a yes/no question
//! - Are updated functionally: every update returns a new value

mod registration;

pub use registration::{
    ActivitySelections, ChroTrackDetail, CompanyPresence, CompanySizeBracket, CompanyType,
    ContactInfo, DietaryRestriction, Logistics, Registration, RegistrationForm,
    RegistrationRecord, SessionGoal,
};

use crate::wizard::StepId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Server-assigned identifier of a stored registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationId(pub u64);

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key of an entry in the fixed activity catalog.
///
/// Variants are declared in catalog order (day, then start time).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityId {
    AiAtWorkMon,
    ExecChambersMon,
    SponsoredDinnerMon,
    ExecMemberLunchTue,
    ChroExperienceLunchTue,
    ChroTrackSessionTue,
    ExecChambersTue,
    VipDinnerTue,
    ChroExperienceBreakfastWed,
    ExecutiveBreakfastWed,
    ExecChambersWed,
}

impl ActivityId {
    /// Every activity key, in catalog order.
    pub const ALL: [Self; 11] = [
        Self::AiAtWorkMon,
        Self::ExecChambersMon,
        Self::SponsoredDinnerMon,
        Self::ExecMemberLunchTue,
        Self::ChroExperienceLunchTue,
        Self::ChroTrackSessionTue,
        Self::ExecChambersTue,
        Self::VipDinnerTue,
        Self::ChroExperienceBreakfastWed,
        Self::ExecutiveBreakfastWed,
        Self::ExecChambersWed,
    ];

    /// Stable wire key (also the legacy column name).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AiAtWorkMon => "ai_at_work_mon",
            Self::ExecChambersMon => "exec_chambers_mon",
            Self::SponsoredDinnerMon => "sponsored_dinner_mon",
            Self::ExecMemberLunchTue => "exec_member_lunch_tue",
            Self::ChroExperienceLunchTue => "chro_experience_lunch_tue",
            Self::ChroTrackSessionTue => "chro_track_session_tue",
            Self::ExecChambersTue => "exec_chambers_tue",
            Self::VipDinnerTue => "vip_dinner_tue",
            Self::ChroExperienceBreakfastWed => "chro_experience_breakfast_wed",
            Self::ExecutiveBreakfastWed => "executive_breakfast_wed",
            Self::ExecChambersWed => "exec_chambers_wed",
        }
    }
}

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityId {
    type Err = ExperienceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| ExperienceError::InvalidInput(format!("Unknown activity: {}", s)))
    }
}

// =============================================================================
// QUALIFICATION ANSWERS
// =============================================================================

/// A yes/no question that may not have been answered yet.
///
/// Wire form is `true`, `false` or `null`. Predicates that need a definite
/// answer fail on `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum Answer {
    Yes,
    No,
    #[default]
    Unknown,
}

impl Answer {
    /// True only for a definite yes.
    #[must_use]
    pub const fn is_yes(self) -> bool {
        matches!(self, Self::Yes)
    }

    /// True only for a definite no.
    #[must_use]
    pub const fn is_no(self) -> bool {
        matches!(self, Self::No)
    }

    /// True once the question has been answered either way.
    #[must_use]
    pub const fn is_answered(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Label used in CRM properties and CLI output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
            Self::Unknown => "Not specified",
        }
    }
}

impl From<Option<bool>> for Answer {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::Yes,
            Some(false) => Self::No,
            None => Self::Unknown,
        }
    }
}

impl From<bool> for Answer {
    fn from(value: bool) -> Self {
        Self::from(Some(value))
    }
}

impl From<Answer> for Option<bool> {
    fn from(value: Answer) -> Self {
        match value {
            Answer::Yes => Some(true),
            Answer::No => Some(false),
            Answer::Unknown => None,
        }
    }
}

/// Company headcount band, only asked of CHROs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CompanySize {
    #[serde(rename = "under_5000")]
    Under5000,
    #[serde(rename = "5000_plus")]
    From5000,
}

impl CompanySize {
    /// Stable wire key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Under5000 => "under_5000",
            Self::From5000 => "5000_plus",
        }
    }
}

impl FromStr for CompanySize {
    type Err = ExperienceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "under_5000" => Ok(Self::Under5000),
            "5000_plus" => Ok(Self::From5000),
            other => Err(ExperienceError::InvalidInput(format!(
                "Unknown company size: {}",
                other
            ))),
        }
    }
}

// =============================================================================
// REGISTRANT PROFILE
// =============================================================================

/// The qualification answers that drive eligibility and step gating.
///
/// Invariant: `company_size` is `None` whenever `is_chro` is not `Yes`.
/// Fields are private so the invariant can only be reached through the
/// functional `with_*` updates, and deserialization goes through the same rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "ProfileWire")]
pub struct RegistrantProfile {
    is_chro: Answer,
    company_size: Option<CompanySize>,
    is_exec_member: Answer,
}

/// Unvalidated wire shape of a profile.
#[derive(Deserialize)]
struct ProfileWire {
    #[serde(default)]
    is_chro: Answer,
    #[serde(default)]
    company_size: Option<CompanySize>,
    #[serde(default)]
    is_exec_member: Answer,
}

impl From<ProfileWire> for RegistrantProfile {
    fn from(wire: ProfileWire) -> Self {
        let base = Self::new()
            .with_chro(wire.is_chro)
            .with_exec_member(wire.is_exec_member);
        match wire.company_size {
            Some(size) => base.with_company_size(size),
            None => base,
        }
    }
}

impl RegistrantProfile {
    /// The all-unknown profile.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            is_chro: Answer::Unknown,
            company_size: None,
            is_exec_member: Answer::Unknown,
        }
    }

    #[must_use]
    pub const fn is_chro(&self) -> Answer {
        self.is_chro
    }

    #[must_use]
    pub const fn company_size(&self) -> Option<CompanySize> {
        self.company_size
    }

    #[must_use]
    pub const fn is_exec_member(&self) -> Answer {
        self.is_exec_member
    }

    /// Answer the CHRO question.
    ///
    /// Anything other than `Yes` clears `company_size` in the same update.
    #[must_use]
    pub const fn with_chro(self, answer: Answer) -> Self {
        Self {
            is_chro: answer,
            company_size: if answer.is_yes() {
                self.company_size
            } else {
                None
            },
            is_exec_member: self.is_exec_member,
        }
    }

    /// Answer the company size question. Ignored unless `is_chro` is `Yes`.
    #[must_use]
    pub const fn with_company_size(self, size: CompanySize) -> Self {
        if !self.is_chro.is_yes() {
            return self;
        }
        Self {
            company_size: Some(size),
            ..self
        }
    }

    /// Answer the Exec Member question.
    #[must_use]
    pub const fn with_exec_member(self, answer: Answer) -> Self {
        Self {
            is_exec_member: answer,
            ..self
        }
    }

    /// CHRO at a company of 5,000 or more employees.
    #[must_use]
    pub const fn is_enterprise_chro(&self) -> bool {
        self.is_chro.is_yes() && matches!(self.company_size, Some(CompanySize::From5000))
    }

    /// CHRO at a company under 5,000 employees (the CHRO Track audience).
    #[must_use]
    pub const fn is_growth_chro(&self) -> bool {
        self.is_chro.is_yes() && matches!(self.company_size, Some(CompanySize::Under5000))
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the registration system.
///
/// Ineligibility and incompleteness of an in-progress form are expressed as
/// predicate results, never as errors. `Incomplete` is only produced when a
/// finished registration is validated at a boundary.
#[derive(Debug, Error)]
pub enum ExperienceError {
    /// The requested registration does not exist.
    #[error("Registration not found: {0}")]
    NotFound(RegistrationId),

    /// A submitted registration fails the completeness rule of a step.
    #[error("Incomplete answers for step: {0}")]
    Incomplete(StepId),

    /// Input that cannot be interpreted (unknown keys, malformed values).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The storage engine reported a failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),
}

impl ExperienceError {
    /// True for the "not found" case, which callers map to 404.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

// =============================================================================
// TESTS
// =============================================================================
