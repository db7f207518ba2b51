//! # Registration Wizard
//!
//! A step state machine over a `RegistrationForm`.
//!
//! The step sequence is not stored: `compute_steps` derives it from the
//! current profile on every navigation decision, so changing an answer on
//! the qualification step can insert or remove the CHRO Track step even after
//! the registrant has moved past it.
//!
//! ## Transitions
//!
//! - `next`: advance one position, only if the current step is complete
//! - `previous`: go back one position, always allowed after the first step
//! - `go_to_step`: jump to any step in the current sequence without
//!   re-validating (used by the review screen's edit links)
//!
//! ## Revalidation policy
//!
//! Jumping back and changing an answer can leave later answers stale.
//! Every forward transition (`next`, and `go_to_step` to a later step) drops
//! activity selections the current profile is no longer eligible for. CHRO
//! Track answers are kept in the form while hidden and are left out of the
//! finalized registration.

use crate::eligibility;
use crate::{ExperienceError, RegistrantProfile, Registration, RegistrationForm, RegistrationId};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// STEPS
// =============================================================================

/// A wizard step, in canonical order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    #[default]
    Welcome,
    Contact,
    Qualification,
    ChroTrack,
    Activities,
    Logistics,
    Review,
}

impl StepId {
    /// Heading shown for the step.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Welcome => "Welcome",
            Self::Contact => "Contact Information",
            Self::Qualification => "Tell Us More",
            Self::ChroTrack => "Build Your Experience",
            Self::Activities => "Select Activities",
            Self::Logistics => "Logistics",
            Self::Review => "Review & Submit",
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self {
            Self::Welcome => "welcome",
            Self::Contact => "contact",
            Self::Qualification => "qualification",
            Self::ChroTrack => "chro_track",
            Self::Activities => "activities",
            Self::Logistics => "logistics",
            Self::Review => "review",
        };
        f.write_str(key)
    }
}

/// The step sequence for `profile`.
///
/// `ChroTrack` is included iff the registrant is a CHRO at a company under
/// 5,000 employees.
#[must_use]
pub fn compute_steps(profile: &RegistrantProfile) -> Vec<StepId> {
    let mut steps = vec![StepId::Welcome, StepId::Contact, StepId::Qualification];
    if profile.is_growth_chro() {
        steps.push(StepId::ChroTrack);
    }
    steps.extend([StepId::Activities, StepId::Logistics, StepId::Review]);
    steps
}

/// Completeness predicate that must hold to advance past `step`.
#[must_use]
pub fn can_advance(step: StepId, form: &RegistrationForm) -> bool {
    match step {
        StepId::Welcome | StepId::Activities | StepId::Review => true,
        StepId::Contact => form.contact.is_complete(),
        StepId::Qualification => {
            let profile = &form.profile;
            profile.is_chro().is_answered()
                && profile.is_exec_member().is_answered()
                && (profile.is_chro().is_no() || profile.company_size().is_some())
        }
        StepId::ChroTrack => form.chro_track.is_complete(),
        StepId::Logistics => form.logistics.is_complete(),
    }
}

/// First step of the current sequence whose predicate fails, if any.
#[must_use]
pub fn first_incomplete_step(form: &RegistrationForm) -> Option<StepId> {
    compute_steps(&form.profile)
        .into_iter()
        .find(|step| !can_advance(*step, form))
}

/// Check a whole form against every step it would pass through.
pub fn validate(form: &RegistrationForm) -> Result<(), ExperienceError> {
    match first_incomplete_step(form) {
        Some(step) => Err(ExperienceError::Incomplete(step)),
        None => Ok(()),
    }
}

// =============================================================================
// SUBMISSION STATE
// =============================================================================

/// Where the wizard stands with respect to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Submission {
    /// Nothing sent yet.
    #[default]
    Idle,
    /// A submission is outstanding; further submits are refused.
    InFlight,
    /// The last attempt failed; the registrant is still on the review step.
    Failed(String),
    /// Stored under the given id. Terminal.
    Accepted(RegistrationId),
}

// =============================================================================
// WIZARD
// =============================================================================

/// One registrant's pass through the steps.
#[derive(Debug, Clone, Default)]
pub struct Wizard {
    current: StepId,
    form: RegistrationForm,
    submission: Submission,
}

impl Wizard {
    /// Start on the welcome step with an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume with an existing form (e.g. an admin re-opening a record).
    #[must_use]
    pub fn with_form(form: RegistrationForm) -> Self {
        Self {
            form,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn current_step(&self) -> StepId {
        self.current
    }

    #[must_use]
    pub fn form(&self) -> &RegistrationForm {
        &self.form
    }

    #[must_use]
    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    /// The sequence as it stands for the current answers.
    #[must_use]
    pub fn steps(&self) -> Vec<StepId> {
        compute_steps(&self.form.profile)
    }

    /// Zero-based position and total length, for progress display.
    ///
    /// On a step that has left the sequence this is the position of the
    /// step `next` would move to.
    #[must_use]
    pub fn progress(&self) -> (usize, usize) {
        let steps = self.steps();
        let position = steps.iter().filter(|s| **s < self.current).count();
        (position, steps.len())
    }

    /// Whether the current step's predicate holds.
    ///
    /// A step that has left the sequence (the CHRO track after the profile
    /// changed) no longer gates anything.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        !self.steps().contains(&self.current) || can_advance(self.current, &self.form)
    }

    /// Replace the form wholesale with `f(form)`.
    ///
    /// Editing is refused while a submission is in flight or accepted.
    pub fn update(&mut self, f: impl FnOnce(RegistrationForm) -> RegistrationForm) -> bool {
        if !self.is_editable() {
            return false;
        }
        let form = std::mem::take(&mut self.form);
        self.form = f(form);
        true
    }

    /// Advance one step. Returns `false` (and stays put) if blocked.
    pub fn next(&mut self) -> bool {
        if !self.is_editable() || !self.can_advance() {
            return false;
        }
        let current = self.current;
        match self.steps().into_iter().find(|s| *s > current) {
            Some(step) => {
                self.move_forward(step);
                true
            }
            None => false,
        }
    }

    /// Go back one step. Returns `false` on the first step.
    pub fn previous(&mut self) -> bool {
        if !self.is_editable() {
            return false;
        }
        let current = self.current;
        match self.steps().into_iter().rev().find(|s| *s < current) {
            Some(step) => {
                self.current = step;
                true
            }
            None => false,
        }
    }

    /// Jump to `step` without validating the steps in between.
    ///
    /// Returns `false` if `step` is not part of the current sequence.
    pub fn go_to_step(&mut self, step: StepId) -> bool {
        if !self.is_editable() || !self.steps().contains(&step) {
            return false;
        }
        if step > self.current {
            self.move_forward(step);
        } else {
            self.current = step;
        }
        true
    }

    /// Hand out the registration to persist.
    ///
    /// Only on the review step, only when every step is complete, and only
    /// once at a time: returns `None` while a submission is in flight or
    /// after it was accepted.
    pub fn begin_submission(&mut self) -> Option<Registration> {
        if self.current != StepId::Review || !self.is_editable() {
            return None;
        }
        if let Err(e) = validate(&self.form) {
            self.submission = Submission::Failed(e.to_string());
            return None;
        }
        self.submission = Submission::InFlight;
        Some(self.form.finalize())
    }

    /// Record the collaborator's answer for the outstanding submission.
    pub fn finish_submission(&mut self, result: Result<RegistrationId, ExperienceError>) {
        if self.submission != Submission::InFlight {
            return;
        }
        self.submission = match result {
            Ok(id) => Submission::Accepted(id),
            Err(e) => Submission::Failed(e.to_string()),
        };
    }

    /// Submit through a synchronous collaborator.
    pub fn submit_with(
        &mut self,
        persist: impl FnOnce(Registration) -> Result<RegistrationId, ExperienceError>,
    ) -> &Submission {
        if let Some(registration) = self.begin_submission() {
            let result = persist(registration);
            self.finish_submission(result);
        }
        &self.submission
    }

    fn is_editable(&self) -> bool {
        !matches!(
            self.submission,
            Submission::InFlight | Submission::Accepted(_)
        )
    }

    fn move_forward(&mut self, step: StepId) {
        let pruned = eligibility::prune_ineligible(&self.form.activities, &self.form.profile);
        self.form.activities = pruned;
        self.current = step;
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ActivityId, Answer, ChroTrackDetail, CompanyPresence, CompanySize, CompanySizeBracket,
        CompanyType, ContactInfo, Logistics, SessionGoal,
    };
    use chrono::NaiveDate;

    fn contact() -> ContactInfo {
        ContactInfo {
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            email: "grace@example.com".to_string(),
            company: "Navy".to_string(),
            title: "CPO".to_string(),
        }
    }

    fn growth_chro() -> RegistrantProfile {
        RegistrantProfile::new()
            .with_chro(Answer::Yes)
            .with_company_size(CompanySize::Under5000)
            .with_exec_member(Answer::No)
    }

    fn track() -> ChroTrackDetail {
        ChroTrackDetail {
            size_bracket: Some(CompanySizeBracket::Under500),
            presence: Some(CompanyPresence::UsOnly),
            company_type: Some(CompanyType::Public),
            biggest_challenge: "Hiring".to_string(),
            win_to_share: "Onboarding".to_string(),
            session_goals: [SessionGoal::TopicDeepDives].into_iter().collect(),
        }
    }

    fn not_staying() -> Logistics {
        Logistics {
            staying_at_venue: Answer::No,
            ..Logistics::default()
        }
    }

    #[test]
    fn chro_track_step_follows_profile() {
        assert!(compute_steps(&growth_chro()).contains(&StepId::ChroTrack));
        assert!(!compute_steps(&RegistrantProfile::new()).contains(&StepId::ChroTrack));

        let enterprise = growth_chro().with_company_size(CompanySize::From5000);
        assert_eq!(compute_steps(&enterprise).len(), 6);
    }

    #[test]
    fn logistics_gate_needs_both_dates() {
        let mut form = RegistrationForm::new().with_logistics(Logistics {
            staying_at_venue: Answer::Yes,
            ..Logistics::default()
        });
        assert!(!can_advance(StepId::Logistics, &form));

        form.logistics.check_in_date = NaiveDate::from_ymd_opt(2026, 3, 22);
        assert!(!can_advance(StepId::Logistics, &form));

        form.logistics.check_out_date = NaiveDate::from_ymd_opt(2026, 3, 25);
        assert!(can_advance(StepId::Logistics, &form));
    }

    #[test]
    fn qualification_gate_needs_size_only_for_chro() {
        let mut form = RegistrationForm::new();
        assert!(!can_advance(StepId::Qualification, &form));

        form.profile = RegistrantProfile::new()
            .with_chro(Answer::No)
            .with_exec_member(Answer::Yes);
        assert!(can_advance(StepId::Qualification, &form));

        form.profile = form.profile.with_chro(Answer::Yes);
        assert!(!can_advance(StepId::Qualification, &form));

        form.profile = form.profile.with_company_size(CompanySize::From5000);
        assert!(can_advance(StepId::Qualification, &form));
    }

    #[test]
    fn next_is_blocked_by_incomplete_step() {
        let mut wizard = Wizard::new();
        assert!(wizard.next());
        assert_eq!(wizard.current_step(), StepId::Contact);

        assert!(!wizard.next());
        assert_eq!(wizard.current_step(), StepId::Contact);

        wizard.update(|form| form.with_contact(contact()));
        assert!(wizard.next());
        assert_eq!(wizard.current_step(), StepId::Qualification);
    }

    #[test]
    fn previous_stops_at_first_step() {
        let mut wizard = Wizard::new();
        assert!(!wizard.previous());
        wizard.next();
        assert!(wizard.previous());
        assert_eq!(wizard.current_step(), StepId::Welcome);
    }

    #[test]
    fn growth_chro_walks_through_track() {
        let mut wizard = Wizard::new();
        wizard.update(|form| form.with_contact(contact()).with_profile(growth_chro()));
        wizard.next();
        wizard.next();
        assert!(wizard.next());
        assert_eq!(wizard.current_step(), StepId::ChroTrack);

        assert!(!wizard.next());
        wizard.update(|form| form.with_chro_track(track()));
        assert!(wizard.next());
        assert_eq!(wizard.current_step(), StepId::Activities);
    }

    #[test]
    fn go_to_step_rejects_steps_outside_sequence() {
        let mut wizard = Wizard::new();
        assert!(!wizard.go_to_step(StepId::ChroTrack));
        assert!(wizard.go_to_step(StepId::Review));
        assert_eq!(wizard.current_step(), StepId::Review);
    }

    #[test]
    fn editing_back_from_review_prunes_on_return() {
        let enterprise = RegistrantProfile::new()
            .with_chro(Answer::Yes)
            .with_company_size(CompanySize::From5000)
            .with_exec_member(Answer::No);

        let mut wizard = Wizard::new();
        wizard.update(|form| {
            form.with_contact(contact())
                .with_profile(enterprise)
                .with_activity(ActivityId::SponsoredDinnerMon, true)
                .with_activity(ActivityId::ExecChambersWed, true)
                .with_logistics(not_staying())
        });
        assert!(wizard.go_to_step(StepId::Review));

        assert!(wizard.go_to_step(StepId::Qualification));
        wizard.update(|form| {
            let profile = form.profile.with_chro(Answer::No);
            form.with_profile(profile)
        });
        // Stale until the registrant moves forward again.
        assert!(wizard.form().activities.is_selected(ActivityId::SponsoredDinnerMon));

        assert!(wizard.next());
        assert_eq!(wizard.current_step(), StepId::Activities);
        assert!(!wizard.form().activities.is_selected(ActivityId::SponsoredDinnerMon));
        assert!(wizard.form().activities.is_selected(ActivityId::ExecChambersWed));
    }

    #[test]
    fn hidden_track_step_keeps_its_answers() {
        let mut wizard = Wizard::new();
        wizard.update(|form| form.with_profile(growth_chro()).with_chro_track(track()));
        assert!(wizard.steps().contains(&StepId::ChroTrack));

        wizard.update(|form| {
            let profile = form.profile.with_chro(Answer::No);
            form.with_profile(profile)
        });
        assert!(!wizard.steps().contains(&StepId::ChroTrack));
        assert_eq!(wizard.form().chro_track, track());
        assert_eq!(wizard.form().profile.company_size(), None);
    }

    #[test]
    fn next_leaves_track_step_removed_under_it() {
        let mut wizard = Wizard::new();
        wizard.update(|form| form.with_contact(contact()).with_profile(growth_chro()));
        wizard.next();
        wizard.next();
        assert!(wizard.next());
        assert_eq!(wizard.current_step(), StepId::ChroTrack);

        wizard.update(|form| {
            let profile = form.profile.with_chro(Answer::No);
            form.with_profile(profile)
        });
        assert!(!wizard.steps().contains(&StepId::ChroTrack));
        assert_eq!(wizard.progress(), (3, 6));
        assert!(wizard.can_advance());

        assert!(wizard.next());
        assert_eq!(wizard.current_step(), StepId::Activities);
        assert_eq!(wizard.progress(), (3, 6));
    }

    #[test]
    fn previous_from_removed_track_step_returns_to_qualification() {
        let mut wizard = Wizard::new();
        wizard.update(|form| form.with_contact(contact()).with_profile(growth_chro()));
        wizard.go_to_step(StepId::ChroTrack);
        wizard.update(|form| {
            let profile = form.profile.with_company_size(CompanySize::From5000);
            form.with_profile(profile)
        });

        assert!(wizard.previous());
        assert_eq!(wizard.current_step(), StepId::Qualification);
    }

    #[test]
    fn failed_submission_stays_on_review() {
        let mut wizard = Wizard::with_form(
            RegistrationForm::new()
                .with_contact(contact())
                .with_profile(
                    RegistrantProfile::new()
                        .with_chro(Answer::No)
                        .with_exec_member(Answer::No),
                )
                .with_logistics(not_staying()),
        );
        wizard.go_to_step(StepId::Review);

        let state = wizard
            .submit_with(|_| Err(ExperienceError::Storage("offline".to_string())))
            .clone();
        assert!(matches!(state, Submission::Failed(_)));
        assert_eq!(wizard.current_step(), StepId::Review);

        let state = wizard.submit_with(|_| Ok(RegistrationId(12))).clone();
        assert_eq!(state, Submission::Accepted(RegistrationId(12)));
        assert!(wizard.begin_submission().is_none());
        assert!(!wizard.previous());
    }

    #[test]
    fn submission_refused_while_in_flight() {
        let mut wizard = Wizard::with_form(
            RegistrationForm::new()
                .with_contact(contact())
                .with_profile(
                    RegistrantProfile::new()
                        .with_chro(Answer::No)
                        .with_exec_member(Answer::Yes),
                )
                .with_logistics(not_staying()),
        );
        wizard.go_to_step(StepId::Review);

        assert!(wizard.begin_submission().is_some());
        assert!(wizard.begin_submission().is_none());
        assert!(!wizard.update(|form| form));
        wizard.finish_submission(Ok(RegistrationId(1)));
        assert_eq!(wizard.submission(), &Submission::Accepted(RegistrationId(1)));
    }

    #[test]
    fn incomplete_form_cannot_be_submitted() {
        let mut wizard = Wizard::new();
        wizard.go_to_step(StepId::Review);
        assert!(wizard.begin_submission().is_none());
        assert!(matches!(wizard.submission(), Submission::Failed(_)));
    }

    #[test]
    fn validate_names_first_failing_step() {
        let form = RegistrationForm::new().with_contact(contact());
        assert!(matches!(
            validate(&form),
            Err(ExperienceError::Incomplete(StepId::Qualification))
        ));
    }
}
