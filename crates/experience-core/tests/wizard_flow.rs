//! # Wizard Flow Tests
//!
//! End-to-end passes through the registration wizard, from the welcome
//! step to an accepted submission in a real store.

#![allow(clippy::panic)]

use chrono::NaiveDate;
use experience_core::{
    ActivityId, Answer, ChroTrackDetail, CompanyPresence, CompanySize, CompanySizeBracket,
    CompanyType, ContactInfo, DietaryRestriction, Logistics, RegistrantProfile, Registry,
    SessionGoal, StepId, Submission, Wizard,
};

fn contact(email: &str) -> ContactInfo {
    ContactInfo {
        first_name: "Morgan".to_string(),
        last_name: "Lee".to_string(),
        email: email.to_string(),
        company: "Acme".to_string(),
        title: "Chief People Officer".to_string(),
    }
}

fn track() -> ChroTrackDetail {
    ChroTrackDetail {
        size_bracket: Some(CompanySizeBracket::From2000To4999),
        presence: Some(CompanyPresence::Global),
        company_type: Some(CompanyType::InTransition),
        biggest_challenge: "Retention during the IPO".to_string(),
        win_to_share: "Manager training".to_string(),
        session_goals: [SessionGoal::SharedChallenges, SessionGoal::LearnFromPeers]
            .into_iter()
            .collect(),
    }
}

/// Walk forward until the wizard reaches `target` or refuses to move.
fn advance_to(wizard: &mut Wizard, target: StepId) {
    while wizard.current_step() < target {
        assert!(wizard.next(), "blocked on {}", wizard.current_step());
    }
}

#[test]
fn growth_chro_registers_end_to_end() {
    let mut registry = Registry::new();
    let mut wizard = Wizard::new();

    assert!(wizard.next());
    wizard.update(|form| form.with_contact(contact("morgan@acme.test")));
    assert!(wizard.next());

    wizard.update(|form| {
        form.with_profile(
            RegistrantProfile::new()
                .with_chro(Answer::Yes)
                .with_company_size(CompanySize::Under5000)
                .with_exec_member(Answer::No),
        )
    });
    assert_eq!(wizard.steps().len(), 7);
    assert!(wizard.next());
    assert_eq!(wizard.current_step(), StepId::ChroTrack);

    wizard.update(|form| form.with_chro_track(track()));
    assert!(wizard.next());

    wizard.update(|form| {
        form.with_activity(ActivityId::ChroTrackSessionTue, true)
            .with_activity(ActivityId::ExecutiveBreakfastWed, true)
    });
    assert!(wizard.next());
    assert_eq!(wizard.current_step(), StepId::Logistics);

    wizard.update(|form| {
        form.with_logistics(Logistics {
            staying_at_venue: Answer::Yes,
            check_in_date: NaiveDate::from_ymd_opt(2026, 3, 22),
            check_out_date: None,
            dietary_restrictions: [DietaryRestriction::GlutenFree].into_iter().collect(),
            dietary_other: String::new(),
        })
    });
    assert!(!wizard.next(), "check-out date still missing");

    wizard.update(|mut form| {
        form.logistics.check_out_date = NaiveDate::from_ymd_opt(2026, 3, 25);
        form
    });
    assert!(wizard.next());
    assert_eq!(wizard.current_step(), StepId::Review);
    assert_eq!(wizard.progress(), (6, 7));

    let state = wizard
        .submit_with(|registration| registry.register(registration).map(|record| record.id))
        .clone();
    let Submission::Accepted(id) = state else {
        panic!("submission not accepted: {:?}", state);
    };

    let stored = registry.get(id).expect("stored");
    assert_eq!(stored.registration.chro_track, Some(track()));
    assert_eq!(stored.registration.activities.len(), 2);
    assert_eq!(
        stored.registration.logistics.check_out_date,
        NaiveDate::from_ymd_opt(2026, 3, 25)
    );
}

#[test]
fn declining_chro_from_review_drops_track_and_chro_events() {
    let mut wizard = Wizard::new();
    wizard.update(|form| {
        form.with_contact(contact("dana@acme.test"))
            .with_profile(
                RegistrantProfile::new()
                    .with_chro(Answer::Yes)
                    .with_company_size(CompanySize::Under5000)
                    .with_exec_member(Answer::Yes),
            )
            .with_chro_track(track())
            .with_activity(ActivityId::ChroTrackSessionTue, true)
            .with_activity(ActivityId::ExecMemberLunchTue, true)
            .with_logistics(Logistics {
                staying_at_venue: Answer::No,
                ..Logistics::default()
            })
    });
    advance_to(&mut wizard, StepId::Review);

    assert!(wizard.go_to_step(StepId::Qualification));
    wizard.update(|form| {
        let profile = form.profile.with_chro(Answer::No);
        form.with_profile(profile)
    });
    assert!(!wizard.steps().contains(&StepId::ChroTrack));
    // The answers are still held while the step is hidden.
    assert!(wizard.form().chro_track.is_complete());

    advance_to(&mut wizard, StepId::Review);
    let registration = wizard.begin_submission().expect("submittable");

    assert_eq!(registration.chro_track, None);
    assert!(!registration.activities.is_selected(ActivityId::ChroTrackSessionTue));
    assert!(registration.activities.is_selected(ActivityId::ExecMemberLunchTue));
}

#[test]
fn enterprise_chro_skips_track_step() {
    let mut wizard = Wizard::new();
    wizard.update(|form| {
        form.with_contact(contact("kai@bigco.test")).with_profile(
            RegistrantProfile::new()
                .with_chro(Answer::Yes)
                .with_company_size(CompanySize::From5000)
                .with_exec_member(Answer::No),
        )
    });
    advance_to(&mut wizard, StepId::Qualification);
    assert!(wizard.next());
    assert_eq!(wizard.current_step(), StepId::Activities);
    assert!(wizard.previous());
    assert_eq!(wizard.current_step(), StepId::Qualification);
}

#[test]
fn unanswered_exec_member_blocks_qualification() {
    let mut wizard = Wizard::new();
    wizard.update(|form| {
        form.with_contact(contact("ari@acme.test"))
            .with_profile(RegistrantProfile::new().with_chro(Answer::No))
    });
    advance_to(&mut wizard, StepId::Qualification);
    assert!(!wizard.next());
    assert_eq!(wizard.current_step(), StepId::Qualification);
}
