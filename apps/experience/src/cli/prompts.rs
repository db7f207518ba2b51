//! Interactive terminal registration.
//!
//! Drives the core `Wizard` one step at a time with `dialoguer` prompts.
//! The wizard owns every gating decision; this module only collects answers
//! and renders them.

use super::output::print_warning;
use chrono::NaiveDate;
use dialoguer::{Confirm, Input, MultiSelect, Select};
use experience_core::{
    Answer, ChroTrackDetail, CompanyPresence, CompanySize, CompanySizeBracket, CompanyType,
    ContactInfo, DietaryRestriction, ExperienceError, Logistics, RegistrationForm, Registration,
    SessionGoal, StepId, Submission, Wizard, activity, activity_display_string, eligible_activities,
    has_lounge_access,
};

fn prompt_err(e: dialoguer::Error) -> ExperienceError {
    ExperienceError::Io(format!("Prompt failed: {}", e))
}

// =============================================================================
// WIZARD LOOP
// =============================================================================

/// What the registrant chose on the review step.
enum ReviewAction {
    Submit,
    Edit(StepId),
    Cancel,
}

/// Run the wizard until the registrant submits or cancels.
///
/// Returns the finalized registration with the wizard left `InFlight`; the
/// caller persists it and reports back through `finish_submission`.
pub fn run_wizard(wizard: &mut Wizard) -> Result<Option<Registration>, ExperienceError> {
    loop {
        let step = wizard.current_step();
        let (position, total) = wizard.progress();
        println!();
        println!("[{}/{}] {}", position + 1, total, step.title());
        println!("{}", "-".repeat(step.title().len() + 6));

        if step == StepId::Review {
            print_review(wizard.form());
            match prompt_review(wizard)? {
                ReviewAction::Submit => {
                    if let Some(registration) = wizard.begin_submission() {
                        return Ok(Some(registration));
                    }
                    if let Submission::Failed(reason) = wizard.submission() {
                        print_warning(reason);
                    }
                    if let Some(incomplete) = experience_core::first_incomplete_step(wizard.form())
                    {
                        wizard.go_to_step(incomplete);
                    }
                }
                ReviewAction::Edit(target) => {
                    wizard.go_to_step(target);
                }
                ReviewAction::Cancel => return Ok(None),
            }
            continue;
        }

        let form = wizard.form().clone();
        let edited = match step {
            StepId::Welcome => {
                println!("Register for the Executive Experience at Transform 2026.");
                println!("Answers decide which sessions, meals and lounges you are invited to.");
                form
            }
            StepId::Contact => {
                let contact = prompt_contact(&form.contact)?;
                form.with_contact(contact)
            }
            StepId::Qualification => prompt_qualification(form)?,
            StepId::ChroTrack => {
                let track = prompt_chro_track(&form.chro_track)?;
                form.with_chro_track(track)
            }
            StepId::Activities => prompt_activities(form)?,
            StepId::Logistics => {
                let logistics = prompt_logistics(&form.logistics)?;
                form.with_logistics(logistics)
            }
            StepId::Review => form,
        };
        wizard.update(|_| edited);

        let back_allowed = step != StepId::Welcome;
        let items: &[&str] = if back_allowed {
            &["Continue", "Back", "Cancel"]
        } else {
            &["Continue", "Cancel"]
        };
        let choice = Select::new()
            .with_prompt("Next")
            .items(items)
            .default(0)
            .interact()
            .map_err(prompt_err)?;

        match items.get(choice).copied() {
            Some("Back") => {
                wizard.previous();
            }
            Some("Cancel") => return Ok(None),
            _ => {
                if !wizard.next() {
                    print_warning("Please complete the required answers before continuing.");
                }
            }
        }
    }
}

fn prompt_review(wizard: &Wizard) -> Result<ReviewAction, ExperienceError> {
    let steps: Vec<StepId> = wizard
        .steps()
        .into_iter()
        .filter(|s| !matches!(s, StepId::Welcome | StepId::Review))
        .collect();

    let mut items = vec!["Submit registration".to_string()];
    items.extend(steps.iter().map(|s| format!("Edit: {}", s.title())));
    items.push("Cancel".to_string());

    let choice = Select::new()
        .with_prompt("Ready?")
        .items(&items)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    Ok(match choice {
        0 => ReviewAction::Submit,
        n => match steps.get(n - 1) {
            Some(step) => ReviewAction::Edit(*step),
            None => ReviewAction::Cancel,
        },
    })
}

// =============================================================================
// STEP PROMPTS
// =============================================================================

fn text(prompt: &str, current: &str, allow_empty: bool) -> Result<String, ExperienceError> {
    let mut input = Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(allow_empty);
    if !current.is_empty() {
        input = input.with_initial_text(current);
    }
    input
        .interact_text()
        .map(|s| s.trim().to_string())
        .map_err(prompt_err)
}

fn yes_no(prompt: &str, current: Answer) -> Result<Answer, ExperienceError> {
    let default = if current.is_no() { 1 } else { 0 };
    let choice = Select::new()
        .with_prompt(prompt)
        .items(&["Yes", "No"])
        .default(default)
        .interact()
        .map_err(prompt_err)?;
    Ok(Answer::from(choice == 0))
}

fn pick<T: Copy + PartialEq>(
    prompt: &str,
    options: &[T],
    label: fn(T) -> &'static str,
    current: Option<T>,
) -> Result<T, ExperienceError> {
    let labels: Vec<&str> = options.iter().map(|o| label(*o)).collect();
    let default = current
        .and_then(|c| options.iter().position(|o| *o == c))
        .unwrap_or(0);
    let choice = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(default)
        .interact()
        .map_err(prompt_err)?;
    options
        .get(choice)
        .copied()
        .ok_or_else(|| ExperienceError::InvalidInput("No option selected".to_string()))
}

fn prompt_contact(current: &ContactInfo) -> Result<ContactInfo, ExperienceError> {
    Ok(ContactInfo {
        first_name: text("First name", &current.first_name, false)?,
        last_name: text("Last name", &current.last_name, false)?,
        email: text("Work email", &current.email, false)?,
        company: text("Company", &current.company, false)?,
        title: text("Title", &current.title, false)?,
    })
}

fn prompt_qualification(form: RegistrationForm) -> Result<RegistrationForm, ExperienceError> {
    let chro = yes_no("Are you a CHRO?", form.profile.is_chro())?;
    let mut profile = form.profile.with_chro(chro);

    if chro.is_yes() {
        let size = pick(
            "Company size",
            &[CompanySize::Under5000, CompanySize::From5000],
            |size| match size {
                CompanySize::Under5000 => "Under 5,000 employees",
                CompanySize::From5000 => "5,000+ employees",
            },
            profile.company_size(),
        )?;
        profile = profile.with_company_size(size);
    }

    let member = yes_no(
        "Are you a Transform Exec Member?",
        profile.is_exec_member(),
    )?;
    Ok(form.with_profile(profile.with_exec_member(member)))
}

fn prompt_chro_track(current: &ChroTrackDetail) -> Result<ChroTrackDetail, ExperienceError> {
    let size_bracket = pick(
        "Company size",
        &CompanySizeBracket::ALL,
        CompanySizeBracket::label,
        current.size_bracket,
    )?;
    let presence = pick(
        "Company presence",
        &CompanyPresence::ALL,
        CompanyPresence::label,
        current.presence,
    )?;
    let company_type = pick(
        "Company type",
        &CompanyType::ALL,
        CompanyType::label,
        current.company_type,
    )?;
    let biggest_challenge = text(
        "Your biggest people challenge right now",
        &current.biggest_challenge,
        false,
    )?;
    let win_to_share = text("A recent win you'd share", &current.win_to_share, false)?;

    let labels: Vec<&str> = SessionGoal::ALL.iter().map(|g| g.label()).collect();
    let defaults: Vec<bool> = SessionGoal::ALL
        .iter()
        .map(|g| current.session_goals.contains(g))
        .collect();
    let picked = MultiSelect::new()
        .with_prompt("What do you want from the sessions? (space to select)")
        .items(&labels)
        .defaults(&defaults)
        .interact()
        .map_err(prompt_err)?;

    Ok(ChroTrackDetail {
        size_bracket: Some(size_bracket),
        presence: Some(presence),
        company_type: Some(company_type),
        biggest_challenge,
        win_to_share,
        session_goals: picked
            .into_iter()
            .filter_map(|i| SessionGoal::ALL.get(i).copied())
            .collect(),
    })
}

fn prompt_activities(form: RegistrationForm) -> Result<RegistrationForm, ExperienceError> {
    let offered = eligible_activities(&form.profile);
    if has_lounge_access(&form.profile) {
        println!("You have automatic access to the executive lounge.");
    }

    let labels: Vec<String> = offered.iter().map(|a| activity_display_string(a)).collect();
    let defaults: Vec<bool> = offered
        .iter()
        .map(|a| form.activities.is_selected(a.id))
        .collect();
    let picked = MultiSelect::new()
        .with_prompt("Select activities (space to select, enter to confirm)")
        .items(&labels)
        .defaults(&defaults)
        .interact()
        .map_err(prompt_err)?;

    let form = offered
        .iter()
        .fold(form, |form, a| form.with_activity(a.id, false));
    Ok(picked
        .into_iter()
        .filter_map(|i| offered.get(i))
        .fold(form, |form, a| form.with_activity(a.id, true)))
}

fn date(prompt: &str, current: Option<NaiveDate>) -> Result<NaiveDate, ExperienceError> {
    let initial = current
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    let raw = Input::<String>::new()
        .with_prompt(prompt)
        .with_initial_text(initial)
        .validate_with(|input: &String| {
            NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
                .map(|_| ())
                .map_err(|_| "Use YYYY-MM-DD")
        })
        .interact_text()
        .map_err(prompt_err)?;
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| ExperienceError::InvalidInput(e.to_string()))
}

fn prompt_logistics(current: &Logistics) -> Result<Logistics, ExperienceError> {
    let staying = yes_no("Are you staying at the Wynn?", current.staying_at_venue)?;
    let (check_in_date, check_out_date) = if staying.is_yes() {
        (
            Some(date("Check-in date", current.check_in_date)?),
            Some(date("Check-out date", current.check_out_date)?),
        )
    } else {
        (current.check_in_date, current.check_out_date)
    };

    let labels: Vec<&str> = DietaryRestriction::ALL.iter().map(|d| d.label()).collect();
    let defaults: Vec<bool> = DietaryRestriction::ALL
        .iter()
        .map(|d| current.dietary_restrictions.contains(d))
        .collect();
    let picked = MultiSelect::new()
        .with_prompt("Dietary restrictions")
        .items(&labels)
        .defaults(&defaults)
        .interact()
        .map_err(prompt_err)?;
    let dietary_restrictions: std::collections::BTreeSet<DietaryRestriction> = picked
        .into_iter()
        .filter_map(|i| DietaryRestriction::ALL.get(i).copied())
        .collect();

    let dietary_other = if dietary_restrictions.contains(&DietaryRestriction::Other) {
        text("Please specify", &current.dietary_other, true)?
    } else {
        current.dietary_other.clone()
    };

    Ok(Logistics {
        staying_at_venue: staying,
        check_in_date,
        check_out_date,
        dietary_restrictions,
        dietary_other,
    })
}

// =============================================================================
// REVIEW
// =============================================================================

/// Render the answers that will be submitted.
pub fn print_review(form: &RegistrationForm) {
    let registration = form.finalize();
    let contact = &registration.contact;
    println!("Name:        {}", contact.full_name());
    println!("Email:       {}", contact.email);
    println!("Company:     {} ({})", contact.company, contact.title);
    println!("CHRO:        {}", registration.profile.is_chro().label());
    println!("Exec Member: {}", registration.profile.is_exec_member().label());
    if has_lounge_access(&registration.profile) {
        println!("Lounge:      Included");
    }
    if let Some(track) = &registration.chro_track {
        let goals: Vec<&str> = track.session_goals.iter().map(|g| g.label()).collect();
        println!("CHRO Track:  {}", goals.join("; "));
    }
    println!("Activities:");
    if registration.activities.is_empty() {
        println!("  (none)");
    }
    for id in registration.activities.selected() {
        println!("  - {}", activity_display_string(activity(id)));
    }
    let logistics = &registration.logistics;
    println!("Staying:     {}", logistics.staying_at_venue.label());
    if let (Some(check_in), Some(check_out)) = (logistics.check_in_date, logistics.check_out_date) {
        println!("Dates:       {} to {}", check_in, check_out);
    }
    println!("Dietary:     {}", logistics.dietary_summary());
}

/// Ask before a destructive action.
pub fn confirm(prompt: &str) -> bool {
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .unwrap_or(false)
}
