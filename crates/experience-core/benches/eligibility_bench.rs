//! # Eligibility Benchmarks
//!
//! Performance benchmarks for experience-core rule evaluation.
//!
//! Run with: `cargo bench -p experience-core`

use criterion::{Criterion, criterion_group, criterion_main};
use experience_core::{
    Answer, CompanySize, RegistrantProfile, RegistrationForm, compute_steps, eligible_activities,
    first_incomplete_step,
};
use std::hint::black_box;

fn profiles() -> Vec<RegistrantProfile> {
    let answers = [Answer::Yes, Answer::No, Answer::Unknown];
    let mut profiles = Vec::new();
    for chro in answers {
        for member in answers {
            let base = RegistrantProfile::new()
                .with_chro(chro)
                .with_exec_member(member);
            profiles.push(base);
            profiles.push(base.with_company_size(CompanySize::Under5000));
            profiles.push(base.with_company_size(CompanySize::From5000));
        }
    }
    profiles
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_eligible_activities(c: &mut Criterion) {
    let profiles = profiles();
    c.bench_function("eligible_activities/all_profiles", |b| {
        b.iter(|| {
            for profile in &profiles {
                black_box(eligible_activities(black_box(profile)));
            }
        });
    });
}

fn bench_step_gating(c: &mut Criterion) {
    let profiles = profiles();
    c.bench_function("compute_steps/all_profiles", |b| {
        b.iter(|| {
            for profile in &profiles {
                black_box(compute_steps(black_box(profile)));
            }
        });
    });

    let forms: Vec<RegistrationForm> = profiles
        .iter()
        .map(|p| RegistrationForm::new().with_profile(*p))
        .collect();
    c.bench_function("first_incomplete_step/all_profiles", |b| {
        b.iter(|| {
            for form in &forms {
                black_box(first_incomplete_step(black_box(form)));
            }
        });
    });
}

criterion_group!(benches, bench_eligible_activities, bench_step_gating);
criterion_main!(benches);
