//! # Eligibility Engine
//!
//! Maps a registrant's qualification answers to the activities they may
//! select and to their lounge access.
//!
//! Pure and total: no side effects, no error cases. An `Unknown` answer
//! simply fails every predicate that needs a definite value.

use crate::catalog::{self, Activity};
use crate::{ActivityId, ActivitySelections, RegistrantProfile};

/// Activities `profile` may select, in catalog order.
///
/// Every predicate is evaluated independently; there is no early exit.
#[must_use]
pub fn eligible_activities(profile: &RegistrantProfile) -> Vec<&'static Activity> {
    catalog::catalog()
        .iter()
        .filter(|activity| activity.is_eligible(profile))
        .collect()
}

/// Whether `profile` may select the activity `id`.
#[must_use]
pub fn is_eligible(id: ActivityId, profile: &RegistrantProfile) -> bool {
    catalog::activity(id).is_eligible(profile)
}

/// Automatic lounge access: a CHRO or an Exec Member.
///
/// Independent of activity selection.
#[must_use]
pub fn has_lounge_access(profile: &RegistrantProfile) -> bool {
    profile.is_chro().is_yes() || profile.is_exec_member().is_yes()
}

/// Drop selections `profile` is not eligible for.
#[must_use]
pub fn prune_ineligible(
    selections: &ActivitySelections,
    profile: &RegistrantProfile,
) -> ActivitySelections {
    selections.clone().retain(|id| is_eligible(id, profile))
}
