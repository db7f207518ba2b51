//! # Activity Catalog
//!
//! The fixed table of optional activities on the executive track.
//!
//! Entries are declared in day/start-time order and that order is the
//! presentation order everywhere; nothing re-sorts the catalog.
//!
//! Each entry carries its own eligibility predicate. Predicates are
//! independent of one another, with one deliberate coupling: the Executive
//! Breakfast is the exact negation of the CHRO Experience Breakfast, so
//! every registrant is offered exactly one Wednesday breakfast.

use crate::primitives::{EVENT_MONTH, EVENT_YEAR};
use crate::{ActivityId, RegistrantProfile};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Eligibility predicate of a catalog entry.
pub type Predicate = fn(&RegistrantProfile) -> bool;

/// Day of the executive track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
}

impl Day {
    /// Day of month in March 2026.
    #[must_use]
    pub const fn day_of_month(self) -> u32 {
        match self {
            Self::Monday => 23,
            Self::Tuesday => 24,
            Self::Wednesday => 25,
        }
    }

    /// Short date label, e.g. `"Mon, Mar 23"`.
    #[must_use]
    pub const fn date_label(self) -> &'static str {
        match self {
            Self::Monday => "Mon, Mar 23",
            Self::Tuesday => "Tue, Mar 24",
            Self::Wednesday => "Wed, Mar 25",
        }
    }

    #[must_use]
    pub fn date(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(EVENT_YEAR, EVENT_MONTH, self.day_of_month())
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
        };
        f.write_str(name)
    }
}

/// A catalog entry. Static configuration, never mutated.
#[derive(Clone, Copy)]
pub struct Activity {
    pub id: ActivityId,
    pub day: Day,
    /// Venue-local time window, e.g. `"12:00 PM – 1:00 PM"`.
    pub time: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Short label used in CRM properties.
    pub crm_label: &'static str,
    eligibility: Predicate,
}

impl Activity {
    /// Evaluate this entry's predicate.
    #[must_use]
    pub fn is_eligible(&self, profile: &RegistrantProfile) -> bool {
        (self.eligibility)(profile)
    }
}

impl fmt::Debug for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Activity")
            .field("id", &self.id)
            .field("day", &self.day)
            .field("time", &self.time)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// PREDICATES
// =============================================================================

fn everyone(_: &RegistrantProfile) -> bool {
    true
}

fn enterprise_chro(profile: &RegistrantProfile) -> bool {
    profile.is_enterprise_chro()
}

fn not_enterprise_chro(profile: &RegistrantProfile) -> bool {
    !enterprise_chro(profile)
}

fn growth_chro(profile: &RegistrantProfile) -> bool {
    profile.is_growth_chro()
}

fn exec_member(profile: &RegistrantProfile) -> bool {
    profile.is_exec_member().is_yes()
}

fn enterprise_chro_or_exec_member(profile: &RegistrantProfile) -> bool {
    enterprise_chro(profile) || exec_member(profile)
}

// =============================================================================
// CATALOG
// =============================================================================

static CATALOG: [Activity; 11] = [
    Activity {
        id: ActivityId::AiAtWorkMon,
        day: Day::Monday,
        time: "12:00 PM – 1:00 PM",
        name: "AI@Work Session",
        description: "Monday, March 23rd | 12:00–1:00 PM PT\nLocation: Wynn Las Vegas | Montrachet 2\nSpeakers:\n• Jessica Swank, Chief People Officer, Box\n• Brandon Barnes, VP, People Intelligence & Rewards, Box",
        crm_label: "AI@Work Session (Mon 12-1PM)",
        eligibility: everyone,
    },
    Activity {
        id: ActivityId::ExecChambersMon,
        day: Day::Monday,
        time: "4:00 PM – 5:00 PM",
        name: "Exec Chamber Session - The Ripple Effect",
        description: "Monday, March 23rd | 4:00–5:00 PM PT\nLocation: Wynn Las Vegas | Montrachet 2\nSpeakers:\n• Jennifer Christie, Chief People Officer, Docusign\n• Fiona Shinkfield, VP, People Strategy, Technology & Compliance, Docusign",
        crm_label: "Exec Chambers (Mon 4-5PM)",
        eligibility: everyone,
    },
    Activity {
        id: ActivityId::SponsoredDinnerMon,
        day: Day::Monday,
        time: "6:00 PM – 9:00 PM",
        name: "CHRO Experience Dinner brought to you by Aon",
        description: "Evening networking dinner",
        crm_label: "Sponsored Dinner (Mon 6-9PM)",
        eligibility: enterprise_chro,
    },
    Activity {
        id: ActivityId::ExecMemberLunchTue,
        day: Day::Tuesday,
        time: "11:30 AM – 12:30 PM",
        name: "Exec Member Lunch",
        description: "Private lunch for Transform Exec Members",
        crm_label: "Exec Member Lunch (Tue 11:30-12:30)",
        eligibility: exec_member,
    },
    Activity {
        id: ActivityId::ChroExperienceLunchTue,
        day: Day::Tuesday,
        time: "12:00 PM – 12:45 PM",
        name: "CHRO Experience Lunch brought to you by Aon",
        description: "Peer conversation based lunch for enterprise CHROs",
        crm_label: "CHRO Experience Lunch (Tue 12-12:45)",
        eligibility: enterprise_chro,
    },
    Activity {
        id: ActivityId::ChroTrackSessionTue,
        day: Day::Tuesday,
        time: "2:00 PM – 4:00 PM",
        name: "CHRO Track Session",
        description: "Afternoon session for growth-stage CHROs",
        crm_label: "CHRO Track Session (Tue 2-4PM)",
        eligibility: growth_chro,
    },
    Activity {
        id: ActivityId::ExecChambersTue,
        day: Day::Tuesday,
        time: "4:00 PM – 5:00 PM",
        name: "AI@Work Session",
        description: "Tuesday, March 24th | 4:00–5:00 PM PT\nLocation: Wynn Las Vegas | Montrachet 2\nSpeaker: Apple Musni, Chief People Officer, REI",
        crm_label: "Exec Chambers (Tue 4-5PM)",
        eligibility: everyone,
    },
    Activity {
        id: ActivityId::VipDinnerTue,
        day: Day::Tuesday,
        time: "6:30 PM – 9:00 PM",
        name: "VIP Dinner brought to you by Dergel Cornerstone",
        description: "Invite-only dinner for senior leaders",
        crm_label: "VIP Dinner (Tue 6:30-9PM)",
        eligibility: enterprise_chro_or_exec_member,
    },
    Activity {
        id: ActivityId::ChroExperienceBreakfastWed,
        day: Day::Wednesday,
        time: "8:00 AM – 9:00 AM",
        name: "CHRO Experience Breakfast brought to you by Aon",
        description: "Morning session for enterprise CHROs",
        crm_label: "CHRO Experience Breakfast (Wed 8-9AM)",
        eligibility: enterprise_chro,
    },
    Activity {
        id: ActivityId::ExecutiveBreakfastWed,
        day: Day::Wednesday,
        time: "8:00 AM – 9:00 AM",
        name: "Executive Breakfast",
        description: "Morning session for non-CHRO Experience attendees",
        crm_label: "Executive Breakfast (Wed 8-9AM)",
        eligibility: not_enterprise_chro,
    },
    Activity {
        id: ActivityId::ExecChambersWed,
        day: Day::Wednesday,
        time: "3:00 PM – 4:00 PM",
        name: "Exec Chamber Session - Raising the Bar",
        description: "Building Integrated Talent Cycles That Scale\nWednesday, March 25th | 3:00–4:00 PM PT\nLocation: Wynn Las Vegas | Montrachet 2\nSpeakers:\n• Amy Reichanadter, Chief People Officer, Databricks\n• Andrew Wilhelms, VP, Talent Management, Databricks",
        crm_label: "Exec Chambers (Wed 3-4PM)",
        eligibility: everyone,
    },
];

/// The full catalog in declaration order.
#[must_use]
pub fn catalog() -> &'static [Activity] {
    &CATALOG
}

/// Look up a catalog entry by key.
#[must_use]
pub fn activity(id: ActivityId) -> &'static Activity {
    // ActivityId::ALL and CATALOG share declaration order.
    &CATALOG[id as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_matches_activity_ids() {
        let ids: Vec<ActivityId> = catalog().iter().map(|a| a.id).collect();
        assert_eq!(ids, ActivityId::ALL.to_vec());
        for id in ActivityId::ALL {
            assert_eq!(activity(id).id, id);
        }
    }

    #[test]
    fn catalog_is_in_day_order() {
        let days: Vec<Day> = catalog().iter().map(|a| a.day).collect();
        let mut sorted = days.clone();
        sorted.sort();
        assert_eq!(days, sorted);
    }

    #[test]
    fn days_fall_in_event_week() {
        assert_eq!(
            Day::Monday.date(),
            NaiveDate::from_ymd_opt(2026, 3, 23)
        );
        assert_eq!(Day::Wednesday.date_label(), "Wed, Mar 25");
    }

    #[test]
    fn breakfasts_share_a_slot() {
        let chro = activity(ActivityId::ChroExperienceBreakfastWed);
        let exec = activity(ActivityId::ExecutiveBreakfastWed);
        assert_eq!((chro.day, chro.time), (exec.day, exec.time));
    }
}
