//! Registration payloads: the in-progress form, the persisted registration
//! and the stored record.

use super::{ActivityId, Answer, RegistrantProfile, RegistrationId};
use crate::eligibility;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// CONTACT
// =============================================================================

/// Contact details collected on the contact step.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub title: String,
}

impl ContactInfo {
    /// Every field holds a non-blank value.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.company,
            &self.title,
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

// =============================================================================
// CHRO TRACK
// =============================================================================

/// Headcount bracket for growth-stage companies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CompanySizeBracket {
    #[serde(rename = "under_500")]
    Under500,
    #[serde(rename = "500_1999")]
    From500To1999,
    #[serde(rename = "2000_4999")]
    From2000To4999,
}

impl CompanySizeBracket {
    pub const ALL: [Self; 3] = [Self::Under500, Self::From500To1999, Self::From2000To4999];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Under500 => "Under 500 employees",
            Self::From500To1999 => "500 - 1,999 employees",
            Self::From2000To4999 => "2,000 - 4,999 employees",
        }
    }
}

/// Geographic footprint of the company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyPresence {
    Global,
    UsOnly,
}

impl CompanyPresence {
    pub const ALL: [Self; 2] = [Self::Global, Self::UsOnly];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Global => "Global",
            Self::UsOnly => "US only",
        }
    }
}

/// Ownership status of the company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyType {
    Public,
    Private,
    InTransition,
}

impl CompanyType {
    pub const ALL: [Self; 3] = [Self::Public, Self::Private, Self::InTransition];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Public => "Public",
            Self::Private => "Private",
            Self::InTransition => "In transition (e.g. going public)",
        }
    }
}

/// What a CHRO Track attendee hopes to get out of the sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionGoal {
    SharedChallenges,
    PeerConnections,
    LearnFromPeers,
    ShareWhatWorks,
    TopicDeepDives,
}

impl SessionGoal {
    pub const ALL: [Self; 5] = [
        Self::SharedChallenges,
        Self::PeerConnections,
        Self::LearnFromPeers,
        Self::ShareWhatWorks,
        Self::TopicDeepDives,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SharedChallenges => "Give and take discussion on shared challenges",
            Self::PeerConnections => "Build deep connections with peers",
            Self::LearnFromPeers => "Learn from others who've solved problems I'm facing",
            Self::ShareWhatWorks => "Share what's working at my organization",
            Self::TopicDeepDives => "Explore specific topics in depth",
        }
    }

    /// Match a stored display label back to its goal.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|goal| goal.label() == label)
    }
}

/// Extended questions asked only of growth-stage CHROs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChroTrackDetail {
    #[serde(default)]
    pub size_bracket: Option<CompanySizeBracket>,
    #[serde(default)]
    pub presence: Option<CompanyPresence>,
    #[serde(default)]
    pub company_type: Option<CompanyType>,
    #[serde(default)]
    pub biggest_challenge: String,
    #[serde(default)]
    pub win_to_share: String,
    #[serde(default)]
    pub session_goals: BTreeSet<SessionGoal>,
}

impl ChroTrackDetail {
    /// All six answers are present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.size_bracket.is_some()
            && self.presence.is_some()
            && self.company_type.is_some()
            && !self.biggest_challenge.trim().is_empty()
            && !self.win_to_share.trim().is_empty()
            && !self.session_goals.is_empty()
    }
}

// =============================================================================
// LOGISTICS
// =============================================================================

/// Dietary options offered on the logistics step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DietaryRestriction {
    None,
    Vegetarian,
    Vegan,
    #[serde(rename = "Gluten-free")]
    GlutenFree,
    Kosher,
    Halal,
    Other,
}

impl DietaryRestriction {
    pub const ALL: [Self; 7] = [
        Self::None,
        Self::Vegetarian,
        Self::Vegan,
        Self::GlutenFree,
        Self::Kosher,
        Self::Halal,
        Self::Other,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Vegetarian => "Vegetarian",
            Self::Vegan => "Vegan",
            Self::GlutenFree => "Gluten-free",
            Self::Kosher => "Kosher",
            Self::Halal => "Halal",
            Self::Other => "Other",
        }
    }

    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|option| option.label().eq_ignore_ascii_case(label))
    }
}

/// Hotel and dietary answers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Logistics {
    #[serde(default)]
    pub staying_at_venue: Answer,
    #[serde(default, with = "date_field")]
    pub check_in_date: Option<NaiveDate>,
    #[serde(default, with = "date_field")]
    pub check_out_date: Option<NaiveDate>,
    #[serde(default)]
    pub dietary_restrictions: BTreeSet<DietaryRestriction>,
    #[serde(default)]
    pub dietary_other: String,
}

impl Logistics {
    /// Hotel question answered, and both dates present unless not staying.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        match self.staying_at_venue {
            Answer::Unknown => false,
            Answer::No => true,
            Answer::Yes => self.check_in_date.is_some() && self.check_out_date.is_some(),
        }
    }

    /// One-line dietary summary, `"None"` when nothing was selected.
    #[must_use]
    pub fn dietary_summary(&self) -> String {
        if self.dietary_restrictions.is_empty() {
            return "None".to_string();
        }
        let mut summary = self
            .dietary_restrictions
            .iter()
            .map(|r| r.label())
            .collect::<Vec<_>>()
            .join(", ");
        let other = self.dietary_other.trim();
        if !other.is_empty() {
            summary.push_str(&format!(" (Other: {})", other));
        }
        summary
    }

    /// Drop answers whose question is hidden by another answer.
    #[must_use]
    fn settled(mut self) -> Self {
        if self.staying_at_venue.is_no() {
            self.check_in_date = None;
            self.check_out_date = None;
        }
        if !self
            .dietary_restrictions
            .contains(&DietaryRestriction::Other)
        {
            self.dietary_other.clear();
        }
        self
    }
}

/// `Option<NaiveDate>` as `"YYYY-MM-DD"`, with `""` and `null` meaning absent.
mod date_field {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.serialize_some(&d.format(FORMAT).to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => NaiveDate::parse_from_str(s, FORMAT)
                .map(Some)
                .map_err(D::Error::custom),
        }
    }
}

// =============================================================================
// ACTIVITY SELECTIONS
// =============================================================================

/// A boolean selection per catalog activity.
///
/// Wire form is an object of `activity_id -> bool` listing every activity;
/// missing keys read as not selected.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<ActivityId, bool>",
    into = "BTreeMap<ActivityId, bool>"
)]
pub struct ActivitySelections(BTreeSet<ActivityId>);

impl ActivitySelections {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_selected(&self, id: ActivityId) -> bool {
        self.0.contains(&id)
    }

    /// Return a copy with `id` selected or cleared.
    #[must_use]
    pub fn with(mut self, id: ActivityId, selected: bool) -> Self {
        if selected {
            self.0.insert(id);
        } else {
            self.0.remove(&id);
        }
        self
    }

    /// Keep only the selections accepted by `keep`.
    #[must_use]
    pub fn retain(mut self, keep: impl Fn(ActivityId) -> bool) -> Self {
        self.0.retain(|id| keep(*id));
        self
    }

    /// Selected activities in catalog order.
    pub fn selected(&self) -> impl Iterator<Item = ActivityId> + '_ {
        self.0.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<ActivityId> for ActivitySelections {
    fn from_iter<T: IntoIterator<Item = ActivityId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<BTreeMap<ActivityId, bool>> for ActivitySelections {
    fn from(map: BTreeMap<ActivityId, bool>) -> Self {
        map.into_iter()
            .filter_map(|(id, selected)| selected.then_some(id))
            .collect()
    }
}

impl From<ActivitySelections> for BTreeMap<ActivityId, bool> {
    fn from(selections: ActivitySelections) -> Self {
        ActivityId::ALL
            .into_iter()
            .map(|id| (id, selections.is_selected(id)))
            .collect()
    }
}

// =============================================================================
// FORM, REGISTRATION, RECORD
// =============================================================================

/// The in-progress answer set edited by the wizard.
///
/// Holds answers the current step sequence no longer shows (for example a
/// CHRO Track filled in before `is_chro` changed); `finalize` decides what is
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub contact: ContactInfo,
    #[serde(default)]
    pub profile: RegistrantProfile,
    #[serde(default)]
    pub chro_track: ChroTrackDetail,
    #[serde(default)]
    pub activities: ActivitySelections,
    #[serde(default)]
    pub logistics: Logistics,
}

impl RegistrationForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_contact(self, contact: ContactInfo) -> Self {
        Self { contact, ..self }
    }

    #[must_use]
    pub fn with_profile(self, profile: RegistrantProfile) -> Self {
        Self { profile, ..self }
    }

    #[must_use]
    pub fn with_chro_track(self, chro_track: ChroTrackDetail) -> Self {
        Self { chro_track, ..self }
    }

    #[must_use]
    pub fn with_activity(self, id: ActivityId, selected: bool) -> Self {
        Self {
            activities: self.activities.with(id, selected),
            ..self
        }
    }

    #[must_use]
    pub fn with_logistics(self, logistics: Logistics) -> Self {
        Self { logistics, ..self }
    }

    /// Build the registration that gets persisted.
    ///
    /// Selections the profile is no longer eligible for are dropped, the
    /// CHRO Track is kept only while it applies, and hidden logistics answers
    /// are cleared.
    #[must_use]
    pub fn finalize(&self) -> Registration {
        Registration {
            contact: self.contact.clone(),
            profile: self.profile,
            chro_track: self
                .profile
                .is_growth_chro()
                .then(|| self.chro_track.clone()),
            activities: eligibility::prune_ineligible(&self.activities, &self.profile),
            logistics: self.logistics.clone().settled(),
        }
    }
}

/// The editable fields of a stored registration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Registration {
    pub contact: ContactInfo,
    pub profile: RegistrantProfile,
    #[serde(default)]
    pub chro_track: Option<ChroTrackDetail>,
    #[serde(default)]
    pub activities: ActivitySelections,
    #[serde(default)]
    pub logistics: Logistics,
}

impl Registration {
    /// Reopen a stored registration as an editable form.
    #[must_use]
    pub fn to_form(&self) -> RegistrationForm {
        RegistrationForm {
            contact: self.contact.clone(),
            profile: self.profile,
            chro_track: self.chro_track.clone().unwrap_or_default(),
            activities: self.activities.clone(),
            logistics: self.logistics.clone(),
        }
    }
}

/// A persisted registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRecord {
    pub id: RegistrationId,
    pub created_at: DateTime<Utc>,
    pub registration: Registration,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CompanySize;

    fn growth_chro() -> RegistrantProfile {
        RegistrantProfile::new()
            .with_chro(Answer::Yes)
            .with_company_size(CompanySize::Under5000)
            .with_exec_member(Answer::No)
    }

    fn complete_track() -> ChroTrackDetail {
        ChroTrackDetail {
            size_bracket: Some(CompanySizeBracket::From500To1999),
            presence: Some(CompanyPresence::Global),
            company_type: Some(CompanyType::Private),
            biggest_challenge: "Scaling managers".to_string(),
            win_to_share: "Cut attrition in half".to_string(),
            session_goals: [SessionGoal::PeerConnections].into_iter().collect(),
        }
    }

    #[test]
    fn contact_requires_every_field() {
        let mut contact = ContactInfo {
            first_name: "Ada".to_string(),
            last_name: "Byron".to_string(),
            email: "ada@example.com".to_string(),
            company: "Engines Ltd".to_string(),
            title: "CPO".to_string(),
        };
        assert!(contact.is_complete());

        contact.title = "   ".to_string();
        assert!(!contact.is_complete());
    }

    #[test]
    fn chro_track_requires_all_six_answers() {
        let track = complete_track();
        assert!(track.is_complete());

        let no_goals = ChroTrackDetail {
            session_goals: BTreeSet::new(),
            ..track.clone()
        };
        assert!(!no_goals.is_complete());

        let blank_win = ChroTrackDetail {
            win_to_share: " \n".to_string(),
            ..track
        };
        assert!(!blank_win.is_complete());
    }

    #[test]
    fn logistics_dates_required_only_when_staying() {
        let staying = Logistics {
            staying_at_venue: Answer::Yes,
            ..Logistics::default()
        };
        assert!(!staying.is_complete());

        let dated = Logistics {
            check_in_date: NaiveDate::from_ymd_opt(2026, 3, 22),
            check_out_date: NaiveDate::from_ymd_opt(2026, 3, 26),
            ..staying
        };
        assert!(dated.is_complete());

        let local = Logistics {
            staying_at_venue: Answer::No,
            ..Logistics::default()
        };
        assert!(local.is_complete());
        assert!(!Logistics::default().is_complete());
    }

    #[test]
    fn empty_date_strings_read_as_absent() {
        let json = r#"{"staying_at_venue":true,"check_in_date":"","check_out_date":null}"#;
        let logistics: Logistics = serde_json::from_str(json).expect("parse");
        assert_eq!(logistics.check_in_date, None);
        assert_eq!(logistics.check_out_date, None);
        assert!(!logistics.is_complete());
    }

    #[test]
    fn dietary_summary_mentions_other() {
        let logistics = Logistics {
            dietary_restrictions: [DietaryRestriction::Vegan, DietaryRestriction::Other]
                .into_iter()
                .collect(),
            dietary_other: "No shellfish".to_string(),
            ..Logistics::default()
        };
        assert_eq!(logistics.dietary_summary(), "Vegan, Other (Other: No shellfish)");
        assert_eq!(Logistics::default().dietary_summary(), "None");
    }

    #[test]
    fn selections_wire_form_lists_every_activity() {
        let selections = ActivitySelections::new().with(ActivityId::VipDinnerTue, true);
        let value = serde_json::to_value(&selections).expect("serialize");
        let object = value.as_object().expect("object");

        assert_eq!(object.len(), ActivityId::ALL.len());
        assert_eq!(object.get("vip_dinner_tue"), Some(&serde_json::Value::Bool(true)));
        assert_eq!(
            object.get("ai_at_work_mon"),
            Some(&serde_json::Value::Bool(false))
        );
    }

    #[test]
    fn selections_missing_keys_are_unselected() {
        let selections: ActivitySelections =
            serde_json::from_str(r#"{"exec_chambers_wed":true}"#).expect("parse");
        assert!(selections.is_selected(ActivityId::ExecChambersWed));
        assert_eq!(selections.len(), 1);
    }

    #[test]
    fn finalize_drops_orphaned_chro_track() {
        let form = RegistrationForm::new()
            .with_profile(growth_chro())
            .with_chro_track(complete_track());
        assert!(form.finalize().chro_track.is_some());

        let declined = form.clone().with_profile(form.profile.with_chro(Answer::No));
        assert!(declined.finalize().chro_track.is_none());
        // The form itself still remembers the answers.
        assert!(declined.chro_track.is_complete());
    }

    #[test]
    fn finalize_prunes_ineligible_selections() {
        let form = RegistrationForm::new()
            .with_profile(growth_chro())
            .with_activity(ActivityId::ChroTrackSessionTue, true)
            .with_activity(ActivityId::VipDinnerTue, true);

        let registration = form.finalize();
        assert!(registration.activities.is_selected(ActivityId::ChroTrackSessionTue));
        assert!(!registration.activities.is_selected(ActivityId::VipDinnerTue));
    }

    #[test]
    fn finalize_clears_hidden_logistics() {
        let form = RegistrationForm::new().with_logistics(Logistics {
            staying_at_venue: Answer::No,
            check_in_date: NaiveDate::from_ymd_opt(2026, 3, 22),
            check_out_date: None,
            dietary_restrictions: [DietaryRestriction::Halal].into_iter().collect(),
            dietary_other: "stale".to_string(),
        });

        let logistics = form.finalize().logistics;
        assert_eq!(logistics.check_in_date, None);
        assert!(logistics.dietary_other.is_empty());
    }

    #[test]
    fn profile_deserialization_enforces_invariant() {
        let json = r#"{"is_chro":false,"company_size":"5000_plus","is_exec_member":true}"#;
        let profile: RegistrantProfile = serde_json::from_str(json).expect("parse");
        assert_eq!(profile.company_size(), None);
        assert_eq!(profile.is_exec_member(), Answer::Yes);
    }
}
