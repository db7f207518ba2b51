//! # Calendar Export
//!
//! Turns an activity into a calendar event and renders it as an iCalendar
//! document or as Google / Outlook "add event" links.
//!
//! Activities are addressed by their display string,
//! `"<name> - <Day, Mon DD> • <start> – <end>"`, which is also what confirmation
//! screens and CRM notes show. Activity names may themselves contain `" - "`,
//! so the date is split off from the right.
//!
//! Catalog times are venue-local (Pacific, fixed offset for event week) and
//! are converted to UTC here.

use crate::catalog::Activity;
use crate::primitives::{
    CALENDAR_PRODID, CALENDAR_UID_DOMAIN, EVENT_NAME, EVENT_YEAR, VENUE_LOCATION,
    VENUE_UTC_OFFSET_HOURS,
};
use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat,
    TimeZone, Utc,
};
use serde::{Deserialize, Serialize};

const ICS_STAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";
const ICS_LINE_LIMIT: usize = 75;
const GOOGLE_CALENDAR_BASE: &str = "https://calendar.google.com/calendar/render";
const OUTLOOK_CALENDAR_BASE: &str = "https://outlook.live.com/calendar/0/action/compose";

// =============================================================================
// DISPLAY STRING
// =============================================================================

/// The three parts of an activity display string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivitySlot {
    pub name: String,
    /// e.g. `"Mon, Mar 23"`
    pub date: String,
    /// e.g. `"12:00 PM – 1:00 PM"`
    pub time: String,
}

/// Render `activity` as `"<name> - <date> • <time>"`.
#[must_use]
pub fn activity_display_string(activity: &Activity) -> String {
    format!(
        "{} - {} • {}",
        activity.name,
        activity.day.date_label(),
        activity.time
    )
}

/// Split a display string into its parts.
///
/// Returns `None` if either separator is missing or a part is empty.
#[must_use]
pub fn parse_activity_string(value: &str) -> Option<ActivitySlot> {
    let (head, time) = value.split_once(" • ")?;
    let (name, date) = head.rsplit_once(" - ")?;
    let (name, date, time) = (name.trim(), date.trim(), time.trim());
    if name.is_empty() || date.is_empty() || time.is_empty() {
        return None;
    }
    Some(ActivitySlot {
        name: name.to_string(),
        date: date.to_string(),
        time: time.to_string(),
    })
}

// =============================================================================
// CALENDAR EVENT
// =============================================================================

/// A single event ready for export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub title: String,
    pub description: String,
    pub location: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub uid: String,
}

/// Build the calendar event for a display string.
///
/// `None` on any parse failure: bad separators, a date that is not a valid
/// event-year date, or a time range that is not `"h:mm AM – h:mm PM"`.
#[must_use]
pub fn activity_to_calendar_event(value: &str) -> Option<CalendarEvent> {
    let slot = parse_activity_string(value)?;
    let date = parse_event_date(&slot.date)?;
    let (start_time, end_time) = parse_time_range(&slot.time)?;

    let start = venue_to_utc(date.and_time(start_time))?;
    let mut end = venue_to_utc(date.and_time(end_time))?;
    if end <= start {
        // Ranges that cross midnight end on the following day.
        end += Duration::days(1);
    }

    Some(CalendarEvent {
        title: format!("{} - {}", slot.name, EVENT_NAME),
        description: format!(
            "Executive Experience at {}\n\n{}\n{} • {}",
            EVENT_NAME, slot.name, slot.date, slot.time
        ),
        location: VENUE_LOCATION.to_string(),
        uid: format!(
            "{}-{}@{}",
            start.format(ICS_STAMP_FORMAT),
            slugify(&slot.name),
            CALENDAR_UID_DOMAIN
        ),
        start,
        end,
    })
}

/// Calendar event for a catalog entry.
#[must_use]
pub fn activity_event(activity: &Activity) -> Option<CalendarEvent> {
    activity_to_calendar_event(&activity_display_string(activity))
}

fn parse_event_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{} {}", date, EVENT_YEAR), "%a, %b %d %Y").ok()
}

fn parse_time_range(range: &str) -> Option<(NaiveTime, NaiveTime)> {
    let (start, end) = range.split_once(" – ")?;
    let parse = |s: &str| NaiveTime::parse_from_str(s.trim(), "%I:%M %p").ok();
    Some((parse(start)?, parse(end)?))
}

fn venue_to_utc(local: NaiveDateTime) -> Option<DateTime<Utc>> {
    let offset = FixedOffset::east_opt(VENUE_UTC_OFFSET_HOURS * 3600)?;
    offset
        .from_local_datetime(&local)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

impl CalendarEvent {
    /// Render as an RFC 5545 document with a single `VEVENT`.
    #[must_use]
    pub fn to_ics(&self) -> String {
        let lines = [
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            format!("PRODID:{}", CALENDAR_PRODID),
            "CALSCALE:GREGORIAN".to_string(),
            "METHOD:PUBLISH".to_string(),
            "BEGIN:VEVENT".to_string(),
            format!("UID:{}", self.uid),
            format!("DTSTAMP:{}", self.start.format(ICS_STAMP_FORMAT)),
            format!("DTSTART:{}", self.start.format(ICS_STAMP_FORMAT)),
            format!("DTEND:{}", self.end.format(ICS_STAMP_FORMAT)),
            format!("SUMMARY:{}", escape_text(&self.title)),
            format!("DESCRIPTION:{}", escape_text(&self.description)),
            format!("LOCATION:{}", escape_text(&self.location)),
            "STATUS:CONFIRMED".to_string(),
            "SEQUENCE:0".to_string(),
            "END:VEVENT".to_string(),
            "END:VCALENDAR".to_string(),
        ];

        let mut out = String::new();
        for line in &lines {
            out.push_str(&fold_line(line));
            out.push_str("\r\n");
        }
        out
    }

    /// Google Calendar "create event" link.
    #[must_use]
    pub fn google_calendar_url(&self) -> String {
        let dates = format!(
            "{}/{}",
            self.start.format(ICS_STAMP_FORMAT),
            self.end.format(ICS_STAMP_FORMAT)
        );
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("action", "TEMPLATE")
            .append_pair("text", &self.title)
            .append_pair("dates", &dates)
            .append_pair("details", &self.description)
            .append_pair("location", &self.location)
            .finish();
        format!("{}?{}", GOOGLE_CALENDAR_BASE, query)
    }

    /// Outlook.com compose link.
    #[must_use]
    pub fn outlook_url(&self) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("rru", "addevent")
            .append_pair("subject", &self.title)
            .append_pair(
                "startdt",
                &self.start.to_rfc3339_opts(SecondsFormat::Millis, true),
            )
            .append_pair("enddt", &self.end.to_rfc3339_opts(SecondsFormat::Millis, true))
            .append_pair("body", &self.description)
            .append_pair("location", &self.location)
            .finish();
        format!("{}?{}", OUTLOOK_CALENDAR_BASE, query)
    }

    /// Suggested download name, e.g. `"exec-member-lunch.ics"`.
    #[must_use]
    pub fn file_name(&self) -> String {
        let name = self
            .title
            .strip_suffix(&format!(" - {}", EVENT_NAME))
            .unwrap_or(&self.title);
        format!("{}.ics", slugify(name))
    }
}

/// Escape a TEXT property value.
fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Fold a content line at 75 octets without splitting a character.
fn fold_line(line: &str) -> String {
    if line.len() <= ICS_LINE_LIMIT {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + line.len() / ICS_LINE_LIMIT * 3);
    let mut width = 0;
    for c in line.chars() {
        // Continuation lines start with a space that counts toward the limit.
        if width + c.len_utf8() > ICS_LINE_LIMIT {
            out.push_str("\r\n ");
            width = 1;
        }
        out.push(c);
        width += c.len_utf8();
    }
    out
}

fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ActivityId;
    use crate::catalog::{activity, catalog};

    #[test]
    fn display_string_round_trips_through_parse() {
        let lunch = activity(ActivityId::ExecMemberLunchTue);
        let display = activity_display_string(lunch);
        assert_eq!(
            display,
            "Exec Member Lunch - Tue, Mar 24 • 11:30 AM – 12:30 PM"
        );

        let slot = parse_activity_string(&display).expect("parse");
        assert_eq!(slot.name, "Exec Member Lunch");
        assert_eq!(slot.date, "Tue, Mar 24");
        assert_eq!(slot.time, "11:30 AM – 12:30 PM");
    }

    #[test]
    fn names_containing_dash_parse() {
        let chambers = activity(ActivityId::ExecChambersMon);
        let slot = parse_activity_string(&activity_display_string(chambers)).expect("parse");
        assert_eq!(slot.name, "Exec Chamber Session - The Ripple Effect");
        assert_eq!(slot.date, "Mon, Mar 23");
    }

    #[test]
    fn every_catalog_entry_converts() {
        for entry in catalog() {
            let event = activity_event(entry).expect("catalog entry converts");
            assert!(event.end > event.start, "{:?}", entry.id);
        }
    }

    #[test]
    fn venue_time_converts_to_utc() {
        let event =
            activity_to_calendar_event("Exec Member Lunch - Tue, Mar 24 • 11:30 AM – 12:30 PM")
                .expect("event");
        assert_eq!(event.start.to_rfc3339(), "2026-03-24T18:30:00+00:00");
        assert_eq!(event.end.to_rfc3339(), "2026-03-24T19:30:00+00:00");
        assert_eq!(event.title, "Exec Member Lunch - Transform 2026");
        assert_eq!(event.location, VENUE_LOCATION);
    }

    #[test]
    fn noon_and_midnight_hours() {
        let noon = activity_to_calendar_event("Lunch - Mon, Mar 23 • 12:00 PM – 12:45 PM")
            .expect("event");
        assert_eq!(noon.start.to_rfc3339(), "2026-03-23T19:00:00+00:00");

        let late = activity_to_calendar_event("Late - Mon, Mar 23 • 11:00 PM – 12:30 AM")
            .expect("event");
        assert_eq!(late.end.to_rfc3339(), "2026-03-24T07:30:00+00:00");
    }

    #[test]
    fn malformed_strings_yield_none() {
        assert!(activity_to_calendar_event("").is_none());
        assert!(activity_to_calendar_event("No separators at all").is_none());
        assert!(activity_to_calendar_event("Lunch - Mon, Mar 23").is_none());
        assert!(activity_to_calendar_event("Lunch - Someday • 12:00 PM – 1:00 PM").is_none());
        assert!(activity_to_calendar_event("Lunch - Mon, Mar 23 • noon").is_none());
        assert!(activity_to_calendar_event("Lunch - Mon, Mar 32 • 12:00 PM – 1:00 PM").is_none());
    }

    #[test]
    fn ics_has_escaped_single_event() {
        let event = activity_event(activity(ActivityId::AiAtWorkMon)).expect("event");
        let ics = event.to_ics();

        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
        assert!(ics.contains("DTSTART:20260323T190000Z"));
        assert!(ics.contains("DTEND:20260323T200000Z"));
        assert!(ics.contains("LOCATION:Wynn Las Vegas\\, 3131 S Las Vegas Blvd"));
        assert!(ics.contains("UID:20260323T190000Z-ai-work-session@transform.us"));
        for line in ics.split("\r\n") {
            assert!(line.len() <= ICS_LINE_LIMIT, "unfolded line: {}", line);
        }
    }

    #[test]
    fn links_carry_event_fields() {
        let event = activity_event(activity(ActivityId::VipDinnerTue)).expect("event");

        let google = event.google_calendar_url();
        assert!(google.starts_with(GOOGLE_CALENDAR_BASE));
        assert!(google.contains("action=TEMPLATE"));
        assert!(google.contains("dates=20260325T013000Z%2F20260325T040000Z"));

        let outlook = event.outlook_url();
        assert!(outlook.contains("rru=addevent"));
        assert!(outlook.contains("startdt=2026-03-25T01%3A30%3A00.000Z"));
    }

    #[test]
    fn file_name_is_slugged() {
        let event = activity_event(activity(ActivityId::ExecChambersWed)).expect("event");
        assert_eq!(event.file_name(), "exec-chamber-session-raising-the-bar.ics");
    }
}
