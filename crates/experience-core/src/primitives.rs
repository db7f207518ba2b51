//! # Fixed Event Constants
//!
//! Compiled-in configuration for the Transform 2026 executive track.
//!
//! The activity catalog, event dates and venue are fixed configuration,
//! not user data. Nothing here is mutated at runtime.

/// Calendar year of the event.
pub const EVENT_YEAR: i32 = 2026;

/// Month of the event (March).
pub const EVENT_MONTH: u32 = 3;

/// Venue offset from UTC in hours during event week (Pacific Daylight Time).
pub const VENUE_UTC_OFFSET_HOURS: i32 = -7;

/// Human-readable event name used in calendar titles.
pub const EVENT_NAME: &str = "Transform 2026";

/// Venue address attached to every calendar event.
pub const VENUE_LOCATION: &str = "Wynn Las Vegas, 3131 S Las Vegas Blvd, Las Vegas, NV 89109";

/// Domain used to build calendar event UIDs.
pub const CALENDAR_UID_DOMAIN: &str = "transform.us";

/// ICS product identifier.
pub const CALENDAR_PRODID: &str = "-//Transform 2026//Executive Experiences//EN";

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length for short text answers (names, email, company, title).
pub const MAX_SHORT_TEXT_LENGTH: usize = 256;

/// Maximum length for free-text answers (challenge, win, dietary notes).
pub const MAX_LONG_TEXT_LENGTH: usize = 4096;

/// Maximum number of rows accepted by a single legacy import.
pub const MAX_IMPORT_ROWS: usize = 10_000;

// =============================================================================
// STORAGE FORMAT
// =============================================================================

/// Current encoding version of records stored in redb.
///
/// Increment this when making breaking changes to `RegistrationRecord`.
pub const RECORD_FORMAT_VERSION: u8 = 1;
