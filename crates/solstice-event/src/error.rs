//! Error tiers of the event core.
//!
//! Contract violations are caller bugs: the payload broke the
//! "exactly one well-formed VEVENT" precondition and the call aborts with no
//! partial result. Write errors are the recoverable tier the caller reports
//! to the user. Timezone and EXDATE fallbacks are logged at debug level and
//! never surfaced.

use solstice_ical::ParseError;

/// Structural precondition failures. Never recovered from.
#[derive(Debug, thiserror::Error)]
pub enum ContractViolation {
    /// The payload is not parsable iCalendar text at all.
    #[error("malformed iCalendar payload: {0}")]
    Grammar(#[from] ParseError),

    /// The payload contains no VEVENT.
    #[error("payload contains no VEVENT")]
    MissingVEvent,

    /// The payload contains more than one VEVENT.
    #[error("payload contains {0} VEVENT components, expected exactly one")]
    MultipleVEvents(usize),

    /// The VEVENT has no UID.
    #[error("VEVENT is missing UID")]
    MissingUid,

    /// The VEVENT has no DTSTART.
    #[error("VEVENT is missing DTSTART")]
    MissingDtStart,

    /// DTSTART and DTEND disagree on the all-day (DATE vs DATE-TIME) form.
    #[error("DTSTART and DTEND disagree on all-day form")]
    MismatchedAllDayFlags,

    /// The recurrence rule text was rejected by the recurrence engine.
    #[error("unparsable recurrence rule: {0}")]
    UnparsableRecurrenceRule(String),
}

/// Recoverable failures surfaced while building or validating output.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WriteError {
    #[error("summary exceeds 255 characters ({0})")]
    SummaryTooLong(usize),

    #[error("location exceeds 255 characters ({0})")]
    LocationTooLong(usize),

    #[error("description exceeds 3000 characters ({0})")]
    DescriptionTooLong(usize),

    #[error("event carries {0} alarms, maximum is 10")]
    TooManyAlarms(usize),

    #[error("recurrence interval {interval} exceeds the {frequency} bound of {max}")]
    IntervalTooLarge {
        frequency: &'static str,
        interval: u32,
        max: u32,
    },

    #[error("recurrence count {0} is outside [1, 49]")]
    CountOutOfRange(u32),

    #[error("recurrence UNTIL {0} is later than 2038-12-31")]
    UntilTooLate(String),

    #[error("notification lead time {field} = {value} is out of bounds")]
    InvalidNotificationLeadTime { field: &'static str, value: i64 },

    #[error("event has no shared event id")]
    MissingSharedEventId,

    #[error("event has no shared key packet")]
    MissingSharedKeyPacket,

    #[error("could not build ORGANIZER property")]
    FailedToBuildOrganizer,

    #[error("could not build ATTENDEE property")]
    FailedToBuildAttendee,

    #[error("start date is after end date")]
    StartDateIsAfterEndDate,

    #[error("missing start date or end date")]
    MissingStartDateOrEndDate,
}
