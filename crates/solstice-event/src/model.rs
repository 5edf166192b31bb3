//! The canonical event domain model.
//!
//! An [`ICalEvent`] is constructed once per parse (or per clone for generated
//! recurrence occurrences) and is otherwise immutable; the mutators return
//! new values so events can be shared freely across threads.

use chrono::{DateTime, TimeDelta, Utc};

/// STATUS property values (absent = unset).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Tentative,
    Confirmed,
    Cancelled,
}

impl EventStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tentative => "TENTATIVE",
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "TENTATIVE" => Some(Self::Tentative),
            "CONFIRMED" => Some(Self::Confirmed),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// PARTSTAT values the core distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttendeeStatus {
    #[default]
    NeedsAction,
    Accepted,
    Tentative,
    Declined,
}

impl AttendeeStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NeedsAction => "NEEDS-ACTION",
            Self::Accepted => "ACCEPTED",
            Self::Tentative => "TENTATIVE",
            Self::Declined => "DECLINED",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "NEEDS-ACTION" => Some(Self::NeedsAction),
            "ACCEPTED" => Some(Self::Accepted),
            "TENTATIVE" => Some(Self::Tentative),
            "DECLINED" => Some(Self::Declined),
            _ => None,
        }
    }

    /// Whether the attendee has responded at all.
    #[must_use]
    pub const fn is_answered(self) -> bool {
        matches!(self, Self::Accepted | Self::Tentative | Self::Declined)
    }
}

/// One ATTENDEE record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ICalAttendee {
    pub email: String,
    pub name: Option<String>,
    pub status: AttendeeStatus,
    pub role: Option<String>,
    pub rsvp: bool,
    /// Opaque per-attendee token (X-PM-TOKEN), carried through unchanged.
    pub token: Option<String>,
}

/// The ORGANIZER record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ICalOrganizer {
    pub email: String,
    pub name: Option<String>,
    /// Organizer's own participation status, when the property carries one.
    pub status: Option<AttendeeStatus>,
}

/// One address the current user owns, supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedAddress {
    pub id: String,
    pub email: String,
    /// Declared display/priority order, ascending.
    pub order: i32,
    /// Whether the address can send mail.
    pub send: bool,
}

/// The resolver's pairing of one attendee with one owned address.
///
/// Produced only by participant resolution, never persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ICalParticipant {
    pub attendee: ICalAttendee,
    pub address: OwnedAddress,
}

/// A recurrence rule as carried by the domain model.
///
/// The raw RRULE text is kept verbatim for the recurrence engine;
/// `ends_never` is derived once at parse time for display logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecurrence {
    pub rule: String,
    pub ends_never: bool,
}

impl EventRecurrence {
    #[must_use]
    pub fn new(rule: impl Into<String>) -> Self {
        let rule = rule.into();
        let upper = rule.to_ascii_uppercase();
        let ends_never = !upper.contains("COUNT=") && !upper.contains("UNTIL=");
        Self { rule, ends_never }
    }
}

/// A notification lead time relative to the event start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventNotification {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl EventNotification {
    /// Renders the lead time as a negative iCalendar duration (TRIGGER).
    #[must_use]
    pub fn to_trigger(self) -> String {
        let mut out = String::from("-P");
        if self.days > 0 {
            out.push_str(&format!("{}D", self.days));
        }
        if self.hours > 0 || self.minutes > 0 || self.seconds > 0 {
            out.push('T');
            if self.hours > 0 {
                out.push_str(&format!("{}H", self.hours));
            }
            if self.minutes > 0 {
                out.push_str(&format!("{}M", self.minutes));
            }
            if self.seconds > 0 {
                out.push_str(&format!("{}S", self.seconds));
            }
        } else if self.days == 0 {
            out.push_str("T0M");
        }
        out
    }
}

/// Generates a fresh ICS UID for a locally created event.
#[must_use]
pub fn generate_ics_uid() -> String {
    format!("{}@solstice", uuid::Uuid::new_v4())
}

/// The canonical domain entity for one calendar event or occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct ICalEvent {
    // Identity.
    pub ics_uid: String,
    pub local_event_id: String,
    pub api_event_id: Option<String>,
    pub calendar_id: String,

    // Timing. Instants are absolute UTC; the identifiers record the source
    // wall-clock frame ("UTC" for Zulu and floating input).
    pub start_date: DateTime<Utc>,
    pub start_date_timezone_identifier: String,
    pub end_date: DateTime<Utc>,
    pub end_date_timezone_identifier: String,
    pub is_all_day: bool,
    pub sequence: i32,
    pub created_time: Option<DateTime<Utc>>,

    // Content.
    pub title: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub status: Option<EventStatus>,

    // Recurrence.
    pub recurrence: Option<EventRecurrence>,
    pub recurrence_id: Option<DateTime<Utc>>,
    pub recurrence_id_timezone_identifier: Option<String>,
    pub recurrence_id_is_all_day: bool,
    /// `exdates[i]` corresponds positionally to
    /// `exdates_timezone_identifiers[i]`.
    pub exdates: Vec<DateTime<Utc>>,
    pub exdates_timezone_identifiers: Vec<String>,
    /// The series root's rule, attached to single-edits for display.
    pub main_event_recurrence: Option<EventRecurrence>,
    pub is_first_occurrence: bool,
    pub is_last_occurrence: bool,

    // Participants.
    pub organizer: Option<ICalOrganizer>,
    pub participants: Vec<ICalAttendee>,
    pub invitation_state: Option<AttendeeStatus>,
    pub is_organizer: bool,

    // Classification.
    pub is_orphan_single_edit: bool,

    // Secure-sharing passthrough, opaque to this core.
    pub shared_event_id: Option<String>,
    pub shared_key_packet: Option<String>,
    pub calendar_key_packet: Option<String>,
    pub address_key_packet: Option<String>,

    pub notifications: Vec<EventNotification>,

    /// Canonical serialized snapshot, set once materialization completes.
    pub ics: String,
}

impl ICalEvent {
    /// Returns a copy with a new start date, end shifted to keep duration.
    #[must_use]
    pub fn set_start_date(&self, start: DateTime<Utc>) -> Self {
        let duration = self.end_date - self.start_date;
        let mut event = self.clone();
        event.start_date = start;
        event.end_date = start + duration;
        event
    }

    /// Returns a copy with a new end date.
    #[must_use]
    pub fn set_end_date(&self, end: DateTime<Utc>) -> Self {
        let mut event = self.clone();
        event.end_date = end;
        event
    }

    /// Returns a copy with the recurrence rule replaced.
    #[must_use]
    pub fn with_recurrence(&self, recurrence: Option<EventRecurrence>) -> Self {
        let mut event = self.clone();
        event.recurrence = recurrence;
        event
    }

    /// Clones this event as one generated occurrence of its own series.
    ///
    /// The start is substituted and the end keeps the original duration;
    /// first/last flags are reset for the caller to recompute.
    #[must_use]
    pub fn clone_for_occurrence(&self, start: DateTime<Utc>) -> Self {
        let mut event = self.set_start_date(start);
        event.is_first_occurrence = false;
        event.is_last_occurrence = false;
        event
    }

    /// The event's duration.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.end_date - self.start_date
    }

    /// Whether `[start, end)` intersects the window `[left, right)`.
    ///
    /// A zero-duration event intersects only when its instant lies strictly
    /// between the bounds; an instant sitting exactly on `left` falls
    /// outside.
    #[must_use]
    pub fn intersects(&self, left: DateTime<Utc>, right: DateTime<Utc>) -> bool {
        self.start_date < right && self.end_date > left
    }
}
