//! The caller-supplied parameter bundle for one parse.

use chrono::{DateTime, Utc};

use crate::model::{EventNotification, OwnedAddress};

/// Immutable per-parse context the materializer must never re-derive from
/// the text itself: identifiers, caller-resolved timing, the raw ICS
/// payload, and security packets carried through opaquely.
#[derive(Debug, Clone)]
pub struct ICalReaderDependencies {
    pub calendar_id: String,
    pub local_event_id: String,
    pub api_event_id: Option<String>,

    /// Caller-resolved timing, used to seed the event before the text's
    /// DTSTART/DTEND (authoritative when present) overwrite it.
    pub start_date: DateTime<Utc>,
    pub start_date_timezone_identifier: String,
    pub end_date: DateTime<Utc>,
    pub end_date_timezone_identifier: String,

    /// The raw single-VEVENT iCalendar payload.
    pub ics: String,

    pub notifications: Vec<EventNotification>,
    /// Whether the caller's account created this event.
    pub is_organizer: bool,
    pub owned_addresses: Vec<OwnedAddress>,

    // Secure-sharing passthrough.
    pub shared_event_id: Option<String>,
    pub shared_key_packet: Option<String>,
    pub calendar_key_packet: Option<String>,
    pub address_key_packet: Option<String>,
}

impl ICalReaderDependencies {
    /// A minimal bundle around one payload, for callers that have no
    /// surrounding account context.
    #[must_use]
    pub fn bare(
        calendar_id: impl Into<String>,
        local_event_id: impl Into<String>,
        ics: impl Into<String>,
    ) -> Self {
        Self {
            calendar_id: calendar_id.into(),
            local_event_id: local_event_id.into(),
            api_event_id: None,
            start_date: DateTime::<Utc>::UNIX_EPOCH,
            start_date_timezone_identifier: "UTC".to_string(),
            end_date: DateTime::<Utc>::UNIX_EPOCH,
            end_date_timezone_identifier: "UTC".to_string(),
            ics: ics.into(),
            notifications: Vec::new(),
            is_organizer: false,
            owned_addresses: Vec::new(),
            shared_event_id: None,
            shared_key_packet: None,
            calendar_key_packet: None,
            address_key_packet: None,
        }
    }
}
