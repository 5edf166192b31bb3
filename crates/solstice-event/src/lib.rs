//! Calendar event core: the bidirectional bridge between the typed event
//! domain model and RFC 5545 iCalendar text.
//!
//! The grammar itself lives in `solstice-ical`; this crate layers the domain
//! logic on top: single-event materialization, recurring-series expansion
//! and classification, participant resolution, old/new fragment merging,
//! and the invitation/snapshot serializers.
//!
//! Every operation is a pure function over immutable inputs: each call
//! parses its own payload, holds the resulting tree only for the duration of
//! the call, and returns newly constructed values, so concurrent use from
//! multiple threads needs no coordination.

pub mod deps;
pub mod email;
pub mod error;
pub mod merge;
pub mod model;
pub mod participant;
pub mod reader;
pub mod recurrence;
pub mod validation;
pub mod writer;

pub use deps::ICalReaderDependencies;
pub use email::canonicalize_email;
pub use error::{ContractViolation, WriteError};
pub use merge::parse_and_merge;
pub use model::{
    AttendeeStatus, EventNotification, EventRecurrence, EventStatus, ICalAttendee, ICalEvent,
    ICalOrganizer, ICalParticipant, OwnedAddress, generate_ics_uid,
};
pub use participant::resolve_participant;
pub use reader::ICalReader;
pub use validation::{validate_event, validate_notification};
pub use writer::{
    BuildPart, InvitationMethod, VEventBuilder, snapshot_component, write_invitation,
    write_snapshot,
};
