//! Events, registrations and create-event validation.

use crate::error::{EventsError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use event_vibe_core::{EventId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

const MIN_NAME_CHARS: usize = 3;
const MIN_LOCATION_CHARS: usize = 3;
const MIN_DESCRIPTION_CHARS: usize = 10;

// ============================================================================
// Categories
// ============================================================================

/// Kind of event, as offered by the create-event form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Hackathons and coding contests.
    #[serde(rename = "Tech Competition")]
    TechCompetition,
    /// Talks.
    Seminar,
    /// Hands-on sessions.
    Workshop,
    /// Festivals, performances and the like.
    #[serde(rename = "Cultural Event")]
    CulturalEvent,
    /// Anything else.
    Other,
}

impl EventCategory {
    /// Every category, in form order.
    pub const ALL: [Self; 5] = [
        Self::TechCompetition,
        Self::Seminar,
        Self::Workshop,
        Self::CulturalEvent,
        Self::Other,
    ];

    /// Display label, also the stored value.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TechCompetition => "Tech Competition",
            Self::Seminar => "Seminar",
            Self::Workshop => "Workshop",
            Self::CulturalEvent => "Cultural Event",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for EventCategory {
    type Err = EventsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.label() == s)
            .ok_or_else(|| EventsError::InvalidInput("Please select an event type.".into()))
    }
}

// ============================================================================
// Events
// ============================================================================

/// A published event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event id.
    pub id: EventId,
    /// Title.
    pub name: String,
    /// Kind of event.
    pub category: EventCategory,
    /// Start.
    pub start_time: DateTime<Utc>,
    /// End. Equal to `start_time` unless given.
    pub end_time: DateTime<Utc>,
    /// Free-text venue or city.
    pub location: String,
    /// Long description.
    pub description: String,
    /// Organizer who published it.
    pub created_by: UserId,
    /// Publication time.
    pub created_at: DateTime<Utc>,
}

/// Create-event form input, unvalidated.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewEvent {
    /// Title, at least 3 characters.
    pub name: String,
    /// One of the [`EventCategory`] labels.
    pub category: String,
    /// Start date, see [`parse_event_date`].
    pub date: String,
    /// Optional end date, same formats.
    #[serde(default)]
    pub end_date: Option<String>,
    /// At least 3 characters.
    pub location: String,
    /// At least 10 characters.
    pub description: String,
}

fn require_chars(value: &str, min: usize, message: &str) -> Result<String> {
    let value = value.trim();
    if value.chars().count() < min {
        return Err(EventsError::InvalidInput(message.to_string()));
    }
    Ok(value.to_string())
}

impl NewEvent {
    /// Validate the form and build the event.
    ///
    /// # Errors
    ///
    /// [`EventsError::InvalidInput`] carrying the message for the first
    /// field that fails.
    pub fn into_event(self, created_by: UserId, now: DateTime<Utc>) -> Result<Event> {
        let name = require_chars(&self.name, MIN_NAME_CHARS, "Event name must be at least 3 characters.")?;
        let category: EventCategory = self.category.trim().parse()?;
        let start_time = parse_event_date(&self.date)
            .ok_or_else(|| EventsError::InvalidInput("Please enter a valid date.".into()))?;
        let end_time = match self.end_date.as_deref().map(str::trim) {
            None | Some("") => start_time,
            Some(end) => parse_event_date(end)
                .ok_or_else(|| EventsError::InvalidInput("Please enter a valid end date.".into()))?,
        };
        if end_time < start_time {
            return Err(EventsError::InvalidInput(
                "The event can't end before it starts.".into(),
            ));
        }
        let location = require_chars(
            &self.location,
            MIN_LOCATION_CHARS,
            "Location must be at least 3 characters.",
        )?;
        let description = require_chars(
            &self.description,
            MIN_DESCRIPTION_CHARS,
            "Description must be at least 10 characters.",
        )?;

        Ok(Event {
            id: EventId::new(),
            name,
            category,
            start_time,
            end_time,
            location,
            description,
            created_by,
            created_at: now,
        })
    }
}

/// Parse an event date.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` (a `datetime-local` input,
/// read as UTC) and `YYYY-MM-DD` (midnight UTC).
#[must_use]
pub fn parse_event_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(date_time) = DateTime::parse_from_rfc3339(input) {
        return Some(date_time.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// ============================================================================
// Registrations
// ============================================================================

/// A participant's registration, with the event fields copied in so the
/// "my registrations" list needs no join.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Who registered.
    pub user_id: UserId,
    /// For which event.
    pub event_id: EventId,
    /// Event name at registration time.
    pub event_name: String,
    /// Event location at registration time.
    pub event_location: String,
    /// Event start at registration time.
    pub event_date: DateTime<Utc>,
    /// When the registration was written.
    pub registered_at: DateTime<Utc>,
}

impl Registration {
    /// Registration of `user_id` for `event` at `now`.
    #[must_use]
    pub fn new(user_id: UserId, event: &Event, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            event_id: event.id,
            event_name: event.name.clone(),
            event_location: event.location.clone(),
            event_date: event.start_time,
            registered_at: now,
        }
    }
}

/// Result of a conditional registration write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// This call wrote the registration.
    Created(Registration),
    /// A registration for the same (user, event) already existed; it is
    /// returned unchanged and nothing was written.
    AlreadyRegistered(Registration),
}

impl ClaimOutcome {
    /// The stored registration.
    #[must_use]
    pub const fn registration(&self) -> &Registration {
        match self {
            Self::Created(registration) | Self::AlreadyRegistered(registration) => registration,
        }
    }

    /// Whether this call created it.
    #[must_use]
    pub const fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn form() -> NewEvent {
        NewEvent {
            name: "Rust Meetup".into(),
            category: "Workshop".into(),
            date: "2025-03-14T18:30".into(),
            end_date: None,
            location: "Austin, TX".into(),
            description: "Hands-on async Rust evening.".into(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_valid_form_builds_event_with_end_defaulting_to_start() {
        let organizer = UserId::new();
        let event = form().into_event(organizer, now()).unwrap();

        assert_eq!(event.name, "Rust Meetup");
        assert_eq!(event.category, EventCategory::Workshop);
        assert_eq!(event.start_time, Utc.with_ymd_and_hms(2025, 3, 14, 18, 30, 0).unwrap());
        assert_eq!(event.end_time, event.start_time);
        assert_eq!(event.created_by, organizer);
        assert_eq!(event.created_at, now());
    }

    #[test]
    fn test_each_rule_reports_its_form_message() {
        let cases = [
            (NewEvent { name: "ab".into(), ..form() }, "Event name must be at least 3 characters."),
            (NewEvent { category: "Party".into(), ..form() }, "Please select an event type."),
            (NewEvent { date: "next friday".into(), ..form() }, "Please enter a valid date."),
            (NewEvent { location: " x ".into(), ..form() }, "Location must be at least 3 characters."),
            (NewEvent { description: "too short".into(), ..form() }, "Description must be at least 10 characters."),
        ];

        for (input, message) in cases {
            assert_eq!(
                input.into_event(UserId::new(), now()),
                Err(EventsError::InvalidInput(message.into()))
            );
        }
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let input = NewEvent {
            end_date: Some("2025-03-13".into()),
            ..form()
        };
        assert!(matches!(
            input.into_event(UserId::new(), now()),
            Err(EventsError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_date_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 14, 0, 0, 0).unwrap();
        assert_eq!(parse_event_date("2025-03-14"), Some(expected));
        assert_eq!(parse_event_date("2025-03-14T00:00:00Z"), Some(expected));
        assert_eq!(parse_event_date("2025-03-14T02:00:00+02:00"), Some(expected));
        assert_eq!(parse_event_date("2025-03-14T00:00:00"), Some(expected));
        assert_eq!(parse_event_date("14/03/2025"), None);
        assert_eq!(parse_event_date(""), None);
    }

    proptest::proptest! {
        #[test]
        fn prop_padding_never_changes_the_event(pad in event_vibe_testing::properties::blank()) {
            let padded = NewEvent {
                name: format!("{pad}Rust Meetup{pad}"),
                location: format!("{pad}Austin, TX{pad}"),
                ..form()
            };
            let event = padded.into_event(UserId::new(), now()).unwrap();
            proptest::prop_assert_eq!(event.name, "Rust Meetup");
            proptest::prop_assert_eq!(event.location, "Austin, TX");
        }

        #[test]
        fn prop_short_names_are_rejected(name in "[a-z]{0,2}", pad in event_vibe_testing::properties::blank()) {
            let input = NewEvent { name: format!("{pad}{name}{pad}"), ..form() };
            proptest::prop_assert!(matches!(
                input.into_event(UserId::new(), now()),
                Err(EventsError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_category_labels_round_trip_through_serde() {
        for category in EventCategory::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.label()));
            assert_eq!(category.label().parse::<EventCategory>().unwrap(), category);
        }
    }
}
