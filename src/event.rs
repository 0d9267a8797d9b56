//! Presentation rules for events.
//!
//! Everything a page needs to decide about an event beyond its raw fields:
//! badge styles and labels, registration state, where it takes place, map
//! links, and how a batch of events is split across the events page.
//! All functions are pure; the current moment is passed in.

use crate::config::VenueConfig;
use crate::types::EventDoc;
use chrono::{DateTime, Utc};
use reqwest::Url;
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// The nine kinds of event the studio offers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum EventType {
    TrackField,
    RoadRace,
    CrossCountry,
    Training,
    Competition,
    FunRun,
    Championship,
    Workshop,
    Social,
}

impl EventType {
    /// Option title shown in the studio.
    pub fn title(self) -> &'static str {
        match self {
            EventType::TrackField => "Track & Field Meet",
            EventType::RoadRace => "Road Race",
            EventType::CrossCountry => "Cross Country",
            EventType::Training => "Training Session",
            EventType::Competition => "Competition",
            EventType::FunRun => "Fun Run",
            EventType::Championship => "Championship",
            EventType::Workshop => "Workshop",
            EventType::Social => "Social Event",
        }
    }

    fn badge_class(self) -> &'static str {
        match self {
            EventType::TrackField => "border-blue-500 bg-blue-50 text-blue-800",
            EventType::RoadRace => "border-red-500 bg-red-50 text-red-800",
            EventType::CrossCountry => "border-green-500 bg-green-50 text-green-800",
            EventType::Training => "border-purple-500 bg-purple-50 text-purple-800",
            EventType::Competition => "border-orange-500 bg-orange-50 text-orange-800",
            EventType::FunRun => "border-pink-500 bg-pink-50 text-pink-800",
            EventType::Championship => "border-yellow-500 bg-yellow-50 text-yellow-800",
            EventType::Workshop => "border-indigo-500 bg-indigo-50 text-indigo-800",
            EventType::Social => "border-gray-500 bg-gray-50 text-gray-800",
        }
    }
}

/// Lifecycle of an event.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum EventStatus {
    Upcoming,
    RegistrationOpen,
    RegistrationClosed,
    Completed,
    Cancelled,
    Postponed,
}

impl EventStatus {
    pub fn title(self) -> &'static str {
        match self {
            EventStatus::Upcoming => "Upcoming",
            EventStatus::RegistrationOpen => "Registration Open",
            EventStatus::RegistrationClosed => "Registration Closed",
            EventStatus::Completed => "Completed",
            EventStatus::Cancelled => "Cancelled",
            EventStatus::Postponed => "Postponed",
        }
    }

    fn badge_class(self) -> &'static str {
        match self {
            EventStatus::Upcoming => "bg-blue-100 text-blue-800",
            EventStatus::RegistrationOpen => "bg-green-100 text-green-800",
            EventStatus::RegistrationClosed => "bg-yellow-100 text-yellow-800",
            EventStatus::Completed => "bg-gray-100 text-gray-800",
            EventStatus::Cancelled => "bg-red-100 text-red-800",
            EventStatus::Postponed => "bg-orange-100 text-orange-800",
        }
    }
}

/// Age groups an event is open to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum AgeCategory {
    U9,
    U11,
    U13,
    U15,
    U17,
    U20,
    Senior,
    Masters,
    AllAges,
}

impl AgeCategory {
    pub fn title(self) -> &'static str {
        match self {
            AgeCategory::U9 => "Under 9",
            AgeCategory::U11 => "Under 11",
            AgeCategory::U13 => "Under 13",
            AgeCategory::U15 => "Under 15",
            AgeCategory::U17 => "Under 17",
            AgeCategory::U20 => "Under 20",
            AgeCategory::Senior => "Senior",
            AgeCategory::Masters => "Masters",
            AgeCategory::AllAges => "All Ages",
        }
    }
}

pub const FALLBACK_TYPE_BADGE: &str = "border-gray-500 bg-gray-50 text-gray-800";
pub const FALLBACK_STATUS_BADGE: &str = "bg-gray-100 text-gray-800";

/// Badge classes for a raw `eventType` value. Unknown or missing values get
/// the neutral style.
pub fn type_badge_class(raw: Option<&str>) -> &'static str {
    raw.and_then(|r| EventType::from_str(r).ok())
        .map_or(FALLBACK_TYPE_BADGE, EventType::badge_class)
}

/// Badge classes for a raw `status` value.
pub fn status_badge_class(raw: Option<&str>) -> &'static str {
    raw.and_then(|r| EventStatus::from_str(r).ok())
        .map_or(FALLBACK_STATUS_BADGE, EventStatus::badge_class)
}

/// Badge text: the raw value with its first `-` turned into a space.
pub fn badge_label(raw: &str) -> String {
    raw.replacen('-', " ", 1)
}

fn status_of(event: &EventDoc) -> Option<EventStatus> {
    event.status.as_deref().and_then(|s| EventStatus::from_str(s).ok())
}

fn type_of(event: &EventDoc) -> Option<EventType> {
    event
        .event_type
        .as_deref()
        .and_then(|t| EventType::from_str(t).ok())
}

/// Status is exactly `registration-open` and registration is required.
pub fn is_registration_open(event: &EventDoc) -> bool {
    status_of(event) == Some(EventStatus::RegistrationOpen) && event.registration_required
}

/// A deadline is set and lies strictly before `now`. Status is not consulted.
pub fn is_registration_closed(event: &EventDoc, now: DateTime<Utc>) -> bool {
    event.registration_deadline.is_some_and(|d| d < now)
}

/// What the registration panel offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationAction<'a> {
    Register { link: &'a str },
    Closed,
    ComingSoon,
}

/// The registration panel, or `None` when the event needs no registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationPanel<'a> {
    pub deadline: Option<DateTime<Utc>>,
    pub action: RegistrationAction<'a>,
}

pub fn registration_panel(event: &EventDoc, now: DateTime<Utc>) -> Option<RegistrationPanel<'_>> {
    if !event.registration_required {
        return None;
    }
    let link = event.registration_link.as_deref().filter(|l| !l.is_empty());
    let action = match link {
        Some(link) if is_registration_open(event) => RegistrationAction::Register { link },
        _ if is_registration_closed(event, now) => RegistrationAction::Closed,
        _ => RegistrationAction::ComingSoon,
    };
    Some(RegistrationPanel {
        deadline: event.registration_deadline,
        action,
    })
}

/// Where an event happens, as shown to visitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayVenue<'a> {
    pub location: Option<&'a str>,
    pub address: Option<&'a str>,
    pub is_home: bool,
}

/// Home events always show the club venue, whatever the document says.
pub fn display_venue<'a>(event: &'a EventDoc, venue: &'a VenueConfig) -> DisplayVenue<'a> {
    if event.is_at_finn_valley {
        DisplayVenue {
            location: Some(&venue.name),
            address: Some(&venue.address),
            is_home: true,
        }
    } else {
        DisplayVenue {
            location: event.location.as_deref().filter(|s| !s.is_empty()),
            address: event.address.as_deref().filter(|s| !s.is_empty()),
            is_home: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapLinks {
    pub google: String,
    pub apple: String,
}

/// Links to open the venue in a maps app.
///
/// The home venue uses its fixed place links. Away events also get links
/// (a departure from the club's earlier site, which only linked the home
/// venue): they search for the address, or the location name when no
/// address is set.
pub fn map_links(event: &EventDoc, venue: &VenueConfig) -> Option<MapLinks> {
    let shown = display_venue(event, venue);
    if shown.is_home {
        return Some(MapLinks {
            google: venue.google_maps_url.clone(),
            apple: venue.apple_maps_url.clone(),
        });
    }
    let target = shown.address.or(shown.location)?;
    let google =
        Url::parse_with_params("https://www.google.com/maps/search/", [("api", "1"), ("query", target)])
            .ok()?;
    let apple = Url::parse_with_params("https://maps.apple.com/", [("q", target)]).ok()?;
    Some(MapLinks {
        google: google.into(),
        apple: apple.into(),
    })
}

/// Results are only shown once the event is completed and has some.
pub fn shows_results(event: &EventDoc) -> bool {
    status_of(event) == Some(EventStatus::Completed)
        && event.results.as_ref().is_some_and(|r| !r.is_empty())
}

/// Age category titles for display, uppercased. Unknown values pass through.
pub fn age_category_labels(event: &EventDoc) -> Vec<String> {
    event
        .age_categories
        .iter()
        .map(|raw| raw.to_uppercase())
        .collect()
}

/// The events page's three sections, drawn from one batch.
///
/// Membership is decided per section, so one event may appear in several.
#[derive(Debug, Default)]
pub struct EventSections<'a> {
    pub featured: Vec<&'a EventDoc>,
    pub upcoming: Vec<&'a EventDoc>,
    pub training: Vec<&'a EventDoc>,
}

pub fn partition(events: &[EventDoc]) -> EventSections<'_> {
    EventSections {
        featured: events.iter().filter(|e| e.is_featured).collect(),
        upcoming: events
            .iter()
            .filter(|e| {
                matches!(
                    status_of(e),
                    Some(EventStatus::Upcoming | EventStatus::RegistrationOpen)
                )
            })
            .collect(),
        training: events
            .iter()
            .filter(|e| type_of(e) == Some(EventType::Training))
            .collect(),
    }
}

/// One line of the regular training schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingSlot {
    pub title: &'static str,
    pub days: &'static str,
    pub time: &'static str,
}

/// Shown when no training sessions are published.
pub const DEFAULT_TRAINING: [TrainingSlot; 3] = [
    TrainingSlot {
        title: "Track & Field Training",
        days: "Tuesdays & Thursdays",
        time: "6:30 PM",
    },
    TrainingSlot {
        title: "Junior Athletics",
        days: "Saturdays",
        time: "10:00 AM",
    },
    TrainingSlot {
        title: "Distance Running",
        days: "Sundays",
        time: "9:00 AM",
    },
];
