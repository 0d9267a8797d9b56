//! Document shapes consumed from the content store.
//!
//! These mirror the authoring schema in [`crate::schema`] by convention only:
//! the store owns the records and nothing here validates them. Every field
//! is lenient on the way in. A missing, `null` or wrongly shaped value
//! deserializes to its default so a half-filled document still renders, a
//! malformed date becomes `None`, and a bad rich-text block is dropped
//! without taking its siblings with it.

use crate::imaging::ImageSource;
use crate::portable_text::Block;
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// URL-safe unique identifier of a document, as stored by the studio.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slug {
    #[serde(default, deserialize_with = "lenient")]
    pub current: String,
}

impl Slug {
    pub fn new(current: impl Into<String>) -> Self {
        Self {
            current: current.into(),
        }
    }
}

/// An `event` document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDoc {
    #[serde(rename = "_id", default, deserialize_with = "lenient")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient")]
    pub slug: Slug,
    /// Raw `eventType` value; see [`crate::event::EventType`] for the known set.
    #[serde(default, deserialize_with = "lenient")]
    pub event_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub end_date: Option<DateTime<Utc>>,
    /// Free-text start time, e.g. "10:00 AM".
    #[serde(default, deserialize_with = "lenient")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_at_finn_valley: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_blocks")]
    pub description: Option<Vec<Block>>,
    #[serde(default, deserialize_with = "lenient")]
    pub image: Option<ImageSource>,
    #[serde(default, deserialize_with = "lenient")]
    pub registration_required: bool,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub registration_deadline: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient")]
    pub registration_link: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub cost: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub age_categories: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub contact_person: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub contact_email: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub contact_phone: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_featured: bool,
    /// Raw `status` value; see [`crate::event::EventStatus`] for the known set.
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_blocks")]
    pub results: Option<Vec<Block>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub published_at: Option<DateTime<Utc>>,
}

/// A news `post` document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDoc {
    #[serde(rename = "_id", default, deserialize_with = "lenient")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient")]
    pub slug: Slug,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_blocks")]
    pub body: Option<Vec<Block>>,
    #[serde(default, deserialize_with = "lenient")]
    pub image: Option<ImageSource>,
}

/// Treat an explicit `null` the same as a missing field.
///
/// Projections return `null` for every listed field the document lacks, which
/// plain `#[serde(default)]` does not cover.
pub(crate) fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// Decode a field, falling back to its default when it is `null` or has the
/// wrong shape.
fn lenient<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    let value = Value::deserialize(d)?;
    if value.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(value).unwrap_or_else(|e| {
        warn!(error = %e, "Malformed field in document, ignoring");
        T::default()
    }))
}

/// Rich text decoded block by block. Blocks that do not decode are skipped;
/// a value that is not a list at all is treated as absent.
fn lenient_blocks<'de, D>(d: D) -> Result<Option<Vec<Block>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(d)? {
        Value::Null => None,
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| {
                    serde_json::from_value(item)
                        .inspect_err(|e| warn!(error = %e, "Skipping malformed rich-text block"))
                        .ok()
                })
                .collect(),
        ),
        _ => {
            warn!("Rich text is not a block list, ignoring");
            None
        }
    })
}

/// Accept RFC 3339 datetimes and plain `YYYY-MM-DD` dates.
///
/// Anything else is logged and dropped so one bad field cannot take down a
/// listing page.
fn lenient_datetime<'de, D>(d: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(d)? {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => parse_datetime(&s).or_else(|| {
            warn!(value = %s, "Unparseable date in document, ignoring");
            None
        }),
        _ => None,
    })
}

/// Parse a stored datetime or date string into a UTC instant.
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn event_nulls_become_defaults() {
        let json = r#"{
            "_id": "e1",
            "title": "Club Champs",
            "slug": {"current": "club-champs"},
            "isAtFinnValley": null,
            "isFeatured": null,
            "ageCategories": null,
            "registrationRequired": null,
            "location": null
        }"#;
        let event: EventDoc = serde_json::from_str(json).unwrap();
        assert!(!event.is_at_finn_valley);
        assert!(!event.is_featured);
        assert!(!event.registration_required);
        assert!(event.age_categories.is_empty());
        assert!(event.location.is_none());
    }

    #[test]
    fn event_missing_fields_use_defaults() {
        let event: EventDoc = serde_json::from_str("{}").unwrap();
        assert_eq!(event.title, "");
        assert_eq!(event.slug.current, "");
        assert!(event.date.is_none());
        assert!(event.status.is_none());
    }

    #[test]
    fn event_reads_camel_case_fields() {
        let json = r#"{
            "eventType": "road-race",
            "date": "2025-06-14T09:30:00.000Z",
            "registrationDeadline": "2025-06-01T00:00:00Z",
            "registrationLink": "https://example.com/enter",
            "contactEmail": "race@example.com",
            "ageCategories": ["u17", "senior"]
        }"#;
        let event: EventDoc = serde_json::from_str(json).unwrap();
        assert_eq!(event.event_type.as_deref(), Some("road-race"));
        assert_eq!(
            event.date,
            Some(Utc.with_ymd_and_hms(2025, 6, 14, 9, 30, 0).unwrap())
        );
        assert_eq!(
            event.registration_link.as_deref(),
            Some("https://example.com/enter")
        );
        assert_eq!(event.contact_email.as_deref(), Some("race@example.com"));
        assert_eq!(event.age_categories, vec!["u17", "senior"]);
    }

    #[test]
    fn malformed_date_is_dropped_not_fatal() {
        let event: EventDoc =
            serde_json::from_str(r#"{"title": "x", "date": "next tuesday"}"#).unwrap();
        assert!(event.date.is_none());
        assert_eq!(event.title, "x");
    }

    #[test]
    fn wrongly_shaped_fields_fall_back_to_defaults() {
        let json = r#"{
            "title": "Club Champs",
            "description": "Plain text description",
            "results": {"not": "blocks"},
            "ageCategories": "senior",
            "image": {"_type": "image"},
            "isFeatured": "yes",
            "cost": 5
        }"#;
        let event: EventDoc = serde_json::from_str(json).unwrap();
        assert_eq!(event.title, "Club Champs");
        assert!(event.description.is_none());
        assert!(event.results.is_none());
        assert!(event.age_categories.is_empty());
        assert!(event.image.is_none());
        assert!(!event.is_featured);
        assert!(event.cost.is_none());
    }

    #[test]
    fn bad_block_is_dropped_but_siblings_kept() {
        let json = r#"{
            "body": [
                {"_type": "block", "children": "oops"},
                {"_type": "block", "children": [{"_type": "span", "text": "Kept"}]}
            ]
        }"#;
        let post: PostDoc = serde_json::from_str(json).unwrap();
        let body = post.body.unwrap();
        assert_eq!(body.len(), 1);
        assert_eq!(crate::portable_text::excerpt(&body, 150).as_deref(), Some("Kept..."));
    }

    #[test]
    fn parse_datetime_accepts_plain_dates() {
        assert_eq!(
            parse_datetime("2025-03-02"),
            Some(Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_datetime("02/03/2025"), None);
    }

    #[test]
    fn post_deserializes_image_reference() {
        let json = r#"{
            "_id": "p1",
            "title": "Results",
            "slug": {"current": "results"},
            "publishedAt": "2025-05-01T12:00:00Z",
            "image": {"_type": "image", "asset": {"_ref": "image-abc123-1600x900-jpg"}}
        }"#;
        let post: PostDoc = serde_json::from_str(json).unwrap();
        assert_eq!(post.slug.current, "results");
        assert_eq!(
            post.image.as_ref().and_then(|i| i.asset_ref()),
            Some("image-abc123-1600x900-jpg")
        );
    }
}
