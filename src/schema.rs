//! Authoring schema for the studio.
//!
//! Declares the `event` and `post` document kinds: their fields, which are
//! required, the fixed option lists, initial values, and when a field is
//! hidden. The studio consumes this as JSON (`schema` command and
//! `/studio/schema.json`). Pages never read it; they trust documents to
//! have the shape declared here.
//!
//! [`check_document`] applies the same rules to stored documents so a
//! dataset can be audited from the command line.

use crate::event::{AgeCategory, EventStatus, EventType};
use crate::types::parse_datetime;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Url;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use strum::IntoEnumIterator;

/// Storage type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    String,
    Text,
    Slug,
    Datetime,
    Boolean,
    Url,
    Email,
    Image,
    /// Rich text: an array of blocks.
    Blocks,
    /// An array of strings.
    StringList,
}

/// A literal a visibility rule compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Str(&'static str),
}

impl Literal {
    fn matches(self, value: Option<&Value>) -> bool {
        match (self, value) {
            (Literal::Bool(b), Some(Value::Bool(v))) => b == *v,
            (Literal::Str(s), Some(Value::String(v))) => s == v.as_str(),
            _ => false,
        }
    }
}

/// When a field is hidden, as a predicate over its sibling fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "rule", rename_all = "camelCase")]
pub enum Visibility {
    #[default]
    Always,
    /// Hidden while `field` equals `equals`.
    HiddenWhen {
        field: &'static str,
        equals: Literal,
    },
    /// Hidden unless `field` equals `equals`. A missing sibling hides.
    HiddenUnless {
        field: &'static str,
        equals: Literal,
    },
}

impl Visibility {
    pub fn is_hidden(&self, parent: &Map<String, Value>) -> bool {
        match *self {
            Visibility::Always => false,
            Visibility::HiddenWhen { field, equals } => equals.matches(parent.get(field)),
            Visibility::HiddenUnless { field, equals } => !equals.matches(parent.get(field)),
        }
    }

    pub fn is_conditional(&self) -> bool {
        !matches!(self, Visibility::Always)
    }
}

/// One entry of a fixed option list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OptionItem {
    pub title: &'static str,
    pub value: &'static str,
}

/// How an option list is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Dropdown,
    Radio,
}

/// Value a new document starts with.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Initial {
    Constant(Value),
    /// The moment the document is created.
    Now,
}

impl Initial {
    pub fn value_at(&self, now: DateTime<Utc>) -> Value {
        match self {
            Initial::Constant(v) => v.clone(),
            Initial::Now => Value::String(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    pub name: &'static str,
    pub title: &'static str,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub required: bool,
    pub hidden: Visibility,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial: Option<Initial>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    /// Slug fields: the field the slug is generated from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<&'static str>,
    /// Image fields: whether editors can pick a focal point.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub hotspot: bool,
    /// Text fields: editor height.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<u8>,
}

impl FieldDef {
    pub fn new(name: &'static str, title: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            title,
            kind,
            required: false,
            hidden: Visibility::Always,
            options: Vec::new(),
            layout: None,
            initial: None,
            description: None,
            source: None,
            hotspot: false,
            rows: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn hidden(mut self, visibility: Visibility) -> Self {
        self.hidden = visibility;
        self
    }

    pub fn options(mut self, options: Vec<OptionItem>, layout: Option<Layout>) -> Self {
        self.options = options;
        self.layout = layout;
        self
    }

    pub fn initial(mut self, initial: Initial) -> Self {
        self.initial = Some(initial);
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    pub fn from_source(mut self, field: &'static str) -> Self {
        self.source = Some(field);
        self
    }

    pub fn with_hotspot(mut self) -> Self {
        self.hotspot = true;
        self
    }

    pub fn rows(mut self, rows: u8) -> Self {
        self.rows = Some(rows);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderingDef {
    pub name: &'static str,
    pub title: &'static str,
    pub field: &'static str,
    pub direction: &'static str,
}

/// What the studio's document list shows for each entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewDef {
    pub title: &'static str,
    /// Fields joined with ` • ` as the subtitle.
    pub subtitle: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSchema {
    pub name: &'static str,
    pub title: &'static str,
    pub fields: Vec<FieldDef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub orderings: Vec<OrderingDef>,
    pub preview: PreviewDef,
}

impl DocumentSchema {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// A new document with every initial value filled in.
    pub fn initial_document(&self, now: DateTime<Utc>) -> Map<String, Value> {
        let mut doc = Map::new();
        doc.insert("_type".into(), Value::String(self.name.to_string()));
        for field in &self.fields {
            if let Some(initial) = &field.initial {
                doc.insert(field.name.to_string(), initial.value_at(now));
            }
        }
        doc
    }
}

fn option_list<T: IntoEnumIterator + Into<&'static str> + Copy>(
    title: impl Fn(T) -> &'static str,
) -> Vec<OptionItem> {
    T::iter()
        .map(|v| OptionItem {
            title: title(v),
            value: v.into(),
        })
        .collect()
}

pub fn event_schema() -> DocumentSchema {
    let not_at_home = Visibility::HiddenWhen {
        field: "isAtFinnValley",
        equals: Literal::Bool(true),
    };
    let needs_registration = Visibility::HiddenUnless {
        field: "registrationRequired",
        equals: Literal::Bool(true),
    };

    DocumentSchema {
        name: "event",
        title: "Event",
        fields: vec![
            FieldDef::new("title", "Event Title", FieldKind::String).required(),
            FieldDef::new("slug", "Slug", FieldKind::Slug).from_source("title").required(),
            FieldDef::new("eventType", "Event Type", FieldKind::String)
                .options(option_list(EventType::title), Some(Layout::Dropdown))
                .required(),
            FieldDef::new("date", "Event Date", FieldKind::Datetime).required(),
            FieldDef::new("endDate", "End Date (Optional)", FieldKind::Datetime)
                .describe("For multi-day events"),
            FieldDef::new("time", "Start Time", FieldKind::String)
                .describe("e.g., \"10:00 AM\" or \"18:30\""),
            FieldDef::new("isAtFinnValley", "Hosted at Finn Valley AC", FieldKind::Boolean)
                .initial(Initial::Constant(Value::Bool(true)))
                .describe("Check this if the event is at our home track"),
            FieldDef::new("location", "Venue/Location", FieldKind::String)
                .required()
                .hidden(not_at_home)
                .describe("Only fill this if event is NOT at Finn Valley AC"),
            FieldDef::new("address", "Full Address", FieldKind::Text)
                .rows(3)
                .hidden(not_at_home)
                .describe("Only fill this if event is NOT at Finn Valley AC"),
            FieldDef::new("description", "Event Description", FieldKind::Blocks).required(),
            FieldDef::new("image", "Event Image", FieldKind::Image).with_hotspot(),
            FieldDef::new("registrationRequired", "Registration Required", FieldKind::Boolean)
                .initial(Initial::Constant(Value::Bool(false))),
            FieldDef::new("registrationDeadline", "Registration Deadline", FieldKind::Datetime)
                .hidden(needs_registration),
            FieldDef::new("registrationLink", "Registration Link", FieldKind::Url).hidden(needs_registration),
            FieldDef::new("cost", "Entry Fee/Cost", FieldKind::String)
                .describe("e.g., \"Free\", \"€10\", \"€5 members / €10 non-members\""),
            FieldDef::new("ageCategories", "Age Categories", FieldKind::StringList)
                .options(option_list(AgeCategory::title), None),
            FieldDef::new("contactPerson", "Contact Person", FieldKind::String),
            FieldDef::new("contactEmail", "Contact Email", FieldKind::Email),
            FieldDef::new("contactPhone", "Contact Phone", FieldKind::String),
            FieldDef::new("isFeatured", "Featured Event", FieldKind::Boolean)
                .initial(Initial::Constant(Value::Bool(false)))
                .describe("Show this event prominently on the homepage"),
            FieldDef::new("status", "Event Status", FieldKind::String)
                .options(option_list(EventStatus::title), Some(Layout::Radio))
                .initial(Initial::Constant(Value::String("upcoming".into())))
                .required(),
            FieldDef::new("results", "Event Results", FieldKind::Blocks)
                .hidden(Visibility::HiddenUnless {
                    field: "status",
                    equals: Literal::Str("completed"),
                })
                .describe("Add results after the event is completed"),
            FieldDef::new("publishedAt", "Published At", FieldKind::Datetime)
                .initial(Initial::Now)
                .required(),
        ],
        orderings: vec![
            OrderingDef {
                name: "dateDesc",
                title: "Event Date, New",
                field: "date",
                direction: "desc",
            },
            OrderingDef {
                name: "dateAsc",
                title: "Event Date, Old",
                field: "date",
                direction: "asc",
            },
            OrderingDef {
                name: "titleAsc",
                title: "Title A-Z",
                field: "title",
                direction: "asc",
            },
        ],
        preview: PreviewDef {
            title: "title",
            subtitle: vec!["eventType", "date"],
            media: Some("image"),
        },
    }
}

pub fn post_schema() -> DocumentSchema {
    DocumentSchema {
        name: "post",
        title: "News Post",
        fields: vec![
            FieldDef::new("title", "Title", FieldKind::String).required(),
            FieldDef::new("slug", "Slug", FieldKind::Slug).from_source("title").required(),
            FieldDef::new("publishedAt", "Published At", FieldKind::Datetime)
                .initial(Initial::Now)
                .required(),
            FieldDef::new("image", "Main Image", FieldKind::Image).with_hotspot(),
            FieldDef::new("body", "Body", FieldKind::Blocks),
        ],
        orderings: vec![OrderingDef {
            name: "publishedAtDesc",
            title: "Published, New",
            field: "publishedAt",
            direction: "desc",
        }],
        preview: PreviewDef {
            title: "title",
            subtitle: vec!["publishedAt"],
            media: Some("image"),
        },
    }
}

/// Every document kind the site reads.
pub fn all_schemas() -> Vec<DocumentSchema> {
    vec![event_schema(), post_schema()]
}

/// The schema list as pretty JSON, as handed to the studio.
pub fn schema_json() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&all_schemas())
}

// =============================================================================
// Document checks
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    /// A required, always-visible field is empty.
    Missing,
    /// Value is outside the field's option list.
    NotAnOption(String),
    /// Value does not have the declared type.
    Invalid(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub problem: Problem,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.problem {
            Problem::Missing => write!(f, "{}: required but empty", self.field),
            Problem::NotAnOption(v) => write!(f, "{}: {v:?} is not an allowed value", self.field),
            Problem::Invalid(expected) => write!(f, "{}: expected {expected}", self.field),
        }
    }
}

/// Check a stored document against its schema.
///
/// Hidden fields are skipped. A field that is required but only
/// conditionally visible gets no required-check verdict at all: whether the
/// studio enforces it while hidden is not known.
pub fn check_document(schema: &DocumentSchema, document: &Map<String, Value>) -> Vec<Violation> {
    let mut violations = Vec::new();
    for field in &schema.fields {
        if field.hidden.is_hidden(document) {
            continue;
        }
        let value = document.get(field.name).filter(|v| !is_empty(v));
        let Some(value) = value else {
            if field.required && !field.hidden.is_conditional() {
                violations.push(Violation {
                    field: field.name,
                    problem: Problem::Missing,
                });
            }
            continue;
        };
        if let Some(problem) = check_value(field, value) {
            violations.push(Violation {
                field: field.name,
                problem,
            });
        }
    }
    violations
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) if o.contains_key("current") => {
            o.get("current").and_then(Value::as_str).is_none_or(str::is_empty)
        }
        _ => false,
    }
}

fn in_options(field: &FieldDef, value: &str) -> Option<Problem> {
    (!field.options.is_empty() && !field.options.iter().any(|o| o.value == value))
        .then(|| Problem::NotAnOption(value.to_string()))
}

fn check_value(field: &FieldDef, value: &Value) -> Option<Problem> {
    match field.kind {
        FieldKind::String | FieldKind::Text => match value.as_str() {
            Some(s) => in_options(field, s),
            None => Some(Problem::Invalid("a string")),
        },
        FieldKind::Slug => value
            .get("current")
            .and_then(Value::as_str)
            .is_none()
            .then_some(Problem::Invalid("a slug")),
        FieldKind::Datetime => value
            .as_str()
            .and_then(parse_datetime)
            .is_none()
            .then_some(Problem::Invalid("a date")),
        FieldKind::Boolean => (!value.is_boolean()).then_some(Problem::Invalid("true or false")),
        FieldKind::Url => value
            .as_str()
            .and_then(|s| Url::parse(s).ok())
            .is_none()
            .then_some(Problem::Invalid("a URL")),
        FieldKind::Email => value
            .as_str()
            .is_none_or(|s| !looks_like_email(s))
            .then_some(Problem::Invalid("an email address")),
        FieldKind::Image => value
            .get("asset")
            .is_none()
            .then_some(Problem::Invalid("an image")),
        FieldKind::Blocks => (!value.is_array()).then_some(Problem::Invalid("rich text")),
        FieldKind::StringList => match value.as_array() {
            Some(items) => items.iter().find_map(|item| match item.as_str() {
                Some(s) => in_options(field, s),
                None => Some(Problem::Invalid("a list of strings")),
            }),
            None => Some(Problem::Invalid("a list of strings")),
        },
    }
}

fn looks_like_email(s: &str) -> bool {
    s.split_once('@')
        .is_some_and(|(user, domain)| !user.is_empty() && domain.contains('.'))
}

/// Check result for one stored document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReport {
    pub id: String,
    pub kind: &'static str,
    pub violations: Vec<Violation>,
}

impl DocumentReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Check every document whose `_type` has a schema. Other documents (assets,
/// system records) are ignored. Reports keep the input order.
pub fn check_dataset(documents: &[Value]) -> Vec<DocumentReport> {
    let schemas = all_schemas();
    documents
        .iter()
        .filter_map(|doc| {
            let fields = doc.as_object()?;
            let kind = fields.get("_type").and_then(Value::as_str)?;
            let schema = schemas.iter().find(|s| s.name == kind)?;
            Some(DocumentReport {
                id: fields
                    .get("_id")
                    .and_then(Value::as_str)
                    .unwrap_or("(no id)")
                    .to_string(),
                kind: schema.name,
                violations: check_document(schema, fields),
            })
        })
        .collect()
}
