//! Structured content queries.
//!
//! A [`Query`] describes one read against the content store: the document
//! kind, filters, ordering, how many results to keep, and which fields to
//! return. It renders to the store's query language with [`Query::to_groq`]
//! and can also be evaluated in-process against a list of documents with
//! [`Query::evaluate`], which is how dataset exports are served.
//!
//! The site's pages only ever issue the named queries at the bottom of this
//! module.

use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt::Write as _;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// A single filter term. Terms are joined with `&&`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Filter {
    /// `defined(path)`
    Defined(&'static str),
    /// `path == true`
    IsTrue(&'static str),
    /// `slug.current == $slug`
    SlugEquals,
}

/// How much of the ordered result set is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selection {
    /// Every match.
    All,
    /// `[0...n]`, at most `n` documents.
    Range(usize),
    /// `[0]`, a single document or null.
    First,
}

/// Which fields of each document are returned.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Projection {
    Document,
    Fields(&'static [&'static str]),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    name: &'static str,
    kind: &'static str,
    filters: Vec<Filter>,
    slug: Option<String>,
    order: Option<(&'static str, Direction)>,
    selection: Selection,
    projection: Projection,
}

impl Query {
    /// All documents of one kind, unordered, whole documents.
    pub fn documents(name: &'static str, kind: &'static str) -> Self {
        Self {
            name,
            kind,
            filters: Vec::new(),
            slug: None,
            order: None,
            selection: Selection::All,
            projection: Projection::Document,
        }
    }

    pub fn with_defined_slug(mut self) -> Self {
        self.filters.push(Filter::Defined("slug.current"));
        self
    }

    pub fn where_true(mut self, field: &'static str) -> Self {
        self.filters.push(Filter::IsTrue(field));
        self
    }

    /// Restrict to the document whose slug equals `slug`, bound as `$slug`.
    pub fn where_slug(mut self, slug: impl Into<String>) -> Self {
        self.filters.push(Filter::SlugEquals);
        self.slug = Some(slug.into());
        self
    }

    pub fn order_by(mut self, field: &'static str, direction: Direction) -> Self {
        self.order = Some((field, direction));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.selection = Selection::Range(n);
        self
    }

    pub fn first(mut self) -> Self {
        self.selection = Selection::First;
        self
    }

    pub fn project(mut self, fields: &'static [&'static str]) -> Self {
        self.projection = Projection::Fields(fields);
        self
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Render the query string sent to the store.
    pub fn to_groq(&self) -> String {
        let mut out = format!("*[_type == \"{}\"", self.kind);
        for filter in &self.filters {
            match filter {
                Filter::Defined(path) => write!(out, " && defined({path})"),
                Filter::IsTrue(path) => write!(out, " && {path} == true"),
                Filter::SlugEquals => write!(out, " && slug.current == $slug"),
            }
            .ok();
        }
        out.push(']');
        if let Some((field, direction)) = self.order {
            write!(out, " | order({field} {})", direction.as_str()).ok();
        }
        match self.selection {
            Selection::All => {}
            Selection::Range(n) => {
                write!(out, "[0...{n}]").ok();
            }
            Selection::First => out.push_str("[0]"),
        }
        if let Projection::Fields(fields) = self.projection {
            write!(out, "{{{}}}", fields.join(", ")).ok();
        }
        out
    }

    /// Bound parameters, keyed without the `$` sigil.
    pub fn params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        if let Some(slug) = &self.slug {
            params.insert("slug".to_string(), Value::String(slug.clone()));
        }
        params
    }

    /// Run the query over in-memory documents.
    ///
    /// Produces the same shape the store would: an array for list
    /// selections, a single document or `null` for [`Selection::First`].
    pub fn evaluate(&self, documents: &[Value]) -> Value {
        let mut matches: Vec<&Value> = documents.iter().filter(|d| self.matches(d)).collect();

        if let Some((field, direction)) = self.order {
            matches.sort_by(|a, b| {
                let ord = compare_values(lookup(a, field), lookup(b, field));
                match direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }

        let projected = matches.into_iter().map(|d| self.apply_projection(d));
        match self.selection {
            Selection::All => Value::Array(projected.collect()),
            Selection::Range(n) => Value::Array(projected.take(n).collect()),
            Selection::First => projected.take(1).next().unwrap_or(Value::Null),
        }
    }

    fn matches(&self, document: &Value) -> bool {
        if lookup(document, "_type").and_then(Value::as_str) != Some(self.kind) {
            return false;
        }
        self.filters.iter().all(|filter| match filter {
            Filter::Defined(path) => lookup(document, path).is_some_and(|v| !v.is_null()),
            Filter::IsTrue(path) => lookup(document, path) == Some(&Value::Bool(true)),
            Filter::SlugEquals => {
                let current = lookup(document, "slug.current").and_then(Value::as_str);
                current.is_some() && current == self.slug.as_deref()
            }
        })
    }

    fn apply_projection(&self, document: &Value) -> Value {
        match self.projection {
            Projection::Document => document.clone(),
            Projection::Fields(fields) => {
                let mut out = Map::new();
                for field in fields {
                    // The store drops null attributes from projections.
                    if let Some(value) = document.get(*field).filter(|v| !v.is_null()) {
                        out.insert((*field).to_string(), value.clone());
                    }
                }
                Value::Object(out)
            }
        }
    }
}

/// Resolve a dotted attribute path like `slug.current`.
fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(document, |value, key| value.get(key))
}

/// Total order used by `order()`: missing/null first, then booleans,
/// numbers, strings. ISO-8601 timestamps sort correctly as strings.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(_) => 4,
        }
    }
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

// =============================================================================
// Named queries
// =============================================================================

/// Fields shown on event cards.
pub const EVENT_LIST_FIELDS: &[&str] = &[
    "_id",
    "title",
    "slug",
    "eventType",
    "date",
    "time",
    "isAtFinnValley",
    "location",
    "description",
    "image",
    "status",
    "isFeatured",
    "cost",
    "registrationRequired",
];

/// Fields shown on the event detail page.
pub const EVENT_DETAIL_FIELDS: &[&str] = &[
    "_id",
    "title",
    "slug",
    "eventType",
    "date",
    "endDate",
    "time",
    "isAtFinnValley",
    "location",
    "address",
    "description",
    "image",
    "registrationRequired",
    "registrationDeadline",
    "registrationLink",
    "cost",
    "ageCategories",
    "contactPerson",
    "contactEmail",
    "contactPhone",
    "status",
    "results",
];

pub const POST_LIST_FIELDS: &[&str] = &["_id", "title", "slug", "publishedAt", "body"];

const SLUG_FIELDS: &[&str] = &["slug"];

pub const EVENTS_LIMIT: usize = 20;
pub const FEATURED_LIMIT: usize = 3;
pub const POSTS_LIMIT: usize = 12;

/// Events page: soonest first.
pub fn events_list() -> Query {
    Query::documents("events_list", "event")
        .with_defined_slug()
        .order_by("date", Direction::Asc)
        .limit(EVENTS_LIMIT)
        .project(EVENT_LIST_FIELDS)
}

pub fn event_by_slug(slug: &str) -> Query {
    Query::documents("event_by_slug", "event")
        .where_slug(slug)
        .first()
        .project(EVENT_DETAIL_FIELDS)
}

/// Home page highlight strip.
pub fn featured_events() -> Query {
    Query::documents("featured_events", "event")
        .with_defined_slug()
        .where_true("isFeatured")
        .order_by("date", Direction::Asc)
        .limit(FEATURED_LIMIT)
        .project(EVENT_LIST_FIELDS)
}

/// Newsroom: newest first.
pub fn posts_list() -> Query {
    Query::documents("posts_list", "post")
        .with_defined_slug()
        .order_by("publishedAt", Direction::Desc)
        .limit(POSTS_LIMIT)
        .project(POST_LIST_FIELDS)
}

pub fn post_by_slug(slug: &str) -> Query {
    Query::documents("post_by_slug", "post").where_slug(slug).first()
}

pub fn event_slugs() -> Query {
    Query::documents("event_slugs", "event")
        .with_defined_slug()
        .project(SLUG_FIELDS)
}

pub fn post_slugs() -> Query {
    Query::documents("post_slugs", "post")
        .with_defined_slug()
        .project(SLUG_FIELDS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(slug: Option<&str>, date: &str, featured: bool) -> Value {
        let mut doc = json!({
            "_type": "event",
            "_id": format!("ev-{date}"),
            "title": format!("Event {date}"),
            "date": date,
            "isFeatured": featured,
            "internalNotes": "not projected",
        });
        if let Some(s) = slug {
            doc["slug"] = json!({"current": s});
        }
        doc
    }

    fn dataset() -> Vec<Value> {
        vec![
            event(Some("late"), "2025-09-01T10:00:00Z", true),
            event(Some("early"), "2025-03-01T10:00:00Z", false),
            event(None, "2025-01-01T10:00:00Z", true),
            event(Some("mid"), "2025-06-01T10:00:00Z", true),
            json!({"_type": "post", "_id": "p1", "slug": {"current": "early"}, "publishedAt": "2025-01-01"}),
        ]
    }

    #[test]
    fn events_list_groq() {
        assert_eq!(
            events_list().to_groq(),
            "*[_type == \"event\" && defined(slug.current)] | order(date asc)[0...20]\
             {_id, title, slug, eventType, date, time, isAtFinnValley, location, description, \
             image, status, isFeatured, cost, registrationRequired}"
        );
        assert!(events_list().params().is_empty());
    }

    #[test]
    fn slug_query_binds_parameter() {
        let q = post_by_slug("spring-10k");
        assert_eq!(
            q.to_groq(),
            "*[_type == \"post\" && slug.current == $slug][0]"
        );
        assert_eq!(q.params().get("slug"), Some(&json!("spring-10k")));
    }

    #[test]
    fn posts_list_orders_newest_first() {
        let groq = posts_list().to_groq();
        assert!(groq.contains("order(publishedAt desc)[0...12]"));
        assert!(groq.ends_with("{_id, title, slug, publishedAt, body}"));
    }

    #[test]
    fn featured_query_filters_on_flag() {
        let groq = featured_events().to_groq();
        assert!(groq.contains("isFeatured == true"));
        assert!(groq.contains("[0...3]"));
    }

    #[test]
    fn evaluate_filters_kind_and_undefined_slugs() {
        let result = events_list().evaluate(&dataset());
        let slugs: Vec<_> = result
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["slug"]["current"].as_str().unwrap())
            .collect();
        assert_eq!(slugs, ["early", "mid", "late"]);
    }

    #[test]
    fn evaluate_projects_listed_fields_only() {
        let result = events_list().evaluate(&dataset());
        let first = &result[0];
        assert!(first.get("internalNotes").is_none());
        assert!(first.get("_type").is_none());
        assert_eq!(first["title"], "Event 2025-03-01T10:00:00Z");
        // Absent attributes are dropped rather than returned as null.
        assert!(first.get("cost").is_none());
    }

    #[test]
    fn evaluate_applies_limit() {
        let docs: Vec<Value> = (0..30)
            .map(|i| event(Some(&format!("e{i}")), &format!("2025-01-{:02}", i % 28 + 1), false))
            .collect();
        let result = events_list().evaluate(&docs);
        assert_eq!(result.as_array().unwrap().len(), EVENTS_LIMIT);
    }

    #[test]
    fn evaluate_featured_subset() {
        let result = featured_events().evaluate(&dataset());
        let slugs: Vec<_> = result
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["slug"]["current"].as_str().unwrap())
            .collect();
        assert_eq!(slugs, ["mid", "late"]);
    }

    #[test]
    fn evaluate_first_returns_single_or_null() {
        let found = event_by_slug("mid").evaluate(&dataset());
        assert_eq!(found["_id"], "ev-2025-06-01T10:00:00Z");

        let missing = event_by_slug("nope").evaluate(&dataset());
        assert!(missing.is_null());
    }

    #[test]
    fn slug_match_is_kind_scoped() {
        // "early" exists as both an event and a post.
        let post = post_by_slug("early").evaluate(&dataset());
        assert_eq!(post["_id"], "p1");
        // Whole document projection keeps every attribute.
        assert_eq!(post["_type"], "post");
    }

    #[test]
    fn descending_order_puts_missing_values_last() {
        let docs = vec![
            json!({"_type": "post", "slug": {"current": "a"}, "publishedAt": "2025-01-01"}),
            json!({"_type": "post", "slug": {"current": "b"}}),
            json!({"_type": "post", "slug": {"current": "c"}, "publishedAt": "2025-05-01"}),
        ];
        let result = posts_list().evaluate(&docs);
        let slugs: Vec<_> = result
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["slug"]["current"].as_str().unwrap())
            .collect();
        assert_eq!(slugs, ["c", "a", "b"]);
    }

    #[test]
    fn slug_queries_return_every_match() {
        let result = event_slugs().evaluate(&dataset());
        assert_eq!(result.as_array().unwrap().len(), 3);
        assert_eq!(result[0], json!({"slug": {"current": "late"}}));
    }
}
