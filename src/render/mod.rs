//! HTML rendering.
//!
//! Every page is a pure function from fetched documents to [`Markup`]. The
//! only async piece is [`render_route`], which issues the queries a route
//! needs and hands the results to the matching page function. Both the HTTP
//! server and the static export go through it, so a page looks the same
//! whichever way it is served.
//!
//! | Module | Pages |
//! |--------|-------|
//! | [`layout`] | document shell, navigation, studio pass-through |
//! | [`pages`] | home, about, contact, 404, 500 |
//! | [`news`] | newsroom list and post detail |
//! | [`events`] | events list and event detail |

pub mod events;
pub mod layout;
pub mod news;
pub mod pages;

use crate::client::ClientError;
use crate::config::{self, SiteConfig};
use crate::imaging::ImageResolver;
use crate::query;
use crate::source::{ContentSource, FetchOptions, fetch_many, fetch_one};
use crate::types::{EventDoc, PostDoc};
use chrono::{DateTime, Utc};
use maud::Markup;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use tracing::debug;

/// Bytes escaped in a slug path segment: everything but RFC 3986 unreserved.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const CSS_STATIC: &str = include_str!("../../static/style.css");

/// Everything a page needs besides its documents.
pub struct PageContext<'a> {
    pub config: &'a SiteConfig,
    pub images: ImageResolver,
    /// The moment the page is rendered. Registration deadlines compare against it.
    pub now: DateTime<Utc>,
    stylesheet: String,
}

impl<'a> PageContext<'a> {
    pub fn new(config: &'a SiteConfig, now: DateTime<Utc>) -> Self {
        let images = ImageResolver::new(
            config.content.project_id.clone(),
            config.content.dataset.clone(),
        );
        let stylesheet = format!(
            "{}\n\n{}",
            config::generate_theme_css(&config.theme),
            CSS_STATIC
        );
        Self {
            config,
            images,
            now,
            stylesheet,
        }
    }

    pub fn stylesheet(&self) -> &str {
        &self.stylesheet
    }

    /// Fetch hints derived from the configured refresh interval.
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions::revalidate(self.config.content.revalidate())
    }
}

/// A page the site can serve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    About,
    Contact,
    News,
    Post(String),
    Events,
    Event(String),
    /// Anything under the studio mount. Holds the path below it.
    Studio(String),
    NotFound,
}

impl Route {
    /// Map a request path onto a route. Trailing slashes are ignored and
    /// slug segments are percent-decoded.
    pub fn parse(path: &str, studio_base: &str) -> Route {
        let trimmed = path.trim_end_matches('/');
        if let Some(rest) = under(trimmed, studio_base) {
            return Route::Studio(rest.to_string());
        }
        let segments: Vec<&str> = trimmed.split('/').skip(1).collect();
        match segments.as_slice() {
            [] => Route::Home,
            ["about"] => Route::About,
            ["contact"] => Route::Contact,
            ["news"] => Route::News,
            ["news", slug] if !slug.is_empty() => {
                decode_segment(slug).map_or(Route::NotFound, Route::Post)
            }
            ["events"] => Route::Events,
            ["events", slug] if !slug.is_empty() => {
                decode_segment(slug).map_or(Route::NotFound, Route::Event)
            }
            _ => Route::NotFound,
        }
    }

    /// Canonical path for links.
    pub fn path(&self, studio_base: &str) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::About => "/about".to_string(),
            Route::Contact => "/contact".to_string(),
            Route::News => "/news".to_string(),
            Route::Post(slug) => format!("/news/{}", encode_segment(slug)),
            Route::Events => "/events".to_string(),
            Route::Event(slug) => format!("/events/{}", encode_segment(slug)),
            Route::Studio(rest) if rest.is_empty() => studio_base.to_string(),
            Route::Studio(rest) => format!("{studio_base}/{rest}"),
            Route::NotFound => "/404".to_string(),
        }
    }
}

/// Escape a slug for use as one path segment.
fn encode_segment(slug: &str) -> String {
    utf8_percent_encode(slug, SEGMENT).to_string()
}

/// Undo [`encode_segment`]. `None` when the bytes are not UTF-8.
fn decode_segment(segment: &str) -> Option<String> {
    percent_decode_str(segment)
        .decode_utf8()
        .ok()
        .map(|s| s.into_owned())
}

/// `Some(rest)` when `path` is `base` or lies below it.
fn under<'p>(path: &'p str, base: &str) -> Option<&'p str> {
    let rest = path.strip_prefix(base)?;
    if rest.is_empty() {
        Some("")
    } else {
        rest.strip_prefix('/')
    }
}

/// How a rendered page should be reported to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    Ok,
    /// The route itself does not exist.
    NotFound,
}

#[derive(Debug)]
pub struct Page {
    pub status: PageStatus,
    pub markup: Markup,
}

impl Page {
    fn ok(markup: Markup) -> Self {
        Self {
            status: PageStatus::Ok,
            markup,
        }
    }
}

/// Fetch what `route` needs and render it.
///
/// A slug that matches no document renders the page's "not found" state
/// with [`PageStatus::Ok`]; only unknown routes are [`PageStatus::NotFound`].
/// Fetch failures are returned to the caller.
pub async fn render_route<S>(
    source: &S,
    ctx: &PageContext<'_>,
    route: &Route,
) -> Result<Page, ClientError>
where
    S: ContentSource + ?Sized,
{
    let options = ctx.fetch_options();
    debug!(?route, "Rendering");
    let page = match route {
        Route::Home => {
            let featured: Vec<EventDoc> =
                fetch_many(source, &query::featured_events(), options).await?;
            Page::ok(pages::home(ctx, &featured))
        }
        Route::About => Page::ok(pages::about(ctx)),
        Route::Contact => Page::ok(pages::contact(ctx)),
        Route::News => {
            let posts: Vec<PostDoc> = fetch_many(source, &query::posts_list(), options).await?;
            Page::ok(news::list(ctx, &posts))
        }
        Route::Post(slug) => {
            let post: Option<PostDoc> =
                fetch_one(source, &query::post_by_slug(slug), options).await?;
            Page::ok(news::detail(ctx, post.as_ref()))
        }
        Route::Events => {
            let events: Vec<EventDoc> = fetch_many(source, &query::events_list(), options).await?;
            Page::ok(events::list(ctx, &events))
        }
        Route::Event(slug) => {
            let event: Option<EventDoc> =
                fetch_one(source, &query::event_by_slug(slug), options).await?;
            Page::ok(events::detail(ctx, event.as_ref()))
        }
        Route::Studio(_) => Page::ok(layout::studio_landing(ctx)),
        Route::NotFound => Page {
            status: PageStatus::NotFound,
            markup: pages::not_found(ctx),
        },
    };
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::fixture_source;

    fn ctx(config: &SiteConfig) -> PageContext<'_> {
        PageContext::new(config, crate::test_helpers::fixed_now())
    }

    #[test]
    fn parse_public_routes() {
        assert_eq!(Route::parse("/", "/studio"), Route::Home);
        assert_eq!(Route::parse("", "/studio"), Route::Home);
        assert_eq!(Route::parse("/about", "/studio"), Route::About);
        assert_eq!(Route::parse("/contact/", "/studio"), Route::Contact);
        assert_eq!(Route::parse("/news", "/studio"), Route::News);
        assert_eq!(
            Route::parse("/news/spring-league", "/studio"),
            Route::Post("spring-league".into())
        );
        assert_eq!(
            Route::parse("/events/parkrun/", "/studio"),
            Route::Event("parkrun".into())
        );
    }

    #[test]
    fn parse_studio_mount() {
        assert_eq!(Route::parse("/studio", "/studio"), Route::Studio(String::new()));
        assert_eq!(
            Route::parse("/studio/desk/event", "/studio"),
            Route::Studio("desk/event".into())
        );
        // A sibling path that merely shares the prefix is not the studio.
        assert_eq!(Route::parse("/studios", "/studio"), Route::NotFound);
        assert_eq!(Route::parse("/admin", "/admin"), Route::Studio(String::new()));
    }

    #[test]
    fn parse_unknown_routes() {
        assert_eq!(Route::parse("/news/a/b", "/studio"), Route::NotFound);
        assert_eq!(Route::parse("/gallery", "/studio"), Route::NotFound);
        assert_eq!(Route::parse("/about/team", "/studio"), Route::NotFound);
    }

    #[test]
    fn slugs_are_percent_decoded() {
        assert_eq!(
            Route::parse("/news/caf%C3%A9-run", "/studio"),
            Route::Post("café-run".into())
        );
        assert_eq!(
            Route::parse("/events/fun%20run", "/studio"),
            Route::Event("fun run".into())
        );
        assert_eq!(Route::parse("/events/%FF", "/studio"), Route::NotFound);
    }

    #[test]
    fn slug_paths_are_percent_encoded() {
        assert_eq!(
            Route::Post("café-run".into()).path("/studio"),
            "/news/caf%C3%A9-run"
        );
        assert_eq!(
            Route::Event("fun run".into()).path("/studio"),
            "/events/fun%20run"
        );
    }

    #[test]
    fn paths_round_trip() {
        for route in [
            Route::Home,
            Route::About,
            Route::News,
            Route::Post("agm".into()),
            Route::Event("xc".into()),
            Route::Studio("structure".into()),
        ] {
            assert_eq!(Route::parse(&route.path("/studio"), "/studio"), route);
        }
    }

    #[test]
    fn stylesheet_includes_theme_and_badges() {
        let config = SiteConfig::default();
        let ctx = ctx(&config);
        assert!(ctx.stylesheet().contains("--color-primary"));
        assert!(ctx.stylesheet().contains(".bg-green-100"));
    }

    #[tokio::test]
    async fn unknown_slug_is_not_an_error() {
        let config = SiteConfig::default();
        let source = fixture_source();
        let page = render_route(&source, &ctx(&config), &Route::Post("nope".into()))
            .await
            .unwrap();
        assert_eq!(page.status, PageStatus::Ok);
        assert!(page.markup.into_string().contains("Post Not Found"));

        let page = render_route(&source, &ctx(&config), &Route::Event("nope".into()))
            .await
            .unwrap();
        assert!(page.markup.into_string().contains("Event Not Found"));
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let config = SiteConfig::default();
        let page = render_route(&fixture_source(), &ctx(&config), &Route::NotFound)
            .await
            .unwrap();
        assert_eq!(page.status, PageStatus::NotFound);
    }

    #[tokio::test]
    async fn home_lists_featured_events() {
        let config = SiteConfig::default();
        let page = render_route(&fixture_source(), &ctx(&config), &Route::Home)
            .await
            .unwrap();
        let html = page.markup.into_string();
        assert!(html.contains("Welcome to Finn Valley Athletics Club"));
        assert!(html.contains("Donegal Cross Country Championships"));
    }
}
