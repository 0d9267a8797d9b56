//! Static export.
//!
//! Renders every public page once and writes it to disk, so the site can be
//! hosted without a running server. Pages go through the same
//! [`render_route`] as live requests.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── 404.html
//! ├── about/index.html
//! ├── contact/index.html
//! ├── news/
//! │   ├── index.html
//! │   └── {slug}/index.html
//! ├── events/
//! │   ├── index.html
//! │   └── {slug}/index.html
//! ├── studio/
//! │   ├── index.html             # Pointer to the hosted studio
//! │   └── schema.json            # Document schemas for the studio
//! └── assets/                    # Files from [site] assets_dir, copied as-is
//! ```
//!
//! Detail pages are enumerated from slug queries that bypass the cache, so
//! an export always reflects the store at the moment it runs.

use crate::client::ClientError;
use crate::config::SiteConfig;
use crate::query;
use crate::render::{PageContext, Route, render_route};
use crate::schema;
use crate::source::{ContentSource, FetchOptions, fetch_many};
use crate::types::Slug;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("content error: {0}")]
    Client(#[from] ClientError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("asset copy failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("assets directory not found: {0}")]
    MissingAssets(PathBuf),
}

/// One written page: what it is and where it landed, relative to the
/// output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenPage {
    pub route: Route,
    pub path: String,
}

/// Everything a build wrote.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub output_dir: PathBuf,
    /// Fixed pages, including the 404 page.
    pub pages: Vec<WrittenPage>,
    pub posts: Vec<WrittenPage>,
    pub events: Vec<WrittenPage>,
    /// Studio landing and schema files.
    pub studio: Vec<String>,
    /// Copied asset files.
    pub assets: Vec<String>,
    /// Slugs that could not be used as a directory name.
    pub skipped: Vec<String>,
}

#[derive(Deserialize)]
struct SlugOnly {
    #[serde(default)]
    slug: Slug,
}

/// Output directory for copied assets; matches the server's `/assets` mount.
const ASSETS_DIR: &str = "assets";

const FIXED_ROUTES: [Route; 5] = [
    Route::Home,
    Route::About,
    Route::Contact,
    Route::News,
    Route::Events,
];

/// Render the whole site into `output_dir`.
pub async fn build_site<S>(
    source: &S,
    config: &SiteConfig,
    output_dir: &Path,
    now: DateTime<Utc>,
) -> Result<BuildReport, GenerateError>
where
    S: ContentSource + ?Sized,
{
    let ctx = PageContext::new(config, now);
    let mut report = BuildReport {
        output_dir: output_dir.to_path_buf(),
        ..BuildReport::default()
    };
    fs::create_dir_all(output_dir)?;

    for route in FIXED_ROUTES {
        let written = write_route(source, &ctx, output_dir, route).await?;
        report.pages.push(written);
    }

    let not_found = render_route(source, &ctx, &Route::NotFound).await?;
    fs::write(output_dir.join("404.html"), not_found.markup.into_string())?;
    report.pages.push(WrittenPage {
        route: Route::NotFound,
        path: "404.html".to_string(),
    });

    for slug in slugs(source, &query::post_slugs(), &mut report.skipped).await? {
        let written = write_route(source, &ctx, output_dir, Route::Post(slug)).await?;
        report.posts.push(written);
    }
    for slug in slugs(source, &query::event_slugs(), &mut report.skipped).await? {
        let written = write_route(source, &ctx, output_dir, Route::Event(slug)).await?;
        report.events.push(written);
    }

    report.studio = write_studio(source, &ctx, output_dir).await?;

    if let Some(assets_dir) = &config.site.assets_dir {
        report.assets = copy_assets(assets_dir, output_dir)?;
    }

    info!(
        pages = report.pages.len(),
        posts = report.posts.len(),
        events = report.events.len(),
        assets = report.assets.len(),
        output = %output_dir.display(),
        "Site exported"
    );
    Ok(report)
}

/// Distinct, usable slugs from a slug query, in sorted order.
async fn slugs<S>(
    source: &S,
    query: &query::Query,
    skipped: &mut Vec<String>,
) -> Result<Vec<String>, GenerateError>
where
    S: ContentSource + ?Sized,
{
    let docs: Vec<SlugOnly> = fetch_many(source, query, FetchOptions::fresh()).await?;
    let mut unique = BTreeSet::new();
    for doc in docs {
        let slug = doc.slug.current;
        if is_path_safe(&slug) {
            unique.insert(slug);
        } else {
            warn!(query = query.name(), slug = %slug, "Slug cannot be exported, skipping");
            skipped.push(slug);
        }
    }
    Ok(unique.into_iter().collect())
}

/// A slug becomes one directory name: no separators, no dot segments.
fn is_path_safe(slug: &str) -> bool {
    !slug.is_empty()
        && slug != "."
        && slug != ".."
        && !slug.contains(['/', '\\'])
        && !slug.chars().any(char::is_control)
}

/// Output file for a route: `{path}/index.html`, or `index.html` at the root.
///
/// Slug directories keep the raw slug. Static hosts decode the request path
/// before looking up the file.
fn route_file(route: &Route, studio_base: &str) -> String {
    match route {
        Route::Post(slug) => return format!("news/{slug}/index.html"),
        Route::Event(slug) => return format!("events/{slug}/index.html"),
        _ => {}
    }
    let path = route.path(studio_base);
    let dir = path.trim_matches('/');
    if dir.is_empty() {
        "index.html".to_string()
    } else {
        format!("{dir}/index.html")
    }
}

async fn write_route<S>(
    source: &S,
    ctx: &PageContext<'_>,
    output_dir: &Path,
    route: Route,
) -> Result<WrittenPage, GenerateError>
where
    S: ContentSource + ?Sized,
{
    let page = render_route(source, ctx, &route).await?;
    let rel = route_file(&route, &ctx.config.studio.base_path);
    write_file(output_dir, &rel, page.markup.into_string().as_bytes())?;
    Ok(WrittenPage { route, path: rel })
}

async fn write_studio<S>(
    source: &S,
    ctx: &PageContext<'_>,
    output_dir: &Path,
) -> Result<Vec<String>, GenerateError>
where
    S: ContentSource + ?Sized,
{
    let landing = write_route(source, ctx, output_dir, Route::Studio(String::new())).await?;
    let base = ctx.config.studio.base_path.trim_matches('/');
    let schema_rel = format!("{base}/schema.json");
    write_file(output_dir, &schema_rel, schema::schema_json()?.as_bytes())?;
    Ok(vec![landing.path, schema_rel])
}

fn write_file(output_dir: &Path, rel: &str, contents: &[u8]) -> std::io::Result<()> {
    let path = output_dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}

/// Copy every file under `assets_dir` to `assets/` in the output, keeping
/// the directory layout. Returns the copied paths relative to the output.
fn copy_assets(assets_dir: &Path, output_dir: &Path) -> Result<Vec<String>, GenerateError> {
    if !assets_dir.is_dir() {
        return Err(GenerateError::MissingAssets(assets_dir.to_path_buf()));
    }
    let mut copied = Vec::new();
    for entry in WalkDir::new(assets_dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(assets_dir) else {
            continue;
        };
        let dest = output_dir.join(ASSETS_DIR).join(rel);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &dest)?;
        copied.push(format!("{ASSETS_DIR}/{}", rel.to_string_lossy().replace('\\', "/")));
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::LocalSource;
    use crate::test_helpers::{fixed_now, fixture_source};
    use serde_json::json;
    use tempfile::TempDir;

    fn read(dir: &Path, rel: &str) -> String {
        fs::read_to_string(dir.join(rel)).unwrap_or_else(|e| panic!("{rel}: {e}"))
    }

    // =========================================================================
    // Paths
    // =========================================================================

    #[test]
    fn route_files() {
        assert_eq!(route_file(&Route::Home, "/studio"), "index.html");
        assert_eq!(route_file(&Route::About, "/studio"), "about/index.html");
        assert_eq!(
            route_file(&Route::Event("xc".into()), "/studio"),
            "events/xc/index.html"
        );
        assert_eq!(
            route_file(&Route::Post("café-run".into()), "/studio"),
            "news/café-run/index.html"
        );
        assert_eq!(
            route_file(&Route::Studio(String::new()), "/cms"),
            "cms/index.html"
        );
    }

    #[test]
    fn unsafe_slugs_rejected() {
        assert!(is_path_safe("club-agm-2025"));
        assert!(!is_path_safe(""));
        assert!(!is_path_safe(".."));
        assert!(!is_path_safe("a/b"));
        assert!(!is_path_safe("a\\b"));
    }

    // =========================================================================
    // Full export
    // =========================================================================

    #[tokio::test]
    async fn exports_fixture_site() {
        let tmp = TempDir::new().unwrap();
        let config = SiteConfig::default();
        let report = build_site(&fixture_source(), &config, tmp.path(), fixed_now())
            .await
            .unwrap();

        for rel in [
            "index.html",
            "404.html",
            "about/index.html",
            "contact/index.html",
            "news/index.html",
            "events/index.html",
            "studio/index.html",
            "studio/schema.json",
        ] {
            assert!(tmp.path().join(rel).is_file(), "missing {rel}");
        }

        assert_eq!(report.posts.len(), 2);
        assert_eq!(report.events.len(), 4);
        assert!(read(tmp.path(), "events/donegal-xc-championships/index.html")
            .contains("Register Now →"));
        assert!(read(tmp.path(), "news/club-championship-results/index.html")
            .contains("Three new club records"));
        // Drafts are never exported.
        assert!(!tmp.path().join("news/agm-notice").exists());
    }

    #[tokio::test]
    async fn studio_files_follow_base_path() {
        let tmp = TempDir::new().unwrap();
        let mut config = SiteConfig::default();
        config.studio.base_path = "/admin".into();
        let report = build_site(&LocalSource::default(), &config, tmp.path(), fixed_now())
            .await
            .unwrap();
        assert_eq!(report.studio, vec!["admin/index.html", "admin/schema.json"]);
        let schema: serde_json::Value =
            serde_json::from_str(&read(tmp.path(), "admin/schema.json")).unwrap();
        assert_eq!(schema.as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn duplicate_and_unsafe_slugs() {
        let tmp = TempDir::new().unwrap();
        let source = LocalSource::from_documents(vec![
            json!({"_type": "post", "_id": "a", "title": "A", "slug": {"current": "same"}}),
            json!({"_type": "post", "_id": "b", "title": "B", "slug": {"current": "same"}}),
            json!({"_type": "post", "_id": "c", "title": "C", "slug": {"current": "../escape"}}),
        ]);
        let report = build_site(&source, &SiteConfig::default(), tmp.path(), fixed_now())
            .await
            .unwrap();
        assert_eq!(report.posts.len(), 1);
        assert_eq!(report.skipped, vec!["../escape"]);
        assert!(!tmp.path().join("escape").exists());
    }

    #[tokio::test]
    async fn copies_assets_tree() {
        let tmp = TempDir::new().unwrap();
        let assets = TempDir::new().unwrap();
        fs::create_dir_all(assets.path().join("img")).unwrap();
        fs::write(assets.path().join("favicon.ico"), b"ico").unwrap();
        fs::write(assets.path().join("img/logo.svg"), b"<svg/>").unwrap();

        let mut config = SiteConfig::default();
        config.site.assets_dir = Some(assets.path().to_path_buf());
        let report = build_site(&LocalSource::default(), &config, tmp.path(), fixed_now())
            .await
            .unwrap();

        assert_eq!(report.assets, vec!["assets/favicon.ico", "assets/img/logo.svg"]);
        assert_eq!(read(tmp.path(), "assets/img/logo.svg"), "<svg/>");
    }

    #[tokio::test]
    async fn missing_assets_dir_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let mut config = SiteConfig::default();
        config.site.assets_dir = Some(tmp.path().join("nope"));
        let err = build_site(&LocalSource::default(), &config, tmp.path(), fixed_now())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::MissingAssets(_)));
    }
}
