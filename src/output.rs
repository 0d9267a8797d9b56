//! CLI output formatting.
//!
//! Output is **information-centric, not file-centric**: every entry leads
//! with what it is (a page name, a post or event slug, a document id) and
//! the file or problem follows.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Pages
//!     Home → index.html
//!     About → about/index.html
//!     Not found → 404.html
//!
//! News
//!     001 club-championship-results → news/club-championship-results/index.html
//!
//! Events
//!     001 donegal-xc-championships → events/donegal-xc-championships/index.html
//!
//! Studio
//!     studio/index.html
//!     studio/schema.json
//!
//! Generated 6 pages, 1 post, 1 event, 0 assets
//! ```
//!
//! ## Check
//!
//! ```text
//! event event-xc-champs: ok
//! event event-no-slug
//!     slug: required but empty
//!     publishedAt: required but empty
//!
//! Checked 2 documents, 1 with problems
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::generate::{BuildReport, WrittenPage};
use crate::render::Route;
use crate::schema::DocumentReport;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 post`, `2 posts`.
fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

fn route_label(route: &Route) -> String {
    match route {
        Route::Home => "Home".to_string(),
        Route::About => "About".to_string(),
        Route::Contact => "Contact".to_string(),
        Route::News => "News".to_string(),
        Route::Events => "Events".to_string(),
        Route::NotFound => "Not found".to_string(),
        Route::Post(slug) | Route::Event(slug) => slug.clone(),
        Route::Studio(_) => "Studio".to_string(),
    }
}

fn section(lines: &mut Vec<String>, title: &str, entries: Vec<String>) {
    if entries.is_empty() {
        return;
    }
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(title.to_string());
    lines.extend(entries.into_iter().map(|e| format!("{}{}", indent(1), e)));
}

fn numbered(pages: &[WrittenPage]) -> Vec<String> {
    pages
        .iter()
        .enumerate()
        .map(|(i, p)| {
            format!(
                "{} {} \u{2192} {}",
                format_index(i + 1),
                route_label(&p.route),
                p.path
            )
        })
        .collect()
}

// ============================================================================
// Build
// ============================================================================

/// Format the static export report.
pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let mut lines = Vec::new();

    let pages = report
        .pages
        .iter()
        .map(|p| format!("{} \u{2192} {}", route_label(&p.route), p.path))
        .collect();
    section(&mut lines, "Pages", pages);
    section(&mut lines, "News", numbered(&report.posts));
    section(&mut lines, "Events", numbered(&report.events));
    section(&mut lines, "Studio", report.studio.clone());
    section(&mut lines, "Assets", report.assets.clone());
    section(
        &mut lines,
        "Skipped",
        report
            .skipped
            .iter()
            .map(|slug| format!("{slug:?} (not usable as a path)"))
            .collect(),
    );

    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "Generated {}, {}, {}, {}",
        count(report.pages.len(), "page"),
        count(report.posts.len(), "post"),
        count(report.events.len(), "event"),
        count(report.assets.len(), "asset"),
    ));
    lines
}

/// Print the export report to stdout.
pub fn print_build_output(report: &BuildReport) {
    for line in format_build_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format dataset check results: one header per document, its problems
/// indented below.
pub fn format_check_output(reports: &[DocumentReport]) -> Vec<String> {
    let mut lines = Vec::new();
    for report in reports {
        if report.is_clean() {
            lines.push(format!("{} {}: ok", report.kind, report.id));
            continue;
        }
        lines.push(format!("{} {}", report.kind, report.id));
        for violation in &report.violations {
            lines.push(format!("{}{}", indent(1), violation));
        }
    }
    let failing = reports.iter().filter(|r| !r.is_clean()).count();
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "Checked {}, {} with problems",
        count(reports.len(), "document"),
        failing
    ));
    lines
}

/// Print check results to stdout.
pub fn print_check_output(reports: &[DocumentReport]) {
    for line in format_check_output(reports) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
