//! # Finn Valley Site
//!
//! The website of Finn Valley Athletics Club. Home, about and contact are
//! fixed pages; news posts and events are documents in a hosted headless
//! content store, read through its query API and rendered to HTML on the
//! server. The same pages can be exported as a static directory.
//!
//! # Architecture: Query → Document → Page
//!
//! ```text
//! query    named, typed queries       →  GROQ string + params
//! source   HTTP API / dataset export  →  raw JSON, cached for 30s
//! types    lenient decoding           →  EventDoc / PostDoc
//! render   pure page functions        →  maud Markup
//! ```
//!
//! Rendering never talks to the network: [`render::render_route`] fetches
//! what a route needs through a [`source::ContentSource`] and hands plain
//! documents to the page functions. The server ([`server`]) and the static
//! export ([`generate`]) share that one path.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `site.toml` loading, validation, env overrides, theme CSS |
//! | [`query`] | Named document queries, their GROQ text and in-memory evaluation |
//! | [`source`] | The `ContentSource` seam, typed fetch helpers, dataset exports |
//! | [`client`] | HTTP client for the hosted query API |
//! | [`cache`] | Time-based revalidation cache over any source |
//! | [`types`] | Event and post documents as read from the store |
//! | [`portable_text`] | Rich-text blocks to HTML, excerpts |
//! | [`imaging`] | Image asset references to CDN URLs |
//! | [`event`] | Event presentation rules: badges, registration, venue, sections |
//! | [`format`] | Date and phone formatting |
//! | [`schema`] | Authoring schemas for the studio, document checks |
//! | [`render`] | Routes and HTML pages |
//! | [`server`] | axum server |
//! | [`generate`] | Static export |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Lenient Documents, Strict Config
//!
//! Documents are written by editors in the studio and may be half-filled.
//! Every field decodes to a default when missing or malformed, and pages
//! render whatever is there. Configuration is written by whoever deploys the
//! site, so unknown keys and invalid values are rejected at startup.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/). Templates are
//! Rust expressions, checked at compile time and escaped by default, and no
//! template directory has to ship with the binary.
//!
//! ## No Client-Side JavaScript
//!
//! Pages are complete HTML. The mobile menu is a checkbox toggle styled in
//! CSS.

pub mod cache;
pub mod client;
pub mod config;
pub mod event;
pub mod format;
pub mod generate;
pub mod imaging;
pub mod output;
pub mod portable_text;
pub mod query;
pub mod render;
pub mod schema;
pub mod server;
pub mod source;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
