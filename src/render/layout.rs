//! Document shell and navigation.
//!
//! Public pages get the site header, navigation and footer. Requests under
//! the studio mount pass straight through with a bare document, since the
//! studio brings its own interface.

use super::{PageContext, Route};
use maud::{DOCTYPE, Markup, html};

/// Primary navigation, in display order.
pub const NAV_ITEMS: [(&str, &str); 5] = [
    ("Home", "/"),
    ("About", "/about"),
    ("News", "/news"),
    ("Events", "/events"),
    ("Contact", "/contact"),
];

/// Whether `path` is shown with the public chrome.
///
/// Anything at or below `studio_base` is not.
pub fn shows_chrome(path: &str, studio_base: &str) -> bool {
    !matches!(Route::parse(path, studio_base), Route::Studio(_))
}

/// Renders the base HTML document structure
fn base_document(ctx: &PageContext<'_>, title: &str, body_class: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en-IE" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (maud::PreEscaped(ctx.stylesheet())) }
            }
            body class=[body_class] {
                (content)
            }
        }
    }
}

/// Wrap page content in the document shell.
///
/// `current` decides the chrome: studio routes get a bare body, everything
/// else gets navigation and footer with `current` highlighted.
pub fn page(ctx: &PageContext<'_>, title: &str, current: &Route, content: Markup) -> Markup {
    let club = &ctx.config.club;
    let full_title = if title.is_empty() {
        club.name.clone()
    } else {
        format!("{title} | {}", club.short_name)
    };
    let base = &ctx.config.studio.base_path;

    if !shows_chrome(&current.path(base), base) {
        return base_document(ctx, &full_title, Some("studio"), content);
    }

    base_document(
        ctx,
        &full_title,
        None,
        html! {
            (site_header(ctx, current))
            main { (content) }
            (site_footer(ctx))
        },
    )
}

fn site_header(ctx: &PageContext<'_>, current: &Route) -> Markup {
    html! {
        header.site-header {
            div.container {
                a.brand href="/" { (ctx.config.club.short_name) }
                (render_nav(current))
            }
        }
    }
}

/// Renders the navigation menu (checkbox toggle on narrow screens)
pub fn render_nav(current: &Route) -> Markup {
    let section = section_path(current);
    html! {
        nav.site-nav aria-label="Main" {
            input.nav-toggle type="checkbox" id="nav-toggle";
            label.nav-hamburger for="nav-toggle" aria-label="Menu" {
                span.hamburger-line {}
                span.hamburger-line {}
                span.hamburger-line {}
            }
            ul.nav-links {
                @for (label, href) in NAV_ITEMS {
                    @let is_current = section == Some(href);
                    li class=[is_current.then_some("current")] {
                        a href=(href) aria-current=[is_current.then_some("page")] { (label) }
                    }
                }
            }
        }
    }
}

/// The nav entry a route belongs to. Detail pages highlight their list.
fn section_path(route: &Route) -> Option<&'static str> {
    match route {
        Route::Home => Some("/"),
        Route::About => Some("/about"),
        Route::Contact => Some("/contact"),
        Route::News | Route::Post(_) => Some("/news"),
        Route::Events | Route::Event(_) => Some("/events"),
        Route::Studio(_) | Route::NotFound => None,
    }
}

fn site_footer(ctx: &PageContext<'_>) -> Markup {
    let club = &ctx.config.club;
    html! {
        footer.site-footer {
            div.container {
                p.footer-name { (club.name) }
                p.footer-address { (club.address.join(", ")) }
                p {
                    a href={ "mailto:" (club.email) } { (club.email) }
                }
            }
        }
    }
}

/// Landing page for the studio mount.
///
/// The authoring interface is hosted separately; this page points editors
/// at it and at the schema it should load.
pub fn studio_landing(ctx: &PageContext<'_>) -> Markup {
    let base = &ctx.config.studio.base_path;
    let content = html! {
        div.studio-landing {
            h1 { (ctx.config.club.short_name) " Studio" }
            @if let Some(url) = &ctx.config.studio.url {
                p { "Content is edited in the hosted studio." }
                p { a.button href=(url) { "Open Studio →" } }
            } @else {
                p { "No hosted studio is configured for this site." }
            }
            p.muted {
                "Schema: " a href={ (base) "/schema.json" } { (base) "/schema.json" }
            }
        }
    };
    page(ctx, "Studio", &Route::Studio(String::new()), content)
}
