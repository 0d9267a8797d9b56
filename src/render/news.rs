//! Newsroom list and post detail.

use super::{PageContext, Route, layout};
use crate::format;
use crate::imaging::Preset;
use crate::portable_text;
use crate::types::PostDoc;
use maud::{Markup, html};

/// Characters of the first paragraph shown under each listed post.
const EXCERPT_CHARS: usize = 150;

fn post_link(post: &PostDoc) -> String {
    Route::Post(post.slug.current.clone()).path("")
}

pub fn list(ctx: &PageContext<'_>, posts: &[PostDoc]) -> Markup {
    let content = html! {
        div.container {
            h1 { "Newsroom" }
            p.lead {
                "Stay up to date with the latest news, results, and announcements from "
                (ctx.config.club.name) "."
            }
            @if posts.is_empty() {
                div.empty-state {
                    p { "No news posts available yet." }
                    p.muted { "Check back soon for updates from " (ctx.config.club.short_name) "!" }
                }
            } @else {
                div.post-list {
                    @for post in posts {
                        article.card.post-row {
                            @if let Some(published) = &post.published_at {
                                time.muted.small datetime=(format::iso_date(published)) {
                                    (format::short_date(published))
                                }
                            }
                            h2 { a href=(post_link(post)) { (post.title) } }
                            @if let Some(text) = post.body.as_deref().and_then(|b| portable_text::excerpt(b, EXCERPT_CHARS)) {
                                p.excerpt { (text) }
                            }
                            a.read-more href=(post_link(post)) { "Read more →" }
                        }
                    }
                }
            }
        }
    };
    layout::page(ctx, "News", &Route::News, content)
}

/// Post detail. `None` renders the not-found state.
pub fn detail(ctx: &PageContext<'_>, post: Option<&PostDoc>) -> Markup {
    let back = html! { a.back href="/news" { "← Back to News" } };
    let Some(post) = post else {
        let content = html! {
            div.container {
                (back)
                h1 { "Post Not Found" }
                p.muted { "The post you're looking for doesn't exist." }
            }
        };
        return layout::page(ctx, "Post Not Found", &Route::News, content);
    };

    let hero = post
        .image
        .as_ref()
        .and_then(|img| ctx.images.url(img, Preset::NewsHero));
    let content = html! {
        article.container.narrow {
            (back)
            @if let Some(src) = hero {
                img.hero-image src=(src) alt=(post.title) width="800" height="400";
            }
            h1 { (post.title) }
            @if let Some(published) = &post.published_at {
                p.muted {
                    "Published: "
                    time datetime=(format::iso_date(published)) { (format::long_date(published)) }
                }
            }
            @if let Some(body) = &post.body {
                div.prose { (portable_text::render(body, &ctx.images)) }
            }
        }
    };
    layout::page(ctx, &post.title, &Route::Post(post.slug.current.clone()), content)
}
