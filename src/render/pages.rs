//! The fixed pages, plus the error pages.

use super::{PageContext, Route, events, layout};
use crate::format;
use crate::types::EventDoc;
use maud::{Markup, html};

struct Offer {
    icon: &'static str,
    title: &'static str,
    text: &'static str,
}

const OFFERS: [Offer; 3] = [
    Offer {
        icon: "🏃",
        title: "Track & Field",
        text: "Professional training in sprints, distance running, jumping, and throwing events.",
    },
    Offer {
        icon: "👶",
        title: "Youth Development",
        text: "Specialized programs for young athletes to develop fundamental skills and love for athletics.",
    },
    Offer {
        icon: "🏆",
        title: "Competition",
        text: "Regular competitions and championships for athletes at all levels.",
    },
];

/// Home page. `featured` may be empty, in which case its section is omitted.
pub fn home(ctx: &PageContext<'_>, featured: &[EventDoc]) -> Markup {
    let content = html! {
        section.hero {
            div.container {
                h1 { "Welcome to " (ctx.config.club.name) }
                p.lead {
                    "Premier athletics club serving the local community with excellence in track and field sports. "
                    "Join us and discover your potential in athletics."
                }
                div.actions {
                    a.button.button-light href="/contact" { "Join Now" }
                    a.button.button-outline href="/about" { "Learn More" }
                }
            }
        }
        @if !featured.is_empty() {
            section.featured {
                div.container {
                    h2 { "Featured Events" }
                    div.card-grid {
                        @for event in featured {
                            (events::event_card(ctx, event))
                        }
                    }
                    p.more { a href="/events" { "All events →" } }
                }
            }
        }
        section.offers {
            div.container {
                h2 { "What We Offer" }
                div.card-grid {
                    @for offer in &OFFERS {
                        div.offer {
                            div.offer-icon { (offer.icon) }
                            h3 { (offer.title) }
                            p.muted { (offer.text) }
                        }
                    }
                }
            }
        }
        section.cta {
            div.container {
                h2 { "Ready to Get Started?" }
                p {
                    "Whether you're a complete beginner or an experienced athlete, "
                    (ctx.config.club.short_name)
                    " has a place for you. Come and be part of our athletic family."
                }
                a.button href="/contact" { "Contact Us Today" }
            }
        }
    };
    layout::page(ctx, "", &Route::Home, content)
}

pub fn about(ctx: &PageContext<'_>) -> Markup {
    let content = html! {
        div.container.prose {
            h1 { "About " (ctx.config.club.short_name) }
            p.lead {
                (ctx.config.club.name)
                " is a premier athletics club serving the local community with excellence in track and field sports."
            }
            p {
                "Our club welcomes athletes of all ages and abilities, from beginners taking their "
                "first steps in athletics to experienced competitors aiming for national and "
                "international success."
            }
            h2 { "Our Mission" }
            p {
                "To provide a supportive and inclusive environment where athletes can develop their "
                "potential, pursue their goals, and enjoy the sport of athletics."
            }
        }
    };
    layout::page(ctx, "About", &Route::About, content)
}

pub fn contact(ctx: &PageContext<'_>) -> Markup {
    let club = &ctx.config.club;
    let content = html! {
        div.container {
            h1 { "Contact Us" }
            div.two-col {
                div {
                    h2 { "Get in Touch" }
                    div.contact-item {
                        h3 { "Email" }
                        p { a href={ "mailto:" (club.email) } { (club.email) } }
                    }
                    div.contact-item {
                        h3 { "Phone" }
                        p { a href=(format::tel_href(&club.phone)) { (club.phone) } }
                    }
                    div.contact-item {
                        h3 { "Address" }
                        p {
                            @for (i, line) in club.address.iter().enumerate() {
                                @if i > 0 { br; }
                                (line)
                            }
                        }
                    }
                }
                div.panel {
                    h2 { "Join Our Club" }
                    p {
                        "Interested in joining " (club.short_name)
                        "? We welcome new members of all ages and abilities."
                    }
                    p {
                        "Contact us to learn more about membership options, training schedules, and upcoming events."
                    }
                    div.notice {
                        h3 { "Training Times" }
                        p {
                            "Come along to any of our training sessions to meet the coaches and see what we're all about! "
                            a href="/events" { "See the training schedule" }
                        }
                    }
                }
            }
        }
    };
    layout::page(ctx, "Contact", &Route::Contact, content)
}

/// Shown for routes that do not exist.
pub fn not_found(ctx: &PageContext<'_>) -> Markup {
    let content = html! {
        div.container.empty-state {
            h1 { "Page Not Found" }
            p.muted { "The page you're looking for doesn't exist." }
            p { a href="/" { "← Back to Home" } }
        }
    };
    layout::page(ctx, "Page Not Found", &Route::NotFound, content)
}

/// Shown when a page could not be rendered, usually because the content
/// store was unreachable.
pub fn server_error(ctx: &PageContext<'_>) -> Markup {
    let content = html! {
        div.container.empty-state {
            h1 { "Something Went Wrong" }
            p.muted { "We couldn't load this page right now. Please try again in a moment." }
            p { a href="/" { "← Back to Home" } }
        }
    };
    layout::page(ctx, "Error", &Route::NotFound, content)
}
