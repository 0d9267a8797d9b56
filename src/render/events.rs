//! Events list and event detail pages.

use super::{PageContext, Route, layout};
use crate::event::{
    self, DEFAULT_TRAINING, EventSections, RegistrationAction, TrainingSlot,
};
use crate::format;
use crate::imaging::Preset;
use crate::portable_text;
use crate::types::EventDoc;
use maud::{Markup, html};

fn badges(event: &EventDoc) -> Markup {
    html! {
        div.badges {
            @if let Some(kind) = event.event_type.as_deref() {
                span class={ "badge badge-type " (event::type_badge_class(Some(kind))) } {
                    (event::badge_label(kind))
                }
            }
            @if let Some(status) = event.status.as_deref() {
                span class={ "badge " (event::status_badge_class(Some(status))) } {
                    (event::badge_label(status))
                }
            }
        }
    }
}

/// One line of the card's fact list: date, time, place, cost.
fn facts(ctx: &PageContext<'_>, event: &EventDoc, with_date: bool) -> Markup {
    let venue = event::display_venue(event, &ctx.config.venue);
    html! {
        ul.facts {
            @if with_date {
                li { "📅 " (format::short_date_or_tbc(event.date.as_ref())) }
            }
            @if let Some(time) = &event.time {
                li { "🕐 " (time) }
            }
            @if let Some(location) = venue.location {
                li { "📍 " (location) }
            }
            @if let Some(cost) = &event.cost {
                li { "💰 " (cost) }
            }
        }
    }
}

fn event_link(event: &EventDoc) -> String {
    Route::Event(event.slug.current.clone()).path("")
}

/// Card with image, badges and key facts. Used on the events and home pages.
pub fn event_card(ctx: &PageContext<'_>, event: &EventDoc) -> Markup {
    let image = event
        .image
        .as_ref()
        .and_then(|img| ctx.images.url(img, Preset::EventCard));
    html! {
        article.card.event-card {
            @if let Some(src) = image {
                img.card-image src=(src) alt=(event.title) loading="lazy" width="400" height="200";
            }
            div.card-body {
                (badges(event))
                h3 { a href=(event_link(event)) { (event.title) } }
                (facts(ctx, event, true))
            }
        }
    }
}

fn upcoming_item(ctx: &PageContext<'_>, event: &EventDoc) -> Markup {
    html! {
        article.card.event-row {
            (badges(event))
            h3 { a href=(event_link(event)) { (event.title) } }
            (facts(ctx, event, true))
            @if event.registration_required {
                p.registration-note { "📝 Registration Required" }
            }
        }
    }
}

fn training_item(ctx: &PageContext<'_>, event: &EventDoc) -> Markup {
    html! {
        article.card.training-row {
            h3 { a href=(event_link(event)) { (event.title) } }
            (facts(ctx, event, false))
        }
    }
}

fn default_schedule(slots: &[TrainingSlot]) -> Markup {
    html! {
        div.panel.default-schedule {
            h3 { "Default Training Schedule" }
            @for slot in slots {
                div.schedule-slot {
                    h4 { (slot.title) }
                    p.muted { (slot.days) ", " (slot.time) }
                }
            }
        }
    }
}

/// Events page: featured strip, upcoming list, training schedule.
pub fn list(ctx: &PageContext<'_>, events: &[EventDoc]) -> Markup {
    let EventSections {
        featured,
        upcoming,
        training,
    } = event::partition(events);

    let content = html! {
        div.container {
            h1 { "Events & Training" }

            @if !featured.is_empty() {
                section.featured {
                    h2 { "Featured Events" }
                    div.card-grid {
                        @for e in &featured {
                            (event_card(ctx, e))
                        }
                    }
                }
            }

            div.two-col {
                section.upcoming {
                    h2 { "Upcoming Events" }
                    @if upcoming.is_empty() {
                        p.muted { "No upcoming events scheduled." }
                    } @else {
                        @for e in &upcoming {
                            (upcoming_item(ctx, e))
                        }
                    }
                }
                section.training {
                    h2 { "Regular Training" }
                    @if training.is_empty() {
                        (default_schedule(&DEFAULT_TRAINING))
                    } @else {
                        @for e in &training {
                            (training_item(ctx, e))
                        }
                    }
                }
            }
        }
    };
    layout::page(ctx, "Events", &Route::Events, content)
}

fn back_link() -> Markup {
    html! { a.back href="/events" { "← Back to Events" } }
}

/// Event detail. `None` renders the not-found state.
pub fn detail(ctx: &PageContext<'_>, event: Option<&EventDoc>) -> Markup {
    let Some(event) = event else {
        let content = html! {
            div.container {
                (back_link())
                h1 { "Event Not Found" }
                p.muted { "The event you're looking for doesn't exist." }
            }
        };
        return layout::page(ctx, "Event Not Found", &Route::Events, content);
    };

    let route = Route::Event(event.slug.current.clone());
    let hero = event
        .image
        .as_ref()
        .and_then(|img| ctx.images.url(img, Preset::EventHero));
    let venue = event::display_venue(event, &ctx.config.venue);
    let maps = event::map_links(event, &ctx.config.venue);
    let registration = event::registration_panel(event, ctx.now);
    let ages = event::age_category_labels(event);
    let has_contact = event.contact_person.is_some()
        || event.contact_email.is_some()
        || event.contact_phone.is_some();

    let content = html! {
        div.container.narrow {
            (back_link())
            @if let Some(src) = hero {
                img.hero-image src=(src) alt=(event.title) width="800" height="400";
            }
            header.event-header {
                (badges(event))
                h1 { (event.title) }
            }
            div.two-col {
                section.event-details {
                    h2 { "Event Details" }
                    div.detail {
                        span.detail-icon { "📅" }
                        div {
                            p.detail-label { "Date" }
                            p { (format::long_date_or_tbc(event.date.as_ref())) }
                            @if let Some(end) = &event.end_date {
                                p { "to " (format::long_date(end)) }
                            }
                        }
                    }
                    @if let Some(time) = &event.time {
                        div.detail {
                            span.detail-icon { "🕐" }
                            div {
                                p.detail-label { "Time" }
                                p { (time) }
                            }
                        }
                    }
                    div.detail {
                        span.detail-icon { "📍" }
                        div {
                            p.detail-label { "Location" }
                            p { (venue.location.unwrap_or("Venue to be confirmed")) }
                            @if let Some(address) = venue.address {
                                p.muted.small { (address) }
                            }
                            @if let Some(maps) = &maps {
                                div.map-links {
                                    a.button.button-small href=(maps.google) target="_blank" rel="noopener noreferrer" { "Google Maps" }
                                    a.button.button-small.button-grey href=(maps.apple) target="_blank" rel="noopener noreferrer" { "Apple Maps" }
                                }
                            }
                        }
                    }
                    @if let Some(cost) = &event.cost {
                        div.detail {
                            span.detail-icon { "💰" }
                            div {
                                p.detail-label { "Cost" }
                                p { (cost) }
                            }
                        }
                    }
                    @if !ages.is_empty() {
                        div.detail {
                            span.detail-icon { "👥" }
                            div {
                                p.detail-label { "Age Categories" }
                                div.tags {
                                    @for age in &ages {
                                        span.tag { (age) }
                                    }
                                }
                            }
                        }
                    }
                }
                aside {
                    @if let Some(panel) = registration {
                        div.panel.notice.registration {
                            h3 { "Registration" }
                            @if let Some(deadline) = &panel.deadline {
                                p.small { "Registration closes: " (format::long_date(deadline)) }
                            }
                            @match panel.action {
                                RegistrationAction::Register { link } => {
                                    a.button href=(link) target="_blank" rel="noopener noreferrer" { "Register Now →" }
                                }
                                RegistrationAction::Closed => {
                                    p.closed { "Registration has closed" }
                                }
                                RegistrationAction::ComingSoon => {
                                    p.muted { "Registration details coming soon" }
                                }
                            }
                        }
                    }
                    @if has_contact {
                        div.panel.contact {
                            h3 { "Contact" }
                            @if let Some(person) = &event.contact_person {
                                p { strong { "Contact:" } " " (person) }
                            }
                            @if let Some(email) = &event.contact_email {
                                p { strong { "Email:" } " " a href={ "mailto:" (email) } { (email) } }
                            }
                            @if let Some(phone) = &event.contact_phone {
                                p { strong { "Phone:" } " " a href=(format::tel_href(phone)) { (phone) } }
                            }
                        }
                    }
                }
            }
            @if let Some(description) = &event.description {
                section.prose {
                    h2 { "About This Event" }
                    (portable_text::render(description, &ctx.images))
                }
            }
            @if event::shows_results(event) {
                @if let Some(results) = &event.results {
                    section.prose.results {
                        h2 { "Results" }
                        (portable_text::render(results, &ctx.images))
                    }
                }
            }
        }
    };
    layout::page(ctx, &event.title, &route, content)
}
