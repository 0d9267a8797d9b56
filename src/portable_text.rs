//! Rich text ("portable text") rendering.
//!
//! Rich text arrives as an array of blocks. Text blocks carry a `style`
//! (paragraph, heading, quote), a list of `children` spans with `marks`, and
//! `markDefs` that give annotation marks (links) their data:
//!
//! ```json
//! {"_type": "block", "style": "normal", "markDefs": [{"_key": "k1", "_type": "link", "href": "https://…"}],
//!  "children": [{"_type": "span", "text": "Entry form", "marks": ["strong", "k1"]}]}
//! ```
//!
//! Consecutive blocks with a `listItem` are grouped into `<ul>`/`<ol>`
//! elements, nested by `level`. Image blocks go through the CDN resolver.
//! Block types the renderer does not know are skipped.

use crate::imaging::{AssetPointer, Fit, ImageOptions, ImageResolver, ImageSource};
use crate::types::null_as_default;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One entry of a rich-text array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type")]
pub enum Block {
    #[serde(rename = "block")]
    Text(TextBlock),
    #[serde(rename = "image")]
    Image(ImageBlock),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<Span>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mark_defs: Vec<MarkDef>,
    #[serde(default)]
    pub list_item: Option<String>,
    #[serde(default)]
    pub level: Option<u32>,
}

impl TextBlock {
    fn level(&self) -> u32 {
        self.level.unwrap_or(1).max(1)
    }

    fn is_numbered(&self) -> bool {
        self.list_item.as_deref() == Some("number")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Span {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub marks: Vec<String>,
}

/// Data for an annotation mark, referenced from spans by `_key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkDef {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "_type")]
    pub kind: String,
    #[serde(default)]
    pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageBlock {
    #[serde(default)]
    pub asset: Option<AssetPointer>,
    #[serde(default)]
    pub alt: Option<String>,
}

/// Render a rich-text array to HTML.
pub fn render(blocks: &[Block], images: &ImageResolver) -> Markup {
    let mut out = String::new();
    let mut i = 0;
    while i < blocks.len() {
        match &blocks[i] {
            Block::Text(block) if block.list_item.is_some() => {
                let run = list_run(&blocks[i..]);
                out.push_str(&render_list(&run, 1).into_string());
                i += run.len();
                continue;
            }
            Block::Text(block) => out.push_str(&render_text_block(block).into_string()),
            Block::Image(image) => out.push_str(&render_image_block(image, images).into_string()),
            Block::Unknown => debug!("Skipping unknown rich-text block type"),
        }
        i += 1;
    }
    maud::PreEscaped(out)
}

/// First characters of the first span of the first block, followed by `...`.
///
/// `None` when there are no blocks at all. A first block without text still
/// yields the bare ellipsis, matching how listings have always looked.
pub fn excerpt(blocks: &[Block], max_chars: usize) -> Option<String> {
    let first = blocks.first()?;
    let text = match first {
        Block::Text(block) => block
            .children
            .first()
            .map(|span| span.text.chars().take(max_chars).collect::<String>())
            .unwrap_or_default(),
        _ => String::new(),
    };
    Some(format!("{text}..."))
}

/// Consecutive list blocks starting at `blocks[0]`.
///
/// A top-level item of a different list kind starts a new list.
fn list_run(blocks: &[Block]) -> Vec<&TextBlock> {
    let mut run: Vec<&TextBlock> = Vec::new();
    for block in blocks {
        let Block::Text(text) = block else { break };
        if text.list_item.is_none() {
            break;
        }
        let switches_kind = run
            .first()
            .is_some_and(|first| text.level() == 1 && text.is_numbered() != first.is_numbered());
        if switches_kind {
            break;
        }
        run.push(text);
    }
    run
}

fn render_list(items: &[&TextBlock], level: u32) -> Markup {
    let numbered = items.first().is_some_and(|b| b.is_numbered());
    let entries = list_entries(items, level);
    html! {
        @if numbered {
            ol { (entries) }
        } @else {
            ul { (entries) }
        }
    }
}

fn list_entries(items: &[&TextBlock], level: u32) -> Markup {
    let mut groups: Vec<(&TextBlock, &[&TextBlock])> = Vec::new();
    let mut i = 0;
    while i < items.len() {
        let mut j = i + 1;
        while j < items.len() && items[j].level() > level {
            j += 1;
        }
        groups.push((items[i], &items[i + 1..j]));
        i = j;
    }

    html! {
        @for (head, nested) in groups {
            li {
                (render_spans(head))
                @if !nested.is_empty() {
                    (render_list(nested, level + 1))
                }
            }
        }
    }
}

fn render_text_block(block: &TextBlock) -> Markup {
    let content = render_spans(block);
    match block.style.as_deref().unwrap_or("normal") {
        "h1" => html! { h1 { (content) } },
        "h2" => html! { h2 { (content) } },
        "h3" => html! { h3 { (content) } },
        "h4" => html! { h4 { (content) } },
        "h5" => html! { h5 { (content) } },
        "h6" => html! { h6 { (content) } },
        "blockquote" => html! { blockquote { (content) } },
        _ => html! { p { (content) } },
    }
}

fn render_image_block(block: &ImageBlock, images: &ImageResolver) -> Markup {
    let url = block.asset.as_ref().and_then(|asset| {
        let source = ImageSource::Pointer(asset.clone());
        images.url(&source, ImageOptions::default().with_fit(Fit::Max))
    });
    html! {
        @if let Some(src) = url {
            figure.rich-image {
                img src=(src) alt=(block.alt.as_deref().unwrap_or("")) loading="lazy";
            }
        }
    }
}

fn render_spans(block: &TextBlock) -> Markup {
    html! {
        @for span in &block.children {
            (apply_marks(&span.text, &span.marks, &block.mark_defs))
        }
    }
}

/// Wrap `text` in one element per mark, outermost first.
fn apply_marks(text: &str, marks: &[String], defs: &[MarkDef]) -> Markup {
    let Some((mark, rest)) = marks.split_first() else {
        return text_with_breaks(text);
    };
    let inner = apply_marks(text, rest, defs);
    match mark.as_str() {
        "strong" => html! { strong { (inner) } },
        "em" => html! { em { (inner) } },
        "code" => html! { code { (inner) } },
        "underline" => html! { span style="text-decoration: underline" { (inner) } },
        "strike-through" => html! { del { (inner) } },
        key => match defs.iter().find(|d| d.key == key) {
            Some(MarkDef {
                kind, href: Some(href), ..
            }) if kind == "link" => {
                let external = href.starts_with("http://") || href.starts_with("https://");
                html! {
                    @if external {
                        a href=(href) target="_blank" rel="noopener noreferrer" { (inner) }
                    } @else {
                        a href=(href) { (inner) }
                    }
                }
            }
            _ => inner,
        },
    }
}

fn text_with_breaks(text: &str) -> Markup {
    html! {
        @for (i, line) in text.split('\n').enumerate() {
            @if i > 0 { br; }
            (line)
        }
    }
}
