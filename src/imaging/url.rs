//! Image reference → CDN URL resolution.
//!
//! Image fields in documents hold an opaque asset reference of the form
//! `image-{assetId}-{width}x{height}-{ext}`. The CDN serves that asset at
//!
//! ```text
//! https://cdn.sanity.io/images/{projectId}/{dataset}/{assetId}-{width}x{height}.{ext}
//! ```
//!
//! and applies transforms given as query parameters. Parameters are always
//! emitted in the same order (`w`, `h`, `fm`, `q`, `fit`, `crop`) so equal
//! inputs produce byte-identical URLs, which keeps rendered pages stable
//! between builds.

use super::params::ImageOptions;
use serde::{Deserialize, Serialize};
use tracing::warn;

const CDN_BASE: &str = "https://cdn.sanity.io";
const IMAGE_PREFIX: &str = "image-";

/// Pointer to an uploaded asset, as found under `asset` in image fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPointer {
    #[serde(rename = "_ref", alias = "_id")]
    pub reference: String,
}

/// Any of the shapes an image can take in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageSource {
    /// `{"_type": "image", "asset": {"_ref": "image-…"}, "hotspot": …}`
    Field { asset: AssetPointer },
    /// `{"_ref": "image-…"}`
    Pointer(AssetPointer),
    /// A bare `"image-…"` reference.
    Reference(String),
}

impl ImageSource {
    pub fn reference(reference: impl Into<String>) -> Self {
        ImageSource::Field {
            asset: AssetPointer {
                reference: reference.into(),
            },
        }
    }

    /// The raw asset reference, whichever shape the source has.
    pub fn asset_ref(&self) -> Option<&str> {
        let reference = match self {
            ImageSource::Field { asset } | ImageSource::Pointer(asset) => &asset.reference,
            ImageSource::Reference(r) => r,
        };
        (!reference.is_empty()).then_some(reference.as_str())
    }
}

/// A parsed asset reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetId<'a> {
    pub id: &'a str,
    pub width: u32,
    pub height: u32,
    pub extension: &'a str,
}

impl<'a> AssetId<'a> {
    /// Parse `image-{id}-{W}x{H}-{ext}`. Returns `None` for anything else.
    pub fn parse(reference: &'a str) -> Option<Self> {
        let rest = reference.strip_prefix(IMAGE_PREFIX)?;
        let mut parts = rest.rsplitn(3, '-');
        let extension = parts.next()?;
        let dimensions = parts.next()?;
        let id = parts.next()?;
        let (w, h) = dimensions.split_once('x')?;
        let width = w.parse().ok()?;
        let height = h.parse().ok()?;
        if id.is_empty() || extension.is_empty() {
            return None;
        }
        Some(Self {
            id,
            width,
            height,
            extension,
        })
    }

    fn filename(&self) -> String {
        format!(
            "{}-{}x{}.{}",
            self.id, self.width, self.height, self.extension
        )
    }
}

/// Build the transformed CDN URL for an image.
///
/// Returns `None` ("no image") when either identifier is missing or the
/// reference cannot be parsed. Callers omit the image element in that case;
/// this function never fails loudly.
pub fn resolve(
    project_id: Option<&str>,
    dataset: Option<&str>,
    source: &ImageSource,
    options: ImageOptions,
) -> Option<String> {
    let project_id = project_id.filter(|p| !p.is_empty())?;
    let dataset = dataset.filter(|d| !d.is_empty())?;
    let reference = source.asset_ref()?;
    let Some(asset) = AssetId::parse(reference) else {
        warn!(reference, "Malformed image reference, omitting image");
        return None;
    };

    Some(format!(
        "{CDN_BASE}/images/{project_id}/{dataset}/{filename}?w={w}&h={h}&fm={fm}&q={q}&fit={fit}&crop={crop}",
        filename = asset.filename(),
        w = options.width,
        h = options.height,
        fm = options.format,
        q = options.quality.value(),
        fit = options.fit,
        crop = options.crop,
    ))
}

/// [`resolve`] bound to the project and dataset of one configuration.
#[derive(Debug, Clone, Default)]
pub struct ImageResolver {
    project_id: Option<String>,
    dataset: Option<String>,
}

impl ImageResolver {
    pub fn new(project_id: Option<String>, dataset: Option<String>) -> Self {
        Self {
            project_id,
            dataset,
        }
    }

    pub fn url(&self, source: &ImageSource, options: impl Into<ImageOptions>) -> Option<String> {
        resolve(
            self.project_id.as_deref(),
            self.dataset.as_deref(),
            source,
            options.into(),
        )
    }
}
