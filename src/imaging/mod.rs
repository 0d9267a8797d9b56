//! Image handling: URL construction only, no pixels.
//!
//! Assets live on the content store's image CDN, which resizes and
//! re-encodes on request. All this module does is describe the transform and
//! build the URL for it.
//!
//! The module is split into:
//! - **Parameters**: [`ImageOptions`] and the named [`Preset`]s
//! - **URL**: [`ImageSource`] parsing and the pure [`resolve`] function

mod params;
mod url;

pub use params::{CropAnchor, Fit, Format, ImageOptions, Preset, Quality};
pub use url::{AssetId, AssetPointer, ImageResolver, ImageSource, resolve};
