//! Parameter types for image URL transforms.
//!
//! These describe *what* the image CDN should do to an asset. They carry no
//! knowledge of URLs; [`url`](super::url) turns them into query parameters.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 85). Clamped on construction.
//! - [`Format`], [`Fit`], [`CropAnchor`]: closed sets of values the CDN accepts.
//! - [`ImageOptions`]: a full transform request with defaults for every field.
//! - [`Preset`]: named sizes for the placements the site uses.

use strum::{Display, EnumString, IntoStaticStr};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// Output encoding requested from the CDN (`fm=`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Format {
    #[default]
    Webp,
    Jpg,
    Png,
    Pjpg,
    Gif,
}

/// How the asset is fitted into the requested box (`fit=`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Fit {
    #[default]
    Crop,
    Fill,
    Fillmax,
    Max,
    Scale,
    Clip,
    Min,
}

/// Which part of the asset survives a crop (`crop=`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum CropAnchor {
    #[default]
    Center,
    Top,
    Bottom,
    Left,
    Right,
    Focalpoint,
}

/// A complete transform request.
///
/// `Default` gives the site-wide defaults: 800×400 webp at quality 85,
/// cropped around the center.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageOptions {
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
    pub format: Format,
    pub fit: Fit,
    pub crop: CropAnchor,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
            quality: Quality::default(),
            format: Format::default(),
            fit: Fit::default(),
            crop: CropAnchor::default(),
        }
    }
}

impl ImageOptions {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_quality(mut self, quality: u32) -> Self {
        self.quality = Quality::new(quality);
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn with_fit(mut self, fit: Fit) -> Self {
        self.fit = fit;
        self
    }

    pub fn with_crop(mut self, crop: CropAnchor) -> Self {
        self.crop = crop;
        self
    }
}

/// Named sizes for the image placements used across the site.
///
/// A preset only pre-selects width, height and quality; format, fit and
/// crop keep their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Preset {
    EventCard,
    EventHero,
    NewsHero,
    Thumbnail,
    Banner,
}

impl Preset {
    /// `(width, height, quality)` for this placement.
    pub fn dimensions(self) -> (u32, u32, u32) {
        match self {
            Preset::EventCard => (400, 200, 85),
            Preset::EventHero => (800, 400, 85),
            Preset::NewsHero => (800, 400, 85),
            Preset::Thumbnail => (200, 200, 80),
            Preset::Banner => (1200, 400, 90),
        }
    }

    pub fn options(self) -> ImageOptions {
        let (width, height, quality) = self.dimensions();
        ImageOptions::default()
            .with_size(width, height)
            .with_quality(quality)
    }
}

impl From<Preset> for ImageOptions {
    fn from(preset: Preset) -> Self {
        preset.options()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_85() {
        assert_eq!(Quality::default().value(), 85);
    }

    #[test]
    fn default_options() {
        let opts = ImageOptions::default();
        assert_eq!((opts.width, opts.height), (800, 400));
        assert_eq!(opts.quality.value(), 85);
        assert_eq!(opts.format, Format::Webp);
        assert_eq!(opts.fit, Fit::Crop);
        assert_eq!(opts.crop, CropAnchor::Center);
    }

    #[test]
    fn enum_values_use_cdn_spelling() {
        assert_eq!(Format::Pjpg.to_string(), "pjpg");
        assert_eq!(Fit::Fillmax.to_string(), "fillmax");
        assert_eq!(CropAnchor::Focalpoint.to_string(), "focalpoint");
        assert_eq!(Format::from_str("gif").unwrap(), Format::Gif);
        assert!(Fit::from_str("stretch").is_err());
    }

    #[test]
    fn presets_only_change_size_and_quality() {
        let card = Preset::EventCard.options();
        assert_eq!((card.width, card.height, card.quality.value()), (400, 200, 85));
        assert_eq!(card.format, Format::Webp);

        let thumb: ImageOptions = Preset::Thumbnail.into();
        assert_eq!((thumb.width, thumb.height, thumb.quality.value()), (200, 200, 80));

        let banner = Preset::Banner.options();
        assert_eq!((banner.width, banner.height, banner.quality.value()), (1200, 400, 90));
    }

    #[test]
    fn hero_presets_match_defaults() {
        assert_eq!(Preset::EventHero.options(), ImageOptions::default());
        assert_eq!(Preset::NewsHero.options(), ImageOptions::default());
    }
}
