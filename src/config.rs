//! Site configuration module.
//!
//! Handles loading, validating, and merging `site.toml`. Stock defaults are
//! overridden by whatever the user file specifies, then a couple of
//! environment variables may override the content identifiers.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [content]
//! project_id = "t79osmcf"   # Content store project (omit to disable fetching/images)
//! dataset = "production"
//! api_version = "2024-01-01"
//! use_cdn = true
//! revalidate_secs = 30      # How long fetched content may be reused
//!
//! [server]
//! address = "127.0.0.1"
//! port = 3000
//!
//! [studio]
//! base_path = "/studio"     # Routes under here skip the public chrome
//! # url = "https://finnvalleyac.sanity.studio"
//!
//! [site]
//! # assets_dir = "assets"   # Copied to the build output and served at /assets
//!
//! [venue]
//! name = "Finn Valley AC"
//! address = "Finn Valley Centre, Mill Brae, Stranorlar, Co. Donegal, F93 NV0T, Ireland"
//!
//! [club]
//! name = "Finn Valley Athletics Club"
//! email = "info@finnvalleyac.ie"
//!
//! [theme]
//! primary = "#2563eb"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable overriding `content.project_id`.
pub const ENV_PROJECT_ID: &str = "CONTENT_PROJECT_ID";
/// Environment variable overriding `content.dataset`.
pub const ENV_DATASET: &str = "CONTENT_DATASET";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `site.toml`.
///
/// All fields have defaults; a user file only lists what it changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Where content comes from and how long it may be reused.
    pub content: ContentConfig,
    /// Listen address for `serve`.
    pub server: ServerConfig,
    /// Authoring studio mount.
    pub studio: StudioConfig,
    /// Static assets.
    pub site: SiteAssetsConfig,
    /// The home venue, used for every event hosted at the club.
    pub venue: VenueConfig,
    /// Club contact details shown on the contact page.
    pub club: ClubConfig,
    /// Brand colours, emitted as CSS custom properties.
    pub theme: ThemeConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.content.revalidate_secs == 0 {
            return Err(ConfigError::Validation(
                "content.revalidate_secs must be greater than 0".into(),
            ));
        }
        for (key, value) in [
            ("content.project_id", &self.content.project_id),
            ("content.dataset", &self.content.dataset),
        ] {
            if let Some(v) = value
                && !is_identifier(v)
            {
                return Err(ConfigError::Validation(format!(
                    "{key} may only contain letters, digits, '-' and '_'"
                )));
            }
        }
        if !self.studio.base_path.starts_with('/') || self.studio.base_path.len() < 2 {
            return Err(ConfigError::Validation(
                "studio.base_path must start with '/' and name a path".into(),
            ));
        }
        if self.studio.base_path.ends_with('/') {
            return Err(ConfigError::Validation(
                "studio.base_path must not end with '/'".into(),
            ));
        }
        Ok(())
    }
}

fn is_identifier(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Content store connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentConfig {
    /// Project identifier. Absent means no remote content and no images.
    pub project_id: Option<String>,
    /// Dataset name within the project.
    pub dataset: Option<String>,
    /// Dated API version, e.g. `"2024-01-01"`.
    pub api_version: String,
    /// Query the edge-cached API host instead of the live one.
    pub use_cdn: bool,
    /// Seconds a fetched result may be served before it is fetched again.
    pub revalidate_secs: u64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            dataset: Some("production".to_string()),
            api_version: "2024-01-01".to_string(),
            use_cdn: true,
            revalidate_secs: 30,
        }
    }
}

impl ContentConfig {
    pub fn revalidate(&self) -> Duration {
        Duration::from_secs(self.revalidate_secs)
    }
}

/// Listen address for the HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
        }
    }
}

/// Authoring studio mount settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudioConfig {
    /// Path prefix reserved for the studio.
    pub base_path: String,
    /// Where the hosted studio lives, linked from the mount's landing page.
    pub url: Option<String>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            base_path: "/studio".to_string(),
            url: None,
        }
    }
}

/// Static asset settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteAssetsConfig {
    /// Directory copied into the build output and served under `/assets`.
    pub assets_dir: Option<PathBuf>,
}

/// The club's home venue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VenueConfig {
    /// Display name used as the location of home events.
    pub name: String,
    /// Full postal address.
    pub address: String,
    /// Fixed Google Maps place link.
    pub google_maps_url: String,
    /// Fixed Apple Maps place link.
    pub apple_maps_url: String,
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            name: "Finn Valley AC".to_string(),
            address: "Finn Valley Centre, Mill Brae, Stranorlar, Co. Donegal, F93 NV0T, Ireland"
                .to_string(),
            google_maps_url: "https://www.google.com/maps/place/Finn+Valley+Centre/@54.8020908,-7.7682074,17z/data=!3m1!4b1!4m6!3m5!1s0x485fbed2cbf354dd:0x1945d592d29541b2!8m2!3d54.8020877!4d-7.7656271!16s%2Fg%2F1tfgj6w_?entry=ttu&g_ep=EgoyMDI1MDkwOS4wIKXMDSoASAFQAw%3D%3D".to_string(),
            apple_maps_url: "https://maps.apple.com/place?place-id=IDFFDE667CE98239F&address=Finn+Valley+Centre%2C+Mill+Brae%2C+Stranorlar%2C+Co.+Donegal%2C+F93+NV0T%2C+Ireland&coordinate=54.8018134%2C-7.765362&name=Finn+Valley+Athletic+Club&_provider=9902".to_string(),
        }
    }
}

/// Club identity and contact details.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClubConfig {
    pub name: String,
    pub short_name: String,
    pub email: String,
    pub phone: String,
    /// Postal address, one entry per line.
    pub address: Vec<String>,
}

impl Default for ClubConfig {
    fn default() -> Self {
        Self {
            name: "Finn Valley Athletics Club".to_string(),
            short_name: "Finn Valley AC".to_string(),
            email: "info@finnvalleyac.ie".to_string(),
            phone: "+353 (0)74 123 4567".to_string(),
            address: vec![
                "Finn Valley Athletics Track".to_string(),
                "Stranorlar, Co. Donegal".to_string(),
                "Ireland".to_string(),
            ],
        }
    }
}

/// Brand colours.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    /// Buttons, links and the hero background.
    pub primary: String,
    /// Hover state and hero gradient end.
    pub primary_dark: String,
    pub background: String,
    pub text: String,
    /// Dates, captions, secondary copy.
    pub text_muted: String,
    pub border: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            primary: "#2563eb".to_string(),
            primary_dark: "#1e40af".to_string(),
            background: "#ffffff".to_string(),
            text: "#111827".to_string(),
            text_muted: "#4b5563".to_string(),
            border: "#e5e7eb".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given file.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result. A missing file yields the stock defaults.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Apply [`ENV_PROJECT_ID`] and [`ENV_DATASET`] on top of a loaded config.
///
/// `lookup` is the environment (normally `|k| std::env::var(k).ok()`). Empty
/// values are ignored. The result is validated again.
pub fn apply_env_overrides(
    mut config: SiteConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<SiteConfig, ConfigError> {
    if let Some(project_id) = lookup(ENV_PROJECT_ID).filter(|v| !v.is_empty()) {
        config.content.project_id = Some(project_id);
    }
    if let Some(dataset) = lookup(ENV_DATASET).filter(|v| !v.is_empty()) {
        config.content.dataset = Some(dataset);
    }
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `site.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Finn Valley AC site configuration
# ==================================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Content store
# ---------------------------------------------------------------------------
[content]
# Project identifier of the hosted content store. Without it the site can
# only render from a local dataset export, and images are omitted.
# Can also be set with the CONTENT_PROJECT_ID environment variable.
# project_id = "t79osmcf"

# Dataset within the project (CONTENT_DATASET overrides).
dataset = "production"

# Dated API version.
api_version = "2024-01-01"

# Query the edge-cached API host.
use_cdn = true

# Seconds a fetched result may be reused before fetching again.
revalidate_secs = 30

# ---------------------------------------------------------------------------
# HTTP server (serve command)
# ---------------------------------------------------------------------------
[server]
address = "127.0.0.1"
port = 3000

# ---------------------------------------------------------------------------
# Authoring studio
# ---------------------------------------------------------------------------
[studio]
# Requests under this path skip the public navigation and layout.
base_path = "/studio"

# Hosted studio linked from the mount's landing page.
# url = "https://finnvalleyac.sanity.studio"

# ---------------------------------------------------------------------------
# Static assets
# ---------------------------------------------------------------------------
[site]
# Directory copied into the build output and served under /assets.
# assets_dir = "assets"

# ---------------------------------------------------------------------------
# Home venue (used for every event hosted at the club)
# ---------------------------------------------------------------------------
[venue]
name = "Finn Valley AC"
address = "Finn Valley Centre, Mill Brae, Stranorlar, Co. Donegal, F93 NV0T, Ireland"
google_maps_url = "https://www.google.com/maps/place/Finn+Valley+Centre/@54.8020908,-7.7682074,17z/data=!3m1!4b1!4m6!3m5!1s0x485fbed2cbf354dd:0x1945d592d29541b2!8m2!3d54.8020877!4d-7.7656271!16s%2Fg%2F1tfgj6w_?entry=ttu&g_ep=EgoyMDI1MDkwOS4wIKXMDSoASAFQAw%3D%3D"
apple_maps_url = "https://maps.apple.com/place?place-id=IDFFDE667CE98239F&address=Finn+Valley+Centre%2C+Mill+Brae%2C+Stranorlar%2C+Co.+Donegal%2C+F93+NV0T%2C+Ireland&coordinate=54.8018134%2C-7.765362&name=Finn+Valley+Athletic+Club&_provider=9902"

# ---------------------------------------------------------------------------
# Club details (contact page, footer)
# ---------------------------------------------------------------------------
[club]
name = "Finn Valley Athletics Club"
short_name = "Finn Valley AC"
email = "info@finnvalleyac.ie"
phone = "+353 (0)74 123 4567"
address = ["Finn Valley Athletics Track", "Stranorlar, Co. Donegal", "Ireland"]

# ---------------------------------------------------------------------------
# Theme colours
# ---------------------------------------------------------------------------
[theme]
primary = "#2563eb"
primary_dark = "#1e40af"
background = "#ffffff"
text = "#111827"
text_muted = "#4b5563"
border = "#e5e7eb"
"##
}

/// Generate CSS custom properties from theme config.
pub fn generate_theme_css(theme: &ThemeConfig) -> String {
    format!(
        r#":root {{
    --color-primary: {primary};
    --color-primary-dark: {primary_dark};
    --color-bg: {background};
    --color-text: {text};
    --color-text-muted: {text_muted};
    --color-border: {border};
}}"#,
        primary = theme.primary,
        primary_dark = theme.primary_dark,
        background = theme.background,
        text = theme.text,
        text_muted = theme.text_muted,
        border = theme.border,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn default_config_content_settings() {
        let config = SiteConfig::default();
        assert_eq!(config.content.project_id, None);
        assert_eq!(config.content.dataset.as_deref(), Some("production"));
        assert_eq!(config.content.revalidate(), Duration::from_secs(30));
        assert!(config.content.use_cdn);
    }

    #[test]
    fn default_config_has_home_venue() {
        let config = SiteConfig::default();
        assert_eq!(config.venue.name, "Finn Valley AC");
        assert!(config.venue.address.contains("F93 NV0T"));
        assert_eq!(config.studio.base_path, "/studio");
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[content]
project_id = "abc123"
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.content.project_id.as_deref(), Some("abc123"));
        // Defaults preserved
        assert_eq!(config.content.revalidate_secs, 30);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn generate_theme_css_uses_config_colors() {
        let mut theme = ThemeConfig::default();
        theme.primary = "#0a0".to_string();
        let css = generate_theme_css(&theme);
        assert!(css.contains("--color-primary: #0a0"));
        assert!(css.contains("--color-text-muted:"));
        assert!(css.contains("--color-border:"));
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("site.toml")).unwrap();
        assert_eq!(config.content.api_version, "2024-01-01");
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("site.toml");
        fs::write(
            &path,
            r#"
[content]
project_id = "t79osmcf"
revalidate_secs = 60

[server]
port = 8080
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.content.project_id.as_deref(), Some("t79osmcf"));
        assert_eq!(config.content.revalidate_secs, 60);
        assert_eq!(config.server.port, 8080);
        // Unspecified values should be defaults
        assert_eq!(config.content.dataset.as_deref(), Some("production"));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("site.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("site.toml");
        fs::write(&path, "[content]\nprojectid = \"typo\"\n").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[colours]\nprimary = \"#fff\"\n");
        assert!(result.is_err());
    }

    // =========================================================================
    // merge tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("a = 1\nb = 2").unwrap();
        let overlay: toml::Value = toml::from_str("b = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"].as_integer(), Some(1));
        assert_eq!(merged["b"].as_integer(), Some(3));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str("[venue]\nname = \"A\"\naddress = \"B\"").unwrap();
        let overlay: toml::Value = toml::from_str("[venue]\nname = \"C\"").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["venue"]["name"].as_str(), Some("C"));
        assert_eq!(merged["venue"]["address"].as_str(), Some("B"));
    }

    #[test]
    fn merge_toml_arrays_replace() {
        let base: toml::Value = toml::from_str("address = [\"a\", \"b\"]").unwrap();
        let overlay: toml::Value = toml::from_str("address = [\"c\"]").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["address"].as_array().map(Vec::len), Some(1));
    }

    // =========================================================================
    // validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_revalidate_zero() {
        let mut config = SiteConfig::default();
        config.content.revalidate_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_project_id_characters() {
        let mut config = SiteConfig::default();
        config.content.project_id = Some("abc/../x".into());
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        config.content.project_id = Some("abc_12-x".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_studio_base_path() {
        for bad in ["studio", "/", "/studio/"] {
            let mut config = SiteConfig::default();
            config.studio.base_path = bad.into();
            assert!(config.validate().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn resolve_config_rejects_invalid_values() {
        let overlay: toml::Value = toml::from_str("[content]\nrevalidate_secs = 0").unwrap();
        let result = resolve_config(stock_defaults_value(), Some(overlay));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // environment overrides
    // =========================================================================

    #[test]
    fn env_overrides_identifiers() {
        let env: HashMap<&str, &str> =
            HashMap::from([(ENV_PROJECT_ID, "envproj"), (ENV_DATASET, "staging")]);
        let config =
            apply_env_overrides(SiteConfig::default(), |k| env.get(k).map(|v| v.to_string()))
                .unwrap();
        assert_eq!(config.content.project_id.as_deref(), Some("envproj"));
        assert_eq!(config.content.dataset.as_deref(), Some("staging"));
    }

    #[test]
    fn env_overrides_ignore_empty_values() {
        let mut base = SiteConfig::default();
        base.content.project_id = Some("fromfile".into());
        let config = apply_env_overrides(base, |k| {
            (k == ENV_PROJECT_ID).then(String::new)
        })
        .unwrap();
        assert_eq!(config.content.project_id.as_deref(), Some("fromfile"));
    }

    #[test]
    fn env_overrides_are_validated() {
        let result = apply_env_overrides(SiteConfig::default(), |k| {
            (k == ENV_PROJECT_ID).then(|| "bad id".to_string())
        });
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // stock config
    // =========================================================================

    #[test]
    fn stock_config_toml_is_valid_toml() {
        let value: toml::Value = toml::from_str(stock_config_toml()).unwrap();
        assert!(value.is_table());
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let parsed: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(parsed.content.dataset, defaults.content.dataset);
        assert_eq!(parsed.content.revalidate_secs, defaults.content.revalidate_secs);
        assert_eq!(parsed.venue.google_maps_url, defaults.venue.google_maps_url);
        assert_eq!(parsed.venue.apple_maps_url, defaults.venue.apple_maps_url);
        assert_eq!(parsed.club.address, defaults.club.address);
        assert_eq!(parsed.theme.primary, defaults.theme.primary);
        assert_eq!(parsed.server.port, defaults.server.port);
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let value = stock_defaults_value();
        for section in ["content", "server", "studio", "site", "venue", "club", "theme"] {
            assert!(value.get(section).is_some(), "missing section {section}");
        }
    }
}
