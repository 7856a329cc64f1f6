use crate::events::AppEvent;
use async_channel::Sender;
use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use serde_with::DeserializeFromStr;
use skiphire::{Area, Location, Postcode};
use strum::{Display as StrumDisplay, EnumIter, EnumString};
use thiserror::Error;

pub const DEFAULT_POSTCODE: &str = "LE10 1SH";
pub const DEFAULT_AREA: &str = "Hinckley";
pub const DEFAULT_API_URL: &str = "https://app.wewantwaste.co.uk/api/skips/by-location";

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum CarouselVariant {
    /// Ring that advances one item per short drag.
    #[default]
    #[strum(serialize = "wheel", serialize = "3d", serialize = "ring")]
    Wheel,
    /// Ring that follows the pointer and settles on the nearest item.
    #[strum(serialize = "spin", serialize = "free")]
    Spin,
    /// Horizontal strip of cards.
    #[strum(serialize = "classic", serialize = "2d", serialize = "strip")]
    Classic,
}

impl CarouselVariant {
    pub fn default_threshold(&self) -> f64 {
        match self {
            Self::Wheel | Self::Spin => 10.0,
            Self::Classic => 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LocationConfig {
    pub postcode: Postcode,
    pub area: Area,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            postcode: Postcode::from(DEFAULT_POSTCODE),
            area: Area::from(DEFAULT_AREA),
        }
    }
}

impl LocationConfig {
    pub fn location(&self) -> Location {
        Location {
            postcode: self.postcode.clone(),
            area: self.area.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CarouselConfig {
    #[serde(default)]
    pub variant: CarouselVariant,
    /// Pixels of drag per committed step; defaults per variant.
    #[serde(default)]
    pub step_threshold: Option<f64>,
    #[serde(default = "default_radians_per_pixel")]
    pub radians_per_pixel: f64,
}

fn default_radians_per_pixel() -> f64 {
    0.01
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            variant: CarouselVariant::default(),
            step_threshold: None,
            radians_per_pixel: default_radians_per_pixel(),
        }
    }
}

impl CarouselConfig {
    pub fn threshold(&self) -> f64 {
        self.step_threshold
            .filter(|t| t.is_finite() && *t >= 0.0)
            .unwrap_or_else(|| self.variant.default_threshold())
    }

    /// Spin rate, falling back to the default unless finite and positive.
    pub fn radians_per_pixel(&self) -> f64 {
        Some(self.radians_per_pixel)
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or_else(default_radians_per_pixel)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub image_url_template: Option<String>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            image_url_template: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub carousel: CarouselConfig,
    #[serde(default)]
    pub api: ApiConfig,
    /// Static map key; without it the backdrop shows a notice instead.
    #[serde(default)]
    pub maps_api_key: Option<String>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

pub fn get_config_path() -> Result<std::path::PathBuf, ConfigError> {
    let proj_dirs = ProjectDirs::from("org", "skipwheel", "skipwheel")
        .ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config() -> Result<Config, ConfigError> {
    let config_path = get_config_path()?;

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(
            config::Environment::with_prefix("SKIPWHEEL")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(s.try_deserialize()?)
}

/// Loads the user config, falling back to built-in defaults when it is
/// missing or broken.
pub fn load_or_default() -> Config {
    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Using default configuration: {}", e);
            Config::default()
        }
    }
}

/// Command-line settings that win over the file and environment, kept so
/// they survive a live reload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub postcode: Option<String>,
    pub area: Option<String>,
    pub variant: Option<CarouselVariant>,
}

impl Overrides {
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(postcode) = &self.postcode {
            config.location.postcode = Postcode::new(postcode.trim());
        }
        if let Some(area) = &self.area {
            config.location.area = Area::new(area.trim());
        }
        if let Some(variant) = self.variant {
            config.carousel.variant = variant;
        }
        config
    }
}

pub fn write_default_config() -> std::io::Result<std::path::PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    let config_path = match get_config_path() {
        Ok(p) => p,
        Err(e) => {
            log::error!("Config watcher error: {}", e);
            return;
        }
    };
    let Some(config_dir) = config_path.parent().map(|p| p.to_path_buf()) else {
        return;
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                let touches_config = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                ) && event.paths.iter().any(|p| p == &config_path);

                if touches_config && tx.send(AppEvent::ConfigReload).await.is_err() {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_deserialization() {
        let cases = vec![
            ("\"wheel\"", CarouselVariant::Wheel),
            ("\"Wheel\"", CarouselVariant::Wheel),
            ("\"3D\"", CarouselVariant::Wheel),
            ("\"SPIN\"", CarouselVariant::Spin),
            ("\"free\"", CarouselVariant::Spin),
            ("\"classic\"", CarouselVariant::Classic),
            ("\"2d\"", CarouselVariant::Classic),
        ];

        for (json, expected) in cases {
            let deserialized: CarouselVariant = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized, expected);
        }

        assert!(serde_json::from_str::<CarouselVariant>("\"carousel\"").is_err());
    }

    #[test]
    fn test_bundled_default_config_matches_defaults() {
        let parsed: Config = config::Config::builder()
            .add_source(config::File::from_str(
                DEFAULT_CONFIG,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: Config = config::Config::builder()
            .add_source(config::File::from_str(
                "[carousel]\nvariant = \"classic\"\n[location]\npostcode = \"SW1A 1AA\"\narea = \"London\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(parsed.carousel.variant, CarouselVariant::Classic);
        assert_eq!(parsed.carousel.threshold(), 40.0);
        assert_eq!(parsed.location.location(), Location::new("SW1A 1AA", "London"));
        assert_eq!(parsed.api, ApiConfig::default());
        assert_eq!(parsed.maps_api_key, None);
    }

    #[test]
    fn test_threshold_override_and_fallback() {
        let mut cfg = CarouselConfig {
            variant: CarouselVariant::Wheel,
            step_threshold: Some(25.0),
            ..CarouselConfig::default()
        };
        assert_eq!(cfg.threshold(), 25.0);

        cfg.step_threshold = Some(-3.0);
        assert_eq!(cfg.threshold(), 10.0);

        cfg.step_threshold = None;
        cfg.variant = CarouselVariant::Classic;
        assert_eq!(cfg.threshold(), 40.0);

        cfg.radians_per_pixel = 0.02;
        assert_eq!(cfg.radians_per_pixel(), 0.02);
        for bad in [f64::NAN, f64::INFINITY, 0.0, -0.5] {
            cfg.radians_per_pixel = bad;
            assert_eq!(cfg.radians_per_pixel(), 0.01);
        }
    }

    #[test]
    fn test_overrides_replace_only_given_fields() {
        let overrides = Overrides {
            postcode: Some(" NR1 3QU ".to_string()),
            variant: Some(CarouselVariant::Spin),
            ..Overrides::default()
        };

        let cfg = overrides.apply(Config::default());
        assert_eq!(cfg.location.postcode.as_str(), "NR1 3QU");
        assert_eq!(cfg.location.area.as_str(), DEFAULT_AREA);
        assert_eq!(cfg.carousel.variant, CarouselVariant::Spin);
        assert_eq!(Overrides::default().apply(Config::default()), Config::default());
    }
}
