use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use crate::core::address::{DEFAULT_KNOWN_CITIES, DEFAULT_STREET_KEYWORDS};
use crate::core::agency::DEFAULT_PRIVATE_MARKERS;
use crate::models::ScoringWeights;

/// Engine configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub address: AddressSettings,
    #[serde(default)]
    pub agency: AgencySettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    /// Matches scoring below this are dropped
    #[serde(default = "default_min_score")]
    pub min_score: u8,
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

fn default_min_score() -> u8 { 50 }
fn default_limit() -> usize { 20 }
fn default_max_limit() -> usize { 100 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_size_weight")]
    pub size: f64,
    #[serde(default = "default_price_weight")]
    pub price: f64,
    #[serde(default = "default_type_weight")]
    pub property_type: f64,
    #[serde(default = "default_bedrooms_weight")]
    pub bedrooms: f64,
    #[serde(default = "default_bathrooms_weight")]
    pub bathrooms: f64,
    #[serde(default = "default_price_tolerance")]
    pub price_tolerance: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            size: default_size_weight(),
            price: default_price_weight(),
            property_type: default_type_weight(),
            bedrooms: default_bedrooms_weight(),
            bathrooms: default_bathrooms_weight(),
            price_tolerance: default_price_tolerance(),
        }
    }
}

impl From<&WeightsConfig> for ScoringWeights {
    fn from(config: &WeightsConfig) -> Self {
        Self {
            size: config.size,
            price: config.price,
            property_type: config.property_type,
            bedrooms: config.bedrooms,
            bathrooms: config.bathrooms,
            price_tolerance: config.price_tolerance,
        }
    }
}

fn default_size_weight() -> f64 { 30.0 }
fn default_price_weight() -> f64 { 40.0 }
fn default_type_weight() -> f64 { 15.0 }
fn default_bedrooms_weight() -> f64 { 10.0 }
fn default_bathrooms_weight() -> f64 { 5.0 }
fn default_price_tolerance() -> f64 { 0.10 }

/// Word lists used by the address normalizer
#[derive(Debug, Clone, Deserialize)]
pub struct AddressSettings {
    #[serde(default = "default_street_keywords")]
    pub street_keywords: Vec<String>,
    #[serde(default = "default_known_cities")]
    pub known_cities: Vec<String>,
}

impl Default for AddressSettings {
    fn default() -> Self {
        Self {
            street_keywords: default_street_keywords(),
            known_cities: default_known_cities(),
        }
    }
}

fn default_street_keywords() -> Vec<String> {
    DEFAULT_STREET_KEYWORDS.iter().map(|s| s.to_string()).collect()
}

fn default_known_cities() -> Vec<String> {
    DEFAULT_KNOWN_CITIES.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgencySettings {
    #[serde(default = "default_private_markers")]
    pub private_markers: Vec<String>,
}

impl Default for AgencySettings {
    fn default() -> Self {
        Self {
            private_markers: default_private_markers(),
        }
    }
}

fn default_private_markers() -> Vec<String> {
    DEFAULT_PRIVATE_MARKERS.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with CASA)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., CASA__MATCHING__MIN_SCORE -> matching.min_score
            .add_source(environment())
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?
            .try_deserialize()
    }

    pub fn weights(&self) -> ScoringWeights {
        ScoringWeights::from(&self.scoring.weights)
    }
}

fn environment() -> Environment {
    Environment::with_prefix("CASA")
        .prefix_separator("__")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("address.street_keywords")
        .with_list_parse_key("address.known_cities")
        .with_list_parse_key("agency.private_markers")
        .try_parsing(true)
}
