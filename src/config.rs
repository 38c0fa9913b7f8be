use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::models::Category;
use crate::states;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/resources.db"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_search_api_base")]
    pub api_base: String,
    #[serde(default = "default_search_key_env")]
    pub api_key_env: String,
    /// No timeout is applied unless this is set.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_base: default_search_api_base(),
            api_key_env: default_search_key_env(),
            timeout_secs: None,
        }
    }
}

fn default_model() -> String {
    "gpt-5-nano".to_string()
}
fn default_search_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_search_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    #[serde(default = "default_facilities_url")]
    pub api_url: String,
    #[serde(default = "default_facilities_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
    /// Subset of state codes to ingest. Empty means all of them.
    #[serde(default)]
    pub states: Vec<String>,
    #[serde(default = "default_mappings")]
    pub mappings: Vec<FacilityMapping>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            api_url: default_facilities_url(),
            api_key_env: default_facilities_key_env(),
            per_page: default_per_page(),
            request_delay_ms: default_request_delay_ms(),
            states: Vec::new(),
            mappings: default_mappings(),
        }
    }
}

/// Maps one facilities-API `type` onto a resource category.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FacilityMapping {
    pub facility_type: String,
    pub category: Category,
}

fn default_facilities_url() -> String {
    "https://sandbox-api.va.gov/services/va_facilities/v1/facilities".to_string()
}
fn default_facilities_key_env() -> String {
    "VA_API_KEY".to_string()
}
fn default_per_page() -> u32 {
    50
}
fn default_request_delay_ms() -> u64 {
    500
}

// TODO: `cemetery -> Housing` is a placeholder until product picks a real
// housing source; revisit once a housing facility type is chosen.
fn default_mappings() -> Vec<FacilityMapping> {
    [
        ("health", Category::Healthcare),
        ("benefits", Category::Employment),
        ("cemetery", Category::Housing),
        ("vet_center", Category::MentalHealth),
    ]
    .into_iter()
    .map(|(facility_type, category)| FacilityMapping {
        facility_type: facility_type.to_string(),
        category,
    })
    .collect()
}

impl Config {
    /// Built-in defaults, used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }
}

impl IngestConfig {
    /// State codes to walk, upper-cased, in table order when unrestricted.
    pub fn state_list(&self) -> Vec<String> {
        if self.states.is_empty() {
            states::state_codes().map(str::to_string).collect()
        } else {
            self.states.iter().map(|s| s.to_uppercase()).collect()
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Like [`load_config`], but falls back to [`Config::minimal`] when the file
/// does not exist.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::minimal())
    }
}

pub fn validate(config: &Config) -> Result<()> {
    if config.server.bind.trim().is_empty() {
        bail!("server.bind must not be empty");
    }

    if config.search.model.trim().is_empty() {
        bail!("search.model must not be empty");
    }

    let ingest = &config.ingest;
    if !(1..=1000).contains(&ingest.per_page) {
        bail!("ingest.per_page must be in [1, 1000]");
    }

    if ingest.mappings.is_empty() {
        bail!("ingest.mappings must contain at least one facility type");
    }

    let mut seen = HashSet::new();
    for mapping in &ingest.mappings {
        if !seen.insert(mapping.facility_type.as_str()) {
            bail!(
                "ingest.mappings lists facility type '{}' more than once",
                mapping.facility_type
            );
        }
    }

    for code in &ingest.states {
        if states::state_name(code).is_none() {
            bail!("ingest.states contains unknown state code: '{}'", code);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(validate(&config).is_ok());
        assert_eq!(config.ingest.per_page, 50);
        assert_eq!(config.ingest.request_delay_ms, 500);
        assert_eq!(config.search.model, "gpt-5-nano");
        assert_eq!(config.ingest.state_list().len(), 50);
        assert_eq!(config.ingest.mappings.len(), 4);
        assert_eq!(config.ingest.mappings[2].facility_type, "cemetery");
        assert_eq!(config.ingest.mappings[2].category, Category::Housing);
    }

    #[test]
    fn test_mapping_override() {
        let config: Config = toml::from_str(
            r#"
            [ingest]
            states = ["tx"]

            [[ingest.mappings]]
            facility_type = "vet_center"
            category = "Mental Health"
            "#,
        )
        .unwrap();
        assert!(validate(&config).is_ok());
        assert_eq!(config.ingest.state_list(), vec!["TX".to_string()]);
        assert_eq!(
            config.ingest.mappings,
            vec![FacilityMapping {
                facility_type: "vet_center".to_string(),
                category: Category::MentalHealth,
            }]
        );
    }

    #[test]
    fn test_unknown_category_rejected_by_parser() {
        let parsed: Result<Config, _> = toml::from_str(
            r#"
            [[ingest.mappings]]
            facility_type = "health"
            category = "Veterinary"
            "#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn test_validation_errors() {
        let mut config = Config::minimal();
        config.ingest.per_page = 0;
        assert!(validate(&config).is_err());

        let mut config = Config::minimal();
        config.ingest.states = vec!["ZZ".to_string()];
        assert!(validate(&config).is_err());

        let mut config = Config::minimal();
        config.ingest.mappings.push(FacilityMapping {
            facility_type: "health".to_string(),
            category: Category::Housing,
        });
        assert!(validate(&config).is_err());

        let mut config = Config::minimal();
        config.ingest.mappings.clear();
        assert!(validate(&config).is_err());
    }
}
