//! Configuration for the catalog updater

use core_config::{FromEnv, env_list};
use database::postgres::PostgresConfig;
use domain_catalog::{CatalogResult, CloudProvider, EnablementFilters};
use eyre::Result;

#[derive(Debug, Clone)]
pub struct Config {
    pub database: PostgresConfig,
    pub sources: Vec<SourceConfig>,
    /// Regions fetched when the command line does not name any
    pub default_regions: Vec<String>,
    pub patterns: PatternConfig,
}

/// One configured offer source. Sources with a URL fetch a JSON offer
/// sheet over HTTP; sources without one serve the built-in demo sheet.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub provider: CloudProvider,
    pub offer_url: Option<String>,
    pub enabled: bool,
}

/// Enablement patterns, each an anchored regular expression.
///
/// Unset patterns leave the corresponding dimension unrestricted.
#[derive(Debug, Clone, Default)]
pub struct PatternConfig {
    pub valid_os: Option<String>,
    pub valid_region: Option<String>,
    pub valid_instance_type: Option<String>,
    pub valid_database_type: Option<String>,
    pub valid_engine: Option<String>,
}

impl PatternConfig {
    pub fn compile(&self) -> CatalogResult<EnablementFilters> {
        EnablementFilters::from_patterns(
            self.valid_os.as_deref(),
            self.valid_region.as_deref(),
            self.valid_instance_type.as_deref(),
            self.valid_database_type.as_deref(),
            self.valid_engine.as_deref(),
        )
    }
}

fn default_regions() -> Vec<String> {
    vec![
        "us-east-1".to_string(),
        "us-west-2".to_string(),
        "eu-west-1".to_string(),
        "eu-central-1".to_string(),
    ]
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let sources = [
            (CloudProvider::Aws, "AWS"),
            (CloudProvider::Azure, "AZURE"),
            (CloudProvider::Gcp, "GCP"),
        ]
        .into_iter()
        .map(|(provider, prefix)| SourceConfig {
            provider,
            offer_url: std::env::var(format!("{}_OFFER_URL", prefix)).ok(),
            enabled: std::env::var(format!("{}_ENABLED", prefix))
                .map(|s| s.parse().unwrap_or(true))
                .unwrap_or(true),
        })
        .collect();

        let patterns = PatternConfig {
            valid_os: env_pattern("VALID_OS_PATTERN"),
            valid_region: env_pattern("VALID_REGION_PATTERN"),
            valid_instance_type: env_pattern("VALID_INSTANCE_TYPE_PATTERN"),
            valid_database_type: env_pattern("VALID_DATABASE_TYPE_PATTERN"),
            valid_engine: env_pattern("VALID_ENGINE_PATTERN"),
        };

        Ok(Config {
            database: <PostgresConfig as FromEnv>::from_env()?,
            sources,
            default_regions: env_list("DEFAULT_REGIONS").unwrap_or_else(default_regions),
            patterns,
        })
    }

}

fn env_pattern(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns_default_to_unrestricted() {
        temp_env::with_vars_unset(
            [
                "VALID_OS_PATTERN",
                "VALID_REGION_PATTERN",
                "VALID_INSTANCE_TYPE_PATTERN",
            ],
            || {
                let patterns = PatternConfig {
                    valid_os: env_pattern("VALID_OS_PATTERN"),
                    valid_region: env_pattern("VALID_REGION_PATTERN"),
                    valid_instance_type: env_pattern("VALID_INSTANCE_TYPE_PATTERN"),
                    ..Default::default()
                };
                let filters = patterns.compile().unwrap();
                assert!(filters.allows_region("anywhere"));
                assert!(filters.allows_os("HAIKU_OS"));
            },
        );
    }

    #[test]
    fn test_region_pattern_from_env_is_applied() {
        temp_env::with_var("VALID_REGION_PATTERN", Some("us-.*"), || {
            let patterns = PatternConfig {
                valid_region: env_pattern("VALID_REGION_PATTERN"),
                ..Default::default()
            };
            let filters = patterns.compile().unwrap();
            assert!(filters.allows_region("us-east-1"));
            assert!(!filters.allows_region("eu-west-1"));
        });
    }

    #[test]
    fn test_blank_pattern_is_treated_as_unset() {
        temp_env::with_var("VALID_ENGINE_PATTERN", Some("   "), || {
            assert!(env_pattern("VALID_ENGINE_PATTERN").is_none());
        });
    }
}
