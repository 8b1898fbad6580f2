//! Configuration management for the Lambda.

use std::env;

use crate::discovery::{DisplayCategory, EndpointMetadata};
use crate::{Error, Result};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// DynamoDB table holding device state
    pub table_name: String,
    /// AWS region
    pub aws_region: String,
    /// What discovery reports
    pub discovery: DiscoveryConfig,
}

/// The endpoint advertised in discovery responses.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryConfig {
    pub endpoint_id: String,
    pub metadata: EndpointMetadata,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            endpoint_id: "endpoint-001".to_string(),
            metadata: EndpointMetadata::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = DiscoveryConfig::default();

        let display_categories = match lookup("ENDPOINT_DISPLAY_CATEGORIES") {
            Some(raw) => raw
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(str::parse::<DisplayCategory>)
                .collect::<Result<Vec<_>>>()?,
            None => defaults.metadata.display_categories,
        };
        if display_categories.is_empty() {
            return Err(Error::Config(
                "ENDPOINT_DISPLAY_CATEGORIES must name at least one category".to_string(),
            ));
        }

        Ok(Self {
            table_name: lookup("DEVICE_TABLE_NAME").unwrap_or_else(|| "SampleSmartHome".to_string()),
            aws_region: lookup("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            discovery: DiscoveryConfig {
                endpoint_id: lookup("SAMPLE_ENDPOINT_ID").unwrap_or(defaults.endpoint_id),
                metadata: EndpointMetadata {
                    friendly_name: lookup("ENDPOINT_FRIENDLY_NAME")
                        .unwrap_or(defaults.metadata.friendly_name),
                    manufacturer_name: lookup("ENDPOINT_MANUFACTURER")
                        .unwrap_or(defaults.metadata.manufacturer_name),
                    description: lookup("ENDPOINT_DESCRIPTION")
                        .unwrap_or(defaults.metadata.description),
                    display_categories,
                },
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.table_name, "SampleSmartHome");
        assert_eq!(config.aws_region, "us-east-1");
        assert_eq!(config.discovery, DiscoveryConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DEVICE_TABLE_NAME", "Devices"),
            ("AWS_REGION", "eu-west-1"),
            ("SAMPLE_ENDPOINT_ID", "porch-light"),
            ("ENDPOINT_FRIENDLY_NAME", "Porch Light"),
            ("ENDPOINT_DISPLAY_CATEGORIES", "LIGHT, SWITCH"),
        ])
        .unwrap();

        assert_eq!(config.table_name, "Devices");
        assert_eq!(config.aws_region, "eu-west-1");
        assert_eq!(config.discovery.endpoint_id, "porch-light");
        assert_eq!(config.discovery.metadata.friendly_name, "Porch Light");
        assert_eq!(config.discovery.metadata.manufacturer_name, "MARA.ai, LLC");
        assert_eq!(
            config.discovery.metadata.display_categories,
            vec![DisplayCategory::Light, DisplayCategory::Switch]
        );
    }

    #[test]
    fn test_invalid_display_categories() {
        assert!(matches!(
            config_from(&[("ENDPOINT_DISPLAY_CATEGORIES", "LAMP")]),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            config_from(&[("ENDPOINT_DISPLAY_CATEGORIES", " , ")]),
            Err(Error::Config(_))
        ));
    }
}
