//! Endpoint and capability descriptors returned by discovery.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::Error;

/// Category tag used by the companion app to pick an icon and grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisplayCategory {
    Light,
    Switch,
    SmartPlug,
    Fan,
    Thermostat,
    TemperatureSensor,
    Other,
}

impl FromStr for DisplayCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.trim().to_string()))
            .map_err(|_| Error::Config(format!("Unknown display category: {}", s)))
    }
}

/// Which state property a capability reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityProperties {
    pub name: String,
}

/// An interface an endpoint declares during discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityDescriptor {
    #[serde(rename = "type")]
    pub capability_type: String,
    pub interface: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<CapabilityProperties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proactively_reported: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrievable: Option<bool>,
}

impl CapabilityDescriptor {
    pub fn new(
        capability_type: impl Into<String>,
        interface: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            capability_type: capability_type.into(),
            interface: interface.into(),
            version: version.into(),
            properties: None,
            proactively_reported: None,
            retrievable: None,
        }
    }

    /// An `AlexaInterface` capability, version 3, for the given interface.
    pub fn interface(interface: impl Into<String>) -> Self {
        Self::new("AlexaInterface", interface, "3")
    }

    pub fn with_properties(mut self, name: impl Into<String>) -> Self {
        self.properties = Some(CapabilityProperties { name: name.into() });
        self
    }

    pub fn retrievable(mut self) -> Self {
        self.retrievable = Some(true);
        self
    }

    pub fn proactively_reported(mut self) -> Self {
        self.proactively_reported = Some(true);
        self
    }
}

impl Default for CapabilityDescriptor {
    /// The base `Alexa` interface every endpoint declares.
    fn default() -> Self {
        Self::interface("Alexa")
    }
}

/// Descriptive fields shown to the user for a discovered endpoint.
///
/// The defaults are placeholders for a sample switch; deployments override
/// them through [`crate::Config`].
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointMetadata {
    pub friendly_name: String,
    pub manufacturer_name: String,
    pub description: String,
    pub display_categories: Vec<DisplayCategory>,
}

impl Default for EndpointMetadata {
    fn default() -> Self {
        Self {
            friendly_name: "Sample Switch".to_string(),
            manufacturer_name: "MARA.ai, LLC".to_string(),
            description: "Sample Endpoint Description".to_string(),
            display_categories: vec![DisplayCategory::Light],
        }
    }
}

/// A device entry in a `Discover.Response` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDescriptor {
    pub endpoint_id: String,
    pub friendly_name: String,
    pub manufacturer_name: String,
    pub description: String,
    pub display_categories: Vec<DisplayCategory>,
    pub capabilities: Vec<CapabilityDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookie: Option<BTreeMap<String, String>>,
}

impl EndpointDescriptor {
    /// Create a descriptor with placeholder metadata.
    pub fn new(endpoint_id: impl Into<String>, capabilities: Vec<CapabilityDescriptor>) -> Self {
        let metadata = EndpointMetadata::default();
        Self {
            endpoint_id: endpoint_id.into(),
            friendly_name: metadata.friendly_name,
            manufacturer_name: metadata.manufacturer_name,
            description: metadata.description,
            display_categories: metadata.display_categories,
            capabilities,
            cookie: None,
        }
    }

    pub fn with_metadata(mut self, metadata: &EndpointMetadata) -> Self {
        self.friendly_name = metadata.friendly_name.clone();
        self.manufacturer_name = metadata.manufacturer_name.clone();
        self.description = metadata.description.clone();
        self.display_categories = metadata.display_categories.clone();
        self
    }

    pub fn with_cookie(mut self, cookie: BTreeMap<String, String>) -> Self {
        self.cookie = Some(cookie);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::{json, to_value};

    #[test]
    fn test_default_capability() {
        assert_eq!(
            to_value(CapabilityDescriptor::default()).unwrap(),
            json!({
                "type": "AlexaInterface",
                "interface": "Alexa",
                "version": "3"
            })
        );
    }

    #[test]
    fn test_capability_with_properties() {
        let capability = CapabilityDescriptor::interface("Alexa.PowerController")
            .with_properties("powerState")
            .retrievable()
            .proactively_reported();

        assert_eq!(
            to_value(capability).unwrap(),
            json!({
                "type": "AlexaInterface",
                "interface": "Alexa.PowerController",
                "version": "3",
                "properties": { "name": "powerState" },
                "proactivelyReported": true,
                "retrievable": true
            })
        );
    }

    #[test]
    fn test_endpoint_placeholder_metadata() {
        let endpoint = EndpointDescriptor::new("endpoint-001", vec![CapabilityDescriptor::default()]);

        assert_eq!(
            to_value(endpoint).unwrap(),
            json!({
                "endpointId": "endpoint-001",
                "friendlyName": "Sample Switch",
                "manufacturerName": "MARA.ai, LLC",
                "description": "Sample Endpoint Description",
                "displayCategories": ["LIGHT"],
                "capabilities": [{
                    "type": "AlexaInterface",
                    "interface": "Alexa",
                    "version": "3"
                }]
            })
        );
    }

    #[test]
    fn test_endpoint_overrides() {
        let metadata = EndpointMetadata {
            friendly_name: "Porch Light".to_string(),
            manufacturer_name: "Acme".to_string(),
            description: "Front porch".to_string(),
            display_categories: vec![DisplayCategory::Light, DisplayCategory::Switch],
        };
        let endpoint = EndpointDescriptor::new("porch", vec![])
            .with_metadata(&metadata)
            .with_cookie(BTreeMap::from([("room".to_string(), "porch".to_string())]));

        let value = to_value(endpoint).unwrap();
        assert_eq!(value["friendlyName"], "Porch Light");
        assert_eq!(value["displayCategories"], json!(["LIGHT", "SWITCH"]));
        assert_eq!(value["cookie"], json!({"room": "porch"}));
    }

    #[test]
    fn test_display_category_from_str() {
        assert_eq!("SMART_PLUG".parse::<DisplayCategory>().unwrap(), DisplayCategory::SmartPlug);
        assert_eq!(" LIGHT".parse::<DisplayCategory>().unwrap(), DisplayCategory::Light);
        assert!("LAMP".parse::<DisplayCategory>().is_err());
    }
}
