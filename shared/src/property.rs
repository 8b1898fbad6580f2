//! Timestamped property reports carried in a response's `context`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// A single observation of an endpoint property.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyReport {
    pub namespace: String,
    pub name: String,
    pub value: Value,
    #[serde(serialize_with = "serialize_time_of_sample")]
    pub time_of_sample: DateTime<Utc>,
    pub uncertainty_in_milliseconds: u32,
}

impl PropertyReport {
    /// Create a report sampled now.
    ///
    /// `value` is kept as a JSON object when it parses as one, otherwise it is
    /// stored verbatim as a string.
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        value: &str,
        uncertainty_in_milliseconds: u32,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            value: parse_value(value),
            time_of_sample: Utc::now(),
            uncertainty_in_milliseconds,
        }
    }
}

impl Default for PropertyReport {
    /// Endpoint connectivity report with an empty value.
    fn default() -> Self {
        Self::new("Alexa.EndpointHealth", "connectivity", "{}", 0)
    }
}

fn parse_value(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => value,
        _ => Value::String(raw.to_string()),
    }
}

fn serialize_time_of_sample<S>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&time.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::{json, to_value};

    #[test]
    fn test_default_is_connectivity() {
        let report = PropertyReport::default();
        assert_eq!(report.namespace, "Alexa.EndpointHealth");
        assert_eq!(report.name, "connectivity");
        assert_eq!(report.value, json!({}));
        assert_eq!(report.uncertainty_in_milliseconds, 0);
    }

    #[test]
    fn test_object_value_is_parsed() {
        let report = PropertyReport::new("Alexa.EndpointHealth", "connectivity", r#"{"value":"OK"}"#, 0);
        assert_eq!(report.value, json!({"value": "OK"}));
    }

    #[test]
    fn test_unparseable_value_falls_back_to_string() {
        let report = PropertyReport::new("Alexa.PowerController", "powerState", "not valid structured data", 0);
        assert_eq!(report.value, json!("not valid structured data"));

        let report = PropertyReport::new("Alexa.PowerController", "powerState", "ON", 200);
        assert_eq!(report.value, json!("ON"));
    }

    #[test]
    fn test_scalar_json_stays_a_string() {
        let report = PropertyReport::new("Alexa.BrightnessController", "brightness", "42", 0);
        assert_eq!(report.value, json!("42"));
    }

    #[test]
    fn test_wire_shape() {
        let report = PropertyReport::new("Alexa.PowerController", "powerState", "OFF", 200);
        let value = to_value(&report).unwrap();

        assert_eq!(value["namespace"], "Alexa.PowerController");
        assert_eq!(value["name"], "powerState");
        assert_eq!(value["value"], "OFF");
        assert_eq!(value["uncertaintyInMilliseconds"], 200);

        let sampled = value["timeOfSample"].as_str().unwrap();
        assert!(sampled.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(sampled).is_ok());
    }
}
