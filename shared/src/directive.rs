//! Inbound directive envelope.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectiveHeader {
    pub namespace: String,
    pub name: String,
    pub message_id: Option<String>,
    pub correlation_token: Option<String>,
    pub payload_version: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectiveScope {
    #[serde(rename = "type")]
    pub scope_type: String,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectiveEndpoint {
    pub endpoint_id: Option<String>,
    pub scope: Option<DirectiveScope>,
    pub cookie: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectiveBody {
    pub header: DirectiveHeader,
    pub endpoint: Option<DirectiveEndpoint>,
    #[serde(default)]
    pub payload: Value,
}

/// The `{ "directive": { ... } }` document sent by the voice service.
#[derive(Debug, Clone, Deserialize)]
pub struct Directive {
    pub directive: DirectiveBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    On,
    Off,
}

impl PowerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerState::On => "ON",
            PowerState::Off => "OFF",
        }
    }
}

/// What a directive asks for, derived from its namespace and name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    AcceptGrant,
    Discover,
    Power(PowerState),
    ReportState,
    Unsupported,
}

impl Directive {
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::MalformedDirective(e.to_string()))
    }

    pub fn namespace(&self) -> &str {
        &self.directive.header.namespace
    }

    pub fn name(&self) -> &str {
        &self.directive.header.name
    }

    pub fn kind(&self) -> DirectiveKind {
        match (self.namespace(), self.name()) {
            ("Alexa.Authorization", _) => DirectiveKind::AcceptGrant,
            ("Alexa.Discovery", _) => DirectiveKind::Discover,
            ("Alexa.PowerController", "TurnOn") => DirectiveKind::Power(PowerState::On),
            ("Alexa.PowerController", "TurnOff") => DirectiveKind::Power(PowerState::Off),
            ("Alexa", "ReportState") => DirectiveKind::ReportState,
            _ => DirectiveKind::Unsupported,
        }
    }

    pub fn correlation_token(&self) -> Result<&str> {
        self.directive
            .header
            .correlation_token
            .as_deref()
            .ok_or_else(|| Error::MalformedDirective("directive.header.correlationToken".to_string()))
    }

    pub fn endpoint_id(&self) -> Result<&str> {
        self.directive
            .endpoint
            .as_ref()
            .and_then(|endpoint| endpoint.endpoint_id.as_deref())
            .ok_or_else(|| Error::MalformedDirective("directive.endpoint.endpointId".to_string()))
    }

    /// Bearer token from the endpoint scope, if the request carried one.
    pub fn token(&self) -> Option<&str> {
        self.directive
            .endpoint
            .as_ref()
            .and_then(|endpoint| endpoint.scope.as_ref())
            .and_then(|scope| scope.token.as_deref())
    }
}

impl FromStr for Directive {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| Error::MalformedDirective(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    fn directive(value: Value) -> Directive {
        Directive::from_value(value).unwrap()
    }

    #[test]
    fn test_kind() {
        let cases = [
            ("Alexa.Authorization", "AcceptGrant", DirectiveKind::AcceptGrant),
            ("Alexa.Discovery", "Discover", DirectiveKind::Discover),
            ("Alexa.PowerController", "TurnOn", DirectiveKind::Power(PowerState::On)),
            ("Alexa.PowerController", "TurnOff", DirectiveKind::Power(PowerState::Off)),
            ("Alexa.PowerController", "Toggle", DirectiveKind::Unsupported),
            ("Alexa", "ReportState", DirectiveKind::ReportState),
            ("Foo.Bar", "Baz", DirectiveKind::Unsupported),
        ];

        for (namespace, name, kind) in cases {
            let parsed = directive(json!({
                "directive": { "header": { "namespace": namespace, "name": name } }
            }));
            assert_eq!(parsed.kind(), kind, "{}::{}", namespace, name);
        }
    }

    #[test]
    fn test_power_controller_fields() {
        let parsed: Directive = r#"{
            "directive": {
                "header": {
                    "namespace": "Alexa.PowerController",
                    "name": "TurnOn",
                    "messageId": "abc",
                    "correlationToken": "tok-1",
                    "payloadVersion": "3"
                },
                "endpoint": {
                    "scope": { "type": "BearerToken", "token": "access-token" },
                    "endpointId": "endpoint-001",
                    "cookie": {}
                },
                "payload": {}
            }
        }"#
        .parse()
        .unwrap();

        assert_eq!(parsed.correlation_token().unwrap(), "tok-1");
        assert_eq!(parsed.endpoint_id().unwrap(), "endpoint-001");
        assert_eq!(parsed.token(), Some("access-token"));
    }

    #[test]
    fn test_missing_branch_fields() {
        let parsed = directive(json!({
            "directive": { "header": { "namespace": "Alexa.PowerController", "name": "TurnOn" } }
        }));

        assert!(matches!(
            parsed.correlation_token(),
            Err(Error::MalformedDirective(path)) if path == "directive.header.correlationToken"
        ));
        assert!(matches!(
            parsed.endpoint_id(),
            Err(Error::MalformedDirective(path)) if path == "directive.endpoint.endpointId"
        ));
        assert_eq!(parsed.token(), None);
    }

    #[test]
    fn test_missing_header_is_malformed() {
        let err = Directive::from_value(json!({"directive": {"header": {"namespace": "Alexa"}}})).unwrap_err();
        assert!(matches!(err, Error::MalformedDirective(_)));

        assert!("not json".parse::<Directive>().is_err());
    }
}
