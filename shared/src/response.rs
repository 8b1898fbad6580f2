//! Outbound event document and the builder operations that shape it.
//!
//! An [`AlexaResponse`] is created once per directive, mutated while the
//! directive is dispatched, serialized once and then dropped. The wire shape is
//!
//! ```text
//! { "event": { "header", "endpoint"?, "payload" }, "context"?: { "properties": [...] } }
//! ```

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::discovery::{CapabilityDescriptor, EndpointDescriptor};
use crate::property::PropertyReport;
use crate::{Error, Result};

/// Placeholder for a missing endpoint id, token or correlation token.
pub const INVALID: &str = "INVALID";

pub const DEFAULT_NAMESPACE: &str = "Alexa";
pub const DEFAULT_NAME: &str = "Response";
pub const PAYLOAD_VERSION: &str = "3";

/// Response names that never carry an endpoint section.
const NO_ENDPOINT_NAMES: [&str; 2] = ["AcceptGrant.Response", "Discover.Response"];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub namespace: String,
    pub name: String,
    pub message_id: Uuid,
    pub payload_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Scope {
    #[serde(rename = "type")]
    pub scope_type: String,
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub scope: Scope,
    pub endpoint_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookie: Option<BTreeMap<String, String>>,
}

impl Endpoint {
    fn sentinel() -> Self {
        Self {
            scope: Scope {
                scope_type: "BearerToken".to_string(),
                token: INVALID.to_string(),
            },
            endpoint_id: INVALID.to_string(),
            cookie: None,
        }
    }
}

/// Error body of an `ErrorResponse`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorPayload {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

impl ErrorPayload {
    pub fn new(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_type: error_type.into(),
            message: message.into(),
        }
    }

    /// The device could not be reached or its state could not be persisted.
    pub fn endpoint_unreachable() -> Self {
        Self::new(
            "ENDPOINT_UNREACHABLE",
            "There was an error setting the device state.",
        )
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DiscoveryPayload {
    pub endpoints: Vec<EndpointDescriptor>,
}

/// Body of the event. Serializes as `{}` when empty.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Empty(EmptyPayload),
    Error(ErrorPayload),
    Discovery(DiscoveryPayload),
    Raw(Value),
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EmptyPayload {}

impl Payload {
    fn kind(&self) -> &'static str {
        match self {
            Payload::Empty(_) => "empty",
            Payload::Error(_) => "error",
            Payload::Discovery(_) => "discovery",
            Payload::Raw(Value::Object(_)) => "raw object",
            Payload::Raw(_) => "raw non-object",
        }
    }
}

impl Default for Payload {
    fn default() -> Self {
        Payload::Empty(EmptyPayload {})
    }
}

impl From<ErrorPayload> for Payload {
    fn from(payload: ErrorPayload) -> Self {
        Payload::Error(payload)
    }
}

impl From<DiscoveryPayload> for Payload {
    fn from(payload: DiscoveryPayload) -> Self {
        Payload::Discovery(payload)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Raw(value)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub header: Header,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<Endpoint>,
    pub payload: Payload,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Context {
    pub properties: Vec<PropertyReport>,
}

/// A single outbound event under construction.
#[derive(Debug, Clone, Serialize)]
pub struct AlexaResponse {
    event: Event,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<Context>,
}

impl AlexaResponse {
    /// Start a response for `namespace`/`name`.
    ///
    /// Empty arguments fall back to `Alexa`/`Response`. The endpoint section,
    /// when present, starts out with the `INVALID` sentinel for both the
    /// endpoint id and the bearer token.
    pub fn new(namespace: &str, name: &str) -> Self {
        let namespace = non_empty_or(namespace, DEFAULT_NAMESPACE);
        let name = non_empty_or(name, DEFAULT_NAME);

        let endpoint = if NO_ENDPOINT_NAMES.contains(&name.as_str()) {
            None
        } else {
            Some(Endpoint::sentinel())
        };

        Self {
            event: Event {
                header: Header {
                    namespace,
                    name,
                    message_id: Uuid::new_v4(),
                    payload_version: PAYLOAD_VERSION.to_string(),
                    correlation_token: None,
                },
                endpoint,
                payload: Payload::default(),
            },
            context: None,
        }
    }

    /// Set the endpoint id. Ignored for responses without an endpoint section.
    pub fn with_endpoint_id(mut self, endpoint_id: &str) -> Self {
        if let Some(endpoint) = self.event.endpoint.as_mut() {
            endpoint.endpoint_id = non_empty_or(endpoint_id, INVALID);
        }
        self
    }

    /// Set the bearer token. Ignored for responses without an endpoint section.
    pub fn with_token(mut self, token: &str) -> Self {
        if let Some(endpoint) = self.event.endpoint.as_mut() {
            endpoint.scope.token = non_empty_or(token, INVALID);
        }
        self
    }

    pub fn with_correlation_token(mut self, correlation_token: &str) -> Self {
        self.event.header.correlation_token = Some(non_empty_or(correlation_token, INVALID));
        self
    }

    pub fn header(&self) -> &Header {
        &self.event.header
    }

    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.event.endpoint.as_ref()
    }

    pub fn payload(&self) -> &Payload {
        &self.event.payload
    }

    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    /// Append one property report, creating the context section on first use.
    pub fn add_context_property(&mut self, report: PropertyReport) -> &mut Self {
        self.context
            .get_or_insert_with(Context::default)
            .properties
            .push(report);
        self
    }

    /// Set a single cookie entry on the response endpoint.
    pub fn add_cookie(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<&mut Self> {
        let name = &self.event.header.name;
        let endpoint = self
            .event
            .endpoint
            .as_mut()
            .ok_or_else(|| Error::MissingEndpoint(name.clone()))?;

        endpoint
            .cookie
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());

        Ok(self)
    }

    /// Append an endpoint to the discovery payload.
    ///
    /// An empty payload becomes a discovery payload. A raw object payload keeps
    /// its other keys and gains the endpoint in its `endpoints` array. Error
    /// payloads are left untouched and yield [`Error::IncompatiblePayload`].
    pub fn add_payload_endpoint(&mut self, endpoint: EndpointDescriptor) -> Result<&mut Self> {
        self.start_discovery_payload();

        match &mut self.event.payload {
            Payload::Discovery(discovery) => discovery.endpoints.push(endpoint),
            Payload::Raw(Value::Object(fields)) => {
                let endpoint = serde_json::to_value(endpoint)?;
                raw_endpoints_mut(fields)?.push(endpoint);
            }
            other => return Err(Error::IncompatiblePayload(other.kind().to_string())),
        }

        Ok(self)
    }

    /// Append a capability to the discovery endpoint with `endpoint_id`.
    ///
    /// With no endpoints in the payload yet this only creates the empty
    /// endpoint list and succeeds. With endpoints present but none matching,
    /// it returns [`Error::EndpointNotFound`].
    pub fn add_payload_endpoint_capability(
        &mut self,
        endpoint_id: &str,
        capability: CapabilityDescriptor,
    ) -> Result<&mut Self> {
        self.start_discovery_payload();

        match &mut self.event.payload {
            Payload::Discovery(discovery) => {
                append_capability(&mut discovery.endpoints, endpoint_id, capability)?
            }
            Payload::Raw(Value::Object(fields)) => {
                append_raw_capability(fields, endpoint_id, capability)?
            }
            other => return Err(Error::IncompatiblePayload(other.kind().to_string())),
        }

        Ok(self)
    }

    /// Replace the payload wholesale.
    pub fn set_payload(&mut self, payload: impl Into<Payload>) -> &mut Self {
        self.event.payload = payload.into();
        self
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn start_discovery_payload(&mut self) {
        if matches!(self.event.payload, Payload::Empty(_)) {
            self.event.payload = Payload::Discovery(DiscoveryPayload::default());
        }
    }
}

impl Default for AlexaResponse {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE, DEFAULT_NAME)
    }
}

fn append_capability(
    endpoints: &mut [EndpointDescriptor],
    endpoint_id: &str,
    capability: CapabilityDescriptor,
) -> Result<()> {
    if endpoints.is_empty() {
        return Ok(());
    }

    let endpoint = endpoints
        .iter_mut()
        .find(|endpoint| endpoint.endpoint_id == endpoint_id)
        .ok_or_else(|| Error::EndpointNotFound(endpoint_id.to_string()))?;
    endpoint.capabilities.push(capability);

    Ok(())
}

fn append_raw_capability(
    fields: &mut Map<String, Value>,
    endpoint_id: &str,
    capability: CapabilityDescriptor,
) -> Result<()> {
    let endpoints = raw_endpoints_mut(fields)?;
    if endpoints.is_empty() {
        return Ok(());
    }

    let endpoint = endpoints
        .iter_mut()
        .filter_map(Value::as_object_mut)
        .find(|endpoint| endpoint.get("endpointId").and_then(Value::as_str) == Some(endpoint_id))
        .ok_or_else(|| Error::EndpointNotFound(endpoint_id.to_string()))?;

    let capability = serde_json::to_value(capability)?;
    match endpoint
        .entry("capabilities")
        .or_insert_with(|| Value::Array(Vec::new()))
    {
        Value::Array(capabilities) => {
            capabilities.push(capability);
            Ok(())
        }
        _ => Err(Error::IncompatiblePayload(format!(
            "raw endpoint {} with non-array capabilities",
            endpoint_id
        ))),
    }
}

/// The `endpoints` array of a raw payload object, created when absent.
fn raw_endpoints_mut(fields: &mut Map<String, Value>) -> Result<&mut Vec<Value>> {
    match fields
        .entry("endpoints")
        .or_insert_with(|| Value::Array(Vec::new()))
    {
        Value::Array(endpoints) => Ok(endpoints),
        _ => Err(Error::IncompatiblePayload(
            "raw payload with non-array endpoints".to_string(),
        )),
    }
}

fn non_empty_or(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}
