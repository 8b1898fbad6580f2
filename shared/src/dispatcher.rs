//! Directive dispatch.
//!
//! Each inbound directive selects exactly one branch and yields exactly one
//! [`AlexaResponse`]. Store failures are turned into an `ErrorResponse`;
//! malformed directives propagate as [`Error::MalformedDirective`].

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::DiscoveryConfig;
use crate::directive::{Directive, DirectiveKind, PowerState};
use crate::discovery::{CapabilityDescriptor, EndpointDescriptor};
use crate::property::PropertyReport;
use crate::response::{AlexaResponse, ErrorPayload};
use crate::store::StateStore;
use crate::{Error, Result};

const POWER_CONTROLLER: &str = "Alexa.PowerController";
const POWER_STATE: &str = "powerState";

// An HTTP-style 200 rather than a measured delay. Kept for wire compatibility.
const POWER_STATE_UNCERTAINTY_MS: u32 = 200;

/// Routes directives to their handlers and persists device state.
pub struct Dispatcher<S> {
    store: S,
    discovery: DiscoveryConfig,
}

impl<S: StateStore> Dispatcher<S> {
    pub fn new(store: S, discovery: DiscoveryConfig) -> Self {
        Self { store, discovery }
    }

    /// Dispatch a decoded request document. This is the Lambda path.
    pub async fn handle_event(&self, request: Value) -> Result<AlexaResponse> {
        debug!(request = %request, "Request");

        let directive = Directive::from_value(request)?;
        let response = self.dispatch(&directive).await?;

        let rendered = response.to_json()?;
        debug!(response = %rendered, "Response");
        Ok(response)
    }

    /// Parse a raw request, dispatch it and serialize the response.
    pub async fn handle(&self, request: &str) -> Result<String> {
        let request: Value =
            serde_json::from_str(request).map_err(|e| Error::MalformedDirective(e.to_string()))?;
        self.handle_event(request).await?.to_json()
    }

    pub async fn dispatch(&self, directive: &Directive) -> Result<AlexaResponse> {
        let namespace = directive.namespace();
        let name = directive.name();

        match directive.kind() {
            DirectiveKind::AcceptGrant => {
                info!(namespace, name, "Authorization request");
                Ok(AlexaResponse::new("Alexa.Authorization", "AcceptGrant.Response"))
            }
            DirectiveKind::Discover => {
                info!(namespace, name, "Discovery request");
                self.discover()
            }
            DirectiveKind::Power(state) => {
                info!(namespace, name, "Power controller request");
                self.set_power_state(directive, state).await
            }
            DirectiveKind::ReportState => {
                info!(namespace, name, "Report state request");
                self.report_state(directive).await
            }
            DirectiveKind::Unsupported => {
                warn!(namespace, name, "INVALID namespace");
                Ok(AlexaResponse::default())
            }
        }
    }

    fn discover(&self) -> Result<AlexaResponse> {
        let endpoint_id = &self.discovery.endpoint_id;
        let capabilities = vec![
            CapabilityDescriptor::default(),
            CapabilityDescriptor::interface(POWER_CONTROLLER).with_properties(POWER_STATE),
        ];

        let mut response = AlexaResponse::new("Alexa.Discovery", "Discover.Response");
        response.add_payload_endpoint(
            EndpointDescriptor::new(endpoint_id.as_str(), capabilities)
                .with_metadata(&self.discovery.metadata),
        )?;
        Ok(response)
    }

    async fn set_power_state(&self, directive: &Directive, state: PowerState) -> Result<AlexaResponse> {
        let correlation_token = directive.correlation_token()?;
        let endpoint_id = directive.endpoint_id()?;

        if let Err(e) = self.store.store(endpoint_id, POWER_STATE, state.as_str()).await {
            error!(endpoint_id, error = %e, "Failed to store device state");
            return Ok(unreachable_response());
        }

        let mut response = AlexaResponse::new("Alexa", "Response")
            .with_endpoint_id(endpoint_id)
            .with_correlation_token(correlation_token);
        response.add_context_property(PropertyReport::new(
            POWER_CONTROLLER,
            POWER_STATE,
            state.as_str(),
            POWER_STATE_UNCERTAINTY_MS,
        ));

        Ok(response)
    }

    async fn report_state(&self, directive: &Directive) -> Result<AlexaResponse> {
        let correlation_token = directive.correlation_token()?;
        let endpoint_id = directive.endpoint_id()?;

        let power_state = match self.store.load(endpoint_id, POWER_STATE).await {
            Ok(value) => value.unwrap_or_else(|| PowerState::Off.as_str().to_string()),
            Err(e) => {
                error!(endpoint_id, error = %e, "Failed to read device state");
                return Ok(unreachable_response());
            }
        };

        let mut response = AlexaResponse::new("Alexa", "StateReport")
            .with_endpoint_id(endpoint_id)
            .with_token(directive.token().unwrap_or_default())
            .with_correlation_token(correlation_token);
        response
            .add_context_property(PropertyReport::new(POWER_CONTROLLER, POWER_STATE, &power_state, 0))
            .add_context_property(PropertyReport::new(
                "Alexa.EndpointHealth",
                "connectivity",
                r#"{"value":"OK"}"#,
                0,
            ));

        Ok(response)
    }
}

fn unreachable_response() -> AlexaResponse {
    let mut response = AlexaResponse::new("Alexa", "ErrorResponse");
    response.set_payload(ErrorPayload::endpoint_unreachable());
    response
}
