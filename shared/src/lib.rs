//! Shared library for the smart home Lambda.
//!
//! This crate provides the response builder, directive model, dispatcher and
//! device state store used by the Lambda entry point.

pub mod config;
pub mod directive;
pub mod discovery;
pub mod dispatcher;
pub mod error;
pub mod property;
pub mod response;
pub mod store;

pub use config::{Config, DiscoveryConfig};
pub use directive::{Directive, DirectiveKind, PowerState};
pub use discovery::{CapabilityDescriptor, DisplayCategory, EndpointDescriptor, EndpointMetadata};
pub use dispatcher::Dispatcher;
pub use error::{Error, Result};
pub use property::PropertyReport;
pub use response::{AlexaResponse, ErrorPayload, Payload};
pub use store::{attribute_name, DynamoStateStore, StateStore};
