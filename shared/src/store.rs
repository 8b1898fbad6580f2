//! Device state persistence.

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use tracing::debug;

use crate::{Error, Result};

/// Partition key of the device state table.
pub const ITEM_KEY: &str = "ItemId";

/// Attribute under which a logical state is persisted, e.g. `powerStateValue`.
pub fn attribute_name(state: &str) -> String {
    format!("{}Value", state)
}

/// Durable key-value storage of endpoint state.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Persist `value` for `state` on `endpoint_id`.
    async fn store(&self, endpoint_id: &str, state: &str, value: &str) -> Result<()>;

    /// Read the last persisted value of `state` on `endpoint_id`.
    async fn load(&self, endpoint_id: &str, state: &str) -> Result<Option<String>>;
}

/// DynamoDB-backed state store keyed on `ItemId`.
pub struct DynamoStateStore {
    client: DynamoClient,
    table_name: String,
}

impl DynamoStateStore {
    pub fn new(client: DynamoClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

#[async_trait]
impl StateStore for DynamoStateStore {
    async fn store(&self, endpoint_id: &str, state: &str, value: &str) -> Result<()> {
        let attribute = attribute_name(state);
        debug!(table = %self.table_name, endpoint_id, attribute = %attribute, value, "Updating device state");

        self.client
            .update_item()
            .table_name(&self.table_name)
            .key(ITEM_KEY, AttributeValue::S(endpoint_id.to_string()))
            .update_expression("SET #attr = :value")
            .expression_attribute_names("#attr", attribute)
            .expression_attribute_values(":value", AttributeValue::S(value.to_string()))
            .send()
            .await
            .map_err(|e| Error::Aws(format!("Failed to update device state: {}", e)))?;

        Ok(())
    }

    async fn load(&self, endpoint_id: &str, state: &str) -> Result<Option<String>> {
        let attribute = attribute_name(state);

        let response = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(ITEM_KEY, AttributeValue::S(endpoint_id.to_string()))
            .send()
            .await
            .map_err(|e| Error::Aws(format!("Failed to read device state: {}", e)))?;

        let value = response
            .item()
            .and_then(|item| item.get(&attribute))
            .and_then(|value| value.as_s().ok())
            .cloned();

        Ok(value)
    }
}
