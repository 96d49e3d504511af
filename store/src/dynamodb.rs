use crate::{StateStore, parse_string_field, utils::current_time_millis};
use anyhow::{Context, Result, anyhow};
use aws_sdk_dynamodb::{Client, types::AttributeValue};
use std::collections::HashMap;

/// State kept in a DynamoDB table with a string partition key named `key`.
pub struct DynamoDbStateStore {
    client: Client,
    table_name: String,
}

impl DynamoDbStateStore {
    pub fn new(client: Client, table_name: impl Into<String>) -> Result<Self> {
        let table_name = table_name.into();
        if table_name.is_empty() {
            return Err(anyhow!("state table name is empty"));
        }
        Ok(Self { client, table_name })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

pub(crate) fn state_item(
    key: &str,
    value: &str,
    updated_at: u64,
) -> HashMap<String, AttributeValue> {
    HashMap::from([
        ("key".to_string(), AttributeValue::S(key.to_string())),
        ("value".to_string(), AttributeValue::S(value.to_string())),
        (
            "updated_at".to_string(),
            AttributeValue::N(updated_at.to_string()),
        ),
    ])
}

impl StateStore for DynamoDbStateStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("key", AttributeValue::S(key.to_string()))
            .consistent_read(true)
            .send()
            .await
            .with_context(|| format!("get_item {key} from {}", self.table_name))?;

        let Some(item) = response.item else {
            return Ok(None);
        };

        parse_string_field(&item, "value").map(Some)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(state_item(key, value, current_time_millis())))
            .send()
            .await
            .with_context(|| format!("put_item {key} into {}", self.table_name))?;
        Ok(())
    }
}
