use std::collections::HashMap;
use std::env;
use std::marker::PhantomData;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;
use serde_dynamo::aws_sdk_dynamodb_1::{from_item, from_items, to_attribute_value, to_item};
use serde_json::{Map, Value};

use super::{drain_pages, CollectionStore, Page, Record, StoreError, StoreResult};

/// DynamoDB-backed collection of one record type. The table holds flat
/// items keyed by `R::KEY_ATTRIBUTE`.
pub struct DynamoCollectionStore<R> {
    client: Client,
    table_name: String,
    _record: PhantomData<R>,
}

impl<R: Record> DynamoCollectionStore<R> {
    /// Creates a store against the given table using the ambient AWS
    /// configuration. `DYNAMODB_ENDPOINT` overrides the endpoint for local
    /// development.
    pub async fn new(table_name: String) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Ok(endpoint) = env::var("DYNAMODB_ENDPOINT") {
            loader = loader.endpoint_url(endpoint);
        }
        let config = loader.load().await;

        Self::with_client_and_table(Client::new(&config), table_name)
    }

    /// Creates a store with an explicit client, used by tests.
    pub fn with_client_and_table(client: Client, table_name: String) -> Self {
        Self {
            client,
            table_name,
            _record: PhantomData,
        }
    }
}

#[async_trait]
impl<R: Record> CollectionStore for DynamoCollectionStore<R> {
    type Record = R;

    async fn scan_all(&self) -> StoreResult<Vec<R>> {
        let items = drain_pages(|token: Option<HashMap<String, AttributeValue>>| {
            let request = self
                .client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(token);
            async move {
                let output = request
                    .send()
                    .await
                    .map_err(|e| StoreError::Internal(format!("scan failed: {:?}", e)))?;
                Ok(Page {
                    items: output.items.unwrap_or_default(),
                    next: output.last_evaluated_key,
                })
            }
        })
        .await?;

        from_items(items).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    async fn insert(&self, record: R) -> StoreResult<()> {
        let item = to_item(record).map_err(|e| StoreError::Serialization(e.to_string()))?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| StoreError::Internal(format!("put_item failed: {:?}", e)))?;

        Ok(())
    }

    async fn update(&self, key: &str, fields: Map<String, Value>) -> StoreResult<Option<R>> {
        let mut names = HashMap::new();
        let mut values = HashMap::new();
        let mut assignments = Vec::with_capacity(fields.len());

        // Placeholders for every attribute; field names like `name` collide
        // with DynamoDB reserved words otherwise.
        for (index, (field, value)) in fields.into_iter().enumerate() {
            let name_placeholder = format!("#f{}", index);
            let value_placeholder = format!(":v{}", index);
            assignments.push(format!("{} = {}", name_placeholder, value_placeholder));
            names.insert(name_placeholder, field);
            values.insert(
                value_placeholder,
                to_attribute_value(value).map_err(|e| StoreError::Serialization(e.to_string()))?,
            );
        }
        names.insert("#pk".to_string(), R::KEY_ATTRIBUTE.to_string());

        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(R::KEY_ATTRIBUTE, AttributeValue::S(key.to_string()))
            .update_expression(format!("SET {}", assignments.join(", ")))
            .condition_expression("attribute_exists(#pk)")
            .set_expression_attribute_names(Some(names))
            .set_expression_attribute_values(Some(values))
            .return_values(ReturnValue::AllNew)
            .send()
            .await;

        match result {
            Ok(output) => {
                let attributes = output.attributes.ok_or_else(|| {
                    StoreError::Internal("update_item returned no attributes".to_string())
                })?;
                let record =
                    from_item(attributes).map_err(|e| StoreError::Serialization(e.to_string()))?;
                Ok(Some(record))
            }
            Err(err) => {
                let not_found = err
                    .as_service_error()
                    .map(|e| e.is_conditional_check_failed_exception())
                    .unwrap_or(false);
                if not_found {
                    Ok(None)
                } else {
                    Err(StoreError::Internal(format!(
                        "update_item failed: {:?}",
                        err
                    )))
                }
            }
        }
    }

    async fn delete(&self, key: &str) -> StoreResult<Option<R>> {
        let output = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .key(R::KEY_ATTRIBUTE, AttributeValue::S(key.to_string()))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(|e| StoreError::Internal(format!("delete_item failed: {:?}", e)))?;

        match output.attributes {
            Some(attributes) => {
                let record =
                    from_item(attributes).map_err(|e| StoreError::Serialization(e.to_string()))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }
}
