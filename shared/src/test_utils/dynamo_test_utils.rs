use std::env;

use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::config::Credentials;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType,
};
use aws_sdk_dynamodb::Client;

pub type TestResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Tests run against an in-memory mock by default; set `USE_DYNAMODB=true`
/// to exercise a local DynamoDB instead.
pub fn use_dynamodb() -> bool {
    env::var("USE_DYNAMODB")
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false)
}

/// Client against a local DynamoDB endpoint with static throwaway
/// credentials. `DYNAMODB_ENDPOINT` overrides the default port.
pub async fn create_dynamo_client() -> Client {
    let endpoint =
        env::var("DYNAMODB_ENDPOINT").unwrap_or_else(|_| "http://localhost:8000".to_string());

    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .endpoint_url(endpoint)
        .credentials_provider(Credentials::new("test", "test", None, None, "static"))
        .load()
        .await;

    Client::new(&config)
}

/// Creates a single-key collection table. Callers ignore
/// `ResourceInUseException` when the table is already there.
pub async fn create_collection_table(
    client: &Client,
    table_name: &str,
    key_attribute: &str,
) -> TestResult<()> {
    client
        .create_table()
        .table_name(table_name)
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name(key_attribute)
                .attribute_type(ScalarAttributeType::S)
                .build()?,
        )
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name(key_attribute)
                .key_type(KeyType::Hash)
                .build()?,
        )
        .billing_mode(BillingMode::PayPerRequest)
        .send()
        .await?;

    Ok(())
}

/// Removes every item from a table so each test starts from scratch.
pub async fn clear_dynamo_table(
    client: &Client,
    table_name: &str,
    key_attribute: &str,
) -> TestResult<()> {
    let scan = client.scan().table_name(table_name).send().await?;

    for item in scan.items.unwrap_or_default() {
        if let Some(key_value) = item.get(key_attribute) {
            client
                .delete_item()
                .table_name(table_name)
                .key(key_attribute, key_value.clone())
                .send()
                .await?;
        }
    }

    Ok(())
}
