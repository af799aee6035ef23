use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::store::{CollectionStore, Record, StoreError, StoreResult};

/// In-memory stand-in for a DynamoDB collection. `failing()` builds a store
/// whose every operation reports a store fault, for exercising 500 paths.
pub struct MockCollectionStore<R> {
    records: RwLock<HashMap<String, R>>,
    failing: bool,
}

impl<R: Record> MockCollectionStore<R> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            failing: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            failing: true,
        }
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.failing {
            Err(StoreError::Internal("simulated store failure".to_string()))
        } else {
            Ok(())
        }
    }
}

impl<R: Record> Default for MockCollectionStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Record> CollectionStore for MockCollectionStore<R> {
    type Record = R;

    async fn scan_all(&self) -> StoreResult<Vec<R>> {
        self.check_available()?;

        let records = self.records.read().await;
        Ok(records.values().cloned().collect())
    }

    async fn insert(&self, record: R) -> StoreResult<()> {
        self.check_available()?;

        let mut records = self.records.write().await;
        records.insert(record.key().to_string(), record);
        Ok(())
    }

    async fn update(&self, key: &str, fields: Map<String, Value>) -> StoreResult<Option<R>> {
        self.check_available()?;

        let mut records = self.records.write().await;
        let Some(existing) = records.get(key) else {
            return Ok(None);
        };

        let mut value =
            serde_json::to_value(existing).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let Some(object) = value.as_object_mut() else {
            return Err(StoreError::Serialization(
                "record did not serialize to an object".to_string(),
            ));
        };
        for (field, new_value) in fields {
            object.insert(field, new_value);
        }

        let updated: R =
            serde_json::from_value(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
        records.insert(key.to_string(), updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, key: &str) -> StoreResult<Option<R>> {
        self.check_available()?;

        let mut records = self.records.write().await;
        Ok(records.remove(key))
    }
}
