use std::future::Future;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

pub mod dynamo;

/// A flat record kept in a named collection, keyed by a single unique
/// identifier attribute.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Name of the identifier attribute as stored (e.g. `confirmationId`).
    const KEY_ATTRIBUTE: &'static str;

    fn key(&self) -> &str;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("store error: {0}")]
    Internal(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Generic operations over one keyed collection. Store faults are surfaced
/// as errors and never retried here; a missing record on update/delete is
/// reported as `None` so callers can tell it apart from an unavailable
/// store.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    type Record: Record;

    /// Returns every record in the collection, draining pagination.
    async fn scan_all(&self) -> StoreResult<Vec<Self::Record>>;

    /// Unconditional create. Identifiers are generated randomly by the
    /// caller; a colliding key overwrites, which we accept.
    async fn insert(&self, record: Self::Record) -> StoreResult<()>;

    /// Sets the given fields on the record with this key and returns the
    /// record's new state, or `None` if no such record exists.
    async fn update(
        &self,
        key: &str,
        fields: Map<String, Value>,
    ) -> StoreResult<Option<Self::Record>>;

    /// Removes the record with this key and returns it as it existed just
    /// before deletion, or `None` if nothing matched.
    async fn delete(&self, key: &str) -> StoreResult<Option<Self::Record>>;
}

/// One page of a partial scan, with the continuation token to request the
/// next page, if any.
pub struct Page<T, K> {
    pub items: Vec<T>,
    pub next: Option<K>,
}

/// Accumulates a full scan from a paginating backend. `fetch_page` is called
/// with `None` first and then with each continuation token until a page
/// comes back without one. Tolerates backends that return everything in a
/// single page, or no items at all.
pub async fn drain_pages<T, K, F, Fut>(mut fetch_page: F) -> StoreResult<Vec<T>>
where
    F: FnMut(Option<K>) -> Fut,
    Fut: Future<Output = StoreResult<Page<T, K>>>,
{
    let mut records = Vec::new();
    let mut token = None;

    loop {
        let page = fetch_page(token.take()).await?;
        records.extend(page.items);

        match page.next {
            Some(next) => token = Some(next),
            None => return Ok(records),
        }
    }
}
