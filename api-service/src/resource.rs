use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{AppError, Result};
use wedding_shared::auth::{AuthConfig, Role, RoleGate};
use wedding_shared::models::{Confirmation, Present};
use wedding_shared::store::{CollectionStore, Record};

/// Role required for each operation over one collection.
pub struct RoleMap {
    pub list: Role,
    pub create: Role,
    pub update: Role,
    pub delete: Role,
}

/// One collection behind the role gate. Every operation runs the same
/// pipeline: authorize the caller's credential for the operation's role,
/// validate the payload, hit the store, map the result. Validation rules
/// come in as closures so the pipeline itself stays resource-agnostic; it
/// is instantiated once for confirmations and once for presents.
pub struct GatedCollection<S> {
    store: Arc<S>,
    roles: RoleMap,
}

impl<S: CollectionStore> GatedCollection<S> {
    pub fn new(store: Arc<S>, roles: RoleMap) -> Self {
        Self { store, roles }
    }

    /// The gate runs to completion before anything touches the store.
    async fn require(gate: &RoleGate, role: Role, credential: Option<&str>) -> Result<()> {
        if gate.authorize(role, credential).await {
            Ok(())
        } else {
            Err(AppError::unauthorized("Unauthorized".to_string()))
        }
    }

    pub async fn list(&self, gate: &RoleGate, credential: Option<&str>) -> Result<Vec<S::Record>> {
        Self::require(gate, self.roles.list, credential).await?;

        Ok(self.store.scan_all().await?)
    }

    pub async fn create<F>(
        &self,
        gate: &RoleGate,
        credential: Option<&str>,
        body: &Value,
        validate: F,
    ) -> Result<S::Record>
    where
        F: FnOnce(&Value) -> Result<S::Record>,
    {
        Self::require(gate, self.roles.create, credential).await?;

        let record = validate(body)?;
        self.store.insert(record.clone()).await?;
        Ok(record)
    }

    pub async fn update<F>(
        &self,
        gate: &RoleGate,
        credential: Option<&str>,
        body: &Value,
        validate: F,
    ) -> Result<S::Record>
    where
        F: FnOnce(&Value) -> Result<(String, Map<String, Value>)>,
    {
        Self::require(gate, self.roles.update, credential).await?;

        let (key, fields) = validate(body)?;
        match self.store.update(&key, fields).await? {
            Some(record) => Ok(record),
            None => Err(AppError::not_found(format!(
                "no record with identifier {}",
                key
            ))),
        }
    }

    /// Delete is intended to affect exactly one existing record; a missing
    /// key or a missing record are both reported to the caller.
    pub async fn delete(
        &self,
        gate: &RoleGate,
        credential: Option<&str>,
        key: Option<&str>,
    ) -> Result<S::Record> {
        Self::require(gate, self.roles.delete, credential).await?;

        let key = key.ok_or_else(|| {
            AppError::bad_request(format!(
                "\"{}\" query parameter is required",
                S::Record::KEY_ATTRIBUTE
            ))
        })?;

        match self.store.delete(key).await? {
            Some(record) => Ok(record),
            None => Err(AppError::not_found(format!(
                "no record with identifier {}",
                key
            ))),
        }
    }
}

/// Shared request state: the role gate plus both gated collections. Built
/// once at startup; nothing in here mutates afterwards.
pub struct AppState<C, P> {
    pub gate: RoleGate,
    pub confirmations: GatedCollection<C>,
    pub presents: GatedCollection<P>,
}

impl<C, P> AppState<C, P>
where
    C: CollectionStore<Record = Confirmation>,
    P: CollectionStore<Record = Present>,
{
    pub fn new(config: AuthConfig, confirmations: Arc<C>, presents: Arc<P>) -> Self {
        Self {
            gate: RoleGate::new(config),
            confirmations: GatedCollection::new(
                confirmations,
                RoleMap {
                    list: Role::Dashboard,
                    create: Role::Guest,
                    update: Role::Dashboard,
                    delete: Role::Dashboard,
                },
            ),
            presents: GatedCollection::new(
                presents,
                RoleMap {
                    list: Role::Guest,
                    create: Role::Dashboard,
                    update: Role::Guest,
                    delete: Role::Dashboard,
                },
            ),
        }
    }
}
