use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use log::info;
use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::Result;
use crate::resource::AppState;
use crate::validation::{require_boolean, require_string};
use wedding_shared::auth::Credential;
use wedding_shared::models::{Confirmation, Present};
use wedding_shared::store::CollectionStore;

// GET /confirmations
pub async fn get_confirmations<C, P>(
    State(state): State<Arc<AppState<C, P>>>,
    Credential(credential): Credential,
) -> Result<Json<Vec<Confirmation>>>
where
    C: CollectionStore<Record = Confirmation> + 'static,
    P: CollectionStore<Record = Present> + 'static,
{
    let confirmations = state
        .confirmations
        .list(&state.gate, credential.as_deref())
        .await?;

    Ok(Json(confirmations))
}

// POST /confirmations
// Stores a new RSVP and returns its generated identifier.
pub async fn create_confirmation<C, P>(
    State(state): State<Arc<AppState<C, P>>>,
    Credential(credential): Credential,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>)>
where
    C: CollectionStore<Record = Confirmation> + 'static,
    P: CollectionStore<Record = Present> + 'static,
{
    let confirmation = state
        .confirmations
        .create(
            &state.gate,
            credential.as_deref(),
            &body,
            new_confirmation_from_body,
        )
        .await?;

    info!("Created confirmation {}", confirmation.confirmation_id);

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "confirmationId": confirmation.confirmation_id })),
    ))
}

// PUT /confirmations
// Full replacement: the body carries the identifier plus all six fields.
pub async fn replace_confirmation<C, P>(
    State(state): State<Arc<AppState<C, P>>>,
    Credential(credential): Credential,
    Json(body): Json<Value>,
) -> Result<StatusCode>
where
    C: CollectionStore<Record = Confirmation> + 'static,
    P: CollectionStore<Record = Present> + 'static,
{
    let updated = state
        .confirmations
        .update(
            &state.gate,
            credential.as_deref(),
            &body,
            replacement_fields,
        )
        .await?;

    info!("Replaced confirmation {}", updated.confirmation_id);

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct ConfirmationKeyQuery {
    #[serde(rename = "confirmationId")]
    confirmation_id: Option<String>,
}

// DELETE /confirmations?confirmationId=...
pub async fn delete_confirmation<C, P>(
    State(state): State<Arc<AppState<C, P>>>,
    Credential(credential): Credential,
    Query(query): Query<ConfirmationKeyQuery>,
) -> Result<StatusCode>
where
    C: CollectionStore<Record = Confirmation> + 'static,
    P: CollectionStore<Record = Present> + 'static,
{
    let deleted = state
        .confirmations
        .delete(
            &state.gate,
            credential.as_deref(),
            query.confirmation_id.as_deref(),
        )
        .await?;

    info!("Deleted confirmation {}", deleted.confirmation_id);

    Ok(StatusCode::NO_CONTENT)
}

fn new_confirmation_from_body(body: &Value) -> Result<Confirmation> {
    Ok(Confirmation {
        confirmation_id: Uuid::new_v4().to_string(),
        name: require_string(body, "name")?,
        surname: require_string(body, "surname")?,
        attending: require_boolean(body, "attending")?,
        eating: require_string(body, "eating")?,
        allergies: require_string(body, "allergies")?,
        textfield: require_string(body, "textfield")?,
    })
}

fn replacement_fields(body: &Value) -> Result<(String, Map<String, Value>)> {
    let confirmation_id = require_string(body, "confirmationId")?;

    let mut fields = Map::new();
    fields.insert(
        "name".to_string(),
        Value::String(require_string(body, "name")?),
    );
    fields.insert(
        "surname".to_string(),
        Value::String(require_string(body, "surname")?),
    );
    fields.insert(
        "attending".to_string(),
        Value::Bool(require_boolean(body, "attending")?),
    );
    fields.insert(
        "eating".to_string(),
        Value::String(require_string(body, "eating")?),
    );
    fields.insert(
        "allergies".to_string(),
        Value::String(require_string(body, "allergies")?),
    );
    fields.insert(
        "textfield".to_string(),
        Value::String(require_string(body, "textfield")?),
    );

    Ok((confirmation_id, fields))
}
