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

// GET /presents
pub async fn get_presents<C, P>(
    State(state): State<Arc<AppState<C, P>>>,
    Credential(credential): Credential,
) -> Result<Json<Vec<Present>>>
where
    C: CollectionStore<Record = Confirmation> + 'static,
    P: CollectionStore<Record = Present> + 'static,
{
    let presents = state
        .presents
        .list(&state.gate, credential.as_deref())
        .await?;

    Ok(Json(presents))
}

// POST /presents
// The create request uses snake_case field names and the response echoes
// them back together with the generated identifier.
pub async fn create_present<C, P>(
    State(state): State<Arc<AppState<C, P>>>,
    Credential(credential): Credential,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>)>
where
    C: CollectionStore<Record = Confirmation> + 'static,
    P: CollectionStore<Record = Present> + 'static,
{
    let present = state
        .presents
        .create(
            &state.gate,
            credential.as_deref(),
            &body,
            new_present_from_body,
        )
        .await?;

    info!("Created present {}", present.present_id);

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "present_id": present.present_id,
            "present_title": present.present_title,
            "img_url": present.img_url,
            "product_url": present.product_url,
            "bought": present.bought,
        })),
    ))
}

// PUT /presents
// Flips the bought flag on one present.
pub async fn update_present<C, P>(
    State(state): State<Arc<AppState<C, P>>>,
    Credential(credential): Credential,
    Json(body): Json<Value>,
) -> Result<StatusCode>
where
    C: CollectionStore<Record = Confirmation> + 'static,
    P: CollectionStore<Record = Present> + 'static,
{
    set_bought(&state, credential.as_deref(), &body).await
}

// POST|PUT /presents/buy
// Alias of the bought-flag update, kept for the shop front end. There is
// deliberately no check against the present already being bought; two
// concurrent buys last-write-win.
pub async fn buy_present<C, P>(
    State(state): State<Arc<AppState<C, P>>>,
    Credential(credential): Credential,
    Json(body): Json<Value>,
) -> Result<StatusCode>
where
    C: CollectionStore<Record = Confirmation> + 'static,
    P: CollectionStore<Record = Present> + 'static,
{
    set_bought(&state, credential.as_deref(), &body).await
}

#[derive(Deserialize)]
pub struct PresentKeyQuery {
    #[serde(rename = "presentId")]
    present_id: Option<String>,
}

// DELETE /presents?presentId=...
pub async fn delete_present<C, P>(
    State(state): State<Arc<AppState<C, P>>>,
    Credential(credential): Credential,
    Query(query): Query<PresentKeyQuery>,
) -> Result<StatusCode>
where
    C: CollectionStore<Record = Confirmation> + 'static,
    P: CollectionStore<Record = Present> + 'static,
{
    let deleted = state
        .presents
        .delete(
            &state.gate,
            credential.as_deref(),
            query.present_id.as_deref(),
        )
        .await?;

    info!("Deleted present {}", deleted.present_id);

    Ok(StatusCode::NO_CONTENT)
}

async fn set_bought<C, P>(
    state: &AppState<C, P>,
    credential: Option<&str>,
    body: &Value,
) -> Result<StatusCode>
where
    C: CollectionStore<Record = Confirmation> + 'static,
    P: CollectionStore<Record = Present> + 'static,
{
    let updated = state
        .presents
        .update(&state.gate, credential, body, bought_fields)
        .await?;

    info!(
        "Present {} bought flag set to {}",
        updated.present_id, updated.bought
    );

    Ok(StatusCode::NO_CONTENT)
}

fn new_present_from_body(body: &Value) -> Result<Present> {
    Ok(Present {
        present_id: Uuid::new_v4().to_string(),
        present_title: require_string(body, "present_title")?,
        img_url: require_string(body, "img_url")?,
        product_url: require_string(body, "product_url")?,
        bought: require_boolean(body, "bought")?,
    })
}

fn bought_fields(body: &Value) -> Result<(String, Map<String, Value>)> {
    let present_id = require_string(body, "presentId")?;

    let mut fields = Map::new();
    fields.insert(
        "bought".to_string(),
        Value::Bool(require_boolean(body, "bought")?),
    );

    Ok((present_id, fields))
}
