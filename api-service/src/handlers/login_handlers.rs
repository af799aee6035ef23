use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use log::error;
use serde_json::{json, Value};

use crate::error::{AppError, Result};
use crate::resource::AppState;
use wedding_shared::auth::{hash_secret, Credential, Role};
use wedding_shared::models::{Confirmation, Present};
use wedding_shared::store::CollectionStore;

// POST /login
// Checks the presented credential against the secret named by `mode` and
// hands back the matching state token(s). The response never distinguishes
// a bad mode from a bad credential; only the log does.
pub async fn login<C, P>(
    State(state): State<Arc<AppState<C, P>>>,
    Credential(credential): Credential,
    Json(body): Json<Value>,
) -> Result<Json<Value>>
where
    C: CollectionStore<Record = Confirmation> + 'static,
    P: CollectionStore<Record = Present> + 'static,
{
    let Some(mode) = body.get("mode").and_then(Value::as_str) else {
        return Err(AppError::bad_request("\"mode\" must be a string".to_string()));
    };
    let credential = credential.as_deref();

    match mode {
        "guest" => {
            if state.gate.authorize(Role::Guest, credential).await {
                Ok(Json(json!({
                    "guest_state_key": state.gate.state_key(Role::Guest),
                })))
            } else {
                Err(AppError::unauthorized(
                    "Unauthorized, wrong password.".to_string(),
                ))
            }
        }
        "dashboard" => {
            if state.gate.authorize(Role::Dashboard, credential).await {
                // Re-publish the guest secret in hashed form so the
                // dashboard can exercise guest operations too.
                let guest_key = hash_secret(state.gate.guest_secret()).await.map_err(|e| {
                    AppError::internal_server_error(format!("failed to hash guest key: {}", e))
                })?;

                Ok(Json(json!({
                    "guestKey": guest_key,
                    "guest_state_key": state.gate.state_key(Role::Guest),
                    "dashboard_state_key": state.gate.state_key(Role::Dashboard),
                })))
            } else {
                Err(AppError::unauthorized(
                    "Unauthorized, wrong password.".to_string(),
                ))
            }
        }
        other => {
            error!("Login call with unknown mode {:?}", other);
            Err(AppError::unauthorized(
                "Unauthorized, mode not existing".to_string(),
            ))
        }
    }
}
