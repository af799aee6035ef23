use axum::body::Body;
use axum::http::Response;
use http_body_util::BodyExt;

/// Collects a response body and parses it as JSON. An empty body (204
/// responses) parses as `Value::Null`.
pub async fn response_to_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("failed to collect response body")
        .to_bytes();

    if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body was not valid JSON")
    }
}
