use axum::response::Json;
use serde_json::{Value, json};

/// Answers on `/health` while the sign-in callback server is up, so the
/// redirect target can be checked by hand during a pending `login`.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "spotauth-callback",
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
