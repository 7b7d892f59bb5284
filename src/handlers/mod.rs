use axum::Json;
use serde_json::{json, Value};

pub mod auth;
pub mod posts;
pub mod upload;
pub mod user;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "Server is running" }))
}
