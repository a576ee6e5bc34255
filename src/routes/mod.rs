pub mod auth;
pub mod distribusi;
pub mod kategori;
pub mod mustahik;
pub mod muzakki;
pub mod penerimaan;
pub mod periode;
pub mod pihak;
pub mod statistik;
pub mod unit;
pub mod user;

use axum::response::Json;
use serde::Serialize;
use serde_json::{json, Value};

use crate::query::ListMeta;

pub fn success<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({
        "status": "success",
        "data": data
    }))
}

pub fn success_with_message<T: Serialize>(message: &str, data: T) -> Json<Value> {
    Json(json!({
        "status": "success",
        "message": message,
        "data": data
    }))
}

pub fn success_list<T: Serialize>(data: Vec<T>, meta: ListMeta) -> Json<Value> {
    Json(json!({
        "status": "success",
        "data": data,
        "meta": meta
    }))
}
