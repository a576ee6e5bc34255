//! End-to-end CRUD flows against a real Postgres. Run with
//! `DATABASE_URL=postgres://... cargo test -- --ignored`.

mod common;

use axum::{http::Method, Router};
use regex::Regex;
use serde_json::{json, Value};
use uuid::Uuid;
use zakat_be::{app::api_router, build_state};

use common::{config_with_database, send};

async fn app() -> Router {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let config = config_with_database(&url);
    let state = build_state(&config).await.unwrap();
    api_router(state)
}

async fn signin(app: &Router) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/signin",
        None,
        Some(json!({ "username": "admin", "password": "admin" })),
    )
    .await;
    assert!(status.is_success(), "{body}");
    body["token"].as_str().unwrap().to_string()
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

async fn create(app: &Router, token: &str, uri: &str, payload: Value) -> Value {
    let (status, body) = send(app, Method::POST, uri, Some(token), Some(payload)).await;
    assert!(status.is_success(), "{uri}: {body}");
    body["data"].clone()
}

#[tokio::test]
#[ignore]
async fn created_muzakki_matches_its_detail() {
    let app = app().await;
    let token = signin(&app).await;

    let category = create(&app, &token, "/muzakki-category", json!({ "name": unique("Individu") })).await;
    let muzakki = create(
        &app,
        &token,
        "/muzakki",
        json!({
            "name": unique("Ahmad"),
            "muzakkiCategoryId": category["id"],
            "email": "ahmad@example.com",
            "phone": "08123456789",
            "address": "Jl. Merdeka 1"
        }),
    )
    .await;

    let uri = format!("/muzakki/{}", muzakki["id"].as_str().unwrap());
    let (status, body) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert!(status.is_success());
    assert_eq!(body["data"], muzakki);
    assert_eq!(body["data"]["categoryName"], category["name"]);
}

#[tokio::test]
#[ignore]
async fn category_delete_is_blocked_while_referenced() {
    let app = app().await;
    let token = signin(&app).await;

    let used = create(&app, &token, "/mustahik-category", json!({ "name": unique("Fakir") })).await;
    let unused = create(&app, &token, "/mustahik-category", json!({ "name": unique("Miskin") })).await;
    create(
        &app,
        &token,
        "/mustahik",
        json!({
            "name": unique("Budi"),
            "mustahikCategoryId": used["id"],
            "address": "Jl. Melati 2"
        }),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/mustahik-category/delete",
        Some(&token),
        Some(json!([used["id"]])),
    )
    .await;
    assert_eq!(status.as_u16(), 409, "{body}");

    let (status, body) = send(
        &app,
        Method::POST,
        "/mustahik-category/delete",
        Some(&token),
        Some(json!([unused["id"]])),
    )
    .await;
    assert!(status.is_success(), "{body}");

    let uri = format!("/mustahik-category/{}", unused["id"].as_str().unwrap());
    let (status, _) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status.as_u16(), 404);
}

#[tokio::test]
#[ignore]
async fn list_pages_respect_size_and_count() {
    let app = app().await;
    let token = signin(&app).await;

    for _ in 0..3 {
        create(&app, &token, "/zakat-period", json!({ "name": unique("Periode") })).await;
    }

    let (status, body) = send(
        &app,
        Method::POST,
        "/zakat-period/list",
        Some(&token),
        Some(json!({
            "search": "",
            "pagination": { "pageIndex": 0, "pageSize": 2 },
            "sorting": []
        })),
    )
    .await;
    assert!(status.is_success(), "{body}");

    let total = body["meta"]["total"].as_i64().unwrap();
    assert!(total >= 3);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["meta"]["totalPage"].as_i64().unwrap(), (total + 1) / 2);

    let (_, second) = send(
        &app,
        Method::POST,
        "/zakat-period/list",
        Some(&token),
        Some(json!({
            "search": "",
            "pagination": { "pageIndex": 1, "pageSize": 2 },
            "sorting": [{ "id": "name", "desc": false }]
        })),
    )
    .await;
    assert_eq!(second["meta"]["currentPage"], 2);
    assert!(!second["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore]
async fn record_and_distribution_get_transaction_numbers() {
    let app = app().await;
    let token = signin(&app).await;

    let period = create(&app, &token, "/zakat-period", json!({ "name": unique("Periode") })).await;
    let muzakki_category = create(&app, &token, "/muzakki-category", json!({ "name": unique("Kel") })).await;
    let mustahik_category = create(&app, &token, "/mustahik-category", json!({ "name": unique("Amil") })).await;
    let muzakki = create(
        &app,
        &token,
        "/muzakki",
        json!({ "name": unique("Siti"), "muzakkiCategoryId": muzakki_category["id"], "address": "Jl. Mawar" }),
    )
    .await;
    let mustahik = create(
        &app,
        &token,
        "/mustahik",
        json!({ "name": unique("Joko"), "mustahikCategoryId": mustahik_category["id"], "address": "Jl. Kenanga" }),
    )
    .await;

    let record = create(
        &app,
        &token,
        "/zakat-record",
        json!({
            "muzakkiId": muzakki["id"],
            "periodId": period["id"],
            "type": "BERAS",
            "amount": 2.5,
            "dateReceived": "2025-03-20T08:00:00Z"
        }),
    )
    .await;
    let record_number = Regex::new(r"^ZKT\d{6}\d{3}$").unwrap();
    assert!(record_number.is_match(record["transactionNumber"].as_str().unwrap()));
    assert_eq!(record["userName"], "SUPER ADMIN");

    let distribution = create(
        &app,
        &token,
        "/zakat-distribution",
        json!({
            "mustahikId": mustahik["id"],
            "zakatRecordId": record["id"],
            "amount": 1.5,
            "dateDistribution": "2025-03-21T08:00:00Z"
        }),
    )
    .await;
    let distribution_number = Regex::new(r"^DST\d{6}\d{3}$").unwrap();
    assert!(distribution_number.is_match(distribution["transactionNumber"].as_str().unwrap()));
    assert_eq!(distribution["periodId"], period["id"]);

    // Penerimaan masih dipakai oleh distribusi
    let (status, _) = send(
        &app,
        Method::POST,
        "/zakat-record/delete",
        Some(&token),
        Some(json!([record["id"]])),
    )
    .await;
    assert_eq!(status.as_u16(), 409);

    let uri = format!("/mustahik/{}/distributions", mustahik["id"].as_str().unwrap());
    let (status, body) = send(
        &app,
        Method::POST,
        &uri,
        Some(&token),
        Some(json!({ "search": "", "pagination": { "pageIndex": 0, "pageSize": 10 }, "sorting": [] })),
    )
    .await;
    assert!(status.is_success(), "{body}");
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["id"], distribution["id"]);
}

async fn list(app: &Router, token: &str, uri: &str, search: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        uri,
        Some(token),
        Some(json!({ "search": search, "pagination": { "pageIndex": 0, "pageSize": 100 }, "sorting": [] })),
    )
    .await;
    assert!(status.is_success(), "{uri}: {body}");
    body
}

async fn muzakki_in_new_category(app: &Router, token: &str, name: &str) -> Value {
    let category = create(app, token, "/muzakki-category", json!({ "name": unique("Kategori") })).await;
    create(
        app,
        token,
        "/muzakki",
        json!({ "name": name, "muzakkiCategoryId": category["id"], "address": "Jl. Anggrek 3" }),
    )
    .await
}

#[tokio::test]
#[ignore]
async fn period_delete_is_blocked_while_records_use_it() {
    let app = app().await;
    let token = signin(&app).await;

    let period = create(&app, &token, "/zakat-period", json!({ "name": unique("Periode") })).await;
    let muzakki = muzakki_in_new_category(&app, &token, &unique("Rahmat")).await;
    create(
        &app,
        &token,
        "/zakat-record",
        json!({
            "muzakkiId": muzakki["id"],
            "periodId": period["id"],
            "type": "UANG",
            "amount": 50000,
            "dateReceived": "2025-03-22T08:00:00Z"
        }),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/zakat-period/delete",
        Some(&token),
        Some(json!([period["id"]])),
    )
    .await;
    assert_eq!(status.as_u16(), 409, "{body}");
    assert_eq!(
        body["message"],
        "Kesalahan: Data tidak bisa dihapus karena masih ada data penerimaan zakat yang terkait"
    );

    let uri = format!("/zakat-period/{}", period["id"].as_str().unwrap());
    let (status, _) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert!(status.is_success());
}

#[tokio::test]
#[ignore]
async fn moving_a_record_moves_its_distributions() {
    let app = app().await;
    let token = signin(&app).await;

    let first = create(&app, &token, "/zakat-period", json!({ "name": unique("Periode") })).await;
    let second = create(&app, &token, "/zakat-period", json!({ "name": unique("Periode") })).await;
    let muzakki = muzakki_in_new_category(&app, &token, &unique("Hasan")).await;
    let mustahik_category = create(&app, &token, "/mustahik-category", json!({ "name": unique("Gharim") })).await;
    let mustahik = create(
        &app,
        &token,
        "/mustahik",
        json!({ "name": unique("Umar"), "mustahikCategoryId": mustahik_category["id"], "address": "Jl. Dahlia" }),
    )
    .await;

    let record_payload = |period: &Value| {
        json!({
            "muzakkiId": muzakki["id"],
            "periodId": period["id"],
            "type": "BERAS",
            "amount": 5,
            "dateReceived": "2025-03-23T08:00:00Z"
        })
    };
    let record = create(&app, &token, "/zakat-record", record_payload(&first)).await;
    let distribution = create(
        &app,
        &token,
        "/zakat-distribution",
        json!({
            "mustahikId": mustahik["id"],
            "zakatRecordId": record["id"],
            "amount": 2,
            "dateDistribution": "2025-03-24T08:00:00Z"
        }),
    )
    .await;
    assert_eq!(distribution["periodId"], first["id"]);

    let uri = format!("/zakat-record/{}", record["id"].as_str().unwrap());
    let (status, body) = send(&app, Method::PUT, &uri, Some(&token), Some(record_payload(&second))).await;
    assert!(status.is_success(), "{body}");
    assert_eq!(body["data"]["periodId"], second["id"]);

    let uri = format!("/zakat-distribution/{}", distribution["id"].as_str().unwrap());
    let (status, body) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert!(status.is_success());
    assert_eq!(body["data"]["periodId"], second["id"]);
    assert_eq!(body["data"]["periodName"], second["name"]);
}

#[tokio::test]
#[ignore]
async fn search_is_case_insensitive_and_literal() {
    let app = app().await;
    let token = signin(&app).await;

    let marker = Uuid::new_v4().simple().to_string();
    let name = format!("Zainab {marker}");
    let muzakki = muzakki_in_new_category(&app, &token, &name).await;

    let body = list(&app, &token, "/muzakki/list", &marker.to_uppercase()).await;
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["id"], muzakki["id"]);

    // `%` dan `_` dicari apa adanya, bukan sebagai wildcard
    let body = list(&app, &token, "/muzakki/list", &format!("%{marker}")).await;
    assert_eq!(body["meta"]["total"], 0);
    let body = list(&app, &token, "/muzakki/list", &format!("Zainab_{marker}")).await;
    assert_eq!(body["meta"]["total"], 0);
}

#[tokio::test]
#[ignore]
async fn amounts_are_stored_without_rounding() {
    let app = app().await;
    let token = signin(&app).await;

    let period = create(&app, &token, "/zakat-period", json!({ "name": unique("Periode") })).await;
    let muzakki = muzakki_in_new_category(&app, &token, &unique("Fatimah")).await;
    let payload = |amount: f64| {
        json!({
            "muzakkiId": muzakki["id"],
            "periodId": period["id"],
            "type": "UANG",
            "amount": amount,
            "dateReceived": "2025-03-25T08:00:00Z"
        })
    };

    for amount in [0.001, 2.375] {
        let (status, body) = send(&app, Method::POST, "/zakat-record", Some(&token), Some(payload(amount))).await;
        assert_eq!(status.as_u16(), 400, "{amount}: {body}");
        assert_eq!(body["message"], "Kesalahan: Maksimal 2 angka di belakang koma");
    }

    let record = create(&app, &token, "/zakat-record", payload(2.38)).await;
    assert_eq!(record["amount"], 2.38);
    let uri = format!("/zakat-record/{}", record["id"].as_str().unwrap());
    let (_, body) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(body["data"]["amount"], 2.38);
}
