use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::Value;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::Database;
use crate::error::{ApiResult, AppError};
use crate::extract::{ApiJson, ApiPath};
use crate::models::distribusi::ZakatDistribution;
use crate::query::{ListInput, ListSpec, Scope};
use crate::routes::distribusi::BY_MUSTAHIK;
use crate::routes::pihak::{self, PartyKind};
use crate::routes::success_list;
use crate::validation::exists;

pub struct Mustahik;

impl PartyKind for Mustahik {
    const TABLE: &'static str = "mustahik";
    const CATEGORY_TABLE: &'static str = "mustahik_categories";
    const CATEGORY_COLUMN: &'static str = "mustahik_category_id";
    const LABEL: &'static str = "Mustahik";
    const LIST: ListSpec = ListSpec {
        columns: "p.id, p.name, p.mustahik_category_id AS category_id, c.name AS category_name, \
                  p.email, p.phone, p.address, p.created_at, p.updated_at",
        from: "mustahik p JOIN mustahik_categories c ON c.id = p.mustahik_category_id",
        search_columns: &["p.name", "p.address", "p.email", "p.phone"],
        sort_columns: &[
            ("name", "p.name"),
            ("email", "p.email"),
            ("phone", "p.phone"),
            ("address", "p.address"),
            ("createdAt", "p.created_at"),
            ("updatedAt", "p.updated_at"),
            ("mustahikCategory.name", "c.name"),
            ("categoryName", "c.name"),
        ],
        default_order: "p.created_at DESC",
        id_column: "p.id",
    };
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(pihak::get_all::<Mustahik>).post(pihak::create::<Mustahik>))
        .route("/list", post(pihak::get_list::<Mustahik>))
        .route("/delete", post(pihak::delete_many::<Mustahik>))
        .route("/total", get(pihak::total::<Mustahik>))
        .route(
            "/:id",
            get(pihak::get_detail::<Mustahik>).put(pihak::update::<Mustahik>),
        )
        .route("/:id/distributions", post(get_zakat_distributions))
}

// Daftar distribusi yang diterima satu mustahik
pub async fn get_zakat_distributions(
    State(db): State<Database>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<ListInput>,
) -> ApiResult<Json<Value>> {
    if !exists(&db, Mustahik::TABLE, id).await? {
        return Err(AppError::not_found("Kesalahan: Mustahik tidak ditemukan"));
    }

    let scope = Scope {
        column: "d.mustahik_id",
        id,
    };
    let (rows, meta) = BY_MUSTAHIK
        .fetch_page::<ZakatDistribution>(&db, &input, Some(scope))
        .await?;
    Ok(success_list(rows, meta))
}
