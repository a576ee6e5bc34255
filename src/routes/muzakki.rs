use axum::{
    routing::{get, post},
    Router,
};

use crate::app::AppState;
use crate::query::ListSpec;
use crate::routes::pihak::{self, PartyKind};

pub struct Muzakki;

impl PartyKind for Muzakki {
    const TABLE: &'static str = "muzakki";
    const CATEGORY_TABLE: &'static str = "muzakki_categories";
    const CATEGORY_COLUMN: &'static str = "muzakki_category_id";
    const LABEL: &'static str = "Muzakki";
    const LIST: ListSpec = ListSpec {
        columns: "p.id, p.name, p.muzakki_category_id AS category_id, c.name AS category_name, \
                  p.email, p.phone, p.address, p.created_at, p.updated_at",
        from: "muzakki p JOIN muzakki_categories c ON c.id = p.muzakki_category_id",
        search_columns: &["p.name", "p.address", "p.email", "p.phone"],
        sort_columns: &[
            ("name", "p.name"),
            ("email", "p.email"),
            ("phone", "p.phone"),
            ("address", "p.address"),
            ("createdAt", "p.created_at"),
            ("updatedAt", "p.updated_at"),
            ("muzakkiCategory.name", "c.name"),
            ("categoryName", "c.name"),
        ],
        default_order: "p.created_at DESC",
        id_column: "p.id",
    };
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(pihak::get_all::<Muzakki>).post(pihak::create::<Muzakki>))
        .route("/list", post(pihak::get_list::<Muzakki>))
        .route("/delete", post(pihak::delete_many::<Muzakki>))
        .route("/total", get(pihak::total::<Muzakki>))
        .route(
            "/:id",
            get(pihak::get_detail::<Muzakki>).put(pihak::update::<Muzakki>),
        )
}
