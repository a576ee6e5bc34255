//! Shared search/sort/paginate builder used by every `getList` procedure.
//!
//! Each entity describes itself once with a [`ListSpec`]: which joined
//! tables to read from, which text columns a search touches, and which
//! column ids the client may sort by. Column ids may be dotted
//! (`muzakkiCategory.name`) to address a field of a related entity.

use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::Database;
use crate::error::{ApiResult, AppError};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;
/// Keeps `index * size` and `index + 1` inside `i64`.
pub const MAX_PAGE_INDEX: i64 = i64::MAX / MAX_PAGE_SIZE - 1;

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInput {
    pub page_index: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SortInput {
    pub id: String,
    #[serde(default)]
    pub desc: bool,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListInput {
    pub search: Option<String>,
    pub pagination: Option<PaginationInput>,
    #[serde(default)]
    pub sorting: Vec<SortInput>,
}

/// Resolved zero-based page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub index: i64,
    pub size: i64,
}

impl Page {
    pub fn offset(&self) -> i64 {
        self.index * self.size
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ListMeta {
    pub total: i64,
    pub current_page: i64,
    pub total_page: i64,
}

impl ListMeta {
    pub fn new(total: i64, page: Page) -> Self {
        Self {
            total,
            current_page: page.index + 1,
            total_page: (total + page.size - 1) / page.size,
        }
    }
}

impl ListInput {
    pub fn page(&self) -> Page {
        let pagination = self.pagination.clone().unwrap_or_default();
        Page {
            index: pagination.page_index.unwrap_or(0).clamp(0, MAX_PAGE_INDEX),
            size: pagination
                .page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// The trimmed search term, or `None` when it would match everything.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }
}

/// Restricts a listing to rows owned by one parent (e.g. a mustahik's
/// distributions).
#[derive(Debug, Clone, Copy)]
pub struct Scope {
    pub column: &'static str,
    pub id: Uuid,
}

pub struct ListSpec {
    pub columns: &'static str,
    pub from: &'static str,
    pub search_columns: &'static [&'static str],
    pub sort_columns: &'static [(&'static str, &'static str)],
    pub default_order: &'static str,
    pub id_column: &'static str,
}

/// Escapes LIKE metacharacters so the term matches literally.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

impl ListSpec {
    fn sort_column(&self, id: &str) -> Option<&'static str> {
        self.sort_columns
            .iter()
            .find(|(key, _)| *key == id)
            .map(|(_, column)| *column)
    }

    pub fn order_by(&self, sorting: &[SortInput]) -> ApiResult<String> {
        let mut keys = Vec::with_capacity(sorting.len() + 1);
        for sort in sorting {
            let column = self.sort_column(&sort.id).ok_or_else(|| {
                AppError::validation(format!(
                    "Kesalahan: Kolom pengurutan '{}' tidak dikenal",
                    sort.id
                ))
            })?;
            let direction = if sort.desc { "DESC" } else { "ASC" };
            keys.push(format!("{column} {direction}"));
        }
        if keys.is_empty() {
            keys.push(self.default_order.to_string());
        }
        keys.push(format!("{} ASC", self.id_column));
        Ok(keys.join(", "))
    }

    fn push_filters(
        &self,
        qb: &mut QueryBuilder<'static, Postgres>,
        input: &ListInput,
        scope: Option<Scope>,
    ) {
        let mut has_where = false;

        if let Some(scope) = scope {
            qb.push(" WHERE ").push(scope.column).push(" = ");
            qb.push_bind(scope.id);
            has_where = true;
        }

        if let Some(term) = input.search_term() {
            if !self.search_columns.is_empty() {
                let pattern = format!("%{}%", escape_like(term));
                qb.push(if has_where { " AND (" } else { " WHERE (" });
                for (i, column) in self.search_columns.iter().enumerate() {
                    if i > 0 {
                        qb.push(" OR ");
                    }
                    qb.push(*column).push(" ILIKE ");
                    qb.push_bind(pattern.clone());
                }
                qb.push(")");
            }
        }
    }

    pub fn count_query(
        &self,
        input: &ListInput,
        scope: Option<Scope>,
    ) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", self.from));
        self.push_filters(&mut qb, input, scope);
        qb
    }

    pub fn select_query(
        &self,
        input: &ListInput,
        scope: Option<Scope>,
        page: Page,
    ) -> ApiResult<QueryBuilder<'static, Postgres>> {
        let order_by = self.order_by(&input.sorting)?;
        let mut qb =
            QueryBuilder::new(format!("SELECT {} FROM {}", self.columns, self.from));
        self.push_filters(&mut qb, input, scope);
        qb.push(" ORDER BY ").push(order_by);
        qb.push(" LIMIT ").push_bind(page.size);
        qb.push(" OFFSET ").push_bind(page.offset());
        Ok(qb)
    }

    pub fn all_query(&self) -> String {
        format!(
            "SELECT {} FROM {} ORDER BY {}, {} ASC",
            self.columns, self.from, self.default_order, self.id_column
        )
    }

    pub fn detail_query(&self) -> String {
        format!(
            "SELECT {} FROM {} WHERE {} = $1",
            self.columns, self.from, self.id_column
        )
    }

    /// Runs the count and page queries for one `getList` call.
    pub async fn fetch_page<T>(
        &self,
        db: &Database,
        input: &ListInput,
        scope: Option<Scope>,
    ) -> ApiResult<(Vec<T>, ListMeta)>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let page = input.page();
        let mut select = self.select_query(input, scope, page)?;

        let total: i64 = self
            .count_query(input, scope)
            .build_query_scalar()
            .fetch_one(db)
            .await?;
        let rows = select.build_query_as::<T>().fetch_all(db).await?;

        Ok((rows, ListMeta::new(total, page)))
    }

    pub async fn fetch_all<T>(&self, db: &Database) -> ApiResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let rows = sqlx::query_as::<_, T>(&self.all_query())
            .fetch_all(db)
            .await?;
        Ok(rows)
    }

    pub async fn fetch_one<T>(&self, db: &Database, id: Uuid) -> ApiResult<Option<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let row = sqlx::query_as::<_, T>(&self.detail_query())
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(row)
    }
}
