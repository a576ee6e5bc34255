use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::auth::hash_password;
use crate::config::Config;
use crate::models::user::UserRole;

pub type Database = PgPool;

pub async fn create_database_connection(config: &Config) -> Result<Database, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Database connected successfully");
    Ok(pool)
}

/// Pool that only opens connections on first use. Used by tests that
/// exercise routes which never reach the database.
pub fn create_lazy_connection(config: &Config) -> Result<Database, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_lazy(&config.database_url)
}

pub async fn run_migrations(pool: &Database) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Migrations executed successfully");
    Ok(())
}

// admin/admin dan petugas/petugas, hanya dibuat jika tabel users masih kosong
const DEFAULT_USERS: [(&str, &str, &str, UserRole); 2] = [
    ("SUPER ADMIN", "admin", "admin", UserRole::Admin),
    ("PETUGAS", "petugas", "petugas", UserRole::Petugas),
];

pub async fn seed_default_users(pool: &Database) -> anyhow::Result<()> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        tracing::debug!(existing, "Users already present, skipping seed");
        return Ok(());
    }

    for (name, username, password, role) in DEFAULT_USERS {
        let password_hash = hash_password(password)?;
        sqlx::query(
            "INSERT INTO users (id, name, username, password_hash, role) VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (username) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(username)
        .bind(password_hash)
        .bind(role)
        .execute(pool)
        .await?;
        tracing::info!(username, ?role, "Seeded default user");
    }
    Ok(())
}
