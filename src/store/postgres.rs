//! PostgreSQL store backend
//!
//! Provides the production implementations of the collaborator traits plus
//! pool construction:
//! - Configurable pool sizes and timeouts
//! - Health checking
//! - Query instrumentation
//! - Startup migrations

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::ConnectOptions;
use tracing::{debug, info, instrument};

use crate::catalog::{CatalogItem, Status};
use crate::config::DatabaseConfig;
use crate::discovery::filter::QueryFilter;
use crate::discovery::signals::UserSignals;
use crate::error::{Error, Result};

use super::{CatalogStore, UserProfileProvider};

/// Create a connection pool with the given configuration
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    info!("Creating database connection pool...");
    debug!(
        "Pool config: max={}, min={}, connect_timeout={:?}",
        config.max_connections, config.min_connections, config.connect_timeout
    );

    let mut connect_options = PgConnectOptions::from_str(&config.url).map_err(|e| Error::Config {
        message: format!("Invalid database URL: {}", e).into(),
        source: None,
    })?;

    connect_options = connect_options.statement_cache_capacity(config.statement_cache_size);

    // Per-query logging stays at debug unless a statement turns slow
    connect_options = connect_options.log_statements(log::LevelFilter::Debug);
    connect_options =
        connect_options.log_slow_statements(log::LevelFilter::Warn, Duration::from_secs(1));

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.connect_timeout)
        .idle_timeout(Some(config.idle_timeout))
        .max_lifetime(Some(config.max_lifetime))
        .connect_with(connect_options)
        .await
        .map_err(|e| Error::Database {
            message: format!("Failed to create connection pool: {}", e).into(),
            source: Some(e),
        })?;

    // Verify we can connect
    sqlx::query("SELECT 1").fetch_one(&pool).await.map_err(|e| {
        Error::Database {
            message: format!("Failed to verify database connection: {}", e).into(),
            source: Some(e),
        }
    })?;

    info!(
        "Database connection pool created (size: {}, idle: {})",
        pool.size(),
        pool.num_idle()
    );

    Ok(pool)
}

/// Run database migrations
#[instrument(skip(pool))]
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    info!("Running database migrations...");

    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| Error::Migration(e.to_string()))?;

    info!("Database migrations completed successfully");
    Ok(())
}

/// Row shape shared by the catalog queries
#[derive(Debug, sqlx::FromRow)]
struct CatalogRow {
    id: String,
    title: String,
    description: String,
    status: String,
    genres: Vec<String>,
    languages: Vec<String>,
    listen_count: i64,
    likes: i64,
    shares: i64,
    comment_count: i64,
    updated_at: DateTime<Utc>,
    host: String,
}

impl From<CatalogRow> for CatalogItem {
    fn from(row: CatalogRow) -> Self {
        CatalogItem {
            id: row.id,
            title: row.title,
            description: row.description,
            // unknown status values in the store never surface as active
            status: Status::parse(&row.status).unwrap_or(Status::Inactive),
            genres: row.genres,
            languages: row.languages,
            listen_count: row.listen_count.max(0) as u64,
            likes: row.likes.max(0) as u64,
            shares: row.shares.max(0) as u64,
            comment_count: row.comment_count.max(0) as u64,
            updated_at: row.updated_at,
            host: row.host,
        }
    }
}

/// Catalog reads against PostgreSQL
#[derive(Clone)]
pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PostgresCatalog {
    async fn find(
        &self,
        filter: &QueryFilter,
        skip: u64,
        limit: u64,
    ) -> Result<(Vec<CatalogItem>, u64)> {
        let status = filter.status.map(|s| s.as_str());

        let rows: Vec<CatalogRow> = sqlx::query_as::<_, CatalogRow>(
            r#"
            SELECT id, title, description, status, genres, languages,
                   listen_count, likes, shares, comment_count, updated_at, host
            FROM podcasts
            WHERE ($1::text IS NULL OR title ILIKE '%' || $1 || '%'
                                    OR description ILIKE '%' || $1 || '%')
              AND ($2::text[] IS NULL OR genres && $2)
              AND ($3::text[] IS NULL OR languages && $3)
              AND ($4::text IS NULL OR status = $4)
              AND updated_at >= $5
            ORDER BY updated_at DESC, id ASC
            LIMIT $6 OFFSET $7
            "#,
        )
        .bind(filter.text.as_deref())
        .bind(&filter.genres)
        .bind(&filter.languages)
        .bind(status)
        .bind(filter.cutoff)
        .bind(limit as i64)
        .bind(skip as i64)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM podcasts
            WHERE ($1::text IS NULL OR title ILIKE '%' || $1 || '%'
                                    OR description ILIKE '%' || $1 || '%')
              AND ($2::text[] IS NULL OR genres && $2)
              AND ($3::text[] IS NULL OR languages && $3)
              AND ($4::text IS NULL OR status = $4)
              AND updated_at >= $5
            "#,
        )
        .bind(filter.text.as_deref())
        .bind(&filter.genres)
        .bind(&filter.languages)
        .bind(status)
        .bind(filter.cutoff)
        .fetch_one(&self.pool)
        .await?;

        let items = rows.into_iter().map(CatalogItem::from).collect();
        Ok((items, total.max(0) as u64))
    }
}

/// Row shape for user profiles
#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    interests: Vec<String>,
    favorites: Vec<String>,
    search_history: Vec<String>,
}

/// User signal reads against PostgreSQL
#[derive(Clone)]
pub struct PostgresProfiles {
    pool: PgPool,
}

impl PostgresProfiles {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserProfileProvider for PostgresProfiles {
    async fn signals(&self, user_id: &str) -> Result<UserSignals> {
        let row: Option<ProfileRow> = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT interests, favorites, search_history
            FROM user_profiles
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(UserSignals {
                interests: row.interests,
                favorites: row.favorites,
                search_history: row.search_history,
            }),
            None => Err(Error::user_not_found(user_id)),
        }
    }
}
