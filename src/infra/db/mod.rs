//! Postgres-backed repository implementations.

mod blogs;
mod engagement;
mod sessions;
mod users;
mod util;

pub use util::map_sqlx_error;

use std::sync::Arc;

use sqlx::{
    Postgres, QueryBuilder,
    postgres::{PgPool, PgPoolOptions},
    query,
};

use crate::application::repos::BlogQueryFilter;
use foglio_api_types::BlogStatus;

#[derive(Clone)]
pub struct PostgresRepositories {
    pool: Arc<PgPool>,
}

impl PostgresRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        query("SELECT 1").execute(self.pool()).await.map(|_| ())
    }

    fn apply_public_scope(qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" AND b.status = ");
        qb.push_bind(BlogStatus::Published);
        qb.push(" ");
    }

    fn apply_listing_filter<'q>(qb: &mut QueryBuilder<'q, Postgres>, filter: &'q BlogQueryFilter) {
        if let Some(category) = filter.category.as_ref() {
            qb.push(" AND ");
            qb.push_bind(category);
            qb.push(" = ANY(b.categories) ");
        }
        if let Some(tag) = filter.tag.as_ref() {
            qb.push(" AND ");
            qb.push_bind(tag);
            qb.push(" = ANY(b.tags) ");
        }
        if let Some(search) = filter.search.as_ref() {
            qb.push(" AND b.title ILIKE ");
            qb.push_bind(format!("%{search}%"));
            qb.push(" ");
        }
    }
}
