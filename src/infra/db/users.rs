use async_trait::async_trait;
use foglio_api_types::UserRole;
use sqlx::query_as;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{CreateUserParams, RepoError, UsersRepo};
use crate::domain::entities::UserRecord;

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    bio: String,
    avatar: Option<String>,
    role: UserRole,
    interested_topics: Vec<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            bio: row.bio,
            avatar: row.avatar,
            role: row.role,
            interested_topics: row.interested_topics,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const USER_COLUMNS: &str = "id, name, email, password_hash, bio, avatar, role, \
     interested_topics, created_at, updated_at";

#[async_trait]
impl UsersRepo for PostgresRepositories {
    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError> {
        let row: UserRow = query_as(
            "INSERT INTO users (id, name, email, password_hash, interested_topics) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, name, email, password_hash, bio, avatar, role, \
                       interested_topics, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(&params.name)
        .bind(&params.email)
        .bind(&params.password_hash)
        .bind(&params.interested_topics)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError> {
        let row: Option<UserRow> =
            query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
                .bind(email)
                .fetch_optional(self.pool())
                .await
                .map_err(map_sqlx_error)?;

        Ok(row.map(UserRecord::from))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        let row: Option<UserRow> =
            query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool())
                .await
                .map_err(map_sqlx_error)?;

        Ok(row.map(UserRecord::from))
    }

    async fn update_profile(
        &self,
        id: Uuid,
        name: String,
        bio: String,
    ) -> Result<UserRecord, RepoError> {
        let row: Option<UserRow> = query_as(
            "UPDATE users SET name = $2, bio = $3, updated_at = now() \
             WHERE id = $1 \
             RETURNING id, name, email, password_hash, bio, avatar, role, \
                       interested_topics, created_at, updated_at",
        )
        .bind(id)
        .bind(&name)
        .bind(&bio)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(UserRecord::from).ok_or(RepoError::NotFound)
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, RepoError> {
        let rows: Vec<UserRow> = query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(UserRecord::from).collect())
    }
}
