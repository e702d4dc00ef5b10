use async_trait::async_trait;
use sqlx::{query, query_as, query_scalar};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{EngagementRepo, LikeOutcome, RepoError};
use crate::domain::entities::{CommentRecord, ReplyRecord};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct CommentInsertRow {
    id: Uuid,
    blog_id: Uuid,
    user_id: Option<Uuid>,
    content: String,
    created_at: OffsetDateTime,
}

#[derive(sqlx::FromRow)]
struct ReplyInsertRow {
    id: Uuid,
    comment_id: Uuid,
    user_id: Option<Uuid>,
    content: String,
    created_at: OffsetDateTime,
}

#[async_trait]
impl EngagementRepo for PostgresRepositories {
    async fn toggle_blog_like(
        &self,
        blog_id: Uuid,
        user_id: Uuid,
    ) -> Result<LikeOutcome, RepoError> {
        self.require_blog(blog_id).await?;

        // Set semantics, without a read-modify-write: the insert either takes
        // the membership slot or hits the primary key, in which case the
        // caller is un-liking.
        let inserted = query(
            "INSERT INTO blog_likes (blog_id, user_id) VALUES ($1, $2) \
             ON CONFLICT (blog_id, user_id) DO NOTHING",
        )
        .bind(blog_id)
        .bind(user_id)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?
        .rows_affected();

        let liked = if inserted == 0 {
            query("DELETE FROM blog_likes WHERE blog_id = $1 AND user_id = $2")
                .bind(blog_id)
                .bind(user_id)
                .execute(self.pool())
                .await
                .map_err(map_sqlx_error)?;
            false
        } else {
            true
        };

        let likes_count: i64 = query_scalar("SELECT COUNT(*) FROM blog_likes WHERE blog_id = $1")
            .bind(blog_id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(LikeOutcome { liked, likes_count })
    }

    async fn add_comment(
        &self,
        blog_id: Uuid,
        user_id: Option<Uuid>,
        content: String,
    ) -> Result<CommentRecord, RepoError> {
        self.require_blog(blog_id).await?;

        let row: CommentInsertRow = query_as(
            "INSERT INTO comments (id, blog_id, user_id, content) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, blog_id, user_id, content, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(blog_id)
        .bind(user_id)
        .bind(&content)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(CommentRecord {
            id: row.id,
            blog_id: row.blog_id,
            user_id: row.user_id,
            content: row.content,
            created_at: row.created_at,
        })
    }

    async fn toggle_comment_like(
        &self,
        blog_id: Uuid,
        comment_id: Uuid,
        user_id: Uuid,
    ) -> Result<LikeOutcome, RepoError> {
        self.require_comment(blog_id, comment_id).await?;

        let inserted = query(
            "INSERT INTO comment_likes (comment_id, user_id) VALUES ($1, $2) \
             ON CONFLICT (comment_id, user_id) DO NOTHING",
        )
        .bind(comment_id)
        .bind(user_id)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?
        .rows_affected();

        let liked = if inserted == 0 {
            query("DELETE FROM comment_likes WHERE comment_id = $1 AND user_id = $2")
                .bind(comment_id)
                .bind(user_id)
                .execute(self.pool())
                .await
                .map_err(map_sqlx_error)?;
            false
        } else {
            true
        };

        let likes_count: i64 =
            query_scalar("SELECT COUNT(*) FROM comment_likes WHERE comment_id = $1")
                .bind(comment_id)
                .fetch_one(self.pool())
                .await
                .map_err(map_sqlx_error)?;

        Ok(LikeOutcome { liked, likes_count })
    }

    async fn add_reply(
        &self,
        blog_id: Uuid,
        comment_id: Uuid,
        user_id: Option<Uuid>,
        content: String,
    ) -> Result<ReplyRecord, RepoError> {
        self.require_comment(blog_id, comment_id).await?;

        let row: ReplyInsertRow = query_as(
            "INSERT INTO replies (id, comment_id, user_id, content) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, comment_id, user_id, content, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(comment_id)
        .bind(user_id)
        .bind(&content)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(ReplyRecord {
            id: row.id,
            comment_id: row.comment_id,
            user_id: row.user_id,
            content: row.content,
            created_at: row.created_at,
        })
    }
}

impl PostgresRepositories {
    async fn require_blog(&self, blog_id: Uuid) -> Result<(), RepoError> {
        let exists: bool = query_scalar("SELECT EXISTS(SELECT 1 FROM blogs WHERE id = $1)")
            .bind(blog_id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        if exists { Ok(()) } else { Err(RepoError::NotFound) }
    }

    async fn require_comment(&self, blog_id: Uuid, comment_id: Uuid) -> Result<(), RepoError> {
        let exists: bool = query_scalar(
            "SELECT EXISTS(SELECT 1 FROM comments WHERE id = $1 AND blog_id = $2)",
        )
        .bind(comment_id)
        .bind(blog_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        if exists { Ok(()) } else { Err(RepoError::NotFound) }
    }
}
