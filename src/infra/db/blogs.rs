use std::collections::HashMap;

use async_trait::async_trait;
use foglio_api_types::{BlogStatus, ContentBlock, SeoMetadata};
use sqlx::{Postgres, QueryBuilder, query_as, query_scalar, types::Json};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::PageParams;
use crate::application::repos::{
    AuthorRef, BlogAggregate, BlogListRecord, BlogQueryFilter, BlogSort, BlogsRepo,
    BlogsWriteRepo, CommentThread, CreateBlogParams, RepoError, ReplyThread, UpdateBlogFields,
};
use crate::domain::entities::{BlogRecord, CommentRecord, ReplyRecord};

use super::{PostgresRepositories, map_sqlx_error};

const BLOG_COLUMNS: &str = "id, slug, title, author_id, content, categories, tags, \
     featured_image, status, views, seo, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct BlogRow {
    id: Uuid,
    slug: String,
    title: String,
    author_id: Uuid,
    content: Json<Vec<ContentBlock>>,
    categories: Vec<String>,
    tags: Vec<String>,
    featured_image: Option<String>,
    status: BlogStatus,
    views: i64,
    seo: Json<SeoMetadata>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<BlogRow> for BlogRecord {
    fn from(row: BlogRow) -> Self {
        Self {
            id: row.id,
            slug: row.slug,
            title: row.title,
            author_id: row.author_id,
            content: row.content.0,
            categories: row.categories,
            tags: row.tags,
            featured_image: row.featured_image,
            status: row.status,
            views: row.views,
            seo: row.seo.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct BlogListRow {
    id: Uuid,
    slug: String,
    title: String,
    categories: Vec<String>,
    tags: Vec<String>,
    featured_image: Option<String>,
    status: BlogStatus,
    views: i64,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    author_id: Uuid,
    author_name: String,
    author_email: String,
    author_avatar: Option<String>,
    like_count: i64,
    comment_count: i64,
}

impl From<BlogListRow> for BlogListRecord {
    fn from(row: BlogListRow) -> Self {
        Self {
            id: row.id,
            slug: row.slug,
            title: row.title,
            author: Some(AuthorRef {
                id: row.author_id,
                name: row.author_name,
                email: row.author_email,
                avatar: row.author_avatar,
            }),
            categories: row.categories,
            tags: row.tags,
            featured_image: row.featured_image,
            status: row.status,
            views: row.views,
            like_count: row.like_count,
            comment_count: row.comment_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    blog_id: Uuid,
    user_id: Option<Uuid>,
    content: String,
    created_at: OffsetDateTime,
    like_count: i64,
}

#[derive(sqlx::FromRow)]
struct ReplyRow {
    id: Uuid,
    comment_id: Uuid,
    user_id: Option<Uuid>,
    content: String,
    created_at: OffsetDateTime,
    like_count: i64,
}

fn push_listing_select(qb: &mut QueryBuilder<'_, Postgres>) {
    qb.push(
        "SELECT b.id, b.slug, b.title, b.categories, b.tags, b.featured_image, \
                b.status, b.views, b.created_at, b.updated_at, \
                u.id AS author_id, u.name AS author_name, u.email AS author_email, \
                u.avatar AS author_avatar, \
                (SELECT COUNT(*) FROM blog_likes bl WHERE bl.blog_id = b.id) AS like_count, \
                (SELECT COUNT(*) FROM comments c WHERE c.blog_id = b.id) AS comment_count \
         FROM blogs b \
         JOIN users u ON u.id = b.author_id \
         WHERE 1=1 ",
    );
}

fn sort_expression(sort: BlogSort) -> &'static str {
    match sort {
        BlogSort::Trending => "b.views",
        BlogSort::Latest => "b.updated_at",
        BlogSort::Recent => "b.created_at",
        BlogSort::MostLiked => "like_count",
    }
}

#[async_trait]
impl BlogsRepo for PostgresRepositories {
    async fn list_public(
        &self,
        filter: &BlogQueryFilter,
        sort: BlogSort,
        page: PageParams,
    ) -> Result<(Vec<BlogListRecord>, u64), RepoError> {
        let mut qb = QueryBuilder::new("");
        push_listing_select(&mut qb);
        Self::apply_public_scope(&mut qb);
        Self::apply_listing_filter(&mut qb, filter);
        qb.push(" ORDER BY ");
        qb.push(sort_expression(sort));
        qb.push(" DESC, b.id DESC LIMIT ");
        qb.push_bind(i64::from(page.limit));
        qb.push(" OFFSET ");
        qb.push_bind(page.offset() as i64);

        let rows: Vec<BlogListRow> = qb
            .build_query_as()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM blogs b WHERE 1=1 ");
        Self::apply_public_scope(&mut count_qb);
        Self::apply_listing_filter(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok((
            rows.into_iter().map(BlogListRecord::from).collect(),
            total.try_into().unwrap_or_default(),
        ))
    }

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<BlogListRecord>, RepoError> {
        let mut qb = QueryBuilder::new("");
        push_listing_select(&mut qb);
        qb.push(" AND b.author_id = ");
        qb.push_bind(author_id);
        qb.push(" ORDER BY b.created_at DESC, b.id DESC");

        let rows: Vec<BlogListRow> = qb
            .build_query_as()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(BlogListRecord::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<BlogRecord>, RepoError> {
        let row: Option<BlogRow> =
            query_as(&format!("SELECT {BLOG_COLUMNS} FROM blogs WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool())
                .await
                .map_err(map_sqlx_error)?;

        Ok(row.map(BlogRecord::from))
    }

    async fn find_aggregate_by_id(&self, id: Uuid) -> Result<Option<BlogAggregate>, RepoError> {
        let Some(blog) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        Ok(Some(self.load_aggregate(blog).await?))
    }

    async fn slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, RepoError> {
        let taken: bool = query_scalar(
            "SELECT EXISTS(SELECT 1 FROM blogs WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(slug)
        .bind(exclude)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(taken)
    }

    async fn view_published_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<BlogAggregate>, RepoError> {
        // Single-statement increment: concurrent readers cannot lose a view.
        let row: Option<BlogRow> = query_as(&format!(
            "UPDATE blogs SET views = views + 1 \
             WHERE slug = $1 AND status = $2 \
             RETURNING {BLOG_COLUMNS}"
        ))
        .bind(slug)
        .bind(BlogStatus::Published)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(self.load_aggregate(row.into()).await?))
    }
}

#[async_trait]
impl BlogsWriteRepo for PostgresRepositories {
    async fn create_blog(&self, params: CreateBlogParams) -> Result<BlogRecord, RepoError> {
        let row: BlogRow = query_as(&format!(
            "INSERT INTO blogs (id, slug, title, author_id, content, categories, tags, \
                                featured_image, status, seo) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {BLOG_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&params.slug)
        .bind(&params.title)
        .bind(params.author_id)
        .bind(Json(&params.content))
        .bind(&params.categories)
        .bind(&params.tags)
        .bind(&params.featured_image)
        .bind(params.status)
        .bind(Json(&params.seo))
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_blog(
        &self,
        id: Uuid,
        fields: UpdateBlogFields,
    ) -> Result<BlogRecord, RepoError> {
        let mut qb = QueryBuilder::new("UPDATE blogs SET updated_at = now()");

        if let Some(slug) = fields.slug {
            qb.push(", slug = ");
            qb.push_bind(slug);
        }
        if let Some(title) = fields.title {
            qb.push(", title = ");
            qb.push_bind(title);
        }
        if let Some(content) = fields.content {
            qb.push(", content = ");
            qb.push_bind(Json(content));
        }
        if let Some(categories) = fields.categories {
            qb.push(", categories = ");
            qb.push_bind(categories);
        }
        if let Some(tags) = fields.tags {
            qb.push(", tags = ");
            qb.push_bind(tags);
        }
        if let Some(featured_image) = fields.featured_image {
            qb.push(", featured_image = ");
            qb.push_bind(featured_image);
        }
        if let Some(status) = fields.status {
            qb.push(", status = ");
            qb.push_bind(status);
        }
        if let Some(seo) = fields.seo {
            qb.push(", seo = ");
            qb.push_bind(Json(seo));
        }

        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(format!(" RETURNING {BLOG_COLUMNS}"));

        let row: Option<BlogRow> = qb
            .build_query_as()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.map(BlogRecord::from).ok_or(RepoError::NotFound)
    }

    async fn delete_blog(&self, id: Uuid) -> Result<(), RepoError> {
        let deleted: Option<Uuid> = query_scalar("DELETE FROM blogs WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        match deleted {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

impl PostgresRepositories {
    async fn load_aggregate(&self, blog: BlogRecord) -> Result<BlogAggregate, RepoError> {
        let author: Option<(Uuid, String, String, Option<String>)> =
            query_as("SELECT id, name, email, avatar FROM users WHERE id = $1")
                .bind(blog.author_id)
                .fetch_optional(self.pool())
                .await
                .map_err(map_sqlx_error)?;

        let likes: Vec<Uuid> = query_scalar(
            "SELECT user_id FROM blog_likes WHERE blog_id = $1 ORDER BY created_at, user_id",
        )
        .bind(blog.id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let comment_rows: Vec<CommentRow> = query_as(
            "SELECT c.id, c.blog_id, c.user_id, c.content, c.created_at, \
                    (SELECT COUNT(*) FROM comment_likes cl WHERE cl.comment_id = c.id) AS like_count \
             FROM comments c \
             WHERE c.blog_id = $1 \
             ORDER BY c.created_at, c.id",
        )
        .bind(blog.id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let reply_rows: Vec<ReplyRow> = query_as(
            "SELECT r.id, r.comment_id, r.user_id, r.content, r.created_at, \
                    (SELECT COUNT(*) FROM reply_likes rl WHERE rl.reply_id = r.id) AS like_count \
             FROM replies r \
             JOIN comments c ON c.id = r.comment_id \
             WHERE c.blog_id = $1 \
             ORDER BY r.created_at, r.id",
        )
        .bind(blog.id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let mut replies_by_comment: HashMap<Uuid, Vec<ReplyThread>> = HashMap::new();
        for row in reply_rows {
            replies_by_comment
                .entry(row.comment_id)
                .or_default()
                .push(ReplyThread {
                    reply: ReplyRecord {
                        id: row.id,
                        comment_id: row.comment_id,
                        user_id: row.user_id,
                        content: row.content,
                        created_at: row.created_at,
                    },
                    like_count: row.like_count,
                });
        }

        let comments = comment_rows
            .into_iter()
            .map(|row| CommentThread {
                replies: replies_by_comment.remove(&row.id).unwrap_or_default(),
                comment: CommentRecord {
                    id: row.id,
                    blog_id: row.blog_id,
                    user_id: row.user_id,
                    content: row.content,
                    created_at: row.created_at,
                },
                like_count: row.like_count,
            })
            .collect();

        Ok(BlogAggregate {
            blog,
            author: author.map(|(id, name, email, avatar)| AuthorRef {
                id,
                name,
                email,
                avatar,
            }),
            likes,
            comments,
        })
    }
}
