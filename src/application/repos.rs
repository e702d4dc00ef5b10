//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use foglio_api_types::{BlogStatus, ContentBlock, SeoMetadata};
use serde::Deserialize;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::PageParams;
use crate::domain::entities::{
    BlogRecord, CommentRecord, ReplyRecord, SessionRecord, UserRecord,
};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Sort orders of the filtered public listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlogSort {
    /// Most viewed first.
    #[default]
    Trending,
    /// Recently updated first.
    Latest,
    /// Recently created first.
    Recent,
    /// Highest like count first, computed from the likes table.
    MostLiked,
}

#[derive(Debug, Clone, Default)]
pub struct BlogQueryFilter {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
}

/// Denormalized author fields joined into listings and aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorRef {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

/// One listing row: blog metadata plus aggregate engagement counts.
#[derive(Debug, Clone)]
pub struct BlogListRecord {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub author: Option<AuthorRef>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub status: BlogStatus,
    pub views: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// A reply together with its like count.
#[derive(Debug, Clone)]
pub struct ReplyThread {
    pub reply: ReplyRecord,
    pub like_count: i64,
}

/// A comment together with its like count and reply sequence.
#[derive(Debug, Clone)]
pub struct CommentThread {
    pub comment: CommentRecord,
    pub like_count: i64,
    pub replies: Vec<ReplyThread>,
}

/// The fully assembled blog aggregate: root record, author, like membership
/// and the ordered comment thread.
#[derive(Debug, Clone)]
pub struct BlogAggregate {
    pub blog: BlogRecord,
    pub author: Option<AuthorRef>,
    pub likes: Vec<Uuid>,
    pub comments: Vec<CommentThread>,
}

#[derive(Debug, Clone)]
pub struct CreateBlogParams {
    pub slug: String,
    pub title: String,
    pub author_id: Uuid,
    pub content: Vec<ContentBlock>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub status: BlogStatus,
    pub seo: SeoMetadata,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateBlogFields {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub content: Option<Vec<ContentBlock>>,
    pub categories: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub featured_image: Option<String>,
    pub status: Option<BlogStatus>,
    pub seo: Option<SeoMetadata>,
}

/// Outcome of a like toggle: the caller's new membership state and the
/// resulting count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeOutcome {
    pub liked: bool,
    pub likes_count: i64,
}

#[derive(Debug, Clone)]
pub struct CreateUserParams {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub interested_topics: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CreateSessionParams {
    pub user_id: Uuid,
    pub prefix: String,
    pub token_hash: Vec<u8>,
    pub expires_at: Option<OffsetDateTime>,
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    /// Signals [`RepoError::Duplicate`] when the email is already registered.
    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError>;

    async fn update_profile(
        &self,
        id: Uuid,
        name: String,
        bio: String,
    ) -> Result<UserRecord, RepoError>;

    async fn list_users(&self) -> Result<Vec<UserRecord>, RepoError>;
}

#[async_trait]
pub trait SessionsRepo: Send + Sync {
    async fn insert_session(&self, params: CreateSessionParams)
    -> Result<SessionRecord, RepoError>;

    async fn find_by_prefix(&self, prefix: &str) -> Result<Option<SessionRecord>, RepoError>;
}

#[async_trait]
pub trait BlogsRepo: Send + Sync {
    /// Published blogs only, with engagement counts; returns the page items
    /// and the total match count.
    async fn list_public(
        &self,
        filter: &BlogQueryFilter,
        sort: BlogSort,
        page: PageParams,
    ) -> Result<(Vec<BlogListRecord>, u64), RepoError>;

    /// All of one author's blogs regardless of status, newest first.
    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<BlogListRecord>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<BlogRecord>, RepoError>;

    async fn find_aggregate_by_id(&self, id: Uuid) -> Result<Option<BlogAggregate>, RepoError>;

    /// Whether `slug` is taken, optionally ignoring one blog (used when a
    /// title edit regenerates the slug of an existing blog).
    async fn slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, RepoError>;

    /// Atomically bump the view counter of a published blog and return the
    /// refreshed aggregate. `None` when the slug is absent or unpublished.
    async fn view_published_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<BlogAggregate>, RepoError>;
}

#[async_trait]
pub trait BlogsWriteRepo: Send + Sync {
    async fn create_blog(&self, params: CreateBlogParams) -> Result<BlogRecord, RepoError>;

    async fn update_blog(
        &self,
        id: Uuid,
        fields: UpdateBlogFields,
    ) -> Result<BlogRecord, RepoError>;

    /// Removes the blog and, through ownership, its comments, replies and
    /// likes. Signals [`RepoError::NotFound`] when absent.
    async fn delete_blog(&self, id: Uuid) -> Result<(), RepoError>;
}

#[async_trait]
pub trait EngagementRepo: Send + Sync {
    /// Toggle the caller's membership in the blog's like set. Atomic: two
    /// concurrent toggles cannot lose an update.
    async fn toggle_blog_like(
        &self,
        blog_id: Uuid,
        user_id: Uuid,
    ) -> Result<LikeOutcome, RepoError>;

    async fn add_comment(
        &self,
        blog_id: Uuid,
        user_id: Option<Uuid>,
        content: String,
    ) -> Result<CommentRecord, RepoError>;

    /// Signals [`RepoError::NotFound`] when the comment does not belong to
    /// the addressed blog.
    async fn toggle_comment_like(
        &self,
        blog_id: Uuid,
        comment_id: Uuid,
        user_id: Uuid,
    ) -> Result<LikeOutcome, RepoError>;

    async fn add_reply(
        &self,
        blog_id: Uuid,
        comment_id: Uuid,
        user_id: Option<Uuid>,
        content: String,
    ) -> Result<ReplyRecord, RepoError>;
}
