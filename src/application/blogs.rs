//! Blog aggregate operations: authoring, browsing and engagement.

use std::sync::Arc;

use foglio_api_types::{BlogStatus, FieldError, SeoMetadata};
use metrics::counter;
use serde_json::Value;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::application::pagination::PageParams;
use crate::application::repos::{
    BlogAggregate, BlogListRecord, BlogQueryFilter, BlogSort, BlogsRepo, BlogsWriteRepo,
    CreateBlogParams, EngagementRepo, LikeOutcome, RepoError, UpdateBlogFields,
};
use crate::domain::content::{self, ContentError};
use crate::domain::entities::{BlogRecord, CommentRecord, ReplyRecord};
use crate::domain::slug::{SlugError, SlugLookupError, generate_unique_slug};

#[derive(Debug, Error)]
pub enum BlogError {
    #[error("{0}")]
    Validation(String),
    #[error("validation failed")]
    Invalid(Vec<FieldError>),
    #[error("forbidden")]
    Forbidden,
    #[error("blog not found")]
    NotFound,
    #[error("comment not found")]
    CommentNotFound,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<ContentError> for BlogError {
    fn from(err: ContentError) -> Self {
        Self::Validation(err.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateBlogCommand {
    pub title: Option<String>,
    pub content: Option<Value>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub status: Option<BlogStatus>,
    pub seo: Option<SeoMetadata>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateBlogCommand {
    pub title: Option<String>,
    pub content: Option<Value>,
    pub categories: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub featured_image: Option<String>,
    pub status: Option<BlogStatus>,
    pub seo: Option<SeoMetadata>,
}

#[derive(Clone)]
pub struct BlogService {
    reader: Arc<dyn BlogsRepo>,
    writer: Arc<dyn BlogsWriteRepo>,
    engagement: Arc<dyn EngagementRepo>,
}

impl BlogService {
    pub fn new(
        reader: Arc<dyn BlogsRepo>,
        writer: Arc<dyn BlogsWriteRepo>,
        engagement: Arc<dyn EngagementRepo>,
    ) -> Self {
        Self {
            reader,
            writer,
            engagement,
        }
    }

    pub async fn create(
        &self,
        author_id: Uuid,
        command: CreateBlogCommand,
    ) -> Result<BlogRecord, BlogError> {
        let title = command
            .title
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .ok_or_else(|| BlogError::Validation("Title is required".to_string()))?
            .to_string();

        let raw_content = command
            .content
            .ok_or(BlogError::from(ContentError::Empty))?;
        let mut blocks = content::parse_content(&raw_content)?;
        content::sanitize(&mut blocks);

        let slug = self.unique_slug(&title, None).await?;

        let blog = self
            .writer
            .create_blog(CreateBlogParams {
                slug,
                title,
                author_id,
                content: blocks,
                categories: command.categories,
                tags: command.tags,
                featured_image: command.featured_image,
                status: command.status.unwrap_or_default(),
                seo: command.seo.unwrap_or_default(),
            })
            .await?;

        info!(target: "foglio::blogs", blog_id = %blog.id, slug = %blog.slug, "blog created");
        Ok(blog)
    }

    pub async fn update(
        &self,
        caller_id: Uuid,
        blog_id: Uuid,
        command: UpdateBlogCommand,
    ) -> Result<BlogRecord, BlogError> {
        let existing = self
            .reader
            .find_by_id(blog_id)
            .await?
            .ok_or(BlogError::NotFound)?;
        if existing.author_id != caller_id {
            return Err(BlogError::Forbidden);
        }

        let mut fields = UpdateBlogFields {
            categories: command.categories,
            tags: command.tags,
            featured_image: command.featured_image,
            status: command.status,
            seo: command.seo,
            ..UpdateBlogFields::default()
        };

        if let Some(raw) = command.content {
            let mut blocks = content::parse_content(&raw)?;
            content::sanitize(&mut blocks);
            fields.content = Some(blocks);
        }

        if let Some(title) = command.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(BlogError::Validation("Title is required".to_string()));
            }
            if title != existing.title {
                fields.slug = Some(self.unique_slug(&title, Some(blog_id)).await?);
            }
            fields.title = Some(title);
        }

        let updated = self.writer.update_blog(blog_id, fields).await?;
        info!(target: "foglio::blogs", blog_id = %updated.id, slug = %updated.slug, "blog updated");
        Ok(updated)
    }

    pub async fn delete(&self, caller_id: Uuid, blog_id: Uuid) -> Result<(), BlogError> {
        let existing = self
            .reader
            .find_by_id(blog_id)
            .await?
            .ok_or(BlogError::NotFound)?;
        if existing.author_id != caller_id {
            return Err(BlogError::Forbidden);
        }

        self.writer.delete_blog(blog_id).await?;
        info!(target: "foglio::blogs", blog_id = %blog_id, "blog deleted");
        Ok(())
    }

    /// Public single-blog read: published only, and every successful read
    /// bumps the view counter as a side effect.
    pub async fn read_published(&self, slug: &str) -> Result<BlogAggregate, BlogError> {
        let aggregate = self
            .reader
            .view_published_by_slug(slug)
            .await?
            .ok_or(BlogError::NotFound)?;
        counter!("foglio_blog_view_total").increment(1);
        Ok(aggregate)
    }

    pub async fn list_public(
        &self,
        filter: BlogQueryFilter,
        sort: BlogSort,
        page: PageParams,
    ) -> Result<(Vec<BlogListRecord>, u64), BlogError> {
        Ok(self.reader.list_public(&filter, sort, page).await?)
    }

    pub async fn list_for_author(
        &self,
        author_id: Uuid,
    ) -> Result<Vec<BlogListRecord>, BlogError> {
        Ok(self.reader.list_by_author(author_id).await?)
    }

    /// Owner-scoped single-blog read used by the editor; other users' blogs
    /// are indistinguishable from absent ones.
    pub async fn read_own(
        &self,
        caller_id: Uuid,
        blog_id: Uuid,
    ) -> Result<BlogAggregate, BlogError> {
        let aggregate = self
            .reader
            .find_aggregate_by_id(blog_id)
            .await?
            .ok_or(BlogError::NotFound)?;
        if aggregate.blog.author_id != caller_id {
            return Err(BlogError::NotFound);
        }
        Ok(aggregate)
    }

    pub async fn toggle_like(
        &self,
        caller_id: Uuid,
        blog_id: Uuid,
    ) -> Result<LikeOutcome, BlogError> {
        let outcome = self
            .engagement
            .toggle_blog_like(blog_id, caller_id)
            .await
            .map_err(not_found_to_blog)?;
        counter!("foglio_like_toggle_total").increment(1);
        Ok(outcome)
    }

    pub async fn add_comment(
        &self,
        caller_id: Uuid,
        blog_id: Uuid,
        content: Option<String>,
    ) -> Result<CommentRecord, BlogError> {
        let text = non_empty_content(content)?;
        let comment = self
            .engagement
            .add_comment(blog_id, Some(caller_id), text)
            .await
            .map_err(not_found_to_blog)?;
        counter!("foglio_comment_created_total").increment(1);
        Ok(comment)
    }

    pub async fn toggle_comment_like(
        &self,
        caller_id: Uuid,
        blog_id: Uuid,
        comment_id: Uuid,
    ) -> Result<LikeOutcome, BlogError> {
        self.reader
            .find_by_id(blog_id)
            .await?
            .ok_or(BlogError::NotFound)?;
        let outcome = self
            .engagement
            .toggle_comment_like(blog_id, comment_id, caller_id)
            .await
            .map_err(not_found_to_comment)?;
        counter!("foglio_like_toggle_total").increment(1);
        Ok(outcome)
    }

    pub async fn add_reply(
        &self,
        caller_id: Uuid,
        blog_id: Uuid,
        comment_id: Uuid,
        content: Option<String>,
    ) -> Result<ReplyRecord, BlogError> {
        let text = non_empty_content(content)?;
        self.reader
            .find_by_id(blog_id)
            .await?
            .ok_or(BlogError::NotFound)?;
        let reply = self
            .engagement
            .add_reply(blog_id, comment_id, Some(caller_id), text)
            .await
            .map_err(not_found_to_comment)?;
        counter!("foglio_comment_created_total").increment(1);
        Ok(reply)
    }

    async fn unique_slug(
        &self,
        title: &str,
        exclude: Option<Uuid>,
    ) -> Result<String, BlogError> {
        let reader = self.reader.clone();
        generate_unique_slug(title, move |candidate| {
            let reader = reader.clone();
            async move { reader.slug_taken(&candidate, exclude).await }
        })
        .await
        .map_err(|err| match err {
            SlugLookupError::Slug(SlugError::EmptyInput)
            | SlugLookupError::Slug(SlugError::Unrepresentable { .. }) => {
                BlogError::Validation("Title is required".to_string())
            }
            SlugLookupError::Slug(SlugError::Exhausted { .. }) => {
                BlogError::Validation("Could not derive a unique slug".to_string())
            }
            SlugLookupError::Lookup(repo) => BlogError::Repo(repo),
        })
    }
}

fn non_empty_content(content: Option<String>) -> Result<String, BlogError> {
    match content {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(BlogError::Invalid(vec![FieldError {
            field: "content".to_string(),
            message: "Invalid value".to_string(),
        }])),
    }
}

fn not_found_to_blog(err: RepoError) -> BlogError {
    match err {
        RepoError::NotFound => BlogError::NotFound,
        other => BlogError::Repo(other),
    }
}

fn not_found_to_comment(err: RepoError) -> BlogError {
    match err {
        RepoError::NotFound => BlogError::CommentNotFound,
        other => BlogError::Repo(other),
    }
}
