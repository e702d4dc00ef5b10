//! Blog browsing, authoring and engagement handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use foglio_api_types::{
    BlogPage, CommentRequest, CreateBlogRequest, DeleteConfirmation, FilteredBlogPage,
    LikeStatus, PageMeta, UpdateBlogRequest,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::application::blogs::{BlogError, CreateBlogCommand, UpdateBlogCommand};
use crate::application::pagination::{
    MAX_FILTERED_PAGE_SIZE, MAX_PAGE_SIZE, PageParams, PageQuery,
};
use crate::application::repos::{BlogQueryFilter, BlogSort};
use crate::infra::http::error::ApiError;
use crate::infra::http::middleware::Caller;
use crate::infra::http::state::AppState;

use super::{
    comment_created_view, created_view, detail_view, reply_created_view, summary_view,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilteredListQuery {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// `GET /api/blogs/all`: the plain paginated listing.
pub async fn list_all(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = PageParams::from_query(query, MAX_PAGE_SIZE);
    let (items, total) = state
        .blogs
        .list_public(BlogQueryFilter::default(), BlogSort::Recent, page)
        .await?;

    Ok(Json(BlogPage {
        page: page.page,
        limit: page.limit,
        total,
        total_pages: page.total_pages(total),
        items: items.into_iter().map(summary_view).collect(),
    }))
}

/// `GET /api/public-blogs`: filtered listing with selectable sort order.
pub async fn list_filtered(
    State(state): State<AppState>,
    Query(query): Query<FilteredListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = PageParams::from_query(
        PageQuery {
            page: query.page,
            limit: query.limit,
        },
        MAX_FILTERED_PAGE_SIZE,
    );

    let sort = match query.sort_by.as_deref() {
        None | Some("trending") => BlogSort::Trending,
        Some("latest") => BlogSort::Latest,
        Some("recent") => BlogSort::Recent,
        Some("mostLiked") => BlogSort::MostLiked,
        Some(_) => BlogSort::Recent,
    };

    let filter = BlogQueryFilter {
        category: query.category,
        tag: query.tag,
        search: query.search,
    };

    let (items, total) = state.blogs.list_public(filter, sort, page).await?;

    Ok(Json(FilteredBlogPage {
        success: true,
        meta: PageMeta {
            total,
            page: page.page,
            limit: page.limit,
            total_pages: page.total_pages(total),
        },
        data: items.into_iter().map(summary_view).collect(),
    }))
}

/// `GET /api/blogs/{slug}`: public read of a published blog; bumps views.
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let aggregate = state.blogs.read_published(&slug).await?;
    Ok(Json(detail_view(aggregate)))
}

/// `GET /api/blogs/user-blogs`: the caller's blogs, drafts included.
pub async fn user_blogs(
    State(state): State<AppState>,
    Caller(principal): Caller,
) -> Result<impl IntoResponse, ApiError> {
    let blogs = state.blogs.list_for_author(principal.user_id).await?;
    Ok(Json(
        blogs.into_iter().map(summary_view).collect::<Vec<_>>(),
    ))
}

/// `GET /api/blogs/user-blogs/{id}`: one of the caller's blogs for editing.
pub async fn user_blog(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let aggregate = state
        .blogs
        .read_own(principal.user_id, id)
        .await
        .map_err(|err| match err {
            BlogError::NotFound => ApiError::not_found("Blog not found or access denied"),
            other => other.into(),
        })?;
    Ok(Json(detail_view(aggregate)))
}

/// `POST /api/blogs/create-new-blogs`.
pub async fn create(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Json(payload): Json<CreateBlogRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let blog = state
        .blogs
        .create(
            principal.user_id,
            CreateBlogCommand {
                title: payload.title,
                content: payload.content,
                categories: payload.categories,
                tags: payload.tags,
                featured_image: payload.featured_image,
                status: payload.status,
                seo: payload.seo,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(created_view(blog))))
}

/// `PATCH /api/blogs/{id}`: owner-only partial update.
pub async fn update(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBlogRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let blog = state
        .blogs
        .update(
            principal.user_id,
            id,
            UpdateBlogCommand {
                title: payload.title,
                content: payload.content,
                categories: payload.categories,
                tags: payload.tags,
                featured_image: payload.featured_image,
                status: payload.status,
                seo: payload.seo,
            },
        )
        .await?;

    Ok(Json(created_view(blog)))
}

/// `DELETE /api/blogs/{id}`: owner-only hard delete.
pub async fn delete(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.blogs.delete(principal.user_id, id).await?;
    Ok(Json(DeleteConfirmation {
        message: "Blog deleted successfully".to_string(),
    }))
}

/// `POST /api/blogs/{id}/like`.
pub async fn toggle_like(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.blogs.toggle_like(principal.user_id, id).await?;
    Ok(Json(LikeStatus {
        likes_count: outcome.likes_count,
        liked: outcome.liked,
    }))
}

/// `POST /api/blogs/{id}/comments`.
pub async fn add_comment(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Path(id): Path<Uuid>,
    Json(payload): Json<CommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = state
        .blogs
        .add_comment(principal.user_id, id, payload.content)
        .await?;
    Ok((StatusCode::CREATED, Json(comment_created_view(comment))))
}

/// `POST /api/blogs/{id}/comments/{comment_id}/like`.
pub async fn toggle_comment_like(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Path((id, comment_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .blogs
        .toggle_comment_like(principal.user_id, id, comment_id)
        .await?;
    Ok(Json(LikeStatus {
        likes_count: outcome.likes_count,
        liked: outcome.liked,
    }))
}

/// `POST /api/blogs/{id}/comments/{comment_id}/replies`.
pub async fn add_reply(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Path((id, comment_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<CommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let reply = state
        .blogs
        .add_reply(principal.user_id, id, comment_id, payload.content)
        .await?;
    Ok((StatusCode::CREATED, Json(reply_created_view(reply))))
}
