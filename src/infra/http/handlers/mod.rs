//! Route handlers, grouped by surface, plus the record-to-wire conversions
//! they share.

pub mod admin;
pub mod auth;
pub mod blogs;

use foglio_api_types::{
    AdminUserView, AuthorView, BlogDetail, BlogSummary, CommentView, ReplyView, UserView,
};

use crate::application::repos::{
    AuthorRef, BlogAggregate, BlogListRecord, CommentThread, ReplyThread,
};
use crate::domain::entities::{BlogRecord, CommentRecord, ReplyRecord, UserRecord};

fn author_view(author: AuthorRef) -> AuthorView {
    AuthorView {
        id: author.id,
        name: author.name,
        email: author.email,
        avatar: author.avatar,
    }
}

pub(crate) fn summary_view(record: BlogListRecord) -> BlogSummary {
    BlogSummary {
        id: record.id,
        slug: record.slug,
        title: record.title,
        author: record.author.map(author_view),
        categories: record.categories,
        tags: record.tags,
        featured_image: record.featured_image,
        status: record.status,
        views: record.views,
        total_likes: record.like_count,
        total_comments: record.comment_count,
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}

fn reply_view(thread: ReplyThread) -> ReplyView {
    ReplyView {
        id: thread.reply.id,
        user: thread.reply.user_id,
        content: thread.reply.content,
        likes_count: thread.like_count,
        created_at: thread.reply.created_at,
    }
}

fn comment_view(thread: CommentThread) -> CommentView {
    CommentView {
        id: thread.comment.id,
        user: thread.comment.user_id,
        content: thread.comment.content,
        likes_count: thread.like_count,
        created_at: thread.comment.created_at,
        replies: thread.replies.into_iter().map(reply_view).collect(),
    }
}

pub(crate) fn detail_view(aggregate: BlogAggregate) -> BlogDetail {
    let blog = aggregate.blog;
    BlogDetail {
        id: blog.id,
        slug: blog.slug,
        title: blog.title,
        author: aggregate.author.map(author_view),
        content: blog.content,
        categories: blog.categories,
        tags: blog.tags,
        featured_image: blog.featured_image,
        status: blog.status,
        views: blog.views,
        seo: blog.seo,
        likes: aggregate.likes,
        comments: aggregate.comments.into_iter().map(comment_view).collect(),
        created_at: blog.created_at,
        updated_at: blog.updated_at,
    }
}

/// Detail view of a freshly written record: no author join, no engagement.
pub(crate) fn created_view(blog: BlogRecord) -> BlogDetail {
    BlogDetail {
        id: blog.id,
        slug: blog.slug,
        title: blog.title,
        author: None,
        content: blog.content,
        categories: blog.categories,
        tags: blog.tags,
        featured_image: blog.featured_image,
        status: blog.status,
        views: blog.views,
        seo: blog.seo,
        likes: Vec::new(),
        comments: Vec::new(),
        created_at: blog.created_at,
        updated_at: blog.updated_at,
    }
}

pub(crate) fn comment_created_view(record: CommentRecord) -> CommentView {
    CommentView {
        id: record.id,
        user: record.user_id,
        content: record.content,
        likes_count: 0,
        created_at: record.created_at,
        replies: Vec::new(),
    }
}

pub(crate) fn reply_created_view(record: ReplyRecord) -> ReplyView {
    ReplyView {
        id: record.id,
        user: record.user_id,
        content: record.content,
        likes_count: 0,
        created_at: record.created_at,
    }
}

pub(crate) fn user_view(user: &UserRecord) -> UserView {
    UserView {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        interested_topics: user.interested_topics.clone(),
    }
}

pub(crate) fn admin_user_view(user: UserRecord) -> AdminUserView {
    AdminUserView {
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
        created_at: user.created_at,
    }
}
