//! Shared wire types for the Foglio blogging API.
//!
//! Everything in this crate crosses the HTTP boundary: the browser client
//! deserializes responses from these definitions and the server builds them
//! from its domain records. Field names are camelCase on the wire. With the
//! `sqlx` feature enabled the status enums map onto the Postgres enums of the
//! same name.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Publication lifecycle of a blog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "blog_status", rename_all = "snake_case")
)]
pub enum BlogStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl BlogStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }
}

/// Role attached to a registered user account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "user_role", rename_all = "snake_case")
)]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

/// One typed unit of blog body content.
///
/// Blog bodies are stored and transmitted as a single ordered array of these
/// blocks; `position` carries the explicit ordering of each block within the
/// document. Consumers render in ascending `position` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Paragraph {
        value: String,
        #[serde(default)]
        position: i32,
    },
    Image {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default)]
        position: i32,
    },
    Video {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default)]
        position: i32,
    },
    Code {
        value: String,
        language: String,
        #[serde(default)]
        position: i32,
    },
    Quote {
        value: String,
        #[serde(default)]
        position: i32,
    },
    File {
        value: String,
        name: String,
        #[serde(rename = "fileType")]
        file_type: String,
        #[serde(default)]
        position: i32,
    },
}

impl ContentBlock {
    /// Wire tag of this block.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Paragraph { .. } => "paragraph",
            Self::Image { .. } => "image",
            Self::Video { .. } => "video",
            Self::Code { .. } => "code",
            Self::Quote { .. } => "quote",
            Self::File { .. } => "file",
        }
    }

    pub fn position(&self) -> i32 {
        match self {
            Self::Paragraph { position, .. }
            | Self::Image { position, .. }
            | Self::Video { position, .. }
            | Self::Code { position, .. }
            | Self::Quote { position, .. }
            | Self::File { position, .. } => *position,
        }
    }

    pub fn set_position(&mut self, value: i32) {
        match self {
            Self::Paragraph { position, .. }
            | Self::Image { position, .. }
            | Self::Video { position, .. }
            | Self::Code { position, .. }
            | Self::Quote { position, .. }
            | Self::File { position, .. } => *position = value,
        }
    }

    /// Primary textual or URL payload of the block.
    pub fn value(&self) -> &str {
        match self {
            Self::Paragraph { value, .. }
            | Self::Image { value, .. }
            | Self::Video { value, .. }
            | Self::Code { value, .. }
            | Self::Quote { value, .. }
            | Self::File { value, .. } => value,
        }
    }
}

/// Search-engine metadata attached to a blog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub meta_keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,
}

/// Author reference rendered alongside blogs and comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Listing item: blog metadata plus aggregate engagement counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogSummary {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub author: Option<AuthorView>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    pub status: BlogStatus,
    pub views: i64,
    pub total_likes: i64,
    pub total_comments: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// A reply nested beneath a comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyView {
    pub id: Uuid,
    pub user: Option<Uuid>,
    pub content: String,
    pub likes_count: i64,
    pub created_at: OffsetDateTime,
}

/// A top-level comment with its reply thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: Uuid,
    pub user: Option<Uuid>,
    pub content: String,
    pub likes_count: i64,
    pub created_at: OffsetDateTime,
    pub replies: Vec<ReplyView>,
}

/// Full blog aggregate: metadata, ordered content and the comment thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogDetail {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub author: Option<AuthorView>,
    pub content: Vec<ContentBlock>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    pub status: BlogStatus,
    pub views: i64,
    pub seo: SeoMetadata,
    pub likes: Vec<Uuid>,
    pub comments: Vec<CommentView>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Page envelope of the `/blogs/all` listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPage {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
    pub items: Vec<BlogSummary>,
}

/// Pagination metadata of the filtered public listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

/// Envelope of the filtered public listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredBlogPage {
    pub success: bool,
    pub meta: PageMeta,
    pub data: Vec<BlogSummary>,
}

/// Result of toggling a like on a blog or a comment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeStatus {
    pub likes_count: i64,
    pub liked: bool,
}

/// Confirmation body returned by deletions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteConfirmation {
    pub message: String,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body of `POST /api/blogs/create-new-blogs`.
///
/// `content` arrives as raw JSON so the server can answer malformed
/// payloads with its own validation messages (and accept the grouped
/// per-type authoring shape).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlogRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<serde_json::Value>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub status: Option<BlogStatus>,
    #[serde(default)]
    pub seo: Option<SeoMetadata>,
}

/// Body of `PATCH /api/blogs/{id}`; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBlogRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<serde_json::Value>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub status: Option<BlogStatus>,
    #[serde(default)]
    pub seo: Option<SeoMetadata>,
}

/// Body of comment and reply creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub content: Option<String>,
}

/// Body of `POST /api/auth/register`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub interested_topics: Option<Vec<String>>,
}

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Body of `PUT /api/auth/update-profile`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

// ---------------------------------------------------------------------------
// Auth responses
// ---------------------------------------------------------------------------

/// Public account view returned by registration and login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub interested_topics: Vec<String>,
}

/// Registration/login envelope: the account plus a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserView,
    pub token: String,
}

/// Body of `GET /api/auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileView {
    pub name: String,
    pub email: String,
    pub bio: String,
}

/// Body of `PUT /api/auth/update-profile` responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileUpdated {
    pub message: String,
    pub name: String,
    pub bio: String,
}

/// One account row in the admin user directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: OffsetDateTime,
}

/// Envelope of `GET /api/admin/users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUserList {
    pub users: Vec<AdminUserView>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// One failed field check, mirroring the validator output of the original
/// API (`{errors: [...]}` bodies).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// JSON error body: a human-readable message, optionally accompanied by
/// per-field validation errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_block_round_trips_with_tag() {
        let block = ContentBlock::Code {
            value: "fn main() {}".to_string(),
            language: "rust".to_string(),
            position: 3,
        };
        let json = serde_json::to_value(&block).expect("serialize");
        assert_eq!(json["type"], "code");
        assert_eq!(json["language"], "rust");
        assert_eq!(json["position"], 3);

        let back: ContentBlock = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, block);
    }

    #[test]
    fn paragraph_position_defaults_to_zero() {
        let block: ContentBlock =
            serde_json::from_value(serde_json::json!({"type": "paragraph", "value": "Hi"}))
                .expect("deserialize");
        assert_eq!(block.position(), 0);
        assert_eq!(block.type_name(), "paragraph");
    }

    #[test]
    fn file_block_uses_camel_case_file_type() {
        let block = ContentBlock::File {
            value: "/uploads/report.pdf".to_string(),
            name: "report.pdf".to_string(),
            file_type: "application/pdf".to_string(),
            position: 7,
        };
        let json = serde_json::to_value(&block).expect("serialize");
        assert_eq!(json["fileType"], "application/pdf");
    }

    #[test]
    fn error_body_omits_empty_errors() {
        let body = ErrorBody {
            message: "Blog not found".to_string(),
            errors: Vec::new(),
        };
        let json = serde_json::to_value(&body).expect("serialize");
        assert!(json.get("errors").is_none());
    }
}
