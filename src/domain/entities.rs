//! Domain entities mirrored from persistent storage.

use foglio_api_types::{BlogStatus, ContentBlock, SeoMetadata, UserRole};
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// A registered account. The password never leaves the record as anything but
/// its Argon2 hash, and the hash itself is excluded from serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub bio: String,
    pub avatar: Option<String>,
    pub role: UserRole,
    pub interested_topics: Vec<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// A blog aggregate root. Comments, replies and likes live in child tables
/// owned by the blog (they cascade on delete); `content` is the ordered
/// block sequence described in [`crate::domain::content`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlogRecord {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub author_id: Uuid,
    pub content: Vec<ContentBlock>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub status: BlogStatus,
    pub views: i64,
    pub seo: SeoMetadata,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// A top-level comment on a blog. `user_id` is optional: accounts may be
/// deleted out-of-band without cascading into threads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentRecord {
    pub id: Uuid,
    pub blog_id: Uuid,
    pub user_id: Option<Uuid>,
    pub content: String,
    pub created_at: OffsetDateTime,
}

/// A reply nested beneath a comment. Same shape as a comment minus the
/// ability to hold further replies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyRecord {
    pub id: Uuid,
    pub comment_id: Uuid,
    pub user_id: Option<Uuid>,
    pub content: String,
    pub created_at: OffsetDateTime,
}

/// An issued bearer session. Only the SHA-256 digest of the token secret is
/// stored; the prefix is the lookup key.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub prefix: String,
    pub token_hash: Vec<u8>,
    pub expires_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_record_never_serializes_password_hash() {
        let user = UserRecord {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            bio: String::new(),
            avatar: None,
            role: UserRole::User,
            interested_topics: vec!["rust".to_string()],
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_value(&user).expect("serialize");
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "ada@example.com");
    }
}
