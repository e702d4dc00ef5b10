//! Bearer-token sessions and the admin directory.
//!
//! Tokens are opaque: `fg_<prefix>_<secret>`. The prefix is the database
//! lookup key; only a SHA-256 digest of the secret is stored and the digest
//! comparison is constant-time. Every mutating route resolves a caller
//! identity through [`SessionService::authenticate`].

use std::collections::HashSet;
use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use foglio_api_types::UserRole;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::application::repos::{CreateSessionParams, RepoError, SessionsRepo, UsersRepo};
use crate::domain::entities::UserRecord;

const TOKEN_TAG: &str = "fg";
const SECRET_BYTES: usize = 32;
const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing bearer token")]
    Missing,
    #[error("invalid bearer token")]
    Invalid,
    #[error("expired bearer token")]
    Expired,
}

/// The resolved caller identity attached to authenticated requests.
#[derive(Debug, Clone)]
pub struct AuthPrincipal {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

#[derive(Clone)]
pub struct SessionService {
    sessions: Arc<dyn SessionsRepo>,
    users: Arc<dyn UsersRepo>,
    ttl: Option<Duration>,
}

impl SessionService {
    pub fn new(
        sessions: Arc<dyn SessionsRepo>,
        users: Arc<dyn UsersRepo>,
        ttl: Option<Duration>,
    ) -> Self {
        Self {
            sessions,
            users,
            ttl,
        }
    }

    /// Issue a fresh bearer token for the account.
    pub async fn issue(&self, user: &UserRecord) -> Result<String, SessionError> {
        let prefix = generate_prefix();
        let secret = generate_secret();
        let token = format!("{TOKEN_TAG}_{prefix}_{secret}");
        let expires_at = self.ttl.map(|ttl| OffsetDateTime::now_utc() + ttl);

        self.sessions
            .insert_session(CreateSessionParams {
                user_id: user.id,
                prefix,
                token_hash: hash_secret(&secret),
                expires_at,
            })
            .await?;

        Ok(token)
    }

    /// Resolve a bearer token into the caller's identity.
    pub async fn authenticate(&self, token: &str) -> Result<AuthPrincipal, AuthError> {
        let parsed = parse_token(token).ok_or(AuthError::Invalid)?;
        let session = self
            .sessions
            .find_by_prefix(&parsed.prefix)
            .await
            .map_err(|_| AuthError::Invalid)?
            .ok_or(AuthError::Invalid)?;

        if let Some(expires_at) = session.expires_at
            && expires_at <= OffsetDateTime::now_utc()
        {
            return Err(AuthError::Expired);
        }

        let digest = hash_secret(&parsed.secret);
        if session.token_hash.ct_eq(&digest).unwrap_u8() == 0 {
            return Err(AuthError::Invalid);
        }

        let user = self
            .users
            .find_by_id(session.user_id)
            .await
            .map_err(|_| AuthError::Invalid)?
            .ok_or(AuthError::Invalid)?;

        Ok(AuthPrincipal {
            user_id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        })
    }
}

/// Operator-configured set of administrator emails, resolved once at startup
/// and injected wherever admin gating happens.
#[derive(Debug, Clone, Default)]
pub struct AdminDirectory {
    emails: HashSet<String>,
}

impl AdminDirectory {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            emails: emails
                .into_iter()
                .map(|email| email.as_ref().trim().to_lowercase())
                .filter(|email| !email.is_empty())
                .collect(),
        }
    }

    pub fn is_admin(&self, email: &str) -> bool {
        self.emails.contains(&email.trim().to_lowercase())
    }
}

struct ParsedToken {
    prefix: String,
    secret: String,
}

fn parse_token(token: &str) -> Option<ParsedToken> {
    let mut parts = token.splitn(3, '_');
    if parts.next()? != TOKEN_TAG {
        return None;
    }
    let prefix = parts.next()?;
    let secret = parts.next()?;
    if prefix.is_empty() || secret.len() < MIN_SECRET_LEN {
        return None;
    }
    Some(ParsedToken {
        prefix: prefix.to_string(),
        secret: secret.to_string(),
    })
}

fn generate_prefix() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_string()
}

fn generate_secret() -> String {
    let bytes: [u8; SECRET_BYTES] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

fn hash_secret(secret: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.finalize().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_secrets_are_long_enough_for_parsing() {
        let secret = generate_secret();
        assert!(secret.len() >= MIN_SECRET_LEN);
        let token = format!("{TOKEN_TAG}_{}_{secret}", generate_prefix());
        assert!(parse_token(&token).is_some());
    }

    #[test]
    fn parse_rejects_foreign_and_truncated_tokens() {
        assert!(parse_token("sk_abcdef_0123456789abcdef0123456789abcdef").is_none());
        assert!(parse_token("fg_abcdef_short").is_none());
        assert!(parse_token("fg_abcdef").is_none());
        assert!(parse_token("").is_none());
    }

    #[test]
    fn admin_directory_matches_case_insensitively() {
        let admins = AdminDirectory::new(["Ops@Example.com", " root@example.com "]);
        assert!(admins.is_admin("ops@example.com"));
        assert!(admins.is_admin("ROOT@EXAMPLE.COM"));
        assert!(!admins.is_admin("user@example.com"));
    }

    #[test]
    fn digests_compare_equal_only_for_the_same_secret() {
        let secret = generate_secret();
        let digest = hash_secret(&secret);
        assert_eq!(digest.ct_eq(&hash_secret(&secret)).unwrap_u8(), 1);
        assert_eq!(
            digest.ct_eq(&hash_secret(&generate_secret())).unwrap_u8(),
            0
        );
    }
}
