//! Account registration, login and profile management.

use std::str::FromStr;
use std::sync::Arc;

use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};
use email_address::EmailAddress;
use foglio_api_types::FieldError;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::application::repos::{CreateUserParams, RepoError, UsersRepo};
use crate::domain::entities::UserRecord;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("validation failed")]
    Invalid(Vec<FieldError>),
    #[error("email already registered")]
    EmailTaken,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("user not found")]
    NotFound,
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct RegisterCommand {
    pub name: String,
    pub email: String,
    pub password: String,
    pub interested_topics: Vec<String>,
}

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UsersRepo>,
}

impl UserService {
    pub fn new(users: Arc<dyn UsersRepo>) -> Self {
        Self { users }
    }

    pub async fn register(&self, command: RegisterCommand) -> Result<UserRecord, UserError> {
        let mut errors = Vec::new();
        if command.name.trim().is_empty() {
            errors.push(field_error("name", "Invalid value"));
        }
        if EmailAddress::from_str(command.email.trim()).is_err() {
            errors.push(field_error("email", "Invalid value"));
        }
        if command.password.len() < MIN_PASSWORD_LEN {
            errors.push(field_error("password", "Invalid value"));
        }
        if !errors.is_empty() {
            return Err(UserError::Invalid(errors));
        }

        let email = command.email.trim().to_lowercase();
        let password_hash = hash_password(&command.password)?;

        let user = self
            .users
            .create_user(CreateUserParams {
                name: command.name.trim().to_string(),
                email,
                password_hash,
                interested_topics: command.interested_topics,
            })
            .await
            .map_err(|err| match err {
                RepoError::Duplicate { .. } => UserError::EmailTaken,
                other => UserError::Repo(other),
            })?;

        info!(target: "foglio::users", user_id = %user.id, "account registered");
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserRecord, UserError> {
        let email = email.trim().to_lowercase();
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash) {
            return Err(UserError::InvalidCredentials);
        }
        Ok(user)
    }

    pub async fn profile(&self, id: Uuid) -> Result<UserRecord, UserError> {
        self.users.find_by_id(id).await?.ok_or(UserError::NotFound)
    }

    pub async fn update_profile(
        &self,
        id: Uuid,
        name: String,
        bio: Option<String>,
    ) -> Result<UserRecord, UserError> {
        if name.trim().is_empty() {
            return Err(UserError::Invalid(vec![field_error(
                "name",
                "Name is required",
            )]));
        }
        let user = self
            .users
            .update_profile(id, name.trim().to_string(), bio.unwrap_or_default())
            .await
            .map_err(|err| match err {
                RepoError::NotFound => UserError::NotFound,
                other => UserError::Repo(other),
            })?;
        Ok(user)
    }

    pub async fn list_users(&self) -> Result<Vec<UserRecord>, UserError> {
        Ok(self.users.list_users().await?)
    }
}

fn field_error(field: &str, message: &str) -> FieldError {
    FieldError {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// Salted Argon2id hash in PHC string format.
pub fn hash_password(password: &str) -> Result<String, UserError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| UserError::Hashing(err.to_string()))
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trips() {
        let hash = hash_password("correct horse").expect("hash");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_password("same input").expect("hash");
        let second = hash_password("same input").expect("hash");
        assert_ne!(first, second);
    }

    #[test]
    fn verify_rejects_malformed_stored_hashes() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
