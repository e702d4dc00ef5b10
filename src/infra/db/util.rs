use crate::application::repos::RepoError;

/// Collapse driver errors into the repository taxonomy. Unique violations
/// surface as duplicates so callers can map them to conflict responses.
pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::RowNotFound => RepoError::NotFound,
        sqlx::Error::PoolTimedOut => RepoError::Timeout,
        sqlx::Error::Database(db) if db.is_unique_violation() => RepoError::Duplicate {
            constraint: db.constraint().unwrap_or("unique").to_string(),
        },
        other => RepoError::from_persistence(other),
    }
}
