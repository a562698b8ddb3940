/**
 * Responsibility
 * - repo が上位に伝える意味の定義
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error")]
    Db(#[source] sqlx::Error),
    #[error("conflict")]
    Conflict,
    #[error("reference violation")]
    ReferenceViolation,
    #[error("invalid row: {0}")]
    InvalidRow(String),
}

pub type RepoResult<T> = Result<T, RepoError>;

impl RepoError {
    /// Gives meaning to the constraint violations handlers care about.
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(dbe) = &e {
            match dbe.code().as_deref() {
                // unique_violation
                Some("23505") => return RepoError::Conflict,
                // foreign_key_violation
                Some("23503") => return RepoError::ReferenceViolation,
                _ => {}
            }
        }
        RepoError::Db(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_stay_db() {
        let err = RepoError::from_sqlx(sqlx::Error::RowNotFound);
        assert!(matches!(err, RepoError::Db(sqlx::Error::RowNotFound)));
    }
}
