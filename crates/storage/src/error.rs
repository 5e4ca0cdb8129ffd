use thiserror::Error;

const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    /// Turn a write rejected by a foreign key into a client-facing message.
    pub fn from_foreign_key(error: sqlx::Error, message: &str) -> Self {
        match sqlstate(&error).as_deref() {
            Some(FOREIGN_KEY_VIOLATION) => Self::ConstraintViolation(message.to_string()),
            _ => Self::Database(error),
        }
    }
}

fn sqlstate(error: &sqlx::Error) -> Option<String> {
    match error {
        sqlx::Error::Database(db_err) => db_err.code().map(|code| code.into_owned()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;
    use std::fmt;

    use super::*;

    #[derive(Debug)]
    struct CodedError(&'static str);

    impl fmt::Display for CodedError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "sqlstate {}", self.0)
        }
    }

    impl std::error::Error for CodedError {}

    impl sqlx::error::DatabaseError for CodedError {
        fn message(&self) -> &str {
            "constraint failed"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.0))
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::Other
        }
    }

    fn database_error(code: &'static str) -> sqlx::Error {
        sqlx::Error::Database(Box::new(CodedError(code)))
    }

    #[test]
    fn test_non_database_errors_are_not_reclassified() {
        let error = StorageError::from_foreign_key(sqlx::Error::RowNotFound, "fk");
        assert!(matches!(error, StorageError::Database(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn test_foreign_key_violation_carries_message() {
        let error = StorageError::from_foreign_key(database_error("23503"), "Runner 9 does not exist");
        assert!(
            matches!(error, StorageError::ConstraintViolation(ref msg) if msg == "Runner 9 does not exist")
        );
    }

    #[test]
    fn test_other_violations_stay_database_errors() {
        let error = StorageError::from_foreign_key(database_error("23505"), "Runner 9 does not exist");
        assert!(matches!(error, StorageError::Database(_)));
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(StorageError::NotFound.to_string(), "Not found");
        assert_eq!(
            StorageError::ConstraintViolation("Runner already listed".to_string()).to_string(),
            "Constraint violation: Runner already listed"
        );
    }
}
