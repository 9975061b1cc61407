use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("You must be signed in to do this")]
    NotAuthenticated,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account already exists for this email")]
    EmailInUse,

    #[error("Password must be at least {0} characters")]
    WeakPassword(usize),

    #[error("Invalid Input: {0}")]
    InvalidInput(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Remote Call Failed: {0}")]
    RemoteUnavailable(String),

    #[error("Permission Denied: {0}")]
    PermissionDenied(String),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database Pool Error: {0}")]
    DbPool(#[from] r2d2::Error),

    #[error("Database Error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True when the failed action can simply be re-issued by the user.
    /// Infrastructure failures qualify; validation and auth failures do not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::RemoteUnavailable(_) | Error::Io(_) | Error::DbPool(_) | Error::Database(_)
        )
    }
}
