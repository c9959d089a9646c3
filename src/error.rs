use thiserror::Error;

use crate::store::StoreError;

/// アプリケーション操作のエラー型
///
/// Every user intent resolves to either success or exactly one of these.
/// No variant triggers an automatic retry; the user re-triggers the action.
#[derive(Debug, Error)]
pub enum AppError {
    /// Empty or duplicate input. The operation aborted with no state change.
    #[error("{0}")]
    Validation(String),

    /// Plan limit reached. `login_hint` asks the UI to offer the login
    /// dialog (guests get a higher limit by signing in).
    #[error("{message}")]
    QuotaExceeded { message: String, login_hint: bool },

    /// Stale selection referencing data that no longer exists.
    #[error("{0}")]
    NotFound(String),

    /// Persistence backend failure. In-memory state is left unchanged,
    /// except load failures which reset to empty collections.
    #[error("{0}")]
    Backend(#[from] StoreError),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Stable machine-readable code, independent of the display message.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::QuotaExceeded { .. } => "QUOTA_EXCEEDED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Backend(_) => "BACKEND_ERROR",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
