use serde::Serialize;

pub type AbilityResult<T> = Result<T, AbilityError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AbilityError {
    #[error("invalid subject: {0}")]
    InvalidSubject(String),
    #[error("invalid action: {0}")]
    InvalidArgument(String),
    #[error("invalid definition callback: {0}")]
    InvalidCallback(String),
    #[error("cannot {action} {subject}: {}", .reason.as_deref().unwrap_or("access not allowed"))]
    Forbidden {
        action: String,
        subject: String,
        reason: Option<String>,
    },
}

impl AbilityError {
    pub fn invalid_subject(message: impl Into<String>) -> Self {
        Self::InvalidSubject(message.into())
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn invalid_callback(message: impl Into<String>) -> Self {
        Self::InvalidCallback(message.into())
    }

    pub fn forbidden(
        action: impl Into<String>,
        subject: impl Into<String>,
        reason: Option<String>,
    ) -> Self {
        Self::Forbidden {
            action: action.into(),
            subject: subject.into(),
            reason,
        }
    }

    /// Stable machine-readable name of the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            AbilityError::InvalidSubject(_) => "invalid_subject",
            AbilityError::InvalidArgument(_) => "invalid_argument",
            AbilityError::InvalidCallback(_) => "invalid_callback",
            AbilityError::Forbidden { .. } => "forbidden",
        }
    }

    /// Definition errors surface while building an ability; `Forbidden` only at query time.
    pub fn is_definition_error(&self) -> bool {
        !matches!(self, AbilityError::Forbidden { .. })
    }

    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            error: self.code().to_string(),
            message: self.to_string(),
        }
    }
}

/// Serializable view of an error, for hosts that forward it to their own clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub error: String,
    pub message: String,
}
