use std::fmt;

use storage::error::StorageError;
use validator::ValidationErrors;

use crate::notify::Notification;

/// Front-end layer errors
#[derive(Debug)]
pub enum WebError {
    /// A read failed
    Fetch(StorageError),
    /// Create, update or delete failed; local state was left as it was
    Mutation(StorageError),
    /// Image could not be stored
    Upload(StorageError),
    /// The draft was refused before any store call
    Validation(ValidationErrors),
    BadRequest(String),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(e) => write!(f, "Fetch error: {}", e),
            Self::Mutation(e) => write!(f, "Mutation error: {}", e),
            Self::Upload(e) => write!(f, "Upload error: {}", e),
            Self::Validation(e) => write!(f, "Validation error: {}", e),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
        }
    }
}

impl std::error::Error for WebError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fetch(e) | Self::Mutation(e) | Self::Upload(e) => Some(e),
            Self::Validation(e) => Some(e),
            Self::BadRequest(_) => None,
        }
    }
}

impl WebError {
    /// The toast for this error. Store failures are logged and shown as
    /// `context`; validation and request problems are shown as-is.
    pub fn notification(&self, context: &str) -> Notification {
        match self {
            Self::Fetch(e) | Self::Mutation(e) | Self::Upload(e) => {
                tracing::error!("{}: {:?}", context, e);
                Notification::error(context)
            }
            Self::Validation(errors) => {
                let mut field_errors: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errors)| {
                        errors.iter().map(move |e| {
                            format!(
                                "{}: {}",
                                field,
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            )
                        })
                    })
                    .collect();
                field_errors.sort();

                Notification::error(format!("Validation failed: {}", field_errors.join(", ")))
            }
            Self::BadRequest(msg) => Notification::error(msg.clone()),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<ValidationErrors> for WebError {
    fn from(error: ValidationErrors) -> Self {
        Self::Validation(error)
    }
}

pub type WebResult<T> = Result<T, WebError>;
