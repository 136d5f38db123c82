use thiserror::Error;

/// Input rejected before any state is touched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Date is required")]
    MissingDate,
    #[error("Date `{0}` is not a valid YYYY-MM-DD date")]
    InvalidDate(String),
    #[error("Category is required")]
    MissingCategory,
    #[error("Amount must be a positive number of yen")]
    InvalidAmount,
    #[error("Category key must not be empty")]
    EmptyKey,
    #[error("Category key `{0}` already exists")]
    DuplicateKey(String),
    #[error("Cap must be a non-negative number")]
    InvalidCap,
    #[error("No category at position {0}")]
    CategoryIndexOutOfRange(usize),
    #[error("`{0}` is not a YYYY-MM month")]
    InvalidMonth(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Import failed: {0}")]
    MalformedPayload(String),
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("Serialization error: {0}")]
    Serde(String),
}

impl CoreError {
    /// Returns the validation failure, if this error is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            CoreError::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serde(err.to_string())
    }
}

impl From<ivb_domain::MonthTokenError> for ValidationError {
    fn from(err: ivb_domain::MonthTokenError) -> Self {
        ValidationError::InvalidMonth(err.0)
    }
}
