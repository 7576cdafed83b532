/// Crate-wide result type for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A row referenced by id does not exist.
    #[error("unknown {entity}: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A stored direction value is not one of the known variants.
    #[error("invalid message direction: {value}")]
    InvalidDirection { value: String },

    /// Underlying database failure.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl Error {
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    #[must_use]
    pub fn invalid_direction(value: impl Into<String>) -> Self {
        Self::InvalidDirection {
            value: value.into(),
        }
    }
}
