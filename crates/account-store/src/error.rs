use thiserror::Error;

/// Which unique constraint a write collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictField {
    Slug,
    Email,
}

impl std::fmt::Display for ConflictField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictField::Slug => write!(f, "slug"),
            ConflictField::Email => write!(f, "email"),
        }
    }
}

/// Errors reported by the account repository boundary.
///
/// A closed kind enumeration: the saga branches on these kinds, never on
/// error message text.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The identity provider rejected the signup (e.g. duplicate email
    /// at that layer).
    #[error("identity provider rejected signup: {0}")]
    IdentityRejected(String),

    /// A business profile insert hit a unique constraint.
    #[error("unique constraint violated on business {field}")]
    UniquenessConflict { field: ConflictField },

    /// A write failed for a reason other than uniqueness.
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// True only for a slug-specific uniqueness conflict. The saga's
    /// single retry is keyed on this, so an email conflict or generic
    /// write failure can never mask itself as a slug race.
    pub fn is_slug_conflict(&self) -> bool {
        matches!(
            self,
            StoreError::UniquenessConflict {
                field: ConflictField::Slug
            }
        )
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_slug_conflicts_are_retryable() {
        let slug = StoreError::UniquenessConflict {
            field: ConflictField::Slug,
        };
        let email = StoreError::UniquenessConflict {
            field: ConflictField::Email,
        };
        let generic = StoreError::WriteFailed("connection reset".to_string());

        assert!(slug.is_slug_conflict());
        assert!(!email.is_slug_conflict());
        assert!(!generic.is_slug_conflict());
    }

    #[test]
    fn conflict_field_display() {
        assert_eq!(ConflictField::Slug.to_string(), "slug");
        assert_eq!(ConflictField::Email.to_string(), "email");
    }
}
