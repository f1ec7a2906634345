use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an identity record.
///
/// Wraps a UUID to provide type safety and prevent mixing up
/// identity ids with business ids or other UUID-based identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityId(Uuid);

impl IdentityId {
    /// Creates a new random identity ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an identity ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for IdentityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for IdentityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for IdentityId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<IdentityId> for Uuid {
    fn from(id: IdentityId) -> Self {
        id.0
    }
}

/// Unique identifier for a business profile.
///
/// Minted client-side before the profile insert so that dependent
/// records (subscription, settings, branding) can reference it
/// consistently within one provisioning attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusinessId(Uuid);

impl BusinessId {
    /// Creates a new random business ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a business ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Returns the leading hyphen-separated segment of the canonical
    /// UUID string, used as a short collision-avoidance suffix when
    /// composing slugs.
    pub fn short_token(&self) -> String {
        let canonical = self.0.to_string();
        canonical
            .split('-')
            .next()
            .unwrap_or(canonical.as_str())
            .to_string()
    }
}

impl Default for BusinessId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BusinessId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for BusinessId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<BusinessId> for Uuid {
    fn from(id: BusinessId) -> Self {
        id.0
    }
}
