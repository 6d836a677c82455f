//! Identity of the caller being rate limited.
//!
//! A subject is a `(user, resource)` pair. Callers without a resource concept
//! use [`Subject::for_user`], which fills in the [`DEFAULT_RESOURCE`] sentinel.

use std::fmt;

/// Resource id used when the caller has no resource concept.
pub const DEFAULT_RESOURCE: &str = "default";

/// Caller role as supplied by the identity source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    /// Regular user, always subject to limits
    #[default]
    User,
    /// Administrator, exempt when the policy says so
    Admin,
}

impl Role {
    /// Check if this role is `Admin`.
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// Error returned when a subject is built from empty identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectError {
    /// User id was empty
    EmptyUserId,
    /// Resource id was empty
    EmptyResourceId,
}

impl fmt::Display for SubjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectError::EmptyUserId => write!(f, "user id must not be empty"),
            SubjectError::EmptyResourceId => write!(f, "resource id must not be empty"),
        }
    }
}

impl std::error::Error for SubjectError {}

/// Non-empty user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(String);

impl UserId {
    /// Create a user id.
    ///
    /// # Errors
    /// Returns `SubjectError::EmptyUserId` if `id` is empty.
    pub fn new(id: impl Into<String>) -> Result<Self, SubjectError> {
        let id = id.into();
        if id.is_empty() {
            return Err(SubjectError::EmptyUserId);
        }
        Ok(Self(id))
    }

    /// Get the string form of the id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Non-empty resource (model) identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(String);

impl ResourceId {
    /// Create a resource id.
    ///
    /// # Errors
    /// Returns `SubjectError::EmptyResourceId` if `id` is empty.
    pub fn new(id: impl Into<String>) -> Result<Self, SubjectError> {
        let id = id.into();
        if id.is_empty() {
            return Err(SubjectError::EmptyResourceId);
        }
        Ok(Self(id))
    }

    /// The sentinel resource for callers without one.
    pub fn default_resource() -> Self {
        Self(DEFAULT_RESOURCE.to_string())
    }

    /// Get the string form of the id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The unit being rate limited.
///
/// # Example
/// ```
/// use request_throttle::{Subject, SubjectError};
///
/// let subject = Subject::new("alice", "gpt-4").unwrap();
/// assert_eq!(subject.user().as_str(), "alice");
///
/// let anon = Subject::for_user("bob").unwrap();
/// assert_eq!(anon.resource().as_str(), "default");
///
/// assert_eq!(Subject::new("", "gpt-4"), Err(SubjectError::EmptyUserId));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subject {
    user: UserId,
    resource: ResourceId,
}

impl Subject {
    /// Create a subject from raw identifiers.
    ///
    /// # Errors
    /// Returns `SubjectError` if either identifier is empty.
    pub fn new(user: impl Into<String>, resource: impl Into<String>) -> Result<Self, SubjectError> {
        Ok(Self {
            user: UserId::new(user)?,
            resource: ResourceId::new(resource)?,
        })
    }

    /// Create a subject scoped to the default resource.
    ///
    /// # Errors
    /// Returns `SubjectError::EmptyUserId` if `user` is empty.
    pub fn for_user(user: impl Into<String>) -> Result<Self, SubjectError> {
        Ok(Self {
            user: UserId::new(user)?,
            resource: ResourceId::default_resource(),
        })
    }

    /// Assemble a subject from validated parts.
    pub fn from_parts(user: UserId, resource: ResourceId) -> Self {
        Self { user, resource }
    }

    /// The user part.
    pub fn user(&self) -> &UserId {
        &self.user
    }

    /// The resource part.
    pub fn resource(&self) -> &ResourceId {
        &self.resource
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user, self.resource)
    }
}
