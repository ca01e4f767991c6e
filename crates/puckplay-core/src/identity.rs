//! Identity types for tracked entities

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a tracked entity as it appears in the feed's `onIce` map
///
/// The feed keys every record by a string id; the reserved id `"1"` is the puck.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Reserved feed id for the puck
    pub const PUCK: &'static str = "1";

    /// Create a new entity ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether this id denotes the puck
    pub fn is_puck(&self) -> bool {
        self.0 == Self::PUCK
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::borrow::Borrow<str> for EntityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id() {
        let id = EntityId::new("8478402");
        assert_eq!(id.as_str(), "8478402");
        assert_eq!(format!("{}", id), "8478402");
        assert!(!id.is_puck());
    }

    #[test]
    fn test_puck_id() {
        assert!(EntityId::new(EntityId::PUCK).is_puck());
        assert!(EntityId::from("1").is_puck());
        assert!(!EntityId::from("10").is_puck());
    }
}
