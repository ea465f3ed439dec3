use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a party (account holder) in the credit network.
///
/// Nodes carry no attributes of their own: everything the search needs
/// about a node is expressed through the links that touch it.
///
/// # Examples
///
/// ```
/// use credit_path_engine::core::node::NodeId;
///
/// let alice = NodeId::new("alice");
/// let bob = NodeId::new("bob");
/// assert_ne!(alice, bob);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this node ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
