//! References to other NetBox objects

use serde::{Deserialize, Serialize};
use std::fmt;

/// A reference to another object, either by NetBox id or by name.
///
/// Numbers deserialize as ids and strings as names, so a manifest can write
/// `tags: [net, 7]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference {
    /// NetBox id
    Id(u64),
    /// Name, or slug when no object has that name
    Name(String),
}

impl Reference {
    /// Numeric id, if the reference is already resolved
    pub fn id(&self) -> Option<u64> {
        match self {
            Self::Id(id) => Some(*id),
            Self::Name(_) => None,
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{}", id),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl From<u64> for Reference {
    fn from(id: u64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for Reference {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_forms() {
        let refs: Vec<Reference> = serde_json::from_str(r#"[7, "net"]"#).unwrap();
        assert_eq!(refs, vec![Reference::Id(7), Reference::Name("net".to_string())]);
        assert_eq!(serde_json::to_string(&refs).unwrap(), r#"[7,"net"]"#);
    }
}
