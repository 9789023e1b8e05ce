//! Diagnostics collected during one operation.
//!
//! Operations keep going after independent problems so that, for example, a
//! bad custom field and an unresolvable tag surface in the same pass.

use crate::error::ReconcileError;
use std::fmt;

/// One problem, optionally tied to an attribute path
#[derive(Debug)]
pub struct Diagnostic {
    /// Attribute path the problem belongs to
    pub attribute: Option<String>,
    /// What went wrong
    pub error: ReconcileError,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.attribute {
            Some(attribute) => write!(f, "{}: {}", attribute, self.error),
            None => write!(f, "{}", self.error),
        }
    }
}

/// Every problem reported by one operation
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// No problems yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a problem not tied to an attribute
    pub fn push(&mut self, error: ReconcileError) {
        self.items.push(Diagnostic {
            attribute: None,
            error,
        });
    }

    /// Record a problem with an attribute
    pub fn push_at(&mut self, attribute: &str, error: ReconcileError) {
        self.items.push(Diagnostic {
            attribute: Some(attribute.to_string()),
            error,
        });
    }

    /// Take over every entry of `other`
    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// `Ok(value)` when nothing was recorded
    pub fn into_result<T>(self, value: T) -> Result<T, Diagnostics> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    /// Id of an object a failed Create still left in NetBox
    pub fn created_id(&self) -> Option<u64> {
        self.items.iter().find_map(|d| match &d.error {
            ReconcileError::CreatedUndecoded { id, .. } => Some(*id),
            _ => None,
        })
    }

    /// True if any entry matches the predicate
    pub fn any(&self, predicate: impl Fn(&ReconcileError) -> bool) -> bool {
        self.items.iter().any(|d| predicate(&d.error))
    }

    /// Every entry is transient, so the whole operation may be retried
    pub fn is_retryable(&self) -> bool {
        !self.is_empty() && self.items.iter().all(|d| d.error.is_retryable())
    }
}

impl From<ReconcileError> for Diagnostics {
    fn from(error: ReconcileError) -> Self {
        let mut diagnostics = Self::new();
        diagnostics.push(error);
        diagnostics
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.items.iter().map(ToString::to_string).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for Diagnostics {}
