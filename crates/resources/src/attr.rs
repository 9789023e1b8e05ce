//! Three-valued attribute state

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An attribute that is either not yet known, explicitly null, or valued.
///
/// In serialized documents an `Unknown` attribute is absent (use
/// `#[serde(default, skip_serializing_if = "Attr::is_unknown")]`), `Null` is
/// `null`, and `Value` is the plain value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Attr<T> {
    /// Not computed yet; never written to NetBox
    #[default]
    Unknown,
    /// Explicitly absent
    Null,
    /// Concrete value
    Value(T),
}

impl<T> Attr<T> {
    /// Not computed yet
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Explicitly null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Known means either null or valued
    pub fn is_known(&self) -> bool {
        !self.is_unknown()
    }

    /// The value, if there is one
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow the value in place
    pub fn as_ref(&self) -> Attr<&T> {
        match self {
            Self::Unknown => Attr::Unknown,
            Self::Null => Attr::Null,
            Self::Value(v) => Attr::Value(v),
        }
    }

    /// Transform the value, keeping unknown and null
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Attr<U> {
        match self {
            Self::Unknown => Attr::Unknown,
            Self::Null => Attr::Null,
            Self::Value(v) => Attr::Value(f(v)),
        }
    }
}

impl<T> From<Option<T>> for Attr<T> {
    /// `None` is an explicit null, not an unknown
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Value(v),
            None => Self::Null,
        }
    }
}

impl<T: Serialize> Serialize for Attr<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => v.serialize(serializer),
            Self::Unknown | Self::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Attr<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Attr::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Serialize)]
    struct Doc {
        #[serde(default, skip_serializing_if = "Attr::is_unknown")]
        parent: Attr<u64>,
    }

    #[test]
    fn test_absent_null_and_value_are_distinct() {
        let absent: Doc = serde_json::from_str("{}").unwrap();
        let null: Doc = serde_json::from_str(r#"{"parent": null}"#).unwrap();
        let value: Doc = serde_json::from_str(r#"{"parent": 3}"#).unwrap();

        assert_eq!(absent.parent, Attr::Unknown);
        assert_eq!(null.parent, Attr::Null);
        assert_eq!(value.parent, Attr::Value(3));
    }

    #[test]
    fn test_unknown_is_omitted_when_serialized() {
        let absent = Doc { parent: Attr::Unknown };
        let null = Doc { parent: Attr::Null };
        assert_eq!(serde_json::to_string(&absent).unwrap(), "{}");
        assert_eq!(serde_json::to_string(&null).unwrap(), r#"{"parent":null}"#);
    }

    #[test]
    fn test_known() {
        assert!(!Attr::<u8>::Unknown.is_known());
        assert!(Attr::<u8>::Null.is_known());
        assert_eq!(Attr::Value(2).map(|v| v * 2), Attr::Value(4));
    }
}
