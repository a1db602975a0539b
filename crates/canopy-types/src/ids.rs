use std::fmt;

use serde::{Deserialize, Serialize};

/// The well-known oid of the tree root record.
pub const ROOT_OID: &str = "00000000000000000000000000000000";

/// Opaque unique identifier of a persisted object record.
///
/// An `Oid` doubles as the document key in the backing store. It is assigned
/// by the higher persistence layer, is globally unique, and is never reused
/// for the lifetime of the record.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Oid(String);

impl Oid {
    /// Wrap an identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The oid of the tree root.
    pub fn root() -> Self {
        Self(ROOT_OID.to_string())
    }

    /// Returns `true` if this is the root oid.
    pub fn is_root(&self) -> bool {
        self.0 == ROOT_OID
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self.0)
    }
}

impl From<&str> for Oid {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Oid {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Transaction identifier stamped onto a record as its version marker.
///
/// Under the counter sequencing strategy tids increase strictly across the
/// whole store; under the random strategy they are unique tokens with no
/// ordering guarantee. Callers must not compare tids numerically unless they
/// know the store runs the counter strategy.
#[derive(
    Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Debug,
)]
#[serde(transparent)]
pub struct Tid(u64);

impl Tid {
    /// Wrap a raw transaction id.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw id value.
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Tid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_oid_round_trip() {
        let root = Oid::root();
        assert!(root.is_root());
        assert_eq!(root.as_str(), ROOT_OID);
        assert!(!Oid::from("abc123").is_root());
    }

    #[test]
    fn oid_serializes_as_plain_string() {
        let oid = Oid::from("a1b2c3");
        let json = serde_json::to_string(&oid).unwrap();
        assert_eq!(json, "\"a1b2c3\"");
        let back: Oid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, oid);
    }

    #[test]
    fn tid_serializes_as_plain_number() {
        let tid = Tid::new(42);
        let json = serde_json::to_string(&tid).unwrap();
        assert_eq!(json, "42");
        let back: Tid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tid);
    }

    #[test]
    fn tid_ordering_follows_value() {
        assert!(Tid::new(1) < Tid::new(2));
        assert_eq!(Tid::default(), Tid::new(0));
    }
}
