//! Structured, parameterized queries over a bucket.
//!
//! Tree navigation is reconstructed from the flat document collection by
//! filtering on the structural fields every record carries (`parent_id`,
//! `of`, `id`, ...). A [`Query`] is the backend-neutral form of one such
//! filtered read: a projection, a conjunction of conditions, and an optional
//! row limit. Backends compile it to their native query language; the
//! in-memory bucket evaluates it directly.

use serde_json::Value;

/// One filter condition; conditions in a query are ANDed together.
#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    /// `field = value`
    Eq { field: String, value: Value },
    /// `field IN values`
    In { field: String, values: Vec<Value> },
}

/// Which fields a query returns.
#[derive(Clone, Debug, PartialEq)]
pub enum Projection {
    /// The whole document.
    All,
    /// Only the named top-level fields.
    Fields(Vec<String>),
}

/// A parameterized read over the bucket.
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    pub projection: Projection,
    pub filter: Vec<Condition>,
    pub limit: Option<usize>,
}

impl Query {
    /// Query returning whole documents, no filter.
    pub fn all() -> Self {
        Self {
            projection: Projection::All,
            filter: Vec::new(),
            limit: None,
        }
    }

    /// Query projecting only the named fields.
    pub fn select<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            projection: Projection::Fields(fields.into_iter().map(Into::into).collect()),
            filter: Vec::new(),
            limit: None,
        }
    }

    /// Add an equality condition.
    pub fn filter_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter.push(Condition::Eq {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Add a membership condition.
    pub fn filter_in<I, V>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.filter.push(Condition::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Cap the number of returned rows.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
