//! Predicate values passed to repository reads.
//!
//! A [`Filter`] is either structured (column comparisons joined by AND),
//! which the PostgreSQL backend turns into SQL, or a [`Filter::Custom`]
//! closure that can only run in memory. Both kinds mix freely; every filter
//! can be evaluated against a loaded entity with [`Filter::matches`].

use std::fmt;
use std::sync::Arc;

use villa_core::types::DbId;

use super::Entity;

/// A scalar column value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Text(String),
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(i64::from(v))
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

pub enum Filter<T> {
    /// Matches every row.
    All,
    /// Exact column equality.
    Eq(&'static str, FieldValue),
    /// Case-insensitive text equality (`LOWER(col) = LOWER(value)`).
    EqIgnoreCase(&'static str, String),
    /// Every inner filter must match. An empty list matches everything.
    And(Vec<Filter<T>>),
    /// Arbitrary predicate, evaluated in memory only.
    Custom(Predicate<T>),
}

impl<T: Entity> Filter<T> {
    /// Match the row whose identity is `id`.
    pub fn id(id: DbId) -> Self {
        Filter::Eq(T::ID_COLUMN, FieldValue::Int(id))
    }

    pub fn eq(column: &'static str, value: impl Into<FieldValue>) -> Self {
        Filter::Eq(column, value.into())
    }

    pub fn eq_ignore_case(column: &'static str, value: impl Into<String>) -> Self {
        Filter::EqIgnoreCase(column, value.into())
    }

    pub fn custom(predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Filter::Custom(Arc::new(predicate))
    }

    /// Combine with `other`, flattening nested conjunctions.
    pub fn and(self, other: Filter<T>) -> Self {
        let mut parts = match self {
            Filter::And(parts) => parts,
            Filter::All => Vec::new(),
            single => vec![single],
        };
        match other {
            Filter::And(more) => parts.extend(more),
            Filter::All => {}
            single => parts.push(single),
        }
        Filter::And(parts)
    }

    /// Evaluate the filter against a loaded entity.
    pub fn matches(&self, entity: &T) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq(column, expected) => entity.field(column).as_ref() == Some(expected),
            Filter::EqIgnoreCase(column, expected) => match entity.field(column) {
                Some(FieldValue::Text(actual)) => actual.to_lowercase() == expected.to_lowercase(),
                _ => false,
            },
            Filter::And(parts) => parts.iter().all(|f| f.matches(entity)),
            Filter::Custom(predicate) => predicate(entity),
        }
    }

    /// `true` when some part of the filter is a [`Filter::Custom`] closure.
    pub fn has_custom(&self) -> bool {
        match self {
            Filter::Custom(_) => true,
            Filter::And(parts) => parts.iter().any(Filter::has_custom),
            _ => false,
        }
    }
}

impl<T> Clone for Filter<T> {
    fn clone(&self) -> Self {
        match self {
            Filter::All => Filter::All,
            Filter::Eq(c, v) => Filter::Eq(*c, v.clone()),
            Filter::EqIgnoreCase(c, v) => Filter::EqIgnoreCase(*c, v.clone()),
            Filter::And(parts) => Filter::And(parts.clone()),
            Filter::Custom(p) => Filter::Custom(Arc::clone(p)),
        }
    }
}

impl<T> fmt::Debug for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => f.write_str("All"),
            Filter::Eq(c, v) => f.debug_tuple("Eq").field(c).field(v).finish(),
            Filter::EqIgnoreCase(c, v) => f.debug_tuple("EqIgnoreCase").field(c).field(v).finish(),
            Filter::And(parts) => f.debug_tuple("And").field(parts).finish(),
            Filter::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
