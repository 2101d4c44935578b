// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Query filters.

use serde_json::Value;

use super::traits::{Document, ID_FIELD};
use crate::id::ObjectId;

/// A predicate over documents.
///
/// # Example
///
/// ```
/// use taskgate_core::store::Filter;
///
/// let filter = Filter::eq("name", "admin");
/// let doc = serde_json::json!({"name": "admin"});
/// assert!(filter.matches(doc.as_object().unwrap()));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Filter {
    /// Matches every document.
    #[default]
    All,
    /// Field equals value. A missing field never matches.
    Eq {
        /// Field name.
        field: String,
        /// Expected value.
        value: Value,
    },
    /// Field equals one of the values.
    In {
        /// Field name.
        field: String,
        /// Accepted values.
        values: Vec<Value>,
    },
    /// All inner filters match.
    And(Vec<Filter>),
}

impl Filter {
    /// Matches every document.
    pub fn all() -> Self {
        Filter::All
    }

    /// Matches documents whose `field` equals `value`.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Matches the document with the given identifier.
    pub fn by_id(id: ObjectId) -> Self {
        Filter::eq(ID_FIELD, id.to_hex())
    }

    /// Matches documents whose identifier is in `ids`.
    pub fn id_in(ids: &[ObjectId]) -> Self {
        Filter::In {
            field: ID_FIELD.to_string(),
            values: ids.iter().map(|id| Value::String(id.to_hex())).collect(),
        }
    }

    /// Combines two filters with logical AND.
    pub fn and(self, other: Filter) -> Self {
        match (self, other) {
            (Filter::All, f) | (f, Filter::All) => f,
            (Filter::And(mut a), Filter::And(b)) => {
                a.extend(b);
                Filter::And(a)
            }
            (Filter::And(mut a), f) => {
                a.push(f);
                Filter::And(a)
            }
            (f, Filter::And(mut b)) => {
                b.insert(0, f);
                Filter::And(b)
            }
            (a, b) => Filter::And(vec![a, b]),
        }
    }

    /// Evaluates the filter against a document.
    pub fn matches(&self, document: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq { field, value } => document.get(field) == Some(value),
            Filter::In { field, values } => document
                .get(field)
                .map(|v| values.contains(v))
                .unwrap_or(false),
            Filter::And(filters) => filters.iter().all(|f| f.matches(document)),
        }
    }
}
