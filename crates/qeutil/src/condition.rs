//! Builder-level predicate fragments.
//!
//! A [`Condition`] is what the [`Sql`](crate::sql::Sql) builder knows how to
//! render: an equality/membership map, a comparison map, or a pattern map over
//! one column. [`Predicate`](crate::Predicate) lowers into these.

use crate::value::Value;

/// Ordering and inequality comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Gt,
    Lt,
    Gte,
    Lte,
    Ne,
}

impl CompareOp {
    /// The SQL operator token.
    pub fn as_sql(self) -> &'static str {
        match self {
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Gte => ">=",
            CompareOp::Lte => "<=",
            CompareOp::Ne => "<>",
        }
    }
}

/// A single-column predicate fragment handed to the SQL builder.
///
/// Rendering rules:
/// - `Eq` renders `col = ?`, or `col IS NULL` for a `NULL` value
/// - `In` renders `col IN (?,?,...)`, or `(1=0)` for an empty list
/// - `Compare(Ne)` against `NULL` renders `col IS NOT NULL`; other comparisons
///   against `NULL` fail to render
/// - `Like` renders `col LIKE ?` and rejects `NULL` patterns
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq {
        column: String,
        value: Value,
    },
    In {
        column: String,
        values: Vec<Value>,
    },
    Compare {
        column: String,
        op: CompareOp,
        value: Value,
    },
    Like {
        column: String,
        pattern: Value,
    },
}
