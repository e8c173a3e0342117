//! UPDATE clause.

use super::{Clause, Mutation, checked_columns, predicate_patterns, push_predicates, require_table};
use crate::error::{QeError, QeResult};
use crate::predicate::Predicate;
use crate::sql::{PlaceholderFormat, Rendered, sql};
use crate::value::Value;

/// An UPDATE: ordered assignments followed by a predicate conjunction.
///
/// Bound parameters come out assignment values first, then predicate values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateClause {
    /// Target table
    pub table: String,
    /// `(column, new value)` pairs; column names must be unique
    pub set: Vec<(String, Value)>,
    pub predicates: Vec<Predicate>,
}

impl UpdateClause {
    /// Create an UPDATE of `table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    /// Add an assignment.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set.push((column.into(), value.into()));
        self
    }

    /// Append a predicate.
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Append several predicates.
    pub fn filters(mut self, predicates: impl IntoIterator<Item = Predicate>) -> Self {
        self.predicates.extend(predicates);
        self
    }
}

impl Clause for UpdateClause {
    fn render_with(&self, format: PlaceholderFormat) -> QeResult<Rendered> {
        require_table(&self.table, "update")?;
        if self.set.is_empty() {
            return Err(QeError::render(
                "update statements must have at least one Set clause",
            ));
        }
        let columns = checked_columns(&self.set, "update")?;

        let mut q = sql(format!("UPDATE {} SET ", self.table));
        for (i, (column, (_, value))) in columns.iter().zip(&self.set).enumerate() {
            if i > 0 {
                q.push(", ");
            }
            q.push(column).push(" = ").push_bind(value.clone());
        }
        push_predicates(&mut q, &self.predicates)?;

        Ok(q.build(format))
    }

    fn table(&self) -> &str {
        &self.table
    }
}

impl Mutation for UpdateClause {
    fn invalidation_patterns(&self) -> Vec<String> {
        predicate_patterns(&self.table, &self.predicates)
    }
}
