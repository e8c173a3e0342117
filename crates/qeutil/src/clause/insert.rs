//! INSERT clause.

use super::{Clause, Mutation, checked_columns, require_table};
use crate::error::{QeError, QeResult};
use crate::predicate::{escape_key_part, escape_pattern};
use crate::sql::{PlaceholderFormat, Rendered, sql};
use crate::value::Value;

/// An INSERT of one row.
///
/// Columns are rendered in the order they were added, so identical clauses
/// always produce identical SQL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertClause {
    /// Target table
    pub into: String,
    /// `(column, value)` pairs; column names must be unique
    pub values: Vec<(String, Value)>,
}

impl InsertClause {
    /// Create an INSERT into `table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            into: table.into(),
            values: Vec::new(),
        }
    }

    /// Add a column value.
    pub fn value(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.push((column.into(), value.into()));
        self
    }
}

impl Clause for InsertClause {
    fn render_with(&self, format: PlaceholderFormat) -> QeResult<Rendered> {
        require_table(&self.into, "insert")?;
        if self.values.is_empty() {
            return Err(QeError::render(
                "insert statements must have at least one set of values",
            ));
        }
        let columns = checked_columns(&self.values, "insert")?;

        let mut q = sql(format!(
            "INSERT INTO {} ({}) VALUES (",
            self.into,
            columns.join(",")
        ));
        q.push_bind_list(self.values.iter().map(|(_, v)| v.clone()));
        q.push(")");

        Ok(q.build(format))
    }

    fn table(&self) -> &str {
        &self.into
    }
}

impl Mutation for InsertClause {
    /// A new row can enter any cached result set of the table, so every key of
    /// the table is covered.
    fn invalidation_patterns(&self) -> Vec<String> {
        let table = escape_pattern(&escape_key_part(&self.into)).to_lowercase();
        vec![table.clone(), format!("{table}:*")]
    }
}
