//! DELETE clause.

use super::{Clause, Mutation, predicate_patterns, push_predicates, require_table};
use crate::error::{QeError, QeResult};
use crate::predicate::Predicate;
use crate::sql::{PlaceholderFormat, Rendered, sql};

/// A DELETE filtered by a predicate conjunction.
///
/// A DELETE without predicates fails to render unless `allow_all` is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteClause {
    /// Target table
    pub from: String,
    pub predicates: Vec<Predicate>,
    /// Permit rendering with no predicates (deletes every row).
    pub allow_all: bool,
}

impl DeleteClause {
    /// Create a DELETE from `table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            from: table.into(),
            ..Self::default()
        }
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

    /// Allow a DELETE with no predicates.
    pub fn allow_all(mut self, allow: bool) -> Self {
        self.allow_all = allow;
        self
    }
}

impl Clause for DeleteClause {
    fn render_with(&self, format: PlaceholderFormat) -> QeResult<Rendered> {
        require_table(&self.from, "delete")?;
        if self.predicates.is_empty() && !self.allow_all {
            return Err(QeError::render(format!(
                "delete from '{}' has no predicates; set allow_all to delete every row",
                self.from
            )));
        }

        let mut q = sql(format!("DELETE FROM {}", self.from));
        push_predicates(&mut q, &self.predicates)?;

        Ok(q.build(format))
    }

    fn table(&self) -> &str {
        &self.from
    }
}

impl Mutation for DeleteClause {
    fn invalidation_patterns(&self) -> Vec<String> {
        predicate_patterns(&self.from, &self.predicates)
    }
}
