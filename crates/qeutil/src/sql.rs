//! Parameterized SQL assembly.
//!
//! `Sql` stores SQL pieces and bound values separately and only decides on the
//! placeholder syntax when rendered: `?` for MySQL-style consumers (the default)
//! or `$1, $2, ...` for PostgreSQL.
//!
//! # Example
//!
//! ```ignore
//! use qeutil::{PlaceholderFormat, sql};
//!
//! let mut q = sql("SELECT * FROM users WHERE status = ");
//! q.push_bind("active").push(" AND age > ").push_bind(18);
//!
//! assert_eq!(q.to_sql(PlaceholderFormat::Question), "SELECT * FROM users WHERE status = ? AND age > ?");
//! assert_eq!(q.to_sql(PlaceholderFormat::Dollar), "SELECT * FROM users WHERE status = $1 AND age > $2");
//! ```

use crate::condition::{CompareOp, Condition};
use crate::error::{QeError, QeResult};
use crate::value::Value;
use std::fmt::Write;
use tokio_postgres::types::ToSql;

/// Placeholder syntax used when rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaceholderFormat {
    /// `?` for every parameter.
    #[default]
    Question,
    /// `$1, $2, ...` (PostgreSQL).
    Dollar,
}

#[derive(Debug, Clone)]
enum SqlPart {
    Raw(String),
    Param,
}

/// A SQL-first, parameter-safe statement builder.
#[derive(Debug, Clone, Default)]
pub struct Sql {
    parts: Vec<SqlPart>,
    params: Vec<Value>,
}

/// Start building a SQL statement.
pub fn sql(initial_sql: impl Into<String>) -> Sql {
    Sql::new(initial_sql)
}

/// SQL text plus its bound parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Rendered {
    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
    }
}

impl Sql {
    /// Create a new builder with an initial SQL fragment.
    pub fn new(initial_sql: impl Into<String>) -> Self {
        let initial: String = initial_sql.into();
        let mut s = Self::empty();
        s.push(&initial);
        s
    }

    /// Create an empty builder.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Append raw SQL (no parameters).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }

        match self.parts.last_mut() {
            Some(SqlPart::Raw(last)) => last.push_str(sql),
            _ => self.parts.push(SqlPart::Raw(sql.to_string())),
        }
        self
    }

    /// Append a placeholder and bind its value.
    pub fn push_bind(&mut self, value: impl Into<Value>) -> &mut Self {
        self.parts.push(SqlPart::Param);
        self.params.push(value.into());
        self
    }

    /// Append a comma-separated list of placeholders (`?,?,?`) and bind all values.
    pub fn push_bind_list<I>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        for (i, v) in values.into_iter().enumerate() {
            if i > 0 {
                self.push(",");
            }
            self.push_bind(v);
        }
        self
    }

    /// Append a [`Condition`] with its values bound.
    pub fn push_condition(&mut self, cond: &Condition) -> QeResult<&mut Self> {
        match cond {
            Condition::Eq { column, value } if value.is_null() => {
                self.push(column).push(" IS NULL");
            }
            Condition::Eq { column, value } => {
                self.push(column).push(" = ").push_bind(value.clone());
            }
            Condition::In { values, .. } if values.is_empty() => {
                self.push("(1=0)");
            }
            Condition::In { column, values } => {
                self.push(column).push(" IN (");
                self.push_bind_list(values.iter().cloned());
                self.push(")");
            }
            Condition::Compare { column, op, value } if value.is_null() => {
                if *op != CompareOp::Ne {
                    return Err(QeError::render(format!(
                        "cannot use NULL with {} on column '{}'",
                        op.as_sql(),
                        column
                    )));
                }
                self.push(column).push(" IS NOT NULL");
            }
            Condition::Compare { column, op, value } => {
                self.push(column)
                    .push(" ")
                    .push(op.as_sql())
                    .push(" ")
                    .push_bind(value.clone());
            }
            Condition::Like { column, pattern } => {
                if pattern.is_null() {
                    return Err(QeError::render(format!(
                        "cannot use NULL with LIKE on column '{column}'"
                    )));
                }
                self.push(column).push(" LIKE ").push_bind(pattern.clone());
            }
        }
        Ok(self)
    }

    /// Append multiple [`Condition`]s joined by `AND`.
    pub fn push_conditions_and(&mut self, conditions: &[Condition]) -> QeResult<&mut Self> {
        for (i, cond) in conditions.iter().enumerate() {
            if i > 0 {
                self.push(" AND ");
            }
            self.push_condition(cond)?;
        }
        Ok(self)
    }

    /// Append a ` WHERE ...` clause composed of [`Condition`]s joined by `AND`.
    ///
    /// If `conditions` is empty, this is a no-op.
    pub fn push_where_and(&mut self, conditions: &[Condition]) -> QeResult<&mut Self> {
        if conditions.is_empty() {
            return Ok(self);
        }
        self.push(" WHERE ");
        self.push_conditions_and(conditions)
    }

    /// Render SQL using the given placeholder format.
    pub fn to_sql(&self, format: PlaceholderFormat) -> String {
        let mut out = String::new();
        let mut idx: usize = 0;

        for part in &self.parts {
            match part {
                SqlPart::Raw(s) => out.push_str(s),
                SqlPart::Param => {
                    idx += 1;
                    match format {
                        PlaceholderFormat::Question => out.push('?'),
                        PlaceholderFormat::Dollar => {
                            let _ = write!(&mut out, "${idx}");
                        }
                    }
                }
            }
        }
        out
    }

    /// Render into SQL text plus owned parameters.
    pub fn build(self, format: PlaceholderFormat) -> Rendered {
        Rendered {
            sql: self.to_sql(format),
            params: self.params,
        }
    }
}
