//! Statement clauses built from [`Predicate`] lists.
//!
//! Each clause is a plain value object owned by the caller. Rendering never
//! mutates it, so the same clause can be rendered, fingerprinted and executed
//! from any number of tasks.
//!
//! # Usage
//!
//! ```ignore
//! use qeutil::{Clause, Predicate, SelectClause};
//!
//! let sc = SelectClause::new("table")
//!     .columns(["id"])
//!     .filter(Predicate::in_list("in_comp", ["hello", "world", "!"])?)
//!     .filter(Predicate::gt("gt_comp", 1)?)
//!     .limit(10);
//!
//! let rendered = sc.render()?;
//! // SELECT id FROM table WHERE in_comp IN (?,?,?) AND gt_comp > ? LIMIT 10
//!
//! let key = sc.cache_key()?;
//! // table:where:in_comp=[hello,world,!]&gt_comp>1:lim:10
//! ```

mod delete;
mod insert;
mod select;
mod update;

pub use delete::DeleteClause;
pub use insert::InsertClause;
pub use select::SelectClause;
pub use update::UpdateClause;

use crate::cache::{CacheClient, CacheStore, Codec};
use crate::client::GenericClient;
use crate::condition::Condition;
use crate::error::{QeError, QeResult};
use crate::ident::Ident;
use crate::predicate::Predicate;
use crate::row::FromRow;
use crate::sql::{PlaceholderFormat, Rendered, Sql};
use crate::value::Value;
use std::collections::HashSet;

/// Base trait for all clauses: rendering plus row-returning execution.
pub trait Clause: Sync {
    /// Render with an explicit placeholder format.
    fn render_with(&self, format: PlaceholderFormat) -> QeResult<Rendered>;

    /// Render with `?` placeholders.
    fn render(&self) -> QeResult<Rendered> {
        self.render_with(PlaceholderFormat::Question)
    }

    /// The target table.
    fn table(&self) -> &str;

    /// Execute and map all returned rows to `T`.
    fn fetch_all<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = QeResult<Vec<T>>> + Send {
        async move {
            let rendered = self.render_with(PlaceholderFormat::Dollar)?;
            log_statement(&rendered);
            let rows = conn.query(&rendered.sql, &rendered.params_ref()).await?;
            rows.iter().map(T::from_row).collect()
        }
    }
}

/// Clauses that modify rows (INSERT/UPDATE/DELETE).
pub trait Mutation: Clause {
    /// Cache-key patterns covering every cached read this mutation may affect.
    fn invalidation_patterns(&self) -> Vec<String>;

    /// Execute and return the affected row count.
    fn execute(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = QeResult<u64>> + Send {
        async move {
            let rendered = self.render_with(PlaceholderFormat::Dollar)?;
            log_statement(&rendered);
            conn.execute(&rendered.sql, &rendered.params_ref()).await
        }
    }

    /// Execute and fail with [`QeError::NotChanged`] when no row was affected.
    fn execute_checked(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = QeResult<u64>> + Send {
        async move {
            match self.execute(conn).await? {
                0 => Err(QeError::NotChanged),
                n => Ok(n),
            }
        }
    }

    /// Execute, then unlink cached reads matching [`Mutation::invalidation_patterns`]
    /// if any row was affected.
    fn execute_invalidate<S, C>(
        &self,
        conn: &impl GenericClient,
        cache: &CacheClient<S, C>,
    ) -> impl std::future::Future<Output = QeResult<u64>> + Send
    where
        S: CacheStore,
        C: Codec,
    {
        async move {
            let affected = self.execute(conn).await?;
            if affected > 0 {
                cache.unlink_keys(&self.invalidation_patterns()).await?;
            }
            Ok(affected)
        }
    }
}

fn log_statement(rendered: &Rendered) {
    tracing::debug!(
        target: "qeutil.sql",
        sql = %rendered.sql,
        param_count = rendered.params.len(),
        "executing statement"
    );
}

fn require_table(table: &str, verb: &str) -> QeResult<()> {
    if table.trim().is_empty() {
        return Err(QeError::render(format!("{verb} statements must specify a table")));
    }
    Ok(())
}

/// Append ` WHERE p1 AND p2 ...` in list order.
fn push_predicates(sql: &mut Sql, predicates: &[Predicate]) -> QeResult<()> {
    let conditions: Vec<Condition> = predicates.iter().map(Predicate::to_condition).collect();
    sql.push_where_and(&conditions)?;
    Ok(())
}

fn predicate_patterns(table: &str, predicates: &[Predicate]) -> Vec<String> {
    predicates
        .iter()
        .map(|p| p.invalidation_pattern(table))
        .collect()
}

/// Validate `(column, value)` pairs and return the rendered column names.
fn checked_columns(pairs: &[(String, Value)], verb: &str) -> QeResult<Vec<String>> {
    let mut seen = HashSet::with_capacity(pairs.len());
    let mut columns = Vec::with_capacity(pairs.len());
    for (column, _) in pairs {
        let ident = Ident::parse(column)?.to_sql();
        if !seen.insert(ident.clone()) {
            return Err(QeError::render(format!(
                "{verb} statement sets column '{ident}' more than once"
            )));
        }
        columns.push(ident);
    }
    Ok(columns)
}
