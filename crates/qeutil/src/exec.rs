//! Existence checks.
//!
//! These wrap a predicate conjunction over one table in `SELECT EXISTS (...)`
//! and run it against a [`GenericClient`].

use crate::clause::{Clause, SelectClause};
use crate::client::GenericClient;
use crate::error::{QeError, QeResult};
use crate::predicate::Predicate;
use crate::sql::{PlaceholderFormat, Rendered};

/// Render `SELECT EXISTS (SELECT * FROM table WHERE ...)`.
pub fn exists_statement(
    table: &str,
    predicates: &[Predicate],
    format: PlaceholderFormat,
) -> QeResult<Rendered> {
    let inner = SelectClause::new(table)
        .filters(predicates.iter().cloned())
        .render_with(format)?;
    Ok(Rendered {
        sql: format!("SELECT EXISTS ({})", inner.sql),
        params: inner.params,
    })
}

/// Whether any row of `table` matches every predicate.
///
/// Zero matching rows is `Ok(false)`; database errors propagate unchanged.
pub async fn exists(
    conn: &impl GenericClient,
    table: &str,
    predicates: &[Predicate],
) -> QeResult<bool> {
    let rendered = exists_statement(table, predicates, PlaceholderFormat::Dollar)?;
    tracing::debug!(
        target: "qeutil.sql",
        sql = %rendered.sql,
        param_count = rendered.params.len(),
        "checking existence"
    );
    let row = conn.query_one(&rendered.sql, &rendered.params_ref()).await?;
    row.try_get(0).map_err(|e| QeError::decode("exists", e.to_string()))
}

/// Like [`exists`], but a missing row is [`QeError::NotExist`].
pub async fn ensure_exists(
    conn: &impl GenericClient,
    table: &str,
    predicates: &[Predicate],
) -> QeResult<()> {
    if exists(conn, table, predicates).await? {
        return Ok(());
    }
    let described: Vec<String> = predicates.iter().map(Predicate::canonical).collect();
    Err(QeError::NotExist(format!("{table} where {}", described.join(" and "))))
}
