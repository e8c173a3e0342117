//! SELECT clause with cache-key derivation.

use super::{Clause, predicate_patterns, push_predicates, require_table};
use crate::cache::{CacheClient, CacheStore, Codec};
use crate::client::GenericClient;
use crate::error::{QeError, QeResult};
use crate::predicate::{Predicate, escape_key_part};
use crate::row::FromRow;
use crate::sql::{PlaceholderFormat, Rendered, sql};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// A SELECT over one table: projection, predicates, grouping and paging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectClause {
    /// Projected columns; empty renders `*`.
    pub columns: Vec<String>,
    /// Target table
    pub from: String,
    /// Conjunction of predicates, in order
    pub predicates: Vec<Predicate>,
    pub group_by: Vec<String>,
    /// Raw HAVING expression, emitted verbatim
    pub having: String,
    pub order_by: Vec<String>,
    pub limit: Option<u64>,
    /// Only emitted together with `limit`
    pub offset: Option<u64>,
}

impl SelectClause {
    /// Create a SELECT over `table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            from: table.into(),
            ..Self::default()
        }
    }

    /// Set the projected columns.
    pub fn columns<I, S>(mut self, cols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = cols.into_iter().map(Into::into).collect();
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

    pub fn group_by<I, S>(mut self, cols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by = cols.into_iter().map(Into::into).collect();
        self
    }

    /// Set a raw HAVING expression.
    ///
    /// The text is not escaped or parameterized.
    pub fn having(mut self, expr: impl Into<String>) -> Self {
        self.having = expr.into();
        self
    }

    pub fn order_by<I, S>(mut self, cols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order_by = cols.into_iter().map(Into::into).collect();
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Deterministic cache key for this query, lower-cased.
    ///
    /// Shape: `table[:where:p1&p2...][:grp:g1&g2...][:hav:h][:ord:o1&o2...][:lim:n[:off:m]]`.
    /// Key separators inside the table, predicates, grouping, having and ordering
    /// text are backslash-escaped, so distinct clauses never share a key.
    /// The projection is not part of the key: callers caching different column
    /// sets of the same query must key them apart themselves.
    pub fn cache_key(&self) -> QeResult<String> {
        if self.from.trim().is_empty() {
            return Err(QeError::EmptyTable);
        }
        let mut key = escape_key_part(&self.from);

        if !self.predicates.is_empty() {
            key.push_str(":where:");
            let parts: Vec<String> = self.predicates.iter().map(Predicate::canonical).collect();
            key.push_str(&parts.join("&"));
        }
        if !self.group_by.is_empty() {
            key.push_str(":grp:");
            key.push_str(&escape_key_list(&self.group_by));
        }
        if !self.having.is_empty() {
            key.push_str(":hav:");
            key.push_str(&escape_key_part(&self.having));
        }
        if !self.order_by.is_empty() {
            key.push_str(":ord:");
            key.push_str(&escape_key_list(&self.order_by));
        }
        if let Some(limit) = self.limit {
            key.push_str(&format!(":lim:{limit}"));
            if let Some(offset) = self.offset {
                key.push_str(&format!(":off:{offset}"));
            }
        }

        Ok(key.to_lowercase())
    }

    /// One wildcard pattern per predicate, each matching cached keys of this
    /// table whose where segment contains that predicate.
    pub fn invalidation_patterns(&self) -> Vec<String> {
        predicate_patterns(&self.from, &self.predicates)
    }

    /// Read-through cached fetch keyed by [`SelectClause::cache_key`].
    ///
    /// A hit returns the decoded rows without touching the database. On a miss
    /// the rows are queried and stored with `ttl`. Cache failures are logged and
    /// never fail the read.
    pub async fn fetch_cached<T, G, S, C>(
        &self,
        conn: &G,
        cache: &CacheClient<S, C>,
        ttl: Option<Duration>,
    ) -> QeResult<Vec<T>>
    where
        T: FromRow + Serialize + DeserializeOwned,
        G: GenericClient,
        S: CacheStore,
        C: Codec,
    {
        let key = self.cache_key()?;

        match cache.get::<Vec<T>>(&key).await {
            Ok(Some(rows)) => {
                tracing::debug!(target: "qeutil.cache", key = %key, "cache hit");
                return Ok(rows);
            }
            Ok(None) => tracing::debug!(target: "qeutil.cache", key = %key, "cache miss"),
            Err(e) => {
                tracing::warn!(target: "qeutil.cache", key = %key, error = %e, "cache read failed")
            }
        }

        let rows: Vec<T> = self.fetch_all(conn).await?;
        if let Err(e) = cache.set(&key, &rows, ttl).await {
            tracing::warn!(target: "qeutil.cache", key = %key, error = %e, "cache write failed");
        }
        Ok(rows)
    }
}

impl Clause for SelectClause {
    fn render_with(&self, format: PlaceholderFormat) -> QeResult<Rendered> {
        require_table(&self.from, "select")?;

        let projection = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(", ")
        };
        let mut q = sql(format!("SELECT {} FROM {}", projection, self.from));

        push_predicates(&mut q, &self.predicates)?;

        if !self.group_by.is_empty() {
            q.push(" GROUP BY ").push(&self.group_by.join(", "));
        }
        if !self.having.is_empty() {
            q.push(" HAVING ").push(&self.having);
        }
        if !self.order_by.is_empty() {
            q.push(" ORDER BY ").push(&self.order_by.join(", "));
        }
        if let Some(limit) = self.limit {
            q.push(&format!(" LIMIT {limit}"));
            if let Some(offset) = self.offset {
                q.push(&format!(" OFFSET {offset}"));
            }
        }

        Ok(q.build(format))
    }

    fn table(&self) -> &str {
        &self.from
    }
}

fn escape_key_list(items: &[String]) -> String {
    let parts: Vec<String> = items.iter().map(|s| escape_key_part(s)).collect();
    parts.join("&")
}
