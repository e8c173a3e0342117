//! # qeutil
//!
//! SQL clause building and cache-key derivation for PostgreSQL backed services.
//!
//! ## Features
//!
//! - **Closed operator set**: predicates are `=`, `>`, `<`, `>=`, `<=`, `<>`,
//!   `like` and `in`; anything else is rejected when the predicate is built
//! - **Parameter-safe rendering**: values are always bound, never inlined
//! - **Placeholder choice**: `?` by default, `$1, $2, ...` for PostgreSQL execution
//! - **Deterministic cache keys**: equal SELECT clauses produce equal keys
//! - **Targeted invalidation**: mutations produce wildcard patterns covering
//!   the cached reads they may affect
//! - **Transaction-friendly**: pass a transaction anywhere a `GenericClient` is expected
//!
//! ## Example
//!
//! ```ignore
//! use qeutil::prelude::*;
//!
//! let sc = SelectClause::new("orders")
//!     .columns(["id", "total"])
//!     .filter(Predicate::eq("user_id", 7)?)
//!     .order_by(["id"])
//!     .limit(20);
//!
//! let rendered = sc.render()?;
//! // SELECT id, total FROM orders WHERE user_id = ? ORDER BY id LIMIT 20
//!
//! let cache = CacheClient::new(MemoryStore::new());
//! let orders: Vec<Order> = sc.fetch_cached(&client, &cache, config.cache_ttl).await?;
//!
//! UpdateClause::new("orders")
//!     .set("total", 0)
//!     .filter(Predicate::eq("user_id", 7)?)
//!     .execute_invalidate(&client, &cache)
//!     .await?;
//! ```

pub mod cache;
pub mod clause;
pub mod client;
pub mod condition;
pub mod config;
pub mod error;
pub mod exec;
pub mod ident;
pub mod predicate;
pub mod prelude;
pub mod row;
pub mod sql;
pub mod value;

pub use cache::{CacheClient, CacheStore, Codec, JsonCodec, MemoryStore};
pub use clause::{Clause, DeleteClause, InsertClause, Mutation, SelectClause, UpdateClause};
pub use client::GenericClient;
pub use condition::{CompareOp, Condition};
pub use config::{QeConfig, env_bool, env_int, env_str, env_str_array};
pub use error::{QeError, QeResult};
pub use exec::{ensure_exists, exists, exists_statement};
pub use ident::Ident;
pub use predicate::{Operand, Operator, Predicate, escape_pattern};
pub use row::{FromRow, RowExt};
pub use sql::{PlaceholderFormat, Rendered, Sql, sql};
pub use value::Value;

#[cfg(feature = "redis")]
pub use cache::RedisStore;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{
    create_pool, create_pool_from_config, create_pool_with_config, create_pool_with_manager_config,
};
