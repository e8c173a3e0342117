//! Convenient imports for typical `qeutil` usage.
//!
//! ```ignore
//! use qeutil::prelude::*;
//! ```

pub use crate::{
    CacheClient, CacheStore, Clause, DeleteClause, FromRow, GenericClient, InsertClause,
    MemoryStore, Mutation, Operand, Operator, PlaceholderFormat, Predicate, QeConfig, QeError,
    QeResult, RowExt, SelectClause, UpdateClause, Value, exists,
};

#[cfg(feature = "pool")]
pub use crate::{create_pool, create_pool_from_config};

#[cfg(feature = "redis")]
pub use crate::RedisStore;
