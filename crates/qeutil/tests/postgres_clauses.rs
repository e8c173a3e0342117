#![cfg(feature = "pool")]

use qeutil::prelude::*;
use qeutil::{ensure_exists, exists};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Order {
    id: i64,
    user_id: i64,
    status: String,
}

impl FromRow for Order {
    fn from_row(row: &tokio_postgres::Row) -> QeResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            user_id: row.try_get_column("user_id")?,
            status: row.try_get_column("status")?,
        })
    }
}

fn unique_table() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before UNIX_EPOCH")
        .as_nanos();
    format!("qeutil_orders_{}_{}", std::process::id(), nanos)
}

#[tokio::test]
async fn clauses_round_trip_through_postgres() -> QeResult<()> {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(v) => v,
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping clauses_round_trip_through_postgres");
            return Ok(());
        }
    };

    let pool = qeutil::create_pool(&database_url)?;
    let client = pool.get().await?;
    let table = unique_table();

    client
        .execute(
            &format!("CREATE TEMP TABLE {table} (id BIGINT PRIMARY KEY, user_id BIGINT NOT NULL, status TEXT NOT NULL)"),
            &[],
        )
        .await?;

    for (id, user_id, status) in [(1_i64, 7_i64, "open"), (2, 7, "closed"), (3, 8, "open")] {
        let inserted = InsertClause::new(table.as_str())
            .value("id", id)
            .value("user_id", user_id)
            .value("status", status)
            .execute_checked(&client)
            .await?;
        assert_eq!(inserted, 1);
    }

    let by_user = SelectClause::new(table.as_str())
        .columns(["id", "user_id", "status"])
        .filter(Predicate::eq("user_id", 7)?)
        .order_by(["id"]);
    let rows: Vec<Order> = by_user.fetch_all(&client).await?;
    assert_eq!(rows.iter().map(|o| o.id).collect::<Vec<_>>(), vec![1, 2]);

    let open = SelectClause::new(table.as_str())
        .columns(["id", "user_id", "status"])
        .filter(Predicate::in_list("id", [1_i64, 3])?)
        .filter(Predicate::like("status", "op%")?);
    let rows: Vec<Order> = open.fetch_all(&client).await?;
    assert_eq!(rows.len(), 2);

    assert!(exists(&client, &table, &[Predicate::eq("status", "closed")?]).await?);
    assert!(!exists(&client, &table, &[Predicate::gt("user_id", 100)?]).await?);
    let err = ensure_exists(&client, &table, &[Predicate::eq("id", 99)?])
        .await
        .unwrap_err();
    assert!(err.is_not_exist());

    // Read-through cache: the second read is served from the cache.
    let cache = CacheClient::new(MemoryStore::new());
    let ttl = Some(Duration::from_secs(60));
    let first: Vec<Order> = by_user.fetch_cached(&client, &cache, ttl).await?;
    assert_eq!(cache.store().len().await, 1);
    let second: Vec<Order> = by_user.fetch_cached(&client, &cache, ttl).await?;
    assert_eq!(first, second);

    let updated = UpdateClause::new(table.as_str())
        .set("status", "archived")
        .filter(Predicate::eq("user_id", 7)?)
        .execute_invalidate(&client, &cache)
        .await?;
    assert_eq!(updated, 2);
    assert!(cache.store().is_empty().await);

    let none = UpdateClause::new(table.as_str())
        .set("status", "x")
        .filter(Predicate::eq("id", 99)?)
        .execute_checked(&client)
        .await
        .unwrap_err();
    assert!(none.is_not_changed());

    let deleted = DeleteClause::new(table.as_str())
        .filter(Predicate::ne("status", "archived")?)
        .execute(&client)
        .await?;
    assert_eq!(deleted, 1);

    Ok(())
}
