//! Migration tests

use serial_test::serial;

use crate::common::{run_migrations, TestDatabase};

#[tokio::test]
#[serial]
async fn test_migrations_are_repeatable() {
    let Some(db) = TestDatabase::connect().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    let result = run_migrations(db.pool()).await;
    assert!(result.is_ok(), "Migrations should run again without changes");
}

#[tokio::test]
#[serial]
async fn test_tables_exist() {
    let Some(db) = TestDatabase::connect().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    for table in ["listings", "conversations", "messages"] {
        let result = sqlx::query(&format!("SELECT 1 FROM {} LIMIT 1", table))
            .execute(db.pool())
            .await;
        assert!(result.is_ok(), "{} table should exist", table);
    }
}
