//! Checks that the migrated schema follows the house conventions.

use sqlx::PgPool;

/// Entity tables use bigint ids, lookup tables smallint.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_primary_keys_are_bigint_or_smallint(pool: PgPool) {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT table_name, data_type
         FROM information_schema.columns
         WHERE column_name = 'id'
           AND table_schema = 'public'
           AND table_name != '_sqlx_migrations'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(!rows.is_empty());
    for (table, data_type) in &rows {
        let expected = if table.ends_with("_statuses") || table == "image_generations" {
            "smallint"
        } else {
            "bigint"
        };
        assert_eq!(data_type, expected, "{table}.id");
    }
}

/// Every table carries timestamptz `created_at` / `updated_at`.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_every_table_has_timestamps(pool: PgPool) {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT t.table_name,
                (SELECT COUNT(*)
                 FROM information_schema.columns c
                 WHERE c.table_schema = 'public'
                   AND c.table_name = t.table_name
                   AND c.column_name IN ('created_at', 'updated_at')
                   AND c.data_type = 'timestamp with time zone')
         FROM information_schema.tables t
         WHERE t.table_schema = 'public'
           AND t.table_type = 'BASE TABLE'
           AND t.table_name != '_sqlx_migrations'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    for (table, count) in &rows {
        assert_eq!(*count, 2, "{table} is missing timestamptz created_at/updated_at");
    }
}

/// Every foreign key column has an index of its own and an explicit rule.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_foreign_keys_are_indexed_with_explicit_rules(pool: PgPool) {
    let fks: Vec<(String, String, String)> = sqlx::query_as(
        "SELECT kcu.table_name, kcu.column_name, rc.delete_rule
         FROM information_schema.referential_constraints rc
         JOIN information_schema.key_column_usage kcu
             ON rc.constraint_name = kcu.constraint_name
             AND rc.constraint_schema = kcu.table_schema
         WHERE rc.constraint_schema = 'public'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(!fks.is_empty());
    for (table, column, delete_rule) in &fks {
        let (indexed,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1 FROM pg_indexes
                WHERE schemaname = 'public'
                  AND tablename = $1
                  AND indexdef LIKE '%(' || $2 || ')%'
            )",
        )
        .bind(table)
        .bind(column)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(indexed, "FK column {table}.{column} has no index");
        assert_ne!(delete_rule, "NO ACTION", "FK {table}.{column} has no ON DELETE rule");
    }
}

/// Unique constraints are named `uq_*`; the API maps violations of those to 409.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unique_constraints_use_uq_prefix(pool: PgPool) {
    let names: Vec<(String,)> = sqlx::query_as(
        "SELECT constraint_name
         FROM information_schema.table_constraints
         WHERE constraint_schema = 'public'
           AND constraint_type = 'UNIQUE'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(names.iter().any(|(n,)| n == "uq_listings_owner_id"));
    for (name,) in &names {
        assert!(name.starts_with("uq_"), "unique constraint {name}");
    }
}
