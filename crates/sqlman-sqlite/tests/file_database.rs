//! Integration tests against a file-backed database.

use indexmap::IndexMap;
use sqlman_core::builder::{Delete, Generator, Insert, Select, Update, Upsert};
use sqlman_core::migrations::{ColumnSpec, CreateTable};
use sqlman_sqlite::{Database, Error, Introspector, IntrospectorConfig};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::Row;

async fn open_temp() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db = Database::open(dir.path().join("test.db"))
        .await
        .expect("Failed to open database");
    (dir, db)
}

fn counters_table() -> CreateTable {
    CreateTable::new("counters")
        .column("key", ColumnSpec::new("TEXT").not_null().primary_key(1))
        .column("hits", ColumnSpec::new("INTEGER").not_null().default_value(0))
        .without_rowid()
}

#[tokio::test]
async fn upsert_increments_existing_row() {
    let (_dir, db) = open_temp().await;
    let g = Generator::sqlite();
    db.execute(&g.create_table(&counters_table()).unwrap())
        .await
        .unwrap();

    let insert = Insert::new("counters")
        .value("key", "home")
        .value("hits", 1)
        .on_conflict(
            Upsert::new()
                .target("key")
                .set_sql(g.name("hits").raw("=").name("hits").raw("+").value(g.excluded("hits"))),
        );
    for _ in 0..3 {
        db.execute(&g.insert(&insert).unwrap()).await.unwrap();
    }

    let select = Select::new().column("hits").from("counters").where_eq("key", "home");
    let rows = db.fetch_all(&g.select(&select).unwrap()).await.unwrap();
    assert_eq!(rows[0].get::<i64, _>("hits"), 3);
}

#[tokio::test]
async fn update_and_delete_report_affected_rows() {
    let (_dir, db) = open_temp().await;
    let g = Generator::sqlite();
    db.execute(&g.create_table(&counters_table()).unwrap())
        .await
        .unwrap();
    for key in ["a", "b", "c"] {
        db.execute(&g.insert(&Insert::new("counters").value("key", key)).unwrap())
            .await
            .unwrap();
    }

    let update = Update::table("counters")
        .set("hits", 10)
        .where_sql(g.name("key").in_list(["a", "b"]));
    assert_eq!(db.execute(&g.update(&update).unwrap()).await.unwrap(), 2);

    let delete = Delete::from("counters").where_eq("hits", 0);
    assert_eq!(db.execute(&g.delete(&delete).unwrap()).await.unwrap(), 1);
}

#[tokio::test]
async fn diff_then_apply_statements() {
    let (_dir, db) = open_temp().await;
    let g = Generator::sqlite();
    let table = CreateTable::new("people")
        .column("id", ColumnSpec::new("INTEGER").primary_key(1))
        .column("name", ColumnSpec::new("TEXT"))
        .column("legacy", ColumnSpec::new("TEXT"));
    db.execute(&g.create_table(&table).unwrap()).await.unwrap();

    let mut desired = IndexMap::new();
    desired.insert(String::from("id"), ColumnSpec::new("INTEGER").primary_key(1));
    desired.insert(String::from("name"), ColumnSpec::new("TEXT"));
    desired.insert(String::from("age"), ColumnSpec::new("INTEGER").default_value(0));

    let introspector = Introspector::new(db.clone());
    let diff = introspector.column_diff("people", &desired).await.unwrap();
    assert_eq!(diff.drop.keys().collect::<Vec<_>>(), ["legacy"]);
    for statement in diff.to_statements(&g, "people").unwrap() {
        db.execute(&statement).await.unwrap();
    }

    let after = introspector.column_diff("people", &desired).await.unwrap();
    assert!(after.is_empty(), "{after:?}");
}

#[tokio::test]
async fn attached_schema_is_introspected() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    // ATTACH only affects the connection that ran it.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(
            SqliteConnectOptions::new()
                .filename(dir.path().join("main.db"))
                .create_if_missing(true),
        )
        .await
        .unwrap();
    let db = Database::new(pool);
    let g = Generator::sqlite();

    let other = dir.path().join("other.db");
    db.execute(&g.attach_database(&other.to_string_lossy(), "aux"))
        .await
        .unwrap();
    db.execute(&g.raw("CREATE TABLE aux.things (id INTEGER)"))
        .await
        .unwrap();

    assert!(Introspector::new(db.clone()).table_list().await.unwrap().is_empty());

    let config = IntrospectorConfig::default().schema("aux");
    let introspector = Introspector::with_config(db.clone(), &config);
    assert_eq!(introspector.table_list().await.unwrap(), ["things"]);
    assert_eq!(introspector.table_info("things").await.unwrap().len(), 1);
    let databases = introspector.database_list().await.unwrap();
    assert!(databases.iter().any(|entry| entry.name == "aux"));

    assert!(matches!(
        introspector.table_info("ghost").await,
        Err(Error::TableNotFound(_))
    ));
    db.execute(&g.detach_database("aux")).await.unwrap();
    assert!(matches!(
        introspector.table_info("things").await,
        Err(Error::Database(_))
    ));
}
