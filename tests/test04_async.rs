#![cfg(feature = "sqlite")]

use sql_wrapper::prelude::*;
use sql_wrapper::schema::create_table_sql;
use tokio::runtime::Handle;

fn config(dir: &tempfile::TempDir) -> DatabaseConfig {
    Database::configure()
        .backend(Backend::Sqlite)
        .name(dir.path().join("async.db").display().to_string())
}

fn events() -> TableSchema {
    TableSchema::new("events")
        .column(Column::builder("id", ColumnType::Integer).not_null().build())
        .column(Column::builder("kind", ColumnType::Varchar).type_data(["16"]).unwrap().build())
        .option("PRIMARY KEY (id)")
}

async fn create_events(db: &Database) {
    Statement::raw(create_table_sql(&events()))
        .execute_update_async(db)
        .await
        .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn async_paths_on_the_default_worker_pool() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = Database::new();
    db.connect(config(&dir)).unwrap();
    create_events(&db).await;

    let inserted = Statement::new()
        .insert_into(&events())
        .values(2)
        .replacements(params![1, "login"])
        .execute_update_async(&db)
        .await
        .unwrap();
    assert_eq!(inserted, 1);

    let kinds = Statement::new()
        .select_from(&events(), &["kind"])
        .execute_query_async(&db, |cursor| {
            let mut kinds = Vec::new();
            while cursor.next()? {
                kinds.push(cursor.get_string("kind")?);
            }
            Ok(kinds)
        })
        .await
        .unwrap();
    assert_eq!(kinds, vec!["login".to_string()]);

    let conn = db.get_connection_async().await.unwrap();
    assert_eq!(conn.backend(), Backend::Sqlite);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn propagate_policy_surfaces_statement_errors() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = Database::new();
    db.connect(config(&dir).worker_pool(Handle::current())).unwrap();

    let err = Statement::raw("INSERT INTO nowhere VALUES (1)")
        .execute_update_async(&db)
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::StatementExecution { .. }));

    let err = Statement::raw("SELECT * FROM nowhere")
        .execute_query_async(&db, |cursor| cursor.next())
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::StatementExecution { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn log_and_default_policy_resolves_to_defaults() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let dir = tempfile::tempdir().unwrap();
    let mut db = Database::new();
    db.connect(
        config(&dir)
            .worker_pool(Handle::current())
            .async_failure_policy(AsyncFailurePolicy::LogAndDefault),
    )
    .unwrap();

    let changed = Statement::raw("DELETE FROM nowhere")
        .execute_update_async(&db)
        .await
        .unwrap();
    assert_eq!(changed, 0);

    let rows: Vec<String> = Statement::raw("SELECT kind FROM nowhere")
        .execute_query_async(&db, |cursor| {
            let mut rows = Vec::new();
            while cursor.next()? {
                rows.push(cursor.get_string("kind")?);
            }
            Ok(rows)
        })
        .await
        .unwrap();
    assert!(rows.is_empty());

    // consumer failures are masked too
    let count = Statement::raw("SELECT 1 AS one")
        .execute_query_async(&db, |cursor| {
            cursor.next()?;
            cursor.get_i64("absent")
        })
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn waiting_from_blocking_code() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = Database::new();
    db.connect(config(&dir)).unwrap();
    db.create_table(&events()).unwrap();

    let pending = Statement::new()
        .insert_into(&events())
        .values_literal("(1, 'a'), (2, 'b')")
        .execute_update_async(&db);
    assert_eq!(pending.wait().unwrap(), 2);

    let total = Statement::new()
        .select_from(&events(), &["COUNT(*) AS total"])
        .execute_query_async(&db, |cursor| {
            cursor.next()?;
            cursor.get_i64("total")
        })
        .wait()
        .unwrap();
    assert_eq!(total, 2);
}

#[test]
fn not_connected_resolves_immediately() {
    let db = Database::new();
    let pending = Statement::raw("SELECT 1").execute_update_async(&db);
    assert!(pending.is_finished());
    assert!(matches!(pending.wait(), Err(DatabaseError::NotConnected)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn blocking_calls_inside_a_multi_thread_task_hand_off_the_worker() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = Database::new();
    db.connect(config(&dir)).unwrap();
    db.create_table(&events()).unwrap();
    let inserted = Statement::raw("INSERT INTO events VALUES (1, 'sync')")
        .execute_update(&db)
        .unwrap();
    assert_eq!(inserted, 1);
    let pending = Statement::raw("DELETE FROM events").execute_update_async(&db);
    assert_eq!(pending.wait().unwrap(), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn blocking_calls_inside_a_current_thread_task_are_refused() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = Database::new();
    db.connect(config(&dir)).unwrap();
    let err = Statement::raw("SELECT 1").execute_update(&db).unwrap_err();
    assert!(matches!(err, DatabaseError::Validation(_)));
    assert!(matches!(db.get_connection(), Err(DatabaseError::Validation(_))));
    let waited = Statement::raw("SELECT 1").execute_update_async(&db).wait();
    assert!(matches!(waited, Err(DatabaseError::Validation(_))));

    // the async forms still work from here
    let changed = Statement::raw("CREATE TABLE t (n INTEGER)")
        .execute_update_async(&db)
        .await
        .unwrap();
    assert_eq!(changed, 0);

    let err = db.connect(config(&dir)).unwrap_err();
    assert!(matches!(err, DatabaseError::AlreadyConnected));
}

#[tokio::test(flavor = "current_thread")]
async fn current_thread_worker_handles_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = Database::new();
    let err = db.connect(config(&dir).worker_pool(Handle::current())).unwrap_err();
    assert!(matches!(err, DatabaseError::Validation(_)));
}
