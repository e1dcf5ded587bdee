use std::time::Duration;

use sql_wrapper::prelude::*;

#[cfg(feature = "postgres")]
fn postgres_config() -> DatabaseConfig {
    // pools are lazy, so no server is contacted
    Database::configure()
        .backend(Backend::Postgres)
        .host("localhost")
        .port(5432)
        .unwrap()
        .name("app")
        .username("app")
        .password("secret")
        .connection_timeout(Duration::from_millis(500))
        .unwrap()
}

#[cfg(feature = "postgres")]
#[test]
fn connect_succeeds_once() {
    let mut db = Database::new();
    db.connect(postgres_config()).unwrap();
    assert!(db.is_connected());
    assert_eq!(db.connection_uri(), Some("postgresql://localhost:5432/app"));

    let err = db.connect(postgres_config()).unwrap_err();
    assert!(matches!(err, DatabaseError::AlreadyConnected));
    db.shutdown().unwrap();
}

#[cfg(feature = "postgres")]
#[test]
fn missing_field_is_reported_then_retry_succeeds() {
    let mut db = Database::new();
    let partial = Database::configure()
        .backend(Backend::Postgres)
        .host("localhost")
        .port(5432)
        .unwrap()
        .name("app")
        .username("app");
    match db.connect(partial.clone()) {
        Err(DatabaseError::IncompleteCredentials { missing }) => assert_eq!(missing, vec!["password"]),
        other => panic!("expected incomplete credentials, got {other:?}"),
    }
    assert!(!db.is_connected());

    db.connect(partial.password("secret")).unwrap();
    assert!(db.is_connected());
}

#[cfg(feature = "postgres")]
#[test]
fn reconnect_after_shutdown_reuses_the_database() {
    let mut db = Database::new();
    db.connect(postgres_config()).unwrap();
    db.shutdown().unwrap();
    db.connect(postgres_config().pool_name("second")).unwrap();
    assert!(db.is_connected());
}

#[test]
fn shutdown_without_connect_is_not_connected() {
    let mut db = Database::new();
    assert!(matches!(db.shutdown(), Err(DatabaseError::NotConnected)));
}

#[cfg(feature = "sqlite")]
#[test]
fn operations_after_shutdown_are_not_connected() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = Database::new();
    db.connect(
        Database::configure()
            .backend(Backend::Sqlite)
            .name(dir.path().join("life.db").display().to_string()),
    )
    .unwrap();
    db.get_connection().unwrap();
    db.shutdown().unwrap();

    assert!(matches!(db.get_connection(), Err(DatabaseError::NotConnected)));
    assert!(matches!(
        Statement::raw("SELECT 1").execute_update(&db),
        Err(DatabaseError::NotConnected)
    ));
    assert!(matches!(
        Statement::raw("SELECT 1").execute_update_async(&db).wait(),
        Err(DatabaseError::NotConnected)
    ));
    assert!(matches!(db.shutdown(), Err(DatabaseError::NotConnected)));
}

#[cfg(feature = "sqlite")]
#[test]
fn verify_on_connect_surfaces_unreachable_databases() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = Database::new();
    let err = db
        .connect(
            Database::configure()
                .backend(Backend::Sqlite)
                .name(dir.path().join("absent.db").display().to_string())
                .with_options(ConnectOptions::new().append("mode", "ro"))
                .connection_timeout(Duration::from_millis(300))
                .unwrap()
                .verify_on_connect(true),
        )
        .unwrap_err();
    assert!(matches!(err, DatabaseError::ConnectionAcquisition { .. }));
    assert!(!db.is_connected());
}

#[test]
fn port_validation_bounds() {
    for bad in [0, 65536, -1] {
        assert!(matches!(
            Database::configure().port(bad),
            Err(DatabaseError::Validation(_))
        ));
    }
    for good in [1, 65535] {
        assert!(Database::configure().port(good).is_ok());
    }
}

#[test]
fn options_trail() {
    let options = ConnectOptions::new().append("ssl", "true").append("tz", "UTC");
    assert_eq!(options.build(), "?ssl=true&tz=UTC");
}

#[cfg(feature = "sqlite")]
#[test]
fn databases_are_independent() {
    let dir = tempfile::tempdir().unwrap();
    let open = |file: &str| {
        let mut db = Database::new();
        db.connect(
            Database::configure()
                .backend(Backend::Sqlite)
                .name(dir.path().join(file).display().to_string()),
        )
        .unwrap();
        db
    };
    let mut first = open("first.db");
    let second = open("second.db");
    assert_ne!(first.connection_uri(), second.connection_uri());

    first.shutdown().unwrap();
    assert!(!first.is_connected());
    let one = Statement::raw("SELECT 1 AS one")
        .execute_query(&second, |cursor| {
            cursor.next()?;
            cursor.get_i32("one")
        })
        .unwrap();
    assert_eq!(one, 1);
}
