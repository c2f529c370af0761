use microblog_core::db::open_configured;
use microblog_core::{
    DatabaseTarget, SqliteUserRepository, StoreConfig, UserRepository, UserService,
};

#[test]
fn config_deserializes_with_defaults() {
    let config: StoreConfig = serde_json::from_str(r#"{"log_level": "warn"}"#).unwrap();
    assert_eq!(config.database, DatabaseTarget::Memory);
    assert_eq!(config.log_level, "warn");
    assert_eq!(config.log_dir, None);

    let config: StoreConfig =
        serde_json::from_str(r#"{"database": {"file": "/data/microblog.db"}}"#).unwrap();
    assert_eq!(
        config.database,
        DatabaseTarget::File("/data/microblog.db".into())
    );
}

#[test]
fn file_target_persists_between_opens() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig {
        database: DatabaseTarget::File(dir.path().join("store.db")),
        ..StoreConfig::default()
    };

    {
        let conn = open_configured(&config).unwrap();
        let service = UserService::new(SqliteUserRepository::try_new(&conn).unwrap());
        service.register("john", "john@example.com").unwrap();
    }

    let conn = open_configured(&config).unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    assert_eq!(repo.count_users().unwrap(), 1);
    assert!(repo.nickname_exists("john").unwrap());
}

#[test]
fn memory_target_starts_empty_each_time() {
    let config = StoreConfig::default();
    {
        let conn = open_configured(&config).unwrap();
        let service = UserService::new(SqliteUserRepository::try_new(&conn).unwrap());
        service.register("john", "john@example.com").unwrap();
    }

    let conn = open_configured(&config).unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    assert_eq!(repo.count_users().unwrap(), 0);
}
