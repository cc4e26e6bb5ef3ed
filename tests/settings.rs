use persisql::{ConnectionSettings, Dsn, Engine, Outcome, RawSql};

#[test]
fn inline_settings() {
    let settings: ConnectionSettings = r#"
        [connection]
        dsn = "sqlite::memory:"
        username = "app"
        password = "secret"
    "#
    .parse()
    .unwrap();
    assert_eq!(settings.username, "app");
    assert_eq!(settings.dsn().unwrap(), Dsn::SqliteMemory);
}

#[test]
fn missing_connection_table() {
    let err = "docs = \"https://docs.example/persisql\""
        .parse::<ConnectionSettings>()
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Config error: 'connection' config is missing, please check the docs: https://docs.example/persisql#connection"
    );
}

#[test]
fn missing_key_names_the_key() {
    let err = r#"
        [connection]
        dsn = "sqlite::memory:"
        username = "app"
    "#
    .parse::<ConnectionSettings>()
    .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("no 'password' value set in connection config"), "{message}");
    assert!(message.ends_with("#connection"), "{message}");
}

#[test]
fn unsupported_driver_fails_to_connect() {
    let settings: ConnectionSettings = r#"
        [connection]
        dsn = "pgsql:host=localhost"
        username = "app"
        password = "secret"
    "#
    .parse()
    .unwrap();
    assert!(Engine::connect(&settings).is_err());
}

#[test]
fn load_from_file_and_connect() {
    let dir = std::env::temp_dir().join(format!("persisql-settings-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let database = dir.join("app.db");
    let config = dir.join("persisql.toml");
    std::fs::write(
        &config,
        format!(
            "[connection]\ndsn = \"sqlite:{}\"\nusername = \"app\"\npassword = \"secret\"\n",
            database.display()
        ),
    )
    .unwrap();

    let settings = ConnectionSettings::load(config.to_str().unwrap()).unwrap();
    let engine = Engine::connect(&settings).unwrap();
    engine
        .gateway()
        .connection()
        .execute_batch("create table if not exists notes (noteId integer primary key, body text);
                        delete from notes;
                        insert into notes (body) values ('hello');")
        .unwrap();
    let outcome = engine
        .get_all_base(&RawSql::trusted("select noteId, body from notes;"), false)
        .unwrap();
    match outcome {
        Outcome::Executed(Some(records)) => assert_eq!(records["1"]["body"], "hello"),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert!(database.exists());

    drop(engine);
    std::fs::remove_dir_all(&dir).unwrap();
}
