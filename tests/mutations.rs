use persisql::{
    Conditions, Delete, Engine, Gateway, Ident, Insert, Outcome, PersisqlError, RawSql,
    SimpleCondition, SqlValue, SqliteGateway, Update,
};

fn id(name: &str) -> Ident {
    Ident::trusted(name)
}

fn setup() -> Engine {
    let gateway = SqliteGateway::open_in_memory().unwrap();
    gateway
        .connection()
        .execute_batch(
            "create table users (userId integer primary key, name text not null, nickname text);
             insert into users (userId, name, nickname) values (1, 'Alice', 'ali');
             insert into users (userId, name, nickname) values (2, 'Bob', 'bobby');",
        )
        .unwrap();
    Engine::new(gateway)
}

fn count(engine: &Engine) -> i64 {
    engine
        .gateway()
        .connection()
        .query_row("select count(*) from users", [], |row| row.get(0))
        .unwrap()
}

fn user_is(user: i64) -> Conditions {
    Conditions::list([SimpleCondition::new(id("userId"), user).operator("=")])
}

fn nickname_of(engine: &Engine, user: i64) -> Option<String> {
    engine
        .gateway()
        .connection()
        .query_row("select nickname from users where userId = ?1", [user], |row| row.get(0))
        .unwrap()
}

#[test]
fn update_skips_empty_values() {
    let engine = setup();
    let update = Update::table(id("users"))
        .set(id("name"), "Robert")
        .set(id("nickname"), "")
        .conditions(user_is(2))
        .debug();
    assert_eq!(
        engine.update(&update).unwrap(),
        Outcome::Debug("UPDATE users SET `name` = 'Robert' WHERE users.`userId` = '2';".to_string())
    );
}

#[test]
fn update_changes_matching_rows() {
    let engine = setup();
    let update = Update::table(id("users"))
        .set(id("name"), "Robert")
        .set(id("nickname"), "")
        .conditions(user_is(2));
    assert_eq!(engine.update(&update).unwrap(), Outcome::Executed(true));
    let name: String = engine
        .gateway()
        .connection()
        .query_row("select name from users where userId = 2", [], |row| row.get(0))
        .unwrap();
    assert_eq!(name, "Robert");
    assert_eq!(nickname_of(&engine, 2).as_deref(), Some("bobby"));
    assert_eq!(nickname_of(&engine, 1).as_deref(), Some("ali"));
}

#[test]
fn update_writes_null() {
    let engine = setup();
    let update = Update::table(id("users"))
        .set(id("nickname"), SqlValue::Null)
        .conditions(user_is(1));
    assert!(engine.update(&update).unwrap().executed().unwrap());
    assert_eq!(nickname_of(&engine, 1), None);
}

#[test]
fn update_with_nothing_to_set() {
    let engine = setup();
    let update = Update::table(id("users")).set(id("name"), "").conditions(user_is(1));
    assert!(engine.update(&update).unwrap_err().is_validation());
    assert_eq!(
        engine.update(&update.debug()).unwrap().debug_sql(),
        Some("UPDATE users SET  WHERE users.`userId` = '1';")
    );
}

#[test]
fn insert_returns_generated_id() {
    let engine = setup();
    let insert = Insert::into_table(id("users"))
        .set(id("name"), "Carol")
        .set(id("nickname"), SqlValue::Null);
    assert_eq!(engine.insert(&insert).unwrap(), Outcome::Executed(Some(3)));
    assert_eq!(count(&engine), 3);
    assert_eq!(nickname_of(&engine, 3), None);
    assert!(engine.gateway().connection().is_autocommit());
}

#[test]
fn insert_debug_sql() {
    let engine = setup();
    let insert = Insert::into_table(id("users"))
        .set(id("name"), "O'Hara")
        .set(id("nickname"), SqlValue::Null)
        .debug();
    assert_eq!(
        engine.insert(&insert).unwrap().debug_sql(),
        Some("INSERT INTO users (`name`, `nickname`) VALUES ('O''Hara', NULL);")
    );
    assert_eq!(count(&engine), 2);
}

#[test]
fn refused_insert_commits_nothing() {
    let engine = setup();
    let insert = Insert::into_table(id("users")).set(id("userId"), 1).set(id("name"), "Dup");
    assert_eq!(engine.insert(&insert).unwrap(), Outcome::Executed(None));
    assert_eq!(count(&engine), 2);
    assert!(engine.gateway().connection().is_autocommit());
}

#[test]
fn failing_insert_rolls_back_and_raises() {
    let engine = setup();
    let insert = Insert::into_table(id("users")).set(id("shoeSize"), 44);
    let err = engine.insert(&insert).unwrap_err();
    assert!(matches!(err, PersisqlError::Prepare { .. }), "{err}");
    assert!(engine.gateway().connection().is_autocommit());
    assert_eq!(count(&engine), 2);

    // the connection is usable again afterwards
    let retry = Insert::into_table(id("users")).set(id("name"), "Dana");
    assert_eq!(engine.insert(&retry).unwrap(), Outcome::Executed(Some(3)));
}

#[test]
fn empty_insert_is_rejected() {
    let engine = setup();
    assert!(engine.insert(&Insert::into_table(id("users"))).unwrap_err().is_validation());
}

#[test]
fn delete_removes_matching_rows() {
    let engine = setup();
    let delete = Delete::from_table(id("users"), user_is(1));
    assert_eq!(engine.delete(&delete).unwrap(), Outcome::Executed(true));
    assert_eq!(count(&engine), 1);
}

#[test]
fn delete_requires_conditions() {
    let engine = setup();
    let everything = Delete::from_table(id("users"), Conditions::none());
    assert!(engine.delete(&everything).unwrap_err().is_validation());
    let blank = Delete::from_table(id("users"), RawSql::trusted("  "));
    assert!(engine.delete(&blank).unwrap_err().is_validation());
    assert_eq!(count(&engine), 2);
}

#[test]
fn delete_debug_sql() {
    let engine = setup();
    let delete = Delete::from_table(id("users"), RawSql::trusted("name = 'Bob'")).debug();
    assert_eq!(
        engine.delete(&delete).unwrap().debug_sql(),
        Some("DELETE FROM users WHERE users.name = 'Bob';")
    );
    assert_eq!(count(&engine), 2);
}

#[test]
fn mutation_requests_decode_from_json() {
    let engine = setup();
    let update: Update = serde_json::from_str(
        r#"{"table": "users", "values": {"nickname": "al", "name": ""},
            "conditions": [{"field": "name", "queue": "Alice", "operator": "="}]}"#,
    )
    .unwrap();
    assert!(engine.update(&update).unwrap().executed().unwrap());
    assert_eq!(nickname_of(&engine, 1).as_deref(), Some("al"));

    let delete: Delete = serde_json::from_str(r#"{"table": "users", "conditions": "userId = 2"}"#).unwrap();
    assert!(engine.delete(&delete).unwrap().executed().unwrap());
    assert_eq!(count(&engine), 1);
}

#[test]
fn failed_commit_rolls_back() {
    let engine = setup();
    engine
        .gateway()
        .connection()
        .execute_batch(
            "pragma foreign_keys = on;
             create table parents (parentId integer primary key);
             create table kids (kidId integer primary key,
                 parentId integer references parents (parentId) deferrable initially deferred);",
        )
        .unwrap();
    let orphan = Insert::into_table(id("kids")).set(id("parentId"), 9);
    let err = engine.insert(&orphan).unwrap_err();
    assert!(matches!(err, PersisqlError::Transaction(_)), "{err}");
    assert!(engine.gateway().connection().is_autocommit());
    assert!(engine.gateway().fetch_all("select * from kids;").unwrap().is_empty());
}

#[test]
fn refused_update_is_false() {
    let engine = setup();
    let update = Update::table(id("users"))
        .set(id("name"), SqlValue::Null)
        .conditions(user_is(1));
    assert_eq!(engine.update(&update).unwrap(), Outcome::Executed(false));
    let name: String = engine
        .gateway()
        .connection()
        .query_row("select name from users where userId = 1", [], |row| row.get(0))
        .unwrap();
    assert_eq!(name, "Alice");
}

#[test]
fn refused_delete_is_false() {
    let engine = setup();
    engine
        .gateway()
        .connection()
        .execute_batch(
            "create trigger keep_alice before delete on users when old.userId = 1
             begin select raise(abort, 'alice stays'); end;",
        )
        .unwrap();
    let delete = Delete::from_table(id("users"), user_is(1));
    assert_eq!(engine.delete(&delete).unwrap(), Outcome::Executed(false));
    assert_eq!(count(&engine), 2);
}

#[test]
fn update_of_unknown_column_raises() {
    let engine = setup();
    let update = Update::table(id("users")).set(id("shoeSize"), 44).conditions(user_is(1));
    let err = engine.update(&update).unwrap_err();
    assert!(matches!(err, PersisqlError::Prepare { .. }), "{err}");
}

#[test]
fn delete_from_unknown_table_raises() {
    let engine = setup();
    let delete = Delete::from_table(id("pets"), user_is(1));
    let err = engine.delete(&delete).unwrap_err();
    assert!(matches!(err, PersisqlError::Prepare { .. }), "{err}");
}

#[test]
fn null_conditions_decode_as_none() {
    let engine = setup();
    let update: Update =
        serde_json::from_str(r#"{"table": "users", "values": {"nickname": "x"}, "conditions": null}"#).unwrap();
    assert_eq!(update.conditions, Conditions::none());
    assert_eq!(
        engine.update(&update.debug()).unwrap().debug_sql(),
        Some("UPDATE users SET `nickname` = 'x';")
    );

    let delete: Delete = serde_json::from_str(r#"{"table": "users", "conditions": null}"#).unwrap();
    assert!(engine.delete(&delete).unwrap_err().is_validation());
    assert_eq!(count(&engine), 2);
}
