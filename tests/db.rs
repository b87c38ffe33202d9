use diesel::connection::SimpleConnection;

mod common;

#[test]
fn test_creates_and_removes_db_files() {
    let test_db = common::TestDb::new("test_creates_and_removes_db_files.db");
    let conn = test_db.pool().get();
    assert!(conn.is_ok());
}

#[test]
fn test_foreign_keys_are_enforced() {
    let test_db = common::TestDb::new("test_foreign_keys_are_enforced.db");
    let mut conn = test_db.pool().get().unwrap();

    let result = conn.batch_execute(
        "INSERT INTO fosters (client_id, pet_id, start_date) VALUES (999, 999, '2024-01-01');",
    );
    assert!(result.is_err());
}
