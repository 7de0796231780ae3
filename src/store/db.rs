use rusqlite::Connection;

use super::error::Result;

/// Initialise the employees, preferences and schedule tables in `conn`.
///
/// Idempotent. `preferences` carries no uniqueness constraint; repeats are
/// stored as submitted and the scheduler skips them.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS employees (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT    NOT NULL,
            created_at  TEXT    NOT NULL
        );

        CREATE TABLE IF NOT EXISTS preferences (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            employee_id INTEGER NOT NULL REFERENCES employees(id),
            day         TEXT    NOT NULL,
            shift       TEXT    NOT NULL
        );

        CREATE TABLE IF NOT EXISTS schedule (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            employee_id  INTEGER NOT NULL REFERENCES employees(id),
            day          TEXT    NOT NULL,
            shift        TEXT    NOT NULL,
            generated_at TEXT    NOT NULL,
            UNIQUE (employee_id, day, shift)
        );
        ",
    )?;
    Ok(())
}
