use rusqlite::Connection;
use tracing::info;

use crate::DbResult;

pub fn run(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            email       TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            role        TEXT NOT NULL DEFAULT 'member',
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- hive_code uniqueness is enforced here, not by a prior SELECT, so
        -- concurrent registrations of the same code cannot race past a check.
        CREATE TABLE IF NOT EXISTS hives (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            hive_code   TEXT NOT NULL UNIQUE,
            description TEXT,
            user_id     INTEGER NOT NULL REFERENCES users(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_hives_owner
            ON hives(user_id, created_at);

        CREATE TABLE IF NOT EXISTS hive_sensors (
            hive_id     INTEGER NOT NULL REFERENCES hives(id) ON DELETE CASCADE,
            sensor_key  TEXT NOT NULL,
            UNIQUE(hive_id, sensor_key)
        );

        CREATE INDEX IF NOT EXISTS idx_hive_sensors_hive
            ON hive_sensors(hive_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
