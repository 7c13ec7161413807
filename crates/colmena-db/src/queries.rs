use rusqlite::{Connection, OptionalExtension, Transaction, params};

use colmena_types::catalog;

use crate::models::{HiveRow, ManagedHiveRow, UserRow, UserWithHiveCount};
use crate::{Database, DbError, DbResult};

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: &str,
    ) -> DbResult<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (name, email, password, role) VALUES (?1, ?2, ?3, ?4)",
                params![name, email, password_hash, role],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DbError::EmailTaken(email.to_string())
                } else {
                    e.into()
                }
            })?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn user_by_email(&self, email: &str) -> DbResult<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email = ?1", &[&email]))
    }

    pub fn user_by_id(&self, id: i64) -> DbResult<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id = ?1", &[&id]))
    }

    pub fn update_user(&self, id: i64, name: &str, email: &str, role: &str) -> DbResult<()> {
        self.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE users SET name = ?1, email = ?2, role = ?3 WHERE id = ?4",
                    params![name, email, role, id],
                )
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        DbError::EmailTaken(email.to_string())
                    } else {
                        DbError::from(e)
                    }
                })?;
            if changed == 0 {
                return Err(DbError::UserNotFound(id));
            }
            Ok(())
        })
    }

    pub fn users_with_hive_counts(&self) -> DbResult<Vec<UserWithHiveCount>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT u.id, u.name, u.email, u.role, u.created_at,
                        COALESCE(COUNT(h.id), 0) AS total_hives
                 FROM users u
                 LEFT JOIN hives h ON u.id = h.user_id
                 GROUP BY u.id
                 ORDER BY u.created_at DESC, u.id DESC",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(UserWithHiveCount {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        email: row.get(2)?,
                        role: row.get(3)?,
                        created_at: row.get(4)?,
                        total_hives: row.get(5)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn all_hives_with_owners(&self) -> DbResult<Vec<ManagedHiveRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT h.id, h.hive_code, h.description, h.created_at,
                        u.name, u.email
                 FROM hives h
                 JOIN users u ON h.user_id = u.id
                 ORDER BY h.created_at DESC, h.id DESC",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(ManagedHiveRow {
                        id: row.get(0)?,
                        hive_code: row.get(1)?,
                        description: row.get(2)?,
                        created_at: row.get(3)?,
                        owner_name: row.get(4)?,
                        owner_email: row.get(5)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Hives --

    pub fn find_hive_by_code(&self, hive_code: &str) -> DbResult<Option<HiveRow>> {
        self.with_conn(|conn| {
            let row = conn
                .prepare(
                    "SELECT id, hive_code, description, user_id, created_at
                     FROM hives WHERE hive_code = ?1",
                )?
                .query_row([hive_code], map_hive_row)
                .optional()?;
            Ok(row)
        })
    }

    pub fn hives_for_owner(&self, user_id: i64) -> DbResult<Vec<HiveRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, hive_code, description, user_id, created_at
                 FROM hives
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, id DESC",
            )?;
            let rows = stmt
                .query_map([user_id], map_hive_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Sensor keys assigned to a hive, in insertion order.
    pub fn assigned_sensor_keys(&self, hive_id: i64) -> DbResult<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT sensor_key FROM hive_sensors WHERE hive_id = ?1 ORDER BY rowid",
            )?;
            let keys = stmt
                .query_map([hive_id], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;
            Ok(keys)
        })
    }

    /// Registers a hive and its sensor assignments in one transaction.
    /// A hive code collision surfaces as `DuplicateHiveCode` from the UNIQUE
    /// constraint. Sensor keys not present in the catalog are dropped.
    pub fn create_hive(
        &self,
        hive_code: &str,
        description: Option<&str>,
        sensor_keys: &[String],
        owner_id: i64,
    ) -> DbResult<HiveRow> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            tx.execute(
                "INSERT INTO hives (hive_code, description, user_id) VALUES (?1, ?2, ?3)",
                params![hive_code, description, owner_id],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DbError::DuplicateHiveCode(hive_code.to_string())
                } else {
                    e.into()
                }
            })?;
            let hive_id = tx.last_insert_rowid();

            insert_assignments(&tx, hive_id, sensor_keys)?;

            let hive = tx
                .prepare(
                    "SELECT id, hive_code, description, user_id, created_at
                     FROM hives WHERE id = ?1",
                )?
                .query_row([hive_id], map_hive_row)?;

            tx.commit()?;
            Ok(hive)
        })
    }

    /// Replaces a hive's sensor assignments wholesale. Delete and insert run
    /// in one transaction so a concurrent reader never observes the hive
    /// half-edited; any failure rolls back to the prior set.
    pub fn replace_assignments(&self, hive_id: i64, sensor_keys: &[String]) -> DbResult<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            replace_assignments_tx(&tx, hive_id, sensor_keys)?;
            tx.commit()?;
            Ok(())
        })
    }

    /// Edits description and assignments together, atomically.
    pub fn update_hive(
        &self,
        hive_id: i64,
        description: Option<&str>,
        sensor_keys: &[String],
    ) -> DbResult<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "UPDATE hives SET description = ?1 WHERE id = ?2",
                params![description, hive_id],
            )?;
            replace_assignments_tx(&tx, hive_id, sensor_keys)?;
            tx.commit()?;
            Ok(())
        })
    }

    /// Deletes a hive by code; assignment rows go with it via the
    /// ON DELETE CASCADE constraint.
    pub fn delete_hive(&self, hive_code: &str) -> DbResult<()> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM hives WHERE hive_code = ?1", [hive_code])?;
            if deleted == 0 {
                return Err(DbError::HiveNotFound(hive_code.to_string()));
            }
            Ok(())
        })
    }
}

/// Inserts assignments for a hive, silently dropping keys the catalog does
/// not know. Dropping (rather than rejecting) unknown keys is deliberate:
/// stale clients may still offer retired channels.
fn insert_assignments(tx: &Transaction, hive_id: i64, sensor_keys: &[String]) -> DbResult<()> {
    for key in sensor_keys.iter().filter(|k| catalog::is_valid(k)) {
        tx.execute(
            "INSERT OR IGNORE INTO hive_sensors (hive_id, sensor_key) VALUES (?1, ?2)",
            params![hive_id, key],
        )?;
    }
    Ok(())
}

fn replace_assignments_tx(tx: &Transaction, hive_id: i64, sensor_keys: &[String]) -> DbResult<()> {
    tx.execute("DELETE FROM hive_sensors WHERE hive_id = ?1", [hive_id])?;
    insert_assignments(tx, hive_id, sensor_keys)
}

fn query_user(
    conn: &Connection,
    predicate: &str,
    args: &[&dyn rusqlite::types::ToSql],
) -> DbResult<Option<UserRow>> {
    let sql = format!(
        "SELECT id, name, email, password, role, created_at FROM users WHERE {}",
        predicate
    );
    let row = conn
        .prepare(&sql)?
        .query_row(args, |row| {
            Ok(UserRow {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                password: row.get(3)?,
                role: row.get(4)?,
                created_at: row.get(5)?,
            })
        })
        .optional()?;
    Ok(row)
}

fn map_hive_row(row: &rusqlite::Row<'_>) -> Result<HiveRow, rusqlite::Error> {
    Ok(HiveRow {
        id: row.get(0)?,
        hive_code: row.get(1)?,
        description: row.get(2)?,
        user_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
