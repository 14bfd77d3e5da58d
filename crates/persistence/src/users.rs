//! User rows

use rusqlite::{params, Connection, OptionalExtension, Row};

use cash_track_core::user::is_valid_cutoff_day;
use cash_track_core::{User, DEFAULT_USER_NAME};

use crate::error::PersistenceError;

const COLUMNS: &str = "id, name, cutoff_day, created_at";

pub fn get(conn: &Connection, user_id: i64) -> Result<Option<User>, PersistenceError> {
    let sql = format!("SELECT {} FROM users WHERE id = ?1", COLUMNS);
    Ok(conn.query_row(&sql, params![user_id], map_row).optional()?)
}

pub fn get_by_name(conn: &Connection, name: &str) -> Result<Option<User>, PersistenceError> {
    let sql = format!("SELECT {} FROM users WHERE name = ?1", COLUMNS);
    Ok(conn.query_row(&sql, params![name], map_row).optional()?)
}

/// Oldest first
pub fn list(conn: &Connection) -> Result<Vec<User>, PersistenceError> {
    let sql = format!("SELECT {} FROM users ORDER BY id", COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], map_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn create(conn: &Connection, name: &str) -> Result<User, PersistenceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PersistenceError::InvalidData("user name is empty".to_string()));
    }

    if let Err(e) = conn.execute("INSERT INTO users (name) VALUES (?1)", params![name]) {
        let err = PersistenceError::from(e);
        if err.is_constraint_violation() {
            return Err(PersistenceError::Conflict(format!("user '{}' already exists", name)));
        }
        return Err(err);
    }

    let id = conn.last_insert_rowid();
    get(conn, id)?.ok_or_else(|| PersistenceError::NotFound(format!("user {}", id)))
}

pub fn update_cutoff(
    conn: &Connection,
    user_id: i64,
    cutoff_day: u32,
) -> Result<Option<User>, PersistenceError> {
    if !is_valid_cutoff_day(cutoff_day) {
        return Err(PersistenceError::InvalidData(format!(
            "cutoff day {} is outside 1..=30",
            cutoff_day
        )));
    }

    let changed = conn.execute(
        "UPDATE users SET cutoff_day = ?1 WHERE id = ?2",
        params![cutoff_day, user_id],
    )?;
    if changed == 0 {
        return Ok(None);
    }
    get(conn, user_id)
}

/// Deletes the user and every transaction they own
pub fn delete(conn: &Connection, user_id: i64) -> Result<bool, PersistenceError> {
    let tx = conn.unchecked_transaction()?;
    let removed_rows = tx.execute("DELETE FROM transactions WHERE user_id = ?1", params![user_id])?;
    let removed = tx.execute("DELETE FROM users WHERE id = ?1", params![user_id])?;
    tx.commit()?;

    if removed > 0 {
        tracing::info!(user_id, transactions = removed_rows, "User deleted");
    }
    Ok(removed > 0)
}

/// Create the default user if missing and hand it every ownerless row
pub fn ensure_default(conn: &Connection) -> Result<User, PersistenceError> {
    conn.execute(
        "INSERT OR IGNORE INTO users (name) VALUES (?1)",
        params![DEFAULT_USER_NAME],
    )?;
    let user = get_by_name(conn, DEFAULT_USER_NAME)?
        .ok_or_else(|| PersistenceError::NotFound(format!("user '{}'", DEFAULT_USER_NAME)))?;

    let adopted = conn.execute(
        "UPDATE transactions SET user_id = ?1 WHERE user_id IS NULL",
        params![user.id],
    )?;
    if adopted > 0 {
        tracing::info!(
            user_id = user.id,
            adopted,
            "Assigned ownerless transactions to default user"
        );
    }

    Ok(user)
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        name: row.get("name")?,
        cutoff_day: row.get("cutoff_day")?,
        created_at: row.get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ensure_schema;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn test_ensure_default_is_idempotent() {
        let conn = conn();
        let first = ensure_default(&conn).unwrap();
        let second = ensure_default(&conn).unwrap();
        assert_eq!(first.id, second.id);
        assert!(first.is_default());
        assert_eq!(first.cutoff_day, 1);
        assert_eq!(list(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_ensure_default_adopts_ownerless_rows() {
        let conn = conn();
        conn.execute("INSERT INTO transactions (amount) VALUES (10.0)", []).unwrap();

        let user = ensure_default(&conn).unwrap();
        let owner: i64 = conn
            .query_row("SELECT user_id FROM transactions", [], |row| row.get(0))
            .unwrap();
        assert_eq!(owner, user.id);
    }

    #[test]
    fn test_create_duplicate_is_conflict() {
        let conn = conn();
        let user = create(&conn, "  Alice ").unwrap();
        assert_eq!(user.name, "Alice");

        let err = create(&conn, "Alice").unwrap_err();
        assert!(matches!(err, PersistenceError::Conflict(_)));
        assert!(matches!(create(&conn, "   ").unwrap_err(), PersistenceError::InvalidData(_)));
    }

    #[test]
    fn test_update_cutoff() {
        let conn = conn();
        let user = create(&conn, "bob").unwrap();

        let updated = update_cutoff(&conn, user.id, 25).unwrap().unwrap();
        assert_eq!(updated.cutoff_day, 25);
        assert_eq!(update_cutoff(&conn, 999, 25).unwrap(), None);
        assert!(update_cutoff(&conn, user.id, 31).is_err());
        assert!(update_cutoff(&conn, user.id, 0).is_err());
    }

    #[test]
    fn test_delete_removes_transactions() {
        let conn = conn();
        let user = create(&conn, "carol").unwrap();
        conn.execute(
            "INSERT INTO transactions (user_id, amount) VALUES (?1, 5.0)",
            params![user.id],
        )
        .unwrap();

        assert!(delete(&conn, user.id).unwrap());
        assert!(!delete(&conn, user.id).unwrap());
        let remaining: i64 = conn
            .query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))
            .unwrap();
        assert_eq!(remaining, 0);
    }
}
