//! SQLite schema creation and additive migrations

use crate::error::PersistenceError;
use rusqlite::Connection;

const USERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        cutoff_day INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    )
"#;

const TRANSACTIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS transactions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER,
        txn_date TEXT,
        amount REAL,
        currency TEXT NOT NULL DEFAULT 'THB',
        direction TEXT NOT NULL DEFAULT 'expense',
        channel TEXT,
        account_label TEXT,
        category TEXT,
        description TEXT,
        slip_image_path TEXT,
        raw_ocr_text TEXT,
        llm_confidence REAL,
        status TEXT NOT NULL DEFAULT 'pending',
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    )
"#;

/// Columns added after the first release, in order
const TRANSACTION_COLUMNS: &[(&str, &str)] = &[
    ("user_id", "INTEGER"),
    ("txn_date", "TEXT"),
    ("currency", "TEXT DEFAULT 'THB'"),
    ("direction", "TEXT DEFAULT 'expense'"),
    ("account_label", "TEXT"),
    ("category", "TEXT"),
    ("description", "TEXT"),
    ("slip_image_path", "TEXT"),
    ("llm_confidence", "REAL"),
];

const USER_COLUMNS: &[(&str, &str)] = &[("cutoff_day", "INTEGER NOT NULL DEFAULT 1")];

const INDEXES: &[(&str, &str, &str)] = &[
    ("idx_transactions_user_id", "transactions", "user_id"),
    ("idx_transactions_status", "transactions", "status"),
    ("idx_transactions_created_at", "transactions", "created_at"),
    ("idx_transactions_txn_date", "transactions", "txn_date"),
    ("idx_transactions_direction", "transactions", "direction"),
    ("idx_transactions_category", "transactions", "category"),
];

/// Create tables, add missing columns, then create indexes
pub fn ensure_schema(conn: &Connection) -> Result<(), PersistenceError> {
    enable_wal(conn)?;

    conn.execute_batch(USERS_TABLE).map_err(|e| {
        PersistenceError::SchemaError(format!("Failed to create users table: {}", e))
    })?;
    conn.execute_batch(TRANSACTIONS_TABLE).map_err(|e| {
        PersistenceError::SchemaError(format!("Failed to create transactions table: {}", e))
    })?;

    for (column, definition) in USER_COLUMNS {
        add_column_if_missing(conn, "users", column, definition)?;
    }
    for (column, definition) in TRANSACTION_COLUMNS {
        add_column_if_missing(conn, "transactions", column, definition)?;
    }

    for (name, table, column) in INDEXES {
        let sql = format!("CREATE INDEX IF NOT EXISTS {} ON {}({})", name, table, column);
        conn.execute_batch(&sql).map_err(|e| {
            PersistenceError::SchemaError(format!("Failed to create index {}: {}", name, e))
        })?;
    }

    Ok(())
}

fn enable_wal(conn: &Connection) -> Result<(), PersistenceError> {
    // in-memory databases answer "memory"
    let mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    tracing::debug!(journal_mode = %mode, "Journal mode set");
    Ok(())
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool, PersistenceError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for name in names {
        if name? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn add_column_if_missing(
    conn: &Connection,
    table: &str,
    column: &str,
    definition: &str,
) -> Result<(), PersistenceError> {
    if column_exists(conn, table, column)? {
        return Ok(());
    }

    conn.execute_batch(&format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, definition))
        .map_err(|e| {
            PersistenceError::SchemaError(format!("Failed to add {}.{}: {}", table, column, e))
        })?;
    tracing::info!(table, column, "Added missing column");
    Ok(())
}
