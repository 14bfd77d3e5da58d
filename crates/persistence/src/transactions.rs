//! Transaction rows
//!
//! Empty strings and zero amounts/confidences are written as NULL. The
//! effective date of a row is its `txn_date`, else the day it was created.

use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use cash_track_core::{
    Category, Channel, Confirmation, Direction, NewTransaction, OcrUpdate, RangeFilter,
    Transaction, TransactionStatus, DEFAULT_CURRENCY,
};

use crate::error::PersistenceError;

/// SQL expression for a row's effective date
pub(crate) const EFFECTIVE_DATE: &str = "COALESCE(NULLIF(txn_date, ''), date(created_at))";

const COLUMNS: &str = "id, user_id, txn_date, amount, currency, direction, channel, \
     account_label, category, description, slip_image_path, raw_ocr_text, llm_confidence, \
     status, created_at, updated_at";

pub fn insert(
    conn: &Connection,
    user_id: i64,
    fields: &NewTransaction,
) -> Result<Transaction, PersistenceError> {
    let currency = non_empty(Some(fields.currency.as_str())).unwrap_or(DEFAULT_CURRENCY);

    conn.execute(
        "INSERT INTO transactions (
            user_id, txn_date, amount, currency, direction, channel, account_label,
            category, description, slip_image_path, raw_ocr_text, llm_confidence, status
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            user_id,
            fields.txn_date.map(format_date),
            non_zero(fields.amount),
            currency,
            fields.direction.as_str(),
            fields.channel.map(|c| c.as_str()),
            non_empty(fields.account_label.as_deref()),
            fields.category.map(|c| c.as_str()),
            non_empty(fields.description.as_deref()),
            non_empty(fields.slip_image_path.as_deref()),
            non_empty(fields.raw_ocr_text.as_deref()),
            non_zero(fields.llm_confidence),
            fields.status.as_str(),
        ],
    )?;

    let id = conn.last_insert_rowid();
    get(conn, id)?.ok_or_else(|| PersistenceError::NotFound(format!("transaction {}", id)))
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<Transaction>, PersistenceError> {
    let sql = format!("SELECT {} FROM transactions WHERE id = ?1", COLUMNS);
    Ok(conn.query_row(&sql, params![id], map_row).optional()?)
}

/// Status is left untouched
pub fn update_ocr_result(
    conn: &Connection,
    id: i64,
    update: &OcrUpdate,
) -> Result<bool, PersistenceError> {
    let changed = conn.execute(
        "UPDATE transactions
         SET raw_ocr_text = ?1, amount = ?2, txn_date = ?3, channel = ?4,
             category = ?5, description = ?6, llm_confidence = ?7,
             updated_at = datetime('now')
         WHERE id = ?8",
        params![
            non_empty(Some(update.raw_text.as_str())),
            non_zero(update.amount),
            update.txn_date.map(format_date),
            update.channel.map(|c| c.as_str()),
            update.category.map(|c| c.as_str()),
            non_empty(update.description.as_deref()),
            non_zero(update.llm_confidence),
            id,
        ],
    )?;
    Ok(changed > 0)
}

pub fn confirm(
    conn: &Connection,
    id: i64,
    confirmation: &Confirmation,
) -> Result<bool, PersistenceError> {
    let changed = conn.execute(
        "UPDATE transactions
         SET amount = ?1, txn_date = ?2, direction = ?3, channel = ?4,
             account_label = ?5, category = ?6, description = ?7,
             status = 'confirmed', updated_at = datetime('now')
         WHERE id = ?8",
        params![
            confirmation.amount,
            confirmation.txn_date.map(format_date),
            confirmation.direction.as_str(),
            confirmation.channel.map(|c| c.as_str()),
            non_empty(confirmation.account_label.as_deref()),
            confirmation.category.map(|c| c.as_str()),
            non_empty(confirmation.description.as_deref()),
            id,
        ],
    )?;
    Ok(changed > 0)
}

pub fn delete(conn: &Connection, id: i64) -> Result<bool, PersistenceError> {
    Ok(conn.execute("DELETE FROM transactions WHERE id = ?1", params![id])? > 0)
}

/// Newest first
pub fn list_recent(
    conn: &Connection,
    user_id: i64,
    limit: u32,
    offset: u32,
) -> Result<Vec<Transaction>, PersistenceError> {
    let sql = format!(
        "SELECT {} FROM transactions WHERE user_id = ?1 \
         ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3",
        COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id, limit, offset], map_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Confirmed rows whose effective date lies in the range, latest first
pub fn list_in_range(
    conn: &Connection,
    user_id: i64,
    filter: &RangeFilter,
) -> Result<Vec<Transaction>, PersistenceError> {
    let mut sql = format!(
        "SELECT {} FROM transactions
         WHERE user_id = ?
           AND status = 'confirmed'
           AND {eff} >= ?
           AND {eff} <= ?",
        COLUMNS,
        eff = EFFECTIVE_DATE
    );
    let mut args: Vec<Value> = vec![
        Value::Integer(user_id),
        Value::Text(format_date(filter.range.from)),
        Value::Text(format_date(filter.range.to)),
    ];

    if let Some(category) = non_empty(filter.category.as_deref()) {
        sql.push_str(" AND category = ?");
        args.push(Value::Text(category.to_string()));
    }
    if let Some(channel) = non_empty(filter.channel.as_deref()) {
        sql.push_str(" AND channel = ?");
        args.push(Value::Text(channel.to_string()));
    }

    sql.push_str(&format!(" ORDER BY {} DESC, id DESC LIMIT ?", EFFECTIVE_DATE));
    args.push(Value::Integer(i64::from(filter.limit)));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(args), map_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let direction: Option<String> = row.get("direction")?;
    let channel: Option<String> = row.get("channel")?;
    let category: Option<String> = row.get("category")?;
    let status: Option<String> = row.get("status")?;
    let txn_date: Option<String> = row.get("txn_date")?;

    Ok(Transaction {
        id: row.get("id")?,
        user_id: row.get::<_, Option<i64>>("user_id")?.unwrap_or_default(),
        txn_date: txn_date.as_deref().and_then(parse_date),
        amount: row.get("amount")?,
        currency: row
            .get::<_, Option<String>>("currency")?
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        direction: direction.as_deref().and_then(Direction::parse).unwrap_or_default(),
        channel: channel.as_deref().and_then(Channel::from_token),
        account_label: row.get("account_label")?,
        category: category.as_deref().and_then(Category::from_token),
        description: row.get("description")?,
        slip_image_path: row.get("slip_image_path")?,
        raw_ocr_text: row.get("raw_ocr_text")?,
        llm_confidence: row.get("llm_confidence")?,
        status: status
            .as_deref()
            .and_then(TransactionStatus::parse)
            .unwrap_or(TransactionStatus::Pending),
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Stored dates may carry a time suffix
fn parse_date(value: &str) -> Option<NaiveDate> {
    let date_part = value.trim().get(..10)?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn non_zero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}
