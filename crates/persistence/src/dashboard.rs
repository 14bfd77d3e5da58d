//! Aggregates over confirmed transactions
//!
//! Every query is scoped to one user and an inclusive effective-date range.

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};

use cash_track_core::{
    CategoryAmount, ChannelAmount, DashboardSummary, DateRange, Direction, SummaryQuery,
    SummaryTotals,
};

use crate::error::PersistenceError;
use crate::transactions::{format_date, EFFECTIVE_DATE};

/// Totals for a chat summary query.
///
/// Expense and income are summed separately; the direction only decides
/// which of the two is computed.
pub fn query_summary(
    conn: &Connection,
    user_id: i64,
    query: &SummaryQuery,
) -> Result<SummaryTotals, PersistenceError> {
    let mut totals = SummaryTotals::default();
    if query.direction.includes_expense() {
        totals.total_expense = sum_direction(conn, user_id, Direction::Expense, query)?;
    }
    if query.direction.includes_income() {
        totals.total_income = sum_direction(conn, user_id, Direction::Income, query)?;
    }
    Ok(totals)
}

fn sum_direction(
    conn: &Connection,
    user_id: i64,
    direction: Direction,
    query: &SummaryQuery,
) -> Result<f64, PersistenceError> {
    let mut sql = format!(
        "SELECT COALESCE(SUM(amount), 0)
         FROM transactions
         WHERE user_id = ?
           AND status = 'confirmed'
           AND direction = ?
           AND {eff} >= ?
           AND {eff} <= ?",
        eff = EFFECTIVE_DATE
    );
    let mut args: Vec<Value> = vec![
        Value::Integer(user_id),
        Value::Text(direction.as_str().to_string()),
        Value::Text(format_date(query.range.from)),
        Value::Text(format_date(query.range.to)),
    ];

    if let Some(category) = query.category {
        sql.push_str(" AND category = ?");
        args.push(Value::Text(category.as_str().to_string()));
    }
    if let Some(channel) = query.channel {
        sql.push_str(" AND channel = ?");
        args.push(Value::Text(channel.as_str().to_string()));
    }

    Ok(conn.query_row(&sql, params_from_iter(args), |row| row.get(0))?)
}

/// Totals plus expense breakdowns
pub fn dashboard_summary(
    conn: &Connection,
    user_id: i64,
    range: DateRange,
) -> Result<DashboardSummary, PersistenceError> {
    let sql = format!(
        "SELECT
            COALESCE(SUM(CASE WHEN direction = 'expense' THEN amount ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN direction = 'income' THEN amount ELSE 0 END), 0)
         FROM transactions
         WHERE user_id = ?1
           AND status = 'confirmed'
           AND {eff} >= ?2
           AND {eff} <= ?3",
        eff = EFFECTIVE_DATE
    );
    let (total_expense, total_income): (f64, f64) = conn.query_row(
        &sql,
        params![user_id, format_date(range.from), format_date(range.to)],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    let mut by_category = expense_by_category(conn, user_id, range)?;
    for entry in &mut by_category {
        entry.percent_of_expense = percent_of(entry.amount, total_expense);
    }

    Ok(DashboardSummary {
        from: range.from,
        to: range.to,
        total_expense,
        total_income,
        net: total_income - total_expense,
        by_category,
        by_channel: expense_by_channel(conn, user_id, range)?,
    })
}

/// Largest first; empty categories group as `uncategorized`
pub fn expense_by_category(
    conn: &Connection,
    user_id: i64,
    range: DateRange,
) -> Result<Vec<CategoryAmount>, PersistenceError> {
    let rows = grouped_expense(conn, user_id, range, "category", "uncategorized")?;
    let total: f64 = rows.iter().map(|(_, amount)| amount).sum();

    Ok(rows
        .into_iter()
        .map(|(category, amount)| CategoryAmount {
            category,
            amount,
            percent_of_expense: percent_of(amount, total),
        })
        .collect())
}

/// Largest first; empty channels group as `unknown`
pub fn expense_by_channel(
    conn: &Connection,
    user_id: i64,
    range: DateRange,
) -> Result<Vec<ChannelAmount>, PersistenceError> {
    Ok(grouped_expense(conn, user_id, range, "channel", "unknown")?
        .into_iter()
        .map(|(channel, amount)| ChannelAmount { channel, amount })
        .collect())
}

fn grouped_expense(
    conn: &Connection,
    user_id: i64,
    range: DateRange,
    column: &str,
    empty_label: &str,
) -> Result<Vec<(String, f64)>, PersistenceError> {
    let sql = format!(
        "SELECT COALESCE(NULLIF({col}, ''), '{empty}') AS label, COALESCE(SUM(amount), 0) AS total
         FROM transactions
         WHERE user_id = ?1
           AND status = 'confirmed'
           AND direction = 'expense'
           AND {eff} >= ?2
           AND {eff} <= ?3
         GROUP BY label
         ORDER BY total DESC, label",
        col = column,
        empty = empty_label,
        eff = EFFECTIVE_DATE
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params![user_id, format_date(range.from), format_date(range.to)],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn percent_of(amount: f64, total: f64) -> f64 {
    if total > 0.0 {
        amount * 100.0 / total
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ensure_schema;
    use chrono::NaiveDate;
    use cash_track_core::{Category, Channel, SummaryDirection};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn january() -> DateRange {
        DateRange::new(date(2026, 1, 1), date(2026, 1, 31))
    }

    /// (user, date, amount, direction, category, channel, status)
    fn seed(conn: &Connection, rows: &[(i64, &str, f64, &str, Option<&str>, Option<&str>, &str)]) {
        for (user, txn_date, amount, direction, category, channel, status) in rows {
            conn.execute(
                "INSERT INTO transactions (user_id, txn_date, amount, direction, category, channel, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![user, txn_date, amount, direction, category, channel, status],
            )
            .unwrap();
        }
    }

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        seed(
            &conn,
            &[
                (1, "2026-01-05", 100.0, "expense", Some("food"), Some("cash"), "confirmed"),
                (1, "2026-01-10", 300.0, "expense", Some("transport"), Some("scb"), "confirmed"),
                (1, "2026-01-12", 100.0, "expense", None, None, "confirmed"),
                (1, "2026-01-15", 1000.0, "income", None, Some("kbank"), "confirmed"),
                (1, "2026-01-20", 999.0, "expense", Some("food"), Some("cash"), "pending"),
                (1, "2026-02-01", 50.0, "expense", Some("food"), Some("cash"), "confirmed"),
                (2, "2026-01-05", 70.0, "expense", Some("food"), Some("cash"), "confirmed"),
            ],
        );
        conn
    }

    fn summary_query(direction: SummaryDirection) -> SummaryQuery {
        SummaryQuery {
            direction,
            range: january(),
            category: None,
            channel: None,
        }
    }

    #[test]
    fn test_query_summary_both_are_separate() {
        let conn = conn();
        let totals = query_summary(&conn, 1, &summary_query(SummaryDirection::Both)).unwrap();
        assert_eq!(totals.total_expense, 500.0);
        assert_eq!(totals.total_income, 1000.0);
    }

    #[test]
    fn test_query_summary_direction_narrows() {
        let conn = conn();
        let totals = query_summary(&conn, 1, &summary_query(SummaryDirection::Expense)).unwrap();
        assert_eq!(totals.total_expense, 500.0);
        assert_eq!(totals.total_income, 0.0);

        let totals = query_summary(&conn, 1, &summary_query(SummaryDirection::Income)).unwrap();
        assert_eq!(totals.total_expense, 0.0);
        assert_eq!(totals.total_income, 1000.0);
    }

    #[test]
    fn test_query_summary_category_and_channel() {
        let conn = conn();
        let mut query = summary_query(SummaryDirection::Expense);
        query.category = Some(Category::Food);
        assert_eq!(query_summary(&conn, 1, &query).unwrap().total_expense, 100.0);

        query.category = None;
        query.channel = Some(Channel::Scb);
        assert_eq!(query_summary(&conn, 1, &query).unwrap().total_expense, 300.0);
    }

    #[test]
    fn test_effective_date_falls_back_to_created_at() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO transactions (user_id, txn_date, amount, status, created_at)
             VALUES (1, '', 40.0, 'confirmed', '2026-01-09 08:00:00')",
            [],
        )
        .unwrap();

        let totals = query_summary(&conn, 1, &summary_query(SummaryDirection::Expense)).unwrap();
        assert_eq!(totals.total_expense, 40.0);
    }

    #[test]
    fn test_dashboard_summary() {
        let conn = conn();
        let summary = dashboard_summary(&conn, 1, january()).unwrap();
        assert_eq!(summary.total_expense, 500.0);
        assert_eq!(summary.total_income, 1000.0);
        assert_eq!(summary.net, 500.0);

        let categories: Vec<(&str, f64, f64)> = summary
            .by_category
            .iter()
            .map(|c| (c.category.as_str(), c.amount, c.percent_of_expense))
            .collect();
        assert_eq!(
            categories,
            vec![("transport", 300.0, 60.0), ("food", 100.0, 20.0), ("uncategorized", 100.0, 20.0)]
        );

        let channels: Vec<&str> = summary.by_channel.iter().map(|c| c.channel.as_str()).collect();
        assert_eq!(channels, vec!["scb", "cash", "unknown"]);
    }

    #[test]
    fn test_empty_range() {
        let conn = conn();
        let range = DateRange::new(date(2025, 1, 1), date(2025, 1, 31));
        let summary = dashboard_summary(&conn, 1, range).unwrap();
        assert_eq!(summary.total_expense, 0.0);
        assert!(summary.by_category.is_empty());
        assert!(summary.by_channel.is_empty());
    }
}
