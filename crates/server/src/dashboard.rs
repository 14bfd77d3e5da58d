//! Dashboard endpoints
//!
//! `from` and `to` must both be present to take effect; otherwise the
//! current user's billing cycle is used.

use axum::extract::{Query, State};
use axum::{Extension, Json};
use chrono::NaiveDate;
use serde::Deserialize;

use cash_track_core::{
    cutoff_range, CategoryAmount, ChannelAmount, DashboardSummary, DateRange, RangeFilter,
    Transaction,
};

use crate::state::AppState;
use crate::user_context::CurrentUser;
use crate::ServerError;

const DEFAULT_LIMIT: u32 = 200;
const MAX_LIMIT: u32 = 500;

#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    from: Option<String>,
    to: Option<String>,
    limit: Option<String>,
    category: Option<String>,
    channel: Option<String>,
}

impl DashboardParams {
    fn range(&self, state: &AppState, user: &CurrentUser) -> Result<DateRange, ServerError> {
        let bound = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        match (bound(&self.from), bound(&self.to)) {
            (Some(from), Some(to)) => Ok(DateRange::new(parse_date(&from)?, parse_date(&to)?)),
            _ => Ok(cutoff_range(state.clock.today(), user.cutoff_day())),
        }
    }

    /// Positive values are capped; anything else is the default
    fn limit(&self) -> u32 {
        self.limit
            .as_deref()
            .and_then(|value| value.trim().parse::<u32>().ok())
            .filter(|limit| *limit > 0)
            .map(|limit| limit.min(MAX_LIMIT))
            .unwrap_or(DEFAULT_LIMIT)
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, ServerError> {
    let day = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|_| ServerError::InvalidRequest(format!("Invalid date: {}", value)))
}

fn filter_value(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_lowercase)
}

pub async fn summary(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<DashboardParams>,
) -> Result<Json<DashboardSummary>, ServerError> {
    let range = params.range(&state, &user)?;
    Ok(Json(state.repository.dashboard_summary(user.id(), range).await?))
}

pub async fn by_category(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<DashboardParams>,
) -> Result<Json<Vec<CategoryAmount>>, ServerError> {
    let range = params.range(&state, &user)?;
    Ok(Json(state.repository.expense_by_category(user.id(), range).await?))
}

pub async fn by_channel(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<DashboardParams>,
) -> Result<Json<Vec<ChannelAmount>>, ServerError> {
    let range = params.range(&state, &user)?;
    Ok(Json(state.repository.expense_by_channel(user.id(), range).await?))
}

pub async fn transactions(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<DashboardParams>,
) -> Result<Json<Vec<Transaction>>, ServerError> {
    let filter = RangeFilter {
        range: params.range(&state, &user)?,
        category: filter_value(&params.category),
        channel: filter_value(&params.channel),
        limit: params.limit(),
    };
    Ok(Json(state.repository.list_transactions_in_range(user.id(), &filter).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{as_user, get, read_json, TestApp};
    use axum::http::StatusCode;
    use cash_track_core::{
        Category, Channel, Direction, NewTransaction, Repository, TransactionStatus,
        DEFAULT_CURRENCY,
    };

    fn entry(
        day: &str,
        amount: f64,
        direction: Direction,
        category: Option<Category>,
        channel: Option<Channel>,
        status: TransactionStatus,
    ) -> NewTransaction {
        NewTransaction {
            txn_date: Some(NaiveDate::parse_from_str(day, "%Y-%m-%d").unwrap()),
            amount: Some(amount),
            currency: DEFAULT_CURRENCY.to_string(),
            direction,
            channel,
            account_label: None,
            category,
            description: None,
            slip_image_path: None,
            raw_ocr_text: None,
            llm_confidence: None,
            status,
        }
    }

    async fn seeded() -> TestApp {
        let app = TestApp::new().await;
        let user = app.default_user_id;
        let confirmed = TransactionStatus::Confirmed;
        let pending = TransactionStatus::Pending;
        let (expense, income) = (Direction::Expense, Direction::Income);
        let (food, transport) = (Some(Category::Food), Some(Category::Transport));
        let (cash, scb, kbank) = (Some(Channel::Cash), Some(Channel::Scb), Some(Channel::Kbank));
        let rows = [
            entry("2026-01-03", 300.0, expense, food, cash, confirmed),
            entry("2026-01-10", 100.0, expense, transport, scb, confirmed),
            entry("2026-01-12", 1000.0, income, None, kbank, confirmed),
            entry("2026-01-14", 999.0, expense, food, None, pending),
            entry("2025-12-20", 50.0, expense, food, cash, confirmed),
        ];
        for row in rows {
            app.repository.create_transaction(user, row).await.unwrap();
        }
        app
    }

    #[tokio::test]
    async fn test_summary_defaults_to_current_cycle() {
        let app = seeded().await;
        let body = read_json(app.send(get("/api/dashboard/summary")).await).await;

        assert_eq!(body["from"], "2026-01-01");
        assert_eq!(body["to"], "2026-01-31");
        assert_eq!(body["total_expense"], 400.0);
        assert_eq!(body["total_income"], 1000.0);
        assert_eq!(body["net"], 600.0);
        assert_eq!(body["by_category"][0]["category"], "food");
        assert_eq!(body["by_category"][0]["percent_of_expense"], 75.0);
    }

    #[tokio::test]
    async fn test_summary_follows_user_cutoff() {
        let app = seeded().await;
        let payday = app.user("payday").await;
        app.repository.update_user_cutoff(payday, 25).await.unwrap();

        let body = read_json(app.send(as_user(get("/api/dashboard/summary"), payday)).await).await;
        assert_eq!(body["from"], "2025-12-25");
        assert_eq!(body["to"], "2026-01-24");
        assert_eq!(body["total_expense"], 0.0);
    }

    #[tokio::test]
    async fn test_explicit_range_needs_both_bounds() {
        let app = seeded().await;

        let response = app.send(get("/api/dashboard/summary?from=2025-12-01&to=2025-12-31")).await;
        let body = read_json(response).await;
        assert_eq!(body["total_expense"], 50.0);

        let body = read_json(app.send(get("/api/dashboard/summary?from=2025-12-01")).await).await;
        assert_eq!(body["from"], "2026-01-01");

        let response = app.send(get("/api/dashboard/summary?from=yesterday&to=2026-01-31")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_by_channel_and_category() {
        let app = seeded().await;

        let channels = read_json(app.send(get("/api/dashboard/by-channel")).await).await;
        assert_eq!(channels[0]["channel"], "cash");
        assert_eq!(channels[0]["amount"], 300.0);
        assert_eq!(channels.as_array().unwrap().len(), 2);

        let categories = read_json(app.send(get("/api/dashboard/by-category")).await).await;
        assert_eq!(categories[1]["category"], "transport");
        assert_eq!(categories[1]["percent_of_expense"], 25.0);
    }

    #[tokio::test]
    async fn test_transactions_filters_and_limit() {
        let app = seeded().await;

        let rows = read_json(app.send(get("/api/dashboard/transactions")).await).await;
        assert_eq!(rows.as_array().unwrap().len(), 3);
        assert_eq!(rows[0]["txn_date"], "2026-01-12");

        let response = app.send(get("/api/dashboard/transactions?category=food")).await;
        let rows = read_json(response).await;
        assert_eq!(rows.as_array().unwrap().len(), 1);

        let response = app.send(get("/api/dashboard/transactions?channel=SCB&limit=5")).await;
        let rows = read_json(response).await;
        assert_eq!(rows[0]["category"], "transport");

        let rows = read_json(app.send(get("/api/dashboard/transactions?limit=1")).await).await;
        assert_eq!(rows.as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_limit_parsing() {
        let params = |limit: &str| DashboardParams {
            limit: Some(limit.to_string()),
            ..DashboardParams::default()
        };
        assert_eq!(DashboardParams::default().limit(), 200);
        assert_eq!(params("50").limit(), 50);
        assert_eq!(params("10000").limit(), 500);
        assert_eq!(params("0").limit(), 200);
        assert_eq!(params("-3").limit(), 200);
        assert_eq!(params("abc").limit(), 200);
    }
}
