//! `Repository` implementation over SQLite

use async_trait::async_trait;

use cash_track_core::{
    CategoryAmount, ChannelAmount, Confirmation, DashboardSummary, DateRange, NewTransaction,
    OcrUpdate, RangeFilter, Repository, Result, SummaryQuery, SummaryTotals, Transaction, User,
};

use crate::error::PersistenceError;
use crate::{dashboard, transactions, users, SqliteClient};

#[derive(Clone)]
pub struct SqliteRepository {
    client: SqliteClient,
}

impl SqliteRepository {
    pub fn new(client: SqliteClient) -> Self {
        Self { client }
    }

    /// In-memory repository with the schema and default user in place
    pub async fn in_memory() -> std::result::Result<Self, PersistenceError> {
        let repository = Self::new(SqliteClient::open_in_memory().await?);
        repository.ensure_default().await?;
        Ok(repository)
    }

    pub(crate) async fn ensure_default(&self) -> std::result::Result<User, PersistenceError> {
        self.client.run(users::ensure_default).await
    }

    pub fn client(&self) -> &SqliteClient {
        &self.client
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn create_transaction(
        &self,
        user_id: i64,
        fields: NewTransaction,
    ) -> Result<Transaction> {
        let tx = self
            .client
            .run(move |conn| transactions::insert(conn, user_id, &fields))
            .await?;
        tracing::debug!(
            user_id,
            transaction_id = tx.id,
            status = tx.status.as_str(),
            "Transaction created"
        );
        Ok(tx)
    }

    async fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        Ok(self.client.run(move |conn| transactions::get(conn, id)).await?)
    }

    async fn update_ocr_result(&self, id: i64, update: OcrUpdate) -> Result<()> {
        let updated = self
            .client
            .run(move |conn| transactions::update_ocr_result(conn, id, &update))
            .await?;
        if !updated {
            return Err(PersistenceError::NotFound(format!("transaction {}", id)).into());
        }
        Ok(())
    }

    async fn confirm_transaction(&self, id: i64, confirmation: Confirmation) -> Result<bool> {
        Ok(self
            .client
            .run(move |conn| transactions::confirm(conn, id, &confirmation))
            .await?)
    }

    async fn delete_transaction(&self, id: i64) -> Result<bool> {
        Ok(self.client.run(move |conn| transactions::delete(conn, id)).await?)
    }

    async fn list_transactions(
        &self,
        user_id: i64,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Transaction>> {
        Ok(self
            .client
            .run(move |conn| transactions::list_recent(conn, user_id, limit, offset))
            .await?)
    }

    async fn list_transactions_in_range(
        &self,
        user_id: i64,
        filter: &RangeFilter,
    ) -> Result<Vec<Transaction>> {
        let filter = filter.clone();
        Ok(self
            .client
            .run(move |conn| transactions::list_in_range(conn, user_id, &filter))
            .await?)
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        Ok(self.client.run(move |conn| users::get(conn, user_id)).await?)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.client.run(users::list).await?)
    }

    async fn create_user(&self, name: &str) -> Result<User> {
        let name = name.to_string();
        Ok(self.client.run(move |conn| users::create(conn, &name)).await?)
    }

    async fn update_user_cutoff(&self, user_id: i64, cutoff_day: u32) -> Result<Option<User>> {
        Ok(self
            .client
            .run(move |conn| users::update_cutoff(conn, user_id, cutoff_day))
            .await?)
    }

    async fn delete_user(&self, user_id: i64) -> Result<bool> {
        Ok(self.client.run(move |conn| users::delete(conn, user_id)).await?)
    }

    async fn ensure_default_user(&self) -> Result<User> {
        Ok(self.ensure_default().await?)
    }

    async fn query_summary(&self, user_id: i64, query: &SummaryQuery) -> Result<SummaryTotals> {
        let query = query.clone();
        Ok(self
            .client
            .run(move |conn| dashboard::query_summary(conn, user_id, &query))
            .await?)
    }

    async fn dashboard_summary(&self, user_id: i64, range: DateRange) -> Result<DashboardSummary> {
        Ok(self
            .client
            .run(move |conn| dashboard::dashboard_summary(conn, user_id, range))
            .await?)
    }

    async fn expense_by_category(
        &self,
        user_id: i64,
        range: DateRange,
    ) -> Result<Vec<CategoryAmount>> {
        Ok(self
            .client
            .run(move |conn| dashboard::expense_by_category(conn, user_id, range))
            .await?)
    }

    async fn expense_by_channel(
        &self,
        user_id: i64,
        range: DateRange,
    ) -> Result<Vec<ChannelAmount>> {
        Ok(self
            .client
            .run(move |conn| dashboard::expense_by_channel(conn, user_id, range))
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cash_track_core::{
        Category, Channel, Direction, Error, SummaryDirection, TransactionStatus,
    };
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_in_memory_has_default_user() {
        let repo = SqliteRepository::in_memory().await.unwrap();
        let users = repo.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert!(users[0].is_default());
        assert_eq!(repo.ensure_default_user().await.unwrap().id, users[0].id);
    }

    #[tokio::test]
    async fn test_slip_lifecycle() {
        let repo = SqliteRepository::in_memory().await.unwrap();
        let user = repo.ensure_default_user().await.unwrap();

        let tx = repo
            .create_transaction(user.id, NewTransaction::pending_slip("0b6e.png"))
            .await
            .unwrap();
        assert_eq!(tx.status, TransactionStatus::Pending);

        repo.update_ocr_result(
            tx.id,
            OcrUpdate {
                raw_text: "96.00".to_string(),
                amount: Some(96.0),
                ..OcrUpdate::default()
            },
        )
        .await
        .unwrap();

        let confirmed = repo
            .confirm_transaction(
                tx.id,
                Confirmation {
                    amount: 96.0,
                    txn_date: Some(date(2026, 1, 30)),
                    direction: Direction::Expense,
                    channel: Some(Channel::Tmw),
                    account_label: None,
                    category: Some(Category::Food),
                    description: None,
                },
            )
            .await
            .unwrap();
        assert!(confirmed);

        let totals = repo
            .query_summary(
                user.id,
                &SummaryQuery {
                    direction: SummaryDirection::Expense,
                    range: DateRange::new(date(2026, 1, 1), date(2026, 1, 31)),
                    category: None,
                    channel: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(totals.total_expense, 96.0);
    }

    #[tokio::test]
    async fn test_update_ocr_result_missing_row() {
        let repo = SqliteRepository::in_memory().await.unwrap();
        let err = repo.update_ocr_result(404, OcrUpdate::default()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_duplicate_user_maps_to_conflict() {
        let repo = SqliteRepository::in_memory().await.unwrap();
        repo.create_user("dana").await.unwrap();
        let err = repo.create_user("dana").await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));

        let err = repo.create_user("default").await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn test_invalid_cutoff_maps_to_invalid_input() {
        let repo = SqliteRepository::in_memory().await.unwrap();
        let user = repo.ensure_default_user().await.unwrap();
        let err = repo.update_user_cutoff(user.id, 45).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
