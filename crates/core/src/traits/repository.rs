//! Storage trait

use async_trait::async_trait;

use crate::query::{
    CategoryAmount, ChannelAmount, DashboardSummary, DateRange, RangeFilter, SummaryQuery,
    SummaryTotals,
};
use crate::transaction::{Confirmation, NewTransaction, OcrUpdate, Transaction};
use crate::user::User;
use crate::Result;

/// Durable store for users and their transactions
///
/// Every transaction operation is scoped by `user_id`; aggregates count only
/// confirmed rows.
#[async_trait]
pub trait Repository: Send + Sync + 'static {
    // Transactions

    async fn create_transaction(&self, user_id: i64, fields: NewTransaction) -> Result<Transaction>;

    async fn get_transaction(&self, id: i64) -> Result<Option<Transaction>>;

    /// Store recognition output for a slip row; status is untouched
    async fn update_ocr_result(&self, id: i64, update: OcrUpdate) -> Result<()>;

    /// Overwrite editable fields and mark the row confirmed.
    /// Returns false if no such row exists.
    async fn confirm_transaction(&self, id: i64, confirmation: Confirmation) -> Result<bool>;

    async fn delete_transaction(&self, id: i64) -> Result<bool>;

    /// Newest first
    async fn list_transactions(
        &self,
        user_id: i64,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Transaction>>;

    /// Confirmed rows whose effective date lies in the range
    async fn list_transactions_in_range(
        &self,
        user_id: i64,
        filter: &RangeFilter,
    ) -> Result<Vec<Transaction>>;

    // Users

    async fn get_user(&self, user_id: i64) -> Result<Option<User>>;

    async fn list_users(&self) -> Result<Vec<User>>;

    /// Fails with `Error::Conflict` if the name is taken
    async fn create_user(&self, name: &str) -> Result<User>;

    async fn update_user_cutoff(&self, user_id: i64, cutoff_day: u32) -> Result<Option<User>>;

    /// Also removes the user's transactions
    async fn delete_user(&self, user_id: i64) -> Result<bool>;

    /// Create the implicit default user if missing and adopt ownerless rows
    async fn ensure_default_user(&self) -> Result<User>;

    // Aggregates

    async fn query_summary(&self, user_id: i64, query: &SummaryQuery) -> Result<SummaryTotals>;

    async fn dashboard_summary(&self, user_id: i64, range: DateRange) -> Result<DashboardSummary>;

    async fn expense_by_category(
        &self,
        user_id: i64,
        range: DateRange,
    ) -> Result<Vec<CategoryAmount>>;

    async fn expense_by_channel(
        &self,
        user_id: i64,
        range: DateRange,
    ) -> Result<Vec<ChannelAmount>>;
}
