//! Business logic services.
//!
//! Services contain the logic separated from HTTP handlers: where budget
//! data comes from, how it is cached, and how a new expense is turned into
//! a transaction on the budgeting service.

pub mod cache;
pub mod fixtures;
pub mod snapshot_builder;
pub mod submission;
pub mod ynab;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{snapshot::Snapshot, transaction::Transaction},
};

/// Where snapshots come from and where new transactions go.
///
/// The live budgeting service and the canned fixture datasets are both
/// data sources; each one gets its own [`cache::SnapshotCache`].
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Fetch a complete snapshot.
    async fn load(&self) -> Result<Snapshot, AppError>;

    /// Record `tx` on the source. `snapshot` is the data `tx` was resolved against.
    async fn create_transaction(
        &self,
        snapshot: &Snapshot,
        tx: &Transaction,
    ) -> Result<(), AppError>;
}
