use chrono::NaiveDate;

use super::domain::{ChildId, Income, IncomeNotification, PersonId, PlacementSummary};

/// Storage abstraction opening one transaction per scheduler run, so the
/// evaluation reads and the notification log writes share a boundary.
pub trait IncomeReviewStore: Send + Sync {
    type Tx: IncomeReviewTx;

    fn begin(&self) -> Result<Self::Tx, RepositoryError>;
}

/// A single transaction over the placement, income, and notification tables.
/// All reads return plain data records; staged notification rows are only
/// visible to other readers once `commit` succeeds.
pub trait IncomeReviewTx {
    /// Adults with an active child link at `today`.
    fn heads_of_household(&mut self, today: NaiveDate) -> Result<Vec<PersonId>, RepositoryError>;

    fn children_of(&mut self, head: PersonId, today: NaiveDate)
        -> Result<Vec<ChildId>, RepositoryError>;

    fn active_partner(
        &mut self,
        person: PersonId,
        today: NaiveDate,
    ) -> Result<Option<PersonId>, RepositoryError>;

    /// Placements for a child joined with their confirmed service needs.
    fn placements_for(&mut self, child: ChildId) -> Result<Vec<PlacementSummary>, RepositoryError>;

    /// Whether the person has a sent, not yet handled income statement.
    fn has_pending_income_statement(&mut self, person: PersonId) -> Result<bool, RepositoryError>;

    fn incomes_for(&mut self, person: PersonId) -> Result<Vec<Income>, RepositoryError>;

    fn email_address(&mut self, person: PersonId) -> Result<Option<String>, RepositoryError>;

    fn income_notifications(
        &mut self,
        receiver: PersonId,
    ) -> Result<Vec<IncomeNotification>, RepositoryError>;

    /// Queue a notification row for insertion at commit time.
    fn stage_notification(&mut self, notification: IncomeNotification)
        -> Result<(), RepositoryError>;

    fn commit(self) -> Result<(), RepositoryError>
    where
        Self: Sized;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
