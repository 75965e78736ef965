use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info};

use super::domain::{IncomeNotification, IncomeNotificationType, PersonId};
use super::eligibility::{
    EligibilityEngine, HouseholdSnapshot, NotificationConfig, PersonProfile, PlannedNotification,
};
use super::email::{notification_message, EmailClient, EmailError, EmailMessage};
use super::repository::{IncomeReviewStore, IncomeReviewTx, RepositoryError};

/// Batch job deciding, for every head of household with a billable placement,
/// whether an income notification is due, and dispatching exactly one email
/// per persisted notification row.
///
/// Eligibility is recomputed from source facts on every run; the notification
/// log is append-only and never consulted for suppression. The caller is
/// responsible for invoking at most one run at a time.
pub struct IncomeReviewScheduler<S, E> {
    store: Arc<S>,
    emails: Arc<E>,
    engine: EligibilityEngine,
}

impl<S, E> IncomeReviewScheduler<S, E>
where
    S: IncomeReviewStore + 'static,
    E: EmailClient + 'static,
{
    pub fn new(store: Arc<S>, emails: Arc<E>, config: NotificationConfig) -> Self {
        Self {
            store,
            emails,
            engine: EligibilityEngine::new(config),
        }
    }

    /// Evaluate and persist under one transaction, then dispatch the outbound
    /// mail. A repository failure aborts before commit and leaves no partial
    /// notification rows; an email transport failure surfaces after the log
    /// rows are already durable.
    pub fn run_review(&self, now: DateTime<Utc>) -> Result<RunSummary, IncomeReviewError> {
        let mut tx = self.store.begin()?;
        let outcome = self.evaluate(&mut tx, now)?;
        tx.commit()?;

        for message in outcome.outbox {
            self.emails.send(message)?;
        }

        Ok(outcome.summary)
    }

    /// Evaluation-and-staging step for callers owning their own transaction
    /// boundary. Stages one notification row per planned recipient and
    /// returns the messages to send once that transaction commits.
    pub fn evaluate<T: IncomeReviewTx>(
        &self,
        tx: &mut T,
        now: DateTime<Utc>,
    ) -> Result<ReviewOutcome, IncomeReviewError> {
        let today = now.date_naive();
        let heads = tx.heads_of_household(today)?;

        let mut seen: HashSet<(PersonId, IncomeNotificationType)> = HashSet::new();
        let mut notifications = Vec::new();
        let mut outbox = Vec::new();
        let mut skipped_missing_email = 0;

        for head in &heads {
            let household = self.assemble_household(tx, *head, today)?;

            for planned in self.engine.review(&household, today) {
                if !seen.insert((planned.receiver, planned.notification_type)) {
                    continue;
                }

                match tx.email_address(planned.receiver)? {
                    Some(address) => {
                        tx.stage_notification(IncomeNotification {
                            receiver: planned.receiver,
                            notification_type: planned.notification_type,
                            sent_at: now,
                        })?;
                        outbox.push(notification_message(&address, planned.notification_type));
                        notifications.push(planned);
                    }
                    None => {
                        debug!(
                            receiver = %planned.receiver.0,
                            notification_type = planned.notification_type.label(),
                            "skipping income notification: no email address on file"
                        );
                        skipped_missing_email += 1;
                    }
                }
            }
        }

        info!(
            households = heads.len(),
            notifications = notifications.len(),
            skipped_missing_email,
            reference_date = %today,
            "income review evaluated"
        );

        Ok(ReviewOutcome {
            summary: RunSummary {
                reference_date: today,
                households_reviewed: heads.len(),
                notifications,
                skipped_missing_email,
            },
            outbox,
        })
    }

    /// Notification log for one recipient, read in its own transaction.
    pub fn notifications_for(
        &self,
        receiver: PersonId,
    ) -> Result<Vec<IncomeNotification>, IncomeReviewError> {
        let mut tx = self.store.begin()?;
        Ok(tx.income_notifications(receiver)?)
    }

    fn assemble_household<T: IncomeReviewTx>(
        &self,
        tx: &mut T,
        head: PersonId,
        today: NaiveDate,
    ) -> Result<HouseholdSnapshot, IncomeReviewError> {
        let partner = tx.active_partner(head, today)?;

        let mut children = tx.children_of(head, today)?;
        if let Some(partner) = partner {
            children.extend(tx.children_of(partner, today)?);
        }
        children.sort();
        children.dedup();

        let mut placements = Vec::new();
        for child in children {
            placements.extend(tx.placements_for(child)?);
        }

        Ok(HouseholdSnapshot {
            head: self.person_profile(tx, head)?,
            partner: partner
                .map(|partner| self.person_profile(tx, partner))
                .transpose()?,
            placements,
        })
    }

    fn person_profile<T: IncomeReviewTx>(
        &self,
        tx: &mut T,
        person: PersonId,
    ) -> Result<PersonProfile, IncomeReviewError> {
        Ok(PersonProfile {
            id: person,
            has_pending_statement: tx.has_pending_income_statement(person)?,
            incomes: tx.incomes_for(person)?,
        })
    }
}

/// Staged result of one evaluation pass: the summary to report and the mail
/// to dispatch after the owning transaction commits.
#[derive(Debug)]
pub struct ReviewOutcome {
    pub summary: RunSummary,
    pub outbox: Vec<EmailMessage>,
}

/// What one run did, for the HTTP endpoint and the CLI rendering.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub reference_date: NaiveDate,
    pub households_reviewed: usize,
    pub notifications: Vec<PlannedNotification>,
    pub skipped_missing_email: usize,
}

/// Error raised by the income review job.
#[derive(Debug, thiserror::Error)]
pub enum IncomeReviewError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Email(#[from] EmailError),
}
