mod config;
mod rules;

pub use config::NotificationConfig;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{Income, IncomeNotificationType, PersonId, PlacementSummary};

/// Per-person facts feeding the suppression checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonProfile {
    pub id: PersonId,
    pub has_pending_statement: bool,
    pub incomes: Vec<Income>,
}

/// Everything the engine needs to judge one household: the head, the active
/// partner if any, and the placements of all children linked to either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HouseholdSnapshot {
    pub head: PersonProfile,
    pub partner: Option<PersonProfile>,
    pub placements: Vec<PlacementSummary>,
}

impl HouseholdSnapshot {
    fn members(&self) -> impl Iterator<Item = &PersonProfile> {
        std::iter::once(&self.head).chain(self.partner.as_ref())
    }
}

/// Notification the scheduler should dispatch for one recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedNotification {
    pub receiver: PersonId,
    pub notification_type: IncomeNotificationType,
}

/// Stateless evaluator applying the income review rules to one household.
///
/// Qualification is household-scoped (any linked child's placements count for
/// every member); suppression is per person. An income record on file keeps
/// its owner out of the new-customer pass, so the two rules are mutually
/// exclusive for one person within a run.
#[derive(Debug, Clone)]
pub struct EligibilityEngine {
    config: NotificationConfig,
}

impl EligibilityEngine {
    pub fn new(config: NotificationConfig) -> Self {
        Self { config }
    }

    pub fn review(&self, household: &HouseholdSnapshot, today: NaiveDate) -> Vec<PlannedNotification> {
        if !rules::has_billable_on_or_after(&household.placements, today) {
            return Vec::new();
        }

        let new_customer = rules::new_customer_this_month(&household.placements, today);
        let expiry_match = self.config.expiry_match_date(today);

        household
            .members()
            .filter_map(|member| {
                if member.has_pending_statement {
                    return None;
                }

                let expiring = expiry_match
                    .map(|date| rules::income_expiring_on(&member.incomes, date))
                    .unwrap_or(false);

                let notification_type = if expiring {
                    IncomeNotificationType::ExpiringIncome
                } else if new_customer && !rules::income_on_file(&member.incomes, today) {
                    IncomeNotificationType::NewCustomer
                } else {
                    return None;
                };

                Some(PlannedNotification {
                    receiver: member.id,
                    notification_type,
                })
            })
            .collect()
    }
}
