use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use super::domain::{
    ChildId, ChildLink, DateRange, Income, IncomeNotification, IncomeStatement, Partnership,
    Person, PersonId, PlacementId, PlacementSummary, PlacementType,
};
use super::repository::{IncomeReviewStore, IncomeReviewTx, RepositoryError};

/// Seedable reference store backing tests, the demo walkthrough, and the
/// default server wiring. The relational schema itself is an external
/// collaborator; a SQL adapter would implement the same traits.
#[derive(Default, Clone)]
pub struct InMemoryIncomeReviewStore {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    persons: Vec<Person>,
    child_links: Vec<ChildLink>,
    partnerships: Vec<Partnership>,
    placements: Vec<PlacementSummary>,
    income_statements: Vec<IncomeStatement>,
    incomes: Vec<Income>,
    notifications: Vec<IncomeNotification>,
}

impl InMemoryIncomeReviewStore {
    pub fn add_person(&self, email: Option<&str>) -> PersonId {
        let id = PersonId::random();
        self.lock().persons.push(Person {
            id,
            email: email.map(str::to_string),
        });
        id
    }

    pub fn add_child_link(&self, child: ChildId, head: PersonId, valid: DateRange) {
        self.lock().child_links.push(ChildLink {
            child,
            head_of_household: head,
            valid,
        });
    }

    pub fn add_partnership(&self, first: PersonId, second: PersonId, valid: DateRange) {
        self.lock().partnerships.push(Partnership {
            first,
            second,
            valid,
        });
    }

    pub fn add_placement(
        &self,
        child: ChildId,
        placement_type: PlacementType,
        period: DateRange,
    ) -> PlacementId {
        let id = PlacementId::random();
        self.lock().placements.push(PlacementSummary {
            id,
            child,
            placement_type,
            period,
            service_needs: Vec::new(),
        });
        id
    }

    pub fn add_service_need(&self, placement: PlacementId, period: DateRange) {
        let mut state = self.lock();
        let summary = state
            .placements
            .iter_mut()
            .find(|candidate| candidate.id == placement)
            .expect("service need references a seeded placement");
        summary.service_needs.push(period);
    }

    pub fn add_income_statement(&self, statement: IncomeStatement) {
        self.lock().income_statements.push(statement);
    }

    pub fn add_income(&self, person: PersonId, valid_from: NaiveDate, valid_to: Option<NaiveDate>) {
        self.lock().incomes.push(Income {
            person,
            valid_from,
            valid_to,
        });
    }

    /// Committed notification rows, for inspection outside a transaction.
    pub fn notifications(&self) -> Vec<IncomeNotification> {
        self.lock().notifications.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().expect("store mutex poisoned")
    }
}

impl IncomeReviewStore for InMemoryIncomeReviewStore {
    type Tx = MemoryTx;

    fn begin(&self) -> Result<Self::Tx, RepositoryError> {
        Ok(MemoryTx {
            state: self.state.clone(),
            staged: Vec::new(),
        })
    }
}

/// Transaction over the in-memory state; notification inserts are staged and
/// applied atomically on commit.
pub struct MemoryTx {
    state: Arc<Mutex<MemoryState>>,
    staged: Vec<IncomeNotification>,
}

impl MemoryTx {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
    }
}

impl IncomeReviewTx for MemoryTx {
    fn heads_of_household(&mut self, today: NaiveDate) -> Result<Vec<PersonId>, RepositoryError> {
        let state = self.lock()?;
        let heads: BTreeSet<PersonId> = state
            .child_links
            .iter()
            .filter(|link| link.valid.contains(today))
            .map(|link| link.head_of_household)
            .collect();
        Ok(heads.into_iter().collect())
    }

    fn children_of(
        &mut self,
        head: PersonId,
        today: NaiveDate,
    ) -> Result<Vec<ChildId>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .child_links
            .iter()
            .filter(|link| link.head_of_household == head && link.valid.contains(today))
            .map(|link| link.child)
            .collect())
    }

    fn active_partner(
        &mut self,
        person: PersonId,
        today: NaiveDate,
    ) -> Result<Option<PersonId>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .partnerships
            .iter()
            .filter(|partnership| partnership.valid.contains(today))
            .find_map(|partnership| partnership.partner_of(person)))
    }

    fn placements_for(&mut self, child: ChildId) -> Result<Vec<PlacementSummary>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .placements
            .iter()
            .filter(|placement| placement.child == child)
            .cloned()
            .collect())
    }

    fn has_pending_income_statement(&mut self, person: PersonId) -> Result<bool, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .income_statements
            .iter()
            .any(|statement| statement.person == person && statement.is_pending()))
    }

    fn incomes_for(&mut self, person: PersonId) -> Result<Vec<Income>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .incomes
            .iter()
            .filter(|income| income.person == person)
            .copied()
            .collect())
    }

    fn email_address(&mut self, person: PersonId) -> Result<Option<String>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .persons
            .iter()
            .find(|candidate| candidate.id == person)
            .and_then(|candidate| candidate.email.clone()))
    }

    fn income_notifications(
        &mut self,
        receiver: PersonId,
    ) -> Result<Vec<IncomeNotification>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .notifications
            .iter()
            .filter(|notification| notification.receiver == receiver)
            .cloned()
            .collect())
    }

    fn stage_notification(
        &mut self,
        notification: IncomeNotification,
    ) -> Result<(), RepositoryError> {
        self.staged.push(notification);
        Ok(())
    }

    fn commit(mut self) -> Result<(), RepositoryError> {
        let staged = std::mem::take(&mut self.staged);
        let mut state = self.lock()?;
        state.notifications.extend(staged);
        Ok(())
    }
}
