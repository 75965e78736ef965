use std::sync::Arc;

use chrono::{DateTime, Days, Months, NaiveDate, NaiveTime, Utc};

use crate::workflows::income_review::domain::{
    ChildId, DateRange, IncomeNotification, IncomeStatement, IncomeStatementStatus, PersonId,
    PlacementId, PlacementType,
};
use crate::workflows::income_review::eligibility::NotificationConfig;
use crate::workflows::income_review::email::{EmailMessage, RecordingEmailClient};
use crate::workflows::income_review::memory::InMemoryIncomeReviewStore;
use crate::workflows::income_review::scheduler::{IncomeReviewScheduler, RunSummary};

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Reference instant for the default scenario: the evening batch window on
/// the first day of February 2024.
pub(super) fn reference_now() -> DateTime<Utc> {
    at_evening(reference_date())
}

pub(super) fn reference_date() -> NaiveDate {
    date(2024, 2, 1)
}

pub(super) fn at_evening(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::from_hms_opt(21, 0, 0).expect("valid time"))
        .and_utc()
}

/// Default placement window: starts two weeks into the reference month and
/// runs for six months.
pub(super) fn placement_start() -> NaiveDate {
    reference_date() + Days::new(14)
}

pub(super) fn placement_end() -> NaiveDate {
    reference_date() + Months::new(6)
}

pub(super) type TestScheduler =
    IncomeReviewScheduler<InMemoryIncomeReviewStore, RecordingEmailClient>;

/// One head of household with one linked child, mirroring the baseline
/// scenario every suppression case builds on.
pub(super) struct Fixture {
    pub(super) store: Arc<InMemoryIncomeReviewStore>,
    pub(super) emails: Arc<RecordingEmailClient>,
    pub(super) scheduler: TestScheduler,
    pub(super) head: PersonId,
    pub(super) child: ChildId,
}

impl Fixture {
    pub(super) fn new() -> Self {
        Self::with_head_email(Some("guardian@example.com"))
    }

    pub(super) fn with_head_email(email: Option<&str>) -> Self {
        let store = Arc::new(InMemoryIncomeReviewStore::default());
        let emails = Arc::new(RecordingEmailClient::default());
        let scheduler = IncomeReviewScheduler::new(
            store.clone(),
            emails.clone(),
            NotificationConfig::default(),
        );

        let head = store.add_person(email);
        let child = ChildId::random();
        store.add_child_link(
            child,
            head,
            DateRange::finite(reference_date(), reference_date() + Months::new(12)),
        );

        Self {
            store,
            emails,
            scheduler,
            head,
            child,
        }
    }

    /// Invoiced placement with a confirmed service need over the same period.
    pub(super) fn billable_placement(
        &self,
        child: ChildId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> PlacementId {
        let placement =
            self.store
                .add_placement(child, PlacementType::Daycare, DateRange::finite(start, end));
        self.store
            .add_service_need(placement, DateRange::finite(start, end));
        placement
    }

    pub(super) fn placement_of_type(
        &self,
        child: ChildId,
        placement_type: PlacementType,
        start: NaiveDate,
        end: NaiveDate,
        confirmed: bool,
    ) -> PlacementId {
        let placement = self
            .store
            .add_placement(child, placement_type, DateRange::finite(start, end));
        if confirmed {
            self.store
                .add_service_need(placement, DateRange::finite(start, end));
        }
        placement
    }

    /// Second child linked to `head` for the established-customer scenarios.
    pub(super) fn linked_child(&self, head: PersonId, from: NaiveDate, to: NaiveDate) -> ChildId {
        let child = ChildId::random();
        self.store
            .add_child_link(child, head, DateRange::finite(from, to));
        child
    }

    /// Partner registered for the reference day only, as partnerships are in
    /// the baseline co-notification scenario.
    pub(super) fn add_partner(&self, email: Option<&str>) -> PersonId {
        let partner = self.store.add_person(email);
        self.store.add_partnership(
            self.head,
            partner,
            DateRange::finite(reference_date(), reference_date()),
        );
        partner
    }

    pub(super) fn add_sent_statement(&self, person: PersonId) {
        self.store.add_income_statement(IncomeStatement {
            person,
            status: IncomeStatementStatus::Sent,
            handled_at: None,
        });
    }

    pub(super) fn add_handled_statement(&self, person: PersonId) {
        self.store.add_income_statement(IncomeStatement {
            person,
            status: IncomeStatementStatus::Handled,
            handled_at: Some(reference_now()),
        });
    }

    pub(super) fn run(&self) -> RunSummary {
        self.run_at(reference_now())
    }

    pub(super) fn run_at(&self, now: DateTime<Utc>) -> RunSummary {
        self.scheduler.run_review(now).expect("review run succeeds")
    }

    pub(super) fn sent_emails(&self) -> Vec<EmailMessage> {
        self.emails.messages()
    }

    pub(super) fn notifications_for(&self, person: PersonId) -> Vec<IncomeNotification> {
        self.store
            .notifications()
            .into_iter()
            .filter(|notification| notification.receiver == person)
            .collect()
    }
}
