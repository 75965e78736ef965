use std::sync::Arc;

use chrono::{Days, Months, NaiveDate, NaiveTime, Utc};

use childcare_ops::workflows::income_review::{
    ChildId, DateRange, IncomeNotificationType, IncomeReviewScheduler, InMemoryIncomeReviewStore,
    NotificationConfig, PlacementType, RecordingEmailClient,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[test]
fn one_run_covers_new_customers_and_expiring_incomes() {
    let store = Arc::new(InMemoryIncomeReviewStore::default());
    let emails = Arc::new(RecordingEmailClient::default());
    let scheduler = IncomeReviewScheduler::new(
        store.clone(),
        emails.clone(),
        NotificationConfig::default(),
    );

    let today = date(2024, 2, 1);
    let now = today
        .and_time(NaiveTime::from_hms_opt(21, 0, 0).expect("valid time"))
        .and_utc();

    // Household A: first invoiced placement starts mid-month, partner on file.
    let head_a = store.add_person(Some("head.a@example.com"));
    let partner_a = store.add_person(Some("partner.a@example.com"));
    store.add_partnership(head_a, partner_a, DateRange::new(today, None));
    let child_a = ChildId::random();
    store.add_child_link(child_a, head_a, DateRange::finite(today, today + Months::new(12)));
    let placement_a = store.add_placement(
        child_a,
        PlacementType::Daycare,
        DateRange::finite(today + Days::new(14), today + Months::new(6)),
    );
    store.add_service_need(
        placement_a,
        DateRange::finite(today + Days::new(14), today + Months::new(6)),
    );

    // Household B: long-standing customer whose income ends in four weeks.
    let head_b = store.add_person(Some("head.b@example.com"));
    let child_b = ChildId::random();
    store.add_child_link(
        child_b,
        head_b,
        DateRange::finite(today - Months::new(18), today + Months::new(6)),
    );
    let placement_b = store.add_placement(
        child_b,
        PlacementType::DaycarePartTime,
        DateRange::finite(today - Months::new(18), today + Months::new(6)),
    );
    store.add_service_need(
        placement_b,
        DateRange::finite(today - Months::new(18), today + Months::new(6)),
    );
    store.add_income(head_b, today - Months::new(10), Some(today + Days::new(28)));

    let summary = scheduler.run_review(now).expect("run succeeds");

    assert_eq!(summary.reference_date, today);
    assert_eq!(summary.households_reviewed, 2);
    assert_eq!(summary.notifications.len(), 3);
    assert_eq!(summary.skipped_missing_email, 0);

    let head_a_log = scheduler
        .notifications_for(head_a)
        .expect("log readable");
    assert_eq!(head_a_log.len(), 1);
    assert_eq!(
        head_a_log[0].notification_type,
        IncomeNotificationType::NewCustomer
    );
    assert_eq!(head_a_log[0].sent_at, now);

    let partner_log = scheduler
        .notifications_for(partner_a)
        .expect("log readable");
    assert_eq!(partner_log.len(), 1);
    assert_eq!(
        partner_log[0].notification_type,
        IncomeNotificationType::NewCustomer
    );

    let head_b_log = scheduler
        .notifications_for(head_b)
        .expect("log readable");
    assert_eq!(head_b_log.len(), 1);
    assert_eq!(
        head_b_log[0].notification_type,
        IncomeNotificationType::ExpiringIncome
    );

    let messages = emails.messages();
    assert_eq!(messages.len(), 3);
    let expiring: Vec<_> = messages
        .iter()
        .filter(|message| message.subject.contains("about to expire"))
        .collect();
    assert_eq!(expiring.len(), 1);
    assert_eq!(expiring[0].to, "head.b@example.com");
}

#[test]
fn repository_state_drives_each_run_independently() {
    let store = Arc::new(InMemoryIncomeReviewStore::default());
    let emails = Arc::new(RecordingEmailClient::default());
    let scheduler = IncomeReviewScheduler::new(
        store.clone(),
        emails.clone(),
        NotificationConfig::default(),
    );

    let today = date(2024, 5, 2);
    let now = today.and_time(NaiveTime::MIN).and_utc();

    let head = store.add_person(Some("head@example.com"));
    let child = ChildId::random();
    store.add_child_link(child, head, DateRange::new(today, None));
    let placement = store.add_placement(
        child,
        PlacementType::Daycare,
        DateRange::finite(today + Days::new(5), today + Months::new(12)),
    );
    store.add_service_need(
        placement,
        DateRange::finite(today + Days::new(5), today + Months::new(12)),
    );

    scheduler.run_review(now).expect("first run");

    // Once an income statement arrives, the next run finds nothing to send.
    store.add_income_statement(childcare_ops::workflows::income_review::IncomeStatement {
        person: head,
        status: childcare_ops::workflows::income_review::IncomeStatementStatus::Sent,
        handled_at: None,
    });

    let second = scheduler.run_review(now).expect("second run");

    assert!(second.notifications.is_empty());
    assert_eq!(emails.messages().len(), 1);
    assert_eq!(scheduler.notifications_for(head).expect("log").len(), 1);
}

#[test]
fn run_on_utc_now_reaches_a_clean_summary() {
    let store = Arc::new(InMemoryIncomeReviewStore::default());
    let emails = Arc::new(RecordingEmailClient::default());
    let scheduler = IncomeReviewScheduler::new(store, emails, NotificationConfig::default());

    let summary = scheduler.run_review(Utc::now()).expect("empty run succeeds");

    assert_eq!(summary.households_reviewed, 0);
    assert!(summary.notifications.is_empty());
}
