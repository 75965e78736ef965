use crate::infra::parse_date;
use chrono::{Days, Local, Months, NaiveDate, NaiveTime};
use clap::Args;
use std::sync::Arc;

use childcare_ops::error::AppError;
use childcare_ops::workflows::income_review::{
    ChildId, DateRange, IncomeReviewScheduler, IncomeStatement, IncomeStatementStatus,
    InMemoryIncomeReviewStore, NotificationConfig, PersonId, PlacementType, RecordingEmailClient,
};

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Reference date for the run (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

/// Seeds three representative households and runs one income review pass:
/// a family starting daycare this month (with a registered partner), an
/// established customer whose income expires in four weeks, and a family
/// already covered by a pending income statement.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let now = today.and_time(NaiveTime::MIN).and_utc();

    let store = Arc::new(InMemoryIncomeReviewStore::default());
    let emails = Arc::new(RecordingEmailClient::default());
    let scheduler = IncomeReviewScheduler::new(
        store.clone(),
        emails.clone(),
        NotificationConfig::default(),
    );

    let mut names: Vec<(PersonId, &'static str)> = Vec::new();

    // Household A: first invoiced placement starts in two weeks.
    let head_a = store.add_person(Some("alma.virtanen@example.com"));
    let partner_a = store.add_person(Some("benjamin.virtanen@example.com"));
    names.push((head_a, "Alma (head of household)"));
    names.push((partner_a, "Benjamin (partner)"));
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

    // Household B: established customer, income valid for four more weeks.
    let head_b = store.add_person(Some("cecilia.laine@example.com"));
    names.push((head_b, "Cecilia (head of household)"));
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

    // Household C: placement starts this month but a statement is already in.
    let head_c = store.add_person(Some("daniel.korhonen@example.com"));
    names.push((head_c, "Daniel (head of household)"));
    let child_c = ChildId::random();
    store.add_child_link(child_c, head_c, DateRange::finite(today, today + Months::new(12)));
    let placement_c = store.add_placement(
        child_c,
        PlacementType::Daycare,
        DateRange::finite(today + Days::new(7), today + Months::new(6)),
    );
    store.add_service_need(
        placement_c,
        DateRange::finite(today + Days::new(7), today + Months::new(6)),
    );
    store.add_income_statement(IncomeStatement {
        person: head_c,
        status: IncomeStatementStatus::Sent,
        handled_at: None,
    });

    let summary = scheduler.run_review(now)?;

    println!("Income review demo");
    println!(
        "Reference date: {} ({} households reviewed)",
        summary.reference_date, summary.households_reviewed
    );

    if summary.notifications.is_empty() {
        println!("\nNotifications: none");
    } else {
        println!("\nNotifications");
        for notification in &summary.notifications {
            let name = names
                .iter()
                .find(|(id, _)| *id == notification.receiver)
                .map(|(_, name)| *name)
                .unwrap_or("unknown recipient");
            println!("- {}: {}", name, notification.notification_type.label());
        }
    }

    println!("\nDispatched mail");
    for message in emails.messages() {
        println!("- {} <- \"{}\"", message.to, message.subject);
    }

    if summary.skipped_missing_email > 0 {
        println!(
            "\nRecipients without an email address on file: {}",
            summary.skipped_missing_email
        );
    }

    println!(
        "\nDaniel's household is silent: a pending income statement suppresses both reminder types."
    );

    Ok(())
}
