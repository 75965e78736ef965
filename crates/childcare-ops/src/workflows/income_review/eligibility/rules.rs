use chrono::{Datelike, NaiveDate};

use super::super::domain::{Income, PlacementSummary};

/// Confirmed service-need start dates of the household's invoiced placements.
fn invoiced_need_starts(placements: &[PlacementSummary]) -> impl Iterator<Item = NaiveDate> + '_ {
    placements
        .iter()
        .filter(|placement| placement.placement_type.invoiced())
        .flat_map(|placement| placement.service_needs.iter().map(|need| need.start))
}

pub(crate) fn starts_in_month(date: NaiveDate, reference: NaiveDate) -> bool {
    date.year() == reference.year() && date.month() == reference.month()
}

/// Whether the household carries any current-or-upcoming billable placement:
/// an invoiced type with a confirmed service need ending on or after `today`.
pub(crate) fn has_billable_on_or_after(placements: &[PlacementSummary], today: NaiveDate) -> bool {
    placements
        .iter()
        .filter(|placement| placement.placement_type.invoiced())
        .any(|placement| {
            placement
                .service_needs
                .iter()
                .any(|need| need.ends_on_or_after(today))
        })
}

/// A household is a new customer when billing starts in the reference month
/// and did not start earlier: some invoiced service need begins within the
/// month, and none begins before it. Non-invoiced placements and placements
/// without a confirmed service need count for neither side.
pub(crate) fn new_customer_this_month(placements: &[PlacementSummary], today: NaiveDate) -> bool {
    let month_start = today.with_day(1).unwrap_or(today);
    let mut starts_this_month = false;
    for start in invoiced_need_starts(placements) {
        if start < month_start {
            return false;
        }
        if starts_in_month(start, today) {
            starts_this_month = true;
        }
    }
    starts_this_month
}

/// An income record is on file while it is open-ended or has not yet ended.
/// An already-expired record does not count.
pub(crate) fn income_on_file(incomes: &[Income], today: NaiveDate) -> bool {
    incomes
        .iter()
        .any(|income| income.valid_to.map(|end| end >= today).unwrap_or(true))
}

/// The expiry reminder fires only on an exact match of the lead date.
pub(crate) fn income_expiring_on(incomes: &[Income], match_date: NaiveDate) -> bool {
    incomes
        .iter()
        .any(|income| income.valid_to == Some(match_date))
}
