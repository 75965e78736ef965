use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for an adult person (head of household or partner).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PersonId(pub Uuid);

impl PersonId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Identifier for a child in care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChildId(pub Uuid);

impl ChildId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Identifier for a placement of a child into a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacementId(pub Uuid);

impl PlacementId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Inclusive calendar interval; an absent end date means open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn finite(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && self.end.map(|end| date <= end).unwrap_or(true)
    }

    pub fn ends_on_or_after(&self, date: NaiveDate) -> bool {
        self.end.map(|end| end >= date).unwrap_or(true)
    }
}

/// Billing-relevant relationship between a child and the adult invoiced for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildLink {
    pub child: ChildId,
    pub head_of_household: PersonId,
    pub valid: DateRange,
}

/// Registered partnership between two adults, co-notified while active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partnership {
    pub first: PersonId,
    pub second: PersonId,
    pub valid: DateRange,
}

impl Partnership {
    /// Returns the other member when `person` belongs to this partnership.
    pub fn partner_of(&self, person: PersonId) -> Option<PersonId> {
        if self.first == person {
            Some(self.second)
        } else if self.second == person {
            Some(self.first)
        } else {
            None
        }
    }
}

/// Placement categories; only invoiced types participate in income review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementType {
    Daycare,
    DaycarePartTime,
    PreschoolDaycare,
    Preschool,
    Club,
}

impl PlacementType {
    /// Whether this placement category generates billing obligations.
    pub const fn invoiced(self) -> bool {
        matches!(
            self,
            PlacementType::Daycare | PlacementType::DaycarePartTime | PlacementType::PreschoolDaycare
        )
    }

    pub const fn label(self) -> &'static str {
        match self {
            PlacementType::Daycare => "daycare",
            PlacementType::DaycarePartTime => "daycare_part_time",
            PlacementType::PreschoolDaycare => "preschool_daycare",
            PlacementType::Preschool => "preschool",
            PlacementType::Club => "club",
        }
    }
}

/// Placement joined with its confirmed service-need periods. A placement
/// without a service need is not yet billable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementSummary {
    pub id: PlacementId,
    pub child: ChildId,
    pub placement_type: PlacementType,
    pub period: DateRange,
    pub service_needs: Vec<DateRange>,
}

/// Lifecycle of a citizen-submitted income statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeStatementStatus {
    Draft,
    Sent,
    Handled,
}

/// Income statement as stored; pending means sent and not yet handled by staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeStatement {
    pub person: PersonId,
    pub status: IncomeStatementStatus,
    pub handled_at: Option<DateTime<Utc>>,
}

impl IncomeStatement {
    pub fn is_pending(&self) -> bool {
        self.status == IncomeStatementStatus::Sent
    }
}

/// Effective declared income interval for a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Income {
    pub person: PersonId,
    pub valid_from: NaiveDate,
    pub valid_to: Option<NaiveDate>,
}

/// Reason a recipient is asked to submit or renew income information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeNotificationType {
    NewCustomer,
    ExpiringIncome,
}

impl IncomeNotificationType {
    pub const fn label(self) -> &'static str {
        match self {
            IncomeNotificationType::NewCustomer => "new_customer",
            IncomeNotificationType::ExpiringIncome => "expiring_income",
        }
    }
}

/// Append-only log entry recording one dispatched income notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeNotification {
    pub receiver: PersonId,
    pub notification_type: IncomeNotificationType,
    pub sent_at: DateTime<Utc>,
}

/// Contact details kept on file for an adult.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub email: Option<String>,
}
