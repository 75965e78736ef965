use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

const DEFAULT_EXPIRY_LEAD_DAYS: u32 = 28;

/// Dials for the income review pass. The expiry lead is the exact distance
/// between the reference date and an income record's end date at which the
/// renewal reminder goes out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationConfig {
    pub income_expiry_lead_days: u32,
}

impl NotificationConfig {
    /// The income end date that triggers an expiry reminder when evaluated at
    /// `today`. `None` only on calendar overflow, which no caller reaches.
    pub fn expiry_match_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        today.checked_add_days(Days::new(u64::from(self.income_expiry_lead_days)))
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            income_expiry_lead_days: DEFAULT_EXPIRY_LEAD_DAYS,
        }
    }
}
