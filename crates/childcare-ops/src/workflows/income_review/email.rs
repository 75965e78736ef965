use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::IncomeNotificationType;

/// Outbound message handed to the email capability; the transport itself is an
/// external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Injected email-sending capability.
pub trait EmailClient: Send + Sync {
    fn send(&self, message: EmailMessage) -> Result<(), EmailError>;
}

/// Email dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("email transport unavailable: {0}")]
    Transport(String),
}

/// Build the outbound message for a notification type. Bodies are templated by
/// type only; personalization stays out of the notification pipeline.
pub fn notification_message(to: &str, notification_type: IncomeNotificationType) -> EmailMessage {
    match notification_type {
        IncomeNotificationType::NewCustomer => EmailMessage {
            to: to.to_string(),
            subject: "Income information needed for early childhood education fees".to_string(),
            body: concat!(
                "Your child is starting in early childhood education this month. ",
                "To determine your client fee, please submit an income statement ",
                "through the citizen portal, or accept the highest fee category. ",
                "If no statement is received, the highest fee will be applied.",
            )
            .to_string(),
        },
        IncomeNotificationType::ExpiringIncome => EmailMessage {
            to: to.to_string(),
            subject: "Your income information is about to expire".to_string(),
            body: concat!(
                "The income information used for your early childhood education ",
                "fees is about to expire. Please submit a new income statement ",
                "through the citizen portal within four weeks so your client fee ",
                "can be reviewed without interruption.",
            )
            .to_string(),
        },
    }
}

/// Records dispatched messages so tests and demos can assert on them.
#[derive(Default, Clone)]
pub struct RecordingEmailClient {
    messages: Arc<Mutex<Vec<EmailMessage>>>,
}

impl RecordingEmailClient {
    pub fn messages(&self) -> Vec<EmailMessage> {
        self.messages.lock().expect("email mutex poisoned").clone()
    }
}

impl EmailClient for RecordingEmailClient {
    fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        self.messages
            .lock()
            .expect("email mutex poisoned")
            .push(message);
        Ok(())
    }
}

/// Logs outbound mail instead of delivering it; the default for `serve` until
/// a delivery transport is wired in.
#[derive(Debug, Default, Clone)]
pub struct LoggingEmailClient;

impl EmailClient for LoggingEmailClient {
    fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        info!(to = %message.to, subject = %message.subject, "dispatching income notification email");
        Ok(())
    }
}
