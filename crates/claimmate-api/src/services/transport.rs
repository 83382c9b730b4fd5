//! Outbound email delivery.

use std::time::Duration;

use async_trait::async_trait;
use claimmate_core::{ActionResult, EmailAction, Result};
use tracing::{info, warn};

/// Delivers generated emails.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    /// Hand the email to the underlying channel.
    async fn deliver(&self, email: &EmailAction) -> Result<()>;

    /// Short transport name for logs and health output.
    fn name(&self) -> &'static str;

    /// Deliver and report the outcome; delivery errors become a failed result.
    async fn send(&self, email: &EmailAction) -> ActionResult {
        match self.deliver(email).await {
            Ok(()) => ActionResult::sent(email.clone()),
            Err(e) => {
                warn!(
                    subsystem = "actions",
                    component = "transport",
                    transport = self.name(),
                    recipient = %email.recipient,
                    error = %e,
                    "Email delivery failed"
                );
                ActionResult::failed(email.clone(), e)
            }
        }
    }
}

/// Transport that waits a fixed delay and reports success. No email leaves
/// the process.
#[derive(Debug, Clone)]
pub struct SimulatedTransport {
    delay: Duration,
}

impl SimulatedTransport {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl EmailTransport for SimulatedTransport {
    async fn deliver(&self, email: &EmailAction) -> Result<()> {
        tokio::time::sleep(self.delay).await;
        info!(
            subsystem = "actions",
            component = "transport",
            transport = self.name(),
            recipient = %email.recipient,
            subject = %email.subject,
            delay_ms = self.delay.as_millis() as u64,
            "Simulated email send"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}
