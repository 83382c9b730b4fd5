//! Actions the assistant performs for the user.
//!
//! The only action today is `send_email`: the model drafts an email from the
//! claim, the user's request and recent chat, and the configured
//! [`EmailTransport`] delivers it. Drafting never fails; a broken or missing
//! model yields a fixed fallback email so the send still goes out.

use std::sync::Arc;

use claimmate_core::{
    ActionKind, ActionResult, ChatHistoryEntry, Claim, EmailAction, GenerationBackend,
    GenerationRequest, Outcome,
};
use claimmate_inference::parse_json_object;
use serde_json::Value as JsonValue;
use tracing::{info, warn};

use super::transport::EmailTransport;

/// Chat entries included in the email prompt.
const HISTORY_WINDOW: usize = 5;

const DEFAULT_RECIPIENT: &str = "Insurance Company";
const DEFAULT_SUBJECT: &str = "Regarding Your Claim";
const DEFAULT_CONTENT: &str = "Professional email content would be generated here.";
const DEFAULT_CONTEXT: &str = "Email generated based on user request";

/// Email sent when the model cannot draft one.
pub fn fallback_email() -> EmailAction {
    EmailAction {
        recipient: DEFAULT_RECIPIENT.to_string(),
        subject: DEFAULT_SUBJECT.to_string(),
        content: "I would like to follow up on my recent claim submission. Please let me know if you need any additional information.".to_string(),
        context: "Fallback email due to generation error".to_string(),
    }
}

pub fn email_prompt(claim: &Claim, user_request: &str, history: &[ChatHistoryEntry]) -> String {
    let extracted = serde_json::to_string_pretty(&claim.extracted_data)
        .unwrap_or_else(|_| "{}".to_string());
    let recent = history
        .iter()
        .skip(history.len().saturating_sub(HISTORY_WINDOW))
        .map(|entry| format!("{}: {}", entry.message_type, entry.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are an AI assistant helping with insurance claims. Based on the claim information and user request, generate a professional email.\n\n\
CLAIM INFORMATION:\n\
- Narrative: {}\n\
- Status: {}\n\
- Created: {}\n\
- Extracted Data: {}\n\n\
USER REQUEST: {}\n\n\
CHAT CONTEXT:\n{}\n\n\
Please generate:\n\
1. A recipient email address (use extracted email if available, otherwise suggest a generic insurance company email)\n\
2. A professional subject line\n\
3. A professional email body that addresses the user's request\n\
4. Context explaining why this email is being sent\n\n\
Respond in JSON format:\n\
{{\n  \"recipient\": \"email@example.com or 'Insurance Company' if no email found\",\n  \"subject\": \"Professional subject line\",\n  \"content\": \"Professional email body\",\n  \"context\": \"Brief explanation of why this email is being sent\"\n}}",
        claim.narrative,
        claim.status,
        claim.created_at.to_rfc3339(),
        extracted,
        user_request,
        recent,
    )
}

/// Build an email from the model's JSON, filling each missing field.
fn email_from_value(value: &JsonValue) -> EmailAction {
    let field = |key: &str, default: &str| {
        value
            .get(key)
            .and_then(JsonValue::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(default)
            .to_string()
    };
    EmailAction {
        recipient: field("recipient", DEFAULT_RECIPIENT),
        subject: field("subject", DEFAULT_SUBJECT),
        content: field("content", DEFAULT_CONTENT),
        context: field("context", DEFAULT_CONTEXT),
    }
}

/// Markdown summary of an action result for the timeline.
pub fn format_action_message(result: &ActionResult) -> String {
    let action = &result.action;
    if result.success {
        format!(
            "✅ **Action Completed**\n\n\
**Email Sent Successfully**\n\
- **To:** {}\n\
- **Subject:** {}\n\
- **Context:** {}\n\n\
The email has been sent and they should receive it shortly. I'll continue monitoring for any responses.",
            action.recipient, action.subject, action.context
        )
    } else {
        format!(
            "❌ **Action Failed**\n\n\
**Email Send Failed**\n\
- **To:** {}\n\
- **Subject:** {}\n\
- **Error:** {}\n\n\
I was unable to send the email. Please check the recipient details or try again later.",
            action.recipient, action.subject, result.message
        )
    }
}

pub struct ActionDispatcher {
    backend: Option<Arc<dyn GenerationBackend>>,
    transport: Arc<dyn EmailTransport>,
}

impl ActionDispatcher {
    pub fn new(
        backend: Option<Arc<dyn GenerationBackend>>,
        transport: Arc<dyn EmailTransport>,
    ) -> Self {
        Self { backend, transport }
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    /// Draft an email for the claim; never fails.
    pub async fn generate_email(
        &self,
        claim: &Claim,
        user_request: &str,
        history: &[ChatHistoryEntry],
    ) -> Outcome<EmailAction> {
        let Some(backend) = &self.backend else {
            return Outcome::degraded(fallback_email(), "no language model configured");
        };

        let request =
            GenerationRequest::new(email_prompt(claim, user_request, history)).temperature(0.7);
        let parsed = match backend.complete(request).await {
            Ok(reply) => parse_json_object(&reply),
            Err(e) => Err(e),
        };

        match parsed {
            Ok(value) => Outcome::Ok(email_from_value(&value)),
            Err(e) => {
                warn!(
                    subsystem = "actions",
                    component = "dispatcher",
                    claim_id = %claim.id,
                    model = backend.model_name(),
                    error = %e,
                    "Email drafting failed, using fallback email"
                );
                Outcome::degraded(fallback_email(), e)
            }
        }
    }

    /// Perform `kind` for the claim and report the result.
    pub async fn execute(
        &self,
        claim: &Claim,
        kind: ActionKind,
        user_request: &str,
        history: &[ChatHistoryEntry],
    ) -> ActionResult {
        match kind {
            ActionKind::SendEmail => {
                let email = self
                    .generate_email(claim, user_request, history)
                    .await
                    .into_inner();
                let result = self.transport.send(&email).await;
                info!(
                    subsystem = "actions",
                    component = "dispatcher",
                    op = kind.as_str(),
                    claim_id = %claim.id,
                    transport = self.transport.name(),
                    success = result.success,
                    "Action executed"
                );
                result
            }
        }
    }
}
