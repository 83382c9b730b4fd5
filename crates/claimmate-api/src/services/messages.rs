//! AI-authored timeline messages: the opening introduction and follow-ups.

use std::sync::Arc;

use claimmate_core::{
    Claim, GenerationBackend, GenerationRequest, MessageStatus, MessageType, Outcome,
    TimelineMessage,
};
use tracing::warn;

pub const INITIAL_SYSTEM_PROMPT: &str = "You are a friendly AI claims assistant. Generate warm, conversational, and helpful messages to assist users with their claims.";
pub const FOLLOW_UP_SYSTEM_PROMPT: &str = "You are a professional claims management assistant. Generate appropriate follow-up messages.";

const NOT_SPECIFIED: &str = "Not specified";

fn or_default<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
    value.as_deref().unwrap_or(default)
}

pub fn initial_prompt(claim: &Claim) -> String {
    let data = &claim.extracted_data;
    format!(
        "Generate a warm, friendly, and conversational initial message for a claim assistant. \
This should feel like a helpful AI assistant introducing itself and offering help.\n\n\
Claim Information:\n\
- Narrative: {}\n\
- Claim Type: {}\n\
- Amount: {}\n\
- Date: {}\n\
- Recipient: {}\n\
- Urgency: {}\n\n\
Generate a friendly message that:\n\
1. Introduces yourself as an AI assistant\n\
2. Acknowledges their claim submission\n\
3. Shows understanding of their situation\n\
4. Offers to help with the claim process\n\
5. Asks how you can assist them further\n\
6. Is warm and conversational, not formal\n\n\
Keep it friendly and helpful, like a supportive assistant.",
        claim.narrative,
        or_default(&data.claim_type, NOT_SPECIFIED),
        or_default(&data.amount, NOT_SPECIFIED),
        or_default(&data.date, NOT_SPECIFIED),
        or_default(&data.recipient, NOT_SPECIFIED),
        or_default(&data.urgency, NOT_SPECIFIED),
    )
}

pub fn follow_up_prompt(claim: &Claim, prior: &[TimelineMessage]) -> String {
    let data = &claim.extracted_data;
    let last_sent = prior
        .last()
        .map(|m| m.timestamp.to_rfc3339())
        .unwrap_or_else(|| "Unknown".to_string());
    format!(
        "Generate a professional follow-up message for a claim that has not received a response.\n\n\
Previous message sent: {}\n\
Claim urgency: {}\n\n\
Claim Information:\n\
- Narrative: {}\n\
- Claim Type: {}\n\
- Amount: {}\n\
- Date: {}\n\n\
Generate a follow-up message that:\n\
1. References the previous communication\n\
2. Reiterates the importance of the claim\n\
3. Requests a response or update\n\
4. Maintains a professional tone\n\
5. Is appropriate for the urgency level\n\n\
Return the message in a professional business format.",
        last_sent,
        or_default(&data.urgency, "Standard"),
        claim.narrative,
        or_default(&data.claim_type, NOT_SPECIFIED),
        or_default(&data.amount, NOT_SPECIFIED),
        or_default(&data.date, NOT_SPECIFIED),
    )
}

/// Greeting used when the model cannot produce one.
pub fn fallback_greeting(claim: &Claim) -> String {
    format!(
        "Hi there! 👋\n\n\
I'm your AI claims assistant, and I can see you've submitted a claim for {}.\n\n\
I understand this can be a stressful time, and I'm here to help make the process as smooth as possible for you. \
I can see the details of your claim and I'm ready to assist you with any questions or concerns you might have.\n\n\
What would you like to know about your claim, or how can I help you today?",
        or_default(&claim.extracted_data.claim_type, "your situation")
    )
}

/// Business letter used when the model cannot write a follow-up.
pub fn fallback_follow_up(claim: &Claim) -> String {
    let data = &claim.extracted_data;
    format!(
        "Dear {},\n\n\
I am writing to follow up on my previous communication regarding the claim for {}.\n\n\
I have not yet received a response and would appreciate an update on the status of this matter. \
Please let me know if you need any additional information to process this claim.\n\n\
Thank you for your attention to this matter.\n\n\
Best regards,\n{}",
        or_default(&data.recipient, "Sir/Madam"),
        or_default(&data.amount, "the specified amount"),
        or_default(&data.referer_person, "Claimant"),
    )
}

pub fn follow_up_subject(claim: &Claim) -> String {
    format!(
        "Follow-up: {}",
        or_default(&claim.extracted_data.claim_type, "Claim")
    )
}

#[derive(Clone)]
pub struct MessageService {
    backend: Option<Arc<dyn GenerationBackend>>,
}

impl MessageService {
    pub fn new(backend: Option<Arc<dyn GenerationBackend>>) -> Self {
        Self { backend }
    }

    /// First AI message for a claim's timeline.
    pub async fn initial_message(&self, claim: &Claim) -> Outcome<TimelineMessage> {
        let request = GenerationRequest::new(initial_prompt(claim))
            .system(INITIAL_SYSTEM_PROMPT)
            .temperature(0.7)
            .max_tokens(500);

        self.generate(request, "initial")
            .await
            .map(|generated| generated.unwrap_or_else(|| fallback_greeting(claim)))
            .map(|content| TimelineMessage::ai(claim.id, content))
    }

    /// Draft follow-up for a claim that has gone unanswered.
    pub async fn follow_up(
        &self,
        claim: &Claim,
        prior: &[TimelineMessage],
    ) -> Outcome<TimelineMessage> {
        let request = GenerationRequest::new(follow_up_prompt(claim, prior))
            .system(FOLLOW_UP_SYSTEM_PROMPT)
            .temperature(0.7)
            .max_tokens(400);

        self.generate(request, "follow_up")
            .await
            .map(|generated| generated.unwrap_or_else(|| fallback_follow_up(claim)))
            .map(|content| {
                TimelineMessage::new(
                    claim.id,
                    MessageType::AiGenerated,
                    content,
                    MessageStatus::Draft,
                )
                .with_subject(follow_up_subject(claim))
            })
    }

    /// Trimmed model text, or `Degraded(None)` when it is unusable.
    async fn generate(&self, request: GenerationRequest, op: &str) -> Outcome<Option<String>> {
        let Some(backend) = &self.backend else {
            return Outcome::degraded(None, "no language model configured");
        };

        match backend.complete(request).await {
            Ok(reply) if !reply.trim().is_empty() => Outcome::Ok(Some(reply.trim().to_string())),
            Ok(_) => {
                warn!(
                    subsystem = "inference",
                    component = "messages",
                    op,
                    model = backend.model_name(),
                    "Model returned an empty message, using template"
                );
                Outcome::degraded(None, "empty model reply")
            }
            Err(e) => {
                warn!(
                    subsystem = "inference",
                    component = "messages",
                    op,
                    model = backend.model_name(),
                    error = %e,
                    "Message generation failed, using template"
                );
                Outcome::degraded(None, e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use claimmate_core::{ClaimStatus, ExtractedClaimData};
    use claimmate_inference::mock::MockGenerationBackend;
    use uuid::Uuid;

    fn claim(data: ExtractedClaimData) -> Claim {
        Claim {
            id: Uuid::now_v7(),
            narrative: "My landlord kept my deposit".to_string(),
            status: ClaimStatus::Pending,
            files: vec![],
            extracted_data: data,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_initial_message_uses_trimmed_model_text() {
        let mock = MockGenerationBackend::new().with_fixed_response("  Hello, I'm here to help!\n");
        let service = MessageService::new(Some(Arc::new(mock.clone())));
        let claim = claim(ExtractedClaimData::default());

        let outcome = service.initial_message(&claim).await;
        assert!(!outcome.is_degraded());
        let msg = outcome.into_inner();
        assert_eq!(msg.content, "Hello, I'm here to help!");
        assert_eq!(msg.message_type, MessageType::AiGenerated);
        assert_eq!(msg.status, MessageStatus::Delivered);
        assert_eq!(msg.claim_id, claim.id);

        let call = &mock.calls()[0];
        assert_eq!(call.temperature, Some(0.7));
        assert_eq!(call.max_tokens, Some(500));
        assert!(call.prompt.contains("- Claim Type: Not specified"));
    }

    #[tokio::test]
    async fn test_initial_message_fallback_mentions_claim_type() {
        let service = MessageService::new(Some(Arc::new(MockGenerationBackend::failing())));
        let claim = claim(ExtractedClaimData {
            claim_type: Some("deposit refund".into()),
            ..Default::default()
        });

        let outcome = service.initial_message(&claim).await;
        assert!(outcome.is_degraded());
        assert!(outcome.value().content.contains("a claim for deposit refund."));
        assert_eq!(outcome.value().status, MessageStatus::Delivered);
    }

    #[tokio::test]
    async fn test_initial_message_fallback_without_claim_type() {
        let service = MessageService::new(None);
        let outcome = service.initial_message(&claim(ExtractedClaimData::default())).await;
        assert!(outcome.value().content.contains("a claim for your situation."));
    }

    #[tokio::test]
    async fn test_blank_model_reply_degrades() {
        let mock = MockGenerationBackend::new().with_fixed_response("   ");
        let service = MessageService::new(Some(Arc::new(mock)));
        let outcome = service.initial_message(&claim(ExtractedClaimData::default())).await;
        assert!(outcome.is_degraded());
        assert!(outcome.value().content.starts_with("Hi there!"));
    }

    #[tokio::test]
    async fn test_follow_up_is_draft_with_subject() {
        let mock = MockGenerationBackend::new().with_fixed_response("Dear Acme, ...");
        let service = MessageService::new(Some(Arc::new(mock.clone())));
        let claim = claim(ExtractedClaimData {
            claim_type: Some("refund".into()),
            urgency: Some("high".into()),
            ..Default::default()
        });
        let prior = vec![TimelineMessage::ai(claim.id, "earlier")];

        let msg = service.follow_up(&claim, &prior).await.into_inner();
        assert_eq!(msg.status, MessageStatus::Draft);
        assert_eq!(msg.subject.as_deref(), Some("Follow-up: refund"));
        assert_eq!(msg.content, "Dear Acme, ...");

        let call = &mock.calls()[0];
        assert_eq!(call.max_tokens, Some(400));
        assert!(call.prompt.contains("Claim urgency: high"));
        assert!(call
            .prompt
            .contains(&format!("Previous message sent: {}", prior[0].timestamp.to_rfc3339())));
    }

    #[tokio::test]
    async fn test_follow_up_fallback_letter_defaults() {
        let service = MessageService::new(Some(Arc::new(MockGenerationBackend::failing())));
        let outcome = service
            .follow_up(&claim(ExtractedClaimData::default()), &[])
            .await;

        assert!(outcome.is_degraded());
        let msg = outcome.into_inner();
        assert!(msg.content.starts_with("Dear Sir/Madam,"));
        assert!(msg.content.contains("the claim for the specified amount."));
        assert!(msg.content.ends_with("Best regards,\nClaimant"));
        assert_eq!(msg.subject.as_deref(), Some("Follow-up: Claim"));
    }

    #[test]
    fn test_follow_up_prompt_without_prior_messages() {
        let prompt = follow_up_prompt(&claim(ExtractedClaimData::default()), &[]);
        assert!(prompt.contains("Previous message sent: Unknown"));
        assert!(prompt.contains("Claim urgency: Standard"));
    }
}
