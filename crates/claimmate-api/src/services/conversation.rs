//! Chat hand-over flow.
//!
//! After the introduction the assistant asks whether it should handle the
//! claim. Once the user accepts, messages that ask for an outbound action
//! trigger `send_email`; everything else is acknowledged. The hand-over flags
//! travel with each request so the server stays stateless.

use std::sync::Arc;

use claimmate_core::ActionKind;
use serde::{Deserialize, Serialize};

use super::intent::IntentClassifier;

pub const HANDOVER_QUESTION: &str = "Would you like me to handle this claim for you? I can send emails, update status, and more. Just say \"yes\" to get started!";

pub const HANDOVER_ACCEPTED: &str = "Great! What would you like me to do next? I can:\n\n\
• Send emails to insurance companies\n\
• Follow up on your claim status\n\
• Contact relevant parties\n\
• Update claim information\n\n\
Just tell me what you need!";

pub const WORKING_ON_IT: &str =
    "🤔 I'm working on that for you... Generating and sending the email now.";

pub const ACTION_ERROR: &str =
    "❌ Sorry, I encountered an error while trying to execute that action. Please try again.";

/// Hand-over progress, echoed back to the client after every turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HandoverState {
    pub handover_offered: bool,
    pub handover_accepted: bool,
}

/// What the assistant does with one user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationStep {
    /// The user said yes to the hand-over question.
    AcceptHandover,
    /// Run the action and post its result.
    ExecuteAction(ActionKind),
    /// Reply with a plain acknowledgement.
    Acknowledge(String),
}

pub fn acknowledgement(text: &str, accepted: bool) -> String {
    if accepted {
        format!(
            "I understand you want me to \"{}\". Let me help you with that. \
Would you like me to send an email about this? Just say \"send email\" and I'll draft and send a professional message for you.",
            text
        )
    } else {
        format!(
            "I understand your concern about \"{}\". Let me help you with that. \
I'll review the claim details and get back to you with an update.",
            text
        )
    }
}

fn accepts_handover(text: &str) -> bool {
    let lowered = text.trim().to_lowercase();
    lowered == "yes" || lowered.contains("handle")
}

#[derive(Clone)]
pub struct ConversationPlanner {
    intent: Arc<dyn IntentClassifier>,
}

impl ConversationPlanner {
    pub fn new(intent: Arc<dyn IntentClassifier>) -> Self {
        Self { intent }
    }

    /// Decide the next step and the resulting hand-over state.
    pub fn plan(&self, text: &str, state: HandoverState) -> (ConversationStep, HandoverState) {
        if state.handover_offered && !state.handover_accepted && accepts_handover(text) {
            let next = HandoverState {
                handover_accepted: true,
                ..state
            };
            return (ConversationStep::AcceptHandover, next);
        }

        if state.handover_accepted && self.intent.detects_action(text) {
            return (ConversationStep::ExecuteAction(ActionKind::SendEmail), state);
        }

        let reply = acknowledgement(text.trim(), state.handover_accepted);
        (ConversationStep::Acknowledge(reply), state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::intent::KeywordIntentClassifier;

    fn planner() -> ConversationPlanner {
        ConversationPlanner::new(Arc::new(KeywordIntentClassifier))
    }

    const OFFERED: HandoverState = HandoverState {
        handover_offered: true,
        handover_accepted: false,
    };

    const ACCEPTED: HandoverState = HandoverState {
        handover_offered: true,
        handover_accepted: true,
    };

    #[test]
    fn test_yes_accepts_offered_handover() {
        let (step, next) = planner().plan("  Yes ", OFFERED);
        assert_eq!(step, ConversationStep::AcceptHandover);
        assert!(next.handover_accepted);

        let (step, _) = planner().plan("please handle it", OFFERED);
        assert_eq!(step, ConversationStep::AcceptHandover);
    }

    #[test]
    fn test_yes_without_offer_is_acknowledged() {
        let (step, next) = planner().plan("yes", HandoverState::default());
        assert!(matches!(step, ConversationStep::Acknowledge(ref r) if r.contains("your concern about \"yes\"")));
        assert_eq!(next, HandoverState::default());
    }

    #[test]
    fn test_yes_sure_is_not_acceptance() {
        let (step, next) = planner().plan("yes sure", OFFERED);
        assert!(matches!(step, ConversationStep::Acknowledge(_)));
        assert!(!next.handover_accepted);
    }

    #[test]
    fn test_action_intent_after_acceptance() {
        let (step, next) = planner().plan("Please send email to Acme", ACCEPTED);
        assert_eq!(step, ConversationStep::ExecuteAction(ActionKind::SendEmail));
        assert_eq!(next, ACCEPTED);
    }

    #[test]
    fn test_action_intent_before_acceptance_is_acknowledged() {
        let (step, _) = planner().plan("send email", OFFERED);
        assert!(matches!(step, ConversationStep::Acknowledge(_)));
    }

    #[test]
    fn test_accepted_acknowledgement_suggests_send_email() {
        let (step, _) = planner().plan("what now?", ACCEPTED);
        match step {
            ConversationStep::Acknowledge(reply) => {
                assert!(reply.starts_with("I understand you want me to \"what now?\""));
                assert!(reply.contains("Just say \"send email\""));
            }
            other => panic!("unexpected step: {:?}", other),
        }
    }
}
