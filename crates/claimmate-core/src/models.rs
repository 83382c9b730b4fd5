//! Core data models for ClaimMate.
//!
//! These types are shared across all ClaimMate crates and represent
//! the core domain entities.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::Error;

// =============================================================================
// CLAIM TYPES
// =============================================================================

/// Lifecycle status of a claim.
///
/// Every status may move to every other status; no transition graph is enforced.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    #[default]
    Pending,
    Solved,
    Opposed,
    Closed,
}

impl ClaimStatus {
    /// All recognized statuses, in display order.
    pub const ALL: [ClaimStatus; 4] = [
        ClaimStatus::Pending,
        ClaimStatus::Solved,
        ClaimStatus::Opposed,
        ClaimStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Pending => "pending",
            ClaimStatus::Solved => "solved",
            ClaimStatus::Opposed => "opposed",
            ClaimStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ClaimStatus::Pending),
            "solved" => Ok(ClaimStatus::Solved),
            "opposed" => Ok(ClaimStatus::Opposed),
            "closed" => Ok(ClaimStatus::Closed),
            other => Err(Error::InvalidInput(format!("Invalid status: {}", other))),
        }
    }
}

/// Structured fields inferred from a claim narrative by the language model.
///
/// Only the ten recognized keys can ever be present. Values the model leaves
/// out or sets to `null` are `None` and are omitted when serialized, so a
/// failed extraction serializes as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractedClaimData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referer_person: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
}

impl ExtractedClaimData {
    /// JSON keys the extraction prompt asks for, in prompt order.
    pub const KEYS: [&'static str; 10] = [
        "email",
        "phone",
        "refererPerson",
        "claimType",
        "amount",
        "date",
        "recipient",
        "description",
        "urgency",
        "additionalInfo",
    ];

    /// Build from an arbitrary JSON value returned by a model.
    ///
    /// Unknown keys are dropped, `null` and empty strings become `None`, and
    /// numbers or booleans are rendered as strings. Anything that is not an
    /// object yields the empty value.
    pub fn from_model_value(value: &JsonValue) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let field = |key: &str| -> Option<String> {
            match obj.get(key)? {
                JsonValue::String(s) => {
                    let trimmed = s.trim();
                    (!trimmed.is_empty() && !trimmed.eq_ignore_ascii_case("null"))
                        .then(|| trimmed.to_string())
                }
                JsonValue::Number(n) => Some(n.to_string()),
                JsonValue::Bool(b) => Some(b.to_string()),
                _ => None,
            }
        };

        Self {
            email: field("email"),
            phone: field("phone"),
            referer_person: field("refererPerson"),
            claim_type: field("claimType"),
            amount: field("amount"),
            date: field("date"),
            recipient: field("recipient"),
            description: field("description"),
            urgency: field("urgency"),
            additional_info: field("additionalInfo"),
        }
    }

    /// True when no field was extracted.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A user-submitted claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Claim {
    pub id: Uuid,
    pub narrative: String,
    pub status: ClaimStatus,
    /// Opaque file references (public URLs or placeholders), fixed at creation.
    pub files: Vec<String>,
    pub extracted_data: ExtractedClaimData,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request for creating a new claim.
#[derive(Debug, Clone)]
pub struct CreateClaimRequest {
    pub narrative: String,
    pub files: Vec<String>,
    pub extracted_data: ExtractedClaimData,
}

// =============================================================================
// TIMELINE TYPES
// =============================================================================

/// Who authored a timeline message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    AiGenerated,
    UserSent,
    Received,
    System,
}

impl MessageType {
    /// Map an append request's `sender` to a message type.
    ///
    /// `"ai"` is the only sender that produces AI-authored messages; anything
    /// else is treated as the user.
    pub fn from_sender(sender: &str) -> Self {
        if sender == "ai" {
            MessageType::AiGenerated
        } else {
            MessageType::UserSent
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::AiGenerated => "ai_generated",
            MessageType::UserSent => "user_sent",
            MessageType::Received => "received",
            MessageType::System => "system",
        }
    }

    /// The `sender` column value persisted for this type.
    pub fn sender(&self) -> &'static str {
        match self {
            MessageType::AiGenerated => "ai",
            MessageType::UserSent => "user",
            MessageType::Received => "received",
            MessageType::System => "system",
        }
    }

    /// Inverse of [`MessageType::sender`].
    pub fn from_stored_sender(sender: &str) -> Self {
        match sender {
            "received" => MessageType::Received,
            "system" => MessageType::System,
            other => MessageType::from_sender(other),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery status of a timeline message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Draft,
    Sent,
    #[default]
    Delivered,
    Read,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Draft => "draft",
            MessageStatus::Sent => "sent",
            MessageStatus::Delivered => "delivered",
            MessageStatus::Read => "read",
        }
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(MessageStatus::Draft),
            "sent" => Ok(MessageStatus::Sent),
            "delivered" => Ok(MessageStatus::Delivered),
            "read" => Ok(MessageStatus::Read),
            other => Err(Error::InvalidInput(format!(
                "Invalid message status: {}",
                other
            ))),
        }
    }
}

/// A chat entry attached to a claim. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TimelineMessage {
    pub id: Uuid,
    pub claim_id: Uuid,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub status: MessageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl TimelineMessage {
    /// Create a message with a fresh id and the current timestamp.
    pub fn new(
        claim_id: Uuid,
        message_type: MessageType,
        content: impl Into<String>,
        status: MessageStatus,
    ) -> Self {
        Self {
            id: crate::new_v7(),
            claim_id,
            message_type,
            content: content.into(),
            timestamp: Utc::now(),
            status,
            recipient: None,
            subject: None,
        }
    }

    /// AI-authored message, delivered.
    pub fn ai(claim_id: Uuid, content: impl Into<String>) -> Self {
        Self::new(
            claim_id,
            MessageType::AiGenerated,
            content,
            MessageStatus::Delivered,
        )
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }
}

/// Minimal view of a chat message supplied by clients as action context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct ChatHistoryEntry {
    #[serde(rename = "type")]
    pub message_type: String,
    pub content: String,
}

impl From<&TimelineMessage> for ChatHistoryEntry {
    fn from(msg: &TimelineMessage) -> Self {
        Self {
            message_type: msg.message_type.as_str().to_string(),
            content: msg.content.clone(),
        }
    }
}

// =============================================================================
// ACTION TYPES
// =============================================================================

/// Actions the assistant can perform on behalf of the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    SendEmail,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::SendEmail => "send_email",
        }
    }
}

impl FromStr for ActionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "send_email" => Ok(ActionKind::SendEmail),
            _ => Err(Error::InvalidInput("Unknown action type".to_string())),
        }
    }
}

/// An email generated for a claim. Never persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct EmailAction {
    pub recipient: String,
    pub subject: String,
    pub content: String,
    /// Why the email is being sent.
    pub context: String,
}

/// Outcome of attempting to perform an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ActionResult {
    pub success: bool,
    pub action: EmailAction,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ActionResult {
    pub fn sent(action: EmailAction) -> Self {
        let message = format!("Email sent successfully to {}", action.recipient);
        Self {
            success: true,
            action,
            message,
            timestamp: Utc::now(),
        }
    }

    pub fn failed(action: EmailAction, error: impl fmt::Display) -> Self {
        Self {
            success: false,
            action,
            message: format!("Failed to send email: {}", error),
            timestamp: Utc::now(),
        }
    }
}

// =============================================================================
// STORE STATUS
// =============================================================================

/// Connection pool occupancy, reported by stores that hold one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PoolStatus {
    pub size: u32,
    pub idle: u32,
}

impl PoolStatus {
    /// Every open connection is checked out.
    pub fn is_exhausted(&self) -> bool {
        self.size > 0 && self.idle == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_claim_status_round_trip_strings() {
        for status in ClaimStatus::ALL {
            assert_eq!(status.as_str().parse::<ClaimStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_claim_status_rejects_unknown() {
        let err = "archived".parse::<ClaimStatus>().unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!("Pending".parse::<ClaimStatus>().is_err());
    }

    #[test]
    fn test_claim_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(ClaimStatus::Opposed).unwrap(),
            json!("opposed")
        );
    }

    #[test]
    fn test_extracted_data_drops_unknown_keys() {
        let value = json!({
            "email": "john@x.com",
            "amount": 500,
            "claimType": null,
            "favouriteColour": "blue",
            "urgency": "  high  "
        });
        let data = ExtractedClaimData::from_model_value(&value);

        assert_eq!(data.email.as_deref(), Some("john@x.com"));
        assert_eq!(data.amount.as_deref(), Some("500"));
        assert_eq!(data.urgency.as_deref(), Some("high"));
        assert!(data.claim_type.is_none());

        let serialized = serde_json::to_value(&data).unwrap();
        let keys: Vec<&String> = serialized.as_object().unwrap().keys().collect();
        for key in keys {
            assert!(ExtractedClaimData::KEYS.contains(&key.as_str()));
        }
    }

    #[test]
    fn test_extracted_data_non_object_is_empty() {
        assert!(ExtractedClaimData::from_model_value(&json!(["a"])).is_empty());
        assert!(ExtractedClaimData::from_model_value(&json!("text")).is_empty());
    }

    #[test]
    fn test_empty_extracted_data_serializes_as_empty_object() {
        let value = serde_json::to_value(ExtractedClaimData::default()).unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn test_extracted_data_camel_case_keys() {
        let data = ExtractedClaimData {
            referer_person: Some("Ann".into()),
            additional_info: Some("n/a".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value, json!({"refererPerson": "Ann", "additionalInfo": "n/a"}));
    }

    #[test]
    fn test_message_type_from_sender() {
        assert_eq!(MessageType::from_sender("ai"), MessageType::AiGenerated);
        assert_eq!(MessageType::from_sender("user"), MessageType::UserSent);
        assert_eq!(MessageType::from_sender("AI"), MessageType::UserSent);
    }

    #[test]
    fn test_message_type_stored_sender_inverse() {
        for ty in [
            MessageType::AiGenerated,
            MessageType::UserSent,
            MessageType::Received,
            MessageType::System,
        ] {
            assert_eq!(MessageType::from_stored_sender(ty.sender()), ty);
        }
    }

    #[test]
    fn test_timeline_message_serializes_type_field() {
        let msg = TimelineMessage::ai(Uuid::nil(), "hello");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "ai_generated");
        assert_eq!(value["status"], "delivered");
        assert!(value.get("subject").is_none());
    }

    #[test]
    fn test_action_kind_parse() {
        assert_eq!(
            "send_email".parse::<ActionKind>().unwrap(),
            ActionKind::SendEmail
        );
        let err = "call_them".parse::<ActionKind>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: Unknown action type");
    }

    #[test]
    fn test_action_result_messages() {
        let action = EmailAction {
            recipient: "claims@insurer.example".into(),
            subject: "s".into(),
            content: "c".into(),
            context: "x".into(),
        };
        let ok = ActionResult::sent(action.clone());
        assert!(ok.success);
        assert_eq!(ok.message, "Email sent successfully to claims@insurer.example");

        let failed = ActionResult::failed(action, "mailbox full");
        assert!(!failed.success);
        assert_eq!(failed.message, "Failed to send email: mailbox full");
    }

    #[test]
    fn test_pool_status_exhaustion() {
        assert!(PoolStatus { size: 4, idle: 0 }.is_exhausted());
        assert!(!PoolStatus { size: 4, idle: 1 }.is_exhausted());
        assert!(!PoolStatus { size: 0, idle: 0 }.is_exhausted());
    }
}
