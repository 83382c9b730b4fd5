//! Service layer for business logic.

pub mod actions;
pub mod attachments;
pub mod conversation;
pub mod extraction;
pub mod intent;
pub mod messages;
pub mod transport;

pub use actions::{format_action_message, ActionDispatcher};
pub use attachments::{AttachmentPipeline, ProcessedAttachments, Upload};
pub use conversation::{ConversationPlanner, ConversationStep, HandoverState};
pub use extraction::ExtractionService;
pub use intent::{IntentClassifier, KeywordIntentClassifier};
pub use messages::MessageService;
pub use transport::{EmailTransport, SimulatedTransport};
