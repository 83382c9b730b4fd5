//! Structured logging field names for ClaimMate.
//!
//! All crates use these constants for consistent structured logging fields so
//! log aggregation can query by the same names across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Request failed with a 500, or a startup dependency is broken |
//! | WARN  | Recoverable issue, fallback applied (degraded model call, timeline fallback) |
//! | INFO  | Lifecycle events, claim created/deleted, action executed |
//! | DEBUG | Decision points, prompt and response sizes |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated from the `x-request-id` header.
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "db", "inference", "actions"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "extraction", "messages", "dispatcher", "pool", "memory_store"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "extract", "initial_message", "send_email", "append_message"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Claim UUID being operated on.
pub const CLAIM_ID: &str = "claim_id";

/// Timeline message UUID.
pub const MESSAGE_ID: &str = "message_id";

/// Number of attached files.
pub const FILE_COUNT: &str = "file_count";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Byte length of a prompt.
pub const PROMPT_LEN: &str = "prompt_len";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

/// Number of rows returned.
pub const RESULT_COUNT: &str = "result_count";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for inference.
pub const MODEL: &str = "model";

/// Whether a fallback value replaced the model's answer.
pub const DEGRADED: &str = "degraded";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names_are_snake_case() {
        for name in [
            REQUEST_ID,
            SUBSYSTEM,
            COMPONENT,
            OPERATION,
            CLAIM_ID,
            MESSAGE_ID,
            FILE_COUNT,
            DURATION_MS,
            PROMPT_LEN,
            RESPONSE_LEN,
            RESULT_COUNT,
            MODEL,
            DEGRADED,
            SUCCESS,
            ERROR_MSG,
        ] {
            assert!(name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c == '_'));
        }
    }
}
