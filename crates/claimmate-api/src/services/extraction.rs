//! Structured field extraction from claim text.
//!
//! One chat completion per claim. The narrative and any text pulled from the
//! attachments are joined with blank lines and the model is asked for a JSON
//! object with exactly the keys of [`ExtractedClaimData`]. Every failure mode
//! (no model configured, transport error, empty or non-JSON reply) degrades
//! to an empty value instead of failing claim creation.

use std::sync::Arc;
use std::time::Instant;

use claimmate_core::{ExtractedClaimData, GenerationBackend, GenerationRequest, Outcome};
use claimmate_inference::parse_json_object;
use tracing::{debug, warn};

pub const EXTRACTION_SYSTEM_PROMPT: &str = "You are a claims processing assistant. Extract structured information from claim texts and return only valid JSON.";

const EXTRACTION_TEMPERATURE: f32 = 0.1;
const EXTRACTION_MAX_TOKENS: u32 = 500;

const EXTRACTION_SCHEMA: &str = r#"{
  "email": "email address if found",
  "phone": "phone number if found",
  "refererPerson": "name of person making the claim or referrer",
  "claimType": "type of claim (e.g., insurance, complaint, refund, etc.)",
  "amount": "monetary amount if mentioned",
  "date": "relevant date if mentioned",
  "recipient": "who the claim is against or for",
  "description": "brief description of the claim",
  "urgency": "urgency level (low, medium, high)",
  "additionalInfo": "any other relevant information"
}"#;

/// Build the user prompt for a narrative plus attachment texts.
pub fn extraction_prompt(narrative: &str, file_texts: &[String]) -> String {
    let full_text = std::iter::once(narrative)
        .chain(file_texts.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Please analyze the following claim text and extract key information. \
Return ONLY a valid JSON object with the following fields (use null if not found):\n\n\
{}\n\nClaim text:\n{}\n\nExtract and return JSON:",
        EXTRACTION_SCHEMA, full_text
    )
}

#[derive(Clone)]
pub struct ExtractionService {
    backend: Option<Arc<dyn GenerationBackend>>,
}

impl ExtractionService {
    pub fn new(backend: Option<Arc<dyn GenerationBackend>>) -> Self {
        Self { backend }
    }

    /// Extract structured fields; never fails.
    pub async fn extract(
        &self,
        narrative: &str,
        file_texts: &[String],
    ) -> Outcome<ExtractedClaimData> {
        let Some(backend) = &self.backend else {
            return Outcome::degraded(
                ExtractedClaimData::default(),
                "no language model configured",
            );
        };

        let prompt = extraction_prompt(narrative, file_texts);
        let prompt_len = prompt.len();
        let request = GenerationRequest::new(prompt)
            .system(EXTRACTION_SYSTEM_PROMPT)
            .temperature(EXTRACTION_TEMPERATURE)
            .max_tokens(EXTRACTION_MAX_TOKENS);

        let start = Instant::now();
        let reply = match backend.complete(request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(
                    subsystem = "inference",
                    component = "extraction",
                    model = backend.model_name(),
                    error = %e,
                    "Extraction call failed, storing empty data"
                );
                return Outcome::degraded(ExtractedClaimData::default(), e);
            }
        };

        match parse_json_object(&reply) {
            Ok(value) => {
                let data = ExtractedClaimData::from_model_value(&value);
                debug!(
                    subsystem = "inference",
                    component = "extraction",
                    model = backend.model_name(),
                    prompt_len,
                    response_len = reply.len(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Extraction complete"
                );
                Outcome::Ok(data)
            }
            Err(e) => {
                warn!(
                    subsystem = "inference",
                    component = "extraction",
                    model = backend.model_name(),
                    response_len = reply.len(),
                    error = %e,
                    "Extraction reply was not a JSON object"
                );
                Outcome::degraded(ExtractedClaimData::default(), e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimmate_inference::mock::MockGenerationBackend;

    fn service(mock: &MockGenerationBackend) -> ExtractionService {
        ExtractionService::new(Some(Arc::new(mock.clone())))
    }

    #[test]
    fn test_prompt_joins_texts_with_blank_lines() {
        let prompt = extraction_prompt("Invoice unpaid", &["page one".into(), "page two".into()]);
        assert!(prompt.contains("Claim text:\nInvoice unpaid\n\npage one\n\npage two\n\n"));
        for key in ExtractedClaimData::KEYS {
            assert!(prompt.contains(&format!("\"{}\"", key)), "missing {}", key);
        }
    }

    #[tokio::test]
    async fn test_extracts_fenced_json() {
        let mock = MockGenerationBackend::new().with_fixed_response(
            "Here you go:\n```json\n{\"email\": \"john@x.com\", \"amount\": \"$500\", \"phone\": null}\n```",
        );
        let outcome = service(&mock).extract("John owes me $500", &[]).await;

        assert!(!outcome.is_degraded());
        let data = outcome.into_inner();
        assert_eq!(data.email.as_deref(), Some("john@x.com"));
        assert_eq!(data.amount.as_deref(), Some("$500"));
        assert!(data.phone.is_none());

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].system.as_deref(), Some(EXTRACTION_SYSTEM_PROMPT));
        assert_eq!(calls[0].temperature, Some(0.1));
        assert_eq!(calls[0].max_tokens, Some(500));
    }

    #[tokio::test]
    async fn test_non_json_reply_degrades() {
        let mock = MockGenerationBackend::new().with_fixed_response("I cannot help with that.");
        let outcome = service(&mock).extract("text", &[]).await;
        assert!(outcome.is_degraded());
        assert!(outcome.value().is_empty());
    }

    #[tokio::test]
    async fn test_empty_reply_degrades() {
        let mock = MockGenerationBackend::new().with_fixed_response("");
        let outcome = service(&mock).extract("text", &[]).await;
        assert!(outcome.is_degraded());
    }

    #[tokio::test]
    async fn test_backend_failure_degrades_without_retry() {
        let mock = MockGenerationBackend::failing();
        let outcome = service(&mock).extract("text", &[]).await;
        assert!(outcome.is_degraded());
        assert!(outcome.value().is_empty());
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_no_backend_degrades() {
        let outcome = ExtractionService::new(None).extract("text", &[]).await;
        assert_eq!(outcome.reason(), Some("no language model configured"));
    }
}
