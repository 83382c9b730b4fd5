//! Mock generation backend for deterministic testing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use claimmate_inference::mock::MockGenerationBackend;
//!
//! let backend = MockGenerationBackend::new()
//!     .with_fixed_response("Hello!")
//!     .with_response_matching("Extract", r#"{"amount": "500"}"#);
//! assert_eq!(backend.call_count(), 0);
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use claimmate_core::{Error, GenerationBackend, GenerationRequest, Result};

/// Mock generation backend for testing.
#[derive(Clone)]
pub struct MockGenerationBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<GenerationRequest>>>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    model: String,
    /// `(needle, response)`: the first needle found in the prompt wins.
    responses: Vec<(String, String)>,
    default_response: String,
    failure_rate: f64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            model: "mock-model".to_string(),
            responses: Vec::new(),
            default_response: "Mock response".to_string(),
            failure_rate: 0.0,
        }
    }
}

impl MockGenerationBackend {
    /// Create a new mock backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A backend whose every call fails, as an unreachable model would.
    pub fn failing() -> Self {
        Self::new().with_failure_rate(1.0)
    }

    /// Set the response returned when no mapping matches.
    pub fn with_fixed_response(mut self, response: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).default_response = response.into();
        self
    }

    /// Return `response` for any prompt containing `needle`.
    pub fn with_response_matching(
        mut self,
        needle: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.config)
            .responses
            .push((needle.into(), response.into()));
        self
    }

    /// Set failure rate (0.0 - 1.0) for testing degraded paths.
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        Arc::make_mut(&mut self.config).failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// All requests received so far, oldest first.
    pub fn calls(&self) -> Vec<GenerationRequest> {
        self.log().clone()
    }

    pub fn call_count(&self) -> usize {
        self.log().len()
    }

    pub fn clear_calls(&self) {
        self.log().clear()
    }

    fn log(&self) -> MutexGuard<'_, Vec<GenerationRequest>> {
        self.call_log.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn should_fail(&self) -> bool {
        use rand::Rng;
        match self.config.failure_rate {
            r if r >= 1.0 => true,
            r if r > 0.0 => rand::thread_rng().gen::<f64>() < r,
            _ => false,
        }
    }
}

impl Default for MockGenerationBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn complete(&self, request: GenerationRequest) -> Result<String> {
        self.log().push(request.clone());

        if self.should_fail() {
            return Err(Error::Inference("simulated failure".to_string()));
        }

        let response = self
            .config
            .responses
            .iter()
            .find(|(needle, _)| request.prompt.contains(needle.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| self.config.default_response.clone());
        Ok(response)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!self.should_fail())
    }
}
