//! OpenAI-compatible chat completion backend.
//!
//! Works with any endpoint that speaks the `/chat/completions` protocol
//! (OpenAI, Azure OpenAI, vLLM, Ollama in compatibility mode).
//!
//! # Example
//!
//! ```rust,no_run
//! use claimmate_core::{GenerationBackend, GenerationRequest};
//! use claimmate_inference::openai::{OpenAIBackend, OpenAIConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = OpenAIBackend::new(OpenAIConfig {
//!         api_key: Some("sk-...".to_string()),
//!         ..Default::default()
//!     })
//!     .unwrap();
//!
//!     let reply = backend
//!         .complete(GenerationRequest::new("Say hello").temperature(0.7))
//!         .await
//!         .unwrap();
//!     println!("{}", reply);
//! }
//! ```

mod backend;
mod error;
mod types;

pub use backend::{
    OpenAIBackend, OpenAIConfig, DEFAULT_GEN_MODEL, DEFAULT_OPENAI_URL, DEFAULT_TIMEOUT_SECS,
};
pub use error::{to_claimmate_error, OpenAIErrorCode};
pub use types::*;
