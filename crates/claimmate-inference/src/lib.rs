//! # claimmate-inference
//!
//! Language model client abstraction for ClaimMate.
//!
//! This crate provides:
//! - OpenAI-compatible chat completion backend (feature `openai`, default)
//! - Lenient JSON recovery for model replies
//! - Mock backend for tests (feature `mock`)
//!
//! # Example
//!
//! ```rust,no_run
//! use claimmate_inference::{GenerationBackend, OpenAIBackend};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = OpenAIBackend::from_env().unwrap();
//!     let reply = backend.generate("Say hello").await.unwrap();
//!     println!("{}", reply);
//! }
//! ```

pub mod json;

#[cfg(feature = "openai")]
pub mod openai;

// Mock generation backend for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use claimmate_core::*;

pub use json::parse_json_object;

#[cfg(feature = "openai")]
pub use openai::{OpenAIBackend, OpenAIConfig};
