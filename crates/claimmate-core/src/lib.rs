//! # claimmate-core
//!
//! Core types, traits, and abstractions for ClaimMate.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the other ClaimMate crates depend on.

pub mod attachments;
pub mod error;
pub mod logging;
pub mod models;
pub mod outcome;
pub mod traits;
pub mod uuid_utils;

// Re-export commonly used types at crate root
pub use attachments::{
    detect_content_type, extract_text, sanitize_filename, validate_file, AttachmentCheck,
};
pub use error::{Error, Result};
pub use models::*;
pub use outcome::Outcome;
pub use traits::*;
pub use uuid_utils::new_v7;
