//! Upload handling for new claims.
//!
//! Each uploaded file is safety-checked, stored in the blob area when one is
//! configured, and reduced to text for extraction. Blocked files are dropped
//! entirely. A failed blob write only loses the file reference; the file's
//! text still reaches the extraction prompt.

use std::sync::Arc;

use claimmate_core::{detect_content_type, extract_text, validate_file};
use claimmate_db::{attachment_key, placeholder_reference, public_reference, StorageBackend};
use tracing::{debug, warn};

/// One file part from a multipart request.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedAttachments {
    /// File references recorded on the claim, in upload order.
    pub references: Vec<String>,
    /// Text per accepted file, in upload order.
    pub texts: Vec<String>,
    /// Number of files refused by the safety check.
    pub blocked: usize,
}

#[derive(Clone)]
pub struct AttachmentPipeline {
    storage: Option<Arc<dyn StorageBackend>>,
    public_base_url: String,
    max_upload_bytes: u64,
}

impl AttachmentPipeline {
    pub fn new(
        storage: Option<Arc<dyn StorageBackend>>,
        public_base_url: impl Into<String>,
        max_upload_bytes: u64,
    ) -> Self {
        Self {
            storage,
            public_base_url: public_base_url.into(),
            max_upload_bytes,
        }
    }

    pub fn has_storage(&self) -> bool {
        self.storage.is_some()
    }

    pub async fn process(&self, uploads: Vec<Upload>) -> ProcessedAttachments {
        let mut processed = ProcessedAttachments::default();

        for upload in uploads {
            let check = validate_file(&upload.filename, &upload.data, self.max_upload_bytes);
            if !check.allowed {
                warn!(
                    subsystem = "api",
                    component = "attachments",
                    filename = %upload.filename,
                    reason = check.block_reason.as_deref().unwrap_or("unknown"),
                    "Attachment blocked"
                );
                processed.blocked += 1;
                continue;
            }

            let content_type =
                detect_content_type(&upload.filename, &upload.data, &upload.content_type);
            processed
                .texts
                .push(extract_text(&upload.filename, &content_type, &upload.data));

            if let Some(reference) = self.store(&upload).await {
                processed.references.push(reference);
            }
        }

        debug!(
            subsystem = "api",
            component = "attachments",
            file_count = processed.references.len(),
            blocked = processed.blocked,
            "Attachments processed"
        );
        processed
    }

    async fn store(&self, upload: &Upload) -> Option<String> {
        let Some(storage) = &self.storage else {
            return Some(placeholder_reference(&upload.filename));
        };

        let key = attachment_key(&upload.filename);
        match storage.write(&key, &upload.data).await {
            Ok(()) => Some(public_reference(&self.public_base_url, &key)),
            Err(e) => {
                warn!(
                    subsystem = "api",
                    component = "attachments",
                    filename = %upload.filename,
                    error = %e,
                    "Attachment upload failed, skipping file reference"
                );
                None
            }
        }
    }
}
