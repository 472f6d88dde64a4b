//! Staged attachment tracking.
//!
//! DESIGN
//! ======
//! Files are uploaded as soon as the user picks them and held "staged" until
//! the next submit folds them into the outgoing message. Count and size
//! limits are enforced before any network call. Removal waits for the
//! gateway acknowledgment — no optimistic local deletion.

use tracing::{info, warn};

use super::notice::Notice;
use crate::gateway::Gateway;
use crate::gateway::types::Attachment;

/// Most files stageable for one message.
pub const MAX_STAGED_FILES: usize = 5;

/// Largest accepted file: 10 MiB.
pub const MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

pub(crate) const GENERIC_UPLOAD_ERROR: &str = "File upload failed. Please try again.";

#[derive(Default)]
pub struct AttachmentManager {
    staged: Vec<Attachment>,
    notice: Option<Notice>,
}

impl AttachmentManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Files awaiting the next send.
    #[must_use]
    pub fn staged(&self) -> &[Attachment] {
        &self.staged
    }

    /// Current error notice, if any and not yet expired.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.notice
            .as_ref()
            .filter(|n| !n.is_expired())
            .map(Notice::text)
    }

    pub fn dismiss_error(&mut self) {
        self.notice = None;
    }

    /// Validate and upload one file, staging it on success.
    ///
    /// Returns true when the file was staged. Rejections and failures raise
    /// the transient notice and leave `staged` untouched.
    pub async fn stage(&mut self, gateway: &dyn Gateway, filename: &str, bytes: Vec<u8>) -> bool {
        if self.staged.len() >= MAX_STAGED_FILES {
            self.raise(format!(
                "Maximum of {MAX_STAGED_FILES} files allowed. Remove a file before adding another."
            ));
            return false;
        }
        if bytes.len() as u64 > MAX_FILE_BYTES {
            self.raise(format!("{filename} is too large. Files must be 10 MiB or smaller."));
            return false;
        }

        match gateway.upload_file(filename, bytes).await {
            Ok(attachment) => {
                info!(
                    file_id = %attachment.file_id,
                    filename = %attachment.filename,
                    size = attachment.size,
                    "attachment staged"
                );
                self.staged.push(attachment);
                true
            }
            Err(e) => {
                warn!(error = %e, code = e.error_code(), filename, "upload failed");
                let text = e
                    .detail()
                    .map_or_else(|| GENERIC_UPLOAD_ERROR.to_owned(), ToOwned::to_owned);
                self.raise(text);
                false
            }
        }
    }

    /// Remove one staged file after the gateway acknowledges deletion.
    ///
    /// On failure the entry stays staged; the error is logged, not surfaced.
    pub async fn unstage(&mut self, gateway: &dyn Gateway, file_id: &str) -> bool {
        match gateway.remove_file(file_id).await {
            Ok(()) => {
                self.staged.retain(|a| a.file_id != file_id);
                info!(file_id, "attachment removed");
                true
            }
            Err(e) => {
                warn!(error = %e, code = e.error_code(), file_id, "removal failed; keeping staged entry");
                false
            }
        }
    }

    /// Snapshot-and-clear for submit. A single synchronous step, so a file
    /// staged mid-send can never leak into the outgoing message.
    pub(crate) fn take_staged(&mut self) -> Vec<Attachment> {
        std::mem::take(&mut self.staged)
    }

    fn raise(&mut self, text: String) {
        self.notice = Some(Notice::new(text));
    }
}

#[cfg(test)]
#[path = "attachments_test.rs"]
mod tests;
