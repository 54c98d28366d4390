use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::ServiceError;
use crate::services::AttachmentUpload;

/// Pagination parameters for list operations
#[derive(Debug, Deserialize, Serialize)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    20
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PaginationParams {
    /// Builds params from optional query values, falling back to the
    /// defaults and clamping zeroes.
    pub fn from_query(page: Option<u64>, per_page: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or_else(default_page).max(1),
            per_page: per_page.unwrap_or_else(default_per_page).max(1),
        }
    }
}

/// Standard pagination response metadata
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl PaginationMeta {
    pub fn new(page: u64, per_page: u64, total: u64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            total.div_ceil(per_page)
        };
        Self {
            page,
            per_page,
            total,
            total_pages,
        }
    }
}

/// Standard paginated response wrapper
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: u64, per_page: u64, total: u64) -> Self {
        Self {
            data,
            pagination: PaginationMeta::new(page, per_page, total),
        }
    }
}

/// Attachment as transported in JSON request bodies: base64 content
/// plus the client's filename.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct AttachmentPayload {
    #[validate(length(min = 1))]
    pub filename: String,
    pub content: String,
}

/// Decodes request attachments, rejecting malformed base64.
pub fn decode_attachments(
    payloads: &[AttachmentPayload],
) -> Result<Vec<AttachmentUpload>, ServiceError> {
    payloads
        .iter()
        .map(|payload| {
            let bytes = BASE64.decode(&payload.content).map_err(|_| {
                ServiceError::Validation(format!(
                    "attachment {} is not valid base64",
                    payload.filename
                ))
            })?;
            Ok(AttachmentUpload {
                filename: payload.filename.clone(),
                bytes,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_meta_rounds_total_pages_up() {
        let meta = PaginationMeta::new(1, 20, 41);
        assert_eq!(meta.total_pages, 3);
        let empty = PaginationMeta::new(1, 20, 0);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn decode_attachments_rejects_bad_base64() {
        let payloads = vec![AttachmentPayload {
            filename: "receipt.pdf".to_string(),
            content: "not-base64!!".to_string(),
        }];
        assert!(decode_attachments(&payloads).is_err());
    }

    #[test]
    fn decode_attachments_round_trips_bytes() {
        let payloads = vec![AttachmentPayload {
            filename: "a.txt".to_string(),
            content: BASE64.encode(b"hello"),
        }];
        let decoded = decode_attachments(&payloads).unwrap();
        assert_eq!(decoded[0].bytes, b"hello");
    }
}
