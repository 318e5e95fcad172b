//! Multipart body decoding.
//!
//! Turns a `multipart/form-data` stream into an [`UploadRequest`]: the mode
//! comes from the `action` text field (alias `mode`), every part carrying a
//! filename becomes a [`FilePart`] in encounter order. Nothing is written to
//! disk here, so a truncated or aborted body leaves no trace.

use actix_multipart::{Field, Multipart};
use actix_web::error::PayloadError;
use actix_web::http::header::HeaderMap;
use actix_web::web::Bytes;
use futures_util::{Stream, StreamExt};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::{FilePart, UploadMode, UploadRequest};

/// Text field selecting the processing mode.
pub const ACTION_FIELD: &str = "action";

/// Accepted alias for [`ACTION_FIELD`].
pub const MODE_FIELD: &str = "mode";

/// Request-level limits applied while decoding.
#[derive(Debug, Clone, Copy)]
pub struct ParseLimits {
    /// Maximum number of raw body bytes, boundaries and part headers included
    pub max_request_size: usize,
    /// Mode used when no `action` field is present
    pub default_mode: UploadMode,
}

/// Build a `Multipart` over `stream` that overflows once more than
/// `max_request_size` raw body bytes have arrived; [`parse_upload`] reports
/// that as `PayloadTooLarge`.
///
/// Every byte is counted before the multipart parser sees it, so boundaries,
/// part headers and empty fields all draw from the same budget.
pub fn limited_multipart<S>(headers: &HeaderMap, stream: S, max_request_size: usize) -> Multipart
where
    S: Stream<Item = Result<Bytes, PayloadError>> + 'static,
{
    let mut received: usize = 0;
    let counted = stream.map(move |chunk| {
        let chunk = chunk?;
        received = received.saturating_add(chunk.len());
        if received > max_request_size {
            Err(PayloadError::Overflow)
        } else {
            Ok(chunk)
        }
    });

    Multipart::new(headers, counted)
}

/// Decode a multipart payload.
///
/// Fails with `MalformedRequest` on a broken boundary, truncated part or an
/// unknown mode, and with `PayloadTooLarge` when the payload was built by
/// [`limited_multipart`] and ran over its budget.
pub async fn parse_upload(payload: &mut Multipart, limits: &ParseLimits) -> AppResult<UploadRequest> {
    let mut action: Option<UploadMode> = None;
    let mut mode_alias: Option<UploadMode> = None;
    let mut parts: Vec<FilePart> = Vec::new();

    while let Some(item) = payload.next().await {
        let mut field = item?;

        let content_disposition = field.content_disposition().ok_or_else(|| {
            AppError::MalformedRequest("Missing content disposition".to_string())
        })?;

        let field_name = content_disposition.get_name().unwrap_or_default().to_string();
        let filename = content_disposition.get_filename().map(str::to_string);
        let declared_mime_type = field.content_type().map(|m| m.essence_str().to_string());

        let data = read_field(&mut field).await?;

        match filename {
            Some(original_name) => {
                // Browsers send an empty, nameless part for an untouched file input
                if original_name.trim().is_empty() && data.is_empty() {
                    debug!("Skipping empty file field '{}'", field_name);
                    continue;
                }

                parts.push(FilePart {
                    field_name,
                    original_name,
                    declared_mime_type,
                    content: data,
                });
            }
            None if field_name == ACTION_FIELD => {
                action = Some(parse_mode(&field_name, &data)?);
            }
            None if field_name == MODE_FIELD => {
                mode_alias = Some(parse_mode(&field_name, &data)?);
            }
            None => {
                debug!("Ignoring form field '{}'", field_name);
            }
        }
    }

    Ok(UploadRequest {
        mode: action.or(mode_alias).unwrap_or(limits.default_mode),
        parts,
    })
}

/// Read one field to the end.
async fn read_field(field: &mut Field) -> AppResult<Vec<u8>> {
    let mut data = Vec::new();

    while let Some(chunk) = field.next().await {
        data.extend_from_slice(&chunk?);
    }

    Ok(data)
}

fn parse_mode(field_name: &str, data: &[u8]) -> AppResult<UploadMode> {
    let value = std::str::from_utf8(data).map_err(|_| {
        AppError::MalformedRequest(format!("Field '{}' is not valid UTF-8", field_name))
    })?;

    UploadMode::parse(value).ok_or_else(|| {
        AppError::MalformedRequest(format!(
            "Unknown {} '{}'. Must be 'simple', 'multiple' or 'info'",
            field_name,
            value.trim()
        ))
    })
}
