//! Upload endpoint.
//!
//! Every request that decodes cleanly gets a 200 whose body says what
//! happened to each file. Only transport problems (broken multipart, body
//! over the request limit, too many uploads in flight) produce an error status.

use std::sync::Arc;

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, post, web};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::UploadReport;
use crate::services::{ParseLimits, UploadHandler, limited_multipart, parse_upload, render_html};

/// Accept a multipart upload and report the outcome per file.
///
/// Form fields:
/// - `action` (alias `mode`): `simple`, `multiple` or `info`
/// - any field with a filename: a file to process
///
/// Responds with HTML unless the `Accept` header asks for JSON.
#[post("/upload")]
pub async fn upload(
    req: HttpRequest,
    payload: web::Payload,
    handler: web::Data<UploadHandler>,
    limits: web::Data<ParseLimits>,
    upload_semaphore: web::Data<Arc<Semaphore>>,
) -> AppResult<HttpResponse> {
    let _permit = upload_semaphore.try_acquire().map_err(|_| {
        warn!("Upload rejected: too many concurrent uploads");
        AppError::ServiceUnavailable(
            "Too many concurrent uploads. Please try again later.".to_string(),
        )
    })?;

    if let Some(length) = declared_content_length(&req)
        && length > limits.max_request_size
    {
        warn!(
            "Upload rejected: declared body of {} bytes exceeds {} bytes",
            length, limits.max_request_size
        );
        return Err(AppError::PayloadTooLarge(format!(
            "Request body exceeds {} bytes",
            limits.max_request_size
        )));
    }

    let mut multipart = limited_multipart(req.headers(), payload, limits.max_request_size);
    let request = parse_upload(&mut multipart, limits.get_ref()).await?;
    let mode = request.mode;
    let file_count = request.parts.len();

    let report = handler.process(request).await;

    info!(
        mode = %mode,
        files = file_count,
        stored = report.ok_count(),
        rejected = report.failed_count(),
        "Upload processed"
    );

    Ok(respond(&req, &report))
}

/// Build the 200 response in the representation the client prefers.
fn respond(req: &HttpRequest, report: &UploadReport) -> HttpResponse {
    if prefers_json(req) {
        HttpResponse::Ok().json(report)
    } else {
        HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(render_html(report))
    }
}

fn prefers_json(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json") && !accept.contains("text/html"))
}

fn declared_content_length(req: &HttpRequest) -> Option<usize> {
    req.headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}
