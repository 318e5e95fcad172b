//! Stored file retrieval.

use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, get, web};
use tracing::debug;

use crate::error::AppResult;
use crate::services::UploadHandler;
use crate::services::storage::content_type_for_extension;

/// Serve a stored upload by its generated name.
///
/// Names that could not have been generated by the server are answered with
/// 404 before the filesystem is touched.
#[get("/files/{stored_name}")]
pub async fn serve_file(
    handler: web::Data<UploadHandler>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let stored_name = path.into_inner();

    debug!("Serving stored file: {}", stored_name);

    let data = handler.writer().backend().read(&stored_name).await?;

    let ext = stored_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or_default();

    Ok(HttpResponse::Ok()
        .content_type(content_type_for_extension(ext))
        .insert_header((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(stored_name)],
        })
        .body(data))
}
