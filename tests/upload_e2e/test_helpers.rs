//! Shared test helpers for upload E2E tests.

use std::path::Path;
use std::sync::Arc;

use actix_web::{App, dev::ServiceResponse, http::header, test, web};
use tempfile::TempDir;
use tokio::sync::Semaphore;
use upload_handler_lib::config::PolicySettings;
use upload_handler_lib::models::UploadMode;
use upload_handler_lib::services::{LocalStorage, ParseLimits, StorageWriter, UploadHandler};

/// Boundary used by every body built in these tests.
pub const BOUNDARY: &str = "----UploadE2EBoundary7MA4YWxkTrZu0gW";

/// Per-file limit used by [`default_policy`].
pub const TEST_MAX_FILE_SIZE: u64 = 1024;

/// Knobs for one test app.
pub struct TestSettings {
    pub policy: PolicySettings,
    pub max_request_size: usize,
    pub max_concurrent_uploads: usize,
}

impl Default for TestSettings {
    fn default() -> Self {
        Self {
            policy: default_policy(),
            max_request_size: 64 * 1024,
            max_concurrent_uploads: 4,
        }
    }
}

/// Policy with a small size limit and no type restrictions.
pub fn default_policy() -> PolicySettings {
    PolicySettings {
        max_file_size: Some(TEST_MAX_FILE_SIZE),
        ..Default::default()
    }
}

/// Create a test app over a fresh temporary storage directory.
///
/// The returned `TempDir` must outlive the app.
pub async fn create_test_app(
    settings: TestSettings,
) -> (
    impl actix_web::dev::Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    TempDir,
) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let storage = LocalStorage::new(dir.path())
        .await
        .expect("Failed to prepare storage");
    let handler = UploadHandler::new(settings.policy, StorageWriter::new(Arc::new(storage)));
    let limits = ParseLimits {
        max_request_size: settings.max_request_size,
        default_mode: UploadMode::Simple,
    };
    let semaphore = Arc::new(Semaphore::new(settings.max_concurrent_uploads));

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(handler))
            .app_data(web::Data::new(limits))
            .app_data(web::Data::new(semaphore))
            .configure(upload_handler_lib::api::configure_routes),
    )
    .await;

    (app, dir)
}

/// Builder for `multipart/form-data` bodies.
#[derive(Default)]
pub struct MultipartBody {
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a plain form field.
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
        self
    }

    /// Append a file field.
    pub fn file(mut self, field: &str, filename: &str, mime: &str, content: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, field, filename, mime
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(content);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Close the body.
    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        self.body
    }
}

/// Content-Type header value matching [`BOUNDARY`].
pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

/// POST a raw body to `uri`; returns status and body text.
pub async fn post_upload<S>(app: &S, uri: &str, body: Vec<u8>, accept: Option<&str>) -> (u16, String)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let mut req = test::TestRequest::post()
        .uri(uri)
        .insert_header((header::CONTENT_TYPE, multipart_content_type()));
    if let Some(accept) = accept {
        req = req.insert_header((header::ACCEPT, accept));
    }

    let resp = test::call_service(app, req.set_payload(body).to_request()).await;
    let status = resp.status().as_u16();
    let body = test::read_body(resp).await;
    (status, String::from_utf8_lossy(&body).into_owned())
}

/// POST a multipart body to `/upload` asking for HTML.
pub async fn upload_html<S>(app: &S, body: MultipartBody) -> (u16, String)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    post_upload(app, "/upload", body.finish(), None).await
}

/// Names of the regular files directly under the storage root.
pub fn stored_files(root: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(root)
        .expect("Failed to read storage dir")
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Value following `label` on its `<p>` line, if present.
pub fn line_value<'a>(html: &'a str, label: &str) -> Option<&'a str> {
    let start = html.find(&format!("<p>{} ", label))? + label.len() + 4;
    let end = html[start..].find("</p>")? + start;
    Some(&html[start..end])
}
