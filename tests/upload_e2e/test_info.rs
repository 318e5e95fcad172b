//! E2E tests: info mode.

use super::test_helpers::*;

const INFO_CONTENT: &[u8] = b"This is content for file info test\n";

/// Metadata is reported and nothing is stored.
#[actix_rt::test]
async fn test_info_reports_metadata_without_storing() {
    let (app, dir) = create_test_app(TestSettings::default()).await;

    let body = MultipartBody::new()
        .text("action", "info")
        .file("file1", "info_test.pdf", "application/pdf", INFO_CONTENT);
    let (status, html) = upload_html(&app, body).await;

    assert_eq!(status, 200);
    assert_eq!(line_value(&html, "File Name:"), Some("info_test.pdf"));
    assert_eq!(line_value(&html, "Size:"), Some("35 bytes"));
    assert_eq!(line_value(&html, "MIME Type:"), Some("application/pdf"));
    assert_eq!(line_value(&html, "Accepted:"), Some("Yes"));
    assert!(!html.contains("New Name:"));
    assert!(stored_files(dir.path()).is_empty());
}

/// Info mode reports what would have happened to a rejected file.
#[actix_rt::test]
async fn test_info_reports_rejection_reason() {
    let mut settings = TestSettings::default();
    settings.policy.blocked_mime_types = vec!["application/pdf".to_string()];
    let (app, dir) = create_test_app(settings).await;

    let body = MultipartBody::new()
        .text("action", "info")
        .file("file1", "info_test.pdf", "application/pdf", INFO_CONTENT);
    let (status, html) = upload_html(&app, body).await;

    assert_eq!(status, 200);
    assert_eq!(
        line_value(&html, "Accepted:"),
        Some("No (MIME type &#39;application/pdf&#39; is not allowed)")
    );
    assert!(stored_files(dir.path()).is_empty());
}

/// The `mode` alias selects info mode too.
#[actix_rt::test]
async fn test_mode_alias_selects_info() {
    let (app, dir) = create_test_app(TestSettings::default()).await;

    let body = MultipartBody::new()
        .text("mode", "INFO")
        .file("file1", "notes.txt", "text/plain", b"abc");
    let (status, html) = upload_html(&app, body).await;

    assert_eq!(status, 200);
    assert!(html.contains("File Information"));
    assert!(stored_files(dir.path()).is_empty());
}
