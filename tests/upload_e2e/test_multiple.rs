//! E2E tests: multiple mode.

use super::test_helpers::*;

/// Two files give a header row plus one row each.
#[actix_rt::test]
async fn test_multiple_upload_table() {
    let (app, dir) = create_test_app(TestSettings::default()).await;

    let body = MultipartBody::new()
        .text("action", "multiple")
        .file("files", "file1.txt", "text/plain", b"Content 1")
        .file("files", "file2.txt", "text/plain", b"Content 2 longer");
    let (status, html) = upload_html(&app, body).await;

    assert_eq!(status, 200);
    assert_eq!(html.matches("<tr>").count(), 3, "{}", html);
    assert_eq!(html.matches("<td class='success'>OK</td>").count(), 2);
    assert!(!html.contains("<td class='error'>FAILED"));
    assert!(html.contains("<td>file1.txt</td><td>9</td>"));
    assert!(html.contains("<td>file2.txt</td><td>16</td>"));
    assert!(html.find("file1.txt").unwrap() < html.find("file2.txt").unwrap());
    assert_eq!(stored_files(dir.path()).len(), 2);
}

/// One bad file fails alone; its siblings are still stored.
#[actix_rt::test]
async fn test_multiple_mixed_outcomes() {
    let (app, dir) = create_test_app(TestSettings::default()).await;
    let oversized = vec![b'x'; TEST_MAX_FILE_SIZE as usize + 10];

    let body = MultipartBody::new()
        .text("action", "multiple")
        .file("files", "a.txt", "text/plain", b"alpha")
        .file("files", "huge.bin", "application/octet-stream", &oversized)
        .file("files", "c.txt", "text/plain", b"gamma");
    let (status, html) = upload_html(&app, body).await;

    assert_eq!(status, 200);
    assert_eq!(html.matches("<tr>").count(), 4);
    assert_eq!(html.matches("<td class='success'>OK</td>").count(), 2);
    assert_eq!(html.matches("<td class='error'>FAILED").count(), 1);
    assert!(html.contains("<td class='error'>FAILED: File size of 1034 bytes exceeds maximum allowed size of 1024 bytes</td>"));
    assert_eq!(stored_files(dir.path()).len(), 2);
}

/// Allow-lists admit only the listed extensions.
#[actix_rt::test]
async fn test_multiple_with_allow_list() {
    let mut settings = TestSettings::default();
    settings.policy.allowed_extensions = vec!["txt".to_string()];
    let (app, dir) = create_test_app(settings).await;

    let body = MultipartBody::new()
        .text("action", "multiple")
        .file("files", "notes.txt", "text/plain", b"ok")
        .file("files", "image.png", "image/png", b"\x89PNG");
    let (status, html) = upload_html(&app, body).await;

    assert_eq!(status, 200);
    assert_eq!(html.matches("<td class='success'>OK</td>").count(), 1);
    assert!(html.contains("FAILED: File extension &#39;.png&#39; is not allowed"));
    assert_eq!(stored_files(dir.path()).len(), 1);
}

/// No files still renders the table header.
#[actix_rt::test]
async fn test_multiple_without_files() {
    let (app, _dir) = create_test_app(TestSettings::default()).await;

    let (status, html) = upload_html(&app, MultipartBody::new().text("action", "multiple")).await;

    assert_eq!(status, 200);
    assert_eq!(html.matches("<tr>").count(), 1);
}
