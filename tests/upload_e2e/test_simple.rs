//! E2E tests: simple mode.

use super::test_helpers::*;

const HELLO: &[u8] = b"Hello World - This is a test file!\n";

/// One accepted file is stored under a generated name.
#[actix_rt::test]
async fn test_simple_upload_succeeds() {
    let (app, dir) = create_test_app(TestSettings::default()).await;
    assert_eq!(HELLO.len(), 35);

    let body = MultipartBody::new()
        .text("action", "simple")
        .file("file1", "myfile.txt", "text/plain", HELLO);
    let (status, html) = upload_html(&app, body).await;

    assert_eq!(status, 200);
    assert!(html.contains("Upload Successful"), "{}", html);
    assert!(!html.contains("Upload Failed"));
    assert_eq!(line_value(&html, "Size:"), Some("35 bytes"));
    assert_eq!(line_value(&html, "MIME Type:"), Some("text/plain"));

    let new_name = line_value(&html, "New Name:").expect("New Name line");
    assert_ne!(new_name, "myfile.txt");
    assert!(new_name.starts_with("upload_"));
    assert!(new_name.ends_with(".txt"));

    assert_eq!(stored_files(dir.path()), vec![new_name.to_string()]);
    assert_eq!(std::fs::read(dir.path().join(new_name)).unwrap(), HELLO);
}

/// Uploading the same name twice never overwrites the first copy.
#[actix_rt::test]
async fn test_same_file_twice_gets_distinct_names() {
    let (app, dir) = create_test_app(TestSettings::default()).await;

    let mut names = Vec::new();
    for content in [&b"first version"[..], &b"second version"[..]] {
        let body = MultipartBody::new()
            .text("action", "simple")
            .file("file1", "same.txt", "text/plain", content);
        let (status, html) = upload_html(&app, body).await;
        assert_eq!(status, 200);
        names.push(line_value(&html, "New Name:").unwrap().to_string());
    }

    assert_ne!(names[0], names[1]);
    assert_eq!(stored_files(dir.path()).len(), 2);
    assert_eq!(std::fs::read(dir.path().join(&names[0])).unwrap(), b"first version");
    assert_eq!(std::fs::read(dir.path().join(&names[1])).unwrap(), b"second version");
}

/// An oversized file fails with a size reason and is not stored.
#[actix_rt::test]
async fn test_simple_oversized_file_fails() {
    let (app, dir) = create_test_app(TestSettings::default()).await;
    let content = vec![b'x'; TEST_MAX_FILE_SIZE as usize + 1];

    let body = MultipartBody::new()
        .text("action", "simple")
        .file("file1", "big.txt", "text/plain", &content);
    let (status, html) = upload_html(&app, body).await;

    assert_eq!(status, 200);
    assert!(html.contains("Upload Failed"));
    assert!(!html.contains("New Name:"));
    let error = line_value(&html, "Error:").expect("Error line");
    assert!(error.contains("size"), "{}", error);
    assert!(stored_files(dir.path()).is_empty());
}

/// A traversal attempt in the filename never reaches the filesystem path.
#[actix_rt::test]
async fn test_path_traversal_name_is_not_used() {
    let (app, dir) = create_test_app(TestSettings::default()).await;

    let body = MultipartBody::new()
        .text("action", "simple")
        .file("file1", "../../etc/passwd.txt", "text/plain", b"root:x:0:0");
    let (status, html) = upload_html(&app, body).await;

    assert_eq!(status, 200);
    assert!(html.contains("Upload Successful"));
    assert_eq!(line_value(&html, "Original Name:"), Some("passwd.txt"));
    let new_name = line_value(&html, "New Name:").unwrap();
    assert!(!new_name.contains('/'));
    assert_eq!(stored_files(dir.path()), vec![new_name.to_string()]);
}

/// Blocked extensions are rejected before anything is written.
#[actix_rt::test]
async fn test_blocked_extension_fails() {
    let mut settings = TestSettings::default();
    settings.policy.blocked_extensions = vec!["exe".to_string()];
    let (app, dir) = create_test_app(settings).await;

    let body = MultipartBody::new()
        .text("action", "simple")
        .file("file1", "setup.EXE", "application/octet-stream", b"MZ");
    let (status, html) = upload_html(&app, body).await;

    assert_eq!(status, 200);
    assert!(html.contains("Upload Failed"));
    assert_eq!(
        line_value(&html, "Error:"),
        Some("File extension &#39;.exe&#39; is not allowed")
    );
    assert!(stored_files(dir.path()).is_empty());
}

/// A simple request without a file is reported, not treated as a transport error.
#[actix_rt::test]
async fn test_simple_without_file_reports_error() {
    let (app, dir) = create_test_app(TestSettings::default()).await;

    let (status, html) = upload_html(&app, MultipartBody::new().text("action", "simple")).await;

    assert_eq!(status, 200);
    assert!(html.contains("Upload Failed"));
    assert_eq!(line_value(&html, "Error:"), Some("No file was submitted"));
    assert!(stored_files(dir.path()).is_empty());
}
