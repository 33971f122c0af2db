//! End-to-end tests against a local HTTP server.
//!
//! The server honours `Range` requests the way a static file server does,
//! so these tests cover fresh downloads, resumed downloads and the
//! extension handling on top of the real `reqwest` transport.

use reqwest::header::{HeaderValue, USER_AGENT};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use steady::{Destination, FileDestination, TransferRequest};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::helpers::*;

async fn image_server() -> MockServer {
    let server = MockServer::start().await;
    for (ext, data) in SIGNATURE_SAMPLES {
        Mock::given(method("GET"))
            .and(path(format!("/image.{}", ext)))
            .respond_with(RangeResponder::new(data, mime_type_for(ext)))
            .mount(&server)
            .await;
    }
    server
}

fn sample(ext: &str) -> &'static [u8] {
    SIGNATURE_SAMPLES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, data)| *data)
        .expect("known sample")
}

/// Download `/image.<ext>` into a fresh destination and check the outcome.
async fn run_test(
    server: &MockServer,
    ext: &str,
    partial: Option<&[u8]>,
    extension: Option<&str>,
    expected_extension: &str,
) {
    init_tracing();
    let dir = create_temp_dir();
    let mut destination = create_destination(dir.path(), "file", extension, partial);
    let transfer = quiet_builder().build().unwrap();
    let request = TransferRequest::new(format!("{}/image.{}", server.uri(), ext));

    assert!(
        transfer.download(&request, &mut destination).await,
        "downloading '{}' failed",
        request.url
    );
    assert_eq!(destination.extension(), Some(expected_extension));

    destination.finalize().await.unwrap();
    assert_file_content(
        &dir.path().join(format!("file.{}", expected_extension)),
        sample(ext),
    );
    assert_file_missing(&dir.path().join("file.part"));
}

#[tokio::test]
async fn test_http_download() {
    let server = image_server().await;
    run_test(&server, "jpg", None, Some("jpg"), "jpg").await;
    run_test(&server, "png", None, Some("png"), "png").await;
    run_test(&server, "gif", None, Some("gif"), "gif").await;
}

#[tokio::test]
async fn test_http_offset() {
    let server = image_server().await;
    run_test(&server, "jpg", Some(&JPG_DATA[..123]), Some("jpg"), "jpg").await;
    run_test(&server, "png", Some(&PNG_DATA[..12]), Some("png"), "png").await;
    run_test(&server, "gif", Some(&GIF_DATA[..1]), Some("gif"), "gif").await;
}

#[tokio::test]
async fn test_http_offset_of_every_length_matches_fresh_download() {
    let server = image_server().await;
    for len in [0, 1, 2, 15, 16, 17, GIF_DATA.len() - 1] {
        run_test(&server, "gif", Some(&GIF_DATA[..len]), Some("gif"), "gif").await;
    }
}

#[tokio::test]
async fn test_http_extension() {
    let server = image_server().await;
    run_test(&server, "jpg", None, None, "jpg").await;
    run_test(&server, "png", None, None, "png").await;
    run_test(&server, "gif", None, None, "gif").await;
}

#[tokio::test]
async fn test_http_adjust_extension() {
    let server = image_server().await;
    run_test(&server, "jpg", None, Some("png"), "jpg").await;
    run_test(&server, "png", None, Some("gif"), "png").await;
    run_test(&server, "gif", None, Some("jpg"), "gif").await;
}

#[tokio::test]
async fn test_http_bin_extension_is_identified() {
    let server = image_server().await;
    for (ext, _) in SIGNATURE_SAMPLES {
        run_test(&server, ext, None, Some("bin"), ext).await;
    }
}

#[tokio::test]
async fn test_http_already_complete() {
    init_tracing();
    let server = image_server().await;
    let dir = create_temp_dir();
    let mut destination = create_destination(dir.path(), "file", Some("jpg"), Some(JPG_DATA));
    let transfer = quiet_builder().build().unwrap();
    let request = TransferRequest::new(format!("{}/image.jpg", server.uri()));

    assert!(transfer.download(&request, &mut destination).await);
    destination.finalize().await.unwrap();
    assert_file_content(&dir.path().join("file.jpg"), JPG_DATA);
}

#[tokio::test]
async fn test_http_filesize_min() {
    init_tracing();
    let server = image_server().await;
    let dir = create_temp_dir();
    let mut destination = create_destination(dir.path(), "file", None, None);
    let transfer = quiet_builder().min_size("100").build().unwrap();
    let request = TransferRequest::new(format!("{}/image.gif", server.uri()));

    assert!(!transfer.download(&request, &mut destination).await);
    assert_file_missing(destination.temp_path());
    assert_file_missing(destination.path());
}

#[tokio::test]
async fn test_http_filesize_max() {
    init_tracing();
    let server = image_server().await;
    let dir = create_temp_dir();
    let mut destination = create_destination(dir.path(), "file", None, None);
    let transfer = quiet_builder().max_size("100").build().unwrap();
    let request = TransferRequest::new(format!("{}/image.jpg", server.uri()));

    assert!(!transfer.download(&request, &mut destination).await);
    assert_file_missing(destination.temp_path());
    assert_file_missing(destination.path());
}

#[tokio::test]
async fn test_http_existing_file_is_not_downloaded_again() {
    init_tracing();
    let server = image_server().await;
    let dir = create_temp_dir();
    let existing = create_temp_file(&dir.path().join("file.png"), b"already here");
    let mut destination = create_destination(dir.path(), "file", None, None);
    let transfer = quiet_builder().build().unwrap();
    let request = TransferRequest::new(format!("{}/image.png", server.uri()));

    assert!(transfer.download(&request, &mut destination).await);
    assert!(!destination.has_temp());
    assert_file_missing(destination.temp_path());

    destination.finalize().await.unwrap();
    assert_file_content(&existing, b"already here");
}

#[tokio::test]
async fn test_http_headers_are_sent() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/agent.gif"))
        .and(header("accept", "*/*"))
        .and(header("user-agent", TEST_USER_AGENT))
        .respond_with(RangeResponder::new(GIF_DATA, "image/gif"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = create_temp_dir();
    let mut destination = create_destination(dir.path(), "agent", Some("gif"), None);
    let transfer = quiet_builder()
        .header(USER_AGENT, HeaderValue::from_static(TEST_USER_AGENT))
        .build()
        .unwrap();
    let request = TransferRequest::new(format!("{}/agent.gif", server.uri()))
        .header(USER_AGENT, HeaderValue::from_static("overridden"));

    assert!(transfer.download(&request, &mut destination).await);
}

#[tokio::test]
async fn test_http_not_found_fails() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let dir = create_temp_dir();
    let mut destination = create_destination(dir.path(), "missing", Some("jpg"), None);
    let transfer = quiet_builder().retries(3).build().unwrap();
    let request = TransferRequest::new(format!("{}/missing.jpg", server.uri()));

    assert!(!transfer.download(&request, &mut destination).await);
    assert_file_missing(destination.temp_path());
}

#[tokio::test]
async fn test_http_metadata_and_mtime() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(PNG_DATA.to_vec(), "image/png")
                .insert_header("Content-Disposition", "attachment; filename=\"cover%20art.png\"")
                .insert_header("Last-Modified", "Sun, 06 Nov 1994 08:49:37 GMT"),
        )
        .mount(&server)
        .await;

    let dir = create_temp_dir();
    let mut destination = FileDestination::new(dir.path(), "download").filename_from_headers(true);
    let transfer = quiet_builder().http_metadata("http").build().unwrap();
    let request = TransferRequest::new(format!("{}/download", server.uri()));

    assert!(transfer.download(&request, &mut destination).await);

    let metadata = destination.metadata("http").expect("metadata stored");
    assert_eq!(metadata.filename.as_deref(), Some("cover art"));
    assert_eq!(metadata.extension.as_deref(), Some("png"));
    assert_eq!(metadata.headers.get("content-type").map(String::as_str), Some("image/png"));

    let mtime = UNIX_EPOCH + Duration::from_secs(784_111_777);
    assert_eq!(destination.mtime(), Some(mtime));

    destination.finalize().await.unwrap();
    let path = dir.path().join("cover art.png");
    assert_file_content(&path, PNG_DATA);
    let modified: SystemTime = std::fs::metadata(&path).unwrap().modified().unwrap();
    assert_eq!(modified, mtime);
}

#[tokio::test]
async fn test_http_mtime_disabled() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(GIF_DATA.to_vec(), "image/gif")
                .insert_header("Last-Modified", "Sun, 06 Nov 1994 08:49:37 GMT"),
        )
        .mount(&server)
        .await;

    let dir = create_temp_dir();
    let mut destination = create_destination(dir.path(), "file", Some("gif"), None);
    let transfer = quiet_builder().mtime(false).build().unwrap();
    let request = TransferRequest::new(format!("{}/image.gif", server.uri()));

    assert!(transfer.download(&request, &mut destination).await);
    assert_eq!(destination.mtime(), None);
}
