//! End-to-end update runs through the library API.

use httpmock::prelude::*;
use paperclip::core::PaperclipError;
use paperclip::workflow::{UpdateOutcome, UpdateWorkflow, WorkflowState};
use tempfile::TempDir;

use crate::fixtures::*;

#[tokio::test]
async fn test_installs_latest_build_when_absent() {
    let server = MockServer::start_async().await;
    let jar = jar_bytes(7, 96 * 1024);
    let digest = sha256_hex(&jar);

    let index = mock_index(&server, index_body(&[VERSION], vec![build_record(5, "a.jar", &digest)])).await;
    let download = mock_download(&server, 5, "a.jar", jar.clone()).await;

    let temp = TempDir::new().unwrap();
    let config = config_for(&server, temp.path());
    let install_path = config.install_path.clone();
    let temp_path = config.temp_path.clone();

    let report = UpdateWorkflow::new(config).unwrap().run().await.unwrap();

    index.assert_hits_async(1).await;
    download.assert_hits_async(1).await;
    assert_eq!(report.outcome, UpdateOutcome::Installed);
    assert_eq!(report.build.build_number(), 5);
    assert_eq!(report.bytes_downloaded, jar.len() as u64);
    assert_eq!(std::fs::read(&install_path).unwrap(), jar);
    assert!(!temp_path.exists(), "temp file should be cleaned up");
}

#[tokio::test]
async fn test_second_run_is_already_current() {
    let server = MockServer::start_async().await;
    let jar = jar_bytes(3, 10_000);
    let digest = sha256_hex(&jar);

    mock_index(&server, index_body(&[VERSION], vec![build_record(5, "a.jar", &digest)])).await;
    let download = mock_download(&server, 5, "a.jar", jar.clone()).await;

    let temp = TempDir::new().unwrap();
    let config = config_for(&server, temp.path());
    let install_path = config.install_path.clone();

    let first = UpdateWorkflow::new(config.clone()).unwrap().run().await.unwrap();
    assert_eq!(first.outcome, UpdateOutcome::Installed);
    let modified = std::fs::metadata(&install_path).unwrap().modified().unwrap();

    let second = UpdateWorkflow::new(config).unwrap().run().await.unwrap();
    assert_eq!(second.outcome, UpdateOutcome::AlreadyCurrent);
    assert_eq!(second.bytes_downloaded, 0);
    assert_eq!(
        second.states,
        vec![
            WorkflowState::Start,
            WorkflowState::IndexResolved,
            WorkflowState::AlreadyCurrent,
            WorkflowState::Done
        ]
    );

    // Only the first run downloaded anything
    download.assert_hits_async(1).await;
    assert_eq!(std::fs::metadata(&install_path).unwrap().modified().unwrap(), modified);
    assert_eq!(std::fs::read(&install_path).unwrap(), jar);
}

#[tokio::test]
async fn test_replaces_outdated_jar_with_highest_build() {
    let server = MockServer::start_async().await;
    let old_jar = jar_bytes(1, 4_000);
    let new_jar = jar_bytes(2, 5_000);

    // Out of order on purpose: selection goes by build number
    let builds = vec![
        build_record(12, "paper-1.20.4-12.jar", &sha256_hex(&new_jar)),
        build_record(4, "paper-1.20.4-4.jar", &sha256_hex(&old_jar)),
        build_record(9, "paper-1.20.4-9.jar", &sha256_hex(b"unused")),
    ];
    mock_index(&server, index_body(&["1.20.2", VERSION], builds)).await;
    let download = mock_download(&server, 12, "paper-1.20.4-12.jar", new_jar.clone()).await;

    let temp = TempDir::new().unwrap();
    let config = config_for(&server, temp.path());
    std::fs::write(&config.install_path, &old_jar).unwrap();
    let install_path = config.install_path.clone();

    let report = UpdateWorkflow::new(config).unwrap().run().await.unwrap();

    download.assert_hits_async(1).await;
    assert_eq!(report.build.build_number(), 12);
    assert_eq!(std::fs::read(&install_path).unwrap(), new_jar);
}

#[tokio::test]
async fn test_corrupted_download_keeps_installed_jar() {
    let server = MockServer::start_async().await;
    let published = jar_bytes(5, 8_000);
    let mut served = published.clone();
    served[4_000] ^= 0x01;

    mock_index(
        &server,
        index_body(&[VERSION], vec![build_record(5, "a.jar", &sha256_hex(&published))]),
    )
    .await;
    mock_download(&server, 5, "a.jar", served).await;

    let temp = TempDir::new().unwrap();
    let config = config_for(&server, temp.path());
    std::fs::write(&config.install_path, b"previous jar").unwrap();
    let install_path = config.install_path.clone();
    let temp_path = config.temp_path.clone();

    let err = UpdateWorkflow::new(config).unwrap().run().await.unwrap_err();

    match err {
        PaperclipError::ChecksumMismatch {
            expected,
            actual,
            ..
        } => {
            assert_eq!(expected, sha256_hex(&published));
            assert!(actual.is_some());
            assert_ne!(actual.as_deref(), Some(expected.as_str()));
        }
        other => panic!("expected ChecksumMismatch, got {other:?}"),
    }
    assert_eq!(std::fs::read(&install_path).unwrap(), b"previous jar");
    assert!(!temp_path.exists());
}

#[tokio::test]
async fn test_download_404_reports_network_error() {
    let server = MockServer::start_async().await;
    mock_index(
        &server,
        index_body(&[VERSION], vec![build_record(5, "a.jar", &sha256_hex(b"jar"))]),
    )
    .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(download_path(5, "a.jar"));
            then.status(404).body("not found");
        })
        .await;

    let temp = TempDir::new().unwrap();
    let config = config_for(&server, temp.path());
    std::fs::write(&config.install_path, b"previous jar").unwrap();
    let install_path = config.install_path.clone();
    let temp_path = config.temp_path.clone();

    let err = UpdateWorkflow::new(config).unwrap().run().await.unwrap_err();

    match err {
        PaperclipError::Network {
            status,
            ..
        } => assert_eq!(status, Some(404)),
        other => panic!("expected Network error, got {other:?}"),
    }
    assert!(!temp_path.exists());
    assert_eq!(std::fs::read(&install_path).unwrap(), b"previous jar");
}

#[tokio::test]
async fn test_version_without_builds() {
    let server = MockServer::start_async().await;
    // Known version, but every build belongs to another one
    let mut other = build_record(40, "other.jar", &sha256_hex(b"x"));
    other["version"] = "1.20.2".into();
    mock_index(&server, index_body(&["1.20.2", VERSION], vec![other])).await;

    let temp = TempDir::new().unwrap();
    let config = config_for(&server, temp.path());
    let install_path = config.install_path.clone();

    let err = UpdateWorkflow::new(config).unwrap().run().await.unwrap_err();

    assert!(
        matches!(&err, PaperclipError::NoCompatibleBuild { version } if version == VERSION),
        "unexpected error: {err:?}"
    );
    assert!(!install_path.exists());
}

#[tokio::test]
async fn test_unknown_version_makes_no_download() {
    let server = MockServer::start_async().await;
    mock_index(
        &server,
        index_body(&["1.20.1", "1.20.2"], vec![build_record(5, "a.jar", &sha256_hex(b"jar"))]),
    )
    .await;
    let download = mock_download(&server, 5, "a.jar", b"jar".to_vec()).await;

    let temp = TempDir::new().unwrap();
    let err = UpdateWorkflow::new(config_for(&server, temp.path()))
        .unwrap()
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, PaperclipError::VersionNotFound { .. }));
    download.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_malformed_index() {
    let server = MockServer::start_async().await;
    mock_index(&server, "<html>maintenance</html>".to_string()).await;

    let temp = TempDir::new().unwrap();
    let err = UpdateWorkflow::new(config_for(&server, temp.path()))
        .unwrap()
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, PaperclipError::MalformedResponse { .. }));
}

#[tokio::test]
async fn test_invalid_published_digest_is_malformed() {
    let server = MockServer::start_async().await;
    mock_index(&server, index_body(&[VERSION], vec![build_record(5, "a.jar", "not-a-digest")])).await;
    let download = mock_download(&server, 5, "a.jar", b"jar".to_vec()).await;

    let temp = TempDir::new().unwrap();
    let err = UpdateWorkflow::new(config_for(&server, temp.path()))
        .unwrap()
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, PaperclipError::MalformedResponse { .. }));
    download.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_index_server_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(INDEX_PATH);
            then.status(503);
        })
        .await;

    let temp = TempDir::new().unwrap();
    let err = UpdateWorkflow::new(config_for(&server, temp.path()))
        .unwrap()
        .run()
        .await
        .unwrap_err();

    assert!(err.is_network());
}
