use std::fs;

use imagegen_engine::{DownloadError, ImageDownloader, ServiceSettings};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn remote_image_is_written_to_download_dir() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/img.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3, 4]))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let downloader = ImageDownloader::new(&ServiceSettings::default(), temp.path().join("saved"))
        .unwrap()
        .with_file_prefix("abbas");

    let saved = downloader
        .download(&format!("{}/img.png", server.uri()))
        .await
        .expect("download ok");
    let name = saved.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("abbas-"), "{name}");
    assert!(name.ends_with(".png"), "{name}");
    assert_eq!(fs::read(&saved).unwrap(), vec![1u8, 2, 3, 4]);
}

#[tokio::test]
async fn inline_data_reference_is_decoded_without_network() {
    let temp = TempDir::new().unwrap();
    let downloader =
        ImageDownloader::new(&ServiceSettings::default(), temp.path().to_path_buf()).unwrap();

    // "hi!" in base64.
    let saved = downloader
        .download("data:image/jpeg;base64,aGkh")
        .await
        .expect("decode ok");
    assert_eq!(saved.extension().unwrap(), "jpg");
    assert_eq!(fs::read(&saved).unwrap(), b"hi!");
}

#[tokio::test]
async fn oversized_image_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 32]))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let settings = ServiceSettings {
        max_download_bytes: 16,
        ..ServiceSettings::default()
    };
    let downloader = ImageDownloader::new(&settings, temp.path().to_path_buf()).unwrap();

    let err = downloader
        .download(&format!("{}/big.png", server.uri()))
        .await
        .unwrap_err();
    assert!(
        matches!(err, DownloadError::TooLarge { max_bytes: 16, actual: 32 }),
        "got {err:?}"
    );
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn missing_image_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let downloader =
        ImageDownloader::new(&ServiceSettings::default(), temp.path().to_path_buf()).unwrap();
    let err = downloader
        .download(&format!("{}/gone.png", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, DownloadError::HttpStatus(404)), "got {err:?}");
}
