use ipfs_relay::{
    app::run_with_relay,
    config::Config,
    relay::{Relay, RelayState},
    uploader::Uploader,
};
use pretty_assertions::assert_eq;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::net::SocketAddr;
use tokio::sync::oneshot;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(pinata: &MockServer) -> Config {
    let mut config = Config::new("test-key".to_string(), "test-secret".to_string());
    config.pinata_api_url = pinata.uri();
    config.bind_addr = "127.0.0.1:0".to_string();
    config
}

async fn mount_pinata(pinata: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/pinning/pinFileToIPFS"))
        .and(header("pinata_api_key", "test-key"))
        .and(header("pinata_secret_api_key", "test-secret"))
        .respond_with(response)
        .mount(pinata)
        .await;
}

/// Start a relay against the stubbed provider; dropping the sender stops it.
async fn start_relay(config: &Config) -> (SocketAddr, oneshot::Sender<()>) {
    let relay = Relay::bind(&config.bind_addr, RelayState::from_config(config))
        .await
        .unwrap();
    let addr = relay.local_addr().unwrap();

    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(relay.serve(async {
        let _ = rx.await;
    }));

    (addr, tx)
}

async fn post_file(addr: SocketAddr, form: Form) -> (StatusCode, Value) {
    let response = reqwest::Client::new()
        .post(format!("http://{}/upload", addr))
        .multipart(form)
        .send()
        .await
        .unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

fn file_form(name: &str, data: &'static [u8]) -> Form {
    Form::new().part("file", Part::bytes(data).file_name(name.to_string()))
}

#[tokio::test]
async fn test_upload_returns_ipfs_url() {
    let pinata = MockServer::start().await;
    mount_pinata(
        &pinata,
        ResponseTemplate::new(200).set_body_json(json!({ "IpfsHash": "Qm123" })),
    )
    .await;

    let config = config_for(&pinata);
    let (addr, _stop) = start_relay(&config).await;

    let (status, body) = post_file(addr, file_form("cat.png", b"png")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ipfs_url": "https://ipfs.io/ipfs/Qm123" }));
}

#[tokio::test]
async fn test_missing_file_field() {
    let pinata = MockServer::start().await;
    let config = config_for(&pinata);
    let (addr, _stop) = start_relay(&config).await;

    let (status, body) = post_file(addr, Form::new().text("note", "nothing attached")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "File missing" }));
    assert!(pinata.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_provider_error_body_surfaced() {
    let pinata = MockServer::start().await;
    mount_pinata(&pinata, ResponseTemplate::new(500).set_body_string("boom")).await;

    let config = config_for(&pinata);
    let (addr, _stop) = start_relay(&config).await;

    let (status, body) = post_file(addr, file_form("a.txt", b"a")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("boom"));
    assert_eq!(pinata.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_provider_malformed_json() {
    let pinata = MockServer::start().await;
    mount_pinata(&pinata, ResponseTemplate::new(200).set_body_string("{not json")).await;

    let config = config_for(&pinata);
    let (addr, _stop) = start_relay(&config).await;

    let (status, body) = post_file(addr, file_form("a.txt", b"a")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal server error" }));
}

#[tokio::test]
async fn test_concurrent_uploads_are_independent() {
    let pinata = MockServer::start().await;
    mount_pinata(
        &pinata,
        ResponseTemplate::new(200).set_body_json(json!({ "IpfsHash": "QmSame" })),
    )
    .await;

    let config = config_for(&pinata);
    let (addr, _stop) = start_relay(&config).await;

    let uploads = (0..8).map(|i| post_file(addr, file_form(&format!("f{}.bin", i), b"data")));
    let results = spawn_all(uploads).await;

    for (status, body) in results {
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ipfs_url"], "https://ipfs.io/ipfs/QmSame");
    }
    assert_eq!(pinata.received_requests().await.unwrap().len(), 8);
}

async fn spawn_all<F, T>(futures: impl Iterator<Item = F>) -> Vec<T>
where
    F: std::future::Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let handles: Vec<_> = futures.map(tokio::spawn).collect();
    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(handle.await.unwrap());
    }
    results
}

/// Uploader -> relay -> provider, checking the filename survives both hops.
#[tokio::test]
async fn test_uploader_through_relay_to_provider() {
    let pinata = MockServer::start().await;
    mount_pinata(
        &pinata,
        ResponseTemplate::new(200).set_body_json(json!({ "IpfsHash": "QmRoundTrip" })),
    )
    .await;

    let config = config_for(&pinata);
    let relay = Relay::bind(&config.bind_addr, RelayState::from_config(&config))
        .await
        .unwrap();
    let uploader = Uploader::new(format!("http://{}", relay.local_addr().unwrap()));

    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("sunset photo.jpg");
    std::fs::write(&file_path, b"jpeg payload").unwrap();

    let input = format!("{}\nexit\n", file_path.display());
    let mut output = Vec::new();
    run_with_relay(relay, uploader, input.as_bytes(), &mut output)
        .await
        .unwrap();

    let output = String::from_utf8(output).unwrap();
    assert!(output.contains(
        r#"Response from server: {"ipfs_url":"https://ipfs.io/ipfs/QmRoundTrip"}"#
    ));
    assert!(output.contains("Exiting CLI uploader."));

    let requests = pinata.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("filename=\"sunset photo.jpg\""));
    assert!(body.contains("jpeg payload"));
}

#[tokio::test]
async fn test_relay_stops_after_uploader_exits() {
    let pinata = MockServer::start().await;
    let config = config_for(&pinata);

    let relay = Relay::bind(&config.bind_addr, RelayState::from_config(&config))
        .await
        .unwrap();
    let addr = relay.local_addr().unwrap();
    let uploader = Uploader::new(format!("http://{}", addr));

    let mut output = Vec::new();
    run_with_relay(relay, uploader, &b"exit\n"[..], &mut output)
        .await
        .unwrap();

    let result = reqwest::get(format!("http://{}/health", addr)).await;
    assert!(result.is_err());
}
