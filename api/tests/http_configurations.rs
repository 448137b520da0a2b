use api::configuration_providers::http::HttpConfigurations;
use api::settings::ClientSettings;
use api::ApiError;
use api::ConfigurationProvider;
use api::MappingId;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

fn id(n: i64) -> MappingId {
    MappingId::from(n)
}

const MAPPINGS: &str = r#"[
    {"origin": "a", "mappingID": 1, "active": false, "from": "/one"},
    {"origin": "b", "mappingID": 2, "active": true},
    {"origin": "a", "mappingID": 3, "active": true}
]"#;

/// Serves a single canned response and yields the request line it received.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..n]);
            if request.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }

        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;

        String::from_utf8_lossy(&request)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string()
    });

    (format!("http://{}", addr), handle)
}

fn provider(base_url: &str) -> HttpConfigurations {
    HttpConfigurations::new(&ClientSettings::from_env().with_base_url(base_url)).unwrap()
}

#[tokio::test]
async fn fetch_reads_full_collection() {
    let (base, server) = serve_once("200 OK", MAPPINGS).await;

    let mappings = provider(&base).fetch_mappings().await.unwrap();

    assert_eq!(server.await.unwrap(), "GET /configurations HTTP/1.1");
    assert_eq!(mappings.len(), 3);
    assert_eq!(mappings[0].mapping_id, id(1));
    assert_eq!(mappings[0].origin, "a");
    assert!(!mappings[0].active);
    assert_eq!(mappings[0].field("from"), Some(&serde_json::json!("/one")));
    assert_eq!(mappings[2].mapping_id, id(3));
}

#[tokio::test]
async fn put_targets_mapping_and_status() {
    let (base, server) = serve_once("200 OK", MAPPINGS).await;

    let mappings = provider(&base)
        .set_mapping_active(&id(1), true)
        .await
        .unwrap();

    assert_eq!(
        server.await.unwrap(),
        "PUT /configurations/1?active=true HTTP/1.1"
    );
    assert_eq!(mappings.len(), 3);
}

#[tokio::test]
async fn put_with_text_id() {
    let (base, server) = serve_once("200 OK", "[]").await;

    let mappings = provider(&base)
        .set_mapping_active(&MappingId::from("api-v2"), false)
        .await
        .unwrap();

    assert_eq!(
        server.await.unwrap(),
        "PUT /configurations/api-v2?active=false HTTP/1.1"
    );
    assert!(mappings.is_empty());
}

#[tokio::test]
async fn server_error_is_reported() {
    let (base, server) = serve_once("500 Internal Server Error", "boom").await;

    let err = provider(&base).fetch_mappings().await.unwrap_err();
    server.await.unwrap();

    match err {
        ApiError::Status { status, .. } => assert_eq!(status.as_u16(), 500),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn malformed_body_is_reported() {
    let (base, server) = serve_once("200 OK", r#"{"origin": "a"}"#).await;

    let err = provider(&base).fetch_mappings().await.unwrap_err();
    server.await.unwrap();

    assert!(matches!(err, ApiError::Decode { .. }));
}

#[tokio::test]
async fn unreachable_server_is_reported() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = provider(&format!("http://{}", addr))
        .fetch_mappings()
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Transport { .. }));
}

#[tokio::test]
async fn fetch_keeps_non_integer_ids() {
    let body = r#"[
        {"origin": "a", "mappingID": 1.5, "active": true},
        {"origin": "a", "mappingID": 18446744073709551615, "active": false},
        {"origin": "b", "mappingID": 1.0, "active": true}
    ]"#;
    let (base, server) = serve_once("200 OK", body).await;

    let mappings = provider(&base).fetch_mappings().await.unwrap();
    server.await.unwrap();

    let rendered: Vec<String> = mappings.iter().map(|m| m.mapping_id.to_string()).collect();
    assert_eq!(rendered, vec!["1.5", "18446744073709551615", "1"]);

    let written = serde_json::to_value(&mappings).unwrap();
    assert_eq!(written, serde_json::from_str::<serde_json::Value>(body).unwrap());
}

#[tokio::test]
async fn put_with_float_id() {
    let (base, server) = serve_once("200 OK", "[]").await;
    let float_id: MappingId = serde_json::from_str("1.5").unwrap();

    provider(&base)
        .set_mapping_active(&float_id, false)
        .await
        .unwrap();

    assert_eq!(
        server.await.unwrap(),
        "PUT /configurations/1.5?active=false HTTP/1.1"
    );
}
