//! Integration tests for `RestClient` over `HyperClient` using wiremock.

use std::time::{Duration, Instant};

use assert2::{check, let_assert};
use courier::{ContentType, Form, HyperClient, RestClient};
use serde::{Deserialize, Serialize};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, body_string, header, header_exists, method, path, query_param},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct User {
    id: u64,
    name: String,
}

fn client_for(server: &MockServer) -> RestClient {
    RestClient::new(format!("{}/", server.uri()))
}

#[tokio::test]
async fn test_get_json_response() {
    let mock_server = MockServer::start().await;
    let user = User {
        id: 1,
        name: "Alice".to_string(),
    };

    Mock::given(method("GET"))
        .and(path("/users/1"))
        .and(header("cache-control", "no-cache"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&user))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.get("/users/1").await.expect("response");

    check!(result.ok());
    check!(result.status() == 200);
    check!(result.status_text() == "OK");
    check!(result.json_as::<User>() == Some(user));
    check!(result.form_data().is_none());
}

#[tokio::test]
async fn test_post_json_body_with_standing_configuration() {
    let mock_server = MockServer::start().await;
    let input = User {
        id: 0,
        name: "Bob".to_string(),
    };

    Mock::given(method("POST"))
        .and(path("/users"))
        .and(header("content-type", "application/json"))
        .and(header("authorization", "Bearer s3cret"))
        .and(header("cookie", "session=abc"))
        .and(header("x-client", "tests"))
        .and(body_json(&input))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 42, "name": "Bob"})))
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server);
    client
        .set_content_type(ContentType::Json)
        .set_bearer_auth("s3cret")
        .set_cookie("session", "abc")
        .add_header("X-Client", "tests");

    let result = client
        .post("/users")
        .json(&input)
        .expect("json body")
        .await
        .expect("response");

    check!(result.status() == 201);
    check!(result.json() == Some(&json!({"id": 42, "name": "Bob"})));
}

#[tokio::test]
async fn test_form_body_and_form_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/login"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("user=jane%20doe&pass=p%26ss"))
        .respond_with(ResponseTemplate::new(200).set_body_string("token=abc123&expires=3600"))
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server);
    client.set_content_type(ContentType::FormUrlEncoded);

    let result = client
        .put("/login")
        .body(json!({"user": "jane doe", "pass": "p&ss"}))
        .await
        .expect("response");

    let_assert!(Some(form) = result.form_data());
    check!(form.get("token").map(String::as_str) == Some("abc123"));
    check!(form.get("expires").map(String::as_str) == Some("3600"));
    check!(result.json().is_none());
}

#[tokio::test]
async fn test_one_time_header_overrides_win() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/items/7"))
        .and(header("x-mode", "override"))
        .and(header("content-type", "text/csv"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server);
    client
        .set_content_type(ContentType::Json)
        .add_header("X-Mode", "standing");

    let result = client
        .patch("/items/7")
        .body("a,b\n1,2")
        .header("X-Mode", "override")
        .header("Content-Type", "text/csv")
        .await
        .expect("response");

    check!(result.status() == 204);
    check!(result.text() == Some(""));
}

#[tokio::test]
async fn test_get_query_merging() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "new"))
        .and(query_param("page", "2"))
        .and(query_param("lang", "en"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client
        .get("/search?q=old&page=2")
        .queries([("q", "new"), ("lang", "en")])
        .await
        .expect("response");

    check!(result.ok());
    check!(result.url().query() == Some("q=new&page=2&lang=en"));
}

#[tokio::test]
async fn test_http_error_status_is_not_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/users/999"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such user"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.delete("/users/999").await.expect("response");

    check!(!result.ok());
    check!(result.status() == 404);
    check!(result.status_text() == "Not Found");
    check!(result.text() == Some("no such user"));
}

#[tokio::test]
async fn test_flag_extraction_from_html() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/challenge"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><p>well done: CTF{r3st_1s_fun}</p></html>", "text/html"),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.get("challenge").await.expect("response");

    check!(result.flag("CTF") == "CTF{r3st_1s_fun}");
    check!(result.flag("FLAG") == "");
    check!(result.header("content-type") == Some("text/html"));
    check!(result.json().is_none());
    check!(result.form_data().is_none());
}

#[tokio::test]
async fn test_stream_to_file() {
    let mock_server = MockServer::start().await;
    let payload = vec![0xffu8, 0x00, 0x10, 0x42].repeat(1024);

    Mock::given(method("GET"))
        .and(path("/download"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(payload.clone()))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let destination = dir.path().join("download.bin");

    let client = client_for(&mock_server);
    let result = client
        .get("/download")
        .output(&destination)
        .await
        .expect("response");

    check!(result.ok());
    check!(result.is_streamed());
    check!(result.bytes_written() == Some(payload.len() as u64));
    check!(result.bytes().is_none());
    check!(result.text().is_none());
    check!(result.json().is_none());
    check!(result.form_data().is_none());
    check!(result.flag("FLAG") == "");

    let stored = tokio::fs::read(&destination).await.expect("read back");
    check!(stored == payload);
}

#[tokio::test]
async fn test_stream_to_unwritable_destination_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/download"))
        .respond_with(ResponseTemplate::new(200).set_body_string("data"))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let destination = dir.path().join("no-such-dir").join("file.txt");

    let client = client_for(&mock_server);
    let result = client.get("/download").output(&destination).await;

    let_assert!(Err(err) = result);
    check!(err.is_storage());
}

#[tokio::test]
async fn test_multipart_upload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(header("content-type", "multipart/form-data; boundary=test-boundary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"stored": true})))
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server);
    client.set_content_type(ContentType::Multipart);

    let form = Form::with_boundary("test-boundary").text("name", "report");
    let result = client.post("/upload").body(form).await.expect("response");

    check!(result.json() == Some(&json!({"stored": true})));
    let requests = mock_server.received_requests().await.expect("recording enabled");
    let_assert!([request] = requests.as_slice());
    let body = String::from_utf8_lossy(&request.body);
    check!(body.contains("--test-boundary"));
    check!(body.contains("name=\"name\""));
    check!(body.contains("report"));
}

#[tokio::test]
async fn test_basic_auth_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/private"))
        .and(header("authorization", "Basic dXNlcjpwYXNz"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server);
    client.set_basic_auth("user", "pass");

    let result = client.get("/private").await.expect("response");
    check!(result.ok());
}

#[tokio::test]
async fn test_no_content_type_when_unset() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/plain"))
        .and(header_exists("cache-control"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    client.get("/plain").await.expect("response");

    let requests = mock_server.received_requests().await.expect("recording enabled");
    let_assert!([request] = requests.as_slice());
    check!(!request.headers.contains_key("content-type"));
    check!(!request.headers.contains_key("authorization"));
    check!(!request.headers.contains_key("cookie"));
}

#[tokio::test]
async fn test_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let transport = HyperClient::builder()
        .timeout(Duration::from_millis(100))
        .build();
    let client = RestClient::with_transport(transport, mock_server.uri());

    let result = client.get("/slow").await;

    let err = result.expect_err("expected timeout error");
    assert!(err.is_timeout(), "Expected timeout error, got: {err}");
}

#[tokio::test]
async fn test_connection_error() {
    let client = RestClient::new("http://127.0.0.1:1");

    let result = client.get("/").await;

    let err = result.expect_err("expected connection error");
    assert!(err.is_connection(), "Expected connection error, got: {err}");
}

#[tokio::test]
async fn test_concurrency_limit_alone() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .mount(&mock_server)
        .await;

    let transport = HyperClient::builder().with_concurrency_limit(2).build();
    let client = RestClient::with_transport(transport, mock_server.uri());

    let first = client.get("/ping").await.expect("first");
    let second = client.get("/ping").await.expect("second");

    check!(first.text() == Some("pong"));
    check!(second.text() == Some("pong"));
}

#[tokio::test]
async fn test_concurrency_limit_holds_back_extra_calls() {
    let mock_server = MockServer::start().await;
    let delay = Duration::from_millis(300);

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_body_string("done").set_delay(delay))
        .mount(&mock_server)
        .await;

    let transport = HyperClient::builder()
        .with_debug_logging()
        .with_concurrency_limit(2)
        .build();
    let client = RestClient::with_transport(transport, mock_server.uri());

    let start = Instant::now();
    let (first, second, third) = tokio::join!(
        client.get("/slow").send(),
        client.get("/slow").send(),
        client.get("/slow").send(),
    );
    let elapsed = start.elapsed();

    check!(first.expect("first").text() == Some("done"));
    check!(second.expect("second").text() == Some("done"));
    check!(third.expect("third").text() == Some("done"));
    // The third call only starts once one of the first two has finished.
    check!(elapsed >= delay * 2);
}

#[cfg(feature = "middleware-decompression")]
#[tokio::test]
async fn test_decompression() {
    use std::io::Write;

    let mock_server = MockServer::start().await;

    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(br#"{"flag":"FLAG{gz}"}"#).expect("write");
    let compressed = encoder.finish().expect("finish");

    Mock::given(method("GET"))
        .and(path("/compressed"))
        .and(header_exists("accept-encoding"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Encoding", "gzip")
                .set_body_bytes(compressed),
        )
        .mount(&mock_server)
        .await;

    let transport = HyperClient::builder().with_decompression().build();
    let client = RestClient::with_transport(transport, mock_server.uri());

    let result = client.get("/compressed").await.expect("response");

    check!(result.status() == 200);
    check!(result.json() == Some(&json!({"flag": "FLAG{gz}"})));
    check!(result.flag("FLAG") == "FLAG{gz}");
}
