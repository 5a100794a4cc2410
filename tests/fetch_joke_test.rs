use dadjoke::utils::error::RequestBuildError;
use dadjoke::{fetch_joke, JokeError, JokeFetcher};
use httpmock::prelude::*;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::time::Duration;

const TOMATO_JOKE: &str = "Why did the tomato turn red? Because it saw the salad dressing!";

#[tokio::test]
async fn test_fetch_returns_joke_text() {
    let server = MockServer::start_async().await;
    let joke_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/")
                .header("Accept", "application/json");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({ "joke": TOMATO_JOKE }));
        })
        .await;

    let joke = fetch_joke(&server.url("/")).await.unwrap();

    assert_eq!(joke, TOMATO_JOKE);
    joke_mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_ignores_extra_fields() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "id": "R7UfaahVfFd",
                    "joke": TOMATO_JOKE,
                    "status": 200
                }));
        })
        .await;

    let joke = fetch_joke(&server.url("/")).await.unwrap();
    assert_eq!(joke, TOMATO_JOKE);
}

#[tokio::test]
async fn test_empty_joke_is_not_an_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200)
                .header("Content-Type", "application/json")
                .body(r#"{"joke":""}"#);
        })
        .await;

    let joke = fetch_joke(&server.url("/")).await.unwrap();
    assert_eq!(joke, "");
}

#[tokio::test]
async fn test_non_json_body_is_decode_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200).body("oops");
        })
        .await;

    let err = fetch_joke(&server.url("/")).await.unwrap_err();

    assert!(matches!(err, JokeError::Decode(_)));
    assert!(err.to_string().contains("decoding"));
}

#[tokio::test]
async fn test_missing_joke_field_is_decode_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(404)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({ "message": "not found" }));
        })
        .await;

    let err = fetch_joke(&server.url("/")).await.unwrap_err();
    assert!(matches!(err, JokeError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_address_is_transport_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let err = fetch_joke(&format!("http://127.0.0.1:{}/", port))
        .await
        .unwrap_err();

    assert!(matches!(err, JokeError::Transport(_)));
    assert!(err.to_string().contains("getting response"));
}

#[tokio::test]
async fn test_malformed_address_is_request_construction_error() {
    let err = fetch_joke("not a url").await.unwrap_err();

    assert!(matches!(err, JokeError::RequestConstruction(_)));
    assert!(err.to_string().contains("creating request"));
}

#[tokio::test]
async fn test_control_characters_never_reach_the_server() {
    let server = MockServer::start_async().await;
    let joke_mock = server
        .mock_async(|when, then| {
            when.method(GET);
            then.status(200)
                .json_body(serde_json::json!({ "joke": TOMATO_JOKE }));
        })
        .await;

    let base = server.base_url();
    let urls = [
        format!("{}/\n", base),
        format!("{}/\t", base),
        format!("{}/\x07", base),
        format!("ht\ntp://127.0.0.1:{}/", server.port()),
    ];

    for url in &urls {
        let err = fetch_joke(url).await.unwrap_err();

        assert!(
            matches!(
                err,
                JokeError::RequestConstruction(RequestBuildError::ControlCharacter(_))
            ),
            "unexpected result for {:?}: {:?}",
            url,
            err
        );
        assert!(err.to_string().contains("creating request"));
    }

    joke_mock.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_truncated_body_is_body_read_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let server = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        // Promise more body than is sent, then hang up.
        stream
            .write_all(
                b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\n{\"joke\":",
            )
            .unwrap();
    });

    let err = fetch_joke(&format!("http://{}/", addr)).await.unwrap_err();
    server.join().unwrap();

    assert!(matches!(err, JokeError::BodyRead(_)));
    assert!(err.to_string().contains("reading response body"));
}

#[tokio::test]
async fn test_slow_server_hits_timeout() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200)
                .delay(Duration::from_secs(2))
                .json_body(serde_json::json!({ "joke": TOMATO_JOKE }));
        })
        .await;

    let fetcher =
        JokeFetcher::with_settings(Some(Duration::from_millis(200)), "dadjoke-test").unwrap();
    let err = fetcher.fetch(&server.url("/")).await.unwrap_err();

    match err {
        JokeError::Transport(cause) => assert!(cause.is_timeout()),
        other => panic!("expected transport timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_user_agent_is_sent() {
    let server = MockServer::start_async().await;
    let joke_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/").header("User-Agent", "dadjoke-test");
            then.status(200)
                .json_body(serde_json::json!({ "joke": TOMATO_JOKE }));
        })
        .await;

    let fetcher = JokeFetcher::with_settings(None, "dadjoke-test").unwrap();
    assert_eq!(fetcher.fetch(&server.url("/")).await.unwrap(), TOMATO_JOKE);
    joke_mock.assert_async().await;
}

#[tokio::test]
async fn test_repeated_calls_release_every_response() {
    let server = MockServer::start_async().await;
    let ok_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/ok");
            then.status(200)
                .json_body(serde_json::json!({ "joke": TOMATO_JOKE }));
        })
        .await;
    let bad_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/bad");
            then.status(200).body("oops");
        })
        .await;

    // A single client with a small pool would stall if a response were
    // held open after the call returned.
    let fetcher = JokeFetcher::new(
        reqwest::Client::builder()
            .pool_max_idle_per_host(1)
            .build()
            .unwrap(),
    );

    for _ in 0..20 {
        assert_eq!(fetcher.fetch(&server.url("/ok")).await.unwrap(), TOMATO_JOKE);
        assert!(fetcher.fetch(&server.url("/bad")).await.is_err());
    }

    ok_mock.assert_hits_async(20).await;
    bad_mock.assert_hits_async(20).await;
}
