use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use pretty_assertions::assert_eq;

use bgpsimulator_editor::config::{Announcement, Config, ROA};
use bgpsimulator_editor::roa_client::RoaClient;
use bgpsimulator_editor::settings::EditorSettings;
use bgpsimulator_editor::shared::ROAValidity;

/// Answers `responses.len()` requests in order, then returns the
/// `(request line, body)` of each request it saw.
fn serve(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<(String, String)>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for (status, body) in responses {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut content_length = 0;
            loop {
                let mut header = String::new();
                reader.read_line(&mut header).unwrap();
                let header = header.trim_end();
                if header.is_empty() {
                    break;
                }
                if let Some((name, value)) = header.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
            }
            let mut request_body = vec![0; content_length];
            reader.read_exact(&mut request_body).unwrap();
            seen.push((
                request_line.trim_end().to_string(),
                String::from_utf8(request_body).unwrap(),
            ));

            let mut stream = reader.into_inner();
            write!(
                stream,
                "HTTP/1.1 {} TEST\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            )
            .unwrap();
            stream.flush().unwrap();
        }
        seen
    });

    (base_url, handle)
}

fn client(base_url: &str) -> RoaClient {
    let settings = EditorSettings::new()
        .with_api_base_url(base_url)
        .with_request_timeout_secs(5);
    RoaClient::new(&settings).unwrap()
}

fn roas() -> Vec<ROA> {
    vec![ROA::new("1.2.0.0/16", 777, None)]
}

#[test]
fn test_valid_answer_is_cached() {
    let (base_url, server) = serve(vec![(200, r#""Valid""#)]);
    let client = client(&base_url);
    let ann = Announcement::new("1.2.0.0/16", vec![777], Some(777));

    assert_eq!(client.validate(&ann, &roas()), ROAValidity::Valid);
    // Served from the cache, the server only answers once
    assert_eq!(client.validate(&ann, &roas()), ROAValidity::Valid);

    let seen = server.join().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "POST /api/validate-roa HTTP/1.1");
    let body: serde_json::Value = serde_json::from_str(&seen[0].1).unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "prefix": "1.2.0.0/16",
            "origin": 777,
            "roas": [{"prefix": "1.2.0.0/16", "origin": 777}],
        })
    );
}

#[test]
fn test_labels_are_normalized() {
    let (base_url, server) = serve(vec![
        (200, r#""INVALID_LENGTH""#),
        (200, r#""Invalid Origin""#),
        (200, r#""something new""#),
    ]);
    let client = client(&base_url);

    let results: Vec<ROAValidity> = ["1.2.0.0/24", "1.2.0.0/16", "1.2.3.0/24"]
        .iter()
        .map(|prefix| client.validate(&Announcement::new(prefix, vec![666], None), &roas()))
        .collect();
    assert_eq!(
        results,
        vec![
            ROAValidity::InvalidLength,
            ROAValidity::InvalidOrigin,
            ROAValidity::Unknown
        ]
    );
    server.join().unwrap();
}

#[test]
fn test_server_error_is_unknown() {
    let (base_url, server) = serve(vec![
        (500, "Internal Server Error"),
        (422, r#"{"detail": [{"msg": "bad prefix"}]}"#),
        (200, r#""Valid""#),
    ]);
    let client = client(&base_url);
    let ann = Announcement::new("1.2.0.0/24", vec![666], None);

    assert_eq!(client.validate(&ann, &roas()), ROAValidity::Unknown);
    assert_eq!(client.validate(&ann, &roas()), ROAValidity::Unknown);
    // Failures are not cached
    assert_eq!(client.validate(&ann, &roas()), ROAValidity::Valid);
    assert_eq!(server.join().unwrap().len(), 3);
}

#[test]
fn test_unreachable_server_is_unknown() {
    // Bind then drop to get a local port nobody listens on
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let client = client(&format!("http://127.0.0.1:{}", port));
    let ann = Announcement::new("1.2.0.0/16", vec![777], None);

    assert_eq!(client.validate(&ann, &roas()), ROAValidity::Unknown);
}

#[test]
fn test_local_checks_skip_the_request() {
    // Nothing listens here, so any request would also come back Unknown;
    // these return before a request is built.
    let client = client("http://127.0.0.1:1");

    let no_origin = Announcement::new("1.2.0.0/16", vec![], None);
    assert_eq!(client.validate(&no_origin, &roas()), ROAValidity::Unknown);

    let bad_prefix = Announcement::new("1.2.0.0/33", vec![777], None);
    assert_eq!(client.validate(&bad_prefix, &roas()), ROAValidity::Unknown);
}

#[test]
fn test_config_without_roas() {
    let (base_url, server) = serve(vec![(200, r#""Valid""#)]);
    let client = client(&base_url);

    let mut config = Config::new();
    config.announcements = Some(vec![
        Announcement::new("1.2.0.0/16", vec![777], None),
        Announcement::new("1.2.0.0/24", vec![666], None),
    ]);
    config.roas = None;
    assert_eq!(
        client.validate_config(&config),
        vec![ROAValidity::Unknown, ROAValidity::Unknown]
    );

    // With ROA data each announcement is looked up; the second one finds
    // no server left and degrades
    config.roas = Some(roas());
    assert_eq!(
        client.validate_config(&config),
        vec![ROAValidity::Valid, ROAValidity::Unknown]
    );
    assert_eq!(server.join().unwrap().len(), 1);
}
