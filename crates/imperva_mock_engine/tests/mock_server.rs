use std::io::{Read, Write};
use std::net::TcpStream;

use imperva_mock_engine::{MockImpervaServer, ServerConfig, encode_domain_ref};
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde_json::Value;

fn post_form(client: &Client, server: &MockImpervaServer, path: &str, form: &[(&str, &str)]) -> Value {
    let response = client
        .post(format!("{}{}", server.url(), path))
        .form(form)
        .send()
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    response.json().unwrap()
}

fn csp_url(server: &MockImpervaServer, site_id: i64, suffix: &str) -> String {
    format!("{}/csp-api/v1/sites/{}{}", server.url(), site_id, suffix)
}

fn json(response: Response) -> Value {
    response.json().unwrap()
}

#[test]
fn test_account_lifecycle_over_http() {
    let server = MockImpervaServer::start().unwrap();
    let client = Client::new();

    let added = post_form(&client, &server, "/accounts/add", &[("email", "test@example.com")]);
    assert_eq!(added["res"], 0);
    assert_eq!(added["account"]["email"], "test@example.com");
    let account_id = added["account"]["account_id"].as_i64().unwrap();
    assert!(account_id >= 1000);
    assert!(server.get_account(account_id).is_some());

    let id = account_id.to_string();
    let deleted = post_form(&client, &server, "/accounts/delete", &[("account_id", id.as_str())]);
    assert_eq!(deleted["res"], 0);

    let status = post_form(&client, &server, "/account", &[("account_id", id.as_str())]);
    assert_eq!(status["res"], 9413);
    assert!(server.get_account(account_id).is_none());

    server.close();
}

#[test]
fn test_site_lifecycle_over_http() {
    let server = MockImpervaServer::start().unwrap();
    let client = Client::new();

    let first = post_form(&client, &server, "/sites/add", &[("domain", "a.example.com")]);
    let second = post_form(&client, &server, "/sites/add", &[("domain", "b.example.com")]);
    let first_id = first["site_id"].as_i64().unwrap();
    let second_id = second["site_id"].as_i64().unwrap();
    assert!(first_id >= 10000);
    assert!(second_id > first_id);
    assert_eq!(first["status"], "pending");
    assert_eq!(first["dns"].as_array().unwrap().len(), 2);
    assert_eq!(server.site_count(), 2);

    let id = first_id.to_string();
    let configured = post_form(
        &client,
        &server,
        "/sites/configure",
        &[("site_id", id.as_str()), ("param", "domain"), ("value", "c.example.com")],
    );
    assert_eq!(configured["res"], 0);
    assert_eq!(server.get_site(first_id).unwrap().domain, "c.example.com");

    let deleted = post_form(&client, &server, "/sites/delete", &[("site_id", id.as_str())]);
    assert_eq!(deleted["res"], 0);
    let status = post_form(&client, &server, "/sites/status", &[("site_id", id.as_str())]);
    assert_eq!(status["res"], 9413);
}

#[test]
fn test_csp_domain_over_http() {
    let server = MockImpervaServer::start().unwrap();
    let client = Client::new();
    let reference = encode_domain_ref("example.com");

    let added = client
        .post(csp_url(&server, 123, "/preapprovedlist"))
        .body(r#"{"domain":"example.com","subdomains":true}"#)
        .send()
        .unwrap();
    assert_eq!(added.status(), StatusCode::CREATED);

    let fetched = client
        .get(csp_url(&server, 123, &format!("/preapprovedlist/{}", reference)))
        .send()
        .unwrap();
    assert_eq!(fetched.status(), StatusCode::OK);
    let fetched = json(fetched);
    assert_eq!(fetched["domain"], "example.com");
    assert_eq!(fetched["subdomains"], true);
    assert_eq!(fetched["domainReference"], reference.as_str());

    let listed = json(client.get(csp_url(&server, 123, "/preapprovedlist")).send().unwrap());
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert!(server.get_csp_domain(123, "example.com").is_some());

    let deleted = client
        .delete(csp_url(&server, 123, &format!("/preapprovedlist/{}", reference)))
        .send()
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let missing = client
        .get(csp_url(&server, 123, &format!("/preapprovedlist/{}", reference)))
        .send()
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(json(missing)["code"], 404);
}

#[test]
fn test_csp_status_merge_over_http() {
    let server = MockImpervaServer::start().unwrap();
    let client = Client::new();
    let status_url = csp_url(
        &server,
        123,
        &format!("/domains/{}/status", encode_domain_ref("example.com")),
    );

    for body in [r#"{"blocked":true}"#, r#"{"reviewed":true}"#] {
        let response = client.put(&status_url).body(body).send().unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let status = json(client.get(&status_url).send().unwrap());
    assert_eq!(status["blocked"], true);
    assert_eq!(status["reviewed"], true);
    assert_eq!(status["forceChange"], false);
}

#[test]
fn test_csp_notes_over_http() {
    let server = MockImpervaServer::start().unwrap();
    let client = Client::new();
    let notes_url = csp_url(
        &server,
        5,
        &format!("/domains/{}/notes", encode_domain_ref("cdn.example.com")),
    );

    let missing = client.post(&notes_url).body("hello").send().unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    client
        .post(csp_url(&server, 5, "/preapprovedlist"))
        .body(r#"{"domain":"cdn.example.com"}"#)
        .send()
        .unwrap();

    let added = client.post(&notes_url).body("hello").send().unwrap();
    assert_eq!(added.status(), StatusCode::CREATED);
    let notes = json(added);
    assert_eq!(notes[0]["text"], "hello");
    assert_eq!(notes[0]["author"], "mock-user@example.com");

    for _ in 0..2 {
        let cleared = client.delete(&notes_url).send().unwrap();
        assert_eq!(cleared.status(), StatusCode::NO_CONTENT);
    }
    let listed = json(client.get(&notes_url).send().unwrap());
    assert_eq!(listed, Value::Array(Vec::new()));
}

#[test]
fn test_bad_domain_reference_is_400() {
    let server = MockImpervaServer::start().unwrap();
    let response = Client::new()
        .get(csp_url(&server, 1, "/preapprovedlist/not*base64"))
        .send()
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json(response)["code"], 400);
}

#[test]
fn test_unknown_endpoint_is_9999_with_http_200() {
    let server = MockImpervaServer::start().unwrap();
    let response = Client::new()
        .get(format!("{}/unknown/endpoint", server.url()))
        .send()
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response);
    assert_eq!(body["res"], 9999);
    assert_eq!(body["res_message"], "Endpoint not implemented: GET /unknown/endpoint");
}

#[test]
fn test_unknown_method_is_9999_with_http_200() {
    let server = MockImpervaServer::start().unwrap();
    let mut stream = TcpStream::connect(("127.0.0.1", server.port())).unwrap();
    stream
        .write_all(b"TRACE /accounts/add HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();

    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.contains(r#""res":9999"#), "{response}");
    assert!(
        response.contains("Endpoint not implemented: TRACE /accounts/add"),
        "{response}"
    );
}

#[test]
fn test_reset_restarts_ids() {
    let server = MockImpervaServer::start().unwrap();
    let client = Client::new();

    post_form(&client, &server, "/accounts/add", &[("email", "a@example.com")]);
    post_form(&client, &server, "/accounts/add", &[("email", "b@example.com")]);
    assert_eq!(server.account_count(), 2);

    server.reset();
    assert_eq!(server.account_count(), 0);

    let added = post_form(&client, &server, "/accounts/add", &[("email", "c@example.com")]);
    assert_eq!(added["account"]["account_id"], 1000);
}

#[test]
fn test_servers_are_isolated() {
    let first = MockImpervaServer::start().unwrap();
    let second = MockImpervaServer::start_with_config(&ServerConfig::default()).unwrap();
    assert_ne!(first.port(), second.port());

    post_form(&Client::new(), &first, "/accounts/add", &[("email", "a@example.com")]);
    assert_eq!(first.account_count(), 1);
    assert_eq!(second.account_count(), 0);
}

#[test]
fn test_concurrent_clients_get_unique_ids() {
    let server = MockImpervaServer::start().unwrap();
    let url = format!("{}/accounts/add", server.url());

    let threads: Vec<_> = (0..4)
        .map(|_| {
            let url = url.clone();
            std::thread::spawn(move || {
                let client = Client::new();
                (0..10)
                    .map(|_| {
                        let body: Value = client
                            .post(&url)
                            .form(&[("email", "t@example.com")])
                            .send()
                            .unwrap()
                            .json()
                            .unwrap();
                        body["account_id"].as_i64().unwrap()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids: Vec<i64> = threads.into_iter().flat_map(|t| t.join().unwrap()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 40);
    assert_eq!(server.account_count(), 40);
}
