use super::*;
use crate::services::api::REGISTRATION_FAILED_MSG;
use mockito::Matcher;
use serde_json::json;
use std::sync::mpsc;
use std::time::Duration;

fn client(base: &str) -> ApiClient {
    ApiClient::new(base, Some(Duration::from_secs(5))).unwrap()
}

fn user() -> User {
    User {
        roll_number: "R1".into(),
        name: "Ann".into(),
    }
}

#[test]
fn create_user_posts_identity_and_reports_server_message() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/create-user")
        .match_body(Matcher::Json(json!({"rollNumber": "R1", "name": "Ann"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"User created successfully"}"#)
        .create();
    let (tx, rx) = mpsc::channel();
    spawn_create_user(client(&server.url()), user(), tx);
    match rx.recv_timeout(Duration::from_secs(10)).unwrap() {
        LoadMsg::UserCreated { user, outcome } => {
            assert_eq!(user.roll_number, "R1");
            assert_eq!(outcome, Ok("User created successfully".to_string()));
        }
        LoadMsg::FormLoaded { .. } => panic!("wrong message"),
    }
    mock.assert();
}

#[test]
fn create_user_failure_without_message_uses_generic_text() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/create-user")
        .with_status(500)
        .with_body("<html>oops</html>")
        .create();
    let (tx, rx) = mpsc::channel();
    spawn_create_user(client(&server.url()), user(), tx);
    match rx.recv_timeout(Duration::from_secs(10)).unwrap() {
        LoadMsg::UserCreated { outcome, .. } => {
            assert_eq!(outcome, Err(REGISTRATION_FAILED_MSG.to_string()));
        }
        LoadMsg::FormLoaded { .. } => panic!("wrong message"),
    }
    mock.assert();
}

#[test]
fn create_user_transport_error_uses_generic_message() {
    let (tx, rx) = mpsc::channel();
    // nothing listens on port 1
    spawn_create_user(client("http://127.0.0.1:1"), user(), tx);
    match rx.recv_timeout(Duration::from_secs(10)).unwrap() {
        LoadMsg::UserCreated { outcome, .. } => {
            assert_eq!(outcome, Err(REGISTRATION_FAILED_MSG.to_string()));
        }
        LoadMsg::FormLoaded { .. } => panic!("wrong message"),
    }
}

#[test]
fn fetch_form_queries_roll_number_and_delivers_schema() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/get-form")
        .match_query(Matcher::UrlEncoded("rollNumber".into(), "R1".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"message":"ok","form":{"formTitle":"T","sections":[{"title":"S","fields":[]}]}}"#,
        )
        .create();
    let (tx, rx) = mpsc::channel();
    spawn_fetch_form(client(&server.url()), "R1".into(), tx);
    match rx.recv_timeout(Duration::from_secs(10)).unwrap() {
        LoadMsg::FormLoaded {
            roll_number,
            outcome,
        } => {
            assert_eq!(roll_number, "R1");
            assert_eq!(outcome.unwrap().form_title, "T");
        }
        LoadMsg::UserCreated { .. } => panic!("wrong message"),
    }
    mock.assert();
}

#[test]
fn fetch_form_non_success_status_is_error() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/get-form")
        .match_query(Matcher::UrlEncoded("rollNumber".into(), "R9".into()))
        .with_status(404)
        .with_body(r#"{"message":"no form"}"#)
        .create();
    let (tx, rx) = mpsc::channel();
    spawn_fetch_form(client(&server.url()), "R9".into(), tx);
    match AppMsg::from(rx.recv_timeout(Duration::from_secs(10)).unwrap()) {
        AppMsg::FormLoaded {
            roll_number,
            outcome,
        } => {
            assert_eq!(roll_number, "R9");
            assert!(outcome.is_err());
        }
        _ => panic!("expected FormLoaded"),
    }
    mock.assert();
}
