//! Blocking HTTP client for the form backend.
//!
//! Two calls: `POST /create-user` registers the student, `GET /get-form`
//! returns the schema keyed by roll number.

use crate::model::{FormResponse, FormSchema, User};
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://dynamic-form-generator-9rl7.onrender.com";
pub const REGISTRATION_OK_MSG: &str = "User created successfully";
pub const REGISTRATION_FAILED_MSG: &str = "Failed to create user. Please try again.";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(StatusCode),
    #[error("JSON error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("form schema rejected: {0}")]
    Schema(String),
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    /// `timeout` of `None` waits indefinitely.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Register the user. `Ok` carries the server's confirmation text,
    /// `Err` the message to show on the login screen.
    pub fn create_user(&self, user: &User) -> Result<String, String> {
        let url = format!("{}/create-user", self.base_url);
        let resp = match self.http.post(&url).json(user).send() {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "create-user request failed");
                return Err(REGISTRATION_FAILED_MSG.to_string());
            }
        };
        let ok = resp.status().is_success();
        let status = resp.status();
        let body = resp.text().unwrap_or_default();
        tracing::debug!(%status, "create-user response");
        interpret_registration(ok, &body)
    }

    pub fn get_form(&self, roll_number: &str) -> Result<FormSchema, ApiError> {
        let url = format!("{}/get-form", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("rollNumber", roll_number)])
            .send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }
        let body = resp.text()?;
        parse_form_response(&body)
    }
}

/// Map a registration response to the message the user sees.
pub fn interpret_registration(ok: bool, body: &str) -> Result<String, String> {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .filter(|m| !m.trim().is_empty());
    if ok {
        Ok(message.unwrap_or_else(|| REGISTRATION_OK_MSG.to_string()))
    } else {
        Err(message.unwrap_or_else(|| REGISTRATION_FAILED_MSG.to_string()))
    }
}

pub fn parse_form_response(body: &str) -> Result<FormSchema, ApiError> {
    let resp: FormResponse = serde_json::from_str(body)?;
    crate::model::validate_schema(&resp.form).map_err(ApiError::Schema)?;
    Ok(resp.form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_uses_server_message_when_present() {
        assert_eq!(
            interpret_registration(true, r#"{"message":"Welcome back"}"#),
            Ok("Welcome back".to_string())
        );
        assert_eq!(
            interpret_registration(false, r#"{"message":"Roll number taken"}"#),
            Err("Roll number taken".to_string())
        );
    }

    #[test]
    fn registration_falls_back_on_missing_message() {
        assert_eq!(
            interpret_registration(true, ""),
            Ok(REGISTRATION_OK_MSG.to_string())
        );
        assert_eq!(
            interpret_registration(false, "<html>502</html>"),
            Err(REGISTRATION_FAILED_MSG.to_string())
        );
        assert_eq!(
            interpret_registration(false, r#"{"message":"  "}"#),
            Err(REGISTRATION_FAILED_MSG.to_string())
        );
    }

    #[test]
    fn form_response_parses_nested_schema() {
        let body = r#"{
            "message": "Form retrieved",
            "form": {
                "formTitle": "Enrollment",
                "sections": [{
                    "title": "Personal",
                    "fields": [{"fieldId": "n", "type": "text", "label": "Name"}]
                }]
            }
        }"#;
        let schema = parse_form_response(body).unwrap();
        assert_eq!(schema.form_title, "Enrollment");
        assert_eq!(schema.sections[0].fields[0].field_id, "n");
    }

    #[test]
    fn form_response_errors_are_typed() {
        assert!(matches!(
            parse_form_response("not json"),
            Err(ApiError::Decode(_))
        ));
        assert!(matches!(
            parse_form_response(r#"{"form":{"formTitle":"x","sections":[]}}"#),
            Err(ApiError::Schema(_))
        ));
    }

    #[test]
    fn client_trims_trailing_slash() {
        let c = ApiClient::new("http://localhost:9/", None).unwrap();
        assert_eq!(c.base_url(), "http://localhost:9");
    }
}
