/// Hosted store client (Supabase / PostgREST)
///
/// Inserts one reading per call with
/// `POST {endpoint}/rest/v1/{table}` and the project key in both the
/// `apikey` and `Authorization` headers. The body is a one-element JSON
/// array, which is what PostgREST expects for bulk-capable inserts.
///
/// API Documentation: https://postgrest.org/en/stable/references/api/tables_views.html#insert

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;

use crate::config::StoreConfig;
use crate::gateway::SubmissionGateway;
use crate::logging::{self, Component};
use crate::model::{GatewayError, ReadingRecord};

const REST_PATH: &str = "rest/v1";

/// Error body returned by PostgREST on a rejected request.
#[derive(Debug, Deserialize)]
pub struct PostgrestError {
    pub message: Option<String>,
    pub code: Option<String>,
}

pub struct RestGateway {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
    table: String,
}

impl RestGateway {
    /// Builds a gateway with its own HTTP client.
    ///
    /// No request timeout is configured; the transport's own limits apply.
    pub fn new(endpoint: &str, api_key: &str, table: &str) -> Result<Self, GatewayError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| GatewayError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(RestGateway {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            table: table.to_string(),
        })
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self, GatewayError> {
        let endpoint = config
            .endpoint
            .as_deref()
            .ok_or_else(|| GatewayError::Unexpected("REST backend without endpoint".to_string()))?;
        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| GatewayError::Unexpected("REST backend without api_key".to_string()))?;
        Self::new(endpoint, api_key, &config.table)
    }

    /// Full insert URL for the configured table.
    pub fn insert_url(&self) -> String {
        build_insert_url(&self.endpoint, &self.table)
    }
}

/// Builds `{endpoint}/rest/v1/{table}`, tolerating a trailing slash.
pub fn build_insert_url(endpoint: &str, table: &str) -> String {
    format!("{}/{}/{}", endpoint.trim_end_matches('/'), REST_PATH, table)
}

/// Serializes the insert body: a JSON array holding the one record.
pub fn encode_insert_body(record: &ReadingRecord) -> Result<String, GatewayError> {
    serde_json::to_string(&[record]).map_err(|e| GatewayError::Encode(e.to_string()))
}

/// Extracts a readable message from a rejected response body.
pub fn parse_error_body(body: &str) -> String {
    match serde_json::from_str::<PostgrestError>(body) {
        Ok(PostgrestError { message: Some(message), code, .. }) => match code {
            Some(code) => format!("{} ({})", message, code),
            None => message,
        },
        _ if body.trim().is_empty() => "empty response body".to_string(),
        _ => body.trim().to_string(),
    }
}

impl SubmissionGateway for RestGateway {
    fn insert_reading(&mut self, record: &ReadingRecord) -> Result<(), GatewayError> {
        let url = self.insert_url();
        let body = encode_insert_body(record)?;

        logging::debug(Component::Store, Some(&record.location), &format!("POST {}", url));

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", "return=minimal")
            .body(body)
            .send()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let text = response.text().unwrap_or_default();
        Err(GatewayError::Store {
            status: status.as_u16(),
            message: describe_status(status, &text),
        })
    }

    fn describe(&self) -> String {
        format!("rest:{}", self.table)
    }
}

fn describe_status(status: StatusCode, body: &str) -> String {
    let detail = parse_error_body(body);
    match status.canonical_reason() {
        Some(reason) => format!("{}: {}", reason, detail),
        None => detail,
    }
}
