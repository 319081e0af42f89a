use crate::http::build_client;
use crate::intake::ColumnValues;
use crate::monday::config::MondayConfig;
use reqwest::{Client, header::CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, warn};

const CREATE_ITEM_MUTATION: &str = "mutation ($boardId: ID!, $itemName: String!, $columnValues: JSON!) { create_item (board_id: $boardId, item_name: $itemName, column_values: $columnValues) { id name column_values { id text } } }";

#[derive(Debug, Error)]
pub enum MondayError {
    #[error("MONDAY_API_KEY is not configured")]
    MissingApiKey,
    #[error("network error contacting monday.com: {0}")]
    Network(String),
    #[error("monday.com returned a non-JSON response (HTTP {status})")]
    Malformed { status: u16, raw: String },
    #[error("monday.com rejected the request (HTTP {status})")]
    Rejected { status: u16, body: Value },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedItem {
    pub id: String,
    pub name: String,
    pub response: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateItemVariables<'a> {
    board_id: &'a str,
    item_name: &'a str,
    column_values: String,
}

#[derive(Debug, Serialize)]
struct GraphqlRequest<'a> {
    query: &'static str,
    variables: CreateItemVariables<'a>,
}

#[derive(Debug, Clone)]
pub struct MondayClient {
    http: Client,
    config: MondayConfig,
}

impl MondayClient {
    pub fn new(config: MondayConfig) -> Self {
        Self {
            http: build_client(),
            config,
        }
    }

    /// One `create_item` call. Never retried.
    pub async fn create_item(
        &self,
        column_values: &ColumnValues,
        item_name: &str,
    ) -> Result<CreatedItem, MondayError> {
        let api_key = self.config.api_key().ok_or(MondayError::MissingApiKey)?;

        let body = GraphqlRequest {
            query: CREATE_ITEM_MUTATION,
            variables: CreateItemVariables {
                board_id: &self.config.board_id,
                item_name,
                column_values: column_values.encode(),
            },
        };

        let started = Instant::now();
        let response = self
            .http
            .post(&self.config.api_url)
            .header("Authorization", api_key)
            .header("API-Version", &self.config.api_version)
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|err| MondayError::Network(err.to_string()))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|err| MondayError::Network(err.to_string()))?;
        crate::metrics::upstream_elapsed("create_item", started.elapsed().as_millis());
        debug!(
            target = "intake.monday",
            status = status.as_u16(),
            bytes = raw.len(),
            "create_item response received"
        );

        classify_response(status.as_u16(), status.is_success(), raw)
    }
}

fn classify_response(status: u16, success: bool, raw: String) -> Result<CreatedItem, MondayError> {
    let Ok(parsed) = serde_json::from_str::<Value>(&raw) else {
        warn!(target = "intake.monday", status, "non-JSON response from monday.com");
        return Err(MondayError::Malformed { status, raw });
    };

    if !success || carries_errors(&parsed) {
        return Err(MondayError::Rejected {
            status,
            body: parsed,
        });
    }

    let id = string_at(&parsed, "/data/create_item/id");
    let name = string_at(&parsed, "/data/create_item/name");
    Ok(CreatedItem {
        id,
        name,
        response: parsed,
    })
}

fn carries_errors(body: &Value) -> bool {
    ["error", "errors"]
        .iter()
        .any(|key| body.get(key).is_some_and(|value| !value.is_null()))
}

fn string_at(body: &Value, pointer: &str) -> String {
    match body.pointer(pointer) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        _ => String::new(),
    }
}
