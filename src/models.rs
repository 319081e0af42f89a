use crate::intake::ColumnValues;
use crate::relay::Submission;
use serde::Serialize;
use serde_json::Value;
use serde_with::skip_serializing_none;

/// Uniform response envelope for every route.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteResponse {
    pub ok: bool,
    pub message: String,
    pub monday_item_id: Option<String>,
    pub monday_item_name: Option<String>,
    pub item_name: Option<String>,
    pub column_values: Option<ColumnValues>,
    pub status: Option<u16>,
    pub error: Option<String>,
    pub raw: Option<String>,
    pub monday_response: Option<Value>,
}

impl WriteResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn created(submission: Submission) -> Self {
        Self {
            ok: true,
            message: "Item created on monday.com".to_string(),
            monday_item_id: Some(submission.created.id),
            monday_item_name: Some(submission.created.name),
            item_name: Some(submission.item_name),
            column_values: Some(submission.column_values),
            monday_response: Some(submission.created.response),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_raw(mut self, raw: String) -> Self {
        self.raw = Some(raw);
        self
    }

    pub fn with_monday_response(mut self, body: Value) -> Self {
        self.monday_response = Some(body);
        self
    }
}
