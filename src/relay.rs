use crate::intake::{self, ColumnValues, IntakeSchema};
use crate::monday::{CreatedItem, MondayClient, MondayError};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

/// Normalizes an intake payload and writes it to the board.
#[derive(Clone)]
pub struct Relay {
    schema: Arc<IntakeSchema>,
    monday: Arc<MondayClient>,
}

#[derive(Debug, Clone)]
pub struct Submission {
    pub item_name: String,
    pub column_values: ColumnValues,
    pub created: CreatedItem,
}

impl Relay {
    pub fn new(schema: IntakeSchema, monday: MondayClient) -> Self {
        Self {
            schema: Arc::new(schema),
            monday: Arc::new(monday),
        }
    }

    pub async fn submit(&self, body: Value) -> Result<Submission, MondayError> {
        let request_id = Uuid::new_v4();
        let span = info_span!(target: "intake.relay", "submission", %request_id);
        self.submit_inner(body).instrument(span).await
    }

    async fn submit_inner(&self, body: Value) -> Result<Submission, MondayError> {
        let normalized = intake::normalize(body, &self.schema, Utc::now().date_naive());
        let columns: Vec<&str> = normalized.column_values.column_ids().collect();
        info!(
            target = "intake.relay",
            envelope = normalized.envelope,
            item_name = %normalized.item_name,
            column_count = normalized.column_values.len(),
            columns = ?columns,
            "intake normalized"
        );

        match self
            .monday
            .create_item(&normalized.column_values, &normalized.item_name)
            .await
        {
            Ok(created) => {
                info!(target = "intake.relay", item_id = %created.id, "board item created");
                Ok(Submission {
                    item_name: normalized.item_name,
                    column_values: normalized.column_values,
                    created,
                })
            }
            Err(err) => {
                match &err {
                    MondayError::MissingApiKey => {
                        error!(target = "intake.relay", error = %err, "write not attempted")
                    }
                    MondayError::Network(_) => {
                        error!(target = "intake.relay", error = %err, "board write failed")
                    }
                    MondayError::Malformed { .. } | MondayError::Rejected { .. } => {
                        warn!(target = "intake.relay", error = %err, "board write failed")
                    }
                }
                Err(err)
            }
        }
    }
}
