pub mod columns;
pub mod envelope;
pub mod fields;
pub mod schema;

pub use columns::{CandidateColumns, ColumnValue, ColumnValues};
pub use envelope::IntakeEnvelope;
pub use schema::{FieldPolicy, IntakeField, IntakeSchema};

use chrono::NaiveDate;
use serde_json::Value;
use std::collections::HashMap;

/// Trimmed text for every recognized field; missing keys read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntakeRecord {
    values: HashMap<IntakeField, String>,
}

impl IntakeRecord {
    pub fn from_value(record: &Value) -> Self {
        let values = IntakeField::ALL
            .iter()
            .map(|field| (*field, fields::coerce_text(record.get(field.key()))))
            .collect();
        Self { values }
    }

    pub fn get(&self, field: IntakeField) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedIntake {
    pub item_name: String,
    pub column_values: ColumnValues,
    pub envelope: &'static str,
}

/// Unwraps, cleans and shapes one inbound payload. Never performs I/O.
pub fn normalize(body: Value, schema: &IntakeSchema, today: NaiveDate) -> NormalizedIntake {
    let envelope = IntakeEnvelope::classify(body);
    let envelope_kind = envelope.kind();
    let record = IntakeRecord::from_value(&envelope.into_record());

    let mut candidates = CandidateColumns::new();
    for rule in &schema.rules {
        let raw = record.get(rule.field);
        let value = apply_policy(&rule.policy, raw, schema, today);
        candidates.insert(rule.column.to_string(), value);
    }
    for constant in &schema.constants {
        candidates.insert(constant.column.to_string(), Some(constant.value.clone()));
    }

    let item_name = fields::derive_title(
        record.get(IntakeField::Name),
        record.get(IntakeField::Issue),
        schema.fallback_title,
    );

    NormalizedIntake {
        item_name,
        column_values: ColumnValues::from_candidates(candidates),
        envelope: envelope_kind,
    }
}

fn apply_policy(
    policy: &FieldPolicy,
    raw: &str,
    schema: &IntakeSchema,
    today: NaiveDate,
) -> Option<ColumnValue> {
    match policy {
        FieldPolicy::Text => Some(ColumnValue::text(raw)),
        FieldPolicy::TextOrDefault(default) if raw.is_empty() => Some(ColumnValue::text(*default)),
        FieldPolicy::TextOrDefault(_) => Some(ColumnValue::text(raw)),
        FieldPolicy::DateOrToday => Some(ColumnValue::text(fields::normalize_date(raw, today))),
        FieldPolicy::Phone => {
            fields::normalize_phone(raw, schema.phone_region).map(|phone| ColumnValue::Phone {
                phone: phone.digits,
                region_hint: phone.region_hint,
            })
        }
        FieldPolicy::Email => Some(ColumnValue::email(raw)),
        FieldPolicy::Categorical { allowed, sentinel } => {
            fields::validate_category(raw, allowed, sentinel).map(ColumnValue::label)
        }
    }
}
