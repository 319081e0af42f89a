use serde::{Serialize, Serializer};
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// Value shapes accepted by the board's column types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnValue {
    Text(String),
    Label { label: String },
    Phone { phone: String, region_hint: String },
    Email { email: String, text: String },
}

impl ColumnValue {
    pub fn text(value: impl Into<String>) -> Self {
        ColumnValue::Text(value.into())
    }

    pub fn label(value: impl Into<String>) -> Self {
        ColumnValue::Label {
            label: value.into(),
        }
    }

    pub fn email(value: impl Into<String>) -> Self {
        let email = value.into();
        ColumnValue::Email {
            text: email.clone(),
            email,
        }
    }

    /// Wire shape expected by the board API.
    pub fn to_json(&self) -> Value {
        match self {
            ColumnValue::Text(value) => Value::String(value.clone()),
            ColumnValue::Label { label } => json!({ "label": label }),
            ColumnValue::Phone { phone, region_hint } => {
                json!({ "phone": phone, "countryShortName": region_hint })
            }
            ColumnValue::Email { email, text } => json!({ "email": email, "text": text }),
        }
    }

    /// Empty scalars are treated like missing keys upstream.
    pub fn is_empty(&self) -> bool {
        match self {
            ColumnValue::Text(value) => value.is_empty(),
            ColumnValue::Label { label } => label.is_empty(),
            ColumnValue::Phone { phone, .. } => phone.is_empty(),
            ColumnValue::Email { email, .. } => email.is_empty(),
        }
    }
}

impl Serialize for ColumnValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Column id to candidate value, before elision.
pub type CandidateColumns = BTreeMap<String, Option<ColumnValue>>;

/// Cleaned column map: no absent or empty entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ColumnValues(BTreeMap<String, ColumnValue>);

impl ColumnValues {
    /// Final elision pass over the assembled candidates.
    pub fn from_candidates(candidates: CandidateColumns) -> Self {
        let cleaned = candidates
            .into_iter()
            .filter_map(|(column, value)| match value {
                Some(value) if !value.is_empty() => Some((column, value)),
                _ => None,
            })
            .collect();
        Self(cleaned)
    }

    #[cfg(test)]
    pub fn get(&self, column: &str) -> Option<&ColumnValue> {
        self.0.get(column)
    }

    #[cfg(test)]
    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn column_ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// The upstream takes column values as a JSON-encoded string, not an object.
    pub fn encode(&self) -> String {
        let object = self
            .0
            .iter()
            .map(|(column, value)| (column.clone(), value.to_json()))
            .collect();
        Value::Object(object).to_string()
    }
}

impl From<ColumnValues> for CandidateColumns {
    fn from(values: ColumnValues) -> Self {
        values
            .0
            .into_iter()
            .map(|(column, value)| (column, Some(value)))
            .collect()
    }
}
