use serde_json::{Map, Value};

/// Known ways agents wrap the intake record.
#[derive(Debug, Clone, PartialEq)]
pub enum IntakeEnvelope {
    /// `{"payload": {...}}`
    Payload(Value),
    /// `{"data": {...}}`
    Data(Value),
    /// `{"body": "<json string>"}`
    EncodedBody(Value),
    /// `{"body": {...}}`
    Body(Value),
    /// Already the record itself.
    Bare(Value),
}

type Matcher = fn(&Map<String, Value>) -> Option<IntakeEnvelope>;

// Priority order; first match wins.
const MATCHERS: &[Matcher] = &[
    match_payload,
    match_data,
    match_encoded_body,
    match_object_body,
];

impl IntakeEnvelope {
    pub fn classify(root: Value) -> Self {
        let matched = root
            .as_object()
            .and_then(|object| MATCHERS.iter().find_map(|matcher| matcher(object)));
        matched.unwrap_or(IntakeEnvelope::Bare(root))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            IntakeEnvelope::Payload(_) => "payload",
            IntakeEnvelope::Data(_) => "data",
            IntakeEnvelope::EncodedBody(_) => "encoded_body",
            IntakeEnvelope::Body(_) => "body",
            IntakeEnvelope::Bare(_) => "bare",
        }
    }

    pub fn into_record(self) -> Value {
        match self {
            IntakeEnvelope::Payload(inner)
            | IntakeEnvelope::Data(inner)
            | IntakeEnvelope::EncodedBody(inner)
            | IntakeEnvelope::Body(inner)
            | IntakeEnvelope::Bare(inner) => inner,
        }
    }
}

fn nested_object(object: &Map<String, Value>, key: &str) -> Option<Value> {
    object.get(key).filter(|value| value.is_object()).cloned()
}

fn match_payload(object: &Map<String, Value>) -> Option<IntakeEnvelope> {
    nested_object(object, "payload").map(IntakeEnvelope::Payload)
}

fn match_data(object: &Map<String, Value>) -> Option<IntakeEnvelope> {
    nested_object(object, "data").map(IntakeEnvelope::Data)
}

fn match_encoded_body(object: &Map<String, Value>) -> Option<IntakeEnvelope> {
    let raw = object.get("body")?.as_str()?;
    serde_json::from_str::<Value>(raw)
        .ok()
        .filter(Value::is_object)
        .map(IntakeEnvelope::EncodedBody)
}

fn match_object_body(object: &Map<String, Value>) -> Option<IntakeEnvelope> {
    nested_object(object, "body").map(IntakeEnvelope::Body)
}
