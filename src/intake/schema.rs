use crate::intake::columns::ColumnValue;

/// Inbound keys the normalizer recognizes. Anything else in the payload is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntakeField {
    Name,
    DateTime,
    Phone,
    CallerId,
    Email,
    Issue,
    Division,
    ZoomGuid,
}

impl IntakeField {
    pub const ALL: [IntakeField; 8] = [
        IntakeField::Name,
        IntakeField::DateTime,
        IntakeField::Phone,
        IntakeField::CallerId,
        IntakeField::Email,
        IntakeField::Issue,
        IntakeField::Division,
        IntakeField::ZoomGuid,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            IntakeField::Name => "name",
            IntakeField::DateTime => "dateTime",
            IntakeField::Phone => "phone",
            IntakeField::CallerId => "callerId",
            IntakeField::Email => "email",
            IntakeField::Issue => "issue",
            IntakeField::Division => "division",
            IntakeField::ZoomGuid => "zoomGuid",
        }
    }
}

/// How a field is cleaned before it lands in its column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPolicy {
    /// Sent as-is; empty values are elided.
    Text,
    /// Empty values are replaced with the given default.
    TextOrDefault(&'static str),
    /// Fast-path or parsed to `YYYY-MM-DD`; falls back to today.
    DateOrToday,
    /// Digits only; values too short to dial are dropped.
    Phone,
    Email,
    /// Exact match against `allowed`, otherwise `sentinel`. Empty stays absent.
    Categorical {
        allowed: &'static [&'static str],
        sentinel: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct FieldRule {
    pub field: IntakeField,
    pub column: &'static str,
    pub policy: FieldPolicy,
}

#[derive(Debug, Clone)]
pub struct ConstantColumn {
    pub column: &'static str,
    pub value: ColumnValue,
}

/// Column table and per-field policies for the intake board.
#[derive(Debug, Clone)]
pub struct IntakeSchema {
    pub rules: Vec<FieldRule>,
    pub constants: Vec<ConstantColumn>,
    pub fallback_title: &'static str,
    pub phone_region: &'static str,
}

pub const DIVISIONS: &[&str] = &["Arizona", "California", "Colorado", "Nevada", "Texas", "Utah"];
pub const DIVISION_SENTINEL: &str = "Other";
pub const DEFAULT_CALLER_NAME: &str = "Unknown caller";
pub const FALLBACK_TITLE: &str = "New call intake";
pub const DEPARTMENT_LABEL: &str = "Customer Service";
pub const DEPARTMENT_EMAIL: &str = "customerservice@intake-desk.com";

pub mod column_ids {
    pub const NAME: &str = "text_mkxk3y1a";
    pub const DATE: &str = "date_mkxk9q0c";
    pub const PHONE: &str = "phone_mkxkb7vz";
    pub const CALLER_ID: &str = "phone_mkxkr2n4";
    pub const EMAIL: &str = "email_mkxkd5tw";
    pub const ISSUE: &str = "text_mkxkp8sj";
    pub const DIVISION: &str = "color_mkxk6h3e";
    pub const ZOOM_GUID: &str = "text_mkxkz0gm";
    pub const DEPARTMENT: &str = "color_mkxkw4ua";
    pub const DEPARTMENT_EMAIL: &str = "email_mkxkq1fd";
}

impl Default for IntakeSchema {
    fn default() -> Self {
        let rules = vec![
            FieldRule {
                field: IntakeField::Name,
                column: column_ids::NAME,
                policy: FieldPolicy::TextOrDefault(DEFAULT_CALLER_NAME),
            },
            FieldRule {
                field: IntakeField::DateTime,
                column: column_ids::DATE,
                policy: FieldPolicy::DateOrToday,
            },
            FieldRule {
                field: IntakeField::Phone,
                column: column_ids::PHONE,
                policy: FieldPolicy::Phone,
            },
            FieldRule {
                field: IntakeField::CallerId,
                column: column_ids::CALLER_ID,
                policy: FieldPolicy::Phone,
            },
            FieldRule {
                field: IntakeField::Email,
                column: column_ids::EMAIL,
                policy: FieldPolicy::Email,
            },
            FieldRule {
                field: IntakeField::Issue,
                column: column_ids::ISSUE,
                policy: FieldPolicy::Text,
            },
            FieldRule {
                field: IntakeField::Division,
                column: column_ids::DIVISION,
                policy: FieldPolicy::Categorical {
                    allowed: DIVISIONS,
                    sentinel: DIVISION_SENTINEL,
                },
            },
            FieldRule {
                field: IntakeField::ZoomGuid,
                column: column_ids::ZOOM_GUID,
                policy: FieldPolicy::Text,
            },
        ];
        let constants = vec![
            ConstantColumn {
                column: column_ids::DEPARTMENT,
                value: ColumnValue::label(DEPARTMENT_LABEL),
            },
            ConstantColumn {
                column: column_ids::DEPARTMENT_EMAIL,
                value: ColumnValue::email(DEPARTMENT_EMAIL),
            },
        ];
        Self {
            rules,
            constants,
            fallback_title: FALLBACK_TITLE,
            phone_region: "US",
        }
    }
}
