//! Declarative write-payload assembly.
//!
//! Every store write goes through [`WritePayload`]: each field is declared
//! once together with its normalization rule, so create and upsert handlers
//! share one mechanism instead of per-field ad-hoc cleanup. Partial-update
//! fields are only sent when the caller actually provided them.

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::supabase::SERVER_NOW;

/// How an optional date field treats an empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRule {
    /// Empty string means "not provided"; the field is left out entirely.
    OmitEmpty,
    /// Empty or missing value is stored as an explicit SQL null.
    NullEmpty,
}

#[derive(Debug, Default)]
pub struct WritePayload {
    fields: Map<String, Value>,
}

impl WritePayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field that is always sent.
    pub fn set(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    /// Partial-update field: sent only when the caller provided it.
    pub fn set_opt(mut self, name: &str, value: Option<impl Into<Value>>) -> Self {
        if let Some(value) = value {
            self.fields.insert(name.to_string(), value.into());
        }
        self
    }

    /// Optional date field, normalized per `rule`.
    pub fn set_date_opt(mut self, name: &str, value: Option<String>, rule: DateRule) -> Self {
        let normalized = match (value, rule) {
            (Some(s), _) if !s.is_empty() => Some(Value::String(s)),
            (_, DateRule::NullEmpty) => Some(Value::Null),
            (_, DateRule::OmitEmpty) => None,
        };
        if let Some(value) = normalized {
            self.fields.insert(name.to_string(), value);
        }
        self
    }

    /// Owner key scoping the row to the authenticated caller.
    pub fn owner(self, column: &str, id: Uuid) -> Self {
        self.set(column, id.to_string())
    }

    /// Timestamp column resolved by the store at write time.
    pub fn stamp(self, column: &str) -> Self {
        self.set(column, SERVER_NOW)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}
