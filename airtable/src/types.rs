//! Request and response schemas of the record store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Field values of a todo record
///
/// The store omits empty cells, so every field is optional on the wire.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordFields {
    /// Todo title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Completion flag
    #[serde(
        default,
        rename = "isCompleted",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_completed: Option<bool>,
}

/// A stored record
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    /// Store-assigned id
    pub id: String,
    /// Field values
    #[serde(default)]
    pub fields: RecordFields,
    /// When the store created the record
    #[serde(
        default,
        rename = "createdTime",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_time: Option<DateTime<Utc>>,
}

/// Partial field update; absent fields are left untouched by the store
pub type FieldsPatch = RecordFields;

/// Body of a list response
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct ListResponse {
    pub records: Vec<Record>,
    /// Cursor for the next page, present while more records remain
    #[serde(default)]
    pub offset: Option<String>,
}

/// Body of create/update responses
///
/// Batch endpoints answer with the `{"records":[...]}` envelope, while the
/// per-record endpoint answers with the bare record.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RecordsResponse {
    Batch { records: Vec<Record> },
    Single(Record),
}

impl RecordsResponse {
    /// The first record the response carries
    pub fn into_first(self) -> Option<Record> {
        match self {
            Self::Batch { records } => records.into_iter().next(),
            Self::Single(record) => Some(record),
        }
    }
}

/// A record in a create request (no id yet)
#[derive(Clone, Debug, Serialize)]
pub(crate) struct NewRecord {
    pub fields: RecordFields,
}

/// A record in an update request
#[derive(Clone, Debug, Serialize)]
pub(crate) struct RecordUpdate {
    pub id: String,
    pub fields: FieldsPatch,
}

/// `{"records":[...]}` request envelope
#[derive(Clone, Debug, Serialize)]
pub(crate) struct RecordsRequest<T> {
    pub records: Vec<T>,
}

/// Error payloads: `{"error":{"type":..,"message":..}}` or `{"error":"TYPE"}`
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ErrorBody {
    Detailed {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        message: Option<String>,
    },
    Code(String),
}

impl ErrorBody {
    /// Human-readable message
    pub fn into_message(self) -> String {
        match self {
            Self::Detailed {
                message: Some(message),
                ..
            } => message,
            Self::Detailed { kind, message: None } | Self::Code(kind) => kind,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn record_without_optional_fields() {
        let record: Record = serde_json::from_str(r#"{"id":"rec1","fields":{}}"#).unwrap();
        assert_eq!(record.id, "rec1");
        assert_eq!(record.fields, RecordFields::default());
        assert!(record.created_time.is_none());
    }

    #[test]
    fn record_with_all_fields() {
        let record: Record = serde_json::from_str(
            r#"{"id":"rec2","createdTime":"2025-03-04T05:06:07.000Z","fields":{"title":"Buy milk","isCompleted":true,"notes":"ignored"}}"#,
        )
        .unwrap();
        assert_eq!(record.fields.title.as_deref(), Some("Buy milk"));
        assert_eq!(record.fields.is_completed, Some(true));
        assert_eq!(
            record.created_time.unwrap().to_rfc3339(),
            "2025-03-04T05:06:07+00:00"
        );
    }

    #[test]
    fn patch_omits_absent_fields() {
        let patch = FieldsPatch {
            is_completed: Some(true),
            ..FieldsPatch::default()
        };
        assert_eq!(
            serde_json::to_string(&patch).unwrap(),
            r#"{"isCompleted":true}"#
        );
    }

    #[test]
    fn mutation_response_shapes() {
        let batch: RecordsResponse =
            serde_json::from_str(r#"{"records":[{"id":"rec3","fields":{"title":"a"}}]}"#).unwrap();
        assert_eq!(batch.into_first().unwrap().id, "rec3");

        let single: RecordsResponse =
            serde_json::from_str(r#"{"id":"rec4","fields":{"isCompleted":true}}"#).unwrap();
        assert_eq!(single.into_first().unwrap().fields.is_completed, Some(true));

        let empty: RecordsResponse = serde_json::from_str(r#"{"records":[]}"#).unwrap();
        assert!(empty.into_first().is_none());
        assert!(serde_json::from_str::<RecordsResponse>(r#"{"fields":{}}"#).is_err());
    }

    #[test]
    fn error_payload_shapes() {
        let detailed: ErrorEnvelope = serde_json::from_str(
            r#"{"error":{"type":"INVALID_VALUE","message":"Field title cannot be empty"}}"#,
        )
        .unwrap();
        assert_eq!(detailed.error.into_message(), "Field title cannot be empty");

        let code: ErrorEnvelope = serde_json::from_str(r#"{"error":"NOT_FOUND"}"#).unwrap();
        assert_eq!(code.error.into_message(), "NOT_FOUND");
    }
}
