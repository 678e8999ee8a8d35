//! Record Trait and Partial-Update Merging
//!
//! Every collection member (tags, partners, categories, clients, tasks) is a
//! plain serde struct implementing [`Record`]. Payloads that arrive from the
//! outside world are loose JSON objects: creation payloads carry no id, and
//! updates carry only the fields that change. Both are resolved here by
//! overlaying the payload onto the record's JSON form and deserializing the
//! result back into the typed record, which is also where structural
//! validation happens.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Validation errors for record payloads
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Payload must be a JSON object, got: {0}")]
    NotAnObject(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Record id is immutable: expected '{expected}', got '{actual}'")]
    IdMismatch { expected: String, actual: String },

    #[error("Duplicate {kind} id: {id}")]
    DuplicateId { kind: EntityKind, id: String },

    #[error("Invalid {kind} record: {reason}")]
    InvalidRecord { kind: EntityKind, reason: String },

    #[error("Unknown {kind} id: {id}")]
    UnknownReference { kind: EntityKind, id: String },
}

impl ValidationError {
    /// Create an invalid record error
    pub fn invalid_record(kind: EntityKind, reason: impl fmt::Display) -> Self {
        Self::InvalidRecord {
            kind,
            reason: reason.to_string(),
        }
    }
}

/// The entity kinds held by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Tag,
    Partner,
    Category,
    Client,
    Task,
}

impl EntityKind {
    /// Name used for single-record endpoints and request body keys
    pub fn singular(&self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Partner => "partner",
            Self::Category => "category",
            Self::Client => "client",
            Self::Task => "task",
        }
    }

    /// Name used for list endpoints
    pub fn plural(&self) -> &'static str {
        match self {
            Self::Tag => "tags",
            Self::Partner => "partners",
            Self::Category => "categories",
            Self::Client => "clients",
            Self::Task => "tasks",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.singular())
    }
}

/// A record stored in one of the entity collections
///
/// The id is assigned server-side and never changes afterwards.
pub trait Record: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Which collection this record lives in
    const KIND: EntityKind;

    /// The record's identifier
    fn id(&self) -> &str;

    /// Build a record from a creation payload, assigning `id`
    ///
    /// Any `id` present in the payload is overwritten. Fields missing from
    /// the payload take their serde defaults.
    fn from_payload(payload: Value, id: &str) -> Result<Self, ValidationError> {
        let mut object = into_object(payload)?;
        object.insert("id".to_string(), Value::String(id.to_string()));

        serde_json::from_value(Value::Object(object))
            .map_err(|e| ValidationError::invalid_record(Self::KIND, e))
    }

    /// Shallow-merge `partial` over this record
    ///
    /// Top-level keys present in `partial` replace the record's values; every
    /// other field is preserved. Nested values (relation lists, for example)
    /// are replaced wholesale, never merged element-wise.
    ///
    /// # Errors
    ///
    /// - `NotAnObject` if `partial` is not a JSON object
    /// - `IdMismatch` if `partial` tries to change the id
    /// - `InvalidRecord` if the merged result is not a valid record
    fn merged_with(&self, partial: Value) -> Result<Self, ValidationError> {
        let patch = into_object(partial)?;

        if let Some(candidate) = patch.get("id") {
            if candidate.as_str() != Some(self.id()) {
                return Err(ValidationError::IdMismatch {
                    expected: self.id().to_string(),
                    actual: candidate.to_string(),
                });
            }
        }

        let mut current = match serde_json::to_value(self) {
            Ok(Value::Object(object)) => object,
            Ok(other) => return Err(ValidationError::NotAnObject(other.to_string())),
            Err(e) => return Err(ValidationError::invalid_record(Self::KIND, e)),
        };

        for (key, value) in patch {
            current.insert(key, value);
        }

        serde_json::from_value(Value::Object(current))
            .map_err(|e| ValidationError::invalid_record(Self::KIND, e))
    }
}

fn into_object(payload: Value) -> Result<Map<String, Value>, ValidationError> {
    match payload {
        Value::Object(object) => Ok(object),
        other => Err(ValidationError::NotAnObject(other.to_string())),
    }
}
