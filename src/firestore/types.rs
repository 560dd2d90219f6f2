//! Types for the document store API

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Options controlling how an upsert is applied
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Merge with any existing document instead of replacing it
    pub merge: bool,

    /// Field paths to stamp with the server's commit time
    pub server_timestamps: Vec<String>,
}

impl WriteOptions {
    /// Set whether to merge with an existing document
    pub fn with_merge(mut self, value: bool) -> Self {
        self.merge = value;
        self
    }

    /// Stamp the given field path with the server's commit time
    pub fn with_server_timestamp(mut self, field_path: &str) -> Self {
        self.server_timestamps.push(field_path.to_string());
        self
    }
}

/// A document read back from the store, with fields decoded to plain JSON
#[derive(Debug, Clone)]
pub struct StoredDocument {
    /// Full resource name, `projects/{p}/databases/{d}/documents/{c}/{id}`
    pub name: String,

    /// The document's fields as plain JSON values
    pub fields: Map<String, Value>,

    /// When the document was first created
    pub create_time: Option<String>,

    /// When the document was last written
    pub update_time: Option<String>,
}

impl StoredDocument {
    /// The document id, the last segment of the resource name
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or("")
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CommitRequest {
    pub writes: Vec<WriteOp>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WriteOp {
    pub update: DocumentPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_mask: Option<DocumentMask>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub update_transforms: Vec<FieldTransform>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DocumentPayload {
    pub name: String,
    pub fields: Map<String, Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DocumentMask {
    pub field_paths: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FieldTransform {
    pub field_path: String,
    pub set_to_server_value: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireDocument {
    pub name: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
    pub create_time: Option<String>,
    pub update_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommitResponse {
    pub commit_time: Option<String>,
}
