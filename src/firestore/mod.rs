//! Client for the Firestore documents API
//!
//! Exposes the two operations the provisioning flow needs: a merge-capable
//! upsert through the `documents:commit` endpoint and a single-document read.
//! Server timestamps are applied as field transforms on the commit, so the
//! stamped paths never appear in the written field mask.

pub mod types;
pub mod value;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::credentials::TokenProvider;
use crate::error::{ApiErrorBody, Error, ErrorKind, Result};

pub use types::{StoredDocument, WriteOptions};
use types::{
    CommitRequest, CommitResponse, DocumentMask, DocumentPayload, FieldTransform, WireDocument,
    WriteOp,
};

const SERVER_TIMESTAMP: &str = "REQUEST_TIME";

/// Document-level operations against a document store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create or update a document, per the given write options
    async fn upsert_document(
        &self,
        collection: &str,
        doc_id: &str,
        fields: Map<String, Value>,
        options: &WriteOptions,
    ) -> Result<()>;

    /// Fetch a single document by collection and id
    async fn get_document(&self, collection: &str, doc_id: &str) -> Result<StoredDocument>;
}

/// Client for the Firestore REST API
pub struct FirestoreClient {
    endpoint: String,
    project_id: String,
    database_id: String,
    tokens: Arc<TokenProvider>,
    http_client: reqwest::Client,
}

impl FirestoreClient {
    /// Create a new document store client
    pub fn new(
        endpoint: &str,
        project_id: &str,
        database_id: &str,
        tokens: Arc<TokenProvider>,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            database_id: database_id.to_string(),
            tokens,
            http_client,
        }
    }

    /// Full resource name of a document
    fn document_name(&self, collection: &str, doc_id: &str) -> String {
        format!(
            "projects/{}/databases/{}/documents/{}/{}",
            self.project_id, self.database_id, collection, doc_id
        )
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn upsert_document(
        &self,
        collection: &str,
        doc_id: &str,
        fields: Map<String, Value>,
        options: &WriteOptions,
    ) -> Result<()> {
        let url = format!(
            "{}/v1/projects/{}/databases/{}/documents:commit",
            self.endpoint, self.project_id, self.database_id
        );
        let token = self.tokens.token().await?;

        // With merge the mask lists exactly the written paths, so fields
        // absent from it survive on the server. Stamped paths are carried
        // by transforms instead of the mask.
        let update_mask = if options.merge {
            Some(DocumentMask {
                field_paths: fields.keys().cloned().collect(),
            })
        } else {
            None
        };
        let update_transforms = options
            .server_timestamps
            .iter()
            .map(|path| FieldTransform {
                field_path: path.clone(),
                set_to_server_value: SERVER_TIMESTAMP,
            })
            .collect();

        let request = CommitRequest {
            writes: vec![WriteOp {
                update: DocumentPayload {
                    name: self.document_name(collection, doc_id),
                    fields: value::encode_fields(&fields)?,
                },
                update_mask,
                update_transforms,
            }],
        };

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            let (kind, message) = classify_error(&error_text, status);
            return Err(Error::document(kind, message));
        }

        let body: CommitResponse = response.json().await?;
        log::debug!(
            "Committed {}/{} at {}",
            collection,
            doc_id,
            body.commit_time.as_deref().unwrap_or("unknown time")
        );
        Ok(())
    }

    async fn get_document(&self, collection: &str, doc_id: &str) -> Result<StoredDocument> {
        let url = format!(
            "{}/v1/{}",
            self.endpoint,
            self.document_name(collection, doc_id)
        );
        let token = self.tokens.token().await?;

        let response = self
            .http_client
            .get(&url)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            let (kind, message) = classify_error(&error_text, status);
            return Err(Error::document(kind, message));
        }

        let body: WireDocument = response.json().await?;
        let fields = value::decode_fields(&body.fields)?;

        Ok(StoredDocument {
            name: body.name,
            fields,
            create_time: body.create_time,
            update_time: body.update_time,
        })
    }
}

/// Map a Firestore error body onto an [`ErrorKind`].
///
/// The envelope carries a gRPC status name in `error.status`; when it is
/// absent or the body is unparsable, the HTTP status decides.
fn classify_error(text: &str, status: reqwest::StatusCode) -> (ErrorKind, String) {
    match serde_json::from_str::<ApiErrorBody>(text) {
        Ok(body) => {
            let kind = match body.error.status.as_deref() {
                Some("NOT_FOUND") => ErrorKind::NotFound,
                Some("ALREADY_EXISTS") => ErrorKind::AlreadyExists,
                Some(_) => ErrorKind::Unknown,
                None => kind_from_http(status),
            };
            (kind, body.error.message)
        }
        Err(_) => (
            kind_from_http(status),
            format!("status {}: {}", status, text),
        ),
    }
}

fn kind_from_http(status: reqwest::StatusCode) -> ErrorKind {
    if status == reqwest::StatusCode::NOT_FOUND {
        ErrorKind::NotFound
    } else if status == reqwest::StatusCode::CONFLICT {
        ErrorKind::AlreadyExists
    } else {
        ErrorKind::Unknown
    }
}
