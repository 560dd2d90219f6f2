//! One-shot provisioning of the super admin account
//!
//! Converges both backends to a known state: ensures the identity exists
//! with the expected password, merge-writes the user record keyed by the
//! identity's uid, then reads the record back to prove the write landed.
//! Running it repeatedly is safe. Only a duplicate email on creation is
//! recovered; every other backend failure aborts the run.

use serde_json::{json, Map, Value};

use crate::error::{Error, ErrorKind, Result};
use crate::firestore::{DocumentStore, StoredDocument, WriteOptions};
use crate::identity::{Identity, IdentityProvider};

/// Role granting unrestricted access in the application
pub const SUPER_ADMIN_ROLE: &str = "super_admin";

/// Collection the application reads user records from
pub const DEFAULT_COLLECTION: &str = "users";

/// Everything that goes into the admin account
#[derive(Debug, Clone)]
pub struct AdminProfile {
    /// Sign-in email address
    pub email: String,

    /// Sign-in password, also applied to a pre-existing identity
    pub password: String,

    pub first_name: String,
    pub last_name: String,

    /// Display name on the identity and the user record
    pub full_name: String,

    pub department: String,
    pub position: String,
    pub phone_number: String,
}

/// Outcome of a successful provisioning run, read back from the store
#[derive(Debug, Clone)]
pub struct Report {
    /// Uid of the admin identity, also the document id
    pub uid: String,

    pub full_name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub department: String,
    pub position: String,

    /// Whether the identity was created on this run or already existed
    pub created: bool,
}

impl Report {
    fn from_document(
        identity: &Identity,
        document: &StoredDocument,
        profile: &AdminProfile,
        created: bool,
    ) -> Self {
        let fields = &document.fields;
        let text = |key: &str, fallback: &str| -> String {
            fields
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or(fallback)
                .to_string()
        };
        let roles = fields
            .get("roles")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_else(|| vec![SUPER_ADMIN_ROLE.to_string()]);

        Self {
            uid: identity.uid.clone(),
            full_name: text("fullName", &profile.full_name),
            email: text("email", &profile.email),
            roles,
            department: text("department", &profile.department),
            position: text("position", &profile.position),
            created,
        }
    }
}

/// Drives the provisioning flow against an identity provider and a
/// document store
pub struct Provisioner<I, D> {
    identity: I,
    documents: D,
    collection: String,
}

impl<I: IdentityProvider, D: DocumentStore> Provisioner<I, D> {
    /// Create a provisioner writing to the default collection
    pub fn new(identity: I, documents: D) -> Self {
        Self {
            identity,
            documents,
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }

    /// Write the user record to a different collection
    pub fn with_collection(mut self, collection: &str) -> Self {
        self.collection = collection.to_string();
        self
    }

    /// Run the full flow and return the verified account report.
    ///
    /// The identity is resolved first: a fresh creation, or on a duplicate
    /// email a lookup plus password reset so the configured credentials
    /// always win. The user record is then merge-written under the uid.
    /// `lastLogin` is stamped with the commit time on every run; `createdAt`
    /// only when the record does not already carry one, so repeat runs never
    /// rewrite the original creation time.
    pub async fn provision(&self, profile: &AdminProfile) -> Result<Report> {
        let (identity, created) = self.resolve_identity(profile).await?;
        log::debug!(
            "Resolved identity {} for {} (created: {})",
            identity.uid,
            identity.email,
            created
        );

        let existing = match self
            .documents
            .get_document(&self.collection, &identity.uid)
            .await
        {
            Ok(document) => Some(document),
            Err(Error::Document {
                kind: ErrorKind::NotFound,
                ..
            }) => None,
            Err(err) => return Err(err),
        };
        let has_created_at = existing
            .as_ref()
            .map(|document| document.fields.contains_key("createdAt"))
            .unwrap_or(false);

        let mut options = WriteOptions::default().with_merge(true);
        if !has_created_at {
            options = options.with_server_timestamp("createdAt");
        }
        options = options.with_server_timestamp("lastLogin");

        self.documents
            .upsert_document(
                &self.collection,
                &identity.uid,
                self.build_record(&identity, profile),
                &options,
            )
            .await?;

        let stored = self
            .documents
            .get_document(&self.collection, &identity.uid)
            .await
            .map_err(|err| {
                Error::Verification(format!(
                    "could not read back {}/{}: {}",
                    self.collection, identity.uid, err
                ))
            })?;

        let stored_id = stored.fields.get("id").and_then(Value::as_str).unwrap_or("");
        if stored_id != identity.uid {
            return Err(Error::Verification(format!(
                "document {}/{} belongs to {:?}, expected {}",
                self.collection, identity.uid, stored_id, identity.uid
            )));
        }

        Ok(Report::from_document(&identity, &stored, profile, created))
    }

    async fn resolve_identity(&self, profile: &AdminProfile) -> Result<(Identity, bool)> {
        match self
            .identity
            .create_identity(&profile.email, &profile.password, &profile.full_name)
            .await
        {
            Ok(identity) => Ok((identity, true)),
            Err(Error::Identity {
                kind: ErrorKind::AlreadyExists,
                ..
            }) => {
                log::debug!("Identity for {} already exists, converging it", profile.email);
                let identity = self.identity.find_identity_by_email(&profile.email).await?;
                self.identity
                    .update_identity_password(&identity.uid, &profile.password)
                    .await?;
                Ok((identity, false))
            }
            Err(err) => Err(err),
        }
    }

    fn build_record(&self, identity: &Identity, profile: &AdminProfile) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("id".to_string(), json!(identity.uid));
        fields.insert("email".to_string(), json!(profile.email));
        fields.insert("firstName".to_string(), json!(profile.first_name));
        fields.insert("lastName".to_string(), json!(profile.last_name));
        fields.insert("fullName".to_string(), json!(profile.full_name));
        fields.insert("department".to_string(), json!(profile.department));
        fields.insert("position".to_string(), json!(profile.position));
        fields.insert("phoneNumber".to_string(), json!(profile.phone_number));
        fields.insert("roles".to_string(), json!([SUPER_ADMIN_ROLE]));
        fields.insert("isActive".to_string(), json!(true));
        fields.insert("profileImageUrl".to_string(), json!(""));
        fields
    }
}
