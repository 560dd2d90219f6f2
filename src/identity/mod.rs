//! Client for the Identity Toolkit accounts API
//!
//! Covers the three admin operations the provisioning flow needs: create an
//! account, look one up by email, and reset a password. Failures carry an
//! [`ErrorKind`] tag so callers can tell a duplicate email apart from a
//! genuine fault.

pub mod types;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::credentials::TokenProvider;
use crate::error::{ApiErrorBody, Error, ErrorKind, Result};

pub use types::Identity;
use types::{LookupResponse, SignUpResponse};

/// Admin-level operations against an identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create a new account with a verified email and display name
    async fn create_identity(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Identity>;

    /// Look up the account registered under the given email
    async fn find_identity_by_email(&self, email: &str) -> Result<Identity>;

    /// Set a new password on an existing account
    async fn update_identity_password(&self, uid: &str, password: &str) -> Result<()>;
}

/// Client for the Identity Toolkit REST API
pub struct IdentityClient {
    endpoint: String,
    project_id: String,
    tokens: Arc<TokenProvider>,
    http_client: reqwest::Client,
}

impl IdentityClient {
    /// Create a new identity client
    pub fn new(
        endpoint: &str,
        project_id: &str,
        tokens: Arc<TokenProvider>,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            tokens,
            http_client,
        }
    }

    fn accounts_url(&self, action: &str) -> String {
        format!(
            "{}/v1/projects/{}/accounts{}",
            self.endpoint, self.project_id, action
        )
    }
}

#[async_trait]
impl IdentityProvider for IdentityClient {
    async fn create_identity(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Identity> {
        let url = self.accounts_url("");
        let token = self.tokens.token().await?;

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .json(&json!({
                "email": email,
                "password": password,
                "displayName": display_name,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            let (kind, message) = classify_error(&error_text, status);
            return Err(Error::identity(kind, message));
        }

        let body: SignUpResponse = response.json().await?;
        log::debug!("Created identity {} for {}", body.local_id, email);

        Ok(Identity {
            uid: body.local_id,
            email: body.email.unwrap_or_else(|| email.to_string()),
            display_name: body.display_name.unwrap_or_else(|| display_name.to_string()),
        })
    }

    async fn find_identity_by_email(&self, email: &str) -> Result<Identity> {
        let url = self.accounts_url(":lookup");
        let token = self.tokens.token().await?;

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .json(&json!({ "email": [email] }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            let (kind, message) = classify_error(&error_text, status);
            return Err(Error::identity(kind, message));
        }

        let body: LookupResponse = response.json().await?;
        let account = body
            .users
            .and_then(|mut users| {
                if users.is_empty() {
                    None
                } else {
                    Some(users.remove(0))
                }
            })
            .ok_or_else(|| {
                Error::identity(
                    ErrorKind::NotFound,
                    format!("no identity registered for {}", email),
                )
            })?;

        log::debug!("Found identity {} for {}", account.local_id, email);

        Ok(Identity {
            uid: account.local_id,
            email: account.email.unwrap_or_else(|| email.to_string()),
            display_name: account.display_name.unwrap_or_default(),
        })
    }

    async fn update_identity_password(&self, uid: &str, password: &str) -> Result<()> {
        let url = self.accounts_url(":update");
        let token = self.tokens.token().await?;

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .json(&json!({ "localId": uid, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            let (kind, message) = classify_error(&error_text, status);
            return Err(Error::identity(kind, message));
        }

        log::debug!("Updated password for identity {}", uid);
        Ok(())
    }
}

/// Map an Identity Toolkit error body onto an [`ErrorKind`].
///
/// The API reports failures as an upper-snake code, optionally followed by
/// detail after a colon (`EMAIL_EXISTS : The email address is already in
/// use`). Only the leading code is significant. Unparsable bodies keep the
/// raw text and classify as unknown.
fn classify_error(text: &str, status: reqwest::StatusCode) -> (ErrorKind, String) {
    match serde_json::from_str::<ApiErrorBody>(text) {
        Ok(body) => {
            let message = body.error.message;
            let kind = match message.split_whitespace().next().unwrap_or("") {
                "EMAIL_EXISTS" | "DUPLICATE_LOCAL_ID" => ErrorKind::AlreadyExists,
                "USER_NOT_FOUND" | "EMAIL_NOT_FOUND" => ErrorKind::NotFound,
                _ => ErrorKind::Unknown,
            };
            (kind, message)
        }
        Err(_) => (
            ErrorKind::Unknown,
            format!("status {}: {}", status, text),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(body: &str) -> (ErrorKind, String) {
        classify_error(body, reqwest::StatusCode::BAD_REQUEST)
    }

    #[test]
    fn duplicate_email_classifies_as_already_exists() {
        let (kind, message) =
            classify(r#"{"error": {"code": 400, "message": "EMAIL_EXISTS"}}"#);
        assert_eq!(kind, ErrorKind::AlreadyExists);
        assert_eq!(message, "EMAIL_EXISTS");
    }

    #[test]
    fn detail_after_the_code_does_not_change_classification() {
        let (kind, _) = classify(
            r#"{"error": {"code": 400, "message": "EMAIL_EXISTS : The email address is already in use by another account."}}"#,
        );
        assert_eq!(kind, ErrorKind::AlreadyExists);

        let (kind, _) = classify(
            r#"{"error": {"code": 400, "message": "USER_NOT_FOUND : There is no user record."}}"#,
        );
        assert_eq!(kind, ErrorKind::NotFound);
    }

    #[test]
    fn unrecognized_codes_classify_as_unknown() {
        let (kind, message) =
            classify(r#"{"error": {"code": 403, "message": "PERMISSION_DENIED"}}"#);
        assert_eq!(kind, ErrorKind::Unknown);
        assert_eq!(message, "PERMISSION_DENIED");
    }

    #[test]
    fn unparsable_bodies_keep_the_raw_text() {
        let (kind, message) = classify("upstream proxy error");
        assert_eq!(kind, ErrorKind::Unknown);
        assert!(message.contains("upstream proxy error"));
        assert!(message.contains("400"));
    }
}
