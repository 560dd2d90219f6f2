//! Super admin provisioning for the GCC application
//!
//! Seeds the super admin account across both Firebase backends: the auth
//! identity and the Firestore user record the application reads roles from.
//! [`Firebase`] holds credentials and endpoints and hands out the two
//! backend clients; [`provision::Provisioner`] drives the one-shot flow on
//! top of them.

pub mod config;
pub mod credentials;
pub mod error;
pub mod firestore;
pub mod identity;
pub mod provision;
pub mod report;

use std::sync::Arc;

use reqwest::Client;
use url::Url;

use crate::config::FirebaseOptions;
use crate::credentials::{Credentials, TokenProvider, EMULATOR_TOKEN};
use crate::error::Result;
use crate::firestore::FirestoreClient;
use crate::identity::IdentityClient;

/// The main entry point for talking to a Firebase project
pub struct Firebase {
    /// The project to provision into
    pub project_id: String,
    /// HTTP client used for requests
    pub http_client: Client,
    /// Client options
    pub options: FirebaseOptions,
    tokens: Arc<TokenProvider>,
}

impl Firebase {
    /// Create a new client with the default endpoints
    ///
    /// # Arguments
    ///
    /// * `project_id` - The Firebase project id
    /// * `credentials` - A service account key, or the emulator suite
    ///
    /// # Example
    ///
    /// ```
    /// use gcc_admin_seed::Firebase;
    /// use gcc_admin_seed::credentials::Credentials;
    ///
    /// let firebase = Firebase::new("demo-project", Credentials::Emulator).unwrap();
    /// ```
    pub fn new(project_id: &str, credentials: Credentials) -> Result<Self> {
        Self::new_with_options(project_id, credentials, FirebaseOptions::default())
    }

    /// Create a new client with custom options
    ///
    /// # Example
    ///
    /// ```
    /// use gcc_admin_seed::Firebase;
    /// use gcc_admin_seed::config::FirebaseOptions;
    /// use gcc_admin_seed::credentials::Credentials;
    ///
    /// let options = FirebaseOptions::default()
    ///     .with_auth_endpoint("http://localhost:9099")
    ///     .with_firestore_endpoint("http://localhost:8080");
    /// let firebase = Firebase::new_with_options("demo-project", Credentials::Emulator, options)
    ///     .unwrap();
    /// ```
    pub fn new_with_options(
        project_id: &str,
        credentials: Credentials,
        options: FirebaseOptions,
    ) -> Result<Self> {
        Url::parse(&options.auth_endpoint)?;
        Url::parse(&options.firestore_endpoint)?;

        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        let tokens = match credentials {
            Credentials::ServiceAccount(key) => {
                TokenProvider::service_account(key, http_client.clone())
            }
            Credentials::Emulator => TokenProvider::fixed(EMULATOR_TOKEN),
        };

        Ok(Self {
            project_id: project_id.to_string(),
            http_client,
            options,
            tokens: Arc::new(tokens),
        })
    }

    /// Create a client for the identity provider
    pub fn identity(&self) -> IdentityClient {
        IdentityClient::new(
            &self.options.auth_endpoint,
            &self.project_id,
            self.tokens.clone(),
            self.http_client.clone(),
        )
    }

    /// Create a client for the document store
    pub fn firestore(&self) -> FirestoreClient {
        FirestoreClient::new(
            &self.options.firestore_endpoint,
            &self.project_id,
            &self.options.database_id,
            self.tokens.clone(),
            self.http_client.clone(),
        )
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::FirebaseOptions;
    pub use crate::credentials::{Credentials, ServiceAccountKey};
    pub use crate::error::{Error, ErrorKind};
    pub use crate::provision::{AdminProfile, Provisioner, Report};
    pub use crate::Firebase;
}
