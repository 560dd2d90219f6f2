//! Configuration options for the Firebase client

use std::env;
use std::time::Duration;

/// Production endpoint for the Identity Toolkit API
pub const DEFAULT_AUTH_ENDPOINT: &str = "https://identitytoolkit.googleapis.com";

/// Production endpoint for the Firestore API
pub const DEFAULT_FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com";

/// Configuration options for the Firebase client
#[derive(Debug, Clone)]
pub struct FirebaseOptions {
    /// Base URL of the Identity Toolkit API
    pub auth_endpoint: String,

    /// Base URL of the Firestore API
    pub firestore_endpoint: String,

    /// The Firestore database id
    pub database_id: String,

    /// The request timeout
    pub request_timeout: Option<Duration>,
}

impl Default for FirebaseOptions {
    fn default() -> Self {
        Self {
            auth_endpoint: DEFAULT_AUTH_ENDPOINT.to_string(),
            firestore_endpoint: DEFAULT_FIRESTORE_ENDPOINT.to_string(),
            database_id: "(default)".to_string(),
            request_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl FirebaseOptions {
    /// Set the Identity Toolkit endpoint
    pub fn with_auth_endpoint(mut self, value: &str) -> Self {
        self.auth_endpoint = value.to_string();
        self
    }

    /// Set the Firestore endpoint
    pub fn with_firestore_endpoint(mut self, value: &str) -> Self {
        self.firestore_endpoint = value.to_string();
        self
    }

    /// Set the Firestore database id
    pub fn with_database_id(mut self, value: &str) -> Self {
        self.database_id = value.to_string();
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }
}

/// Host/port pairs pointing both backends at the local emulator suite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmulatorHosts {
    /// Auth emulator, e.g. `localhost:9099`
    pub auth_host: String,

    /// Firestore emulator, e.g. `localhost:8080`
    pub firestore_host: String,
}

/// Detect the Firebase emulator suite from the environment.
///
/// Returns `Some` when either `FIREBASE_AUTH_EMULATOR_HOST` or
/// `FIRESTORE_EMULATOR_HOST` is set, filling the other from the suite's
/// standard port. Emulator use is all-or-nothing: mixing an emulated backend
/// with a production one would seed half an account.
pub fn emulator_hosts() -> Option<EmulatorHosts> {
    let auth = env::var("FIREBASE_AUTH_EMULATOR_HOST").ok();
    let firestore = env::var("FIRESTORE_EMULATOR_HOST").ok();

    if auth.is_none() && firestore.is_none() {
        return None;
    }

    Some(EmulatorHosts {
        auth_host: auth.unwrap_or_else(|| "localhost:9099".to_string()),
        firestore_host: firestore.unwrap_or_else(|| "localhost:8080".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_point_at_production() {
        let options = FirebaseOptions::default();
        assert_eq!(options.auth_endpoint, DEFAULT_AUTH_ENDPOINT);
        assert_eq!(options.firestore_endpoint, DEFAULT_FIRESTORE_ENDPOINT);
        assert_eq!(options.database_id, "(default)");
        assert_eq!(options.request_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn builders_override_fields() {
        let options = FirebaseOptions::default()
            .with_auth_endpoint("http://localhost:9099")
            .with_firestore_endpoint("http://localhost:8080")
            .with_database_id("staging")
            .with_request_timeout(None);

        assert_eq!(options.auth_endpoint, "http://localhost:9099");
        assert_eq!(options.firestore_endpoint, "http://localhost:8080");
        assert_eq!(options.database_id, "staging");
        assert_eq!(options.request_timeout, None);
    }

    // No other test in this binary touches the emulator variables, so
    // mutating the process environment here does not race.
    #[test]
    fn emulator_detection_fills_missing_host_from_standard_port() {
        env::remove_var("FIREBASE_AUTH_EMULATOR_HOST");
        env::remove_var("FIRESTORE_EMULATOR_HOST");
        assert_eq!(emulator_hosts(), None);

        env::set_var("FIREBASE_AUTH_EMULATOR_HOST", "127.0.0.1:9199");
        let hosts = emulator_hosts().unwrap();
        assert_eq!(hosts.auth_host, "127.0.0.1:9199");
        assert_eq!(hosts.firestore_host, "localhost:8080");

        env::remove_var("FIREBASE_AUTH_EMULATOR_HOST");
    }
}
