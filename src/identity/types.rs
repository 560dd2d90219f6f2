//! Types for the identity provider API

use serde::Deserialize;

/// An account in the identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Server-assigned unique id (the `localId` on the wire)
    pub uid: String,

    /// The sign-in email address
    pub email: String,

    /// Human-readable display name
    pub display_name: String,
}

/// Response payload of the account creation endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignUpResponse {
    pub local_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// Response payload of the account lookup endpoint
#[derive(Debug, Deserialize)]
pub(crate) struct LookupResponse {
    pub users: Option<Vec<AccountInfo>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AccountInfo {
    pub local_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}
