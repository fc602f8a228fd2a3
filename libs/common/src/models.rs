//! Shared data transfer models
//!
//! Types exchanged between services over the internal lookup interface.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload stored against a session token.
///
/// Deliberately minimal: everything else about the account is looked up
/// by id, so stale profile data never lives in the session cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPayload {
    /// Identifier of the account that owns the session
    pub id: i64,
}

/// Public view of an account, safe to return to other services and clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Account identifier
    pub id: i64,
    /// Unique login name
    pub username: String,
    /// Avatar image identifier, if one was uploaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_uuid: Option<Uuid>,
    /// Whether the account is enabled
    pub active: bool,
}
