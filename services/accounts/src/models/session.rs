//! Session model and related functionality

use common::models::SessionPayload;
use serde::{Deserialize, Serialize};

/// A live session: the opaque token handed to the client and the
/// payload stored against it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub payload: SessionPayload,
}
