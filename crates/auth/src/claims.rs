//! JWT claims types

use serde::{Deserialize, Serialize};

/// JWT claims issued by the account service
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID). Older tokens carry it as `id`.
    #[serde(alias = "id")]
    pub sub: String,
    /// Issued at
    #[serde(default)]
    pub iat: Option<u64>,
    /// Expires at
    pub exp: u64,
}
