use serde::{Deserialize, Serialize};

use super::Role;

/// Extended account data kept next to the identity provider's user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub email: String,
    /// Pharmacy license number; only kept for pharmacists.
    #[serde(default)]
    pub license: Option<String>,
    pub role: Role,
}

/// Signup form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignUp {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}
