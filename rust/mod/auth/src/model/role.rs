use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Account role. Stored and serialized as `Admin` / `Pharmacist`.
/// Signups that name no role become pharmacists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    #[default]
    Pharmacist,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Pharmacist => "Pharmacist",
        }
    }

    /// Landing page after login.
    pub fn dashboard(&self) -> &'static str {
        match self {
            Role::Admin => "/admin",
            Role::Pharmacist => "/pharm",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "pharmacist" => Ok(Role::Pharmacist),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" pharmacist ".parse::<Role>().unwrap(), Role::Pharmacist);
        assert!("nurse".parse::<Role>().is_err());
    }

    #[test]
    fn unnamed_role_is_pharmacist() {
        assert_eq!(Role::default(), Role::Pharmacist);
    }

    #[test]
    fn serializes_as_stored_name() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"Admin\"");
        assert_eq!(Role::Pharmacist.dashboard(), "/pharm");
    }
}
