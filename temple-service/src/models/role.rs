//! Caller roles and the capability object passed into every operation.

use crate::error::TempleError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
    Guest,
}

impl UserRole {
    /// Get string representation for database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
            Self::Guest => "guest",
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = TempleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            "guest" => Ok(Self::Guest),
            other => Err(TempleError::InvalidInput(format!("unknown role '{}'", other))),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who is calling, as resolved from the upstream identity collaborator.
///
/// The core never authenticates; it only checks the role carried here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub principal: Option<String>,
    pub role: UserRole,
}

impl Caller {
    pub fn guest() -> Self {
        Self {
            principal: None,
            role: UserRole::Guest,
        }
    }

    pub fn new(principal: impl Into<String>, role: UserRole) -> Self {
        Self {
            principal: Some(principal.into()),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Fail with `Unauthorized` unless the caller is an admin.
    pub fn require_admin(&self, operation: &str) -> Result<(), TempleError> {
        if self.is_admin() {
            return Ok(());
        }
        tracing::warn!(
            principal = self.principal.as_deref().unwrap_or("-"),
            role = %self.role,
            operation,
            "Rejected non-admin caller"
        );
        Err(TempleError::Unauthorized(format!(
            "{} requires the admin role",
            operation
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_admin_passes_admin_check() {
        assert!(Caller::new("root", UserRole::Admin)
            .require_admin("approvePayment")
            .is_ok());
        assert!(matches!(
            Caller::new("devotee", UserRole::User).require_admin("approvePayment"),
            Err(TempleError::Unauthorized(_))
        ));
        assert!(matches!(
            Caller::guest().require_admin("approvePayment"),
            Err(TempleError::Unauthorized(_))
        ));
    }
}
