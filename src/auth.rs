use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Account role as issued by the session layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Owner,
    User,
}

impl Role {
    /// Convert from the session layer's string form
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "owner" => Ok(Role::Owner),
            "user" => Ok(Role::User),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "Owner",
            Role::User => "User",
        }
    }
}

/// Authenticated caller, supplied by the identity collaborator.
///
/// The identity is trusted as given. Ownership of slots, requests and
/// payments is still checked against stored account ids on every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub account_id: i64,
    pub role: Role,
}

impl Caller {
    pub fn owner(account_id: i64) -> Self {
        Self {
            account_id,
            role: Role::Owner,
        }
    }

    pub fn user(account_id: i64) -> Self {
        Self {
            account_id,
            role: Role::User,
        }
    }

    /// Reject callers whose session role does not permit the operation
    pub fn require(&self, role: Role, action: &str) -> AppResult<()> {
        if self.role != role {
            return Err(AppError::Forbidden(format!(
                "{} access required to {}",
                role.as_str().to_lowercase(),
                action
            )));
        }
        Ok(())
    }
}
