//! Identity contract with the upstream authentication collaborator.
//!
//! Token verification happens outside this service. The gateway injects
//! the verified identity as request headers; this module only parses
//! and exposes it for role/company gating.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ServiceError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const ROLE_HEADER: &str = "x-user-role";
pub const COMPANY_ID_HEADER: &str = "x-company-id";
pub const STORE_ID_HEADER: &str = "x-store-id";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    Secretary,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
            Role::Secretary => "secretary",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            "secretary" => Ok(Role::Secretary),
            other => Err(ServiceError::Unauthenticated(format!(
                "unknown role '{other}'"
            ))),
        }
    }
}

/// Verified identity attached to every request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub role: Role,
    pub company_id: i64,
    pub first_store_id: i64,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_secretary(&self) -> bool {
        self.role == Role::Secretary
    }

    /// Company scoping: admins see across companies, everyone else only
    /// their own.
    pub fn can_access_company(&self, company_id: i64) -> bool {
        self.is_admin() || self.company_id == company_id
    }
}

fn header_value(parts: &Parts, name: &str) -> Result<String, ServiceError> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
        .ok_or_else(|| ServiceError::Unauthenticated(format!("missing {name} header")))
}

fn parse_id(raw: &str, name: &str) -> Result<i64, ServiceError> {
    raw.trim()
        .parse()
        .map_err(|_| ServiceError::Unauthenticated(format!("malformed {name} header")))
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parse_id(&header_value(parts, USER_ID_HEADER)?, USER_ID_HEADER)?;
        let role: Role = header_value(parts, ROLE_HEADER)?.parse()?;
        let company_id = parse_id(&header_value(parts, COMPANY_ID_HEADER)?, COMPANY_ID_HEADER)?;
        let first_store_id = parse_id(&header_value(parts, STORE_ID_HEADER)?, STORE_ID_HEADER)?;

        Ok(AuthenticatedUser {
            id,
            role,
            company_id,
            first_store_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" Secretary ".parse::<Role>().unwrap(), Role::Secretary);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn company_scoping() {
        let admin = AuthenticatedUser {
            id: 1,
            role: Role::Admin,
            company_id: 1,
            first_store_id: 1,
        };
        let user = AuthenticatedUser {
            id: 2,
            role: Role::User,
            company_id: 2,
            first_store_id: 1,
        };
        assert!(admin.can_access_company(9));
        assert!(user.can_access_company(2));
        assert!(!user.can_access_company(3));
    }
}
