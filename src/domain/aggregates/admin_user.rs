//! Back-office accounts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminRole {
    #[default]
    Admin,
    Superadmin,
}

impl AdminRole {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Admin => "ADMIN", Self::Superadmin => "SUPERADMIN" }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s { "ADMIN" => Some(Self::Admin), "SUPERADMIN" => Some(Self::Superadmin), _ => None }
    }
}

#[derive(Clone, Debug)]
pub struct AdminUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub role: AdminRole,
    pub created_at: DateTime<Utc>,
}

/// The part of an account that is safe to hand back to clients.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdminProfile {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: AdminRole,
}

impl From<&AdminUser> for AdminProfile {
    fn from(u: &AdminUser) -> Self {
        Self { id: u.id, email: u.email.clone(), name: u.name.clone(), role: u.role }
    }
}

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}
