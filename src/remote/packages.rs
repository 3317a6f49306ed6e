//! Remote command packages
//!
//! One type per package; each method is "build args, run once, decode".

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

use super::decode::DecodeError;
use super::{CommandError, Package};
use crate::external::Transport;

/// Account role as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Owner,
}

impl Role {
    pub fn is_admin(self) -> bool {
        self != Role::User
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Owner => "owner",
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
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "owner" => Ok(Role::Owner),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Row of `user list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserEntry {
    pub login: String,
    pub role: Role,
}

#[derive(Clone)]
pub struct UserPackage(Package);

impl UserPackage {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self(Package::new("user", transport))
    }

    pub fn create(&self, login: &str, password: &str) -> Result<(), CommandError> {
        self.0.action("create", &[login, password])
    }

    pub fn delete(&self, login: &str) -> Result<(), CommandError> {
        self.0.action("delete", &[login])
    }

    /// Raw `user list` table
    pub fn list(&self) -> Result<Vec<Vec<String>>, CommandError> {
        self.0.table("list", &[])
    }

    /// `user list` typed as (login, role); rows that do not fit are skipped
    pub fn entries(&self) -> Result<Vec<UserEntry>, CommandError> {
        Ok(self
            .list()?
            .into_iter()
            .filter_map(|row| match row.as_slice() {
                [login, role] => match role.parse() {
                    Ok(role) => Some(UserEntry {
                        login: login.clone(),
                        role,
                    }),
                    Err(e) => {
                        warn!(login = %login, error = %e, "Skipping user with unknown role");
                        None
                    }
                },
                _ => {
                    warn!(row = ?row, "Skipping malformed user list row");
                    None
                }
            })
            .collect())
    }

    pub fn passwd(&self, login: &str, password: &str) -> Result<(), CommandError> {
        self.0.action("passwd", &[login, password])
    }
}

#[derive(Clone)]
pub struct RepoPackage(Package);

impl RepoPackage {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self(Package::new("repo", transport))
    }

    pub fn create(&self, repo: &str) -> Result<(), CommandError> {
        self.0.action("create", &[repo])
    }

    pub fn delete(&self, repo: &str) -> Result<(), CommandError> {
        self.0.action("delete", &[repo])
    }

    pub fn list(&self) -> Result<Vec<String>, CommandError> {
        self.0.list("list", &[])
    }
}

#[derive(Clone)]
pub struct AccessPackage(Package);

impl AccessPackage {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self(Package::new("access", transport))
    }

    pub fn allow(&self, login: &str, repo: &str) -> Result<(), CommandError> {
        self.0.action("allow", &[login, repo])
    }

    pub fn deny(&self, login: &str, repo: &str) -> Result<(), CommandError> {
        self.0.action("deny", &[login, repo])
    }

    /// Repositories `login` may access
    pub fn list(&self, login: &str) -> Result<Vec<String>, CommandError> {
        self.0.list("list", &[login])
    }
}

#[derive(Clone)]
pub struct AdminPackage(Package);

impl AdminPackage {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self(Package::new("admin", transport))
    }

    pub fn promote(&self, login: &str) -> Result<(), CommandError> {
        self.0.action("promote", &[login])
    }

    pub fn demote(&self, login: &str) -> Result<(), CommandError> {
        self.0.action("demote", &[login])
    }
}

/// Commands acting on the logged-in account
#[derive(Clone)]
pub struct SelfPackage(Package);

impl SelfPackage {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self(Package::new("self", transport))
    }

    pub fn passwd(&self, password: &str) -> Result<(), CommandError> {
        self.0.action("passwd", &[password])
    }

    pub fn repos(&self) -> Result<Vec<String>, CommandError> {
        self.0.list("repos", &[])
    }

    /// Role of the logged-in account. A role string this client does not
    /// know is a decode failure, not a remote one.
    pub fn role(&self) -> Result<Role, CommandError> {
        let raw = self.0.scalar("role", &[])?;
        raw.parse().map_err(|_| CommandError::Failed {
            command: "self role".to_string(),
            source: DecodeError::UnexpectedValue {
                what: "role",
                value: raw.clone(),
            },
        })
    }
}
