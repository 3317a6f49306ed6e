//! Logged-in session
//!
//! Bundles credentials, the SSH transport and all command packages. The
//! password-change flow swaps in refined credentials and rebuilds every
//! package on the new transport.

use std::sync::Arc;
use tracing::info;

use super::packages::{AccessPackage, AdminPackage, RepoPackage, Role, SelfPackage, UserPackage};
use super::CommandError;
use crate::external::{Credentials, SshCommand, SshTransport, Transport};

#[derive(Clone)]
pub struct Session {
    transport: SshTransport,
    pub user: UserPackage,
    pub repo: RepoPackage,
    pub access: AccessPackage,
    pub admin: AdminPackage,
    pub account: SelfPackage,
}

impl Session {
    pub fn new(command: SshCommand, credentials: Credentials) -> Self {
        Self::from_transport(SshTransport::new(command, credentials))
    }

    pub fn from_transport(transport: SshTransport) -> Self {
        let shared: Arc<dyn Transport> = Arc::new(transport.clone());
        Self {
            transport,
            user: UserPackage::new(shared.clone()),
            repo: RepoPackage::new(shared.clone()),
            access: AccessPackage::new(shared.clone()),
            admin: AdminPackage::new(shared.clone()),
            account: SelfPackage::new(shared),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        self.transport.credentials()
    }

    /// Verifies the credentials by asking the host for the account role
    pub fn login(&self) -> Result<Role, CommandError> {
        let role = self.account.role()?;
        info!(
            login = %self.credentials().login,
            host = %self.credentials().host,
            role = %role,
            "Logged in"
        );
        Ok(role)
    }

    /// Changes the account password and returns a session using it
    pub fn change_password(&self, password: &str) -> Result<Session, CommandError> {
        self.account.passwd(password)?;
        let credentials = self.credentials().with_password(password);
        info!(login = %credentials.login, "Password changed");
        Ok(Self::from_transport(self.transport.with_credentials(credentials)))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::ScriptedTransport;
    use super::*;
    use crate::external::SshFlavor;

    const PREFIX: [&str; 7] = ["plink", "-pw", "old", "-ssh", "-P", "22", "alice@host"];

    fn scripted(extra: Vec<(Vec<&str>, &str)>) -> Arc<ScriptedTransport> {
        let mut transport = ScriptedTransport::new();
        for (args, stdout) in extra {
            let full: Vec<&str> = PREFIX.iter().copied().chain(args).collect();
            transport = transport.ok(&full, stdout);
        }
        Arc::new(transport)
    }

    fn session(inner: Arc<ScriptedTransport>) -> Session {
        let credentials = Credentials::new("alice", Some("old".to_string()), "host", 22);
        Session::from_transport(SshTransport::with_transport(
            SshCommand::new(SshFlavor::Plink),
            credentials,
            inner,
        ))
    }

    #[test]
    fn test_login_reports_role() {
        let session = session(scripted(vec![(vec!["self", "role"], "owner\n")]));
        assert_eq!(session.login().unwrap(), Role::Owner);
    }

    #[test]
    fn test_change_password_refines_credentials() {
        let inner = scripted(vec![(vec!["self", "passwd", "new"], "")]);
        let original = session(inner.clone());

        let refreshed = original.change_password("new").unwrap();

        assert_eq!(original.credentials().password.as_deref(), Some("old"));
        assert_eq!(refreshed.credentials().password.as_deref(), Some("new"));
        assert_eq!(refreshed.credentials().login, "alice");

        // The next call goes out with the new password
        let _ = refreshed.repo.list();
        let calls = inner.calls.lock().unwrap();
        assert_eq!(calls.last().unwrap()[2], "new");
    }

    #[test]
    fn test_failed_password_change_keeps_nothing() {
        let session = session(scripted(vec![]));
        assert!(session.change_password("new").is_err());
        assert_eq!(session.credentials().password.as_deref(), Some("old"));
    }
}
