//! SSH transport
//!
//! Wraps a [`Transport`] so that every argument vector is executed on the
//! remote host. The platform-specific part (which SSH client, how the
//! password is injected) lives in [`SshCommand`] and is chosen once at
//! startup; everything above this module is platform agnostic.

use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::command::{ProcessResult, ProcessTransport, Transport, TransportError};

pub const DEFAULT_SSH_PORT: u16 = 22;

/// Connection credentials
///
/// Immutable: changing the password produces a new value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub login: String,
    pub password: Option<String>,
    pub host: String,
    pub port: u16,
}

impl Credentials {
    pub fn new(login: impl Into<String>, password: Option<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            login: login.into(),
            password,
            host: host.into(),
            port,
        }
    }

    pub fn with_password(&self, password: impl Into<String>) -> Self {
        Self {
            password: Some(password.into()),
            ..self.clone()
        }
    }

    pub fn without_password(&self) -> Self {
        Self {
            password: None,
            ..self.clone()
        }
    }

    /// `login@host` destination understood by both ssh and plink
    pub fn destination(&self) -> String {
        format!("{}@{}", self.login, self.host)
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            login: String::new(),
            password: None,
            host: String::new(),
            port: DEFAULT_SSH_PORT,
        }
    }
}

// Keeps passwords out of logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

/// Which SSH client family builds the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SshFlavor {
    /// Plink on Windows, OpenSSH everywhere else
    #[default]
    Auto,
    /// `sshpass` + OpenSSH `ssh`
    OpenSsh,
    /// PuTTY `plink`
    Plink,
}

impl SshFlavor {
    pub fn resolve(self) -> Self {
        match self {
            SshFlavor::Auto if cfg!(windows) => SshFlavor::Plink,
            SshFlavor::Auto => SshFlavor::OpenSsh,
            other => other,
        }
    }
}

/// Builds the argument prefix that runs a command on the remote host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshCommand {
    pub flavor: SshFlavor,
    pub sshpass_program: String,
    pub ssh_program: String,
    pub plink_program: String,
}

impl Default for SshCommand {
    fn default() -> Self {
        Self {
            flavor: SshFlavor::Auto.resolve(),
            sshpass_program: "sshpass".to_string(),
            ssh_program: "ssh".to_string(),
            plink_program: "plink".to_string(),
        }
    }
}

impl SshCommand {
    pub fn new(flavor: SshFlavor) -> Self {
        Self {
            flavor: flavor.resolve(),
            ..Self::default()
        }
    }

    pub fn build(&self, credentials: &Credentials) -> Vec<String> {
        let password = credentials.password.clone().unwrap_or_default();
        let port = credentials.port.to_string();

        let mut argv = match self.flavor.resolve() {
            SshFlavor::Plink => vec![
                self.plink_program.clone(),
                "-pw".to_string(),
                password,
                "-ssh".to_string(),
                "-P".to_string(),
                port,
            ],
            _ => vec![
                self.sshpass_program.clone(),
                "-p".to_string(),
                password,
                self.ssh_program.clone(),
                "-q".to_string(),
                "-o".to_string(),
                "StrictHostKeyChecking=no".to_string(),
                "-o".to_string(),
                "UserKnownHostsFile=/dev/null".to_string(),
                "-p".to_string(),
                port,
            ],
        };
        argv.push(credentials.destination());
        argv
    }
}

/// Transport that executes argument vectors on a remote host over SSH
#[derive(Clone)]
pub struct SshTransport {
    command: SshCommand,
    credentials: Credentials,
    inner: Arc<dyn Transport>,
}

impl SshTransport {
    pub fn new(command: SshCommand, credentials: Credentials) -> Self {
        Self::with_transport(command, credentials, Arc::new(ProcessTransport))
    }

    pub fn with_transport(command: SshCommand, credentials: Credentials, inner: Arc<dyn Transport>) -> Self {
        Self {
            command,
            credentials,
            inner,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Same client configuration, different credentials
    pub fn with_credentials(&self, credentials: Credentials) -> Self {
        Self {
            credentials,
            ..self.clone()
        }
    }
}

impl Transport for SshTransport {
    fn run(&self, args: &[String], input: Option<&[u8]>) -> Result<ProcessResult, TransportError> {
        let mut argv = self.command.build(&self.credentials);
        argv.extend_from_slice(args);

        // Positional arguments may carry passwords; only the command is logged
        let remote_command = args.iter().take(2).map(String::as_str).collect::<Vec<_>>().join(" ");
        debug!(
            destination = %self.credentials.destination(),
            port = self.credentials.port,
            remote_command = %remote_command,
            arg_count = args.len(),
            "Running remote command"
        );
        self.inner.run(&argv, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTransport {
        seen: Mutex<Vec<Vec<String>>>,
    }

    impl Transport for RecordingTransport {
        fn run(&self, args: &[String], _input: Option<&[u8]>) -> Result<ProcessResult, TransportError> {
            self.seen.lock().unwrap().push(args.to_vec());
            Ok(ProcessResult::default())
        }
    }

    fn creds() -> Credentials {
        Credentials::new("alice", Some("s3cret".to_string()), "git.example.org", 2222)
    }

    #[test]
    fn test_openssh_prefix() {
        let argv = SshCommand::new(SshFlavor::OpenSsh).build(&creds());
        assert_eq!(
            argv,
            vec![
                "sshpass", "-p", "s3cret", "ssh", "-q", "-o", "StrictHostKeyChecking=no",
                "-o", "UserKnownHostsFile=/dev/null", "-p", "2222", "alice@git.example.org",
            ]
        );
    }

    #[test]
    fn test_plink_prefix() {
        let argv = SshCommand::new(SshFlavor::Plink).build(&creds());
        assert_eq!(
            argv,
            vec!["plink", "-pw", "s3cret", "-ssh", "-P", "2222", "alice@git.example.org"]
        );
    }

    #[test]
    fn test_auto_flavor_resolves_to_concrete_client() {
        assert_ne!(SshFlavor::Auto.resolve(), SshFlavor::Auto);
        assert_eq!(SshFlavor::Plink.resolve(), SshFlavor::Plink);
    }

    #[test]
    fn test_ssh_transport_appends_remote_arguments() {
        let recorder = Arc::new(RecordingTransport::default());
        let transport = SshTransport::with_transport(SshCommand::new(SshFlavor::Plink), creds(), recorder.clone());

        transport
            .run(&["repo".to_string(), "list".to_string()], None)
            .unwrap();

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(&seen[0][seen[0].len() - 2..], &["repo".to_string(), "list".to_string()]);
    }

    #[derive(Clone)]
    struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CaptureWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_passwords_stay_out_of_debug_logs() {
        let writer = CaptureWriter(Arc::new(Mutex::new(Vec::new())));
        let buffer = writer.0.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let recorder = Arc::new(RecordingTransport::default());
        let transport = SshTransport::with_transport(SshCommand::new(SshFlavor::OpenSsh), creds(), recorder);
        let users = crate::remote::UserPackage::new(Arc::new(transport));

        tracing::subscriber::with_default(subscriber, || {
            users.create("bob", "TopSecret42").unwrap();
            users.passwd("bob", "Rotated99").unwrap();
        });

        let logs = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("Running remote command"));
        assert!(logs.contains("user create"));
        assert!(!logs.contains("TopSecret42"));
        assert!(!logs.contains("Rotated99"));
        assert!(!logs.contains("s3cret"));
    }

    #[test]
    fn test_with_password_returns_new_value() {
        let original = creds();
        let changed = original.with_password("n3w");

        assert_eq!(original.password.as_deref(), Some("s3cret"));
        assert_eq!(changed.password.as_deref(), Some("n3w"));
        assert_eq!(changed.login, original.login);
    }

    #[test]
    fn test_debug_redacts_password() {
        let rendered = format!("{:?}", creds());
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("<redacted>"));
    }
}
