//! Remote command layer
//!
//! A [`Package`] binds a package name (`user`, `repo`, ...) to a transport.
//! Each remote sub-command builds `(package, command, args...)`, runs it once
//! and decodes the captured result. Failures come back as [`CommandError`];
//! nothing here retries.

pub mod client;
pub mod decode;
pub mod errors;
pub mod packages;

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info_span, warn};

use crate::external::{ProcessResult, Transport, TransportError};
use crate::telemetry::generate_correlation_id;
use decode::DecodeError;

pub use client::Session;
pub use errors::{parse_error_record, ErrorRecord, RemoteError, RemoteErrorKind};
pub use packages::{AccessPackage, AdminPackage, RepoPackage, Role, SelfPackage, UserEntry, UserPackage};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("`{command}` failed: {source}")]
    Failed {
        command: String,
        #[source]
        source: DecodeError,
    },
}

impl CommandError {
    /// Typed remote failure, if the command reached the host and failed there
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            CommandError::Failed {
                source: DecodeError::Remote(err),
                ..
            } => Some(err),
            _ => None,
        }
    }

    /// Message suitable for showing to a user
    pub fn describe(&self) -> String {
        match self {
            CommandError::Failed {
                source: DecodeError::Remote(err),
                ..
            } => err.describe(),
            other => other.to_string(),
        }
    }
}

/// One remote call, built per invocation and never persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub package: String,
    pub command: String,
    pub args: Vec<String>,
}

impl CommandInvocation {
    pub fn new(package: &str, command: &str, args: &[&str]) -> Self {
        Self {
            package: package.to_string(),
            command: command.to_string(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }

    pub fn label(&self) -> String {
        format!("{} {}", self.package, self.command)
    }

    pub fn to_argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 2);
        argv.push(self.package.clone());
        argv.push(self.command.clone());
        argv.extend(self.args.iter().cloned());
        argv
    }
}

/// Named group of remote sub-commands sharing one transport
#[derive(Clone)]
pub struct Package {
    name: &'static str,
    transport: Arc<dyn Transport>,
}

impl Package {
    pub fn new(name: &'static str, transport: Arc<dyn Transport>) -> Self {
        Self { name, transport }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Runs one sub-command and returns the raw process result
    pub fn invoke(&self, command: &str, args: &[&str]) -> Result<ProcessResult, TransportError> {
        let invocation = CommandInvocation::new(self.name, command, args);
        let correlation_id = generate_correlation_id();
        let span = info_span!(
            "remote_command",
            package = self.name,
            command = command,
            correlation.id = %correlation_id
        );
        let _enter = span.enter();

        match self.transport.run(&invocation.to_argv(), None) {
            Ok(result) => {
                debug!(exit_code = result.exit_code, "Remote command finished");
                Ok(result)
            }
            Err(e) => {
                warn!(error = %e, "Transport failed");
                Err(e)
            }
        }
    }

    fn run<T>(
        &self,
        command: &str,
        args: &[&str],
        decode: impl FnOnce(&ProcessResult) -> Result<T, DecodeError>,
    ) -> Result<T, CommandError> {
        let result = self.invoke(command, args)?;
        decode(&result).map_err(|source| {
            debug!(package = self.name, command, error = %source, "Remote command failed");
            CommandError::Failed {
                command: format!("{} {}", self.name, command),
                source,
            }
        })
    }

    pub fn action(&self, command: &str, args: &[&str]) -> Result<(), CommandError> {
        self.run(command, args, decode::decode_action)
    }

    pub fn scalar(&self, command: &str, args: &[&str]) -> Result<String, CommandError> {
        self.run(command, args, decode::decode_scalar)
    }

    pub fn list(&self, command: &str, args: &[&str]) -> Result<Vec<String>, CommandError> {
        self.run(command, args, decode::decode_list)
    }

    pub fn table(&self, command: &str, args: &[&str]) -> Result<Vec<Vec<String>>, CommandError> {
        self.run(command, args, decode::decode_table)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted transport shared by the remote layer's tests

    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct ScriptedTransport {
        responses: HashMap<String, Result<ProcessResult, TransportError>>,
        pub calls: Mutex<Vec<Vec<String>>>,
    }

    impl ScriptedTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn expect(mut self, args: &[&str], response: Result<ProcessResult, TransportError>) -> Self {
            self.responses.insert(args.join(" "), response);
            self
        }

        pub fn ok(self, args: &[&str], stdout: &str) -> Self {
            self.expect(
                args,
                Ok(ProcessResult {
                    exit_code: 0,
                    stdout: stdout.as_bytes().to_vec(),
                    stderr: Vec::new(),
                }),
            )
        }

        pub fn fail(self, args: &[&str], stderr: &str) -> Self {
            self.expect(
                args,
                Ok(ProcessResult {
                    exit_code: 1,
                    stdout: Vec::new(),
                    stderr: stderr.as_bytes().to_vec(),
                }),
            )
        }
    }

    impl Transport for ScriptedTransport {
        fn run(&self, args: &[String], _input: Option<&[u8]>) -> Result<ProcessResult, TransportError> {
            self.calls.lock().unwrap().push(args.to_vec());
            self.responses
                .get(&args.join(" "))
                .cloned()
                .unwrap_or(Err(TransportError::ProgramNotFound {
                    program: "scripted".to_string(),
                }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedTransport;
    use super::*;

    #[test]
    fn test_invocation_argv_order() {
        let invocation = CommandInvocation::new("access", "allow", &["bob", "docs"]);
        assert_eq!(invocation.to_argv(), vec!["access", "allow", "bob", "docs"]);
        assert_eq!(invocation.label(), "access allow");
    }

    #[test]
    fn test_failed_command_carries_label_and_typed_error() {
        let transport = ScriptedTransport::new().fail(
            &["user", "delete", "ghost"],
            "user delete: User does not exist: login=`ghost`",
        );
        let package = Package::new("user", Arc::new(transport));

        let err = package.action("delete", &["ghost"]).unwrap_err();

        assert_eq!(
            err.remote(),
            Some(&RemoteError::UserNotFound {
                login: "ghost".to_string()
            })
        );
        assert_eq!(
            err.to_string(),
            "`user delete` failed: User does not exist: login=ghost"
        );
        assert_eq!(err.describe(), "User ghost was not found on the server");
    }

    #[test]
    fn test_transport_fault_is_not_a_remote_error() {
        let package = Package::new("repo", Arc::new(ScriptedTransport::new()));

        let err = package.list("list", &[]).unwrap_err();

        assert!(matches!(err, CommandError::Transport(_)));
        assert!(err.remote().is_none());
    }

    #[test]
    fn test_each_call_is_a_single_attempt() {
        let transport = Arc::new(ScriptedTransport::new().fail(&["repo", "create", "x"], "boom"));
        let package = Package::new("repo", transport.clone());

        assert!(package.action("create", &["x"]).is_err());
        assert_eq!(transport.calls.lock().unwrap().len(), 1);
    }
}
