//! Base process execution abstraction
//!
//! Provides the foundational trait for running external processes, enabling
//! dependency injection for testing. A non-zero exit status is an ordinary
//! outcome here; only failures to run the process at all are errors.

use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;
use thiserror::Error;
use tracing::debug;

/// Fully captured result of one process run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessResult {
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stderr as text, replacing invalid UTF-8 sequences
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Transport unavailable: `{program}` was not found")]
    ProgramNotFound { program: String },
    #[error("Transport unavailable: failed to run `{program}`: {message}")]
    SpawnFailed { program: String, message: String },
    #[error("Transport unavailable: empty argument vector")]
    EmptyCommand,
}

/// Trait for running external processes
///
/// Implementations spawn exactly one process per call and block until it
/// exits. Stdout and stderr are captured completely before returning.
pub trait Transport: Send + Sync {
    fn run(&self, args: &[String], input: Option<&[u8]>) -> Result<ProcessResult, TransportError>;
}

/// Real implementation using std::process::Command
///
/// The first element of the argument vector is the program to execute.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessTransport;

impl Transport for ProcessTransport {
    fn run(&self, args: &[String], input: Option<&[u8]>) -> Result<ProcessResult, TransportError> {
        let (program, rest) = args.split_first().ok_or(TransportError::EmptyCommand)?;

        let spawn_error = |e: std::io::Error| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TransportError::ProgramNotFound {
                    program: program.clone(),
                }
            } else {
                TransportError::SpawnFailed {
                    program: program.clone(),
                    message: e.to_string(),
                }
            }
        };

        let mut child = Command::new(program)
            .args(rest)
            .stdin(if input.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        // Input is written from its own thread while the output pipes drain
        let stdin = child.stdin.take();
        let output = thread::scope(|scope| {
            if let (Some(bytes), Some(mut stdin)) = (input, stdin) {
                scope.spawn(move || {
                    if let Err(e) = stdin.write_all(bytes) {
                        // The child may exit before reading everything; its exit
                        // status still tells the caller what happened.
                        debug!(program = %program, error = %e, "Failed to write process input");
                    }
                });
            }
            child.wait_with_output()
        })
        .map_err(spawn_error)?;

        Ok(ProcessResult {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
