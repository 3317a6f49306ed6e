//! External process abstractions
//!
//! Trait-based access to external processes so the remote command layer can
//! be exercised with scripted transports in tests.

pub mod command;
pub mod ssh;

pub use command::{ProcessResult, ProcessTransport, Transport, TransportError};
pub use ssh::{Credentials, SshCommand, SshFlavor, SshTransport, DEFAULT_SSH_PORT};
