// gitkeeper - administer a git host over SSH
// This exposes the core components for the binary, tests and integration

pub mod cli;
pub mod config;
pub mod external;
pub mod git;
pub mod remote;
pub mod store;
pub mod telemetry;

// Re-export key types for easy access
pub use config::{Settings, SettingsError};
pub use external::{Credentials, ProcessResult, ProcessTransport, SshCommand, SshFlavor, SshTransport, Transport, TransportError};
pub use remote::{CommandError, ErrorRecord, RemoteError, RemoteErrorKind, Role, Session};
pub use store::{ConfigDocument, ConfigStore, RepositoryRecord};
pub use telemetry::{generate_correlation_id, init_telemetry};
