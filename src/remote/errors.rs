//! Remote error protocol
//!
//! A failing remote command reports *what* went wrong on stderr using a
//! compact payload:
//!
//! ```text
//! <command-label>: <error-label>: <field>=`<value>` <field2>=`<value2>`
//! ```
//!
//! The error label selects a [`RemoteErrorKind`] from a fixed table, and the
//! backtick-quoted pairs fill that kind's fields. Anything that does not fit
//! this grammar becomes [`RemoteError::Unclassified`] carrying the raw text.
//! Parsing never fails.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Closed set of remote failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteErrorKind {
    InvalidLogin,
    UserNotFound,
    UserExists,
    UserNotAdmin,
    UserIsAdmin,
    InvalidPassword,
    InvalidRepoName,
    RepoNotFound,
    RepoExists,
    RepoAllowed,
    RepoNotAllowed,
    Unclassified,
}

/// Kinds that can be matched from the wire, in table order
pub const CLASSIFIED_KINDS: [RemoteErrorKind; 11] = [
    RemoteErrorKind::InvalidLogin,
    RemoteErrorKind::UserNotFound,
    RemoteErrorKind::UserExists,
    RemoteErrorKind::UserNotAdmin,
    RemoteErrorKind::UserIsAdmin,
    RemoteErrorKind::InvalidPassword,
    RemoteErrorKind::InvalidRepoName,
    RemoteErrorKind::RepoNotFound,
    RemoteErrorKind::RepoExists,
    RemoteErrorKind::RepoAllowed,
    RemoteErrorKind::RepoNotAllowed,
];

impl RemoteErrorKind {
    /// Wire label, also used as the default display title
    pub fn label(self) -> &'static str {
        match self {
            RemoteErrorKind::InvalidLogin => "Invalid login",
            RemoteErrorKind::UserNotFound => "User does not exist",
            RemoteErrorKind::UserExists => "User exists",
            RemoteErrorKind::UserNotAdmin => "Not an admin",
            RemoteErrorKind::UserIsAdmin => "Is admin",
            RemoteErrorKind::InvalidPassword => "Invalid password",
            RemoteErrorKind::InvalidRepoName => "Invalid repo name",
            RemoteErrorKind::RepoNotFound => "Repo does not exist",
            RemoteErrorKind::RepoExists => "Repo exists",
            RemoteErrorKind::RepoAllowed => "Repo is allowed",
            RemoteErrorKind::RepoNotAllowed => "Repo is not allowed",
            RemoteErrorKind::Unclassified => "Unknown error",
        }
    }

    /// Field names in the order the typed error stores them
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            RemoteErrorKind::InvalidLogin
            | RemoteErrorKind::UserNotFound
            | RemoteErrorKind::UserExists
            | RemoteErrorKind::UserNotAdmin
            | RemoteErrorKind::UserIsAdmin => &["login"],
            RemoteErrorKind::InvalidPassword => &["reason"],
            RemoteErrorKind::InvalidRepoName
            | RemoteErrorKind::RepoNotFound
            | RemoteErrorKind::RepoExists => &["repo"],
            RemoteErrorKind::RepoAllowed | RemoteErrorKind::RepoNotAllowed => &["login", "repo"],
            RemoteErrorKind::Unclassified => &["message"],
        }
    }

    /// Looks up a wire label. The fallback kind is never matched.
    pub fn from_label(label: &str) -> Option<Self> {
        CLASSIFIED_KINDS.into_iter().find(|kind| kind.label() == label)
    }
}

/// Parsed, not yet typed, representation of a remote failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    pub kind: RemoteErrorKind,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl ErrorRecord {
    pub fn unclassified(raw: &str) -> Self {
        Self {
            kind: RemoteErrorKind::Unclassified,
            message: raw.to_string(),
            fields: vec![("message".to_string(), raw.to_string())],
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

static PAYLOAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\w+=`[^`]*`(?: \w+=`[^`]*`)*)?$").expect("payload pattern is valid")
});

static FIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)=`([^`]*)`").expect("field pattern is valid"));

/// Parses a stderr payload into an [`ErrorRecord`]
///
/// Degrades to the unclassified fallback (carrying `stderr` unmodified) when
/// the label is unknown, the payload grammar is violated, or the field names
/// do not match what the kind expects.
pub fn parse_error_record(stderr: &str) -> ErrorRecord {
    classify(stderr).unwrap_or_else(|| ErrorRecord::unclassified(stderr))
}

fn classify(stderr: &str) -> Option<ErrorRecord> {
    let parts: Vec<&str> = stderr.splitn(3, ": ").collect();
    let [_command, label, payload] = parts.as_slice() else {
        return None;
    };

    let kind = RemoteErrorKind::from_label(label)?;
    let payload = payload.trim_end();
    if !PAYLOAD_RE.is_match(payload) {
        return None;
    }

    let wire_fields: Vec<(&str, &str)> = FIELD_RE
        .captures_iter(payload)
        .filter_map(|caps| Some((caps.get(1)?.as_str(), caps.get(2)?.as_str())))
        .collect();

    let expected = kind.fields();
    if wire_fields.len() != expected.len() {
        return None;
    }

    let fields = expected
        .iter()
        .map(|name| {
            wire_fields
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| (name.to_string(), value.to_string()))
        })
        .collect::<Option<Vec<_>>>()?;

    Some(ErrorRecord {
        kind,
        message: kind.label().to_string(),
        fields,
    })
}

/// Typed remote failure
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("Invalid login: login={login}")]
    InvalidLogin { login: String },
    #[error("User does not exist: login={login}")]
    UserNotFound { login: String },
    #[error("User exists: login={login}")]
    UserExists { login: String },
    #[error("Not an admin: login={login}")]
    UserNotAdmin { login: String },
    #[error("Is admin: login={login}")]
    UserIsAdmin { login: String },
    #[error("Invalid password: reason={reason}")]
    InvalidPassword { reason: String },
    #[error("Invalid repo name: repo={repo}")]
    InvalidRepoName { repo: String },
    #[error("Repo does not exist: repo={repo}")]
    RepoNotFound { repo: String },
    #[error("Repo exists: repo={repo}")]
    RepoExists { repo: String },
    #[error("Repo is allowed: login={login}, repo={repo}")]
    RepoAllowed { login: String, repo: String },
    #[error("Repo is not allowed: login={login}, repo={repo}")]
    RepoNotAllowed { login: String, repo: String },
    #[error("{message}")]
    Unclassified { message: String },
}

impl RemoteError {
    /// Decodes a failed command's stderr into a typed error
    pub fn from_stderr(stderr: &str) -> Self {
        Self::from_record(parse_error_record(stderr))
    }

    pub fn from_record(record: ErrorRecord) -> Self {
        let value = |name: &str| record.field(name).map(str::to_string);

        let typed = match record.kind {
            RemoteErrorKind::InvalidLogin => value("login").map(|login| RemoteError::InvalidLogin { login }),
            RemoteErrorKind::UserNotFound => value("login").map(|login| RemoteError::UserNotFound { login }),
            RemoteErrorKind::UserExists => value("login").map(|login| RemoteError::UserExists { login }),
            RemoteErrorKind::UserNotAdmin => value("login").map(|login| RemoteError::UserNotAdmin { login }),
            RemoteErrorKind::UserIsAdmin => value("login").map(|login| RemoteError::UserIsAdmin { login }),
            RemoteErrorKind::InvalidPassword => {
                value("reason").map(|reason| RemoteError::InvalidPassword { reason })
            }
            RemoteErrorKind::InvalidRepoName => value("repo").map(|repo| RemoteError::InvalidRepoName { repo }),
            RemoteErrorKind::RepoNotFound => value("repo").map(|repo| RemoteError::RepoNotFound { repo }),
            RemoteErrorKind::RepoExists => value("repo").map(|repo| RemoteError::RepoExists { repo }),
            RemoteErrorKind::RepoAllowed => value("login")
                .zip(value("repo"))
                .map(|(login, repo)| RemoteError::RepoAllowed { login, repo }),
            RemoteErrorKind::RepoNotAllowed => value("login")
                .zip(value("repo"))
                .map(|(login, repo)| RemoteError::RepoNotAllowed { login, repo }),
            RemoteErrorKind::Unclassified => None,
        };

        typed.unwrap_or(RemoteError::Unclassified {
            message: record.message,
        })
    }

    pub fn kind(&self) -> RemoteErrorKind {
        match self {
            RemoteError::InvalidLogin { .. } => RemoteErrorKind::InvalidLogin,
            RemoteError::UserNotFound { .. } => RemoteErrorKind::UserNotFound,
            RemoteError::UserExists { .. } => RemoteErrorKind::UserExists,
            RemoteError::UserNotAdmin { .. } => RemoteErrorKind::UserNotAdmin,
            RemoteError::UserIsAdmin { .. } => RemoteErrorKind::UserIsAdmin,
            RemoteError::InvalidPassword { .. } => RemoteErrorKind::InvalidPassword,
            RemoteError::InvalidRepoName { .. } => RemoteErrorKind::InvalidRepoName,
            RemoteError::RepoNotFound { .. } => RemoteErrorKind::RepoNotFound,
            RemoteError::RepoExists { .. } => RemoteErrorKind::RepoExists,
            RemoteError::RepoAllowed { .. } => RemoteErrorKind::RepoAllowed,
            RemoteError::RepoNotAllowed { .. } => RemoteErrorKind::RepoNotAllowed,
            RemoteError::Unclassified { .. } => RemoteErrorKind::Unclassified,
        }
    }

    /// Short title for the failure, e.g. for a dialog caption
    pub fn title(&self) -> &'static str {
        self.kind().label()
    }

    /// Offending login, when the kind carries one
    pub fn login(&self) -> Option<&str> {
        match self {
            RemoteError::InvalidLogin { login }
            | RemoteError::UserNotFound { login }
            | RemoteError::UserExists { login }
            | RemoteError::UserNotAdmin { login }
            | RemoteError::UserIsAdmin { login }
            | RemoteError::RepoAllowed { login, .. }
            | RemoteError::RepoNotAllowed { login, .. } => Some(login),
            _ => None,
        }
    }

    /// Offending repository, when the kind carries one
    pub fn repo(&self) -> Option<&str> {
        match self {
            RemoteError::InvalidRepoName { repo }
            | RemoteError::RepoNotFound { repo }
            | RemoteError::RepoExists { repo }
            | RemoteError::RepoAllowed { repo, .. }
            | RemoteError::RepoNotAllowed { repo, .. } => Some(repo),
            _ => None,
        }
    }

    /// Human-readable explanation built from the typed fields.
    /// Unclassified failures are shown verbatim.
    pub fn describe(&self) -> String {
        match self {
            RemoteError::InvalidLogin { login } => format!(
                "Login {login} is not valid. Login may consist of latin letters, numbers and characters \"._-\""
            ),
            RemoteError::UserNotFound { login } => format!("User {login} was not found on the server"),
            RemoteError::UserExists { login } => format!("User {login} already exists on the server"),
            RemoteError::UserNotAdmin { login } => format!("User {login} is not an admin"),
            RemoteError::UserIsAdmin { login } => format!("User {login} is an admin"),
            RemoteError::InvalidPassword { reason } => format!("Invalid password: {reason}"),
            RemoteError::InvalidRepoName { repo } => format!(
                "Repository name {repo} is not valid. Repository name may consist of letters, numbers, spaces and symbols \"_.-\""
            ),
            RemoteError::RepoNotFound { repo } => format!("Repository {repo} was not found on the server"),
            RemoteError::RepoExists { repo } => format!("Repository {repo} already exists on the server"),
            RemoteError::RepoAllowed { login, repo } => format!("User {login} already has an access to {repo}"),
            RemoteError::RepoNotAllowed { login, repo } => format!("User {login} does not have an access to {repo}"),
            RemoteError::Unclassified { message } => message.clone(),
        }
    }
}
