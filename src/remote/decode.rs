//! Result decoding
//!
//! Every strategy first passes the process result through [`check`]: a zero
//! exit status lets value extraction proceed, anything else is turned into a
//! typed [`RemoteError`] by the error protocol.

use std::str;
use thiserror::Error;

use super::errors::RemoteError;
use crate::external::ProcessResult;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("output is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] str::Utf8Error),
    /// Successful output the client cannot interpret
    #[error("unexpected {what} `{value}`")]
    UnexpectedValue { what: &'static str, value: String },
}

/// Failure gate shared by all strategies
pub fn check(result: &ProcessResult) -> Result<&ProcessResult, RemoteError> {
    if result.success() {
        Ok(result)
    } else {
        Err(RemoteError::from_stderr(&result.stderr_text()))
    }
}

/// Side-effect only: stdout is discarded
pub fn decode_action(result: &ProcessResult) -> Result<(), DecodeError> {
    check(result)?;
    Ok(())
}

/// Single value with surrounding whitespace removed
pub fn decode_scalar(result: &ProcessResult) -> Result<String, DecodeError> {
    let stdout = str::from_utf8(&check(result)?.stdout)?;
    Ok(stdout.trim().to_string())
}

/// Whitespace separated values; empty output yields an empty list
pub fn decode_list(result: &ProcessResult) -> Result<Vec<String>, DecodeError> {
    let stdout = str::from_utf8(&check(result)?.stdout)?;
    Ok(stdout.split_whitespace().map(String::from).collect())
}

/// One record per line, fields split on whitespace. Blank lines anywhere in
/// the output, interior ones included, are dropped rather than decoded as
/// empty records.
pub fn decode_table(result: &ProcessResult) -> Result<Vec<Vec<String>>, DecodeError> {
    let stdout = str::from_utf8(&check(result)?.stdout)?;
    Ok(stdout
        .lines()
        .map(|line| line.split_whitespace().map(String::from).collect::<Vec<_>>())
        .filter(|fields| !fields.is_empty())
        .collect())
}
