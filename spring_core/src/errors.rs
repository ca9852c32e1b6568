//! # Error Types
//!
//! The sizing engine degrades to documented defaults instead of failing on a
//! missing reference entry, so [`CalcError`] only covers the edges: rejected
//! inputs, unknown keys under a strict check, malformed reference tables,
//! refused applies and project file operations.
//!
//! Errors serialize as `{"type": ..., "details": {...}}` so the CLI can emit
//! them on its `--json` path.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type CalcResult<T> = Result<T, CalcError>;

#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// Out of range or not finite
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// Blank material, service class or end type key
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Unknown {table} entry: {key}")]
    UnknownReference { table: String, key: String },

    /// Reference document is not valid JSON or breaks a table invariant
    #[error("Invalid reference data in {table}: {reason}")]
    InvalidReferenceData { table: String, reason: String },

    #[error("Design for '{label}' has {alert_count} unconfirmed alert(s)")]
    UnconfirmedAlerts { label: String, alert_count: usize },

    #[error("Could not {operation} '{path}': {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// Another live holder owns the project's `.lock` sidecar
    #[error("Project '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON or TOML (de)serialization
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    #[error("Project schema {file_version} is not supported (expected {expected_version})")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CalcError {
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField { field: field.into() }
    }

    pub fn unknown_reference(table: impl Into<String>, key: impl Into<String>) -> Self {
        CalcError::UnknownReference {
            table: table.into(),
            key: key.into(),
        }
    }

    pub fn invalid_reference(table: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidReferenceData {
            table: table.into(),
            reason: reason.into(),
        }
    }

    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        CalcError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    pub fn serialization(err: impl std::fmt::Display) -> Self {
        CalcError::SerializationError { reason: err.to_string() }
    }

    /// Lock contention clears once the holder releases; nothing else does
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CalcError::FileLocked { .. })
    }

    /// Stable code printed by the CLI
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::UnknownReference { .. } => "UNKNOWN_REFERENCE",
            CalcError::InvalidReferenceData { .. } => "INVALID_REFERENCE_DATA",
            CalcError::UnconfirmedAlerts { .. } => "UNCONFIRMED_ALERTS",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::FileLocked { .. } => "FILE_LOCKED",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}
