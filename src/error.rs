//! Error types for ivylock operations

use crate::path::ParameterPath;
use thiserror::Error;

/// A required input is absent or does not parse for its declared type.
///
/// These are user-input gaps: callers surface them as "not ready" and the
/// user fixes them by editing inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Missing input: {0}")]
    Missing(ParameterPath),

    #[error("Malformed input {path}: {reason}")]
    Malformed { path: ParameterPath, reason: String },

    #[error("Input {0} cannot be decoded as a program argument")]
    Undecodable(ParameterPath),

    #[error("Contract is not ready, invalid parameters: {}", join_paths(.0))]
    NotReady(Vec<ParameterPath>),

    #[error("Inputs name undeclared parameter slots: {}", join_paths(.0))]
    Undeclared(Vec<ParameterPath>),
}

/// An input that must exist by construction is missing or broken.
///
/// Seeing one of these means a defect upstream, not a user mistake.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsistencyError {
    #[error("Referenced input {0} is missing")]
    MissingInput(ParameterPath),

    #[error("Referenced input {path} is malformed: {reason}")]
    MalformedInput { path: ParameterPath, reason: String },

    #[error("Address input {0} has no computed control program")]
    MissingComputedProgram(ParameterPath),

    #[error("Public key choice {0} has no key map")]
    MissingKeyMap(ParameterPath),

    #[error("Public key choice {path} selects unknown key {key}")]
    UnknownKey { path: ParameterPath, key: String },

    #[error("Clause index {index} out of range for {count} clauses")]
    ClauseOutOfRange { index: usize, count: usize },
}

/// Errors raised by the instantiation primitive
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstantiateError {
    #[error("Template has a compilation error: {0}")]
    Uncompiled(String),

    #[error("Template has an empty program")]
    EmptyProgram,

    #[error("Template expects {expected} arguments, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("Push of {0} bytes exceeds the maximum push size")]
    PushTooLarge(usize),
}

/// A structural problem reported while compiling template source
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct CompilationFault(pub String);

/// Errors that can occur while creating a contract instance
#[derive(Debug, Error)]
pub enum ContractError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("Failed to instantiate control program: {0}")]
    Instantiate(#[from] InstantiateError),

    #[error(transparent)]
    Consistency(#[from] ConsistencyError),
}

/// Errors that can occur during spending operations
///
/// `Input` means the spender has not finished filling in the clause;
/// `Consistency` means the contract itself is broken.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpendError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("Failed to derive spend: {0}")]
    Consistency(#[from] ConsistencyError),

    #[error("Invalid receiver expiry: {0}")]
    InvalidExpiry(String),
}

fn join_paths(paths: &[ParameterPath]) -> String {
    paths
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
