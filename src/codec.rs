//! Type-aware decoding and validation of input slots
//!
//! [`DefaultCodec`] turns a slot's raw string into the argument that gets
//! pushed into a control program. Validity is decodability, except for the
//! slots that never reach a program (accounts, composite parents).

use crate::error::InputError;
use crate::input::{InputEntry, InputKind, InputRegistry};
use crate::path::ParameterPath;
use chrono::DateTime;
use secp256k1::{PublicKey, XOnlyPublicKey};

/// A single encoded control-program argument
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Argument {
    Integer(i64),
    Bytes(Vec<u8>),
}

impl From<i64> for Argument {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<Vec<u8>> for Argument {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

/// Decoding and validation of input slots
pub trait InputCodec {
    /// Decode the slot at `path` into a program argument
    ///
    /// # Errors
    ///
    /// Returns an error if the slot is missing, cannot be parsed for its
    /// kind, or never decodes to an argument.
    fn decode(&self, path: &ParameterPath, inputs: &InputRegistry) -> Result<Argument, InputError>;

    /// Whether the slot at `path` currently holds a usable value
    fn is_valid(&self, path: &ParameterPath, inputs: &InputRegistry) -> bool;
}

/// Codec for the built-in input kinds
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCodec;

impl InputCodec for DefaultCodec {
    fn decode(&self, path: &ParameterPath, inputs: &InputRegistry) -> Result<Argument, InputError> {
        let entry = inputs.require(path)?;
        decode_entry(entry)
    }

    fn is_valid(&self, path: &ParameterPath, inputs: &InputRegistry) -> bool {
        let Some(entry) = inputs.get(path) else {
            return false;
        };
        match entry.kind {
            InputKind::Account => !entry.value.trim().is_empty(),
            kind if kind.is_composite() => kind
                .sub_fields()
                .iter()
                .all(|(field, _)| self.is_valid(&path.with_field(*field), inputs)),
            _ => decode_entry(entry).is_ok(),
        }
    }
}

fn decode_entry(entry: &InputEntry) -> Result<Argument, InputError> {
    let raw = entry.value.trim();
    match entry.kind {
        InputKind::Bytes | InputKind::Program => hex_bytes(entry, raw, None).map(Argument::Bytes),
        InputKind::Hash | InputKind::Asset => hex_bytes(entry, raw, Some(32)).map(Argument::Bytes),
        InputKind::Signature => hex_bytes(entry, raw, Some(64)).map(Argument::Bytes),
        InputKind::PublicKey | InputKind::PublicKeyChoice => public_key(entry, raw).map(Argument::Bytes),
        InputKind::Integer => integer(entry, raw).map(Argument::Integer),
        InputKind::Amount | InputKind::Duration => {
            let value = integer(entry, raw)?;
            if value < 0 {
                return Err(malformed(entry, "must not be negative"));
            }
            Ok(Argument::Integer(value))
        }
        InputKind::Boolean => match raw {
            "true" => Ok(Argument::Integer(1)),
            "false" => Ok(Argument::Integer(0)),
            _ => Err(malformed(entry, "expected `true` or `false`")),
        },
        InputKind::Time => DateTime::parse_from_rfc3339(raw)
            .map(|time| Argument::Integer(time.timestamp_millis()))
            .map_err(|e| malformed(entry, &e.to_string())),
        InputKind::Address => entry
            .computed
            .clone()
            .map(Argument::Bytes)
            .ok_or_else(|| malformed(entry, "no computed control program")),
        InputKind::Account | InputKind::AssetAmount | InputKind::Value => {
            Err(InputError::Undecodable(entry.path.clone()))
        }
    }
}

fn hex_bytes(entry: &InputEntry, raw: &str, len: Option<usize>) -> Result<Vec<u8>, InputError> {
    if raw.is_empty() {
        return Err(malformed(entry, "empty value"));
    }
    let bytes = hex::decode(raw).map_err(|e| malformed(entry, &e.to_string()))?;
    match len {
        Some(len) if bytes.len() != len => Err(malformed(
            entry,
            &format!("expected {len} bytes, got {}", bytes.len()),
        )),
        _ => Ok(bytes),
    }
}

fn public_key(entry: &InputEntry, raw: &str) -> Result<Vec<u8>, InputError> {
    let bytes = hex_bytes(entry, raw, None)?;
    let parsed = match bytes.len() {
        33 => PublicKey::from_slice(&bytes).map(|_| ()),
        32 => XOnlyPublicKey::from_slice(&bytes).map(|_| ()),
        len => return Err(malformed(entry, &format!("public key of {len} bytes"))),
    };
    parsed.map_err(|e| malformed(entry, &e.to_string()))?;
    Ok(bytes)
}

fn integer(entry: &InputEntry, raw: &str) -> Result<i64, InputError> {
    raw.parse::<i64>()
        .map_err(|e| malformed(entry, &e.to_string()))
}

fn malformed(entry: &InputEntry, reason: &str) -> InputError {
    InputError::Malformed {
        path: entry.path.clone(),
        reason: reason.to_string(),
    }
}
