//! Structured addressing for parameter slots
//!
//! Every input slot is named by a [`ParameterPath`]: the declared parameter
//! it belongs to plus an optional sub-field of a composite. The legacy
//! dotted form (`clauseParameters.spend.sig.key`) is kept for display and
//! parsing only; matching always compares the structured fields.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const CONTRACT_PREFIX: &str = "contractParameters";
const CLAUSE_PREFIX: &str = "clauseParameters";

/// The declared parameter a slot belongs to
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParameterId {
    /// A contract-level parameter, bound at lock time
    Contract(String),
    /// A clause-level parameter, bound at spend time
    Clause { clause: String, identifier: String },
}

impl ParameterId {
    /// Identifier of a contract-level parameter
    pub fn contract(identifier: impl Into<String>) -> Self {
        Self::Contract(identifier.into())
    }

    /// Identifier of a clause-level parameter
    pub fn clause(clause: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::Clause {
            clause: clause.into(),
            identifier: identifier.into(),
        }
    }

    /// The parameter's declared identifier
    #[must_use]
    pub fn identifier(&self) -> &str {
        match self {
            Self::Contract(identifier) | Self::Clause { identifier, .. } => identifier,
        }
    }

    /// Path to the parameter's own slot
    #[must_use]
    pub fn path(&self) -> ParameterPath {
        ParameterPath {
            id: self.clone(),
            field: None,
        }
    }

    /// Path to one sub-field of this parameter
    #[must_use]
    pub fn field(&self, field: SubField) -> ParameterPath {
        ParameterPath {
            id: self.clone(),
            field: Some(field),
        }
    }
}

/// Sub-slot of a composite parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SubField {
    /// Asset identifier of an asset-amount or value composite
    Asset,
    /// Amount of an asset-amount or value composite
    Amount,
    /// Funding account of a value composite
    Account,
    /// Signing key chosen for a signature parameter
    Key,
}

impl SubField {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Amount => "amount",
            Self::Account => "account",
            Self::Key => "key",
        }
    }
}

impl FromStr for SubField {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asset" => Ok(Self::Asset),
            "amount" => Ok(Self::Amount),
            "account" => Ok(Self::Account),
            "key" => Ok(Self::Key),
            other => Err(PathParseError(format!("unknown sub-field `{other}`"))),
        }
    }
}

/// Hierarchical identifier of an input slot
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParameterPath {
    pub id: ParameterId,
    pub field: Option<SubField>,
}

impl ParameterPath {
    /// Path of a contract-level parameter
    pub fn contract(identifier: impl Into<String>) -> Self {
        ParameterId::contract(identifier).path()
    }

    /// Path of a clause-level parameter
    pub fn clause(clause: impl Into<String>, identifier: impl Into<String>) -> Self {
        ParameterId::clause(clause, identifier).path()
    }

    /// Sibling path addressing `field` of the same parameter
    #[must_use]
    pub fn with_field(&self, field: SubField) -> Self {
        self.id.field(field)
    }

    /// Whether this path addresses a slot of the given parameter
    #[must_use]
    pub fn belongs_to(&self, id: &ParameterId) -> bool {
        &self.id == id
    }
}

impl fmt::Display for ParameterPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            ParameterId::Contract(identifier) => write!(f, "{CONTRACT_PREFIX}.{identifier}")?,
            ParameterId::Clause { clause, identifier } => {
                write!(f, "{CLAUSE_PREFIX}.{clause}.{identifier}")?;
            }
        }
        if let Some(field) = self.field {
            write!(f, ".{}", field.as_str())?;
        }
        Ok(())
    }
}

/// Error parsing a dotted parameter path
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid parameter path: {0}")]
pub struct PathParseError(String);

impl FromStr for ParameterPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.iter().any(|part| part.is_empty()) {
            return Err(PathParseError(format!("empty segment in `{s}`")));
        }
        let (id, rest) = match parts.as_slice() {
            [CONTRACT_PREFIX, identifier, rest @ ..] => (ParameterId::contract(*identifier), rest),
            [CLAUSE_PREFIX, clause, identifier, rest @ ..] => {
                (ParameterId::clause(*clause, *identifier), rest)
            }
            _ => return Err(PathParseError(format!("unrecognised path `{s}`"))),
        };
        let field = match rest {
            [] => None,
            [field] => Some(field.parse()?),
            _ => return Err(PathParseError(format!("trailing segments in `{s}`"))),
        };
        Ok(Self { id, field })
    }
}

impl Serialize for ParameterPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ParameterPath {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
