//! Parsed contract templates
//!
//! A [`TemplateModel`] is what the external compiler hands back for a piece
//! of contract source. The engine only ever reads it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declared type of a template parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ValueType {
    PublicKey,
    Signature,
    Bytes,
    Time,
    Duration,
    Boolean,
    Integer,
    Asset,
    Amount,
    AssetAmount,
    Program,
    Value,
    Sha256(Box<ValueType>),
    Sha3(Box<ValueType>),
}

impl ValueType {
    /// Number of arguments this type contributes to a control program
    ///
    /// `Value` parameters are spent, not embedded, so they contribute none.
    #[must_use]
    pub const fn argument_slots(&self) -> usize {
        match self {
            Self::Value => 0,
            Self::AssetAmount => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PublicKey => f.write_str("PublicKey"),
            Self::Signature => f.write_str("Signature"),
            Self::Bytes => f.write_str("Bytes"),
            Self::Time => f.write_str("Time"),
            Self::Duration => f.write_str("Duration"),
            Self::Boolean => f.write_str("Boolean"),
            Self::Integer => f.write_str("Integer"),
            Self::Asset => f.write_str("Asset"),
            Self::Amount => f.write_str("Amount"),
            Self::AssetAmount => f.write_str("AssetAmount"),
            Self::Program => f.write_str("Program"),
            Self::Value => f.write_str("Value"),
            Self::Sha256(inner) => write!(f, "Sha256({inner})"),
            Self::Sha3(inner) => write!(f, "Sha3({inner})"),
        }
    }
}

impl FromStr for ValueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(inner) = hash_argument(s, "Sha256") {
            return Ok(Self::Sha256(Box::new(inner.parse()?)));
        }
        if let Some(inner) = hash_argument(s, "Sha3") {
            return Ok(Self::Sha3(Box::new(inner.parse()?)));
        }
        match s {
            "PublicKey" => Ok(Self::PublicKey),
            "Signature" => Ok(Self::Signature),
            "Bytes" => Ok(Self::Bytes),
            "Time" => Ok(Self::Time),
            "Duration" => Ok(Self::Duration),
            "Boolean" => Ok(Self::Boolean),
            "Integer" => Ok(Self::Integer),
            "Asset" => Ok(Self::Asset),
            "Amount" => Ok(Self::Amount),
            "AssetAmount" => Ok(Self::AssetAmount),
            "Program" => Ok(Self::Program),
            "Value" => Ok(Self::Value),
            other => Err(format!("unknown type `{other}`")),
        }
    }
}

fn hash_argument<'a>(s: &'a str, hash: &str) -> Option<&'a str> {
    s.strip_prefix(hash)?.strip_prefix('(')?.strip_suffix(')')
}

impl TryFrom<String> for ValueType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ValueType> for String {
    fn from(value: ValueType) -> Self {
        value.to_string()
    }
}

/// A parameter declared by a template or one of its clauses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub identifier: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
}

impl Parameter {
    pub fn new(identifier: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            identifier: identifier.into(),
            value_type,
        }
    }
}

/// Value paid out when a clause is taken
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClauseOutput {
    /// Contract parameter holding the asset and amount paid
    pub asset_amount_param: String,
    /// Contract parameter holding the destination address
    pub address_param: String,
}

/// One named spending alternative of a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub outputs: Vec<ClauseOutput>,
}

/// A compiled contract template
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TemplateModel {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub contract_parameters: Vec<Parameter>,
    #[serde(default)]
    pub clauses: Vec<Clause>,
    /// Human-readable opcode listing of the compiled body
    #[serde(default)]
    pub instructions: Vec<String>,
    /// Compiled body appended after the argument pushes
    #[serde(default, with = "hex::serde")]
    pub program: Vec<u8>,
    #[serde(default)]
    pub source: String,
    /// Compilation fault message, if compilation failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TemplateModel {
    /// An otherwise empty template carrying a compilation fault
    ///
    /// # Examples
    ///
    /// ```
    /// use ivylock::TemplateModel;
    ///
    /// let template = TemplateModel::empty("contract X() {}", "Only 1 contract expression allowed.");
    /// assert!(template.clauses.is_empty());
    /// assert!(template.error.is_some());
    /// ```
    pub fn empty(source: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Parse compiler output
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not have the template shape.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Contract parameters embedded into the control program, in declared order
    pub fn data_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.contract_parameters
            .iter()
            .filter(|param| param.value_type != ValueType::Value)
    }

    /// Number of arguments the control program expects
    #[must_use]
    pub fn argument_slots(&self) -> usize {
        self.contract_parameters
            .iter()
            .map(|param| param.value_type.argument_slots())
            .sum()
    }

    /// Look up a clause by name
    #[must_use]
    pub fn clause(&self, name: &str) -> Option<&Clause> {
        self.clauses.iter().find(|clause| clause.name == name)
    }

    /// Look up a contract parameter by identifier
    #[must_use]
    pub fn contract_parameter(&self, identifier: &str) -> Option<&Parameter> {
        self.contract_parameters
            .iter()
            .find(|param| param.identifier == identifier)
    }

    /// Whether the compiler reported a fault for this template
    #[must_use]
    pub const fn has_error(&self) -> bool {
        self.error.is_some()
    }
}
