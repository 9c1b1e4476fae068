//! Spend output actions and request assembly

use crate::codec::InputCodec;
use crate::contract::Contract;
use crate::error::{ConsistencyError, InputError, SpendError};
use crate::input::{InputEntry, InputKind, InputRegistry};
use crate::path::{ParameterId, ParameterPath, SubField};
use crate::template::{ClauseOutput, TemplateModel, ValueType};
use crate::witness::WitnessComponent;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Default lifetime of a receiver
pub const DEFAULT_RECEIVER_TTL_SECS: u64 = 24 * 60 * 60;

/// Where an output action pays to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receiver {
    #[serde(with = "hex::serde")]
    pub control_program: Vec<u8>,
    pub expires_at: DateTime<Utc>,
}

/// Pays an amount of an asset to a receiver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "control_with_receiver")]
pub struct OutputAction {
    pub asset_id: String,
    pub amount: u64,
    pub receiver: Receiver,
}

/// Funds a spend from an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "spend_from_account")]
pub struct SpendFromAccount {
    pub account_id: String,
    pub asset_id: String,
    pub amount: u64,
}

/// Output actions for `outputs`, resolved against the contract's bound inputs
///
/// # Errors
///
/// Returns an error if any referenced input is missing or malformed. Bound
/// inputs are validated when a contract is created, so this signals a
/// defect rather than a user mistake.
pub fn clause_output_actions(
    inputs: &InputRegistry,
    outputs: &[ClauseOutput],
    expires_at: DateTime<Utc>,
) -> Result<Vec<OutputAction>, ConsistencyError> {
    outputs
        .iter()
        .map(|output| {
            let price = ParameterId::contract(&output.asset_amount_param);
            let amount = parse_amount(referenced(inputs, &price.field(SubField::Amount))?)?;
            let asset_id = referenced(inputs, &price.field(SubField::Asset))?.value.clone();

            let address_path = ParameterPath::contract(&output.address_param);
            let control_program = referenced(inputs, &address_path)?
                .computed
                .clone()
                .ok_or(ConsistencyError::MissingComputedProgram(address_path))?;

            Ok(OutputAction {
                asset_id,
                amount,
                receiver: Receiver {
                    control_program,
                    expires_at,
                },
            })
        })
        .collect()
}

fn referenced<'a>(
    inputs: &'a InputRegistry,
    path: &ParameterPath,
) -> Result<&'a InputEntry, ConsistencyError> {
    inputs.get(path).ok_or_else(|| {
        tracing::warn!(path = %path, "referenced input is missing");
        ConsistencyError::MissingInput(path.clone())
    })
}

fn parse_amount(entry: &InputEntry) -> Result<u64, ConsistencyError> {
    entry
        .value
        .trim()
        .parse()
        .map_err(|e: std::num::ParseIntError| ConsistencyError::MalformedInput {
            path: entry.path.clone(),
            reason: e.to_string(),
        })
}

/// The value locked by a contract, funded from an account
///
/// Returns `None` unless exactly one `Value` parameter is validly bound.
pub fn contract_value<C: InputCodec>(
    template: &TemplateModel,
    inputs: &InputRegistry,
    codec: &C,
) -> Option<SpendFromAccount> {
    let mut sources = template
        .contract_parameters
        .iter()
        .filter(|param| param.value_type == ValueType::Value)
        .map(|param| ParameterPath::contract(&param.identifier))
        .filter(|path| {
            inputs.get(path).map(|entry| entry.kind) == Some(InputKind::Value)
                && codec.is_valid(path, inputs)
        })
        .filter_map(|path| value_source(inputs, &path.id).ok());
    let source = sources.next()?;
    sources.next().is_none().then_some(source)
}

/// Account funding for every `Value` parameter of the selected clause
///
/// # Errors
///
/// Returns an input error while a value's account, asset or amount is left
/// blank or its amount does not parse. Returns a consistency error if one
/// of its slots is missing altogether.
pub fn clause_value_sources(contract: &Contract) -> Result<Vec<SpendFromAccount>, SpendError> {
    let clause = contract.selected_clause()?;
    clause
        .parameters
        .iter()
        .filter(|param| param.value_type == ValueType::Value)
        .map(|param| {
            let id = ParameterId::clause(&clause.name, &param.identifier);
            value_source(contract.spend_input_map(), &id)
        })
        .collect()
}

fn value_source(inputs: &InputRegistry, id: &ParameterId) -> Result<SpendFromAccount, SpendError> {
    let account = referenced(inputs, &id.field(SubField::Account))?;
    let asset = referenced(inputs, &id.field(SubField::Asset))?;
    let amount = referenced(inputs, &id.field(SubField::Amount))?;
    Ok(SpendFromAccount {
        account_id: filled(account)?.to_string(),
        asset_id: filled(asset)?.to_string(),
        amount: user_amount(amount)?,
    })
}

fn filled(entry: &InputEntry) -> Result<&str, InputError> {
    let value = entry.value.trim();
    if value.is_empty() {
        return Err(InputError::Missing(entry.path.clone()));
    }
    Ok(value)
}

fn user_amount(entry: &InputEntry) -> Result<u64, InputError> {
    filled(entry)?
        .parse()
        .map_err(|e: std::num::ParseIntError| InputError::Malformed {
            path: entry.path.clone(),
            reason: e.to_string(),
        })
}

/// Everything the signing backend needs to spend a contract through one clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendRequest {
    pub clause: String,
    #[serde(with = "hex::serde")]
    pub control_program: Vec<u8>,
    pub witness: Vec<WitnessComponent>,
    pub outputs: Vec<OutputAction>,
    pub sources: Vec<SpendFromAccount>,
}

/// Builder for spend requests against a contract's selected clause
pub struct SpendBuilder<'a> {
    contract: &'a Contract,
    expires_at: Option<DateTime<Utc>>,
    receiver_ttl: Duration,
}

impl<'a> SpendBuilder<'a> {
    /// Create a new spend builder for the given contract
    #[must_use]
    pub fn new(contract: &'a Contract) -> Self {
        Self {
            contract,
            expires_at: None,
            receiver_ttl: Duration::seconds(DEFAULT_RECEIVER_TTL_SECS as i64),
        }
    }

    /// Fix the expiry of every receiver
    #[must_use]
    pub fn expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Set how long receivers stay valid when no expiry is fixed
    ///
    /// # Errors
    ///
    /// Returns an error if `secs` does not fit a duration.
    pub fn receiver_ttl_secs(mut self, secs: u64) -> Result<Self, SpendError> {
        let secs = i64::try_from(secs).map_err(|e| SpendError::InvalidExpiry(e.to_string()))?;
        self.receiver_ttl = Duration::try_seconds(secs)
            .ok_or_else(|| SpendError::InvalidExpiry(format!("{secs} seconds")))?;
        Ok(self)
    }

    /// Assemble the spend request
    ///
    /// # Errors
    ///
    /// Returns an error if the contract's inputs are inconsistent or the
    /// receiver expiry overflows.
    pub fn build(self) -> Result<SpendRequest, SpendError> {
        let expires_at = match self.expires_at {
            Some(expires_at) => expires_at,
            None => Utc::now()
                .checked_add_signed(self.receiver_ttl)
                .ok_or_else(|| SpendError::InvalidExpiry("receiver expiry overflows".into()))?,
        };
        let clause = self.contract.selected_clause()?;
        let request = SpendRequest {
            clause: clause.name.clone(),
            control_program: self.contract.control_program().as_bytes().to_vec(),
            witness: self.contract.witness_components()?,
            outputs: clause_output_actions(self.contract.input_map(), &clause.outputs, expires_at)?,
            sources: clause_value_sources(self.contract)?,
        };
        tracing::debug!(
            clause = %request.clause,
            witness = request.witness.len(),
            outputs = request.outputs.len(),
            "spend request assembled"
        );
        Ok(request)
    }
}
