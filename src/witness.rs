//! Spend witness skeletons

use crate::contract::Contract;
use crate::error::{ConsistencyError, InputError, SpendError};
use crate::input::{InputEntry, InputKind, InputRegistry};
use crate::path::ParameterId;
use serde::{Deserialize, Serialize};

/// Identifies a signing key by its root and derivation path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyId {
    pub xpub: String,
    pub derivation_path: Vec<String>,
}

/// One component of a spend witness
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WitnessComponent {
    /// Signatures over the transaction, filled in by the signer
    RawTxSignature {
        quorum: u32,
        keys: Vec<KeyId>,
        signatures: Vec<String>,
    },
    /// Raw bytes disclosed at spend time
    Data {
        #[serde(with = "hex::serde")]
        value: Vec<u8>,
    },
}

/// Builder for constructing witness components
#[derive(Debug, Default)]
pub struct WitnessBuilder {
    components: Vec<WitnessComponent>,
}

impl WitnessBuilder {
    /// Create a new witness builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a signature slot for `keys`, awaiting `quorum` signatures
    #[must_use]
    pub fn with_signature(mut self, quorum: u32, keys: Vec<KeyId>) -> Self {
        self.components.push(WitnessComponent::RawTxSignature {
            quorum,
            keys,
            signatures: Vec::new(),
        });
        self
    }

    /// Add a data component
    ///
    /// Clause derivation never discloses data itself. Signing backends use
    /// this to append values revealed at spend time, such as hash preimages.
    #[must_use]
    pub fn with_data(mut self, value: Vec<u8>) -> Self {
        self.components.push(WitnessComponent::Data { value });
        self
    }

    /// Add whatever witness material `entry` contributes
    ///
    /// Only public key choices contribute, as a single-key signature slot.
    /// Other kinds end up in the program or the value sources instead.
    ///
    /// # Errors
    ///
    /// Returns an input error while no key has been chosen, and a
    /// consistency error if a public key choice has no key map or selects a
    /// key absent from it.
    pub fn with_input(self, entry: &InputEntry) -> Result<Self, SpendError> {
        match entry.kind {
            InputKind::PublicKeyChoice => {
                let key_map = entry
                    .key_map
                    .as_ref()
                    .ok_or_else(|| ConsistencyError::MissingKeyMap(entry.path.clone()))?;
                if entry.value.is_empty() {
                    return Err(InputError::Missing(entry.path.clone()).into());
                }
                let key = key_map.get(&entry.value).ok_or_else(|| ConsistencyError::UnknownKey {
                    path: entry.path.clone(),
                    key: entry.value.clone(),
                })?;
                Ok(self.with_signature(
                    1,
                    vec![KeyId {
                        xpub: key.root_xpub.clone(),
                        derivation_path: key.derivation_path.clone(),
                    }],
                ))
            }
            kind => {
                tracing::trace!(path = %entry.path, ?kind, "no witness material");
                Ok(self)
            }
        }
    }

    /// Build the witness components
    #[must_use]
    pub fn build(self) -> Vec<WitnessComponent> {
        self.components
    }
}

/// Witness skeleton for the given clause parameters
///
/// Each parameter contributes through every spend slot that belongs to it,
/// so a composite parameter is matched through all of its sub-slots.
///
/// # Errors
///
/// Returns an error if a matching public key choice is unset or
/// inconsistent.
pub fn clause_witness_components(
    spend_inputs: &InputRegistry,
    clause_parameters: &[ParameterId],
) -> Result<Vec<WitnessComponent>, SpendError> {
    let mut builder = WitnessBuilder::new();
    for id in clause_parameters {
        for entry in spend_inputs.slots_of(id) {
            builder = builder.with_input(entry)?;
        }
    }
    Ok(builder.build())
}

impl Contract {
    /// Witness skeleton for the selected clause
    ///
    /// Signature slots stay unset until [`Contract::set_signing_keys`]
    /// offers keys to choose from.
    ///
    /// # Errors
    ///
    /// Returns an error while a signer is unchosen or if the spend inputs
    /// are inconsistent.
    pub fn witness_components(&self) -> Result<Vec<WitnessComponent>, SpendError> {
        let ids = self.clause_parameter_ids()?;
        clause_witness_components(self.spend_input_map(), &ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::DefaultCodec;
    use crate::path::{ParameterPath, SubField};
    use crate::program::StackInstantiator;
    use crate::test_fixtures::{bound_trade_inputs, pubkey_hex, seller_keys, trade_template};
    use std::sync::Arc;

    fn cancel_contract() -> Contract {
        let mut contract = Contract::create(
            Arc::new(trade_template()),
            bound_trade_inputs(),
            &DefaultCodec,
            &StackInstantiator,
        )
        .unwrap();
        contract.select_clause(1).unwrap();
        contract.set_signing_keys(seller_keys());
        contract
    }

    fn key_slot() -> ParameterPath {
        ParameterId::clause("cancel", "sellerSig").field(SubField::Key)
    }

    #[test]
    fn test_public_key_choice_yields_signature_slot() {
        let contract = cancel_contract();
        let witness = contract.witness_components().unwrap();
        assert_eq!(
            witness,
            vec![WitnessComponent::RawTxSignature {
                quorum: 1,
                keys: vec![KeyId {
                    xpub: "xpub-seller".into(),
                    derivation_path: vec!["0100000000000000".into()],
                }],
                signatures: vec![],
            }]
        );
    }

    #[test]
    fn test_missing_key_map_is_fault() {
        let mut contract = cancel_contract();
        contract.spend_input_map_mut().insert(InputEntry::new(
            key_slot(),
            InputKind::PublicKeyChoice,
            pubkey_hex(1),
        ));
        assert_eq!(
            contract.witness_components(),
            Err(SpendError::Consistency(ConsistencyError::MissingKeyMap(
                key_slot()
            )))
        );
    }

    #[test]
    fn test_unknown_chosen_key_is_fault() {
        let mut contract = cancel_contract();
        contract
            .spend_input_map_mut()
            .set_value(&key_slot(), pubkey_hex(9))
            .unwrap();
        assert!(matches!(
            contract.witness_components(),
            Err(SpendError::Consistency(ConsistencyError::UnknownKey { .. }))
        ));
    }

    #[test]
    fn test_unchosen_signer_is_input_error() {
        let mut contract = Contract::create(
            Arc::new(trade_template()),
            bound_trade_inputs(),
            &DefaultCodec,
            &StackInstantiator,
        )
        .unwrap();
        contract.select_clause(1).unwrap();
        assert_eq!(
            contract.witness_components(),
            Err(SpendError::Input(InputError::Missing(key_slot())))
        );
    }

    #[test]
    fn test_unrecognised_kinds_contribute_nothing() {
        // trade clause only has a Value parameter
        let contract = Contract::create(
            Arc::new(trade_template()),
            bound_trade_inputs(),
            &DefaultCodec,
            &StackInstantiator,
        )
        .unwrap();
        assert!(contract.witness_components().unwrap().is_empty());
    }

    #[test]
    fn test_prefix_sharing_parameter_not_matched() {
        let mut spend_inputs = InputRegistry::new();
        spend_inputs.insert(InputEntry::public_key_choice(
            ParameterId::clause("cancel", "sellerSig2").field(SubField::Key),
            seller_keys(),
        ));
        let ids = [ParameterId::clause("cancel", "sellerSig")];
        assert!(clause_witness_components(&spend_inputs, &ids)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_builder_data_component_serializes() {
        let witness = WitnessBuilder::new()
            .with_data(vec![0xde, 0xad])
            .with_signature(2, vec![])
            .build();
        let json = serde_json::to_value(&witness).unwrap();
        assert_eq!(json[0]["type"], "data");
        assert_eq!(json[0]["value"], "dead");
        assert_eq!(json[1]["type"], "raw_tx_signature");
        assert_eq!(json[1]["quorum"], 2);
    }
}
