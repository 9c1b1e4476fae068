//! Path-addressed parameter inputs

use crate::error::InputError;
use crate::path::{ParameterId, ParameterPath, SubField};
use crate::template::{Clause, Parameter, TemplateModel, ValueType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// What an input slot holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Bytes,
    Integer,
    Boolean,
    Time,
    Duration,
    Hash,
    Signature,
    PublicKey,
    /// A public key picked from the keys the user controls
    PublicKeyChoice,
    Program,
    Address,
    Asset,
    Amount,
    Account,
    /// Composite parent of an asset and an amount sub-slot
    AssetAmount,
    /// Composite parent of an account, an asset and an amount sub-slot
    Value,
}

impl InputKind {
    /// Kind of the input slot generated for a declared type
    #[must_use]
    pub const fn for_type(value_type: &ValueType) -> Self {
        match value_type {
            ValueType::PublicKey => Self::PublicKey,
            ValueType::Signature => Self::Signature,
            ValueType::Bytes => Self::Bytes,
            ValueType::Time => Self::Time,
            ValueType::Duration => Self::Duration,
            ValueType::Boolean => Self::Boolean,
            ValueType::Integer => Self::Integer,
            ValueType::Asset => Self::Asset,
            ValueType::Amount => Self::Amount,
            ValueType::AssetAmount => Self::AssetAmount,
            ValueType::Program => Self::Address,
            ValueType::Value => Self::Value,
            ValueType::Sha256(_) | ValueType::Sha3(_) => Self::Hash,
        }
    }

    /// Sub-slots of a composite kind, in argument order
    #[must_use]
    pub fn sub_fields(self) -> &'static [(SubField, InputKind)] {
        match self {
            Self::AssetAmount => &[(SubField::Asset, Self::Asset), (SubField::Amount, Self::Amount)],
            Self::Value => &[
                (SubField::Account, Self::Account),
                (SubField::Asset, Self::Asset),
                (SubField::Amount, Self::Amount),
            ],
            _ => &[],
        }
    }

    /// Whether the kind is a composite parent
    #[must_use]
    pub const fn is_composite(self) -> bool {
        matches!(self, Self::AssetAmount | Self::Value)
    }
}

/// Where a chosen public key comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRef {
    pub root_xpub: String,
    pub derivation_path: Vec<String>,
}

/// One input slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEntry {
    pub path: ParameterPath,
    pub kind: InputKind,
    pub value: String,
    /// Chosen key -> key origin, for public key choices
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_map: Option<BTreeMap<String, KeyRef>>,
    /// Precomputed control program of an address
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "optional_hex"
    )]
    pub computed: Option<Vec<u8>>,
}

impl InputEntry {
    /// A plain entry with a raw string value
    pub fn new(path: ParameterPath, kind: InputKind, value: impl Into<String>) -> Self {
        Self {
            path,
            kind,
            value: value.into(),
            key_map: None,
            computed: None,
        }
    }

    /// An empty entry awaiting user input
    #[must_use]
    pub fn empty(path: ParameterPath, kind: InputKind) -> Self {
        Self::new(path, kind, "")
    }

    /// A public key choice backed by the keys in `key_map`
    ///
    /// The initial choice is the first key of the map, if any.
    #[must_use]
    pub fn public_key_choice(path: ParameterPath, key_map: BTreeMap<String, KeyRef>) -> Self {
        let value = key_map.keys().next().cloned().unwrap_or_default();
        Self {
            key_map: Some(key_map),
            ..Self::new(path, InputKind::PublicKeyChoice, value)
        }
    }

    /// An address entry whose destination program is derived from an Elements address
    ///
    /// # Errors
    ///
    /// Returns an error if `address` does not parse.
    pub fn address(path: ParameterPath, address: &str) -> Result<Self, InputError> {
        let parsed = elements::Address::from_str(address).map_err(|e| InputError::Malformed {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self::address_with_program(
            path,
            address,
            parsed.script_pubkey().as_bytes().to_vec(),
        ))
    }

    /// An address entry with an already computed destination program
    pub fn address_with_program(
        path: ParameterPath,
        address: impl Into<String>,
        program: Vec<u8>,
    ) -> Self {
        Self {
            computed: Some(program),
            ..Self::new(path, InputKind::Address, address)
        }
    }
}

/// Mapping from slot path to entry
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputRegistry {
    entries: BTreeMap<ParameterPath, InputEntry>,
}

impl InputRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty slots for every contract parameter of `template`
    #[must_use]
    pub fn for_contract(template: &TemplateModel) -> Self {
        let mut registry = Self::new();
        for param in &template.contract_parameters {
            registry.add_parameter(ParameterId::contract(&param.identifier), param);
        }
        registry
    }

    /// Empty slots for every parameter of `clause`
    ///
    /// Signature parameters get a key sub-slot where the signer is chosen
    /// among `signing_keys`.
    #[must_use]
    pub fn for_clause(clause: &Clause, signing_keys: &BTreeMap<String, KeyRef>) -> Self {
        let mut registry = Self::new();
        for param in &clause.parameters {
            let id = ParameterId::clause(&clause.name, &param.identifier);
            registry.add_parameter(id.clone(), param);
            if param.value_type == ValueType::Signature {
                registry.insert(InputEntry::public_key_choice(
                    id.field(SubField::Key),
                    signing_keys.clone(),
                ));
            }
        }
        registry
    }

    fn add_parameter(&mut self, id: ParameterId, param: &Parameter) {
        let kind = InputKind::for_type(&param.value_type);
        for (field, sub_kind) in kind.sub_fields() {
            self.insert(InputEntry::empty(id.field(*field), *sub_kind));
        }
        self.insert(InputEntry::empty(id.path(), kind));
    }

    /// Insert or replace the entry at its path
    pub fn insert(&mut self, entry: InputEntry) -> Option<InputEntry> {
        self.entries.insert(entry.path.clone(), entry)
    }

    /// Set the raw value of an existing slot
    ///
    /// # Errors
    ///
    /// Returns an error if no slot exists at `path`.
    pub fn set_value(&mut self, path: &ParameterPath, value: impl Into<String>) -> Result<(), InputError> {
        let entry = self
            .entries
            .get_mut(path)
            .ok_or_else(|| InputError::Missing(path.clone()))?;
        entry.value = value.into();
        Ok(())
    }

    #[must_use]
    pub fn get(&self, path: &ParameterPath) -> Option<&InputEntry> {
        self.entries.get(path)
    }

    /// Entry at `path`, or a missing-input error
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Missing`] if there is no entry.
    pub fn require(&self, path: &ParameterPath) -> Result<&InputEntry, InputError> {
        self.get(path).ok_or_else(|| InputError::Missing(path.clone()))
    }

    /// All slots belonging to one declared parameter, in path order
    pub fn slots_of<'a>(&'a self, id: &'a ParameterId) -> impl Iterator<Item = &'a InputEntry> {
        self.entries
            .values()
            .filter(move |entry| entry.path.belongs_to(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputEntry> {
        self.entries.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<InputEntry> for InputRegistry {
    fn from_iter<I: IntoIterator<Item = InputEntry>>(iter: I) -> Self {
        let mut registry = Self::new();
        for entry in iter {
            registry.insert(entry);
        }
        registry
    }
}

mod optional_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => serializer.serialize_some(&hex::encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|s| hex::decode(s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{pubkey_hex, seller_keys, test_address, trade_template};

    #[test]
    fn test_for_contract_expands_composites() {
        let registry = InputRegistry::for_contract(&trade_template());
        let price = ParameterId::contract("price");
        assert_eq!(registry.slots_of(&price).count(), 3);
        assert_eq!(
            registry.get(&price.field(SubField::Amount)).unwrap().kind,
            InputKind::Amount
        );
        let value = ParameterId::contract("offered");
        assert_eq!(registry.slots_of(&value).count(), 4);
        assert_eq!(
            registry.get(&ParameterPath::contract("seller")).unwrap().kind,
            InputKind::Address
        );
    }

    #[test]
    fn test_for_clause_adds_key_slot() {
        let template = trade_template();
        let registry = InputRegistry::for_clause(template.clause("cancel").unwrap(), &seller_keys());
        let sig = ParameterId::clause("cancel", "sellerSig");
        let key = registry.get(&sig.field(SubField::Key)).unwrap();
        assert_eq!(key.kind, InputKind::PublicKeyChoice);
        assert_eq!(key.value, pubkey_hex(1));
        assert_eq!(key.key_map.as_ref(), Some(&seller_keys()));
        assert_eq!(registry.get(&sig.path()).unwrap().kind, InputKind::Signature);
    }

    #[test]
    fn test_set_value_requires_slot() {
        let mut registry = InputRegistry::for_contract(&trade_template());
        let path = ParameterPath::contract("sellerKey");
        registry.set_value(&path, "02aa").unwrap();
        assert_eq!(registry.get(&path).unwrap().value, "02aa");

        let unknown = ParameterPath::contract("nope");
        assert_eq!(
            registry.set_value(&unknown, "x"),
            Err(InputError::Missing(unknown))
        );
    }

    #[test]
    fn test_address_entry_computes_program() {
        let address = test_address();
        let entry =
            InputEntry::address(ParameterPath::contract("seller"), &address.to_string()).unwrap();
        assert_eq!(
            entry.computed.as_deref(),
            Some(address.script_pubkey().as_bytes())
        );
        assert!(InputEntry::address(ParameterPath::contract("seller"), "not-an-address").is_err());
    }

    #[test]
    fn test_public_key_choice_defaults_to_first_key() {
        let mut keys = BTreeMap::new();
        keys.insert(
            "02bb".to_string(),
            KeyRef {
                root_xpub: "xpub-b".into(),
                derivation_path: vec![],
            },
        );
        keys.insert(
            "02aa".to_string(),
            KeyRef {
                root_xpub: "xpub-a".into(),
                derivation_path: vec![],
            },
        );
        let entry = InputEntry::public_key_choice(ParameterPath::clause("c", "sig"), keys);
        assert_eq!(entry.value, "02aa");
    }
}
