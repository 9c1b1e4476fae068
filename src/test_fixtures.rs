//! Test fixtures and constants for ivylock tests

#![allow(dead_code)] // Test fixtures may not all be used in every test

use crate::input::{InputEntry, InputRegistry, KeyRef};
use crate::path::{ParameterId, ParameterPath, SubField};
use crate::template::{Clause, ClauseOutput, Parameter, TemplateModel, ValueType};
use std::collections::BTreeMap;

pub const ASSET_X: &str = "1111111111111111111111111111111111111111111111111111111111111111";
pub const ASSET_Y: &str = "2222222222222222222222222222222222222222222222222222222222222222";

/// Compiler output for [`trade_template`]
pub const TRADE_TEMPLATE_JSON: &str = r#"{
    "name": "TradeOffer",
    "contract_parameters": [
        {"identifier": "offered", "type": "Value"},
        {"identifier": "price", "type": "AssetAmount"},
        {"identifier": "seller", "type": "Program"},
        {"identifier": "sellerKey", "type": "PublicKey"}
    ],
    "clauses": [
        {
            "name": "trade",
            "parameters": [{"identifier": "payment", "type": "Value"}],
            "outputs": [{"asset_amount_param": "price", "address_param": "seller"}]
        },
        {
            "name": "cancel",
            "parameters": [{"identifier": "sellerSig", "type": "Signature"}]
        }
    ],
    "instructions": ["DUP", "TOALTSTACK", "CHECKSIG"],
    "program": "76ddac",
    "source": "contract TradeOffer(price: AssetAmount, seller: Program, sellerKey: PublicKey) locks offered"
}"#;

/// Two-clause trade offer: `trade` pays the price to the seller, `cancel` needs the seller's signature
#[must_use]
pub fn trade_template() -> TemplateModel {
    TemplateModel {
        name: "TradeOffer".into(),
        contract_parameters: vec![
            Parameter::new("offered", ValueType::Value),
            Parameter::new("price", ValueType::AssetAmount),
            Parameter::new("seller", ValueType::Program),
            Parameter::new("sellerKey", ValueType::PublicKey),
        ],
        clauses: vec![
            Clause {
                name: "trade".into(),
                parameters: vec![Parameter::new("payment", ValueType::Value)],
                outputs: vec![ClauseOutput {
                    asset_amount_param: "price".into(),
                    address_param: "seller".into(),
                }],
            },
            Clause {
                name: "cancel".into(),
                parameters: vec![Parameter::new("sellerSig", ValueType::Signature)],
                outputs: vec![],
            },
        ],
        instructions: vec!["DUP".into(), "TOALTSTACK".into(), "CHECKSIG".into()],
        program: vec![0x76, 0xdd, 0xac],
        source: "contract TradeOffer(price: AssetAmount, seller: Program, sellerKey: PublicKey) locks offered".into(),
        error: None,
    }
}

/// Fully bound contract inputs for [`trade_template`]
#[must_use]
pub fn bound_trade_inputs() -> InputRegistry {
    let mut inputs = InputRegistry::for_contract(&trade_template());
    let offered = ParameterId::contract("offered");
    let price = ParameterId::contract("price");
    let set = |inputs: &mut InputRegistry, path: ParameterPath, value: &str| {
        inputs.set_value(&path, value).expect("slot exists");
    };
    set(&mut inputs, offered.field(SubField::Account), "alice");
    set(&mut inputs, offered.field(SubField::Asset), ASSET_X);
    set(&mut inputs, offered.field(SubField::Amount), "100");
    set(&mut inputs, price.field(SubField::Asset), ASSET_Y);
    set(&mut inputs, price.field(SubField::Amount), "7");
    set(&mut inputs, ParameterPath::contract("sellerKey"), &pubkey_hex(1));
    inputs.insert(
        InputEntry::address(ParameterPath::contract("seller"), &test_address().to_string())
            .expect("valid address"),
    );
    inputs
}

/// Keys the seller controls, keyed by public key hex
#[must_use]
pub fn seller_keys() -> BTreeMap<String, KeyRef> {
    let mut keys = BTreeMap::new();
    keys.insert(
        pubkey_hex(1),
        KeyRef {
            root_xpub: "xpub-seller".into(),
            derivation_path: vec!["0100000000000000".into()],
        },
    );
    keys
}

/// Compressed public key hex for a small secret scalar
#[must_use]
pub fn pubkey_hex(secret: u32) -> String {
    let mut secret_key_bytes = [0u8; 32];
    secret_key_bytes[28..].copy_from_slice(&secret.to_be_bytes());
    let secret_key = secp256k1::SecretKey::from_slice(&secret_key_bytes).expect("valid key");
    let public_key = secp256k1::PublicKey::from_secret_key(&secp256k1::Secp256k1::new(), &secret_key);
    hex::encode(public_key.serialize())
}

/// Helper to create a test address
#[must_use]
pub fn test_address() -> elements::Address {
    // Create a simple P2WPKH address for testing
    use elements::bitcoin::PublicKey;
    use elements::AddressParams;
    use secp256k1::Secp256k1;

    let secp = Secp256k1::new();
    let secret_key = secp256k1::SecretKey::from_slice(&[1u8; 32]).expect("valid key");
    let secp_pubkey = secp256k1::PublicKey::from_secret_key(&secp, &secret_key);
    let bitcoin_pubkey = PublicKey::new(secp_pubkey);

    elements::Address::p2wpkh(&bitcoin_pubkey, None, &AddressParams::ELEMENTS)
}
