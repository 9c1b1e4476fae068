//! Address generation for control programs
//!
//! These addresses identify a control program. They are not spendable
//! through its clauses on an Elements chain, which never runs Ivy bytecode.

use crate::program::ControlProgram;
use secp256k1::PublicKey;

/// Pay-to-witness-script address for a control program, optionally blinded
#[must_use]
pub fn control_program_address(
    program: &ControlProgram,
    blinding_key: Option<PublicKey>,
    params: &'static elements::AddressParams,
) -> elements::Address {
    elements::Address::p2wsh(&program.script(), blinding_key, params)
}
