//! Control-program instantiation

use crate::address::control_program_address;
use crate::bind::bind_arguments;
use crate::codec::{Argument, InputCodec};
use crate::error::InstantiateError;
use crate::input::InputRegistry;
use crate::template::TemplateModel;
use elements::script::Builder;
use secp256k1::PublicKey;

/// Low-level primitive emitting bytecode for a template and its arguments
pub trait Instantiate {
    /// Emit the control program for `template` with `arguments` in push order
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments do not fit the template.
    fn instantiate(
        &self,
        template: &TemplateModel,
        arguments: &[Argument],
    ) -> Result<Vec<u8>, InstantiateError>;
}

/// Pushes each argument in order, then appends the compiled body
#[derive(Debug, Clone, Copy, Default)]
pub struct StackInstantiator;

impl Instantiate for StackInstantiator {
    fn instantiate(
        &self,
        template: &TemplateModel,
        arguments: &[Argument],
    ) -> Result<Vec<u8>, InstantiateError> {
        if let Some(error) = &template.error {
            return Err(InstantiateError::Uncompiled(error.clone()));
        }
        if template.program.is_empty() {
            return Err(InstantiateError::EmptyProgram);
        }
        let expected = template.argument_slots();
        if expected != arguments.len() {
            return Err(InstantiateError::ArityMismatch {
                expected,
                actual: arguments.len(),
            });
        }

        let mut builder = Builder::new();
        for argument in arguments {
            builder = match argument {
                Argument::Integer(n) => push_int64(builder, *n)?,
                Argument::Bytes(data) => push_bytes(builder, data)?,
            };
        }
        let mut program = builder.into_script().into_bytes();
        program.extend_from_slice(&template.program);
        Ok(program)
    }
}

/// Small integers get their dedicated opcode, the rest are pushed as data
fn push_int64(builder: Builder, n: i64) -> Result<Builder, InstantiateError> {
    match n {
        -1..=16 => Ok(builder.push_int(n)),
        _ => push_bytes(builder, &int64_bytes(n)),
    }
}

/// Little-endian two's complement bytes with trailing zero bytes trimmed
///
/// This is not the scriptnum encoding `Builder::push_scriptint` produces.
fn int64_bytes(n: i64) -> Vec<u8> {
    let mut bytes = n.to_le_bytes().to_vec();
    while bytes.last() == Some(&0) {
        bytes.pop();
    }
    bytes
}

fn push_bytes(builder: Builder, data: &[u8]) -> Result<Builder, InstantiateError> {
    // PUSHDATA4 carries at most a u32 length
    if u32::try_from(data.len()).is_err() {
        return Err(InstantiateError::PushTooLarge(data.len()));
    }
    Ok(builder.push_slice(data))
}

/// Instantiated control-program bytecode
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ControlProgram {
    bytes: Vec<u8>,
}

impl ControlProgram {
    /// Instantiate `template` with already bound arguments
    ///
    /// # Errors
    ///
    /// Propagates any fault reported by `instantiator`.
    pub fn instantiate<I: Instantiate>(
        template: &TemplateModel,
        arguments: &[Argument],
        instantiator: &I,
    ) -> Result<Self, InstantiateError> {
        let bytes = instantiator.instantiate(template, arguments)?;
        tracing::debug!(
            template = %template.name,
            arguments = arguments.len(),
            size = bytes.len(),
            "instantiated control program"
        );
        Ok(Self { bytes })
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Canonical lowercase hex encoding
    #[must_use]
    pub fn hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// The program as an Elements script
    #[must_use]
    pub fn script(&self) -> elements::Script {
        elements::Script::from(self.bytes.clone())
    }

    /// Pay-to-witness-script address committing to this program
    ///
    /// Informational only: the program is Ivy stack bytecode, which an
    /// Elements node does not execute, so value sent here is not locked by
    /// the contract's clauses.
    #[must_use]
    pub fn address(&self, params: &'static elements::AddressParams) -> elements::Address {
        control_program_address(self, None, params)
    }

    /// Confidential variant of [`ControlProgram::address`]
    ///
    /// Informational only, like the unblinded address.
    #[must_use]
    pub fn confidential_address(
        &self,
        params: &'static elements::AddressParams,
        blinding_key: PublicKey,
    ) -> elements::Address {
        control_program_address(self, Some(blinding_key), params)
    }
}

impl AsRef<[u8]> for ControlProgram {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Bind the template's parameters from `inputs` and instantiate it
///
/// Returns `Ok(None)` while the inputs are not ready to bind.
///
/// # Errors
///
/// Propagates any fault reported by `instantiator`.
pub fn lock_program<C: InputCodec, I: Instantiate>(
    template: &TemplateModel,
    inputs: &InputRegistry,
    codec: &C,
    instantiator: &I,
) -> Result<Option<ControlProgram>, InstantiateError> {
    let arguments = bind_arguments(template, inputs, codec);
    if arguments.is_empty() && template.argument_slots() > 0 {
        return Ok(None);
    }
    ControlProgram::instantiate(template, &arguments, instantiator).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::DefaultCodec;
    use crate::test_fixtures::{bound_trade_inputs, trade_template};

    fn body_only() -> TemplateModel {
        TemplateModel {
            name: "Body".into(),
            program: vec![0xaa, 0xbb],
            ..TemplateModel::default()
        }
    }

    fn with_slots(count: usize) -> TemplateModel {
        TemplateModel {
            contract_parameters: (0..count)
                .map(|i| crate::template::Parameter::new(format!("p{i}"), crate::template::ValueType::Bytes))
                .collect(),
            ..body_only()
        }
    }

    #[test]
    fn test_small_integers_use_single_opcodes() {
        let args = [
            Argument::Integer(0),
            Argument::Integer(1),
            Argument::Integer(16),
            Argument::Integer(-1),
        ];
        let template = with_slots(4);
        let program = StackInstantiator.instantiate(&template, &args).unwrap();
        assert_eq!(program, vec![0x00, 0x51, 0x60, 0x4f, 0xaa, 0xbb]);
    }

    #[test]
    fn test_large_integers_push_minimal_bytes() {
        let template = with_slots(2);
        let program = StackInstantiator
            .instantiate(&template, &[Argument::Integer(17), Argument::Integer(1000)])
            .unwrap();
        assert_eq!(program, vec![0x01, 17, 0x02, 0xe8, 0x03, 0xaa, 0xbb]);

        let program = StackInstantiator
            .instantiate(&with_slots(1), &[Argument::Integer(-2)])
            .unwrap();
        assert_eq!(program[0], 8);
        assert_eq!(&program[1..9], &(-2i64).to_le_bytes());
    }

    #[test]
    fn test_byte_pushes() {
        let template = with_slots(3);
        let args = [
            Argument::Bytes(vec![]),
            Argument::Bytes(vec![0xde, 0xad]),
            Argument::Bytes(vec![7; 76]),
        ];
        let program = StackInstantiator.instantiate(&template, &args).unwrap();
        assert_eq!(&program[..4], &[0x00, 0x02, 0xde, 0xad]);
        assert_eq!(&program[4..6], &[0x4c, 76]);
        assert_eq!(program.len(), 4 + 2 + 76 + 2);

        let program = StackInstantiator
            .instantiate(&with_slots(1), &[Argument::Bytes(vec![1; 300])])
            .unwrap();
        assert_eq!(&program[..3], &[0x4d, 0x2c, 0x01]);
    }

    #[test]
    fn test_integers_are_not_scriptnum_encoded() {
        // scriptnum would add a sign byte: 02 80 00
        let program = StackInstantiator
            .instantiate(&with_slots(1), &[Argument::Integer(128)])
            .unwrap();
        assert_eq!(&program[..2], &[0x01, 0x80]);
    }

    #[test]
    fn test_pushdata4_framing() {
        let data = vec![9; 0x1_0000];
        let program = StackInstantiator
            .instantiate(&with_slots(1), &[Argument::Bytes(data)])
            .unwrap();
        assert_eq!(&program[..5], &[0x4e, 0x00, 0x00, 0x01, 0x00]);
        assert_eq!(program.len(), 5 + 0x1_0000 + 2);
    }

    #[test]
    fn test_arity_mismatch() {
        let result = StackInstantiator.instantiate(&with_slots(2), &[Argument::Integer(5)]);
        assert_eq!(
            result,
            Err(InstantiateError::ArityMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_uncompiled_template_refused() {
        let template = TemplateModel::empty("src", "Only 1 contract expression allowed.");
        assert!(matches!(
            StackInstantiator.instantiate(&template, &[]),
            Err(InstantiateError::Uncompiled(_))
        ));
        let no_body = TemplateModel::default();
        assert_eq!(
            StackInstantiator.instantiate(&no_body, &[]),
            Err(InstantiateError::EmptyProgram)
        );
    }

    #[test]
    fn test_lock_program_deterministic() {
        let template = trade_template();
        let inputs = bound_trade_inputs();
        let first = lock_program(&template, &inputs, &DefaultCodec, &StackInstantiator)
            .unwrap()
            .unwrap();
        let second = lock_program(&template, &inputs, &DefaultCodec, &StackInstantiator)
            .unwrap()
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(first.hex(), hex::encode(first.as_bytes()));
        assert!(first.as_bytes().ends_with(&template.program));
    }

    #[test]
    fn test_lock_program_not_ready() {
        let template = trade_template();
        let inputs = InputRegistry::for_contract(&template);
        let program = lock_program(&template, &inputs, &DefaultCodec, &StackInstantiator).unwrap();
        assert!(program.is_none());
    }

    #[test]
    fn test_address_generation() {
        let program = ControlProgram::instantiate(&body_only(), &[], &StackInstantiator).unwrap();
        let address = program.address(&elements::AddressParams::ELEMENTS);
        assert!(address.to_string().starts_with("ert1q"));
        assert_eq!(address.script_pubkey(), program.script().to_v0_p2wsh());
    }
}
