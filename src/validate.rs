//! Readiness checks for bound parameters

use crate::codec::InputCodec;
use crate::input::{InputKind, InputRegistry};
use crate::path::{ParameterId, ParameterPath, SubField};
use crate::template::{TemplateModel, ValueType};

/// Paths of every contract parameter `template` requires
#[must_use]
pub fn required_parameters(template: &TemplateModel) -> Vec<ParameterPath> {
    template
        .contract_parameters
        .iter()
        .map(|param| ParameterPath::contract(&param.identifier))
        .collect()
}

/// The required paths that are absent or invalid in `inputs`
///
/// Every path is checked; the result does not stop at the first failure.
pub fn invalid_parameters<C: InputCodec>(
    required: &[ParameterPath],
    inputs: &InputRegistry,
    codec: &C,
) -> Vec<ParameterPath> {
    required
        .iter()
        .filter(|path| {
            let valid = codec.is_valid(path, inputs);
            if !valid {
                tracing::debug!(path = %path, "parameter is missing or invalid");
            }
            !valid
        })
        .cloned()
        .collect()
}

/// Whether every required path maps to a valid entry
pub fn is_valid<C: InputCodec>(required: &[ParameterPath], inputs: &InputRegistry, codec: &C) -> bool {
    invalid_parameters(required, inputs, codec).is_empty()
}

/// Paths in `inputs` that no contract parameter of `template` declares
///
/// A path is declared when it is a contract parameter's own slot or a
/// sub-field its kind carries. Signatures may also carry a key slot.
#[must_use]
pub fn undeclared_entries(template: &TemplateModel, inputs: &InputRegistry) -> Vec<ParameterPath> {
    inputs
        .iter()
        .map(|entry| &entry.path)
        .filter(|path| !is_declared(template, path))
        .cloned()
        .collect()
}

fn is_declared(template: &TemplateModel, path: &ParameterPath) -> bool {
    let ParameterId::Contract(identifier) = &path.id else {
        return false;
    };
    let Some(param) = template.contract_parameter(identifier) else {
        return false;
    };
    match path.field {
        None => true,
        Some(SubField::Key) => param.value_type == ValueType::Signature,
        Some(field) => InputKind::for_type(&param.value_type)
            .sub_fields()
            .iter()
            .any(|(declared, _)| *declared == field),
    }
}
