//! Argument binding for control-program instantiation

use crate::codec::{Argument, InputCodec};
use crate::error::InputError;
use crate::input::{InputKind, InputRegistry};
use crate::path::{ParameterPath, SubField};
use crate::template::TemplateModel;

/// Encode the template's data parameters as instantiation arguments
///
/// Arguments come back in push order: the reverse of declaration order.
/// Each asset-amount composite is expanded in place to its asset bytes
/// followed by its amount, and the whole sequence is then reversed, so the
/// pair stays adjacent. `Value` parameters are not embedded and are skipped.
///
/// # Errors
///
/// Returns the first missing or malformed input encountered.
pub fn try_bind_arguments<C: InputCodec>(
    template: &TemplateModel,
    inputs: &InputRegistry,
    codec: &C,
) -> Result<Vec<Argument>, InputError> {
    let mut arguments = Vec::with_capacity(template.argument_slots());
    for param in template.data_parameters() {
        let path = ParameterPath::contract(&param.identifier);
        let entry = inputs.require(&path)?;
        if entry.kind == InputKind::AssetAmount {
            arguments.push(codec.decode(&path.with_field(SubField::Asset), inputs)?);
            arguments.push(codec.decode(&path.with_field(SubField::Amount), inputs)?);
        } else {
            arguments.push(codec.decode(&path, inputs)?);
        }
    }
    arguments.reverse();
    Ok(arguments)
}

/// Encode instantiation arguments, or nothing if any input is not ready
///
/// Any failure yields an empty sequence, never a partial one.
pub fn bind_arguments<C: InputCodec>(
    template: &TemplateModel,
    inputs: &InputRegistry,
    codec: &C,
) -> Vec<Argument> {
    match try_bind_arguments(template, inputs, codec) {
        Ok(arguments) => arguments,
        Err(e) => {
            tracing::debug!(template = %template.name, error = %e, "parameters not ready");
            Vec::new()
        }
    }
}
