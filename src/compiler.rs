//! Template compilation front-end
//!
//! The compiler itself lives elsewhere. This module runs the structural
//! checks that come before it, resolves `import` lines against a library
//! of known templates, and folds every failure into an empty template that
//! carries the fault message.

use crate::error::CompilationFault;
use crate::template::TemplateModel;
use std::collections::BTreeMap;

const MISPLACED_IMPORT: &str = "All import statements should appear before contract expression.";
const MULTIPLE_CONTRACTS: &str = "Only 1 contract expression allowed.";

/// External compiler turning contract source into a template
pub trait TemplateCompiler {
    /// Compile `source`, reporting a fault message on failure
    ///
    /// # Errors
    ///
    /// Returns the compiler's error message.
    fn compile(&self, source: &str) -> Result<TemplateModel, String>;
}

impl<F> TemplateCompiler for F
where
    F: Fn(&str) -> Result<TemplateModel, String>,
{
    fn compile(&self, source: &str) -> Result<TemplateModel, String> {
        self(source)
    }
}

/// Compile `source`, resolving imports from `library`
///
/// Never fails: a fault is reported through [`TemplateModel::error`] on an
/// otherwise empty template. The returned template keeps the original,
/// unexpanded source.
pub fn load_template<C: TemplateCompiler>(
    compiler: &C,
    source: &str,
    library: &BTreeMap<String, String>,
) -> TemplateModel {
    match compile_checked(compiler, source, library) {
        Ok(template) => template,
        Err(CompilationFault(message)) => {
            tracing::warn!(error = %message, "template failed to compile");
            TemplateModel::empty(source, message)
        }
    }
}

fn compile_checked<C: TemplateCompiler>(
    compiler: &C,
    source: &str,
    library: &BTreeMap<String, String>,
) -> Result<TemplateModel, CompilationFault> {
    check_structure(source)?;
    let expanded = expand_imports(source, library)?;
    let mut template = compiler.compile(&expanded).map_err(CompilationFault)?;
    template.source = source.to_string();
    template.error = None;
    Ok(template)
}

/// Reject sources with a misplaced import or more than one contract
///
/// # Errors
///
/// Returns the fault describing the first structural problem found.
pub fn check_structure(source: &str) -> Result<(), CompilationFault> {
    let contracts = keyword_offsets(source, "contract");
    if let Some(first) = contracts.first() {
        if keyword_offsets(source, "import")
            .iter()
            .any(|offset| offset > first)
        {
            return Err(CompilationFault(MISPLACED_IMPORT.into()));
        }
    }
    if contracts.len() > 1 {
        return Err(CompilationFault(MULTIPLE_CONTRACTS.into()));
    }
    Ok(())
}

/// Replace each `import Name` line with the library source for `Name`
fn expand_imports(source: &str, library: &BTreeMap<String, String>) -> Result<String, CompilationFault> {
    let mut expanded = Vec::new();
    for line in source.lines() {
        let trimmed = line.trim_start();
        match trimmed.strip_prefix("import") {
            Some(rest) if rest.starts_with(char::is_whitespace) => {
                let name = rest.trim();
                let imported = library
                    .get(name)
                    .ok_or_else(|| CompilationFault(format!("Unknown import: {name}")))?;
                expanded.push(imported.as_str());
            }
            _ => expanded.push(line),
        }
    }
    Ok(expanded.join("\n"))
}

/// Byte offsets of `word` appearing as a whole identifier
fn keyword_offsets(source: &str, word: &str) -> Vec<usize> {
    let is_ident = |c: char| c.is_alphanumeric() || c == '_';
    source
        .match_indices(word)
        .filter(|(offset, _)| {
            let before = source[..*offset].chars().next_back();
            let after = source[offset + word.len()..].chars().next();
            !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
        })
        .map(|(offset, _)| offset)
        .collect()
}
