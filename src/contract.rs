//! Contract instances and clause selection

use crate::codec::InputCodec;
use crate::error::{ConsistencyError, ContractError, InputError};
use crate::input::{InputRegistry, KeyRef};
use crate::path::ParameterId;
use crate::program::{lock_program, ControlProgram, Instantiate};
use crate::template::{Clause, TemplateModel};
use crate::validate::{invalid_parameters, required_parameters, undeclared_entries};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Tracks which clause of a contract is being spent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClauseSelector {
    clause_list: Vec<String>,
    selected: usize,
}

impl ClauseSelector {
    /// Selector over the template's clauses, starting at the first
    #[must_use]
    pub fn new(template: &TemplateModel) -> Self {
        Self {
            clause_list: template.clauses.iter().map(|c| c.name.clone()).collect(),
            selected: 0,
        }
    }

    /// Select the clause at `index`
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range.
    pub fn select(&mut self, index: usize) -> Result<(), ConsistencyError> {
        if index >= self.clause_list.len() {
            return Err(ConsistencyError::ClauseOutOfRange {
                index,
                count: self.clause_list.len(),
            });
        }
        self.selected = index;
        Ok(())
    }

    #[must_use]
    pub const fn selected_index(&self) -> usize {
        self.selected
    }

    /// Name of the selected clause, if the template has any clauses
    #[must_use]
    pub fn selected_name(&self) -> Option<&str> {
        self.clause_list.get(self.selected).map(String::as_str)
    }

    #[must_use]
    pub fn clause_list(&self) -> &[String] {
        &self.clause_list
    }
}

/// A contract locked under an instantiated template
///
/// The contract inputs are fixed at creation. The spend inputs belong to
/// the current spend attempt and are rebuilt whenever another clause is
/// selected.
#[derive(Debug, Clone)]
pub struct Contract {
    template: Arc<TemplateModel>,
    input_map: InputRegistry,
    control_program: ControlProgram,
    selector: ClauseSelector,
    signing_keys: BTreeMap<String, KeyRef>,
    spend_input_map: InputRegistry,
}

impl Contract {
    /// Lock a new contract from a template and its bound inputs
    ///
    /// # Examples
    ///
    /// ```
    /// use ivylock::{Contract, DefaultCodec, InputRegistry, StackInstantiator, TemplateModel};
    /// use std::sync::Arc;
    ///
    /// let template = TemplateModel {
    ///     program: vec![0x51],
    ///     ..TemplateModel::default()
    /// };
    /// let contract = Contract::create(
    ///     Arc::new(template),
    ///     InputRegistry::new(),
    ///     &DefaultCodec,
    ///     &StackInstantiator,
    /// )
    /// .unwrap();
    /// assert_eq!(contract.control_program().hex(), "51");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if an input names a slot the template does not
    /// declare, if a required parameter is missing or invalid, or if the
    /// control program cannot be instantiated.
    pub fn create<C: InputCodec, I: Instantiate>(
        template: Arc<TemplateModel>,
        inputs: InputRegistry,
        codec: &C,
        instantiator: &I,
    ) -> Result<Self, ContractError> {
        let undeclared = undeclared_entries(&template, &inputs);
        if !undeclared.is_empty() {
            tracing::warn!(count = undeclared.len(), "inputs name undeclared parameters");
            return Err(InputError::Undeclared(undeclared).into());
        }
        let invalid = invalid_parameters(&required_parameters(&template), &inputs, codec);
        if !invalid.is_empty() {
            return Err(InputError::NotReady(invalid).into());
        }
        let Some(control_program) = lock_program(&template, &inputs, codec, instantiator)? else {
            return Err(InputError::NotReady(Vec::new()).into());
        };
        let selector = ClauseSelector::new(&template);
        let signing_keys = BTreeMap::new();
        let spend_input_map = template
            .clauses
            .first()
            .map(|clause| InputRegistry::for_clause(clause, &signing_keys))
            .unwrap_or_default();
        tracing::debug!(
            template = %template.name,
            program = %control_program.hex(),
            "contract created"
        );
        Ok(Self {
            template,
            input_map: inputs,
            control_program,
            selector,
            signing_keys,
            spend_input_map,
        })
    }

    #[must_use]
    pub fn template(&self) -> &TemplateModel {
        &self.template
    }

    /// Inputs bound when the contract was locked
    #[must_use]
    pub const fn input_map(&self) -> &InputRegistry {
        &self.input_map
    }

    #[must_use]
    pub const fn control_program(&self) -> &ControlProgram {
        &self.control_program
    }

    #[must_use]
    pub const fn spend_input_map(&self) -> &InputRegistry {
        &self.spend_input_map
    }

    /// Spend inputs of the current attempt, for editing
    pub fn spend_input_map_mut(&mut self) -> &mut InputRegistry {
        &mut self.spend_input_map
    }

    #[must_use]
    pub const fn selector(&self) -> &ClauseSelector {
        &self.selector
    }

    #[must_use]
    pub fn clause_list(&self) -> &[String] {
        self.selector.clause_list()
    }

    #[must_use]
    pub const fn selected_clause_index(&self) -> usize {
        self.selector.selected_index()
    }

    /// Select the clause to spend and start a fresh set of spend inputs
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range.
    pub fn select_clause(&mut self, index: usize) -> Result<(), ConsistencyError> {
        self.selector.select(index)?;
        self.reset_spend_inputs();
        Ok(())
    }

    /// Keys the spender can sign with, keyed by public key hex
    ///
    /// Replacing them starts a fresh set of spend inputs.
    pub fn set_signing_keys(&mut self, keys: BTreeMap<String, KeyRef>) {
        self.signing_keys = keys;
        self.reset_spend_inputs();
    }

    #[must_use]
    pub const fn signing_keys(&self) -> &BTreeMap<String, KeyRef> {
        &self.signing_keys
    }

    fn reset_spend_inputs(&mut self) {
        self.spend_input_map = self
            .template
            .clauses
            .get(self.selector.selected_index())
            .map(|clause| InputRegistry::for_clause(clause, &self.signing_keys))
            .unwrap_or_default();
    }

    /// The template clause currently selected
    ///
    /// # Errors
    ///
    /// Returns an error if the template declares no clauses.
    pub fn selected_clause(&self) -> Result<&Clause, ConsistencyError> {
        let index = self.selector.selected_index();
        self.template
            .clauses
            .get(index)
            .ok_or(ConsistencyError::ClauseOutOfRange {
                index,
                count: self.template.clauses.len(),
            })
    }

    /// Ids of the selected clause's parameters, in declared order
    ///
    /// # Errors
    ///
    /// Returns an error if the template declares no clauses.
    pub fn clause_parameter_ids(&self) -> Result<Vec<ParameterId>, ConsistencyError> {
        let clause = self.selected_clause()?;
        Ok(clause
            .parameters
            .iter()
            .map(|param| ParameterId::clause(&clause.name, &param.identifier))
            .collect())
    }
}
