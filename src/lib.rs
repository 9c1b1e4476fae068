//! Ivylock - instantiate Ivy contract templates and derive their spends
//!
//! This crate turns a compiled contract template plus user-supplied
//! parameter values into the control program that locks value under the
//! contract, and derives the witness skeleton and output actions needed to
//! spend it later through one of its clauses.
//!
//! Two failure policies are kept apart on purpose. Gaps in user input are
//! absorbed: binding yields no arguments and the contract is simply not
//! ready. Broken references that must exist by construction raise a
//! [`ConsistencyError`].
//!
//! # Example
//!
//! ```ignore
//! use ivylock::{Contract, DefaultCodec, InputRegistry, SpendBuilder, StackInstantiator};
//!
//! // Bind parameters for a compiled template
//! let mut inputs = InputRegistry::for_contract(&template);
//! inputs.set_value(&ParameterPath::contract("publicKey"), pubkey_hex)?;
//!
//! // Lock a contract and get its control program
//! let contract = Contract::create(Arc::new(template), inputs, &DefaultCodec, &StackInstantiator)?;
//! let program = contract.control_program().hex();
//!
//! // Derive the spend for the selected clause
//! let request = SpendBuilder::new(&contract).build()?;
//! ```

pub mod address;
pub mod bind;
pub mod codec;
pub mod compiler;
#[cfg(feature = "config")]
pub mod config;
pub mod contract;
pub mod error;
pub mod input;
pub mod path;
pub mod program;
pub mod spend;
pub mod template;
pub mod validate;
pub mod witness;

#[cfg(test)]
mod test_fixtures;

// Re-export core types
pub use bind::{bind_arguments, try_bind_arguments};
pub use codec::{Argument, DefaultCodec, InputCodec};
pub use compiler::{load_template, TemplateCompiler};
pub use contract::{ClauseSelector, Contract};
pub use error::{
    CompilationFault, ConsistencyError, ContractError, InputError, InstantiateError, SpendError,
};
pub use input::{InputEntry, InputKind, InputRegistry, KeyRef};
pub use path::{ParameterId, ParameterPath, SubField};
pub use program::{lock_program, ControlProgram, Instantiate, StackInstantiator};
pub use spend::{OutputAction, Receiver, SpendBuilder, SpendFromAccount, SpendRequest};
pub use template::{Clause, ClauseOutput, Parameter, TemplateModel, ValueType};
pub use witness::{KeyId, WitnessBuilder, WitnessComponent};

// Re-export config when feature is enabled
#[cfg(feature = "config")]
pub use config::{Config, ConfigError, Network};

// Re-export commonly used external types
pub use elements;
