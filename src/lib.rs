//! Deterministic deployment planning for a multisig wallet and its
//! role-permission module.
//!
//! The crate packs ordered transaction batches into the dispatch contract's
//! payload format ([`batch`]), derives the future addresses of proxy-clone
//! deployments before they exist ([`deploy::create2`]), builds the
//! permission-configuration transactions of the role module
//! ([`deploy::roles`]), and reconciles desired end state against observed
//! chain state into a minimal, idempotent transaction list
//! ([`deploy::wallet`]). Chain reads go through the
//! [`chain::ChainStateReader`] port and ABI encoding through the
//! [`abi::CallEncoder`] port, so both can be swapped per environment.

pub mod abi;
pub mod batch;
pub mod chain;
pub mod deploy;
pub mod domain;
pub mod error;
#[cfg(test)]
mod test_support;

pub use abi::{AbiCallEncoder, AbiValue, CallEncoder};
pub use chain::{ChainStateReader, HttpChainStateReader, MockChainStateReader};
pub use deploy::plan_module_enablement;
pub use domain::{
    AllowanceConfig, ConditionFlat, ConditionList, ExecutionOptions, MetaTransaction, Operation,
    Operator, ParameterType, RoleKey,
};
pub use error::Error;
