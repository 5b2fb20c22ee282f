/// Deployment subsystem — deterministic addresses and the transactions that
/// realize them.
///
/// Three focused modules:
///
/// 1. [`create2`] — content-addressed address computation shared by both
///    proxy deployments.
/// 2. [`roles`]   — role-module operations: deploy the module clone and
///    configure role membership, targets, functions, and allowances.
/// 3. [`wallet`]  — wallet-side operations: setup data, proxy address
///    derivation, wallet deployment, module enablement, and the idempotent
///    deployment planner.
pub mod create2;
pub mod roles;
pub mod wallet;

pub use wallet::plan_module_enablement;
