//! Role-module deployment and permission configuration.
//!
//! Every builder here is a stateless projection from fully-resolved
//! parameters to a [`MetaTransaction`] targeting the module (or, for
//! deployment, the module proxy factory), with the ABI encoding delegated to
//! an injected [`CallEncoder`]. Builders perform no cross-field validation —
//! array-length agreement and similar input contracts belong to the caller,
//! exactly like the on-chain functions they mirror.

use alloy_primitives::{address, keccak256, Address, Bytes, B256, U256};

use crate::abi::{AbiValue, CallEncoder};
use crate::deploy::create2;
use crate::domain::{AllowanceConfig, ConditionList, ExecutionOptions, MetaTransaction, RoleKey};
use crate::error::Error;

/// Singleton factory that clones module mastercopies at deterministic
/// addresses.
pub const MODULE_PROXY_FACTORY_ADDRESS: Address =
    address!("000000000000addb49795b0f9ba5bc298cdda236");
/// Mastercopy every module clone forwards to.
pub const ROLES_MASTERCOPY_ADDRESS: Address = address!("9646fdad06d3e24444381f44362a3b0eb343d337");

const SET_UP_SIGNATURE: &str = "setUp(bytes)";
const DEPLOY_MODULE_SIGNATURE: &str = "deployModule(address,bytes,uint256)";
const ALLOW_TARGET_SIGNATURE: &str = "allowTarget(bytes32,address,uint8)";
const SCOPE_TARGET_SIGNATURE: &str = "scopeTarget(bytes32,address)";
const ALLOW_FUNCTION_SIGNATURE: &str = "allowFunction(bytes32,address,bytes4,uint8)";
const SCOPE_FUNCTION_SIGNATURE: &str =
    "scopeFunction(bytes32,address,bytes4,(uint8,uint8,uint8,bytes)[],uint8)";
const REVOKE_TARGET_SIGNATURE: &str = "revokeTarget(bytes32,address)";
const REVOKE_FUNCTION_SIGNATURE: &str = "revokeFunction(bytes32,address,bytes4)";
const ASSIGN_ROLES_SIGNATURE: &str = "assignRoles(address,bytes32[],bool[])";
const SET_ALLOWANCE_SIGNATURE: &str =
    "setAllowance(bytes32,uint128,uint128,uint128,uint64,uint64)";

/// `setUp(bytes)` call data initializing a module clone with the wallet as
/// owner, avatar, and target.
pub fn module_setup_data(encoder: &dyn CallEncoder, wallet: Address) -> Result<Bytes, Error> {
    let init_params = encoder.encode_params(&[
        AbiValue::Address(wallet),
        AbiValue::Address(wallet),
        AbiValue::Address(wallet),
    ])?;
    encoder.encode_call(SET_UP_SIGNATURE, &[AbiValue::Bytes(init_params)])
}

/// Future address of the module clone the proxy factory will assign for this
/// setup data and salt nonce. Pure; must match the factory bit for bit.
pub fn module_proxy_address(setup_data: &[u8], salt_nonce: U256) -> Address {
    let salt = create2::initializer_salt(setup_data, salt_nonce);
    let init_code = create2::minimal_proxy_init_code(ROLES_MASTERCOPY_ADDRESS);
    create2::create2_address(MODULE_PROXY_FACTORY_ADDRESS, salt, keccak256(&init_code))
}

/// Factory transaction deploying the wallet's module clone.
pub fn build_deploy_module_tx(
    encoder: &dyn CallEncoder,
    wallet: Address,
    salt_nonce: U256,
) -> Result<MetaTransaction, Error> {
    let setup_data = module_setup_data(encoder, wallet)?;
    let data = encoder.encode_call(
        DEPLOY_MODULE_SIGNATURE,
        &[
            AbiValue::Address(ROLES_MASTERCOPY_ADDRESS),
            AbiValue::Bytes(setup_data),
            AbiValue::Uint(salt_nonce),
        ],
    )?;
    Ok(MetaTransaction::call(MODULE_PROXY_FACTORY_ADDRESS, data))
}

/// Permit a role to call any function on `target`.
pub fn build_allow_target_tx(
    encoder: &dyn CallEncoder,
    module: Address,
    role_key: RoleKey,
    target: Address,
    options: ExecutionOptions,
) -> Result<MetaTransaction, Error> {
    let data = encoder.encode_call(
        ALLOW_TARGET_SIGNATURE,
        &[
            role_key_value(role_key),
            AbiValue::Address(target),
            options_value(options),
        ],
    )?;
    Ok(MetaTransaction::call(module, data))
}

/// Restrict a role's access to `target` to explicitly scoped functions.
pub fn build_scope_target_tx(
    encoder: &dyn CallEncoder,
    module: Address,
    role_key: RoleKey,
    target: Address,
) -> Result<MetaTransaction, Error> {
    let data = encoder.encode_call(
        SCOPE_TARGET_SIGNATURE,
        &[role_key_value(role_key), AbiValue::Address(target)],
    )?;
    Ok(MetaTransaction::call(module, data))
}

/// Permit a role to call one function on `target` without argument
/// conditions.
pub fn build_allow_function_tx(
    encoder: &dyn CallEncoder,
    module: Address,
    role_key: RoleKey,
    target: Address,
    function_selector: [u8; 4],
    options: ExecutionOptions,
) -> Result<MetaTransaction, Error> {
    let data = encoder.encode_call(
        ALLOW_FUNCTION_SIGNATURE,
        &[
            role_key_value(role_key),
            AbiValue::Address(target),
            selector_value(function_selector),
            options_value(options),
        ],
    )?;
    Ok(MetaTransaction::call(module, data))
}

/// Permit a role to call one function on `target` under a condition tree.
pub fn build_scope_function_tx(
    encoder: &dyn CallEncoder,
    module: Address,
    role_key: RoleKey,
    target: Address,
    function_selector: [u8; 4],
    conditions: &ConditionList,
    options: ExecutionOptions,
) -> Result<MetaTransaction, Error> {
    let condition_values = conditions
        .nodes()
        .iter()
        .map(|node| {
            AbiValue::Tuple(vec![
                AbiValue::Uint(U256::from(node.parent)),
                AbiValue::Uint(U256::from(node.param_type as u8)),
                AbiValue::Uint(U256::from(node.operator as u8)),
                AbiValue::Bytes(node.comp_value.clone()),
            ])
        })
        .collect();
    let data = encoder.encode_call(
        SCOPE_FUNCTION_SIGNATURE,
        &[
            role_key_value(role_key),
            AbiValue::Address(target),
            selector_value(function_selector),
            AbiValue::Array(condition_values),
            options_value(options),
        ],
    )?;
    Ok(MetaTransaction::call(module, data))
}

/// Remove a role's access to `target` entirely.
pub fn build_revoke_target_tx(
    encoder: &dyn CallEncoder,
    module: Address,
    role_key: RoleKey,
    target: Address,
) -> Result<MetaTransaction, Error> {
    let data = encoder.encode_call(
        REVOKE_TARGET_SIGNATURE,
        &[role_key_value(role_key), AbiValue::Address(target)],
    )?;
    Ok(MetaTransaction::call(module, data))
}

/// Remove a role's access to one function on `target`.
pub fn build_revoke_function_tx(
    encoder: &dyn CallEncoder,
    module: Address,
    role_key: RoleKey,
    target: Address,
    function_selector: [u8; 4],
) -> Result<MetaTransaction, Error> {
    let data = encoder.encode_call(
        REVOKE_FUNCTION_SIGNATURE,
        &[
            role_key_value(role_key),
            AbiValue::Address(target),
            selector_value(function_selector),
        ],
    )?;
    Ok(MetaTransaction::call(module, data))
}

/// Grant or revoke role memberships for `member`.
///
/// `role_keys` and `member_of` are encoded exactly as given; keeping the two
/// arrays the same length is the caller's contract, mirroring the on-chain
/// call.
pub fn build_assign_roles_tx(
    encoder: &dyn CallEncoder,
    module: Address,
    member: Address,
    role_keys: &[RoleKey],
    member_of: &[bool],
) -> Result<MetaTransaction, Error> {
    let data = encoder.encode_call(
        ASSIGN_ROLES_SIGNATURE,
        &[
            AbiValue::Address(member),
            AbiValue::Array(role_keys.iter().map(|key| role_key_value(*key)).collect()),
            AbiValue::Array(member_of.iter().map(|flag| AbiValue::Bool(*flag)).collect()),
        ],
    )?;
    Ok(MetaTransaction::call(module, data))
}

/// Create or update a refilling spending allowance under `allowance_key`.
pub fn build_set_allowance_tx(
    encoder: &dyn CallEncoder,
    module: Address,
    allowance_key: B256,
    config: AllowanceConfig,
) -> Result<MetaTransaction, Error> {
    let data = encoder.encode_call(
        SET_ALLOWANCE_SIGNATURE,
        &[
            AbiValue::FixedBytes(Bytes::from(allowance_key.as_slice().to_vec())),
            AbiValue::Uint(U256::from(config.balance)),
            AbiValue::Uint(U256::from(config.max_refill)),
            AbiValue::Uint(U256::from(config.refill)),
            AbiValue::Uint(U256::from(config.period)),
            AbiValue::Uint(U256::from(config.timestamp)),
        ],
    )?;
    Ok(MetaTransaction::call(module, data))
}

fn role_key_value(role_key: RoleKey) -> AbiValue {
    AbiValue::FixedBytes(Bytes::from(role_key.as_bytes().to_vec()))
}

fn selector_value(function_selector: [u8; 4]) -> AbiValue {
    AbiValue::FixedBytes(Bytes::from(function_selector.to_vec()))
}

fn options_value(options: ExecutionOptions) -> AbiValue {
    AbiValue::Uint(U256::from(options as u8))
}
