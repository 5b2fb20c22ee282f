//! Wallet-side deployment operations and the module-enablement planner.
//!
//! The planner reconciles the desired end state — role module deployed and
//! enabled on the wallet — against externally observed chain state and emits
//! only the transactions still missing, so replaying a plan is always safe.

use alloy_primitives::{address, keccak256, Address, Bytes, U256};
use futures::future;

use crate::abi::{self, AbiValue, CallEncoder};
use crate::chain::ChainStateReader;
use crate::deploy::{create2, roles};
use crate::domain::MetaTransaction;
use crate::error::Error;

/// Factory deploying wallet proxies at deterministic addresses.
pub const WALLET_PROXY_FACTORY_ADDRESS: Address =
    address!("4e1dcf7ad4e460cfd30791ccc4f9c8a4f820ec67");
/// Singleton implementation every wallet proxy forwards to.
pub const WALLET_SINGLETON_ADDRESS: Address = address!("41675c099f32341bf84bfc5382af534df5c7461a");

const SETUP_SIGNATURE: &str =
    "setup(address[],uint256,address,bytes,address,address,uint256,address)";
const ENABLE_MODULE_SIGNATURE: &str = "enableModule(address)";
const CREATE_PROXY_SIGNATURE: &str = "createProxyWithNonce(address,bytes,uint256)";
const PROXY_CREATION_CODE_SIGNATURE: &str = "proxyCreationCode()";

/// Wallet transaction enabling `module` on `wallet`.
pub fn build_enable_module_tx(
    encoder: &dyn CallEncoder,
    wallet: Address,
    module: Address,
) -> Result<MetaTransaction, Error> {
    let data = encoder.encode_call(ENABLE_MODULE_SIGNATURE, &[AbiValue::Address(module)])?;
    Ok(MetaTransaction::call(wallet, data))
}

/// Singleton `setup(...)` call data for an owner set and signature threshold,
/// with no fallback handler or payment configuration.
pub fn wallet_setup_data(
    encoder: &dyn CallEncoder,
    owners: &[Address],
    threshold: U256,
) -> Result<Bytes, Error> {
    encoder.encode_call(
        SETUP_SIGNATURE,
        &[
            AbiValue::Array(owners.iter().map(|owner| AbiValue::Address(*owner)).collect()),
            AbiValue::Uint(threshold),
            AbiValue::Address(Address::ZERO),
            AbiValue::Bytes(Bytes::new()),
            AbiValue::Address(Address::ZERO),
            AbiValue::Address(Address::ZERO),
            AbiValue::Uint(U256::ZERO),
            AbiValue::Address(Address::ZERO),
        ],
    )
}

/// Factory transaction deploying the wallet proxy for this owner set,
/// threshold, and salt nonce.
pub fn build_wallet_deployment_tx(
    encoder: &dyn CallEncoder,
    owners: &[Address],
    threshold: U256,
    salt_nonce: U256,
) -> Result<MetaTransaction, Error> {
    let setup_data = wallet_setup_data(encoder, owners, threshold)?;
    let data = encoder.encode_call(
        CREATE_PROXY_SIGNATURE,
        &[
            AbiValue::Address(WALLET_SINGLETON_ADDRESS),
            AbiValue::Bytes(setup_data),
            AbiValue::Uint(salt_nonce),
        ],
    )?;
    Ok(MetaTransaction::call(WALLET_PROXY_FACTORY_ADDRESS, data))
}

/// Future address of the wallet proxy the factory will assign for this owner
/// set, threshold, and salt nonce.
///
/// The factory's creation bytecode is the one piece of external state; it is
/// read once per call and everything else is a pure function of the inputs.
pub async fn wallet_proxy_address(
    reader: &dyn ChainStateReader,
    encoder: &dyn CallEncoder,
    owners: &[Address],
    threshold: U256,
    salt_nonce: U256,
) -> Result<Address, Error> {
    let creation_code = proxy_creation_code(reader, encoder).await?;
    let setup_data = wallet_setup_data(encoder, owners, threshold)?;
    let salt = create2::initializer_salt(&setup_data, salt_nonce);

    // Factory init code: reported creation bytecode with the singleton
    // appended as a 32-byte big-endian word.
    let mut init_code = creation_code;
    init_code.extend_from_slice(
        &U256::from_be_slice(WALLET_SINGLETON_ADDRESS.as_slice()).to_be_bytes::<32>(),
    );
    Ok(create2::create2_address(
        WALLET_PROXY_FACTORY_ADDRESS,
        salt,
        keccak256(&init_code),
    ))
}

/// Minimal transaction list that leaves `wallet` with its role module
/// deployed and enabled.
///
/// The two chain-state reads run concurrently and are joined; both must
/// succeed or the whole call fails with the first error (no partial plan, no
/// retries). When both transactions are needed the deploy precedes the
/// enable; that ordering is an output-determinism convention, not an on-chain
/// dependency.
pub async fn plan_module_enablement(
    reader: &dyn ChainStateReader,
    encoder: &dyn CallEncoder,
    wallet: Address,
    salt_nonce: U256,
) -> Result<Vec<MetaTransaction>, Error> {
    let setup_data = roles::module_setup_data(encoder, wallet)?;
    let module_address = roles::module_proxy_address(&setup_data, salt_nonce);
    let deploy_tx = roles::build_deploy_module_tx(encoder, wallet, salt_nonce)?;
    let enable_tx = build_enable_module_tx(encoder, wallet, module_address)?;

    let (code, enabled) = future::try_join(
        reader.code_at(module_address),
        reader.enabled_modules(wallet),
    )
    .await?;

    let is_deployed = !code.is_empty();
    let is_enabled = enabled.contains(&module_address);
    tracing::debug!(module = %module_address, is_deployed, is_enabled, "reconciled module state");

    let mut plan = Vec::new();
    if !is_deployed {
        plan.push(deploy_tx);
    }
    if !is_enabled {
        plan.push(enable_tx);
    }
    Ok(plan)
}

/// Creation bytecode the wallet proxy factory reports for its proxies.
async fn proxy_creation_code(
    reader: &dyn ChainStateReader,
    encoder: &dyn CallEncoder,
) -> Result<Vec<u8>, Error> {
    let calldata = encoder.encode_call(PROXY_CREATION_CODE_SIGNATURE, &[])?;
    let output = reader
        .call(WALLET_PROXY_FACTORY_ADDRESS, calldata)
        .await?;
    abi::decode_bytes_result(&output)
}
