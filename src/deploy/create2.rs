//! Content-addressed (CREATE2) address computation.
//!
//! Both proxy factories in this crate assign addresses the same way:
//! `last20(keccak256(0xff ++ deployer ++ salt ++ keccak256(init_code)))`,
//! with a salt derived from the initializer call data and a caller-chosen
//! nonce. Any deviation in byte layout, endianness, or hashing order breaks
//! every downstream idempotency check, so the formulas live here in one place.

use alloy_primitives::{keccak256, Address, B256, U256};

/// 19-byte minimal-proxy creation prefix; the mastercopy address follows.
const PROXY_CREATION_PREFIX: [u8; 19] = [
    0x60, 0x2d, 0x80, 0x60, 0x09, 0x3d, 0x39, 0x3d, 0xf3, 0x36, 0x3d, 0x3d, 0x37, 0x3d, 0x3d,
    0x3d, 0x36, 0x3d, 0x73,
];
/// 15-byte minimal-proxy creation suffix.
const PROXY_CREATION_SUFFIX: [u8; 15] = [
    0x5a, 0xf4, 0x3d, 0x82, 0x80, 0x3e, 0x90, 0x3d, 0x91, 0x60, 0x2b, 0x57, 0xfd, 0x5b, 0xf3,
];

/// Address a content-addressed deployment from `deployer` will receive.
pub fn create2_address(deployer: Address, salt: B256, init_code_hash: B256) -> Address {
    let mut preimage = Vec::with_capacity(1 + 20 + 32 + 32);
    preimage.push(0xff);
    preimage.extend_from_slice(deployer.as_slice());
    preimage.extend_from_slice(salt.as_slice());
    preimage.extend_from_slice(init_code_hash.as_slice());
    Address::from_slice(&keccak256(&preimage)[12..])
}

/// Salt both proxy factories derive from initializer call data and a
/// caller-chosen nonce: `keccak256(keccak256(init_data) ++ uint256(salt_nonce))`.
pub fn initializer_salt(init_data: &[u8], salt_nonce: U256) -> B256 {
    let mut preimage = Vec::with_capacity(64);
    preimage.extend_from_slice(keccak256(init_data).as_slice());
    preimage.extend_from_slice(&salt_nonce.to_be_bytes::<32>());
    keccak256(&preimage)
}

/// Creation bytecode of a minimal proxy forwarding every call to `mastercopy`:
/// the fixed prefix, the raw 20-byte address, the fixed suffix.
pub fn minimal_proxy_init_code(mastercopy: Address) -> Vec<u8> {
    let mut init_code =
        Vec::with_capacity(PROXY_CREATION_PREFIX.len() + 20 + PROXY_CREATION_SUFFIX.len());
    init_code.extend_from_slice(&PROXY_CREATION_PREFIX);
    init_code.extend_from_slice(mastercopy.as_slice());
    init_code.extend_from_slice(&PROXY_CREATION_SUFFIX);
    init_code
}
