//! Chain-state collaborators.
//!
//! [`ChainStateReader`] is the read-only port consumed by the deployment
//! planner and the wallet address derivation. [`HttpChainStateReader`] backs
//! it with a JSON-RPC endpoint (`eth_getCode`, `eth_call`) and with the
//! per-network wallet transaction service for the enabled-module listing;
//! [`MockChainStateReader`] serves tests. Queries either succeed or surface
//! [`Error::ChainQuery`] unchanged — retry, timeout, and caching policy all
//! belong to callers.

use std::collections::HashMap;
use std::io::Read;
use std::str::FromStr;

use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::abi::{AbiCallEncoder, AbiValue, CallEncoder};
use crate::error::Error;

/// Chain ids with a known wallet transaction-service deployment. Immutable
/// process-wide data; resolution failures happen before any network call.
const CHAIN_NETWORKS: &[(u64, &str)] = &[
    (1, "mainnet"),
    (10, "optimism"),
    (56, "binance"),
    (97, "bsc-testnet"),
    (100, "gnosis-chain"),
    (130, "unichain"),
    (137, "polygon"),
    (146, "sonic"),
    (480, "world-chain"),
    (8453, "base"),
    (42161, "arbitrum"),
    (43113, "avalanche-fuji"),
    (43114, "avalanche"),
    (80001, "polygon-mumbai"),
    (11155111, "sepolia"),
];

const MAX_RESPONSE_BYTES: u64 = 2 * 1024 * 1024;

/// Resolve a chain id to its transaction-service network name.
pub fn network_for_chain(chain_id: u64) -> Result<&'static str, Error> {
    CHAIN_NETWORKS
        .iter()
        .find(|(id, _)| *id == chain_id)
        .map(|(_, network)| *network)
        .ok_or(Error::UnsupportedChain(chain_id))
}

/// Read-only view of external chain state.
#[async_trait(?Send)]
pub trait ChainStateReader {
    /// Deployed bytecode at `address`; empty means not deployed.
    async fn code_at(&self, address: Address) -> Result<Bytes, Error>;

    /// Modules currently enabled on `wallet`.
    async fn enabled_modules(&self, wallet: Address) -> Result<Vec<Address>, Error>;

    /// Execute a read-only call against `to` and return the raw return data.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, Error>;
}

/// [`ChainStateReader`] backed by a JSON-RPC endpoint and the per-network
/// wallet transaction service.
#[derive(Clone, Debug)]
pub struct HttpChainStateReader {
    rpc_url: String,
    service_base_url: String,
}

impl HttpChainStateReader {
    /// Build a reader for `chain_id`, resolving the transaction-service host
    /// from the static network table before any request is made.
    pub fn for_chain(chain_id: u64, rpc_url: impl Into<String>) -> Result<Self, Error> {
        let network = network_for_chain(chain_id)?;
        Ok(Self {
            rpc_url: rpc_url.into(),
            service_base_url: format!(
                "https://safe-transaction-{network}.safe.global/api/v1/safes"
            ),
        })
    }

    /// Override the transaction-service base URL (self-hosted indexers, test
    /// servers). The `/{wallet}/modules/` path is appended per query.
    pub fn with_service_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.service_base_url = base_url.into();
        self
    }

    fn rpc_call(&self, method: &str, params: Value) -> Result<Value, Error> {
        let body = serde_json::to_vec(&json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        }))
        .map_err(|error| {
            Error::ChainQuery(format!("failed to serialize {method} request: {error}"))
        })?;

        tracing::debug!(method, url = %self.rpc_url, "issuing chain state rpc");
        let response = ureq::post(&self.rpc_url)
            .set("content-type", "application/json")
            .send_bytes(&body)
            .map_err(|error| match error {
                ureq::Error::Status(status, _) => {
                    Error::ChainQuery(format!("{method} returned status {status}"))
                }
                ureq::Error::Transport(transport) => {
                    Error::ChainQuery(format!("{method} transport failed: {transport}"))
                }
            })?;

        let raw = read_capped(response.into_reader(), method)?;
        let value: Value = serde_json::from_slice(&raw).map_err(|error| {
            Error::ChainQuery(format!("failed to parse {method} response JSON: {error}"))
        })?;
        if let Some(error) = value.get("error") {
            return Err(Error::ChainQuery(format!(
                "rpc returned error for {method}: {error}"
            )));
        }
        value
            .get("result")
            .cloned()
            .ok_or_else(|| Error::ChainQuery(format!("{method} result was missing")))
    }

    fn rpc_call_hex(&self, method: &str, params: Value) -> Result<Bytes, Error> {
        let result = self.rpc_call(method, params)?;
        let raw = result
            .as_str()
            .ok_or_else(|| Error::ChainQuery(format!("{method} result was not a string")))?;
        parse_hex_blob(raw, method)
    }
}

#[async_trait(?Send)]
impl ChainStateReader for HttpChainStateReader {
    async fn code_at(&self, address: Address) -> Result<Bytes, Error> {
        self.rpc_call_hex("eth_getCode", json!([address, "latest"]))
    }

    async fn enabled_modules(&self, wallet: Address) -> Result<Vec<Address>, Error> {
        let url = format!("{}/{}/modules/", self.service_base_url, wallet);
        tracing::debug!(%url, "fetching enabled modules");
        let response = ureq::get(&url)
            .set("accept", "application/json")
            .call()
            .map_err(|error| match error {
                ureq::Error::Status(status, _) => Error::ChainQuery(format!(
                    "module listing for {wallet} returned status {status}"
                )),
                ureq::Error::Transport(transport) => {
                    Error::ChainQuery(format!("module listing transport failed: {transport}"))
                }
            })?;

        let raw = read_capped(response.into_reader(), "module listing")?;
        let listing: ModuleListing = serde_json::from_slice(&raw).map_err(|error| {
            Error::ChainQuery(format!("failed to decode module listing: {error}"))
        })?;
        listing
            .modules
            .iter()
            .map(|raw| {
                Address::from_str(raw).map_err(|error| {
                    Error::ChainQuery(format!(
                        "module listing contained an invalid address {raw}: {error}"
                    ))
                })
            })
            .collect()
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, Error> {
        self.rpc_call_hex("eth_call", json!([{"to": to, "data": data}, "latest"]))
    }
}

#[derive(Deserialize)]
struct ModuleListing {
    modules: Vec<String>,
}

fn read_capped(reader: impl Read, context: &str) -> Result<Vec<u8>, Error> {
    let mut raw = Vec::new();
    reader
        .take(MAX_RESPONSE_BYTES.saturating_add(1))
        .read_to_end(&mut raw)
        .map_err(|error| {
            Error::ChainQuery(format!("failed to read {context} response body: {error}"))
        })?;
    if u64::try_from(raw.len()).unwrap_or(u64::MAX) > MAX_RESPONSE_BYTES {
        return Err(Error::ChainQuery(format!(
            "{context} response exceeded {MAX_RESPONSE_BYTES} bytes"
        )));
    }
    Ok(raw)
}

fn parse_hex_blob(raw: &str, field: &str) -> Result<Bytes, Error> {
    let trimmed = raw.trim();
    let without_prefix = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| Error::ChainQuery(format!("{field} result must be 0x-prefixed hex")))?;
    hex::decode(without_prefix)
        .map(Bytes::from)
        .map_err(|error| Error::ChainQuery(format!("{field} result is not valid hex: {error}")))
}

/// In-memory [`ChainStateReader`] for tests: fixed code, module, and factory
/// bytecode fixtures, plus per-query failure injection.
#[derive(Clone, Debug, Default)]
pub struct MockChainStateReader {
    code: HashMap<Address, Bytes>,
    modules: Vec<Address>,
    creation_code: Bytes,
    fail_code_at: Option<String>,
    fail_enabled_modules: Option<String>,
}

impl MockChainStateReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_code(mut self, address: Address, code: Bytes) -> Self {
        self.code.insert(address, code);
        self
    }

    pub fn with_enabled_module(mut self, module: Address) -> Self {
        self.modules.push(module);
        self
    }

    pub fn with_creation_code(mut self, creation_code: Bytes) -> Self {
        self.creation_code = creation_code;
        self
    }

    pub fn failing_code_at(mut self, reason: &str) -> Self {
        self.fail_code_at = Some(reason.to_string());
        self
    }

    pub fn failing_enabled_modules(mut self, reason: &str) -> Self {
        self.fail_enabled_modules = Some(reason.to_string());
        self
    }
}

#[async_trait(?Send)]
impl ChainStateReader for MockChainStateReader {
    async fn code_at(&self, address: Address) -> Result<Bytes, Error> {
        if let Some(reason) = &self.fail_code_at {
            return Err(Error::ChainQuery(reason.clone()));
        }
        Ok(self.code.get(&address).cloned().unwrap_or_default())
    }

    async fn enabled_modules(&self, _wallet: Address) -> Result<Vec<Address>, Error> {
        if let Some(reason) = &self.fail_enabled_modules {
            return Err(Error::ChainQuery(reason.clone()));
        }
        Ok(self.modules.clone())
    }

    async fn call(&self, _to: Address, _data: Bytes) -> Result<Bytes, Error> {
        // Answers like the factory's `proxyCreationCode()` getter: the fixture
        // comes back as an ABI-wrapped `bytes` return value.
        AbiCallEncoder.encode_params(&[AbiValue::Bytes(self.creation_code.clone())])
    }
}
