use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the batch dispatcher re-dispatches a packed transaction.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum Operation {
    #[default]
    Call = 0,
    DelegateCall = 1,
}

impl Operation {
    /// Wire opcode used by the packed record layout.
    pub fn opcode(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Operation {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, u8> {
        match raw {
            0 => Ok(Operation::Call),
            1 => Ok(Operation::DelegateCall),
            other => Err(other),
        }
    }
}

/// A single wallet-relative transaction: target, attached value, call data,
/// and dispatch operation. Value type, never mutated after construction.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MetaTransaction {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub operation: Operation,
}

impl MetaTransaction {
    /// Zero-value plain call, the shape every builder in this crate produces.
    pub fn call(to: Address, data: Bytes) -> Self {
        Self {
            to,
            value: U256::ZERO,
            data,
            operation: Operation::Call,
        }
    }
}

/// Constrains whether a permitted call may transfer value, delegate-call, or
/// both. Discriminants mirror the deployed role-module contract.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum ExecutionOptions {
    #[default]
    None = 0,
    Send = 1,
    DelegateCall = 2,
    Both = 3,
}

/// 32-byte role identifier, derived once from a human-readable role name and
/// treated as opaque in every role-scoped call afterwards.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct RoleKey(pub B256);

impl RoleKey {
    /// Derive the key for `name`: `keccak256(utf8(name))`.
    pub fn from_name(name: &str) -> Self {
        Self(keccak256(name.as_bytes()))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0 .0
    }
}

impl From<B256> for RoleKey {
    fn from(digest: B256) -> Self {
        Self(digest)
    }
}

impl fmt::Display for RoleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parameters of a periodically refilling spending allowance. Field widths
/// follow the on-chain call the builder encodes.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct AllowanceConfig {
    pub balance: u128,
    pub max_refill: u128,
    pub refill: u128,
    pub period: u64,
    pub timestamp: u64,
}

#[cfg(test)]
mod tests {
    use super::{MetaTransaction, Operation, RoleKey};
    use alloy_primitives::{keccak256, Address, Bytes, U256};

    #[test]
    fn operation_opcode_round_trips() {
        assert_eq!(Operation::try_from(0), Ok(Operation::Call));
        assert_eq!(Operation::try_from(1), Ok(Operation::DelegateCall));
        assert_eq!(Operation::try_from(2), Err(2));
        assert_eq!(Operation::DelegateCall.opcode(), 1);
    }

    #[test]
    fn call_constructor_zeroes_value_and_operation() {
        let tx = MetaTransaction::call(Address::ZERO, Bytes::from(vec![0xab]));
        assert_eq!(tx.value, U256::ZERO);
        assert_eq!(tx.operation, Operation::Call);
    }

    #[test]
    fn role_key_is_keccak_of_raw_name_bytes() {
        let key = RoleKey::from_name("treasury-manager");
        assert_eq!(key.0, keccak256("treasury-manager".as_bytes()));
        assert_eq!(key, RoleKey::from_name("treasury-manager"));
        assert_ne!(key, RoleKey::from_name("treasury-Manager"));
    }
}
