use thiserror::Error;

/// Crate-wide error type.
///
/// Messages keep the lowercase, self-describing shape used across the crate so
/// callers can surface them verbatim; the variants exist so callers can match
/// on the kind without parsing text.
#[derive(Debug, Error)]
pub enum Error {
    /// A condition node's parent index does not precede the node's own
    /// position, or node 0 is not its own root.
    #[error("condition node {index} has invalid parent index {parent}")]
    InvalidConditionIndex { index: usize, parent: u8 },

    /// Chain id absent from the static chain-id-to-network table.
    #[error("unsupported chain id {0}")]
    UnsupportedChain(u64),

    /// The external chain-state collaborator returned a non-success result.
    /// Surfaced unchanged; retry policy belongs to the caller.
    #[error("chain state query failed: {0}")]
    ChainQuery(String),

    /// A packed batch payload that cannot be decoded in full. Decoding is
    /// all-or-nothing; no partial transaction list accompanies this error.
    #[error("malformed batch payload: {0}")]
    MalformedBatch(String),

    /// The ABI-encode capability rejected its input.
    #[error("abi encoding failed: {0}")]
    AbiEncode(String),

    /// Returned bytes did not follow the expected ABI layout.
    #[error("abi decoding failed: {0}")]
    AbiDecode(String),
}
