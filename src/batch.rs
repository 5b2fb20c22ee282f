//! Packed multi-transaction batch codec.
//!
//! Each transaction packs into a fixed-layout record — operation byte,
//! 20-byte target, 32-byte big-endian value, 32-byte big-endian payload
//! length, payload — concatenated in list order with no padding or
//! separators. The concatenation becomes the single `bytes` argument of a
//! `multiSend(bytes)` call against one of the two deployed dispatcher
//! contracts.

use alloy_primitives::{address, Address, Bytes, U256};

use crate::abi::{self, AbiValue, CallEncoder};
use crate::domain::{MetaTransaction, Operation};
use crate::error::Error;

/// Dispatcher that re-dispatches records as calls or delegate-calls.
pub const MULTISEND_ADDRESS: Address = address!("38869bf66a61cf6bdb996a6ae40d5853fd43b526");
/// Dispatcher restricted to plain calls.
pub const MULTISEND_CALL_ONLY_ADDRESS: Address =
    address!("9641d764fc13c8b624c04430c7356c1c7c8102e2");

const MULTI_SEND_SIGNATURE: &str = "multiSend(bytes)";
/// Fixed bytes of a record before its payload: opcode, target, value word,
/// length word.
const RECORD_HEADER_LEN: usize = 1 + 20 + 32 + 32;

/// Pack `transactions` into a single dispatch transaction.
///
/// `dispatcher` defaults to the delegate-call-capable dispatcher when any
/// input requests delegate-call semantics and to the call-only dispatcher
/// otherwise. The wrapper always carries `value = 0` and
/// `operation = DelegateCall`, independent of the inputs' own metadata. An
/// empty input packs to a valid zero-length payload.
pub fn encode_multi(
    encoder: &dyn CallEncoder,
    transactions: &[MetaTransaction],
    dispatcher: Option<Address>,
) -> Result<MetaTransaction, Error> {
    let dispatcher = dispatcher.unwrap_or_else(|| default_dispatcher(transactions));
    let mut packed = Vec::new();
    for transaction in transactions {
        pack_transaction(&mut packed, transaction);
    }
    let data = encoder.encode_call(MULTI_SEND_SIGNATURE, &[AbiValue::Bytes(packed.into())])?;
    Ok(MetaTransaction {
        to: dispatcher,
        value: U256::ZERO,
        data,
        operation: Operation::DelegateCall,
    })
}

/// Decode a packed batch payload back into its transaction list.
///
/// Decoding is all-or-nothing: a header truncated mid-record, a length field
/// claiming more bytes than remain, or leftover trailing bytes after the last
/// record all fail with [`Error::MalformedBatch`] and return no transactions.
pub fn decode_multi(packed: &[u8]) -> Result<Vec<MetaTransaction>, Error> {
    let mut transactions = Vec::new();
    let mut offset = 0usize;
    while offset < packed.len() {
        let remaining = packed.len() - offset;
        if remaining < RECORD_HEADER_LEN {
            return Err(Error::MalformedBatch(format!(
                "record header at byte {offset} needs {RECORD_HEADER_LEN} bytes, {remaining} remain"
            )));
        }
        let operation = Operation::try_from(packed[offset]).map_err(|opcode| {
            Error::MalformedBatch(format!("unknown operation opcode {opcode} at byte {offset}"))
        })?;
        let to = Address::from_slice(&packed[offset + 1..offset + 21]);
        let value = U256::from_be_slice(&packed[offset + 21..offset + 53]);
        let data_len = usize::try_from(U256::from_be_slice(&packed[offset + 53..offset + 85]))
            .map_err(|_| {
                Error::MalformedBatch(format!(
                    "record at byte {offset} declares an oversized payload length"
                ))
            })?;
        let data_start = offset + RECORD_HEADER_LEN;
        if data_len > packed.len() - data_start {
            return Err(Error::MalformedBatch(format!(
                "record at byte {offset} declares {data_len} payload bytes, {} remain",
                packed.len() - data_start
            )));
        }
        transactions.push(MetaTransaction {
            to,
            value,
            data: Bytes::from(packed[data_start..data_start + data_len].to_vec()),
            operation,
        });
        offset = data_start + data_len;
    }
    Ok(transactions)
}

/// Decode a full dispatch calldata blob: verify the `multiSend(bytes)`
/// selector, unwrap the payload argument, then decode the packed records.
pub fn decode_multi_calldata(calldata: &[u8]) -> Result<Vec<MetaTransaction>, Error> {
    let packed = abi::decode_call_bytes_arg(calldata, MULTI_SEND_SIGNATURE)
        .map_err(|error| Error::MalformedBatch(format!("dispatch calldata rejected: {error}")))?;
    decode_multi(&packed)
}

/// Whether `raw` names one of the two known dispatcher contracts. The
/// comparison is case-insensitive on the textual hex form; unparseable input
/// is simply not a dispatcher.
pub fn is_dispatch_target(raw: &str) -> bool {
    raw.trim()
        .parse::<Address>()
        .map(|address| address == MULTISEND_ADDRESS || address == MULTISEND_CALL_ONLY_ADDRESS)
        .unwrap_or(false)
}

fn default_dispatcher(transactions: &[MetaTransaction]) -> Address {
    let needs_delegate_call = transactions
        .iter()
        .any(|tx| tx.operation == Operation::DelegateCall);
    if needs_delegate_call {
        MULTISEND_ADDRESS
    } else {
        MULTISEND_CALL_ONLY_ADDRESS
    }
}

fn pack_transaction(out: &mut Vec<u8>, transaction: &MetaTransaction) {
    out.push(transaction.operation.opcode());
    out.extend_from_slice(transaction.to.as_slice());
    out.extend_from_slice(&transaction.value.to_be_bytes::<32>());
    out.extend_from_slice(&U256::from(transaction.data.len()).to_be_bytes::<32>());
    out.extend_from_slice(&transaction.data);
}
