//! Solidity ABI call encoding.
//!
//! Transaction builders treat encoding as an injected capability:
//! [`CallEncoder`] is the seam, [`AbiCallEncoder`] the canonical
//! implementation of the standard head/tail layout. Dynamic values (`bytes`,
//! `string`, arrays, tuples with a dynamic member) contribute one 32-byte
//! offset word to the head section and append their payload to the tail;
//! static values are written into the head directly.
//!
//! The decoding helpers cover the two places the crate reads ABI data back:
//! a solitary `bytes` return value and the single `bytes` argument of a
//! dispatch call.

use alloy_primitives::{keccak256, Address, Bytes, U256};

use crate::error::Error;

/// A fully-resolved ABI value.
///
/// `Address`, `Uint`, `Bool`, and `FixedBytes` occupy one 32-byte word;
/// `Bytes`, `String`, and `Array` are dynamic; `Tuple` is dynamic iff any
/// component is.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AbiValue {
    Address(Address),
    Uint(U256),
    Bool(bool),
    /// Left-aligned `bytesN` value, 1..=32 bytes.
    FixedBytes(Bytes),
    Bytes(Bytes),
    String(String),
    Array(Vec<AbiValue>),
    Tuple(Vec<AbiValue>),
}

/// ABI-encode capability consumed by the transaction builders. Opaque to its
/// callers: they hand over a canonical signature and resolved values and use
/// whatever bytes come back.
pub trait CallEncoder {
    /// Encode `args` and prefix the 4-byte selector derived from `signature`.
    fn encode_call(&self, signature: &str, args: &[AbiValue]) -> Result<Bytes, Error>;

    /// Encode `args` without a selector prefix.
    fn encode_params(&self, args: &[AbiValue]) -> Result<Bytes, Error>;
}

/// Canonical [`CallEncoder`] over the standard head/tail layout.
#[derive(Clone, Copy, Debug, Default)]
pub struct AbiCallEncoder;

impl CallEncoder for AbiCallEncoder {
    fn encode_call(&self, signature: &str, args: &[AbiValue]) -> Result<Bytes, Error> {
        let encoded = encode_params_raw(args)?;
        let mut out = Vec::with_capacity(4 + encoded.len());
        out.extend_from_slice(&selector(signature));
        out.extend_from_slice(&encoded);
        Ok(out.into())
    }

    fn encode_params(&self, args: &[AbiValue]) -> Result<Bytes, Error> {
        encode_params_raw(args).map(Bytes::from)
    }
}

/// 4-byte function selector for a canonical signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

// ── Encoding ─────────────────────────────────────────────────────────────────

fn encode_params_raw(values: &[AbiValue]) -> Result<Vec<u8>, Error> {
    // First pass: head section size, so tail offsets can be pre-calculated.
    let mut head_size_words = 0usize;
    for value in values {
        let words = if is_dynamic(value) {
            // Dynamic values each reserve exactly one offset word in the head.
            1
        } else {
            head_words(value)
        };
        head_size_words = head_size_words.saturating_add(words);
    }
    let head_size_bytes = head_size_words.saturating_mul(32);

    let mut heads: Vec<Vec<u8>> = Vec::with_capacity(values.len());
    let mut tails: Vec<Vec<u8>> = Vec::new();
    let mut tail_size_bytes = 0usize;

    for value in values {
        if is_dynamic(value) {
            let tail = encode_dynamic(value)?;
            let offset = head_size_bytes.saturating_add(tail_size_bytes);
            heads.push(encode_u256_word(U256::from(offset)));
            tail_size_bytes = tail_size_bytes.saturating_add(tail.len());
            tails.push(tail);
        } else {
            heads.push(encode_static(value)?);
        }
    }

    let mut out = Vec::with_capacity(head_size_bytes.saturating_add(tail_size_bytes));
    for head in heads {
        out.extend_from_slice(&head);
    }
    for tail in tails {
        out.extend_from_slice(&tail);
    }
    Ok(out)
}

fn is_dynamic(value: &AbiValue) -> bool {
    match value {
        AbiValue::Bytes(_) | AbiValue::String(_) | AbiValue::Array(_) => true,
        AbiValue::Tuple(components) => components.iter().any(is_dynamic),
        _ => false,
    }
}

fn head_words(value: &AbiValue) -> usize {
    match value {
        AbiValue::Tuple(components) => components.iter().map(head_words).sum(),
        _ => 1,
    }
}

fn encode_static(value: &AbiValue) -> Result<Vec<u8>, Error> {
    match value {
        AbiValue::Address(address) => {
            let mut word = vec![0u8; 32];
            word[12..].copy_from_slice(address.as_slice());
            Ok(word)
        }
        AbiValue::Uint(value) => Ok(encode_u256_word(*value)),
        AbiValue::Bool(flag) => Ok(encode_u256_word(U256::from(u8::from(*flag)))),
        AbiValue::FixedBytes(bytes) => {
            if bytes.is_empty() || bytes.len() > 32 {
                return Err(Error::AbiEncode(format!(
                    "fixed bytes width must be in 1..=32, got {}",
                    bytes.len()
                )));
            }
            let mut word = vec![0u8; 32];
            word[..bytes.len()].copy_from_slice(bytes);
            Ok(word)
        }
        AbiValue::Tuple(components) => {
            let mut out = Vec::new();
            for component in components {
                out.extend_from_slice(&encode_static(component)?);
            }
            Ok(out)
        }
        other => Err(Error::AbiEncode(format!(
            "dynamic value cannot be encoded in the head section: {other:?}"
        ))),
    }
}

fn encode_dynamic(value: &AbiValue) -> Result<Vec<u8>, Error> {
    match value {
        AbiValue::Array(elements) => {
            let mut out = encode_u256_word(U256::from(elements.len()));
            out.extend_from_slice(&encode_params_raw(elements)?);
            Ok(out)
        }
        AbiValue::Bytes(bytes) => Ok(encode_length_prefixed(bytes)),
        AbiValue::String(text) => Ok(encode_length_prefixed(text.as_bytes())),
        AbiValue::Tuple(components) => encode_params_raw(components),
        other => Err(Error::AbiEncode(format!(
            "static value cannot be encoded in the tail section: {other:?}"
        ))),
    }
}

/// Length word followed by the payload zero-padded to the next 32-byte
/// boundary; `(32 - len % 32) % 32` handles exact multiples correctly.
fn encode_length_prefixed(bytes: &[u8]) -> Vec<u8> {
    let mut out = encode_u256_word(U256::from(bytes.len()));
    out.extend_from_slice(bytes);
    let padding = (32usize.saturating_sub(bytes.len() % 32)) % 32;
    if padding > 0 {
        out.extend(vec![0u8; padding]);
    }
    out
}

fn encode_u256_word(value: U256) -> Vec<u8> {
    value.to_be_bytes::<32>().to_vec()
}

// ── Decoding ─────────────────────────────────────────────────────────────────

/// Decode a solitary `bytes` return value: offset word, length word, payload.
pub fn decode_bytes_result(output: &[u8]) -> Result<Vec<u8>, Error> {
    let offset = read_usize_word(output, 0, "offset")?;
    let length = read_usize_word(output, offset, "length")?;
    let start = offset.saturating_add(32);
    let remaining = output.len().saturating_sub(start);
    if length > remaining {
        return Err(Error::AbiDecode(format!(
            "bytes payload declares {length} bytes, {remaining} remain"
        )));
    }
    Ok(output[start..start + length].to_vec())
}

/// Extract the single `bytes` argument of a call whose selector must match
/// `signature`.
pub fn decode_call_bytes_arg(calldata: &[u8], signature: &str) -> Result<Vec<u8>, Error> {
    if calldata.len() < 4 {
        return Err(Error::AbiDecode(
            "calldata is shorter than a 4-byte selector".to_string(),
        ));
    }
    if calldata[..4] != selector(signature) {
        return Err(Error::AbiDecode(format!(
            "selector 0x{} does not match {signature}",
            hex::encode(&calldata[..4])
        )));
    }
    decode_bytes_result(&calldata[4..])
}

fn read_usize_word(output: &[u8], at: usize, field: &str) -> Result<usize, Error> {
    let end = at.saturating_add(32);
    if end > output.len() {
        return Err(Error::AbiDecode(format!(
            "{field} word at byte {at} is out of bounds"
        )));
    }
    usize::try_from(U256::from_be_slice(&output[at..end]))
        .map_err(|_| Error::AbiDecode(format!("{field} word does not fit in usize")))
}

#[cfg(test)]
mod tests {
    use super::{
        decode_bytes_result, decode_call_bytes_arg, selector, AbiCallEncoder, AbiValue, CallEncoder,
    };
    use crate::error::Error;
    use alloy_primitives::{Address, Bytes, U256};
    use std::str::FromStr;

    #[test]
    fn selector_matches_known_transfer_selector() {
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn encode_call_lays_out_static_args_as_words() {
        let to = Address::from_str("0x3333333333333333333333333333333333333333")
            .expect("address literal should parse");
        let data = AbiCallEncoder
            .encode_call(
                "transfer(address,uint256)",
                &[AbiValue::Address(to), AbiValue::Uint(U256::from(1_000u64))],
            )
            .expect("static args should encode");
        let expected = format!(
            "a9059cbb{:0>64}{:064x}",
            "3333333333333333333333333333333333333333",
            U256::from(1_000u64)
        );
        assert_eq!(hex::encode(&data), expected);
    }

    #[test]
    fn dynamic_bytes_get_offset_length_and_padding() {
        let encoded = AbiCallEncoder
            .encode_params(&[AbiValue::Bytes(Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]))])
            .expect("dynamic bytes should encode");
        assert_eq!(encoded.len(), 96);
        assert_eq!(U256::from_be_slice(&encoded[..32]), U256::from(32u64));
        assert_eq!(U256::from_be_slice(&encoded[32..64]), U256::from(4u64));
        assert_eq!(&encoded[64..68], &[0xde, 0xad, 0xbe, 0xef]);
        assert!(encoded[68..].iter().all(|byte| *byte == 0));
    }

    #[test]
    fn array_of_dynamic_tuples_nests_offsets() {
        let tuple = AbiValue::Tuple(vec![
            AbiValue::Uint(U256::from(1u64)),
            AbiValue::Bytes(Bytes::from(vec![0x01])),
        ]);
        let encoded = AbiCallEncoder
            .encode_params(&[AbiValue::Array(vec![tuple])])
            .expect("tuple array should encode");
        // head: array offset; tail: length word, element offset word, then the
        // tuple's own head/tail (uint word, bytes offset, bytes length, payload).
        assert_eq!(U256::from_be_slice(&encoded[..32]), U256::from(32u64));
        assert_eq!(U256::from_be_slice(&encoded[32..64]), U256::from(1u64));
        assert_eq!(U256::from_be_slice(&encoded[64..96]), U256::from(32u64));
        assert_eq!(U256::from_be_slice(&encoded[96..128]), U256::from(1u64));
        assert_eq!(U256::from_be_slice(&encoded[128..160]), U256::from(64u64));
        assert_eq!(U256::from_be_slice(&encoded[160..192]), U256::from(1u64));
        assert_eq!(encoded[192], 0x01);
        assert_eq!(encoded.len(), 224);
    }

    #[test]
    fn rejects_oversized_fixed_bytes() {
        let err = AbiCallEncoder
            .encode_params(&[AbiValue::FixedBytes(Bytes::from(vec![0u8; 33]))])
            .expect_err("33-byte fixed bytes must fail");
        assert!(matches!(err, Error::AbiEncode(_)));
    }

    #[test]
    fn bytes_result_round_trips_through_decoder() {
        let payload = vec![0x11u8; 45];
        let encoded = AbiCallEncoder
            .encode_params(&[AbiValue::Bytes(Bytes::from(payload.clone()))])
            .expect("payload should encode");
        let decoded = decode_bytes_result(&encoded).expect("payload should decode back");
        assert_eq!(decoded, payload);
    }

    #[test]
    fn bytes_result_rejects_truncated_payload() {
        let encoded = AbiCallEncoder
            .encode_params(&[AbiValue::Bytes(Bytes::from(vec![0x22u8; 40]))])
            .expect("payload should encode");
        let err = decode_bytes_result(&encoded[..80]).expect_err("truncated payload must fail");
        assert!(matches!(err, Error::AbiDecode(_)));
    }

    #[test]
    fn call_bytes_arg_requires_matching_selector() {
        let calldata = AbiCallEncoder
            .encode_call("multiSend(bytes)", &[AbiValue::Bytes(Bytes::from(vec![0xaa]))])
            .expect("calldata should encode");
        let inner = decode_call_bytes_arg(&calldata, "multiSend(bytes)")
            .expect("matching selector should unwrap");
        assert_eq!(inner, vec![0xaa]);

        let err = decode_call_bytes_arg(&calldata, "execTransaction(bytes)")
            .expect_err("mismatched selector must fail");
        assert!(matches!(err, Error::AbiDecode(_)));
    }
}
