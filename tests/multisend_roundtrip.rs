use alloy_primitives::{Address, Bytes, U256};
use rolekit::batch::{
    decode_multi, decode_multi_calldata, encode_multi, is_dispatch_target, MULTISEND_ADDRESS,
    MULTISEND_CALL_ONLY_ADDRESS,
};
use rolekit::{AbiCallEncoder, Error, MetaTransaction, Operation};

fn transaction(fill: u8, value: u64, data: Vec<u8>, operation: Operation) -> MetaTransaction {
    MetaTransaction {
        to: Address::repeat_byte(fill),
        value: U256::from(value),
        data: Bytes::from(data),
        operation,
    }
}

#[test]
fn batches_of_varied_shapes_round_trip_exactly() {
    let batches = [
        vec![],
        vec![transaction(0xaa, 0, vec![], Operation::Call)],
        vec![
            transaction(0xaa, 0, vec![], Operation::Call),
            transaction(0xbb, 1, vec![0x12, 0x34], Operation::Call),
        ],
        vec![
            transaction(0x01, u64::MAX, vec![0u8; 100], Operation::DelegateCall),
            transaction(0x02, 0, vec![0xff; 32], Operation::Call),
            transaction(0x03, 7, vec![0x00], Operation::DelegateCall),
        ],
    ];

    for txs in batches {
        let wrapper = encode_multi(&AbiCallEncoder, &txs, None).expect("batch should encode");
        let decoded = decode_multi_calldata(&wrapper.data).expect("batch should decode back");
        assert_eq!(decoded, txs);
    }
}

#[test]
fn wrapper_metadata_is_independent_of_input_metadata() {
    // Inputs with their own values and operations must not leak into the
    // wrapper fields.
    let txs = vec![
        transaction(0xaa, 1_000_000, vec![0x01], Operation::DelegateCall),
        transaction(0xbb, 42, vec![0x02], Operation::Call),
    ];
    let wrapper = encode_multi(&AbiCallEncoder, &txs, None).expect("batch should encode");
    assert_eq!(wrapper.value, U256::ZERO);
    assert_eq!(wrapper.operation, Operation::DelegateCall);
    assert_eq!(wrapper.to, MULTISEND_ADDRESS);
}

#[test]
fn truncating_the_payload_mid_record_fails_without_partial_output() {
    let txs = vec![
        transaction(0xaa, 0, vec![0x01, 0x02, 0x03, 0x04], Operation::Call),
        transaction(0xbb, 5, vec![0x05, 0x06], Operation::Call),
    ];
    let wrapper = encode_multi(&AbiCallEncoder, &txs, None).expect("batch should encode");
    let packed = rolekit::abi::decode_call_bytes_arg(&wrapper.data, "multiSend(bytes)")
        .expect("wrapper payload should unwrap");

    // Cut into the second record's header.
    let cut = packed.len() - 40;
    let err = decode_multi(&packed[..cut]).expect_err("truncated batch must fail");
    assert!(matches!(err, Error::MalformedBatch(_)));
}

#[test]
fn record_claiming_more_payload_than_remains_fails() {
    let txs = vec![transaction(0xcc, 0, vec![0x01, 0x02], Operation::Call)];
    let wrapper = encode_multi(&AbiCallEncoder, &txs, None).expect("batch should encode");
    let mut packed = rolekit::abi::decode_call_bytes_arg(&wrapper.data, "multiSend(bytes)")
        .expect("wrapper payload should unwrap");

    // Bump the declared length one past the bytes actually present.
    let length_byte = 1 + 20 + 32 + 32 - 1;
    packed[length_byte] += 1;
    let err = decode_multi(&packed).expect_err("over-length claim must fail");
    assert!(matches!(err, Error::MalformedBatch(_)));
}

#[test]
fn dispatcher_classification_is_case_insensitive() {
    assert!(is_dispatch_target(&format!("{MULTISEND_ADDRESS:?}")));
    assert!(is_dispatch_target(
        &format!("{MULTISEND_CALL_ONLY_ADDRESS:?}").to_uppercase().replace("0X", "0x")
    ));
    assert!(is_dispatch_target("0x9641D764fc13c8B624c04430c7356C1C7C8102e2"));
    assert!(!is_dispatch_target("0x4242424242424242424242424242424242424242"));
}
