//! Property tests: round-trip and fragmentation independence over
//! generated message trees.

use bytes::BytesMut;
use proptest::prelude::*;
use resp_codec::RespCodec;
use resp_codec::RespEncode;
use resp_codec::RespMessage;

/// Arbitrary well-formed message trees. Simple string and error alphabets
/// exclude CR and LF, which the wire format cannot carry inline.
fn message_strategy() -> impl Strategy<Value = RespMessage> {
    let leaf = prop_oneof![
        "[a-zA-Z0-9 ]{0,24}".prop_map(|s| RespMessage::simple_string(s)),
        "[a-zA-Z0-9 ]{0,24}".prop_map(|s| RespMessage::error(s)),
        any::<i64>().prop_map(RespMessage::integer),
        prop::collection::vec(any::<u8>(), 0..24).prop_map(|b| RespMessage::bulk_string(b)),
        Just(RespMessage::null_bulk_string()),
        Just(RespMessage::empty_bulk_string()),
        Just(RespMessage::null_array()),
        Just(RespMessage::empty_array()),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(RespMessage::array)
    })
}

proptest! {
    #[test]
    fn roundtrip(message in message_strategy()) {
        let wire = message.encode();

        let mut codec = RespCodec::new();
        let mut buf = BytesMut::from(&wire[..]);
        let decoded = codec.decode(&mut buf).unwrap();

        prop_assert_eq!(decoded, Some(message));
        prop_assert!(buf.is_empty());
    }

    #[test]
    fn fragmentation_independence(message in message_strategy(), chunk in 1usize..7) {
        let wire = message.encode();

        let mut codec = RespCodec::new();
        let mut buf = BytesMut::new();
        let mut decoded = Vec::new();
        for fragment in wire.chunks(chunk) {
            buf.extend_from_slice(fragment);
            while let Some(msg) = codec.decode(&mut buf).unwrap() {
                decoded.push(msg);
            }
        }

        prop_assert_eq!(decoded, vec![message]);
        prop_assert!(buf.is_empty());
    }

    #[test]
    fn encoded_len_is_exact(message in message_strategy()) {
        prop_assert_eq!(message.encoded_len(), message.encode().len());
    }

    #[test]
    fn decoder_never_panics(data in prop::collection::vec(any::<u8>(), 0..256)) {
        let mut codec = RespCodec::new();
        let mut buf = BytesMut::from(&data[..]);
        // Errors are fine; panics are not.
        while let Ok(Some(_)) = codec.decode(&mut buf) {}
    }
}
