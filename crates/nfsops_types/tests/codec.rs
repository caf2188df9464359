//! Codec laws for the XDR primitives: byte-exact encodings, 4-byte
//! alignment, and padding consumption.

use std::io::Cursor;

use nfsops_types::xdr::{Error, List, Opaque, Pack, Unpack, Void};

fn round_trip<T: Pack + Unpack>(value: &T) -> T {
    let mut buf = Vec::new();
    let written = value.pack(&mut buf).expect("pack");
    assert_eq!(written, buf.len());
    assert_eq!(written, value.packed_size());
    assert_eq!(written % 4, 0, "encoding is not a multiple of 4 bytes");

    let mut cursor = Cursor::new(buf.as_slice());
    let (decoded, read) = T::unpack(&mut cursor).expect("unpack");
    assert_eq!(read, buf.len(), "decoder did not consume everything");

    let mut again = Vec::new();
    decoded.pack(&mut again).expect("repack");
    assert_eq!(buf, again, "decode(encode(v)) re-encodes differently");
    decoded
}

#[test]
fn integers_are_big_endian() {
    let mut buf = Vec::new();
    0x0102_0304u32.pack(&mut buf).expect("pack");
    (-2i32).pack(&mut buf).expect("pack");
    0x0102_0304_0506_0708u64.pack(&mut buf).expect("pack");
    assert_eq!(
        buf,
        [1, 2, 3, 4, 0xff, 0xff, 0xff, 0xfe, 1, 2, 3, 4, 5, 6, 7, 8]
    );
}

#[test]
fn integer_round_trips() {
    round_trip(&0u32);
    round_trip(&u32::MAX);
    round_trip(&-1i32);
    round_trip(&i32::MIN);
    round_trip(&u64::MAX);
}

#[test]
fn bools_encode_as_words() {
    let mut buf = Vec::new();
    true.pack(&mut buf).expect("pack");
    false.pack(&mut buf).expect("pack");
    assert_eq!(buf, [0, 0, 0, 1, 0, 0, 0, 0]);
    round_trip(&true);
    round_trip(&false);
}

#[test]
fn bool_rejects_other_values() {
    let mut cursor = Cursor::new([0u8, 0, 0, 2].as_slice());
    assert!(matches!(
        bool::unpack(&mut cursor),
        Err(Error::InvalidEnumValue(2))
    ));
}

#[test]
fn opaque_pads_to_a_word_boundary() {
    for len in 0..=9usize {
        let data: Vec<u8> = (0..len as u8).collect();
        let opaque = Opaque::owned(data.clone());
        let mut buf = Vec::new();
        let written = opaque.pack(&mut buf).expect("pack");
        assert_eq!(written, 4 + len.div_ceil(4) * 4);
        assert_eq!(&buf[4..4 + len], data.as_slice());
        assert!(buf[4 + len..].iter().all(|&b| b == 0), "padding not zero");
        let decoded = round_trip(&opaque);
        assert_eq!(decoded.as_ref(), data.as_slice());
    }
}

#[test]
fn short_reads_fail() {
    // Length word promises 8 bytes, only 4 are present.
    let mut cursor = Cursor::new([0u8, 0, 0, 8, 1, 2, 3, 4].as_slice());
    match Opaque::unpack(&mut cursor) {
        Err(Error::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn counted_arrays_carry_their_length() {
    let values = vec![10u32, 20, 30];
    let mut buf = Vec::new();
    values.pack(&mut buf).expect("pack");
    assert_eq!(
        buf,
        [0, 0, 0, 3, 0, 0, 0, 10, 0, 0, 0, 20, 0, 0, 0, 30]
    );
    let decoded = round_trip(&values);
    assert_eq!(decoded, values);
}

#[test]
fn lists_use_marker_encoding() {
    let list = List(vec![7u32, 8]);
    let mut buf = Vec::new();
    list.pack(&mut buf).expect("pack");
    assert_eq!(
        buf,
        [0, 0, 0, 1, 0, 0, 0, 7, 0, 0, 0, 1, 0, 0, 0, 8, 0, 0, 0, 0]
    );
    let decoded = round_trip(&list);
    assert_eq!(decoded.into_inner(), vec![7, 8]);

    let empty: List<u32> = List::default();
    let mut buf = Vec::new();
    empty.pack(&mut buf).expect("pack");
    assert_eq!(buf, [0, 0, 0, 0]);
}

#[test]
fn lists_reject_bad_markers() {
    let mut cursor = Cursor::new([0u8, 0, 0, 3].as_slice());
    assert!(matches!(
        <List<u32>>::unpack(&mut cursor),
        Err(Error::InvalidListMarker(3))
    ));
}

#[test]
fn void_is_empty() {
    let mut buf = Vec::new();
    assert_eq!(Void.pack(&mut buf).expect("pack"), 0);
    assert!(buf.is_empty());
    round_trip(&Void);
}
