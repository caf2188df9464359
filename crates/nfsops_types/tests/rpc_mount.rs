//! RPC message and MOUNT3 type encodings, including the record-marking
//! header.

use std::io::Cursor;

use nfsops_types::mount::{
    MNTPATHLEN, dirpath, export_node, exports, mountbody, mountres3, mountres3_ok, mountstat3,
    name,
};
use nfsops_types::nfs3::nfs_fh3;
use nfsops_types::rpc::{
    RPC_VERSION_2, accept_stat_data, accepted_reply, auth_flavor, auth_stat, auth_unix, call_body,
    fragment_header, msg_body, opaque_auth, rejected_reply, reply_body, rpc_msg,
};
use nfsops_types::xdr::{Error, List, Opaque, Pack, Unpack};

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
fn fragment_header_bit_layout() {
    let header = fragment_header::new(300, true);
    assert!(header.is_last());
    assert_eq!(header.fragment_length(), 300);
    assert_eq!(header.to_bytes(), [0x80, 0, 0x01, 0x2c]);

    let middle = fragment_header::new(16, false);
    assert!(!middle.is_last());
    assert_eq!(middle.to_bytes(), [0, 0, 0, 0x10]);

    let parsed = fragment_header::from([0x80, 0, 0, 4]);
    assert!(parsed.is_last());
    assert_eq!(parsed.fragment_length(), 4);
}

#[test]
fn call_header_is_six_words_plus_auth() {
    let msg = rpc_msg {
        xid: 7,
        body: msg_body::CALL(call_body {
            rpcvers: RPC_VERSION_2,
            prog: 100_003,
            vers: 3,
            proc: 1,
            cred: opaque_auth::default(),
            verf: opaque_auth::default(),
        }),
    };
    let mut buf = Vec::new();
    msg.pack(&mut buf).expect("pack");
    let words: Vec<u32> = buf
        .chunks_exact(4)
        .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    // xid, CALL, rpcvers, prog, vers, proc, then two empty AUTH_NULLs
    assert_eq!(words, [7, 0, 2, 100_003, 3, 1, 0, 0, 0, 0]);
}

#[test]
fn auth_unix_body_round_trips() {
    let body = auth_unix {
        stamp: 0x1234,
        machinename: Opaque::owned(b"client.example.com".to_vec()),
        uid: 1000,
        gid: 100,
        gids: vec![100, 4, 24],
    };
    let decoded = round_trip(&body);
    assert_eq!(decoded.machinename.as_ref(), b"client.example.com");
    assert_eq!(decoded.gids, vec![100, 4, 24]);

    let cred = opaque_auth {
        flavor: auth_flavor::AUTH_UNIX,
        body: Opaque::owned(vec![1, 2, 3, 4]),
    };
    round_trip(&cred);
}

#[test]
fn prog_mismatch_carries_the_version_range() {
    let data = accept_stat_data::PROG_MISMATCH { low: 2, high: 4 };
    assert_eq!(data.packed_size(), 12);
    let decoded = round_trip(&data);
    assert!(matches!(
        decoded,
        accept_stat_data::PROG_MISMATCH { low: 2, high: 4 }
    ));
}

#[test]
fn rejected_replies_round_trip() {
    let mismatch = rejected_reply::RPC_MISMATCH { low: 2, high: 2 };
    assert_eq!(mismatch.packed_size(), 12);
    round_trip(&mismatch);

    let auth = rejected_reply::AUTH_ERROR(auth_stat::AUTH_BADCRED);
    assert_eq!(auth.packed_size(), 8);
    round_trip(&auth);
}

#[test]
fn reply_messages_round_trip() {
    let accepted = rpc_msg {
        xid: 99,
        body: msg_body::REPLY(reply_body::MSG_ACCEPTED(accepted_reply {
            verf: opaque_auth::default(),
            reply_data: accept_stat_data::SUCCESS,
        })),
    };
    let decoded = round_trip(&accepted);
    assert_eq!(decoded.xid, 99);

    let denied = rpc_msg {
        xid: 100,
        body: msg_body::REPLY(reply_body::MSG_DENIED(rejected_reply::RPC_MISMATCH {
            low: 2,
            high: 2,
        })),
    };
    round_trip(&denied);
}

#[test]
fn mount_results_decode_both_arms() {
    let ok = mountres3::Ok(mountres3_ok {
        fhandle: nfs_fh3::new(vec![1, 2, 3, 4]),
        auth_flavors: vec![1, 0],
    });
    let decoded = round_trip(&ok);
    assert_eq!(decoded.status(), mountstat3::MNT3_OK);
    let mountres3::Ok(res) = decoded else {
        panic!("expected the ok arm");
    };
    assert_eq!(res.fhandle, nfs_fh3::new(vec![1, 2, 3, 4]));
    assert_eq!(res.auth_flavors, vec![1, 0]);

    let err = mountres3::Err(mountstat3::MNT3ERR_ACCES);
    let decoded = round_trip(&err);
    assert_eq!(decoded.status(), mountstat3::MNT3ERR_ACCES);
    assert_eq!(decoded.status().to_string(), "13(MNT3ERR_ACCES)");
}

#[test]
fn unknown_mount_status_is_preserved() {
    let mut cursor = Cursor::new([0u8, 0, 0, 42].as_slice());
    let (status, _) = mountstat3::unpack(&mut cursor).expect("unpack");
    assert_eq!(status, mountstat3(42));
    assert_eq!(status.name(), "?");
}

#[test]
fn dirpath_is_limited() {
    let long = vec![b'a'; MNTPATHLEN + 1];
    let path = dirpath(Opaque::borrowed(&long));
    let mut buf = Vec::new();
    assert!(matches!(
        path.pack(&mut buf),
        Err(Error::TooLong { limit: 1024, .. })
    ));

    let mut wire = Vec::new();
    Opaque::borrowed(&long).pack(&mut wire).expect("pack");
    let mut cursor = Cursor::new(wire.as_slice());
    assert!(matches!(
        dirpath::unpack(&mut cursor),
        Err(Error::TooLong { limit: 1024, .. })
    ));

    round_trip(&dirpath::from("/export/home"));
}

#[test]
fn mount_and_export_lists_round_trip() {
    let list: List<mountbody<'_, '_>> = List(vec![mountbody {
        ml_hostname: name::from(b"host-a".as_slice()),
        ml_directory: dirpath::from("/a"),
    }]);
    let decoded = round_trip(&list);
    assert_eq!(decoded.0[0].ml_hostname.as_ref(), b"host-a");

    let table: exports<'_, '_> = List(vec![
        export_node {
            ex_dir: dirpath::from("/"),
            ex_groups: List(vec![name::from(b"trusted".as_slice())]),
        },
        export_node {
            ex_dir: dirpath::from("/scratch"),
            ex_groups: List::default(),
        },
    ]);
    let decoded = round_trip(&table);
    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded.0[0].ex_groups.len(), 1);
}
