//! NFSv3 wire types: layouts, variant encodings, result envelopes and
//! status-code discipline.

use std::io::Cursor;

use nfsops_types::nfs3::{
    LOOKUP3res, LOOKUP3resfail, LOOKUP3resok, MKNOD3args, NFS3_FHSIZE, Nfs3Option, Nfs3Result,
    NfsStatus, READ3resok, READDIRPLUS3res, READDIRPLUS3resfail, SETATTR3args, WRITE3args,
    cookieverf3, createhow3, createverf3, devicedata3, dirlist3, dirlistplus3, diropargs3, entry3,
    entryplus3, fattr3, filename3, ftype3, mknoddata3, nfs_fh3, nfsstat3, nfstime3, post_op_attr,
    post_op_fh3, sattr3, sattrguard3, set_atime, set_mtime, set_size3, specdata3, stable_how,
    wcc_attr, wcc_data,
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

fn sample_time() -> nfstime3 {
    nfstime3 {
        seconds: 1_700_000_000,
        nseconds: 123,
    }
}

fn sample_fattr() -> fattr3 {
    fattr3 {
        type_: ftype3::NF3REG,
        mode: 0o644,
        nlink: 2,
        uid: 1000,
        gid: 1000,
        size: 4096,
        used: 8192,
        rdev: specdata3 {
            specdata1: 8,
            specdata2: 1,
        },
        fsid: 0xdead,
        fileid: 77,
        atime: sample_time(),
        mtime: sample_time(),
        ctime: sample_time(),
    }
}

fn fh(bytes: &[u8]) -> nfs_fh3 {
    nfs_fh3::new(bytes.to_vec())
}

#[test]
fn fattr3_is_exactly_84_bytes() {
    let attrs = sample_fattr();
    assert_eq!(attrs.packed_size(), 84);
    round_trip(&attrs);
}

#[test]
fn unknown_status_values_are_preserved() {
    let mut cursor = Cursor::new([0u8, 0, 0x27, 0x0f].as_slice());
    let (status, _) = nfsstat3::unpack(&mut cursor).expect("unpack");
    assert_eq!(status, nfsstat3(9999));
    assert_eq!(status.name(), "?");
    assert_eq!(status.to_string(), "9999(?)");
    assert!(status.is_err());
    round_trip(&status);
}

#[test]
fn known_status_values_have_mnemonics() {
    assert_eq!(nfsstat3::NFS3_OK.to_string(), "0(NFS3_OK)");
    assert_eq!(
        nfsstat3::NFS3ERR_JUKEBOX.to_string(),
        "10008(NFS3ERR_JUKEBOX)"
    );
    assert!(!nfsstat3::NFS3_OK.is_err());
    assert!(nfsstat3::NFS3ERR_JUKEBOX.is_err());
}

#[test]
fn handles_are_limited_to_64_bytes() {
    let ok = fh(&[0xab; NFS3_FHSIZE]);
    round_trip(&ok);

    let long = fh(&[0xab; NFS3_FHSIZE + 1]);
    let mut buf = Vec::new();
    assert!(matches!(
        long.pack(&mut buf),
        Err(Error::TooLong { limit: 64, len: 65 })
    ));

    let mut wire = Vec::new();
    Opaque::borrowed(&[0xcd; 65]).pack(&mut wire).expect("pack");
    let mut cursor = Cursor::new(wire.as_slice());
    assert!(matches!(
        nfs_fh3::unpack(&mut cursor),
        Err(Error::TooLong { limit: 64, len: 65 })
    ));
}

#[test]
fn handles_order_by_raw_bytes() {
    let a = fh(&[1, 2]);
    let b = fh(&[1, 3]);
    let c = fh(&[1, 2, 0]);
    assert!(a < b);
    assert!(a < c);
    assert_eq!(a, fh(&[1, 2]));

    let mut set = std::collections::HashSet::new();
    set.insert(a.clone());
    assert!(set.contains(&fh(&[1, 2])));
    assert!(!set.contains(&b));
}

#[test]
fn post_op_handles_compare_with_plain_handles() {
    let some: post_op_fh3 = Nfs3Option::Some(fh(&[9, 9]));
    assert_eq!(some, fh(&[9, 9]));
    assert_ne!(some, fh(&[9, 8]));

    let none_a: post_op_fh3 = Nfs3Option::None;
    let none_b: post_op_fh3 = Nfs3Option::None;
    assert_eq!(none_a, none_b);
    assert_ne!(none_a, fh(&[9, 9]));
}

#[test]
fn times_order_by_instant() {
    let early = nfstime3 {
        seconds: 1,
        nseconds: 999_999_999,
    };
    let later = nfstime3 {
        seconds: 2,
        nseconds: 0,
    };
    assert!(early < later);
    assert!(
        nfstime3 {
            seconds: 1,
            nseconds: 5
        } < nfstime3 {
            seconds: 1,
            nseconds: 6
        }
    );
}

#[test]
fn empty_sattr3_is_six_unset_words() {
    let attrs = sattr3::default();
    let mut buf = Vec::new();
    attrs.pack(&mut buf).expect("pack");
    assert_eq!(buf, [0u8; 24]);
    round_trip(&attrs);
}

#[test]
fn sattr3_setters_are_independently_optional() {
    let attrs = sattr3 {
        mode: Nfs3Option::Some(0o755),
        uid: Nfs3Option::None,
        gid: Nfs3Option::None,
        size: set_size3::Some(512),
        atime: set_atime::SET_TO_CLIENT_TIME(sample_time()),
        mtime: set_mtime::SET_TO_SERVER_TIME,
    };
    // mode 8 + uid 4 + gid 4 + size 12 + atime 12 + mtime 4
    assert_eq!(attrs.packed_size(), 44);
    let decoded = round_trip(&attrs);
    assert_eq!(decoded.mode, Nfs3Option::Some(0o755));
    assert!(matches!(decoded.atime, set_atime::SET_TO_CLIENT_TIME(t) if t == sample_time()));
    assert!(matches!(decoded.mtime, set_mtime::SET_TO_SERVER_TIME));
}

#[test]
fn set_time_rejects_unknown_discriminants() {
    let mut cursor = Cursor::new([0u8, 0, 0, 3].as_slice());
    assert!(matches!(
        set_atime::unpack(&mut cursor),
        Err(Error::InvalidDiscriminant(3))
    ));
}

#[test]
fn createhow3_arms_follow_the_discriminator() {
    let unchecked = createhow3::UNCHECKED(sattr3::default());
    assert_eq!(unchecked.packed_size(), 28);
    round_trip(&unchecked);

    let exclusive = createhow3::EXCLUSIVE(createverf3([7; 8]));
    assert_eq!(exclusive.packed_size(), 12);
    let decoded = round_trip(&exclusive);
    assert!(matches!(decoded, createhow3::EXCLUSIVE(v) if v == createverf3([7; 8])));

    let mut cursor = Cursor::new([0u8, 0, 0, 9].as_slice());
    assert!(matches!(
        createhow3::unpack(&mut cursor),
        Err(Error::InvalidDiscriminant(9))
    ));
}

#[test]
fn mknoddata3_arms_follow_the_file_type() {
    let chr = mknoddata3::NF3CHR(devicedata3 {
        dev_attributes: sattr3::default(),
        spec: specdata3 {
            specdata1: 4,
            specdata2: 64,
        },
    });
    let decoded = round_trip(&chr);
    assert!(matches!(decoded, mknoddata3::NF3CHR(_)));

    let fifo = mknoddata3::NF3FIFO(sattr3::default());
    round_trip(&fifo);

    let plain = mknoddata3::Other(ftype3::NF3REG);
    assert_eq!(plain.packed_size(), 4);
    round_trip(&plain);

    let args = MKNOD3args {
        where_: diropargs3 {
            dir: fh(&[1]),
            name: filename3::from(b"dev".as_slice()),
        },
        what: chr,
    };
    round_trip(&args);
}

#[test]
fn sattrguard3_wraps_an_optional_ctime() {
    let none: sattrguard3 = Nfs3Option::None;
    assert_eq!(none.packed_size(), 4);
    let some: sattrguard3 = Nfs3Option::Some(sample_time());
    assert_eq!(some.packed_size(), 12);
    round_trip(&some);

    let args = SETATTR3args {
        object: fh(&[1, 2, 3]),
        new_attributes: sattr3::default(),
        guard: Nfs3Option::Some(sample_time()),
    };
    round_trip(&args);
}

#[test]
fn write_args_carry_stability_and_data() {
    let args = WRITE3args {
        file: fh(&[5; 12]),
        offset: 8192,
        count: 5,
        stable: stable_how::FILE_SYNC,
        data: Opaque::borrowed(b"hello"),
    };
    let mut buf = Vec::new();
    args.pack(&mut buf).expect("pack");
    // fh(4+12) + offset 8 + count 4 + stable 4 + data(4+5+3 pad)
    assert_eq!(buf.len(), 44);
    assert_eq!(&buf[buf.len() - 8..buf.len() - 3], b"hello");
    assert_eq!(&buf[buf.len() - 3..], [0, 0, 0]);
}

#[test]
fn result_envelopes_decode_the_selected_arm() {
    let ok = LOOKUP3res::Ok(LOOKUP3resok {
        object: fh(&[3, 4]),
        obj_attributes: post_op_attr::Some(sample_fattr()),
        dir_attributes: post_op_attr::None,
    });
    let decoded = round_trip(&ok);
    assert_eq!(decoded.nfs_status(), nfsstat3::NFS3_OK);
    assert!(matches!(decoded, Nfs3Result::Ok(res) if res.object == fh(&[3, 4])));

    let err = LOOKUP3res::Err((nfsstat3::NFS3ERR_NOENT, LOOKUP3resfail::default()));
    let decoded = round_trip(&err);
    assert_eq!(decoded.nfs_status(), nfsstat3::NFS3ERR_NOENT);
    assert!(matches!(decoded, Nfs3Result::Err(_)));
}

#[test]
fn failure_arms_still_carry_wcc_data() {
    let failed: READDIRPLUS3res<'_> = Nfs3Result::Err((
        nfsstat3::NFS3ERR_STALE,
        READDIRPLUS3resfail {
            dir_attributes: post_op_attr::Some(sample_fattr()),
        },
    ));
    let decoded = round_trip(&failed);
    let Nfs3Result::Err((status, fail)) = decoded else {
        panic!("expected the failure arm");
    };
    assert_eq!(status, nfsstat3::NFS3ERR_STALE);
    assert!(fail.dir_attributes.is_some());

    let wcc = wcc_data {
        before: Nfs3Option::Some(wcc_attr {
            size: 100,
            mtime: sample_time(),
            ctime: sample_time(),
        }),
        after: Nfs3Option::Some(sample_fattr()),
    };
    round_trip(&wcc);
}

#[test]
fn directory_listings_terminate_with_eof() {
    let listing = dirlist3 {
        entries: List(vec![
            entry3 {
                fileid: 1,
                name: filename3::from(b"a".as_slice()),
                cookie: 100,
            },
            entry3 {
                fileid: 2,
                name: filename3::from(b"b".as_slice()),
                cookie: 200,
            },
        ]),
        eof: true,
    };
    let decoded = round_trip(&listing);
    assert_eq!(decoded.entries.len(), 2);
    assert!(decoded.eof);

    let plus = dirlistplus3 {
        entries: List(vec![entryplus3 {
            fileid: 3,
            name: filename3::from(b"c".as_slice()),
            cookie: 300,
            name_attributes: post_op_attr::Some(sample_fattr()),
            name_handle: post_op_fh3::Some(fh(&[0xee; 32])),
        }]),
        eof: false,
    };
    let decoded = round_trip(&plus);
    assert_eq!(decoded.entries.0[0].handle(), Some(&fh(&[0xee; 32])));
    assert!(!decoded.eof);
}

#[test]
fn read_result_data_round_trips() {
    let resok = READ3resok {
        file_attributes: post_op_attr::None,
        count: 6,
        eof: true,
        data: Opaque::borrowed(b"abcdef"),
    };
    let decoded = round_trip(&resok);
    assert_eq!(decoded.data.as_ref(), b"abcdef");
    assert_eq!(decoded.count, 6);

    let verf = cookieverf3([1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(verf.packed_size(), 8);
    round_trip(&verf);
}
