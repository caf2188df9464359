//! Cache-special COMMIT and refresh behavior against a scripted server.

use std::time::Duration;

use nfsops_client::cache::{
    ASYNC_FLUSH_COUNT, FLUSH_OFFSET, FLUSH_STATUS_COUNT, REFRESH_DIR_COOKIE, SYNC_FLUSH_COUNT,
};
use nfsops_client::{Error, Nfs3Client};
use nfsops_types::nfs3::{
    COMMIT3args, COMMIT3res, COMMIT3resfail, COMMIT3resok, Nfs3Option, READ3args, READ3res,
    READ3resok, READDIRPLUS3args, READDIRPLUS3res, READDIRPLUS3resfail, ftype3, nfsstat3,
    wcc_data, writeverf3,
};
use nfsops_types::xdr::Opaque;
use nfsops_tests::{
    Behavior, MockConnector, getattr_ok, handle, pack_value, sample_fattr, spawn,
};

fn nfs_client(connector: &MockConnector) -> Nfs3Client<MockConnector> {
    let mut cli = Nfs3Client::to_port(connector.clone(), "filer", 2049);
    cli.set_retry_pause(Duration::from_millis(5));
    cli
}

fn commit_ok() -> Vec<u8> {
    pack_value(&COMMIT3res::Ok(COMMIT3resok {
        file_wcc: wcc_data::default(),
        verf: writeverf3::default(),
    }))
}

fn commit_err(status: nfsstat3) -> Vec<u8> {
    pack_value(&COMMIT3res::Err((
        status,
        COMMIT3resfail {
            file_wcc: wcc_data::default(),
        },
    )))
}

#[tokio::test]
async fn commit_and_wait_polls_until_clean() {
    let connector = MockConnector::new();
    let server = spawn(
        connector.add_endpoint(),
        vec![
            Behavior::Success(commit_err(nfsstat3::NFS3ERR_NOT_SYNC)),
            Behavior::Success(commit_err(nfsstat3::NFS3ERR_NOT_SYNC)),
            Behavior::Success(commit_ok()),
        ],
    );

    let file = handle(b"dirty-file");
    let mut cli = nfs_client(&connector);
    cli.commit_and_wait(&file, Some(Duration::from_secs(30)))
        .await
        .expect("flush completes");
    drop(cli);

    let calls = server.await.expect("server");
    assert_eq!(calls.len(), 3);
    let counts: Vec<u32> = calls
        .iter()
        .map(|call| {
            let args: COMMIT3args = call.decode_args();
            assert_eq!(args.file, file);
            assert_eq!(args.offset, FLUSH_OFFSET);
            args.count
        })
        .collect();
    assert_eq!(
        counts,
        vec![ASYNC_FLUSH_COUNT, FLUSH_STATUS_COUNT, FLUSH_STATUS_COUNT]
    );
}

#[tokio::test]
async fn commit_and_wait_reports_dirty_attributes() {
    let connector = MockConnector::new();
    let server = spawn(
        connector.add_endpoint(),
        vec![
            Behavior::Success(commit_err(nfsstat3::NFS3ERR_NOT_SYNC)),
            Behavior::Success(commit_err(nfsstat3::NFS3ERR_NOTEMPTY)),
        ],
    );

    let file = handle(b"stuck-file");
    let mut cli = nfs_client(&connector);
    let err = cli
        .commit_and_wait(&file, None)
        .await
        .expect_err("dirty attributes");
    assert!(matches!(
        err,
        Error::FlushFailed(nfsstat3::NFS3ERR_NOTEMPTY)
    ));
    drop(cli);
    assert_eq!(server.await.expect("server").len(), 2);
}

#[tokio::test]
async fn commit_and_wait_rejects_a_refused_flush() {
    let connector = MockConnector::new();
    let server = spawn(
        connector.add_endpoint(),
        vec![Behavior::Success(commit_err(nfsstat3::NFS3ERR_ACCES))],
    );

    let file = handle(b"forbidden");
    let mut cli = nfs_client(&connector);
    let err = cli
        .commit_and_wait(&file, None)
        .await
        .expect_err("flush refused");
    assert!(matches!(err, Error::FlushFailed(nfsstat3::NFS3ERR_ACCES)));
    drop(cli);
    assert_eq!(server.await.expect("server").len(), 1);
}

#[tokio::test]
async fn sync_flush_sends_the_magic_triple() {
    let connector = MockConnector::new();
    let server = spawn(connector.add_endpoint(), vec![Behavior::Success(commit_ok())]);

    let file = handle(b"sync-file");
    let mut cli = nfs_client(&connector);
    let res = cli
        .sync_flush(&file, Duration::from_secs(60))
        .await
        .expect("sync flush");
    assert_eq!(res.status(), nfsstat3::NFS3_OK);
    drop(cli);

    let calls = server.await.expect("server");
    assert_eq!(calls.len(), 1);
    let args: COMMIT3args = calls[0].decode_args();
    assert_eq!(args.offset, FLUSH_OFFSET);
    assert_eq!(args.count, SYNC_FLUSH_COUNT);
}

#[tokio::test]
async fn refreshing_a_directory_expects_toosmall() {
    let connector = MockConnector::new();
    let server = spawn(
        connector.add_endpoint(),
        vec![
            Behavior::Success(getattr_ok(sample_fattr(ftype3::NF3DIR, 42))),
            Behavior::Success(pack_value(&READDIRPLUS3res::Err((
                nfsstat3::NFS3ERR_TOOSMALL,
                READDIRPLUS3resfail::default(),
            )))),
        ],
    );

    let dir = handle(b"cached-dir");
    let mut cli = nfs_client(&connector);
    cli.refresh(&dir).await.expect("refresh");
    drop(cli);

    let calls = server.await.expect("server");
    assert_eq!(calls.len(), 2);
    let args: READDIRPLUS3args = calls[1].decode_args();
    assert_eq!(args.cookie, REFRESH_DIR_COOKIE);
    assert_eq!(args.dircount, 0);
    assert_eq!(args.maxcount, 0);
}

#[tokio::test]
async fn refreshing_a_file_reads_zero_bytes() {
    let read_ok = pack_value(&READ3res::Ok(READ3resok {
        file_attributes: Nfs3Option::None,
        count: 0,
        eof: false,
        data: Opaque::borrowed(&[]),
    }));

    let connector = MockConnector::new();
    let server = spawn(
        connector.add_endpoint(),
        vec![
            Behavior::Success(getattr_ok(sample_fattr(ftype3::NF3REG, 43))),
            Behavior::Success(read_ok),
        ],
    );

    let file = handle(b"cached-file");
    let mut cli = nfs_client(&connector);
    cli.refresh(&file).await.expect("refresh");
    drop(cli);

    let calls = server.await.expect("server");
    assert_eq!(calls.len(), 2);
    let args: READ3args = calls[1].decode_args();
    assert_eq!(args.offset, 0);
    assert_eq!(args.count, 0);
}

#[tokio::test]
async fn refreshing_a_symlink_is_a_no_op() {
    let connector = MockConnector::new();
    let server = spawn(
        connector.add_endpoint(),
        vec![Behavior::Success(getattr_ok(sample_fattr(ftype3::NF3LNK, 44)))],
    );

    let link = handle(b"cached-link");
    let mut cli = nfs_client(&connector);
    cli.refresh(&link).await.expect("refresh");
    drop(cli);
    assert_eq!(server.await.expect("server").len(), 1);
}
