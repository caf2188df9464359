//! Transport-level behavior against a scripted server: reply dispatch,
//! reconnects, timeouts, retries and XID discipline.

use std::time::Duration;

use nfsops_client::{CallOptions, Error, Nfs3Client, RpcClient, RpcError};
use nfsops_types::nfs3::{GETATTR3args, GETATTR3res, Nfs3Result, ftype3, nfsstat3};
use nfsops_types::rpc::auth_stat;
use nfsops_types::xdr::Void;
use nfsops_tests::{
    Behavior, MockConnector, getattr_err, getattr_ok, handle, sample_fattr, spawn, void_ok,
};

fn rpc_client(connector: MockConnector) -> RpcClient<MockConnector> {
    RpcClient::new(connector, "filer", 2049, 100_003, 3)
}

fn nfs_client(connector: MockConnector) -> Nfs3Client<MockConnector> {
    let mut cli = Nfs3Client::to_port(connector, "filer", 2049);
    cli.set_retry_pause(Duration::from_millis(5));
    cli
}

#[tokio::test]
async fn null_call_round_trips() {
    let connector = MockConnector::new();
    let server = spawn(connector.add_endpoint(), vec![Behavior::Success(void_ok())]);

    let mut cli = nfs_client(connector);
    cli.null().await.expect("null");
    assert!(cli.latencies().success());
    drop(cli);

    let calls = server.await.expect("server");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].prog, 100_003);
    assert_eq!(calls[0].vers, 3);
    assert_eq!(calls[0].proc, 0);
}

#[tokio::test]
async fn xids_increase_across_calls() {
    let connector = MockConnector::new();
    let server = spawn(
        connector.add_endpoint(),
        vec![
            Behavior::Success(void_ok()),
            Behavior::Success(void_ok()),
            Behavior::Success(void_ok()),
        ],
    );

    let mut cli = nfs_client(connector);
    for _ in 0..3 {
        cli.null().await.expect("null");
    }
    drop(cli);

    let calls = server.await.expect("server");
    assert_eq!(calls.len(), 3);
    assert!(calls[0].xid < calls[1].xid && calls[1].xid < calls[2].xid);
}

#[tokio::test]
async fn rpc_mismatch_is_surfaced() {
    let connector = MockConnector::new();
    let server = spawn(
        connector.add_endpoint(),
        vec![Behavior::DeniedRpcMismatch { low: 2, high: 2 }],
    );

    let mut rpc = rpc_client(connector);
    let err = rpc
        .call::<Void, Void>(0, &Void, &CallOptions::default())
        .await
        .expect_err("denied");
    match err {
        Error::Rpc(RpcError::RpcMismatch { low, high }) => {
            assert_eq!((low, high), (2, 2));
        }
        other => panic!("unexpected error: {other}"),
    }
    drop(rpc);
    assert_eq!(server.await.expect("server").len(), 1);
}

#[tokio::test]
async fn auth_error_is_surfaced() {
    let connector = MockConnector::new();
    let server = spawn(
        connector.add_endpoint(),
        vec![Behavior::DeniedAuthError(auth_stat::AUTH_TOOWEAK)],
    );

    let mut rpc = rpc_client(connector);
    let err = rpc
        .call::<Void, Void>(0, &Void, &CallOptions::default())
        .await
        .expect_err("denied");
    assert!(matches!(
        err,
        Error::Rpc(RpcError::AuthError(auth_stat::AUTH_TOOWEAK))
    ));
    drop(rpc);
    assert_eq!(server.await.expect("server").len(), 1);
}

#[tokio::test]
async fn accept_stat_error_is_surfaced() {
    let connector = MockConnector::new();
    let server = spawn(
        connector.add_endpoint(),
        vec![Behavior::AcceptError(
            nfsops_types::rpc::accept_stat_data::PROG_UNAVAIL,
        )],
    );

    let mut rpc = rpc_client(connector);
    let err = rpc
        .call::<Void, Void>(0, &Void, &CallOptions::default())
        .await
        .expect_err("prog unavail");
    assert!(matches!(err, Error::Rpc(RpcError::ProgUnavail)));
    drop(rpc);
    assert_eq!(server.await.expect("server").len(), 1);
}

#[tokio::test]
async fn xid_mismatch_fails_and_reconnects() {
    let connector = MockConnector::new();
    let first = spawn(
        connector.add_endpoint(),
        vec![Behavior::SuccessWrongXid(void_ok())],
    );
    let second = spawn(connector.add_endpoint(), vec![Behavior::Success(void_ok())]);

    let mut rpc = rpc_client(connector);
    let err = rpc
        .call::<Void, Void>(0, &Void, &CallOptions::default())
        .await
        .expect_err("mismatched xid");
    assert!(matches!(err, Error::Rpc(RpcError::XidMismatch { .. })));

    // The mismatch marked the connection dirty; the next call opens the
    // second endpoint.
    rpc.call::<Void, Void>(0, &Void, &CallOptions::default())
        .await
        .expect("call after reconnect");
    drop(rpc);

    assert_eq!(first.await.expect("server").len(), 1);
    assert_eq!(second.await.expect("server").len(), 1);
}

#[tokio::test]
async fn timeout_returns_after_exactly_tries_attempts() {
    let connector = MockConnector::new();
    let server = spawn(
        connector.add_endpoint(),
        vec![Behavior::Ignore, Behavior::Ignore],
    );

    let timeout = Duration::from_millis(150);
    let mut rpc = rpc_client(connector);
    let started = std::time::Instant::now();
    let err = rpc
        .call::<Void, Void>(0, &Void, &CallOptions::timeout(timeout).with_tries(2))
        .await
        .expect_err("timeout");
    let elapsed = started.elapsed();

    assert!(matches!(err, Error::Timeout));
    assert!(elapsed >= 2 * timeout, "elapsed {elapsed:?}");
    assert!(elapsed < 10 * timeout, "elapsed {elapsed:?}");
    drop(rpc);

    // Both attempts reused the same XID so a late reply could match.
    let calls = server.await.expect("server");
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].xid, calls[1].xid);
}

#[tokio::test]
async fn jukebox_is_retried_with_fresh_xids() {
    let jukebox = getattr_err(nfsstat3::NFS3ERR_JUKEBOX);
    let ok = getattr_ok(sample_fattr(ftype3::NF3REG, 7));

    let connector = MockConnector::new();
    let server = spawn(
        connector.add_endpoint(),
        vec![
            Behavior::Success(jukebox.clone()),
            Behavior::Success(jukebox),
            Behavior::Success(ok),
        ],
    );

    let mut cli = nfs_client(connector);
    let args = GETATTR3args {
        object: handle(b"jukeboxed-file"),
    };
    let res = cli.getattr(&args).await.expect("getattr");
    assert_eq!(res.status(), nfsstat3::NFS3_OK);

    let op = cli.latencies().op("GETATTR").expect("latency entry");
    assert_eq!(op.count, 3);
    assert_eq!(op.success_count, 1);
    assert_eq!(op.errors.len(), 2);
    drop(cli);

    let calls = server.await.expect("server");
    assert_eq!(calls.len(), 3);
    assert!(calls[0].xid < calls[1].xid && calls[1].xid < calls[2].xid);
}

#[tokio::test]
async fn jukebox_on_last_attempt_is_returned() {
    let jukebox = getattr_err(nfsstat3::NFS3ERR_JUKEBOX);

    let connector = MockConnector::new();
    let server = spawn(
        connector.add_endpoint(),
        vec![
            Behavior::Success(jukebox.clone()),
            Behavior::Success(jukebox),
        ],
    );

    let mut cli = nfs_client(connector);
    cli.set_tries(2);
    let args = GETATTR3args {
        object: handle(b"still-jukeboxed"),
    };
    let res: GETATTR3res = cli.getattr(&args).await.expect("getattr");
    assert_eq!(res.status(), nfsstat3::NFS3ERR_JUKEBOX);
    assert!(matches!(res, Nfs3Result::Err(_)));
    assert!(!cli.latencies().success());
    drop(cli);

    assert_eq!(server.await.expect("server").len(), 2);
}

#[tokio::test]
async fn fragmented_reply_is_reassembled() {
    let ok = getattr_ok(sample_fattr(ftype3::NF3DIR, 11));

    let connector = MockConnector::new();
    let server = spawn(
        connector.add_endpoint(),
        vec![Behavior::SuccessFragmented(ok, 5)],
    );

    let mut cli = nfs_client(connector);
    let args = GETATTR3args {
        object: handle(b"dir"),
    };
    let res = cli.getattr(&args).await.expect("getattr");
    let attrs = res.into_ok().expect("ok arm").obj_attributes;
    assert_eq!(attrs.type_, ftype3::NF3DIR);
    assert_eq!(attrs.fileid, 11);
    drop(cli);

    assert_eq!(server.await.expect("server").len(), 1);
}

#[tokio::test]
async fn io_error_reconnects_and_retries() {
    let connector = MockConnector::new();
    // First endpoint closes right after taking the call.
    let first = spawn(connector.add_endpoint(), vec![Behavior::Close]);
    let second = spawn(connector.add_endpoint(), vec![Behavior::Success(void_ok())]);

    let mut rpc = rpc_client(connector);
    rpc.call::<Void, Void>(0, &Void, &CallOptions::default())
        .await
        .expect("retried on the fresh connection");
    drop(rpc);

    assert_eq!(first.await.expect("server").len(), 1);
    assert_eq!(second.await.expect("server").len(), 1);
}

#[tokio::test]
async fn portmapper_bootstrap_resolves_the_port() {
    let connector = MockConnector::new();
    let portmap = spawn(
        connector.add_endpoint(),
        vec![Behavior::Success(nfsops_tests::pack_value(&2049u32))],
    );
    let nfs = spawn(connector.add_endpoint(), vec![Behavior::Success(void_ok())]);

    let mut cli = Nfs3Client::connect(MockConnector::clone(&connector), "filer")
        .await
        .expect("connect");
    cli.null().await.expect("null");
    drop(cli);

    let calls = portmap.await.expect("portmap server");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].prog, 100_000);
    assert_eq!(calls[0].proc, 3);
    let mapping: nfsops_types::portmap::mapping = calls[0].decode_args();
    assert_eq!(mapping.prog, 100_003);
    assert_eq!(mapping.vers, 3);
    assert_eq!(mapping.prot, nfsops_types::portmap::IPPROTO_TCP);
    assert_eq!(mapping.port, 0);

    assert_eq!(nfs.await.expect("nfs server").len(), 1);
}
