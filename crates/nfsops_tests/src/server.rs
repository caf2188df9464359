//! A scripted RPC server: it answers each incoming call with the next
//! behavior from its script, then drains the connection and reports the
//! calls it saw.

use std::io::Cursor;

use nfsops_types::rpc::{
    accept_stat_data, accepted_reply, auth_stat, msg_body, opaque_auth, rejected_reply,
    reply_body, rpc_msg,
};
use nfsops_types::xdr::{Pack, Unpack};

use crate::io::ServerEnd;

/// How to answer one incoming call.
pub enum Behavior {
    /// MSG_ACCEPTED / SUCCESS with these result-body bytes.
    Success(Vec<u8>),
    /// Like `Success`, but the reply is split into fragments of the
    /// given size.
    SuccessFragmented(Vec<u8>, usize),
    /// Like `Success`, but under the wrong XID.
    SuccessWrongXid(Vec<u8>),
    /// MSG_ACCEPTED with a non-SUCCESS accept-stat.
    AcceptError(accept_stat_data),
    /// MSG_DENIED / RPC_MISMATCH with the given version range.
    DeniedRpcMismatch { low: u32, high: u32 },
    /// MSG_DENIED / AUTH_ERROR.
    DeniedAuthError(auth_stat),
    /// Swallow the call without answering; the client times out.
    Ignore,
    /// Close the connection after receiving the call.
    Close,
}

/// One call as the server saw it.
pub struct Call {
    pub xid: u32,
    pub prog: u32,
    pub vers: u32,
    pub proc: u32,
    /// The marshalled argument bytes following the call header.
    pub args: Vec<u8>,
}

impl Call {
    pub fn decode_args<T: Unpack>(&self) -> T {
        let mut cursor = Cursor::new(self.args.as_slice());
        let (value, read) = T::unpack(&mut cursor).expect("decode call args");
        assert_eq!(read as u64, cursor.get_ref().len() as u64, "trailing arg bytes");
        value
    }
}

/// Runs the script on its own task and resolves to the observed calls
/// once the client disconnects.
pub fn spawn(mut end: ServerEnd, script: Vec<Behavior>) -> tokio::task::JoinHandle<Vec<Call>> {
    tokio::spawn(async move {
        let mut calls = Vec::new();
        for behavior in script {
            let Some(record) = end.recv_record().await else {
                return calls;
            };
            let call = parse_call(&record);
            let xid = call.xid;
            calls.push(call);

            match behavior {
                Behavior::Success(body) => end.send_record(&success_reply(xid, &body)),
                Behavior::SuccessFragmented(body, size) => {
                    end.send_fragmented(&success_reply(xid, &body), size);
                }
                Behavior::SuccessWrongXid(body) => {
                    end.send_record(&success_reply(xid.wrapping_add(1), &body));
                }
                Behavior::AcceptError(stat) => end.send_record(&accepted_reply_bytes(xid, stat)),
                Behavior::DeniedRpcMismatch { low, high } => {
                    end.send_record(&denied_reply(xid, rejected_reply::RPC_MISMATCH { low, high }));
                }
                Behavior::DeniedAuthError(stat) => {
                    end.send_record(&denied_reply(xid, rejected_reply::AUTH_ERROR(stat)));
                }
                Behavior::Ignore => {}
                Behavior::Close => return calls,
            }
        }
        end.drain().await;
        calls
    })
}

fn parse_call(record: &[u8]) -> Call {
    let mut cursor = Cursor::new(record);
    let (msg, _) = rpc_msg::unpack(&mut cursor).expect("decode call message");
    let msg_body::CALL(body) = msg.body else {
        panic!("expected a CALL message");
    };
    let args = record[cursor.position() as usize..].to_vec();
    Call {
        xid: msg.xid,
        prog: body.prog,
        vers: body.vers,
        proc: body.proc,
        args,
    }
}

/// Packs any value into its wire bytes.
pub fn pack_value<T: Pack>(value: &T) -> Vec<u8> {
    let mut buf = Vec::with_capacity(value.packed_size());
    value.pack(&mut buf).expect("pack value");
    buf
}

fn success_reply(xid: u32, body: &[u8]) -> Vec<u8> {
    let mut buf = accepted_reply_bytes(xid, accept_stat_data::SUCCESS);
    buf.extend_from_slice(body);
    buf
}

fn accepted_reply_bytes(xid: u32, stat: accept_stat_data) -> Vec<u8> {
    let msg = rpc_msg {
        xid,
        body: msg_body::REPLY(reply_body::MSG_ACCEPTED(accepted_reply {
            verf: opaque_auth::default(),
            reply_data: stat,
        })),
    };
    pack_value(&msg)
}

fn denied_reply(xid: u32, reply: rejected_reply) -> Vec<u8> {
    let msg = rpc_msg {
        xid,
        body: msg_body::REPLY(reply_body::MSG_DENIED(reply)),
    };
    pack_value(&msg)
}
