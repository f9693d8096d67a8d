//! End-to-end wire-protocol tests: a real `Service` bound to an ephemeral
//! port, driven by a raw `TcpStream` speaking the frame codec directly.

use std::net::SocketAddr;
use std::sync::Arc;

use kvd_proto::frame::encode_i32;
use kvd_proto::{Frame, OpCode, Status};
use kvd_core::{Service, ServiceHandle, DEFAULT_PORT};
use kvd_store::{Registry, StoreOptions};
use serial_test::serial;
use tokio::net::{TcpListener, TcpStream};

async fn start_service() -> (tempfile::TempDir, ServiceHandle, SocketAddr) {
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(
        Registry::bootstrap(dir.path().to_path_buf(), StoreOptions::default())
            .await
            .unwrap(),
    );

    let reserved = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = reserved.local_addr().unwrap();
    drop(reserved);

    let handle = Service::start(addr, registry);
    // Give the acceptor a moment to bind before the test connects.
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    (dir, handle, addr)
}

async fn roundtrip(stream: &mut TcpStream, request: Frame) -> Frame {
    request.write(stream).await.unwrap();
    Frame::read(stream).await.unwrap()
}

fn put_payload(key: &[u8], value: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&encode_i32(key.len() as i32));
    buf.extend_from_slice(&encode_i32(value.len() as i32));
    buf.extend_from_slice(key);
    buf.extend_from_slice(value);
    buf
}

#[test_log::test(tokio::test)]
async fn login_replies_ok() {
    let (_dir, handle, addr) = start_service().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    let reply = roundtrip(&mut stream, Frame::header_only(OpCode::Login as i32)).await;
    assert_eq!(reply.code, i32::from(Status::Ok));

    handle.stop().await;
}

#[test_log::test(tokio::test)]
async fn create_then_open_then_put_get() {
    let (_dir, handle, addr) = start_service().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    let reply = roundtrip(
        &mut stream,
        Frame::with_payload(OpCode::Create as i32, b"demo".to_vec()),
    )
    .await;
    assert_eq!(reply.code, i32::from(Status::Ok));

    let reply = roundtrip(
        &mut stream,
        Frame::with_payload(OpCode::Open as i32, b"demo".to_vec()),
    )
    .await;
    assert_eq!(reply.code, i32::from(Status::Ok));

    let reply = roundtrip(
        &mut stream,
        Frame::with_payload(OpCode::Put as i32, put_payload(b"k", b"v")),
    )
    .await;
    assert_eq!(reply.code, i32::from(Status::Ok));

    let reply = roundtrip(&mut stream, Frame::with_payload(OpCode::Get as i32, b"k".to_vec())).await;
    assert_eq!(reply.code, i32::from(Status::Ok));
    assert_eq!(reply.payload, b"v");

    handle.stop().await;
}

#[test_log::test(tokio::test)]
async fn get_of_missing_key_is_not_found() {
    let (_dir, handle, addr) = start_service().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    roundtrip(
        &mut stream,
        Frame::with_payload(OpCode::Create as i32, b"demo".to_vec()),
    )
    .await;
    roundtrip(
        &mut stream,
        Frame::with_payload(OpCode::Open as i32, b"demo".to_vec()),
    )
    .await;

    let reply = roundtrip(
        &mut stream,
        Frame::with_payload(OpCode::Get as i32, b"ghost".to_vec()),
    )
    .await;
    assert_eq!(reply.code, i32::from(Status::NotFound));

    handle.stop().await;
}

#[test_log::test(tokio::test)]
async fn atomic_batch_applies_all_ops() {
    let (_dir, handle, addr) = start_service().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    roundtrip(
        &mut stream,
        Frame::with_payload(OpCode::Create as i32, b"demo".to_vec()),
    )
    .await;
    roundtrip(
        &mut stream,
        Frame::with_payload(OpCode::Open as i32, b"demo".to_vec()),
    )
    .await;
    roundtrip(
        &mut stream,
        Frame::with_payload(OpCode::Put as i32, put_payload(b"a", b"old")),
    )
    .await;

    let mut payload = Vec::new();
    payload.extend_from_slice(&encode_i32(2));
    payload.extend_from_slice(&encode_i32(4)); // PUT
    payload.extend_from_slice(&encode_i32(1));
    payload.extend_from_slice(&encode_i32(1));
    payload.extend_from_slice(b"a");
    payload.extend_from_slice(b"1");
    payload.extend_from_slice(&encode_i32(7)); // DELETE
    payload.extend_from_slice(&encode_i32(1));
    payload.extend_from_slice(b"b");

    let reply = roundtrip(&mut stream, Frame::with_payload(OpCode::Batch as i32, payload)).await;
    assert_eq!(reply.code, i32::from(Status::Ok));

    let reply = roundtrip(&mut stream, Frame::with_payload(OpCode::Get as i32, b"a".to_vec())).await;
    assert_eq!(reply.payload, b"1");
    let reply = roundtrip(&mut stream, Frame::with_payload(OpCode::Get as i32, b"b".to_vec())).await;
    assert_eq!(reply.code, i32::from(Status::NotFound));

    handle.stop().await;
}

#[test_log::test(tokio::test)]
async fn malformed_batch_leaves_the_database_untouched() {
    let (_dir, handle, addr) = start_service().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    roundtrip(
        &mut stream,
        Frame::with_payload(OpCode::Create as i32, b"demo".to_vec()),
    )
    .await;
    roundtrip(
        &mut stream,
        Frame::with_payload(OpCode::Open as i32, b"demo".to_vec()),
    )
    .await;
    roundtrip(
        &mut stream,
        Frame::with_payload(OpCode::Put as i32, put_payload(b"a", b"9")),
    )
    .await;

    let mut payload = Vec::new();
    payload.extend_from_slice(&encode_i32(2));
    payload.extend_from_slice(&encode_i32(4)); // PUT a=99, would overwrite if applied
    payload.extend_from_slice(&encode_i32(1));
    payload.extend_from_slice(&encode_i32(2));
    payload.extend_from_slice(b"a");
    payload.extend_from_slice(b"99");
    payload.extend_from_slice(&encode_i32(99)); // unrecognized sub-opcode

    let reply = roundtrip(&mut stream, Frame::with_payload(OpCode::Batch as i32, payload)).await;
    assert_eq!(reply.code, i32::from(Status::BadCommand));

    let reply = roundtrip(&mut stream, Frame::with_payload(OpCode::Get as i32, b"a".to_vec())).await;
    assert_eq!(reply.payload, b"9");

    handle.stop().await;
}

#[test_log::test(tokio::test)]
async fn commands_requiring_a_store_are_rejected_before_open() {
    let (_dir, handle, addr) = start_service().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    let reply = roundtrip(&mut stream, Frame::with_payload(OpCode::Get as i32, b"k".to_vec())).await;
    assert_eq!(reply.code, i32::from(Status::NoDbSelected));

    let reply = roundtrip(
        &mut stream,
        Frame::with_payload(OpCode::Put as i32, put_payload(b"k", b"v")),
    )
    .await;
    assert_eq!(reply.code, i32::from(Status::NoDbSelected));

    handle.stop().await;
}

#[test_log::test(tokio::test)]
async fn list_reflects_created_databases_over_the_wire() {
    let (_dir, handle, addr) = start_service().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    roundtrip(
        &mut stream,
        Frame::with_payload(OpCode::Create as i32, b"demo".to_vec()),
    )
    .await;

    let reply = roundtrip(&mut stream, Frame::header_only(OpCode::List as i32)).await;
    assert_eq!(reply.code, i32::from(Status::Ok));
    let count = kvd_proto::frame::decode_i32(&reply.payload[0..4]);
    assert_eq!(count, 1);
    let name_len = kvd_proto::frame::decode_i32(&reply.payload[4..8]) as usize;
    assert_eq!(&reply.payload[8..8 + name_len], b"demo");

    handle.stop().await;
}

/// Binds the literal default port rather than an ephemeral one, so this
/// test needs exclusive use of it — `#[serial]` keeps it from racing any
/// other test in the binary that does the same.
#[serial]
#[test_log::test(tokio::test)]
async fn service_listens_on_the_documented_default_port() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(
        Registry::bootstrap(dir.path().to_path_buf(), StoreOptions::default())
            .await
            .unwrap(),
    );

    let addr = SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT));
    let handle = Service::start(addr, registry);
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    let reply = roundtrip(&mut stream, Frame::header_only(OpCode::Login as i32)).await;
    assert_eq!(reply.code, i32::from(Status::Ok));

    handle.stop().await;
}
