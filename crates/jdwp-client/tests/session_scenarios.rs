//! Offline, byte-scripted end-to-end tests: a `tokio::io::duplex` pair stands in for the TCP
//! stream to a debugged VM, with this file driving the "VM" side by hand.

use jdwp_client::config::ClientConfig;
use jdwp_client::connect::JdwpTransport;
use jdwp_client::error::JdwpError;
use jdwp_client::jdwp_types::{RequestId, SuspendPolicy};
use jdwp_client::JdwpClient;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

const HANDSHAKE: &[u8; 14] = b"JDWP-Handshake";

/// Wraps one half of an in-memory duplex pipe as a [`JdwpTransport`].
struct MockTransport(DuplexStream);

impl JdwpTransport for MockTransport {
    type Input = tokio::io::ReadHalf<DuplexStream>;
    type Output = tokio::io::WriteHalf<DuplexStream>;

    fn split_transport(self) -> (Self::Input, Self::Output) {
        tokio::io::split(self.0)
    }
}

/// Performs the VM side of the handshake: reads the client's 14 bytes, then echoes them back.
async fn vm_handshake(stream: &mut DuplexStream) {
    let mut buf = [0u8; 14];
    stream.read_exact(&mut buf).await.expect("client never sent the handshake");
    assert_eq!(&buf, HANDSHAKE, "client sent an unexpected handshake");
    stream.write_all(HANDSHAKE).await.expect("failed to echo the handshake");
}

/// Reads one raw command packet header + payload off the VM side.
async fn vm_read_command(stream: &mut DuplexStream) -> (u32, u8, u8, Vec<u8>) {
    let mut header = [0u8; 11];
    stream.read_exact(&mut header).await.expect("client never sent a command");
    let length = u32::from_be_bytes(header[0..4].try_into().unwrap()) as usize;
    let id = u32::from_be_bytes(header[4..8].try_into().unwrap());
    let command_set = header[9];
    let command = header[10];
    let mut payload = vec![0u8; length - 11];
    if !payload.is_empty() {
        stream.read_exact(&mut payload).await.expect("truncated command payload");
    }
    (id, command_set, command, payload)
}

/// Writes a reply packet with `error_code == 0` and the given already-encoded payload.
async fn vm_write_reply(stream: &mut DuplexStream, id: u32, payload: &[u8]) {
    vm_write_reply_with_error(stream, id, 0, payload).await
}

async fn vm_write_reply_with_error(stream: &mut DuplexStream, id: u32, error_code: u16, payload: &[u8]) {
    let length = (11 + payload.len()) as u32;
    let mut buf = Vec::with_capacity(length as usize);
    buf.extend_from_slice(&length.to_be_bytes());
    buf.extend_from_slice(&id.to_be_bytes());
    buf.push(0x80);
    buf.extend_from_slice(&error_code.to_be_bytes());
    buf.extend_from_slice(payload);
    stream.write_all(&buf).await.expect("failed to write reply");
}

/// Writes a command packet (used by the VM to push unsolicited Composite event packets).
async fn vm_write_command(stream: &mut DuplexStream, id: u32, command_set: u8, command: u8, payload: &[u8]) {
    let length = (11 + payload.len()) as u32;
    let mut buf = Vec::with_capacity(length as usize);
    buf.extend_from_slice(&length.to_be_bytes());
    buf.extend_from_slice(&id.to_be_bytes());
    buf.push(0x00);
    buf.push(command_set);
    buf.push(command);
    buf.extend_from_slice(payload);
    stream.write_all(&buf).await.expect("failed to write command");
}

/// Replies to the `VirtualMachine.IDSizes` command the dispatcher issues right after the
/// handshake, reporting the 8-byte-everything Android profile.
async fn vm_answer_id_sizes(stream: &mut DuplexStream, id: u32) {
    let mut payload = Vec::with_capacity(20);
    for _ in 0..5 {
        payload.extend_from_slice(&8i32.to_be_bytes());
    }
    vm_write_reply(stream, id, &payload).await;
}

/// Completes the handshake and the id-size negotiation the same way every successful `attach`
/// does, returning the packet id the dispatcher used for `IDSizes` (always `1`).
async fn vm_complete_attach(stream: &mut DuplexStream) -> u32 {
    vm_handshake(stream).await;
    let (id, command_set, command, _payload) = vm_read_command(stream).await;
    assert_eq!((command_set, command), (1, 7), "expected VirtualMachine.IDSizes first");
    vm_answer_id_sizes(stream, id).await;
    id
}

fn encode_breakpoint_event(request_id: i32, thread_id: u64, class_id: u64, method_id: u64, offset: u64) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.push(SuspendPolicy::All as u8);
    payload.extend_from_slice(&1i32.to_be_bytes()); // one event in this Composite packet
    payload.push(2); // EventKind::Breakpoint
    payload.extend_from_slice(&request_id.to_be_bytes());
    payload.extend_from_slice(&thread_id.to_be_bytes());
    payload.push(1); // Location.tag: TypeTag::Class
    payload.extend_from_slice(&class_id.to_be_bytes());
    payload.extend_from_slice(&method_id.to_be_bytes());
    payload.extend_from_slice(&offset.to_be_bytes());
    payload
}

fn encode_utf8(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + s.len());
    out.extend_from_slice(&(s.len() as i32).to_be_bytes());
    out.extend_from_slice(s.as_bytes());
    out
}

#[test_log::test(tokio::test)]
async fn attach_succeeds_after_handshake_and_id_size_negotiation() {
    let (client_side, mut vm_side) = tokio::io::duplex(4096);

    let vm = tokio::spawn(async move {
        vm_complete_attach(&mut vm_side).await;
        vm_side
    });

    let client = JdwpClient::attach(MockTransport(client_side), ClientConfig::default())
        .await
        .expect("attach should succeed once the VM answers the handshake and IDSizes");
    assert!(!client.is_disconnected());

    vm.await.expect("vm task panicked");
}

#[test_log::test(tokio::test)]
async fn attach_fails_on_id_size_mismatch() {
    let (client_side, mut vm_side) = tokio::io::duplex(4096);

    let vm = tokio::spawn(async move {
        vm_handshake(&mut vm_side).await;
        let (id, _set, _cmd, _payload) = vm_read_command(&mut vm_side).await;
        // Report 4-byte ids instead of the configured 8-byte Android profile.
        let mut payload = Vec::with_capacity(20);
        for _ in 0..5 {
            payload.extend_from_slice(&4i32.to_be_bytes());
        }
        vm_write_reply(&mut vm_side, id, &payload).await;
    });

    let err = JdwpClient::attach(MockTransport(client_side), ClientConfig::default())
        .await
        .expect_err("a 4-byte id profile must not silently be accepted as the 8-byte default");
    assert!(matches!(err, JdwpError::IdSizeMismatch { .. }));

    vm.await.expect("vm task panicked");
}

#[test_log::test(tokio::test)]
async fn breakpoint_event_is_delivered_to_its_requesting_subscriber() {
    let (client_side, mut vm_side) = tokio::io::duplex(4096);

    let vm = tokio::spawn(async move {
        vm_complete_attach(&mut vm_side).await;
        // The mock VM doesn't need to understand EventRequest.Set's payload to answer it - it
        // only needs to hand back a request id.
        let (id, command_set, command, _payload) = vm_read_command(&mut vm_side).await;
        assert_eq!((command_set, command), (15, 1), "expected EventRequest.Set");
        let mut reply = Vec::new();
        reply.extend_from_slice(&1i32.to_be_bytes()); // requestId == 1
        vm_write_reply(&mut vm_side, id, &reply).await;

        let event = encode_breakpoint_event(1, 0xCAFE, 0xAA, 0xBB, 0);
        vm_write_command(&mut vm_side, 42, 64, 100, &event).await;
        vm_side
    });

    let client = JdwpClient::attach(MockTransport(client_side), ClientConfig::default())
        .await
        .expect("attach should succeed");

    let request_id = RequestId::new(1);
    let mut events = client.subscribe_channel(request_id).await;

    let reply = client
        .send(jdwp_client::commands::SetEventRequest {
            event_kind: jdwp_client::jdwp_types::EventKind::Breakpoint,
            suspend_policy: SuspendPolicy::All,
            modifiers: vec![],
        })
        .await
        .expect("EventRequest.Set should succeed");
    assert_eq!(reply.request_id, request_id);

    let (policy, event) = events.recv().await.expect("breakpoint event should arrive");
    assert_eq!(policy, SuspendPolicy::All);
    match event {
        jdwp_client::events::Event::Breakpoint { request_id: rid, thread, .. } => {
            assert_eq!(rid, request_id);
            assert_eq!(thread.get(), 0xCAFE);
        }
        other => panic!("expected a Breakpoint event, got {other:?}"),
    }

    vm.await.expect("vm task panicked");
}

#[test_log::test(tokio::test)]
async fn command_times_out_then_a_late_reply_is_dropped_without_crashing() {
    let (client_side, mut vm_side) = tokio::io::duplex(4096);

    let vm = tokio::spawn(async move {
        vm_complete_attach(&mut vm_side).await;

        // Never reply to the first Version command - let the client's timeout fire.
        let (late_id, command_set, command, _payload) = vm_read_command(&mut vm_side).await;
        assert_eq!((command_set, command), (1, 1), "expected VirtualMachine.Version");
        tokio::time::sleep(Duration::from_millis(150)).await;
        // The reply arrives well after the client gave up; it must be logged and dropped.
        vm_write_reply(&mut vm_side, late_id, b"\0\0\0\0garbage-that-is-never-decoded").await;

        // A second command on the same connection must still complete normally afterwards,
        // proving the dispatcher survived the late reply.
        let (id, command_set, command, _payload) = vm_read_command(&mut vm_side).await;
        assert_eq!((command_set, command), (1, 1));
        let mut payload = Vec::new();
        payload.extend_from_slice(&0i32.to_be_bytes()); // description (empty string)
        payload.extend_from_slice(&8i32.to_be_bytes()); // jdwp_major
        payload.extend_from_slice(&0i32.to_be_bytes()); // jdwp_minor
        payload.extend_from_slice(&0i32.to_be_bytes()); // vm_version (empty string)
        payload.extend_from_slice(&0i32.to_be_bytes()); // vm_name (empty string)
        vm_write_reply(&mut vm_side, id, &payload).await;
    });

    let mut config = ClientConfig::default();
    config.command_timeout = Duration::from_millis(50);
    let client = JdwpClient::attach(MockTransport(client_side), config)
        .await
        .expect("attach should succeed");

    let err = client
        .send(jdwp_client::commands::Version)
        .await
        .expect_err("no reply within the timeout must surface JdwpError::Timeout");
    assert!(matches!(err, JdwpError::Timeout));

    // The late reply above should simply be dropped; the dispatcher keeps working.
    let version = client
        .send(jdwp_client::commands::Version)
        .await
        .expect("the dispatcher must still answer new commands after a late reply");
    assert_eq!(version.jdwp_major, 8);

    vm.await.expect("vm task panicked");
}

#[test_log::test(tokio::test)]
async fn vm_death_and_disconnect_rejects_every_pending_waiter() {
    let (client_side, mut vm_side) = tokio::io::duplex(4096);

    let vm = tokio::spawn(async move {
        vm_complete_attach(&mut vm_side).await;
        // Consume (but never answer) the Version command the test sends.
        let _ = vm_read_command(&mut vm_side).await;
        // Close the connection without replying - the dispatcher's read loop observes EOF.
        drop(vm_side);
    });

    let client = JdwpClient::attach(MockTransport(client_side), ClientConfig::default())
        .await
        .expect("attach should succeed");

    let err = client
        .send(jdwp_client::commands::Version)
        .await
        .expect_err("a dropped transport must reject the pending waiter");
    assert!(matches!(err, JdwpError::Disconnected));

    // Give the background read loop a moment to flip the disconnected flag after EOF.
    for _ in 0..50 {
        if client.is_disconnected() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(client.is_disconnected(), "dispatcher must mark itself disconnected on EOF");

    vm.await.expect("vm task panicked");
}

#[test_log::test(tokio::test)]
async fn vm_death_event_disconnects_without_waiting_for_eof() {
    let (client_side, mut vm_side) = tokio::io::duplex(4096);

    let vm = tokio::spawn(async move {
        vm_complete_attach(&mut vm_side).await;
        // Consume (but never answer) the Version command the test sends.
        let _ = vm_read_command(&mut vm_side).await;

        // A VM_DEATH event carries no thread field - just requestId.
        let mut payload = Vec::new();
        payload.push(SuspendPolicy::All as u8);
        payload.extend_from_slice(&1i32.to_be_bytes());
        payload.push(99); // EventKind::VmDeath
        payload.extend_from_slice(&0i32.to_be_bytes()); // requestId (wildcard/unsolicited)
        vm_write_command(&mut vm_side, 0, 64, 100, &payload).await;

        vm_side
    });

    let client = JdwpClient::attach(MockTransport(client_side), ClientConfig::default())
        .await
        .expect("attach should succeed");

    let err = client
        .send(jdwp_client::commands::Version)
        .await
        .expect_err("a VM_DEATH composite event must reject the pending waiter");
    assert!(matches!(err, JdwpError::Disconnected));

    for _ in 0..50 {
        if client.is_disconnected() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(
        client.is_disconnected(),
        "dispatcher must mark itself disconnected after a VM_DEATH event, without needing EOF"
    );

    let _ = vm.await.expect("vm task panicked");
}

#[test_log::test(tokio::test)]
async fn set_breakpoint_and_wait_catches_a_hit_that_arrives_before_the_set_reply() {
    let (client_side, mut vm_side) = tokio::io::duplex(8192);

    let vm = tokio::spawn(async move {
        vm_complete_attach(&mut vm_side).await;

        // ClassesBySignature("Landroid/app/Activity;")
        let (id, set, cmd, _) = vm_read_command(&mut vm_side).await;
        assert_eq!((set, cmd), (1, 2));
        let mut reply = Vec::new();
        reply.extend_from_slice(&1i32.to_be_bytes()); // one class
        reply.push(1); // TypeTag::Class
        reply.extend_from_slice(&0xAAu64.to_be_bytes()); // refTypeId
        reply.extend_from_slice(&0i32.to_be_bytes()); // status bitfield
        vm_write_reply(&mut vm_side, id, &reply).await;

        // ReferenceType.Methods(0xAA)
        let (id, set, cmd, _) = vm_read_command(&mut vm_side).await;
        assert_eq!((set, cmd), (2, 5));
        let mut reply = Vec::new();
        reply.extend_from_slice(&1i32.to_be_bytes()); // one method
        reply.extend_from_slice(&0xBBu64.to_be_bytes()); // methodId
        reply.extend_from_slice(&encode_utf8("onCreate"));
        reply.extend_from_slice(&encode_utf8("(Landroid/os/Bundle;)V"));
        reply.extend_from_slice(&0i32.to_be_bytes()); // modifiers
        vm_write_reply(&mut vm_side, id, &reply).await;

        // EventRequest.Set(BREAKPOINT, ALL, [LocationOnly({1, 0xAA, 0xBB, 0})])
        let (id, set, cmd, _) = vm_read_command(&mut vm_side).await;
        assert_eq!((set, cmd), (15, 1));

        // Deliver the unsolicited Composite event for this exact breakpoint *before* replying to
        // the Set command that armed it - the tightest version of the window a by-request-id
        // subscription installed only after the Set reply would already be too late for. A
        // subscriber keyed on the resolved location (registered ahead of Set) must still catch it.
        let event = encode_breakpoint_event(1, 0xCAFE, 0xAA, 0xBB, 0);
        vm_write_command(&mut vm_side, 42, 64, 100, &event).await;

        let mut reply = Vec::new();
        reply.extend_from_slice(&1i32.to_be_bytes()); // requestId == 1
        vm_write_reply(&mut vm_side, id, &reply).await;

        vm_side
    });

    let client = JdwpClient::attach(MockTransport(client_side), ClientConfig::default())
        .await
        .expect("attach should succeed");

    let (request_id, thread, _location) = tokio::time::timeout(
        Duration::from_secs(2),
        jdwp_client::requests::set_breakpoint_and_wait(&client, "Landroid/app/Activity;", "onCreate"),
    )
    .await
    .expect("set_breakpoint_and_wait must not hang when the hit races the Set reply")
    .expect("set_breakpoint_and_wait should resolve");

    assert_eq!(request_id, RequestId::new(1));
    assert_eq!(thread.get(), 0xCAFE);

    vm.await.expect("vm task panicked");
}
