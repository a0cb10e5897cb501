//! Offline, byte-scripted end-to-end tests for the session facade: a `tokio::io::duplex` pair
//! stands in for the TCP stream to a debugged VM, with this file driving the "VM" side by hand.
//!
//! These exercise the facade's composition of the command layer rather than the dispatcher
//! itself (already covered in `jdwp-client`'s own `session_scenarios.rs`): breakpoint-and-wait,
//! `exec`, and detach/idempotent-stop.

use jdwp_client::connect::JdwpTransport;
use jdwp_client::jdwp_types::SuspendPolicy;
use jdwp_session::{Session, SessionConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

const HANDSHAKE: &[u8; 14] = b"JDWP-Handshake";

struct MockTransport(DuplexStream);

impl JdwpTransport for MockTransport {
    type Input = tokio::io::ReadHalf<DuplexStream>;
    type Output = tokio::io::WriteHalf<DuplexStream>;

    fn split_transport(self) -> (Self::Input, Self::Output) {
        tokio::io::split(self.0)
    }
}

async fn vm_handshake(stream: &mut DuplexStream) {
    let mut buf = [0u8; 14];
    stream.read_exact(&mut buf).await.expect("client never sent the handshake");
    assert_eq!(&buf, HANDSHAKE);
    stream.write_all(HANDSHAKE).await.expect("failed to echo the handshake");
}

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

async fn vm_write_reply(stream: &mut DuplexStream, id: u32, payload: &[u8]) {
    let length = (11 + payload.len()) as u32;
    let mut buf = Vec::with_capacity(length as usize);
    buf.extend_from_slice(&length.to_be_bytes());
    buf.extend_from_slice(&id.to_be_bytes());
    buf.push(0x80);
    buf.extend_from_slice(&0u16.to_be_bytes());
    buf.extend_from_slice(payload);
    stream.write_all(&buf).await.expect("failed to write reply");
}

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

async fn vm_answer_id_sizes(stream: &mut DuplexStream, id: u32) {
    let mut payload = Vec::with_capacity(20);
    for _ in 0..5 {
        payload.extend_from_slice(&8i32.to_be_bytes());
    }
    vm_write_reply(stream, id, &payload).await;
}

fn encode_utf8(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + s.len());
    out.extend_from_slice(&(s.len() as i32).to_be_bytes());
    out.extend_from_slice(s.as_bytes());
    out
}

/// Completes the handshake, `IDSizes`, the session's `ThreadStart` event request, and
/// `AllThreads` - everything `Session::attach` does before returning to the caller.
async fn vm_complete_session_attach(stream: &mut DuplexStream) {
    vm_handshake(stream).await;

    let (id, set, cmd, _) = vm_read_command(stream).await;
    assert_eq!((set, cmd), (1, 7), "expected VirtualMachine.IDSizes");
    vm_answer_id_sizes(stream, id).await;

    let (id, set, cmd, _) = vm_read_command(stream).await;
    assert_eq!((set, cmd), (15, 1), "expected EventRequest.Set for ThreadStart bookkeeping");
    let mut reply = Vec::new();
    reply.extend_from_slice(&100i32.to_be_bytes());
    vm_write_reply(stream, id, &reply).await;

    let (id, set, cmd, _) = vm_read_command(stream).await;
    assert_eq!((set, cmd), (1, 4), "expected VirtualMachine.AllThreads");
    let mut reply = Vec::new();
    reply.extend_from_slice(&0i32.to_be_bytes()); // no known threads yet
    vm_write_reply(stream, id, &reply).await;
}

#[test_log::test(tokio::test)]
async fn set_breakpoint_and_wait_suspends_the_hitting_thread() {
    let (client_side, mut vm_side) = tokio::io::duplex(8192);

    let vm = tokio::spawn(async move {
        vm_complete_session_attach(&mut vm_side).await;

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
        let mut reply = Vec::new();
        reply.extend_from_slice(&1i32.to_be_bytes()); // requestId == 1
        vm_write_reply(&mut vm_side, id, &reply).await;

        // Unsolicited Composite event: the breakpoint firing on thread 0xCAFE.
        let mut event = Vec::new();
        event.push(SuspendPolicy::All as u8);
        event.extend_from_slice(&1i32.to_be_bytes());
        event.push(2); // EventKind::Breakpoint
        event.extend_from_slice(&1i32.to_be_bytes()); // requestId
        event.extend_from_slice(&0xCAFEu64.to_be_bytes()); // threadId
        event.push(1); // Location.tag: Class
        event.extend_from_slice(&0xAAu64.to_be_bytes());
        event.extend_from_slice(&0xBBu64.to_be_bytes());
        event.extend_from_slice(&0u64.to_be_bytes());
        vm_write_command(&mut vm_side, 42, 64, 100, &event).await;

        vm_side
    });

    let session = Session::attach(
        MockTransport(client_side),
        1234,
        "com.example.app",
        SessionConfig::default(),
    )
    .await
    .expect("session attach should succeed");

    let (request_id, thread) = session
        .set_breakpoint_and_wait("Landroid/app/Activity;", "onCreate")
        .await
        .expect("breakpoint should resolve and fire");

    assert_eq!(thread.get(), 0xCAFE);
    assert_eq!(request_id.get(), 1);

    vm.await.expect("vm task panicked");
}

#[test_log::test(tokio::test)]
async fn exec_drives_runtime_getruntime_exec_waitfor_in_order() {
    let (client_side, mut vm_side) = tokio::io::duplex(8192);

    let vm = tokio::spawn(async move {
        vm_complete_session_attach(&mut vm_side).await;

        // ClassesBySignature("Ljava/lang/Runtime;")
        let (id, set, cmd, payload) = vm_read_command(&mut vm_side).await;
        assert_eq!((set, cmd), (1, 2));
        assert!(String::from_utf8_lossy(&payload[4..]).contains("Runtime"));
        let mut reply = Vec::new();
        reply.extend_from_slice(&1i32.to_be_bytes());
        reply.push(1);
        reply.extend_from_slice(&0x10u64.to_be_bytes());
        reply.extend_from_slice(&0i32.to_be_bytes());
        vm_write_reply(&mut vm_side, id, &reply).await;

        // ReferenceType.Methods(Runtime) - only getRuntime and exec are asked for by name.
        let (id, set, cmd, _) = vm_read_command(&mut vm_side).await;
        assert_eq!((set, cmd), (2, 5));
        let mut reply = Vec::new();
        reply.extend_from_slice(&2i32.to_be_bytes());
        reply.extend_from_slice(&0x20u64.to_be_bytes());
        reply.extend_from_slice(&encode_utf8("getRuntime"));
        reply.extend_from_slice(&encode_utf8("()Ljava/lang/Runtime;"));
        reply.extend_from_slice(&0i32.to_be_bytes());
        reply.extend_from_slice(&0x21u64.to_be_bytes());
        reply.extend_from_slice(&encode_utf8("exec"));
        reply.extend_from_slice(&encode_utf8("(Ljava/lang/String;)Ljava/lang/Process;"));
        reply.extend_from_slice(&0i32.to_be_bytes());
        vm_write_reply(&mut vm_side, id, &reply).await;

        // ClassType.InvokeMethod(getRuntime) static on the suspended thread.
        let (id, set, cmd, _) = vm_read_command(&mut vm_side).await;
        assert_eq!((set, cmd), (3, 3));
        let mut reply = Vec::new();
        reply.push(b'L'); // Tag::Object
        reply.extend_from_slice(&0x30u64.to_be_bytes()); // runtime instance
        reply.push(b'L'); // exception tag: Object, null id below means "no exception"
        reply.extend_from_slice(&0u64.to_be_bytes());
        vm_write_reply(&mut vm_side, id, &reply).await;

        // VirtualMachine.CreateString("id")
        let (id, set, cmd, payload) = vm_read_command(&mut vm_side).await;
        assert_eq!((set, cmd), (1, 11));
        assert_eq!(&payload[4..], b"id");
        let mut reply = Vec::new();
        reply.extend_from_slice(&0x40u64.to_be_bytes());
        vm_write_reply(&mut vm_side, id, &reply).await;

        // ObjectReference.InvokeMethod(exec) on the runtime instance.
        let (id, set, cmd, _) = vm_read_command(&mut vm_side).await;
        assert_eq!((set, cmd), (9, 6));
        let mut reply = Vec::new();
        reply.push(b'L');
        reply.extend_from_slice(&0x50u64.to_be_bytes()); // process object
        reply.push(b'L');
        reply.extend_from_slice(&0u64.to_be_bytes());
        vm_write_reply(&mut vm_side, id, &reply).await;

        // ClassesBySignature("Ljava/lang/Process;")
        let (id, set, cmd, payload) = vm_read_command(&mut vm_side).await;
        assert_eq!((set, cmd), (1, 2));
        assert!(String::from_utf8_lossy(&payload[4..]).contains("Process"));
        let mut reply = Vec::new();
        reply.extend_from_slice(&1i32.to_be_bytes());
        reply.push(1);
        reply.extend_from_slice(&0x60u64.to_be_bytes());
        reply.extend_from_slice(&0i32.to_be_bytes());
        vm_write_reply(&mut vm_side, id, &reply).await;

        // ReferenceType.Methods(Process)
        let (id, set, cmd, _) = vm_read_command(&mut vm_side).await;
        assert_eq!((set, cmd), (2, 5));
        let mut reply = Vec::new();
        reply.extend_from_slice(&1i32.to_be_bytes());
        reply.extend_from_slice(&0x70u64.to_be_bytes());
        reply.extend_from_slice(&encode_utf8("waitFor"));
        reply.extend_from_slice(&encode_utf8("()I"));
        reply.extend_from_slice(&0i32.to_be_bytes());
        vm_write_reply(&mut vm_side, id, &reply).await;

        // ObjectReference.InvokeMethod(waitFor) -> exit code 0.
        let (id, set, cmd, _) = vm_read_command(&mut vm_side).await;
        assert_eq!((set, cmd), (9, 6));
        let mut reply = Vec::new();
        reply.push(b'I');
        reply.extend_from_slice(&0i32.to_be_bytes());
        reply.push(b'L');
        reply.extend_from_slice(&0u64.to_be_bytes());
        vm_write_reply(&mut vm_side, id, &reply).await;

        vm_side
    });

    let session = Session::attach(
        MockTransport(client_side),
        1235,
        "com.example.app",
        SessionConfig::default(),
    )
    .await
    .expect("session attach should succeed");

    let exit_code = session
        .exec(Some(jdwp_client::jdwp_types::ThreadId::new(0xCAFE)), "id")
        .await
        .expect("exec should resolve to the child's exit code");
    assert_eq!(exit_code, 0);

    vm.await.expect("vm task panicked");
}

#[test_log::test(tokio::test)]
async fn stop_clears_breakpoints_and_resumes_suspended_threads_then_is_idempotent() {
    let (client_side, mut vm_side) = tokio::io::duplex(8192);

    let vm = tokio::spawn(async move {
        vm_complete_session_attach(&mut vm_side).await;

        // ClassesBySignature + Methods + EventRequest.Set, as in the breakpoint-and-wait test.
        let (id, _, _, _) = vm_read_command(&mut vm_side).await;
        let mut reply = Vec::new();
        reply.extend_from_slice(&1i32.to_be_bytes());
        reply.push(1);
        reply.extend_from_slice(&0xAAu64.to_be_bytes());
        reply.extend_from_slice(&0i32.to_be_bytes());
        vm_write_reply(&mut vm_side, id, &reply).await;

        let (id, _, _, _) = vm_read_command(&mut vm_side).await;
        let mut reply = Vec::new();
        reply.extend_from_slice(&1i32.to_be_bytes());
        reply.extend_from_slice(&0xBBu64.to_be_bytes());
        reply.extend_from_slice(&encode_utf8("onCreate"));
        reply.extend_from_slice(&encode_utf8("(Landroid/os/Bundle;)V"));
        reply.extend_from_slice(&0i32.to_be_bytes());
        vm_write_reply(&mut vm_side, id, &reply).await;

        let (id, _, _, _) = vm_read_command(&mut vm_side).await;
        let mut reply = Vec::new();
        reply.extend_from_slice(&1i32.to_be_bytes());
        vm_write_reply(&mut vm_side, id, &reply).await;

        let mut event = Vec::new();
        event.push(SuspendPolicy::All as u8);
        event.extend_from_slice(&1i32.to_be_bytes());
        event.push(2);
        event.extend_from_slice(&1i32.to_be_bytes());
        event.extend_from_slice(&0xCAFEu64.to_be_bytes());
        event.push(1);
        event.extend_from_slice(&0xAAu64.to_be_bytes());
        event.extend_from_slice(&0xBBu64.to_be_bytes());
        event.extend_from_slice(&0u64.to_be_bytes());
        vm_write_command(&mut vm_side, 42, 64, 100, &event).await;

        // stop(): EventRequest.Clear(BREAKPOINT, 1), then ThreadReference.Resume(0xCAFE).
        let (id, set, cmd, payload) = vm_read_command(&mut vm_side).await;
        assert_eq!((set, cmd), (15, 2), "expected EventRequest.Clear");
        assert_eq!(payload[4..].len(), 4);
        vm_write_reply(&mut vm_side, id, &[]).await;

        let (id, set, cmd, _) = vm_read_command(&mut vm_side).await;
        assert_eq!((set, cmd), (11, 3), "expected ThreadReference.Resume");
        vm_write_reply(&mut vm_side, id, &[]).await;

        vm_side
    });

    let session = Session::attach(
        MockTransport(client_side),
        1236,
        "com.example.app",
        SessionConfig::default(),
    )
    .await
    .expect("session attach should succeed");

    session
        .set_breakpoint_and_wait("Landroid/app/Activity;", "onCreate")
        .await
        .expect("breakpoint should fire");

    session.stop().await.expect("stop should clear breakpoints and resume threads");
    // A second stop must not try to clear/resume anything already cleared - the registries are
    // empty, so this returns immediately without sending any further wire traffic.
    session.stop().await.expect("stop must be idempotent");

    vm.await.expect("vm task panicked");
}
