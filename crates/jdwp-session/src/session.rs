//! The debug-session facade: per-PID session lifecycle, a breakpoint registry, thread
//! bookkeeping, and the higher-level operations (`exec`, `loadLibrary`, local-variable
//! inspection) built on top of method invocation.

use crate::error::SessionError;
use jdwp_client::commands::{
    AllThreads, ArrayLength, ArrayRegion, CreateString, FrameInfo, GetValues, InvokeStaticMethod,
    ObjectInvokeMethod, ObjectReferenceType, Signature, SlotRequest, StackFrameGetValues,
    ThreadFrames, ThreadResume, ThreadSuspend, VariableTable,
};
use jdwp_client::connect::JdwpTransport;
use jdwp_client::events::{Event, EventHandler};
use jdwp_client::requests;
use jdwp_client::{ClientConfig, JdwpClient, JdwpError};
use jdwp_types::{
    ArrayId, ClassId, FrameId, Location, ObjectId, ReferenceTypeId, RequestId, StepDepth,
    StepSize, SuspendPolicy, ThreadId, Value,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, OnceLock};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::RwLock;
use tracing::{instrument, warn};

fn session_registry() -> &'static Mutex<HashSet<u32>> {
    static REGISTRY: OnceLock<Mutex<HashSet<u32>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashSet::new()))
}

/// Locks the process-wide registry of attached pids, recovering from poisoning rather than
/// panicking - a panicked holder elsewhere in the process is not this session's problem.
fn lock_registry() -> std::sync::MutexGuard<'static, HashSet<u32>> {
    session_registry().lock().unwrap_or_else(|e| e.into_inner())
}

/// Configuration for a [`Session`], layering session-level defaults over the dispatcher's own
/// [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// The dispatcher configuration to attach with.
    pub client: ClientConfig,
}

/// A single entry of the breakpoint registry: what was asked for, where it resolved to, and how
/// many times it has fired.
#[derive(Debug, Clone)]
pub struct Breakpoint {
    pub request_id: RequestId,
    pub class_signature: String,
    pub method_name: String,
    pub location: Location,
    pub enabled: bool,
    pub hit_count: u64,
}

/// A resolved local variable from a suspended frame, as returned by
/// [`Session::get_local_variables`].
#[derive(Debug, Clone)]
pub struct LocalVariable {
    pub name: String,
    pub signature: String,
    pub value: Value,
}

/// A resolved object summary, as returned by [`Session::inspect_object`].
#[derive(Debug, Clone)]
pub struct ObjectSummary {
    pub object_id: ObjectId,
    pub type_id: ReferenceTypeId,
    pub signature: String,
}

/// A per-PID debug session: owns one [`JdwpClient`] dispatcher plus the bookkeeping (breakpoint
/// registry, known/suspended thread sets) that the wire protocol itself has no notion of.
pub struct Session<T: JdwpTransport> {
    client: Arc<JdwpClient<T>>,
    pid: u32,
    package_name: String,
    breakpoints: Arc<RwLock<HashMap<RequestId, Breakpoint>>>,
    known_threads: Arc<RwLock<HashSet<ThreadId>>>,
    suspended_threads: Arc<RwLock<HashSet<ThreadId>>>,
}

impl Session<TcpStream> {
    /// Connects to a JDWP service listening on `addr` (typically a locally forwarded Android
    /// debug port) and attaches a session for `pid`.
    pub async fn attach_tcp<A: ToSocketAddrs>(
        addr: A,
        pid: u32,
        package_name: impl Into<String>,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(JdwpError::Transport)?;
        Self::attach(stream, pid, package_name, config).await
    }
}

impl<T> Session<T>
where
    T: JdwpTransport,
{
    /// Attaches a new session to `pid` over `transport`. Rejects with
    /// [`JdwpError::DuplicateSession`] if a session for this pid is already open in this process.
    #[instrument(skip(transport, config), fields(pid))]
    pub async fn attach(
        transport: T,
        pid: u32,
        package_name: impl Into<String>,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        if !lock_registry().insert(pid) {
            return Err(JdwpError::DuplicateSession(pid).into());
        }

        let client = match JdwpClient::attach(transport, config.client).await {
            Ok(client) => Arc::new(client),
            Err(e) => {
                lock_registry().remove(&pid);
                return Err(e.into());
            }
        };

        let known_threads = Arc::new(RwLock::new(HashSet::new()));
        let suspended_threads = Arc::new(RwLock::new(HashSet::new()));
        let breakpoints = Arc::new(RwLock::new(HashMap::new()));

        {
            let known_threads = known_threads.clone();
            let suspended_threads = suspended_threads.clone();
            client
                .on_event(move |policy: SuspendPolicy, event: Event| {
                    let known_threads = known_threads.clone();
                    let suspended_threads = suspended_threads.clone();
                    async move {
                        match event {
                            Event::ThreadStart { thread, .. } => {
                                known_threads.write().await.insert(thread);
                            }
                            Event::ThreadDeath { thread, .. } => {
                                known_threads.write().await.remove(&thread);
                                suspended_threads.write().await.remove(&thread);
                            }
                            Event::Breakpoint { thread, .. }
                                if matches!(
                                    policy,
                                    SuspendPolicy::All | SuspendPolicy::EventThread
                                ) =>
                            {
                                suspended_threads.write().await.insert(thread);
                            }
                            Event::VmDeath { .. } | Event::VmDisconnected => {
                                warn!("target VM reported death/disconnect");
                            }
                            _ => {}
                        }
                        Ok::<(), JdwpError>(())
                    }
                })
                .await;
        }

        if let Err(e) =
            requests::setup_event(&client, jdwp_types::EventKind::ThreadStart, SuspendPolicy::None, vec![])
                .await
        {
            warn!("failed to request thread-start notifications, thread bookkeeping may lag: {e}");
        }

        if let Ok(reply) = client.send(AllThreads).await {
            known_threads.write().await.extend(reply.threads);
        }

        Ok(Session {
            client,
            pid,
            package_name: package_name.into(),
            breakpoints,
            known_threads,
            suspended_threads,
        })
    }

    /// The pid this session was attached to.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// The Android package name this session was started for.
    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    /// Detaches from the target VM: clears every recorded breakpoint, resumes every thread the
    /// session suspended, then releases the pid for re-attachment. Individual clear/resume
    /// failures are logged and do not abort the rest of the teardown.
    #[instrument(skip(self), fields(pid = self.pid))]
    pub async fn stop(&self) -> Result<(), SessionError> {
        let request_ids: Vec<RequestId> = self.breakpoints.read().await.keys().copied().collect();
        for request_id in request_ids {
            if let Err(e) = requests::clear_breakpoint(&self.client, request_id).await {
                warn!(?request_id, "failed to clear breakpoint during stop: {e}");
            }
        }
        self.breakpoints.write().await.clear();

        let threads: Vec<ThreadId> = self.suspended_threads.read().await.iter().copied().collect();
        for thread_id in threads {
            if let Err(e) = self.client.send(ThreadResume { thread_id }).await {
                warn!(?thread_id, "failed to resume thread during stop: {e}");
            }
        }
        self.suspended_threads.write().await.clear();

        lock_registry().remove(&self.pid);
        Ok(())
    }

    /// Sets a breakpoint at the entry of `method_name` on `class_signature` without waiting for
    /// it to be hit.
    pub async fn set_breakpoint(
        &self,
        class_signature: &str,
        method_name: &str,
    ) -> Result<RequestId, SessionError> {
        let (request_id, location) = requests::set_breakpoint_at_method_entry(
            &self.client,
            class_signature,
            method_name,
            SuspendPolicy::All,
        )
        .await?;
        self.breakpoints.write().await.insert(
            request_id,
            Breakpoint {
                request_id,
                class_signature: class_signature.to_string(),
                method_name: method_name.to_string(),
                location,
                enabled: true,
                hit_count: 0,
            },
        );
        Ok(request_id)
    }

    /// Sets a breakpoint at the entry of `method_name` on `class_signature` and blocks until it
    /// is hit, returning the request id and the thread that hit it. The thread is left suspended.
    #[instrument(skip(self))]
    pub async fn set_breakpoint_and_wait(
        &self,
        class_signature: &str,
        method_name: &str,
    ) -> Result<(RequestId, ThreadId), SessionError> {
        let (request_id, thread, location) =
            requests::set_breakpoint_and_wait(&self.client, class_signature, method_name).await?;
        {
            let mut breakpoints = self.breakpoints.write().await;
            breakpoints
                .entry(request_id)
                .and_modify(|b| b.hit_count += 1)
                .or_insert(Breakpoint {
                    request_id,
                    class_signature: class_signature.to_string(),
                    method_name: method_name.to_string(),
                    location,
                    enabled: true,
                    hit_count: 1,
                });
        }
        self.suspended_threads.write().await.insert(thread);
        Ok((request_id, thread))
    }

    /// Clears a previously set breakpoint.
    pub async fn clear_breakpoint(&self, request_id: RequestId) -> Result<(), SessionError> {
        requests::clear_breakpoint(&self.client, request_id).await?;
        self.breakpoints.write().await.remove(&request_id);
        Ok(())
    }

    /// Resumes every thread in the target VM, regardless of how many times each has been
    /// suspended.
    pub async fn resume(&self) -> Result<(), SessionError> {
        self.client.send(jdwp_client::commands::VmResume).await?;
        self.suspended_threads.write().await.clear();
        Ok(())
    }

    /// Resumes a single thread.
    pub async fn resume_thread(&self, thread_id: ThreadId) -> Result<(), SessionError> {
        self.client.send(ThreadResume { thread_id }).await?;
        self.suspended_threads.write().await.remove(&thread_id);
        Ok(())
    }

    /// Suspends a single thread.
    pub async fn suspend_thread(&self, thread_id: ThreadId) -> Result<(), SessionError> {
        self.client.send(ThreadSuspend { thread_id }).await?;
        self.suspended_threads.write().await.insert(thread_id);
        Ok(())
    }

    /// Requests a single-step event for `thread_id` with the given size and depth, suspending
    /// only the event thread when it fires.
    pub async fn step_thread(
        &self,
        thread_id: ThreadId,
        size: StepSize,
        depth: StepDepth,
    ) -> Result<RequestId, SessionError> {
        requests::step_thread(&self.client, thread_id, size, depth, SuspendPolicy::EventThread)
            .await
            .map_err(Into::into)
    }

    /// All threads known to the target VM, excluding debugger-internal agent threads.
    pub async fn get_threads(&self) -> Result<Vec<ThreadId>, SessionError> {
        Ok(self.client.send(AllThreads).await?.threads)
    }

    /// The current call stack of `thread_id`, most-recent frame first. The thread must be
    /// suspended.
    pub async fn get_stack_frames(&self, thread_id: ThreadId) -> Result<Vec<FrameInfo>, SessionError> {
        Ok(self
            .client
            .send(ThreadFrames {
                thread_id,
                start_frame: 0,
                length: -1,
            })
            .await?
            .frames)
    }

    /// Resolves every local variable visible in `frame_id` on `thread_id`'s current call stack.
    ///
    /// The frame id alone carries no method id, so the method is derived from the frame's
    /// location (found by re-walking the call stack); the variable table for that method then
    /// gives the slot/signature pairs `StackFrame.GetValues` needs.
    #[instrument(skip(self))]
    pub async fn get_local_variables(
        &self,
        thread_id: ThreadId,
        frame_id: FrameId,
    ) -> Result<Vec<LocalVariable>, SessionError> {
        let frames = self.get_stack_frames(thread_id).await?;
        let location = frames
            .into_iter()
            .find(|f| f.frame_id == frame_id)
            .map(|f| f.location)
            .ok_or(SessionError::FrameNotFound {
                thread: thread_id,
                frame: frame_id,
            })?;

        let ref_type = ReferenceTypeId::new(location.class.get());
        let table = self
            .client
            .send(VariableTable {
                ref_type,
                method_id: location.method,
            })
            .await?;

        let slots: Vec<SlotRequest> = table
            .slots
            .iter()
            .map(|slot| SlotRequest {
                slot: slot.slot,
                sig_byte: slot.signature.as_bytes().first().copied().unwrap_or(b'L'),
            })
            .collect();

        let values = self
            .client
            .send(StackFrameGetValues {
                thread_id,
                frame_id,
                slots,
            })
            .await?
            .values;

        Ok(table
            .slots
            .into_iter()
            .zip(values)
            .map(|(slot, value)| LocalVariable {
                name: slot.name,
                signature: slot.signature,
                value,
            })
            .collect())
    }

    /// Resolves the runtime type and JNI signature of `object_id`.
    pub async fn inspect_object(&self, object_id: ObjectId) -> Result<ObjectSummary, SessionError> {
        let reply = self.client.send(ObjectReferenceType { object_id }).await?;
        let signature = self
            .client
            .send(Signature {
                ref_type: reply.type_id,
            })
            .await?
            .signature;
        Ok(ObjectSummary {
            object_id,
            type_id: reply.type_id,
            signature,
        })
    }

    /// Returns a slice of `array_id`'s components. `first`/`count` default to the whole array.
    pub async fn get_array_values(
        &self,
        array_id: ArrayId,
        first: Option<i32>,
        count: Option<i32>,
    ) -> Result<ArrayRegion, SessionError> {
        let length = self.client.send(ArrayLength { array_id }).await?.length;
        let first_index = first.unwrap_or(0);
        let length = count.unwrap_or(length - first_index);
        Ok(self
            .client
            .send(GetValues {
                array_id,
                first_index,
                length,
            })
            .await?
            .values)
    }

    /// Runs `command` synchronously inside the debugged VM via
    /// `java.lang.Runtime.getRuntime().exec(command).waitFor()`, returning the child's exit code.
    ///
    /// `thread_id` must be suspended; if omitted, the first thread this session has suspended is
    /// used.
    #[instrument(skip(self, command))]
    pub async fn exec(
        &self,
        thread_id: Option<ThreadId>,
        command: impl Into<String>,
    ) -> Result<i32, SessionError> {
        let command = command.into();
        let thread_id = self.resolve_suspended_thread(thread_id).await?;

        let runtime_type = requests::resolve_class(&self.client, "Ljava/lang/Runtime;").await?;
        let runtime_class = ClassId::new(runtime_type.get());
        let get_runtime = requests::get_method_id(
            &self.client,
            "Ljava/lang/Runtime;",
            runtime_type,
            "getRuntime",
            "()Ljava/lang/Runtime;",
        )
        .await?;
        let runtime_reply = self
            .client
            .send(InvokeStaticMethod {
                class_id: runtime_class,
                thread_id,
                method_id: get_runtime,
                arguments: vec![],
                options: jdwp_types::InvokeOptions(0),
            })
            .await?;
        let runtime_instance = expect_object(runtime_reply.return_value)?;

        let cmd_string = self.client.send(CreateString { utf: command }).await?.string_id;

        let exec_method = requests::get_method_id(
            &self.client,
            "Ljava/lang/Runtime;",
            runtime_type,
            "exec",
            "(Ljava/lang/String;)Ljava/lang/Process;",
        )
        .await?;
        let exec_reply = self
            .client
            .send(ObjectInvokeMethod {
                object_id: runtime_instance,
                thread_id,
                class_id: runtime_class,
                method_id: exec_method,
                arguments: vec![Value::String(cmd_string)],
                options: jdwp_types::InvokeOptions(0),
            })
            .await?;
        let process = expect_object(exec_reply.return_value)?;

        let process_type = requests::resolve_class(&self.client, "Ljava/lang/Process;").await?;
        let process_class = ClassId::new(process_type.get());
        let wait_for = requests::get_method_id(
            &self.client,
            "Ljava/lang/Process;",
            process_type,
            "waitFor",
            "()I",
        )
        .await?;
        let wait_reply = self
            .client
            .send(ObjectInvokeMethod {
                object_id: process,
                thread_id,
                class_id: process_class,
                method_id: wait_for,
                arguments: vec![],
                options: jdwp_types::InvokeOptions(0),
            })
            .await?;
        expect_int(wait_reply.return_value)
    }

    /// Loads a native library inside the debugged VM via `java.lang.System.load(absolutePath)`.
    /// `thread_id` must be suspended; if omitted, the first thread this session has suspended is
    /// used.
    #[instrument(skip(self, absolute_path))]
    pub async fn load_library(
        &self,
        thread_id: Option<ThreadId>,
        absolute_path: impl Into<String>,
    ) -> Result<(), SessionError> {
        let path = absolute_path.into();
        let thread_id = self.resolve_suspended_thread(thread_id).await?;

        let system_type = requests::resolve_class(&self.client, "Ljava/lang/System;").await?;
        let system_class = ClassId::new(system_type.get());
        let load_method = requests::get_method_id(
            &self.client,
            "Ljava/lang/System;",
            system_type,
            "load",
            "(Ljava/lang/String;)V",
        )
        .await?;
        let path_string = self.client.send(CreateString { utf: path }).await?.string_id;
        self.client
            .send(InvokeStaticMethod {
                class_id: system_class,
                thread_id,
                method_id: load_method,
                arguments: vec![Value::String(path_string)],
                options: jdwp_types::InvokeOptions(0),
            })
            .await?;
        Ok(())
    }

    /// Registers `handler` for every event addressed to `request_id`.
    pub async fn on<E>(&self, request_id: RequestId, handler: E)
    where
        E: EventHandler<Err = JdwpError> + Send + Sync + 'static,
    {
        self.client.subscribe(request_id, handler).await;
    }

    /// Registers `handler` as a wildcard subscriber, receiving every event with no more specific
    /// subscriber (including session-internal bookkeeping events, which run first).
    pub async fn on_any<E>(&self, handler: E)
    where
        E: EventHandler<Err = JdwpError> + Send + Sync + 'static,
    {
        self.client.on_event(handler).await;
    }

    /// Removes the subscriber registered for `request_id`, if any.
    pub async fn off(&self, request_id: RequestId) {
        self.client.unsubscribe(request_id).await;
    }

    async fn resolve_suspended_thread(
        &self,
        thread_id: Option<ThreadId>,
    ) -> Result<ThreadId, SessionError> {
        if let Some(thread_id) = thread_id {
            return Ok(thread_id);
        }
        self.suspended_threads
            .read()
            .await
            .iter()
            .next()
            .copied()
            .ok_or_else(|| JdwpError::NoThreadAvailable.into())
    }
}

impl<T: JdwpTransport> Drop for Session<T> {
    /// Releases this session's pid even if [`Session::stop`] was never called, so a dropped
    /// session never permanently blocks re-attaching to the same pid.
    fn drop(&mut self) {
        lock_registry().remove(&self.pid);
    }
}

fn expect_object(value: Value) -> Result<ObjectId, SessionError> {
    match value {
        Value::Object(id) => Ok(id),
        Value::String(id) => Ok(ObjectId::new(id.get())),
        other => Err(JdwpError::InvalidTag {
            expected: "OBJECT",
            actual: tag_name(&other),
        }
        .into()),
    }
}

fn expect_int(value: Value) -> Result<i32, SessionError> {
    match value {
        Value::Int(i) => Ok(i),
        other => Err(JdwpError::InvalidTag {
            expected: "INT",
            actual: tag_name(&other),
        }
        .into()),
    }
}

fn tag_name(value: &Value) -> &'static str {
    match value {
        Value::Array(_) => "ARRAY",
        Value::Byte(_) => "BYTE",
        Value::Boolean(_) => "BOOLEAN",
        Value::Char(_) => "CHAR",
        Value::Object(_) => "OBJECT",
        Value::Float(_) => "FLOAT",
        Value::Double(_) => "DOUBLE",
        Value::Int(_) => "INT",
        Value::Long(_) => "LONG",
        Value::Short(_) => "SHORT",
        Value::Void => "VOID",
        Value::String(_) => "STRING",
        Value::Thread(_) => "THREAD",
        Value::ThreadGroup(_) => "THREAD_GROUP",
        Value::ClassLoader(_) => "CLASS_LOADER",
        Value::ClassObject(_) => "CLASS_OBJECT",
    }
}
