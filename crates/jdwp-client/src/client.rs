//! The dispatcher: correlates outbound commands with their replies and routes inbound composite
//! events to whichever subscriber asked for them.

use crate::codec::{JdwpCodec, JdwpDecoder, JdwpEncoder};
use crate::commands::IdSizesCommand;
use crate::config::ClientConfig;
use crate::connect::JdwpTransport;
use crate::error::JdwpError;
use crate::events::{to_events, Event, EventHandler, Events, OwnedEventHandler};
use crate::id_sizes::IdSizes;
use crate::packet::JdwpCommand;
use crate::raw::packet::{AnyRawPacket, RawCommandPacket, RawReplyPacket};
use crate::raw::{RawJdwpClient, RawPacketSink};
use futures_util::SinkExt;
use jdwp_types::RequestId;
use std::collections::HashMap;
use std::io;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::oneshot;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinSet;
use tokio::time::timeout;
use tokio_stream::StreamExt;
use tracing::{debug, error, instrument, trace, warn};

static JDWP_HANDSHAKE: &[u8; 14] = b"JDWP-Handshake";

type PendingResult = Result<RawReplyPacket, JdwpError>;

/// Handle returned by [`JdwpClient::on_event`], used to later remove that specific wildcard
/// subscriber via [`JdwpClient::unsubscribe_wildcard`] without disturbing any other subscriber
/// registered under the same wildcard key.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct WildcardSubscriptionId(u64);

/// A non-blocking JDWP client: one dispatcher per transport connection.
///
/// Owns the pending-request table, the outbound write sequencing and the event-subscription
/// registry. Cloning is cheap (`Arc`-backed internals via [`JdwpClient::handle`]) is intentionally
/// not exposed - callers share one client behind a reference, matching the single-dispatcher
/// contract in the concurrency model.
pub struct JdwpClient<T: JdwpTransport> {
    tasks: JoinSet<()>,
    sink: Mutex<RawPacketSink<T::Output>>,
    next_id: AtomicU32,
    codec: Arc<RwLock<JdwpCodec>>,
    pending: Arc<Mutex<HashMap<u32, oneshot::Sender<PendingResult>>>>,
    next_wildcard_id: AtomicU64,
    wildcard_handlers: Arc<RwLock<HashMap<u64, OwnedEventHandler<JdwpError>>>>,
    request_handlers: Arc<RwLock<HashMap<RequestId, OwnedEventHandler<JdwpError>>>>,
    disconnected: Arc<AtomicBool>,
    config: ClientConfig,
    _transport: PhantomData<T>,
}

impl JdwpClient<TcpStream> {
    /// Connects to a JDWP service already listening on `addr` (typically a local port forwarded
    /// from an Android device by an adb-style bridge) using the default [`ClientConfig`].
    pub async fn connect_tcp<A: tokio::net::ToSocketAddrs>(addr: A) -> Result<Self, JdwpError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(JdwpError::Transport)?;
        Self::attach(stream, ClientConfig::default()).await
    }
}

impl<T> JdwpClient<T>
where
    T: JdwpTransport,
{
    /// Creates a new client over a TCP stream using the default [`ClientConfig`].
    ///
    /// Kept for source compatibility with callers that only ever used TCP transports; prefer
    /// [`JdwpClient::attach`] for anything that needs a non-default configuration or a non-TCP
    /// transport.
    pub async fn create(transport: T) -> io::Result<Self> {
        Self::attach(transport, ClientConfig::default())
            .await
            .map_err(|e| match e {
                JdwpError::Transport(e) => e,
                other => io::Error::new(io::ErrorKind::Other, other.to_string()),
            })
    }

    /// Performs the handshake over `transport`, negotiates id sizes, and spawns the dispatcher's
    /// background read loop.
    #[instrument(skip_all)]
    pub async fn attach(transport: T, config: ClientConfig) -> Result<Self, JdwpError> {
        let (input, output) = transport.split_transport();
        let (mut input, mut output) = (input, output);
        timeout(config.handshake_timeout, handshake(&mut input, &mut output))
            .await
            .map_err(|_| JdwpError::Handshake("handshake timed out".to_string()))??;

        let raw_client = RawJdwpClient::<T>::new(input, output);
        let (raw_sink, mut raw_stream) = raw_client.into_split();

        let codec = Arc::new(RwLock::new(JdwpCodec::new(config.id_sizes)));
        let pending = Arc::new(Mutex::new(HashMap::<u32, oneshot::Sender<PendingResult>>::new()));
        let wildcard_handlers =
            Arc::new(RwLock::new(HashMap::<u64, OwnedEventHandler<JdwpError>>::new()));
        let request_handlers =
            Arc::new(RwLock::new(HashMap::<RequestId, OwnedEventHandler<JdwpError>>::new()));
        let disconnected = Arc::new(AtomicBool::new(false));

        let mut tasks = JoinSet::new();
        {
            let codec = codec.clone();
            let pending = pending.clone();
            let wildcard_handlers = wildcard_handlers.clone();
            let request_handlers = request_handlers.clone();
            let disconnected = disconnected.clone();
            tasks.spawn(async move {
                while let Some(packet) = raw_stream.next().await {
                    match packet {
                        Ok(AnyRawPacket::Reply(reply)) => {
                            let id = reply.header().id();
                            trace!(id, "dispatcher received reply");
                            if let Some(tx) = pending.lock().await.remove(&id) {
                                let _ = tx.send(Ok(reply));
                            } else {
                                warn!(id, "dropping reply for an id with no waiter (late reply)");
                            }
                        }
                        Ok(AnyRawPacket::Command(command)) => {
                            let codec = codec.read().await;
                            match to_events(command, &codec) {
                                Ok(events) => {
                                    drop(codec);
                                    let vm_died = events
                                        .events
                                        .iter()
                                        .any(|e| matches!(e, Event::VmDeath { .. }));
                                    dispatch_events(
                                        events,
                                        &wildcard_handlers,
                                        &request_handlers,
                                    )
                                    .await;
                                    if vm_died {
                                        debug!("VM_DEATH observed, tearing down dispatcher");
                                        disconnect(&disconnected, &pending, &wildcard_handlers)
                                            .await;
                                        break;
                                    }
                                }
                                Err(e) => {
                                    warn!("dropping unexpected command packet from the VM: {e}");
                                }
                            }
                        }
                        Err(e) => {
                            error!("transport read failed: {e}");
                            break;
                        }
                    }
                }
                disconnect(&disconnected, &pending, &wildcard_handlers).await;
            });
        }

        let mut client = JdwpClient {
            tasks,
            sink: Mutex::new(raw_sink),
            next_id: AtomicU32::new(1),
            codec,
            pending,
            next_wildcard_id: AtomicU64::new(1),
            wildcard_handlers,
            request_handlers,
            disconnected,
            config,
            _transport: PhantomData,
        };

        let negotiated = client.send(IdSizesCommand).await?;
        let actual = IdSizes::new(
            negotiated.object_id_size as usize,
            negotiated.method_id_size as usize,
            negotiated.field_id_size as usize,
            negotiated.frame_id_size as usize,
        );
        if actual != client.config.id_sizes {
            debug!(?actual, configured = ?client.config.id_sizes, "target VM id-size profile differs from configured default");
            return Err(JdwpError::IdSizeMismatch {
                configured: client.config.id_sizes,
                actual,
            });
        }

        Ok(client)
    }

    /// Sends a command and awaits its typed reply, subject to [`ClientConfig::command_timeout`].
    #[instrument(skip_all, fields(id))]
    pub async fn send<C: JdwpCommand>(&self, command: C) -> Result<C::Reply, JdwpError> {
        if self.disconnected.load(Ordering::SeqCst) {
            return Err(JdwpError::Disconnected);
        }

        let encoded = {
            let codec = self.codec.read().await;
            let mut encoder = JdwpEncoder::new(&codec);
            command.encode(&mut encoder);
            encoder.data.freeze()
        };

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        tracing::Span::current().record("id", id);
        let (tx, rx) = oneshot::channel::<PendingResult>();
        self.pending.lock().await.insert(id, tx);

        let raw = RawCommandPacket::new_command(id, C::command_data(), encoded);
        if let Err(e) = self.sink.lock().await.send(raw).await {
            self.pending.lock().await.remove(&id);
            return Err(JdwpError::Transport(e));
        }

        let reply = match timeout(self.config.command_timeout, rx).await {
            Ok(Ok(Ok(reply))) => reply,
            Ok(Ok(Err(e))) => return Err(e),
            Ok(Err(_recv_dropped)) => return Err(JdwpError::Disconnected),
            Err(_elapsed) => {
                self.pending.lock().await.remove(&id);
                return Err(JdwpError::Timeout);
            }
        };

        let error_code = reply.header().error_code().code();
        if error_code != 0 {
            return Err(JdwpError::from_error_code(error_code, id));
        }

        let codec = self.codec.read().await;
        let mut decoder = JdwpDecoder::new(&codec, reply.data().clone());
        decoder.get::<C::Reply>().map_err(JdwpError::from)
    }

    /// Registers `handler` as a wildcard (request id `0`) subscriber: it receives every event
    /// with no matching specific subscriber, per the reserved-key semantics in the data model.
    ///
    /// Returns a handle that can later be passed to [`JdwpClient::unsubscribe_wildcard`] to remove
    /// just this handler - useful for a one-shot wait that pre-registers a wildcard subscriber
    /// before the request that will eventually produce a matching event is even sent (see
    /// `requests::set_breakpoint_and_wait`), then tears it down once it has what it needs.
    pub async fn on_event<E>(&self, handler: E) -> WildcardSubscriptionId
    where
        E: EventHandler<Err = JdwpError> + Send + Sync + 'static,
    {
        let id = self.next_wildcard_id.fetch_add(1, Ordering::SeqCst);
        self.wildcard_handlers
            .write()
            .await
            .insert(id, OwnedEventHandler::new(handler));
        WildcardSubscriptionId(id)
    }

    /// Removes a single wildcard subscriber previously registered via [`JdwpClient::on_event`],
    /// leaving every other wildcard subscriber untouched.
    pub async fn unsubscribe_wildcard(&self, id: WildcardSubscriptionId) {
        self.wildcard_handlers.write().await.remove(&id.0);
    }

    /// Registers `handler` as the sole subscriber for `request_id`. Replaces any previous
    /// subscriber for the same id.
    pub async fn subscribe<E>(&self, request_id: RequestId, handler: E)
    where
        E: EventHandler<Err = JdwpError> + Send + Sync + 'static,
    {
        self.request_handlers
            .write()
            .await
            .insert(request_id, OwnedEventHandler::new(handler));
    }

    /// Removes the subscriber for `request_id`, if any.
    pub async fn unsubscribe(&self, request_id: RequestId) {
        self.request_handlers.write().await.remove(&request_id);
    }

    /// Convenience over [`JdwpClient::subscribe`]: forwards every event delivered for
    /// `request_id` onto an unbounded channel instead of invoking a callback.
    pub async fn subscribe_channel(
        &self,
        request_id: RequestId,
    ) -> UnboundedReceiver<(jdwp_types::SuspendPolicy, Event)> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        self.subscribe(request_id, move |policy, event| {
            let tx = tx.clone();
            async move {
                let _ = tx.send((policy, event));
                Ok::<(), JdwpError>(())
            }
        })
        .await;
        rx
    }

    /// Whether the dispatcher has observed a fatal disconnect (transport EOF, read error, or
    /// `VM_DEATH`).
    pub fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::SeqCst)
    }

    /// Gracefully detaches: sends `VirtualMachine.Dispose`, then tears down the background tasks.
    #[instrument(skip_all)]
    pub async fn dispose(mut self) -> Result<(), JdwpError> {
        self.send(crate::commands::Dispose).await?;
        trace!("successfully disposed of client");
        Ok(())
    }
}

async fn dispatch_events(
    events: Events,
    wildcard_handlers: &Arc<RwLock<HashMap<u64, OwnedEventHandler<JdwpError>>>>,
    request_handlers: &Arc<RwLock<HashMap<RequestId, OwnedEventHandler<JdwpError>>>>,
) {
    for event in events.events {
        let request_id = event.request_id();
        let specific = request_handlers.read().await.get(&request_id).cloned();
        if let Some(handler) = specific {
            if let Err(e) = handler.handle_event(events.policy, event).await {
                error!("event callback failed: {e}");
            }
            continue;
        }

        let wildcard: Vec<_> = wildcard_handlers.read().await.values().cloned().collect();
        if wildcard.is_empty() {
            trace!(?request_id, "dropping event with no matching subscriber");
            continue;
        }
        for handler in wildcard {
            if let Err(e) = handler.handle_event(events.policy, event.clone()).await {
                error!("event callback failed: {e}");
            }
        }
    }
}

async fn disconnect(
    disconnected: &Arc<AtomicBool>,
    pending: &Arc<Mutex<HashMap<u32, oneshot::Sender<PendingResult>>>>,
    wildcard_handlers: &Arc<RwLock<HashMap<u64, OwnedEventHandler<JdwpError>>>>,
) {
    if disconnected.swap(true, Ordering::SeqCst) {
        return;
    }
    warn!("dispatcher disconnected: failing all pending waiters");
    let mut pending = pending.lock().await;
    for (_, tx) in pending.drain() {
        let _ = tx.send(Err(JdwpError::Disconnected));
    }
    drop(pending);

    for handler in wildcard_handlers.read().await.values().cloned() {
        let _ = handler
            .handle_event(jdwp_types::SuspendPolicy::None, Event::VmDisconnected)
            .await;
    }
}

#[instrument(skip_all, ok, err)]
async fn handshake<I, O>(mut input: I, output: &mut O) -> Result<(), JdwpError>
where
    I: AsyncRead + Unpin,
    O: AsyncWrite + Unpin,
{
    use tokio::io::AsyncReadExt;

    trace!("writing handshake to output stream");
    output
        .write_all(JDWP_HANDSHAKE)
        .await
        .map_err(JdwpError::Transport)?;
    let mut buf = [0u8; 14];
    input.read_exact(&mut buf).await.map_err(JdwpError::Transport)?;
    if &buf == JDWP_HANDSHAKE {
        trace!("handshake matched");
        Ok(())
    } else {
        warn!("handshake did not match");
        Err(JdwpError::Handshake(
            "peer did not echo the JDWP-Handshake bytes".to_string(),
        ))
    }
}
