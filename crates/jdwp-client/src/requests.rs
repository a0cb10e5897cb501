//! Convenience wrappers over `EventRequest.Set`/`Clear` - the "event-request layer" sitting
//! between the typed command client and the session facade.
//!
//! These functions encode the modifier chains and method/class resolution that every higher-level
//! request (breakpoints, single steps, class-prepare watches) needs, without owning any session
//! state themselves. The session facade is responsible for bookkeeping (the breakpoint registry,
//! suspended-thread set); this module only ever talks to the VM.

use crate::commands::{
    ClassesBySignature, ClearEventRequest, Methods, Modifier, SetEventRequest,
};
use crate::connect::JdwpTransport;
use crate::error::JdwpError;
use crate::events::Event;
use crate::JdwpClient;
use jdwp_types::{
    ClassId, EventKind, Location, MethodId, ReferenceTypeId, RequestId, StepDepth, StepSize,
    SuspendPolicy, ThreadId, TypeTag,
};

/// Resolves a JNI-style signature (`Landroid/app/Activity;`) to the reference type id of the
/// first loaded class matching it. Fails with [`JdwpError::ClassNotFound`] if no class with that
/// signature is currently loaded.
pub async fn resolve_class<T: JdwpTransport>(
    client: &JdwpClient<T>,
    signature: &str,
) -> Result<ReferenceTypeId, JdwpError> {
    let reply = client
        .send(ClassesBySignature {
            signature: signature.to_string(),
        })
        .await?;
    reply
        .classes
        .into_iter()
        .next()
        .map(|c| c.type_id)
        .ok_or_else(|| JdwpError::ClassNotFound(signature.to_string()))
}

/// Scans `ReferenceType.Methods` for the exact `(name, signature)` pair.
pub async fn get_method_id<T: JdwpTransport>(
    client: &JdwpClient<T>,
    class_signature: &str,
    ref_type: ReferenceTypeId,
    name: &str,
    signature: &str,
) -> Result<MethodId, JdwpError> {
    let reply = client.send(Methods { ref_type }).await?;
    reply
        .declared
        .into_iter()
        .find(|m| m.name == name && m.signature == signature)
        .map(|m| m.method_id)
        .ok_or_else(|| JdwpError::MethodNotFound {
            class_signature: class_signature.to_string(),
            name: name.to_string(),
            signature: Some(signature.to_string()),
        })
}

/// Splits `name_and_signature` on its first `(` and resolves the first method whose name matches,
/// ignoring overloads. Callers needing a specific overload should use [`get_method_id`] instead.
pub async fn get_first_method_id<T: JdwpTransport>(
    client: &JdwpClient<T>,
    class_signature: &str,
    ref_type: ReferenceTypeId,
    name_and_signature: &str,
) -> Result<MethodId, JdwpError> {
    let name = name_and_signature
        .split_once('(')
        .map(|(n, _)| n)
        .unwrap_or(name_and_signature);
    let reply = client.send(Methods { ref_type }).await?;
    reply
        .declared
        .into_iter()
        .find(|m| m.name == name)
        .map(|m| m.method_id)
        .ok_or_else(|| JdwpError::MethodNotFound {
            class_signature: class_signature.to_string(),
            name: name.to_string(),
            signature: None,
        })
}

/// Generic entry point: sets an event request of `kind` with the given suspend policy and
/// modifier chain, returning the VM-assigned request id.
pub async fn setup_event<T: JdwpTransport>(
    client: &JdwpClient<T>,
    kind: EventKind,
    suspend_policy: SuspendPolicy,
    modifiers: Vec<Modifier>,
) -> Result<RequestId, JdwpError> {
    let reply = client
        .send(SetEventRequest {
            event_kind: kind,
            suspend_policy,
            modifiers,
        })
        .await?;
    Ok(reply.request_id)
}

/// Clears a previously set breakpoint by request id.
pub async fn clear_breakpoint<T: JdwpTransport>(
    client: &JdwpClient<T>,
    request_id: RequestId,
) -> Result<(), JdwpError> {
    client
        .send(ClearEventRequest {
            event_kind: EventKind::Breakpoint,
            request_id,
        })
        .await?;
    Ok(())
}

/// Requests a `BREAKPOINT` event at an exact [`Location`].
pub async fn set_breakpoint_at_location<T: JdwpTransport>(
    client: &JdwpClient<T>,
    location: Location,
    suspend_policy: SuspendPolicy,
) -> Result<RequestId, JdwpError> {
    setup_event(
        client,
        EventKind::Breakpoint,
        suspend_policy,
        vec![Modifier::LocationOnly(location)],
    )
    .await
}

/// Resolves `class_signature`/`method_name` to a [`Location`] at the method's first bytecode
/// index (`index = 0`), without setting any event request for it.
///
/// Overload resolution picks the first method whose name matches; callers that need a specific
/// overload should resolve the method id themselves via [`get_method_id`].
async fn resolve_method_entry_location<T: JdwpTransport>(
    client: &JdwpClient<T>,
    class_signature: &str,
    method_name: &str,
) -> Result<Location, JdwpError> {
    let ref_type = resolve_class(client, class_signature).await?;
    let method_id =
        get_first_method_id(client, class_signature, ref_type, method_name).await?;
    let class_id = ClassId::new(ref_type.get());
    Ok(Location {
        tag: TypeTag::Class,
        class: class_id,
        method: method_id,
        offset: 0,
    })
}

/// Resolves `class_signature`/`method_name` to a [`Location`] at the method's first bytecode
/// index (`index = 0`) and requests a `BREAKPOINT` event there.
///
/// Overload resolution picks the first method whose name matches; callers that need a specific
/// overload should resolve the method id themselves (via [`get_method_id`]) and call
/// [`set_breakpoint_at_location`] directly.
pub async fn set_breakpoint_at_method_entry<T: JdwpTransport>(
    client: &JdwpClient<T>,
    class_signature: &str,
    method_name: &str,
    suspend_policy: SuspendPolicy,
) -> Result<(RequestId, Location), JdwpError> {
    let location = resolve_method_entry_location(client, class_signature, method_name).await?;
    let request_id = set_breakpoint_at_location(client, location, suspend_policy).await?;
    Ok((request_id, location))
}

/// Requests a `SINGLE_STEP` event for `thread_id` with the given size and depth.
pub async fn step_thread<T: JdwpTransport>(
    client: &JdwpClient<T>,
    thread_id: ThreadId,
    size: StepSize,
    depth: StepDepth,
    suspend_policy: SuspendPolicy,
) -> Result<RequestId, JdwpError> {
    setup_event(
        client,
        EventKind::SingleStep,
        suspend_policy,
        vec![Modifier::Step {
            thread_id,
            size,
            depth,
        }],
    )
    .await
}

/// Sets a breakpoint at `class_signature::method_name` and awaits the first `BREAKPOINT` event it
/// produces, returning the request id, the hitting thread, and the location reported by the VM.
/// The thread is left suspended (suspend policy `ALL` is used to set the request).
///
/// The target's location is resolved and a wildcard subscriber filtering on that exact location is
/// registered *before* `EventRequest.Set` is ever sent, per spec invariant 4: nothing here waits
/// for the `Set` reply's request id before it can recognize a matching hit, so a breakpoint that
/// fires in the window between the `Set` reply arriving and a by-request-id subscription being
/// installed cannot be swallowed by some other wildcard subscriber (e.g. the session facade's own
/// thread bookkeeping) and leave this call hanging forever.
pub async fn set_breakpoint_and_wait<T: JdwpTransport>(
    client: &JdwpClient<T>,
    class_signature: &str,
    method_name: &str,
) -> Result<(RequestId, ThreadId, Location), JdwpError> {
    let location = resolve_method_entry_location(client, class_signature, method_name).await?;

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let subscription = client
        .on_event(move |_policy, event| {
            let tx = tx.clone();
            async move {
                if let Event::Breakpoint {
                    thread,
                    location: hit_location,
                    ..
                } = &event
                {
                    if *hit_location == location {
                        let _ = tx.send((*thread, *hit_location));
                    }
                }
                Ok::<(), JdwpError>(())
            }
        })
        .await;

    let result = async {
        let request_id = set_breakpoint_at_location(client, location, SuspendPolicy::All).await?;
        let (thread, hit_location) = rx.recv().await.ok_or(JdwpError::Disconnected)?;
        Ok((request_id, thread, hit_location))
    }
    .await;

    client.unsubscribe_wildcard(subscription).await;
    result
}
