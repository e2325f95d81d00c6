//! In-process publish/subscribe bus (mechanics only).
//!
//! The bus decouples mutation producers (create/update/delete operations) from
//! data consumers (fetch resources): creating a client on one screen makes the
//! client list reload without either side holding a reference to the other.
//!
//! ## Delivery
//!
//! - **Synchronous**: `publish` runs every handler on the caller's thread and
//!   returns only when the last one has finished.
//! - **Ordered**: handlers of one event run in subscription order.
//! - **Isolated**: a handler that fails or panics is logged and skipped; the
//!   remaining handlers still run and the publisher never sees the failure.
//!
//! The registry lock is released before handlers run, so a handler may itself
//! subscribe or unsubscribe. Such changes apply from the next `publish` on.
//!
//! ## Lifetime
//!
//! `EventBus` is an explicit service object: build one at startup and hand
//! clones (they share the same registry) to whatever needs it.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use serde_json::Value;

use crate::event::EventName;

/// Outcome of one handler invocation.
pub type HandlerResult = anyhow::Result<()>;

type Handler = Arc<dyn Fn(&Value) -> HandlerResult + Send + Sync>;

struct Registration {
    id: u64,
    handler: Handler,
}

#[derive(Default)]
struct Registry {
    handlers: HashMap<EventName, Vec<Registration>>,
    next_id: u64,
}

/// Process-wide event bus.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

impl core::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let registry = lock(&self.registry);
        let counts: HashMap<&'static str, usize> = registry
            .handlers
            .iter()
            .map(|(name, regs)| (name.as_str(), regs.len()))
            .collect();
        f.debug_struct("EventBus").field("handlers", &counts).finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `event`.
    ///
    /// Every call creates an independent registration, even for the same
    /// closure. The returned handle removes exactly this registration.
    pub fn subscribe<F>(&self, event: EventName, handler: F) -> Unsubscribe
    where
        F: Fn(&Value) -> HandlerResult + Send + Sync + 'static,
    {
        let mut registry = lock(&self.registry);
        registry.next_id += 1;
        let id = registry.next_id;
        registry
            .handlers
            .entry(event)
            .or_default()
            .push(Registration {
                id,
                handler: Arc::new(handler),
            });

        tracing::trace!(event = %event, handler_id = id, "subscribed");

        Unsubscribe {
            registry: Arc::downgrade(&self.registry),
            event,
            id,
        }
    }

    /// Invoke every handler currently registered for `event` with `payload`.
    ///
    /// Returns how many handlers were invoked (including failing ones).
    /// Publishing an event nobody listens to is a no-op.
    pub fn publish(&self, event: EventName, payload: &Value) -> usize {
        let handlers: Vec<(u64, Handler)> = {
            let registry = lock(&self.registry);
            match registry.handlers.get(&event) {
                Some(regs) => regs.iter().map(|r| (r.id, r.handler.clone())).collect(),
                None => Vec::new(),
            }
        };

        if handlers.is_empty() {
            tracing::trace!(event = %event, "published with no subscribers");
            return 0;
        }

        tracing::debug!(event = %event, handlers = handlers.len(), "publishing");

        for (id, handler) in &handlers {
            match panic::catch_unwind(AssertUnwindSafe(|| handler(payload))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    tracing::error!(event = %event, handler_id = id, error = %err, "event handler failed");
                }
                Err(panic) => {
                    tracing::error!(
                        event = %event,
                        handler_id = id,
                        panic = %panic_message(panic.as_ref()),
                        "event handler panicked"
                    );
                }
            }
        }

        handlers.len()
    }

    /// Publish `event` without payload (`null`).
    pub fn notify(&self, event: EventName) -> usize {
        self.publish(event, &Value::Null)
    }

    /// Drop every handler of `event`, or every handler of every event when
    /// `event` is `None`. Intended for teardown.
    pub fn unsubscribe_all(&self, event: Option<EventName>) {
        let mut registry = lock(&self.registry);
        match event {
            Some(event) => {
                registry.handlers.remove(&event);
            }
            None => registry.handlers.clear(),
        }
    }

    /// Number of handlers currently registered for `event`.
    pub fn subscriber_count(&self, event: EventName) -> usize {
        lock(&self.registry)
            .handlers
            .get(&event)
            .map_or(0, Vec::len)
    }
}

/// Handle returned by [`EventBus::subscribe`].
///
/// Dropping the handle does **not** unsubscribe; call [`Unsubscribe::unsubscribe`].
#[must_use = "keep the handle to be able to unsubscribe later"]
pub struct Unsubscribe {
    registry: Weak<Mutex<Registry>>,
    event: EventName,
    id: u64,
}

impl core::fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("event", &self.event)
            .field("id", &self.id)
            .finish()
    }
}

impl Unsubscribe {
    pub fn event(&self) -> EventName {
        self.event
    }

    /// Remove the registration. A no-op if it is already gone (removed by
    /// `unsubscribe_all`, or the bus itself was dropped).
    pub fn unsubscribe(self) {
        let Some(shared) = self.registry.upgrade() else {
            return;
        };
        let mut registry = lock(&shared);
        if let Some(regs) = registry.handlers.get_mut(&self.event) {
            regs.retain(|r| r.id != self.id);
            if regs.is_empty() {
                registry.handlers.remove(&self.event);
            }
        }
    }
}

// Handlers run outside the lock, so poisoning can only come from the bus's own
// bookkeeping; the registry is still structurally valid in that case.
fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
