//! Pub/sub event bus connecting the page shell and the backdrop.
//!
//! Architecture:
//! - Components subscribe to event types with callbacks (immediate invocation)
//! - emit() invokes callbacks immediately AND queues for deferred processing
//! - poll() returns queued events for batch processing in the frame loop
//!
//! subscribe() returns a `Subscription` token; components that come and go
//! (the backdrop) keep their tokens in a ledger and unsubscribe() each one
//! exactly once on dispose.
//!
//! Callback order: FIFO within one event type. Cross-type order undefined.

use log::warn;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

/// Maximum events in the deferred queue before oldest are evicted.
const MAX_QUEUE_SIZE: usize = 1000;

/// Marker trait for events. Events must be Send + Sync + 'static.
pub trait Event: Any + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
    fn type_name(&self) -> &'static str;
}

// Blanket impl for all qualifying types
impl<T: Any + Send + Sync + 'static> Event for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Type-erased callback, keyed by a per-bus id so it can be removed.
type Callback = Arc<dyn Fn(&dyn Any) + Send + Sync>;

/// Boxed event for queue storage
pub type BoxedEvent = Box<dyn Event>;

/// Token identifying one subscription; pass back to `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    type_id: TypeId,
    id: u64,
}

#[derive(Default)]
struct Registry {
    subscribers: HashMap<TypeId, Vec<(u64, Callback)>>,
    next_id: u64,
}

/// Pub/sub event bus with deferred processing support.
///
/// Two modes of operation, working together:
/// 1. Immediate: subscribe() + emit() triggers callbacks instantly
/// 2. Deferred: emit() also queues events for poll() in the frame loop
#[derive(Clone)]
pub struct EventBus {
    registry: Arc<RwLock<Registry>>,
    queue: Arc<Mutex<Vec<BoxedEvent>>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(RwLock::new(Registry::default())),
            queue: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Subscribe to events of type E. The callback is invoked immediately
    /// when emit() is called; use Arc<Mutex<State>> inside the callback for
    /// state mutations.
    pub fn subscribe<E, F>(&self, callback: F) -> Subscription
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let type_id = TypeId::of::<E>();
        let wrapped: Callback = Arc::new(move |any: &dyn Any| {
            if let Some(event) = any.downcast_ref::<E>() {
                callback(event);
            }
        });

        let mut reg = self.registry.write().unwrap_or_else(|e| e.into_inner());
        let id = reg.next_id;
        reg.next_id += 1;
        reg.subscribers.entry(type_id).or_default().push((id, wrapped));
        Subscription { type_id, id }
    }

    /// Remove one subscription. Safe to call with a token that was already
    /// removed (returns false).
    pub fn unsubscribe(&self, sub: Subscription) -> bool {
        let mut reg = self.registry.write().unwrap_or_else(|e| e.into_inner());
        let Some(list) = reg.subscribers.get_mut(&sub.type_id) else {
            return false;
        };
        let before = list.len();
        list.retain(|(id, _)| *id != sub.id);
        let removed = list.len() < before;
        if list.is_empty() {
            reg.subscribers.remove(&sub.type_id);
        }
        removed
    }

    /// Emit event: invoke callbacks immediately AND queue for deferred
    /// processing via poll().
    pub fn emit<E: Event + Clone>(&self, event: E) {
        self.dispatch(TypeId::of::<E>(), &event);
        self.enqueue(Box::new(event));
    }

    /// Poll all queued events for batch processing in the frame loop.
    pub fn poll(&self) -> Vec<BoxedEvent> {
        std::mem::take(&mut *self.queue.lock().unwrap_or_else(|e| e.into_inner()))
    }

    /// Lightweight emitter handle for passing into worker jobs.
    pub fn emitter(&self) -> EventEmitter {
        EventEmitter { bus: self.clone() }
    }

    /// Clear all subscribers and the queue.
    pub fn clear(&self) {
        let mut reg = self.registry.write().unwrap_or_else(|e| e.into_inner());
        reg.subscribers.clear();
        drop(reg);
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// Check if there are subscribers for event type E
    pub fn has_subscribers<E: Event>(&self) -> bool {
        self.registry
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .subscribers
            .get(&TypeId::of::<E>())
            .map(|v| !v.is_empty())
            .unwrap_or(false)
    }

    pub fn queue_len(&self) -> usize {
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn dispatch(&self, type_id: TypeId, event: &dyn Any) {
        if let Some(cbs) = self
            .registry
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .subscribers
            .get(&type_id)
        {
            for (_, cb) in cbs {
                cb(event);
            }
        }
    }

    fn enqueue(&self, event: BoxedEvent) {
        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        if queue.len() >= MAX_QUEUE_SIZE {
            let evict_count = queue.len() / 2;
            warn!(
                "EventBus queue full ({} events), evicting oldest {}",
                queue.len(),
                evict_count
            );
            queue.drain(0..evict_count);
        }
        queue.push(event);
    }
}

/// Cloneable emitter handle; same bus, restricted surface.
#[derive(Clone)]
pub struct EventEmitter {
    bus: EventBus,
}

impl EventEmitter {
    pub fn emit<E: Event + Clone>(&self, event: E) {
        self.bus.emit(event);
    }
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("queue_len", &self.bus.queue_len())
            .finish()
    }
}

/// Helper: downcast a BoxedEvent to a concrete type.
///
/// IMPORTANT: Must explicitly deref to `dyn Event` before calling
/// `as_any()`. Without the deref, the blanket impl `Event for Box<dyn
/// Event>` intercepts the call and the downcast always fails.
#[inline]
pub fn downcast_event<E: Event>(event: &BoxedEvent) -> Option<&E> {
    (**event).as_any().downcast_ref::<E>()
}
