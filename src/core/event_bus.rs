//! Typed pub/sub event bus
//!
//! Components publish small event structs; subscribers get immediate
//! callbacks, and every event is also queued so the main loop can batch
//! process with `poll()`. Callback order is FIFO within one event type;
//! ordering across types is undefined.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use log::warn;

/// Queue cap; oldest half is evicted beyond this.
const MAX_QUEUE_SIZE: usize = 1000;

/// Marker trait for events. Blanket-implemented for any Send + Sync type.
pub trait Event: Any + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + Send + Sync + 'static> Event for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

type Callback = Arc<dyn Fn(&dyn Any) + Send + Sync>;

/// Boxed event for queue storage
pub type BoxedEvent = Box<dyn Event>;

#[derive(Default)]
struct Shared {
    subscribers: RwLock<HashMap<TypeId, Vec<Callback>>>,
    queue: Mutex<Vec<BoxedEvent>>,
}

impl Shared {
    fn dispatch(&self, type_id: TypeId, event: BoxedEvent) {
        if let Some(cbs) = self
            .subscribers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&type_id)
        {
            for cb in cbs {
                cb((*event).as_any());
            }
        }

        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        if queue.len() >= MAX_QUEUE_SIZE {
            let evict = queue.len() / 2;
            warn!(
                "Event queue full ({} events), evicting oldest {}",
                queue.len(),
                evict
            );
            queue.drain(0..evict);
        }
        queue.push(event);
    }
}

/// Pub/sub bus with deferred batch processing.
#[derive(Clone, Default)]
pub struct EventBus {
    shared: Arc<Shared>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to events of type E. The callback fires synchronously on
    /// every emit.
    pub fn subscribe<E, F>(&self, callback: F)
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let wrapped: Callback = Arc::new(move |any: &dyn Any| {
            if let Some(event) = any.downcast_ref::<E>() {
                callback(event);
            }
        });
        self.shared
            .subscribers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(TypeId::of::<E>())
            .or_default()
            .push(wrapped);
    }

    /// Emit: invoke callbacks immediately and queue for `poll()`.
    pub fn emit<E: Event>(&self, event: E) {
        self.shared.dispatch(TypeId::of::<E>(), Box::new(event));
    }

    /// Drain all queued events for batch processing in the main loop.
    pub fn poll(&self) -> Vec<BoxedEvent> {
        std::mem::take(&mut *self.shared.queue.lock().unwrap_or_else(|e| e.into_inner()))
    }

    /// Lightweight emit-only handle for passing into components.
    pub fn emitter(&self) -> EventEmitter {
        EventEmitter {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn queue_len(&self) -> usize {
        self.shared
            .queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

/// Clonable emit-only handle.
#[derive(Clone)]
pub struct EventEmitter {
    shared: Arc<Shared>,
}

impl EventEmitter {
    pub fn emit<E: Event>(&self, event: E) {
        self.shared.dispatch(TypeId::of::<E>(), Box::new(event));
    }
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter").finish_non_exhaustive()
    }
}

/// Downcast a polled event to a concrete type.
///
/// The explicit deref routes through the `dyn Event` vtable; without it the
/// blanket impl on `Box<dyn Event>` would win and the downcast always fails.
#[inline]
pub fn downcast_event<E: Event>(event: &BoxedEvent) -> Option<&E> {
    (**event).as_any().downcast_ref::<E>()
}
