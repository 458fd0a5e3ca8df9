//! Scroll signal and subscriptions
//!
//! A [`ScrollSignal`] fans scroll events out to listeners. Subscribing
//! returns a [`ScrollSubscription`] handle; the listener stays attached
//! exactly as long as the handle is held. Releasing (or dropping) the
//! handle detaches the listener immediately, including from an emit that
//! is already in progress.
//!
//! # Example
//!
//! ```rust
//! use folio_scroll::{ScrollEvent, ScrollSignal};
//!
//! let signal = ScrollSignal::new();
//! let subscription = signal.subscribe(|event| println!("offset: {}", event.offset()));
//!
//! signal.emit(ScrollEvent::Scrolled { offset: 120.0 });
//! subscription.release();
//! assert_eq!(signal.listener_count(), 0);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a registered scroll listener
    pub struct SubscriptionId;
}

/// An event delivered to scroll listeners
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScrollEvent {
    /// The scroll offset changed
    Scrolled { offset: f32 },
    /// A frame elapsed (`dt` in seconds); offset is unchanged
    Frame { offset: f32, dt: f32 },
}

impl ScrollEvent {
    pub fn offset(&self) -> f32 {
        match *self {
            ScrollEvent::Scrolled { offset } | ScrollEvent::Frame { offset, .. } => offset,
        }
    }
}

/// Listener callback type
pub type ScrollListener = Arc<dyn Fn(&ScrollEvent) + Send + Sync>;

struct ListenerEntry {
    listener: ScrollListener,
    active: Arc<AtomicBool>,
}

#[derive(Default)]
struct SignalInner {
    listeners: SlotMap<SubscriptionId, ListenerEntry>,
}

fn lock(inner: &Mutex<SignalInner>) -> MutexGuard<'_, SignalInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Broadcasts scroll events to subscribed listeners
#[derive(Clone, Default)]
pub struct ScrollSignal {
    inner: Arc<Mutex<SignalInner>>,
}

impl fmt::Debug for ScrollSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollSignal")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl ScrollSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a closure
    pub fn subscribe<F>(&self, listener: F) -> ScrollSubscription
    where
        F: Fn(&ScrollEvent) + Send + Sync + 'static,
    {
        self.subscribe_listener(Arc::new(listener))
    }

    /// Subscribe a shared listener
    pub fn subscribe_listener(&self, listener: ScrollListener) -> ScrollSubscription {
        let active = Arc::new(AtomicBool::new(true));
        let id = lock(&self.inner).listeners.insert(ListenerEntry {
            listener,
            active: Arc::clone(&active),
        });

        ScrollSubscription {
            id,
            signal: Arc::downgrade(&self.inner),
            active,
        }
    }

    /// Deliver `event` to every attached listener
    ///
    /// The listener set is snapshotted once so every listener sees the same
    /// event, and no lock is held while listeners run. Returns the number of
    /// listeners the event was delivered to.
    pub fn emit(&self, event: ScrollEvent) -> usize {
        let snapshot: Vec<(ScrollListener, Arc<AtomicBool>)> = lock(&self.inner)
            .listeners
            .values()
            .map(|entry| (Arc::clone(&entry.listener), Arc::clone(&entry.active)))
            .collect();

        let mut delivered = 0;
        for (listener, active) in snapshot {
            // Released mid-emit: skip
            if !active.load(Ordering::Acquire) {
                continue;
            }
            listener(&event);
            delivered += 1;
        }
        delivered
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.inner).listeners.len()
    }
}

/// Handle that keeps a listener attached to a [`ScrollSignal`]
///
/// Dropping the handle detaches the listener. [`ScrollSubscription::release`]
/// does the same explicitly.
pub struct ScrollSubscription {
    id: SubscriptionId,
    signal: Weak<Mutex<SignalInner>>,
    active: Arc<AtomicBool>,
}

impl fmt::Debug for ScrollSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollSubscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

impl ScrollSubscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Whether the listener is still attached
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Detach the listener
    pub fn release(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        // Only the first call does any work
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(inner) = self.signal.upgrade() {
            lock(&inner).listeners.remove(self.id);
        }
    }
}

impl Drop for ScrollSubscription {
    fn drop(&mut self) {
        self.detach();
    }
}
