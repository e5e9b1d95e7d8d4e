//! Observer Registry - bookkeeping shared by the in-process hosts.
//!
//! Tracks live observations by id, hands out [`Subscription`]s that remove
//! their own registration, and dispatches batches without holding a borrow
//! on the registry. Callbacks are free to observe or release re-entrantly.

use std::cell::RefCell;
use std::rc::Rc;

use crate::element::MeasuredElement;
use crate::observer::{ResizeCallback, ResizeEntry, Subscription};
use crate::types::Dimensions;

pub(crate) type SharedCallback<E> = Rc<RefCell<ResizeCallback<E>>>;

/// A batch waiting to be handed to one observation.
pub(crate) struct Delivery<E> {
    pub id: u64,
    pub callback: SharedCallback<E>,
    pub batch: Vec<ResizeEntry<E>>,
}

pub(crate) struct Registration<E> {
    pub id: u64,
    pub target: E,
    /// Last size delivered to this observation (layout host only).
    pub last_reported: Option<Dimensions>,
    pub callback: SharedCallback<E>,
}

pub(crate) struct ObserverRegistry<E> {
    next_id: u64,
    registrations: Vec<Registration<E>>,
    observe_count: usize,
    release_count: usize,
}

impl<E: MeasuredElement> ObserverRegistry<E> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            registrations: Vec::new(),
            observe_count: 0,
            release_count: 0,
        }
    }

    pub fn observe_count(&self) -> usize {
        self.observe_count
    }

    pub fn release_count(&self) -> usize {
        self.release_count
    }

    pub fn active_count(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_observing(&self, target: &E) -> bool {
        self.registrations.iter().any(|r| &r.target == target)
    }

    pub fn is_registered(&self, id: u64) -> bool {
        self.registrations.iter().any(|r| r.id == id)
    }

    pub fn registrations_mut(&mut self) -> impl Iterator<Item = &mut Registration<E>> {
        self.registrations.iter_mut()
    }

    /// Live observations of `target`, in registration order.
    pub fn observers_of(&self, target: &E) -> Vec<(u64, SharedCallback<E>)> {
        self.registrations
            .iter()
            .filter(|r| &r.target == target)
            .map(|r| (r.id, r.callback.clone()))
            .collect()
    }

    fn insert(&mut self, target: E, callback: ResizeCallback<E>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.observe_count += 1;
        self.registrations.push(Registration {
            id,
            target,
            last_reported: None,
            callback: Rc::new(RefCell::new(callback)),
        });
        id
    }

    fn remove(&mut self, id: u64) -> bool {
        let before = self.registrations.len();
        self.registrations.retain(|r| r.id != id);
        let removed = self.registrations.len() != before;
        if removed {
            self.release_count += 1;
        }
        removed
    }
}

/// Register an observation and return the subscription that removes it.
///
/// The subscription holds only a weak reference, so a dropped host simply
/// turns release into a no-op.
pub(crate) fn register<E: MeasuredElement>(
    registry: &Rc<RefCell<ObserverRegistry<E>>>,
    target: E,
    callback: ResizeCallback<E>,
) -> Subscription {
    let id = registry.borrow_mut().insert(target, callback);
    tracing::trace!(id, "observation registered");

    let weak = Rc::downgrade(registry);
    Subscription::new(move || {
        if let Some(registry) = weak.upgrade() {
            if registry.borrow_mut().remove(id) {
                tracing::trace!(id, "observation released");
            }
        }
    })
}

/// Hand each batch to its callback. Observations released by an earlier
/// callback in the same pass are skipped. Returns the number delivered.
pub(crate) fn dispatch<E: MeasuredElement>(
    registry: &Rc<RefCell<ObserverRegistry<E>>>,
    deliveries: Vec<Delivery<E>>,
) -> usize {
    let mut delivered = 0;

    for delivery in deliveries {
        if !registry.borrow().is_registered(delivery.id) {
            continue;
        }

        let Ok(mut callback) = delivery.callback.try_borrow_mut() else {
            tracing::warn!(id = delivery.id, "skipping re-entrant resize delivery");
            continue;
        };

        (*callback)(&delivery.batch);
        delivered += 1;
    }

    delivered
}

// =============================================================================
// Tests
// =============================================================================
