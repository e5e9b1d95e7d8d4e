//! Headless Host - host-driven resize notifications.
//!
//! Nothing is delivered on its own: the embedding application (or a test)
//! decides when a batch arrives and what it contains. This makes every
//! platform quirk reproducible, including empty batches, a missing
//! border-box field, and a border box reported as a sequence.
//!
//! # Example
//!
//! ```ignore
//! use spark_size::{track, HeadlessElement, HeadlessHost};
//!
//! let host: HeadlessHost = HeadlessHost::new();
//! let panel = HeadlessElement::new(100.0, 50.0);
//! let size = track(panel.clone(), host.clone());
//!
//! host.resize(&panel, 300.0, 120.0);
//! assert_eq!(size.width.get(), 300.0);
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::element::MeasuredElement;
use crate::observer::{ObserveError, ResizeCallback, ResizeEntry, ResizeHost, Subscription};
use crate::registry::{self, Delivery, ObserverRegistry};
use crate::types::{BoxSize, Dimensions, ObserveOptions};

// =============================================================================
// Headless Element
// =============================================================================

/// An element with a settable offset size.
///
/// Clones share identity and size; equality is identity.
#[derive(Clone)]
pub struct HeadlessElement {
    size: Rc<Cell<Dimensions>>,
}

impl HeadlessElement {
    /// New element with the given offset size.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Rc::new(Cell::new(Dimensions::new(width, height))),
        }
    }

    /// Change the offset size. Does not notify observers.
    pub fn set_size(&self, width: f64, height: f64) {
        self.size.set(Dimensions::new(width, height));
    }

    /// Current offset size.
    pub fn size(&self) -> Dimensions {
        self.size.get()
    }
}

impl PartialEq for HeadlessElement {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.size, &other.size)
    }
}

impl fmt::Debug for HeadlessElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessElement")
            .field("id", &Rc::as_ptr(&self.size))
            .field("size", &self.size.get())
            .finish()
    }
}

impl MeasuredElement for HeadlessElement {
    fn offset_width(&self) -> f64 {
        self.size.get().width
    }

    fn offset_height(&self) -> f64 {
        self.size.get().height
    }
}

// =============================================================================
// Headless Host
// =============================================================================

/// Resize host whose notifications are pushed by the caller.
///
/// Clones share the same set of observations.
#[derive(Clone)]
pub struct HeadlessHost<E: MeasuredElement = HeadlessElement> {
    registry: Rc<RefCell<ObserverRegistry<E>>>,
    next_failure: Rc<RefCell<Option<ObserveError>>>,
    last_options: Rc<Cell<Option<ObserveOptions>>>,
}

impl<E: MeasuredElement> HeadlessHost<E> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(ObserverRegistry::new())),
            next_failure: Rc::new(RefCell::new(None)),
            last_options: Rc::new(Cell::new(None)),
        }
    }

    /// Deliver `batch` to every live observation of `target`.
    ///
    /// Returns how many observations received it.
    pub fn deliver(&self, target: &E, batch: Vec<ResizeEntry<E>>) -> usize {
        let deliveries: Vec<Delivery<E>> = self
            .registry
            .borrow()
            .observers_of(target)
            .into_iter()
            .map(|(id, callback)| Delivery {
                id,
                callback,
                batch: batch.clone(),
            })
            .collect();

        tracing::trace!(
            observers = deliveries.len(),
            entries = batch.len(),
            "headless delivery"
        );
        registry::dispatch(&self.registry, deliveries)
    }

    /// Make the next `observe` call fail with `error`.
    pub fn fail_next_observe(&self, error: ObserveError) {
        *self.next_failure.borrow_mut() = Some(error);
    }

    /// Total observations ever established.
    pub fn observe_count(&self) -> usize {
        self.registry.borrow().observe_count()
    }

    /// Total observations released.
    pub fn release_count(&self) -> usize {
        self.registry.borrow().release_count()
    }

    /// Observations currently live.
    pub fn active_count(&self) -> usize {
        self.registry.borrow().active_count()
    }

    pub fn is_observing(&self, target: &E) -> bool {
        self.registry.borrow().is_observing(target)
    }

    /// Options passed to the most recent successful `observe`.
    pub fn last_options(&self) -> Option<ObserveOptions> {
        self.last_options.get()
    }
}

impl HeadlessHost<HeadlessElement> {
    /// Resize `element` and deliver a single-record border-box entry for it.
    pub fn resize(&self, element: &HeadlessElement, width: f64, height: f64) -> usize {
        element.set_size(width, height);
        self.deliver(
            element,
            vec![ResizeEntry::new(element.clone(), BoxSize::new(width, height))],
        )
    }
}

impl<E: MeasuredElement> Default for HeadlessHost<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: MeasuredElement> ResizeHost<E> for HeadlessHost<E> {
    fn observe(
        &self,
        target: &E,
        options: ObserveOptions,
        callback: ResizeCallback<E>,
    ) -> Result<Subscription, ObserveError> {
        if let Some(error) = self.next_failure.borrow_mut().take() {
            return Err(error);
        }

        self.last_options.set(Some(options));
        Ok(registry::register(&self.registry, target.clone(), callback))
    }
}

// =============================================================================
// Tests
// =============================================================================
