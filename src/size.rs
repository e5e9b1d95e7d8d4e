//! Size Tracker - live border-box dimensions of an element.
//!
//! [`track`] binds to an [`ElementRef`] and exposes the referenced element's
//! width and height as reactive values. It measures synchronously whenever the
//! reference resolves to a new element, then keeps the values current from the
//! host's resize notifications.
//!
//! # Pattern: EffectScope-based Cleanup
//!
//! 1. A single effect resolves the reference and rebinds when it changes
//! 2. The active [`Subscription`] lives in shared storage next to the effect
//! 3. `on_scope_dispose()` releases it when the tracker or an enclosing scope stops
//!
//! # Binding Lifecycle
//!
//! - none: dimensions become unset, the previous observation is released
//! - element: dimensions are measured immediately, the previous observation is
//!   released and a border-box observation on the new element starts
//! - same element again: nothing happens
//!
//! Swapping one element for another never passes through unset.

use std::cell::RefCell;
use std::rc::Rc;

use spark_signals::{
    derived, effect, effect_scope, on_scope_dispose, signal, Derived, EffectScope, Signal,
};

use crate::element::{ElementRef, MeasuredElement};
use crate::observer::{ResizeCallback, ResizeEntry, ResizeHost, Subscription};
use crate::types::{Dimensions, ObserveOptions};

// =============================================================================
// Measurement
// =============================================================================

/// Dimensions reported by one resize entry.
///
/// Uses the first border-box record when the entry has one, otherwise measures
/// `element` directly.
pub fn measure_entry<E: MeasuredElement>(entry: &ResizeEntry<E>, element: &E) -> Dimensions {
    match entry.border_box_size.as_ref().and_then(|size| size.first()) {
        Some(size) => size.into(),
        None => element.offset_size(),
    }
}

/// Dimensions for a whole notification batch. Only the first entry counts;
/// an empty batch yields `None`.
pub fn measure_batch<E: MeasuredElement>(
    batch: &[ResizeEntry<E>],
    element: &E,
) -> Option<Dimensions> {
    batch.first().map(|entry| measure_entry(entry, element))
}

// =============================================================================
// Binding State
// =============================================================================

/// What the tracker is currently bound to.
struct Binding<E> {
    element: Option<E>,
    subscription: Option<Subscription>,
}

impl<E> Binding<E> {
    fn release(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.release();
        }
    }
}

// =============================================================================
// Element Size
// =============================================================================

/// Reactive size of a tracked element.
///
/// `width` and `height` read `0.0` while no element is tracked. Dropping the
/// handle (or calling [`stop`](ElementSize::stop)) releases the observation.
pub struct ElementSize {
    /// Border-box width, `0.0` when unset.
    pub width: Derived<f64>,
    /// Border-box height, `0.0` when unset.
    pub height: Derived<f64>,
    dimensions: Signal<Option<Dimensions>>,
    scope: EffectScope,
}

impl ElementSize {
    /// Current dimensions, `None` while no element is tracked.
    ///
    /// Reading inside an effect or derived tracks the value.
    pub fn dimensions(&self) -> Option<Dimensions> {
        self.dimensions.get()
    }

    /// Current width (tracked read).
    pub fn width(&self) -> f64 {
        self.width.get()
    }

    /// Current height (tracked read).
    pub fn height(&self) -> f64 {
        self.height.get()
    }

    /// Whether the tracker is still bound to its reference.
    ///
    /// Turns false on [`stop`](ElementSize::stop) and when an enclosing scope stops.
    pub fn is_active(&self) -> bool {
        self.scope.active()
    }

    /// Stop tracking and release the active observation.
    ///
    /// The last values stay readable.
    pub fn stop(&mut self) {
        self.scope.stop();
    }
}

impl Drop for ElementSize {
    fn drop(&mut self) {
        self.stop();
    }
}

// =============================================================================
// track()
// =============================================================================

/// Track the border-box size of whatever `element` refers to.
///
/// `element` may be a plain element, an `Option`, a `Signal<Option<E>>`, or an
/// [`ElementRef::getter`]. Rebinding follows the reference reactively.
///
/// # Example
///
/// ```ignore
/// use spark_signals::signal;
/// use spark_size::{track, HeadlessElement, HeadlessHost};
///
/// let host: HeadlessHost = HeadlessHost::new();
/// let panel = signal(Some(HeadlessElement::new(100.0, 50.0)));
///
/// let size = track(panel.clone(), host.clone());
/// assert_eq!(size.width.get(), 100.0); // measured synchronously
///
/// panel.set(None);
/// assert_eq!(size.dimensions(), None);
/// assert_eq!(size.width.get(), 0.0);
/// ```
pub fn track<E, H>(element: impl Into<ElementRef<E>>, host: H) -> ElementSize
where
    E: MeasuredElement,
    H: ResizeHost<E> + 'static,
{
    let element = element.into();

    let dimensions: Signal<Option<Dimensions>> = signal(None);

    let dims_for_width = dimensions.clone();
    let width = derived(move || dims_for_width.get().map_or(0.0, |d| d.width));
    let dims_for_height = dimensions.clone();
    let height = derived(move || dims_for_height.get().map_or(0.0, |d| d.height));

    let binding: Rc<RefCell<Binding<E>>> = Rc::new(RefCell::new(Binding {
        element: None,
        subscription: None,
    }));

    let binding_for_effect = binding.clone();
    let binding_for_dispose = binding.clone();
    let dims_for_effect = dimensions.clone();

    let scope = effect_scope(false);

    scope.run(move || {
        let _effect_cleanup = effect(move || {
            let resolved = element.resolve();
            rebind(&binding_for_effect, resolved, &host, &dims_for_effect);
        });

        on_scope_dispose(move || {
            let mut binding = binding_for_dispose.borrow_mut();
            if binding.subscription.is_some() {
                tracing::debug!("size tracker stopped, releasing observation");
            }
            binding.release();
            binding.element = None;
        });
    });

    ElementSize {
        width,
        height,
        dimensions,
        scope,
    }
}

/// Apply a newly resolved element to the binding.
fn rebind<E, H>(
    binding: &Rc<RefCell<Binding<E>>>,
    resolved: Option<E>,
    host: &H,
    dimensions: &Signal<Option<Dimensions>>,
) where
    E: MeasuredElement,
    H: ResizeHost<E>,
{
    // Skip if the element is unchanged
    if binding.borrow().element == resolved {
        return;
    }

    // The previous observation always goes, whatever comes next
    let previous = {
        let mut binding = binding.borrow_mut();
        binding.element = resolved.clone();
        binding.subscription.take()
    };
    if let Some(mut previous) = previous {
        previous.release();
    }

    let Some(element) = resolved else {
        tracing::debug!("tracked element removed, dimensions unset");
        dimensions.set(None);
        return;
    };

    // Provide a size before any notification arrives
    let initial = element.offset_size();
    tracing::debug!(width = initial.width, height = initial.height, "tracking new element");
    dimensions.set(Some(initial));

    let callback = resize_callback(element.clone(), dimensions.clone());
    match host.observe(&element, ObserveOptions::border_box(), callback) {
        Ok(subscription) => {
            let mut binding = binding.borrow_mut();
            // A nested rebind may have moved on while observing
            if binding.element.as_ref() == Some(&element) {
                binding.subscription = Some(subscription);
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "could not observe element, size will not follow resizes");
        }
    }
}

fn resize_callback<E: MeasuredElement>(
    element: E,
    dimensions: Signal<Option<Dimensions>>,
) -> ResizeCallback<E> {
    Box::new(move |batch: &[ResizeEntry<E>]| {
        let Some(next) = measure_batch(batch, &element) else {
            return;
        };
        tracing::trace!(width = next.width, height = next.height, "element resized");
        dimensions.set(Some(next));
    })
}

// =============================================================================
// Tests
// =============================================================================
