//! Resize observation facility.
//!
//! A [`ResizeHost`] is whatever delivers resize notifications for elements:
//! the browser's `ResizeObserver`, a taffy layout pass, or a test driver.
//! Observing returns a [`Subscription`]; releasing (or dropping) it stops
//! delivery. Release runs at most once.

use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::element::MeasuredElement;
use crate::types::{BorderBoxSize, ObserveOptions, ObservedBox};

// =============================================================================
// Cleanup Function
// =============================================================================

/// Release action owned by a subscription.
pub type Cleanup = Box<dyn FnOnce()>;

// =============================================================================
// Resize Entries
// =============================================================================

/// One change record in a notification batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeEntry<E> {
    /// The element that resized.
    pub target: E,
    /// Border-box size, when the host reports one. Hosts that do not leave it
    /// as `None` and readers measure the element themselves.
    pub border_box_size: Option<BorderBoxSize>,
}

impl<E> ResizeEntry<E> {
    /// Entry carrying a border-box size.
    pub fn new(target: E, border_box_size: impl Into<BorderBoxSize>) -> Self {
        Self {
            target,
            border_box_size: Some(border_box_size.into()),
        }
    }

    /// Entry without a border-box size field.
    pub fn without_border_box(target: E) -> Self {
        Self {
            target,
            border_box_size: None,
        }
    }
}

/// Callback invoked with each notification batch.
pub type ResizeCallback<E> = Box<dyn FnMut(&[ResizeEntry<E>])>;

// =============================================================================
// Errors
// =============================================================================

/// Why a host could not establish an observation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObserveError {
    #[error("host cannot observe the {0:?} box model")]
    Unsupported(ObservedBox),

    #[error("element is not attached to this host")]
    Detached,

    #[error("platform refused to observe: {0}")]
    Platform(String),
}

// =============================================================================
// Subscription
// =============================================================================

/// Handle to an active observation.
///
/// Holds the host's release action. [`release`](Subscription::release) runs it
/// once; later calls and the eventual drop do nothing.
pub struct Subscription {
    release: Option<Cleanup>,
}

impl Subscription {
    /// Subscription that runs `release` when released or dropped.
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Stop the observation. Idempotent.
    pub fn release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }

    /// Whether the release action has not run yet.
    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

// =============================================================================
// Resize Host
// =============================================================================

/// A platform facility that reports element size changes.
///
/// Callbacks run on the caller's thread. A host must not deliver to a callback
/// after its subscription has been released.
pub trait ResizeHost<E: MeasuredElement> {
    /// Start observing `target` with `options`, delivering batches to `callback`.
    fn observe(
        &self,
        target: &E,
        options: ObserveOptions,
        callback: ResizeCallback<E>,
    ) -> Result<Subscription, ObserveError>;
}

impl<E: MeasuredElement, H: ResizeHost<E> + ?Sized> ResizeHost<E> for Rc<H> {
    fn observe(
        &self,
        target: &E,
        options: ObserveOptions,
        callback: ResizeCallback<E>,
    ) -> Result<Subscription, ObserveError> {
        (**self).observe(target, options, callback)
    }
}

// =============================================================================
// Tests
// =============================================================================
