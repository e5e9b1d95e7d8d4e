//! Element model - what the size tracker measures and how it finds it.
//!
//! A [`MeasuredElement`] is anything with an identity and a synchronous
//! border-box measurement. An [`ElementRef`] is the possibly reactive handle a
//! component passes in: a fixed element, a signal, or a getter. Resolving a
//! signal or getter inside an effect makes that effect depend on it.

use std::fmt;
use std::rc::Rc;

use spark_signals::Signal;

use crate::types::Dimensions;

// =============================================================================
// Measured Element
// =============================================================================

/// An element whose border-box size can be read synchronously.
///
/// `PartialEq` is element identity: two values are equal when they refer to
/// the same element, not when they happen to have the same size.
pub trait MeasuredElement: Clone + PartialEq + 'static {
    /// Border-box width as the element reports it right now.
    fn offset_width(&self) -> f64;

    /// Border-box height as the element reports it right now.
    fn offset_height(&self) -> f64;

    /// Both offset dimensions at once.
    fn offset_size(&self) -> Dimensions {
        Dimensions::new(self.offset_width(), self.offset_height())
    }
}

// =============================================================================
// Element Reference
// =============================================================================

/// A reference to an element that may change over time.
///
/// Mirrors how component props are passed: static, bound to a signal, or
/// computed by a getter. `None` means "no element".
#[derive(Clone)]
pub enum ElementRef<E: MeasuredElement> {
    /// Fixed element (or fixed absence).
    Static(Option<E>),
    /// Element held in a signal.
    Signal(Signal<Option<E>>),
    /// Getter called on every resolve.
    Getter(Rc<dyn Fn() -> Option<E>>),
}

impl<E: MeasuredElement> ElementRef<E> {
    /// Reference computed by a getter closure.
    pub fn getter(f: impl Fn() -> Option<E> + 'static) -> Self {
        ElementRef::Getter(Rc::new(f))
    }

    /// The element currently referenced.
    pub fn resolve(&self) -> Option<E> {
        match self {
            ElementRef::Static(element) => element.clone(),
            ElementRef::Signal(signal) => signal.get(),
            ElementRef::Getter(f) => f(),
        }
    }
}

impl<E: MeasuredElement> Default for ElementRef<E> {
    fn default() -> Self {
        ElementRef::Static(None)
    }
}

impl<E: MeasuredElement> From<E> for ElementRef<E> {
    fn from(element: E) -> Self {
        ElementRef::Static(Some(element))
    }
}

impl<E: MeasuredElement> From<Option<E>> for ElementRef<E> {
    fn from(element: Option<E>) -> Self {
        ElementRef::Static(element)
    }
}

impl<E: MeasuredElement> From<Signal<Option<E>>> for ElementRef<E> {
    fn from(signal: Signal<Option<E>>) -> Self {
        ElementRef::Signal(signal)
    }
}

impl<E: MeasuredElement> fmt::Debug for ElementRef<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementRef::Static(element) => f
                .debug_tuple("Static")
                .field(&element.as_ref().map(|_| ".."))
                .finish(),
            ElementRef::Signal(_) => f.write_str("Signal(..)"),
            ElementRef::Getter(_) => f.write_str("Getter(..)"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use spark_signals::signal;

    #[derive(Clone, PartialEq, Debug)]
    struct Fixed(u32, f64, f64);

    impl MeasuredElement for Fixed {
        fn offset_width(&self) -> f64 {
            self.1
        }
        fn offset_height(&self) -> f64 {
            self.2
        }
    }

    #[test]
    fn test_static_ref_resolves_element() {
        let element_ref: ElementRef<Fixed> = Fixed(1, 10.0, 20.0).into();
        assert_eq!(element_ref.resolve(), Some(Fixed(1, 10.0, 20.0)));
    }

    #[test]
    fn test_default_ref_is_none() {
        let element_ref: ElementRef<Fixed> = ElementRef::default();
        assert_eq!(element_ref.resolve(), None);
    }

    #[test]
    fn test_signal_ref_follows_signal() {
        let element = signal(None);
        let element_ref: ElementRef<Fixed> = element.clone().into();
        assert_eq!(element_ref.resolve(), None);

        element.set(Some(Fixed(2, 1.0, 1.0)));
        assert_eq!(element_ref.resolve(), Some(Fixed(2, 1.0, 1.0)));
    }

    #[test]
    fn test_getter_ref_calls_getter() {
        let visible = signal(true);
        let visible_clone = visible.clone();
        let element_ref = ElementRef::getter(move || {
            visible_clone.get().then(|| Fixed(3, 5.0, 6.0))
        });

        assert_eq!(element_ref.resolve(), Some(Fixed(3, 5.0, 6.0)));
        visible.set(false);
        assert_eq!(element_ref.resolve(), None);
    }

    #[test]
    fn test_offset_size_combines_both_axes() {
        assert_eq!(Fixed(4, 7.5, 3.0).offset_size(), Dimensions::new(7.5, 3.0));
    }
}
