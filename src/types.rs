//! Core types for spark-size.
//!
//! These are the values that flow from a resize host into the tracker and out
//! to reactive readers: measured dimensions, the box sizes a host reports, and
//! the options an observation is configured with.

// =============================================================================
// Dimensions
// =============================================================================

/// Border-box width and height of an element, in device-independent pixels.
///
/// Values are non-negative and may be fractional. The tracker stores
/// `Option<Dimensions>`; `None` means no element is currently tracked.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    /// Create dimensions from width and height.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Zero-sized dimensions.
    pub const ZERO: Self = Self::new(0.0, 0.0);
}

impl From<BoxSize> for Dimensions {
    /// Horizontal writing mode: inline maps to width, block to height.
    fn from(size: BoxSize) -> Self {
        Self::new(size.inline_size, size.block_size)
    }
}

impl From<(f64, f64)> for Dimensions {
    fn from((width, height): (f64, f64)) -> Self {
        Self::new(width, height)
    }
}

// =============================================================================
// Reported Box Sizes
// =============================================================================

/// One size record as reported by a resize host.
///
/// Sizes are logical: `inline_size` runs along the text direction,
/// `block_size` across it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxSize {
    pub inline_size: f64,
    pub block_size: f64,
}

impl BoxSize {
    pub const fn new(inline_size: f64, block_size: f64) -> Self {
        Self {
            inline_size,
            block_size,
        }
    }
}

/// The border-box size field of a resize entry.
///
/// Platforms disagree on its shape: some report a single record, others a
/// sequence with one record per fragment. Both are read through [`first`].
///
/// [`first`]: BorderBoxSize::first
#[derive(Debug, Clone, PartialEq)]
pub enum BorderBoxSize {
    /// A single size record.
    Single(BoxSize),
    /// A sequence of size records (normally exactly one).
    Sequence(Vec<BoxSize>),
}

impl BorderBoxSize {
    /// The record to measure from: the single record, or the first element of
    /// the sequence. An empty sequence yields `None`.
    pub fn first(&self) -> Option<BoxSize> {
        match self {
            BorderBoxSize::Single(size) => Some(*size),
            BorderBoxSize::Sequence(sizes) => sizes.first().copied(),
        }
    }
}

impl From<BoxSize> for BorderBoxSize {
    fn from(size: BoxSize) -> Self {
        BorderBoxSize::Single(size)
    }
}

impl From<Vec<BoxSize>> for BorderBoxSize {
    fn from(sizes: Vec<BoxSize>) -> Self {
        BorderBoxSize::Sequence(sizes)
    }
}

// =============================================================================
// Observation Options
// =============================================================================

/// Which box model an observation measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObservedBox {
    /// Content area only.
    #[default]
    ContentBox,
    /// Content, padding and border.
    BorderBox,
    /// Content area in device pixels.
    DevicePixelContentBox,
}

/// Options passed to a host when establishing an observation.
///
/// The default matches the platform default (content box). The size tracker
/// always asks for [`ObserveOptions::border_box`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObserveOptions {
    pub box_model: ObservedBox,
}

impl ObserveOptions {
    /// Options measuring the border box.
    pub const fn border_box() -> Self {
        Self {
            box_model: ObservedBox::BorderBox,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_of_single_record() {
        let size = BorderBoxSize::Single(BoxSize::new(150.0, 80.0));
        assert_eq!(size.first(), Some(BoxSize::new(150.0, 80.0)));
    }

    #[test]
    fn test_first_of_sequence_takes_first_record() {
        let size = BorderBoxSize::Sequence(vec![
            BoxSize::new(150.0, 80.0),
            BoxSize::new(10.0, 10.0),
        ]);
        assert_eq!(size.first(), Some(BoxSize::new(150.0, 80.0)));
    }

    #[test]
    fn test_first_of_empty_sequence_is_none() {
        assert_eq!(BorderBoxSize::Sequence(Vec::new()).first(), None);
    }

    #[test]
    fn test_box_size_maps_inline_to_width() {
        let dims: Dimensions = BoxSize::new(12.5, 40.0).into();
        assert_eq!(dims, Dimensions::new(12.5, 40.0));
    }

    #[test]
    fn test_default_options_observe_content_box() {
        assert_eq!(ObserveOptions::default().box_model, ObservedBox::ContentBox);
        assert_eq!(ObserveOptions::border_box().box_model, ObservedBox::BorderBox);
    }
}
