//! # spark-size
//!
//! Reactive element size tracking for UIs built on
//! [spark-signals](https://github.com/RLabs-Inc/spark-signals).
//!
//! [`track`] turns a (possibly changing) element reference into reactive
//! `width` / `height` values that follow the element's border box. The sizes
//! come from a [`ResizeHost`]:
//!
//! - `WebResizeHost` - the browser's `ResizeObserver` (wasm32 only)
//! - [`LayoutHost`] - taffy layout passes for native UIs
//! - [`HeadlessHost`] - notifications pushed by the caller
//!
//! ```text
//! ElementRef → track() effect → host.observe() → resize batches → dimensions signal
//!                                                                  ├→ width derived
//!                                                                  └→ height derived
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Dimensions, reported box sizes, observation options
//! - [`element`] - Measured elements and element references
//! - [`observer`] - The resize host trait, entries, subscriptions
//! - [`size`] - The size tracker
//! - [`headless`], [`layout`], `web` - Host implementations

pub mod element;
pub mod headless;
pub mod layout;
pub mod observer;
mod registry;
pub mod size;
pub mod types;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use types::*;

pub use element::{ElementRef, MeasuredElement};

pub use observer::{Cleanup, ObserveError, ResizeCallback, ResizeEntry, ResizeHost, Subscription};

pub use size::{measure_batch, measure_entry, track, ElementSize};

pub use headless::{HeadlessElement, HeadlessHost};

pub use layout::{LayoutError, LayoutHost, LayoutNode, SharedTree};

#[cfg(target_arch = "wasm32")]
pub use web::WebResizeHost;
