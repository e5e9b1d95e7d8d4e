//! Web Host - the browser's `ResizeObserver` over DOM elements.
//!
//! Only compiled on `wasm32` targets. Each observation owns its own
//! `ResizeObserver` and JS closure; releasing the subscription unobserves the
//! element and frees the closure.
//!
//! Browsers disagree on `borderBoxSize`: older engines expose a single
//! record, current ones a one-element array, and some none at all. Entries are
//! converted as-is and normalized by the tracker.

use js_sys::{Array, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    HtmlElement, ResizeObserver, ResizeObserverBoxOptions, ResizeObserverEntry,
    ResizeObserverOptions, ResizeObserverSize,
};

use crate::element::MeasuredElement;
use crate::observer::{ObserveError, ResizeCallback, ResizeEntry, ResizeHost, Subscription};
use crate::types::{BorderBoxSize, BoxSize, ObserveOptions, ObservedBox};

impl MeasuredElement for HtmlElement {
    fn offset_width(&self) -> f64 {
        f64::from(HtmlElement::offset_width(self))
    }

    fn offset_height(&self) -> f64 {
        f64::from(HtmlElement::offset_height(self))
    }
}

/// Resize host backed by `window.ResizeObserver`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebResizeHost;

impl ResizeHost<HtmlElement> for WebResizeHost {
    fn observe(
        &self,
        target: &HtmlElement,
        options: ObserveOptions,
        mut callback: ResizeCallback<HtmlElement>,
    ) -> Result<Subscription, ObserveError> {
        let closure = Closure::<dyn FnMut(Array)>::new(move |records: Array| {
            let batch: Vec<ResizeEntry<HtmlElement>> = records
                .iter()
                .filter_map(|record| record.dyn_into::<ResizeObserverEntry>().ok())
                .filter_map(|record| to_entry(&record))
                .collect();
            callback(&batch);
        });

        let observer = ResizeObserver::new(closure.as_ref().unchecked_ref())
            .map_err(|err| ObserveError::Platform(describe(&err)))?;

        let observe_options = ResizeObserverOptions::new();
        observe_options.set_box(box_option(options.box_model));
        observer.observe_with_options(target, &observe_options);

        let target = target.clone();
        Ok(Subscription::new(move || {
            observer.unobserve(&target);
            observer.disconnect();
            drop(closure);
        }))
    }
}

fn box_option(observed: ObservedBox) -> ResizeObserverBoxOptions {
    match observed {
        ObservedBox::ContentBox => ResizeObserverBoxOptions::ContentBox,
        ObservedBox::BorderBox => ResizeObserverBoxOptions::BorderBox,
        ObservedBox::DevicePixelContentBox => ResizeObserverBoxOptions::DevicePixelContentBox,
    }
}

fn to_entry(record: &ResizeObserverEntry) -> Option<ResizeEntry<HtmlElement>> {
    let target = record.target().dyn_into::<HtmlElement>().ok()?;
    Some(ResizeEntry {
        target,
        border_box_size: border_box_size(record),
    })
}

/// Read `borderBoxSize` without assuming its shape.
fn border_box_size(record: &ResizeObserverEntry) -> Option<BorderBoxSize> {
    let key = JsValue::from_str("borderBoxSize");
    if !Reflect::has(record, &key).unwrap_or(false) {
        return None;
    }

    let value = Reflect::get(record, &key).ok()?;
    if value.is_undefined() || value.is_null() {
        return None;
    }

    if Array::is_array(&value) {
        let sizes = Array::from(&value).iter().map(|size| box_size(&size)).collect();
        Some(BorderBoxSize::Sequence(sizes))
    } else {
        Some(BorderBoxSize::Single(box_size(&value)))
    }
}

fn box_size(value: &JsValue) -> BoxSize {
    let size = value.unchecked_ref::<ResizeObserverSize>();
    BoxSize::new(size.inline_size(), size.block_size())
}

fn describe(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

// =============================================================================
// Tests
// =============================================================================
