//! Browser tests for the `ResizeObserver` host.
//!
//! Run with: wasm-pack test --headless --firefox

#![cfg(target_arch = "wasm32")]

use js_sys::Promise;
use spark_signals::signal;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::HtmlElement;

use spark_size::{track, Dimensions, WebResizeHost};

wasm_bindgen_test_configure!(run_in_browser);

fn mounted_div(width: u32, height: u32) -> HtmlElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let element = document
        .create_element("div")
        .unwrap()
        .dyn_into::<HtmlElement>()
        .unwrap();
    element
        .set_attribute(
            "style",
            &format!("width:{width}px;height:{height}px;padding:0;border:0;margin:0"),
        )
        .unwrap();
    document.body().unwrap().append_child(&element).unwrap();
    element
}

#[wasm_bindgen_test]
fn test_mounted_element_measured_synchronously() {
    let element = mounted_div(120, 40);
    let size = track(element.clone(), WebResizeHost);
    assert_eq!(size.dimensions(), Some(Dimensions::new(120.0, 40.0)));
}

#[wasm_bindgen_test]
fn test_swap_and_clear_reference() {
    let first = mounted_div(10, 20);
    let second = mounted_div(30, 40);
    let element = signal(Some(first));

    let size = track(element.clone(), WebResizeHost);
    element.set(Some(second));
    assert_eq!(size.dimensions(), Some(Dimensions::new(30.0, 40.0)));

    element.set(None);
    assert_eq!(size.dimensions(), None);
    assert_eq!(size.width(), 0.0);
}

/// Resolve after the next animation frame. Resize observations are delivered
/// between layout and paint, so a frame boundary is enough for one round.
async fn next_frame() {
    let promise = Promise::new(&mut |resolve, _reject| {
        web_sys::window()
            .unwrap()
            .request_animation_frame(&resolve)
            .unwrap();
    });
    JsFuture::from(promise).await.unwrap();
}

#[wasm_bindgen_test]
async fn test_resize_reaches_tracker() {
    let element = mounted_div(100, 50);
    let size = track(element.clone(), WebResizeHost);
    assert_eq!(size.dimensions(), Some(Dimensions::new(100.0, 50.0)));

    element
        .set_attribute("style", "width:240px;height:60px;padding:0;border:4px solid;margin:0")
        .unwrap();

    for _ in 0..10 {
        next_frame().await;
        if size.width() == 248.0 {
            break;
        }
    }

    // Border box includes the 4px border on each side
    assert_eq!(size.dimensions(), Some(Dimensions::new(248.0, 68.0)));
}
