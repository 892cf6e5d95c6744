//! Card Installments Web Frontend
//!
//! Leptos-based WASM checkout page: card entry through Stripe.js, plan
//! selection, confirmation and next-action handling.

mod api;
mod app;
mod components;
mod pages;
mod stripe_js;

pub use app::App;

use wasm_bindgen::prelude::*;

/// WASM entry point
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    leptos::mount::mount_to_body(App);
}
