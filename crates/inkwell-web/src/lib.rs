#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::future_not_send)]

//! Browser host for the Inkwell access layer.
//!
//! Layout:
//! - `encode.rs`: query-string and form encoding shared by the fetch transport
//! - `effects.rs`: turning guard decisions into navigation and notices
//! - `browser/` (wasm32 only): fetch transport, `localStorage` store,
//!   history navigator, console notifier and the `start` entrypoint

pub mod effects;
pub mod encode;

#[cfg(target_arch = "wasm32")]
pub mod browser;

#[cfg(target_arch = "wasm32")]
pub use browser::start;
