//! Rotator integration tests.

mod support;
mod selection;
mod failures;
mod concurrency;

#[cfg(feature = "http")]
mod http;
