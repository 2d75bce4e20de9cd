// Library target shared by the `hankey` binary, the integration tests and the
// criterion benchmarks.

pub mod app;
pub mod config;
pub mod event;
pub mod hangul;
pub mod keyboard;
pub mod session;
pub mod store;
pub mod ui;
pub mod words;
