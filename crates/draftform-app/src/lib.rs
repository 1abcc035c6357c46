//! draftform Application
//!
//! Demo shell wiring the canvas and form adapters by explicit construction.

mod app;

pub use app::{App, AppConfig, DEFAULT_SCHEMA};
