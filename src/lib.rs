//! # eresources-nav
//!
//! The adaptive navigation rail of the E-resources research article search
//! front end: a floating menu that expands on demand, degrades through
//! visibility tiers when idle, and re-expands on hover.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Navigation items and route identifiers
//! - [`rail`]: State machine, timers, bounce cue, activation gate and event loop
//! - [`script`]: Scripted input sequences for the simulator
//! - [`ui`]: Terminal rendering for the simulator
//! - [`config`]: Configuration management

pub mod config;
pub mod models;
pub mod rail;
pub mod script;
pub mod ui;

// Re-export commonly used types
pub use models::{NavigationItem, RouteId};
pub use rail::{spawn_rail, NavigationRail, RailHandle, RailSettings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
