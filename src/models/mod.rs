//! Core data models for the navigation rail.

mod nav;

pub use nav::{default_items, find_item, Icon, NavigationItem, RouteId};
