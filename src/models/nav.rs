//! Navigation item model for the rail.

use serde::{Deserialize, Serialize};

/// Route identifier requested when an item is activated (e.g. `/doaj`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(String);

impl RouteId {
    /// Create a route identifier
    pub fn new(route: impl Into<String>) -> Self {
        Self(route.into())
    }

    /// The route path as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RouteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RouteId {
    fn from(route: &str) -> Self {
        Self::new(route)
    }
}

/// Symbolic icon token; renderers map it to a glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Icon {
    /// Open book (journals)
    BookOpen,
    /// Closed book (books)
    Book,
    /// Hamburger menu, used by the toggle control
    Menu,
}

impl Icon {
    /// Terminal glyph for this icon
    pub fn glyph(&self) -> &'static str {
        match self {
            Icon::BookOpen => "📖",
            Icon::Book => "📕",
            Icon::Menu => "☰",
        }
    }
}

/// A single entry in the navigation rail
///
/// Items are immutable once built; the order of the list is the display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationItem {
    /// Text shown next to the icon when the rail is expanded
    pub label: String,

    /// Route requested on activation
    pub route_id: RouteId,

    /// Icon shown in every tier that shows items
    pub icon: Icon,
}

impl NavigationItem {
    /// Create a new navigation item
    pub fn new(label: impl Into<String>, route_id: impl Into<RouteId>, icon: Icon) -> Self {
        Self {
            label: label.into(),
            route_id: route_id.into(),
            icon,
        }
    }
}

/// The built-in item list: the DOAJ journal search and the DOAB book search
pub fn default_items() -> Vec<NavigationItem> {
    vec![
        NavigationItem::new("DOAJ", "/doaj", Icon::BookOpen),
        NavigationItem::new("DOAB", "/doab", Icon::Book),
    ]
}

/// Find the item for a route in an ordered item list
pub fn find_item<'a>(items: &'a [NavigationItem], route: &RouteId) -> Option<&'a NavigationItem> {
    items.iter().find(|item| &item.route_id == route)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_items_order() {
        let items = default_items();
        let routes: Vec<&str> = items.iter().map(|i| i.route_id.as_str()).collect();
        assert_eq!(routes, vec!["/doaj", "/doab"]);
        assert_eq!(items[0].label, "DOAJ");
        assert_eq!(items[1].icon, Icon::Book);
    }

    #[test]
    fn test_find_item() {
        let items = default_items();
        let found = find_item(&items, &RouteId::from("/doab")).unwrap();
        assert_eq!(found.label, "DOAB");
        assert!(find_item(&items, &RouteId::from("/oapen")).is_none());
    }

    #[test]
    fn test_route_id_serializes_as_string() {
        let json = serde_json::to_string(&RouteId::from("/doaj")).unwrap();
        assert_eq!(json, "\"/doaj\"");
    }
}
