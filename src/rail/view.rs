//! Render model for a rail snapshot.

use serde::Serialize;
use tokio::time::Instant;

use super::dispatcher::RailSnapshot;
use super::machine::Tier;
use crate::models::{Icon, NavigationItem, RouteId};

/// Item width when labels are shown, in pixels
pub const EXPANDED_ITEM_WIDTH: u16 = 160;

/// Item width when only the icon is shown, in pixels
pub const COMPACT_ITEM_WIDTH: u16 = 56;

/// Background of the item matching the active route
pub const ACTIVE_BACKGROUND: &str = "#353535";

/// Background of every other item
pub const INACTIVE_BACKGROUND: &str = "#9CA3AF";

/// The toggle control
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToggleView {
    /// Accessible label of the toggle
    pub aria_label: &'static str,
    /// Whether the rail currently shows labels
    pub aria_expanded: bool,
    /// Whether the toggle is bouncing
    pub bouncing: bool,
    /// Current vertical bounce offset in pixels
    pub offset_px: f32,
}

/// One visible navigation item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemView {
    /// Route requested on click
    pub route_id: RouteId,
    /// Icon token
    pub icon: Icon,
    /// Label, present only when the rail shows labels
    pub label: Option<String>,
    /// Whether the item matches the active route
    pub active: bool,
    /// Rendered width in pixels
    pub width_px: u16,
    /// Background colour
    pub background: &'static str,
}

/// What to draw for a rail at one instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RailView {
    /// Persisted tier
    pub tier: Tier,
    /// Whether the pointer is over the rail
    pub hovered: bool,
    /// The toggle control
    pub toggle: ToggleView,
    /// Visible items in display order; empty when icons are hidden
    pub items: Vec<ItemView>,
}

impl RailView {
    /// Build the view for `snapshot`, marking the item for `active_route`
    pub fn build(
        items: &[NavigationItem],
        snapshot: &RailSnapshot,
        active_route: Option<&RouteId>,
        now: Instant,
    ) -> Self {
        let presentation = snapshot.presentation;
        let expanded = presentation.show_expanded();

        let offset_px = if presentation.bounce_cue() {
            snapshot.cue.offset_px(now)
        } else {
            0.0
        };

        let items = if presentation.show_icons() {
            items
                .iter()
                .map(|item| {
                    let active = active_route == Some(&item.route_id);
                    ItemView {
                        route_id: item.route_id.clone(),
                        icon: item.icon,
                        label: expanded.then(|| item.label.clone()),
                        active,
                        width_px: if expanded {
                            EXPANDED_ITEM_WIDTH
                        } else {
                            COMPACT_ITEM_WIDTH
                        },
                        background: if active {
                            ACTIVE_BACKGROUND
                        } else {
                            INACTIVE_BACKGROUND
                        },
                    }
                })
                .collect()
        } else {
            Vec::new()
        };

        Self {
            tier: presentation.tier,
            hovered: snapshot.state.hovered(),
            toggle: ToggleView {
                aria_label: "Expand navigation",
                aria_expanded: expanded,
                bouncing: presentation.bounce_cue(),
                offset_px,
            },
            items,
        }
    }
}
