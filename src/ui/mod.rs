//! Terminal output for the rail simulator.
//!
//! This module provides colored status lines, a one-line text rendering of a
//! [`RailView`] and the item table printed by `eresources-nav items`.

use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::time::Duration;

use crate::models::{Icon, NavigationItem, RouteId};
use crate::rail::{RailView, Tier};

/// Check if stdout is a terminal.
pub fn is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

/// Status icons for different operations.
pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Warning => "⚠",
        Status::Navigate => "→",
    }
}

/// Status types for colored output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Warning,
    Navigate,
}

/// Print a styled status message.
pub fn print_status(status: Status, msg: &str) {
    let icon = status_icon(status);
    match status {
        Status::Success => println!("{} {}", icon.green().bold(), msg),
        Status::Warning => println!("{} {}", icon.yellow().bold(), msg),
        Status::Navigate => println!("{} {}", icon.magenta().bold(), msg),
    }
}

/// Print a section header.
pub fn print_section(title: &str) {
    println!();
    println!("{}", format!("━━━ {} ━━━", title).bold().cyan());
}

/// Print a divider line.
pub fn print_divider() {
    println!("{}", "─".repeat(60).dimmed());
}

/// Format an elapsed simulation time as `+12.345s`.
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("+{:>7.3}s", elapsed.as_secs_f64())
}

/// Plain one-line rendering of a rail view.
///
/// ```text
/// ☰↑ [📖 DOAJ*] [📕 DOAB]
/// ```
///
/// `↑` marks a bouncing toggle, `*` the active item, `~` a hover overlay.
pub fn format_rail(view: &RailView) -> String {
    let mut line = String::from(Icon::Menu.glyph());
    if view.toggle.bouncing {
        line.push('↑');
    }

    for item in &view.items {
        line.push_str(" [");
        line.push_str(item.icon.glyph());
        if let Some(label) = &item.label {
            line.push(' ');
            line.push_str(label);
        }
        if item.active {
            line.push('*');
        }
        line.push(']');
    }

    if view.hovered {
        line.push_str(" ~");
    }
    line
}

fn tier_badge(tier: Tier) -> String {
    let name = format!("{:<10}", tier.to_string());
    match tier {
        Tier::Expanded => name.green().bold().to_string(),
        Tier::IconsOnly => name.yellow().bold().to_string(),
        Tier::Collapsed => name.dimmed().to_string(),
    }
}

/// Print a rail view with its simulation timestamp.
pub fn print_rail(view: &RailView, elapsed: Duration) {
    println!(
        "{} {} {}",
        format_elapsed(elapsed).dimmed(),
        tier_badge(view.tier),
        format_rail(view)
    );
}

/// Print a navigation request issued by the rail.
pub fn print_navigation(route: &RouteId, elapsed: Duration) {
    println!(
        "{} {} navigate {}",
        format_elapsed(elapsed).dimmed(),
        status_icon(Status::Navigate).magenta().bold(),
        route.to_string().cyan()
    );
}

/// Table of navigation items in display order.
pub fn items_table(items: &[NavigationItem]) -> comfy_table::Table {
    use comfy_table::{Attribute, Cell, Table};

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["#", "Icon", "Label", "Route"]);

    for (i, item) in items.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(item.icon.glyph()),
            Cell::new(&item.label).add_attribute(Attribute::Bold),
            Cell::new(item.route_id.as_str()),
        ]);
    }
    table
}
