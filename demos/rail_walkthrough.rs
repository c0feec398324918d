//! Walkthrough of the navigation rail lifecycle.
//!
//! Expands the rail, lets it degrade to icons and then collapse, hovers it
//! back open and picks an item. Runs on a paused clock so the fifteen idle
//! seconds pass instantly.
//!
//! ```text
//! cargo run --example rail_walkthrough
//! ```

use eresources_nav::models::{default_items, RouteId};
use eresources_nav::rail::{spawn_rail, RailSettings, RailView, STAGE1_DELAY, STAGE2_DELAY};
use eresources_nav::ui;
use std::time::Duration;
use tokio::time::Instant;

async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

#[tokio::main(flavor = "current_thread", start_paused = true)]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let items = default_items();
    let rail = spawn_rail(items.clone(), RailSettings::default(), |route: &RouteId| {
        println!("  router.push({})", route);
    });
    let started = Instant::now();

    let show = |label: &str| {
        let view = RailView::build(&items, &rail.snapshot(), None, Instant::now());
        println!("{:<24} {}", label, ui::format_rail(&view));
    };

    show("mounted");

    rail.toggle()?;
    settle().await;
    show("toggle clicked");

    tokio::time::sleep(STAGE1_DELAY).await;
    settle().await;
    show("10s idle");

    tokio::time::sleep(STAGE2_DELAY).await;
    settle().await;
    show("15s idle, bounce cue");

    tokio::time::sleep(Duration::from_millis(350)).await;
    settle().await;
    show("mid-bounce");

    rail.pointer_enter()?;
    settle().await;
    show("pointer entered");

    rail.select(RouteId::from("/doab"))?;
    settle().await;
    show("DOAB clicked");

    rail.pointer_leave()?;
    settle().await;
    show("pointer left");

    println!(
        "\nfinished after {} of rail time",
        ui::format_elapsed(started.elapsed())
    );
    rail.unmount().await?;
    Ok(())
}
