//! The adaptive navigation rail.
//!
//! A floating menu that expands on demand, degrades through visibility tiers
//! when idle and re-expands on hover:
//!
//! - [`VisibilityStateMachine`]: tiers, bounce flag, hover overlay and the
//!   derived [`Presentation`]
//! - [`TimerScheduler`]: single-slot, generation-guarded delayed callbacks
//! - [`BounceCueController`]: idle-attention bounce on the collapsed toggle
//! - [`RouteActivationGate`]: hands item selection to an injected [`Navigator`]
//! - [`NavigationRail`]: the dispatcher tying the above together
//! - [`spawn_rail`]: runs a rail as a single-task event loop
//! - [`RailView`]: render model for a snapshot
//!
//! # Example
//!
//! ```rust,no_run
//! use eresources_nav::models::{default_items, RouteId};
//! use eresources_nav::rail::{spawn_rail, RailSettings};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let rail = spawn_rail(default_items(), RailSettings::default(), |route: &RouteId| {
//!     println!("router.push({})", route);
//! });
//!
//! rail.toggle()?;
//! rail.select(RouteId::from("/doaj"))?;
//! rail.unmount().await?;
//! # Ok(())
//! # }
//! ```

mod cue;
mod dispatcher;
mod driver;
mod gate;
mod machine;
mod scheduler;
mod view;

use serde::{Deserialize, Serialize};

pub use cue::{keyframe_offset, BounceCueController, CuePolicy, CueState, BOUNCE_AMPLITUDE_PX};
pub use dispatcher::{NavigationRail, RailInput, RailSnapshot};
pub use driver::{spawn_rail, RailError, RailHandle};
pub use gate::{Navigator, PostActivationPolicy, RouteActivationGate};
pub use machine::{
    CascadeCommand, Presentation, RailFlags, RailState, Tier, VisibilityStateMachine,
};
pub use scheduler::{
    CascadeStage, CuePhase, Tick, TickReceiver, TickSender, TimerScheduler, TimerTick,
    CUE_CYCLE, CUE_QUIET_PERIOD, STAGE1_DELAY, STAGE2_DELAY,
};
pub use view::{ItemView, RailView, ToggleView};

/// Behaviour choices for a rail instance
///
/// Timer delays are fixed; only the two ambiguous behaviours are selectable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RailSettings {
    /// What happens after an item is activated
    #[serde(default)]
    pub post_activation: PostActivationPolicy,

    /// Bounce cue repeat behaviour
    #[serde(default)]
    pub cue: CuePolicy,
}
