//! Visibility tiers of the rail and every transition between them.
//!
//! The machine stores the persisted tier, the bounce flag and the hover
//! overlay. Everything a renderer needs is derived in
//! [`VisibilityStateMachine::presentation`]; hover never leaks into the tier.
//!
//! Transitions do not touch timers themselves. Each one returns a
//! [`CascadeCommand`] that the dispatcher applies to its scheduler, which keeps
//! the machine synchronous and trivially testable.

use serde::{Deserialize, Serialize};

use super::scheduler::CascadeStage;

/// Discrete visibility level of the rail
///
/// Ordered from least to most visible.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Only the toggle is visible
    #[default]
    Collapsed,
    /// Toggle plus item icons
    IconsOnly,
    /// Toggle plus icons and labels
    Expanded,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Tier::Collapsed => "collapsed",
            Tier::IconsOnly => "icons-only",
            Tier::Expanded => "expanded",
        };
        f.write_str(name)
    }
}

bitflags::bitflags! {
    /// Derived presentation flags exposed to renderers
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RailFlags: u8 {
        /// Icons and labels are shown
        const SHOW_EXPANDED = 1 << 0;
        /// Item icons are shown
        const SHOW_ICONS = 1 << 1;
        /// The toggle bounces
        const BOUNCE_CUE = 1 << 2;
        /// Value of the toggle's `aria-expanded` attribute
        const ARIA_EXPANDED = 1 << 3;
    }
}

/// Mutable state of one rail instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RailState {
    tier: Tier,
    bounce_active: bool,
    hovered: bool,
}

impl RailState {
    /// Persisted tier
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Whether the idle bounce is armed
    pub fn bounce_active(&self) -> bool {
        self.bounce_active
    }

    /// Whether the pointer is over the rail
    pub fn hovered(&self) -> bool {
        self.hovered
    }
}

/// What a renderer should show, computed from [`RailState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Presentation {
    /// Persisted tier (hover not applied)
    pub tier: Tier,
    /// Effective flags (hover applied)
    pub flags: RailFlags,
}

impl Presentation {
    /// Compute the presentation for a state
    pub fn of(state: &RailState) -> Self {
        let mut flags = RailFlags::empty();

        let show_expanded = state.tier == Tier::Expanded || state.hovered;
        if show_expanded {
            flags |= RailFlags::SHOW_EXPANDED | RailFlags::ARIA_EXPANDED;
        }
        if show_expanded || state.tier == Tier::IconsOnly {
            flags |= RailFlags::SHOW_ICONS;
        }
        if state.tier == Tier::Collapsed && state.bounce_active && !state.hovered {
            flags |= RailFlags::BOUNCE_CUE;
        }

        Self {
            tier: state.tier,
            flags,
        }
    }

    /// Icons and labels are shown
    pub fn show_expanded(&self) -> bool {
        self.flags.contains(RailFlags::SHOW_EXPANDED)
    }

    /// Item icons are shown
    pub fn show_icons(&self) -> bool {
        self.flags.contains(RailFlags::SHOW_ICONS)
    }

    /// The toggle bounces
    pub fn bounce_cue(&self) -> bool {
        self.flags.contains(RailFlags::BOUNCE_CUE)
    }
}

/// What the dispatcher must do with the cascade timer after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeCommand {
    /// Cancel everything and start over from stage 1
    Restart,
    /// Schedule the given stage (the slot is already free)
    Schedule(CascadeStage),
    /// Cancel everything, schedule nothing
    Cancel,
    /// Leave the scheduler alone
    Keep,
}

/// The rail's visibility state machine
#[derive(Debug, Clone, Default)]
pub struct VisibilityStateMachine {
    state: RailState,
}

impl VisibilityStateMachine {
    /// Machine in its mount state: collapsed, not bouncing, not hovered
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> RailState {
        self.state
    }

    /// Derived presentation
    pub fn presentation(&self) -> Presentation {
        Presentation::of(&self.state)
    }

    /// The toggle was clicked
    pub fn toggle(&mut self) -> CascadeCommand {
        self.state.tier = Tier::Expanded;
        self.state.bounce_active = false;
        self.transitioned("toggle");
        CascadeCommand::Restart
    }

    /// A live cascade timer fired
    ///
    /// Stage 1 always settles on icons only and chains stage 2, whatever tier
    /// the cascade started from; stage 2 collapses and arms the bounce.
    pub fn stage_elapsed(&mut self, stage: CascadeStage) -> CascadeCommand {
        match stage {
            CascadeStage::Stage1 => {
                self.state.tier = Tier::IconsOnly;
                self.transitioned("stage1");
                CascadeCommand::Schedule(CascadeStage::Stage2)
            }
            CascadeStage::Stage2 => {
                self.state.tier = Tier::Collapsed;
                self.state.bounce_active = true;
                self.transitioned("stage2");
                CascadeCommand::Keep
            }
        }
    }

    /// The pointer entered the rail
    ///
    /// Restarts the idle cascade even when already hovered.
    pub fn hover_enter(&mut self) -> CascadeCommand {
        self.state.hovered = true;
        self.state.bounce_active = false;
        self.transitioned("hover-enter");
        CascadeCommand::Restart
    }

    /// The pointer left the rail
    pub fn hover_leave(&mut self) -> CascadeCommand {
        self.state.hovered = false;
        self.transitioned("hover-leave");
        CascadeCommand::Keep
    }

    /// Post-activation reset: collapse fully and stop every timer
    pub fn collapse(&mut self) -> CascadeCommand {
        self.state.tier = Tier::Collapsed;
        self.state.bounce_active = false;
        self.transitioned("collapse");
        CascadeCommand::Cancel
    }

    /// Post-activation refresh: keep the tier, restart the idle clock
    pub fn refresh(&mut self) -> CascadeCommand {
        self.state.bounce_active = false;
        self.transitioned("refresh");
        CascadeCommand::Restart
    }

    fn transitioned(&self, event: &str) {
        debug_assert!(
            !self.state.bounce_active || self.state.tier == Tier::Collapsed,
            "bounce armed outside the collapsed tier"
        );
        tracing::debug!(
            "[rail] {}: tier={} bounce={} hovered={}",
            event,
            self.state.tier,
            self.state.bounce_active,
            self.state.hovered
        );
    }
}
