//! Maps raw rail inputs onto machine transitions and timer scheduling.

use tokio::sync::mpsc;

use super::cue::{BounceCueController, CueState};
use super::gate::{Navigator, PostActivationPolicy, RouteActivationGate};
use super::machine::{CascadeCommand, Presentation, RailState, VisibilityStateMachine};
use super::scheduler::{
    CascadeStage, Tick, TickReceiver, TickSender, TimerScheduler, TimerTick,
};
use super::RailSettings;
use crate::models::{find_item, NavigationItem, RouteId};

/// A primitive input to the rail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RailInput {
    /// Pointer entered the rail
    PointerEnter,
    /// Pointer left the rail
    PointerLeave,
    /// The toggle control was clicked
    ToggleClick,
    /// An item was clicked
    ItemClick(RouteId),
    /// A timer fired
    Timer(TimerTick),
}

/// Everything a renderer needs from one rail at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RailSnapshot {
    /// Raw state
    pub state: RailState,
    /// Derived presentation
    pub presentation: Presentation,
    /// Bounce cue state
    pub cue: CueState,
}

/// One mounted navigation rail
///
/// Owns the state machine, the cascade scheduler, the bounce cue and the
/// activation gate. Timer callbacks post [`TimerTick`]s to the receiver
/// returned by [`NavigationRail::new`]; feed them back through
/// [`NavigationRail::handle`] as [`RailInput::Timer`].
#[derive(Debug)]
pub struct NavigationRail<N> {
    items: Vec<NavigationItem>,
    machine: VisibilityStateMachine,
    cascade: TimerScheduler<CascadeStage>,
    cue: BounceCueController,
    gate: RouteActivationGate<N>,
    ticks: TickSender,
}

impl<N: Navigator> NavigationRail<N> {
    /// Mount a rail; must be called inside a tokio runtime
    pub fn new(
        items: Vec<NavigationItem>,
        settings: RailSettings,
        navigator: N,
    ) -> (Self, TickReceiver) {
        let (ticks, receiver) = mpsc::unbounded_channel();
        let rail = Self {
            items,
            machine: VisibilityStateMachine::new(),
            cascade: TimerScheduler::new("cascade"),
            cue: BounceCueController::new(settings.cue, ticks.clone()),
            gate: RouteActivationGate::new(navigator, settings.post_activation),
            ticks,
        };
        tracing::debug!(
            "[rail] mounted with {} items ({:?}, {:?})",
            rail.items.len(),
            settings.post_activation,
            settings.cue
        );
        (rail, receiver)
    }

    /// Current raw state
    pub fn state(&self) -> RailState {
        self.machine.state()
    }

    /// Current derived presentation
    pub fn presentation(&self) -> Presentation {
        self.machine.presentation()
    }

    /// Bounce cue controller
    pub fn cue(&self) -> &BounceCueController {
        &self.cue
    }

    /// The live cascade timer, if any
    pub fn pending_stage(&self) -> Option<Tick<CascadeStage>> {
        self.cascade.pending()
    }

    /// Current state, presentation and cue together
    pub fn snapshot(&self) -> RailSnapshot {
        RailSnapshot {
            state: self.machine.state(),
            presentation: self.machine.presentation(),
            cue: self.cue.state(),
        }
    }

    /// Handle one input; returns whether the snapshot changed
    pub fn handle(&mut self, input: RailInput) -> bool {
        let before = self.snapshot();

        match input {
            RailInput::PointerEnter => {
                let command = self.machine.hover_enter();
                self.run(command);
            }
            RailInput::PointerLeave => {
                let command = self.machine.hover_leave();
                self.run(command);
            }
            RailInput::ToggleClick => {
                let command = self.machine.toggle();
                self.run(command);
            }
            RailInput::ItemClick(route) => self.activate(&route),
            RailInput::Timer(TimerTick::Cascade(tick)) => {
                if self.cascade.accept(tick) {
                    let command = self.machine.stage_elapsed(tick.stage);
                    self.run(command);
                }
            }
            RailInput::Timer(TimerTick::Cue(tick)) => {
                let wanted = self.machine.presentation().bounce_cue();
                self.cue.on_tick(tick, wanted);
            }
        }

        self.cue.sync(self.machine.presentation().bounce_cue());
        self.snapshot() != before
    }

    fn activate(&mut self, route: &RouteId) {
        let Some(item) = find_item(&self.items, route) else {
            tracing::warn!("[rail] ignoring click on unknown route {}", route);
            return;
        };

        let command = match self.gate.activate(item) {
            PostActivationPolicy::Collapse => self.machine.collapse(),
            PostActivationPolicy::RestartCascade => self.machine.refresh(),
        };
        self.run(command);
    }

    fn run(&mut self, command: CascadeCommand) {
        match command {
            CascadeCommand::Restart => self.schedule(CascadeStage::Stage1),
            CascadeCommand::Schedule(stage) => self.schedule(stage),
            CascadeCommand::Cancel => self.cascade.cancel_all(),
            CascadeCommand::Keep => {}
        }
    }

    fn schedule(&mut self, stage: CascadeStage) {
        let ticks = self.ticks.clone();
        self.cascade.schedule(stage, stage.delay(), move |tick| {
            // The receiver is gone once the rail is unmounted
            let _ = ticks.send(TimerTick::Cascade(tick));
        });
    }
}
