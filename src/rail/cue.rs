//! Idle-attention bounce on the collapsed toggle.
//!
//! The controller follows the rail's `BOUNCE_CUE` flag: it starts when the
//! flag turns on and stops the moment it turns off. What happens while the
//! flag stays on depends on the [`CuePolicy`].

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use super::scheduler::{
    CuePhase, Tick, TickSender, TimerScheduler, TimerTick, CUE_CYCLE, CUE_QUIET_PERIOD,
};

/// Peak upward displacement of the toggle during a bounce, in pixels
pub const BOUNCE_AMPLITUDE_PX: f32 = 4.0;

fn default_repeats() -> u32 {
    3
}

/// How long the bounce keeps going while the rail stays idle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CuePolicy {
    /// Bounce until interrupted
    #[default]
    Indefinite,
    /// Bounce `repeats` cycles, rest for the quiet period, then go again
    Heartbeat {
        /// Oscillations per burst
        #[serde(default = "default_repeats")]
        repeats: u32,
    },
}

/// What the cue is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueState {
    /// Not running
    Idle,
    /// Oscillating since the given instant
    Bouncing {
        /// Start of the current burst
        since: Instant,
    },
    /// Between heartbeat bursts
    Resting,
}

impl CueState {
    /// Vertical offset of the toggle at `now`, in pixels (negative is up)
    ///
    /// Follows the `0 -> -4 -> 0` keyframes over one [`CUE_CYCLE`].
    pub fn offset_px(&self, now: Instant) -> f32 {
        match *self {
            CueState::Bouncing { since } => keyframe_offset(now.saturating_duration_since(since)),
            CueState::Idle | CueState::Resting => 0.0,
        }
    }
}

/// Drives the bounce cue for one rail
#[derive(Debug)]
pub struct BounceCueController {
    policy: CuePolicy,
    state: CueState,
    timers: TimerScheduler<CuePhase>,
    ticks: TickSender,
}

impl BounceCueController {
    /// Create an idle controller that posts its timer ticks to `ticks`
    pub fn new(policy: CuePolicy, ticks: TickSender) -> Self {
        Self {
            policy,
            state: CueState::Idle,
            timers: TimerScheduler::new("cue"),
            ticks,
        }
    }

    /// Configured policy
    pub fn policy(&self) -> CuePolicy {
        self.policy
    }

    /// Current state
    pub fn state(&self) -> CueState {
        self.state
    }

    /// Whether a cue instance exists (bouncing or resting)
    pub fn is_running(&self) -> bool {
        self.state != CueState::Idle
    }

    /// The live heartbeat timer, if any
    pub fn pending(&self) -> Option<Tick<CuePhase>> {
        self.timers.pending()
    }

    /// Follow the rail's `BOUNCE_CUE` flag
    ///
    /// Starting is a no-op while a cue instance already runs.
    pub fn sync(&mut self, wanted: bool) {
        match (wanted, self.is_running()) {
            (true, false) => self.start(),
            (false, true) => self.stop(),
            _ => {}
        }
    }

    /// Stop immediately and drop any heartbeat timer
    pub fn stop(&mut self) {
        self.timers.cancel_all();
        if self.state != CueState::Idle {
            tracing::debug!("[cue] stopped");
        }
        self.state = CueState::Idle;
    }

    /// Handle a fired heartbeat timer; `wanted` is the current `BOUNCE_CUE` flag
    ///
    /// Returns whether the tick was live.
    pub fn on_tick(&mut self, tick: Tick<CuePhase>, wanted: bool) -> bool {
        if !self.timers.accept(tick) {
            return false;
        }

        match tick.stage {
            CuePhase::BurstEnd => {
                self.state = CueState::Resting;
                self.schedule(CuePhase::Restart, CUE_QUIET_PERIOD);
                tracing::debug!("[cue] resting");
            }
            CuePhase::Restart => {
                if wanted {
                    self.start();
                } else {
                    self.state = CueState::Idle;
                }
            }
        }
        true
    }

    fn start(&mut self) {
        self.state = CueState::Bouncing {
            since: Instant::now(),
        };
        if let CuePolicy::Heartbeat { repeats } = self.policy {
            self.schedule(CuePhase::BurstEnd, CUE_CYCLE * repeats.max(1));
        }
        tracing::debug!("[cue] bouncing ({:?})", self.policy);
    }

    fn schedule(&mut self, phase: CuePhase, delay: std::time::Duration) {
        let ticks = self.ticks.clone();
        self.timers.schedule(phase, delay, move |tick| {
            // The receiver is gone once the rail is unmounted
            let _ = ticks.send(TimerTick::Cue(tick));
        });
    }
}

/// Offset after `elapsed` time of bouncing
pub fn keyframe_offset(elapsed: std::time::Duration) -> f32 {
    let cycle = CUE_CYCLE.as_secs_f32();
    let phase = (elapsed.as_secs_f32() % cycle) / cycle;
    let rise = if phase < 0.5 { phase } else { 1.0 - phase };
    -BOUNCE_AMPLITUDE_PX * rise * 2.0
}
