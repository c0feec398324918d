//! Cancellable, generation-guarded delayed callbacks.
//!
//! A [`TimerScheduler`] owns a single "next stage" slot and a generation
//! counter. Scheduling always cancels whatever is in the slot and bumps the
//! generation first, so a callback that was already queued on the runtime
//! when it got cancelled carries a stale generation and is refused by
//! [`TimerScheduler::accept`].
//!
//! Callbacks run on the tokio runtime after the delay and usually just post a
//! [`TimerTick`] back into the rail's input channel; the state they guard is
//! only touched by whoever owns the scheduler.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Idle time in [`Tier::Expanded`](super::Tier::Expanded) before dropping to icons only
pub const STAGE1_DELAY: Duration = Duration::from_millis(10_000);

/// Idle time in [`Tier::IconsOnly`](super::Tier::IconsOnly) before collapsing
pub const STAGE2_DELAY: Duration = Duration::from_millis(5_000);

/// Rest between heartbeat bursts of the bounce cue
pub const CUE_QUIET_PERIOD: Duration = Duration::from_millis(8_000);

/// Length of one `0 -> -4px -> 0` bounce oscillation
pub const CUE_CYCLE: Duration = Duration::from_millis(700);

/// Stages of the idle cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CascadeStage {
    /// Expanded -> icons only
    Stage1,
    /// Icons only -> collapsed, bounce armed
    Stage2,
}

impl CascadeStage {
    /// Delay before this stage elapses
    pub fn delay(&self) -> Duration {
        match self {
            CascadeStage::Stage1 => STAGE1_DELAY,
            CascadeStage::Stage2 => STAGE2_DELAY,
        }
    }
}

/// Phases of a heartbeat bounce cue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CuePhase {
    /// The current burst of oscillations is over
    BurstEnd,
    /// The quiet period is over
    Restart,
}

/// A fired (or pending) timer, tagged with the generation it was issued in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tick<S> {
    /// Which stage this timer drives
    pub stage: S,
    /// Scheduler generation when the timer was issued
    pub generation: u64,
}

/// Any timer owned by a rail instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTick {
    /// Idle cascade timer
    Cascade(Tick<CascadeStage>),
    /// Bounce cue heartbeat timer
    Cue(Tick<CuePhase>),
}

/// Sending half of a rail's timer channel
pub type TickSender = mpsc::UnboundedSender<TimerTick>;

/// Receiving half of a rail's timer channel
pub type TickReceiver = mpsc::UnboundedReceiver<TimerTick>;

#[derive(Debug)]
struct Pending<S> {
    tick: Tick<S>,
    task: JoinHandle<()>,
}

/// Single-slot scheduler with a generation counter
///
/// Must be used from within a tokio runtime; each scheduled timer is a spawned
/// sleep task. Dropping the scheduler aborts the pending task.
#[derive(Debug)]
pub struct TimerScheduler<S> {
    /// Name used in log output (e.g. "cascade", "cue")
    name: &'static str,

    /// The next timer to fire, if any
    next: Option<Pending<S>>,

    /// Bumped on every cancel and before every schedule
    generation: u64,
}

impl<S> TimerScheduler<S>
where
    S: Copy + Eq + std::fmt::Debug + Send + 'static,
{
    /// Create an empty scheduler
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            next: None,
            generation: 0,
        }
    }

    /// The live timer, if one is scheduled
    pub fn pending(&self) -> Option<Tick<S>> {
        self.next.as_ref().map(|p| p.tick)
    }

    /// Schedule `callback` to run after `delay`
    ///
    /// Any timer already in the slot is cancelled and the generation bumped
    /// before the new one is issued. Returns the tick the callback will receive.
    pub fn schedule<F>(&mut self, stage: S, delay: Duration, callback: F) -> Tick<S>
    where
        F: FnOnce(Tick<S>) + Send + 'static,
    {
        self.cancel_all();

        let tick = Tick {
            stage,
            generation: self.generation,
        };
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback(tick);
        });

        tracing::trace!(
            "[{}] scheduled {:?} in {}ms (generation {})",
            self.name,
            stage,
            delay.as_millis(),
            tick.generation
        );

        self.next = Some(Pending { tick, task });
        tick
    }

    /// Invalidate everything issued so far and drop the stored handle
    pub fn cancel_all(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(pending) = self.next.take() {
            pending.task.abort();
            tracing::trace!(
                "[{}] cancelled {:?} (generation {})",
                self.name,
                pending.tick.stage,
                pending.tick.generation
            );
        }
    }

    /// Whether a fired tick belongs to the current generation
    pub fn is_current(&self, tick: &Tick<S>) -> bool {
        tick.generation == self.generation
    }

    /// Consume a fired tick
    ///
    /// Returns `true` and frees the slot when the tick is the live timer.
    /// Stale ticks are ignored and leave the slot untouched.
    pub fn accept(&mut self, tick: Tick<S>) -> bool {
        if !self.is_current(&tick) {
            tracing::trace!(
                "[{}] ignoring stale {:?} (generation {}, current {})",
                self.name,
                tick.stage,
                tick.generation,
                self.generation
            );
            return false;
        }

        match &self.next {
            Some(pending) if pending.tick == tick => {
                self.next = None;
                true
            }
            _ => false,
        }
    }
}

impl<S> Drop for TimerScheduler<S> {
    fn drop(&mut self) {
        if let Some(pending) = self.next.take() {
            pending.task.abort();
        }
    }
}
