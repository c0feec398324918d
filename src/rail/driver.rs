//! Runs a rail as a single-task event loop.
//!
//! All rail state lives inside one spawned task. User inputs arrive over an
//! mpsc channel, timer callbacks post into the rail's tick channel, and every
//! change is published on a `watch` channel for renderers.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::dispatcher::{NavigationRail, RailInput, RailSnapshot};
use super::gate::Navigator;
use super::RailSettings;
use crate::models::{NavigationItem, RouteId};

/// Errors from talking to a running rail
#[derive(Debug, thiserror::Error)]
pub enum RailError {
    /// The event loop has stopped
    #[error("rail has been unmounted")]
    Unmounted,

    /// The event loop task panicked or was aborted
    #[error("rail task failed: {0}")]
    Task(String),
}

#[derive(Debug)]
enum Message {
    Input(RailInput),
    Unmount,
}

/// Handle to a rail running in its own task
#[derive(Debug)]
pub struct RailHandle {
    inputs: mpsc::UnboundedSender<Message>,
    snapshots: watch::Receiver<RailSnapshot>,
    task: JoinHandle<()>,
}

/// Mount a rail and run it on the current tokio runtime
pub fn spawn_rail<N>(items: Vec<NavigationItem>, settings: RailSettings, navigator: N) -> RailHandle
where
    N: Navigator + Send + 'static,
{
    let (mut rail, mut ticks) = NavigationRail::new(items, settings, navigator);
    let (inputs, mut messages) = mpsc::unbounded_channel();
    let (publisher, snapshots) = watch::channel(rail.snapshot());

    let task = tokio::spawn(async move {
        loop {
            let changed = tokio::select! {
                message = messages.recv() => match message {
                    Some(Message::Input(input)) => rail.handle(input),
                    Some(Message::Unmount) | None => break,
                },
                Some(tick) = ticks.recv() => rail.handle(RailInput::Timer(tick)),
            };

            if changed {
                publisher.send_replace(rail.snapshot());
            }
        }
        tracing::debug!("[rail] unmounted");
        // Dropping the rail aborts its pending timers
    });

    RailHandle {
        inputs,
        snapshots,
        task,
    }
}

impl RailHandle {
    /// Send a raw input
    pub fn send(&self, input: RailInput) -> Result<(), RailError> {
        self.inputs
            .send(Message::Input(input))
            .map_err(|_| RailError::Unmounted)
    }

    /// Pointer entered the rail
    pub fn pointer_enter(&self) -> Result<(), RailError> {
        self.send(RailInput::PointerEnter)
    }

    /// Pointer left the rail
    pub fn pointer_leave(&self) -> Result<(), RailError> {
        self.send(RailInput::PointerLeave)
    }

    /// Toggle control clicked
    pub fn toggle(&self) -> Result<(), RailError> {
        self.send(RailInput::ToggleClick)
    }

    /// Item clicked
    pub fn select(&self, route: RouteId) -> Result<(), RailError> {
        self.send(RailInput::ItemClick(route))
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> RailSnapshot {
        *self.snapshots.borrow()
    }

    /// A receiver that is notified on every snapshot change
    pub fn subscribe(&self) -> watch::Receiver<RailSnapshot> {
        self.snapshots.clone()
    }

    /// Stop the event loop and wait for it to finish
    pub async fn unmount(self) -> Result<(), RailError> {
        // Already stopped is fine; the join below reports real failures
        let _ = self.inputs.send(Message::Unmount);
        self.task
            .await
            .map_err(|e| RailError::Task(e.to_string()))
    }
}
