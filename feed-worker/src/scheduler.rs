//! Drives the poll cycle for the life of the process.
//!
//! All cycles run inside one task, so two cycles can never overlap. When a
//! cycle outlasts the interval (a burst of new entries with the 5 second
//! dispatch pause can easily take minutes), the tick that fell due fires
//! once as soon as the cycle ends and any further missed ticks are dropped.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::feed::FeedSource;
use crate::notify::Notifier;
use crate::poll::PollCycle;

/// Control messages for the scheduler task.
#[derive(Debug)]
pub enum SchedulerMessage {
    Shutdown,
}

/// Runs a [`PollCycle`] immediately and then on a fixed period.
#[derive(Debug)]
pub struct Scheduler<F, N> {
    cycle: PollCycle<F, N>,
    interval: Duration,
}

/// Handle for stopping a spawned scheduler.
#[derive(Debug)]
pub struct SchedulerHandle {
    sender: mpsc::Sender<SchedulerMessage>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stop ticking and wait for the task to exit.
    ///
    /// A cycle already in flight is allowed to finish first.
    pub async fn shutdown(self) {
        let _ = self.sender.send(SchedulerMessage::Shutdown).await;
        if let Err(e) = self.task.await {
            error!(error = %e, "scheduler_task_failed");
        }
    }
}

impl<F, N> Scheduler<F, N>
where
    F: FeedSource + 'static,
    N: Notifier + 'static,
{
    /// `interval` is clamped to at least one millisecond.
    pub fn new(cycle: PollCycle<F, N>, interval: Duration) -> Self {
        Self {
            cycle,
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    /// Start the scheduler on the current runtime.
    pub fn spawn(self) -> SchedulerHandle {
        let (sender, receiver) = mpsc::channel(1);
        let task = tokio::spawn(self.run(receiver));
        SchedulerHandle { sender, task }
    }

    async fn run(self, mut receiver: mpsc::Receiver<SchedulerMessage>) {
        // The first tick completes immediately, so the initial cycle does not
        // wait for a full interval.
        let mut timer = tokio::time::interval(self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            interval_seconds = self.interval.as_secs(),
            "scheduler_started"
        );

        let mut cycle_number: u64 = 0;
        loop {
            // Shutdown wins over a tick that is already due.
            tokio::select! {
                biased;
                msg = receiver.recv() => {
                    match msg {
                        Some(SchedulerMessage::Shutdown) | None => {
                            info!(cycles_run = cycle_number, "scheduler_stopped");
                            break;
                        }
                    }
                }
                _ = timer.tick() => {
                    cycle_number += 1;
                    self.run_cycle(cycle_number).await;
                }
            }
        }
    }

    async fn run_cycle(&self, cycle_number: u64) {
        info!(cycle = cycle_number, "poll_cycle_starting");

        match self.cycle.run().await {
            Ok(summary) => info!(
                cycle = cycle_number,
                entries_found = summary.entries_found,
                new_entries = summary.new_entries,
                sent = summary.report.sent,
                failed = summary.report.failed,
                "poll_cycle_complete"
            ),
            Err(e) => error!(cycle = cycle_number, error = %e, "poll_cycle_failed"),
        }
    }
}
