//! Stage timer background task
//!
//! The timer runs as a single task that owns the [`TimerState`]. Callers talk
//! to it through a [`StageTimerHandle`], so every read and write is serialized
//! through one command queue. At most one tick is ever pending: it is stored
//! as an `Option<Sleep>` that is replaced on resume and dropped on pause,
//! reset and teardown.

use std::{pin::Pin, time::Duration};
use tokio::{
    sync::{broadcast, mpsc, oneshot, watch},
    time::{sleep, Sleep},
};
use tracing::{debug, info};

use crate::state::TimerState;

/// Time between two countdown steps
pub const TICK_INTERVAL: Duration = Duration::from_millis(1000);

const COMMAND_BUFFER: usize = 32;
const CHANGE_BUFFER: usize = 100;

/// User intents forwarded to the timer task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    Pause,
    Resume,
    Toggle,
    Reset,
    Snapshot,
    Shutdown,
}

impl TimerAction {
    pub fn as_str(self) -> &'static str {
        match self {
            TimerAction::Pause => "pause",
            TimerAction::Resume => "resume",
            TimerAction::Toggle => "toggle",
            TimerAction::Reset => "reset",
            TimerAction::Snapshot => "snapshot",
            TimerAction::Shutdown => "shutdown",
        }
    }
}

/// A queued action together with the channel that receives the resulting state
#[derive(Debug)]
pub struct TimerCommand {
    pub action: TimerAction,
    pub reply: oneshot::Sender<TimerState>,
}

/// Owner of the countdown state and its single scheduled tick
pub struct StageTimer {
    state: TimerState,
    pending: Option<Pin<Box<Sleep>>>,
    snapshots: watch::Sender<TimerState>,
    changes: broadcast::Sender<TimerState>,
}

impl StageTimer {
    /// Spawn the timer task on the current runtime and return a handle to it.
    ///
    /// `remaining` is clamped into `1..=stage.duration_seconds()`.
    pub fn spawn(initial: TimerState) -> StageTimerHandle {
        let initial = initial.clamped();
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshot_rx) = watch::channel(initial);
        let (change_tx, change_rx) = broadcast::channel(CHANGE_BUFFER);

        let mut timer = StageTimer {
            state: initial,
            pending: None,
            snapshots: snapshot_tx,
            changes: change_tx,
        };
        if initial.is_running() {
            timer.schedule();
        }

        tokio::spawn(timer.run(command_rx));

        StageTimerHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            changes: change_rx,
        }
    }

    async fn run(mut self, mut commands: mpsc::Receiver<TimerCommand>) {
        info!(
            "Starting stage timer task ({} {}s, paused={})",
            self.state.stage, self.state.remaining, self.state.paused
        );

        loop {
            tokio::select! {
                // A tick that is already due wins over a command arriving at the same time
                biased;

                _ = next_tick(&mut self.pending) => self.tick(),

                command = commands.recv() => match command {
                    Some(command) => {
                        if !self.handle(command) {
                            break;
                        }
                    }
                    None => {
                        debug!("All timer handles dropped");
                        break;
                    }
                },
            }
        }

        self.cancel();
        info!("Stage timer task stopped");
    }

    /// Apply one command. Returns false when the task should stop.
    fn handle(&mut self, command: TimerCommand) -> bool {
        debug!("Timer task received {}", command.action.as_str());

        let keep_running = match command.action {
            TimerAction::Pause => {
                self.pause();
                true
            }
            TimerAction::Resume => {
                self.resume();
                true
            }
            TimerAction::Toggle => {
                self.toggle();
                true
            }
            TimerAction::Reset => {
                self.reset();
                true
            }
            TimerAction::Snapshot => true,
            TimerAction::Shutdown => {
                info!("Stage timer shutting down");
                self.cancel();
                false
            }
        };

        self.publish();

        // The caller may have stopped waiting for the reply
        let _ = command.reply.send(self.state);
        keep_running
    }

    /// Advance the countdown and schedule the following tick one interval
    /// after the deadline that just fired.
    fn tick(&mut self) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        debug_assert!(self.state.is_running());

        let next_deadline = pending.deadline() + TICK_INTERVAL;
        pending.as_mut().reset(next_deadline);

        if self.state.tick() {
            debug!(
                "Stage advanced to {} ({}s)",
                self.state.stage, self.state.remaining
            );
        } else {
            debug!("{} {}s remaining", self.state.stage, self.state.remaining);
        }

        self.publish();
    }

    fn pause(&mut self) {
        if self.state.pause() {
            info!(
                "Timer paused at {} with {}s remaining",
                self.state.stage, self.state.remaining
            );
        }
        self.cancel();
    }

    /// Start counting down. A timer that is already running keeps its
    /// pending tick untouched.
    fn resume(&mut self) {
        if self.state.resume() {
            info!(
                "Timer resumed at {} with {}s remaining",
                self.state.stage, self.state.remaining
            );
            self.schedule();
        }
    }

    fn toggle(&mut self) {
        if self.state.is_running() {
            self.pause();
        } else {
            self.resume();
        }
    }

    fn reset(&mut self) {
        self.state.reset();
        self.cancel();
        info!("Timer reset to {}", self.state.stage);
    }

    fn schedule(&mut self) {
        self.pending = Some(Box::pin(sleep(TICK_INTERVAL)));
    }

    fn cancel(&mut self) {
        if self.pending.take().is_some() {
            debug!("Cancelled pending tick");
        }
    }

    /// Store the latest state and queue it for change subscribers
    fn publish(&self) {
        let state = self.state;
        let modified = self.snapshots.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });

        if modified {
            // Fails only once every receiver is gone
            let _ = self.changes.send(state);
        }
    }
}

/// Resolves when the pending tick is due; never resolves while none is scheduled
async fn next_tick(pending: &mut Option<Pin<Box<Sleep>>>) {
    match pending {
        Some(due) => due.as_mut().await,
        None => std::future::pending::<()>().await,
    }
}

/// Cloneable access to a running [`StageTimer`] task
#[derive(Debug)]
pub struct StageTimerHandle {
    commands: mpsc::Sender<TimerCommand>,
    snapshots: watch::Receiver<TimerState>,
    // Never read; only resubscribed, so change streams close with the task
    changes: broadcast::Receiver<TimerState>,
}

impl Clone for StageTimerHandle {
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
            snapshots: self.snapshots.clone(),
            changes: self.changes.resubscribe(),
        }
    }
}

impl StageTimerHandle {
    /// Send an action to the timer task and wait for the resulting state
    pub async fn send(&self, action: TimerAction) -> Result<TimerState, String> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.commands
            .send(TimerCommand { action, reply: reply_tx })
            .await
            .map_err(|_| format!("Stage timer task has stopped, cannot {}", action.as_str()))?;

        reply_rx
            .await
            .map_err(|_| format!("Stage timer task stopped before answering {}", action.as_str()))
    }

    pub async fn pause(&self) -> Result<TimerState, String> {
        self.send(TimerAction::Pause).await
    }

    pub async fn resume(&self) -> Result<TimerState, String> {
        self.send(TimerAction::Resume).await
    }

    pub async fn toggle(&self) -> Result<TimerState, String> {
        self.send(TimerAction::Toggle).await
    }

    pub async fn reset(&self) -> Result<TimerState, String> {
        self.send(TimerAction::Reset).await
    }

    /// Ask the task for its state, applying any tick that is already due
    pub async fn snapshot(&self) -> Result<TimerState, String> {
        self.send(TimerAction::Snapshot).await
    }

    /// Cancel any pending tick and stop the task
    pub async fn shutdown(&self) -> Result<TimerState, String> {
        self.send(TimerAction::Shutdown).await
    }

    /// Receiver that holds the latest state
    pub fn subscribe(&self) -> watch::Receiver<TimerState> {
        self.snapshots.clone()
    }

    /// Receiver that gets every state change, in order, published after this call
    pub fn changes(&self) -> broadcast::Receiver<TimerState> {
        self.changes.resubscribe()
    }

    /// Last published state
    pub fn current(&self) -> TimerState {
        *self.snapshots.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Stage;
    use tokio::time::advance;

    fn at(stage: Stage, remaining: u32, paused: bool) -> TimerState {
        TimerState { stage, remaining, paused }
    }

    async fn advance_millis(millis: u64) {
        advance(Duration::from_millis(millis)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn runs_through_the_whole_cycle() {
        let timer = StageTimer::spawn(TimerState::new());
        assert_eq!(timer.resume().await.unwrap(), at(Stage::Prepare, 5, false));

        advance_millis(5_000).await;
        assert_eq!(timer.snapshot().await.unwrap(), at(Stage::Inhale, 4, false));
        advance_millis(4_000).await;
        assert_eq!(timer.snapshot().await.unwrap(), at(Stage::Hold, 7, false));
        advance_millis(7_000).await;
        assert_eq!(timer.snapshot().await.unwrap(), at(Stage::Exhale, 8, false));
        advance_millis(8_000).await;
        assert_eq!(timer.snapshot().await.unwrap(), at(Stage::Prepare, 5, false));
    }

    #[tokio::test(start_paused = true)]
    async fn does_not_tick_while_paused() {
        let timer = StageTimer::spawn(TimerState::new());
        advance_millis(30_000).await;
        assert_eq!(timer.snapshot().await.unwrap(), TimerState::new());
    }

    #[tokio::test(start_paused = true)]
    async fn pause_freezes_mid_stage() {
        let timer = StageTimer::spawn(at(Stage::Hold, 3, false));

        assert_eq!(timer.pause().await.unwrap(), at(Stage::Hold, 3, true));
        advance_millis(10_000).await;
        assert_eq!(timer.snapshot().await.unwrap(), at(Stage::Hold, 3, true));

        assert_eq!(timer.resume().await.unwrap(), at(Stage::Hold, 3, false));
        advance_millis(999).await;
        assert_eq!(timer.snapshot().await.unwrap(), at(Stage::Hold, 3, false));
        advance_millis(1).await;
        assert_eq!(timer.snapshot().await.unwrap(), at(Stage::Hold, 2, false));
    }

    #[tokio::test(start_paused = true)]
    async fn pause_cancels_pending_tick() {
        let timer = StageTimer::spawn(TimerState::new());
        timer.resume().await.unwrap();
        advance_millis(900).await;
        timer.pause().await.unwrap();
        advance_millis(5_000).await;
        assert_eq!(timer.snapshot().await.unwrap(), at(Stage::Prepare, 5, true));
    }

    #[tokio::test(start_paused = true)]
    async fn resume_while_running_keeps_deadline() {
        let timer = StageTimer::spawn(TimerState::new());
        timer.resume().await.unwrap();
        advance_millis(600).await;
        assert_eq!(timer.resume().await.unwrap(), at(Stage::Prepare, 5, false));
        advance_millis(400).await;
        assert_eq!(timer.snapshot().await.unwrap(), at(Stage::Prepare, 4, false));
    }

    #[tokio::test(start_paused = true)]
    async fn reset_cancels_half_elapsed_tick() {
        let timer = StageTimer::spawn(TimerState::new());
        timer.resume().await.unwrap();
        advance_millis(2_500).await;
        assert_eq!(timer.reset().await.unwrap(), TimerState::new());

        timer.resume().await.unwrap();
        advance_millis(600).await;
        assert_eq!(timer.snapshot().await.unwrap(), at(Stage::Prepare, 5, false));
        advance_millis(400).await;
        assert_eq!(timer.snapshot().await.unwrap(), at(Stage::Prepare, 4, false));
    }

    #[tokio::test(start_paused = true)]
    async fn reset_from_running_stage() {
        let timer = StageTimer::spawn(at(Stage::Exhale, 6, false));
        advance_millis(3_000).await;
        assert_eq!(timer.reset().await.unwrap(), at(Stage::Prepare, 5, true));
        advance_millis(3_000).await;
        assert_eq!(timer.snapshot().await.unwrap(), at(Stage::Prepare, 5, true));
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_flips_paused() {
        let timer = StageTimer::spawn(TimerState::new());
        assert_eq!(timer.toggle().await.unwrap(), at(Stage::Prepare, 5, false));
        advance_millis(2_000).await;
        assert_eq!(timer.toggle().await.unwrap(), at(Stage::Prepare, 3, true));
    }

    #[tokio::test(start_paused = true)]
    async fn publishes_only_real_changes() {
        let timer = StageTimer::spawn(TimerState::new());
        let mut rx = timer.subscribe();
        rx.borrow_and_update();

        timer.pause().await.unwrap();
        timer.reset().await.unwrap();
        assert!(!rx.has_changed().unwrap());

        timer.resume().await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), at(Stage::Prepare, 5, false));

        advance_millis(1_000).await;
        timer.snapshot().await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(timer.current(), at(Stage::Prepare, 4, false));
    }

    #[tokio::test(start_paused = true)]
    async fn back_to_back_commands_each_reach_change_subscribers() {
        let timer = StageTimer::spawn(TimerState::new());
        let mut changes = timer.changes();

        timer.resume().await.unwrap();
        timer.pause().await.unwrap();
        timer.pause().await.unwrap();

        assert_eq!(changes.recv().await.unwrap(), at(Stage::Prepare, 5, false));
        assert_eq!(changes.recv().await.unwrap(), at(Stage::Prepare, 5, true));
        assert!(matches!(
            changes.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn change_stream_closes_with_the_task() {
        let timer = StageTimer::spawn(TimerState::new());
        let mut changes = timer.changes();
        timer.shutdown().await.unwrap();
        assert!(matches!(
            changes.recv().await,
            Err(broadcast::error::RecvError::Closed)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn spawn_clamps_remaining_into_stage_range() {
        let timer = StageTimer::spawn(at(Stage::Hold, 0, false));
        assert_eq!(timer.current(), at(Stage::Hold, 1, false));
        advance_millis(1_000).await;
        assert_eq!(timer.snapshot().await.unwrap(), at(Stage::Exhale, 8, false));

        let timer = StageTimer::spawn(at(Stage::Inhale, 20, true));
        assert_eq!(timer.snapshot().await.unwrap(), at(Stage::Inhale, 4, true));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_the_task() {
        let timer = StageTimer::spawn(TimerState::running());
        assert_eq!(timer.shutdown().await.unwrap(), at(Stage::Prepare, 5, false));
        assert!(timer.resume().await.is_err());
        assert!(timer.snapshot().await.is_err());
    }
}
