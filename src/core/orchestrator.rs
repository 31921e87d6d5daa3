use crate::core::engine::{BuildEngine, BuildOutcome};
use crate::core::{ChangeSource, Pipeline, WatchEvent};
use tokio::sync::{mpsc, watch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    /// Waiting for a change.
    Idle,
    Building,
    /// Changes arrived during a build; one follow-up build is due.
    AwaitingChange,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrchestratorStats {
    pub builds: usize,
    pub failed_builds: usize,
    /// Change events folded into a build triggered by an earlier event.
    pub coalesced: usize,
    /// Readiness announcements.
    pub ignored: usize,
}

/// Runs a build on startup and again after every change, one at a time.
///
/// Builds run inline on the task that drains the event channel, so two
/// builds never overlap. Changes that queue up while a build is running are
/// folded into a single follow-up build.
pub struct RebuildOrchestrator<P: Pipeline> {
    engine: BuildEngine<P>,
    state: watch::Sender<OrchestratorState>,
    stats: OrchestratorStats,
}

impl<P: Pipeline> RebuildOrchestrator<P> {
    pub fn new(engine: BuildEngine<P>) -> Self {
        let (state, _) = watch::channel(OrchestratorState::Idle);
        Self {
            engine,
            state,
            stats: OrchestratorStats::default(),
        }
    }

    pub fn state(&self) -> OrchestratorState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<OrchestratorState> {
        self.state.subscribe()
    }

    pub fn stats(&self) -> OrchestratorStats {
        self.stats
    }

    /// Returns once the event channel closes.
    pub async fn run(mut self, mut events: mpsc::Receiver<WatchEvent>) -> OrchestratorStats {
        self.build().await;

        loop {
            self.set_state(OrchestratorState::Idle);
            tracing::info!("Waiting for file changes...");

            let Some(event) = events.recv().await else {
                break;
            };
            if !self.accept(event) {
                continue;
            }
            self.stats.coalesced += self.drain_pending(&mut events);

            loop {
                self.build().await;

                let pending = self.drain_pending(&mut events);
                if pending == 0 {
                    break;
                }
                tracing::info!("{} more changes during the build, rebuilding once", pending);
                self.stats.coalesced += pending - 1;
                self.set_state(OrchestratorState::AwaitingChange);
            }
        }

        tracing::debug!("Change stream closed, stopping");
        self.stats
    }

    pub async fn build(&mut self) -> BuildOutcome {
        self.set_state(OrchestratorState::Building);
        let outcome = self.engine.run_guarded().await;
        self.stats.builds += 1;
        if !outcome.is_rendered() {
            self.stats.failed_builds += 1;
        }
        outcome
    }

    /// Whether an event should trigger a build.
    fn accept(&mut self, event: WatchEvent) -> bool {
        match event {
            WatchEvent::Ready => {
                tracing::debug!("Watcher ready, ignoring initial scan");
                self.stats.ignored += 1;
                false
            }
            WatchEvent::Changed { source, path } => {
                match source {
                    ChangeSource::Data => tracing::info!(" {} changed", path.display()),
                    ChangeSource::Template => {
                        tracing::info!(" Template {} changed", path.display())
                    }
                }
                true
            }
        }
    }

    /// Number of triggering events already queued.
    fn drain_pending(&mut self, events: &mut mpsc::Receiver<WatchEvent>) -> usize {
        let mut pending = 0;
        while let Ok(event) = events.try_recv() {
            if self.accept(event) {
                pending += 1;
            }
        }
        pending
    }

    fn set_state(&self, state: OrchestratorState) {
        self.state.send_replace(state);
    }
}
