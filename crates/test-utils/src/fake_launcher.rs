use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use cmdexec::errors::Result;
use cmdexec::exec::{LaunchPlan, Launcher, RawOutcome};

/// A fake launcher that:
/// - records every plan it was asked to launch
/// - returns queued outcomes in order, then `RawOutcome::exited(0, "", "")`.
#[derive(Clone, Default)]
pub struct FakeLauncher {
    launched: Arc<Mutex<Vec<LaunchPlan>>>,
    outcomes: Arc<Mutex<VecDeque<RawOutcome>>>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the outcome for the next launch.
    pub fn returning(self, outcome: RawOutcome) -> Self {
        self.outcomes.lock().unwrap().push_back(outcome);
        self
    }

    /// Shared view of launched plans, usable after the launcher has been
    /// moved into a dispatcher.
    pub fn launched(&self) -> Arc<Mutex<Vec<LaunchPlan>>> {
        Arc::clone(&self.launched)
    }
}

impl Launcher for FakeLauncher {
    fn launch<'a>(
        &'a self,
        plan: &'a LaunchPlan,
    ) -> Pin<Box<dyn Future<Output = Result<RawOutcome>> + Send + 'a>> {
        let launched = Arc::clone(&self.launched);
        let outcomes = Arc::clone(&self.outcomes);

        Box::pin(async move {
            launched.lock().unwrap().push(plan.clone());
            let outcome = outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| RawOutcome::exited(0, "", ""));
            Ok(outcome)
        })
    }
}
