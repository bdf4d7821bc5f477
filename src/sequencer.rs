use std::convert::Infallible;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;

use crate::ui::Console;

/// One named, timed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    pub duration_ms: u64,
}

impl Step {
    pub fn new(name: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            name: name.into(),
            duration_ms,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// The four steps run when nothing else is configured.
pub fn default_steps() -> Vec<Step> {
    vec![
        Step::new("step1", 10),
        Step::new("step2", 20),
        Step::new("step3", 50),
        Step::new("step4", 100),
    ]
}

/// Runs steps strictly one after another: wait for the step's duration, log
/// its name, move on. There is no cancellation.
pub struct StepSequencer {
    steps: Vec<Step>,
}

impl Default for StepSequencer {
    fn default() -> Self {
        Self::new(default_steps())
    }
}

impl StepSequencer {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// Sum of all step durations.
    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(Step::duration).sum()
    }

    /// Runs every step with no completion callback.
    pub async fn run(&self, console: &Console) {
        let Ok(()) = self.run_then(console, || Ok::<(), Infallible>(())).await;
    }

    /// Runs every step, then invokes `callback`. An error returned by the
    /// callback is passed through unchanged.
    pub async fn run_then<F, E>(&self, console: &Console, callback: F) -> Result<(), E>
    where
        F: FnOnce() -> Result<(), E>,
    {
        tracing::debug!(
            steps = self.steps.len(),
            total_ms = self.total_duration().as_millis() as u64,
            "running step sequence"
        );
        let progress = console.step_progress(self.steps.len() as u64);
        for step in &self.steps {
            progress.waiting_on(&step.name);
            sleep(step.duration()).await;
            tracing::debug!(step = %step.name, duration_ms = step.duration_ms, "step finished");
            progress.step_done(&step.name);
        }
        progress.finish();

        callback()
    }
}
