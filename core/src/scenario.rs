//! Sequential multi-step scenarios.
//!
//! # Design
//! A `Scenario` is an ordered list of named steps sharing one mutable state
//! value. `run` executes them on the caller's thread in insertion order, so
//! step N+1 always observes what step N wrote into the state (typically a
//! server-assigned id). The first failing step aborts the run; later steps
//! never execute. Each run gets its own state and run id, so scenarios
//! cannot observe each other.

use std::time::{Duration, Instant};

use tracing::{info, info_span, warn};
use uuid::Uuid;

use crate::error::ApiError;

type StepFn<'a, S> = Box<dyn FnOnce(&mut S) -> Result<(), ApiError> + 'a>;

struct Step<'a, S> {
    name: String,
    run: StepFn<'a, S>,
}

/// Named steps over a shared state `S`.
pub struct Scenario<'a, S> {
    name: String,
    steps: Vec<Step<'a, S>>,
}

/// Timing of one completed step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub name: String,
    pub duration: Duration,
}

/// Outcome of a scenario whose every step passed.
#[derive(Debug)]
pub struct ScenarioReport<S> {
    pub scenario: String,
    pub run_id: Uuid,
    pub state: S,
    pub steps: Vec<StepRecord>,
    pub elapsed: Duration,
}

/// The step that stopped a scenario, with its cause.
#[derive(Debug, thiserror::Error)]
#[error("scenario `{scenario}` failed at step {index} `{step}`: {source}")]
pub struct ScenarioError {
    pub scenario: String,
    pub run_id: Uuid,
    /// 1-based position of the failing step.
    pub index: usize,
    pub step: String,
    /// Steps that passed before the failure.
    pub completed: Vec<StepRecord>,
    #[source]
    pub source: ApiError,
}

impl<'a, S> Scenario<'a, S> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            steps: Vec::new(),
        }
    }

    pub fn step<F>(mut self, name: &str, run: F) -> Self
    where
        F: FnOnce(&mut S) -> Result<(), ApiError> + 'a,
    {
        self.steps.push(Step {
            name: name.to_string(),
            run: Box::new(run),
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn run(self, mut state: S) -> Result<ScenarioReport<S>, ScenarioError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("scenario", name = %self.name, %run_id);
        let _guard = span.enter();

        let total = self.steps.len();
        let started = Instant::now();
        let mut records = Vec::with_capacity(total);

        for (offset, step) in self.steps.into_iter().enumerate() {
            let index = offset + 1;
            info!(step = %step.name, "step {index}/{total}");
            let step_started = Instant::now();
            if let Err(source) = (step.run)(&mut state) {
                warn!(step = %step.name, error = %source, "step {index}/{total} failed");
                return Err(ScenarioError {
                    scenario: self.name,
                    run_id,
                    index,
                    step: step.name,
                    completed: records,
                    source,
                });
            }
            records.push(StepRecord {
                name: step.name,
                duration: step_started.elapsed(),
            });
        }

        let elapsed = started.elapsed();
        info!(elapsed_ms = elapsed.as_millis() as u64, "scenario passed");
        Ok(ScenarioReport {
            scenario: self.name,
            run_id,
            state,
            steps: records,
            elapsed,
        })
    }
}

/// Read an id an earlier step was supposed to record.
pub fn recorded(id: Option<u64>, what: &str) -> Result<u64, ApiError> {
    id.ok_or_else(|| ApiError::Assertion(format!("{what} was not recorded by an earlier step")))
}
