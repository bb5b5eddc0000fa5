//! Roadmap materialization and the step progress state machine.
//!
//! Only the per-step completion flag is stored. Lock state is derived on
//! every read: a step is locked while its predecessor is incomplete.

use schemars::JsonSchema;
use serde::Serialize;
use ulid::Ulid;

use crate::catalog::CareerTemplate;
use crate::types::Step;

/// Derived step state. Never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum StepState {
    Locked,
    Unlocked,
    Completed,
}

/// Expand a template into fresh steps: new unique ids, nothing completed.
pub fn expand_steps(template: &CareerTemplate) -> Vec<Step> {
    template
        .steps
        .iter()
        .map(|s| Step {
            id: Ulid::new().to_string(),
            title: s.title.clone(),
            description: s.description.clone(),
            is_completed: false,
        })
        .collect()
}

/// Derive the state of every step. Step 0 is never locked; step `i > 0` is
/// locked exactly while step `i - 1` is incomplete, regardless of step `i`'s
/// own stored flag.
pub fn step_states(steps: &[Step]) -> Vec<StepState> {
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            if i > 0 && !steps[i - 1].is_completed {
                StepState::Locked
            } else if step.is_completed {
                StepState::Completed
            } else {
                StepState::Unlocked
            }
        })
        .collect()
}

/// Flip the completion flag of the step matching `step_id`. Every other step
/// is untouched; an id matching nothing is a no-op. There is deliberately no
/// lock check here — gating belongs to the caller, which sees the derived
/// states on every read.
pub fn toggle_flag(steps: &mut [Step], step_id: &str) {
    for step in steps.iter_mut() {
        if step.id == step_id {
            step.is_completed = !step.is_completed;
        }
    }
}

/// Completed-step count over total, for progress display.
pub fn progress(steps: &[Step]) -> (usize, usize) {
    let completed = steps.iter().filter(|s| s.is_completed).count();
    (completed, steps.len())
}
