//! Millisecond step scheduler.
//!
//! A [`Sequence`] is a named list of steps, each with a millisecond offset
//! from the sequence's start and an action to run against the eyes. Steps
//! fire once when the elapsed time reaches their offset; late steps (the
//! host stalled, or several offsets fall inside one poll) all fire in the
//! same `update` call, in registration order.

use crate::engine::Eyes;
use crate::error::CoreError;

/// Action run when a step fires. Actions mutate the eyes and may fail; a
/// failed step is logged and consumed without disturbing later steps.
pub type StepAction = Box<dyn FnMut(&mut Eyes) -> Result<(), CoreError> + Send>;

struct Step {
    offset_ms: u64,
    action: StepAction,
    done: bool,
}

/// One named timeline of steps.
pub struct Sequence {
    name: String,
    steps: Vec<Step>,
    start_ms: Option<u64>,
}

impl Sequence {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            start_ms: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register an infallible step. Offsets may repeat or arrive out of
    /// order; firing order within an `update` stays registration order.
    pub fn step(
        &mut self,
        offset_ms: u64,
        mut action: impl FnMut(&mut Eyes) + Send + 'static,
    ) -> &mut Self {
        self.try_step(offset_ms, move |eyes| {
            action(eyes);
            Ok(())
        })
    }

    /// Register a fallible step.
    pub fn try_step(
        &mut self,
        offset_ms: u64,
        action: impl FnMut(&mut Eyes) -> Result<(), CoreError> + Send + 'static,
    ) -> &mut Self {
        self.steps.push(Step {
            offset_ms,
            action: Box::new(action),
            done: false,
        });
        self
    }

    /// Arm the sequence; offsets are measured from `now_ms`. Starting an
    /// already-running sequence restarts its clock without re-arming steps
    /// that have fired.
    pub fn start(&mut self, now_ms: u64) {
        self.start_ms = Some(now_ms);
    }

    /// Re-arm every step so the sequence can run again.
    pub fn reset(&mut self) {
        self.start_ms = None;
        for step in &mut self.steps {
            step.done = false;
        }
    }

    pub fn is_running(&self) -> bool {
        self.start_ms.is_some() && !self.all_fired()
    }

    /// Done when never started, or when every step has fired.
    pub fn is_done(&self) -> bool {
        self.start_ms.is_none() || self.all_fired()
    }

    fn all_fired(&self) -> bool {
        self.steps.iter().all(|s| s.done)
    }

    /// Fire every pending step whose offset has elapsed.
    pub fn update(&mut self, now_ms: u64, eyes: &mut Eyes) {
        let Some(start_ms) = self.start_ms else {
            return;
        };
        let Some(elapsed) = now_ms.checked_sub(start_ms) else {
            return;
        };
        for step in &mut self.steps {
            if !step.done && elapsed >= step.offset_ms {
                if let Err(err) = (step.action)(eyes) {
                    log::warn!(
                        "sequence '{}': step at {}ms failed: {}",
                        self.name,
                        step.offset_ms,
                        err
                    );
                }
                step.done = true;
            }
        }
    }
}

/// Registry of sequences, polled once per frame.
#[derive(Default)]
pub struct Sequences {
    items: Vec<Sequence>,
}

impl Sequences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new empty sequence and return it for step registration.
    pub fn add(&mut self, name: impl Into<String>) -> &mut Sequence {
        self.items.push(Sequence::new(name));
        // Just pushed, cannot be empty.
        let last = self.items.len() - 1;
        &mut self.items[last]
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Sequence> {
        self.items.iter_mut().find(|s| s.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|s| s.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|s| s.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Done only when every registered sequence is done.
    pub fn is_done(&self) -> bool {
        self.items.iter().all(|s| s.is_done())
    }

    pub fn update(&mut self, now_ms: u64, eyes: &mut Eyes) {
        for sequence in &mut self.items {
            sequence.update(now_ms, eyes);
        }
    }
}
