//! triage-core: dependency-aware priority scoring for task batches.
//!
//! The engine is a pure function of (tasks, weights, today). It never mutates
//! caller data and holds no state between calls.

pub mod cycles;
pub mod matrix;
pub mod scoring;
pub mod task;
pub mod time;
pub mod weights;

pub use cycles::detect_cycles;
pub use matrix::{Quadrant, ScoreBand};
pub use scoring::{CIRCULAR_EXPLANATION, ScoreError, Urgency, score_tasks, score_tasks_on};
pub use task::{ScoredTask, Task, TaskId};
pub use weights::Weights;
