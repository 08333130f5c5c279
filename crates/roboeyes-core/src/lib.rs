//! roboeyes-core: renderer-agnostic animated robot eyes.
//!
//! Three pieces compose the core:
//! - [`sequences`]: a millisecond step scheduler for choreographed timelines.
//! - [`engine`]: the per-frame integer tweening engine behind [`Eyes`].
//! - [`render`]: the small drawing contract hosts implement.
//!
//! Everything is driven by an explicit `now_ms` clock (see [`timing`]), so
//! the whole core runs deterministically under test.

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod render;
pub mod sequences;
pub mod timing;

pub use config::Config;
pub use data::{EyeGeometry, EyeSelect, EyelidStyle, Flicker, Mood, PeriodicTimer, Position};
pub use engine::Eyes;
pub use error::CoreError;
pub use render::{Color, DrawCommand, NullRenderer, RecordingRenderer, Renderer};
pub use sequences::{Sequence, Sequences, StepAction};
pub use timing::{ticks_add, ticks_diff, ticks_ms, FrameLimiter};
