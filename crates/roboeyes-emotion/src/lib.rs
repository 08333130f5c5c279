//! roboeyes-emotion: emotion layer on top of roboeyes-core.
//!
//! [`EmotionMachine`] resolves emotion names through a hot-reloadable
//! mapping of [`EmotionDescriptor`]s and drives the eyes through moods,
//! sequences, and timed transitions. [`Rig`] bundles the machine with a set
//! of eyes and a sequence registry for hosts that want the whole stack.

pub mod descriptor;
pub mod error;
pub mod library;
pub mod machine;
pub mod rig;
pub mod watcher;

pub use descriptor::{
    default_mapping, parse_mapping, validate_mapping, EmotionDescriptor, EmotionMap,
    EMOTION_CONCERNED, EMOTION_HAPPY, EMOTION_NEUTRAL, EMOTION_REQUEST, EMOTION_URGENT,
    MAX_TRANSITION_MS,
};
pub use error::EmotionError;
pub use machine::{EmotionMachine, CRITICAL_PRIORITY};
pub use rig::Rig;
pub use watcher::{ConfigWatcher, WatchEvent};
