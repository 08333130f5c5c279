//! Emotion descriptors and their JSON persistence.
//!
//! A descriptor names the sequence an emotion plays plus the mood, timing and
//! priority metadata the state machine needs. Mapping files come in two
//! shapes: a bare `{ "<emotion>": { ... } }` object, or a nested document
//! with an `emotion_mappings` object and an optional `fallback_emotion`
//! (alias `default_emotion`) key.

use std::fs;
use std::path::Path;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use roboeyes_core::Mood;

use crate::error::EmotionError;

pub const EMOTION_NEUTRAL: &str = "neutral";
pub const EMOTION_HAPPY: &str = "happy";
pub const EMOTION_URGENT: &str = "urgent";
pub const EMOTION_CONCERNED: &str = "concerned";
pub const EMOTION_REQUEST: &str = "request";

/// Transition times above this are rejected as configuration mistakes.
pub const MAX_TRANSITION_MS: u32 = 10_000;

pub type EmotionMap = HashMap<String, EmotionDescriptor>;

/// How one emotion is expressed: which sequence to play, which mood to set,
/// and how the state machine should treat it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmotionDescriptor {
    pub sequence_name: String,

    /// Mood applied when the emotion takes effect (integer code on disk).
    #[serde(default)]
    pub mood: Mood,

    /// How long the emotion holds before falling back; `None` is indefinite.
    #[serde(default)]
    pub duration_ms: Option<u32>,

    /// Cross-fade time from the previous emotion. Zero switches instantly.
    #[serde(default = "default_transition_ms")]
    pub transition_duration_ms: u32,

    #[serde(rename = "loop", default = "default_loop")]
    pub looped: bool,

    /// 1..=10; priorities of 4 and above resist interruption.
    #[serde(default = "default_priority")]
    pub priority: u8,
}

fn default_transition_ms() -> u32 {
    1000
}

fn default_loop() -> bool {
    true
}

fn default_priority() -> u8 {
    1
}

impl EmotionDescriptor {
    pub fn new(sequence_name: impl Into<String>) -> Self {
        Self {
            sequence_name: sequence_name.into(),
            mood: Mood::Default,
            duration_ms: None,
            transition_duration_ms: default_transition_ms(),
            looped: default_loop(),
            priority: default_priority(),
        }
    }

    /// All problems with this descriptor; empty means valid.
    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.sequence_name.trim().is_empty() {
            errors.push("sequence_name cannot be empty".to_string());
        }
        if let Some(duration) = self.duration_ms {
            if duration == 0 {
                errors.push("duration_ms must be positive when specified".to_string());
            }
        }
        if self.transition_duration_ms > MAX_TRANSITION_MS {
            errors.push(format!(
                "transition_duration_ms should not exceed {}ms",
                MAX_TRANSITION_MS
            ));
        }
        if self.priority < 1 || self.priority > 10 {
            errors.push("priority must be between 1 and 10".to_string());
        }
        errors
    }

    pub fn validate(&self) -> Result<(), EmotionError> {
        let errors = self.validation_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(EmotionError::Validation(errors.join("; ")))
        }
    }
}

/// The built-in five-emotion mapping and its fallback emotion.
pub fn default_mapping() -> (EmotionMap, String) {
    let mut map = EmotionMap::new();
    map.insert(
        EMOTION_NEUTRAL.to_string(),
        EmotionDescriptor {
            sequence_name: "idle_gentle".to_string(),
            mood: Mood::Default,
            duration_ms: None,
            transition_duration_ms: 1000,
            looped: true,
            priority: 1,
        },
    );
    map.insert(
        EMOTION_HAPPY.to_string(),
        EmotionDescriptor {
            sequence_name: "gentle_joy".to_string(),
            mood: Mood::Happy,
            duration_ms: Some(4000),
            transition_duration_ms: 1500,
            looped: false,
            priority: 3,
        },
    );
    map.insert(
        EMOTION_URGENT.to_string(),
        EmotionDescriptor {
            sequence_name: "alert_focused".to_string(),
            mood: Mood::Default,
            duration_ms: None,
            transition_duration_ms: 500,
            looped: true,
            priority: 5,
        },
    );
    map.insert(
        EMOTION_CONCERNED.to_string(),
        EmotionDescriptor {
            sequence_name: "empathetic_support".to_string(),
            mood: Mood::Default,
            duration_ms: Some(5000),
            transition_duration_ms: 1200,
            looped: false,
            priority: 4,
        },
    );
    map.insert(
        EMOTION_REQUEST.to_string(),
        EmotionDescriptor {
            sequence_name: "attentive_listening".to_string(),
            mood: Mood::Default,
            duration_ms: Some(3000),
            transition_duration_ms: 800,
            looped: false,
            priority: 3,
        },
    );
    (map, EMOTION_NEUTRAL.to_string())
}

/// Validate every descriptor in a mapping; also rejects empty mappings.
pub fn validate_mapping(map: &EmotionMap) -> Vec<String> {
    let mut errors = Vec::new();
    if map.is_empty() {
        errors.push("emotion mapping cannot be empty".to_string());
    }
    for (name, descriptor) in map {
        for error in descriptor.validation_errors() {
            errors.push(format!("{}: {}", name, error));
        }
    }
    errors
}

/// Parse a mapping document. Returns the mapping and the file's fallback
/// emotion, if it declares one.
pub fn parse_mapping(text: &str) -> Result<(EmotionMap, Option<String>), EmotionError> {
    let document: Value = serde_json::from_str(text)?;
    let Value::Object(mut root) = document else {
        return Err(EmotionError::Validation(
            "mapping file must contain a JSON object".to_string(),
        ));
    };

    let fallback = root
        .get("fallback_emotion")
        .or_else(|| root.get("default_emotion"))
        .and_then(Value::as_str)
        .map(|s| s.trim().to_ascii_lowercase());

    let mappings_value = match root.remove("emotion_mappings") {
        Some(value) => value,
        None => {
            // Bare-map form; strip known non-mapping keys.
            root.remove("fallback_emotion");
            root.remove("default_emotion");
            root.remove("transition_settings");
            root.remove("metadata");
            Value::Object(root)
        }
    };

    let raw: HashMap<String, EmotionDescriptor> = serde_json::from_value(mappings_value)?;
    let map: EmotionMap = raw
        .into_iter()
        .map(|(name, descriptor)| (name.trim().to_ascii_lowercase(), descriptor))
        .collect();
    Ok((map, fallback))
}

/// Load and parse a mapping file. Validation is the caller's business, so a
/// reload can report all problems before deciding to keep its old mapping.
pub fn load_mapping(path: &Path) -> Result<(EmotionMap, Option<String>), EmotionError> {
    let text = fs::read_to_string(path)?;
    parse_mapping(&text)
}

/// Save a mapping in the nested document form. Refuses to persist an invalid
/// mapping.
pub fn save_mapping(
    map: &EmotionMap,
    fallback: &str,
    path: &Path,
) -> Result<(), EmotionError> {
    let errors = validate_mapping(map);
    if !errors.is_empty() {
        return Err(EmotionError::Validation(errors.join("; ")));
    }
    let document = serde_json::json!({
        "emotion_mappings": map,
        "fallback_emotion": fallback,
    });
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(&document)?)?;
    log::info!("saved {} emotion mappings to {}", map.len(), path.display());
    Ok(())
}
