//! Emotion transition state machine.
//!
//! The machine maps normalized emotion names to [`EmotionDescriptor`]s and
//! drives the eyes through them: priority-gated interruption, timed
//! cross-fade transitions (mood switches at the halfway point), duration
//! expiry back to the fallback emotion, and hot reload of the mapping file.
//!
//! The mapping lives behind an `Arc` and is swapped atomically; every edit
//! and reload builds the replacement first, so a failed reload leaves the
//! previous mapping untouched.

use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use roboeyes_core::{EyeSelect, Eyes, Mood, Sequences};

use crate::descriptor::{
    self, default_mapping, validate_mapping, EmotionDescriptor, EmotionMap, EMOTION_NEUTRAL,
};
use crate::error::EmotionError;
use crate::library;
use crate::watcher::WatchEvent;

/// Priorities at and above this resist interruption by equal or lower ones.
pub const CRITICAL_PRIORITY: u8 = 4;

#[derive(Clone, Debug)]
struct Transition {
    target: String,
    started_ms: u64,
    duration_ms: u32,
    mood_applied: bool,
}

pub struct EmotionMachine {
    mapping: Arc<EmotionMap>,
    fallback: String,
    current: Option<String>,
    animation_start_ms: Option<u64>,
    transition: Option<Transition>,
    config_path: Option<PathBuf>,
    watch_rx: Option<Receiver<WatchEvent>>,
}

impl Default for EmotionMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl EmotionMachine {
    /// Machine with the built-in five-emotion mapping.
    pub fn new() -> Self {
        let (mapping, fallback) = default_mapping();
        Self {
            mapping: Arc::new(mapping),
            fallback,
            current: None,
            animation_start_ms: None,
            transition: None,
            config_path: None,
            watch_rx: None,
        }
    }

    /// Machine with a caller-provided mapping. The mapping must validate and
    /// contain the fallback emotion.
    pub fn with_mapping(mapping: EmotionMap, fallback: &str) -> Result<Self, EmotionError> {
        let errors = validate_mapping(&mapping);
        if !errors.is_empty() {
            return Err(EmotionError::Validation(errors.join("; ")));
        }
        let fallback = fallback.trim().to_ascii_lowercase();
        if !mapping.contains_key(&fallback) {
            return Err(EmotionError::UnknownEmotion(fallback));
        }
        Ok(Self {
            mapping: Arc::new(mapping),
            fallback,
            current: None,
            animation_start_ms: None,
            transition: None,
            config_path: None,
            watch_rx: None,
        })
    }

    /// Machine loaded from a mapping file, falling back to the built-in
    /// mapping if the file is missing or invalid.
    pub fn from_config_file(path: &Path) -> Self {
        let mut machine = Self::new();
        machine.config_path = Some(path.to_path_buf());
        if !machine.reload(Some(path)) {
            log::warn!(
                "could not load emotion mapping from {}; using built-in defaults",
                path.display()
            );
        }
        machine
    }

    /// Route watcher notifications into this machine; they are drained on
    /// the next `update` call.
    pub fn attach_watch_channel(&mut self, rx: Receiver<WatchEvent>) {
        self.watch_rx = Some(rx);
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    // --- introspection ---

    pub fn current_emotion(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Progress of the active transition in 0.0..=1.0; 0.0 when idle.
    pub fn transition_progress(&self, now_ms: u64) -> f32 {
        match &self.transition {
            Some(t) if t.duration_ms > 0 => {
                let elapsed = now_ms.saturating_sub(t.started_ms) as f32;
                (elapsed / t.duration_ms as f32).min(1.0)
            }
            Some(_) => 1.0,
            None => 0.0,
        }
    }

    pub fn fallback_emotion(&self) -> &str {
        &self.fallback
    }

    /// Point the fallback at another mapped emotion.
    pub fn set_fallback_emotion(&mut self, name: &str) -> bool {
        let name = name.trim().to_ascii_lowercase();
        if self.mapping.contains_key(&name) {
            self.fallback = name;
            true
        } else {
            log::warn!("cannot use unmapped emotion '{name}' as fallback");
            false
        }
    }

    pub fn descriptor(&self, name: &str) -> Option<&EmotionDescriptor> {
        self.mapping.get(&name.trim().to_ascii_lowercase())
    }

    pub fn available_emotions(&self) -> Vec<String> {
        let mut names: Vec<String> = self.mapping.keys().cloned().collect();
        names.sort();
        names
    }

    /// Names of descriptors whose sequence is not registered. Run this after
    /// wiring up sequences to catch dangling references early.
    pub fn validate_sequences(&self, sequences: &Sequences) -> Vec<String> {
        let mut missing: Vec<String> = self
            .mapping
            .iter()
            .filter(|(_, d)| !sequences.contains(&d.sequence_name))
            .map(|(name, _)| name.clone())
            .collect();
        missing.sort();
        missing
    }

    // --- mapping edits (copy-on-write behind the Arc) ---

    /// Add a new emotion. Rejects invalid descriptors and existing names.
    pub fn register_mapping(&mut self, name: &str, descriptor: EmotionDescriptor) -> bool {
        let name = name.trim().to_ascii_lowercase();
        if name.is_empty() {
            log::warn!("cannot register an emotion with an empty name");
            return false;
        }
        if self.mapping.contains_key(&name) {
            log::warn!("emotion '{name}' already registered; use update_mapping");
            return false;
        }
        if let Err(err) = descriptor.validate() {
            log::warn!("rejecting emotion '{name}': {err}");
            return false;
        }
        let mut next = (*self.mapping).clone();
        next.insert(name.clone(), descriptor);
        self.mapping = Arc::new(next);
        log::info!("registered emotion '{name}'");
        true
    }

    /// Replace an existing emotion's descriptor.
    pub fn update_mapping(&mut self, name: &str, descriptor: EmotionDescriptor) -> bool {
        let name = name.trim().to_ascii_lowercase();
        if !self.mapping.contains_key(&name) {
            log::warn!("cannot update unmapped emotion '{name}'");
            return false;
        }
        if let Err(err) = descriptor.validate() {
            log::warn!("rejecting update for emotion '{name}': {err}");
            return false;
        }
        let mut next = (*self.mapping).clone();
        next.insert(name, descriptor);
        self.mapping = Arc::new(next);
        true
    }

    /// Remove an emotion. The fallback emotion cannot be removed.
    pub fn remove_mapping(&mut self, name: &str) -> bool {
        let name = name.trim().to_ascii_lowercase();
        if name == self.fallback {
            log::warn!("cannot remove the fallback emotion '{name}'");
            return false;
        }
        if !self.mapping.contains_key(&name) {
            return false;
        }
        let mut next = (*self.mapping).clone();
        next.remove(&name);
        self.mapping = Arc::new(next);
        if self.current.as_deref() == Some(name.as_str()) {
            self.current = None;
            self.animation_start_ms = None;
        }
        true
    }

    /// Reload the mapping file: parse and validate the whole replacement
    /// first, then swap it in atomically. On any failure the active mapping
    /// is left exactly as it was.
    pub fn reload(&mut self, path: Option<&Path>) -> bool {
        let Some(path) = path
            .map(Path::to_path_buf)
            .or_else(|| self.config_path.clone())
        else {
            log::error!("reload requested but no mapping file path is configured");
            return false;
        };

        let (mapping, file_fallback) = match descriptor::load_mapping(&path) {
            Ok(loaded) => loaded,
            Err(err) => {
                log::error!("reload of {} failed: {err}", path.display());
                return false;
            }
        };
        let errors = validate_mapping(&mapping);
        if !errors.is_empty() {
            log::error!(
                "reload of {} rejected: {}",
                path.display(),
                errors.join("; ")
            );
            return false;
        }

        let mut fallback = file_fallback.unwrap_or_else(|| self.fallback.clone());
        if !mapping.contains_key(&fallback) {
            let replacement = if mapping.contains_key(EMOTION_NEUTRAL) {
                EMOTION_NEUTRAL.to_string()
            } else {
                // Non-empty after validation.
                self.any_key(&mapping)
            };
            log::warn!(
                "fallback emotion '{fallback}' missing from reloaded mapping; using '{replacement}'"
            );
            fallback = replacement;
        }

        self.mapping = Arc::new(mapping);
        self.fallback = fallback;
        self.config_path = Some(path.clone());
        if let Some(current) = &self.current {
            if !self.mapping.contains_key(current) {
                log::warn!("active emotion '{current}' disappeared in reload");
                self.current = None;
                self.animation_start_ms = None;
            }
        }
        if let Some(t) = &self.transition {
            if !self.mapping.contains_key(&t.target) {
                self.transition = None;
            }
        }
        log::info!(
            "loaded {} emotion mappings from {}",
            self.mapping.len(),
            path.display()
        );
        true
    }

    fn any_key(&self, mapping: &EmotionMap) -> String {
        let mut names: Vec<&String> = mapping.keys().collect();
        names.sort();
        names
            .first()
            .map(|s| s.to_string())
            .unwrap_or_else(|| EMOTION_NEUTRAL.to_string())
    }

    // --- health / recovery ---

    /// Healthy when the mapping is non-empty and contains the fallback.
    pub fn health_check(&self) -> bool {
        !self.mapping.is_empty() && self.mapping.contains_key(&self.fallback)
    }

    /// Clear transient state and return to the fallback emotion. If even
    /// that is impossible, leave the eyes in a minimal safe state.
    pub fn recover(&mut self, now_ms: u64, eyes: &mut Eyes, sequences: &mut Sequences) -> bool {
        log::warn!("recovering emotion system");
        self.transition = None;
        self.current = None;
        self.animation_start_ms = None;
        if self.health_check() {
            let fallback = self.fallback.clone();
            if self.trigger(&fallback, 1.0, now_ms, eyes, sequences) {
                return true;
            }
        }
        eyes.set_mood(Mood::Default);
        eyes.open(EyeSelect::Both);
        log::error!("recovery degraded to minimal safe visual state");
        false
    }

    // --- core operations ---

    /// Request an emotion. Unknown or empty names resolve to the fallback.
    /// Returns whether the request took effect (a lower-priority request
    /// against a protected emotion is refused).
    pub fn trigger(
        &mut self,
        name: &str,
        confidence: f32,
        now_ms: u64,
        eyes: &mut Eyes,
        sequences: &mut Sequences,
    ) -> bool {
        let confidence = if (0.0..=1.0).contains(&confidence) {
            confidence
        } else {
            log::warn!("confidence {confidence} out of range; using 1.0");
            1.0
        };

        let normalized = name.trim().to_ascii_lowercase();
        let resolved = if normalized.is_empty() || !self.mapping.contains_key(&normalized) {
            if !normalized.is_empty() {
                log::warn!(
                    "no mapping for emotion '{normalized}'; using fallback '{}'",
                    self.fallback
                );
            }
            self.fallback.clone()
        } else {
            normalized
        };

        // Idempotent: re-triggering the active emotion (or the transition
        // target) is a success without restarting anything.
        if self.transition.is_none() && self.current.as_deref() == Some(resolved.as_str()) {
            log::debug!("emotion '{resolved}' already active");
            return true;
        }
        if let Some(t) = &self.transition {
            if t.target == resolved {
                return true;
            }
        }

        let Some(descriptor) = self.mapping.get(&resolved).cloned() else {
            log::error!("fallback emotion '{resolved}' is unmapped");
            return self.recover(now_ms, eyes, sequences);
        };

        if !self.may_interrupt(&descriptor, now_ms) {
            log::debug!(
                "not interrupting '{}' for '{resolved}' (priority {})",
                self.current.as_deref().unwrap_or("-"),
                descriptor.priority
            );
            return false;
        }

        log::info!(
            "triggering emotion '{resolved}' (confidence {confidence:.2}, current {:?})",
            self.current
        );
        if descriptor.transition_duration_ms > 0 && self.current.is_some() {
            self.transition = Some(Transition {
                target: resolved,
                started_ms: now_ms,
                duration_ms: descriptor.transition_duration_ms,
                mood_applied: false,
            });
        } else {
            self.activate(resolved, &descriptor, now_ms, eyes, sequences);
        }
        true
    }

    /// Interruption gate: higher priority always wins; equal priority wins
    /// once the incumbent's duration has elapsed; incumbents below the
    /// critical priority never resist.
    fn may_interrupt(&self, new: &EmotionDescriptor, now_ms: u64) -> bool {
        let Some(current_name) = &self.current else {
            return true;
        };
        let Some(current) = self.mapping.get(current_name) else {
            return true;
        };
        if new.priority > current.priority {
            return true;
        }
        if current.priority < CRITICAL_PRIORITY {
            return true;
        }
        if new.priority == current.priority {
            if let (Some(duration), Some(start)) = (current.duration_ms, self.animation_start_ms) {
                if now_ms.saturating_sub(start) >= duration as u64 {
                    return true;
                }
            }
        }
        false
    }

    fn activate(
        &mut self,
        name: String,
        descriptor: &EmotionDescriptor,
        now_ms: u64,
        eyes: &mut Eyes,
        sequences: &mut Sequences,
    ) {
        self.transition = None;
        eyes.set_mood(descriptor.mood);
        if let Some(sequence) = sequences.get_mut(&descriptor.sequence_name) {
            sequence.reset();
            sequence.start(now_ms);
            log::debug!("started sequence '{}'", descriptor.sequence_name);
        } else {
            log::warn!(
                "sequence '{}' not registered for '{name}'; using built-in gesture",
                descriptor.sequence_name
            );
            library::builtin_gesture(&name, eyes);
        }
        self.current = Some(name);
        self.animation_start_ms = Some(now_ms);
    }

    /// Per-frame maintenance: apply pending reloads, advance the transition
    /// (mood flips at the halfway mark, activation at completion), and fall
    /// back when the active emotion's duration expires.
    pub fn update(&mut self, now_ms: u64, eyes: &mut Eyes, sequences: &mut Sequences) {
        self.drain_watch_events();

        if let Some(t) = self.transition.clone() {
            let progress = self.transition_progress(now_ms);
            if progress >= 0.5 && !t.mood_applied {
                if let Some(descriptor) = self.mapping.get(&t.target) {
                    eyes.set_mood(descriptor.mood);
                }
                if let Some(t) = self.transition.as_mut() {
                    t.mood_applied = true;
                }
            }
            if progress >= 1.0 {
                match self.mapping.get(&t.target).cloned() {
                    Some(descriptor) => {
                        self.activate(t.target, &descriptor, now_ms, eyes, sequences);
                    }
                    None => {
                        self.transition = None;
                        self.recover(now_ms, eyes, sequences);
                    }
                }
            }
        }

        if self.transition.is_none() {
            if let (Some(current), Some(start)) = (&self.current, self.animation_start_ms) {
                if let Some(duration) = self
                    .mapping
                    .get(current)
                    .and_then(|descriptor| descriptor.duration_ms)
                {
                    if now_ms.saturating_sub(start) >= duration as u64 {
                        log::debug!(
                            "emotion '{current}' expired after {duration}ms; returning to '{}'",
                            self.fallback
                        );
                        self.current = None;
                        self.animation_start_ms = None;
                        let fallback = self.fallback.clone();
                        self.trigger(&fallback, 1.0, now_ms, eyes, sequences);
                    }
                }
            }
        }
    }

    fn drain_watch_events(&mut self) {
        let mut changed: Option<PathBuf> = None;
        if let Some(rx) = &self.watch_rx {
            while let Ok(event) = rx.try_recv() {
                let WatchEvent::Changed(path) = event;
                changed = Some(path);
            }
        }
        if let Some(path) = changed {
            self.reload(Some(&path));
        }
    }
}
