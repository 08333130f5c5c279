//! Everything wired together: eyes, sequences, and the emotion machine,
//! stepped once per host frame.

use roboeyes_core::{Config, Eyes, Renderer, Sequences};

use crate::library;
use crate::machine::EmotionMachine;

pub struct Rig {
    pub eyes: Eyes,
    pub sequences: Sequences,
    pub machine: EmotionMachine,
}

impl Rig {
    /// Rig with the default emotion mapping and its built-in sequences.
    pub fn new(cfg: Config) -> Self {
        Self::with_machine(cfg, EmotionMachine::new())
    }

    pub fn with_machine(cfg: Config, machine: EmotionMachine) -> Self {
        let mut sequences = Sequences::new();
        library::install_default_sequences(&mut sequences);
        let missing = machine.validate_sequences(&sequences);
        if !missing.is_empty() {
            log::warn!("emotions without registered sequences: {}", missing.join(", "));
        }
        Self {
            eyes: Eyes::new(cfg),
            sequences,
            machine,
        }
    }

    /// One frame: machine maintenance, then due sequence steps, then the
    /// rate-limited eye tween/draw pass.
    pub fn step(&mut self, now_ms: u64, renderer: &mut dyn Renderer) -> bool {
        self.machine
            .update(now_ms, &mut self.eyes, &mut self.sequences);
        self.sequences.update(now_ms, &mut self.eyes);
        self.eyes.update(now_ms, renderer)
    }

    pub fn trigger(&mut self, name: &str, confidence: f32, now_ms: u64) -> bool {
        self.machine
            .trigger(name, confidence, now_ms, &mut self.eyes, &mut self.sequences)
    }
}
