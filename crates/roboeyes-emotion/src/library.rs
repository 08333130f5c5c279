//! Built-in animation sequences backing the default emotion mapping.

use roboeyes_core::{EyeSelect, Mood, Position, Sequences};

/// Register the sequences the default mapping refers to. Existing sequences
/// with the same names are left alone.
pub fn install_default_sequences(sequences: &mut Sequences) {
    if !sequences.contains("idle_gentle") {
        sequences
            .add("idle_gentle")
            .step(0, |eyes| eyes.open(EyeSelect::Both))
            .step(400, |eyes| eyes.set_position(Position::Center))
            .step(1200, |eyes| eyes.blink(EyeSelect::Both));
    }
    if !sequences.contains("gentle_joy") {
        sequences
            .add("gentle_joy")
            .step(0, |eyes| eyes.open(EyeSelect::Both))
            .step(300, |eyes| eyes.laugh())
            .step(1500, |eyes| eyes.blink(EyeSelect::Both));
    }
    if !sequences.contains("alert_focused") {
        sequences
            .add("alert_focused")
            .step(0, |eyes| eyes.open(EyeSelect::Both))
            .step(150, |eyes| eyes.set_position(Position::Center))
            .step(300, |eyes| eyes.blink(EyeSelect::Both))
            .step(600, |eyes| eyes.blink(EyeSelect::Both));
    }
    if !sequences.contains("empathetic_support") {
        sequences
            .add("empathetic_support")
            .step(0, |eyes| eyes.open(EyeSelect::Both))
            .step(400, |eyes| eyes.set_position(Position::W))
            .step(1200, |eyes| eyes.set_position(Position::Center))
            .step(2400, |eyes| eyes.blink(EyeSelect::Both));
    }
    if !sequences.contains("attentive_listening") {
        sequences
            .add("attentive_listening")
            .step(0, |eyes| eyes.open(EyeSelect::Both))
            .step(300, |eyes| eyes.set_position(Position::N))
            .step(1500, |eyes| eyes.blink(EyeSelect::Both))
            .step(2800, |eyes| eyes.set_position(Position::Center));
    }
}

/// Last-resort visual for an emotion whose sequence is missing: a direct
/// eye-engine gesture keyed on the emotion category.
pub fn builtin_gesture(emotion: &str, eyes: &mut roboeyes_core::Eyes) {
    match emotion {
        "happy" => eyes.set_mood(Mood::Happy),
        "urgent" => {
            eyes.set_mood(Mood::Default);
            eyes.open(EyeSelect::Both);
        }
        "concerned" => eyes.set_mood(Mood::Tired),
        "request" => eyes.set_position(Position::N),
        _ => eyes.blink(EyeSelect::Both),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installs_all_default_sequences_once() {
        let mut sequences = Sequences::new();
        install_default_sequences(&mut sequences);
        assert_eq!(sequences.len(), 5);
        install_default_sequences(&mut sequences);
        assert_eq!(sequences.len(), 5);
        for name in [
            "idle_gentle",
            "gentle_joy",
            "alert_focused",
            "empathetic_support",
            "attentive_listening",
        ] {
            assert!(sequences.contains(name), "missing {name}");
        }
    }
}
