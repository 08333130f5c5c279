use std::fs;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use roboeyes_core::{Config, Eyes, Mood, NullRenderer, Sequences};
use roboeyes_emotion::{
    library, ConfigWatcher, EmotionDescriptor, EmotionMachine, Rig, WatchEvent, EMOTION_HAPPY,
    EMOTION_NEUTRAL, EMOTION_URGENT,
};

fn harness() -> (Eyes, Sequences) {
    let eyes = Eyes::with_seed(Config::default(), 42);
    let mut sequences = Sequences::new();
    library::install_default_sequences(&mut sequences);
    (eyes, sequences)
}

fn temp_path(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("roboeyes-{}-{}", std::process::id(), name));
    path
}

/// it should resolve unknown emotion names to the fallback
#[test]
fn unknown_emotion_falls_back() {
    let (mut eyes, mut sequences) = harness();
    let mut machine = EmotionMachine::new();
    assert!(machine.trigger("excitement", 0.9, 0, &mut eyes, &mut sequences));
    assert_eq!(machine.current_emotion(), Some(EMOTION_NEUTRAL));
}

/// it should treat empty and badly-cased names like their normalized form
#[test]
fn names_are_normalized() {
    let (mut eyes, mut sequences) = harness();
    let mut machine = EmotionMachine::new();
    assert!(machine.trigger("  HAPPY ", 1.0, 0, &mut eyes, &mut sequences));
    // First trigger with no incumbent activates without a transition.
    assert_eq!(machine.current_emotion(), Some(EMOTION_HAPPY));

    let mut machine = EmotionMachine::new();
    assert!(machine.trigger("", 1.0, 0, &mut eyes, &mut sequences));
    assert_eq!(machine.current_emotion(), Some(EMOTION_NEUTRAL));
}

/// it should accept re-triggering the active emotion without restarting
#[test]
fn retrigger_is_idempotent() {
    let (mut eyes, mut sequences) = harness();
    let mut machine = EmotionMachine::new();
    assert!(machine.trigger(EMOTION_NEUTRAL, 1.0, 0, &mut eyes, &mut sequences));
    assert!(machine.trigger(EMOTION_NEUTRAL, 1.0, 500, &mut eyes, &mut sequences));
    assert_eq!(machine.current_emotion(), Some(EMOTION_NEUTRAL));
    assert!(!machine.is_transitioning());
}

/// it should clamp out-of-range confidence instead of failing
#[test]
fn invalid_confidence_is_clamped() {
    let (mut eyes, mut sequences) = harness();
    let mut machine = EmotionMachine::new();
    assert!(machine.trigger(EMOTION_HAPPY, 7.5, 0, &mut eyes, &mut sequences));
    assert_eq!(machine.current_emotion(), Some(EMOTION_HAPPY));
}

/// it should refuse lower-priority requests against a protected emotion
#[test]
fn protected_emotion_resists_interruption() {
    let (mut eyes, mut sequences) = harness();
    let mut machine = EmotionMachine::new();
    assert!(machine.trigger(EMOTION_URGENT, 1.0, 0, &mut eyes, &mut sequences));
    assert_eq!(machine.current_emotion(), Some(EMOTION_URGENT));

    // urgent has priority 5 and no duration; happy (3) and neutral (1) lose.
    assert!(!machine.trigger(EMOTION_HAPPY, 1.0, 100, &mut eyes, &mut sequences));
    assert!(!machine.trigger(EMOTION_NEUTRAL, 1.0, 200, &mut eyes, &mut sequences));
    assert_eq!(machine.current_emotion(), Some(EMOTION_URGENT));
}

/// it should let a higher-priority emotion preempt a protected one
#[test]
fn higher_priority_preempts() {
    let (mut eyes, mut sequences) = harness();
    let mut machine = EmotionMachine::new();
    assert!(machine.trigger(EMOTION_URGENT, 1.0, 0, &mut eyes, &mut sequences));

    let mut alarm = EmotionDescriptor::new("alert_focused");
    alarm.priority = 6;
    alarm.transition_duration_ms = 0;
    assert!(machine.register_mapping("alarm", alarm));
    assert!(machine.trigger("alarm", 1.0, 100, &mut eyes, &mut sequences));
    assert_eq!(machine.current_emotion(), Some("alarm"));
}

/// it should interrupt low-priority emotions freely
#[test]
fn low_priority_is_always_interruptible() {
    let (mut eyes, mut sequences) = harness();
    let mut machine = EmotionMachine::new();
    assert!(machine.trigger(EMOTION_NEUTRAL, 1.0, 0, &mut eyes, &mut sequences));
    assert!(machine.trigger(EMOTION_HAPPY, 1.0, 1000, &mut eyes, &mut sequences));
    assert!(machine.is_transitioning());
}

/// it should switch the mood halfway through a transition and finish on time
#[test]
fn transition_applies_mood_at_midpoint() {
    let (mut eyes, mut sequences) = harness();
    let mut machine = EmotionMachine::new();
    machine.trigger(EMOTION_NEUTRAL, 1.0, 0, &mut eyes, &mut sequences);
    assert_eq!(eyes.mood(), Mood::Default);

    // happy carries a 1500ms transition.
    assert!(machine.trigger(EMOTION_HAPPY, 1.0, 1000, &mut eyes, &mut sequences));
    assert!(machine.is_transitioning());
    assert_eq!(machine.current_emotion(), Some(EMOTION_NEUTRAL));

    machine.update(1400, &mut eyes, &mut sequences);
    assert_eq!(eyes.mood(), Mood::Default, "mood must not switch before 50%");

    machine.update(1750, &mut eyes, &mut sequences);
    assert_eq!(eyes.mood(), Mood::Happy, "mood switches at 50% progress");
    assert!(machine.is_transitioning());

    machine.update(2500, &mut eyes, &mut sequences);
    assert!(!machine.is_transitioning());
    assert_eq!(machine.current_emotion(), Some(EMOTION_HAPPY));
}

/// it should fall back once the active emotion's duration expires
#[test]
fn duration_expiry_returns_to_fallback() {
    let (mut eyes, mut sequences) = harness();
    let mut machine = EmotionMachine::new();
    machine.trigger(EMOTION_HAPPY, 1.0, 0, &mut eyes, &mut sequences);
    assert_eq!(machine.current_emotion(), Some(EMOTION_HAPPY));

    // happy holds for 4000ms.
    machine.update(3999, &mut eyes, &mut sequences);
    assert_eq!(machine.current_emotion(), Some(EMOTION_HAPPY));

    machine.update(4000, &mut eyes, &mut sequences);
    assert_eq!(machine.current_emotion(), Some(EMOTION_NEUTRAL));
}

/// it should reject edits that would break the mapping
#[test]
fn mapping_edits_are_guarded() {
    let mut machine = EmotionMachine::new();

    let mut bad = EmotionDescriptor::new("seq");
    bad.priority = 0;
    assert!(!machine.register_mapping("broken", bad));

    assert!(!machine.remove_mapping(EMOTION_NEUTRAL), "fallback is protected");
    assert!(machine.remove_mapping("request"));
    assert!(!machine.remove_mapping("request"), "already removed");

    assert!(!machine.update_mapping("missing", EmotionDescriptor::new("seq")));
    assert!(machine.update_mapping(EMOTION_HAPPY, EmotionDescriptor::new("gentle_joy")));

    assert!(machine.health_check());
}

/// it should keep the old mapping when a reload fails
#[test]
fn failed_reload_preserves_mapping() {
    let path = temp_path("malformed.json");
    fs::write(&path, "{ not json").expect("write temp file");

    let mut machine = EmotionMachine::new();
    let before = machine.available_emotions();
    assert!(!machine.reload(Some(&path)));
    assert_eq!(machine.available_emotions(), before);
    assert_eq!(machine.fallback_emotion(), EMOTION_NEUTRAL);

    // Structurally valid JSON with an invalid descriptor is rejected too.
    fs::write(
        &path,
        r#"{ "calm": { "sequence_name": "idle_gentle", "priority": 99 } }"#,
    )
    .expect("write temp file");
    assert!(!machine.reload(Some(&path)));
    assert_eq!(machine.available_emotions(), before);

    let _ = fs::remove_file(&path);
}

/// it should swap in a valid reloaded mapping atomically
#[test]
fn reload_swaps_mapping_and_fallback() {
    let path = temp_path("valid.json");
    fs::write(
        &path,
        r#"{
            "emotion_mappings": {
                "calm": { "sequence_name": "idle_gentle", "mood": 0, "priority": 1 },
                "alert": { "sequence_name": "alert_focused", "mood": 0, "priority": 5 }
            },
            "fallback_emotion": "calm"
        }"#,
    )
    .expect("write temp file");

    let mut machine = EmotionMachine::new();
    assert!(machine.reload(Some(&path)));
    assert_eq!(machine.available_emotions(), vec!["alert", "calm"]);
    assert_eq!(machine.fallback_emotion(), "calm");

    let _ = fs::remove_file(&path);
}

/// it should load back a mapping it saved
#[test]
fn saved_mapping_reloads() {
    let path = temp_path("saved.json");
    let (map, fallback) = roboeyes_emotion::default_mapping();
    roboeyes_emotion::descriptor::save_mapping(&map, &fallback, &path).expect("save mapping");

    let mut machine = EmotionMachine::new();
    assert!(machine.remove_mapping("request"));
    assert!(machine.reload(Some(&path)));
    assert_eq!(machine.available_emotions().len(), 5);
    assert_eq!(machine.fallback_emotion(), fallback);
    assert_eq!(machine.descriptor(EMOTION_HAPPY), map.get(EMOTION_HAPPY));

    let _ = fs::remove_file(&path);
}

/// it should repoint a dangling fallback after reload
#[test]
fn reload_repoints_missing_fallback() {
    let path = temp_path("nofallback.json");
    fs::write(
        &path,
        r#"{
            "beta": { "sequence_name": "idle_gentle" },
            "alpha": { "sequence_name": "idle_gentle" }
        }"#,
    )
    .expect("write temp file");

    let mut machine = EmotionMachine::new();
    assert!(machine.reload(Some(&path)));
    // Old fallback "neutral" is gone and the file names none; the machine
    // picks a deterministic survivor.
    assert_eq!(machine.fallback_emotion(), "alpha");
    assert!(machine.health_check());

    let _ = fs::remove_file(&path);
}

/// it should clear the active emotion if a reload drops it
#[test]
fn reload_clears_vanished_current_emotion() {
    let path = temp_path("dropped.json");
    fs::write(
        &path,
        r#"{ "neutral": { "sequence_name": "idle_gentle" } }"#,
    )
    .expect("write temp file");

    let (mut eyes, mut sequences) = harness();
    let mut machine = EmotionMachine::new();
    machine.trigger(EMOTION_HAPPY, 1.0, 0, &mut eyes, &mut sequences);
    assert!(machine.reload(Some(&path)));
    assert_eq!(machine.current_emotion(), None);

    let _ = fs::remove_file(&path);
}

/// it should recover into the fallback emotion
#[test]
fn recover_returns_to_fallback() {
    let (mut eyes, mut sequences) = harness();
    let mut machine = EmotionMachine::new();
    machine.trigger(EMOTION_URGENT, 1.0, 0, &mut eyes, &mut sequences);
    assert!(machine.recover(100, &mut eyes, &mut sequences));
    assert_eq!(machine.current_emotion(), Some(EMOTION_NEUTRAL));
    assert!(!machine.is_transitioning());
}

/// it should report descriptors whose sequences are missing
#[test]
fn validate_sequences_finds_dangling_names() {
    let mut machine = EmotionMachine::new();
    let mut ghost = EmotionDescriptor::new("no_such_sequence");
    ghost.transition_duration_ms = 0;
    assert!(machine.register_mapping("ghost", ghost));

    let mut sequences = Sequences::new();
    library::install_default_sequences(&mut sequences);
    assert_eq!(machine.validate_sequences(&sequences), vec!["ghost"]);
}

/// it should fall back to a built-in gesture when a sequence is missing
#[test]
fn missing_sequence_uses_builtin_gesture() {
    let (mut eyes, mut sequences) = harness();
    let mut machine = EmotionMachine::new();
    let mut ghost = EmotionDescriptor::new("no_such_sequence");
    ghost.transition_duration_ms = 0;
    ghost.mood = Mood::Happy;
    assert!(machine.register_mapping("ghost", ghost));

    assert!(machine.trigger("ghost", 1.0, 0, &mut eyes, &mut sequences));
    assert_eq!(machine.current_emotion(), Some("ghost"));
    // The default gesture for an unknown category is a blink.
    assert_eq!(eyes.left.height_next, 1);
}

/// it should apply a watched mapping change on the next update
#[test]
fn watcher_drives_hot_reload() {
    let path = temp_path("watched.json");
    fs::write(
        &path,
        r#"{ "neutral": { "sequence_name": "idle_gentle" } }"#,
    )
    .expect("write temp file");

    let (tx, rx) = mpsc::channel();
    let watcher = ConfigWatcher::spawn(path.clone(), Duration::from_millis(50), tx);
    assert!(watcher.is_running());

    let (mut eyes, mut sequences) = harness();
    let mut machine = EmotionMachine::new();
    machine.attach_watch_channel(rx);

    std::thread::sleep(Duration::from_millis(150));
    fs::write(
        &path,
        r#"{
            "emotion_mappings": {
                "calm": { "sequence_name": "idle_gentle" }
            },
            "fallback_emotion": "calm"
        }"#,
    )
    .expect("rewrite temp file");

    // Wait for the watcher to notice, then let update apply the reload.
    let deadline = std::time::Instant::now() + Duration::from_secs(3);
    loop {
        machine.update(0, &mut eyes, &mut sequences);
        if machine.fallback_emotion() == "calm" {
            break;
        }
        assert!(
            std::time::Instant::now() < deadline,
            "watcher never delivered the change"
        );
        std::thread::sleep(Duration::from_millis(20));
    }
    assert_eq!(machine.available_emotions(), vec!["calm"]);

    watcher.stop();
    let _ = fs::remove_file(&path);
}

/// it should send a change event over the channel directly
#[test]
fn watcher_reports_changes_on_channel() {
    let path = temp_path("channel.json");
    fs::write(&path, "{}").expect("write temp file");

    let (tx, rx) = mpsc::channel();
    let watcher = ConfigWatcher::spawn(path.clone(), Duration::from_millis(50), tx);

    std::thread::sleep(Duration::from_millis(150));
    fs::write(&path, r#"{ "touched": true }"#).expect("rewrite temp file");

    let event = rx.recv_timeout(Duration::from_secs(3)).expect("watch event");
    assert_eq!(event, WatchEvent::Changed(path.clone()));

    watcher.stop();
    let _ = fs::remove_file(&path);
}

/// it should drive the whole stack through a frame loop
#[test]
fn rig_steps_machine_sequences_and_eyes() {
    let mut rig = Rig::new(Config::default());
    let mut renderer = NullRenderer;
    assert!(rig.trigger(EMOTION_HAPPY, 1.0, 0));
    for t in 0..80u64 {
        rig.step(t * 50, &mut renderer);
    }
    assert_eq!(rig.machine.current_emotion(), Some(EMOTION_HAPPY));
    assert_eq!(rig.eyes.mood(), Mood::Happy);
    assert!(rig.eyes.left.open);
    // happy expires after 4000ms and falls back to neutral.
    rig.step(5000, &mut renderer);
    assert_eq!(rig.machine.current_emotion(), Some(EMOTION_NEUTRAL));
}
