//! Walks the default emotion mapping through a scripted conversation on a
//! simulated clock: neutral idle, a happy reaction, an urgent alert that
//! resists interruption, and the fall back to neutral.

use anyhow::Result;
use roboeyes_core::{Config, NullRenderer};
use roboeyes_emotion::Rig;

fn main() -> Result<()> {
    env_logger::init();

    let mut rig = Rig::new(Config::default());
    let mut renderer = NullRenderer;
    let mut last: Option<String> = None;

    for frame in 0..400u64 {
        let now_ms = frame * 50;
        match now_ms {
            0 => {
                rig.trigger("neutral", 1.0, now_ms);
            }
            2000 => {
                rig.trigger("happy", 0.92, now_ms);
            }
            9000 => {
                rig.trigger("urgent", 0.99, now_ms);
            }
            11_000 => {
                // Refused: urgent outranks it.
                let accepted = rig.trigger("happy", 0.8, now_ms);
                println!("{now_ms:>6}ms  happy over urgent accepted: {accepted}");
            }
            14_000 => {
                rig.trigger("neutral", 1.0, now_ms);
                let mut alarm = roboeyes_emotion::EmotionDescriptor::new("alert_focused");
                alarm.priority = 6;
                rig.machine.register_mapping("alarm", alarm);
                rig.trigger("alarm", 1.0, now_ms);
            }
            _ => {}
        }

        rig.step(now_ms, &mut renderer);

        let current = rig.machine.current_emotion().map(str::to_string);
        if current != last {
            println!(
                "{now_ms:>6}ms  emotion {:?}  mood {:?}  transitioning {}",
                current.as_deref().unwrap_or("-"),
                rig.eyes.mood(),
                rig.machine.is_transitioning(),
            );
            last = current;
        }
    }

    Ok(())
}
