//! Headless demo: runs the engine on a simulated clock and prints what each
//! frame would draw.
//!
//! Run with `RUST_LOG=debug cargo run --example blink_demo` to also see the
//! engine's own logging.

use roboeyes_core::{Config, EyeSelect, Eyes, Mood, Position, RecordingRenderer};

fn main() {
    env_logger::init();

    let mut eyes = Eyes::with_seed(Config::default(), 7);
    let mut renderer = RecordingRenderer::new();

    eyes.open(EyeSelect::Both);
    eyes.set_auto_blinker(true, Some(2), Some(1));

    for frame in 0..60u64 {
        let now_ms = frame * 50;
        match now_ms {
            1000 => eyes.set_mood(Mood::Happy),
            1500 => eyes.laugh(),
            2500 => eyes.set_position(Position::W),
            _ => {}
        }

        renderer.clear();
        if eyes.update(now_ms, &mut renderer) {
            println!(
                "{:>5}ms  left {:>2}x{:<2} at ({:>3},{:>2})  mood {:?}  commands {}",
                now_ms,
                eyes.left.width_current,
                eyes.left.height_current,
                eyes.left.x,
                eyes.left.y,
                eyes.mood(),
                renderer.commands.len(),
            );
        }
    }
}
